use std::fmt::Write;

use crate::scene::{SceneAnalysisResult, record::SceneRecord};

const DEFAULT_ICON: &str = "📋";

const CATEGORY_ICONS: &[(&str, &str)] = &[
    ("People", "🧍"),
    ("Furniture", "🪑"),
    ("Lighting", "💡"),
    ("Electronics", "💻"),
    ("Flooring", "🏗️"),
    ("Ceiling", "🏗️"),
    ("Walls", "🏗️"),
    ("Doors", "🚪"),
    ("Windows", "🪟"),
    ("Plants", "🌿"),
    ("Signage", "📋"),
    ("Safety Equipment", "🦺"),
    ("HVAC", "❄️"),
    ("Storage", "📦"),
    ("Infrastructure", "⚡"),
    ("Vehicle", "🚗"),
    ("Building Element", "🏗️"),
    ("Land Features", "🏔️"),
    ("Water Bodies", "💧"),
    ("Power Infrastructure", "⚡"),
    ("Industrial Equipment", "🏭"),
    ("Firefighting", "🧯"),
    ("Utilities", "🚰"),
    ("Access Control", "🚧"),
    ("Construction Materials", "🧱"),
    ("Agricultural", "🌾"),
    ("Waste/Salvage", "♻️"),
    ("Documentation", "📄"),
    ("Hazards", "⚠️"),
];

pub fn category_icon(category: &str) -> &'static str {
    CATEGORY_ICONS
        .iter()
        .find(|(name, _)| *name == category)
        .map_or(DEFAULT_ICON, |(_, icon)| *icon)
}

/// Groups records by category, categories in order of first appearance.
pub fn group_by_category(records: &[SceneRecord]) -> Vec<(&str, Vec<&SceneRecord>)> {
    let mut groups: Vec<(&str, Vec<&SceneRecord>)> = Vec::new();

    for record in records {
        match groups
            .iter_mut()
            .find(|(category, _)| *category == record.category)
        {
            Some((_, members)) => members.push(record),
            None => groups.push((record.category.as_str(), vec![record])),
        }
    }

    groups
}

/// Renders the markdown survey report for one analysed scene.
pub fn render_narrative(result: &SceneAnalysisResult) -> String {
    let mut out = String::new();

    // writing into a String cannot fail
    let _ = writeln!(out, "## Detailed Property Survey Report\n");
    let _ = writeln!(out, "### 📍 Scene Overview");
    let _ = writeln!(out, "{}\n", result.scene_overview);

    for (category, records) in group_by_category(&result.records) {
        let _ = writeln!(out, "### {} {category}\n", category_icon(category));

        for record in records {
            let _ = writeln!(out, "**{}**: {}", record.object, record.details);
            if record.has_position() {
                let _ = writeln!(out, "  - Position: {}", record.position);
            }
            if record.has_cost() {
                let _ = writeln!(out, "  - Cost: {}", record.estimated_cost);
            }
            out.push('\n');
        }
    }

    let _ = writeln!(out, "### ✅ Key Findings & Recommendations\n");
    for observation in &result.key_observations {
        let _ = writeln!(out, "- {observation}");
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result() -> SceneAnalysisResult {
        SceneAnalysisResult {
            scene_type: "indoor_office".to_string(),
            scene_overview: "A small office.".to_string(),
            records: vec![
                SceneRecord::new("Furniture", "2 Desks", "oak", "Center", "₹20,000"),
                SceneRecord::new("Lighting", "4 Panel Lights", "LED", "—", "—"),
                SceneRecord::new("Furniture", "3 Chairs", "mesh", "Left wall", "—"),
                SceneRecord::new("Mystery", "1 Box", "sealed", "—", "—"),
            ],
            key_observations: vec!["Well lit".to_string(), "Tidy".to_string()],
        }
    }

    #[test]
    fn test_group_by_category_keeps_first_seen_order() {
        let result = result();
        let groups = group_by_category(&result.records);

        let categories: Vec<_> = groups.iter().map(|(c, _)| *c).collect();
        assert_eq!(categories, ["Furniture", "Lighting", "Mystery"]);
        assert_eq!(groups[0].1.len(), 2);
        assert_eq!(groups[0].1[1].object, "3 Chairs");
    }

    #[test]
    fn test_category_icon() {
        assert_eq!(category_icon("Furniture"), "🪑");
        assert_eq!(category_icon("Mystery"), "📋");
    }

    #[test]
    fn test_render_narrative() {
        let report = render_narrative(&result());

        assert!(report.starts_with("## Detailed Property Survey Report\n\n### 📍 Scene Overview\nA small office.\n"));
        assert!(report.contains(
            "### 🪑 Furniture\n\n**2 Desks**: oak\n  - Position: Center\n  - Cost: ₹20,000\n\n**3 Chairs**: mesh\n  - Position: Left wall\n\n"
        ));
        assert!(report.contains("### 💡 Lighting\n\n**4 Panel Lights**: LED\n\n"));
        assert!(report.contains("### 📋 Mystery"));
        assert!(report.ends_with("### ✅ Key Findings & Recommendations\n\n- Well lit\n- Tidy\n"));
    }
}
