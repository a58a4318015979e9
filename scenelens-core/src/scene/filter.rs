use std::fmt;

use tracing::debug;

use crate::{
    consts::{
        EMPTY_FILTER_DETAILS, EMPTY_FILTER_OBJECT, GROUNDING_WORD_LIMIT, SIGNIFICANT_WORD_MIN_LEN,
    },
    scene::{keywords::SceneKeywords, record::SceneRecord},
};

/// Why a record was dropped by [`SceneFilter`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Exclusion {
    OutdoorCategory(String),
    OutdoorKeyword(String),
    /// None of the checked words of the object name occur in the description.
    Ungrounded(Vec<String>),
}

impl fmt::Display for Exclusion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Exclusion::OutdoorCategory(category) => {
                write!(f, "outdoor-only category `{category}` in an indoor scene")
            }
            Exclusion::OutdoorKeyword(keyword) => {
                write!(f, "outdoor keyword `{keyword}` in an indoor scene")
            }
            Exclusion::Ungrounded(words) => {
                write!(f, "none of {words:?} appear in the description")
            }
        }
    }
}

/// Drops scene records that contradict the scene type or that the source
/// description never mentions.
#[derive(Clone, Debug, Default)]
pub struct SceneFilter {
    keywords: SceneKeywords,
}

impl SceneFilter {
    pub fn new(keywords: SceneKeywords) -> Self {
        Self { keywords }
    }

    pub fn keywords(&self) -> &SceneKeywords {
        &self.keywords
    }

    /// First exclusion rule `record` trips, if any.
    ///
    /// `description` must already be lowercased.
    pub fn check(
        &self,
        record: &SceneRecord,
        scene_type: &str,
        description: &str,
    ) -> Option<Exclusion> {
        if self.keywords.is_indoor(scene_type) {
            if self.keywords.is_outdoor_category(&record.category) {
                return Some(Exclusion::OutdoorCategory(record.category.clone()));
            }
            if let Some(keyword) = self
                .keywords
                .find_outdoor_keyword(&[record.object.as_str(), record.details.as_str()])
            {
                return Some(Exclusion::OutdoorKeyword(keyword.to_string()));
            }
        }

        let words = significant_words(&record.object);
        let checked = &words[..words.len().min(GROUNDING_WORD_LIMIT)];
        if !checked.is_empty() && !checked.iter().any(|word| description.contains(word.as_str())) {
            return Some(Exclusion::Ungrounded(checked.to_vec()));
        }

        None
    }

    /// Keeps the records that pass every check, in input order.
    ///
    /// Never returns an empty list: when nothing survives a single `General`
    /// fallback record takes their place.
    pub fn filter(
        &self,
        records: Vec<SceneRecord>,
        scene_type: &str,
        source_description: &str,
    ) -> Vec<SceneRecord> {
        let description = source_description.to_lowercase();

        let kept: Vec<SceneRecord> = records
            .into_iter()
            .filter(|record| match self.check(record, scene_type, &description) {
                Some(reason) => {
                    debug!(object = %record.object, %reason, "dropping scene record");
                    false
                }
                None => true,
            })
            .collect();

        if kept.is_empty() {
            debug!(scene_type, "no scene record survived filtering, using fallback");
            return vec![SceneRecord::placeholder(
                EMPTY_FILTER_OBJECT,
                EMPTY_FILTER_DETAILS,
            )];
        }

        kept
    }
}

/// [`SceneFilter::filter`] with the default keyword lists.
pub fn filter_by_scene(
    records: Vec<SceneRecord>,
    scene_type: &str,
    source_description: &str,
) -> Vec<SceneRecord> {
    SceneFilter::default().filter(records, scene_type, source_description)
}

/// Lowercased words of an object name that are specific enough to look up
/// in a description: digits removed, edge punctuation trimmed, longer than
/// [`SIGNIFICANT_WORD_MIN_LEN`] characters.
pub fn significant_words(object: &str) -> Vec<String> {
    let without_digits: String = object
        .to_lowercase()
        .chars()
        .filter(|c| !c.is_ascii_digit())
        .collect();

    without_digits
        .split_whitespace()
        .map(|word| word.trim_matches(|c: char| !c.is_alphanumeric()))
        .filter(|word| word.chars().count() > SIGNIFICANT_WORD_MIN_LEN)
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const OFFICE: &str = "A bright open-plan office with three office chairs around a \
        wooden desk, two monitors and a potted plant near the window.";

    fn record(category: &str, object: &str, details: &str) -> SceneRecord {
        SceneRecord::new(category, object, details, "—", "—")
    }

    #[test]
    fn test_significant_words() {
        assert_eq!(significant_words("3 Office Chairs"), ["office", "chairs"]);
        assert_eq!(significant_words("12x Desk-lamps,"), ["desk-lamps"]);
        assert_eq!(significant_words("2 TV"), Vec::<String>::new());
        assert_eq!(significant_words("Fire Extinguisher (2)"), ["fire", "extinguisher"]);
    }

    #[test]
    fn test_indoor_scene_drops_outdoor_category() {
        let records = vec![record(
            "Power Infrastructure",
            "1 Transformer",
            "Pole mounted, rusted",
        )];

        let filtered = filter_by_scene(records, "indoor_office", "a transformer on the wall");
        assert_eq!(
            filtered,
            vec![SceneRecord::new(
                "General",
                "Scene Analysis",
                "No valid objects detected — scene may be minimal or validation too strict",
                "—",
                "—"
            )]
        );
    }

    #[test]
    fn test_indoor_scene_drops_outdoor_keyword() {
        let filter = SceneFilter::default();
        let tree = record("Plants", "1 Potted Plant", "small tree in a ceramic pot");
        assert_eq!(
            filter.check(&tree, "indoor_office", &OFFICE.to_lowercase()),
            Some(Exclusion::OutdoorKeyword("tree".to_string()))
        );

        // outdoor scenes keep it
        assert_eq!(
            filter.check(&tree, "building_exterior", &OFFICE.to_lowercase()),
            None
        );
    }

    #[test]
    fn test_grounding_check() {
        let records = vec![
            record("Furniture", "3 Office Chairs", "black mesh"),
            record("Electronics", "2 Monitors", "27 inch"),
            record("Electronics", "1 Projector Screen", "pull-down"),
            record("Lighting", "1 TV", "wall mounted"),
        ];

        let filtered = filter_by_scene(records, "indoor_office", OFFICE);
        let objects: Vec<_> = filtered.iter().map(|r| r.object.as_str()).collect();
        // "1 TV" has no significant words and is kept
        assert_eq!(objects, ["3 Office Chairs", "2 Monitors", "1 TV"]);
    }

    #[test]
    fn test_grounding_only_checks_first_words() {
        let filter = SceneFilter::default();
        let record = record("Furniture", "Ergonomic Swivel Desk", "");
        assert_eq!(
            filter.check(&record, "indoor_office", &OFFICE.to_lowercase()),
            Some(Exclusion::Ungrounded(vec![
                "ergonomic".to_string(),
                "swivel".to_string()
            ]))
        );
    }

    #[test]
    fn test_scene_type_is_case_insensitive() {
        let records = vec![record("Water Bodies", "1 Pond", "")];
        let filtered = filter_by_scene(records, "Indoor_Office", "a pond");
        assert_eq!(filtered[0].object, "Scene Analysis");
    }

    #[test]
    fn test_custom_keywords() {
        let keywords = SceneKeywords {
            outdoor_keywords: vec!["gravel".to_string()],
            ..SceneKeywords::default()
        };
        let filter = SceneFilter::new(keywords);

        let records = vec![
            record("Flooring", "Gravel Floor", ""),
            record("Plants", "Tree Planter", ""),
        ];
        let filtered = filter.filter(records, "indoor_commercial", "gravel floor and a tree planter");
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].object, "Tree Planter");
    }

    #[test]
    fn test_filter_never_empty_and_never_outdoor_indoors() {
        let categories = ["Power Infrastructure", "Furniture", "Agricultural", "Land Features"];
        let objects = ["1 Substation", "2 Chairs", "1 Tractor", "Asphalt Road", "3 Pylons"];

        for scene_type in ["indoor_office", "indoor_residential", "land_property", "unknown"] {
            for (i, category) in categories.iter().enumerate() {
                let records: Vec<_> = objects
                    .iter()
                    .skip(i)
                    .map(|object| record(category, object, ""))
                    .collect();

                let filtered = filter_by_scene(records, scene_type, "chairs substation tractor");
                assert!(!filtered.is_empty());

                if SceneKeywords::default().is_indoor(scene_type) {
                    for r in &filtered {
                        assert!(!SceneKeywords::default().is_outdoor_category(&r.category));
                    }
                }
            }
        }

        assert_eq!(filter_by_scene(Vec::new(), "indoor_office", "").len(), 1);
    }
}
