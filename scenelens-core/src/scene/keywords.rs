use serde::{Deserialize, Serialize};

use crate::consts::{INDOOR_SCENES, OUTDOOR_KEYWORDS, OUTDOOR_ONLY_CATEGORIES};

/// Keyword data driving the scene consistency filter.
///
/// Kept as plain lists so deployments can tune them from the config file.
/// Matching is case-insensitive throughout.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneKeywords {
    pub indoor_scenes: Vec<String>,
    pub outdoor_only_categories: Vec<String>,
    pub outdoor_keywords: Vec<String>,
}

impl Default for SceneKeywords {
    fn default() -> Self {
        let owned = |list: &[&str]| list.iter().map(|s| s.to_string()).collect();
        Self {
            indoor_scenes: owned(INDOOR_SCENES),
            outdoor_only_categories: owned(OUTDOOR_ONLY_CATEGORIES),
            outdoor_keywords: owned(OUTDOOR_KEYWORDS),
        }
    }
}

impl SceneKeywords {
    pub fn is_indoor(&self, scene_type: &str) -> bool {
        let scene_type = scene_type.trim();
        self.indoor_scenes
            .iter()
            .any(|s| s.eq_ignore_ascii_case(scene_type))
    }

    pub fn is_outdoor_category(&self, category: &str) -> bool {
        let category = category.trim();
        self.outdoor_only_categories
            .iter()
            .any(|c| c.eq_ignore_ascii_case(category))
    }

    /// First outdoor keyword found in any of `texts`.
    pub fn find_outdoor_keyword(&self, texts: &[&str]) -> Option<&str> {
        let lowered: Vec<String> = texts.iter().map(|t| t.to_lowercase()).collect();
        self.outdoor_keywords
            .iter()
            .find(|keyword| {
                let keyword = keyword.to_lowercase();
                lowered.iter().any(|text| text.contains(&keyword))
            })
            .map(String::as_str)
    }
}
