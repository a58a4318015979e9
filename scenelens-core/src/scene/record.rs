use serde::{Deserialize, Serialize};

use crate::consts::{GENERAL_CATEGORY, PLACEHOLDER};

/// One row of the scene inventory, in the single shape every consumer sees.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SceneRecord {
    pub category: String,
    /// Object name, usually with its count embedded (`"3 Office Chairs"`).
    pub object: String,
    pub details: String,
    pub position: String,
    pub estimated_cost: String,
}

impl SceneRecord {
    pub fn new(
        category: impl Into<String>,
        object: impl Into<String>,
        details: impl Into<String>,
        position: impl Into<String>,
        estimated_cost: impl Into<String>,
    ) -> Self {
        Self {
            category: category.into(),
            object: object.into(),
            details: details.into(),
            position: position.into(),
            estimated_cost: estimated_cost.into(),
        }
    }

    /// A `General` record standing in for an empty result.
    pub fn placeholder(object: &str, details: &str) -> Self {
        Self::new(GENERAL_CATEGORY, object, details, PLACEHOLDER, PLACEHOLDER)
    }

    pub fn has_position(&self) -> bool {
        self.position != PLACEHOLDER
    }

    pub fn has_cost(&self) -> bool {
        self.estimated_cost != PLACEHOLDER
    }
}
