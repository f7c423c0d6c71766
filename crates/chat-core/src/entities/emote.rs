//! Emote entity - custom guild emoji usable as a reaction

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::value_objects::Snowflake;

/// Custom emote
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Emote {
    pub id: Snowflake,
    pub name: String,
    #[serde(default)]
    pub animated: bool,
}

impl Emote {
    pub fn new(id: Snowflake, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            animated: false,
        }
    }

    /// Reaction code used in reaction routes (`name:id`)
    pub fn reaction_code(&self) -> String {
        format!("{}:{}", self.name, self.id)
    }
}

impl fmt::Display for Emote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<:{}:{}>", self.name, self.id)
    }
}
