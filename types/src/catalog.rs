//! Works, episodes and visual styles.

use crate::id::EntityId;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A visual style applied to generated imagery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Style {
    pub id: EntityId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Relative path of the reference image
    #[serde(default)]
    pub image: Option<String>,
    /// Fields this client does not model, preserved as received
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A creative work (a comic or video series).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Work {
    pub id: EntityId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub style_id: Option<EntityId>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One episode of a work.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Episode {
    pub id: EntityId,
    #[serde(default)]
    pub work_id: Option<EntityId>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub episode_number: Option<u32>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
