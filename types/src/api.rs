//! Request bodies of the JSON endpoints.

use crate::id::EntityId;
use serde::{Deserialize, Serialize};

// ============================================================================
// Catalog
// ============================================================================

/// Request body to create or update a work.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkRequest {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style_id: Option<EntityId>,
}

/// Request body to create or update an episode.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EpisodeRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub work_id: Option<EntityId>,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub episode_number: Option<u32>,
}

// ============================================================================
// Content generation
// ============================================================================

/// Request body of the script generation endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerateScriptRequest {
    pub prompt: String,
}
