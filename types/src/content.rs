//! Episode content: scripts, storyboards and shots.

use crate::id::EntityId;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Script of an episode together with its timing targets.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Script {
    #[serde(default)]
    pub script: String,
    /// Expected episode duration in seconds
    #[serde(default)]
    pub expected_duration: Option<f64>,
    /// Target duration of a single shot in seconds
    #[serde(default)]
    pub shot_duration: Option<f64>,
}

/// Generation prompts attached to a shot. Absent prompts are left untouched
/// when sent to the backend.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ShotPrompts {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio: Option<String>,
}

impl ShotPrompts {
    pub fn is_empty(&self) -> bool {
        self.image.is_none() && self.video.is_none() && self.audio.is_none()
    }
}

/// A single storyboard shot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shot {
    pub id: EntityId,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image_prompt: Option<String>,
    #[serde(default)]
    pub video_prompt: Option<String>,
    #[serde(default)]
    pub audio_prompt: Option<String>,
    /// Candidate images produced by image generation
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub selected_image: Option<String>,
    #[serde(default)]
    pub video: Option<String>,
    #[serde(default)]
    pub audio: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Storyboard representation requested from the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoryboardFormat {
    Json,
    Text,
}

impl StoryboardFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            StoryboardFormat::Json => "json",
            StoryboardFormat::Text => "text",
        }
    }
}
