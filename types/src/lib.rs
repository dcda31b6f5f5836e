//! Shared types for the comicmaker studio.
//!
//! This crate contains the domain models and API types exchanged with the
//! studio backend.

/// Default API root of a locally running backend.
pub const DEFAULT_API_BASE: &str = "http://127.0.0.1:8000/api";

pub mod api;
pub mod catalog;
pub mod content;
pub mod history;
pub mod id;
pub mod material;
pub mod task;

// Re-export commonly used types
pub use catalog::{Episode, Style, Work};
pub use content::{Script, Shot, ShotPrompts, StoryboardFormat};
pub use history::{HistoryPage, HistoryQuery, HistoryRecord, DEFAULT_HISTORY_LIMIT};
pub use id::EntityId;
pub use material::{Material, MaterialKind, UnknownMaterialKind, MAX_AUX_IMAGES};
pub use task::{Task, TaskCreated, TaskId, TaskStatus, TaskStatusResponse};
