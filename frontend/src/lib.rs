//! Comicmaker studio client library.
//!
//! Page controllers and widgets for the studio, kept free of any UI toolkit:
//! controllers expose plain operations that return data and state, and a thin
//! adapter (the `comicmaker` binary) binds them to a user interface.

#![warn(clippy::all, rust_2018_idioms)]

pub mod actions;
pub mod api;
pub mod clipboard;
pub mod config;
pub mod editor;
pub mod materials;
pub mod media_capture;
pub mod notify;
pub mod router;
pub mod tasks;

pub use api::{ApiClient, ApiError, ApiResult, FormPayload, RequestBody, ResponseEnvelope};
pub use config::Config;
pub use materials::MaterialsPage;
pub use media_capture::{CaptureOptions, MediaCapture, StagedFile};
pub use notify::{Dialogs, Notification, NotificationLevel};
pub use router::Route;
pub use tasks::{PollPolicy, TaskError, TaskPoller};
