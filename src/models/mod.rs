//! Data models for the relief coordination backend.
//!
//! Field names serialize in camelCase to match what the map frontend reads.

mod activity;
mod alert;
mod camp;
mod dashboard;
mod resource;
mod user;

pub use activity::*;
pub use alert::*;
pub use camp::*;
pub use dashboard::*;
pub use resource::*;
pub use user::*;

use serde::Serialize;

/// Plain acknowledgement body.
#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Trimmed value of a required text field, `None` when missing or blank.
pub(crate) fn required_text(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
