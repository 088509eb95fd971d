//! Activity feed entries.

use serde::{Deserialize, Serialize};

use super::required_text;
use crate::errors::AppError;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ActivityType {
    Resource,
    Camp,
    Alert,
    User,
    Info,
}

impl ActivityType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityType::Resource => "resource",
            ActivityType::Camp => "camp",
            ActivityType::Alert => "alert",
            ActivityType::User => "user",
            ActivityType::Info => "info",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "resource" => Some(ActivityType::Resource),
            "camp" => Some(ActivityType::Camp),
            "alert" => Some(ActivityType::Alert),
            "user" => Some(ActivityType::User),
            "info" => Some(ActivityType::Info),
            _ => None,
        }
    }
}

/// One line of the activity feed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    pub id: i64,
    pub message: String,
    #[serde(rename = "type")]
    pub activity_type: ActivityType,
    pub timestamp: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// Activity waiting to be appended.
#[derive(Debug, Clone, PartialEq)]
pub struct NewActivity {
    pub message: String,
    pub activity_type: ActivityType,
    pub details: Option<serde_json::Value>,
}

impl NewActivity {
    pub fn new(activity_type: ActivityType, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            activity_type,
            details: None,
        }
    }

    /// Attach a serialized snapshot of the entity the entry is about.
    pub fn with_details<T: Serialize>(mut self, details: &T) -> Self {
        self.details = match serde_json::to_value(details) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!("Dropping activity details for '{}': {}", self.message, e);
                None
            }
        };
        self
    }
}

/// Request body for client-originated feed entries.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateActivityRequest {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default, rename = "type")]
    pub activity_type: Option<String>,
    #[serde(default)]
    pub details: Option<serde_json::Value>,
}

impl CreateActivityRequest {
    pub fn validate(self) -> Result<NewActivity, AppError> {
        let message =
            required_text(&self.message).ok_or_else(|| AppError::validation("Message is required"))?;
        let activity_type = match required_text(&self.activity_type) {
            Some(raw) => ActivityType::from_str(&raw)
                .ok_or_else(|| AppError::Validation(format!("Invalid activity type: {}", raw)))?,
            None => ActivityType::Info,
        };
        Ok(NewActivity {
            message,
            activity_type,
            details: self.details,
        })
    }
}

/// Query parameters for the feed.
#[derive(Debug, Default, Deserialize)]
pub struct ActivityQuery {
    #[serde(default)]
    pub limit: Option<i64>,
}
