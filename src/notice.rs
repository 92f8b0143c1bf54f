//! Transient user notices

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::TripSyncError;

/// How long the page keeps a notice on screen
pub const NOTICE_DISPLAY_TIME: Duration = Duration::from_secs(3);

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Success,
    Warning,
    Error,
}

/// A short message shown to the user after an operation
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
    pub display_ms: u64,
}

impl Notice {
    fn new(level: NoticeLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            display_ms: NOTICE_DISPLAY_TIME.as_millis() as u64,
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Success, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Warning, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Error, message)
    }
}

impl From<&TripSyncError> for Notice {
    fn from(err: &TripSyncError) -> Self {
        Self::error(err.user_message())
    }
}
