// ── User-visible notifications ──
//
// Produced by the delete flow and the console's error policy; rendered
// as a toast by the TUI and as a status line by the CLI.

use std::fmt;

use serde::Serialize;
use strum::Display;

use crate::model::ResourceKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum NotificationLevel {
    Success,
    Error,
    Info,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub level: NotificationLevel,
    pub title: String,
    pub message: String,
}

impl Notification {
    pub fn success(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Success,
            title: title.into(),
            message: message.into(),
        }
    }

    pub fn error(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Error,
            title: title.into(),
            message: message.into(),
        }
    }

    pub fn info(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Info,
            title: title.into(),
            message: message.into(),
        }
    }

    // ── Delete flow texts ──

    pub fn deleted(kind: ResourceKind) -> Self {
        Self::success("Deleted!", format!("The {kind} has been deleted."))
    }

    pub fn delete_failed(kind: ResourceKind) -> Self {
        Self::error("Error!", format!("There was an issue deleting the {kind}."))
    }

    pub fn self_delete_refused() -> Self {
        Self::error("Not allowed", "You cannot delete your own account.")
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.title, self.message)
    }
}

/// Text of the confirmation step guarding a destructive action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmPrompt {
    pub title: &'static str,
    pub text: &'static str,
    pub confirm_label: &'static str,
    pub cancel_label: &'static str,
    /// What is about to be deleted, e.g. `product "Kopi"`.
    pub subject: String,
}

impl ConfirmPrompt {
    pub fn delete(kind: ResourceKind, label: &str) -> Self {
        Self {
            title: "Are you sure?",
            text: "This action cannot be undone!",
            confirm_label: "Yes, delete it!",
            cancel_label: "No, cancel!",
            subject: format!("{kind} \"{label}\""),
        }
    }
}

impl fmt::Display for ConfirmPrompt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} Delete {}? {}", self.title, self.subject, self.text)
    }
}
