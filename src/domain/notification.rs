use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Error,
    Success,
    Warning,
    Info,
}

impl NotificationKind {
    pub fn title(self) -> &'static str {
        match self {
            NotificationKind::Error => "Error",
            NotificationKind::Success => "Success",
            NotificationKind::Warning => "Warning",
            NotificationKind::Info => "Information",
        }
    }
}

pub type NotificationId = u64;

/// A transient toast as handed to the surface that renders it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub id: NotificationId,
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
}
