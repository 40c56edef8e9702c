use crate::error::NotifyError;
use async_trait::async_trait;
use serde::Serialize;
use std::fmt::Display;

/// Where a notification comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Origin {
    Frontend,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Info,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Component,
}

impl Origin {
    pub fn as_str(&self) -> &'static str {
        match self {
            Origin::Frontend => "frontend",
        }
    }
}

impl Level {
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Info => "info",
            Level::Error => "error",
        }
    }
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Component => "component",
        }
    }
}

impl Display for Origin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A log line describing something the engine did, bound for an external sink.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub origin: Origin,
    pub level: Level,
    pub category: Category,
    pub message: String,
    /// Bearer token for the remote logger.
    #[serde(skip)]
    pub token: String,
}

impl Notification {
    pub fn new(level: Level, message: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            origin: Origin::Frontend,
            level,
            category: Category::Component,
            message: message.into(),
            token: token.into(),
        }
    }
}

impl std::fmt::Debug for Notification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Notification")
            .field("origin", &self.origin)
            .field("level", &self.level)
            .field("category", &self.category)
            .field("message", &self.message)
            .field("token", &"<redacted>")
            .finish()
    }
}

/// Receives notifications emitted by the engine.
///
/// Delivery is best effort: the engine never waits on a sink and ignores
/// any error it returns.
#[async_trait]
pub trait NotificationSink: Send + Sync + 'static {
    async fn deliver(&self, notification: &Notification) -> Result<(), NotifyError>;
}
