use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One transcript entry.
///
/// `id` is unique per message; transcript order is generation order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: String,
    pub role: Role,
    pub content: String,
    /// ISO-8601, UTC.
    pub timestamp: String,
}

impl ChatMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role,
            content: content.into(),
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }
}

/// Where the conversation is in its request cycle.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatPhase {
    #[default]
    Idle,
    /// Request sent, no response bytes yet.
    Sending,
    /// Response body is being read.
    Streaming,
}

impl ChatPhase {
    pub fn is_busy(self) -> bool {
        !matches!(self, ChatPhase::Idle)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ChatPhase::Idle => "idle",
            ChatPhase::Sending => "sending",
            ChatPhase::Streaming => "streaming",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique_and_timestamps_parse() {
        let a = ChatMessage::user("a");
        let b = ChatMessage::user("a");
        assert_ne!(a.id, b.id);
        assert!(chrono::DateTime::parse_from_rfc3339(&a.timestamp).is_ok());
        assert!(a.timestamp.ends_with('Z'));
    }

    #[test]
    fn serializes_role_lowercase() {
        let m = ChatMessage::assistant("hi");
        let v = serde_json::to_value(&m).unwrap();
        assert_eq!(v["role"], "assistant");
        assert_eq!(v["content"], "hi");
    }

    #[test]
    fn only_idle_is_not_busy() {
        assert!(!ChatPhase::Idle.is_busy());
        assert!(ChatPhase::Sending.is_busy());
        assert!(ChatPhase::Streaming.is_busy());
        assert_eq!(ChatPhase::Streaming.as_str(), "streaming");
    }
}
