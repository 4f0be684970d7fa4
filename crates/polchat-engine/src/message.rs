//! Conversation messages.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Greeting seeded into every new session.
pub const DEFAULT_GREETING: &str = "Hello! Select a policy above and ask your question.";

/// Assistant reply used when the response cannot be interpreted.
pub const FALLBACK_REPLY: &str = "No answer returned.";

/// Assistant reply used when the request itself fails.
pub const APOLOGY_REPLY: &str = "Sorry, sending your message failed. Please try again.";

/// Role of a message author.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The person using the client.
    User,
    /// The backend.
    Assistant,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::User => write!(f, "user"),
            Self::Assistant => write!(f, "assistant"),
        }
    }
}

/// A single message in the conversation.
///
/// Messages are never edited after they are appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Role of the message author.
    pub role: Role,
    /// Message text.
    pub text: String,
    /// Category active when a user message was submitted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// When the message was appended.
    pub timestamp: DateTime<Utc>,
}

impl Message {
    /// Create a user message tagged with its category.
    pub fn user(text: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
            category: Some(category.into()),
            timestamp: Utc::now(),
        }
    }

    /// Create an assistant message.
    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            text: text.into(),
            category: None,
            timestamp: Utc::now(),
        }
    }

    /// Whether this message came from the assistant.
    pub fn is_assistant(&self) -> bool {
        self.role == Role::Assistant
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_creation() {
        let user = Message::user("What is PII?", "Definitions & Concepts");
        assert_eq!(user.role, Role::User);
        assert_eq!(user.category.as_deref(), Some("Definitions & Concepts"));
        assert!(!user.is_assistant());

        let reply = Message::assistant("Personal data.");
        assert_eq!(reply.role, Role::Assistant);
        assert!(reply.category.is_none());
        assert!(reply.is_assistant());
    }

    #[test]
    fn test_role_serializes_lowercase() {
        let json = serde_json::to_string(&Message::assistant("hi")).unwrap();
        assert!(json.contains(r#""role":"assistant""#));
        assert!(!json.contains("category"));
    }
}
