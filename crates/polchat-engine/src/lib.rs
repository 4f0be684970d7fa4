//! polchat-engine: Headless engine for the polchat policy chat client
//!
//! This crate provides the core logic for polchat, including:
//! - Category tabs and selection state
//! - The session state machine (optimistic append, reconcile on reply)
//! - Reply parsing and the multipart HTTP transport
//! - Configuration loading

pub mod attachment;
pub mod category;
pub mod client;
pub mod config;
pub mod controller;
pub mod message;
pub mod reply;
pub mod session;

// Re-export commonly used types
pub use attachment::{Attachment, AttachmentError};
pub use category::{Categories, CategoryError, TabSelector, DEFAULT_CATEGORIES};
pub use client::{HttpTransport, Transport, TransportError};
pub use config::{Config, ConfigError, BACKEND_URL_ENV, DEFAULT_CONFIG_PATH};
pub use controller::{complete, Controller};
pub use message::{Message, Role, APOLOGY_REPLY, DEFAULT_GREETING, FALLBACK_REPLY};
pub use reply::{parse_reply, ReplyError};
pub use session::{
    reduce, Effect, Phase, RequestStatus, SessionError, SessionEvent, SessionState, SubmitRequest,
};

/// Returns the engine version.
pub fn engine_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
