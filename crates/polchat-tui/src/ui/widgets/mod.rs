//! Custom widgets for the polchat TUI.

pub mod attachments;
pub mod message_list;
pub mod status_bar;
pub mod tabs;
pub mod text_input;

pub use attachments::AttachmentBadges;
pub use message_list::MessageList;
pub use status_bar::{KeyHint, StatusBar};
pub use tabs::CategoryTabs;
pub use text_input::{TextInput, TextInputState};
