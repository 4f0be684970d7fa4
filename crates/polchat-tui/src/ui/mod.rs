//! UI components for the polchat TUI.

pub mod layout;
pub mod theme;
pub mod widgets;

pub use layout::*;
