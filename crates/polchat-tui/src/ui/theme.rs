//! Theme and styling definitions for the polchat TUI.

use polchat_engine::Phase;
use ratatui::style::{Color, Modifier, Style};

/// Color palette for the TUI.
pub struct Palette;

impl Palette {
    // Base colors
    pub const BG: Color = Color::Rgb(30, 30, 40);
    pub const FG: Color = Color::Rgb(220, 220, 230);
    pub const DIM: Color = Color::Rgb(140, 140, 160);

    // Accent colors
    pub const ACCENT: Color = Color::Rgb(130, 170, 255);
    pub const ACCENT_DIM: Color = Color::Rgb(80, 100, 160);

    // Status bar colors (high contrast)
    pub const STATUS_BG: Color = Color::Rgb(45, 45, 60);
    pub const STATUS_KEY_BG: Color = Color::Rgb(70, 90, 140);

    // Speakers
    pub const USER: Color = Color::Rgb(240, 200, 100);
    pub const ASSISTANT: Color = Color::Rgb(130, 220, 130);

    // Status colors
    pub const WARNING: Color = Color::Rgb(240, 200, 100);
    pub const ERROR: Color = Color::Rgb(240, 100, 100);

    // Border colors
    pub const BORDER: Color = Color::Rgb(80, 80, 100);
    pub const BORDER_ACTIVE: Color = Color::Rgb(130, 170, 255);
}

/// Spinner frames shown while a reply is pending.
pub const SPINNER: [&str; 4] = ["|", "/", "-", "\\"];

/// Common styles used throughout the TUI.
pub struct Styles;

impl Styles {
    /// Default text style.
    pub fn default() -> Style {
        Style::default().fg(Palette::FG).bg(Palette::BG)
    }

    /// Dimmed text for secondary information.
    pub fn dim() -> Style {
        Style::default().fg(Palette::DIM).bg(Palette::BG)
    }

    /// Active/focused element.
    pub fn active() -> Style {
        Style::default().fg(Palette::ACCENT).bg(Palette::BG)
    }

    /// The selected category tab.
    pub fn tab_active() -> Style {
        Style::default()
            .fg(Palette::BG)
            .bg(Palette::ACCENT)
            .add_modifier(Modifier::BOLD)
    }

    /// An unselected category tab.
    pub fn tab_inactive() -> Style {
        Style::default().fg(Palette::FG).bg(Palette::STATUS_BG)
    }

    /// Header line of a user message.
    pub fn user() -> Style {
        Style::default()
            .fg(Palette::USER)
            .bg(Palette::BG)
            .add_modifier(Modifier::BOLD)
    }

    /// Header line of an assistant message.
    pub fn assistant() -> Style {
        Style::default()
            .fg(Palette::ASSISTANT)
            .bg(Palette::BG)
            .add_modifier(Modifier::BOLD)
    }

    /// Category tag on a user message.
    pub fn category_tag() -> Style {
        Style::default().fg(Palette::BG).bg(Palette::ACCENT_DIM)
    }

    /// Attachment badge.
    pub fn badge() -> Style {
        Style::default().fg(Palette::FG).bg(Palette::ACCENT_DIM)
    }

    /// Attachment badge under the selection cursor.
    pub fn badge_selected() -> Style {
        Style::default()
            .fg(Palette::BG)
            .bg(Palette::WARNING)
            .add_modifier(Modifier::BOLD)
    }

    /// Error status.
    pub fn error() -> Style {
        Style::default().fg(Palette::ERROR).bg(Palette::BG)
    }

    /// Title style.
    pub fn title() -> Style {
        Style::default()
            .fg(Palette::ACCENT)
            .add_modifier(Modifier::BOLD)
    }

    /// Key hint style (for status bar) - bright on dark for visibility.
    pub fn key_hint() -> Style {
        Style::default()
            .fg(Palette::FG)
            .bg(Palette::STATUS_KEY_BG)
            .add_modifier(Modifier::BOLD)
    }

    /// Key hint label style - readable on status bar background.
    pub fn key_label() -> Style {
        Style::default().fg(Palette::FG).bg(Palette::STATUS_BG)
    }

    /// Status bar background style.
    pub fn status_bar() -> Style {
        Style::default().fg(Palette::FG).bg(Palette::STATUS_BG)
    }

    /// Border style for inactive elements.
    pub fn border() -> Style {
        Style::default().fg(Palette::BORDER)
    }

    /// Border style for active/focused elements.
    pub fn border_active() -> Style {
        Style::default().fg(Palette::BORDER_ACTIVE)
    }

    /// Badge color for the controller phase in the status bar.
    pub fn phase(phase: Phase) -> Style {
        let bg = match phase {
            Phase::Idle => Palette::ACCENT,
            Phase::Sending => Palette::WARNING,
            Phase::Error => Palette::ERROR,
        };
        Style::default()
            .fg(Palette::BG)
            .bg(bg)
            .add_modifier(Modifier::BOLD)
    }
}

/// Spinner frame for a tick counter.
pub fn spinner_frame(tick: u64) -> &'static str {
    #[allow(clippy::cast_possible_truncation)]
    SPINNER[(tick % SPINNER.len() as u64) as usize]
}
