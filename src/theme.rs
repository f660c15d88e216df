//! Centralized theme and styling for the survey TUI
//!
//! Every color and style the screens use is defined here.
//!
//! # Usage
//! ```rust
//! use modsurvey::theme::{Colors, Styles, Theme, StepStatus};
//! use ratatui::style::Style;
//!
//! let style = Style::default().fg(Colors::PRIMARY);
//! let title_style = Styles::title();
//! let step_style = Theme::step_style(StepStatus::Active);
//! ```

use ratatui::style::{Color, Modifier, Style};

// =============================================================================
// COLOR PALETTE
// =============================================================================

/// Core color palette for the application
pub struct Colors;

impl Colors {
    // -------------------------------------------------------------------------
    // Base Colors
    // -------------------------------------------------------------------------

    /// Primary dark background
    pub const BG_PRIMARY: Color = Color::Rgb(20, 20, 30);

    /// Default foreground text color
    pub const FG_PRIMARY: Color = Color::White;

    /// Secondary/muted text color
    pub const FG_SECONDARY: Color = Color::Gray;

    /// Disabled/inactive text color
    pub const FG_MUTED: Color = Color::DarkGray;

    // -------------------------------------------------------------------------
    // Accent Colors
    // -------------------------------------------------------------------------

    /// Borders, titles, focused input
    pub const PRIMARY: Color = Color::Cyan;

    /// Major modules, emphasis
    pub const SECONDARY: Color = Color::Yellow;

    // -------------------------------------------------------------------------
    // Semantic Colors
    // -------------------------------------------------------------------------

    pub const SUCCESS: Color = Color::Green;
    pub const WARNING: Color = Color::Yellow;
    pub const ERROR: Color = Color::Red;

    // -------------------------------------------------------------------------
    // UI Element Colors
    // -------------------------------------------------------------------------

    pub const BORDER_ACTIVE: Color = Color::Cyan;
    pub const BORDER_INACTIVE: Color = Color::DarkGray;

    /// Cursor row highlight
    pub const SELECTED_BG: Color = Color::Yellow;

    /// Cursor row text (for contrast on yellow bg)
    pub const SELECTED_FG: Color = Color::Black;

    /// Ticked checkbox mark
    pub const CHECKED: Color = Color::LightGreen;

    pub const NAV_HINT: Color = Color::DarkGray;

    // -------------------------------------------------------------------------
    // Step Indicator Colors
    // -------------------------------------------------------------------------

    pub const STEP_ACTIVE: Color = Color::Yellow;
    pub const STEP_COMPLETE: Color = Color::Green;
    pub const STEP_PENDING: Color = Color::Gray;
}

// =============================================================================
// PRE-BUILT STYLES
// =============================================================================

/// Pre-built styles for common UI patterns
pub struct Styles;

impl Styles {
    /// Default text style
    pub fn text() -> Style {
        Style::default().fg(Colors::FG_PRIMARY)
    }

    /// Muted text
    pub fn text_muted() -> Style {
        Style::default().fg(Colors::FG_MUTED)
    }

    /// Secondary text (gray)
    pub fn text_secondary() -> Style {
        Style::default().fg(Colors::FG_SECONDARY)
    }

    /// Main title style (cyan, bold)
    pub fn title() -> Style {
        Style::default()
            .fg(Colors::PRIMARY)
            .add_modifier(Modifier::BOLD)
    }

    /// Category header
    pub fn category() -> Style {
        Style::default()
            .fg(Colors::SECONDARY)
            .add_modifier(Modifier::BOLD)
    }

    /// A major module label
    pub fn major_module() -> Style {
        Style::default()
            .fg(Colors::SECONDARY)
            .add_modifier(Modifier::BOLD)
    }

    pub fn border_active() -> Style {
        Style::default().fg(Colors::BORDER_ACTIVE)
    }

    pub fn border_inactive() -> Style {
        Style::default().fg(Colors::BORDER_INACTIVE)
    }

    pub fn panel_bg() -> Style {
        Style::default().bg(Colors::BG_PRIMARY)
    }

    /// Row under the cursor
    pub fn selected() -> Style {
        Style::default()
            .fg(Colors::SELECTED_FG)
            .bg(Colors::SELECTED_BG)
            .add_modifier(Modifier::BOLD)
    }

    pub fn checked() -> Style {
        Style::default()
            .fg(Colors::CHECKED)
            .add_modifier(Modifier::BOLD)
    }

    pub fn success() -> Style {
        Style::default().fg(Colors::SUCCESS)
    }

    pub fn warning() -> Style {
        Style::default().fg(Colors::WARNING)
    }

    pub fn error() -> Style {
        Style::default().fg(Colors::ERROR)
    }

    pub fn nav_hint() -> Style {
        Style::default().fg(Colors::NAV_HINT)
    }
}

// =============================================================================
// SEMANTIC LOOKUPS
// =============================================================================

/// Position of a step relative to the current one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepStatus {
    Complete,
    Active,
    Pending,
}

/// Feedback line severity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Success,
    Error,
}

/// Semantic style lookups
pub struct Theme;

impl Theme {
    pub fn step_style(status: StepStatus) -> Style {
        match status {
            StepStatus::Complete => Style::default().fg(Colors::STEP_COMPLETE),
            StepStatus::Active => Style::default()
                .fg(Colors::STEP_ACTIVE)
                .add_modifier(Modifier::BOLD),
            StepStatus::Pending => Style::default().fg(Colors::STEP_PENDING),
        }
    }

    pub fn message_style(kind: MessageKind) -> Style {
        match kind {
            MessageKind::Success => Styles::success().add_modifier(Modifier::BOLD),
            MessageKind::Error => Styles::error().add_modifier(Modifier::BOLD),
        }
    }

    /// Count line color: green once the option's rule is met
    pub fn requirement_style(satisfied: bool) -> Style {
        if satisfied {
            Styles::success()
        } else {
            Styles::warning()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_styles_differ() {
        assert_ne!(
            Theme::step_style(StepStatus::Active),
            Theme::step_style(StepStatus::Pending)
        );
        assert_eq!(
            Theme::step_style(StepStatus::Complete).fg,
            Some(Colors::STEP_COMPLETE)
        );
    }

    #[test]
    fn test_requirement_style() {
        assert_eq!(Theme::requirement_style(true).fg, Some(Colors::SUCCESS));
        assert_eq!(Theme::requirement_style(false).fg, Some(Colors::WARNING));
    }
}
