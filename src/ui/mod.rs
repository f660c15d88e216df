//! User interface rendering module
//!
//! - `header` - title, step indicator, feedback line and key hints
//! - `screens` - one screen per wizard step

mod header;
pub mod screens;

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout},
};

use crate::app::AppState;
use crate::theme::Styles;
use crate::wizard::WizardStep;

/// Render the complete UI for the current wizard step
pub fn render(f: &mut Frame, state: &AppState) {
    f.render_widget(
        ratatui::widgets::Block::default().style(Styles::panel_bg()),
        f.area(),
    );

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Length(1), // Step indicator
            Constraint::Min(8),    // Step content
            Constraint::Length(2), // Feedback
            Constraint::Length(1), // Navigation bar
        ])
        .split(f.area());

    let step = state.wizard.step();

    header::render_header(f, chunks[0], state);
    header::render_step_indicator(f, chunks[1], step);

    match step {
        WizardStep::Personal => screens::render_personal_screen(f, chunks[2], state),
        WizardStep::Option => screens::render_option_screen(f, chunks[2], state),
        WizardStep::Modules => screens::render_modules_screen(f, chunks[2], state),
        WizardStep::Review => screens::render_review_screen(f, chunks[2], state),
    }

    header::render_message(f, chunks[3], state);
    header::render_nav_bar(f, chunks[4], step);
}
