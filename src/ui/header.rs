//! Header, step indicator and common widget rendering

use ratatui::{
    Frame,
    layout::{Alignment, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
};

use crate::app::AppState;
use crate::theme::{Styles, StepStatus, Theme};
use crate::wizard::WizardStep;

/// Survey title and the active store
pub fn render_header(f: &mut Frame, area: Rect, state: &AppState) {
    let lines = vec![
        Line::from(Span::styled("MMESA Phase 2 Module Selection Survey", Styles::title())),
        Line::from(Span::styled(
            format!(
                "Store: {}   Submitted this session: {}",
                state.store_label, state.submitted_count
            ),
            Styles::text_muted(),
        )),
    ];

    let header = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::BOTTOM)
                .border_style(Styles::border_inactive()),
        );
    f.render_widget(header, area);
}

fn step_status(step: WizardStep, current: WizardStep) -> StepStatus {
    use std::cmp::Ordering;
    match step.step_number().cmp(&current.step_number()) {
        Ordering::Less => StepStatus::Complete,
        Ordering::Equal => StepStatus::Active,
        Ordering::Greater => StepStatus::Pending,
    }
}

/// `1 Personal Information > 2 Module Option > ...`
pub fn render_step_indicator(f: &mut Frame, area: Rect, current: WizardStep) {
    let mut spans = Vec::new();
    for step in WizardStep::all() {
        if step.step_number() > 1 {
            spans.push(Span::styled("  >  ", Styles::text_muted()));
        }
        let status = step_status(step, current);
        let marker = if status == StepStatus::Complete {
            "✓".to_string()
        } else {
            step.step_number().to_string()
        };
        spans.push(Span::styled(
            format!("{} {}", marker, step.title()),
            Theme::step_style(status),
        ));
    }

    let indicator = Paragraph::new(Line::from(spans)).alignment(Alignment::Center);
    f.render_widget(indicator, area);
}

/// Feedback line: last error or success
pub fn render_message(f: &mut Frame, area: Rect, state: &AppState) {
    let Some((kind, text)) = &state.message else {
        return;
    };
    let message = Paragraph::new(format!("  {}", text))
        .style(Theme::message_style(*kind))
        .wrap(Wrap { trim: true });
    f.render_widget(message, area);
}

/// Key hints for the current step
pub fn render_nav_bar(f: &mut Frame, area: Rect, step: WizardStep) {
    let hints: &[(&str, &str)] = match step {
        WizardStep::Personal => &[
            ("Tab/↑↓", "Field"),
            ("←→", "Year"),
            ("Enter", "Next"),
            ("Ctrl-C", "Quit"),
        ],
        WizardStep::Option => &[
            ("↑↓", "Move"),
            ("Enter", "Choose & next"),
            ("Esc", "Back"),
            ("Ctrl-C", "Quit"),
        ],
        WizardStep::Modules => &[
            ("↑↓", "Move"),
            ("Space", "Toggle"),
            ("Enter", "Review"),
            ("Esc", "Back"),
            ("Ctrl-C", "Quit"),
        ],
        WizardStep::Review => &[
            ("Type", "Additional courses"),
            ("Enter", "Submit"),
            ("Esc", "Back"),
            ("Ctrl-C", "Quit"),
        ],
    };

    let mut spans = Vec::new();
    for (key, action) in hints {
        spans.push(Span::styled(format!(" [{}] ", key), Styles::title()));
        spans.push(Span::styled(format!("{} ", action), Styles::nav_hint()));
    }

    let nav = Paragraph::new(Line::from(spans)).alignment(Alignment::Center);
    f.render_widget(nav, area);
}
