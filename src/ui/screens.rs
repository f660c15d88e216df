//! Survey wizard screens, one per step.

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
};
use strum::IntoEnumIterator;

use crate::app::{AppState, ChecklistItem, PersonalField};
use crate::flatten::join_list;
use crate::rules::{self, OptionRule};
use crate::theme::{Styles, Theme};
use crate::types::SelectedOption;

fn panel(title: &str) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(Styles::border_active())
        .title(format!(" {} ", title))
        .title_style(Styles::category())
}

// ============================================================================
// Step 1: Personal Information
// ============================================================================

pub fn render_personal_screen(f: &mut Frame, area: Rect, state: &AppState) {
    let fields = PersonalField::all();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints(
            fields
                .iter()
                .map(|_| Constraint::Length(3))
                .chain(std::iter::once(Constraint::Min(0))),
        )
        .split(area);

    for (i, field) in fields.iter().enumerate() {
        let is_current = i == state.personal_field;
        let value = state.field_value(*field);

        let shown = if field.is_choice() {
            if value.is_empty() {
                "< select year >".to_string()
            } else {
                format!("< {} >", value)
            }
        } else if is_current {
            format!("{}_", value)
        } else {
            value
        };

        let (label_style, border_style) = if is_current {
            (Styles::title(), Styles::border_active())
        } else {
            (Styles::text_secondary(), Styles::border_inactive())
        };

        let widget = Paragraph::new(format!("  {}", shown))
            .style(Styles::text())
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(border_style)
                    .title(Span::styled(format!(" {} * ", field.label()), label_style)),
            );
        f.render_widget(widget, chunks[i]);
    }
}

// ============================================================================
// Step 2: Module Option
// ============================================================================

pub fn render_option_screen(f: &mut Frame, area: Rect, state: &AppState) {
    let chosen = state.wizard.option();

    let items: Vec<ListItem> = SelectedOption::iter()
        .map(|option| {
            let radio = if chosen == Some(option) { "(•)" } else { "( )" };
            ListItem::new(vec![
                Line::from(vec![
                    Span::styled(format!(" {} ", radio), Styles::checked()),
                    Span::styled(format!("{}: ", option), Styles::text().add_modifier(Modifier::BOLD)),
                    Span::styled(option.label(), Styles::text()),
                ]),
                Line::from(Span::styled(
                    format!("       requires {}", option.requirement()),
                    Styles::text_muted(),
                )),
            ])
        })
        .collect();

    let list = List::new(items)
        .block(panel("Choose your module selection option"))
        .highlight_style(Styles::selected());

    let mut list_state = ListState::default();
    list_state.select(Some(state.option_cursor));
    f.render_stateful_widget(list, area, &mut list_state);
}

// ============================================================================
// Step 3: Module Selection
// ============================================================================

fn requirement_line(state: &AppState) -> Line<'static> {
    let counts = state.wizard.counts();
    let Some(option) = state.wizard.option() else {
        return Line::from(Span::styled("No option selected", Styles::error()));
    };
    let satisfied = OptionRule::for_option(option).accepts(&counts);

    Line::from(vec![
        Span::styled(format!("{}: ", option), Styles::title()),
        Span::styled(option.requirement().to_string(), Styles::text()),
        Span::raw("  |  "),
        Span::styled(
            format!("{} (total {})", counts, counts.total()),
            Theme::requirement_style(satisfied),
        ),
    ])
}

pub fn render_modules_screen(f: &mut Frame, area: Rect, state: &AppState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(5)])
        .split(area);

    let summary = Paragraph::new(requirement_line(state)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Styles::border_inactive()),
    );
    f.render_widget(summary, chunks[0]);

    let mut items = Vec::with_capacity(state.items.len());
    let mut last_group: Option<Option<usize>> = None;
    let mut cursor_row = 0;

    for (i, item) in state.items.iter().enumerate() {
        let group = match item {
            ChecklistItem::Module { category, .. } => Some(*category),
            ChecklistItem::Software(_) => None,
        };
        if last_group != Some(group) {
            let title = match group {
                Some(number) => state
                    .catalog
                    .category(number)
                    .map(|c| format!("Category {}: {}", number, c.title))
                    .unwrap_or_else(|| format!("Category {}", number)),
                None => "Software".to_string(),
            };
            items.push(ListItem::new(Line::from(Span::styled(title, Styles::category()))));
            last_group = Some(group);
        }

        if i == state.module_cursor {
            cursor_row = items.len();
        }

        let checked = item.is_checked(&state.wizard);
        let mark = if checked { "[x]" } else { "[ ]" };
        let label_style = if item.is_major() {
            Styles::major_module()
        } else {
            Styles::text()
        };
        let mark_style = if checked {
            Styles::checked()
        } else {
            Styles::text_muted()
        };

        items.push(ListItem::new(Line::from(vec![
            Span::styled(format!("  {} ", mark), mark_style),
            Span::styled(item.label().to_string(), label_style),
        ])));
    }

    let list = List::new(items)
        .block(panel("Modules (* marks the major module)"))
        .highlight_style(Styles::selected());

    let mut list_state = ListState::default();
    list_state.select(Some(cursor_row));
    f.render_stateful_widget(list, chunks[1], &mut list_state);
}

// ============================================================================
// Step 4: Review & Submit
// ============================================================================

pub fn render_review_screen(f: &mut Frame, area: Rect, state: &AppState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(8), Constraint::Length(5)])
        .split(area);

    let wizard = &state.wizard;
    let personal = &wizard.personal;
    let row = |label: &str, value: String| {
        Line::from(vec![
            Span::styled(format!("  {:<16}", label), Styles::text_secondary()),
            Span::styled(value, Styles::text()),
        ])
    };

    let mut lines = vec![
        row("Email:", personal.email.trim().to_string()),
        row("Index Number:", personal.index_number.trim().to_string()),
        row(
            "Year of Study:",
            personal
                .year_of_study
                .map(|y| y.to_string())
                .unwrap_or_default(),
        ),
        row("Phone Number:", personal.phone_number.trim().to_string()),
        row(
            "Option:",
            wizard.option().map(|o| o.to_string()).unwrap_or_default(),
        ),
        row(
            "Selection:",
            rules::count_selections(wizard.selections()).to_string(),
        ),
        Line::from(""),
    ];

    for (number, list) in wizard.selections().categories() {
        if !list.is_empty() {
            lines.push(row(&format!("Category {}:", number), join_list(list)));
        }
    }
    if !wizard.selections().software().is_empty() {
        lines.push(row("Software:", join_list(wizard.selections().software())));
    }

    let summary = Paragraph::new(lines)
        .block(panel("Review your answers"))
        .wrap(Wrap { trim: false });
    f.render_widget(summary, chunks[0]);

    let courses = Paragraph::new(format!("  {}_", wizard.additional_courses))
        .style(Styles::text())
        .wrap(Wrap { trim: false })
        .block(panel("Additional courses you would like offered (optional)"));
    f.render_widget(courses, chunks[1]);
}
