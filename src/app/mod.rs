//! Application module
//!
//! Drives the survey wizard from terminal key events and hands finished
//! forms to the configured store.

mod state;

pub use state::{AppState, ChecklistItem, PersonalField};

use std::io::Stdout;
use std::time::Duration;

use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{Terminal, backend::CrosstermBackend};
use strum::IntoEnumIterator;
use tracing::{error, info};

use crate::catalog::Catalog;
use crate::store::ResponseStore;
use crate::submission::{self, AdmissionPolicy};
use crate::theme::MessageKind;
use crate::types::SelectedOption;
use crate::ui;
use crate::wizard::WizardStep;

/// Main application
pub struct App {
    state: AppState,
    store: Box<dyn ResponseStore>,
    policy: AdmissionPolicy,
}

impl App {
    pub fn new(
        store: Box<dyn ResponseStore>,
        catalog: Catalog,
        policy: AdmissionPolicy,
        store_label: impl Into<String>,
    ) -> Self {
        Self {
            state: AppState::new(catalog, store_label),
            store,
            policy,
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Run the main application loop
    pub fn run(&mut self, terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> anyhow::Result<()> {
        info!("Starting survey wizard");

        loop {
            terminal.draw(|f| ui::render(f, &self.state))?;

            if crossterm::event::poll(Duration::from_millis(100))? {
                if let Event::Key(key_event) = crossterm::event::read()? {
                    // Ignore release/repeat events reported on some platforms
                    if key_event.kind != KeyEventKind::Press {
                        continue;
                    }
                    if self.handle_key_event(key_event) {
                        break;
                    }
                }
            }
        }

        info!(
            submitted = self.state.submitted_count,
            "Survey wizard closed"
        );
        Ok(())
    }

    /// Handle one key press. Returns true when the user asked to quit.
    pub fn handle_key_event(&mut self, key: KeyEvent) -> bool {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return true;
        }

        match key.code {
            KeyCode::Esc => {
                self.go_back();
                return false;
            }
            KeyCode::Enter => {
                self.handle_enter();
                return false;
            }
            _ => {}
        }

        match self.state.wizard.step() {
            WizardStep::Personal => self.handle_personal_key(key),
            WizardStep::Option => self.handle_option_key(key),
            WizardStep::Modules => self.handle_modules_key(key),
            WizardStep::Review => self.handle_review_key(key),
        }
        false
    }

    fn go_back(&mut self) {
        match self.state.wizard.back() {
            Ok(_) => self.state.clear_message(),
            Err(e) => self
                .state
                .set_message(MessageKind::Error, format!("{} (Ctrl-C to quit)", e)),
        }
    }

    fn handle_enter(&mut self) {
        let step = self.state.wizard.step();

        if step == WizardStep::Option {
            let option = self.state.highlighted_option();
            self.state.wizard.choose_option(option);
        }

        if step == WizardStep::Review {
            self.submit();
            return;
        }

        match self.state.wizard.advance() {
            Ok(_) => self.state.clear_message(),
            Err(e) => self.state.set_message(MessageKind::Error, e.to_string()),
        }
    }

    fn handle_personal_key(&mut self, key: KeyEvent) {
        let field = self.state.current_field();
        match key.code {
            KeyCode::Tab | KeyCode::Down => self.state.next_field(),
            KeyCode::BackTab | KeyCode::Up => self.state.previous_field(),
            KeyCode::Left if field.is_choice() => self.state.cycle_year(false),
            KeyCode::Right | KeyCode::Char(' ') if field.is_choice() => {
                self.state.cycle_year(true)
            }
            KeyCode::Backspace => {
                if let Some(value) = self.state.field_value_mut(field) {
                    value.pop();
                }
            }
            KeyCode::Char(c) => {
                if let Some(value) = self.state.field_value_mut(field) {
                    value.push(c);
                }
            }
            _ => {}
        }
    }

    fn handle_option_key(&mut self, key: KeyEvent) {
        let count = SelectedOption::iter().count();
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => {
                self.state.option_cursor = self.state.option_cursor.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if self.state.option_cursor + 1 < count {
                    self.state.option_cursor += 1;
                }
            }
            KeyCode::Char(' ') => {
                let option = self.state.highlighted_option();
                self.state.wizard.choose_option(option);
            }
            _ => {}
        }
    }

    fn handle_modules_key(&mut self, key: KeyEvent) {
        let count = self.state.items.len();
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => {
                self.state.module_cursor = self.state.module_cursor.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if self.state.module_cursor + 1 < count {
                    self.state.module_cursor += 1;
                }
            }
            KeyCode::Home => self.state.module_cursor = 0,
            KeyCode::End => self.state.module_cursor = count.saturating_sub(1),
            KeyCode::Char(' ') => {
                if let Some(item) = self.state.items.get(self.state.module_cursor).cloned() {
                    item.toggle(&mut self.state.wizard);
                    self.state.clear_message();
                }
            }
            _ => {}
        }
    }

    fn handle_review_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Backspace => {
                self.state.wizard.additional_courses.pop();
            }
            KeyCode::Char(c) => self.state.wizard.additional_courses.push(c),
            _ => {}
        }
    }

    fn submit(&mut self) {
        let payload = match self.state.wizard.finish() {
            Ok(payload) => payload,
            Err(e) => {
                self.state.set_message(MessageKind::Error, e.to_string());
                return;
            }
        };

        match submission::submit(
            self.store.as_mut(),
            &payload,
            &self.state.catalog,
            self.policy,
        ) {
            Ok(stored) => {
                self.state.submitted_count += 1;
                self.state.reset_form();
                self.state.set_message(
                    MessageKind::Success,
                    format!(
                        "Survey submitted successfully! Response #{} recorded.",
                        stored.id
                    ),
                );
            }
            Err(e) => {
                error!(error = %e, "Submission failed");
                self.state
                    .set_message(MessageKind::Error, format!("Error: {}", e));
            }
        }
    }
}
