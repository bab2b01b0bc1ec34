use anyhow::Result;
use crossterm::event::KeyCode;
use tui::{
    backend::Backend,
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Span, Spans},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::auth::ALLOWED_NAMES;
use crate::ui::components::popup::{centered_rect, error_line};
use crate::ui::components::text_input::{edit_text, masked};

#[derive(Clone, Copy, PartialEq, Debug)]
pub enum LoginField {
    Name,
    Password,
}

pub enum LoginAction {
    Exit,
    Submit { name: String, password: String },
}

pub struct LoginState {
    /// Index into `ALLOWED_NAMES`; `None` is "-- Select --"
    name_choice: Option<usize>,
    pub password: String,
    pub current_field: LoginField,
    pub error: Option<String>,
    pub submitting: bool,
}

impl LoginState {
    pub fn new() -> Self {
        Self {
            name_choice: None,
            password: String::new(),
            current_field: LoginField::Name,
            error: None,
            submitting: false,
        }
    }

    pub fn name(&self) -> &str {
        self.name_choice.map(|i| ALLOWED_NAMES[i]).unwrap_or("")
    }

    pub fn next_name(&mut self) {
        self.name_choice = match self.name_choice {
            None => Some(0),
            Some(i) if i + 1 < ALLOWED_NAMES.len() => Some(i + 1),
            Some(_) => None,
        };
    }

    pub fn previous_name(&mut self) {
        self.name_choice = match self.name_choice {
            None => Some(ALLOWED_NAMES.len() - 1),
            Some(0) => None,
            Some(i) => Some(i - 1),
        };
    }

    pub fn fail(&mut self, message: impl Into<String>) {
        self.submitting = false;
        self.error = Some(message.into());
    }
}

impl Default for LoginState {
    fn default() -> Self {
        Self::new()
    }
}

pub fn render_login<B: Backend>(frame: &mut Frame<B>, state: &mut LoginState) {
    let area = centered_rect(50, 60, frame.size());
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Length(2),
            Constraint::Min(1),
        ].as_ref())
        .split(area);

    let outer = Block::default().borders(Borders::ALL);
    frame.render_widget(outer, area);

    let title = Paragraph::new(vec![
        Spans::from(Span::styled("Luzon", Style::default().add_modifier(Modifier::BOLD))),
        Spans::from(Span::styled("Track your project hours", Style::default().fg(Color::Gray))),
    ])
    .alignment(Alignment::Center);
    frame.render_widget(title, chunks[0]);

    let field_style = |field: LoginField| {
        if state.current_field == field {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default()
        }
    };

    let name = if state.name().is_empty() { "-- Select --" } else { state.name() };
    let name_widget = Paragraph::new(format!("< {} >", name))
        .block(Block::default().title("Who are you?").borders(Borders::ALL))
        .style(field_style(LoginField::Name));
    frame.render_widget(name_widget, chunks[1]);

    let password_widget = Paragraph::new(masked(&state.password))
        .block(Block::default().title("Access Password").borders(Borders::ALL))
        .style(field_style(LoginField::Password));
    frame.render_widget(password_widget, chunks[2]);

    frame.render_widget(error_line(&state.error), chunks[3]);

    let help = if state.submitting {
        "Setting up..."
    } else {
        "Tab - Switch field | Left/Right - Choose name | Enter - Get Started | Esc - Quit"
    };
    let help = Paragraph::new(help).style(Style::default().fg(Color::Gray));
    frame.render_widget(help, chunks[4]);
}

pub fn handle_input(state: &mut LoginState, key: KeyCode) -> Result<Option<LoginAction>> {
    match key {
        KeyCode::Esc => return Ok(Some(LoginAction::Exit)),
        KeyCode::Tab | KeyCode::Down | KeyCode::Up => {
            state.current_field = match state.current_field {
                LoginField::Name => LoginField::Password,
                LoginField::Password => LoginField::Name,
            };
        }
        KeyCode::Enter => {
            if !state.submitting {
                state.submitting = true;
                state.error = None;
                return Ok(Some(LoginAction::Submit {
                    name: state.name().to_string(),
                    password: state.password.clone(),
                }));
            }
        }
        _ => match state.current_field {
            LoginField::Name => match key {
                KeyCode::Right => state.next_name(),
                KeyCode::Left => state.previous_name(),
                _ => {}
            },
            LoginField::Password => {
                edit_text(&mut state.password, key);
            }
        },
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_selector_cycles_through_placeholder() {
        let mut state = LoginState::new();
        assert_eq!(state.name(), "");
        state.next_name();
        assert_eq!(state.name(), "Amit");
        state.next_name();
        assert_eq!(state.name(), "Kiper");
        state.next_name();
        assert_eq!(state.name(), "");
        state.previous_name();
        assert_eq!(state.name(), "Kiper");
    }

    #[test]
    fn submit_carries_name_and_password() {
        let mut state = LoginState::new();
        handle_input(&mut state, KeyCode::Right).unwrap();
        handle_input(&mut state, KeyCode::Tab).unwrap();
        for c in "pw".chars() {
            handle_input(&mut state, KeyCode::Char(c)).unwrap();
        }

        match handle_input(&mut state, KeyCode::Enter).unwrap() {
            Some(LoginAction::Submit { name, password }) => {
                assert_eq!(name, "Amit");
                assert_eq!(password, "pw");
            }
            _ => panic!("expected submit"),
        }
        assert!(state.submitting);
        assert!(handle_input(&mut state, KeyCode::Enter).unwrap().is_none());

        state.fail("Incorrect password");
        assert!(!state.submitting);
        assert_eq!(state.error.as_deref(), Some("Incorrect password"));
    }
}
