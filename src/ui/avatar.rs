use std::path::PathBuf;

use anyhow::Result;
use crossterm::event::KeyCode;
use tui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Span, Spans},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use crate::models::User;
use crate::ui::components::popup::{centered_rect, error_line};
use crate::ui::components::text_input::edit_text;

pub enum AvatarAction {
    Close,
    Upload(PathBuf),
}

pub struct AvatarState {
    pub user: User,
    pub path: String,
    pub uploading: bool,
    pub error: Option<String>,
}

impl AvatarState {
    pub fn new(user: User) -> Self {
        Self {
            user,
            path: String::new(),
            uploading: false,
            error: None,
        }
    }

    pub fn uploaded(&mut self, avatar_url: String) {
        self.uploading = false;
        self.error = None;
        self.path.clear();
        self.user.avatar_url = Some(avatar_url);
    }

    pub fn fail(&mut self, message: impl Into<String>) {
        self.uploading = false;
        self.error = Some(message.into());
    }
}

pub fn render_avatar<B: Backend>(f: &mut Frame<B>, state: &mut AvatarState) {
    let area = centered_rect(60, 50, f.size());
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints(
            [
                Constraint::Length(4),
                Constraint::Length(3),
                Constraint::Length(1),
                Constraint::Min(1),
            ]
            .as_ref(),
        )
        .split(area);

    f.render_widget(Clear, area);
    f.render_widget(Block::default().title("Avatar").borders(Borders::ALL), area);

    let current = state.user.avatar_url.clone().unwrap_or_else(|| "No avatar yet".to_string());
    let profile = Paragraph::new(vec![
        Spans::from(vec![
            Span::styled(
                format!(" {} ", state.user.initial()),
                Style::default().bg(Color::Blue).fg(Color::White).add_modifier(Modifier::BOLD),
            ),
            Span::raw(" "),
            Span::styled(state.user.name.clone(), Style::default().add_modifier(Modifier::BOLD)),
        ]),
        Spans::from(Span::styled(current, Style::default().fg(Color::Gray))),
    ]);
    f.render_widget(profile, chunks[0]);

    let input = Paragraph::new(format!("{}|", state.path))
        .style(Style::default().fg(Color::Yellow))
        .block(Block::default().title("Image file").borders(Borders::ALL));
    f.render_widget(input, chunks[1]);

    f.render_widget(error_line(&state.error), chunks[2]);

    let help = if state.uploading { "Uploading..." } else { "Enter - Upload | Esc - Close" };
    f.render_widget(Paragraph::new(help).style(Style::default().fg(Color::Gray)), chunks[3]);
}

pub fn handle_input(state: &mut AvatarState, key: KeyCode) -> Result<Option<AvatarAction>> {
    if state.uploading {
        return Ok(None);
    }

    match key {
        KeyCode::Esc => return Ok(Some(AvatarAction::Close)),
        KeyCode::Enter => {
            let path = PathBuf::from(state.path.trim());
            if !path.is_file() {
                state.error = Some("Choose an image file".to_string());
            } else {
                state.uploading = true;
                state.error = None;
                return Ok(Some(AvatarAction::Upload(path)));
            }
        }
        _ => {
            edit_text(&mut state.path, key);
        }
    }
    Ok(None)
}
