use std::time::{Duration, Instant};

use anyhow::Result;
use chrono::Local;
use crossterm::event::KeyCode;
use tui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Style},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};
use uuid::Uuid;

use crate::models::{Project, ProjectNote};
use crate::ui::components::popup::error_line;
use crate::ui::components::text_input::edit_multiline;

pub const SAVE_DELAY: Duration = Duration::from_millis(500);

pub enum NotesAction {
    Close,
}

pub struct NotesState {
    pub project_id: Uuid,
    pub project_title: String,
    pub note_id: Option<Uuid>,
    pub content: String,
    pub last_saved: Option<chrono::DateTime<chrono::Utc>>,
    last_edit: Option<Instant>,
    unsaved: bool,
    discard_on_close: bool,
    pub error: Option<String>,
}

impl NotesState {
    pub fn new(project: &Project, note: Option<ProjectNote>) -> Self {
        let mut state = Self {
            project_id: project.id,
            project_title: project.title.clone(),
            note_id: None,
            content: String::new(),
            last_saved: None,
            last_edit: None,
            unsaved: false,
            discard_on_close: false,
            error: None,
        };
        if let Some(note) = note {
            state.load(note);
        }
        state
    }

    fn load(&mut self, note: ProjectNote) {
        self.note_id = Some(note.id);
        self.content = note.content;
        self.last_saved = Some(note.updated_at);
    }

    /// Edits not yet written, including ones whose save failed
    pub fn is_dirty(&self) -> bool {
        self.unsaved
    }

    pub fn edit(&mut self, key: KeyCode, now: Instant) {
        if edit_multiline(&mut self.content, key) {
            self.last_edit = Some(now);
            self.unsaved = true;
            self.discard_on_close = false;
        }
    }

    /// True once typing has paused for `SAVE_DELAY`
    pub fn due_for_save(&self, now: Instant) -> bool {
        self.last_edit
            .map_or(false, |at| now.saturating_duration_since(at) >= SAVE_DELAY)
    }

    pub fn saved(&mut self, note: ProjectNote) {
        self.last_edit = None;
        self.unsaved = false;
        self.discard_on_close = false;
        self.error = None;
        self.load(note);
    }

    /// Stops the debounce from retrying; the edits stay unsaved until the next keystroke or close
    pub fn save_failed(&mut self) {
        self.last_edit = None;
        self.error = Some("Failed to save note".to_string());
    }

    /// Called when the save on close failed. The first attempt keeps the editor
    /// open with a warning; a second one gives up the edits.
    pub fn close_after_failure(&mut self) -> bool {
        if self.discard_on_close {
            return true;
        }
        self.discard_on_close = true;
        self.error = Some("Failed to save note. Press Esc again to discard changes".to_string());
        false
    }

    /// A note written elsewhere replaces ours unless there are unsaved edits
    pub fn apply_remote(&mut self, note: Option<ProjectNote>) {
        if self.is_dirty() {
            return;
        }
        if let Some(note) = note {
            self.load(note);
        }
    }
}

pub fn render_notes<B: Backend>(f: &mut Frame<B>, state: &mut NotesState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(2)
        .constraints(
            [
                Constraint::Min(5),
                Constraint::Length(1),
                Constraint::Length(3),
            ]
            .as_ref(),
        )
        .split(f.size());

    let editor = Paragraph::new(format!("{}|", state.content))
        .block(
            Block::default()
                .title(format!("Notes · {}", state.project_title))
                .borders(Borders::ALL),
        )
        .wrap(Wrap { trim: false });
    f.render_widget(editor, chunks[0]);

    f.render_widget(error_line(&state.error), chunks[1]);

    let status = if state.last_edit.is_some() {
        "Saving...".to_string()
    } else if state.is_dirty() {
        "Unsaved changes".to_string()
    } else if let Some(at) = state.last_saved {
        format!("Saved {}", at.with_timezone(&Local).format("%H:%M"))
    } else {
        "Notes save automatically".to_string()
    };
    let help = Paragraph::new(format!("{} | Esc - Close", status))
        .style(Style::default().fg(Color::Gray))
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(help, chunks[2]);
}

pub fn handle_input(state: &mut NotesState, key: KeyCode) -> Result<Option<NotesAction>> {
    match key {
        KeyCode::Esc => return Ok(Some(NotesAction::Close)),
        _ => state.edit(key, Instant::now()),
    }
    Ok(None)
}
