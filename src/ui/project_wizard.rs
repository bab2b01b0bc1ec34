use anyhow::Result;
use crossterm::event::KeyCode;
use tui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Span, Spans},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};
use uuid::Uuid;

use crate::colors::{to_terminal_color, PROJECT_COLORS};
use crate::db::ProjectDraft;
use crate::models::{Project, ProjectStatus};
use crate::ui::components::popup::error_line;
use crate::ui::components::text_input::edit_text;

pub enum ProjectWizardAction {
    Cancel,
    Save(Option<Uuid>, ProjectDraft),
}

#[derive(Clone, PartialEq, Copy, Debug)]
pub enum ProjectField {
    Title,
    Color,
    Description,
    Status,
}

pub struct ProjectWizardState {
    pub project_id: Option<Uuid>,
    pub title: String,
    pub color_index: usize,
    pub description: String,
    pub status: ProjectStatus,
    pub current_field: ProjectField,
    pub editing: bool,
    pub error: Option<String>,
}

impl ProjectWizardState {
    pub fn new() -> Self {
        Self {
            project_id: None,
            title: String::new(),
            color_index: 0,
            description: String::new(),
            status: ProjectStatus::InProgress,
            current_field: ProjectField::Title,
            editing: false,
            error: None,
        }
    }

    pub fn from_existing(project: &Project) -> Self {
        Self {
            project_id: Some(project.id),
            title: project.title.clone(),
            color_index: PROJECT_COLORS
                .iter()
                .position(|c| c.eq_ignore_ascii_case(&project.color))
                .unwrap_or(0),
            description: project.description.clone().unwrap_or_default(),
            status: project.status,
            current_field: ProjectField::Title,
            editing: false,
            error: None,
        }
    }

    pub fn toggle_editing(&mut self) {
        self.editing = !self.editing;
    }

    pub fn next_field(&mut self) {
        self.current_field = match self.current_field {
            ProjectField::Title => ProjectField::Color,
            ProjectField::Color => ProjectField::Description,
            ProjectField::Description => ProjectField::Status,
            ProjectField::Status => ProjectField::Title,
        };
    }

    pub fn previous_field(&mut self) {
        self.current_field = match self.current_field {
            ProjectField::Title => ProjectField::Status,
            ProjectField::Color => ProjectField::Title,
            ProjectField::Description => ProjectField::Color,
            ProjectField::Status => ProjectField::Description,
        };
    }

    pub fn edit_current_field(&mut self, key: KeyCode) {
        if !self.editing {
            return;
        }

        match self.current_field {
            ProjectField::Title => {
                edit_text(&mut self.title, key);
            }
            ProjectField::Description => {
                edit_text(&mut self.description, key);
            }
            ProjectField::Color => match key {
                KeyCode::Right => self.color_index = (self.color_index + 1) % PROJECT_COLORS.len(),
                KeyCode::Left => {
                    self.color_index = (self.color_index + PROJECT_COLORS.len() - 1) % PROJECT_COLORS.len()
                }
                _ => {}
            },
            ProjectField::Status => {
                let current = self.status.column();
                let len = ProjectStatus::ALL.len();
                match key {
                    KeyCode::Right => self.status = ProjectStatus::ALL[(current + 1) % len],
                    KeyCode::Left => self.status = ProjectStatus::ALL[(current + len - 1) % len],
                    _ => {}
                }
            }
        }
    }

    pub fn color(&self) -> &'static str {
        PROJECT_COLORS[self.color_index]
    }

    /// The values to write, or the inline message when the form is incomplete
    pub fn draft(&self) -> Result<ProjectDraft, String> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err("Project name is required".to_string());
        }
        let description = self.description.trim();

        Ok(ProjectDraft {
            title: title.to_string(),
            color: self.color().to_string(),
            description: (!description.is_empty()).then(|| description.to_string()),
            status: self.status,
        })
    }
}

impl Default for ProjectWizardState {
    fn default() -> Self {
        Self::new()
    }
}

pub fn render_project_wizard<B: Backend>(f: &mut Frame<B>, state: &mut ProjectWizardState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(2)
        .constraints(
            [
                Constraint::Length(3),
                Constraint::Min(8),
                Constraint::Length(1),
                Constraint::Length(3),
            ]
            .as_ref(),
        )
        .split(f.size());

    let title_text = if state.project_id.is_none() { "New Project" } else { "Edit Project" };

    let title = Paragraph::new(title_text)
        .style(Style::default().fg(Color::Cyan))
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(title, chunks[0]);

    render_form(f, state, chunks[1]);
    f.render_widget(error_line(&state.error), chunks[2]);

    let help_text = if state.editing {
        match state.current_field {
            ProjectField::Title | ProjectField::Description => "Enter - Save field | Esc - Cancel editing",
            ProjectField::Color | ProjectField::Status => "Left/Right - Choose | Enter - Done",
        }
    } else {
        "Enter - Edit field | Up/Down - Navigate fields | S - Save project | Esc - Cancel"
    };

    let help = Paragraph::new(help_text)
        .style(Style::default().fg(Color::Gray))
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(help, chunks[3]);
}

fn render_form<B: Backend>(f: &mut Frame<B>, state: &mut ProjectWizardState, area: Rect) {
    let fields = [
        (ProjectField::Title, "Project Name"),
        (ProjectField::Color, "Color"),
        (ProjectField::Description, "Description"),
        (ProjectField::Status, "Status"),
    ];

    let items: Vec<ListItem> = fields
        .iter()
        .map(|(field, name)| {
            let active = *field == state.current_field;
            let label_style = if active {
                Style::default().fg(Color::Yellow)
            } else {
                Style::default()
            };
            let cursor = if active && state.editing { "|" } else { "" };

            let value: Vec<Span> = match field {
                ProjectField::Title => vec![Span::raw(format!("{}{}", state.title, cursor))],
                ProjectField::Description => vec![Span::raw(format!("{}{}", state.description, cursor))],
                ProjectField::Color => PROJECT_COLORS
                    .iter()
                    .enumerate()
                    .map(|(i, c)| {
                        let symbol = if i == state.color_index { "◉ " } else { "● " };
                        Span::styled(symbol, Style::default().fg(to_terminal_color(c)))
                    })
                    .collect(),
                ProjectField::Status => vec![Span::raw(format!("< {} >", state.status))],
            };

            let mut spans = vec![Span::styled(format!("{}: ", name), label_style)];
            spans.extend(value.into_iter().map(|s| {
                if active && state.editing {
                    Span::styled(s.content, s.style.add_modifier(Modifier::BOLD))
                } else {
                    s
                }
            }));
            ListItem::new(Spans::from(spans))
        })
        .collect();

    let form_list = List::new(items).block(Block::default().borders(Borders::ALL).title("Project Details"));

    f.render_widget(form_list, area);
}

pub fn handle_input(state: &mut ProjectWizardState, key: KeyCode) -> Result<Option<ProjectWizardAction>> {
    match key {
        KeyCode::Esc => {
            if state.editing {
                state.toggle_editing();
            } else {
                return Ok(Some(ProjectWizardAction::Cancel));
            }
        }
        KeyCode::Enter => state.toggle_editing(),
        KeyCode::Up if !state.editing => state.previous_field(),
        KeyCode::Down if !state.editing => state.next_field(),
        KeyCode::Char('s') if !state.editing => match state.draft() {
            Ok(draft) => return Ok(Some(ProjectWizardAction::Save(state.project_id, draft))),
            Err(message) => state.error = Some(message),
        },
        _ if state.editing => state.edit_current_field(key),
        _ => {}
    }

    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_title_is_rejected_inline() {
        let mut state = ProjectWizardState::new();
        state.title = "   ".to_string();
        assert!(handle_input(&mut state, KeyCode::Char('s')).unwrap().is_none());
        assert_eq!(state.error.as_deref(), Some("Project name is required"));
    }

    #[test]
    fn draft_trims_and_uses_palette() {
        let mut state = ProjectWizardState::new();
        handle_input(&mut state, KeyCode::Enter).unwrap();
        for c in " Website ".chars() {
            handle_input(&mut state, KeyCode::Char(c)).unwrap();
        }
        handle_input(&mut state, KeyCode::Enter).unwrap();
        handle_input(&mut state, KeyCode::Down).unwrap();
        handle_input(&mut state, KeyCode::Enter).unwrap();
        handle_input(&mut state, KeyCode::Right).unwrap();
        handle_input(&mut state, KeyCode::Enter).unwrap();

        match handle_input(&mut state, KeyCode::Char('s')).unwrap() {
            Some(ProjectWizardAction::Save(None, draft)) => {
                assert_eq!(draft.title, "Website");
                assert_eq!(draft.color, PROJECT_COLORS[1]);
                assert_eq!(draft.description, None);
                assert_eq!(draft.status, ProjectStatus::InProgress);
            }
            _ => panic!("expected save"),
        }
    }
}
