use anyhow::Result;
use crossterm::event::KeyCode;
use tui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Span, Spans},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};
use uuid::Uuid;

use crate::colors::{contrast_color, to_terminal_color};
use crate::db::feed::{patch_list, ChangeOp};
use crate::hours::{format_hours, project_hours, HoursWeighting};
use crate::models::{CalendarEvent, Project, ProjectStatus};
use crate::ui::components::popup::render_confirmation;

// Represents the state of the project sidebar
pub struct ProjectsState {
    projects: Vec<Project>,
    list_state: ListState,
    show_delete_confirmation: bool,
    board: bool,
}

impl ProjectsState {
    pub fn new(projects: Vec<Project>) -> Self {
        let mut list_state = ListState::default();
        if !projects.is_empty() {
            list_state.select(Some(0));
        }

        Self {
            projects,
            list_state,
            show_delete_confirmation: false,
            board: false,
        }
    }

    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    pub fn project(&self, id: Uuid) -> Option<&Project> {
        self.projects.iter().find(|p| p.id == id)
    }

    pub fn next(&mut self) {
        if self.projects.is_empty() {
            return;
        }

        let i = match self.list_state.selected() {
            Some(i) => {
                if i >= self.projects.len() - 1 {
                    0
                } else {
                    i + 1
                }
            }
            None => 0,
        };
        self.list_state.select(Some(i));
    }

    pub fn previous(&mut self) {
        if self.projects.is_empty() {
            return;
        }

        let i = match self.list_state.selected() {
            Some(i) => {
                if i == 0 {
                    self.projects.len() - 1
                } else {
                    i - 1
                }
            }
            None => 0,
        };
        self.list_state.select(Some(i));
    }

    pub fn toggle_delete_confirmation(&mut self) {
        self.show_delete_confirmation = !self.show_delete_confirmation;
    }

    pub fn is_board(&self) -> bool {
        self.board
    }

    pub fn selected_project(&self) -> Option<&Project> {
        self.list_state.selected().and_then(|i| self.projects.get(i))
    }

    pub fn selected_project_id(&self) -> Option<Uuid> {
        self.selected_project().map(|p| p.id)
    }

    /// Replaces the list after a full reload, keeping the selection in range
    pub fn replace(&mut self, projects: Vec<Project>) {
        let selected = self.selected_project_id();
        self.projects = projects;
        self.reselect(selected);
    }

    /// Applies a change notification for one project row
    pub fn apply_change(&mut self, op: ChangeOp, id: Uuid, fresh: Option<Project>) {
        let selected = self.selected_project_id();
        patch_list(&mut self.projects, op, id, fresh);
        self.reselect(selected);
    }

    /// Local status change ahead of the write
    pub fn set_status(&mut self, id: Uuid, status: ProjectStatus) {
        if let Some(project) = self.projects.iter_mut().find(|p| p.id == id) {
            project.status = status;
        }
    }

    fn reselect(&mut self, previous: Option<Uuid>) {
        let index = previous
            .and_then(|id| self.projects.iter().position(|p| p.id == id))
            .or_else(|| (!self.projects.is_empty()).then_some(0));
        let index = index.map(|i| i.min(self.projects.len().saturating_sub(1)));
        self.list_state.select(if self.projects.is_empty() { None } else { index });
    }
}

#[derive(Debug, PartialEq)]
pub enum ProjectAction {
    Close,
    ToggleFilter(Uuid),
    NewProject,
    EditProject(Uuid),
    DeleteProject(Uuid),
    Share(Uuid),
    Notes(Uuid),
    Checklist(Uuid),
    Financials(Uuid),
    MoveStatus(Uuid, ProjectStatus),
}

pub fn render_projects<B: Backend>(
    frame: &mut Frame<B>,
    area: Rect,
    state: &mut ProjectsState,
    events: &[CalendarEvent],
    weighting: HoursWeighting,
    filter: Option<Uuid>,
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(3)].as_ref())
        .split(area);

    if state.board {
        render_board(frame, chunks[0], state);
    } else {
        render_cards(frame, chunks[0], state, events, weighting, filter);
    }

    let buttons_text = if state.board {
        "<↑/↓> Select | <</>> Move column | <B> List | <Esc> Close"
    } else if state.selected_project().is_some() {
        "<Enter> Filter | <N>ew <E>dit <D>elete <S>hare | <M> Notes <C>hecklist <F>inancials | <B>oard"
    } else {
        "<N> New Project | <Esc> Close"
    };

    let buttons = Paragraph::new(buttons_text)
        .block(Block::default().borders(Borders::TOP))
        .style(Style::default().fg(Color::White));

    frame.render_widget(buttons, chunks[1]);

    if state.show_delete_confirmation {
        if let Some(project) = state.selected_project() {
            render_confirmation(
                frame,
                "Confirm Delete",
                vec![
                    format!("Delete \"{}\"?", project.title),
                    "Events will be unassigned.".to_string(),
                ],
            );
        }
    }
}

fn render_cards<B: Backend>(
    frame: &mut Frame<B>,
    area: Rect,
    state: &mut ProjectsState,
    events: &[CalendarEvent],
    weighting: HoursWeighting,
    filter: Option<Uuid>,
) {
    if state.projects.is_empty() {
        let empty = Paragraph::new(vec![
            Spans::from("No projects yet"),
            Spans::from(Span::styled(
                "Create a project to start tracking hours",
                Style::default().fg(Color::Gray),
            )),
        ])
        .block(Block::default().title("Projects").borders(Borders::ALL));
        frame.render_widget(empty, area);
        return;
    }

    let items: Vec<ListItem> = state
        .projects
        .iter()
        .map(|project| {
            let hours = project_hours(events, project.id, weighting);
            let count = events.iter().filter(|e| e.project_id == Some(project.id)).count();
            let color = to_terminal_color(&project.color);
            let badge = Span::styled(
                format!(" {} ", format_hours(hours)),
                Style::default()
                    .bg(color)
                    .fg(to_terminal_color(contrast_color(&project.color))),
            );
            let marker = if filter == Some(project.id) { "▶ " } else { "  " };

            let mut lines = vec![Spans::from(vec![
                Span::raw(marker),
                Span::styled("● ", Style::default().fg(color)),
                Span::styled(project.title.clone(), Style::default().add_modifier(Modifier::BOLD)),
                Span::raw(" "),
                badge,
            ])];
            let mut detail = format!(
                "    {} event{} · {}",
                count,
                if count == 1 { "" } else { "s" },
                project.status
            );
            if let Some(description) = &project.description {
                detail.push_str(" · ");
                detail.push_str(description);
            }
            lines.push(Spans::from(Span::styled(detail, Style::default().fg(Color::Gray))));

            ListItem::new(lines)
        })
        .collect();

    let projects_list = List::new(items)
        .block(Block::default().title("Projects").borders(Borders::ALL))
        .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD));

    frame.render_stateful_widget(projects_list, area, &mut state.list_state);
}

fn render_board<B: Backend>(frame: &mut Frame<B>, area: Rect, state: &ProjectsState) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
        ])
        .split(area);

    let selected = state.selected_project_id();
    for (status, column) in ProjectStatus::ALL.iter().zip(columns.iter()) {
        let items: Vec<ListItem> = state
            .projects
            .iter()
            .filter(|p| p.status == *status)
            .map(|p| {
                let style = if Some(p.id) == selected {
                    Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD)
                } else {
                    Style::default()
                };
                ListItem::new(Spans::from(vec![
                    Span::styled("● ", Style::default().fg(to_terminal_color(&p.color))),
                    Span::styled(p.title.clone(), style),
                ]))
            })
            .collect();

        let list = List::new(items).block(Block::default().title(status.label()).borders(Borders::ALL));
        frame.render_widget(list, *column);
    }
}

pub fn handle_input(state: &mut ProjectsState, key: KeyCode) -> Result<Option<ProjectAction>> {
    if state.show_delete_confirmation {
        match key {
            KeyCode::Char('y') | KeyCode::Char('Y') => {
                state.toggle_delete_confirmation();
                if let Some(id) = state.selected_project_id() {
                    return Ok(Some(ProjectAction::DeleteProject(id)));
                }
            }
            KeyCode::Char('n') | KeyCode::Esc => state.toggle_delete_confirmation(),
            _ => {}
        }
        return Ok(None);
    }

    let selected = state.selected_project_id();
    match key {
        KeyCode::Esc | KeyCode::Char('p') => return Ok(Some(ProjectAction::Close)),
        KeyCode::Down => state.next(),
        KeyCode::Up => state.previous(),
        KeyCode::Char('b') => state.board = !state.board,
        KeyCode::Char('n') => return Ok(Some(ProjectAction::NewProject)),
        KeyCode::Char('<') | KeyCode::Char('>') if state.board => {
            if let Some(project) = state.selected_project() {
                let target = if key == KeyCode::Char('<') {
                    project.status.previous()
                } else {
                    project.status.next()
                };
                if let Some(status) = target {
                    return Ok(Some(ProjectAction::MoveStatus(project.id, status)));
                }
            }
        }
        _ => {
            let Some(id) = selected else {
                return Ok(None);
            };
            match key {
                KeyCode::Enter => return Ok(Some(ProjectAction::ToggleFilter(id))),
                KeyCode::Char('e') => return Ok(Some(ProjectAction::EditProject(id))),
                KeyCode::Char('d') => state.toggle_delete_confirmation(),
                KeyCode::Char('s') => return Ok(Some(ProjectAction::Share(id))),
                KeyCode::Char('m') => return Ok(Some(ProjectAction::Notes(id))),
                KeyCode::Char('c') => return Ok(Some(ProjectAction::Checklist(id))),
                KeyCode::Char('f') => return Ok(Some(ProjectAction::Financials(id))),
                _ => {}
            }
        }
    }
    Ok(None)
}
