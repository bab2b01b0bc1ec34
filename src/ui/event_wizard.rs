use anyhow::Result;
use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
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

use crate::colors::to_terminal_color;
use crate::models::{CalendarEvent, EventDraft, Project, User};
use crate::ui::components::datetime_input::DateTimeInputState;
use crate::ui::components::popup::error_line;
use crate::ui::components::text_input::edit_text;

pub enum EventWizardAction {
    Cancel,
    Save(Option<Uuid>, EventDraft),
    Delete(Uuid),
}

#[derive(Clone, PartialEq, Copy, Debug)]
pub enum EventField {
    Title,
    Project,
    Assignees,
    AllDay,
    Start,
    End,
    Description,
}

const FIELDS: [EventField; 7] = [
    EventField::Title,
    EventField::Project,
    EventField::Assignees,
    EventField::AllDay,
    EventField::Start,
    EventField::End,
    EventField::Description,
];

pub fn to_utc(local: NaiveDateTime) -> DateTime<Utc> {
    Local
        .from_local_datetime(&local)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|| Utc.from_utc_datetime(&local))
}

pub fn to_local(utc: DateTime<Utc>) -> NaiveDateTime {
    utc.with_timezone(&Local).naive_local()
}

fn end_of_day() -> NaiveTime {
    NaiveTime::from_hms_opt(23, 59, 0).unwrap_or(NaiveTime::MIN)
}

pub struct EventWizardState {
    pub event_id: Option<Uuid>,
    pub title: String,
    pub description: String,
    pub projects: Vec<(Uuid, String, String)>,
    /// Index into `projects`; `None` is "No project"
    pub project_choice: Option<usize>,
    pub users: Vec<User>,
    pub selected_users: Vec<Uuid>,
    pub user_cursor: usize,
    pub all_day: bool,
    pub start: DateTimeInputState,
    pub end: DateTimeInputState,
    pub current_field: EventField,
    pub editing: bool,
    pub error: Option<String>,
    pub submitting: bool,
}

impl EventWizardState {
    /// A one hour event at nine on `day`, in the selected project if any
    pub fn new(day: NaiveDate, selected_project: Option<Uuid>, projects: &[Project], users: Vec<User>) -> Self {
        let nine = NaiveTime::from_hms_opt(9, 0, 0).unwrap_or(NaiveTime::MIN);
        let ten = NaiveTime::from_hms_opt(10, 0, 0).unwrap_or(NaiveTime::MIN);
        let projects = project_choices(projects);
        let project_choice = selected_project.and_then(|id| projects.iter().position(|p| p.0 == id));

        Self {
            event_id: None,
            title: String::new(),
            description: String::new(),
            projects,
            project_choice,
            users,
            selected_users: Vec::new(),
            user_cursor: 0,
            all_day: false,
            start: DateTimeInputState::new(day.and_time(nine)),
            end: DateTimeInputState::new(day.and_time(ten)),
            current_field: EventField::Title,
            editing: false,
            error: None,
            submitting: false,
        }
    }

    pub fn from_existing(event: &CalendarEvent, projects: &[Project], users: Vec<User>) -> Self {
        let projects = project_choices(projects);
        let project_choice = event
            .project_id
            .and_then(|id| projects.iter().position(|p| p.0 == id));
        let mut start = DateTimeInputState::new(to_local(event.start_time));
        let mut end = DateTimeInputState::new(to_local(event.end_time));
        start.date_only = event.all_day;
        end.date_only = event.all_day;

        Self {
            event_id: Some(event.id),
            title: event.title.clone(),
            description: event.description.clone().unwrap_or_default(),
            projects,
            project_choice,
            users,
            selected_users: event.assignee_ids(),
            user_cursor: 0,
            all_day: event.all_day,
            start,
            end,
            current_field: EventField::Title,
            editing: false,
            error: None,
            submitting: false,
        }
    }

    pub fn is_editing_existing(&self) -> bool {
        self.event_id.is_some()
    }

    pub fn toggle_editing(&mut self) {
        self.editing = !self.editing;
        match self.current_field {
            EventField::Start => self.start.editing = self.editing,
            EventField::End => self.end.editing = self.editing,
            _ => {}
        }
        if !self.editing {
            self.start.editing = false;
            self.end.editing = false;
        }
    }

    pub fn next_field(&mut self) {
        let i = FIELDS.iter().position(|f| *f == self.current_field).unwrap_or(0);
        self.current_field = FIELDS[(i + 1) % FIELDS.len()];
    }

    pub fn previous_field(&mut self) {
        let i = FIELDS.iter().position(|f| *f == self.current_field).unwrap_or(0);
        self.current_field = FIELDS[(i + FIELDS.len() - 1) % FIELDS.len()];
    }

    pub fn toggle_user(&mut self, user_id: Uuid) {
        if let Some(pos) = self.selected_users.iter().position(|id| *id == user_id) {
            self.selected_users.remove(pos);
        } else {
            self.selected_users.push(user_id);
        }
    }

    pub fn set_all_day(&mut self, all_day: bool) {
        self.all_day = all_day;
        self.start.date_only = all_day;
        self.end.date_only = all_day;
        if all_day {
            self.start.set_time(NaiveTime::MIN);
            self.end.set_time(end_of_day());
        }
    }

    pub fn edit_current_field(&mut self, key: KeyCode) {
        if !self.editing {
            return;
        }

        match self.current_field {
            EventField::Title => {
                edit_text(&mut self.title, key);
            }
            EventField::Description => {
                edit_text(&mut self.description, key);
            }
            EventField::Project => {
                let len = self.projects.len();
                self.project_choice = match (key, self.project_choice) {
                    (KeyCode::Right, None) if len > 0 => Some(0),
                    (KeyCode::Right, Some(i)) if i + 1 < len => Some(i + 1),
                    (KeyCode::Right, Some(_)) => None,
                    (KeyCode::Left, None) if len > 0 => Some(len - 1),
                    (KeyCode::Left, Some(0)) => None,
                    (KeyCode::Left, Some(i)) => Some(i - 1),
                    (_, current) => current,
                };
            }
            EventField::Assignees => match key {
                KeyCode::Right if !self.users.is_empty() => {
                    self.user_cursor = (self.user_cursor + 1) % self.users.len();
                }
                KeyCode::Left if !self.users.is_empty() => {
                    self.user_cursor = (self.user_cursor + self.users.len() - 1) % self.users.len();
                }
                KeyCode::Char(' ') => {
                    if let Some(user) = self.users.get(self.user_cursor) {
                        let id = user.id;
                        self.toggle_user(id);
                    }
                }
                _ => {}
            },
            EventField::AllDay => {
                if key == KeyCode::Char(' ') {
                    self.set_all_day(!self.all_day);
                }
            }
            EventField::Start => self.start.handle_input(key),
            EventField::End => self.end.handle_input(key),
        }
    }

    pub fn draft(&self) -> Result<EventDraft, String> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err("Event title is required".to_string());
        }

        let (start, end) = if self.all_day {
            (
                self.start.value.date().and_time(NaiveTime::MIN),
                self.end.value.date().and_time(end_of_day()),
            )
        } else {
            (self.start.value, self.end.value)
        };
        let description = self.description.trim();
        let project = self.project_choice.and_then(|i| self.projects.get(i));

        Ok(EventDraft {
            title: title.to_string(),
            description: (!description.is_empty()).then(|| description.to_string()),
            start_time: to_utc(start),
            end_time: to_utc(end),
            all_day: self.all_day,
            color: project.map(|p| p.2.clone()),
            project_id: project.map(|p| p.0),
            assignee_user_ids: self.selected_users.clone(),
        })
    }

    pub fn fail(&mut self) {
        self.submitting = false;
        self.error = Some("Failed to save event".to_string());
    }
}

fn project_choices(projects: &[Project]) -> Vec<(Uuid, String, String)> {
    projects
        .iter()
        .map(|p| (p.id, p.title.clone(), p.color.clone()))
        .collect()
}

pub fn render_event_wizard<B: Backend>(f: &mut Frame<B>, state: &mut EventWizardState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(2)
        .constraints(
            [
                Constraint::Length(3),
                Constraint::Min(9),
                Constraint::Length(1),
                Constraint::Length(3),
            ]
            .as_ref(),
        )
        .split(f.size());

    let title_text = if state.is_editing_existing() { "Edit Event" } else { "New Event" };
    let title = Paragraph::new(title_text)
        .style(Style::default().fg(Color::Cyan))
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(title, chunks[0]);

    render_form(f, state, chunks[1]);
    f.render_widget(error_line(&state.error), chunks[2]);

    let help_text = if state.submitting {
        "Saving..."
    } else if state.editing {
        match state.current_field {
            EventField::Title | EventField::Description => "Enter - Save field | Esc - Done",
            EventField::Project => "Left/Right - Choose project | Enter - Done",
            EventField::Assignees => "Left/Right - Move | Space - Toggle user | Enter - Done",
            EventField::AllDay => "Space - Toggle | Enter - Done",
            EventField::Start | EventField::End => "Digits - Type | Left/Right - Switch part | Enter - Done",
        }
    } else if state.is_editing_existing() {
        "Enter - Edit field | Up/Down - Navigate | S - Save | X - Delete | Esc - Cancel"
    } else {
        "Enter - Edit field | Up/Down - Navigate | S - Create Event | Esc - Cancel"
    };

    let help = Paragraph::new(help_text)
        .style(Style::default().fg(Color::Gray))
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(help, chunks[3]);
}

fn render_form<B: Backend>(f: &mut Frame<B>, state: &mut EventWizardState, area: Rect) {
    let items: Vec<ListItem> = FIELDS
        .iter()
        .map(|field| {
            let active = *field == state.current_field;
            let editing = active && state.editing;
            let label_style = if active { Style::default().fg(Color::Yellow) } else { Style::default() };
            let value_style = if editing { Style::default().add_modifier(Modifier::BOLD) } else { Style::default() };
            let cursor = if editing { "|" } else { "" };

            let (name, value): (&str, Vec<Span>) = match field {
                EventField::Title => ("Title", vec![Span::styled(format!("{}{}", state.title, cursor), value_style)]),
                EventField::Description => (
                    "Description",
                    vec![Span::styled(format!("{}{}", state.description, cursor), value_style)],
                ),
                EventField::Project => {
                    let value = match state.project_choice.and_then(|i| state.projects.get(i)) {
                        Some((_, title, color)) => vec![
                            Span::styled("● ", Style::default().fg(to_terminal_color(color))),
                            Span::styled(title.clone(), value_style),
                        ],
                        None => vec![Span::styled("No project", value_style)],
                    };
                    ("Project", value)
                }
                EventField::Assignees => {
                    let spans = state
                        .users
                        .iter()
                        .enumerate()
                        .map(|(i, user)| {
                            let checked = state.selected_users.contains(&user.id);
                            let mut style = if checked {
                                Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD)
                            } else {
                                Style::default()
                            };
                            if editing && i == state.user_cursor {
                                style = style.add_modifier(Modifier::REVERSED);
                            }
                            Span::styled(
                                format!("[{}] {} ", if checked { "x" } else { " " }, user.name),
                                style,
                            )
                        })
                        .collect();
                    ("Assign to", spans)
                }
                EventField::AllDay => (
                    "All day",
                    vec![Span::styled(if state.all_day { "[x]" } else { "[ ]" }, value_style)],
                ),
                EventField::Start => ("Start", vec![Span::styled(state.start.get_display_string(), value_style)]),
                EventField::End => ("End", vec![Span::styled(state.end.get_display_string(), value_style)]),
            };

            let mut spans = vec![Span::styled(format!("{}: ", name), label_style)];
            spans.extend(value);
            ListItem::new(Spans::from(spans))
        })
        .collect();

    let form_list = List::new(items).block(Block::default().borders(Borders::ALL).title("Event Details"));
    f.render_widget(form_list, area);
}

pub fn handle_input(state: &mut EventWizardState, key: KeyCode) -> Result<Option<EventWizardAction>> {
    if state.submitting {
        return Ok(None);
    }

    match key {
        KeyCode::Esc => {
            if state.editing {
                state.toggle_editing();
            } else {
                return Ok(Some(EventWizardAction::Cancel));
            }
        }
        KeyCode::Enter => state.toggle_editing(),
        KeyCode::Up if !state.editing => state.previous_field(),
        KeyCode::Down if !state.editing => state.next_field(),
        KeyCode::Char('s') if !state.editing => match state.draft() {
            Ok(draft) => {
                state.submitting = true;
                state.error = None;
                return Ok(Some(EventWizardAction::Save(state.event_id, draft)));
            }
            Err(message) => state.error = Some(message),
        },
        KeyCode::Char('x') if !state.editing => {
            if let Some(id) = state.event_id {
                return Ok(Some(EventWizardAction::Delete(id)));
            }
        }
        _ if state.editing => state.edit_current_field(key),
        _ => {}
    }

    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    fn user(name: &str) -> User {
        User {
            id: Uuid::new_v4(),
            name: name.to_string(),
            avatar_url: None,
            created_at: Utc::now(),
        }
    }

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 10).unwrap()
    }

    #[test]
    fn title_is_required() {
        let mut state = EventWizardState::new(day(), None, &[], vec![]);
        assert!(handle_input(&mut state, KeyCode::Char('s')).unwrap().is_none());
        assert_eq!(state.error.as_deref(), Some("Event title is required"));
    }

    #[test]
    fn assignees_toggle_on_and_off() {
        let users = vec![user("Amit"), user("Kiper")];
        let kiper = users[1].id;
        let mut state = EventWizardState::new(day(), None, &[], users);
        state.title = "Standup".to_string();
        state.current_field = EventField::Assignees;

        handle_input(&mut state, KeyCode::Enter).unwrap();
        handle_input(&mut state, KeyCode::Char(' ')).unwrap();
        handle_input(&mut state, KeyCode::Right).unwrap();
        handle_input(&mut state, KeyCode::Char(' ')).unwrap();
        handle_input(&mut state, KeyCode::Left).unwrap();
        handle_input(&mut state, KeyCode::Char(' ')).unwrap();
        handle_input(&mut state, KeyCode::Enter).unwrap();

        let draft = state.draft().unwrap();
        assert_eq!(draft.assignee_user_ids, vec![kiper]);
    }

    #[test]
    fn all_day_spans_the_whole_day() {
        let mut state = EventWizardState::new(day(), None, &[], vec![]);
        state.title = "Offsite".to_string();
        state.set_all_day(true);

        let draft = state.draft().unwrap();
        let start = to_local(draft.start_time);
        let end = to_local(draft.end_time);
        assert!(draft.all_day);
        assert_eq!((start.hour(), start.minute()), (0, 0));
        assert_eq!((end.hour(), end.minute()), (23, 59));
        assert_eq!(start.date(), day());
    }

    #[test]
    fn event_takes_its_project_colour() {
        let project = Project {
            id: Uuid::new_v4(),
            title: "Site".to_string(),
            color: "#F7B5CA".to_string(),
            description: None,
            status: crate::models::ProjectStatus::InProgress,
            created_by: Uuid::new_v4(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let mut state = EventWizardState::new(day(), Some(project.id), &[project.clone()], vec![]);
        state.title = "Design".to_string();

        let draft = state.draft().unwrap();
        assert_eq!(draft.project_id, Some(project.id));
        assert_eq!(draft.color.as_deref(), Some("#F7B5CA"));

        state.current_field = EventField::Project;
        handle_input(&mut state, KeyCode::Enter).unwrap();
        handle_input(&mut state, KeyCode::Right).unwrap();
        handle_input(&mut state, KeyCode::Enter).unwrap();

        let draft = state.draft().unwrap();
        assert_eq!(draft.project_id, None);
        assert_eq!(draft.color, None);
    }

    #[test]
    fn save_is_not_sent_twice() {
        let mut state = EventWizardState::new(day(), None, &[], vec![]);
        state.title = "Call".to_string();
        assert!(matches!(
            handle_input(&mut state, KeyCode::Char('s')).unwrap(),
            Some(EventWizardAction::Save(None, _))
        ));
        assert!(handle_input(&mut state, KeyCode::Char('s')).unwrap().is_none());
        state.fail();
        assert_eq!(state.error.as_deref(), Some("Failed to save event"));
    }
}
