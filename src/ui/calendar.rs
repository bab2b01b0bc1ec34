use anyhow::Result;
use chrono::{DateTime, Datelike, Duration, Local, NaiveDate, Utc};
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

use crate::colors::{contrast_color, event_color, to_terminal_color};
use crate::db::feed::ChangeOp;
use crate::hours::{format_hours, total_hours, HoursWeighting};
use crate::models::{CalendarEvent, Project, User};
use crate::ui::components::popup::render_confirmation;
use crate::ui::projects::{self, render_projects, ProjectAction, ProjectsState};

const STEP_MINUTES: i64 = 30;

#[derive(Debug, PartialEq)]
pub enum CalendarAction {
    Quit,
    Logout,
    Avatar,
    NewEvent(NaiveDate),
    EditEvent(Uuid),
    DeleteEvent(Uuid),
    MoveEvent {
        id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
    Project(ProjectAction),
}

pub struct CalendarState {
    pub user: User,
    pub users: Vec<User>,
    pub projects: ProjectsState,
    events: Vec<CalendarEvent>,
    pub weighting: HoursWeighting,
    pub selected_day: NaiveDate,
    selected_event: Option<Uuid>,
    pub filter: Option<Uuid>,
    pub show_sidebar: bool,
    show_delete_confirmation: bool,
    pub status: Option<String>,
}

pub fn week_start(day: NaiveDate) -> NaiveDate {
    day - Duration::days(day.weekday().num_days_from_monday() as i64)
}

fn local_date(at: DateTime<Utc>) -> NaiveDate {
    at.with_timezone(&Local).date_naive()
}

impl CalendarState {
    pub fn new(
        user: User,
        users: Vec<User>,
        projects: Vec<Project>,
        events: Vec<CalendarEvent>,
        weighting: HoursWeighting,
        filter: Option<Uuid>,
    ) -> Self {
        let filter = filter.filter(|id| projects.iter().any(|p| p.id == *id));
        let mut state = Self {
            user,
            users,
            projects: ProjectsState::new(projects),
            events,
            weighting,
            selected_day: Local::now().date_naive(),
            selected_event: None,
            filter,
            show_sidebar: false,
            show_delete_confirmation: false,
            status: None,
        };
        state.reselect_event();
        state
    }

    pub fn events(&self) -> &[CalendarEvent] {
        &self.events
    }

    pub fn set_events(&mut self, events: Vec<CalendarEvent>) {
        self.events = events;
        self.reselect_event();
    }

    pub fn set_projects(&mut self, projects: Vec<Project>) {
        self.projects.replace(projects);
        self.drop_stale_filter();
    }

    pub fn apply_project_change(&mut self, op: ChangeOp, id: Uuid, fresh: Option<Project>) {
        self.projects.apply_change(op, id, fresh);
        self.drop_stale_filter();
    }

    fn drop_stale_filter(&mut self) {
        if let Some(id) = self.filter {
            if self.projects.project(id).is_none() {
                self.filter = None;
            }
        }
    }

    /// Events shown under the current project filter
    pub fn visible_events(&self) -> Vec<&CalendarEvent> {
        self.events
            .iter()
            .filter(|e| self.filter.map_or(true, |id| e.project_id == Some(id)))
            .collect()
    }

    /// Visible events touching `day`, earliest first
    pub fn day_events(&self, day: NaiveDate) -> Vec<&CalendarEvent> {
        let mut events: Vec<&CalendarEvent> = self
            .visible_events()
            .into_iter()
            .filter(|e| local_date(e.start_time) <= day && day <= local_date(e.end_time))
            .collect();
        events.sort_by_key(|e| e.start_time);
        events
    }

    pub fn week_days(&self) -> Vec<NaiveDate> {
        let start = week_start(self.selected_day);
        (0..7).map(|i| start + Duration::days(i)).collect()
    }

    pub fn selected_event(&self) -> Option<&CalendarEvent> {
        self.selected_event
            .and_then(|id| self.day_events(self.selected_day).into_iter().find(|e| e.id == id))
    }

    pub fn go_to_day(&mut self, day: NaiveDate) {
        self.selected_day = day;
        self.selected_event = None;
        self.reselect_event();
    }

    pub fn toggle_filter(&mut self, project_id: Uuid) {
        self.filter = if self.filter == Some(project_id) { None } else { Some(project_id) };
        self.reselect_event();
    }

    pub fn clear_filter(&mut self) {
        self.filter = None;
        self.reselect_event();
    }

    fn reselect_event(&mut self) {
        let day_events = self.day_events(self.selected_day);
        let keep = self
            .selected_event
            .filter(|id| day_events.iter().any(|e| e.id == *id));
        self.selected_event = keep.or_else(|| day_events.first().map(|e| e.id));
    }

    fn step_event(&mut self, forward: bool) {
        let ids: Vec<Uuid> = self.day_events(self.selected_day).iter().map(|e| e.id).collect();
        if ids.is_empty() {
            return;
        }
        let current = self.selected_event.and_then(|id| ids.iter().position(|i| *i == id));
        let next = match (current, forward) {
            (None, _) => 0,
            (Some(i), true) => (i + 1) % ids.len(),
            (Some(i), false) => (i + ids.len() - 1) % ids.len(),
        };
        self.selected_event = Some(ids[next]);
    }

    /// Shifts the selected event locally and returns the write to persist
    fn shift_selected(&mut self, start_by: Duration, end_by: Duration) -> Option<CalendarAction> {
        let id = self.selected_event?;
        let event = self.events.iter_mut().find(|e| e.id == id)?;

        let start = event.start_time + start_by;
        let end = event.end_time + end_by;
        if end <= start {
            return None;
        }
        event.start_time = start;
        event.end_time = end;

        let day = local_date(start);
        if day != self.selected_day {
            self.selected_day = day;
        }
        Some(CalendarAction::MoveEvent { id, start, end })
    }

    /// Hours of the visible events starting in the selected week
    pub fn week_hours(&self) -> f64 {
        let days = self.week_days();
        let (first, last) = (days[0], days[6]);
        let week: Vec<CalendarEvent> = self
            .visible_events()
            .into_iter()
            .filter(|e| {
                let day = local_date(e.start_time);
                first <= day && day <= last
            })
            .cloned()
            .collect();
        total_hours(&week, self.weighting)
    }
}

pub fn render_calendar<B: Backend>(f: &mut Frame<B>, state: &mut CalendarState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
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

    render_header(f, state, chunks[0]);

    let body = if state.show_sidebar {
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(35), Constraint::Percentage(65)].as_ref())
            .split(chunks[1]);
        render_projects(f, columns[0], &mut state.projects, &state.events, state.weighting, state.filter);
        columns[1]
    } else {
        chunks[1]
    };
    render_week(f, state, body);

    let status = Paragraph::new(state.status.clone().unwrap_or_default()).style(Style::default().fg(Color::Yellow));
    f.render_widget(status, chunks[2]);

    let help_text = if state.show_sidebar {
        "Sidebar open | <P> Close sidebar"
    } else {
        "<←/→> Day <↑/↓> Event <,/.> Week <T>oday | <N>ew <Enter> Edit <D>elete | <H/L> Day <K/J> 30m <+/-> Length | <P>rojects <C>lear <A>vatar L<o>gout <Q>uit"
    };
    let help = Paragraph::new(help_text)
        .style(Style::default().fg(Color::Gray))
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(help, chunks[3]);

    if state.show_delete_confirmation {
        if let Some(event) = state.selected_event() {
            render_confirmation(f, "Delete Event", vec![format!("Delete \"{}\"?", event.title)]);
        }
    }
}

fn render_header<B: Backend>(f: &mut Frame<B>, state: &CalendarState, area: Rect) {
    let days = state.week_days();
    let mut spans = vec![
        Span::styled("Luzon", Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)),
        Span::raw(format!(
            "  {} – {}",
            days[0].format("%b %-d"),
            days[6].format("%b %-d, %Y")
        )),
        Span::raw(format!("  ·  {} this week", format_hours(state.week_hours()))),
    ];
    if let Some(project) = state.filter.and_then(|id| state.projects.project(id)) {
        spans.push(Span::raw("  ·  "));
        spans.push(Span::styled(
            format!(" {} ", project.title),
            Style::default()
                .bg(to_terminal_color(&project.color))
                .fg(to_terminal_color(contrast_color(&project.color))),
        ));
    }
    spans.push(Span::raw(format!("  ·  {} ({})", state.user.name, state.user.initial())));

    let header = Paragraph::new(Spans::from(spans)).block(Block::default().borders(Borders::ALL));
    f.render_widget(header, area);
}

fn render_week<B: Backend>(f: &mut Frame<B>, state: &CalendarState, area: Rect) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 7); 7].as_ref())
        .split(area);
    let today = Local::now().date_naive();

    for (day, column) in state.week_days().into_iter().zip(columns.iter()) {
        let items: Vec<ListItem> = state
            .day_events(day)
            .into_iter()
            .map(|event| {
                let project = event.project_id.and_then(|id| state.projects.project(id));
                let color = event_color(event, project);
                let time = if event.all_day {
                    "all day".to_string()
                } else {
                    event.start_time.with_timezone(&Local).format("%H:%M").to_string()
                };

                let mut style = Style::default().fg(to_terminal_color(color));
                if day == state.selected_day && Some(event.id) == state.selected_event {
                    style = style.add_modifier(Modifier::REVERSED | Modifier::BOLD);
                }
                let mut lines = vec![Spans::from(Span::styled(format!("{} {}", time, event.title), style))];
                if !event.assignees.is_empty() {
                    let names: Vec<&str> = event.assignees.iter().map(|a| a.user_name.as_str()).collect();
                    lines.push(Spans::from(Span::styled(
                        format!("  {}", names.join(", ")),
                        Style::default().fg(Color::Gray),
                    )));
                }
                ListItem::new(lines)
            })
            .collect();

        let mut title_style = Style::default();
        if day == today {
            title_style = title_style.fg(Color::Cyan).add_modifier(Modifier::BOLD);
        }
        let border_style = if day == state.selected_day {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default()
        };

        let list = List::new(items).block(
            Block::default()
                .title(Span::styled(day.format("%a %-d").to_string(), title_style))
                .borders(Borders::ALL)
                .border_style(border_style),
        );
        f.render_widget(list, *column);
    }
}

pub fn handle_input(state: &mut CalendarState, key: KeyCode) -> Result<Option<CalendarAction>> {
    if state.show_delete_confirmation {
        match key {
            KeyCode::Char('y') | KeyCode::Char('Y') => {
                state.show_delete_confirmation = false;
                if let Some(id) = state.selected_event {
                    return Ok(Some(CalendarAction::DeleteEvent(id)));
                }
            }
            KeyCode::Char('n') | KeyCode::Esc => state.show_delete_confirmation = false,
            _ => {}
        }
        return Ok(None);
    }

    if state.show_sidebar {
        return match projects::handle_input(&mut state.projects, key)? {
            Some(ProjectAction::Close) => {
                state.show_sidebar = false;
                Ok(None)
            }
            Some(ProjectAction::ToggleFilter(id)) => {
                state.toggle_filter(id);
                state.show_sidebar = false;
                Ok(None)
            }
            Some(action) => Ok(Some(CalendarAction::Project(action))),
            None => Ok(None),
        };
    }

    state.status = None;
    let step = Duration::minutes(STEP_MINUTES);
    match key {
        KeyCode::Char('q') => return Ok(Some(CalendarAction::Quit)),
        KeyCode::Char('o') => return Ok(Some(CalendarAction::Logout)),
        KeyCode::Char('a') => return Ok(Some(CalendarAction::Avatar)),
        KeyCode::Char('p') => state.show_sidebar = true,
        KeyCode::Char('c') => state.clear_filter(),
        KeyCode::Left => state.go_to_day(state.selected_day - Duration::days(1)),
        KeyCode::Right => state.go_to_day(state.selected_day + Duration::days(1)),
        KeyCode::Char(',') => state.go_to_day(state.selected_day - Duration::days(7)),
        KeyCode::Char('.') => state.go_to_day(state.selected_day + Duration::days(7)),
        KeyCode::Char('t') => state.go_to_day(Local::now().date_naive()),
        KeyCode::Up => state.step_event(false),
        KeyCode::Down => state.step_event(true),
        KeyCode::Char('n') => return Ok(Some(CalendarAction::NewEvent(state.selected_day))),
        KeyCode::Enter => {
            if let Some(id) = state.selected_event {
                return Ok(Some(CalendarAction::EditEvent(id)));
            }
        }
        KeyCode::Char('d') => {
            if state.selected_event.is_some() {
                state.show_delete_confirmation = true;
            }
        }
        KeyCode::Char('H') => return Ok(state.shift_selected(-Duration::days(1), -Duration::days(1))),
        KeyCode::Char('L') => return Ok(state.shift_selected(Duration::days(1), Duration::days(1))),
        KeyCode::Char('K') => return Ok(state.shift_selected(-step, -step)),
        KeyCode::Char('J') => return Ok(state.shift_selected(step, step)),
        KeyCode::Char('+') => return Ok(state.shift_selected(Duration::zero(), step)),
        KeyCode::Char('-') => return Ok(state.shift_selected(Duration::zero(), -step)),
        _ => {}
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;

    use crate::models::ProjectStatus;
    use crate::ui::event_wizard::to_utc;

    fn user() -> User {
        User {
            id: Uuid::new_v4(),
            name: "Kiper".to_string(),
            avatar_url: None,
            created_at: Utc::now(),
        }
    }

    fn project() -> Project {
        Project {
            id: Uuid::new_v4(),
            title: "Site".to_string(),
            color: "#A8C5E3".to_string(),
            description: None,
            status: ProjectStatus::InProgress,
            created_by: Uuid::new_v4(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn event(day: NaiveDate, from: u32, to: u32, project_id: Option<Uuid>) -> CalendarEvent {
        let at = |h| to_utc(day.and_time(NaiveTime::from_hms_opt(h, 0, 0).unwrap()));
        CalendarEvent {
            id: Uuid::new_v4(),
            project_id,
            user_id: Uuid::new_v4(),
            title: "Work".to_string(),
            description: None,
            start_time: at(from),
            end_time: at(to),
            all_day: false,
            color: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            assignees: vec![],
        }
    }

    fn monday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 10).unwrap()
    }

    fn state_with(events: Vec<CalendarEvent>, projects: Vec<Project>) -> CalendarState {
        let mut state = CalendarState::new(user(), vec![], projects, events, HoursWeighting::PerAssignee, None);
        state.go_to_day(monday());
        state
    }

    #[test]
    fn week_starts_on_monday() {
        let sunday = NaiveDate::from_ymd_opt(2025, 3, 16).unwrap();
        assert_eq!(week_start(sunday), monday());
        assert_eq!(week_start(monday()), monday());
    }

    #[test]
    fn filter_hides_other_projects() {
        let p = project();
        let events = vec![event(monday(), 9, 10, Some(p.id)), event(monday(), 11, 12, None)];
        let mut state = state_with(events, vec![p.clone()]);
        assert_eq!(state.day_events(monday()).len(), 2);

        state.toggle_filter(p.id);
        assert_eq!(state.day_events(monday()).len(), 1);
        state.toggle_filter(p.id);
        assert_eq!(state.filter, None);
    }

    #[test]
    fn sidebar_selection_filters_and_closes() {
        let p = project();
        let mut state = state_with(vec![], vec![p.clone()]);
        handle_input(&mut state, KeyCode::Char('p')).unwrap();
        assert!(state.show_sidebar);

        handle_input(&mut state, KeyCode::Enter).unwrap();

        assert!(!state.show_sidebar);
        assert_eq!(state.filter, Some(p.id));
        handle_input(&mut state, KeyCode::Char('c')).unwrap();
        assert_eq!(state.filter, None);
    }

    #[test]
    fn move_shifts_by_half_hours_and_days() {
        let e = event(monday(), 9, 10, None);
        let (id, start, end) = (e.id, e.start_time, e.end_time);
        let mut state = state_with(vec![e], vec![]);

        let action = handle_input(&mut state, KeyCode::Char('J')).unwrap();
        assert_eq!(
            action,
            Some(CalendarAction::MoveEvent {
                id,
                start: start + Duration::minutes(30),
                end: end + Duration::minutes(30),
            })
        );

        handle_input(&mut state, KeyCode::Char('L')).unwrap();
        assert_eq!(state.selected_day, monday() + Duration::days(1));
        assert_eq!(state.selected_event().map(|e| e.id), Some(id));
    }

    #[test]
    fn resize_never_ends_before_start() {
        let e = event(monday(), 9, 10, None);
        let mut state = state_with(vec![e], vec![]);

        assert!(handle_input(&mut state, KeyCode::Char('-')).unwrap().is_some());
        assert!(handle_input(&mut state, KeyCode::Char('-')).unwrap().is_none());
        let event = state.selected_event().unwrap();
        assert_eq!(event.end_time - event.start_time, Duration::minutes(30));
    }

    #[test]
    fn delete_asks_first() {
        let e = event(monday(), 9, 10, None);
        let id = e.id;
        let mut state = state_with(vec![e], vec![]);

        assert_eq!(handle_input(&mut state, KeyCode::Char('d')).unwrap(), None);
        assert_eq!(handle_input(&mut state, KeyCode::Char('n')).unwrap(), None);
        handle_input(&mut state, KeyCode::Char('d')).unwrap();
        assert_eq!(
            handle_input(&mut state, KeyCode::Char('y')).unwrap(),
            Some(CalendarAction::DeleteEvent(id))
        );
    }

    #[test]
    fn deleted_project_clears_filter() {
        let p = project();
        let mut state = state_with(vec![], vec![p.clone()]);
        state.toggle_filter(p.id);
        state.apply_project_change(ChangeOp::Delete, p.id, None);
        assert_eq!(state.filter, None);
    }

    #[test]
    fn week_hours_follow_weighting() {
        let e = event(monday(), 9, 11, None);
        let state = state_with(vec![e], vec![]);
        assert_eq!(state.week_hours(), 2.0);
    }
}
