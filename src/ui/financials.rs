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

use crate::financials::{format_money, normalize_notes, parse_amount, Month, MonthSummary};
use crate::models::{Project, ProjectFinancials};
use crate::ui::components::popup::error_line;
use crate::ui::components::text_input::edit_text;

#[derive(Debug, PartialEq)]
pub enum FinancialsAction {
    Close,
    Save {
        month: Month,
        income: f64,
        expenses: f64,
        notes: Option<String>,
    },
}

#[derive(Clone, Copy, PartialEq, Debug)]
pub enum FinancialsField {
    Income,
    Expenses,
    Notes,
}

pub struct FinancialsState {
    pub project_id: Uuid,
    pub project_title: String,
    pub month: Month,
    /// Navigation stops at the current month
    pub latest: Month,
    rows: Vec<ProjectFinancials>,
    pub income: String,
    pub expenses: String,
    pub notes: String,
    pub current_field: FinancialsField,
    pub editing: bool,
    pub error: Option<String>,
}

impl FinancialsState {
    pub fn new(project: &Project, rows: Vec<ProjectFinancials>, latest: Month) -> Self {
        let mut state = Self {
            project_id: project.id,
            project_title: project.title.clone(),
            month: latest,
            latest,
            rows,
            income: String::new(),
            expenses: String::new(),
            notes: String::new(),
            current_field: FinancialsField::Income,
            editing: false,
            error: None,
        };
        state.load_month();
        state
    }

    pub fn rows(&self) -> &[ProjectFinancials] {
        &self.rows
    }

    pub fn record(&self) -> Option<&ProjectFinancials> {
        let key = self.month.to_string();
        self.rows.iter().find(|r| r.month == key)
    }

    pub fn summary(&self) -> MonthSummary {
        MonthSummary::of(&self.rows)
    }

    /// Profit of the month being edited, from the form values
    pub fn profit(&self) -> f64 {
        parse_amount(&self.income) - parse_amount(&self.expenses)
    }

    fn load_month(&mut self) {
        let (income, expenses, notes) = match self.record() {
            Some(r) => (format!("{:.2}", r.income), format!("{:.2}", r.expenses), r.notes.clone().unwrap_or_default()),
            None => (String::new(), String::new(), String::new()),
        };
        self.income = income;
        self.expenses = expenses;
        self.notes = notes;
    }

    /// Fresh rows after a write or a remote change
    pub fn replace(&mut self, rows: Vec<ProjectFinancials>) {
        self.rows = rows;
        if !self.editing {
            self.load_month();
        }
    }

    pub fn previous_month(&mut self) {
        self.month = self.month.previous();
        self.load_month();
    }

    pub fn next_month(&mut self) {
        if let Some(next) = self.month.next_until(self.latest) {
            self.month = next;
            self.load_month();
        }
    }

    pub fn next_field(&mut self) {
        self.current_field = match self.current_field {
            FinancialsField::Income => FinancialsField::Expenses,
            FinancialsField::Expenses => FinancialsField::Notes,
            FinancialsField::Notes => FinancialsField::Income,
        };
    }

    pub fn previous_field(&mut self) {
        self.current_field = match self.current_field {
            FinancialsField::Income => FinancialsField::Notes,
            FinancialsField::Expenses => FinancialsField::Income,
            FinancialsField::Notes => FinancialsField::Expenses,
        };
    }

    /// The write for the current month when the form differs from what is stored
    fn pending_save(&self) -> Option<FinancialsAction> {
        let income = parse_amount(&self.income);
        let expenses = parse_amount(&self.expenses);
        let notes = normalize_notes(&self.notes);

        let unchanged = match self.record() {
            Some(r) => r.income == income && r.expenses == expenses && r.notes == notes,
            None => income == 0.0 && expenses == 0.0 && notes.is_none(),
        };
        if unchanged {
            return None;
        }

        Some(FinancialsAction::Save {
            month: self.month,
            income,
            expenses,
            notes,
        })
    }

    fn leave_field(&mut self) -> Option<FinancialsAction> {
        self.editing = false;
        self.pending_save()
    }

    pub fn save_failed(&mut self) {
        self.error = Some("Failed to save financials".to_string());
    }
}

pub fn render_financials<B: Backend>(f: &mut Frame<B>, state: &mut FinancialsState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(2)
        .constraints(
            [
                Constraint::Length(3),
                Constraint::Length(7),
                Constraint::Length(4),
                Constraint::Min(3),
                Constraint::Length(1),
                Constraint::Length(3),
            ]
            .as_ref(),
        )
        .split(f.size());

    let next_marker = if state.month.next_until(state.latest).is_some() { " >" } else { "  " };
    let header = Paragraph::new(format!("< {}{}", state.month.display(), next_marker))
        .style(Style::default().fg(Color::Cyan))
        .block(
            Block::default()
                .title(format!("Financials · {}", state.project_title))
                .borders(Borders::ALL),
        );
    f.render_widget(header, chunks[0]);

    render_form(f, state, chunks[1]);
    render_totals(f, state, chunks[2]);
    render_months(f, state, chunks[3]);

    f.render_widget(error_line(&state.error), chunks[4]);

    let help_text = if state.editing {
        "Enter/Tab - Save field | Esc - Done"
    } else {
        "Left/Right - Month | Up/Down - Field | Enter - Edit | Esc - Close"
    };
    let help = Paragraph::new(help_text)
        .style(Style::default().fg(Color::Gray))
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(help, chunks[5]);
}

fn render_form<B: Backend>(f: &mut Frame<B>, state: &FinancialsState, area: Rect) {
    let fields = [
        (FinancialsField::Income, "Income", &state.income),
        (FinancialsField::Expenses, "Expenses", &state.expenses),
        (FinancialsField::Notes, "Notes", &state.notes),
    ];

    let mut lines: Vec<Spans> = fields
        .iter()
        .map(|(field, name, value)| {
            let active = *field == state.current_field;
            let label_style = if active { Style::default().fg(Color::Yellow) } else { Style::default() };
            let cursor = if active && state.editing { "|" } else { "" };
            Spans::from(vec![
                Span::styled(format!("{}: ", name), label_style),
                Span::raw(format!("{}{}", value, cursor)),
            ])
        })
        .collect();

    let profit = state.profit();
    let profit_color = if profit < 0.0 { Color::Red } else { Color::Green };
    lines.push(Spans::from(""));
    lines.push(Spans::from(vec![
        Span::raw("Profit: "),
        Span::styled(format_money(profit), Style::default().fg(profit_color).add_modifier(Modifier::BOLD)),
    ]));

    let form = Paragraph::new(lines).block(Block::default().title("This month").borders(Borders::ALL));
    f.render_widget(form, area);
}

fn render_totals<B: Backend>(f: &mut Frame<B>, state: &FinancialsState, area: Rect) {
    let summary = state.summary();
    let totals = Paragraph::new(vec![
        Spans::from(format!(
            "Income {}  ·  Expenses {}",
            format_money(summary.income),
            format_money(summary.expenses)
        )),
        Spans::from(format!("Profit {}", format_money(summary.profit()))),
    ])
    .block(Block::default().title("All time").borders(Borders::ALL));
    f.render_widget(totals, area);
}

fn render_months<B: Backend>(f: &mut Frame<B>, state: &FinancialsState, area: Rect) {
    let items: Vec<ListItem> = state
        .rows
        .iter()
        .map(|r| {
            let label = r
                .month
                .parse::<Month>()
                .map(|m| m.display())
                .unwrap_or_else(|_| r.month.clone());
            let style = if r.month == state.month.to_string() {
                Style::default().add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            ListItem::new(Spans::from(vec![
                Span::styled(format!("{:<16}", label), style),
                Span::raw(format!(
                    "{:>12} {:>12} {:>12}",
                    format_money(r.income),
                    format_money(r.expenses),
                    format_money(r.profit())
                )),
            ]))
        })
        .collect();

    let list = List::new(items).block(Block::default().title("Months").borders(Borders::ALL));
    f.render_widget(list, area);
}

pub fn handle_input(state: &mut FinancialsState, key: KeyCode) -> Result<Option<FinancialsAction>> {
    if state.editing {
        let action = match key {
            KeyCode::Enter | KeyCode::Esc => state.leave_field(),
            KeyCode::Tab => {
                let action = state.leave_field();
                state.next_field();
                action
            }
            _ => {
                let buffer = match state.current_field {
                    FinancialsField::Income => &mut state.income,
                    FinancialsField::Expenses => &mut state.expenses,
                    FinancialsField::Notes => &mut state.notes,
                };
                edit_text(buffer, key);
                None
            }
        };
        return Ok(action);
    }

    match key {
        KeyCode::Esc => return Ok(Some(FinancialsAction::Close)),
        KeyCode::Enter => {
            state.editing = true;
            state.error = None;
        }
        KeyCode::Up => state.previous_field(),
        KeyCode::Down | KeyCode::Tab => state.next_field(),
        KeyCode::Left => state.previous_month(),
        KeyCode::Right => state.next_month(),
        _ => {}
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    use crate::models::ProjectStatus;

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

    fn row(project_id: Uuid, month: &str, income: f64, expenses: f64) -> ProjectFinancials {
        ProjectFinancials {
            id: Uuid::new_v4(),
            project_id,
            month: month.to_string(),
            income,
            expenses,
            notes: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn march() -> Month {
        Month::new(2025, 3).unwrap()
    }

    #[test]
    fn cannot_navigate_past_latest_month() {
        let p = project();
        let mut state = FinancialsState::new(&p, vec![], march());
        handle_input(&mut state, KeyCode::Right).unwrap();
        assert_eq!(state.month, march());
        handle_input(&mut state, KeyCode::Left).unwrap();
        assert_eq!(state.month.to_string(), "2025-02");
        handle_input(&mut state, KeyCode::Right).unwrap();
        assert_eq!(state.month, march());
    }

    #[test]
    fn leaving_a_changed_field_saves_the_month() {
        let p = project();
        let mut state = FinancialsState::new(&p, vec![], march());
        handle_input(&mut state, KeyCode::Enter).unwrap();
        for c in "1200".chars() {
            handle_input(&mut state, KeyCode::Char(c)).unwrap();
        }

        let action = handle_input(&mut state, KeyCode::Tab).unwrap();

        assert_eq!(
            action,
            Some(FinancialsAction::Save { month: march(), income: 1200.0, expenses: 0.0, notes: None })
        );
        assert_eq!(state.current_field, FinancialsField::Expenses);
        assert!(!state.editing);
    }

    #[test]
    fn leaving_an_unchanged_field_writes_nothing() {
        let p = project();
        let rows = vec![row(p.id, "2025-03", 100.0, 40.0)];
        let mut state = FinancialsState::new(&p, rows, march());
        assert_eq!(state.income, "100.00");
        handle_input(&mut state, KeyCode::Enter).unwrap();
        assert_eq!(handle_input(&mut state, KeyCode::Enter).unwrap(), None);
        assert_eq!(state.profit(), 60.0);
    }

    #[test]
    fn totals_cover_every_month() {
        let p = project();
        let rows = vec![row(p.id, "2025-02", 100.0, 40.0), row(p.id, "2025-03", 50.0, 80.0)];
        let state = FinancialsState::new(&p, rows, march());
        let summary = state.summary();
        assert_eq!(summary.income, 150.0);
        assert_eq!(summary.profit(), 30.0);
    }
}
