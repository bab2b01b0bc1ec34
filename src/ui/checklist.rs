use anyhow::Result;
use crossterm::event::KeyCode;
use tui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Span, Spans},
    widgets::{Block, Borders, Gauge, List, ListItem, ListState, Paragraph},
    Frame,
};
use uuid::Uuid;

use crate::models::{ChecklistItem, Project};
use crate::ordering::{next_order_key, reorder};
use crate::ui::components::popup::error_line;
use crate::ui::components::text_input::edit_text;

#[derive(Debug, PartialEq)]
pub enum ChecklistAction {
    Close,
    Add { text: String, item_order: f64 },
    SetCompleted(Uuid, bool),
    Delete(Uuid),
    Reorder(Vec<(Uuid, f64)>),
}

pub struct ChecklistState {
    pub project_id: Uuid,
    pub project_title: String,
    items: Vec<ChecklistItem>,
    list_state: ListState,
    pub adding: bool,
    pub new_text: String,
    pub error: Option<String>,
}

impl ChecklistState {
    pub fn new(project: &Project, items: Vec<ChecklistItem>) -> Self {
        let mut state = Self {
            project_id: project.id,
            project_title: project.title.clone(),
            items: Vec::new(),
            list_state: ListState::default(),
            adding: false,
            new_text: String::new(),
            error: None,
        };
        state.replace(items);
        state
    }

    pub fn items(&self) -> &[ChecklistItem] {
        &self.items
    }

    /// Fresh rows from the database, already sorted by order
    pub fn replace(&mut self, items: Vec<ChecklistItem>) {
        let selected = self.selected().map(|i| i.id);
        self.items = items;
        let index = selected
            .and_then(|id| self.items.iter().position(|i| i.id == id))
            .or_else(|| (!self.items.is_empty()).then_some(0))
            .map(|i| i.min(self.items.len().saturating_sub(1)));
        self.list_state.select(if self.items.is_empty() { None } else { index });
    }

    pub fn completed_count(&self) -> usize {
        self.items.iter().filter(|i| i.completed).count()
    }

    /// e.g. "2 of 5 completed"
    pub fn progress(&self) -> String {
        format!("{} of {} completed", self.completed_count(), self.items.len())
    }

    pub fn selected(&self) -> Option<&ChecklistItem> {
        self.list_state.selected().and_then(|i| self.items.get(i))
    }

    pub fn next(&mut self) {
        if self.items.is_empty() {
            return;
        }
        let i = self.list_state.selected().map_or(0, |i| (i + 1) % self.items.len());
        self.list_state.select(Some(i));
    }

    pub fn previous(&mut self) {
        if self.items.is_empty() {
            return;
        }
        let i = self
            .list_state
            .selected()
            .map_or(0, |i| (i + self.items.len() - 1) % self.items.len());
        self.list_state.select(Some(i));
    }

    /// Moves the selected item and returns the new keys to write
    fn move_selected(&mut self, down: bool) -> Option<Vec<(Uuid, f64)>> {
        let from = self.list_state.selected()?;
        let to = if down {
            (from + 1 < self.items.len()).then_some(from + 1)?
        } else {
            from.checked_sub(1)?
        };

        let writes = reorder(&mut self.items, from, to);
        for item in self.items.iter_mut() {
            if let Some((_, order)) = writes.iter().find(|(id, _)| *id == item.id) {
                item.item_order = *order;
            }
        }
        self.list_state.select(Some(to));
        Some(writes)
    }
}

pub fn render_checklist<B: Backend>(f: &mut Frame<B>, state: &mut ChecklistState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(2)
        .constraints(
            [
                Constraint::Length(3),
                Constraint::Min(3),
                Constraint::Length(3),
                Constraint::Length(1),
                Constraint::Length(3),
            ]
            .as_ref(),
        )
        .split(f.size());

    let ratio = if state.items.is_empty() {
        0.0
    } else {
        state.completed_count() as f64 / state.items.len() as f64
    };
    let gauge = Gauge::default()
        .block(
            Block::default()
                .title(format!("Checklist · {}", state.project_title))
                .borders(Borders::ALL),
        )
        .gauge_style(Style::default().fg(Color::Green))
        .label(state.progress())
        .ratio(ratio);
    f.render_widget(gauge, chunks[0]);

    let items: Vec<ListItem> = state
        .items
        .iter()
        .map(|item| {
            let (mark, style) = if item.completed {
                ("[x] ", Style::default().fg(Color::Gray).add_modifier(Modifier::CROSSED_OUT))
            } else {
                ("[ ] ", Style::default())
            };
            ListItem::new(Spans::from(vec![Span::raw(mark), Span::styled(item.text.clone(), style)]))
        })
        .collect();
    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL))
        .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD));
    f.render_stateful_widget(list, chunks[1], &mut state.list_state);

    let input_style = if state.adding { Style::default().fg(Color::Yellow) } else { Style::default() };
    let input = Paragraph::new(format!("{}{}", state.new_text, if state.adding { "|" } else { "" }))
        .style(input_style)
        .block(Block::default().title("Add an item").borders(Borders::ALL));
    f.render_widget(input, chunks[2]);

    f.render_widget(error_line(&state.error), chunks[3]);

    let help_text = if state.adding {
        "Enter - Add | Esc - Cancel"
    } else {
        "<A>dd | <Space> Toggle | <D>elete | <K>/<J> Move up/down | <Esc> Close"
    };
    let help = Paragraph::new(help_text)
        .style(Style::default().fg(Color::Gray))
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(help, chunks[4]);
}

pub fn handle_input(state: &mut ChecklistState, key: KeyCode) -> Result<Option<ChecklistAction>> {
    if state.adding {
        match key {
            KeyCode::Esc => {
                state.adding = false;
                state.new_text.clear();
            }
            KeyCode::Enter => {
                let text = state.new_text.trim().to_string();
                state.adding = false;
                state.new_text.clear();
                if !text.is_empty() {
                    return Ok(Some(ChecklistAction::Add {
                        text,
                        item_order: next_order_key(&state.items),
                    }));
                }
            }
            _ => {
                edit_text(&mut state.new_text, key);
            }
        }
        return Ok(None);
    }

    match key {
        KeyCode::Esc => return Ok(Some(ChecklistAction::Close)),
        KeyCode::Down => state.next(),
        KeyCode::Up => state.previous(),
        KeyCode::Char('a') => state.adding = true,
        KeyCode::Char(' ') => {
            if let Some(item) = state.selected() {
                return Ok(Some(ChecklistAction::SetCompleted(item.id, !item.completed)));
            }
        }
        KeyCode::Char('d') => {
            if let Some(item) = state.selected() {
                return Ok(Some(ChecklistAction::Delete(item.id)));
            }
        }
        KeyCode::Char('K') | KeyCode::Char('J') => {
            if let Some(writes) = state.move_selected(key == KeyCode::Char('J')) {
                if !writes.is_empty() {
                    return Ok(Some(ChecklistAction::Reorder(writes)));
                }
            }
        }
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

    fn items(project_id: Uuid, n: usize) -> Vec<ChecklistItem> {
        (0..n)
            .map(|i| ChecklistItem {
                id: Uuid::new_v4(),
                project_id,
                text: format!("item {}", i),
                completed: i == 0,
                item_order: i as f64,
                created_at: Utc::now(),
            })
            .collect()
    }

    #[test]
    fn progress_counts_completed_items() {
        let p = project();
        let state = ChecklistState::new(&p, items(p.id, 3));
        assert_eq!(state.progress(), "1 of 3 completed");
    }

    #[test]
    fn add_appends_after_last_key() {
        let p = project();
        let mut state = ChecklistState::new(&p, items(p.id, 2));
        handle_input(&mut state, KeyCode::Char('a')).unwrap();
        for c in "ship".chars() {
            handle_input(&mut state, KeyCode::Char(c)).unwrap();
        }
        assert_eq!(
            handle_input(&mut state, KeyCode::Enter).unwrap(),
            Some(ChecklistAction::Add { text: "ship".to_string(), item_order: 2.0 })
        );
    }

    #[test]
    fn move_down_swaps_with_neighbour() {
        let p = project();
        let rows = items(p.id, 3);
        let ids: Vec<Uuid> = rows.iter().map(|i| i.id).collect();
        let mut state = ChecklistState::new(&p, rows);

        let action = handle_input(&mut state, KeyCode::Char('J')).unwrap();

        assert_eq!(action, Some(ChecklistAction::Reorder(vec![(ids[1], 0.0), (ids[0], 1.0)])));
        let order: Vec<Uuid> = state.items().iter().map(|i| i.id).collect();
        assert_eq!(order, vec![ids[1], ids[0], ids[2]]);
        assert_eq!(state.selected().map(|i| i.id), Some(ids[0]));
    }

    #[test]
    fn first_item_cannot_move_up() {
        let p = project();
        let mut state = ChecklistState::new(&p, items(p.id, 2));
        assert_eq!(handle_input(&mut state, KeyCode::Char('K')).unwrap(), None);
    }

    #[test]
    fn space_toggles_selected_item() {
        let p = project();
        let rows = items(p.id, 1);
        let id = rows[0].id;
        let mut state = ChecklistState::new(&p, rows);
        assert_eq!(
            handle_input(&mut state, KeyCode::Char(' ')).unwrap(),
            Some(ChecklistAction::SetCompleted(id, false))
        );
    }
}
