use anyhow::Result;
use crossterm::event::KeyCode;
use tui::{
    backend::Backend,
    style::{Color, Modifier, Style},
    text::{Span, Spans},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};
use uuid::Uuid;

use crate::ui::components::popup::centered_rect;

pub enum ShareAction {
    Close,
}

pub struct ShareState {
    pub project_title: String,
    pub web_link: Option<String>,
    pub command: String,
}

impl ShareState {
    pub fn new(project_id: Uuid, project_title: &str, base_url: Option<&str>) -> Self {
        Self {
            project_title: project_title.to_string(),
            web_link: base_url.map(|base| share_link(base, project_id)),
            command: share_command(project_id),
        }
    }
}

pub fn share_link(base_url: &str, project_id: Uuid) -> String {
    format!("{}?project={}", base_url.trim_end_matches('/'), project_id)
}

pub fn share_command(project_id: Uuid) -> String {
    format!("luzon --project {}", project_id)
}

pub fn render_share<B: Backend>(f: &mut Frame<B>, state: &ShareState) {
    let area = centered_rect(70, 40, f.size());

    let mut lines = vec![
        Spans::from(""),
        Spans::from("Anyone with access can open this project directly:"),
        Spans::from(""),
    ];
    if let Some(link) = &state.web_link {
        lines.push(Spans::from(Span::styled(link.clone(), Style::default().fg(Color::Cyan))));
    }
    lines.push(Spans::from(Span::styled(
        state.command.clone(),
        Style::default().add_modifier(Modifier::BOLD),
    )));
    lines.push(Spans::from(""));
    lines.push(Spans::from(Span::styled("<Esc> Close", Style::default().fg(Color::Gray))));

    let popup = Paragraph::new(lines)
        .block(
            Block::default()
                .title(format!("Share · {}", state.project_title))
                .borders(Borders::ALL),
        )
        .wrap(Wrap { trim: false });

    f.render_widget(Clear, area);
    f.render_widget(popup, area);
}

pub fn handle_input(_state: &mut ShareState, key: KeyCode) -> Result<Option<ShareAction>> {
    match key {
        KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q') => Ok(Some(ShareAction::Close)),
        _ => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn link_carries_project_query() {
        let id = Uuid::new_v4();
        assert_eq!(
            share_link("https://luzon.example.com/", id),
            format!("https://luzon.example.com?project={}", id)
        );
        assert_eq!(share_command(id), format!("luzon --project {}", id));
    }

    #[test]
    fn web_link_only_when_configured() {
        let id = Uuid::new_v4();
        assert!(ShareState::new(id, "Site", None).web_link.is_none());
        assert!(ShareState::new(id, "Site", Some("https://x.test")).web_link.is_some());
    }
}
