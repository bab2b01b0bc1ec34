use chrono::{DateTime, Utc};
use uuid::Uuid;

#[derive(sqlx::FromRow, Debug, Clone, PartialEq)]
pub struct EventAssignee {
    pub id: Uuid,
    pub event_id: Uuid,
    pub user_id: Uuid,
    pub user_name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow, Debug, Clone, PartialEq)]
pub struct CalendarEvent {
    pub id: Uuid,
    pub project_id: Option<Uuid>,
    /// Creator of the event. Older rows predate assignees and only carry this.
    pub user_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub all_day: bool,
    pub color: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[sqlx(skip)]
    pub assignees: Vec<EventAssignee>,
}

impl CalendarEvent {
    pub fn is_assigned_to(&self, user_id: Uuid) -> bool {
        self.assignees.iter().any(|a| a.user_id == user_id) || self.user_id == user_id
    }

    pub fn assignee_ids(&self) -> Vec<Uuid> {
        self.assignees.iter().map(|a| a.user_id).collect()
    }
}

/// Field values for creating or updating an event
#[derive(Debug, Clone, PartialEq)]
pub struct EventDraft {
    pub title: String,
    pub description: Option<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub all_day: bool,
    pub color: Option<String>,
    pub project_id: Option<Uuid>,
    pub assignee_user_ids: Vec<Uuid>,
}
