use chrono::{DateTime, Utc};
use uuid::Uuid;

#[derive(sqlx::FromRow, Debug, Clone, PartialEq)]
pub struct ChecklistItem {
    pub id: Uuid,
    pub project_id: Uuid,
    pub text: String,
    pub completed: bool,
    pub item_order: f64,
    pub created_at: DateTime<Utc>,
}
