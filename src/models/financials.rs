use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Income and expenses of one project for one calendar month
#[derive(sqlx::FromRow, Debug, Clone, PartialEq)]
pub struct ProjectFinancials {
    pub id: Uuid,
    pub project_id: Uuid,
    /// `YYYY-MM`
    pub month: String,
    pub income: f64,
    pub expenses: f64,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ProjectFinancials {
    pub fn profit(&self) -> f64 {
        self.income - self.expenses
    }
}
