use std::fmt;

use chrono::{DateTime, Utc};
use uuid::Uuid;

#[derive(sqlx::Type, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[sqlx(type_name = "project_status", rename_all = "snake_case")]
pub enum ProjectStatus {
    #[default]
    InProgress,
    WaitingPayment,
    Completed,
}

impl ProjectStatus {
    pub const ALL: [ProjectStatus; 3] = [
        ProjectStatus::InProgress,
        ProjectStatus::WaitingPayment,
        ProjectStatus::Completed,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ProjectStatus::InProgress => "In progress",
            ProjectStatus::WaitingPayment => "Waiting payment",
            ProjectStatus::Completed => "Completed",
        }
    }

    /// Column to the right on the status board, if any
    pub fn next(&self) -> Option<ProjectStatus> {
        match self {
            ProjectStatus::InProgress => Some(ProjectStatus::WaitingPayment),
            ProjectStatus::WaitingPayment => Some(ProjectStatus::Completed),
            ProjectStatus::Completed => None,
        }
    }

    pub fn previous(&self) -> Option<ProjectStatus> {
        match self {
            ProjectStatus::InProgress => None,
            ProjectStatus::WaitingPayment => Some(ProjectStatus::InProgress),
            ProjectStatus::Completed => Some(ProjectStatus::WaitingPayment),
        }
    }

    pub fn column(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(sqlx::FromRow, Debug, Clone, PartialEq)]
pub struct Project {
    pub id: Uuid,
    pub title: String,
    pub color: String,
    pub description: Option<String>,
    pub status: ProjectStatus,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_columns_walk_in_order() {
        assert_eq!(ProjectStatus::InProgress.next(), Some(ProjectStatus::WaitingPayment));
        assert_eq!(ProjectStatus::WaitingPayment.next(), Some(ProjectStatus::Completed));
        assert_eq!(ProjectStatus::Completed.next(), None);
        assert_eq!(ProjectStatus::InProgress.previous(), None);
        assert_eq!(ProjectStatus::Completed.previous(), Some(ProjectStatus::WaitingPayment));
    }

    #[test]
    fn column_matches_position_in_all() {
        for (i, status) in ProjectStatus::ALL.iter().enumerate() {
            assert_eq!(status.column(), i);
        }
    }
}
