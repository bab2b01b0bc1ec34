pub mod feed;

use std::collections::HashMap;

use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

use crate::auth::UserDirectory;
use crate::config::Config;
use crate::models::{
    CalendarEvent, ChecklistItem, EventAssignee, EventDraft, Project, ProjectFinancials, ProjectNote,
    ProjectStatus, User,
};

const FINANCIALS_COLUMNS: &str = r#"
    id,
    project_id,
    month,
    income::float8 AS income,
    expenses::float8 AS expenses,
    notes,
    created_at,
    updated_at
"#;

const ASSIGNEES_QUERY: &str = r#"
    SELECT a.id, a.event_id, a.user_id, u.name AS user_name, a.created_at
    FROM event_assignees a
    JOIN users u ON u.id = a.user_id
"#;

/// Fields of a project the project wizard edits
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectDraft {
    pub title: String,
    pub color: String,
    pub description: Option<String>,
    pub status: ProjectStatus,
}

/// Database connection pool
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Create a new Database instance with a connection pool
    pub async fn new(config: &Config) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(config.database_url())
            .await?;

        Ok(Self { pool })
    }

    /// Get a reference to the connection pool
    pub fn get_pool(&self) -> &PgPool {
        &self.pool
    }

    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!().run(self.get_pool()).await?;
        Ok(())
    }

    // User operations
    pub async fn load_users(&self) -> Result<Vec<User>> {
        let users = sqlx::query_as::<_, User>("SELECT * FROM users ORDER BY name ASC")
            .fetch_all(self.get_pool())
            .await?;

        Ok(users)
    }

    pub async fn get_user(&self, id: Uuid) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(self.get_pool())
            .await?;

        Ok(user)
    }

    pub async fn get_user_by_name(&self, name: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE name = $1")
            .bind(name)
            .fetch_optional(self.get_pool())
            .await?;

        Ok(user)
    }

    pub async fn update_user_avatar(&self, id: Uuid, avatar_url: &str) -> Result<()> {
        sqlx::query("UPDATE users SET avatar_url = $1 WHERE id = $2")
            .bind(avatar_url)
            .bind(id)
            .execute(self.get_pool())
            .await?;

        Ok(())
    }

    // Project operations
    pub async fn load_projects(&self) -> Result<Vec<Project>> {
        let projects = sqlx::query_as::<_, Project>("SELECT * FROM projects ORDER BY created_at DESC")
            .fetch_all(self.get_pool())
            .await?;

        Ok(projects)
    }

    pub async fn get_project(&self, id: Uuid) -> Result<Option<Project>> {
        let project = sqlx::query_as::<_, Project>("SELECT * FROM projects WHERE id = $1")
            .bind(id)
            .fetch_optional(self.get_pool())
            .await?;

        Ok(project)
    }

    pub async fn create_project(&self, project: &ProjectDraft, created_by: Uuid) -> Result<Project> {
        let project = sqlx::query_as::<_, Project>(
            r#"
            INSERT INTO projects (title, color, description, status, created_by)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(&project.title)
        .bind(&project.color)
        .bind(&project.description)
        .bind(project.status)
        .bind(created_by)
        .fetch_one(self.get_pool())
        .await?;

        Ok(project)
    }

    pub async fn update_project(&self, id: Uuid, project: &ProjectDraft) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE projects
            SET title = $1, color = $2, description = $3, status = $4, updated_at = now()
            WHERE id = $5
            "#,
        )
        .bind(&project.title)
        .bind(&project.color)
        .bind(&project.description)
        .bind(project.status)
        .bind(id)
        .execute(self.get_pool())
        .await?;

        Ok(())
    }

    pub async fn update_project_status(&self, id: Uuid, status: ProjectStatus) -> Result<()> {
        sqlx::query("UPDATE projects SET status = $1, updated_at = now() WHERE id = $2")
            .bind(status)
            .bind(id)
            .execute(self.get_pool())
            .await?;

        Ok(())
    }

    /// Events of the project keep existing with no project
    pub async fn delete_project(&self, id: Uuid) -> Result<()> {
        sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id)
            .execute(self.get_pool())
            .await?;

        Ok(())
    }

    // Note operations
    pub async fn get_project_note(&self, project_id: Uuid) -> Result<Option<ProjectNote>> {
        let note = sqlx::query_as::<_, ProjectNote>(
            r#"
            SELECT * FROM project_notes
            WHERE project_id = $1
            ORDER BY created_at DESC
            LIMIT 1
            "#,
        )
        .bind(project_id)
        .fetch_optional(self.get_pool())
        .await?;

        Ok(note)
    }

    /// Overwrites the existing note, or creates the first one
    pub async fn save_project_note(
        &self,
        project_id: Uuid,
        existing: Option<Uuid>,
        content: &str,
        updated_by: Uuid,
    ) -> Result<ProjectNote> {
        let note = match existing {
            Some(id) => {
                sqlx::query_as::<_, ProjectNote>(
                    r#"
                    UPDATE project_notes
                    SET content = $1, updated_by = $2, updated_at = now()
                    WHERE id = $3
                    RETURNING *
                    "#,
                )
                .bind(content)
                .bind(updated_by)
                .bind(id)
                .fetch_one(self.get_pool())
                .await?
            }
            None => {
                sqlx::query_as::<_, ProjectNote>(
                    r#"
                    INSERT INTO project_notes (project_id, content, updated_by)
                    VALUES ($1, $2, $3)
                    RETURNING *
                    "#,
                )
                .bind(project_id)
                .bind(content)
                .bind(updated_by)
                .fetch_one(self.get_pool())
                .await?
            }
        };

        Ok(note)
    }

    // Checklist operations
    pub async fn load_checklist(&self, project_id: Uuid) -> Result<Vec<ChecklistItem>> {
        let items = sqlx::query_as::<_, ChecklistItem>(
            "SELECT * FROM project_checklist_items WHERE project_id = $1 ORDER BY item_order ASC",
        )
        .bind(project_id)
        .fetch_all(self.get_pool())
        .await?;

        Ok(items)
    }

    pub async fn add_checklist_item(&self, project_id: Uuid, text: &str, item_order: f64) -> Result<Uuid> {
        let id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO project_checklist_items (project_id, text, completed, item_order)
            VALUES ($1, $2, false, $3)
            RETURNING id
            "#,
        )
        .bind(project_id)
        .bind(text)
        .bind(item_order)
        .fetch_one(self.get_pool())
        .await?;

        Ok(id)
    }

    pub async fn set_checklist_item_completed(&self, id: Uuid, completed: bool) -> Result<()> {
        sqlx::query("UPDATE project_checklist_items SET completed = $1 WHERE id = $2")
            .bind(completed)
            .bind(id)
            .execute(self.get_pool())
            .await?;

        Ok(())
    }

    pub async fn delete_checklist_item(&self, id: Uuid) -> Result<()> {
        sqlx::query("DELETE FROM project_checklist_items WHERE id = $1")
            .bind(id)
            .execute(self.get_pool())
            .await?;

        Ok(())
    }

    /// One write per moved row
    pub async fn reorder_checklist(&self, orders: &[(Uuid, f64)]) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        for (id, order) in orders {
            sqlx::query("UPDATE project_checklist_items SET item_order = $1 WHERE id = $2")
                .bind(order)
                .bind(id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        debug!(rows = orders.len(), "checklist reordered");

        Ok(())
    }

    // Financials operations
    pub async fn load_financials(&self, project_id: Uuid) -> Result<Vec<ProjectFinancials>> {
        let query = format!(
            "SELECT {} FROM project_financials WHERE project_id = $1 ORDER BY month DESC",
            FINANCIALS_COLUMNS
        );
        let months = sqlx::query_as::<_, ProjectFinancials>(&query)
            .bind(project_id)
            .fetch_all(self.get_pool())
            .await?;

        Ok(months)
    }

    pub async fn upsert_financials(
        &self,
        project_id: Uuid,
        month: &str,
        income: f64,
        expenses: f64,
        notes: Option<&str>,
    ) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO project_financials (project_id, month, income, expenses, notes)
            VALUES ($1, $2, $3::float8, $4::float8, $5)
            ON CONFLICT (project_id, month)
            DO UPDATE SET income = EXCLUDED.income,
                          expenses = EXCLUDED.expenses,
                          notes = EXCLUDED.notes,
                          updated_at = now()
            "#,
        )
        .bind(project_id)
        .bind(month)
        .bind(income)
        .bind(expenses)
        .bind(notes)
        .execute(self.get_pool())
        .await?;

        Ok(())
    }

    // Calendar event operations
    pub async fn load_events(&self) -> Result<Vec<CalendarEvent>> {
        let mut events = sqlx::query_as::<_, CalendarEvent>(
            "SELECT * FROM calendar_events ORDER BY start_time ASC",
        )
        .fetch_all(self.get_pool())
        .await?;

        let query = format!("{} ORDER BY a.created_at ASC", ASSIGNEES_QUERY);
        let assignees = sqlx::query_as::<_, EventAssignee>(&query)
            .fetch_all(self.get_pool())
            .await?;

        attach_assignees(&mut events, assignees);

        Ok(events)
    }

    pub async fn get_event(&self, id: Uuid) -> Result<Option<CalendarEvent>> {
        let event = sqlx::query_as::<_, CalendarEvent>("SELECT * FROM calendar_events WHERE id = $1")
            .bind(id)
            .fetch_optional(self.get_pool())
            .await?;

        let Some(mut event) = event else {
            return Ok(None);
        };

        let query = format!("{} WHERE a.event_id = $1 ORDER BY a.created_at ASC", ASSIGNEES_QUERY);
        event.assignees = sqlx::query_as::<_, EventAssignee>(&query)
            .bind(id)
            .fetch_all(self.get_pool())
            .await?;

        Ok(Some(event))
    }

    /// Inserts the event and its assignee rows together
    pub async fn create_event(&self, draft: &EventDraft, created_by: Uuid) -> Result<Uuid> {
        let mut tx = self.pool.begin().await?;

        let id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO calendar_events
                (project_id, user_id, title, description, start_time, end_time, all_day, color)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id
            "#,
        )
        .bind(draft.project_id)
        .bind(created_by)
        .bind(&draft.title)
        .bind(&draft.description)
        .bind(draft.start_time)
        .bind(draft.end_time)
        .bind(draft.all_day)
        .bind(&draft.color)
        .fetch_one(&mut *tx)
        .await?;

        for user_id in &draft.assignee_user_ids {
            sqlx::query("INSERT INTO event_assignees (event_id, user_id) VALUES ($1, $2)")
                .bind(id)
                .bind(user_id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        Ok(id)
    }

    /// Updates the fields and replaces the assignee set
    pub async fn update_event(&self, id: Uuid, draft: &EventDraft) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            UPDATE calendar_events
            SET project_id = $1, title = $2, description = $3, start_time = $4,
                end_time = $5, all_day = $6, color = $7, updated_at = now()
            WHERE id = $8
            "#,
        )
        .bind(draft.project_id)
        .bind(&draft.title)
        .bind(&draft.description)
        .bind(draft.start_time)
        .bind(draft.end_time)
        .bind(draft.all_day)
        .bind(&draft.color)
        .bind(id)
        .execute(&mut *tx)
        .await?;

        sqlx::query("DELETE FROM event_assignees WHERE event_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        for user_id in &draft.assignee_user_ids {
            sqlx::query("INSERT INTO event_assignees (event_id, user_id) VALUES ($1, $2)")
                .bind(id)
                .bind(user_id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        Ok(())
    }

    /// Moving or resizing an event on the grid
    pub async fn update_event_time(
        &self,
        id: Uuid,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
    ) -> Result<()> {
        sqlx::query(
            "UPDATE calendar_events SET start_time = $1, end_time = $2, updated_at = now() WHERE id = $3",
        )
        .bind(start_time)
        .bind(end_time)
        .bind(id)
        .execute(self.get_pool())
        .await?;

        Ok(())
    }

    pub async fn delete_event(&self, id: Uuid) -> Result<()> {
        sqlx::query("DELETE FROM calendar_events WHERE id = $1")
            .bind(id)
            .execute(self.get_pool())
            .await?;

        Ok(())
    }
}

impl UserDirectory for Database {
    async fn find_user_by_name(&self, name: &str) -> Result<Option<User>> {
        self.get_user_by_name(name).await
    }

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>> {
        self.get_user(id).await
    }
}

/// Distributes assignee rows onto their events
pub fn attach_assignees(events: &mut [CalendarEvent], assignees: Vec<EventAssignee>) {
    let mut by_event: HashMap<Uuid, Vec<EventAssignee>> = HashMap::new();
    for assignee in assignees {
        by_event.entry(assignee.event_id).or_default().push(assignee);
    }
    for event in events.iter_mut() {
        event.assignees = by_event.remove(&event.id).unwrap_or_default();
    }
}

/// Initialize the database connection pool
pub async fn init(config: &Config) -> Result<Database> {
    let db = Database::new(config).await?;

    Ok(db)
}
