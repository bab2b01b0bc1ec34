//! Row-level change notifications.
//!
//! Every table carries an `AFTER INSERT OR UPDATE OR DELETE` trigger that
//! calls `pg_notify` on [`CHANNEL`] with a small JSON payload naming the
//! table, the operation and the affected row. The payload never carries the
//! row itself, so consumers fetch what they need.

use serde::Deserialize;
use sqlx::postgres::PgListener;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::errors::FeedError;

pub const CHANNEL: &str = "luzon_changes";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Table {
    Users,
    Projects,
    ProjectNotes,
    ProjectChecklistItems,
    ProjectFinancials,
    CalendarEvents,
    EventAssignees,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ChangeOp {
    Insert,
    Update,
    Delete,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ChangeEvent {
    pub table: Table,
    pub op: ChangeOp,
    pub id: Option<Uuid>,
    pub project_id: Option<Uuid>,
}

impl ChangeEvent {
    pub fn parse(payload: &str) -> Result<Self, FeedError> {
        Ok(serde_json::from_str(payload)?)
    }
}

/// Interest in one table, optionally narrowed to one project's rows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Subscription {
    pub table: Table,
    pub project_id: Option<Uuid>,
}

impl Subscription {
    pub fn table(table: Table) -> Self {
        Self { table, project_id: None }
    }

    pub fn for_project(table: Table, project_id: Uuid) -> Self {
        Self { table, project_id: Some(project_id) }
    }

    pub fn matches(&self, change: &ChangeEvent) -> bool {
        if self.table != change.table {
            return false;
        }
        match self.project_id {
            Some(id) => change.project_id == Some(id),
            None => true,
        }
    }
}

/// Rows that can be patched in place from a change notification
pub trait Keyed {
    fn key(&self) -> Uuid;
}

impl Keyed for crate::models::Project {
    fn key(&self) -> Uuid {
        self.id
    }
}

impl Keyed for crate::models::User {
    fn key(&self) -> Uuid {
        self.id
    }
}

/// Applies one change to a locally mirrored list.
///
/// `fresh` is the row re-read after an insert or update; `None` there means the
/// row is already gone again and is treated as a delete.
pub fn patch_list<T: Keyed>(list: &mut Vec<T>, op: ChangeOp, id: Uuid, fresh: Option<T>) {
    match (op, fresh) {
        (ChangeOp::Delete, _) | (_, None) => list.retain(|row| row.key() != id),
        (ChangeOp::Insert, Some(row)) => {
            if let Some(existing) = list.iter_mut().find(|r| r.key() == id) {
                *existing = row;
            } else {
                list.push(row);
            }
        }
        (ChangeOp::Update, Some(row)) => {
            if let Some(existing) = list.iter_mut().find(|r| r.key() == id) {
                *existing = row;
            }
        }
    }
}

pub struct ChangeFeed {
    receiver: UnboundedReceiver<ChangeEvent>,
    task: JoinHandle<()>,
}

impl ChangeFeed {
    /// Connects a dedicated listener connection and starts forwarding changes
    pub async fn spawn(database_url: &str) -> Result<Self, FeedError> {
        let mut listener = PgListener::connect(database_url).await?;
        listener.listen(CHANNEL).await?;
        info!(channel = CHANNEL, "subscribed to change feed");

        let (sender, receiver) = mpsc::unbounded_channel();
        let task = tokio::spawn(forward(listener, sender));

        Ok(Self { receiver, task })
    }

    /// Everything that arrived since the last call
    pub fn drain(&mut self) -> Vec<ChangeEvent> {
        let mut changes = Vec::new();
        while let Ok(change) = self.receiver.try_recv() {
            changes.push(change);
        }
        changes
    }
}

impl Drop for ChangeFeed {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn forward(mut listener: PgListener, sender: UnboundedSender<ChangeEvent>) {
    loop {
        let notification = match listener.recv().await {
            Ok(n) => n,
            Err(e) => {
                error!(error = %e, "change feed stopped");
                return;
            }
        };

        match ChangeEvent::parse(notification.payload()) {
            Ok(change) => {
                debug!(?change, "change received");
                if sender.send(change).is_err() {
                    return;
                }
            }
            Err(e) => warn!(error = %e, payload = notification.payload(), "skipping change"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Row {
        id: Uuid,
        label: &'static str,
    }

    impl Keyed for Row {
        fn key(&self) -> Uuid {
            self.id
        }
    }

    #[test]
    fn parses_trigger_payload() {
        let id = Uuid::new_v4();
        let project = Uuid::new_v4();
        let payload = format!(
            r#"{{"table":"project_notes","op":"UPDATE","id":"{}","project_id":"{}"}}"#,
            id, project
        );

        let change = ChangeEvent::parse(&payload).unwrap();

        assert_eq!(change.table, Table::ProjectNotes);
        assert_eq!(change.op, ChangeOp::Update);
        assert_eq!(change.id, Some(id));
        assert_eq!(change.project_id, Some(project));
    }

    #[test]
    fn null_project_id_is_accepted() {
        let payload = r#"{"table":"users","op":"DELETE","id":null,"project_id":null}"#;
        let change = ChangeEvent::parse(payload).unwrap();
        assert_eq!(change.table, Table::Users);
        assert_eq!(change.id, None);
    }

    #[test]
    fn unknown_table_is_rejected() {
        let payload = r#"{"table":"timesheets","op":"INSERT","id":null,"project_id":null}"#;
        assert!(ChangeEvent::parse(payload).is_err());
    }

    #[test]
    fn subscription_filters_by_table_and_project() {
        let project = Uuid::new_v4();
        let change = ChangeEvent {
            table: Table::ProjectChecklistItems,
            op: ChangeOp::Insert,
            id: Some(Uuid::new_v4()),
            project_id: Some(project),
        };

        assert!(Subscription::table(Table::ProjectChecklistItems).matches(&change));
        assert!(Subscription::for_project(Table::ProjectChecklistItems, project).matches(&change));
        assert!(!Subscription::for_project(Table::ProjectChecklistItems, Uuid::new_v4()).matches(&change));
        assert!(!Subscription::table(Table::ProjectFinancials).matches(&change));
    }

    #[test]
    fn patch_list_insert_update_delete() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let mut list = vec![Row { id: a, label: "a" }];

        patch_list(&mut list, ChangeOp::Insert, b, Some(Row { id: b, label: "b" }));
        assert_eq!(list.len(), 2);

        patch_list(&mut list, ChangeOp::Update, a, Some(Row { id: a, label: "a2" }));
        assert_eq!(list[0].label, "a2");

        patch_list(&mut list, ChangeOp::Delete, a, None);
        assert_eq!(list, vec![Row { id: b, label: "b" }]);
    }

    #[test]
    fn update_for_unknown_row_is_ignored() {
        let mut list: Vec<Row> = Vec::new();
        let id = Uuid::new_v4();
        patch_list(&mut list, ChangeOp::Update, id, Some(Row { id, label: "x" }));
        assert!(list.is_empty());
    }
}
