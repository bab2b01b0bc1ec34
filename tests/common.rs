#![allow(dead_code)]
use std::collections::HashMap;

use chrono::{DateTime, TimeZone, Utc};
use luzon::auth::UserDirectory;
use luzon::models::{CalendarEvent, EventAssignee, User};
use uuid::Uuid;

pub const PASSWORD: &str = "letmein";

/// In-memory stand-in for the users table
#[derive(Default)]
pub struct MemoryDirectory {
    users: HashMap<Uuid, User>,
}

impl MemoryDirectory {
    pub fn with_users(names: &[&str]) -> Self {
        let users = names
            .iter()
            .map(|name| {
                let user = user(name);
                (user.id, user)
            })
            .collect();
        Self { users }
    }

    pub fn id_of(&self, name: &str) -> Uuid {
        self.users
            .values()
            .find(|u| u.name == name)
            .map(|u| u.id)
            .unwrap()
    }
}

impl UserDirectory for MemoryDirectory {
    async fn find_user_by_name(&self, name: &str) -> anyhow::Result<Option<User>> {
        Ok(self.users.values().find(|u| u.name == name).cloned())
    }

    async fn find_user_by_id(&self, id: Uuid) -> anyhow::Result<Option<User>> {
        Ok(self.users.get(&id).cloned())
    }
}

pub fn user(name: &str) -> User {
    User {
        id: Uuid::new_v4(),
        name: name.to_string(),
        avatar_url: None,
        created_at: Utc::now(),
    }
}

pub fn at(hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 10, hour, minute, 0).unwrap()
}

pub fn event(project_id: Option<Uuid>, start: DateTime<Utc>, end: DateTime<Utc>, assignees: &[Uuid]) -> CalendarEvent {
    let id = Uuid::new_v4();
    CalendarEvent {
        id,
        project_id,
        user_id: Uuid::new_v4(),
        title: "Work".to_string(),
        description: None,
        start_time: start,
        end_time: end,
        all_day: false,
        color: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
        assignees: assignees
            .iter()
            .map(|user_id| EventAssignee {
                id: Uuid::new_v4(),
                event_id: id,
                user_id: *user_id,
                user_name: "someone".to_string(),
                created_at: Utc::now(),
            })
            .collect(),
    }
}
