mod user;
mod project;
mod project_note;
mod checklist_item;
mod financials;
mod calendar_event;

pub use user::User;
pub use project::{Project, ProjectStatus};
pub use project_note::ProjectNote;
pub use checklist_item::ChecklistItem;
pub use financials::ProjectFinancials;
pub use calendar_event::{CalendarEvent, EventAssignee, EventDraft};
