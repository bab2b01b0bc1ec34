pub mod avatar;
pub mod calendar;
pub mod checklist;
pub mod components;
pub mod event_wizard;
pub mod financials;
pub mod login;
pub mod notes;
pub mod project_wizard;
pub mod projects;
pub mod share;
