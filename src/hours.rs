use serde::Deserialize;
use uuid::Uuid;

use crate::models::CalendarEvent;

/// How an event with several assignees contributes to a project's hours
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HoursWeighting {
    /// Two assignees on a two hour event count as four hours
    #[default]
    PerAssignee,
    PerEvent,
}

/// Wall-clock duration of an event in hours, never negative
pub fn duration_hours(event: &CalendarEvent) -> f64 {
    let millis = (event.end_time - event.start_time).num_milliseconds();
    (millis as f64 / 3_600_000.0).max(0.0)
}

pub fn event_hours(event: &CalendarEvent, weighting: HoursWeighting) -> f64 {
    let hours = duration_hours(event);
    match weighting {
        HoursWeighting::PerAssignee => hours * event.assignees.len().max(1) as f64,
        HoursWeighting::PerEvent => hours,
    }
}

pub fn total_hours(events: &[CalendarEvent], weighting: HoursWeighting) -> f64 {
    events.iter().map(|e| event_hours(e, weighting)).sum()
}

pub fn project_hours(events: &[CalendarEvent], project_id: Uuid, weighting: HoursWeighting) -> f64 {
    events
        .iter()
        .filter(|e| e.project_id == Some(project_id))
        .map(|e| event_hours(e, weighting))
        .sum()
}

/// Hours a single user spent, counting each event once
pub fn user_hours(events: &[CalendarEvent], user_id: Uuid) -> f64 {
    events
        .iter()
        .filter(|e| e.is_assigned_to(user_id))
        .map(duration_hours)
        .sum()
}

/// "1h 30m", "30m", "3h" or "0h". Minutes that round to 60 carry into the
/// hour, so 0.9999 prints as "1h" rather than "60m".
pub fn format_hours(hours: f64) -> String {
    if hours == 0.0 {
        return "0h".to_string();
    }

    let mut h = hours.floor() as i64;
    let mut m = ((hours - h as f64) * 60.0).round() as i64;
    if m == 60 {
        h += 1;
        m = 0;
    }

    match (h, m) {
        (h, 0) => format!("{}h", h),
        (0, m) => format!("{}m", m),
        (h, m) => format!("{}h {}m", h, m),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::EventAssignee;
    use chrono::{TimeZone, Utc};

    fn event(start_hour: u32, end_hour: u32, project_id: Option<Uuid>) -> CalendarEvent {
        let day = Utc.with_ymd_and_hms(2025, 3, 10, 0, 0, 0).unwrap();
        CalendarEvent {
            id: Uuid::new_v4(),
            project_id,
            user_id: Uuid::new_v4(),
            title: "Work".to_string(),
            description: None,
            start_time: day + chrono::Duration::hours(start_hour as i64),
            end_time: day + chrono::Duration::hours(end_hour as i64),
            all_day: false,
            color: None,
            created_at: day,
            updated_at: day,
            assignees: Vec::new(),
        }
    }

    fn assign(event: &mut CalendarEvent, user_id: Uuid) {
        event.assignees.push(EventAssignee {
            id: Uuid::new_v4(),
            event_id: event.id,
            user_id,
            user_name: "Amit".to_string(),
            created_at: event.created_at,
        });
    }

    #[test]
    fn format_hours_examples() {
        assert_eq!(format_hours(0.0), "0h");
        assert_eq!(format_hours(1.5), "1h 30m");
        assert_eq!(format_hours(0.5), "30m");
        assert_eq!(format_hours(3.0), "3h");
        assert_eq!(format_hours(0.25), "15m");
    }

    #[test]
    fn format_hours_carries_rounded_minutes() {
        assert_eq!(format_hours(1.999), "2h");
        assert_eq!(format_hours(0.9999), "1h");
    }

    #[test]
    fn two_hour_event() {
        let e = event(10, 12, None);
        assert_eq!(event_hours(&e, HoursWeighting::PerAssignee), 2.0);
        assert_eq!(event_hours(&e, HoursWeighting::PerEvent), 2.0);
    }

    #[test]
    fn inverted_event_clamps_to_zero() {
        let e = event(12, 10, None);
        assert_eq!(event_hours(&e, HoursWeighting::PerAssignee), 0.0);
    }

    #[test]
    fn assignees_multiply_only_when_weighted() {
        let mut e = event(9, 11, None);
        assign(&mut e, Uuid::new_v4());
        assign(&mut e, Uuid::new_v4());

        assert_eq!(event_hours(&e, HoursWeighting::PerAssignee), 4.0);
        assert_eq!(event_hours(&e, HoursWeighting::PerEvent), 2.0);
    }

    #[test]
    fn project_hours_only_counts_matching_events() {
        let project = Uuid::new_v4();
        let other = Uuid::new_v4();
        let events = vec![
            event(9, 10, Some(project)),
            event(10, 13, Some(project)),
            event(8, 18, Some(other)),
            event(8, 9, None),
        ];

        assert_eq!(project_hours(&events, project, HoursWeighting::PerEvent), 4.0);
        assert_eq!(total_hours(&events, HoursWeighting::PerEvent), 15.0);
    }

    #[test]
    fn user_hours_includes_creator_and_assignee_events() {
        let amit = Uuid::new_v4();
        let mut created = event(9, 10, None);
        created.user_id = amit;
        let mut assigned = event(10, 12, None);
        assign(&mut assigned, amit);
        assign(&mut assigned, Uuid::new_v4());
        let unrelated = event(12, 18, None);

        assert_eq!(user_hours(&[created, assigned, unrelated], amit), 3.0);
    }
}
