//! Built-in mock calendar data.
//!
//! The app ships without a calendar backend. These fixtures stand in for
//! connected calendars; a JSON file with the same shape can replace the
//! event list via `[calendar] fixture_path`.

use std::path::Path;

use chrono::{NaiveDate, NaiveDateTime};
use tracing::info;

use crate::error::{MindEaseError, Result};
use crate::types::{CalendarEvent, CalendarSource, EventType};

fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .and_then(|date| date.and_hms_opt(h, min, 0))
        .expect("valid fixture timestamp")
}

fn event(
    id: &str,
    title: &str,
    date: NaiveDateTime,
    event_type: EventType,
    description: &str,
    calendar_id: &str,
) -> CalendarEvent {
    CalendarEvent {
        id: id.to_string(),
        title: title.to_string(),
        date,
        event_type,
        description: Some(description.to_string()),
        calendar_id: calendar_id.to_string(),
    }
}

/// Calendar feeds shown on the settings screen.
pub fn mock_calendar_sources() -> Vec<CalendarSource> {
    let source = |id: &str, name: &str, color: &str, enabled: bool| CalendarSource {
        id: id.to_string(),
        name: name.to_string(),
        color: color.to_string(),
        enabled,
    };
    vec![
        source("university", "University Calendar", "#7C9A92", true),
        source("personal", "Personal Calendar", "#9F91CC", true),
        source("work", "Work Calendar", "#C6AC8F", false),
    ]
}

/// The demo calendar.
///
/// 2024-09-07 is the "busy day" used by the demo: a shift, an exam, a
/// dentist visit and a study group.
pub fn mock_calendar_events() -> Vec<CalendarEvent> {
    vec![
        // University
        event(
            "1",
            "Final Exam - Computer Science",
            at(2024, 9, 7, 10, 0),
            EventType::Exam,
            "CS401 Final Examination",
            "university",
        ),
        event(
            "2",
            "Psychology Class",
            at(2024, 3, 19, 14, 30),
            EventType::Class,
            "PSY201 - Chapter 7 Discussion",
            "university",
        ),
        event(
            "3",
            "Study Group - Database Systems",
            at(2024, 9, 7, 15, 0),
            EventType::Class,
            "Group project meeting in Library Room 204",
            "university",
        ),
        // Personal
        event(
            "4",
            "Rent Payment Due",
            at(2024, 3, 25, 0, 0),
            EventType::Bill,
            "Monthly rent payment",
            "personal",
        ),
        event(
            "5",
            "Yoga Class",
            at(2024, 3, 19, 8, 0),
            EventType::Other,
            "Morning yoga session at Wellness Center",
            "personal",
        ),
        event(
            "6",
            "Dentist Appointment",
            at(2024, 9, 7, 11, 30),
            EventType::Other,
            "Regular checkup",
            "personal",
        ),
        // Work
        event(
            "7",
            "Part-time Job Shift",
            at(2024, 9, 7, 9, 0),
            EventType::Other,
            "Shift at the campus bookstore",
            "work",
        ),
        event(
            "8",
            "Team Meeting",
            at(2024, 3, 21, 13, 0),
            EventType::Other,
            "Weekly sync with the bookstore team",
            "work",
        ),
    ]
}

/// Load calendar events from a JSON array file.
pub fn load_calendar_events(path: &Path) -> Result<Vec<CalendarEvent>> {
    let content = std::fs::read_to_string(path)?;
    let events: Vec<CalendarEvent> = serde_json::from_str(&content)?;
    if let Some(dup) = first_duplicate_id(&events) {
        return Err(MindEaseError::Calendar(format!(
            "duplicate event id '{}' in {}",
            dup,
            path.display()
        )));
    }
    info!(count = events.len(), "Calendar fixture loaded from {}", path.display());
    Ok(events)
}

fn first_duplicate_id(events: &[CalendarEvent]) -> Option<&str> {
    let mut seen = std::collections::HashSet::new();
    events
        .iter()
        .map(|e| e.id.as_str())
        .find(|id| !seen.insert(*id))
}
