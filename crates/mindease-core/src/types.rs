use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

// =============================================================================
// Enums
// =============================================================================

/// Kind of calendar entry.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    Exam,
    Class,
    Bill,
    #[default]
    Other,
}

impl EventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::Exam => "exam",
            EventType::Class => "class",
            EventType::Bill => "bill",
            EventType::Other => "other",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Calendar
// =============================================================================

/// A single calendar entry.
///
/// `date` is a local wall-clock timestamp without offset, as in
/// `2024-09-07T10:00:00`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEvent {
    pub id: String,
    pub title: String,
    pub date: NaiveDateTime,
    #[serde(rename = "type")]
    pub event_type: EventType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Identifier of the [`CalendarSource`] this event belongs to.
    pub calendar_id: String,
}

/// A calendar feed the user has connected.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarSource {
    pub id: String,
    pub name: String,
    /// Display color as `#RRGGBB`.
    pub color: String,
    pub enabled: bool,
}
