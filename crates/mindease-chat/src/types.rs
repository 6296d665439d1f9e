//! Shared types for the conversational engine.

use std::fmt;

use chrono::NaiveDateTime;
use mindease_core::{CalendarEvent, EventType};
use serde::{Deserialize, Serialize};

use crate::companion::Persona;
use crate::error::ChatError;

// =============================================================================
// Messages
// =============================================================================

/// Position of a message within its session.
///
/// Ids come from a per-store counter, so a user message and the reply
/// created in the same clock tick still get distinct, ordered ids.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(pub u64);

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One entry in the conversation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: MessageId,
    pub text: String,
    pub is_user: bool,
    pub timestamp: NaiveDateTime,
    /// Companion that authored the reply, when chatting with one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub companion_id: Option<String>,
}

// =============================================================================
// Event context
// =============================================================================

/// The calendar entry the user is getting ready for.
///
/// Handed over by the calendar view as JSON, e.g.
/// `{"title":"Final Exam","type":"exam","time":"10:00","date":"Sep 7"}`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventContext {
    pub title: String,
    #[serde(rename = "type", default)]
    pub event_type: EventType,
    #[serde(default)]
    pub time: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
}

impl EventContext {
    /// Parse the JSON hand-off from the calendar view.
    ///
    /// A blank title is rejected: it would render every template meaningless.
    pub fn from_json(raw: &str) -> Result<Self, ChatError> {
        let ctx: EventContext = serde_json::from_str(raw)
            .map_err(|e| ChatError::InvalidEventContext(e.to_string()))?;
        if ctx.title.trim().is_empty() {
            return Err(ChatError::InvalidEventContext(
                "event title is empty".to_string(),
            ));
        }
        Ok(ctx)
    }

    /// Build a context from a calendar entry.
    pub fn from_event(event: &CalendarEvent) -> Self {
        Self {
            title: event.title.clone(),
            event_type: event.event_type,
            time: Some(event.date.format("%H:%M").to_string()),
            date: Some(event.date.format("%b %-d").to_string()),
        }
    }
}

// =============================================================================
// Context bundle
// =============================================================================

/// Snapshot of everything the selector may condition on.
#[derive(Clone, Copy, Debug)]
pub struct ContextBundle<'a> {
    pub now: NaiveDateTime,
    pub calendar: &'a [CalendarEvent],
    pub persona: Option<&'a Persona>,
    pub event: Option<&'a EventContext>,
}

impl<'a> ContextBundle<'a> {
    pub fn new(now: NaiveDateTime, calendar: &'a [CalendarEvent]) -> Self {
        Self {
            now,
            calendar,
            persona: None,
            event: None,
        }
    }

    pub fn with_persona(mut self, persona: Option<&'a Persona>) -> Self {
        self.persona = persona;
        self
    }

    pub fn with_event(mut self, event: Option<&'a EventContext>) -> Self {
        self.event = event;
        self
    }

    /// The event context, unless it is blank.
    pub(crate) fn active_event(&self) -> Option<&'a EventContext> {
        self.event.filter(|e| !e.title.trim().is_empty())
    }
}
