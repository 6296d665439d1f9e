//! Opening lines for a new conversation.

use chrono::{NaiveDateTime, Timelike};
use mindease_core::CalendarEvent;

use crate::agenda::Agenda;
use crate::selector::events_phrase;
use crate::types::EventContext;

/// Time-of-day salutation: before noon, before 17:00, otherwise evening.
pub fn salutation(now: NaiveDateTime) -> &'static str {
    match now.hour() {
        h if h < 12 => "Good morning!",
        h if h < 17 => "Good afternoon!",
        _ => "Good evening!",
    }
}

/// Calendar-aware greeting for the voice assistant.
pub fn assistant_greeting(calendar: &[CalendarEvent], now: NaiveDateTime) -> String {
    let agenda = Agenda::for_day(calendar, now);
    let outlook = if agenda.is_free_day() {
        "You have a free day today - perfect for self-care and relaxation. How are you feeling?"
            .to_string()
    } else if let Some(next) = agenda.next_event() {
        format!(
            "You have {} today. Your next event \"{}\" is in {} minutes. How can I help you prepare?",
            events_phrase(agenda.event_count()),
            next.title,
            agenda.minutes_until(next)
        )
    } else {
        format!(
            "You have {} today. How are you feeling about your schedule?",
            events_phrase(agenda.event_count())
        )
    };
    format!(
        "Hello! I'm your Voice AI Assistant. {} {}",
        salutation(now),
        outlook
    )
}

/// Greeting when the user opens the assistant from a calendar entry.
pub fn event_greeting(event: &EventContext) -> String {
    let mut when = String::new();
    if let Some(time) = event.time.as_deref() {
        when.push_str(" at ");
        when.push_str(time);
    }
    if let Some(date) = event.date.as_deref() {
        when.push_str(" on ");
        when.push_str(date);
    }
    format!(
        "I see you're preparing for \"{}\" ({}){}. I'm here to help you get ready! What would you like to know about preparing for this event?",
        event.title, event.event_type, when
    )
}
