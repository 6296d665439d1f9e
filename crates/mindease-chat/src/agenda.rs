//! Today's agenda as seen from a given instant.

use chrono::NaiveDateTime;
use mindease_core::CalendarEvent;

/// Events falling on the same calendar day as `now`, in start order.
#[derive(Debug, Clone)]
pub struct Agenda<'a> {
    now: NaiveDateTime,
    today: Vec<&'a CalendarEvent>,
}

impl<'a> Agenda<'a> {
    /// Build the agenda for the day containing `now`.
    pub fn for_day(calendar: &'a [CalendarEvent], now: NaiveDateTime) -> Self {
        let day = now.date();
        let mut today: Vec<&CalendarEvent> =
            calendar.iter().filter(|e| e.date.date() == day).collect();
        // Stable sort keeps fixture order for events at the same minute.
        today.sort_by_key(|e| e.date);
        Self { now, today }
    }

    pub fn now(&self) -> NaiveDateTime {
        self.now
    }

    pub fn events(&self) -> &[&'a CalendarEvent] {
        &self.today
    }

    pub fn event_count(&self) -> usize {
        self.today.len()
    }

    pub fn is_free_day(&self) -> bool {
        self.today.is_empty()
    }

    /// The first event of the day that starts strictly after `now`.
    pub fn next_event(&self) -> Option<&'a CalendarEvent> {
        self.today.iter().copied().find(|e| e.date > self.now)
    }

    /// The next event, if it starts within `window_minutes`.
    pub fn next_event_within(&self, window_minutes: u32) -> Option<&'a CalendarEvent> {
        self.next_event()
            .filter(|e| self.minutes_until(e) <= i64::from(window_minutes))
    }

    /// Whole minutes from `now` until `event` starts, rounded to nearest.
    pub fn minutes_until(&self, event: &CalendarEvent) -> i64 {
        minutes_between(self.now, event.date)
    }
}

/// Minutes from `from` to `to`, rounded half away from zero.
pub fn minutes_between(from: NaiveDateTime, to: NaiveDateTime) -> i64 {
    let secs = (to - from).num_seconds() as f64;
    (secs / 60.0).round() as i64
}
