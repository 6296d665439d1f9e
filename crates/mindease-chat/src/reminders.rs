//! Timer-driven nudges appended to the assistant conversation.
//!
//! Two sweeps run on fixed intervals while a session is open:
//! an idle-break reminder and a pre-event preparation suggestion. Both
//! read the calendar and may append one reply. They stop when the
//! scheduler is shut down; nothing else is guaranteed about their timing.

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDateTime;
use mindease_core::config::ReminderConfig;
use mindease_core::{CalendarEvent, EventType};
use tokio::sync::Notify;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::agenda::{minutes_between, Agenda};
use crate::orchestrator::ChatOrchestrator;
use crate::types::Message;

// =============================================================================
// Sweeps
// =============================================================================

/// Break reminder after a long quiet stretch.
///
/// Fires when the last message is a reply older than the idle threshold
/// and the next event today is still comfortably far away.
pub fn idle_break_reminder(
    last: Option<&Message>,
    calendar: &[CalendarEvent],
    now: NaiveDateTime,
    config: &ReminderConfig,
) -> Option<String> {
    let last = last.filter(|m| !m.is_user)?;
    if now - last.timestamp <= chrono::Duration::minutes(config.idle_threshold_minutes) {
        return None;
    }

    let agenda = Agenda::for_day(calendar, now);
    let next = agenda.next_event()?;
    let minutes = agenda.minutes_until(next);
    if minutes <= config.min_minutes_before_event {
        return None;
    }

    Some(format!(
        "💡 I noticed you've been working for a while. You have {} minutes until \"{}\". Would you like to take a 10-minute break? I can guide you through some gentle stretches or breathing exercises.",
        minutes, next.title
    ))
}

/// Short preparation exercise right before an exam or class.
pub fn pre_event_suggestion(
    calendar: &[CalendarEvent],
    now: NaiveDateTime,
    config: &ReminderConfig,
) -> Option<String> {
    let agenda = Agenda::for_day(calendar, now);
    let next = agenda.next_event()?;
    let minutes = minutes_between(now, next.date);

    match next.event_type {
        EventType::Exam if minutes == config.exam_prep_minutes => Some(format!(
            "📚 Your exam \"{}\" is in {} minutes. Let's do a quick confidence-building exercise. Take 3 deep breaths and repeat: \"I am prepared and capable.\" Ready to start?",
            next.title, minutes
        )),
        EventType::Class if minutes == config.class_prep_minutes => Some(format!(
            "🎓 Your class \"{}\" starts in {} minutes. Let's do a quick energy boost - 5 jumping jacks or some gentle neck rolls. Which would you prefer?",
            next.title, minutes
        )),
        _ => None,
    }
}

// =============================================================================
// ReminderScheduler
// =============================================================================

/// Background loop that runs both sweeps against one orchestrator.
pub struct ReminderScheduler {
    orchestrator: Arc<ChatOrchestrator>,
    check_every: Duration,
    suggest_every: Duration,
    clock: fn() -> NaiveDateTime,
    shutdown: Arc<Notify>,
}

impl ReminderScheduler {
    /// Create a scheduler using the local wall clock.
    pub fn new(orchestrator: Arc<ChatOrchestrator>, config: &ReminderConfig) -> Self {
        Self {
            orchestrator,
            check_every: Duration::from_secs(config.check_interval_secs.max(1)),
            suggest_every: Duration::from_secs(config.suggestion_interval_secs.max(1)),
            clock: local_now,
            shutdown: Arc::new(Notify::new()),
        }
    }

    /// Replace the clock used to stamp sweeps.
    pub fn with_clock(mut self, clock: fn() -> NaiveDateTime) -> Self {
        self.clock = clock;
        self
    }

    /// Handle that stops [`ReminderScheduler::run`] when notified.
    pub fn shutdown_handle(&self) -> Arc<Notify> {
        Arc::clone(&self.shutdown)
    }

    /// Signal the loop to stop.
    pub fn shutdown(&self) {
        self.shutdown.notify_one();
    }

    /// Run until shutdown. The first sweep of each kind happens one full
    /// interval after start.
    pub async fn run(&self) {
        let mut check = interval_at(Instant::now() + self.check_every, self.check_every);
        let mut suggest = interval_at(Instant::now() + self.suggest_every, self.suggest_every);
        check.set_missed_tick_behavior(MissedTickBehavior::Delay);
        suggest.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(
            check_secs = self.check_every.as_secs(),
            suggest_secs = self.suggest_every.as_secs(),
            "Reminder scheduler started"
        );

        loop {
            tokio::select! {
                _ = check.tick() => {
                    let now = (self.clock)();
                    match self.orchestrator.reminder_tick(now) {
                        Ok(Some(msg)) => debug!(message_id = %msg.id, "Break reminder appended"),
                        Ok(None) => {}
                        Err(e) => warn!(error = %e, "Break reminder sweep failed"),
                    }
                }
                _ = suggest.tick() => {
                    let now = (self.clock)();
                    match self.orchestrator.suggestion_tick(now) {
                        Ok(Some(msg)) => debug!(message_id = %msg.id, "Pre-event suggestion appended"),
                        Ok(None) => {}
                        Err(e) => warn!(error = %e, "Pre-event sweep failed"),
                    }
                }
                _ = self.shutdown.notified() => {
                    info!("Reminder scheduler stopped");
                    return;
                }
            }
        }
    }
}

fn local_now() -> NaiveDateTime {
    chrono::Local::now().naive_local()
}

// =============================================================================
// Tests
// =============================================================================
