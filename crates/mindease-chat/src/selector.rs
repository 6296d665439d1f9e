//! Rule-based response selector.
//!
//! Maps free text plus a [`ContextBundle`] to exactly one canned reply.
//! Checks run in a fixed priority order and the first one that fires
//! wins:
//!
//! 1. companion persona table (when a companion is active)
//! 2. event-context templates (prepare, stress, break)
//! 3. today's agenda (schedule, stress, break)
//! 4. the general [`RuleTable`]
//! 5. busy-day nudge (opt-in)
//! 6. [`FALLBACK_REPLY`]

use mindease_core::config::ChatConfig;
use mindease_core::{CalendarEvent, EventType};

use crate::agenda::Agenda;
use crate::rules::{
    contains_any, RuleTable, BREAK_KEYWORDS, EVENT_BREAK_KEYWORDS, PREPARE_KEYWORDS,
    SCHEDULE_KEYWORDS, STRESS_KEYWORDS,
};
use crate::types::{ContextBundle, EventContext};

/// Reply when nothing else matches.
pub const FALLBACK_REPLY: &str =
    "I'm here to support you. How can I help you feel more centered and prepared for your day?";

/// Reply to schedule questions on a day without events.
pub const FREE_DAY_REPLY: &str = "You have a free day today! This is a great opportunity to focus on self-care and relaxation. Would you like me to suggest some wellness activities?";

/// Reply for unmatched input on a crowded day, when enabled.
pub const BUSY_DAY_REPLY: &str = "I can see you have a busy day ahead. How are you feeling about managing your schedule? I'm here to help you stay balanced and prepared.";

const STRESS_NO_EVENT_REPLY: &str = "I'm here to help you manage stress. Let's start with some deep breathing. Would you like me to guide you through a 2-minute meditation?";

const BREAK_NO_EVENT_REPLY: &str = "Great idea to take a break! I suggest a 15-minute mindfulness session or a short walk. What sounds good to you?";

/// Minutes before the next event above which a walk still fits.
const WALK_THRESHOLD_MINUTES: i64 = 15;

// =============================================================================
// Selection
// =============================================================================

/// Which check produced a reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Branch {
    Companion,
    EventPrepare,
    EventStress,
    EventBreak,
    Schedule,
    Stress,
    Break,
    Rule,
    BusyDay,
    Fallback,
}

/// A reply together with the branch that chose it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub reply: String,
    pub branch: Branch,
}

impl Selection {
    fn new(reply: impl Into<String>, branch: Branch) -> Self {
        Self {
            reply: reply.into(),
            branch,
        }
    }
}

// =============================================================================
// ResponseSelector
// =============================================================================

/// Deterministic keyword-driven reply selection.
#[derive(Debug, Clone)]
pub struct ResponseSelector {
    rules: RuleTable,
    /// Upcoming events further out than this are not mentioned in stress
    /// and break replies.
    pub lookahead_minutes: u32,
    /// Unmatched input on a day with more events than this gets
    /// [`BUSY_DAY_REPLY`].
    pub busy_day_threshold: Option<usize>,
}

impl ResponseSelector {
    pub fn new(rules: RuleTable, config: &ChatConfig) -> Self {
        Self {
            rules,
            lookahead_minutes: config.lookahead_minutes,
            busy_day_threshold: config.busy_day_threshold,
        }
    }

    pub fn rules(&self) -> &RuleTable {
        &self.rules
    }

    /// Pick a reply for `text`. Never fails.
    pub fn select(&self, text: &str, ctx: &ContextBundle<'_>) -> String {
        self.select_with_branch(text, ctx).reply
    }

    /// Pick a reply and report which branch produced it.
    pub fn select_with_branch(&self, text: &str, ctx: &ContextBundle<'_>) -> Selection {
        let lower = text.to_lowercase();

        if let Some(persona) = ctx.persona {
            return Selection::new(persona.reply(&lower), Branch::Companion);
        }

        if let Some(event) = ctx.active_event() {
            if let Some(selection) = event_reply(&lower, event) {
                return selection;
            }
        }

        let agenda = Agenda::for_day(ctx.calendar, ctx.now);
        if let Some(selection) = self.agenda_reply(&lower, &agenda) {
            return selection;
        }

        if let Some(rule) = self.rules.first_match(&lower) {
            return Selection::new(rule.reply.as_str(), Branch::Rule);
        }

        if let Some(threshold) = self.busy_day_threshold {
            if agenda.event_count() > threshold {
                return Selection::new(BUSY_DAY_REPLY, Branch::BusyDay);
            }
        }

        Selection::new(FALLBACK_REPLY, Branch::Fallback)
    }

    fn agenda_reply(&self, lower: &str, agenda: &Agenda<'_>) -> Option<Selection> {
        if contains_any(lower, SCHEDULE_KEYWORDS) {
            let reply = if agenda.is_free_day() {
                FREE_DAY_REPLY.to_string()
            } else if let Some(next) = agenda.next_event() {
                format!(
                    "You have {} today. Your next event is \"{}\" in {} minutes. Would you like me to suggest some preparation techniques?",
                    events_phrase(agenda.event_count()),
                    next.title,
                    agenda.minutes_until(next)
                )
            } else {
                format!(
                    "You had {} today and there's nothing else on your calendar. Would you like to wind down with a short reflection?",
                    events_phrase(agenda.event_count())
                )
            };
            return Some(Selection::new(reply, Branch::Schedule));
        }

        let upcoming = agenda.next_event_within(self.lookahead_minutes);

        if contains_any(lower, STRESS_KEYWORDS) {
            let reply = match upcoming {
                Some(next) => stress_with_event(next),
                None => STRESS_NO_EVENT_REPLY.to_string(),
            };
            return Some(Selection::new(reply, Branch::Stress));
        }

        if contains_any(lower, BREAK_KEYWORDS) {
            let reply = match upcoming {
                Some(next) => {
                    let minutes = agenda.minutes_until(next);
                    if minutes > WALK_THRESHOLD_MINUTES {
                        format!(
                            "Perfect timing for a break! You have {} minutes until your next event. I recommend a 10-minute mindful walk or some gentle stretching. Which would you prefer?",
                            minutes
                        )
                    } else {
                        format!(
                            "You have {} minutes until your next event. Let's do a quick 5-minute breathing exercise to help you feel centered and ready.",
                            minutes
                        )
                    }
                }
                None => BREAK_NO_EVENT_REPLY.to_string(),
            };
            return Some(Selection::new(reply, Branch::Break));
        }

        None
    }
}

impl Default for ResponseSelector {
    fn default() -> Self {
        Self::new(RuleTable::default(), &ChatConfig::default())
    }
}

// =============================================================================
// Templates
// =============================================================================

fn event_reply(lower: &str, event: &EventContext) -> Option<Selection> {
    let title = &event.title;

    if contains_any(lower, PREPARE_KEYWORDS) {
        let reply = match event.event_type {
            EventType::Exam => format!(
                "For your \"{}\" exam, I recommend: 1) Review key concepts 30 minutes before, 2) Practice deep breathing to stay calm, 3) Have all materials ready, 4) Get a good night's sleep. What specific area would you like help with?",
                title
            ),
            EventType::Class => format!(
                "For your \"{}\" class, here are some tips: 1) Review previous notes, 2) Prepare questions to ask, 3) Bring all necessary materials, 4) Arrive 5 minutes early. How can I help you feel more confident?",
                title
            ),
            EventType::Bill | EventType::Other => format!(
                "For your \"{}\" event, I suggest: 1) Plan your route and timing, 2) Prepare any materials needed, 3) Take a few deep breaths before starting, 4) Stay hydrated. What would you like to focus on?",
                title
            ),
        };
        return Some(Selection::new(reply, Branch::EventPrepare));
    }

    if contains_any(lower, STRESS_KEYWORDS) {
        return Some(Selection::new(
            format!(
                "I understand you're feeling anxious about \"{}\". Let's do a quick grounding exercise: Name 5 things you can see, 4 you can touch, 3 you can hear, 2 you can smell, 1 you can taste. Ready to try?",
                title
            ),
            Branch::EventStress,
        ));
    }

    if contains_any(lower, EVENT_BREAK_KEYWORDS) {
        return Some(Selection::new(
            format!(
                "Since you have \"{}\" coming up, I recommend a 10-minute preparation break: 5 minutes to organize your thoughts, then 5 minutes of deep breathing. Would you like me to guide you through this?",
                title
            ),
            Branch::EventBreak,
        ));
    }

    None
}

fn stress_with_event(next: &CalendarEvent) -> String {
    format!(
        "I understand you're feeling stressed. I notice you have \"{}\" coming up. Let's do a quick breathing exercise together. Inhale for 4 counts, hold for 4, exhale for 6. Ready to try?",
        next.title
    )
}

/// "1 event", "3 events".
pub(crate) fn events_phrase(count: usize) -> String {
    if count == 1 {
        "1 event".to_string()
    } else {
        format!("{} events", count)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::companion::builtin_companions;
    use chrono::{NaiveDate, NaiveDateTime};
    use mindease_core::fixtures::mock_calendar_events;

    fn sept7(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 9, 7)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn quiet_day() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap()
    }

    fn exam_context() -> EventContext {
        EventContext {
            title: "Final Exam".to_string(),
            event_type: EventType::Exam,
            time: Some("10:00".to_string()),
            date: Some("Sep 7".to_string()),
        }
    }

    fn sel() -> ResponseSelector {
        ResponseSelector::default()
    }

    // ---- Event context ----

    #[test]
    fn test_event_prepare_exam() {
        let events = mock_calendar_events();
        let ev = exam_context();
        let ctx = ContextBundle::new(sept7(8, 0), &events).with_event(Some(&ev));
        let s = sel().select_with_branch("How do I prepare?", &ctx);
        assert_eq!(s.branch, Branch::EventPrepare);
        assert!(s.reply.starts_with("For your \"Final Exam\" exam, I recommend"));
    }

    #[test]
    fn test_event_prepare_class_and_other() {
        let mut ev = exam_context();
        ev.event_type = EventType::Class;
        let ctx = ContextBundle::new(quiet_day(), &[]).with_event(Some(&ev));
        assert!(sel()
            .select("am I ready", &ctx)
            .contains("class, here are some tips"));

        ev.event_type = EventType::Bill;
        let ctx = ContextBundle::new(quiet_day(), &[]).with_event(Some(&ev));
        assert!(sel()
            .select("help", &ctx)
            .contains("event, I suggest: 1) Plan your route"));
    }

    #[test]
    fn test_event_stress_grounding() {
        let ev = exam_context();
        let ctx = ContextBundle::new(quiet_day(), &[]).with_event(Some(&ev));
        let s = sel().select_with_branch("I'm nervous", &ctx);
        assert_eq!(s.branch, Branch::EventStress);
        assert!(s.reply.contains("anxious about \"Final Exam\""));
        assert!(s.reply.contains("Name 5 things you can see"));
    }

    #[test]
    fn test_event_break() {
        let ev = exam_context();
        let ctx = ContextBundle::new(quiet_day(), &[]).with_event(Some(&ev));
        let s = sel().select_with_branch("can I rest a bit", &ctx);
        assert_eq!(s.branch, Branch::EventBreak);
        assert!(s.reply.starts_with("Since you have \"Final Exam\" coming up"));
    }

    #[test]
    fn test_event_prepare_beats_stress() {
        let ev = exam_context();
        let ctx = ContextBundle::new(quiet_day(), &[]).with_event(Some(&ev));
        let s = sel().select_with_branch("help, I'm stressed", &ctx);
        assert_eq!(s.branch, Branch::EventPrepare);
    }

    #[test]
    fn test_event_context_beats_rule_table() {
        // "study" is a rule trigger, "help" an event trigger.
        let ev = exam_context();
        let ctx = ContextBundle::new(quiet_day(), &[]).with_event(Some(&ev));
        let s = sel().select_with_branch("help me study", &ctx);
        assert_eq!(s.branch, Branch::EventPrepare);
    }

    #[test]
    fn test_event_context_unmatched_falls_through() {
        let ev = exam_context();
        let ctx = ContextBundle::new(quiet_day(), &[]).with_event(Some(&ev));
        let s = sel().select_with_branch("I can't sleep", &ctx);
        assert_eq!(s.branch, Branch::Rule);
    }

    #[test]
    fn test_blank_event_context_ignored() {
        let mut ev = exam_context();
        ev.title = "   ".to_string();
        let ctx = ContextBundle::new(quiet_day(), &[]).with_event(Some(&ev));
        assert_eq!(sel().select("help", &ctx), FALLBACK_REPLY);
    }

    // ---- Agenda ----

    #[test]
    fn test_schedule_free_day() {
        let events = mock_calendar_events();
        let ctx = ContextBundle::new(quiet_day(), &events);
        assert_eq!(sel().select("schedule", &ctx), FREE_DAY_REPLY);
    }

    #[test]
    fn test_schedule_summary() {
        let events = mock_calendar_events();
        let ctx = ContextBundle::new(sept7(9, 30), &events);
        assert_eq!(
            sel().select("What's on my calendar?", &ctx),
            "You have 4 events today. Your next event is \"Final Exam - Computer Science\" in 30 minutes. Would you like me to suggest some preparation techniques?"
        );
    }

    #[test]
    fn test_schedule_after_last_event() {
        let events = mock_calendar_events();
        let ctx = ContextBundle::new(sept7(18, 0), &events);
        let s = sel().select_with_branch("my schedule", &ctx);
        assert_eq!(s.branch, Branch::Schedule);
        assert!(s.reply.starts_with("You had 4 events today"));
    }

    #[test]
    fn test_schedule_single_event_grammar() {
        let events = vec![mock_calendar_events()[1].clone()];
        let now = events[0].date - chrono::Duration::hours(1);
        let ctx = ContextBundle::new(now, &events);
        assert!(sel().select("schedule", &ctx).starts_with("You have 1 event today."));
    }

    #[test]
    fn test_stress_with_next_event() {
        let events = mock_calendar_events();
        let ctx = ContextBundle::new(sept7(9, 40), &events);
        let reply = sel().select("I'm feeling anxious", &ctx);
        assert!(reply.contains("\"Final Exam - Computer Science\""));
        assert!(reply.contains("Inhale for 4 counts, hold for 4, exhale for 6"));
    }

    #[test]
    fn test_stress_without_next_event() {
        let events = mock_calendar_events();
        let ctx = ContextBundle::new(sept7(20, 0), &events);
        assert_eq!(sel().select("so much stress", &ctx), STRESS_NO_EVENT_REPLY);
    }

    #[test]
    fn test_stress_event_outside_lookahead() {
        let events = mock_calendar_events();
        let mut selector = sel();
        selector.lookahead_minutes = 10;
        let ctx = ContextBundle::new(sept7(9, 30), &events);
        assert_eq!(selector.select("anxious", &ctx), STRESS_NO_EVENT_REPLY);
    }

    #[test]
    fn test_break_long_gap_suggests_walk() {
        let events = mock_calendar_events();
        let ctx = ContextBundle::new(sept7(12, 0), &events);
        let reply = sel().select("I'm tired", &ctx);
        assert!(reply.starts_with("Perfect timing for a break! You have 180 minutes"));
    }

    #[test]
    fn test_break_short_gap_suggests_breathing() {
        let events = mock_calendar_events();
        let ctx = ContextBundle::new(sept7(9, 45), &events);
        assert_eq!(
            sel().select("need a break", &ctx),
            "You have 15 minutes until your next event. Let's do a quick 5-minute breathing exercise to help you feel centered and ready."
        );
    }

    #[test]
    fn test_break_without_next_event() {
        let ctx = ContextBundle::new(quiet_day(), &[]);
        assert_eq!(sel().select("break time", &ctx), BREAK_NO_EVENT_REPLY);
    }

    #[test]
    fn test_agenda_stress_beats_rule_table() {
        // "stress" also triggers the first rule; the agenda branch wins.
        let ctx = ContextBundle::new(quiet_day(), &[]);
        let s = sel().select_with_branch("stress", &ctx);
        assert_eq!(s.branch, Branch::Stress);
    }

    // ---- Rule table and fallback ----

    #[test]
    fn test_rule_table_match() {
        let ctx = ContextBundle::new(quiet_day(), &[]);
        let s = sel().select_with_branch("I'm worried about my exam", &ctx);
        assert_eq!(s.branch, Branch::Rule);
        assert!(s.reply.starts_with("I understand you're feeling stressed. Let's break"));
    }

    #[test]
    fn test_rule_table_sleep() {
        let ctx = ContextBundle::new(quiet_day(), &[]);
        assert!(sel().select("can't sleep", &ctx).starts_with("Getting good sleep"));
    }

    #[test]
    fn test_fallback() {
        let events = mock_calendar_events();
        let ctx = ContextBundle::new(sept7(9, 0), &events);
        assert_eq!(sel().select("purple elephants", &ctx), FALLBACK_REPLY);
    }

    #[test]
    fn test_busy_day_opt_in() {
        let events = mock_calendar_events();
        let ctx = ContextBundle::new(sept7(8, 0), &events);
        let mut selector = sel();
        selector.busy_day_threshold = Some(3);
        assert_eq!(selector.select("purple elephants", &ctx), BUSY_DAY_REPLY);

        selector.busy_day_threshold = Some(4);
        assert_eq!(selector.select("purple elephants", &ctx), FALLBACK_REPLY);
    }

    #[test]
    fn test_case_insensitive() {
        let ctx = ContextBundle::new(quiet_day(), &[]);
        assert_eq!(sel().select("SCHEDULE", &ctx), FREE_DAY_REPLY);
    }

    #[test]
    fn test_idempotent() {
        let events = mock_calendar_events();
        let ev = exam_context();
        let ctx = ContextBundle::new(sept7(9, 12), &events).with_event(Some(&ev));
        for text in ["help", "tired", "schedule", "purple elephants", "exam"] {
            assert_eq!(sel().select(text, &ctx), sel().select(text, &ctx));
        }
    }

    // ---- Companion mode ----

    #[test]
    fn test_companion_mode_uses_persona_table() {
        let personas = builtin_companions();
        let events = mock_calendar_events();
        let ev = exam_context();
        let ctx = ContextBundle::new(sept7(9, 30), &events)
            .with_persona(Some(&personas[0]))
            .with_event(Some(&ev));
        let s = sel().select_with_branch("I'm so stressed", &ctx);
        assert_eq!(s.branch, Branch::Companion);
        assert!(s.reply.starts_with("I sense you're carrying some weight"));
    }

    #[test]
    fn test_companion_mode_skips_calendar() {
        let personas = builtin_companions();
        let events = mock_calendar_events();
        let ctx = ContextBundle::new(sept7(9, 30), &events).with_persona(Some(&personas[2]));
        assert!(sel()
            .select("schedule", &ctx)
            .starts_with("I appreciate your thoughtful approach"));
    }

    #[test]
    fn test_events_phrase() {
        assert_eq!(events_phrase(0), "0 events");
        assert_eq!(events_phrase(1), "1 event");
        assert_eq!(events_phrase(2), "2 events");
    }
}
