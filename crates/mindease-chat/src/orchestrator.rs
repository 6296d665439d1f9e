//! Chat orchestrator: owns one conversation and wires the selector,
//! companions, greetings and reminder sweeps around it.

use std::sync::{Mutex, MutexGuard};

use chrono::NaiveDateTime;
use mindease_core::config::{ChatConfig, ReminderConfig};
use mindease_core::{CalendarEvent, MindEaseConfig};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::companion::{CompanionRegistry, Persona, PersonaDraft};
use crate::error::ChatError;
use crate::greeting::{assistant_greeting, event_greeting};
use crate::reminders::{idle_break_reminder, pre_event_suggestion};
use crate::rules::RuleTable;
use crate::selector::ResponseSelector;
use crate::session::MessageStore;
use crate::types::{ContextBundle, EventContext, Message};

/// Which screen the conversation belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatMode {
    /// Calendar-aware voice assistant.
    Assistant,
    /// Chat with a companion persona.
    Companion,
}

#[derive(Debug)]
struct SessionState {
    store: MessageStore,
    event: Option<EventContext>,
    companion_id: Option<String>,
    companions: CompanionRegistry,
}

/// Coordinates one chat session.
pub struct ChatOrchestrator {
    id: Uuid,
    mode: ChatMode,
    selector: ResponseSelector,
    calendar: Vec<CalendarEvent>,
    config: ChatConfig,
    reminders: ReminderConfig,
    state: Mutex<SessionState>,
}

impl ChatOrchestrator {
    pub fn new(config: &MindEaseConfig, calendar: Vec<CalendarEvent>, mode: ChatMode) -> Self {
        let id = Uuid::new_v4();
        info!(session_id = %id, ?mode, events = calendar.len(), "Chat session created");
        Self {
            id,
            mode,
            selector: ResponseSelector::new(RuleTable::default(), &config.chat),
            calendar,
            config: config.chat.clone(),
            reminders: config.reminders.clone(),
            state: Mutex::new(SessionState {
                store: MessageStore::new(),
                event: None,
                companion_id: None,
                companions: CompanionRegistry::new(),
            }),
        }
    }

    pub fn session_id(&self) -> Uuid {
        self.id
    }

    pub fn mode(&self) -> ChatMode {
        self.mode
    }

    pub fn calendar(&self) -> &[CalendarEvent] {
        &self.calendar
    }

    fn state(&self) -> Result<MutexGuard<'_, SessionState>, ChatError> {
        self.state
            .lock()
            .map_err(|e| ChatError::StateError(format!("session lock poisoned: {}", e)))
    }

    /// Open the conversation with a greeting.
    ///
    /// Assistant mode greets with today's outlook; companion mode selects
    /// the first companion if none is active and uses its greeting.
    pub fn start(&self, now: NaiveDateTime) -> Result<Message, ChatError> {
        let mut state = self.state()?;
        let (greeting, companion_id) = match self.mode {
            ChatMode::Assistant => (assistant_greeting(&self.calendar, now), None),
            ChatMode::Companion => {
                let persona = match state.companion_id.as_deref() {
                    Some(id) => state.companions.get(id),
                    None => state.companions.default_companion(),
                }
                .ok_or_else(|| ChatError::CompanionNotFound("default".to_string()))?;
                (persona.greeting.clone(), Some(persona.id.clone()))
            }
        };
        state.companion_id = companion_id.clone();
        Ok(state.store.restart(greeting, now, companion_id).clone())
    }

    /// Send a user message and return the reply that was appended.
    pub fn handle_message(&self, text: &str, now: NaiveDateTime) -> Result<Message, ChatError> {
        if !self.config.enabled {
            return Err(ChatError::Disabled);
        }
        if text.trim().is_empty() {
            return Err(ChatError::EmptyMessage);
        }
        if text.chars().count() > self.config.max_message_length {
            return Err(ChatError::MessageTooLong(self.config.max_message_length));
        }

        let mut state = self.state()?;
        let persona = self.active_persona(&state);
        let ctx = ContextBundle::new(now, &self.calendar)
            .with_persona(persona)
            .with_event(state.event.as_ref());
        let selection = self.selector.select_with_branch(text, &ctx);
        debug!(session_id = %self.id, branch = ?selection.branch, "Reply selected");

        let companion_id = persona.map(|p| p.id.clone());
        state.store.push_user(text, now);
        Ok(state
            .store
            .push_reply(selection.reply, now, companion_id)
            .clone())
    }

    fn active_persona<'s>(&self, state: &'s SessionState) -> Option<&'s Persona> {
        if self.mode != ChatMode::Companion {
            return None;
        }
        let id = state.companion_id.as_deref()?;
        let persona = state.companions.get(id);
        if persona.is_none() {
            warn!(companion_id = %id, "Active companion missing; using assistant replies");
        }
        persona
    }

    fn require_mode(&self, mode: ChatMode, action: &'static str) -> Result<(), ChatError> {
        if self.mode != mode {
            return Err(ChatError::WrongMode(action));
        }
        Ok(())
    }

    /// Focus the conversation on an upcoming event and restart it with an
    /// event-specific greeting. Assistant sessions only.
    pub fn set_event_context(
        &self,
        event: EventContext,
        now: NaiveDateTime,
    ) -> Result<Message, ChatError> {
        self.require_mode(ChatMode::Assistant, "event context")?;
        let mut state = self.state()?;
        info!(session_id = %self.id, title = %event.title, "Event context set");
        let greeting = event_greeting(&event);
        state.event = Some(event);
        Ok(state.store.restart(greeting, now, None).clone())
    }

    /// Parse the calendar hand-off and apply it.
    ///
    /// A malformed payload is logged and ignored; the session keeps its
    /// current state and `Ok(None)` is returned.
    pub fn set_event_context_json(
        &self,
        raw: &str,
        now: NaiveDateTime,
    ) -> Result<Option<Message>, ChatError> {
        self.require_mode(ChatMode::Assistant, "event context")?;
        match EventContext::from_json(raw) {
            Ok(event) => self.set_event_context(event, now).map(Some),
            Err(e) => {
                warn!(session_id = %self.id, error = %e, "Ignoring event context");
                Ok(None)
            }
        }
    }

    pub fn clear_event_context(&self) -> Result<(), ChatError> {
        self.state()?.event = None;
        Ok(())
    }

    pub fn event_context(&self) -> Result<Option<EventContext>, ChatError> {
        Ok(self.state()?.event.clone())
    }

    /// Switch companion (by id or name) and restart with its greeting.
    /// Companion sessions only.
    pub fn select_companion(&self, key: &str, now: NaiveDateTime) -> Result<Message, ChatError> {
        self.require_mode(ChatMode::Companion, "companion selection")?;
        let mut state = self.state()?;
        let persona = state
            .companions
            .find(key)
            .ok_or_else(|| ChatError::CompanionNotFound(key.to_string()))?;
        let (id, greeting) = (persona.id.clone(), persona.greeting.clone());
        info!(session_id = %self.id, companion = %persona.name, "Companion selected");
        state.companion_id = Some(id.clone());
        Ok(state.store.restart(greeting, now, Some(id)).clone())
    }

    /// Create a companion for this session and switch to it.
    pub fn add_custom_companion(
        &self,
        draft: PersonaDraft,
        now: NaiveDateTime,
    ) -> Result<Message, ChatError> {
        self.require_mode(ChatMode::Companion, "companion selection")?;
        let mut state = self.state()?;
        let persona = state.companions.add_custom(draft)?;
        let (id, greeting) = (persona.id.clone(), persona.greeting.clone());
        state.companion_id = Some(id.clone());
        Ok(state.store.restart(greeting, now, Some(id)).clone())
    }

    pub fn companions(&self) -> Result<Vec<Persona>, ChatError> {
        Ok(self.state()?.companions.all().to_vec())
    }

    pub fn active_companion(&self) -> Result<Option<Persona>, ChatError> {
        let state = self.state()?;
        let persona = self.active_persona(&state).cloned();
        Ok(persona)
    }

    pub fn history(&self) -> Result<Vec<Message>, ChatError> {
        Ok(self.state()?.store.messages().to_vec())
    }

    /// Idle-break sweep. Assistant sessions only.
    pub fn reminder_tick(&self, now: NaiveDateTime) -> Result<Option<Message>, ChatError> {
        if self.mode != ChatMode::Assistant || !self.reminders.enabled {
            return Ok(None);
        }
        let mut state = self.state()?;
        let text = idle_break_reminder(state.store.last(), &self.calendar, now, &self.reminders);
        Ok(text.map(|t| state.store.push_reply(t, now, None).clone()))
    }

    /// Pre-event preparation sweep. Assistant sessions only.
    pub fn suggestion_tick(&self, now: NaiveDateTime) -> Result<Option<Message>, ChatError> {
        if self.mode != ChatMode::Assistant || !self.reminders.enabled {
            return Ok(None);
        }
        let mut state = self.state()?;
        let text = pre_event_suggestion(&self.calendar, now, &self.reminders);
        Ok(text.map(|t| state.store.push_reply(t, now, None).clone()))
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::companion::GENERIC_COMPANION_REPLY;
    use crate::selector::FALLBACK_REPLY;
    use crate::types::MessageId;
    use chrono::NaiveDate;
    use mindease_core::fixtures::mock_calendar_events;

    fn sept7(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 9, 7)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn assistant() -> ChatOrchestrator {
        ChatOrchestrator::new(
            &MindEaseConfig::default(),
            mock_calendar_events(),
            ChatMode::Assistant,
        )
    }

    fn companion() -> ChatOrchestrator {
        ChatOrchestrator::new(
            &MindEaseConfig::default(),
            mock_calendar_events(),
            ChatMode::Companion,
        )
    }

    // ---- Assistant ----

    #[test]
    fn test_start_greets_with_agenda() {
        let orch = assistant();
        let greeting = orch.start(sept7(8, 0)).unwrap();
        assert_eq!(greeting.id, MessageId(0));
        assert!(!greeting.is_user);
        assert!(greeting.text.contains("Your next event \"Part-time Job Shift\""));
        assert_eq!(orch.mode(), ChatMode::Assistant);
    }

    #[test]
    fn test_handle_message_appends_user_and_reply() {
        let orch = assistant();
        orch.start(sept7(8, 0)).unwrap();
        let reply = orch.handle_message("purple elephants", sept7(8, 1)).unwrap();
        assert_eq!(reply.text, FALLBACK_REPLY);

        let history = orch.history().unwrap();
        assert_eq!(history.len(), 3);
        assert!(history[1].is_user);
        assert_eq!(history[1].text, "purple elephants");
        assert_eq!(history[2], reply);
        let ids: Vec<u64> = history.iter().map(|m| m.id.0).collect();
        assert_eq!(ids, vec![0, 1, 2]);
    }

    #[test]
    fn test_handle_message_rejects_empty() {
        let orch = assistant();
        assert!(matches!(
            orch.handle_message("   ", sept7(8, 0)),
            Err(ChatError::EmptyMessage)
        ));
        assert!(orch.history().unwrap().is_empty());
    }

    #[test]
    fn test_handle_message_rejects_too_long() {
        let orch = assistant();
        let long = "a".repeat(501);
        assert!(matches!(
            orch.handle_message(&long, sept7(8, 0)),
            Err(ChatError::MessageTooLong(500))
        ));
        let ok = "é".repeat(500);
        assert!(orch.handle_message(&ok, sept7(8, 0)).is_ok());
    }

    #[test]
    fn test_handle_message_disabled() {
        let mut config = MindEaseConfig::default();
        config.chat.enabled = false;
        let orch = ChatOrchestrator::new(&config, vec![], ChatMode::Assistant);
        assert!(matches!(
            orch.handle_message("hi", sept7(8, 0)),
            Err(ChatError::Disabled)
        ));
    }

    #[test]
    fn test_event_context_drives_replies() {
        let orch = assistant();
        orch.start(sept7(8, 0)).unwrap();
        let greeting = orch
            .set_event_context_json(
                r#"{"title":"Final Exam - Computer Science","type":"exam","time":"10:00","date":"Sep 7"}"#,
                sept7(8, 5),
            )
            .unwrap()
            .unwrap();
        assert!(greeting.text.starts_with("I see you're preparing for"));
        // Restart leaves only the event greeting.
        assert_eq!(orch.history().unwrap().len(), 1);

        let reply = orch.handle_message("help me get ready", sept7(8, 6)).unwrap();
        assert!(reply.text.contains("exam, I recommend"));

        orch.clear_event_context().unwrap();
        assert!(orch.event_context().unwrap().is_none());
        let reply = orch.handle_message("help me get ready", sept7(8, 7)).unwrap();
        assert_eq!(reply.text, FALLBACK_REPLY);
    }

    #[test]
    fn test_bad_event_context_is_ignored() {
        let orch = assistant();
        orch.start(sept7(8, 0)).unwrap();
        let result = orch.set_event_context_json("{oops", sept7(8, 1)).unwrap();
        assert!(result.is_none());
        assert!(orch.event_context().unwrap().is_none());
        assert_eq!(orch.history().unwrap().len(), 1);
    }

    #[test]
    fn test_reminder_tick_appends() {
        let orch = assistant();
        orch.start(sept7(8, 0)).unwrap();
        assert!(orch.reminder_tick(sept7(9, 0)).unwrap().is_none());
        let msg = orch.reminder_tick(sept7(12, 0)).unwrap().unwrap();
        assert!(msg.text.contains("\"Study Group - Database Systems\""));
        assert_eq!(orch.history().unwrap().len(), 2);
    }

    #[test]
    fn test_suggestion_tick_appends() {
        let orch = assistant();
        orch.start(sept7(8, 0)).unwrap();
        let msg = orch.suggestion_tick(sept7(9, 45)).unwrap().unwrap();
        assert!(msg.text.starts_with("📚"));
    }

    #[test]
    fn test_reminders_disabled() {
        let mut config = MindEaseConfig::default();
        config.reminders.enabled = false;
        let orch = ChatOrchestrator::new(&config, mock_calendar_events(), ChatMode::Assistant);
        orch.start(sept7(8, 0)).unwrap();
        assert!(orch.reminder_tick(sept7(12, 0)).unwrap().is_none());
        assert!(orch.suggestion_tick(sept7(9, 45)).unwrap().is_none());
    }

    #[test]
    fn test_session_ids_unique() {
        assert_ne!(assistant().session_id(), assistant().session_id());
    }

    // ---- Companion ----

    #[test]
    fn test_companion_start_defaults_to_luna() {
        let orch = companion();
        let greeting = orch.start(sept7(8, 0)).unwrap();
        assert!(greeting.text.starts_with("Hello! I'm Luna"));
        assert_eq!(greeting.companion_id.as_deref(), Some("1"));
        assert_eq!(orch.active_companion().unwrap().unwrap().name, "Luna");
    }

    #[test]
    fn test_companion_replies_and_tags_messages() {
        let orch = companion();
        orch.start(sept7(8, 0)).unwrap();
        let reply = orch.handle_message("I'm so tired", sept7(8, 1)).unwrap();
        assert!(reply.text.starts_with("Your body is asking for rest"));
        assert_eq!(reply.companion_id.as_deref(), Some("1"));
    }

    #[test]
    fn test_select_companion_restarts() {
        let orch = companion();
        orch.start(sept7(8, 0)).unwrap();
        orch.handle_message("hi", sept7(8, 1)).unwrap();

        let greeting = orch.select_companion("zara", sept7(8, 2)).unwrap();
        assert!(greeting.text.starts_with("Hey there! I'm Zara"));
        assert_eq!(orch.history().unwrap().len(), 1);
        let reply = orch.handle_message("this is hard", sept7(8, 3)).unwrap();
        assert!(reply.text.starts_with("YES!"));
    }

    #[test]
    fn test_select_unknown_companion() {
        let orch = companion();
        let err = orch.select_companion("Bob", sept7(8, 0)).unwrap_err();
        assert!(matches!(err, ChatError::CompanionNotFound(_)));
    }

    #[test]
    fn test_custom_companion() {
        let orch = companion();
        orch.start(sept7(8, 0)).unwrap();
        let greeting = orch
            .add_custom_companion(
                PersonaDraft {
                    name: "Milo".to_string(),
                    personality: "Chill".to_string(),
                    greeting: "Yo, Milo here.".to_string(),
                    ..Default::default()
                },
                sept7(8, 1),
            )
            .unwrap();
        assert_eq!(greeting.text, "Yo, Milo here.");
        assert_eq!(orch.companions().unwrap().len(), 5);

        let reply = orch.handle_message("I'm stressed", sept7(8, 2)).unwrap();
        assert_eq!(reply.text, GENERIC_COMPANION_REPLY);
    }

    #[test]
    fn test_companion_mode_has_no_reminders() {
        let orch = companion();
        orch.start(sept7(8, 0)).unwrap();
        assert!(orch.reminder_tick(sept7(12, 0)).unwrap().is_none());
    }

    #[test]
    fn test_assistant_rejects_companion_selection() {
        let orch = assistant();
        orch.start(sept7(8, 0)).unwrap();
        let err = orch.select_companion("zara", sept7(8, 1)).unwrap_err();
        assert!(matches!(err, ChatError::WrongMode(_)));
        assert!(orch
            .add_custom_companion(
                PersonaDraft {
                    name: "Milo".to_string(),
                    greeting: "Yo".to_string(),
                    ..Default::default()
                },
                sept7(8, 1),
            )
            .is_err());

        // Conversation is untouched and replies stay calendar-driven.
        let history = orch.history().unwrap();
        assert_eq!(history.len(), 1);
        assert!(history[0].text.starts_with("Hello! I'm your Voice AI Assistant"));
        assert!(orch.active_companion().unwrap().is_none());
        let reply = orch.handle_message("this is hard", sept7(8, 2)).unwrap();
        assert_eq!(reply.text, FALLBACK_REPLY);
    }

    #[test]
    fn test_companion_rejects_event_context() {
        let orch = companion();
        orch.start(sept7(8, 0)).unwrap();
        let exam = EventContext {
            title: "Final Exam - Computer Science".to_string(),
            event_type: mindease_core::EventType::Exam,
            time: None,
            date: None,
        };
        let err = orch.set_event_context(exam, sept7(8, 1)).unwrap_err();
        assert!(matches!(err, ChatError::WrongMode(_)));
        assert!(orch
            .set_event_context_json(r#"{"title":"Final Exam","type":"exam"}"#, sept7(8, 1))
            .is_err());
        assert!(orch.event_context().unwrap().is_none());

        let history = orch.history().unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].companion_id.as_deref(), Some("1"));
        let reply = orch.handle_message("I'm so tired", sept7(8, 2)).unwrap();
        assert!(reply.text.starts_with("Your body is asking for rest"));
    }
}
