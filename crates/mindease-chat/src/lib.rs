//! Conversational engine for MindEase.
//!
//! Provides the rule-based response selector, companion personas,
//! session message storage and the timer-driven reminder sweeps.

pub mod agenda;
pub mod companion;
pub mod error;
pub mod greeting;
pub mod orchestrator;
pub mod reminders;
pub mod rules;
pub mod selector;
pub mod session;
pub mod types;
pub mod voice;

pub use agenda::Agenda;
pub use companion::{CompanionRegistry, Persona, PersonaDraft};
pub use error::ChatError;
pub use orchestrator::{ChatMode, ChatOrchestrator};
pub use reminders::ReminderScheduler;
pub use rules::{ResponseRule, RuleTable};
pub use selector::{Branch, ResponseSelector, Selection, FALLBACK_REPLY, FREE_DAY_REPLY};
pub use session::MessageStore;
pub use types::{ContextBundle, EventContext, Message, MessageId};
pub use voice::VoiceInterface;
