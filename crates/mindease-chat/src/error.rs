//! Error types for the conversational engine.

/// Errors from the chat engine.
///
/// The response selector itself never fails; these come from the session
/// boundary around it.
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("chat is disabled")]
    Disabled,
    #[error("message cannot be empty")]
    EmptyMessage,
    #[error("message exceeds maximum length of {0} characters")]
    MessageTooLong(usize),
    #[error("companion not found: {0}")]
    CompanionNotFound(String),
    #[error("invalid companion: {0}")]
    InvalidCompanion(String),
    #[error("invalid event context: {0}")]
    InvalidEventContext(String),
    #[error("voice error: {0}")]
    VoiceError(String),
    #[error("{0} is not available in this chat mode")]
    WrongMode(&'static str),
    #[error("state error: {0}")]
    StateError(String),
}
