//! Voice input for the assistant.
//!
//! There is no speech-to-text backend. Stopping a recording waits for the
//! configured delay and returns a canned transcript chosen by time of day,
//! which the caller then sends like typed text.

use std::time::Duration;

use chrono::{NaiveDateTime, Timelike};
use mindease_core::config::VoiceConfig;
use tracing::{debug, info};

use crate::error::ChatError;

const MORNING_TRANSCRIPT: &str = "Good morning, how should I prepare for my day?";
const AFTERNOON_TRANSCRIPT: &str = "I'm feeling a bit stressed about my upcoming events";

/// Recording state for the voice button.
pub struct VoiceInterface {
    config: VoiceConfig,
    started_at: Option<NaiveDateTime>,
}

impl VoiceInterface {
    pub fn new(config: VoiceConfig) -> Self {
        Self {
            config,
            started_at: None,
        }
    }

    pub fn is_available(&self) -> bool {
        self.config.enabled
    }

    pub fn is_active(&self) -> bool {
        self.started_at.is_some()
    }

    /// Start a recording.
    pub fn start_listening(&mut self, now: NaiveDateTime) -> Result<(), ChatError> {
        if self.is_active() {
            return Err(ChatError::VoiceError(
                "Voice capture is already active".to_string(),
            ));
        }
        if !self.is_available() {
            return Err(ChatError::VoiceError(
                "Voice capture is disabled".to_string(),
            ));
        }
        self.started_at = Some(now);
        info!("Voice capture started");
        Ok(())
    }

    /// Stop the recording and return the simulated transcript.
    ///
    /// A recording longer than `max_duration_seconds` is discarded.
    pub async fn stop_listening(&mut self, now: NaiveDateTime) -> Result<String, ChatError> {
        let started = self.started_at.take().ok_or_else(|| {
            ChatError::VoiceError("Voice capture is not active".to_string())
        })?;

        let recorded_secs = (now - started).num_seconds();
        if recorded_secs > i64::from(self.config.max_duration_seconds) {
            debug!(
                recorded_secs,
                max = self.config.max_duration_seconds,
                "Recording exceeded max duration"
            );
            return Err(ChatError::VoiceError(format!(
                "recording exceeded {} seconds",
                self.config.max_duration_seconds
            )));
        }

        tokio::time::sleep(Duration::from_millis(self.config.transcription_delay_ms)).await;
        let transcript = simulated_transcript(now);
        info!(transcript, "Voice capture transcribed");
        Ok(transcript.to_string())
    }
}

/// Canned transcript for a recording stopped at `now`.
pub fn simulated_transcript(now: NaiveDateTime) -> &'static str {
    match now.hour() {
        h if h < 12 => MORNING_TRANSCRIPT,
        h if h < 17 => AFTERNOON_TRANSCRIPT,
        _ => MORNING_TRANSCRIPT,
    }
}

// =============================================================================
// Tests
// =============================================================================
