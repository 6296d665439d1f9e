use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{MindEaseError, Result};
use crate::fixtures;
use crate::types::{CalendarEvent, CalendarSource};

/// Top-level configuration for MindEase.
///
/// Loaded from `~/.mindease/config.toml` by default. Every section and
/// field has a default, so an empty file is a valid configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MindEaseConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub chat: ChatConfig,
    #[serde(default)]
    pub reminders: ReminderConfig,
    #[serde(default)]
    pub voice: VoiceConfig,
    #[serde(default)]
    pub calendar: CalendarConfig,
}

impl MindEaseConfig {
    /// Load configuration from a TOML file.
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: MindEaseConfig = toml::from_str(&content)?;
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the
    /// file does not exist or cannot be parsed.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(
                    "Failed to load config from {}: {}. Using defaults.",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Save the current configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| MindEaseError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        info!("Configuration saved to {}", path.display());
        Ok(())
    }

    /// Resolve the calendar event list: the fixture file if configured,
    /// otherwise the built-in demo calendar.
    pub fn calendar_events(&self) -> Result<Vec<CalendarEvent>> {
        match self.fixture_path() {
            Some(p) => fixtures::load_calendar_events(p),
            None => Ok(fixtures::mock_calendar_events()),
        }
    }

    /// Calendar sources matching [`Self::calendar_events`].
    ///
    /// Fixture files carry events only, so `None` is returned when one is
    /// configured.
    pub fn calendar_sources(&self) -> Option<Vec<CalendarSource>> {
        match self.fixture_path() {
            Some(_) => None,
            None => Some(fixtures::mock_calendar_sources()),
        }
    }

    fn fixture_path(&self) -> Option<&Path> {
        self.calendar
            .fixture_path
            .as_deref()
            .filter(|p| !p.is_empty())
            .map(Path::new)
    }
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log level: trace, debug, info, warn, error.
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

/// Conversational assistant settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    /// Whether the chat engine accepts messages.
    pub enabled: bool,
    /// Maximum accepted message length in characters.
    pub max_message_length: usize,
    /// How far ahead (minutes) an upcoming event is mentioned in
    /// stress and break replies.
    pub lookahead_minutes: u32,
    /// When set, unmatched input on a day with more than this many events
    /// gets the busy-day reply instead of the fallback.
    pub busy_day_threshold: Option<usize>,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_message_length: 500,
            lookahead_minutes: 24 * 60,
            busy_day_threshold: None,
        }
    }
}

/// Timer-driven reminder sweeps.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReminderConfig {
    pub enabled: bool,
    /// Interval between idle-break checks.
    pub check_interval_secs: u64,
    /// Interval between pre-event preparation checks.
    pub suggestion_interval_secs: u64,
    /// Quiet period after the last reply before a break reminder fires.
    pub idle_threshold_minutes: i64,
    /// A break reminder only fires if the next event is further away than this.
    pub min_minutes_before_event: i64,
    /// Minutes before an exam when the confidence exercise is offered.
    pub exam_prep_minutes: i64,
    /// Minutes before a class when the energy boost is offered.
    pub class_prep_minutes: i64,
}

impl Default for ReminderConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            check_interval_secs: 30 * 60,
            suggestion_interval_secs: 60,
            idle_threshold_minutes: 120,
            min_minutes_before_event: 30,
            exam_prep_minutes: 15,
            class_prep_minutes: 10,
        }
    }
}

/// Voice input settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VoiceConfig {
    pub enabled: bool,
    /// Maximum recording duration in seconds.
    pub max_duration_seconds: u32,
    /// Simulated transcription latency in milliseconds.
    pub transcription_delay_ms: u64,
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_duration_seconds: 60,
            transcription_delay_ms: 1000,
        }
    }
}

/// Calendar data source.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CalendarConfig {
    /// Optional JSON file replacing the built-in demo calendar.
    pub fixture_path: Option<String>,
}
