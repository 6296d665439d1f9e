//! CLI argument definitions for the MindEase application.
//!
//! Priority resolution: CLI args > env vars > config file > defaults.

use std::path::PathBuf;

use chrono::NaiveDateTime;
use clap::{Parser, Subcommand};

/// MindEase: a calendar-aware wellness companion for the terminal.
#[derive(Parser, Debug)]
#[command(name = "mindease", version, about)]
pub struct CliArgs {
    /// Path to the configuration file.
    #[arg(short = 'c', long = "config", global = true)]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short = 'l', long = "log-level", global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Talk to the calendar-aware voice assistant.
    Chat {
        /// Start focused on an event, as JSON: {"title":..,"type":..,"time":..,"date":..}.
        #[arg(long = "event-context")]
        event_context: Option<String>,
    },
    /// Talk to a companion persona.
    Companion {
        /// Companion id or name (Luna, Zara, Sage, Aria).
        #[arg(short = 'p', long = "persona")]
        persona: Option<String>,
    },
    /// Print a single reply and exit.
    Ask {
        /// The message to send.
        text: String,
        /// Evaluate as of this local time (e.g. 2024-09-07T09:30:00).
        #[arg(long = "at", value_parser = parse_local_time)]
        at: Option<NaiveDateTime>,
        /// Reply as this companion instead of the assistant.
        #[arg(short = 'p', long = "persona")]
        persona: Option<String>,
        /// Event the question is about, as JSON. Assistant replies only.
        #[arg(long = "event-context", conflicts_with = "persona")]
        event_context: Option<String>,
    },
    /// Show today's agenda.
    Agenda {
        /// Show the agenda as of this local time.
        #[arg(long = "at", value_parser = parse_local_time)]
        at: Option<NaiveDateTime>,
    },
    /// Write the default configuration file.
    InitConfig {
        /// Overwrite an existing file.
        #[arg(long)]
        force: bool,
    },
}

impl CliArgs {
    /// Resolve the configuration file path.
    ///
    /// Priority: --config flag > MINDEASE_CONFIG env var > ~/.mindease/config.toml.
    pub fn resolve_config_path(&self) -> PathBuf {
        if let Some(ref p) = self.config {
            return p.clone();
        }
        if let Ok(p) = std::env::var("MINDEASE_CONFIG") {
            return PathBuf::from(p);
        }
        default_config_path()
    }

    /// Resolve the log filter.
    ///
    /// Priority: --log-level flag > RUST_LOG > config file value.
    pub fn resolve_log_filter(&self, config_level: &str) -> String {
        if let Some(ref level) = self.log_level {
            return level.clone();
        }
        if let Ok(filter) = std::env::var("RUST_LOG") {
            if !filter.is_empty() {
                return filter;
            }
        }
        config_level.to_string()
    }
}

fn parse_local_time(raw: &str) -> Result<NaiveDateTime, String> {
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M"))
        .map_err(|e| format!("expected YYYY-MM-DDTHH:MM[:SS]: {}", e))
}

/// Default config file path for the current platform.
fn default_config_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    if let Ok(home) = std::env::var("USERPROFILE") {
        return PathBuf::from(home).join(".mindease").join("config.toml");
    }
    #[cfg(not(target_os = "windows"))]
    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join(".mindease").join("config.toml");
    }
    PathBuf::from("config.toml")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ask_with_time() {
        let args = CliArgs::parse_from([
            "mindease",
            "ask",
            "I'm anxious",
            "--at",
            "2024-09-07T09:30",
        ]);
        match args.command {
            Command::Ask { text, at, persona, .. } => {
                assert_eq!(text, "I'm anxious");
                assert_eq!(at.unwrap().format("%H:%M").to_string(), "09:30");
                assert!(persona.is_none());
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_ask_persona_conflicts_with_event_context() {
        let res = CliArgs::try_parse_from([
            "mindease",
            "ask",
            "hi",
            "--persona",
            "luna",
            "--event-context",
            r#"{"title":"Exam"}"#,
        ]);
        assert!(res.is_err());
    }

    #[test]
    fn test_parse_bad_time_rejected() {
        let res = CliArgs::try_parse_from(["mindease", "agenda", "--at", "tomorrow"]);
        assert!(res.is_err());
    }

    #[test]
    fn test_global_config_flag() {
        let args = CliArgs::parse_from(["mindease", "companion", "-p", "zara", "-c", "/tmp/x.toml"]);
        assert_eq!(args.resolve_config_path(), PathBuf::from("/tmp/x.toml"));
        assert!(matches!(args.command, Command::Companion { persona: Some(ref p) } if p == "zara"));
    }

    #[test]
    fn test_log_flag_wins() {
        let args = CliArgs::parse_from(["mindease", "-l", "debug", "agenda"]);
        assert_eq!(args.resolve_log_filter("info"), "debug");
    }
}
