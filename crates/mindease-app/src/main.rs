//! MindEase application binary - composition root.
//!
//! 1. Parse CLI arguments and load configuration from TOML
//! 2. Initialize tracing
//! 3. Resolve the calendar (fixture file or built-in demo data)
//! 4. Run the requested command: an interactive chat with background
//!    reminder sweeps, a one-shot reply, or an agenda listing

mod cli;

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDateTime;
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};

use mindease_chat::{
    Agenda, ChatError, ChatMode, ChatOrchestrator, Message, MessageId, ReminderScheduler,
    VoiceInterface,
};
use mindease_core::{CalendarEvent, CalendarSource, MindEaseConfig};

use cli::{CliArgs, Command};

type AppResult<T> = Result<T, Box<dyn std::error::Error>>;

fn local_now() -> NaiveDateTime {
    chrono::Local::now().naive_local()
}

// =============================================================================
// Output
// =============================================================================

fn print_message(msg: &Message, companion_name: Option<&str>) {
    let speaker = if msg.is_user {
        "you"
    } else {
        companion_name.unwrap_or("mindease")
    };
    println!("[{}] {}: {}", msg.timestamp.format("%H:%M"), speaker, msg.text);
}

/// Print every assistant message newer than `last_seen` and advance it.
///
/// User messages are echoed by the terminal already.
fn flush_new(orch: &ChatOrchestrator, last_seen: &mut Option<MessageId>) -> AppResult<()> {
    let speaker = orch.active_companion()?.map(|p| p.name);
    for msg in orch.history()? {
        if last_seen.is_some_and(|seen| msg.id <= seen) {
            continue;
        }
        if !msg.is_user {
            print_message(&msg, speaker.as_deref());
        }
        *last_seen = Some(msg.id);
    }
    Ok(())
}

// =============================================================================
// Commands
// =============================================================================

async fn run_chat(
    config: &MindEaseConfig,
    calendar: Vec<CalendarEvent>,
    mode: ChatMode,
    persona: Option<String>,
    event_context: Option<String>,
) -> AppResult<()> {
    let orch = Arc::new(ChatOrchestrator::new(config, calendar, mode));
    orch.start(local_now())?;
    if let Some(key) = persona.as_deref() {
        orch.select_companion(key, local_now())?;
    }
    if let Some(raw) = event_context.as_deref() {
        orch.set_event_context_json(raw, local_now())?;
    }

    let scheduler = Arc::new(ReminderScheduler::new(Arc::clone(&orch), &config.reminders));
    let scheduler_task = {
        let scheduler = Arc::clone(&scheduler);
        tokio::spawn(async move { scheduler.run().await })
    };

    let mut voice = VoiceInterface::new(config.voice.clone());
    let mut last_seen = None;
    flush_new(&orch, &mut last_seen)?;
    println!("(commands: /voice, /companions, /switch <name>, /event <json>, /clear, /quit)");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut poll = tokio::time::interval(Duration::from_secs(1));

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                if !handle_line(&orch, &mut voice, line).await? {
                    break;
                }
                flush_new(&orch, &mut last_seen)?;
            }
            _ = poll.tick() => {
                flush_new(&orch, &mut last_seen)?;
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Interrupted");
                break;
            }
        }
    }

    scheduler.shutdown();
    if let Err(e) = scheduler_task.await {
        tracing::warn!(error = %e, "Reminder scheduler task failed");
    }
    tracing::info!(session_id = %orch.session_id(), "Chat session ended");
    Ok(())
}

/// Handle one input line. Returns `false` when the session should end.
async fn handle_line(
    orch: &ChatOrchestrator,
    voice: &mut VoiceInterface,
    line: &str,
) -> AppResult<bool> {
    let (cmd, rest) = match line.split_once(' ') {
        Some((c, r)) => (c, r.trim()),
        None => (line, ""),
    };

    match cmd {
        "/quit" | "/exit" => return Ok(false),
        "/companions" => {
            for p in orch.companions()? {
                println!("  {:>2}  {:<6} {}", p.id, p.name, p.personality);
            }
        }
        "/switch" => match orch.select_companion(rest, local_now()) {
            Ok(_) => {}
            Err(ChatError::CompanionNotFound(key)) => println!("No companion named {}", key),
            Err(e @ ChatError::WrongMode(_)) => println!("{}", e),
            Err(e) => return Err(e.into()),
        },
        "/event" => match orch.set_event_context_json(rest, local_now()) {
            Ok(Some(_)) => {}
            Ok(None) => println!("Could not read that event; keeping the current conversation."),
            Err(e @ ChatError::WrongMode(_)) => println!("{}", e),
            Err(e) => return Err(e.into()),
        },
        "/clear" => orch.clear_event_context()?,
        "/voice" => {
            if !voice.is_available() {
                println!("Voice input is disabled.");
                return Ok(true);
            }
            voice.start_listening(local_now())?;
            println!("Listening...");
            match voice.stop_listening(local_now()).await {
                Ok(transcript) => {
                    println!("(heard) {}", transcript);
                    send(orch, &transcript)?;
                }
                Err(e @ ChatError::VoiceError(_)) => println!("{}", e),
                Err(e) => return Err(e.into()),
            }
        }
        _ => send(orch, line)?,
    }
    Ok(true)
}

fn send(orch: &ChatOrchestrator, text: &str) -> AppResult<()> {
    match orch.handle_message(text, local_now()) {
        Ok(_) => Ok(()),
        Err(e @ (ChatError::EmptyMessage | ChatError::MessageTooLong(_))) => {
            println!("{}", e);
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

fn run_ask(
    config: &MindEaseConfig,
    calendar: Vec<CalendarEvent>,
    text: &str,
    at: Option<NaiveDateTime>,
    persona: Option<String>,
    event_context: Option<String>,
) -> AppResult<()> {
    let now = at.unwrap_or_else(local_now);
    let mode = if persona.is_some() {
        ChatMode::Companion
    } else {
        ChatMode::Assistant
    };
    let orch = ChatOrchestrator::new(config, calendar, mode);
    orch.start(now)?;
    if let Some(key) = persona.as_deref() {
        orch.select_companion(key, now)?;
    }
    if let Some(raw) = event_context.as_deref() {
        orch.set_event_context_json(raw, now)?;
    }
    let reply = orch.handle_message(text, now)?;
    println!("{}", reply.text);
    Ok(())
}

/// One agenda row. The source column is left out when no source list
/// describes the calendar.
fn agenda_line(event: &CalendarEvent, sources: Option<&[CalendarSource]>) -> String {
    let mut line = format!(
        "  {}  {:<40} {:<6}",
        event.date.format("%H:%M"),
        event.title,
        event.event_type.as_str()
    );
    if let Some(sources) = sources {
        let source = sources
            .iter()
            .find(|s| s.id == event.calendar_id)
            .map(|s| s.name.as_str())
            .unwrap_or("Unknown");
        line.push(' ');
        line.push_str(source);
    }
    line.trim_end().to_string()
}

fn run_agenda(
    calendar: &[CalendarEvent],
    sources: Option<&[CalendarSource]>,
    at: Option<NaiveDateTime>,
) {
    let now = at.unwrap_or_else(local_now);
    let agenda = Agenda::for_day(calendar, now);

    println!("{}", now.format("%A, %B %-d"));
    if agenda.is_free_day() {
        println!("  Nothing scheduled today.");
        return;
    }
    for event in agenda.events() {
        println!("{}", agenda_line(event, sources));
    }
    if let Some(next) = agenda.next_event() {
        println!(
            "Next: \"{}\" in {} minutes",
            next.title,
            agenda.minutes_until(next)
        );
    }
}

fn run_init_config(args: &CliArgs, force: bool) -> AppResult<()> {
    let path = args.resolve_config_path();
    if path.exists() && !force {
        println!(
            "{} already exists (use --force to overwrite)",
            path.display()
        );
        return Ok(());
    }
    MindEaseConfig::default().save(&path)?;
    println!("Wrote {}", path.display());
    Ok(())
}

// =============================================================================
// Entry point
// =============================================================================

#[tokio::main]
async fn main() -> AppResult<()> {
    let args = CliArgs::parse();

    // Config.
    let config_file = args.resolve_config_path();
    let config = MindEaseConfig::load_or_default(&config_file);

    // Tracing.
    let filter = args.resolve_log_filter(&config.general.log_level);
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_new(&filter)
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("Starting MindEase v{}", env!("CARGO_PKG_VERSION"));
    tracing::debug!(path = %config_file.display(), "Configuration resolved");

    if let Command::InitConfig { force } = args.command {
        return run_init_config(&args, force);
    }

    let calendar = config.calendar_events()?;
    tracing::info!(events = calendar.len(), "Calendar loaded");

    match args.command {
        Command::Chat { event_context } => {
            run_chat(&config, calendar, ChatMode::Assistant, None, event_context).await
        }
        Command::Companion { persona } => {
            run_chat(&config, calendar, ChatMode::Companion, persona, None).await
        }
        Command::Ask {
            text,
            at,
            persona,
            event_context,
        } => run_ask(&config, calendar, &text, at, persona, event_context),
        Command::Agenda { at } => {
            let sources = config.calendar_sources();
            run_agenda(&calendar, sources.as_deref(), at);
            Ok(())
        }
        Command::InitConfig { .. } => Ok(()),
    }
}
