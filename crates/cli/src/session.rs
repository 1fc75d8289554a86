// FILE: crates/cli/src/session.rs

use crate::{catalog, commands};
use anyhow::{anyhow, bail, Context, Result};
use clap::ArgMatches;
use console::style;
use hymnal_config::{Config, ConfigManager};
use hymnal_core::RepeatMode;
use hymnal_network::TrackResolver;
use hymnal_playback::{
    EventBus, HeadlessPlayer, LoadTrigger, PlaybackContext, PlaybackEvent, PlaybackState,
    ProgressSnapshot, QueueCoordinator,
};
use std::time::Duration;
use tokio::sync::broadcast::{self, error::TryRecvError};
use tokio::sync::watch;

/// Real time between simulation steps
const TICK: Duration = Duration::from_millis(100);

/// Simulated seconds between progress lines
const PROGRESS_EVERY_SECS: f64 = 15.0;

/// What a finished session did
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionSummary {
    pub tracks_started: usize,
    pub simulated_secs: f64,
}

/// `session <playlist>`: play through the headless player
pub async fn run(manager: &ConfigManager, config: &Config, matches: &ArgMatches) -> Result<()> {
    let name = matches
        .get_one::<String>("playlist")
        .ok_or_else(|| anyhow!("Playlist name is required"))?;
    let start = matches.get_one::<usize>("start").copied().unwrap_or(1);
    let shuffle = matches.get_flag("shuffle") || config.player.shuffle;
    let repeat = match matches.get_one::<String>("repeat") {
        Some(raw) => raw.parse::<RepeatMode>().map_err(|e| anyhow!(e))?,
        None => config.player.repeat_mode,
    };
    let budget = matches.get_one::<u64>("seconds").copied().unwrap_or(600) as f64;
    let speed = matches.get_one::<f64>("speed").copied().unwrap_or(30.0);
    if !speed.is_finite() || speed <= 0.0 {
        bail!("Speed must be a positive number");
    }

    let (_, library) = commands::open_library(manager, config)?;
    let hymns = catalog::hymns();
    let playlist = commands::find_playlist(&library, &hymns, name)?;
    if playlist.is_empty() {
        bail!("'{}' has no hymns", playlist.name);
    }
    let start_index = commands::to_index(start, playlist.len())?;

    let mut settings = commands::controller_settings(config);
    if matches.get_flag("instrumental") {
        settings.prefer_vocal = false;
    }

    let context = PlaybackContext::new(HeadlessPlayer::new());
    let events = EventBus::new();
    let mut rx = events.subscribe();
    let mut coordinator =
        QueueCoordinator::new(context.clone(), commands::build_resolver(config)?, settings)
            .with_events(events);

    println!(
        "\n{} {} ({} hymns, repeat {}{})",
        style("▶").green().bold(),
        style(&playlist.name).bold().cyan(),
        playlist.len(),
        repeat,
        if shuffle { ", shuffled" } else { "" }
    );
    println!("{}", "=".repeat(60));

    coordinator.set_repeat_mode(repeat).await;
    coordinator
        .play_playlist(&playlist, start_index, shuffle)
        .await
        .context("Failed to start session")?;

    let summary = drive(&context, &mut coordinator, &mut rx, budget, speed).await;
    println!(
        "\n{} tracks started over {} of simulated playback",
        style(summary.tracks_started).bold(),
        hymnal_core::format_clock(summary.simulated_secs)
    );
    Ok(())
}

/// Advances the player until the budget runs out, the queue finishes or
/// the user interrupts
pub async fn drive<R: TrackResolver>(
    context: &PlaybackContext<HeadlessPlayer>,
    coordinator: &mut QueueCoordinator<HeadlessPlayer, R>,
    rx: &mut broadcast::Receiver<PlaybackEvent>,
    budget_secs: f64,
    speed: f64,
) -> SessionSummary {
    let mut ticker = tokio::time::interval(TICK);
    let mut progress = coordinator.progress();
    let mut last_mark = None;
    let mut simulated = 0.0;
    let mut tracks_started = print_events(rx);

    while simulated < budget_secs && coordinator.state() != PlaybackState::Idle {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = tokio::signal::ctrl_c() => {
                println!("{}", style("Interrupted").yellow());
                break;
            }
        }

        let step = (TICK.as_secs_f64() * speed).min(budget_secs - simulated);
        simulated += step;
        for event in context.with_player(|p| p.advance(step)) {
            coordinator.handle_player_event(event).await;
        }

        tracks_started += print_events(rx);
        print_progress(&mut progress, &mut last_mark);
    }

    coordinator.stop();
    tracks_started += print_events(rx);
    SessionSummary {
        tracks_started,
        simulated_secs: simulated,
    }
}

/// Prints pending events; returns how many tracks started
fn print_events(rx: &mut broadcast::Receiver<PlaybackEvent>) -> usize {
    let mut started = 0;
    loop {
        match rx.try_recv() {
            Ok(event) => {
                if matches!(event, PlaybackEvent::NowPlaying { .. }) {
                    started += 1;
                }
                if let Some(line) = describe(&event) {
                    println!("{}", line);
                }
            }
            Err(TryRecvError::Lagged(missed)) => {
                log::warn!("Missed {} playback events", missed);
            }
            Err(_) => break,
        }
    }
    started
}

fn print_progress(progress: &mut watch::Receiver<ProgressSnapshot>, last_mark: &mut Option<u64>) {
    if !progress.has_changed().unwrap_or(false) {
        return;
    }
    let snapshot = progress.borrow_and_update().clone();
    if snapshot.duration_secs <= 0.0 {
        return;
    }
    let mark = (snapshot.elapsed_secs / PROGRESS_EVERY_SECS).floor() as u64;
    if *last_mark != Some(mark) {
        *last_mark = Some(mark);
        println!("{}", style(progress_line(&snapshot)).dim());
    }
}

pub fn progress_line(snapshot: &ProgressSnapshot) -> String {
    const WIDTH: usize = 30;
    let filled = ((snapshot.progress * WIDTH as f64).round() as usize).min(WIDTH);
    format!(
        "    [{}{}] {} {}",
        "=".repeat(filled),
        " ".repeat(WIDTH - filled),
        snapshot.elapsed_label,
        snapshot.remaining_label
    )
}

/// One line per event worth showing; state changes into loading are skipped
pub fn describe(event: &PlaybackEvent) -> Option<String> {
    match event {
        PlaybackEvent::StateChanged {
            state: PlaybackState::Loading,
        } => None,
        PlaybackEvent::StateChanged { state } => Some(format!("  state: {}", state)),
        PlaybackEvent::NowPlaying {
            hymn,
            title,
            vocal,
            trigger,
        } => Some(format!(
            "{} {} {} ({}, {})",
            style("♪").green(),
            style(title).bold(),
            style(hymn).dim(),
            if *vocal { "vocal" } else { "instrumental" },
            match trigger {
                LoadTrigger::UserRequested => "requested",
                LoadTrigger::PlayerAdvanced => "auto-advance",
            }
        )),
        PlaybackEvent::QueueChanged {
            cursor,
            len,
            shuffled,
        } => Some(format!(
            "  queue: {}/{}{}",
            cursor + 1,
            len,
            if *shuffled { " (shuffled)" } else { "" }
        )),
        PlaybackEvent::RepeatModeChanged { mode } => Some(format!("  repeat: {}", mode)),
        PlaybackEvent::QueueFinished => Some(format!("{}", style("Queue finished").cyan())),
        PlaybackEvent::Error { message } => {
            Some(format!("{} {}", style("✗").red().bold(), message))
        }
    }
}
