// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

use std::future::IntoFuture;
use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use setlist::api;
use setlist::arrangement::CueParser;
use setlist::config::{validate_cue_sheet, ConfigEvent, CueSheet, CueSheetWatcher, Settings};
use setlist::engine::{Engine, ObserverRegistry};
use setlist::state::AppState;
use setlist::timeline::SharedTimeline;
use setlist::transport::{subscribe, SimTransport};

const DEFAULT_SETTINGS: &str = "setlist.toml";

#[derive(Parser)]
#[command(name = "setlist")]
#[command(about = "Live-performance cue sequencer", long_about = None)]
struct Cli {
    /// Settings file (defaults to ./setlist.toml when present)
    #[arg(short, long, global = true, env = "SETLIST_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the transport, engine and control server
    Serve,
    /// Parse a cue sheet and print the resulting songs
    Check {
        /// Cue sheet (YAML)
        cue_sheet: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "setlist=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let settings = load_settings(cli.config.as_deref())?;

    match cli.command {
        Commands::Serve => serve(settings).await,
        Commands::Check { cue_sheet } => check(&cue_sheet, &settings),
    }
}

fn load_settings(path: Option<&Path>) -> Result<Settings> {
    match path {
        Some(path) => Settings::load(path),
        None if Path::new(DEFAULT_SETTINGS).exists() => Settings::load(DEFAULT_SETTINGS),
        None => Ok(Settings::default()),
    }
}

async fn serve(settings: Settings) -> Result<()> {
    tracing::info!("Starting setlist");

    let sheet = CueSheet::load(&settings.transport.cue_sheet)?;
    let transport = Arc::new(SimTransport::new(sheet));
    transport
        .clone()
        .spawn_clock(Duration::from_millis(settings.transport.tick_ms.max(1)));

    if settings.transport.watch {
        watch_cue_sheet(&settings, transport.clone())?;
    }

    let timeline = SharedTimeline::default();
    let observers = ObserverRegistry::new(settings.engine.observer_queue);

    let events = subscribe(transport.as_ref());
    let engine = Engine::new(
        transport.clone(),
        timeline.clone(),
        observers.clone(),
        &settings.engine,
    );
    let playback = engine.subscribe_state();
    tokio::spawn(engine.run(events));

    let state = AppState::new(
        transport,
        timeline,
        CueParser::new(settings.parser.clone()),
        playback,
        observers,
    );
    match state.refresh_timeline().await {
        Ok(timeline) => tracing::info!("Loaded {} songs", timeline.len()),
        Err(e) => tracing::warn!("Initial timeline: {}", e),
    }

    let host: IpAddr = settings
        .server
        .host
        .parse()
        .with_context(|| format!("Invalid host address: {}", settings.server.host))?;

    let http_addr = SocketAddr::new(host, settings.server.http_port);
    let http_listener = tokio::net::TcpListener::bind(http_addr)
        .await
        .with_context(|| format!("Failed to bind {}", http_addr))?;
    tracing::info!("Control API listening on {}", http_addr);
    let http = axum::serve(http_listener, api::create_router(state.clone()))
        .with_graceful_shutdown(shutdown_signal());

    match settings.server.push_port {
        Some(port) => {
            let push_addr = SocketAddr::new(host, port);
            let push_listener = tokio::net::TcpListener::bind(push_addr)
                .await
                .with_context(|| format!("Failed to bind {}", push_addr))?;
            tracing::info!("Push channel listening on {}", push_addr);
            let push = axum::serve(push_listener, api::create_push_router(state))
                .with_graceful_shutdown(shutdown_signal());
            tokio::try_join!(http.into_future(), push.into_future())?;
        }
        None => http.await?,
    }

    tracing::info!("Shut down");
    Ok(())
}

/// Reload the cue sheet into the transport whenever it changes on disk
fn watch_cue_sheet(settings: &Settings, transport: Arc<SimTransport>) -> Result<()> {
    let watcher = CueSheetWatcher::new(
        &settings.transport.cue_sheet,
        Some(settings.transport.debounce_ms),
    )?;
    tracing::info!("Watching {:?}", watcher.watched_path());

    std::thread::spawn(move || {
        while let Some(event) = watcher.recv() {
            match event {
                ConfigEvent::Reloaded(sheet) => transport.load_sheet(*sheet),
                ConfigEvent::Error(e) => tracing::warn!("Cue sheet not reloaded: {}", e),
            }
        }
    });
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for ctrl-c: {}", e);
        std::future::pending::<()>().await;
    }
}

fn check(path: &Path, settings: &Settings) -> Result<()> {
    let sheet = validate_cue_sheet(path)?;
    let outcome = CueParser::new(settings.parser.clone()).parse(&sheet.cues);

    println!("{:?}: {} cues at {} BPM", path, sheet.cues.len(), sheet.tempo);
    println!();
    for (i, song) in outcome.timeline.songs().iter().enumerate() {
        println!(
            "{:>3}. {} [{} - {}] id {}{}",
            i + 1,
            song.name(),
            song.start().time,
            song.end().time,
            song.id(),
            if song.stop_at_end() { "" } else { " (continues)" }
        );
        for section in song.sections() {
            println!("       {:<20} {:>8} id {}", section.name, section.time, section.id);
        }
    }

    if !outcome.issues.is_empty() {
        println!();
        println!("Issues:");
        for issue in &outcome.issues {
            println!("  - {}", issue);
        }
    }

    if outcome.timeline.is_empty() {
        anyhow::bail!("No songs found");
    }
    Ok(())
}
