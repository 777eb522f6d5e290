//! Binary entrypoint: loads configuration and runs the engine against the
//! headless host.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use tokio::io::{self, AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{Level, debug, info, warn};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::Directive;

#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};

use rust_slideshow::autoplay::AutoplayTick;
use rust_slideshow::captions::CaptionDocument;
use rust_slideshow::config::Configuration;
use rust_slideshow::effects::EffectRegistry;
use rust_slideshow::engine::{Engine, Host};
use rust_slideshow::events::EngineEvent;
use rust_slideshow::headless::{LoggingOverlay, LoggingPlayback, LoggingSurfaces};
use rust_slideshow::input::{Command, InputDispatcher};
use rust_slideshow::playlist::FsProbe;
use rust_slideshow::tasks;

#[derive(Debug, Parser)]
#[command(name = "slideshow", version, about = "Looping slideshow and music engine")]
struct Args {
    /// Path to the configuration document (JSON or YAML)
    #[arg(value_name = "CONFIG", default_value = "config.json")]
    config: PathBuf,
    /// Caption document; defaults to captions.json next to the config
    #[arg(long, value_name = "FILE")]
    captions: Option<PathBuf>,
    /// Deterministic RNG seed for shuffles and effect selection
    #[arg(long, value_name = "SEED")]
    seed: Option<u64>,
    /// Override the autoplay interval (ms)
    #[arg(long, value_name = "MILLIS")]
    delay_ms: Option<u64>,
    /// Increase log verbosity (repeatable)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    verbose: u8,
}

fn log_filter(verbosity: u8) -> Result<EnvFilter> {
    // map -v to log level
    let level = match verbosity {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let directive: Directive = format!("rust_slideshow={level}")
        .parse()
        .context("building log filter")?;
    Ok(EnvFilter::from_default_env().add_directive(directive))
}

fn init_tracing(verbosity: u8) -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(verbosity)?)
        .with_target(false)
        .compact()
        .init();
    Ok(())
}

fn load_captions(explicit: Option<&Path>, config: &Path) -> Result<CaptionDocument> {
    if let Some(path) = explicit {
        return CaptionDocument::from_file(path)
            .with_context(|| format!("failed to load captions from {}", path.display()));
    }
    let sibling = config
        .parent()
        .unwrap_or_else(|| Path::new("."))
        .join("captions.json");
    if !sibling.is_file() {
        debug!(path = %sibling.display(), "no caption document");
        return Ok(CaptionDocument::default());
    }
    match CaptionDocument::from_file(&sibling) {
        Ok(doc) => Ok(doc),
        Err(err) => {
            warn!(path = %sibling.display(), "ignoring unreadable captions: {err}");
            Ok(CaptionDocument::default())
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let Args {
        config,
        captions,
        seed,
        delay_ms,
        verbose,
    } = Args::parse();
    init_tracing(verbose)?;

    let mut cfg = Configuration::from_file(&config)
        .with_context(|| format!("failed to load configuration from {}", config.display()))?;
    if seed.is_some() {
        cfg.shuffle_seed = seed;
    }
    if let Some(ms) = delay_ms {
        cfg.delay = ms;
    }
    let cfg = cfg.validated().context("invalid configuration values")?;
    debug!("loaded configuration from {}:\n{:#?}", config.display(), cfg);

    let captions = load_captions(captions.as_deref(), &config)?;
    info!(captions = captions.len(), "captions loaded");

    let cancel = CancellationToken::new();
    let (tick_tx, tick_rx) = mpsc::channel::<AutoplayTick>(4);
    let (event_tx, event_rx) = mpsc::channel::<EngineEvent>(32);

    let overlay = Arc::new(LoggingOverlay);
    let host = Host {
        surfaces: Arc::new(LoggingSurfaces::default()),
        captions: overlay.clone(),
        debug: overlay,
        playback: Arc::new(LoggingPlayback::default()),
        probe: Arc::new(FsProbe),
    };
    let engine = Engine::from_config(
        &cfg,
        host,
        captions,
        EffectRegistry::with_builtins(),
        tick_tx,
        cancel.clone(),
    )
    .context("failed to build engine")?;

    // stdin lines are key names or command tokens; EOF shuts down
    {
        let cancel = cancel.clone();
        let events = event_tx.clone();
        tokio::spawn(async move {
            let mut lines = BufReader::new(io::stdin()).lines();
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    line = lines.next_line() => match line {
                        Ok(Some(line)) => {
                            let Some(event) = EngineEvent::from_line(&line) else { continue };
                            if events.send(event).await.is_err() {
                                break;
                            }
                        }
                        Ok(None) => {
                            info!("stdin closed; initiating shutdown");
                            cancel.cancel();
                            break;
                        }
                        Err(err) => {
                            warn!("stdin watcher failed: {err}");
                            break;
                        }
                    }
                }
            }
        });
    }

    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if let Err(err) = tokio::signal::ctrl_c().await {
                warn!("ctrl-c handler failed: {err}");
                return;
            }
            info!("ctrl-c received; initiating shutdown");
            cancel.cancel();
        });
    }

    #[cfg(unix)]
    {
        let cancel = cancel.clone();
        let events = event_tx.clone();
        tokio::spawn(async move {
            match signal(SignalKind::user_defined1()) {
                Ok(mut sigusr1) => loop {
                    tokio::select! {
                        _ = cancel.cancelled() => break,
                        received = sigusr1.recv() => {
                            if received.is_none() {
                                break;
                            }
                            info!("SIGUSR1 received; toggling autoplay");
                            let token = Command::ToggleAutoplay.as_str().to_string();
                            if let Err(err) = events.send(EngineEvent::Command(token)).await {
                                warn!("failed to forward autoplay toggle: {err}");
                                break;
                            }
                        }
                    }
                },
                Err(err) => warn!("failed to register SIGUSR1 handler: {err}"),
            }
        });
    }
    drop(event_tx);

    let dispatcher = InputDispatcher::new(cfg.keyboard.enabled);
    let result = tasks::engine::run(engine, dispatcher, tick_rx, event_rx, cancel.clone()).await;
    cancel.cancel();
    result.context("engine failed")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_raises_the_crate_directive() {
        let rendered = |v| log_filter(v).unwrap().to_string().to_lowercase();
        assert!(rendered(0).contains("rust_slideshow=info"));
        assert!(rendered(1).contains("rust_slideshow=debug"));
        assert!(rendered(5).contains("rust_slideshow=trace"));
    }
}
