use std::future::pending;

use anyhow::{Context, Result};
use futures::FutureExt;
use futures::future::BoxFuture;
use tokio::select;
use tokio::sync::mpsc::Receiver;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::autoplay::AutoplayTick;
use crate::engine::Engine;
use crate::events::EngineEvent;
use crate::input::InputDispatcher;
use crate::slideshow::{Transition, TransitionDone};

type InFlight = Option<BoxFuture<'static, TransitionDone>>;

async fn wait_transition(in_flight: &mut InFlight) -> TransitionDone {
    match in_flight {
        Some(work) => work.await,
        None => pending().await,
    }
}

fn launch(in_flight: &mut InFlight, transition: Option<Transition>) {
    if let Some(transition) = transition {
        debug!(effect = transition.effect_name(), file = %transition.target().filename, "running transition");
        *in_flight = Some(transition.run().boxed());
    }
}

/// Drives the engine: one event at a time, transitions run to completion
/// before their `TransitionDone` is handed back.
///
/// Returns when `cancel` fires. Startup failures (empty catalog, no reachable
/// music) are returned before the loop begins.
pub async fn run(
    mut engine: Engine,
    dispatcher: InputDispatcher,
    mut ticks: Receiver<AutoplayTick>,
    mut events: Receiver<EngineEvent>,
    cancel: CancellationToken,
) -> Result<Engine> {
    engine.start().context("failed to start slideshow")?;
    info!(autoplay = engine.autoplay.is_enabled(), "engine running");

    let mut in_flight: InFlight = None;
    let mut events_open = true;

    loop {
        select! {
            _ = cancel.cancelled() => break,

            done = wait_transition(&mut in_flight), if in_flight.is_some() => {
                in_flight = None;
                engine.on_transition_done(done);
            }

            Some(tick) = ticks.recv() => {
                let transition = engine.on_autoplay_tick(tick);
                launch(&mut in_flight, transition);
            }

            maybe_ev = events.recv(), if events_open => {
                match maybe_ev {
                    Some(EngineEvent::Command(token)) => {
                        let transition = dispatcher.dispatch_token(&mut engine, &token);
                        launch(&mut in_flight, transition);
                    }
                    Some(EngineEvent::Key(key)) => {
                        let transition = dispatcher.dispatch_key(&mut engine, &key);
                        launch(&mut in_flight, transition);
                    }
                    Some(EngineEvent::TrackEnded) => engine.on_track_ended(),
                    Some(EngineEvent::ResumeMusic) => engine.resume_music(),
                    None => {
                        // Input sources gone; autoplay keeps running.
                        debug!("event channel closed");
                        events_open = false;
                    }
                }
            }
        }
    }

    engine.shutdown();
    Ok(engine)
}
