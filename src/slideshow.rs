//! Slideshow state machine.
//!
//! `Idle` → `Showing` on [`SlideshowController::start`], then alternates
//! between `Showing` and `Transitioning`. At most one transition is in flight:
//! [`SlideshowController::advance`] hands out a [`Transition`] whose future
//! must be driven to completion and its [`TransitionDone`] returned through
//! [`SlideshowController::complete`]. Requests arriving mid-transition are
//! dropped, not queued.

use std::sync::Arc;
use std::time::Duration;

use futures::future::BoxFuture;
use rand::rngs::StdRng;
use tracing::{debug, info, warn};

use crate::captions::CaptionBinder;
use crate::catalog::{ImageCatalog, ImageEntry};
use crate::config::Configuration;
use crate::debug_overlay::DebugReporter;
use crate::effects::{EffectRegistry, TransitionContext};
use crate::error::Error;
use crate::surface::{RenderSurfaces, SurfaceId};

const INITIAL_EFFECT: &str = "(initial)";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlideshowState {
    Idle,
    Showing,
    Transitioning,
}

#[derive(Debug, Clone)]
pub struct SlideshowOptions {
    pub transitions: Vec<String>,
    pub random_transitions: bool,
    pub transition_duration: Duration,
    pub reshuffle_on_loop: bool,
}

impl From<&Configuration> for SlideshowOptions {
    fn from(cfg: &Configuration) -> Self {
        Self {
            transitions: cfg.transitions.clone(),
            random_transitions: cfg.random_transitions,
            transition_duration: cfg.transition_duration(),
            reshuffle_on_loop: cfg.images.reshuffle_on_loop,
        }
    }
}

impl Default for SlideshowOptions {
    fn default() -> Self {
        Self::from(&Configuration::default())
    }
}

/// One live surface and the image it holds.
#[derive(Debug, Clone)]
struct Slot {
    surface: SurfaceId,
    image: ImageEntry,
}

#[derive(Debug)]
struct InFlight {
    seq: u64,
    next: Slot,
    effect: String,
}

/// An effect in flight. Consumed by [`Transition::run`], which resolves once
/// the visual work is finished.
pub struct Transition {
    seq: u64,
    effect: String,
    target: ImageEntry,
    work: BoxFuture<'static, ()>,
}

impl Transition {
    pub fn effect_name(&self) -> &str {
        &self.effect
    }

    pub fn target(&self) -> &ImageEntry {
        &self.target
    }

    pub async fn run(self) -> TransitionDone {
        self.work.await;
        TransitionDone { seq: self.seq }
    }
}

impl std::fmt::Debug for Transition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transition")
            .field("seq", &self.seq)
            .field("effect", &self.effect)
            .field("target", &self.target.filename)
            .finish_non_exhaustive()
    }
}

/// Completion signal of one [`Transition`]. Not `Clone`: each transition
/// completes exactly once.
#[derive(Debug)]
#[must_use = "hand the completion back to SlideshowController::complete"]
pub struct TransitionDone {
    seq: u64,
}

#[derive(Debug)]
pub enum Advance {
    Started(Transition),
    /// A transition is already in flight; the request was dropped.
    Busy,
    /// `start` has not run yet.
    NotStarted,
    /// The target image could not be opened. The cursor moved past it, the
    /// old surface stays on screen.
    Skipped,
}

pub struct SlideshowController {
    catalog: ImageCatalog,
    effects: EffectRegistry,
    surfaces: Arc<dyn RenderSurfaces>,
    captions: CaptionBinder,
    debug: DebugReporter,
    options: SlideshowOptions,
    rng: StdRng,
    state: SlideshowState,
    current_index: usize,
    current: Option<Slot>,
    in_flight: Option<InFlight>,
    next_seq: u64,
    reshuffles: usize,
    completed: u64,
}

impl SlideshowController {
    /// Build the controller. A catalog built with shuffling enabled is
    /// shuffled once here.
    pub fn new(
        mut catalog: ImageCatalog,
        effects: EffectRegistry,
        surfaces: Arc<dyn RenderSurfaces>,
        captions: CaptionBinder,
        debug: DebugReporter,
        options: SlideshowOptions,
        mut rng: StdRng,
    ) -> Self {
        if catalog.shuffle_enabled() {
            catalog.shuffle(&mut rng);
        }
        Self {
            catalog,
            effects,
            surfaces,
            captions,
            debug,
            options,
            rng,
            state: SlideshowState::Idle,
            current_index: 0,
            current: None,
            in_flight: None,
            next_seq: 0,
            reshuffles: 0,
            completed: 0,
        }
    }

    pub fn state(&self) -> SlideshowState {
        self.state
    }

    pub fn is_transitioning(&self) -> bool {
        self.state == SlideshowState::Transitioning
    }

    /// Cursor position in the current catalog order.
    pub fn current_index(&self) -> usize {
        self.current_index
    }

    /// Image on the visible surface.
    pub fn current_image(&self) -> Option<&ImageEntry> {
        self.current.as_ref().map(|slot| &slot.image)
    }

    pub fn catalog(&self) -> &ImageCatalog {
        &self.catalog
    }

    pub fn effects(&self) -> &EffectRegistry {
        &self.effects
    }

    /// How many times a loop wrap reshuffled the catalog.
    pub fn reshuffle_count(&self) -> usize {
        self.reshuffles
    }

    pub fn completed_transitions(&self) -> u64 {
        self.completed
    }

    /// Show the first image.
    ///
    /// Images that cannot be opened are skipped in order.
    ///
    /// # Errors
    /// [`Error::EmptyCatalog`] for an empty catalog, or the last
    /// [`Error::ResourceUnavailable`] when no image could be opened.
    pub fn start(&mut self) -> Result<(), Error> {
        if self.state != SlideshowState::Idle {
            debug!(state = ?self.state, "slideshow already started");
            return Ok(());
        }
        if self.catalog.is_empty() {
            return Err(Error::EmptyCatalog);
        }

        let mut last_err = Error::EmptyCatalog;
        for position in 0..self.catalog.len() {
            let Some(image) = self.catalog.get(position).cloned() else {
                break;
            };
            match self.surfaces.create_surface(&image.source) {
                Ok(surface) => {
                    self.surfaces.set_visibility(surface, 1.0);
                    self.current_index = position;
                    self.captions.update(&image);
                    self.debug.show(&image, INITIAL_EFFECT);
                    info!(index = image.index, file = %image.filename, "slideshow started");
                    self.current = Some(Slot { surface, image });
                    self.state = SlideshowState::Showing;
                    return Ok(());
                }
                Err(err) => {
                    warn!(file = %image.filename, "skipping unavailable image: {err}");
                    last_err = err;
                }
            }
        }
        Err(last_err)
    }

    /// Move `delta` entries through the catalog (negative for previous).
    pub fn advance(&mut self, delta: isize) -> Advance {
        match self.state {
            SlideshowState::Idle => return Advance::NotStarted,
            SlideshowState::Transitioning => {
                debug!(delta, "transition in flight; advance dropped");
                return Advance::Busy;
            }
            SlideshowState::Showing => {}
        }
        let Some(from) = self.current.as_ref().map(|slot| slot.surface) else {
            return Advance::NotStarted;
        };

        let wraps = self.catalog.completes_loop(self.current_index, delta);
        let target_index = self.catalog.advance_index(self.current_index, delta);
        if wraps && self.options.reshuffle_on_loop {
            self.catalog.shuffle(&mut self.rng);
            self.reshuffles += 1;
            info!(images = self.catalog.len(), "loop complete; catalog reshuffled");
        }
        self.current_index = target_index;
        let Some(target) = self.catalog.get(target_index).cloned() else {
            return Advance::Skipped;
        };

        let to = match self.surfaces.create_surface(&target.source) {
            Ok(surface) => surface,
            Err(err) => {
                warn!(index = target.index, file = %target.filename, "transition aborted: {err}");
                return Advance::Skipped;
            }
        };
        self.surfaces.set_visibility(to, 0.0);

        let effect = self.effects.pick_name(
            &self.options.transitions,
            self.options.random_transitions,
            &mut self.rng,
        );
        let work = self.effects.resolve(&effect).apply(TransitionContext {
            surfaces: Arc::clone(&self.surfaces),
            from,
            to,
            duration: self.options.transition_duration,
        });

        let seq = self.next_seq;
        self.next_seq += 1;
        debug!(seq, index = target.index, file = %target.filename, effect = %effect, "transition started");
        self.in_flight = Some(InFlight {
            seq,
            next: Slot {
                surface: to,
                image: target.clone(),
            },
            effect: effect.clone(),
        });
        self.state = SlideshowState::Transitioning;

        Advance::Started(Transition {
            seq,
            effect,
            target,
            work,
        })
    }

    /// Finish the in-flight transition: promote the incoming surface, destroy
    /// the superseded one, refresh captions and the debug overlay.
    ///
    /// Returns `false` for a completion that does not belong to the current
    /// transition.
    pub fn complete(&mut self, done: TransitionDone) -> bool {
        let matches = self
            .in_flight
            .as_ref()
            .is_some_and(|in_flight| in_flight.seq == done.seq);
        if !matches {
            warn!(seq = done.seq, "completion for unknown transition ignored");
            return false;
        }
        let Some(InFlight { next, effect, .. }) = self.in_flight.take() else {
            return false;
        };

        self.surfaces.set_visibility(next.surface, 1.0);
        if let Some(old) = self.current.replace(next.clone()) {
            self.surfaces.set_visibility(old.surface, 0.0);
            self.surfaces.destroy_surface(old.surface);
        }
        self.captions.update(&next.image);
        self.debug.show(&next.image, &effect);
        self.state = SlideshowState::Showing;
        self.completed += 1;
        debug!(seq = done.seq, index = next.image.index, "transition complete");
        true
    }

    pub fn toggle_captions(&mut self) -> bool {
        self.captions.toggle_visible()
    }

    pub fn toggle_debug(&mut self) -> bool {
        self.debug.toggle()
    }

    pub fn captions(&self) -> &CaptionBinder {
        &self.captions
    }

    pub fn debug_overlay(&self) -> &DebugReporter {
        &self.debug
    }

    /// Release both surfaces and return to `Idle`.
    pub fn shutdown(&mut self) {
        if let Some(in_flight) = self.in_flight.take() {
            self.surfaces.destroy_surface(in_flight.next.surface);
        }
        if let Some(current) = self.current.take() {
            self.surfaces.destroy_surface(current.surface);
        }
        self.state = SlideshowState::Idle;
    }
}
