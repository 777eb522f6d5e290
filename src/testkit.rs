//! Recording fakes for every host seam, plus builders used by unit and
//! integration tests.

use std::collections::{BTreeMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures::FutureExt;
use futures::future::BoxFuture;
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::captions::{CaptionBinder, CaptionDisplay, CaptionDocument, CaptionFields};
use crate::catalog::ImageCatalog;
use crate::debug_overlay::{DebugDisplay, DebugReporter};
use crate::effects::{EffectRegistry, TransitionContext, TransitionEffect};
use crate::engine::Host;
use crate::error::Error;
use crate::playlist::{Playback, SourceProbe};
use crate::slideshow::{SlideshowController, SlideshowOptions};
use crate::surface::{RenderSurfaces, SurfaceId, Transform};

pub const TEST_SEED: u64 = 0x5EED;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Debug, Default)]
struct SurfaceLog {
    next_id: u64,
    live: BTreeMap<u64, (String, f32)>,
    transforms: BTreeMap<u64, Transform>,
    created: usize,
    destroyed: usize,
    failing: HashSet<String>,
}

#[derive(Debug, Default)]
pub struct RecordingSurfaces {
    log: Mutex<SurfaceLog>,
}

impl RecordingSurfaces {
    /// Make `create_surface` fail for `locator`.
    pub fn fail_on(&self, locator: &str) {
        lock(&self.log).failing.insert(locator.to_string());
    }

    /// Live surfaces in creation order as `(locator, visibility)`.
    pub fn live(&self) -> Vec<(String, f32)> {
        lock(&self.log).live.values().cloned().collect()
    }

    pub fn visibility(&self, surface: SurfaceId) -> Option<f32> {
        lock(&self.log).live.get(&surface.0).map(|(_, v)| *v)
    }

    /// Last geometry set on a live surface; rest if none was set.
    pub fn transform(&self, surface: SurfaceId) -> Option<Transform> {
        let log = lock(&self.log);
        log.live.get(&surface.0)?;
        Some(log.transforms.get(&surface.0).copied().unwrap_or_default())
    }

    pub fn created_count(&self) -> usize {
        lock(&self.log).created
    }

    pub fn destroyed_count(&self) -> usize {
        lock(&self.log).destroyed
    }
}

impl RenderSurfaces for RecordingSurfaces {
    fn create_surface(&self, locator: &str) -> Result<SurfaceId, Error> {
        let mut log = lock(&self.log);
        if log.failing.contains(locator) {
            return Err(Error::unavailable(locator, "test failure"));
        }
        let id = log.next_id;
        log.next_id += 1;
        log.created += 1;
        log.live.insert(id, (locator.to_string(), 0.0));
        Ok(SurfaceId(id))
    }

    fn set_visibility(&self, surface: SurfaceId, amount: f32) {
        if let Some(entry) = lock(&self.log).live.get_mut(&surface.0) {
            entry.1 = amount;
        }
    }

    fn set_transform(&self, surface: SurfaceId, transform: Transform) {
        let mut log = lock(&self.log);
        if log.live.contains_key(&surface.0) {
            log.transforms.insert(surface.0, transform);
        }
    }

    fn destroy_surface(&self, surface: SurfaceId) {
        let mut log = lock(&self.log);
        log.transforms.remove(&surface.0);
        if log.live.remove(&surface.0).is_some() {
            log.destroyed += 1;
        }
    }
}

#[derive(Debug, Default)]
struct OverlayLog {
    caption: Option<(CaptionFields, bool)>,
    captions_visible: bool,
    debug: Option<Option<String>>,
    debug_calls: usize,
}

/// Records caption and debug output.
#[derive(Debug, Default)]
pub struct RecordingOverlay {
    log: Mutex<OverlayLog>,
}

impl RecordingOverlay {
    pub fn last_caption(&self) -> Option<(CaptionFields, bool)> {
        lock(&self.log).caption.clone()
    }

    pub fn captions_visible(&self) -> bool {
        lock(&self.log).captions_visible
    }

    /// `Some(None)` means the overlay was last hidden.
    pub fn last_debug(&self) -> Option<Option<String>> {
        lock(&self.log).debug.clone()
    }

    pub fn debug_calls(&self) -> usize {
        lock(&self.log).debug_calls
    }
}

impl CaptionDisplay for RecordingOverlay {
    fn show_caption(&self, fields: &CaptionFields, fade_in: bool) {
        lock(&self.log).caption = Some((fields.clone(), fade_in));
    }

    fn set_caption_visible(&self, visible: bool) {
        lock(&self.log).captions_visible = visible;
    }
}

impl DebugDisplay for RecordingOverlay {
    fn show_debug(&self, text: Option<&str>) {
        let mut log = lock(&self.log);
        log.debug = Some(text.map(str::to_string));
        log.debug_calls += 1;
    }
}

#[derive(Debug)]
struct PlaybackLog {
    loaded: Vec<String>,
    volumes: Vec<f32>,
    play_calls: usize,
    paused: bool,
    reject: bool,
    unloadable: HashSet<String>,
}

impl Default for PlaybackLog {
    fn default() -> Self {
        Self {
            loaded: Vec::new(),
            volumes: Vec::new(),
            play_calls: 0,
            paused: true,
            reject: false,
            unloadable: HashSet::new(),
        }
    }
}

#[derive(Debug, Default)]
pub struct RecordingPlayback {
    log: Mutex<PlaybackLog>,
}

impl RecordingPlayback {
    /// Refuse `play` calls, as an autoplay policy would.
    pub fn reject_play(&self, reject: bool) {
        lock(&self.log).reject = reject;
    }

    pub fn fail_load(&self, locator: &str) {
        lock(&self.log).unloadable.insert(locator.to_string());
    }

    pub fn loaded(&self) -> Vec<String> {
        lock(&self.log).loaded.clone()
    }

    pub fn volumes(&self) -> Vec<f32> {
        lock(&self.log).volumes.clone()
    }

    pub fn play_calls(&self) -> usize {
        lock(&self.log).play_calls
    }
}

impl Playback for RecordingPlayback {
    fn load(&self, locator: &str) -> Result<(), Error> {
        let mut log = lock(&self.log);
        if log.unloadable.contains(locator) {
            return Err(Error::unavailable(locator, "test failure"));
        }
        log.loaded.push(locator.to_string());
        log.paused = true;
        Ok(())
    }

    fn set_volume(&self, volume: f32) {
        lock(&self.log).volumes.push(volume);
    }

    fn play(&self) -> Result<(), Error> {
        let mut log = lock(&self.log);
        log.play_calls += 1;
        if log.reject {
            return Err(Error::PlaybackRejected("autoplay blocked".into()));
        }
        log.paused = false;
        Ok(())
    }

    fn pause(&self) {
        lock(&self.log).paused = true;
    }

    fn is_paused(&self) -> bool {
        lock(&self.log).paused
    }
}

/// Only the listed sources are reachable.
#[derive(Debug, Default)]
pub struct ListProbe {
    reachable: HashSet<String>,
}

impl ListProbe {
    pub fn new<I, S>(reachable: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            reachable: reachable.into_iter().map(Into::into).collect(),
        }
    }
}

impl SourceProbe for ListProbe {
    fn is_reachable(&self, locator: &str) -> bool {
        self.reachable.contains(locator)
    }
}

/// Every source is reachable.
#[derive(Debug, Default, Clone, Copy)]
pub struct AnyProbe;

impl SourceProbe for AnyProbe {
    fn is_reachable(&self, _locator: &str) -> bool {
        true
    }
}

/// Instant effect that counts how many times it ran.
#[derive(Debug, Default)]
pub struct CountingEffect {
    applied: AtomicUsize,
}

impl CountingEffect {
    pub fn applied(&self) -> usize {
        self.applied.load(Ordering::SeqCst)
    }
}

impl TransitionEffect for CountingEffect {
    fn apply(&self, ctx: TransitionContext) -> BoxFuture<'static, ()> {
        self.applied.fetch_add(1, Ordering::SeqCst);
        ctx.surfaces.set_visibility(ctx.to, 1.0);
        futures::future::ready(()).boxed()
    }
}

/// Recording host for engine-level tests.
#[derive(Debug, Default, Clone)]
pub struct RecordingHost {
    pub surfaces: Arc<RecordingSurfaces>,
    pub overlay: Arc<RecordingOverlay>,
    pub playback: Arc<RecordingPlayback>,
}

impl RecordingHost {
    pub fn host(&self) -> Host {
        Host {
            surfaces: self.surfaces.clone(),
            captions: self.overlay.clone(),
            debug: self.overlay.clone(),
            playback: self.playback.clone(),
            probe: Arc::new(AnyProbe),
        }
    }
}

fn image_sources(images: &[&str]) -> Vec<String> {
    images.iter().map(|name| format!("images/{name}")).collect()
}

/// Unshuffled slideshow over `images/<name>` sources with a fixed seed.
pub fn slideshow(
    images: &[&str],
    transitions: &[&str],
    random: bool,
) -> (SlideshowController, Arc<RecordingSurfaces>) {
    slideshow_with(images, transitions, random, Arc::new(RecordingSurfaces::default()))
}

pub fn slideshow_with(
    images: &[&str],
    transitions: &[&str],
    random: bool,
    surfaces: Arc<RecordingSurfaces>,
) -> (SlideshowController, Arc<RecordingSurfaces>) {
    let catalog = match ImageCatalog::build(image_sources(images), false) {
        Ok(catalog) => catalog,
        Err(err) => panic!("test catalog: {err}"),
    };
    let overlay = Arc::new(RecordingOverlay::default());
    let options = SlideshowOptions {
        transitions: transitions.iter().map(|s| s.to_string()).collect(),
        random_transitions: random,
        ..SlideshowOptions::default()
    };
    let controller = SlideshowController::new(
        catalog,
        EffectRegistry::with_builtins(),
        surfaces.clone(),
        CaptionBinder::new(CaptionDocument::default(), overlay.clone(), true),
        DebugReporter::new(true, overlay),
        options,
        StdRng::seed_from_u64(TEST_SEED),
    );
    (controller, surfaces)
}
