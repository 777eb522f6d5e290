//! The engine context: every controller the process owns, wired together.
//! Built once by the entry point and handed to the event loop.

use std::sync::Arc;

use rand::SeedableRng;
use rand::rngs::StdRng;
use tokio::sync::mpsc::Sender;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::autoplay::{AutoplayScheduler, AutoplayTick};
use crate::captions::{CaptionBinder, CaptionDisplay, CaptionDocument};
use crate::catalog::ImageCatalog;
use crate::config::Configuration;
use crate::debug_overlay::{DebugDisplay, DebugReporter};
use crate::effects::EffectRegistry;
use crate::error::Error;
use crate::playlist::{Playback, PlaylistController, PlaylistOptions, SourceProbe};
use crate::slideshow::{Advance, SlideshowController, SlideshowOptions, Transition, TransitionDone};
use crate::surface::RenderSurfaces;

const MUSIC_SEED_SALT: u64 = 0x6D75_7369_63;

/// Host collaborators the engine renders and plays through.
#[derive(Clone)]
pub struct Host {
    pub surfaces: Arc<dyn RenderSurfaces>,
    pub captions: Arc<dyn CaptionDisplay>,
    pub debug: Arc<dyn DebugDisplay>,
    pub playback: Arc<dyn Playback>,
    pub probe: Arc<dyn SourceProbe>,
}

pub struct Engine {
    pub slideshow: SlideshowController,
    pub autoplay: AutoplayScheduler,
    pub music: Option<PlaylistController>,
}

impl Engine {
    /// Build every controller from configuration.
    ///
    /// # Errors
    /// [`Error::EmptyCatalog`] without images, [`Error::EmptyPlaylist`] when
    /// music is configured but no source is reachable.
    pub fn from_config(
        cfg: &Configuration,
        host: Host,
        captions: CaptionDocument,
        effects: EffectRegistry,
        ticks: Sender<AutoplayTick>,
        cancel: CancellationToken,
    ) -> Result<Self, Error> {
        let seeded = |salt: u64| match cfg.shuffle_seed {
            Some(seed) => StdRng::seed_from_u64(seed ^ salt),
            None => StdRng::from_os_rng(),
        };

        let catalog = ImageCatalog::build(cfg.images.sources.iter().cloned(), cfg.images.shuffle)?;
        info!(images = catalog.len(), shuffle = cfg.images.shuffle, "catalog built");
        for name in &cfg.transitions {
            if !effects.contains(name) {
                debug!(effect = %name, fallback = effects.default_name(), "unknown effect configured");
            }
        }

        let slideshow = SlideshowController::new(
            catalog,
            effects,
            host.surfaces,
            CaptionBinder::new(captions, host.captions, cfg.captions.enabled),
            DebugReporter::new(cfg.debug.enabled, host.debug),
            SlideshowOptions::from(cfg),
            seeded(0),
        );

        let music = if cfg.music.is_configured() {
            Some(PlaylistController::build(
                cfg.music.sources.iter().cloned(),
                PlaylistOptions::from(&cfg.music),
                host.probe.as_ref(),
                host.playback,
                seeded(MUSIC_SEED_SALT),
            )?)
        } else {
            None
        };

        let autoplay = AutoplayScheduler::new(cfg.autoplay, cfg.autoplay_delay(), ticks, cancel);

        Ok(Self {
            slideshow,
            autoplay,
            music,
        })
    }

    /// Show the first image, start the music, arm autoplay.
    pub fn start(&mut self) -> Result<(), Error> {
        self.slideshow.start()?;
        if let Some(music) = self.music.as_mut() {
            music.play_next();
        }
        self.autoplay.arm();
        Ok(())
    }

    /// Manual navigation. An accepted move cancels the idle countdown; the
    /// transition's completion arms a fresh one.
    pub fn navigate(&mut self, delta: isize) -> Option<Transition> {
        match self.slideshow.advance(delta) {
            Advance::Started(transition) => {
                self.autoplay.cancel();
                Some(transition)
            }
            Advance::Skipped => {
                self.autoplay.arm();
                None
            }
            Advance::Busy | Advance::NotStarted => None,
        }
    }

    pub fn on_autoplay_tick(&mut self, tick: AutoplayTick) -> Option<Transition> {
        if !self.autoplay.accept(tick) {
            return None;
        }
        match self.slideshow.advance(1) {
            Advance::Started(transition) => Some(transition),
            Advance::Skipped => {
                self.autoplay.arm();
                None
            }
            Advance::Busy | Advance::NotStarted => None,
        }
    }

    pub fn on_transition_done(&mut self, done: TransitionDone) {
        if self.slideshow.complete(done) {
            self.autoplay.arm();
        }
    }

    pub fn toggle_autoplay(&mut self) -> bool {
        let enabled = self.autoplay.toggle();
        if enabled && self.slideshow.is_transitioning() {
            // completion re-arms
            self.autoplay.cancel();
        }
        enabled
    }

    pub fn on_track_ended(&mut self) {
        if let Some(music) = self.music.as_mut() {
            music.on_track_ended();
        }
    }

    pub fn toggle_music(&mut self) {
        match self.music.as_mut() {
            Some(music) => {
                let playing = music.toggle();
                info!(playing, "music toggled");
            }
            None => debug!("no music configured"),
        }
    }

    pub fn resume_music(&mut self) {
        if let Some(music) = self.music.as_mut() {
            music.resume();
        }
    }

    pub fn shutdown(&mut self) {
        self.autoplay.cancel();
        self.slideshow.shutdown();
        info!("engine stopped");
    }
}
