//! Host implementations that log instead of drawing or playing audio. Used by
//! the binary on devices without a display pipeline attached.

use std::path::Path;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use tracing::{debug, info, trace};

use crate::captions::{CaptionDisplay, CaptionFields};
use crate::debug_overlay::DebugDisplay;
use crate::error::Error;
use crate::playlist::Playback;
use crate::surface::{RenderSurfaces, SurfaceId, Transform};

fn is_remote(locator: &str) -> bool {
    locator.starts_with("http://") || locator.starts_with("https://")
}

fn check_local(locator: &str) -> Result<(), Error> {
    if is_remote(locator) || Path::new(locator).is_file() {
        Ok(())
    } else {
        Err(Error::unavailable(locator, "no such file"))
    }
}

#[derive(Debug, Default)]
pub struct LoggingSurfaces {
    next_id: AtomicU64,
}

impl RenderSurfaces for LoggingSurfaces {
    fn create_surface(&self, locator: &str) -> Result<SurfaceId, Error> {
        check_local(locator)?;
        let id = SurfaceId(self.next_id.fetch_add(1, Ordering::Relaxed));
        debug!(surface = %id, locator, "surface created");
        Ok(id)
    }

    fn set_visibility(&self, surface: SurfaceId, amount: f32) {
        if amount <= 0.0 || amount >= 1.0 {
            debug!(surface = %surface, amount, "visibility");
        }
    }

    fn set_transform(&self, surface: SurfaceId, transform: Transform) {
        if transform.is_identity() {
            debug!(surface = %surface, "transform reset");
        } else {
            trace!(surface = %surface, ?transform, "transform");
        }
    }

    fn destroy_surface(&self, surface: SurfaceId) {
        debug!(surface = %surface, "surface destroyed");
    }
}

#[derive(Debug, Default)]
pub struct LoggingOverlay;

impl CaptionDisplay for LoggingOverlay {
    fn show_caption(&self, fields: &CaptionFields, fade_in: bool) {
        if fields.title.is_empty() && fields.description.is_empty() && fields.meta.is_empty() {
            debug!("caption cleared");
        } else {
            info!(
                title = %fields.title,
                description = %fields.description,
                meta = %fields.meta,
                fade_in,
                "caption"
            );
        }
    }

    fn set_caption_visible(&self, visible: bool) {
        info!(visible, "caption visibility");
    }
}

impl DebugDisplay for LoggingOverlay {
    fn show_debug(&self, text: Option<&str>) {
        match text {
            Some(text) => info!("debug overlay\n{text}"),
            None => debug!("debug overlay hidden"),
        }
    }
}

#[derive(Debug)]
pub struct LoggingPlayback {
    track: Mutex<Option<String>>,
    paused: AtomicBool,
}

impl Default for LoggingPlayback {
    fn default() -> Self {
        Self {
            track: Mutex::new(None),
            paused: AtomicBool::new(true),
        }
    }
}

impl Playback for LoggingPlayback {
    fn load(&self, locator: &str) -> Result<(), Error> {
        check_local(locator)?;
        let mut track = self
            .track
            .lock()
            .map_err(|_| Error::unavailable(locator, "playback state poisoned"))?;
        *track = Some(locator.to_string());
        self.paused.store(true, Ordering::Relaxed);
        debug!(track = locator, "track loaded");
        Ok(())
    }

    fn set_volume(&self, volume: f32) {
        debug!(volume, "volume");
    }

    fn play(&self) -> Result<(), Error> {
        self.paused.store(false, Ordering::Relaxed);
        Ok(())
    }

    fn pause(&self) {
        self.paused.store(true, Ordering::Relaxed);
    }

    fn is_paused(&self) -> bool {
        self.paused.load(Ordering::Relaxed)
    }
}
