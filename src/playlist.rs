//! Background music playlist. Advances only when the playing track ends.

use std::path::Path;
use std::sync::Arc;

use percent_encoding::percent_decode_str;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use tracing::{debug, info, warn};

use crate::catalog::filename_of;
use crate::config::MusicConfig;
use crate::error::Error;

/// Host audio backend.
pub trait Playback: Send + Sync {
    /// # Errors
    /// [`Error::ResourceUnavailable`] when the track cannot be opened.
    fn load(&self, locator: &str) -> Result<(), Error>;

    fn set_volume(&self, volume: f32);

    /// # Errors
    /// [`Error::PlaybackRejected`] when the host refuses to start playback.
    fn play(&self) -> Result<(), Error>;

    fn pause(&self);

    fn is_paused(&self) -> bool;
}

/// Reachability check run once per source when the playlist is built.
pub trait SourceProbe: Send + Sync {
    fn is_reachable(&self, locator: &str) -> bool;
}

/// Local files must exist; remote URLs are assumed reachable.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsProbe;

impl SourceProbe for FsProbe {
    fn is_reachable(&self, locator: &str) -> bool {
        if locator.starts_with("http://") || locator.starts_with("https://") {
            return true;
        }
        Path::new(locator).is_file()
    }
}

/// Display title for a track: file name without extension, percent-decoded.
pub fn track_title(locator: &str) -> String {
    let name = filename_of(locator);
    let stem = match name.rsplit_once('.') {
        Some((stem, _ext)) if !stem.is_empty() => stem,
        _ => name,
    };
    percent_decode_str(stem).decode_utf8_lossy().into_owned()
}

#[derive(Debug, Clone, Default)]
pub struct PlaylistOptions {
    pub shuffle: bool,
    pub volume: Option<f32>,
    pub reshuffle_on_wrap: bool,
}

impl From<&MusicConfig> for PlaylistOptions {
    fn from(cfg: &MusicConfig) -> Self {
        Self {
            shuffle: cfg.shuffle,
            volume: cfg.volume,
            reshuffle_on_wrap: cfg.reshuffle_on_wrap,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayStatus {
    Playing,
    /// The host refused playback; waiting for track end or an external resume.
    Blocked,
    /// No track in the playlist could be loaded.
    Unavailable,
}

pub struct PlaylistController {
    tracks: Vec<String>,
    current_track_index: usize,
    options: PlaylistOptions,
    playback: Arc<dyn Playback>,
    rng: StdRng,
    now_playing: Option<String>,
}

impl PlaylistController {
    /// Keep the reachable sources, shuffled once if configured.
    ///
    /// # Errors
    /// [`Error::EmptyPlaylist`] when no source is reachable.
    pub fn build<I, S>(
        sources: I,
        options: PlaylistOptions,
        probe: &dyn SourceProbe,
        playback: Arc<dyn Playback>,
        mut rng: StdRng,
    ) -> Result<Self, Error>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut tracks = Vec::new();
        for source in sources {
            let source = source.into();
            if probe.is_reachable(&source) {
                tracks.push(source);
            } else {
                warn!(track = %source, "music source unreachable; dropped");
            }
        }
        if tracks.is_empty() {
            return Err(Error::EmptyPlaylist);
        }
        if options.shuffle {
            tracks.shuffle(&mut rng);
        }
        info!(tracks = tracks.len(), shuffle = options.shuffle, "playlist built");
        Ok(Self {
            tracks,
            current_track_index: 0,
            options,
            playback,
            rng,
            now_playing: None,
        })
    }

    pub fn tracks(&self) -> &[String] {
        &self.tracks
    }

    /// Position of the track `play_next` will pick.
    pub fn current_track_index(&self) -> usize {
        self.current_track_index
    }

    pub fn now_playing(&self) -> Option<&str> {
        self.now_playing.as_deref()
    }

    pub fn now_playing_title(&self) -> Option<String> {
        self.now_playing.as_deref().map(track_title)
    }

    /// Load and start the track at the cursor, then move the cursor on.
    /// Tracks that fail to load are skipped; a rejected `play` is logged and
    /// not retried.
    pub fn play_next(&mut self) -> PlayStatus {
        for _ in 0..self.tracks.len() {
            let track = self.tracks[self.current_track_index].clone();
            self.step();
            match self.playback.load(&track) {
                Ok(()) => return self.start(track),
                Err(err) => warn!(track = %track, "skipping track: {err}"),
            }
        }
        warn!("no playable tracks");
        self.now_playing = None;
        PlayStatus::Unavailable
    }

    /// The playing track finished.
    pub fn on_track_ended(&mut self) -> PlayStatus {
        debug!(track = ?self.now_playing, "track ended");
        self.play_next()
    }

    /// Pause a playing track or resume a paused one. Returns `true` when
    /// playback is running afterwards.
    pub fn toggle(&mut self) -> bool {
        if self.playback.is_paused() {
            self.resume() == PlayStatus::Playing
        } else {
            self.playback.pause();
            info!("music paused");
            false
        }
    }

    /// External resume trigger after a rejected or paused playback.
    pub fn resume(&mut self) -> PlayStatus {
        if self.now_playing.is_none() {
            return self.play_next();
        }
        match self.playback.play() {
            Ok(()) => {
                info!("music resumed");
                PlayStatus::Playing
            }
            Err(err) => {
                warn!("resume rejected: {err}");
                PlayStatus::Blocked
            }
        }
    }

    fn step(&mut self) {
        self.current_track_index = (self.current_track_index + 1) % self.tracks.len();
        if self.current_track_index == 0 && self.options.reshuffle_on_wrap {
            self.tracks.shuffle(&mut self.rng);
            debug!("playlist reshuffled on wrap");
        }
    }

    fn start(&mut self, track: String) -> PlayStatus {
        if let Some(volume) = self.options.volume.filter(|v| v.is_finite()) {
            self.playback.set_volume(volume.clamp(0.0, 1.0));
        }
        let title = track_title(&track);
        self.now_playing = Some(track);
        match self.playback.play() {
            Ok(()) => {
                info!(title = %title, "now playing");
                PlayStatus::Playing
            }
            Err(err) => {
                warn!(title = %title, "playback blocked, waiting for resume: {err}");
                PlayStatus::Blocked
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_strips_extension_and_decodes() {
        assert_eq!(track_title("music/My%20Song.mp3"), "My Song");
        assert_eq!(track_title("a.b.ogg"), "a.b");
        assert_eq!(track_title("noext"), "noext");
        assert_eq!(track_title(".hidden"), ".hidden");
    }

    #[test]
    fn fs_probe_accepts_urls_and_existing_files() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("t.mp3");
        std::fs::write(&file, b"x").unwrap();
        assert!(FsProbe.is_reachable(file.to_str().unwrap()));
        assert!(!FsProbe.is_reachable(dir.path().join("missing.mp3").to_str().unwrap()));
        assert!(FsProbe.is_reachable("https://example.org/t.mp3"));
    }
}
