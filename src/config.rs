use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::effects::DEFAULT_EFFECT;
use crate::error::{Error, Result};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Configuration {
    /// Image catalog sources and ordering.
    pub images: ImagesConfig,
    /// Background music playlist. No sources means no music.
    pub music: MusicConfig,
    /// Effect names eligible for transitions.
    pub transitions: Vec<String>,
    /// Pick a random effect per transition instead of the first listed one.
    pub random_transitions: bool,
    /// Duration handed to each transition effect, in milliseconds.
    pub transition_duration: u64,
    /// Start with autoplay enabled.
    pub autoplay: bool,
    /// Autoplay interval in milliseconds.
    pub delay: u64,
    pub keyboard: KeyboardConfig,
    pub debug: DebugConfig,
    pub captions: CaptionsConfig,
    /// Optional deterministic seed for shuffles and effect selection.
    pub shuffle_seed: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ImagesConfig {
    pub sources: Vec<String>,
    /// Shuffle once when the catalog is built.
    pub shuffle: bool,
    /// Reshuffle every time the slideshow completes a full loop.
    pub reshuffle_on_loop: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MusicConfig {
    pub sources: Vec<String>,
    pub shuffle: bool,
    /// Playback volume, clamped to `[0, 1]` when applied.
    pub volume: Option<f32>,
    pub reshuffle_on_wrap: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct KeyboardConfig {
    pub enabled: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DebugConfig {
    pub enabled: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CaptionsConfig {
    pub enabled: bool,
}

impl Configuration {
    /// Load a configuration document, picking the format from the extension.
    /// `.yaml`/`.yml` parse as YAML, anything else as JSON.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("yaml") | Some("yml") => Self::from_yaml_str(&raw),
            _ => Self::from_json_str(&raw),
        }
    }

    pub fn from_json_str(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn from_yaml_str(raw: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(raw)?)
    }

    /// Validate runtime invariants that cannot be expressed via serde defaults alone.
    pub fn validated(self) -> Result<Self> {
        if self.delay == 0 {
            return Err(Error::Config("delay must be greater than zero".into()));
        }
        if let Some(volume) = self.music.volume
            && !volume.is_finite()
        {
            return Err(Error::Config("music.volume must be a finite number".into()));
        }
        if self.transitions.iter().any(|name| name.trim().is_empty()) {
            return Err(Error::Config("transition names must not be blank".into()));
        }
        Ok(self)
    }

    pub fn autoplay_delay(&self) -> Duration {
        Duration::from_millis(self.delay)
    }

    pub fn transition_duration(&self) -> Duration {
        Duration::from_millis(self.transition_duration)
    }
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            images: ImagesConfig::default(),
            music: MusicConfig::default(),
            transitions: vec![DEFAULT_EFFECT.to_string()],
            random_transitions: true,
            transition_duration: 400,
            autoplay: false,
            delay: 4000,
            keyboard: KeyboardConfig::default(),
            debug: DebugConfig::default(),
            captions: CaptionsConfig::default(),
            shuffle_seed: None,
        }
    }
}

impl Default for ImagesConfig {
    fn default() -> Self {
        Self {
            sources: Vec::new(),
            shuffle: false,
            reshuffle_on_loop: true,
        }
    }
}

impl MusicConfig {
    pub fn is_configured(&self) -> bool {
        !self.sources.is_empty()
    }
}

impl Default for KeyboardConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl Default for CaptionsConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_uses_defaults() {
        let cfg = Configuration::from_json_str("{}").unwrap();
        assert_eq!(cfg.delay, 4000);
        assert_eq!(cfg.transitions, vec!["fade".to_string()]);
        assert!(cfg.random_transitions);
        assert!(cfg.keyboard.enabled);
        assert!(cfg.images.reshuffle_on_loop);
        assert!(!cfg.music.is_configured());
    }

    #[test]
    fn zero_delay_is_rejected() {
        let cfg = Configuration::from_json_str(r#"{ "delay": 0 }"#).unwrap();
        assert!(matches!(cfg.validated(), Err(Error::Config(_))));
    }

    #[test]
    fn out_of_range_volume_is_kept_for_clamping() {
        let cfg = Configuration::from_json_str(r#"{ "music": { "volume": 3.5 } }"#)
            .unwrap()
            .validated()
            .unwrap();
        assert_eq!(cfg.music.volume, Some(3.5));
    }
}
