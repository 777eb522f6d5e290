use thiserror::Error;

/// Library error type for slideshow and playlist operations.
#[derive(Debug, Error)]
pub enum Error {
    /// The image catalog has no entries; nothing can be shown.
    #[error("image catalog is empty")]
    EmptyCatalog,

    /// Every configured music source was unreachable.
    #[error("no reachable music sources")]
    EmptyPlaylist,

    /// A single asset could not be opened. Skipped at runtime, never fatal.
    #[error("resource unavailable: {locator}: {reason}")]
    ResourceUnavailable { locator: String, reason: String },

    /// The host refused to start playback (autoplay policy and the like).
    #[error("playback rejected: {0}")]
    PlaybackRejected(String),

    /// Configuration values that parse but make no sense.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Underlying IO error.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON configuration or caption document error.
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// YAML configuration or caption document error.
    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
}

impl Error {
    pub fn unavailable(locator: impl Into<String>, reason: impl ToString) -> Self {
        Self::ResourceUnavailable {
            locator: locator.into(),
            reason: reason.to_string(),
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
