const TRACK_ENDED: &str = "trackEnded";
const RESUME_MUSIC: &str = "resumeMusic";

/// External events fed into the engine loop, one at a time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    /// Abstract command token from a remote (`next`, `toggleMusic`, ...).
    Command(String),
    /// Raw key name from a keyboard or remote (`ArrowRight`, `OK`, ...).
    Key(String),
    /// The playing track finished.
    TrackEnded,
    /// Retry playback after the host blocked it.
    ResumeMusic,
}

impl EngineEvent {
    /// Interpret one line of text input. `trackEnded` and `resumeMusic` are
    /// the audio host's notifications, a bound key name comes next, anything
    /// else is treated as a command token.
    pub fn from_line(line: &str) -> Option<Self> {
        let trimmed = line.trim();
        if line == " " {
            return Some(Self::Key(" ".into()));
        }
        match trimmed {
            "" => return None,
            TRACK_ENDED => return Some(Self::TrackEnded),
            RESUME_MUSIC => return Some(Self::ResumeMusic),
            _ => {}
        }
        if crate::input::Command::from_key(trimmed).is_some() {
            Some(Self::Key(trimmed.to_string()))
        } else {
            Some(Self::Command(trimmed.to_string()))
        }
    }
}
