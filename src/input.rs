//! Command tokens and key bindings routed onto the engine.

use std::fmt;

use tracing::{debug, info};

use crate::engine::Engine;
use crate::slideshow::Transition;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Next,
    Previous,
    ToggleAutoplay,
    ToggleDebug,
    ToggleCaptions,
    ToggleMusic,
}

impl Command {
    pub const ALL: [Self; 6] = [
        Self::Next,
        Self::Previous,
        Self::ToggleAutoplay,
        Self::ToggleDebug,
        Self::ToggleCaptions,
        Self::ToggleMusic,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Next => "next",
            Self::Previous => "previous",
            Self::ToggleAutoplay => "toggleAutoplay",
            Self::ToggleDebug => "toggleDebug",
            Self::ToggleCaptions => "toggleCaptions",
            Self::ToggleMusic => "toggleMusic",
        }
    }

    pub fn from_token(token: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|cmd| cmd.as_str() == token)
    }

    /// Remote/keyboard key names.
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "ArrowRight" | "Right" => Some(Self::Next),
            "ArrowLeft" | "Left" => Some(Self::Previous),
            "ArrowUp" | "Up" => Some(Self::ToggleDebug),
            "ArrowDown" | "Down" => Some(Self::ToggleCaptions),
            "Enter" | "OK" | " " => Some(Self::ToggleAutoplay),
            _ => None,
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy)]
pub struct InputDispatcher {
    keyboard_enabled: bool,
}

impl InputDispatcher {
    pub fn new(keyboard_enabled: bool) -> Self {
        Self { keyboard_enabled }
    }

    pub fn keyboard_enabled(&self) -> bool {
        self.keyboard_enabled
    }

    /// Unknown tokens are ignored.
    pub fn dispatch_token(&self, engine: &mut Engine, token: &str) -> Option<Transition> {
        match Command::from_token(token) {
            Some(cmd) => self.dispatch(engine, cmd),
            None => {
                debug!(token, "unknown command ignored");
                None
            }
        }
    }

    /// Key events are ignored unless keyboard bindings are enabled.
    pub fn dispatch_key(&self, engine: &mut Engine, key: &str) -> Option<Transition> {
        if !self.keyboard_enabled {
            debug!(key, "keyboard bindings disabled");
            return None;
        }
        match Command::from_key(key) {
            Some(cmd) => self.dispatch(engine, cmd),
            None => {
                debug!(key, "unbound key ignored");
                None
            }
        }
    }

    pub fn dispatch(&self, engine: &mut Engine, cmd: Command) -> Option<Transition> {
        debug!(command = %cmd, "dispatch");
        match cmd {
            Command::Next => engine.navigate(1),
            Command::Previous => engine.navigate(-1),
            Command::ToggleAutoplay => {
                let on = engine.toggle_autoplay();
                info!(enabled = on, "autoplay toggled");
                None
            }
            Command::ToggleDebug => {
                let on = engine.slideshow.toggle_debug();
                info!(enabled = on, "debug overlay toggled");
                None
            }
            Command::ToggleCaptions => {
                let on = engine.slideshow.toggle_captions();
                info!(visible = on, "captions toggled");
                None
            }
            Command::ToggleMusic => {
                engine.toggle_music();
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_round_trip_through_names() {
        for cmd in Command::ALL {
            assert_eq!(Command::from_token(cmd.as_str()), Some(cmd));
        }
        assert_eq!(Command::from_token("reboot"), None);
        assert_eq!(Command::from_token("Next"), None);
    }

    #[test]
    fn key_bindings() {
        assert_eq!(Command::from_key("ArrowRight"), Some(Command::Next));
        assert_eq!(Command::from_key("Left"), Some(Command::Previous));
        assert_eq!(Command::from_key("Up"), Some(Command::ToggleDebug));
        assert_eq!(Command::from_key("ArrowDown"), Some(Command::ToggleCaptions));
        assert_eq!(Command::from_key("OK"), Some(Command::ToggleAutoplay));
        assert_eq!(Command::from_key(" "), Some(Command::ToggleAutoplay));
        assert_eq!(Command::from_key("Escape"), None);
    }
}
