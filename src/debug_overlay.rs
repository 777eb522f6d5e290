//! Diagnostic overlay text for the image and effect currently on screen.

use std::sync::Arc;

use crate::catalog::ImageEntry;

/// Effect label shown when the overlay is switched on by hand.
pub const MANUAL_EFFECT: &str = "(manual)";

/// Host sink for the overlay. `None` hides it.
pub trait DebugDisplay: Send + Sync {
    fn show_debug(&self, text: Option<&str>);
}

pub fn format_debug(image: &ImageEntry, effect: &str) -> String {
    format!(
        "Index: {}\nFile: {}\nEffect: {}",
        image.index, image.filename, effect
    )
}

pub struct DebugReporter {
    enabled: bool,
    display: Arc<dyn DebugDisplay>,
    shown: Option<String>,
    last: Option<(ImageEntry, String)>,
}

impl DebugReporter {
    pub fn new(enabled: bool, display: Arc<dyn DebugDisplay>) -> Self {
        Self {
            enabled,
            display,
            shown: None,
            last: None,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Render (or hide) the overlay. Re-rendering identical text is skipped.
    pub fn update(&mut self, enabled: bool, image: &ImageEntry, effect: &str) {
        self.enabled = enabled;
        self.last = Some((image.clone(), effect.to_string()));
        let text = enabled.then(|| format_debug(image, effect));
        if text.is_none() || text != self.shown {
            self.display.show_debug(text.as_deref());
            self.shown = text;
        }
    }

    /// Update with the current enablement.
    pub fn show(&mut self, image: &ImageEntry, effect: &str) {
        self.update(self.enabled, image, effect);
    }

    /// Flip the overlay on or off. Switching it on re-renders the current
    /// image labelled [`MANUAL_EFFECT`].
    pub fn toggle(&mut self) -> bool {
        self.enabled = !self.enabled;
        match self.last.take() {
            Some((image, _)) if self.enabled => self.update(true, &image, MANUAL_EFFECT),
            Some((image, effect)) => self.update(false, &image, &effect),
            None if !self.enabled => self.display.show_debug(None),
            None => {}
        }
        self.enabled
    }

    pub fn text(&self) -> Option<&str> {
        self.shown.as_deref()
    }
}
