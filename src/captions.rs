//! Caption lookup and presentation for the image on screen.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use serde::Deserialize;
use tracing::debug;

use crate::catalog::ImageEntry;
use crate::error::Result;

const META_SEPARATOR: &str = " • ";

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CaptionRecord {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
}

impl CaptionRecord {
    /// `author • date`, either part optional.
    pub fn meta(&self) -> String {
        [self.author.as_deref(), self.date.as_deref()]
            .into_iter()
            .flatten()
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(META_SEPARATOR)
    }
}

/// Captions keyed by filename or by ordinal (as a decimal string).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct CaptionDocument(HashMap<String, CaptionRecord>);

impl CaptionDocument {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("yaml") | Some("yml") => Ok(serde_yaml::from_str(&raw)?),
            _ => Self::from_json_str(&raw),
        }
    }

    pub fn from_json_str(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn insert(&mut self, key: impl Into<String>, record: CaptionRecord) {
        self.0.insert(key.into(), record);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Filename match wins over ordinal match.
    pub fn lookup(&self, image: &ImageEntry) -> Option<&CaptionRecord> {
        self.0
            .get(&image.filename)
            .or_else(|| self.0.get(&image.index.to_string()))
    }
}

/// Text as last applied to the caption block.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CaptionFields {
    pub title: String,
    pub description: String,
    pub meta: String,
}

impl From<&CaptionRecord> for CaptionFields {
    fn from(record: &CaptionRecord) -> Self {
        Self {
            title: record.title.clone(),
            description: record.description.clone(),
            meta: record.meta(),
        }
    }
}

/// Host sink for caption text.
pub trait CaptionDisplay: Send + Sync {
    /// Replace the caption text. `fade_in` restarts the fade-in cycle.
    fn show_caption(&self, fields: &CaptionFields, fade_in: bool);

    fn set_caption_visible(&self, visible: bool);
}

pub struct CaptionBinder {
    document: CaptionDocument,
    display: Arc<dyn CaptionDisplay>,
    last: CaptionFields,
    visible: bool,
}

impl CaptionBinder {
    pub fn new(document: CaptionDocument, display: Arc<dyn CaptionDisplay>, visible: bool) -> Self {
        display.set_caption_visible(visible);
        Self {
            document,
            display,
            last: CaptionFields::default(),
            visible,
        }
    }

    pub fn update(&mut self, image: &ImageEntry) {
        match self.document.lookup(image) {
            Some(record) => {
                self.last = CaptionFields::from(record);
                self.display.show_caption(&self.last, true);
            }
            None => {
                debug!(file = %image.filename, "no caption");
                self.last = CaptionFields::default();
                self.display.show_caption(&self.last, false);
            }
        }
    }

    pub fn last(&self) -> &CaptionFields {
        &self.last
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Show or hide the caption block; returns the new visibility.
    pub fn toggle_visible(&mut self) -> bool {
        self.visible = !self.visible;
        self.display.set_caption_visible(self.visible);
        self.visible
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testkit::RecordingOverlay;

    fn image(index: usize, filename: &str) -> ImageEntry {
        ImageEntry {
            index,
            filename: filename.to_string(),
            source: format!("images/{filename}"),
        }
    }

    fn document() -> CaptionDocument {
        CaptionDocument::from_json_str(
            r#"{
                "1.jpg": { "title": "Harbour", "description": "Morning", "author": "Ana", "date": "2019" },
                "2": { "title": "By ordinal", "date": "2020" }
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn meta_joins_available_parts() {
        let doc = document();
        let rec = doc.lookup(&image(0, "1.jpg")).unwrap();
        assert_eq!(rec.meta(), "Ana • 2019");
        let rec = doc.lookup(&image(2, "x.jpg")).unwrap();
        assert_eq!(rec.meta(), "2020");
    }

    #[test]
    fn present_caption_fades_in_and_missing_clears() {
        let overlay = Arc::new(RecordingOverlay::default());
        let mut binder = CaptionBinder::new(document(), overlay.clone(), true);

        binder.update(&image(0, "1.jpg"));
        assert_eq!(binder.last().title, "Harbour");
        assert_eq!(overlay.last_caption(), Some((binder.last().clone(), true)));

        binder.update(&image(5, "none.jpg"));
        assert_eq!(binder.last(), &CaptionFields::default());
        assert_eq!(overlay.last_caption(), Some((CaptionFields::default(), false)));
    }

    #[test]
    fn toggle_flips_visibility() {
        let overlay = Arc::new(RecordingOverlay::default());
        let mut binder = CaptionBinder::new(CaptionDocument::default(), overlay.clone(), true);
        assert!(!binder.toggle_visible());
        assert!(!overlay.captions_visible());
        assert!(binder.toggle_visible());
        assert!(overlay.captions_visible());
    }
}
