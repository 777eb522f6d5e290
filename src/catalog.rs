//! Image catalog: the fixed set of images in rotation and their current order.

use rand::Rng;
use rand::seq::SliceRandom;

use crate::error::Error;

/// One displayable image. `index` is the ordinal assigned at build time and
/// never changes, even when the catalog is reshuffled.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImageEntry {
    pub index: usize,
    pub filename: String,
    pub source: String,
}

impl ImageEntry {
    fn new(index: usize, source: String) -> Self {
        Self {
            index,
            filename: filename_of(&source).to_string(),
            source,
        }
    }
}

/// Last `/`-separated segment of a locator.
pub fn filename_of(locator: &str) -> &str {
    locator.rsplit('/').next().unwrap_or(locator)
}

/// Ordered images in rotation. Entries are fixed after construction; only
/// their order changes.
#[derive(Debug, Clone)]
pub struct ImageCatalog {
    entries: Vec<ImageEntry>,
    shuffle_enabled: bool,
}

impl ImageCatalog {
    /// Build a catalog, assigning ordinals `0..N` in input order.
    ///
    /// # Errors
    /// Returns [`Error::EmptyCatalog`] if `sources` is empty.
    pub fn build<I, S>(sources: I, shuffle_enabled: bool) -> Result<Self, Error>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let entries: Vec<ImageEntry> = sources
            .into_iter()
            .enumerate()
            .map(|(index, source)| ImageEntry::new(index, source.into()))
            .collect();
        if entries.is_empty() {
            return Err(Error::EmptyCatalog);
        }
        Ok(Self {
            entries,
            shuffle_enabled,
        })
    }

    /// Number of items contained.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always false for a built catalog; kept for API symmetry with `len`.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn shuffle_enabled(&self) -> bool {
        self.shuffle_enabled
    }

    /// Entry at `position` in the current order.
    #[must_use]
    pub fn get(&self, position: usize) -> Option<&ImageEntry> {
        self.entries.get(position)
    }

    /// Borrow the current order (read-only).
    #[must_use]
    pub fn as_slice(&self) -> &[ImageEntry] {
        &self.entries
    }

    /// Fisher-Yates permutation of the current order.
    pub fn shuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.entries.shuffle(rng);
    }

    /// `(current + delta) mod len`, always non-negative.
    #[must_use]
    pub fn advance_index(&self, current: usize, delta: isize) -> usize {
        let len = self.entries.len() as isize;
        (current as isize + delta).rem_euclid(len) as usize
    }

    /// Whether stepping forward from `current` by `delta` runs past the last
    /// entry, i.e. completes a loop. Backward steps never complete a loop.
    #[must_use]
    pub fn completes_loop(&self, current: usize, delta: isize) -> bool {
        delta > 0 && current as isize + delta >= self.entries.len() as isize
    }
}
