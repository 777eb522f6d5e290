//! Render surface seam. Surfaces are created and destroyed by the host; the
//! slideshow only ever holds two of them (current and next).

use std::fmt;

use crate::error::Error;

/// Opaque handle to one on-screen visual slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SurfaceId(pub u64);

impl fmt::Display for SurfaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "surface#{}", self.0)
    }
}

/// Visible region in surface-relative units, `0.0..=1.0` on both axes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClipRect {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl ClipRect {
    pub const FULL: Self = Self {
        left: 0.0,
        top: 0.0,
        right: 1.0,
        bottom: 1.0,
    };
}

/// Procedural reveal pattern layered over the clip.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Mask {
    None,
    /// `cells` x `cells` grid; every cell shows `coverage` of its area.
    Checkerboard { cells: u16, coverage: f32 },
    /// Vertical bands; every band shows `coverage` of its width.
    Stripes { count: u16, coverage: f32 },
    /// Radial displacement wave, `amplitude` as a fraction of the surface.
    Ripple { amplitude: f32, phase: f32 },
}

/// Geometry of a surface relative to its resting position. Scaling and
/// rotation pivot on the surface centre.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    /// Offset in surface widths/heights; `(1.0, 0.0)` is one width right.
    pub translate: (f32, f32),
    pub scale: (f32, f32),
    /// Degrees, clockwise.
    pub rotation: f32,
    /// Blur radius in pixels.
    pub blur: f32,
    pub clip: ClipRect,
    pub mask: Mask,
}

impl Transform {
    pub const IDENTITY: Self = Self {
        translate: (0.0, 0.0),
        scale: (1.0, 1.0),
        rotation: 0.0,
        blur: 0.0,
        clip: ClipRect::FULL,
        mask: Mask::None,
    };

    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Host rendering backend.
///
/// Implementations use interior mutability: effects drive visibility from
/// their own futures while the controller keeps ownership of the handles.
pub trait RenderSurfaces: Send + Sync {
    /// Create a hidden surface showing the image at `locator`, at rest.
    ///
    /// # Errors
    /// [`Error::ResourceUnavailable`] when the image cannot be opened.
    fn create_surface(&self, locator: &str) -> Result<SurfaceId, Error>;

    /// Set opacity, `0.0` hidden through `1.0` fully visible.
    fn set_visibility(&self, surface: SurfaceId, amount: f32);

    /// Move, scale, clip or mask the surface. [`Transform::IDENTITY`] puts it
    /// back at rest.
    fn set_transform(&self, surface: SurfaceId, transform: Transform);

    fn destroy_surface(&self, surface: SurfaceId);
}
