//! Transition effects and the registry that resolves them by name.

use std::collections::BTreeMap;
use std::f32::consts::TAU;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use futures::future::BoxFuture;
use rand::Rng;
use rand::seq::IndexedRandom;
use tokio::time::sleep;
use tracing::debug;

use crate::surface::{ClipRect, Mask, RenderSurfaces, SurfaceId, Transform};

pub const DEFAULT_EFFECT: &str = "fade";

const FRAME: Duration = Duration::from_millis(16);

/// Everything an effect needs to animate one transition.
#[derive(Clone)]
pub struct TransitionContext {
    pub surfaces: Arc<dyn RenderSurfaces>,
    pub from: SurfaceId,
    pub to: SurfaceId,
    pub duration: Duration,
}

/// A stateless visual procedure animating from one surface to another.
///
/// The returned future is the completion signal: it resolves exactly once,
/// after the effect's visual work is done. Effects without animation return
/// an already-completed future.
pub trait TransitionEffect: Send + Sync {
    fn apply(&self, ctx: TransitionContext) -> BoxFuture<'static, ()>;
}

fn frame_count(duration: Duration) -> u32 {
    (duration.as_millis() / FRAME.as_millis()).clamp(1, u32::MAX as u128) as u32
}

/// Cross-fade: the incoming surface ramps up while the outgoing one ramps down.
#[derive(Debug, Default, Clone, Copy)]
pub struct Fade;

impl TransitionEffect for Fade {
    fn apply(&self, ctx: TransitionContext) -> BoxFuture<'static, ()> {
        async move {
            let steps = frame_count(ctx.duration);
            let step_len = ctx.duration / steps;
            for step in 1..=steps {
                sleep(step_len).await;
                let t = step as f32 / steps as f32;
                ctx.surfaces.set_visibility(ctx.to, t);
                ctx.surfaces.set_visibility(ctx.from, 1.0 - t);
            }
        }
        .boxed()
    }
}

/// Fade the outgoing surface out completely, then fade the incoming one in.
#[derive(Debug, Default, Clone, Copy)]
pub struct FadeThrough;

impl TransitionEffect for FadeThrough {
    fn apply(&self, ctx: TransitionContext) -> BoxFuture<'static, ()> {
        async move {
            let half = ctx.duration / 2;
            let steps = frame_count(half);
            let step_len = half / steps;
            for step in 1..=steps {
                sleep(step_len).await;
                ctx.surfaces
                    .set_visibility(ctx.from, 1.0 - step as f32 / steps as f32);
            }
            for step in 1..=steps {
                sleep(step_len).await;
                ctx.surfaces
                    .set_visibility(ctx.to, step as f32 / steps as f32);
            }
        }
        .boxed()
    }
}

/// Instant swap, no animation.
#[derive(Debug, Default, Clone, Copy)]
pub struct Cut;

impl TransitionEffect for Cut {
    fn apply(&self, ctx: TransitionContext) -> BoxFuture<'static, ()> {
        ctx.surfaces.set_visibility(ctx.to, 1.0);
        ctx.surfaces.set_visibility(ctx.from, 0.0);
        futures::future::ready(()).boxed()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Horizontal,
    Vertical,
}

/// Path one surface follows over a transition. Incoming motions end at rest
/// and fully visible; outgoing motions start there.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Motion {
    FadeIn,
    FadeOut,
    /// Opaque, from an offset (in surface sizes) to rest.
    SlideIn { from: (f32, f32) },
    /// Opaque, from rest to an offset.
    PushOut { to: (f32, f32) },
    /// Fade in while scaling from `from` to 1.
    Zoom { from: f32 },
    /// Fade in while turning from `degrees` and growing from half size.
    Rotate { degrees: f32 },
    /// Fade in while the blur clears.
    BlurIn { radius: f32 },
    /// Opaque; the revealed region grows until its edge reaches `toward`.
    Wipe { toward: Edge },
    /// Opaque; the revealed region opens from the centre line across `axis`.
    Split { axis: Axis },
    /// Opaque; unfolds along `axis` from zero width/height.
    Flip { axis: Axis },
    /// Enters from the right while unfolding, like the next face of a cube.
    Cube,
    /// Unfolds from the left edge like a page.
    BookOpen,
    Checkerboard { cells: u16 },
    Stripes { count: u16 },
    /// Fade in while a ripple settles.
    Ripple { amplitude: f32 },
}

fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

impl Motion {
    /// Opacity and geometry at progress `t` in `0.0..=1.0`.
    pub fn sample(self, t: f32) -> (f32, Transform) {
        let t = t.clamp(0.0, 1.0);
        let rest = Transform::IDENTITY;
        match self {
            Self::FadeIn => (t, rest),
            Self::FadeOut => (1.0 - t, rest),
            Self::SlideIn { from: (x, y) } => (
                1.0,
                Transform {
                    translate: (lerp(x, 0.0, t), lerp(y, 0.0, t)),
                    ..rest
                },
            ),
            Self::PushOut { to: (x, y) } => (
                1.0,
                Transform {
                    translate: (lerp(0.0, x, t), lerp(0.0, y, t)),
                    ..rest
                },
            ),
            Self::Zoom { from } => {
                let scale = lerp(from, 1.0, t);
                (t, Transform { scale: (scale, scale), ..rest })
            }
            Self::Rotate { degrees } => {
                let scale = lerp(0.5, 1.0, t);
                (
                    t,
                    Transform {
                        rotation: lerp(degrees, 0.0, t),
                        scale: (scale, scale),
                        ..rest
                    },
                )
            }
            Self::BlurIn { radius } => (
                t,
                Transform {
                    blur: lerp(radius, 0.0, t),
                    ..rest
                },
            ),
            Self::Wipe { toward } => {
                let clip = match toward {
                    Edge::Left => ClipRect {
                        left: 1.0 - t,
                        ..ClipRect::FULL
                    },
                    Edge::Right => ClipRect {
                        right: t,
                        ..ClipRect::FULL
                    },
                };
                (1.0, Transform { clip, ..rest })
            }
            Self::Split { axis } => {
                let (lo, hi) = (0.5 - t / 2.0, 0.5 + t / 2.0);
                let clip = match axis {
                    Axis::Horizontal => ClipRect {
                        top: lo,
                        bottom: hi,
                        ..ClipRect::FULL
                    },
                    Axis::Vertical => ClipRect {
                        left: lo,
                        right: hi,
                        ..ClipRect::FULL
                    },
                };
                (1.0, Transform { clip, ..rest })
            }
            Self::Flip { axis } => {
                let scale = match axis {
                    Axis::Horizontal => (t, 1.0),
                    Axis::Vertical => (1.0, t),
                };
                (1.0, Transform { scale, ..rest })
            }
            Self::Cube => (
                1.0,
                Transform {
                    translate: (lerp(0.5, 0.0, t), 0.0),
                    scale: (t, 1.0),
                    ..rest
                },
            ),
            Self::BookOpen => (
                1.0,
                Transform {
                    // keeps the left edge pinned while the width grows
                    translate: (-(1.0 - t) / 2.0, 0.0),
                    scale: (t, 1.0),
                    ..rest
                },
            ),
            Self::Checkerboard { cells } => (
                1.0,
                Transform {
                    mask: Mask::Checkerboard { cells, coverage: t },
                    ..rest
                },
            ),
            Self::Stripes { count } => (
                1.0,
                Transform {
                    mask: Mask::Stripes { count, coverage: t },
                    ..rest
                },
            ),
            Self::Ripple { amplitude } => (
                t,
                Transform {
                    mask: Mask::Ripple {
                        amplitude: amplitude * (1.0 - t),
                        phase: t * 2.0 * TAU,
                    },
                    ..rest
                },
            ),
        }
    }
}

/// Frame-stepped effect: each surface follows its own [`Motion`]. Both end
/// at rest, the outgoing one hidden.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Keyframed {
    pub incoming: Motion,
    pub outgoing: Motion,
}

impl Keyframed {
    pub const fn new(incoming: Motion, outgoing: Motion) -> Self {
        Self { incoming, outgoing }
    }

    fn pose(&self, ctx: &TransitionContext, t: f32) {
        let (opacity, transform) = self.incoming.sample(t);
        ctx.surfaces.set_transform(ctx.to, transform);
        ctx.surfaces.set_visibility(ctx.to, opacity);
        let (opacity, transform) = self.outgoing.sample(t);
        ctx.surfaces.set_transform(ctx.from, transform);
        ctx.surfaces.set_visibility(ctx.from, opacity);
    }
}

impl TransitionEffect for Keyframed {
    fn apply(&self, ctx: TransitionContext) -> BoxFuture<'static, ()> {
        let effect = *self;
        async move {
            let steps = frame_count(ctx.duration);
            let step_len = ctx.duration / steps;
            effect.pose(&ctx, 0.0);
            for step in 1..=steps {
                sleep(step_len).await;
                effect.pose(&ctx, step as f32 / steps as f32);
            }
            ctx.surfaces.set_transform(ctx.to, Transform::IDENTITY);
            ctx.surfaces.set_visibility(ctx.to, 1.0);
            ctx.surfaces.set_transform(ctx.from, Transform::IDENTITY);
            ctx.surfaces.set_visibility(ctx.from, 0.0);
        }
        .boxed()
    }
}

const OUT: Motion = Motion::FadeOut;

/// Named keyframed effects installed by [`EffectRegistry::with_builtins`].
pub const KEYFRAMED_EFFECTS: &[(&str, Keyframed)] = &[
    (
        "slide-left",
        Keyframed::new(
            Motion::SlideIn { from: (1.0, 0.0) },
            Motion::PushOut { to: (-1.0, 0.0) },
        ),
    ),
    (
        "slide-right",
        Keyframed::new(
            Motion::SlideIn { from: (-1.0, 0.0) },
            Motion::PushOut { to: (1.0, 0.0) },
        ),
    ),
    ("zoom-in", Keyframed::new(Motion::Zoom { from: 0.5 }, OUT)),
    ("zoom-out", Keyframed::new(Motion::Zoom { from: 1.5 }, OUT)),
    ("kenburns", Keyframed::new(Motion::Zoom { from: 1.15 }, OUT)),
    ("rotate", Keyframed::new(Motion::Rotate { degrees: -90.0 }, OUT)),
    ("blur-fade", Keyframed::new(Motion::BlurIn { radius: 20.0 }, OUT)),
    ("wipe-left", Keyframed::new(Motion::Wipe { toward: Edge::Left }, OUT)),
    ("wipe-right", Keyframed::new(Motion::Wipe { toward: Edge::Right }, OUT)),
    (
        "split-horizontal",
        Keyframed::new(Motion::Split { axis: Axis::Horizontal }, OUT),
    ),
    (
        "split-vertical",
        Keyframed::new(Motion::Split { axis: Axis::Vertical }, OUT),
    ),
    (
        "curtain-open",
        Keyframed::new(Motion::Split { axis: Axis::Vertical }, OUT),
    ),
    (
        "flip-horizontal",
        Keyframed::new(Motion::Flip { axis: Axis::Horizontal }, OUT),
    ),
    (
        "flip-vertical",
        Keyframed::new(Motion::Flip { axis: Axis::Vertical }, OUT),
    ),
    ("cube-rotate", Keyframed::new(Motion::Cube, OUT)),
    ("book-open", Keyframed::new(Motion::BookOpen, OUT)),
    ("checkerboard", Keyframed::new(Motion::Checkerboard { cells: 8 }, OUT)),
    ("stripes", Keyframed::new(Motion::Stripes { count: 12 }, OUT)),
    ("water-ripple", Keyframed::new(Motion::Ripple { amplitude: 0.04 }, OUT)),
];

/// Alternate spellings accepted in configuration, as `(alias, effect)`.
pub const EFFECT_ALIASES: &[(&str, &str)] = &[
    ("crossfade", "fade"),
    ("fade-in", "fade"),
    ("push-left", "slide-left"),
    ("push-right", "slide-right"),
    ("ken-burns", "kenburns"),
    ("random-stripes", "stripes"),
    ("page-turn", "book-open"),
];

/// Name → effect mapping, filled once at startup.
pub struct EffectRegistry {
    effects: BTreeMap<String, Arc<dyn TransitionEffect>>,
    default_name: String,
    default_effect: Arc<dyn TransitionEffect>,
}

impl EffectRegistry {
    pub fn new(default_name: impl Into<String>, default_effect: Arc<dyn TransitionEffect>) -> Self {
        let default_name = default_name.into();
        let mut effects = BTreeMap::new();
        effects.insert(default_name.clone(), Arc::clone(&default_effect));
        Self {
            effects,
            default_name,
            default_effect,
        }
    }

    /// Registry with the built-in effects and their aliases; `fade` is the
    /// fallback.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new(DEFAULT_EFFECT, Arc::new(Fade));
        registry.register("fade-through", Arc::new(FadeThrough));
        registry.register("cut", Arc::new(Cut));
        for (name, effect) in KEYFRAMED_EFFECTS {
            registry.register(*name, Arc::new(*effect));
        }
        for (alias, target) in EFFECT_ALIASES {
            if let Some(effect) = registry.effects.get(*target).cloned() {
                registry.effects.insert((*alias).to_string(), effect);
            }
        }
        registry
    }

    pub fn register(&mut self, name: impl Into<String>, effect: Arc<dyn TransitionEffect>) {
        self.effects.insert(name.into(), effect);
    }

    pub fn default_name(&self) -> &str {
        &self.default_name
    }

    pub fn contains(&self, name: &str) -> bool {
        self.effects.contains_key(name)
    }

    /// Effect registered under `name`, or the default effect. Never fails.
    pub fn resolve(&self, name: &str) -> Arc<dyn TransitionEffect> {
        match self.effects.get(name) {
            Some(effect) => Arc::clone(effect),
            None => {
                debug!(effect = name, fallback = %self.default_name, "unknown effect name");
                Arc::clone(&self.default_effect)
            }
        }
    }

    /// Choose an effect name: uniform over `available` when `randomize`,
    /// otherwise the first entry. Empty input yields the default name.
    pub fn pick_name<R: Rng + ?Sized>(
        &self,
        available: &[String],
        randomize: bool,
        rng: &mut R,
    ) -> String {
        let picked = if randomize {
            available.choose(rng)
        } else {
            available.first()
        };
        picked.cloned().unwrap_or_else(|| self.default_name.clone())
    }
}

impl Default for EffectRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

impl fmt::Debug for EffectRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EffectRegistry")
            .field("effects", &self.effects.keys().collect::<Vec<_>>())
            .field("default", &self.default_name)
            .finish()
    }
}
