pub mod autoplay;
pub mod captions;
pub mod catalog;
pub mod config;
pub mod debug_overlay;
pub mod effects;
pub mod engine;
pub mod error;
pub mod events;
pub mod headless;
pub mod input;
pub mod playlist;
pub mod slideshow;
pub mod surface;
#[cfg(any(test, feature = "testkit"))]
pub mod testkit;
pub mod tasks {
    pub mod engine;
}
