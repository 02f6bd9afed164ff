//! Animated orbital backdrop: a shaded glyph globe, twinkling stars and
//! satellites with fading trails and occasional ground beams.
//!
//! [`Backdrop`] owns the simulation. Each tick yields a [`Frame`] of
//! drawables which [`render::paint`] puts on an egui painter.

pub mod clock;
pub mod config;
pub mod error;
pub mod frame;
pub mod grid;
pub mod math;
pub mod projection;
pub mod render;
pub mod satellite;
pub mod scheduler;
pub mod stars;
pub mod trig;

pub use config::EngineConfig;
pub use error::BackdropError;
pub use frame::Frame;
pub use scheduler::{Backdrop, RunState, ViewParams};
