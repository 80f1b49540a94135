//! An interactive, animated globe for the terminal, composed from pluggable
//! behaviors around a shared orthographic projection and draw loop.
//!
//! The [`engine::Globe`] owns the projection state, a typed plugin
//! namespace and the init-once / draw-every-frame lifecycle. Plugins —
//! map layers, animated ping markers, drag/zoom controllers — register
//! hooks through a narrow setup handle and draw onto anything implementing
//! [`surface::Surface`]; [`braille::BrailleSurface`] is the shipped
//! terminal backend.

#![forbid(unsafe_code)]

pub mod braille;
pub mod clock;
pub mod data;
pub mod engine;
pub mod error;
pub mod geometry;
pub mod path;
pub mod plugins;
pub mod projection;
pub mod surface;

pub use engine::{DrawOutcome, Globe, GlobeState, InitSignal, Plugin, PluginRegistry, Setup};
pub use error::{GlobeError, GlobeResult};
pub use projection::{Orthographic, Rotation};
pub use surface::{with_scoped_style, Rgba, Style, Surface};
