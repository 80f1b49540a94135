//! The built-in plugins: world data, the static map layers, animated ping
//! markers, pointer interaction (drag + zoom) and autorotation.

pub mod autorotate;
pub mod drag;
pub mod layers;
pub mod pings;
pub mod world;
pub mod zoom;

pub use autorotate::{Autorotate, AutorotateState};
pub use drag::{Drag, DragController};
pub use layers::{Borders, Earth, Lakes, Land, Oceans};
pub use pings::{Ping, PingOptions, Pings, PingsState};
pub use world::{WorldPlugin, WorldSource};
pub use zoom::{Zoom, ZoomController};

use crate::engine::GlobeState;

pub type GestureHook = Box<dyn FnMut(&mut GlobeState)>;

/// Caller-configurable extension points around a gesture: start, end, every
/// delta, and after the projection mutation commits. All default to no-ops.
/// The quartet is the seam for cross-plugin coordination — e.g. suspending
/// autorotation while a drag is active — without direct coupling.
pub struct GestureHooks {
    pub on_start: GestureHook,
    pub on_end: GestureHook,
    pub during: GestureHook,
    pub after: GestureHook,
}

impl Default for GestureHooks {
    fn default() -> Self {
        Self {
            on_start: Box::new(|_| {}),
            on_end: Box::new(|_| {}),
            during: Box::new(|_| {}),
            after: Box::new(|_| {}),
        }
    }
}
