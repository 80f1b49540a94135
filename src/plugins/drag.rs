use crate::engine::{GlobeState, Plugin, Setup};
use crate::plugins::GestureHooks;

pub const NAME: &str = "drag";

/// Drag-to-rotate plugin. Exposes a [`DragController`] under `"drag"`; the
/// input loop feeds it pixel deltas via [`Globe::with_plugin`].
///
/// [`Globe::with_plugin`]: crate::engine::Globe::with_plugin
#[derive(Default)]
pub struct Drag {
    pub hooks: GestureHooks,
}

impl Drag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_hooks(hooks: GestureHooks) -> Self {
        Self { hooks }
    }
}

impl Plugin for Drag {
    fn name(&self) -> &'static str {
        NAME
    }

    fn configure(self, setup: &mut Setup<'_>) -> anyhow::Result<()> {
        setup.expose(DragController { hooks: self.hooks });
        Ok(())
    }
}

/// Maps pointer-drag deltas into projection rotation.
pub struct DragController {
    hooks: GestureHooks,
}

impl DragController {
    pub fn begin(&mut self, state: &mut GlobeState) {
        (self.hooks.on_start)(state);
    }

    /// Apply one incremental move with pixel deltas (dx, dy).
    ///
    /// Pixel deltas map to degrees through a linear scale whose domain is
    /// `[-scale, +scale]` pixels and whose range is `[-90, +90]` degrees:
    /// dragging a full projection radius of pixels rotates 90°, so
    /// zoomed-in views rotate more slowly per pixel. Vertical deltas invert
    /// (screen-down looks further south). The rotation setter clamps φ and
    /// wraps λ.
    pub fn update(&mut self, state: &mut GlobeState, dx: f64, dy: f64) {
        (self.hooks.during)(state);

        let radius = state.projection.scale();
        let deg_x = dx * 90.0 / radius;
        let deg_y = dy * 90.0 / radius;

        let mut rotation = state.projection.rotation();
        rotation.lambda += deg_x;
        rotation.phi -= deg_y;
        state.projection.set_rotation(rotation);

        (self.hooks.after)(state);
    }

    pub fn end(&mut self, state: &mut GlobeState) {
        (self.hooks.on_end)(state);
    }
}
