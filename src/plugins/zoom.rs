use crate::engine::{GlobeState, Plugin, Setup};
use crate::plugins::GestureHooks;

pub const NAME: &str = "zoom";

const DEFAULT_EXTENT: [f64; 2] = [50.0, 2000.0];

/// Zoom plugin. Exposes a [`ZoomController`] under `"zoom"` once its init
/// hook has seeded the starting scale.
pub struct Zoom {
    pub hooks: GestureHooks,
    /// Starting scale; defaults to the projection's scale at init time.
    pub initial_scale: Option<f64>,
    pub scale_extent: [f64; 2],
}

impl Default for Zoom {
    fn default() -> Self {
        Self {
            hooks: GestureHooks::default(),
            initial_scale: None,
            scale_extent: DEFAULT_EXTENT,
        }
    }
}

impl Zoom {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_extent(scale_extent: [f64; 2]) -> Self {
        Self {
            scale_extent,
            ..Self::default()
        }
    }
}

impl Plugin for Zoom {
    fn name(&self) -> &'static str {
        NAME
    }

    fn configure(self, setup: &mut Setup<'_>) -> anyhow::Result<()> {
        let Zoom {
            hooks,
            initial_scale,
            scale_extent,
        } = self;
        setup.on_init(move |state, signal| {
            let scale = initial_scale
                .unwrap_or_else(|| state.projection.scale())
                .clamp(scale_extent[0], scale_extent[1]);
            state.plugins.insert(
                NAME,
                ZoomController {
                    hooks,
                    extent: scale_extent,
                    scale,
                },
            );
            signal.complete();
            Ok(())
        });
        Ok(())
    }
}

/// Maps zoom gestures into projection scale, clamped to the extent.
pub struct ZoomController {
    hooks: GestureHooks,
    extent: [f64; 2],
    scale: f64,
}

impl ZoomController {
    pub fn begin(&mut self, state: &mut GlobeState) {
        (self.hooks.on_start)(state);
    }

    /// Commit a new scale value, clamped to the extent.
    pub fn update(&mut self, state: &mut GlobeState, new_scale: f64) {
        (self.hooks.during)(state);
        self.scale = new_scale.clamp(self.extent[0], self.extent[1]);
        state.projection.set_scale(self.scale);
        (self.hooks.after)(state);
    }

    /// Multiplicative step, the wheel/pinch convenience.
    pub fn zoom_by(&mut self, state: &mut GlobeState, factor: f64) {
        self.update(state, self.scale * factor);
    }

    pub fn end(&mut self, state: &mut GlobeState) {
        (self.hooks.on_end)(state);
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }
}
