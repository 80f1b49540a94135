use anyhow::Context as _;

use crate::data::World;
use crate::engine::{GlobeState, Plugin, Setup};
use crate::geometry::Geometry;
use crate::path;
use crate::plugins::world;
use crate::surface::{with_scoped_style, Rgba};

/// Fills the visible globe disk.
pub struct Oceans {
    pub fill: Rgba,
}

impl Default for Oceans {
    fn default() -> Self {
        Self { fill: Rgba::BLACK }
    }
}

impl Plugin for Oceans {
    fn name(&self) -> &'static str {
        "oceans"
    }

    fn configure(self, setup: &mut Setup<'_>) -> anyhow::Result<()> {
        let fill = self.fill;
        setup.on_draw(move |state, surface| {
            with_scoped_style(surface, |s| {
                s.begin_path();
                path::render(&state.projection, &Geometry::Sphere, s);
                s.set_fill(fill);
                s.fill();
                Ok(())
            })
        });
        Ok(())
    }
}

/// Snapshot of a world layer taken at init time, ready to render every pass.
struct LayerState {
    geometry: Geometry,
}

fn layer_state<'a>(state: &'a GlobeState, name: &str) -> anyhow::Result<&'a LayerState> {
    state
        .plugins
        .get::<LayerState>(name)
        .with_context(|| format!("`{name}` layer not initialized"))
}

fn world_of(state: &GlobeState) -> anyhow::Result<&World> {
    state
        .plugins
        .get::<World>(world::NAME)
        .context("world data not loaded; load the world plugin first")
}

/// Fills (and optionally strokes) the land masses.
pub struct Land {
    pub fill: Option<Rgba>,
    pub stroke: Option<Rgba>,
    pub line_width: Option<f64>,
}

impl Default for Land {
    fn default() -> Self {
        Self {
            fill: Some(Rgba::WHITE),
            stroke: None,
            line_width: None,
        }
    }
}

impl Plugin for Land {
    fn name(&self) -> &'static str {
        "land"
    }

    fn configure(self, setup: &mut Setup<'_>) -> anyhow::Result<()> {
        let name = setup.plugin_name().to_string();
        let Land {
            fill,
            stroke,
            line_width,
        } = self;

        {
            let name = name.clone();
            setup.on_init(move |state, signal| {
                let world = world_of(state)?;
                let geometry = Geometry::Polygon(world.land.clone());
                state.plugins.insert(&name, LayerState { geometry });
                signal.complete();
                Ok(())
            });
        }

        setup.on_draw(move |state, surface| {
            let layer = layer_state(state, &name)?;
            with_scoped_style(surface, |s| {
                s.begin_path();
                path::render(&state.projection, &layer.geometry, s);
                if let Some(fill) = fill {
                    s.set_fill(fill);
                    s.fill();
                }
                if let Some(stroke) = stroke {
                    if let Some(width) = line_width {
                        s.set_line_width(width);
                    }
                    s.set_stroke(stroke);
                    s.stroke();
                }
                Ok(())
            })
        });
        Ok(())
    }
}

/// Strokes country borders.
pub struct Borders {
    pub stroke: Rgba,
    pub line_width: Option<f64>,
}

impl Default for Borders {
    fn default() -> Self {
        Self {
            stroke: Rgba::GRAY,
            line_width: None,
        }
    }
}

impl Plugin for Borders {
    fn name(&self) -> &'static str {
        "borders"
    }

    fn configure(self, setup: &mut Setup<'_>) -> anyhow::Result<()> {
        let name = setup.plugin_name().to_string();
        let Borders { stroke, line_width } = self;

        {
            let name = name.clone();
            setup.on_init(move |state, signal| {
                let world = world_of(state)?;
                let geometry = Geometry::MultiLine(world.borders.clone());
                state.plugins.insert(&name, LayerState { geometry });
                signal.complete();
                Ok(())
            });
        }

        setup.on_draw(move |state, surface| {
            let layer = layer_state(state, &name)?;
            with_scoped_style(surface, |s| {
                s.begin_path();
                path::render(&state.projection, &layer.geometry, s);
                if let Some(width) = line_width {
                    s.set_line_width(width);
                }
                s.set_stroke(stroke);
                s.stroke();
                Ok(())
            })
        });
        Ok(())
    }
}

/// Fills lakes on top of the land layer.
pub struct Lakes {
    pub fill: Rgba,
}

impl Default for Lakes {
    fn default() -> Self {
        Self { fill: Rgba::BLACK }
    }
}

impl Plugin for Lakes {
    fn name(&self) -> &'static str {
        "lakes"
    }

    fn configure(self, setup: &mut Setup<'_>) -> anyhow::Result<()> {
        let name = setup.plugin_name().to_string();
        let fill = self.fill;

        {
            let name = name.clone();
            setup.on_init(move |state, signal| {
                let world = world_of(state)?;
                let geometry = Geometry::Polygon(world.lakes.clone());
                state.plugins.insert(&name, LayerState { geometry });
                signal.complete();
                Ok(())
            });
        }

        setup.on_draw(move |state, surface| {
            let layer = layer_state(state, &name)?;
            with_scoped_style(surface, |s| {
                s.begin_path();
                path::render(&state.projection, &layer.geometry, s);
                s.set_fill(fill);
                s.fill();
                Ok(())
            })
        });
        Ok(())
    }
}

/// Composite of the world data plugin and the ocean/land/border layers —
/// the usual way to get a basic globe with one `load_plugin` call.
pub struct Earth {
    pub world: super::WorldSource,
    pub oceans: Oceans,
    pub land: Land,
    pub borders: Borders,
}

impl Earth {
    pub fn new(world: super::WorldSource) -> Self {
        Self {
            world,
            oceans: Oceans::default(),
            land: Land::default(),
            borders: Borders::default(),
        }
    }
}

impl Plugin for Earth {
    fn name(&self) -> &'static str {
        "earth"
    }

    fn configure(self, setup: &mut Setup<'_>) -> anyhow::Result<()> {
        setup.load(super::WorldPlugin::new(self.world))?;
        setup.load(self.oceans)?;
        setup.load(self.land)?;
        setup.load(self.borders)?;
        Ok(())
    }
}
