use std::path::PathBuf;

use crate::data::{self, World};
use crate::engine::{Plugin, Setup};

pub const NAME: &str = "world";

/// Where the map topology comes from.
pub enum WorldSource {
    /// Pre-decoded, in-memory world; init completes immediately.
    Memory(World),
    /// Directory of Natural Earth GeoJSON layer files.
    Dir(PathBuf),
}

/// Loads the world topology in its init hook and exposes the decoded
/// [`World`] under `"world"`. Layer plugins that read it must be loaded
/// after this one.
pub struct WorldPlugin {
    source: WorldSource,
}

impl WorldPlugin {
    pub fn new(source: WorldSource) -> Self {
        Self { source }
    }

    pub fn from_memory(world: World) -> Self {
        Self::new(WorldSource::Memory(world))
    }

    pub fn from_dir(dir: impl Into<PathBuf>) -> Self {
        Self::new(WorldSource::Dir(dir.into()))
    }
}

impl Plugin for WorldPlugin {
    fn name(&self) -> &'static str {
        NAME
    }

    fn configure(self, setup: &mut Setup<'_>) -> anyhow::Result<()> {
        let source = self.source;
        setup.on_init(move |state, signal| {
            let world = match source {
                WorldSource::Memory(world) => world,
                WorldSource::Dir(dir) => data::load_dir(&dir)?,
            };
            tracing::debug!(
                land = world.land.len(),
                borders = world.borders.len(),
                lakes = world.lakes.len(),
                "world topology ready"
            );
            state.plugins.insert(NAME, world);
            signal.complete();
            Ok(())
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::braille::BrailleSurface;
    use crate::clock::ManualClock;
    use crate::engine::{DrawOutcome, Globe};
    use crate::error::GlobeError;

    #[test]
    fn memory_source_exposes_the_world() {
        let mut globe = Globe::with_clock(ManualClock::new());
        globe
            .load_plugin(WorldPlugin::from_memory(data::builtin_world()))
            .unwrap();
        let mut surface = BrailleSurface::new(10, 5);
        assert_eq!(globe.draw(&mut surface).unwrap(), DrawOutcome::Rendered);
        let world = globe.state.plugins.get::<World>(NAME).expect("world entry");
        assert!(!world.is_empty());
    }

    #[test]
    fn missing_directory_fails_init_with_the_plugin_name() {
        let mut globe = Globe::with_clock(ManualClock::new());
        globe
            .load_plugin(WorldPlugin::from_dir("definitely/not/here"))
            .unwrap();
        let mut surface = BrailleSurface::new(10, 5);
        let err = globe.draw(&mut surface).unwrap_err();
        match err {
            GlobeError::Init { plugin, source } => {
                assert_eq!(plugin, NAME);
                // The loader failure is surfaced verbatim underneath.
                assert!(source.downcast_ref::<GlobeError>().is_some_and(|inner| {
                    matches!(inner, GlobeError::DataLoad { .. })
                }));
            }
            other => panic!("expected Init error, got {other}"),
        }
    }
}
