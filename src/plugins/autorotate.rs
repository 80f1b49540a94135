use std::time::Duration;

use crate::engine::{Plugin, Setup};

pub const NAME: &str = "autorotate";

/// Spins the globe a configured number of degrees per second of clock time,
/// advancing on every draw pass. Exposes an [`AutorotateState`] under
/// `"autorotate"` so gesture hooks can pause the spin while the user drags.
pub struct Autorotate {
    degrees_per_sec: f64,
}

impl Autorotate {
    pub fn new(degrees_per_sec: f64) -> Self {
        Self { degrees_per_sec }
    }
}

/// Pause/resume switch plus the last tick of the spin.
pub struct AutorotateState {
    paused: bool,
    last_tick: Option<Duration>,
}

impl AutorotateState {
    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn resume(&mut self) {
        self.paused = false;
    }

    pub fn toggle(&mut self) {
        self.paused = !self.paused;
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }
}

impl Plugin for Autorotate {
    fn name(&self) -> &'static str {
        NAME
    }

    fn configure(self, setup: &mut Setup<'_>) -> anyhow::Result<()> {
        setup.expose(AutorotateState {
            paused: false,
            last_tick: None,
        });

        let rate = self.degrees_per_sec;
        setup.on_draw(move |state, _surface| {
            let now = state.now();
            let Some(auto) = state.plugins.get_mut::<AutorotateState>(NAME) else {
                anyhow::bail!("autorotate state missing from the namespace");
            };
            // While paused (or on the first pass) only the tick advances, so
            // resuming never applies the backlog.
            let last = match auto.last_tick {
                Some(last) if !auto.paused => last,
                _ => {
                    auto.last_tick = Some(now);
                    return Ok(());
                }
            };
            auto.last_tick = Some(now);
            let delta = now.saturating_sub(last);

            let mut rotation = state.projection.rotation();
            rotation.lambda += rate * delta.as_secs_f64();
            state.projection.set_rotation(rotation);
            Ok(())
        });
        Ok(())
    }
}
