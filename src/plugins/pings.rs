use std::time::Duration;

use crate::engine::{Plugin, Setup};
use crate::error::{GlobeError, GlobeResult};
use crate::geometry::Geometry;
use crate::path;
use crate::surface::{with_scoped_style, Rgba};

pub const NAME: &str = "pings";

const DEFAULT_COLOR: Rgba = Rgba::WHITE;
const DEFAULT_ANGLE: f64 = 5.0;
const DEFAULT_TTL: Duration = Duration::from_millis(2000);

/// Per-ping overrides. Unset fields fall back to the plugin-level defaults,
/// then to the hard defaults (white, 5°, 2000 ms) — first non-null wins.
#[derive(Clone, Copy, Debug, Default)]
pub struct PingOptions {
    pub color: Option<Rgba>,
    pub angle: Option<f64>,
    pub ttl: Option<Duration>,
}

impl PingOptions {
    pub fn color(mut self, color: Rgba) -> Self {
        self.color = Some(color);
        self
    }

    pub fn angle(mut self, angle: f64) -> Self {
        self.angle = Some(angle);
        self
    }

    pub fn ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }
}

/// A transient marker: visible while `now - created < ttl`, fading linearly
/// to transparent while its ring grows linearly to `angle` degrees.
#[derive(Clone, Copy, Debug)]
pub struct Ping {
    pub lon: f64,
    pub lat: f64,
    pub created: Duration,
    pub color: Rgba,
    pub angle: f64,
    pub ttl: Duration,
}

impl Ping {
    /// Normalized lifetime fraction in [0, 1) while alive.
    fn fraction(&self, now: Duration) -> f64 {
        now.saturating_sub(self.created).as_secs_f64() / self.ttl.as_secs_f64()
    }
}

/// The ping subsystem plugin. Exposes a [`PingsState`] under `"pings"`.
#[derive(Default)]
pub struct Pings {
    pub defaults: PingOptions,
}

impl Pings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_defaults(defaults: PingOptions) -> Self {
        Self { defaults }
    }
}

/// Owned state of the ping subsystem: subsystem-level defaults and the live
/// marker sequence.
pub struct PingsState {
    defaults: PingOptions,
    live: Vec<Ping>,
}

impl PingsState {
    /// Add a marker at the given coordinate, stamped at `now`.
    ///
    /// Coordinates outside the geographic domain are rejected, never
    /// clamped.
    pub fn add(
        &mut self,
        now: Duration,
        lon: f64,
        lat: f64,
        options: PingOptions,
    ) -> GlobeResult<()> {
        if !(-180.0..=180.0).contains(&lon) || !(-90.0..=90.0).contains(&lat) {
            return Err(GlobeError::InvalidCoordinate { lon, lat });
        }
        self.live.push(Ping {
            lon,
            lat,
            created: now,
            color: options.color.or(self.defaults.color).unwrap_or(DEFAULT_COLOR),
            angle: options.angle.or(self.defaults.angle).unwrap_or(DEFAULT_ANGLE),
            ttl: options.ttl.or(self.defaults.ttl).unwrap_or(DEFAULT_TTL),
        });
        Ok(())
    }

    pub fn live(&self) -> &[Ping] {
        &self.live
    }

    /// Replace the live sequence with a fresh filter of the survivors,
    /// preserving relative order. Wholesale replacement, not in-place
    /// removal.
    fn prune(&mut self, now: Duration) {
        self.live = std::mem::take(&mut self.live)
            .into_iter()
            .filter(|ping| now.saturating_sub(ping.created) < ping.ttl)
            .collect();
    }
}

impl Plugin for Pings {
    fn name(&self) -> &'static str {
        NAME
    }

    fn configure(self, setup: &mut Setup<'_>) -> anyhow::Result<()> {
        setup.expose(PingsState {
            defaults: self.defaults,
            live: Vec::new(),
        });

        setup.on_draw(|state, surface| {
            let now = state.now();
            let Some(pings) = state.plugins.get_mut::<PingsState>(NAME) else {
                anyhow::bail!("ping state missing from the namespace");
            };
            pings.prune(now);

            let Some(pings) = state.plugins.get::<PingsState>(NAME) else {
                anyhow::bail!("ping state missing from the namespace");
            };
            with_scoped_style(surface, |s| {
                for ping in pings.live() {
                    let fraction = ping.fraction(now);
                    let ring = Geometry::Circle {
                        lon: ping.lon,
                        lat: ping.lat,
                        angle: fraction * ping.angle,
                    };
                    s.begin_path();
                    path::render(&state.projection, &ring, s);
                    s.set_stroke(ping.color.with_alpha(1.0 - fraction));
                    s.stroke();
                }
                Ok(())
            })
        });
        Ok(())
    }
}
