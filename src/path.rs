use crate::geometry::{circle_ring, walk_great_circle, Geometry};
use crate::projection::Orthographic;
use crate::surface::Surface;

const SPHERE_STEPS: usize = 144;
const CIRCLE_STEPS: usize = 120;

/// Project a geometry and emit its outline as surface path operations.
///
/// Callers own `begin_path` and the subsequent `fill`/`stroke`; this only
/// appends subpaths. Segments are subdivided along great circles and the pen
/// lifts across the clipped far hemisphere.
pub fn render(projection: &Orthographic, geometry: &Geometry, surface: &mut dyn Surface) {
    match geometry {
        Geometry::Sphere => sphere_outline(projection, surface),
        Geometry::Line(line) => trace(projection, line, surface, false),
        Geometry::MultiLine(lines) => {
            for line in lines {
                trace(projection, line, surface, false);
            }
        }
        Geometry::Polygon(rings) => {
            for ring in rings {
                trace(projection, ring, surface, true);
            }
        }
        Geometry::Circle { lon, lat, angle } => {
            let mut ring = circle_ring(*lon, *lat, *angle, CIRCLE_STEPS);
            if let Some(&first) = ring.first() {
                ring.push(first);
            }
            trace(projection, &ring, surface, false);
        }
    }
}

/// The visible disk edge in screen space.
fn sphere_outline(projection: &Orthographic, surface: &mut dyn Surface) {
    let (cx, cy) = projection.translate();
    let r = projection.scale();
    for i in 0..=SPHERE_STEPS {
        let t = (i as f64 / SPHERE_STEPS as f64) * std::f64::consts::TAU;
        let (x, y) = (cx + r * t.cos(), cy + r * t.sin());
        if i == 0 {
            surface.move_to(x, y);
        } else {
            surface.line_to(x, y);
        }
    }
    surface.close_path();
}

fn trace(projection: &Orthographic, line: &[(f64, f64)], surface: &mut dyn Surface, close: bool) {
    let mut pen_down = false;
    for (lon, lat) in densify(line) {
        match projection.project(lon, lat) {
            Some((x, y)) if pen_down => surface.line_to(x, y),
            Some((x, y)) => {
                surface.move_to(x, y);
                pen_down = true;
            }
            None => {
                // Clipped hemisphere; for fills the visible arc still closes
                if !close {
                    pen_down = false;
                }
            }
        }
    }
    if close && pen_down {
        surface.close_path();
    }
}

fn densify(line: &[(f64, f64)]) -> Vec<(f64, f64)> {
    let mut out = Vec::with_capacity(line.len() * 2);
    let Some(&first) = line.first() else {
        return out;
    };
    out.push(first);
    for pair in line.windows(2) {
        walk_great_circle(pair[0].0, pair[0].1, pair[1].0, pair[1].1, |lon, lat| {
            out.push((lon, lat));
        });
    }
    out
}
