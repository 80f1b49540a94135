use glam::DVec3;

/// A geographic line (sequence of lon/lat coordinates, degrees)
pub type LineString = Vec<(f64, f64)>;

/// A closed geographic ring (first and last coordinate coincide)
pub type Ring = Vec<(f64, f64)>;

/// Geometry values the path renderer understands. Everything a layer or
/// marker draws reduces to one of these.
#[derive(Clone, Debug)]
pub enum Geometry {
    /// The full globe outline (the visible disk edge).
    Sphere,
    Line(LineString),
    MultiLine(Vec<LineString>),
    /// Filled shape made of one or more rings (even-odd rule).
    Polygon(Vec<Ring>),
    /// Geodesic small circle of the given angular radius (degrees) around
    /// an origin. Used by the ping markers.
    Circle { lon: f64, lat: f64, angle: f64 },
}

/// Convert lon/lat (degrees) to a unit sphere vector.
#[inline(always)]
pub fn lonlat_to_vec3(lon: f64, lat: f64) -> DVec3 {
    let lon_rad = lon.to_radians();
    let lat_rad = lat.to_radians();
    DVec3::new(
        lat_rad.cos() * lon_rad.cos(),
        lat_rad.cos() * lon_rad.sin(),
        lat_rad.sin(),
    )
}

/// Convert a unit sphere vector back to lon/lat (degrees).
#[inline(always)]
pub fn vec3_to_lonlat(p: DVec3) -> (f64, f64) {
    let lat = p.z.clamp(-1.0, 1.0).asin().to_degrees();
    let lon = p.y.atan2(p.x).to_degrees();
    (lon, lat)
}

/// Interpolate along a great circle arc and call a visitor for each
/// subdivision point (excluding the start point, including the end point).
/// Subdivides into ~2° segments so arcs stay smooth at Braille resolution.
#[inline]
pub fn walk_great_circle(
    lon0: f64,
    lat0: f64,
    lon1: f64,
    lat1: f64,
    mut visitor: impl FnMut(f64, f64),
) {
    let a = lonlat_to_vec3(lon0, lat0);
    let b = lonlat_to_vec3(lon1, lat1);

    let dot = a.dot(b).clamp(-1.0, 1.0);
    let angle = dot.acos();

    let steps = ((angle.to_degrees() / 2.0).ceil() as usize).max(1);

    let sin_angle = angle.sin();
    if steps == 1 || sin_angle.abs() < 1e-10 {
        // Short segment, or nearly identical/antipodal points
        visitor(lon1, lat1);
        return;
    }

    for i in 1..=steps {
        let t = i as f64 / steps as f64;
        let sa = ((1.0 - t) * angle).sin() / sin_angle;
        let sb = (t * angle).sin() / sin_angle;
        let (lon, lat) = vec3_to_lonlat(a * sa + b * sb);
        visitor(lon, lat);
    }
}

/// Points of a geodesic small circle of `angle` degrees angular radius
/// around (lon, lat). The ring is open; the renderer closes it.
pub fn circle_ring(lon: f64, lat: f64, angle: f64, steps: usize) -> Ring {
    let center = lonlat_to_vec3(lon, lat);

    // East/north tangent basis at the center; fall back to a fixed axis at
    // the poles where "east" degenerates.
    let east = if center.z.abs() > 1.0 - 1e-9 {
        DVec3::X
    } else {
        DVec3::Z.cross(center).normalize()
    };
    let north = center.cross(east).normalize();

    let r = angle.to_radians();
    let (sin_r, cos_r) = r.sin_cos();

    let mut ring = Vec::with_capacity(steps);
    for i in 0..steps {
        let bearing = (i as f64 / steps as f64) * std::f64::consts::TAU;
        let p = center * cos_r + (east * bearing.cos() + north * bearing.sin()) * sin_r;
        ring.push(vec3_to_lonlat(p));
    }
    ring
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_vec3() {
        for &(lon, lat) in &[(0.0, 0.0), (123.4, -56.7), (-180.0, 89.0)] {
            let (lon2, lat2) = vec3_to_lonlat(lonlat_to_vec3(lon, lat));
            assert!((lat - lat2).abs() < 1e-9);
            // longitudes compare modulo 360
            assert!(((lon - lon2 + 540.0).rem_euclid(360.0) - 180.0).abs() < 1e-9);
        }
    }

    #[test]
    fn great_circle_walk_ends_at_target() {
        let mut last = (0.0, 0.0);
        let mut count = 0;
        walk_great_circle(0.0, 0.0, 90.0, 0.0, |lon, lat| {
            last = (lon, lat);
            count += 1;
        });
        assert!(count >= 45, "a 90° arc should subdivide, got {count} steps");
        assert!((last.0 - 90.0).abs() < 1e-9);
        assert!(last.1.abs() < 1e-9);
    }

    #[test]
    fn circle_ring_points_sit_at_the_angular_radius() {
        let center = lonlat_to_vec3(20.0, 40.0);
        for (lon, lat) in circle_ring(20.0, 40.0, 10.0, 64) {
            let p = lonlat_to_vec3(lon, lat);
            let dist = p.dot(center).clamp(-1.0, 1.0).acos().to_degrees();
            assert!((dist - 10.0).abs() < 1e-6);
        }
    }

    #[test]
    fn zero_radius_circle_collapses_to_the_origin() {
        for (lon, lat) in circle_ring(-30.0, 10.0, 0.0, 16) {
            assert!((lon - -30.0).abs() < 1e-9);
            assert!((lat - 10.0).abs() < 1e-9);
        }
    }
}
