use glam::DVec3;

use crate::geometry::lonlat_to_vec3;

/// Projection rotation in degrees: λ spins around the polar axis, φ tilts
/// toward the poles, γ rolls the view around its center.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rotation {
    pub lambda: f64,
    pub phi: f64,
    pub gamma: f64,
}

impl Rotation {
    pub fn new(lambda: f64, phi: f64, gamma: f64) -> Self {
        Self { lambda, phi, gamma }.normalized()
    }

    /// φ clamped to [-90, 90], λ wrapped into (-180, 180].
    pub fn normalized(self) -> Self {
        let lambda = {
            let wrapped = self.lambda.rem_euclid(360.0);
            if wrapped > 180.0 {
                wrapped - 360.0
            } else {
                wrapped
            }
        };
        Self {
            lambda,
            phi: self.phi.clamp(-90.0, 90.0),
            gamma: self.gamma,
        }
    }
}

impl Default for Rotation {
    fn default() -> Self {
        Self {
            lambda: 0.0,
            phi: 0.0,
            gamma: 0.0,
        }
    }
}

/// Orthographic projection of a rotating sphere onto the drawing surface.
///
/// Orientation is kept as a basis of three unit vectors (forward/right/up),
/// rebuilt whenever the rotation changes, so per-point projection is three
/// dot products. `rotate([λ, φ])` brings the geographic point (-λ, -φ) to
/// the center of the view.
#[derive(Clone, Debug)]
pub struct Orthographic {
    rotation: Rotation,
    scale: f64,
    translate: (f64, f64),
    forward: DVec3,
    right: DVec3,
    up: DVec3,
}

impl Orthographic {
    pub fn new(scale: f64, translate: (f64, f64)) -> Self {
        let mut projection = Self {
            rotation: Rotation::default(),
            scale: scale.max(f64::MIN_POSITIVE),
            translate,
            forward: DVec3::X,
            right: DVec3::Y,
            up: DVec3::Z,
        };
        projection.rebuild_basis();
        projection
    }

    pub fn rotation(&self) -> Rotation {
        self.rotation
    }

    /// Set the rotation, enforcing the normalization invariants.
    pub fn set_rotation(&mut self, rotation: Rotation) {
        self.rotation = rotation.normalized();
        self.rebuild_basis();
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Scale stays strictly positive; extent clamping belongs to the zoom
    /// plugin.
    pub fn set_scale(&mut self, scale: f64) {
        self.scale = scale.max(f64::MIN_POSITIVE);
    }

    pub fn translate(&self) -> (f64, f64) {
        self.translate
    }

    pub fn set_translate(&mut self, translate: (f64, f64)) {
        self.translate = translate;
    }

    /// Project a geographic point to surface pixels.
    /// Returns `None` for back-hemisphere points.
    pub fn project(&self, lon: f64, lat: f64) -> Option<(f64, f64)> {
        let p = lonlat_to_vec3(lon, lat);

        // Dot with forward: positive = front-facing
        if p.dot(self.forward) < 0.0 {
            return None;
        }

        let sx = p.dot(self.right);
        let sy = p.dot(self.up);

        Some((
            self.translate.0 + sx * self.scale,
            self.translate.1 - sy * self.scale,
        ))
    }

    fn rebuild_basis(&mut self) {
        // The view centers on the antipode of the rotation angles.
        let center_lon = -self.rotation.lambda;
        let center_lat = -self.rotation.phi;

        let lon_rad = center_lon.to_radians();
        let lat_rad = center_lat.to_radians();

        // Forward = direction from origin to the view center on the sphere
        let forward = DVec3::new(
            lat_rad.cos() * lon_rad.cos(),
            lat_rad.cos() * lon_rad.sin(),
            lat_rad.sin(),
        );

        // Up = derivative of forward w.r.t. latitude (points north)
        let raw_up = DVec3::new(
            -lat_rad.sin() * lon_rad.cos(),
            -lat_rad.sin() * lon_rad.sin(),
            lat_rad.cos(),
        );

        let right = forward.cross(raw_up).normalize();
        let up = right.cross(forward).normalize();

        // γ rolls right/up around the forward axis
        let (sin_g, cos_g) = self.rotation.gamma.to_radians().sin_cos();
        self.forward = forward;
        self.right = right * cos_g + up * sin_g;
        self.up = up * cos_g - right * sin_g;
    }
}

impl Default for Orthographic {
    fn default() -> Self {
        Self::new(100.0, (0.0, 0.0))
    }
}
