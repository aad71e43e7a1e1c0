//! Plate reconstruction (§4.5, §9).
//!
//! The dynamic-topography sampler needs (i) a plate-ID assignment at a
//! present-day lon/lat, and (ii) a reconstruction of that lon/lat back to an
//! arbitrary past time given its plate ID. Both are specified only as an
//! interface (§9 design note (iv)); full plate-circuit reconstruction is out
//! of scope (§1). This module ships the interface plus the minimal built-in
//! implementations needed to exercise and test the sampler.

/// A plate identifier assigned by point-in-polygon test against static
/// polygons (§4.5 step 1).
pub type PlateId = u32;

/// Plate-reconstruction capability (§9 design note (iv)).
pub trait PlateReconstruction: Send + Sync {
    /// Assign a plate ID to a present-day location via point-in-polygon
    /// test against the static-polygon layer.
    fn plate_id_at(&self, lon: f64, lat: f64) -> PlateId;

    /// Reconstruct `(lon, lat)` from time 0 to time `age_ma`, given the
    /// plate it belongs to.
    fn reconstruct(&self, lon: f64, lat: f64, plate_id: PlateId, age_ma: f64) -> (f64, f64);
}

/// A single static polygon: a closed lon/lat ring and the plate ID it
/// assigns to points inside it.
#[derive(Debug, Clone)]
pub struct StaticPolygon {
    pub plate_id: PlateId,
    pub ring: Vec<(f64, f64)>,
}

impl StaticPolygon {
    fn contains(&self, lon: f64, lat: f64) -> bool {
        // Standard ray-casting point-in-polygon test.
        let mut inside = false;
        let n = self.ring.len();
        if n < 3 {
            return false;
        }
        let mut j = n - 1;
        for i in 0..n {
            let (xi, yi) = self.ring[i];
            let (xj, yj) = self.ring[j];
            let intersects = ((yi > lat) != (yj > lat))
                && (lon < (xj - xi) * (lat - yi) / (yj - yi) + xi);
            if intersects {
                inside = !inside;
            }
            j = i;
        }
        inside
    }
}

/// A rigid rotation of a plate about an Euler pole at a constant angular
/// rate, used to reconstruct a point on that plate to an arbitrary past
/// time. This is a simplified stand-in for a full finite-rotation-file
/// hierarchy (§9): one pole and one rate per plate, rather than a time-
/// dependent circuit of stage poles.
#[derive(Debug, Clone, Copy)]
pub struct EulerRotation {
    pub pole_lon: f64,
    pub pole_lat: f64,
    /// Degrees per million years.
    pub rate_deg_per_myr: f64,
}

impl EulerRotation {
    fn rotate(&self, lon: f64, lat: f64, age_ma: f64) -> (f64, f64) {
        let angle_rad = (self.rate_deg_per_myr * age_ma).to_radians();
        if angle_rad.abs() < 1e-15 {
            return (lon, lat);
        }

        let to_xyz = |lon: f64, lat: f64| {
            let lon = lon.to_radians();
            let lat = lat.to_radians();
            (
                lat.cos() * lon.cos(),
                lat.cos() * lon.sin(),
                lat.sin(),
            )
        };
        let (px, py, pz) = to_xyz(self.pole_lon, self.pole_lat);
        let (x, y, z) = to_xyz(lon, lat);

        // Rodrigues' rotation formula about axis (px,py,pz).
        let (sin_a, cos_a) = angle_rad.sin_cos();
        let dot = px * x + py * y + pz * z;
        let cross = (
            py * z - pz * y,
            pz * x - px * z,
            px * y - py * x,
        );
        let rx = x * cos_a + cross.0 * sin_a + px * dot * (1.0 - cos_a);
        let ry = y * cos_a + cross.1 * sin_a + py * dot * (1.0 - cos_a);
        let rz = z * cos_a + cross.2 * sin_a + pz * dot * (1.0 - cos_a);

        let out_lat = rz.clamp(-1.0, 1.0).asin().to_degrees();
        let out_lon = ry.atan2(rx).to_degrees();
        (out_lon, out_lat)
    }
}

/// A plate-reconstruction model built from a set of static polygons and one
/// Euler rotation per plate. Points not covered by any polygon are assigned
/// plate 0 and left unrotated (a conservative "no plate-motion information"
/// fallback, since the continental/oceanic subsidence math never depends on
/// absolute plate position — only the dynamic-topography sampler consumes
/// this reconstruction).
#[derive(Debug, Clone, Default)]
pub struct StaticPlateModel {
    polygons: Vec<StaticPolygon>,
    rotations: std::collections::HashMap<PlateId, EulerRotation>,
}

impl StaticPlateModel {
    pub fn new(polygons: Vec<StaticPolygon>, rotations: Vec<(PlateId, EulerRotation)>) -> Self {
        Self {
            polygons,
            rotations: rotations.into_iter().collect(),
        }
    }

    /// A model with no polygons and no rotations: every point stays fixed.
    /// Used when the caller has no plate-motion data at all.
    pub fn identity() -> Self {
        Self::default()
    }
}

impl PlateReconstruction for StaticPlateModel {
    fn plate_id_at(&self, lon: f64, lat: f64) -> PlateId {
        for polygon in &self.polygons {
            if polygon.contains(lon, lat) {
                return polygon.plate_id;
            }
        }
        0
    }

    fn reconstruct(&self, lon: f64, lat: f64, plate_id: PlateId, age_ma: f64) -> (f64, f64) {
        match self.rotations.get(&plate_id) {
            Some(rotation) => rotation.rotate(lon, lat, age_ma),
            None => (lon, lat),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_model_leaves_points_fixed() {
        let model = StaticPlateModel::identity();
        let id = model.plate_id_at(10.0, 20.0);
        assert_eq!(id, 0);
        assert_eq!(model.reconstruct(10.0, 20.0, id, 50.0), (10.0, 20.0));
    }

    #[test]
    fn polygon_containment_assigns_plate_id() {
        let square = StaticPolygon {
            plate_id: 7,
            ring: vec![(0.0, 0.0), (0.0, 10.0), (10.0, 10.0), (10.0, 0.0)],
        };
        let model = StaticPlateModel::new(vec![square], vec![]);
        assert_eq!(model.plate_id_at(5.0, 5.0), 7);
        assert_eq!(model.plate_id_at(50.0, 50.0), 0);
    }

    #[test]
    fn zero_angle_rotation_is_identity() {
        let rotation = EulerRotation {
            pole_lon: 0.0,
            pole_lat: 90.0,
            rate_deg_per_myr: 1.0,
        };
        let model = StaticPlateModel::new(vec![], vec![(1, rotation)]);
        let (lon, lat) = model.reconstruct(30.0, 40.0, 1, 0.0);
        assert!((lon - 30.0).abs() < 1e-9);
        assert!((lat - 40.0).abs() < 1e-9);
    }
}
