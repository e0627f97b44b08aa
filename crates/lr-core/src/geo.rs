//! Geographic coordinates and the local planar projection.
//!
//! Routing distances are great-circle kilometres computed on [`GeoPoint`]s.
//! Spatial indexing works in a flat plane instead: a [`Projector`] maps
//! every coordinate onto a plane tangent to the unit sphere at the dataset
//! centroid, with `x` pointing east and `y` pointing north, both in km.

use serde::{Deserialize, Serialize};

/// Mean Earth radius in kilometres.
pub const EARTH_RADIUS_KM: f64 = 6_371.0;

// ── GeoPoint ──────────────────────────────────────────────────────────────────

/// A WGS-84 coordinate in degrees.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    #[inline]
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Haversine great-circle distance in kilometres.
    pub fn distance_km(self, other: GeoPoint) -> f64 {
        let d_lat = (other.lat - self.lat).to_radians();
        let d_lon = (other.lon - self.lon).to_radians();

        let lat1 = self.lat.to_radians();
        let lat2 = other.lat.to_radians();

        let a = (d_lat * 0.5).sin().powi(2)
            + lat1.cos() * lat2.cos() * (d_lon * 0.5).sin().powi(2);

        2.0 * EARTH_RADIUS_KM * a.sqrt().atan2((1.0 - a).sqrt())
    }

    /// Position on the unit sphere (x towards lon 0, z towards the north pole).
    fn unit_vector(self) -> [f64; 3] {
        let (lat, lon) = (self.lat.to_radians(), self.lon.to_radians());
        [lat.cos() * lon.cos(), lat.cos() * lon.sin(), lat.sin()]
    }
}

impl std::fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.6}, {:.6})", self.lat, self.lon)
    }
}

// ── Point2 ────────────────────────────────────────────────────────────────────

/// A projected planar point in kilometres.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point2 {
    pub x: f64,
    pub y: f64,
}

impl Point2 {
    #[inline]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    #[inline]
    pub fn distance2(self, other: Point2) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }
}

// ── Projector ─────────────────────────────────────────────────────────────────

/// Orthographic projection onto the plane perpendicular to the dataset's
/// mean direction.
///
/// Built once from all node coordinates; cheap to copy and share.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Projector {
    /// Unit vector pointing east at the centre.
    east: [f64; 3],
    /// Unit vector pointing north at the centre.
    north: [f64; 3],
}

impl Projector {
    /// Fit a projector centred on the normalised mean of `points`.
    ///
    /// An empty input falls back to a plane centred on (0°, 0°).
    pub fn fit<I>(points: I) -> Self
    where
        I: IntoIterator<Item = GeoPoint>,
    {
        let mut sum = [0.0; 3];
        for p in points {
            let v = p.unit_vector();
            sum = [sum[0] + v[0], sum[1] + v[1], sum[2] + v[2]];
        }
        let center = normalize(sum).unwrap_or([1.0, 0.0, 0.0]);
        Self::centered(center)
    }

    fn centered(center: [f64; 3]) -> Self {
        // Remove the centre component from the pole to get local north.  At
        // the poles themselves any horizontal axis will do.
        let pole = [0.0, 0.0, 1.0];
        let along = dot(pole, center);
        let north = normalize([
            pole[0] - along * center[0],
            pole[1] - along * center[1],
            pole[2] - along * center[2],
        ])
        .unwrap_or([1.0, 0.0, 0.0]);
        let east = cross(north, center);
        Self { east, north }
    }

    /// Project a coordinate into planar kilometres.
    #[inline]
    pub fn project(&self, p: GeoPoint) -> Point2 {
        let v = p.unit_vector();
        Point2 {
            x: EARTH_RADIUS_KM * dot(v, self.east),
            y: EARTH_RADIUS_KM * dot(v, self.north),
        }
    }
}

impl Default for Projector {
    fn default() -> Self {
        Self::centered([1.0, 0.0, 0.0])
    }
}

// ── Vector helpers ────────────────────────────────────────────────────────────

#[inline]
fn dot(a: [f64; 3], b: [f64; 3]) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

#[inline]
fn cross(a: [f64; 3], b: [f64; 3]) -> [f64; 3] {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

fn normalize(v: [f64; 3]) -> Option<[f64; 3]> {
    let len = dot(v, v).sqrt();
    (len > 1e-12).then(|| [v[0] / len, v[1] / len, v[2] / len])
}
