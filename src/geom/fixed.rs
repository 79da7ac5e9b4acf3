//! Exact fixed-point coordinates for neighbor-key equality.
//!
//! Neighbor lookup compares a synthesized bbox ring against rings read from
//! the index file. Repeated binary-float arithmetic (adding a sheet width N
//! times) drifts and silently misses true neighbors, so keys are quantised to
//! an exact 1e-7-degree grid: ten significant digits for any longitude on
//! Earth, and the 0.125-degree sheet module is representable exactly.

use std::ops::{Add, Sub};

const SCALE: f64 = 1e7;

/// A longitude or latitude on the 1e-7-degree grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FixedDeg(i64);

impl FixedDeg {
    pub fn from_deg(value: f64) -> Self {
        FixedDeg((value * SCALE).round() as i64)
    }

    pub fn to_deg(self) -> f64 {
        self.0 as f64 / SCALE
    }

    pub fn scaled(self, factor: i64) -> Self {
        FixedDeg(self.0 * factor)
    }
}

impl Add for FixedDeg {
    type Output = FixedDeg;
    fn add(self, rhs: FixedDeg) -> FixedDeg {
        FixedDeg(self.0 + rhs.0)
    }
}

impl Sub for FixedDeg {
    type Output = FixedDeg;
    fn sub(self, rhs: FixedDeg) -> FixedDeg {
        FixedDeg(self.0 - rhs.0)
    }
}

/// Hashable ring of quantised coordinates; the join key between a feature's
/// actual geometry and a synthesized neighbor rectangle.
pub type RingKey = Vec<(FixedDeg, FixedDeg)>;

pub fn ring_key(ring: &[[f64; 2]]) -> RingKey {
    ring.iter()
        .map(|p| (FixedDeg::from_deg(p[0]), FixedDeg::from_deg(p[1])))
        .collect()
}

/// Axis-aligned bbox on the fixed grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FixedBox {
    pub min_lon: FixedDeg,
    pub min_lat: FixedDeg,
    pub max_lon: FixedDeg,
    pub max_lat: FixedDeg,
}

impl FixedBox {
    pub fn from_ring(ring: &[[f64; 2]]) -> Option<FixedBox> {
        let first = ring.first()?;
        let mut bbox = FixedBox {
            min_lon: FixedDeg::from_deg(first[0]),
            min_lat: FixedDeg::from_deg(first[1]),
            max_lon: FixedDeg::from_deg(first[0]),
            max_lat: FixedDeg::from_deg(first[1]),
        };
        for p in &ring[1..] {
            let lon = FixedDeg::from_deg(p[0]);
            let lat = FixedDeg::from_deg(p[1]);
            bbox.min_lon = bbox.min_lon.min(lon);
            bbox.max_lon = bbox.max_lon.max(lon);
            bbox.min_lat = bbox.min_lat.min(lat);
            bbox.max_lat = bbox.max_lat.max(lat);
        }
        Some(bbox)
    }

    pub fn shifted(self, dx: FixedDeg, dy: FixedDeg) -> FixedBox {
        FixedBox {
            min_lon: self.min_lon + dx,
            min_lat: self.min_lat + dy,
            max_lon: self.max_lon + dx,
            max_lat: self.max_lat + dy,
        }
    }

    /// The closed 5-point ring of this bbox, anticlockwise from the top-left
    /// corner. This must match the ring order the index files store, which is
    /// also the order the quadrant subdivider emits.
    pub fn corner_ring(self) -> RingKey {
        vec![
            (self.min_lon, self.max_lat),
            (self.min_lon, self.min_lat),
            (self.max_lon, self.min_lat),
            (self.max_lon, self.max_lat),
            (self.min_lon, self.max_lat),
        ]
    }
}
