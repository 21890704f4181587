use nalgebra::{Point3, Vector3};

/// Orthorhombic periodic simulation box, edge lengths in nm.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PeriodicBox {
    lengths: Vector3<f64>,
}

impl PeriodicBox {
    /// Returns `None` unless every edge is finite and strictly positive.
    pub fn new(lengths: Vector3<f64>) -> Option<Self> {
        if lengths.iter().all(|l| l.is_finite() && *l > 0.0) {
            Some(Self { lengths })
        } else {
            None
        }
    }

    pub fn cubic(length: f64) -> Option<Self> {
        Self::new(Vector3::repeat(length))
    }

    pub fn lengths(&self) -> &Vector3<f64> {
        &self.lengths
    }

    pub fn min_length(&self) -> f64 {
        self.lengths.min()
    }

    #[inline]
    pub fn minimum_image(&self, delta: Vector3<f64>) -> Vector3<f64> {
        Vector3::new(
            delta.x - self.lengths.x * (delta.x / self.lengths.x).round(),
            delta.y - self.lengths.y * (delta.y / self.lengths.y).round(),
            delta.z - self.lengths.z * (delta.z / self.lengths.z).round(),
        )
    }

    /// Maps a point into `[0, L)` along every axis.
    #[inline]
    pub fn wrap(&self, point: &Point3<f64>) -> Point3<f64> {
        Point3::new(
            point.x - self.lengths.x * (point.x / self.lengths.x).floor(),
            point.y - self.lengths.y * (point.y / self.lengths.y).floor(),
            point.z - self.lengths.z * (point.z / self.lengths.z).floor(),
        )
    }
}

/// Separation vector `a - b`, using the minimum image when a box is given.
#[inline]
pub fn displacement(
    a: &Point3<f64>,
    b: &Point3<f64>,
    periodic_box: Option<&PeriodicBox>,
) -> Vector3<f64> {
    let delta = a - b;
    match periodic_box {
        Some(pbc) => pbc.minimum_image(delta),
        None => delta,
    }
}
