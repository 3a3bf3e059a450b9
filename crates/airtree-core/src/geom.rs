//! Integer voxel coordinates, digital neighborhoods, and physical spacing.

use nalgebra::Vector3;

/// Integer 3D voxel coordinate.
///
/// Coordinates may be negative during neighborhood enumeration; volume
/// containers reject out-of-bounds voxels at access time.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
pub struct Voxel {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl Voxel {
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Translate by an integer offset.
    pub const fn offset(self, d: [i32; 3]) -> Self {
        Self::new(self.x + d[0], self.y + d[1], self.z + d[2])
    }

    /// Physical position of the voxel center in millimetres.
    pub fn position_mm(self, spacing: Spacing) -> Vector3<f64> {
        Vector3::new(
            self.x as f64 * spacing.x,
            self.y as f64 * spacing.y,
            self.z as f64 * spacing.z,
        )
    }

    /// The 26 neighbors sharing a face, edge, or corner.
    pub fn neighbors26(self) -> impl Iterator<Item = Voxel> {
        OFFSETS26.iter().map(move |&d| self.offset(d))
    }
}

impl std::fmt::Display for Voxel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

/// Per-axis voxel size in millimetres.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Spacing {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Spacing {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub const fn isotropic(s: f64) -> Self {
        Self::new(s, s, s)
    }
}

impl Default for Spacing {
    fn default() -> Self {
        Self::isotropic(1.0)
    }
}

/// The 6 face offsets, one per thinning sub-iteration direction.
pub const OFFSETS6: [[i32; 3]; 6] = [
    [0, 0, -1],
    [0, 0, 1],
    [0, -1, 0],
    [0, 1, 0],
    [-1, 0, 0],
    [1, 0, 0],
];

/// All 26 offsets of the full neighborhood, lexicographic order.
pub const OFFSETS26: [[i32; 3]; 26] = [
    [-1, -1, -1],
    [-1, -1, 0],
    [-1, -1, 1],
    [-1, 0, -1],
    [-1, 0, 0],
    [-1, 0, 1],
    [-1, 1, -1],
    [-1, 1, 0],
    [-1, 1, 1],
    [0, -1, -1],
    [0, -1, 0],
    [0, -1, 1],
    [0, 0, -1],
    [0, 0, 1],
    [0, 1, -1],
    [0, 1, 0],
    [0, 1, 1],
    [1, -1, -1],
    [1, -1, 0],
    [1, -1, 1],
    [1, 0, -1],
    [1, 0, 0],
    [1, 0, 1],
    [1, 1, -1],
    [1, 1, 0],
    [1, 1, 1],
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offsets26_cover_full_neighborhood() {
        assert_eq!(OFFSETS26.len(), 26);
        for d in OFFSETS26 {
            assert_ne!(d, [0, 0, 0]);
            assert!(d.iter().all(|c| (-1..=1).contains(c)));
        }
        let unique: std::collections::HashSet<_> = OFFSETS26.iter().collect();
        assert_eq!(unique.len(), 26);
    }

    #[test]
    fn neighbors26_surround_the_voxel() {
        let v = Voxel::new(5, 5, 5);
        let mut count = 0;
        for n in v.neighbors26() {
            assert_ne!(n, v);
            assert!((n.x - v.x).abs() <= 1 && (n.y - v.y).abs() <= 1 && (n.z - v.z).abs() <= 1);
            count += 1;
        }
        assert_eq!(count, 26);
    }

    #[test]
    fn position_respects_anisotropic_spacing() {
        let p = Voxel::new(2, 3, 4).position_mm(Spacing::new(0.5, 0.5, 2.0));
        assert_eq!(p, nalgebra::Vector3::new(1.0, 1.5, 8.0));
    }
}
