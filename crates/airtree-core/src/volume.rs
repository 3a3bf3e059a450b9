//! Volume containers: binary mask, scalar intensity, and output labels.
//!
//! All volumes are dense row-major buffers (`x` fastest) with explicit
//! dimensions and physical spacing. Intensity sampling at sub-voxel
//! positions uses checked trilinear interpolation: out-of-bounds probes
//! return `None` so callers can discard the affected ray rather than
//! clamp silently.

use crate::geom::{Spacing, Voxel};

fn index(dims: [usize; 3], v: Voxel) -> Option<usize> {
    if v.x < 0 || v.y < 0 || v.z < 0 {
        return None;
    }
    let (x, y, z) = (v.x as usize, v.y as usize, v.z as usize);
    if x >= dims[0] || y >= dims[1] || z >= dims[2] {
        return None;
    }
    Some((z * dims[1] + y) * dims[0] + x)
}

/// Binary occupancy volume.
#[derive(Debug, Clone)]
pub struct MaskVolume {
    dims: [usize; 3],
    spacing: Spacing,
    data: Vec<bool>,
}

impl MaskVolume {
    pub fn new(dims: [usize; 3], spacing: Spacing) -> Self {
        Self {
            dims,
            spacing,
            data: vec![false; dims[0] * dims[1] * dims[2]],
        }
    }

    /// Build from a voxel list; voxels outside `dims` are reported back.
    pub fn from_voxels<'a>(
        dims: [usize; 3],
        spacing: Spacing,
        voxels: impl IntoIterator<Item = &'a Voxel>,
    ) -> Result<Self, Voxel> {
        let mut m = Self::new(dims, spacing);
        for &v in voxels {
            if !m.set(v) {
                return Err(v);
            }
        }
        Ok(m)
    }

    pub fn dims(&self) -> [usize; 3] {
        self.dims
    }

    pub fn spacing(&self) -> Spacing {
        self.spacing
    }

    /// True when the voxel is inside the volume and set.
    pub fn contains(&self, v: Voxel) -> bool {
        index(self.dims, v).map(|i| self.data[i]).unwrap_or(false)
    }

    /// Set a voxel; returns false when out of bounds.
    pub fn set(&mut self, v: Voxel) -> bool {
        match index(self.dims, v) {
            Some(i) => {
                self.data[i] = true;
                true
            }
            None => false,
        }
    }

    pub fn clear(&mut self, v: Voxel) {
        if let Some(i) = index(self.dims, v) {
            self.data[i] = false;
        }
    }

    pub fn count(&self) -> usize {
        self.data.iter().filter(|&&b| b).count()
    }
}

/// Scalar intensity volume (e.g. CT attenuation resampled to `f32`).
#[derive(Debug, Clone)]
pub struct ScalarVolume {
    dims: [usize; 3],
    spacing: Spacing,
    data: Vec<f32>,
}

impl ScalarVolume {
    pub fn new(dims: [usize; 3], spacing: Spacing, fill: f32) -> Self {
        Self {
            dims,
            spacing,
            data: vec![fill; dims[0] * dims[1] * dims[2]],
        }
    }

    /// Wrap an existing buffer; the length must match the dimensions.
    pub fn from_raw(dims: [usize; 3], spacing: Spacing, data: Vec<f32>) -> Option<Self> {
        if data.len() != dims[0] * dims[1] * dims[2] {
            return None;
        }
        Some(Self {
            dims,
            spacing,
            data,
        })
    }

    pub fn dims(&self) -> [usize; 3] {
        self.dims
    }

    pub fn spacing(&self) -> Spacing {
        self.spacing
    }

    pub fn get(&self, v: Voxel) -> Option<f32> {
        index(self.dims, v).map(|i| self.data[i])
    }

    pub fn put(&mut self, v: Voxel, value: f32) {
        if let Some(i) = index(self.dims, v) {
            self.data[i] = value;
        }
    }

    /// Trilinear interpolation at a continuous voxel coordinate.
    ///
    /// Returns `None` when any of the eight corner samples would fall
    /// outside the volume.
    pub fn trilinear_checked(&self, x: f64, y: f64, z: f64) -> Option<f32> {
        if x < 0.0 || y < 0.0 || z < 0.0 {
            return None;
        }
        let (x0, y0, z0) = (x.floor() as usize, y.floor() as usize, z.floor() as usize);
        if x0 + 1 >= self.dims[0] || y0 + 1 >= self.dims[1] || z0 + 1 >= self.dims[2] {
            return None;
        }
        let (fx, fy, fz) = (
            (x - x0 as f64) as f32,
            (y - y0 as f64) as f32,
            (z - z0 as f64) as f32,
        );
        let at = |dx: usize, dy: usize, dz: usize| {
            self.data[((z0 + dz) * self.dims[1] + (y0 + dy)) * self.dims[0] + (x0 + dx)]
        };
        let c00 = at(0, 0, 0) * (1.0 - fx) + at(1, 0, 0) * fx;
        let c10 = at(0, 1, 0) * (1.0 - fx) + at(1, 1, 0) * fx;
        let c01 = at(0, 0, 1) * (1.0 - fx) + at(1, 0, 1) * fx;
        let c11 = at(0, 1, 1) * (1.0 - fx) + at(1, 1, 1) * fx;
        let c0 = c00 * (1.0 - fy) + c10 * fy;
        let c1 = c01 * (1.0 - fy) + c11 * fy;
        Some(c0 * (1.0 - fz) + c1 * fz)
    }
}

/// Output label volume written by the renderer; unlabeled voxels are 0.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct LabelVolume {
    dims: [usize; 3],
    spacing: Spacing,
    data: Vec<u8>,
}

impl LabelVolume {
    pub fn new(dims: [usize; 3], spacing: Spacing) -> Self {
        Self {
            dims,
            spacing,
            data: vec![0; dims[0] * dims[1] * dims[2]],
        }
    }

    pub fn dims(&self) -> [usize; 3] {
        self.dims
    }

    pub fn spacing(&self) -> Spacing {
        self.spacing
    }

    pub fn get(&self, v: Voxel) -> Option<u8> {
        index(self.dims, v).map(|i| self.data[i])
    }

    /// Write a label; out-of-template voxels are skipped.
    pub fn put(&mut self, v: Voxel, label: u8) {
        if let Some(i) = index(self.dims, v) {
            self.data[i] = label;
        }
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mask_bounds_and_membership() {
        let mut m = MaskVolume::new([4, 4, 4], Spacing::default());
        assert!(m.set(Voxel::new(1, 2, 3)));
        assert!(!m.set(Voxel::new(4, 0, 0)));
        assert!(m.contains(Voxel::new(1, 2, 3)));
        assert!(!m.contains(Voxel::new(-1, 0, 0)));
        m.clear(Voxel::new(1, 2, 3));
        assert_eq!(m.count(), 0);
    }

    #[test]
    fn from_voxels_reports_out_of_bounds() {
        let bad = Voxel::new(9, 0, 0);
        let err = MaskVolume::from_voxels([4, 4, 4], Spacing::default(), [&bad])
            .expect_err("voxel outside dims must be rejected");
        assert_eq!(err, bad);
    }

    #[test]
    fn trilinear_midpoint() {
        let mut vol = ScalarVolume::new([4, 4, 4], Spacing::default(), 0.0);
        vol.put(Voxel::new(1, 1, 1), 100.0);
        vol.put(Voxel::new(2, 1, 1), 200.0);
        let v = vol
            .trilinear_checked(1.5, 1.0, 1.0)
            .expect("in-bounds sample");
        assert!((v - 150.0).abs() < 1e-4, "midpoint should be 150, got {v}");
    }

    #[test]
    fn trilinear_rejects_out_of_bounds() {
        let vol = ScalarVolume::new([4, 4, 4], Spacing::default(), 1.0);
        assert!(vol.trilinear_checked(-0.1, 0.0, 0.0).is_none());
        assert!(vol.trilinear_checked(3.5, 1.0, 1.0).is_none());
        assert!(vol.trilinear_checked(2.0, 2.0, 2.0).is_some());
    }
}
