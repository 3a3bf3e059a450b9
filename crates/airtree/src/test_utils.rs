//! Synthetic tube phantoms shared by unit, integration, and bench code.
//!
//! Tubes are rendered as capsules around a polyline with a half-voxel
//! partial-volume ramp at the wall, so the half-maximum intensity level
//! sits exactly at the nominal radius, which is the property the FWHM estimator
//! is specified against.

use airtree_core::{ScalarVolume, Spacing, Voxel};

fn sub(a: [f64; 3], b: [f64; 3]) -> [f64; 3] {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

fn dot(a: [f64; 3], b: [f64; 3]) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

fn dist_to_segment(p: [f64; 3], a: [f64; 3], b: [f64; 3]) -> f64 {
    let ab = sub(b, a);
    let denom = dot(ab, ab);
    let t = if denom > 0.0 {
        (dot(sub(p, a), ab) / denom).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let q = [a[0] + ab[0] * t, a[1] + ab[1] * t, a[2] + ab[2] * t];
    dot(sub(p, q), sub(p, q)).sqrt()
}

/// Render a tube phantom around a set of axis segments (voxel coordinates).
///
/// Returns the intensity volume and the binary mask voxel list
/// (distance to the nearest segment <= `radius`).
pub fn tube_from_segments(
    dims: [usize; 3],
    spacing: Spacing,
    segments: &[([f64; 3], [f64; 3])],
    radius: f64,
    inside: f32,
) -> (ScalarVolume, Vec<Voxel>) {
    assert!(!segments.is_empty(), "tube needs at least one axis segment");
    let mut vol = ScalarVolume::new(dims, spacing, 0.0);
    let mut mask = Vec::new();
    for z in 0..dims[2] {
        for y in 0..dims[1] {
            for x in 0..dims[0] {
                let p = [x as f64, y as f64, z as f64];
                let d = segments
                    .iter()
                    .map(|&(a, b)| dist_to_segment(p, a, b))
                    .fold(f64::INFINITY, f64::min);
                let w = (radius + 0.5 - d).clamp(0.0, 1.0) as f32;
                if w > 0.0 {
                    vol.put(Voxel::new(x as i32, y as i32, z as i32), inside * w);
                }
                if d <= radius {
                    mask.push(Voxel::new(x as i32, y as i32, z as i32));
                }
            }
        }
    }
    (vol, mask)
}

/// Straight tube along z at (`cx`, `cy`), spanning `z0..=z1`.
pub fn straight_tube(
    dims: [usize; 3],
    cx: f64,
    cy: f64,
    z0: f64,
    z1: f64,
    radius: f64,
    inside: f32,
) -> (ScalarVolume, Vec<Voxel>) {
    tube_from_segments(
        dims,
        Spacing::default(),
        &[([cx, cy, z0], [cx, cy, z1])],
        radius,
        inside,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tube_mask_matches_the_half_maximum_surface() {
        let (vol, mask) = straight_tube([16, 16, 12], 8.0, 8.0, 2.0, 10.0, 3.0, 100.0);
        // Axis voxel: full intensity; just outside the wall: zero.
        assert_eq!(vol.get(Voxel::new(8, 8, 6)), Some(100.0));
        assert_eq!(vol.get(Voxel::new(8, 13, 6)), Some(0.0));
        assert!(mask.contains(&Voxel::new(8, 8, 6)));
        assert!(mask.contains(&Voxel::new(11, 8, 6)));
        assert!(!mask.contains(&Voxel::new(12, 8, 6)));
    }

    #[test]
    fn degenerate_segment_falls_back_to_point_distance() {
        let d = dist_to_segment([3.0, 0.0, 0.0], [0.0, 0.0, 0.0], [0.0, 0.0, 0.0]);
        assert_eq!(d, 3.0);
    }
}
