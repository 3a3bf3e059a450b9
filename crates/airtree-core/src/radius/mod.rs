//! Sub-voxel radius estimation via perpendicular-plane ray casting.
//!
//! For every centreline point the local tangent is estimated by finite
//! difference over a small window of neighboring skeleton points; rays
//! are cast in the plane orthogonal to it and the full-width-half-maximum
//! crossing of the intensity profile gives a per-ray wall distance.
//! Sampling in the orthogonal plane removes the bias a fixed-axis
//! profile would pick up on oblique branches. The per-point radius is
//! the median of the valid rays; points where fewer than half the rays
//! produce a clean single crossing stay without a radius (non-fatal).

mod profile;

pub use profile::{fwhm_crossing, median};

use nalgebra::Vector3;
use rayon::prelude::*;
use tracing::debug;

use crate::cancel::CancelToken;
use crate::error::CoreError;
use crate::tree::{Branch, BranchTree};
use crate::volume::ScalarVolume;

/// Ray-casting controls for radius estimation.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct RadiusParams {
    /// Number of rays cast per point, evenly spaced in angle.
    pub n_rays: usize,
    /// Ray length cap as a multiple of the branch radius prior.
    pub max_radius_factor: f64,
    /// Sampling step along each ray (mm).
    pub ray_step_mm: f64,
    /// Half-width (in skeleton points) of the tangent finite-difference
    /// window.
    pub tangent_halfwidth: usize,
    /// Minimum fraction of rays with a valid crossing; below it the
    /// point's radius is recorded absent.
    pub min_valid_fraction: f64,
}

impl Default for RadiusParams {
    fn default() -> Self {
        Self {
            n_rays: 16,
            max_radius_factor: 3.0,
            ray_step_mm: 0.25,
            tangent_halfwidth: 2,
            min_valid_fraction: 0.5,
        }
    }
}

/// Per-point radii plus non-fatal estimation statistics.
#[derive(Debug, Clone, Default)]
pub struct RadiusOutcome {
    /// Radius in millimetres per flattened point id; `None` when the
    /// estimate was ambiguous.
    pub radii_mm: Vec<Option<f64>>,
    /// Points without a radius.
    pub n_absent: usize,
    /// Rays discarded because they left the volume.
    pub n_rays_discarded: usize,
}

/// Estimate radii for every reachable point of the tree.
///
/// Output slots follow [`BranchTree::flatten`] order. Points within a
/// branch are processed in parallel; the cancellation token is checked
/// between branches.
pub fn estimate_radii(
    tree: &BranchTree,
    intensity: &ScalarVolume,
    params: &RadiusParams,
    cancel: &CancelToken,
) -> Result<RadiusOutcome, CoreError> {
    let mut out = RadiusOutcome::default();
    for id in tree.iter_depth_first() {
        if cancel.is_cancelled() {
            return Err(CoreError::Cancelled);
        }
        let branch = tree.get(id).expect("depth-first ids are valid");
        let results: Vec<(Option<f64>, usize)> = (0..branch.points.len())
            .into_par_iter()
            .map(|i| estimate_point(branch, i, intensity, params))
            .collect();
        for (radius, oob) in results {
            if radius.is_none() {
                out.n_absent += 1;
            }
            out.n_rays_discarded += oob;
            out.radii_mm.push(radius);
        }
    }
    debug!(
        n_points = out.radii_mm.len(),
        n_absent = out.n_absent,
        n_rays_discarded = out.n_rays_discarded,
        "radius estimation finished"
    );
    Ok(out)
}

/// Estimate one point's radius; returns the radius and the number of
/// rays discarded for leaving the volume.
fn estimate_point(
    branch: &Branch,
    index: usize,
    intensity: &ScalarVolume,
    params: &RadiusParams,
) -> (Option<f64>, usize) {
    let spacing = intensity.spacing();
    let Some(tangent) = local_tangent(branch, index, params.tangent_halfwidth, spacing) else {
        return (None, 0);
    };
    let (u, v) = plane_basis(tangent);
    let center = branch.points[index].voxel.position_mm(spacing);
    let prior = branch.radius_prior_mm;
    let max_len = prior * params.max_radius_factor;
    if max_len <= 0.0 || params.n_rays == 0 {
        return (None, 0);
    }
    let n_samples = (max_len / params.ray_step_mm).ceil() as usize + 1;

    let mut distances = Vec::with_capacity(params.n_rays);
    let mut n_oob = 0usize;
    for k in 0..params.n_rays {
        let theta = k as f64 * 2.0 * std::f64::consts::PI / params.n_rays as f64;
        let dir = u * theta.cos() + v * theta.sin();
        match cast_ray(intensity, center, dir, n_samples, prior, params.ray_step_mm) {
            RayResult::Crossing(d) => distances.push(d),
            RayResult::OutOfBounds => n_oob += 1,
            RayResult::Ambiguous => {}
        }
    }
    let min_valid = (params.n_rays as f64 * params.min_valid_fraction).ceil() as usize;
    if distances.len() < min_valid.max(1) {
        return (None, n_oob);
    }
    (Some(median(&mut distances)), n_oob)
}

enum RayResult {
    Crossing(f64),
    OutOfBounds,
    Ambiguous,
}

fn cast_ray(
    intensity: &ScalarVolume,
    center: Vector3<f64>,
    dir: Vector3<f64>,
    n_samples: usize,
    prior_mm: f64,
    step_mm: f64,
) -> RayResult {
    let spacing = intensity.spacing();
    let mut samples = Vec::with_capacity(n_samples);
    for j in 0..n_samples {
        let p = center + dir * (j as f64 * step_mm);
        let Some(s) = intensity.trilinear_checked(p.x / spacing.x, p.y / spacing.y, p.z / spacing.z)
        else {
            return RayResult::OutOfBounds;
        };
        samples.push(s);
    }

    // Local plateau levels: peak within the prior radius of the origin,
    // background as the darkest sample along the ray.
    let n_near = ((prior_mm / step_mm).floor() as usize + 1).min(samples.len());
    let peak = samples[..n_near].iter().copied().fold(f32::MIN, f32::max);
    let background = samples.iter().copied().fold(f32::MAX, f32::min);
    if peak <= background {
        return RayResult::Ambiguous; // flat profile, no wall
    }
    let threshold = 0.5 * (peak + background);
    match fwhm_crossing(&samples, step_mm, threshold) {
        Some(d) => RayResult::Crossing(d),
        None => RayResult::Ambiguous,
    }
}

/// Central finite-difference tangent over up to `halfwidth` neighbors on
/// each side, in physical coordinates. `None` when the window collapses.
fn local_tangent(
    branch: &Branch,
    index: usize,
    halfwidth: usize,
    spacing: crate::geom::Spacing,
) -> Option<Vector3<f64>> {
    if branch.points.len() < 2 {
        return None;
    }
    let lo = index.saturating_sub(halfwidth);
    let hi = (index + halfwidth).min(branch.points.len() - 1);
    let a = branch.points[lo].voxel.position_mm(spacing);
    let b = branch.points[hi].voxel.position_mm(spacing);
    let d = b - a;
    if d.norm() < f64::EPSILON {
        return None;
    }
    Some(d.normalize())
}

/// Orthonormal basis of the plane perpendicular to `t`.
fn plane_basis(t: Vector3<f64>) -> (Vector3<f64>, Vector3<f64>) {
    let helper = if t.x.abs() < 0.9 {
        Vector3::x()
    } else {
        Vector3::y()
    };
    let u = t.cross(&helper).normalize();
    let v = t.cross(&u).normalize();
    (u, v)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::{Spacing, Voxel};
    use crate::tree::{PointClass, SkeletonPoint};

    /// Cylinder along z with a half-voxel partial-volume ramp at the
    /// wall, so the half-maximum level sits exactly at radius `r`.
    fn cylinder(dims: [usize; 3], cx: f64, cy: f64, r: f64, inside: f32) -> ScalarVolume {
        let mut vol = ScalarVolume::new(dims, Spacing::default(), 0.0);
        for z in 0..dims[2] {
            for y in 0..dims[1] {
                for x in 0..dims[0] {
                    let d = ((x as f64 - cx).powi(2) + (y as f64 - cy).powi(2)).sqrt();
                    let w = (r + 0.5 - d).clamp(0.0, 1.0) as f32;
                    vol.put(Voxel::new(x as i32, y as i32, z as i32), inside * w);
                }
            }
        }
        vol
    }

    fn axis_branch(x: i32, y: i32, z0: i32, z1: i32, prior: f64) -> BranchTree {
        let points = (z0..z1)
            .map(|z| SkeletonPoint {
                voxel: Voxel::new(x, y, z),
                class: PointClass::Skeleton,
            })
            .collect();
        let mut tree = BranchTree::new();
        tree.insert(None, points, prior);
        tree
    }

    #[test]
    fn cylinder_radius_is_recovered_within_half_a_voxel() {
        let vol = cylinder([32, 32, 40], 16.0, 16.0, 3.0, 100.0);
        let tree = axis_branch(16, 16, 5, 35, 3.0);
        let out = estimate_radii(&tree, &vol, &RadiusParams::default(), &CancelToken::new())
            .expect("no fatal error");
        assert_eq!(out.radii_mm.len(), 30);
        for (i, r) in out.radii_mm.iter().enumerate() {
            let r = r.unwrap_or_else(|| panic!("point {i} has no radius"));
            assert!((r - 3.0).abs() <= 0.5, "point {i}: radius {r}");
        }
    }

    #[test]
    fn flat_volume_yields_absent_radius() {
        let vol = ScalarVolume::new([16, 16, 16], Spacing::default(), 42.0);
        let tree = axis_branch(8, 8, 2, 14, 2.0);
        let out = estimate_radii(&tree, &vol, &RadiusParams::default(), &CancelToken::new())
            .expect("no fatal error");
        assert!(out.radii_mm.iter().all(Option::is_none));
        assert_eq!(out.n_absent, 12);
    }

    #[test]
    fn rays_leaving_the_volume_are_discarded() {
        // Centreline hugging a volume face: at least the rays toward the
        // face leave the volume and must be counted as discarded.
        let vol = cylinder([32, 32, 20], 1.0, 16.0, 3.0, 100.0);
        let tree = axis_branch(1, 16, 4, 16, 3.0);
        let out = estimate_radii(&tree, &vol, &RadiusParams::default(), &CancelToken::new())
            .expect("no fatal error");
        assert!(out.n_rays_discarded > 0);
    }

    #[test]
    fn anisotropic_spacing_gives_physical_units() {
        // Digital radius of 6 voxels at 0.5 mm in-plane spacing: the
        // physical radius is 3 mm.
        let data: Vec<f32> = (0..48 * 48 * 30)
            .map(|i| {
                let x = i % 48;
                let y = (i / 48) % 48;
                let d = ((x as f64 - 24.0).powi(2) + (y as f64 - 24.0).powi(2)).sqrt();
                100.0 * (6.5 - d).clamp(0.0, 1.0) as f32
            })
            .collect();
        let vol = ScalarVolume::from_raw([48, 48, 30], Spacing::new(0.5, 0.5, 1.0), data)
            .expect("buffer matches dims");
        let tree = axis_branch(24, 24, 5, 25, 3.0);
        let out = estimate_radii(&tree, &vol, &RadiusParams::default(), &CancelToken::new())
            .expect("no fatal error");
        for r in out.radii_mm.iter().flatten() {
            assert!((r - 3.0).abs() <= 0.3, "physical radius should be 3 mm, got {r}");
        }
    }

    #[test]
    fn cancellation_is_observed_between_branches() {
        let vol = cylinder([16, 16, 16], 8.0, 8.0, 2.0, 100.0);
        let tree = axis_branch(8, 8, 2, 14, 2.0);
        let cancel = CancelToken::new();
        cancel.cancel();
        let err = estimate_radii(&tree, &vol, &RadiusParams::default(), &cancel)
            .expect_err("cancelled before the first branch");
        assert_eq!(err, CoreError::Cancelled);
    }

    #[test]
    fn single_point_branch_has_no_tangent_and_no_radius() {
        let vol = cylinder([16, 16, 16], 8.0, 8.0, 2.0, 100.0);
        let mut tree = BranchTree::new();
        tree.insert(
            None,
            vec![SkeletonPoint {
                voxel: Voxel::new(8, 8, 8),
                class: PointClass::Skeleton,
            }],
            2.0,
        );
        let out = estimate_radii(&tree, &vol, &RadiusParams::default(), &CancelToken::new())
            .expect("no fatal error");
        assert_eq!(out.radii_mm, vec![None]);
    }
}
