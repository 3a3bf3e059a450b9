//! Label-volume rendering (boundary component).
//!
//! Maps an [`AirwayTreeResult`] onto a caller-provided template geometry.
//! This is the only place where point classes become numeric labels; the
//! write order is fixed so that at a shared voxel the later category
//! wins: original centreline, centreline, removed, bifurcation, start.

use airtree_core::{LabelVolume, Spacing};

use crate::pipeline::AirwayTreeResult;

pub const LABEL_BACKGROUND: u8 = 0;
pub const LABEL_CENTRELINE: u8 = 1;
pub const LABEL_ORIGINAL: u8 = 2;
pub const LABEL_BIFURCATION: u8 = 3;
pub const LABEL_START: u8 = 4;
pub const LABEL_REMOVED: u8 = 6;

/// Render the result into a label volume of the template's geometry.
/// Points outside the template are skipped.
pub fn render_labels(
    result: &AirwayTreeResult,
    dims: [usize; 3],
    spacing: Spacing,
) -> LabelVolume {
    let mut labels = LabelVolume::new(dims, spacing);
    for &v in &result.original_centreline_points {
        labels.put(v, LABEL_ORIGINAL);
    }
    for &v in &result.centreline_points {
        labels.put(v, LABEL_CENTRELINE);
    }
    for &v in &result.removed_points {
        labels.put(v, LABEL_REMOVED);
    }
    for &v in &result.bifurcation_points {
        labels.put(v, LABEL_BIFURCATION);
    }
    if let Some(start) = result.start_point {
        labels.put(start, LABEL_START);
    }
    labels
}

#[cfg(test)]
mod tests {
    use super::*;
    use airtree_core::Voxel;

    fn result_with(
        original: Vec<Voxel>,
        centreline: Vec<Voxel>,
        removed: Vec<Voxel>,
        bifurcation: Vec<Voxel>,
        start: Option<Voxel>,
    ) -> AirwayTreeResult {
        let mut r = AirwayTreeResult::empty([8, 8, 8], Spacing::default());
        r.original_centreline_points = original;
        r.centreline_points = centreline;
        r.removed_points = removed;
        r.bifurcation_points = bifurcation;
        r.start_point = start;
        r
    }

    #[test]
    fn categories_map_to_their_labels() {
        let a = Voxel::new(1, 0, 0);
        let b = Voxel::new(2, 0, 0);
        let c = Voxel::new(3, 0, 0);
        let r = result_with(vec![a, b, c], vec![a, b], vec![c], vec![b], Some(a));
        let labels = render_labels(&r, [8, 8, 8], Spacing::default());
        assert_eq!(labels.get(a), Some(LABEL_START));
        assert_eq!(labels.get(b), Some(LABEL_BIFURCATION));
        assert_eq!(labels.get(c), Some(LABEL_REMOVED));
        assert_eq!(labels.get(Voxel::new(0, 0, 0)), Some(LABEL_BACKGROUND));
    }

    #[test]
    fn original_only_points_keep_the_original_label() {
        // A voxel present in the original centreline but in no later
        // collection stays at label 2.
        let v = Voxel::new(4, 4, 4);
        let r = result_with(vec![v], vec![], vec![], vec![], None);
        let labels = render_labels(&r, [8, 8, 8], Spacing::default());
        assert_eq!(labels.get(v), Some(LABEL_ORIGINAL));
    }

    #[test]
    fn start_always_wins() {
        let v = Voxel::new(2, 2, 2);
        let r = result_with(vec![v], vec![v], vec![v], vec![v], Some(v));
        let labels = render_labels(&r, [8, 8, 8], Spacing::default());
        assert_eq!(labels.get(v), Some(LABEL_START));
    }

    #[test]
    fn out_of_template_points_are_skipped() {
        let v = Voxel::new(20, 0, 0);
        let r = result_with(vec![v], vec![v], vec![], vec![], Some(v));
        let labels = render_labels(&r, [8, 8, 8], Spacing::default());
        assert!(labels.data().iter().all(|&l| l == LABEL_BACKGROUND));
    }
}
