//! Iterative topological thinning.
//!
//! Border voxels are removed in six directional sub-iterations per pass,
//! but only when they are *simple*: exactly one 26-connected object
//! component in the punctured 3x3x3 neighborhood, and exactly one
//! 6-connected background component among the face neighbors within the
//! 18-neighborhood. Endpoints (at most one object neighbor) are never
//! removed so curve ends survive. Iterates to a fixpoint.

use std::collections::{HashMap, VecDeque};

use crate::geom::{Voxel, OFFSETS26, OFFSETS6};

/// Dense occupancy grid over the branch bounding box (1-voxel margin),
/// so thinning cost scales with the branch, not the whole volume.
struct LocalGrid {
    min: [i32; 3],
    dims: [usize; 3],
    data: Vec<bool>,
}

impl LocalGrid {
    fn from_voxels(voxels: &[Voxel]) -> Option<Self> {
        let first = *voxels.first()?;
        let mut lo = [first.x, first.y, first.z];
        let mut hi = lo;
        for v in voxels {
            lo = [lo[0].min(v.x), lo[1].min(v.y), lo[2].min(v.z)];
            hi = [hi[0].max(v.x), hi[1].max(v.y), hi[2].max(v.z)];
        }
        let min = [lo[0] - 1, lo[1] - 1, lo[2] - 1];
        let dims = [
            (hi[0] - lo[0]) as usize + 3,
            (hi[1] - lo[1]) as usize + 3,
            (hi[2] - lo[2]) as usize + 3,
        ];
        let mut grid = Self {
            min,
            dims,
            data: vec![false; dims[0] * dims[1] * dims[2]],
        };
        for &v in voxels {
            let i = grid.idx(v).expect("voxel inside padded bounding box");
            grid.data[i] = true;
        }
        Some(grid)
    }

    fn idx(&self, v: Voxel) -> Option<usize> {
        let x = v.x - self.min[0];
        let y = v.y - self.min[1];
        let z = v.z - self.min[2];
        if x < 0
            || y < 0
            || z < 0
            || x as usize >= self.dims[0]
            || y as usize >= self.dims[1]
            || z as usize >= self.dims[2]
        {
            return None;
        }
        Some(((z as usize * self.dims[1]) + y as usize) * self.dims[0] + x as usize)
    }

    fn get(&self, v: Voxel) -> bool {
        self.idx(v).map(|i| self.data[i]).unwrap_or(false)
    }

    fn clear(&mut self, v: Voxel) {
        if let Some(i) = self.idx(v) {
            self.data[i] = false;
        }
    }

    fn object_neighbors26(&self, v: Voxel) -> usize {
        v.neighbors26().filter(|&n| self.get(n)).count()
    }

    /// Sorted list of set voxels.
    fn voxels(&self) -> Vec<Voxel> {
        let mut out = Vec::new();
        for z in 0..self.dims[2] {
            for y in 0..self.dims[1] {
                for x in 0..self.dims[0] {
                    let i = (z * self.dims[1] + y) * self.dims[0] + x;
                    if self.data[i] {
                        out.push(Voxel::new(
                            x as i32 + self.min[0],
                            y as i32 + self.min[1],
                            z as i32 + self.min[2],
                        ));
                    }
                }
            }
        }
        out.sort_unstable();
        out
    }
}

fn offset_adjacent26(a: [i32; 3], b: [i32; 3]) -> bool {
    (a[0] - b[0]).abs() <= 1 && (a[1] - b[1]).abs() <= 1 && (a[2] - b[2]).abs() <= 1
}

fn offset_adjacent6(a: [i32; 3], b: [i32; 3]) -> bool {
    (a[0] - b[0]).abs() + (a[1] - b[1]).abs() + (a[2] - b[2]).abs() == 1
}

/// Offsets of the 18-neighborhood (at most two non-zero components).
fn in_n18(d: [i32; 3]) -> bool {
    d[0].abs() + d[1].abs() + d[2].abs() <= 2
}

/// Simple-point criterion: removal of `v` preserves both object and
/// background topology in the 3x3x3 neighborhood.
fn is_simple(grid: &LocalGrid, v: Voxel) -> bool {
    // Object: the set 26-neighbors must form exactly one 26-component.
    let object: Vec<[i32; 3]> = OFFSETS26
        .iter()
        .copied()
        .filter(|&d| grid.get(v.offset(d)))
        .collect();
    if object.is_empty() || component_count(&object, offset_adjacent26) != 1 {
        return false;
    }

    // Background: the background face neighbors must be non-empty and
    // mutually 6-connected through background cells of the 18-neighborhood.
    let bg_faces: Vec<[i32; 3]> = OFFSETS6
        .iter()
        .copied()
        .filter(|&d| !grid.get(v.offset(d)))
        .collect();
    if bg_faces.is_empty() {
        return false;
    }
    let bg18: Vec<[i32; 3]> = OFFSETS26
        .iter()
        .copied()
        .filter(|&d| in_n18(d) && !grid.get(v.offset(d)))
        .collect();
    let mut reached = vec![false; bg18.len()];
    let start = bg18
        .iter()
        .position(|&d| d == bg_faces[0])
        .expect("face neighbors lie within the 18-neighborhood");
    let mut queue = VecDeque::from([start]);
    reached[start] = true;
    while let Some(i) = queue.pop_front() {
        for (j, &d) in bg18.iter().enumerate() {
            if !reached[j] && offset_adjacent6(bg18[i], d) {
                reached[j] = true;
                queue.push_back(j);
            }
        }
    }
    bg_faces.iter().all(|&d| {
        bg18.iter()
            .position(|&x| x == d)
            .map(|i| reached[i])
            .unwrap_or(false)
    })
}

fn component_count(cells: &[[i32; 3]], adjacent: fn([i32; 3], [i32; 3]) -> bool) -> usize {
    let mut seen = vec![false; cells.len()];
    let mut count = 0;
    for s in 0..cells.len() {
        if seen[s] {
            continue;
        }
        count += 1;
        let mut queue = VecDeque::from([s]);
        seen[s] = true;
        while let Some(i) = queue.pop_front() {
            for (j, &c) in cells.iter().enumerate() {
                if !seen[j] && adjacent(cells[i], c) {
                    seen[j] = true;
                    queue.push_back(j);
                }
            }
        }
    }
    count
}

/// Thin one branch's voxel set to a one-voxel-wide skeleton.
///
/// Deterministic: candidates are processed in sorted order and removals
/// re-check simplicity against the current grid state.
pub fn thin_branch(voxels: &[Voxel]) -> Vec<Voxel> {
    let Some(mut grid) = LocalGrid::from_voxels(voxels) else {
        return Vec::new();
    };
    loop {
        let mut removed = 0usize;
        for dir in OFFSETS6 {
            let candidates: Vec<Voxel> = grid
                .voxels()
                .into_iter()
                .filter(|&v| !grid.get(v.offset(dir)))
                .collect();
            for v in candidates {
                if !grid.get(v) || grid.get(v.offset(dir)) {
                    continue;
                }
                if grid.object_neighbors26(v) <= 1 {
                    continue; // endpoint
                }
                if is_simple(&grid, v) {
                    grid.clear(v);
                    removed += 1;
                }
            }
        }
        if removed == 0 {
            return grid.voxels();
        }
    }
}

/// 26-connected components of a voxel list, each sorted, ordered by their
/// smallest voxel.
pub fn components26(voxels: &[Voxel]) -> Vec<Vec<Voxel>> {
    let mut sorted: Vec<Voxel> = voxels.to_vec();
    sorted.sort_unstable();
    sorted.dedup();
    let index: HashMap<Voxel, usize> = sorted.iter().enumerate().map(|(i, &v)| (v, i)).collect();
    let mut seen = vec![false; sorted.len()];
    let mut comps = Vec::new();
    for s in 0..sorted.len() {
        if seen[s] {
            continue;
        }
        let mut comp = Vec::new();
        let mut queue = VecDeque::from([s]);
        seen[s] = true;
        while let Some(i) = queue.pop_front() {
            comp.push(sorted[i]);
            for n in sorted[i].neighbors26() {
                if let Some(&j) = index.get(&n) {
                    if !seen[j] {
                        seen[j] = true;
                        queue.push_back(j);
                    }
                }
            }
        }
        comp.sort_unstable();
        comps.push(comp);
    }
    comps.sort_by_key(|c| c[0]);
    comps
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(n: i32) -> Vec<Voxel> {
        (0..n).map(|x| Voxel::new(x, 0, 0)).collect()
    }

    fn solid_box(nx: i32, ny: i32, nz: i32) -> Vec<Voxel> {
        let mut v = Vec::new();
        for z in 0..nz {
            for y in 0..ny {
                for x in 0..nx {
                    v.push(Voxel::new(x, y, z));
                }
            }
        }
        v
    }

    #[test]
    fn one_voxel_wide_line_is_a_fixpoint() {
        let l = line(10);
        assert_eq!(thin_branch(&l), l);
    }

    #[test]
    fn solid_bar_thins_to_connected_curve_inside_input() {
        let input = solid_box(20, 5, 5);
        let skel = thin_branch(&input);
        assert!(!skel.is_empty());
        assert!(skel.len() < input.len() / 4);
        let input_set: std::collections::HashSet<_> = input.iter().collect();
        for v in &skel {
            assert!(input_set.contains(v), "skeleton voxel {v} outside mask");
        }
        assert_eq!(components26(&skel).len(), 1, "skeleton must stay connected");
    }

    #[test]
    fn skeleton_of_bar_spans_its_long_axis() {
        let skel = thin_branch(&solid_box(30, 5, 5));
        let xs: Vec<i32> = skel.iter().map(|v| v.x).collect();
        let span = xs.iter().max().unwrap() - xs.iter().min().unwrap();
        assert!(span >= 20, "skeleton span {span} too short for a 30-long bar");
    }

    #[test]
    fn small_blob_collapses_to_a_few_connected_voxels() {
        let skel = thin_branch(&solid_box(3, 3, 3));
        assert!((1..=3).contains(&skel.len()), "got {} voxels", skel.len());
        assert_eq!(components26(&skel).len(), 1);
    }

    #[test]
    fn empty_input_yields_empty_skeleton() {
        assert!(thin_branch(&[]).is_empty());
    }

    #[test]
    fn components_are_ordered_and_sorted() {
        let vox = vec![Voxel::new(10, 0, 0), Voxel::new(0, 0, 0), Voxel::new(1, 0, 0)];
        let comps = components26(&vox);
        assert_eq!(comps.len(), 2);
        assert_eq!(comps[0], vec![Voxel::new(0, 0, 0), Voxel::new(1, 0, 0)]);
        assert_eq!(comps[1], vec![Voxel::new(10, 0, 0)]);
    }

    #[test]
    fn interior_voxel_of_a_line_is_not_simple() {
        let grid = LocalGrid::from_voxels(&line(5)).unwrap();
        // Removing an interior line voxel would split the curve.
        assert!(!is_simple(&grid, Voxel::new(2, 0, 0)));
    }

    #[test]
    fn surface_voxel_of_a_slab_is_simple() {
        let grid = LocalGrid::from_voxels(&solid_box(5, 5, 3)).unwrap();
        assert!(is_simple(&grid, Voxel::new(2, 2, 0)));
    }
}
