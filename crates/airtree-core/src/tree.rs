//! Arena-based branch tree.
//!
//! Branches live in a flat arena and reference each other by index: the
//! parent link is a plain non-owning index, so the tree is trivially
//! acyclic at the ownership level and can be read concurrently during
//! radius estimation. Traversal is an explicit-stack depth-first walk to
//! stay safe on deep trees.

use crate::geom::Voxel;

/// Arena index of a branch.
pub type BranchId = usize;

/// Classification of a skeleton point.
///
/// Numeric label values exist only at the render boundary; everywhere
/// else the class is this enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointClass {
    /// Ordinary centreline point.
    Skeleton,
    /// Junction voxel with three or more skeleton-graph neighbors.
    Bifurcation,
    /// Removed during cycle breaking or pruning.
    Removed,
    /// The unique tree root point (endpoint nearest the seed).
    Start,
}

/// One centreline point: voxel coordinate plus class tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SkeletonPoint {
    pub voxel: Voxel,
    pub class: PointClass,
}

/// A maximal skeleton path between two junctions, or between a junction
/// and an endpoint. Points are ordered from the parent side outward.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Branch {
    /// Parent branch index; `None` for the root.
    pub parent: Option<BranchId>,
    /// Child branch indices, in discovery order.
    pub children: Vec<BranchId>,
    /// Ordered centreline points.
    pub points: Vec<SkeletonPoint>,
    /// Coarse radius prior inherited from the segmentation input (mm).
    pub radius_prior_mm: f64,
}

/// A flattened point with its arena address, produced by [`BranchTree::flatten`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct FlatPoint {
    pub branch: BranchId,
    pub index: usize,
    pub point: SkeletonPoint,
}

/// Arena of branches addressed by index.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct BranchTree {
    branches: Vec<Branch>,
    root: Option<BranchId>,
}

impl BranchTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    pub fn root(&self) -> Option<BranchId> {
        self.root
    }

    /// Number of branches ever inserted, including detached ones.
    pub fn len(&self) -> usize {
        self.branches.len()
    }

    pub fn get(&self, id: BranchId) -> Option<&Branch> {
        self.branches.get(id)
    }

    pub fn get_mut(&mut self, id: BranchId) -> Option<&mut Branch> {
        self.branches.get_mut(id)
    }

    /// Insert a branch; with `parent = None` the branch becomes the root.
    #[tracing::instrument(level = "trace", skip(self, points))]
    pub fn insert(
        &mut self,
        parent: Option<BranchId>,
        points: Vec<SkeletonPoint>,
        radius_prior_mm: f64,
    ) -> BranchId {
        let id = self.branches.len();
        self.branches.push(Branch {
            parent,
            children: Vec::new(),
            points,
            radius_prior_mm,
        });
        match parent {
            Some(p) => self.branches[p].children.push(id),
            None => self.root = Some(id),
        }
        id
    }

    /// Detach a branch from its parent; the record stays in the arena but
    /// is no longer reachable from the root.
    pub fn detach(&mut self, id: BranchId) {
        let Some(parent) = self.branches[id].parent.take() else {
            return;
        };
        self.branches[parent].children.retain(|&c| c != id);
    }

    /// Reachable branch ids in depth-first order (children visited in
    /// discovery order). The order is stable across runs.
    pub fn iter_depth_first(&self) -> Vec<BranchId> {
        let mut order = Vec::with_capacity(self.branches.len());
        let mut stack = Vec::new();
        if let Some(root) = self.root {
            stack.push(root);
        }
        while let Some(id) = stack.pop() {
            order.push(id);
            // Reversed push keeps children in discovery order on pop.
            for &c in self.branches[id].children.iter().rev() {
                stack.push(c);
            }
        }
        order
    }

    /// Reachable leaves (no children), depth-first order.
    pub fn leaves(&self) -> Vec<BranchId> {
        self.iter_depth_first()
            .into_iter()
            .filter(|&id| self.branches[id].children.is_empty())
            .collect()
    }

    /// All reachable points in stable depth-first order. The position in
    /// the returned vector is the point id used by the radius estimator
    /// and the result collections.
    pub fn flatten(&self) -> Vec<FlatPoint> {
        let mut flat = Vec::new();
        for id in self.iter_depth_first() {
            for (index, &point) in self.branches[id].points.iter().enumerate() {
                flat.push(FlatPoint {
                    branch: id,
                    index,
                    point,
                });
            }
        }
        flat
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pt(x: i32) -> SkeletonPoint {
        SkeletonPoint {
            voxel: Voxel::new(x, 0, 0),
            class: PointClass::Skeleton,
        }
    }

    #[test]
    fn insert_links_parent_and_children() {
        let mut t = BranchTree::new();
        let root = t.insert(None, vec![pt(0), pt(1)], 2.0);
        let a = t.insert(Some(root), vec![pt(2)], 2.0);
        let b = t.insert(Some(root), vec![pt(3)], 2.0);
        assert_eq!(t.root(), Some(root));
        assert_eq!(t.get(root).unwrap().children, vec![a, b]);
        assert_eq!(t.get(a).unwrap().parent, Some(root));
        assert_eq!(t.get(b).unwrap().parent, Some(root));
    }

    #[test]
    fn depth_first_order_is_stable() {
        let mut t = BranchTree::new();
        let root = t.insert(None, vec![pt(0)], 1.0);
        let a = t.insert(Some(root), vec![pt(1)], 1.0);
        let b = t.insert(Some(root), vec![pt(2)], 1.0);
        let a1 = t.insert(Some(a), vec![pt(3)], 1.0);
        assert_eq!(t.iter_depth_first(), vec![root, a, a1, b]);
        assert_eq!(t.leaves(), vec![a1, b]);
    }

    #[test]
    fn detach_makes_subtree_unreachable_but_keeps_storage() {
        let mut t = BranchTree::new();
        let root = t.insert(None, vec![pt(0)], 1.0);
        let a = t.insert(Some(root), vec![pt(1)], 1.0);
        let a1 = t.insert(Some(a), vec![pt(2)], 1.0);
        t.detach(a);
        assert_eq!(t.iter_depth_first(), vec![root]);
        assert_eq!(t.len(), 3);
        assert_eq!(t.get(a1).unwrap().parent, Some(a));
    }

    #[test]
    fn flatten_indices_follow_depth_first_order() {
        let mut t = BranchTree::new();
        let root = t.insert(None, vec![pt(0), pt(1)], 1.0);
        let a = t.insert(Some(root), vec![pt(2)], 1.0);
        let flat = t.flatten();
        assert_eq!(flat.len(), 3);
        assert_eq!(flat[0].branch, root);
        assert_eq!(flat[1].index, 1);
        assert_eq!(flat[2].branch, a);
        assert_eq!(flat[2].point.voxel, Voxel::new(2, 0, 0));
    }
}
