//! Skeleton-graph decomposition into an arena branch tree.
//!
//! Skeleton voxels are classified by 26-neighbor degree (1 endpoint,
//! 2 path interior, >=3 bifurcation). Maximal degree-2 chains between
//! nodes become segments of a junction graph; a maximum-total-length
//! spanning forest (Kruskal over descending segment length) keeps the
//! tree structure, so any segment rejected by union-find is the shortest
//! edge of the cycle it would close. Rejected segment interiors are
//! tagged `Removed`. The endpoint nearest the seed becomes the start;
//! disconnected components hang as siblings under a synthetic root.

use std::collections::{HashMap, HashSet, VecDeque};

use tracing::debug;

use crate::geom::{Spacing, Voxel};
use crate::tree::{BranchId, BranchTree, PointClass, SkeletonPoint};

/// Result of the skeletonization stage: thinned, decomposed, classified.
#[derive(Debug, Clone)]
pub struct DecomposeOutcome {
    /// Branch tree; empty for empty input.
    pub tree: BranchTree,
    /// Voxels removed to break residual cycles.
    pub cycle_voxels: Vec<Voxel>,
    /// Number of connected skeleton components.
    pub n_components: usize,
    pub n_cycles_broken: usize,
}

impl DecomposeOutcome {
    pub fn empty() -> Self {
        Self {
            tree: BranchTree::new(),
            cycle_voxels: Vec::new(),
            n_components: 0,
            n_cycles_broken: 0,
        }
    }
}

struct Segment {
    a: Voxel,
    b: Voxel,
    /// Inclusive chain from `a` to `b`.
    chain: Vec<Voxel>,
    len_mm: f64,
}

impl Segment {
    fn new(chain: Vec<Voxel>, spacing: Spacing) -> Self {
        let len_mm = chain
            .windows(2)
            .map(|w| (w[1].position_mm(spacing) - w[0].position_mm(spacing)).norm())
            .sum();
        Self {
            a: chain[0],
            b: *chain.last().expect("chain is never empty"),
            chain,
            len_mm,
        }
    }
}

struct UnionFind {
    parent: Vec<usize>,
}

impl UnionFind {
    fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
        }
    }

    fn find(&mut self, mut i: usize) -> usize {
        while self.parent[i] != i {
            self.parent[i] = self.parent[self.parent[i]];
            i = self.parent[i];
        }
        i
    }

    /// Returns false when both were already in the same set.
    fn union(&mut self, a: usize, b: usize) -> bool {
        let (ra, rb) = (self.find(a), self.find(b));
        if ra == rb {
            return false;
        }
        self.parent[ra] = rb;
        true
    }
}

/// Decompose a skeleton voxel set into a branch tree.
pub fn decompose(
    skeleton: &[Voxel],
    seed: Voxel,
    spacing: Spacing,
    priors: &HashMap<Voxel, f64>,
    fallback_prior_mm: f64,
) -> DecomposeOutcome {
    let set: HashSet<Voxel> = skeleton.iter().copied().collect();
    let mut vox: Vec<Voxel> = set.iter().copied().collect();
    vox.sort_unstable();
    if vox.is_empty() {
        return DecomposeOutcome::empty();
    }

    // Adjacency with sorted neighbor lists for deterministic walks.
    let adj: HashMap<Voxel, Vec<Voxel>> = vox
        .iter()
        .map(|&v| {
            let mut ns: Vec<Voxel> = v.neighbors26().filter(|n| set.contains(n)).collect();
            ns.sort_unstable();
            (v, ns)
        })
        .collect();

    // Nodes: endpoints (degree <= 1) and junctions (degree >= 3).
    let mut nodes: Vec<Voxel> = vox.iter().copied().filter(|v| adj[v].len() != 2).collect();

    let (mut segments, covered) = extract_segments(&nodes, &adj, spacing);
    anchor_pure_cycles(&vox, &adj, spacing, &mut nodes, &mut segments, covered);

    // Maximum-length spanning forest: drop the shortest edge of each cycle.
    let node_idx: HashMap<Voxel, usize> = nodes.iter().enumerate().map(|(i, &v)| (v, i)).collect();
    let mut order: Vec<usize> = (0..segments.len()).collect();
    order.sort_by(|&i, &j| {
        segments[j]
            .len_mm
            .partial_cmp(&segments[i].len_mm)
            .expect("segment lengths are finite")
            .then_with(|| segments[i].chain.cmp(&segments[j].chain))
    });
    let mut uf = UnionFind::new(nodes.len());
    let mut kept = vec![false; segments.len()];
    let mut cycle_voxels = Vec::new();
    let mut n_cycles_broken = 0usize;
    for i in order {
        let s = &segments[i];
        if uf.union(node_idx[&s.a], node_idx[&s.b]) {
            kept[i] = true;
        } else {
            n_cycles_broken += 1;
            cycle_voxels.extend_from_slice(&s.chain[1..s.chain.len() - 1]);
        }
    }

    let mut roots: Vec<usize> = nodes.iter().map(|&v| uf.find(node_idx[&v])).collect();
    roots.sort_unstable();
    roots.dedup();
    let n_components = roots.len();

    let start = pick_start(&nodes, &adj, seed, spacing);
    debug!(
        %start,
        n_components,
        n_cycles_broken,
        n_segments = segments.len(),
        "decomposed skeleton graph"
    );

    let tree = build_tree(
        &nodes,
        &adj,
        &segments,
        &kept,
        &mut uf,
        &node_idx,
        start,
        priors,
        fallback_prior_mm,
    );

    DecomposeOutcome {
        tree,
        cycle_voxels,
        n_components,
        n_cycles_broken,
    }
}

/// Walk maximal degree-2 chains out of every node. Returns the segments
/// and the set of voxels covered by them.
fn extract_segments(
    nodes: &[Voxel],
    adj: &HashMap<Voxel, Vec<Voxel>>,
    spacing: Spacing,
) -> (Vec<Segment>, HashSet<Voxel>) {
    let edge_key = |u: Voxel, v: Voxel| if u <= v { (u, v) } else { (v, u) };
    let mut segments = Vec::new();
    let mut visited: HashSet<(Voxel, Voxel)> = HashSet::new();
    let mut covered: HashSet<Voxel> = nodes.iter().copied().collect();

    for &n in nodes {
        for &nb in &adj[&n] {
            if visited.contains(&edge_key(n, nb)) {
                continue;
            }
            let mut chain = vec![n];
            let mut prev = n;
            let mut cur = nb;
            visited.insert(edge_key(prev, cur));
            loop {
                chain.push(cur);
                covered.insert(cur);
                if adj[&cur].len() != 2 {
                    break;
                }
                let next = adj[&cur]
                    .iter()
                    .copied()
                    .find(|&x| x != prev)
                    .expect("degree-2 voxel has a continuation");
                visited.insert(edge_key(cur, next));
                prev = cur;
                cur = next;
            }
            segments.push(Segment::new(chain, spacing));
        }
    }
    (segments, covered)
}

/// Components made entirely of degree-2 voxels are closed loops with no
/// node to anchor a walk. Promote their smallest voxel to a node and
/// record the loop as a self-segment; Kruskal then breaks it.
fn anchor_pure_cycles(
    vox: &[Voxel],
    adj: &HashMap<Voxel, Vec<Voxel>>,
    spacing: Spacing,
    nodes: &mut Vec<Voxel>,
    segments: &mut Vec<Segment>,
    mut covered: HashSet<Voxel>,
) {
    for &anchor in vox {
        if covered.contains(&anchor) {
            continue;
        }
        nodes.push(anchor);
        covered.insert(anchor);
        let mut chain = vec![anchor];
        let mut prev = anchor;
        let mut cur = adj[&anchor][0];
        while cur != anchor {
            chain.push(cur);
            covered.insert(cur);
            let next = adj[&cur]
                .iter()
                .copied()
                .find(|&x| x != prev)
                .expect("loop voxel has a continuation");
            prev = cur;
            cur = next;
        }
        chain.push(anchor);
        segments.push(Segment::new(chain, spacing));
    }
}

/// The endpoint nearest the seed; junction-only skeletons fall back to
/// the nearest node.
fn pick_start(
    nodes: &[Voxel],
    adj: &HashMap<Voxel, Vec<Voxel>>,
    seed: Voxel,
    spacing: Spacing,
) -> Voxel {
    let seed_mm = seed.position_mm(spacing);
    let dist = |v: Voxel| (v.position_mm(spacing) - seed_mm).norm();
    let endpoints: Vec<Voxel> = nodes
        .iter()
        .copied()
        .filter(|v| adj[v].len() <= 1)
        .collect();
    let candidates = if endpoints.is_empty() {
        nodes
    } else {
        &endpoints[..]
    };
    candidates
        .iter()
        .copied()
        .min_by(|&a, &b| {
            dist(a)
                .partial_cmp(&dist(b))
                .expect("distances are finite")
                .then_with(|| a.cmp(&b))
        })
        .expect("nodes is never empty here")
}

#[allow(clippy::too_many_arguments)]
fn build_tree(
    nodes: &[Voxel],
    adj: &HashMap<Voxel, Vec<Voxel>>,
    segments: &[Segment],
    kept: &[bool],
    uf: &mut UnionFind,
    node_idx: &HashMap<Voxel, usize>,
    start: Voxel,
    priors: &HashMap<Voxel, f64>,
    fallback_prior_mm: f64,
) -> BranchTree {
    let mut incident: HashMap<Voxel, Vec<usize>> = HashMap::new();
    for (i, s) in segments.iter().enumerate() {
        if !kept[i] {
            continue;
        }
        incident.entry(s.a).or_default().push(i);
        if s.b != s.a {
            incident.entry(s.b).or_default().push(i);
        }
    }
    // Deterministic child order: by the chain as seen from the node.
    for (v, list) in incident.iter_mut() {
        list.sort_by_key(|&i| {
            let s = &segments[i];
            if s.a == *v {
                s.chain.clone()
            } else {
                s.chain.iter().rev().copied().collect()
            }
        });
    }

    // Per-component root nodes: the start for its own component, the
    // seed-nearest endpoint (or smallest node) for the others.
    let start_root = uf.find(node_idx[&start]);
    let mut component_roots: Vec<(usize, Voxel)> = vec![(start_root, start)];
    let mut comp_root_of: HashMap<usize, Voxel> = HashMap::from([(start_root, start)]);
    for &v in nodes {
        let r = uf.find(node_idx[&v]);
        if !comp_root_of.contains_key(&r) {
            // First node of the component in `nodes` order; endpoints come
            // first among equals because nodes is degree-sorted by origin.
            let root = component_pick(nodes, adj, uf, node_idx, r);
            comp_root_of.insert(r, root);
            component_roots.push((r, root));
        }
    }

    let prior_of = |chain: &[Voxel]| {
        chain
            .iter()
            .map(|v| priors.get(v).copied().unwrap_or(fallback_prior_mm))
            .fold(0.0, f64::max)
    };
    let classify = |v: Voxel| {
        if v == start {
            PointClass::Start
        } else if adj[&v].len() >= 3 {
            PointClass::Bifurcation
        } else {
            PointClass::Skeleton
        }
    };

    let mut tree = BranchTree::new();
    let synthetic_root = if component_roots.len() > 1 {
        Some(tree.insert(None, Vec::new(), fallback_prior_mm))
    } else {
        None
    };

    let mut visited_seg = vec![false; segments.len()];
    let mut owner: HashMap<Voxel, BranchId> = HashMap::new();
    for &(_, root_node) in &component_roots {
        let mut queue = VecDeque::from([root_node]);
        let empty = Vec::new();
        // Isolated voxel: a single-point branch.
        if incident.get(&root_node).unwrap_or(&empty).is_empty() {
            let pts = vec![SkeletonPoint {
                voxel: root_node,
                class: classify(root_node),
            }];
            tree.insert(synthetic_root, pts, prior_of(&[root_node]));
            continue;
        }
        while let Some(a) = queue.pop_front() {
            for &si in incident.get(&a).unwrap_or(&empty) {
                if visited_seg[si] {
                    continue;
                }
                visited_seg[si] = true;
                let s = &segments[si];
                let chain: Vec<Voxel> = if s.a == a {
                    s.chain.clone()
                } else {
                    s.chain.iter().rev().copied().collect()
                };
                let b = *chain.last().expect("chain is never empty");
                let parent = owner.get(&a).copied().or(synthetic_root);
                // The junction voxel is owned by the branch that reached
                // it first; later branches start past it.
                let pts_vox: &[Voxel] = if owner.contains_key(&a) {
                    &chain[1..]
                } else {
                    &chain[..]
                };
                let points: Vec<SkeletonPoint> = pts_vox
                    .iter()
                    .map(|&v| SkeletonPoint {
                        voxel: v,
                        class: classify(v),
                    })
                    .collect();
                let id = tree.insert(parent, points, prior_of(&chain));
                owner.entry(a).or_insert(id);
                owner.entry(b).or_insert(id);
                queue.push_back(b);
            }
        }
    }
    tree
}

/// Representative root for a component without the start: its endpoint
/// with the smallest voxel, or failing that its smallest node.
fn component_pick(
    nodes: &[Voxel],
    adj: &HashMap<Voxel, Vec<Voxel>>,
    uf: &mut UnionFind,
    node_idx: &HashMap<Voxel, usize>,
    root: usize,
) -> Voxel {
    let members: Vec<Voxel> = nodes
        .iter()
        .copied()
        .filter(|&v| uf.find(node_idx[&v]) == root)
        .collect();
    members
        .iter()
        .copied()
        .filter(|v| adj[v].len() <= 1)
        .min()
        .or_else(|| members.iter().copied().min())
        .expect("component has at least one node")
}
