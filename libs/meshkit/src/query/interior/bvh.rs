//! Bounding-volume tree over owned triangle copies, pruned with ray slab
//! tests.

use crate::bounds::Bounds;
use config::constants::EPSILON;
use glam::DVec3;
use smallvec::SmallVec;

/// Tree node: either a leaf holding triangle ids or a split.
#[derive(Debug, Clone)]
pub(crate) enum BvhNode {
    Leaf {
        bbox: Bounds,
        triangles: SmallVec<[u32; 8]>,
    },
    Internal {
        bbox: Bounds,
        left: Box<BvhNode>,
        right: Box<BvhNode>,
    },
}

impl BvhNode {
    fn bbox(&self) -> &Bounds {
        match self {
            Self::Leaf { bbox, .. } | Self::Internal { bbox, .. } => bbox,
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct Bvh {
    triangles: Vec<[DVec3; 3]>,
    root: Option<BvhNode>,
}

/// Node counts, for logging and tests.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BvhStats {
    pub leaf_count: usize,
    pub internal_count: usize,
    pub max_depth: usize,
    pub triangle_count: usize,
}

impl Bvh {
    /// Builds the tree with a median split along the longest axis of each
    /// node's box.
    pub(crate) fn build(triangles: Vec<[DVec3; 3]>, max_leaf_size: usize) -> Self {
        if triangles.is_empty() {
            return Self {
                triangles,
                root: None,
            };
        }
        let boxes: Vec<Bounds> = triangles
            .iter()
            .map(|&[a, b, c]| Bounds::from_min_max(a.min(b).min(c), a.max(b).max(c)))
            .collect();
        let ids: Vec<u32> = (0..triangles.len() as u32).collect();
        let root = build_recursive(&boxes, ids, max_leaf_size.max(1));
        Self {
            triangles,
            root: Some(root),
        }
    }

    pub(crate) fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    /// Sum of signed crossings along the ray: +1 where the ray leaves through
    /// a face (normal along the ray), -1 where it enters.
    pub(crate) fn signed_crossings(&self, origin: DVec3, dir: DVec3) -> i32 {
        let Some(root) = &self.root else {
            return 0;
        };
        let inv_dir = dir.recip();
        let mut total = 0;
        let mut stack: Vec<&BvhNode> = vec![root];
        while let Some(node) = stack.pop() {
            if !ray_hits_box(origin, dir, inv_dir, node.bbox()) {
                continue;
            }
            match node {
                BvhNode::Leaf { triangles, .. } => {
                    for &id in triangles {
                        let [a, b, c] = self.triangles[id as usize];
                        total += crossing_sign(origin, dir, a, b, c);
                    }
                }
                BvhNode::Internal { left, right, .. } => {
                    stack.push(left);
                    stack.push(right);
                }
            }
        }
        total
    }

    pub(crate) fn stats(&self) -> BvhStats {
        let mut stats = BvhStats {
            triangle_count: self.triangles.len(),
            ..BvhStats::default()
        };
        if let Some(root) = &self.root {
            collect_stats(root, 0, &mut stats);
        }
        stats
    }
}

fn build_recursive(boxes: &[Bounds], mut ids: Vec<u32>, max_leaf_size: usize) -> BvhNode {
    let bbox = Bounds::combine(ids.iter().map(|&i| &boxes[i as usize])).unwrap_or_default();

    if ids.len() <= max_leaf_size {
        return BvhNode::Leaf {
            bbox,
            triangles: ids.into_iter().collect(),
        };
    }

    let axis = longest_axis(bbox.size());
    ids.sort_by(|&a, &b| {
        let ca = boxes[a as usize].center()[axis];
        let cb = boxes[b as usize].center()[axis];
        ca.total_cmp(&cb)
    });
    let right_ids = ids.split_off(ids.len() / 2);

    BvhNode::Internal {
        bbox,
        left: Box::new(build_recursive(boxes, ids, max_leaf_size)),
        right: Box::new(build_recursive(boxes, right_ids, max_leaf_size)),
    }
}

fn longest_axis(size: DVec3) -> usize {
    if size.x >= size.y && size.x >= size.z {
        0
    } else if size.y >= size.z {
        1
    } else {
        2
    }
}

fn collect_stats(node: &BvhNode, depth: usize, stats: &mut BvhStats) {
    stats.max_depth = stats.max_depth.max(depth);
    match node {
        BvhNode::Leaf { .. } => stats.leaf_count += 1,
        BvhNode::Internal { left, right, .. } => {
            stats.internal_count += 1;
            collect_stats(left, depth + 1, stats);
            collect_stats(right, depth + 1, stats);
        }
    }
}

/// Slab test for a ray starting at `origin` (t >= 0).
fn ray_hits_box(origin: DVec3, dir: DVec3, inv_dir: DVec3, bbox: &Bounds) -> bool {
    let (min, max) = (bbox.min(), bbox.max());
    let mut t_near = 0.0_f64;
    let mut t_far = f64::INFINITY;
    for axis in 0..3 {
        if dir[axis] == 0.0 {
            if origin[axis] < min[axis] || origin[axis] > max[axis] {
                return false;
            }
            continue;
        }
        let t0 = (min[axis] - origin[axis]) * inv_dir[axis];
        let t1 = (max[axis] - origin[axis]) * inv_dir[axis];
        t_near = t_near.max(t0.min(t1));
        t_far = t_far.min(t0.max(t1));
        if t_near > t_far {
            return false;
        }
    }
    true
}

/// Möller–Trumbore test returning the crossing's sign, or 0 for a miss.
fn crossing_sign(origin: DVec3, dir: DVec3, v0: DVec3, v1: DVec3, v2: DVec3) -> i32 {
    let edge1 = v1 - v0;
    let edge2 = v2 - v0;
    let h = dir.cross(edge2);
    let a = edge1.dot(h);
    // Parallel or degenerate, relative to the triangle's own scale.
    if a.abs() <= EPSILON * edge1.length() * edge2.length() {
        return 0;
    }
    let f = 1.0 / a;
    let s = origin - v0;
    let u = f * s.dot(h);
    if !(0.0..=1.0).contains(&u) {
        return 0;
    }
    let q = s.cross(edge1);
    let v = f * dir.dot(q);
    if v < 0.0 || u + v > 1.0 {
        return 0;
    }
    let t = f * edge2.dot(q);
    if t <= 0.0 {
        return 0;
    }
    // a = -dir . (edge1 x edge2)
    if a < 0.0 {
        1
    } else {
        -1
    }
}
