//! # Interior Queries
//!
//! Point-in-mesh classification backed by a bounding-volume tree.
//!
//! ## Method
//!
//! Three rays leave the query point along fixed, slightly skewed
//! directions. Each ray sums signed crossings (+1 leaving a face, -1
//! entering one) and votes "inside" when the sum is non-zero. The majority
//! of the three votes decides, so a single ray grazing an edge or vertex
//! does not flip the answer.
//!
//! Building the tree is the expensive part; keep an [`InteriorQuery`]
//! around when testing many points against the same mesh.

mod bvh;

pub use bvh::BvhStats;

use crate::mesh::MeshBuffer;
use bvh::Bvh;
use config::constants::{GeometryConfig, BVH_MAX_LEAF_SIZE};
use glam::DVec3;
use rayon::prelude::*;
use tracing::debug;

/// Skewed so that rays from grid-aligned points avoid shared edges.
const RAY_DIRECTIONS: [DVec3; 3] = [
    DVec3::new(1.0, 0.021_3, 0.037_1),
    DVec3::new(-0.017_9, 1.0, 0.029_3),
    DVec3::new(0.031_3, -0.023_7, 1.0),
];

/// Reusable containment query over one mesh.
///
/// Holds owned copies of the mesh's triangles, so the mesh may change or
/// drop after construction.
///
/// # Example
///
/// ```rust
/// use meshkit::{query::InteriorQuery, MeshBuffer};
/// use glam::DVec3;
///
/// // Tetrahedron with outward winding.
/// let mesh = MeshBuffer::from_parts(
///     vec![DVec3::ZERO, DVec3::X, DVec3::Y, DVec3::Z],
///     vec![0, 2, 1, 0, 1, 3, 0, 3, 2, 1, 2, 3],
/// );
/// let query = InteriorQuery::new(&mesh);
/// assert!(query.contains(DVec3::splat(0.1)));
/// assert!(!query.contains(DVec3::splat(1.0)));
/// ```
#[derive(Debug, Clone)]
pub struct InteriorQuery {
    bvh: Bvh,
}

impl InteriorQuery {
    /// Builds the tree with the default leaf size.
    pub fn new(mesh: &MeshBuffer) -> Self {
        Self::with_leaf_size(mesh, BVH_MAX_LEAF_SIZE)
    }

    /// Builds the tree with `config.bvh_leaf_size`.
    pub fn with_config(mesh: &MeshBuffer, config: &GeometryConfig) -> Self {
        Self::with_leaf_size(mesh, config.bvh_leaf_size)
    }

    fn with_leaf_size(mesh: &MeshBuffer, leaf_size: usize) -> Self {
        // Triangles with out-of-range indices have no geometry to test.
        let triangles: Vec<[DVec3; 3]> = mesh
            .triangles_iter()
            .filter_map(|tri| mesh.corners(tri))
            .collect();
        let bvh = Bvh::build(triangles, leaf_size);
        let stats = bvh.stats();
        debug!(
            triangles = stats.triangle_count,
            leaves = stats.leaf_count,
            internal = stats.internal_count,
            depth = stats.max_depth,
            "built interior query tree"
        );
        Self { bvh }
    }

    /// Number of triangles in the tree.
    pub fn triangle_count(&self) -> usize {
        self.bvh.triangle_count()
    }

    pub fn stats(&self) -> BvhStats {
        self.bvh.stats()
    }

    /// True if `point` (in the mesh's local frame) is inside the mesh.
    /// Always false for a mesh without triangles.
    pub fn contains(&self, point: DVec3) -> bool {
        if self.bvh.triangle_count() == 0 || !point.is_finite() {
            return false;
        }
        let votes = RAY_DIRECTIONS
            .iter()
            .filter(|dir| self.bvh.signed_crossings(point, dir.normalize()) != 0)
            .count();
        votes >= 2
    }

    /// Runs [`contains`](Self::contains) for every point in parallel.
    pub fn contains_all(&self, points: &[DVec3]) -> Vec<bool> {
        points.par_iter().map(|&p| self.contains(p)).collect()
    }
}

/// One-shot containment test. Builds and discards the tree; prefer
/// [`InteriorQuery`] for repeated queries.
pub fn is_point_inside(mesh: &MeshBuffer, point: DVec3) -> bool {
    InteriorQuery::new(mesh).contains(point)
}
