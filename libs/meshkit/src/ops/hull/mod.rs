//! # Convex Hull
//!
//! QuickHull algorithm for computing 3D convex hulls.
//!
//! ## Algorithm Overview
//!
//! QuickHull is a divide-and-conquer algorithm:
//! 1. Find extreme points to form initial simplex (tetrahedron)
//! 2. For each face, find the farthest point outside
//! 3. Create new faces from that point to the horizon edges
//! 4. Repeat until no points remain outside
//!
//! Points within the plane-distance tolerance of a face count as lying on
//! it: they never become hull vertices, so near-coplanar faces merge.

mod quickhull;


pub use quickhull::build_hull;

use crate::error::GeometryError;
use crate::mesh::MeshBuffer;
use config::constants::{GeometryConfig, DEFAULT_PLANE_DISTANCE_TOLERANCE};
use glam::DVec3;

/// Outcome of a hull build.
#[derive(Debug, Clone, PartialEq)]
pub enum HullResult {
    /// The hull, with outward winding.
    Success(MeshBuffer),
    /// Too few distinct points, or all of them collinear or coplanar.
    DegenerateInput { reason: String },
    /// Non-finite input, or the finished hull left a point outside by more
    /// than the tolerance allows.
    NumericalFailure { tolerance: f64 },
}

/// Tag of a [`HullResult`] without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HullOutcome {
    Success,
    DegenerateInput,
    NumericalFailure,
}

impl HullResult {
    pub(crate) fn degenerate(reason: impl Into<String>) -> Self {
        Self::DegenerateInput {
            reason: reason.into(),
        }
    }

    pub fn outcome(&self) -> HullOutcome {
        match self {
            Self::Success(_) => HullOutcome::Success,
            Self::DegenerateInput { .. } => HullOutcome::DegenerateInput,
            Self::NumericalFailure { .. } => HullOutcome::NumericalFailure,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// The hull mesh on success.
    pub fn mesh(&self) -> Option<&MeshBuffer> {
        match self {
            Self::Success(mesh) => Some(mesh),
            _ => None,
        }
    }

    /// Converts into a `Result`, mapping failures onto [`GeometryError`].
    pub fn into_result(self) -> Result<MeshBuffer, GeometryError> {
        match self {
            Self::Success(mesh) => Ok(mesh),
            Self::DegenerateInput { reason } => Err(GeometryError::degenerate(reason)),
            Self::NumericalFailure { tolerance } => Err(GeometryError::numerical(format!(
                "convex hull exceeded plane tolerance {tolerance:e}"
            ))),
        }
    }
}

/// Hull with the default tolerance.
///
/// # Example
///
/// ```rust
/// use meshkit::ops::hull::convex_hull;
/// use glam::DVec3;
///
/// let points = vec![
///     DVec3::new(0.0, 0.0, 0.0),
///     DVec3::new(1.0, 0.0, 0.0),
///     DVec3::new(0.0, 1.0, 0.0),
///     DVec3::new(0.0, 0.0, 1.0),
/// ];
/// let hull = convex_hull(&points)?;
/// assert_eq!(hull.triangle_count(), 4);
/// # Ok::<(), meshkit::GeometryError>(())
/// ```
pub fn convex_hull(points: &[DVec3]) -> Result<MeshBuffer, GeometryError> {
    build_hull(points, DEFAULT_PLANE_DISTANCE_TOLERANCE).into_result()
}

/// Hull with `config.plane_distance_tolerance`.
pub fn build_hull_with(points: &[DVec3], config: &GeometryConfig) -> HullResult {
    build_hull(points, config.plane_distance_tolerance)
}

/// Hull of the vertices of one or more meshes, with the default tolerance.
pub fn hull_of_meshes(meshes: &[&MeshBuffer]) -> HullResult {
    let points: Vec<DVec3> = meshes
        .iter()
        .flat_map(|m| m.vertices().iter().copied())
        .collect();
    build_hull(&points, DEFAULT_PLANE_DISTANCE_TOLERANCE)
}
