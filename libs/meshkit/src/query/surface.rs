//! # Surface Queries
//!
//! Brute-force point-versus-surface predicates in the mesh's local frame.
//! Callers move the query point into that frame first, e.g. with
//! [`Transform::inverse_transform_point`](crate::Transform::inverse_transform_point).

use crate::bounds::Bounds;
use crate::mesh::{triangle_center, MeshBuffer};
use config::constants::{GeometryConfig, MIN_SURFACE_RANGE, SURFACE_PLANE_TOLERANCE};
use glam::DVec3;

/// Coarse surface-adjacency check.
///
/// Builds a cube of half-size `range` (clamped to at least
/// [`MIN_SURFACE_RANGE`]; NaN counts as the minimum) around `point` and
/// reports true if it contains any triangle's corner or centroid.
///
/// Accuracy depends on triangle size: with large ranges the cube reaches
/// unrelated triangles and the result is a false positive. Use
/// [`is_point_on_surface`] when exactness matters.
pub fn is_point_near_surface(mesh: &MeshBuffer, point: DVec3, range: f64) -> bool {
    let half = if range.is_nan() {
        MIN_SURFACE_RANGE
    } else {
        range.max(MIN_SURFACE_RANGE)
    };
    let probe = Bounds::from_center_extents(point, DVec3::splat(half));

    mesh.triangles_iter()
        .filter_map(|tri| mesh.corners(tri))
        .any(|[a, b, c]| {
            probe.contains(a)
                || probe.contains(b)
                || probe.contains(c)
                || probe.contains(triangle_center(a, b, c))
        })
}

/// Exact surface membership with the default plane tolerance.
///
/// # Example
///
/// ```rust
/// use meshkit::{query::is_point_on_surface, MeshBuffer};
/// use glam::DVec3;
///
/// let tri = MeshBuffer::from_parts(vec![DVec3::ZERO, DVec3::X, DVec3::Y], vec![0, 1, 2]);
/// assert!(is_point_on_surface(&tri, DVec3::new(0.25, 0.25, 0.0)));
/// assert!(!is_point_on_surface(&tri, DVec3::new(0.25, 0.25, 1.0)));
/// ```
pub fn is_point_on_surface(mesh: &MeshBuffer, point: DVec3) -> bool {
    on_surface(mesh, point, SURFACE_PLANE_TOLERANCE)
}

/// [`is_point_on_surface`] using `config.surface_tolerance`.
pub fn is_point_on_surface_with(mesh: &MeshBuffer, point: DVec3, config: &GeometryConfig) -> bool {
    on_surface(mesh, point, config.surface_tolerance)
}

fn on_surface(mesh: &MeshBuffer, point: DVec3, tolerance: f64) -> bool {
    mesh.triangles_iter()
        .filter_map(|tri| mesh.corners(tri))
        .any(|[a, b, c]| point_in_triangle(a, b, c, point, tolerance))
}

/// True when `p` is inside triangle `abc` (edges inclusive) and no farther
/// than `tolerance` from its plane. Triangles with collinear corners never
/// match; small triangles are judged like any other.
pub fn point_in_triangle(a: DVec3, b: DVec3, c: DVec3, p: DVec3, tolerance: f64) -> bool {
    let cross = (b - a).cross(c - a);
    if cross == DVec3::ZERO {
        return false;
    }
    let normal = cross.normalize();
    let inside = same_side(p, a, b, c) && same_side(p, b, a, c) && same_side(p, c, a, b);
    inside && normal.dot(p - a).abs() <= tolerance
}

/// `p1` and `p2` lie on the same side of the line through `a` and `b`.
fn same_side(p1: DVec3, p2: DVec3, a: DVec3, b: DVec3) -> bool {
    let edge = b - a;
    let cp1 = edge.cross(p1 - a);
    let cp2 = edge.cross(p2 - a);
    cp1.dot(cp2) >= 0.0
}
