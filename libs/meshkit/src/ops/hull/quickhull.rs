//! # QuickHull Algorithm
//!
//! 3D convex hull computation using the QuickHull algorithm.
//! Based on the original algorithm by Barber, Dobkin, and Huhdanpaa.
//!
//! ## Algorithm Steps
//!
//! 1. Drop points within tolerance of an earlier point
//! 2. Build an initial tetrahedron from extreme points
//! 3. Assign remaining points to the face they are farthest outside of
//! 4. For each face with outside points:
//!    a. Take the farthest point (the eye)
//!    b. Collect faces the eye sees and their horizon edges
//!    c. Replace the visible faces with a fan from the horizon to the eye
//!    d. Reassign orphaned outside points to the new faces
//! 5. Repeat until no face has outside points
//!
//! Every face is oriented away from the tetrahedron's centroid, which stays
//! strictly inside the hull as it grows.

use super::HullResult;
use crate::mesh::MeshBuffer;
use config::constants::DEFAULT_PLANE_DISTANCE_TOLERANCE;
use glam::DVec3;
use std::collections::HashMap;
use tracing::debug;

/// Multiple of the tolerance a point may sit outside the finished hull
/// before the result counts as a numerical failure.
const FINAL_CHECK_FACTOR: f64 = 10.0;

/// Relative rounding slack at the scale of the point cloud.
const SCALE_EPSILON: f64 = 1e-12;

/// Builds the convex hull of `points`.
///
/// `tolerance` is the plane distance under which a point counts as lying on
/// a face; a non-positive or non-finite value selects
/// [`DEFAULT_PLANE_DISTANCE_TOLERANCE`].
///
/// Output vertices are the hull points only, in input order, and every
/// triangle winds outward.
///
/// # Example
///
/// ```rust
/// use meshkit::ops::hull::{build_hull, HullOutcome};
/// use glam::DVec3;
///
/// let points = [DVec3::ZERO, DVec3::X, DVec3::Y, DVec3::Z, DVec3::splat(0.1)];
/// let hull = build_hull(&points, 1e-9);
/// assert_eq!(hull.outcome(), HullOutcome::Success);
/// assert_eq!(hull.mesh().map(|m| m.vertex_count()), Some(4));
/// ```
pub fn build_hull(points: &[DVec3], tolerance: f64) -> HullResult {
    let tolerance = if tolerance.is_finite() && tolerance > 0.0 {
        tolerance
    } else {
        DEFAULT_PLANE_DISTANCE_TOLERANCE
    };

    if points.iter().any(|p| !p.is_finite()) {
        debug!("hull input contains non-finite coordinates");
        return HullResult::NumericalFailure { tolerance };
    }

    let candidates = remove_duplicates(points, tolerance);
    if candidates.len() < 4 {
        return HullResult::degenerate(format!(
            "convex hull requires at least 4 unique points, got {}",
            candidates.len()
        ));
    }

    let simplex = match initial_simplex(points, &candidates, tolerance) {
        Ok(simplex) => simplex,
        Err(reason) => return HullResult::degenerate(reason),
    };

    let mut hull = Hull::new(points, simplex, tolerance);
    for &idx in &candidates {
        if !simplex.contains(&idx) {
            hull.assign(idx, 0..hull.faces.len());
        }
    }

    let max_iterations = candidates.len() + 1;
    let mut iterations = 0;
    while let Some(face_id) = hull.next_face_with_outside() {
        iterations += 1;
        if iterations > max_iterations {
            debug!(iterations, "hull iteration cap reached");
            return HullResult::NumericalFailure { tolerance };
        }
        hull.add_point(face_id);
    }

    if !hull.encloses(&candidates) {
        return HullResult::NumericalFailure { tolerance };
    }

    let mesh = hull.to_mesh();
    debug!(
        input = points.len(),
        unique = candidates.len(),
        vertices = mesh.vertex_count(),
        triangles = mesh.triangle_count(),
        iterations,
        "built convex hull"
    );
    HullResult::Success(mesh)
}

/// A face of the hull (triangle).
#[derive(Debug, Clone)]
struct HullFace {
    /// Indices into the input points
    vertices: [usize; 3],
    /// Outward-pointing unit normal (zero for a sliver)
    normal: DVec3,
    /// Distance from origin along normal
    offset: f64,
    /// Points outside this face
    outside: Vec<usize>,
    alive: bool,
}

impl HullFace {
    /// Creates a face wound so that `interior` is behind it.
    fn oriented(v: [usize; 3], points: &[DVec3], interior: DVec3) -> Self {
        let [a, b, c] = v.map(|i| points[i]);
        let mut normal = (b - a).cross(c - a).normalize_or_zero();
        let mut vertices = v;
        if normal.dot(interior - a) > 0.0 {
            normal = -normal;
            vertices = [v[0], v[2], v[1]];
        }
        Self {
            vertices,
            normal,
            offset: normal.dot(a),
            outside: Vec::new(),
            alive: true,
        }
    }

    #[inline]
    fn distance(&self, point: DVec3) -> f64 {
        self.normal.dot(point) - self.offset
    }

    fn edges(&self) -> [(usize, usize); 3] {
        let [a, b, c] = self.vertices;
        [(a, b), (b, c), (c, a)]
    }
}

struct Hull<'a> {
    points: &'a [DVec3],
    faces: Vec<HullFace>,
    interior: DVec3,
    tolerance: f64,
}

impl<'a> Hull<'a> {
    fn new(points: &'a [DVec3], [p0, p1, p2, p3]: [usize; 4], tolerance: f64) -> Self {
        let interior = (points[p0] + points[p1] + points[p2] + points[p3]) / 4.0;
        let faces = [[p0, p1, p2], [p0, p2, p3], [p0, p3, p1], [p1, p3, p2]]
            .into_iter()
            .map(|v| HullFace::oriented(v, points, interior))
            .collect();
        Self {
            points,
            faces,
            interior,
            tolerance,
        }
    }

    /// Gives `idx` to the face among `range` it is farthest outside of, or
    /// drops it when it is inside or on all of them.
    fn assign(&mut self, idx: usize, range: std::ops::Range<usize>) {
        let point = self.points[idx];
        let mut best: Option<(usize, f64)> = None;
        for id in range {
            let face = &self.faces[id];
            if !face.alive {
                continue;
            }
            let d = face.distance(point);
            if d > self.tolerance && best.map_or(true, |(_, bd)| d > bd) {
                best = Some((id, d));
            }
        }
        if let Some((id, _)) = best {
            self.faces[id].outside.push(idx);
        }
    }

    fn next_face_with_outside(&self) -> Option<usize> {
        self.faces
            .iter()
            .position(|f| f.alive && !f.outside.is_empty())
    }

    fn add_point(&mut self, face_id: usize) {
        // Ties go to the earliest assigned point.
        let face = &self.faces[face_id];
        let Some(eye) = face
            .outside
            .iter()
            .map(|&i| (i, face.distance(self.points[i])))
            .reduce(|best, cur| if cur.1 > best.1 { cur } else { best })
            .map(|(i, _)| i)
        else {
            return;
        };
        let eye_point = self.points[eye];

        let visible: Vec<usize> = self
            .faces
            .iter()
            .enumerate()
            .filter(|(_, f)| f.alive && f.distance(eye_point) > self.tolerance)
            .map(|(i, _)| i)
            .collect();

        let horizon = self.horizon(&visible);

        let mut orphans = Vec::new();
        for &id in &visible {
            let face = &mut self.faces[id];
            face.alive = false;
            orphans.append(&mut face.outside);
        }
        orphans.retain(|&p| p != eye);

        let first_new = self.faces.len();
        for (a, b) in horizon {
            let face = HullFace::oriented([a, b, eye], self.points, self.interior);
            self.faces.push(face);
        }
        let new_faces = first_new..self.faces.len();
        for idx in orphans {
            self.assign(idx, new_faces.clone());
        }
    }

    /// Edges of the visible region that border a face staying on the hull.
    fn horizon(&self, visible: &[usize]) -> Vec<(usize, usize)> {
        let mut edge_count: HashMap<(usize, usize), usize> = HashMap::new();
        for &id in visible {
            for (a, b) in self.faces[id].edges() {
                *edge_count.entry(edge_key(a, b)).or_insert(0) += 1;
            }
        }
        visible
            .iter()
            .flat_map(|&id| self.faces[id].edges())
            .filter(|&(a, b)| edge_count.get(&edge_key(a, b)) == Some(&1))
            .collect()
    }

    /// True when no candidate lies meaningfully outside any face.
    fn encloses(&self, candidates: &[usize]) -> bool {
        let scale = candidates
            .iter()
            .map(|&i| self.points[i].abs().max_element())
            .fold(0.0_f64, f64::max);
        let slack = self.tolerance * FINAL_CHECK_FACTOR + scale * SCALE_EPSILON;
        let live = || self.faces.iter().filter(|f| f.alive);
        let worst = candidates
            .iter()
            .flat_map(|&i| live().map(move |f| f.distance(self.points[i])))
            .fold(f64::NEG_INFINITY, f64::max);
        if worst > slack {
            debug!(worst, slack, "point left outside finished hull");
            false
        } else {
            true
        }
    }

    /// Hull points in input order, faces remapped onto them.
    fn to_mesh(&self) -> MeshBuffer {
        let live: Vec<&HullFace> = self.faces.iter().filter(|f| f.alive).collect();
        let mut used: Vec<usize> = live.iter().flat_map(|f| f.vertices).collect();
        used.sort_unstable();
        used.dedup();

        let remap: HashMap<usize, u32> = used
            .iter()
            .enumerate()
            .map(|(new, &old)| (old, new as u32))
            .collect();
        let vertices = used.iter().map(|&i| self.points[i]).collect();
        let triangles = live
            .iter()
            .flat_map(|f| f.vertices.map(|v| remap[&v]))
            .collect();
        MeshBuffer::from_parts(vertices, triangles)
    }
}

fn edge_key(a: usize, b: usize) -> (usize, usize) {
    if a < b {
        (a, b)
    } else {
        (b, a)
    }
}

/// Indices of points not within `tolerance` of an earlier kept point.
fn remove_duplicates(points: &[DVec3], tolerance: f64) -> Vec<usize> {
    let mut unique: Vec<usize> = Vec::with_capacity(points.len());
    for (i, p) in points.iter().enumerate() {
        if !unique.iter().any(|&u| points[u].distance(*p) <= tolerance) {
            unique.push(i);
        }
    }
    unique
}

/// Picks four well-spread, non-coplanar points.
fn initial_simplex(points: &[DVec3], candidates: &[usize], tolerance: f64) -> Result<[usize; 4], String> {
    // Extreme points on each axis
    let mut extremes = [candidates[0]; 6];
    for &i in candidates {
        let p = points[i];
        for axis in 0..3 {
            if p[axis] < points[extremes[axis * 2]][axis] {
                extremes[axis * 2] = i;
            }
            if p[axis] > points[extremes[axis * 2 + 1]][axis] {
                extremes[axis * 2 + 1] = i;
            }
        }
    }

    let mut best = (extremes[0], extremes[1], 0.0);
    for (n, &a) in extremes.iter().enumerate() {
        for &b in &extremes[n + 1..] {
            let d = points[a].distance_squared(points[b]);
            if d > best.2 {
                best = (a, b, d);
            }
        }
    }
    let (p0, p1, span) = best;
    if span.sqrt() <= tolerance {
        return Err("all points are coincident".to_string());
    }

    let dir = (points[p1] - points[p0]).normalize();
    let (p2, line_dist) = farthest(candidates, |p| {
        let v = p - points[p0];
        (v - v.dot(dir) * dir).length()
    }, points);
    if line_dist <= tolerance {
        return Err("all points are collinear".to_string());
    }

    let normal = (points[p1] - points[p0])
        .cross(points[p2] - points[p0])
        .normalize();
    let (p3, plane_dist) = farthest(candidates, |p| normal.dot(p - points[p0]).abs(), points);
    if plane_dist <= tolerance {
        return Err("all points are coplanar".to_string());
    }

    Ok([p0, p1, p2, p3])
}

fn farthest(candidates: &[usize], measure: impl Fn(DVec3) -> f64, points: &[DVec3]) -> (usize, f64) {
    candidates
        .iter()
        .map(|&i| (i, measure(points[i])))
        .fold((candidates[0], f64::NEG_INFINITY), |best, cur| {
            if cur.1 > best.1 {
                cur
            } else {
                best
            }
        })
}
