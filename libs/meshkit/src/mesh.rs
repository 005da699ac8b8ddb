//! # Mesh Buffer
//!
//! Plain, engine-independent triangle mesh data: positions, a flat index
//! list, and optional per-vertex attributes.

use crate::bounds::Bounds;
use crate::error::GeometryError;
use crate::transform::Transform;
use config::constants::{MAX_VERTICES, MIN_TRIANGLE_AREA};
use glam::{DVec2, DVec3};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Number of UV channels a buffer carries.
pub const UV_CHANNELS: usize = 4;

/// A triangle mesh with a flat index list.
///
/// Every three consecutive entries of `triangles` form one triangle; the
/// winding decides which side faces out. Attribute arrays are either empty
/// or hold exactly one entry per vertex.
///
/// # Example
///
/// ```rust
/// use meshkit::MeshBuffer;
/// use glam::DVec3;
///
/// let mesh = MeshBuffer::from_parts(
///     vec![DVec3::ZERO, DVec3::X, DVec3::Y],
///     vec![0, 1, 2],
/// );
/// assert_eq!(mesh.triangle_count(), 1);
/// assert!(mesh.validate().is_ok());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MeshBuffer {
    pub(crate) vertices: Vec<DVec3>,
    pub(crate) triangles: Vec<u32>,
    pub(crate) normals: Vec<DVec3>,
    pub(crate) uv: [Vec<DVec2>; UV_CHANNELS],
    pub(crate) colors: Vec<[f32; 4]>,
}

impl MeshBuffer {
    /// Creates an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a buffer from positions and a flat index list.
    pub fn from_parts(vertices: Vec<DVec3>, triangles: Vec<u32>) -> Self {
        Self {
            vertices,
            triangles,
            ..Self::default()
        }
    }

    /// Creates an empty buffer with pre-allocated capacity.
    pub fn with_capacity(vertex_count: usize, triangle_count: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(vertex_count),
            triangles: Vec::with_capacity(triangle_count * 3),
            ..Self::default()
        }
    }

    /// Sets per-vertex normals.
    #[must_use]
    pub fn with_normals(mut self, normals: Vec<DVec3>) -> Self {
        self.normals = normals;
        self
    }

    /// Sets per-vertex colors (RGBA).
    #[must_use]
    pub fn with_colors(mut self, colors: Vec<[f32; 4]>) -> Self {
        self.colors = colors;
        self
    }

    /// Sets one UV channel. Channels past the last one are ignored.
    #[must_use]
    pub fn with_uv(mut self, channel: usize, coords: Vec<DVec2>) -> Self {
        if let Some(slot) = self.uv.get_mut(channel) {
            *slot = coords;
        }
        self
    }

    #[inline]
    pub fn vertices(&self) -> &[DVec3] {
        &self.vertices
    }

    /// Flat triangle index list.
    #[inline]
    pub fn triangles(&self) -> &[u32] {
        &self.triangles
    }

    #[inline]
    pub fn normals(&self) -> &[DVec3] {
        &self.normals
    }

    #[inline]
    pub fn colors(&self) -> &[[f32; 4]] {
        &self.colors
    }

    /// One UV channel; empty for an unknown channel.
    pub fn uv(&self, channel: usize) -> &[DVec2] {
        self.uv.get(channel).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Returns the number of vertices.
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Returns the number of complete triangles.
    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.triangles.len() / 3
    }

    /// Returns true if the mesh has no vertices.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Index triple of triangle `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= triangle_count()`.
    #[inline]
    pub fn triangle(&self, index: usize) -> [u32; 3] {
        let base = index * 3;
        [self.triangles[base], self.triangles[base + 1], self.triangles[base + 2]]
    }

    /// Corner positions of triangle `index`.
    ///
    /// # Panics
    ///
    /// Panics if the triangle or one of its indices is out of range.
    pub fn triangle_positions(&self, index: usize) -> [DVec3; 3] {
        let [a, b, c] = self.triangle(index);
        [
            self.vertices[a as usize],
            self.vertices[b as usize],
            self.vertices[c as usize],
        ]
    }

    /// Corner positions for an index triple, `None` if any index is out of
    /// range.
    pub(crate) fn corners(&self, [a, b, c]: [u32; 3]) -> Option<[DVec3; 3]> {
        Some([
            *self.vertices.get(a as usize)?,
            *self.vertices.get(b as usize)?,
            *self.vertices.get(c as usize)?,
        ])
    }

    /// Iterates over complete index triples. A trailing partial group is
    /// skipped.
    pub fn triangles_iter(&self) -> impl Iterator<Item = [u32; 3]> + '_ {
        self.triangles.chunks_exact(3).map(|t| [t[0], t[1], t[2]])
    }

    /// Bounds of all vertex positions, `None` for an empty buffer.
    pub fn bounds(&self) -> Option<Bounds> {
        Bounds::from_points(self.vertices.iter().copied())
    }

    /// Checks index and attribute consistency.
    ///
    /// Fails when:
    /// - the index list is not a multiple of three
    /// - an index points past the vertex array
    /// - an attribute array is neither empty nor one-per-vertex
    /// - the vertex count is over [`MAX_VERTICES`]
    pub fn validate(&self) -> Result<(), GeometryError> {
        let count = self.vertices.len();
        if count > MAX_VERTICES {
            return Err(GeometryError::capacity(count, MAX_VERTICES));
        }
        if self.triangles.len() % 3 != 0 {
            return Err(GeometryError::invalid_mesh(format!(
                "index count {} is not a multiple of 3",
                self.triangles.len()
            )));
        }
        if let Some(bad) = self.triangles.iter().find(|&&i| i as usize >= count) {
            return Err(GeometryError::invalid_mesh(format!(
                "index {bad} out of range for {count} vertices"
            )));
        }
        check_attribute("normals", self.normals.len(), count)?;
        check_attribute("colors", self.colors.len(), count)?;
        for (channel, coords) in self.uv.iter().enumerate() {
            check_attribute(&format!("uv{channel}"), coords.len(), count)?;
        }
        Ok(())
    }

    /// Recomputes area-weighted vertex normals from the faces.
    ///
    /// Vertices not referenced by any non-degenerate face get a zero normal.
    pub fn compute_normals(&mut self) {
        let mut normals = vec![DVec3::ZERO; self.vertices.len()];
        for [a, b, c] in self.triangles_iter() {
            let (ia, ib, ic) = (a as usize, b as usize, c as usize);
            if ia >= normals.len() || ib >= normals.len() || ic >= normals.len() {
                continue;
            }
            // Unnormalized cross product weights each face by its area.
            let face = (self.vertices[ib] - self.vertices[ia])
                .cross(self.vertices[ic] - self.vertices[ia]);
            normals[ia] += face;
            normals[ib] += face;
            normals[ic] += face;
        }
        for normal in &mut normals {
            *normal = normal.normalize_or_zero();
        }
        self.normals = normals;
    }

    /// Recomputes normals when they do not match the vertex count.
    ///
    /// Returns true if a recompute happened.
    pub fn ensure_normals(&mut self) -> bool {
        if self.normals.len() == self.vertices.len() {
            return false;
        }
        warn!(
            normals = self.normals.len(),
            vertices = self.vertices.len(),
            "normal count does not match vertex count, recomputing"
        );
        self.compute_normals();
        true
    }

    /// Appends `src` transformed by a TRS frame. See
    /// [`ops::merge::append`](crate::ops::merge::append).
    pub fn append(&mut self, src: &MeshBuffer, transform: &Transform) -> Result<(), GeometryError> {
        crate::ops::merge::append_transformed(self, src, transform)
    }

    /// Exports the index list in the 16-bit format.
    pub fn indices_u16(&self) -> Result<Vec<u16>, GeometryError> {
        if self.vertices.len() > MAX_VERTICES {
            return Err(GeometryError::capacity(self.vertices.len(), MAX_VERTICES));
        }
        self.triangles
            .iter()
            .map(|&i| {
                u16::try_from(i).map_err(|_| {
                    GeometryError::invalid_mesh(format!("index {i} does not fit in 16 bits"))
                })
            })
            .collect()
    }

    /// Exports vertices as a flattened `[x, y, z, ...]` f32 array.
    pub fn vertices_f32(&self) -> Vec<f32> {
        self.vertices
            .iter()
            .flat_map(|v| [v.x as f32, v.y as f32, v.z as f32])
            .collect()
    }
}

fn check_attribute(name: &str, len: usize, vertex_count: usize) -> Result<(), GeometryError> {
    if len == 0 || len == vertex_count {
        Ok(())
    } else {
        Err(GeometryError::invalid_mesh(format!(
            "{name} has {len} entries for {vertex_count} vertices"
        )))
    }
}

// =============================================================================
// TRIANGLE HELPERS
// =============================================================================

/// Centroid of a triangle.
#[inline]
pub fn triangle_center(a: DVec3, b: DVec3, c: DVec3) -> DVec3 {
    (a + b + c) / 3.0
}

/// Unit normal following the winding `a -> b -> c`, or `None` when the
/// triangle has (near) zero area.
pub fn triangle_normal(a: DVec3, b: DVec3, c: DVec3) -> Option<DVec3> {
    let cross = (b - a).cross(c - a);
    if cross.length() * 0.5 <= MIN_TRIANGLE_AREA {
        None
    } else {
        Some(cross.normalize())
    }
}

#[inline]
pub fn triangle_area(a: DVec3, b: DVec3, c: DVec3) -> f64 {
    (b - a).cross(c - a).length() * 0.5
}
