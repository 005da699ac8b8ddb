//! # Mesh Merging
//!
//! Appends one buffer into another under a TRS transform, refusing any merge
//! that would push the destination to the 16-bit vertex ceiling.
//!
//! ## Attribute handling
//!
//! Attributes stay one-per-vertex after a merge. When only one side carries
//! an attribute the other side is padded: colors with [`DEFAULT_COLOR`],
//! normals and UVs with zeros.

use crate::error::GeometryError;
use crate::mesh::MeshBuffer;
use crate::transform::{is_valid_rotation, sanitize_rotation, Transform};
use config::constants::{DEFAULT_COLOR, MAX_VERTICES};
use glam::{DQuat, DVec2, DVec3};
use rayon::prelude::*;
use tracing::{debug, warn};

/// Appends `src` into `dst`, transformed by translation, rotation and scale.
///
/// On refusal `dst` is left untouched.
///
/// # Errors
///
/// [`GeometryError::CapacityExceeded`] when the combined vertex count
/// reaches [`MAX_VERTICES`].
///
/// # Example
///
/// ```rust
/// use meshkit::{ops::merge::append, MeshBuffer};
/// use glam::{DQuat, DVec3};
///
/// let tri = MeshBuffer::from_parts(vec![DVec3::ZERO, DVec3::X, DVec3::Y], vec![0, 1, 2]);
/// let mut dst = tri.clone();
/// append(&mut dst, &tri, DVec3::new(0.0, 0.0, 1.0), DQuat::IDENTITY, DVec3::ONE).unwrap();
/// assert_eq!(dst.triangles(), &[0, 1, 2, 3, 4, 5]);
/// ```
pub fn append(
    dst: &mut MeshBuffer,
    src: &MeshBuffer,
    translation: DVec3,
    rotation: DQuat,
    scale: DVec3,
) -> Result<(), GeometryError> {
    let transform = Transform {
        translation,
        rotation,
        scale,
    };
    append_transformed(dst, src, &transform)
}

/// [`append`] taking a prepared [`Transform`].
pub fn append_transformed(
    dst: &mut MeshBuffer,
    src: &MeshBuffer,
    transform: &Transform,
) -> Result<(), GeometryError> {
    let combined = dst.vertex_count() + src.vertex_count();
    if combined >= MAX_VERTICES {
        warn!(
            dst_vertices = dst.vertex_count(),
            src_vertices = src.vertex_count(),
            max = MAX_VERTICES,
            "merge refused, vertex ceiling reached"
        );
        return Err(GeometryError::capacity(combined, MAX_VERTICES));
    }

    let transform = sanitized(transform);
    let moved = transformed_copy(src, &transform);
    extend_buffer(dst, &moved);
    Ok(())
}

/// Maps every vertex through a transform.
pub fn transform_vertices(vertices: &[DVec3], transform: &Transform) -> Vec<DVec3> {
    let transform = sanitized(transform);
    vertices.iter().map(|&v| transform.transform_point(v)).collect()
}

/// Adds `amount` to every index.
///
/// # Errors
///
/// [`GeometryError::InvalidParameter`] if a shifted index would not fit in
/// `u32`.
pub fn shift_indices(triangles: &[u32], amount: u32) -> Result<Vec<u32>, GeometryError> {
    triangles
        .iter()
        .map(|&i| {
            i.checked_add(amount).ok_or_else(|| {
                GeometryError::invalid_parameter(format!("index {i} shifted by {amount} overflows u32"))
            })
        })
        .collect()
}

/// Transforms every part in parallel, then packs them in order into as few
/// buffers as the vertex ceiling allows.
///
/// A part that on its own reaches the ceiling is skipped with a warning.
pub fn merge_all(parts: &[(MeshBuffer, Transform)]) -> Vec<MeshBuffer> {
    let moved: Vec<MeshBuffer> = parts
        .par_iter()
        .map(|(mesh, transform)| transformed_copy(mesh, &sanitized(transform)))
        .collect();

    let mut packed = Vec::new();
    let mut current = MeshBuffer::new();
    for (index, part) in moved.iter().enumerate() {
        if part.vertex_count() >= MAX_VERTICES {
            warn!(
                part = index,
                vertices = part.vertex_count(),
                max = MAX_VERTICES,
                "part exceeds vertex ceiling on its own, skipped"
            );
            continue;
        }
        if current.vertex_count() + part.vertex_count() >= MAX_VERTICES {
            packed.push(std::mem::take(&mut current));
        }
        extend_buffer(&mut current, part);
    }
    if !current.is_empty() {
        packed.push(current);
    }
    packed
}

fn sanitized(transform: &Transform) -> Transform {
    if !is_valid_rotation(transform.rotation) {
        debug!(rotation = ?transform.rotation, "invalid rotation replaced before merge");
    }
    Transform {
        rotation: sanitize_rotation(transform.rotation),
        ..*transform
    }
}

/// Copy of `src` with positions and normals mapped through the transform.
fn transformed_copy(src: &MeshBuffer, transform: &Transform) -> MeshBuffer {
    let vertices = src
        .vertices
        .iter()
        .map(|&v| transform.transform_point(v))
        .collect();
    // Normals follow the rotation only; scale and translation would skew them.
    let normals = src
        .normals
        .iter()
        .map(|&n| (transform.rotation * n).normalize_or_zero())
        .collect();
    MeshBuffer {
        vertices,
        triangles: src.triangles.clone(),
        normals,
        uv: src.uv.clone(),
        colors: src.colors.clone(),
    }
}

/// Concatenates `src` onto `dst` without any capacity check.
fn extend_buffer(dst: &mut MeshBuffer, src: &MeshBuffer) {
    let offset = dst.vertex_count();
    let added = src.vertex_count();

    concat_attribute(&mut dst.normals, offset, &src.normals, added, DVec3::ZERO);
    concat_attribute(&mut dst.colors, offset, &src.colors, added, DEFAULT_COLOR);
    for (dst_uv, src_uv) in dst.uv.iter_mut().zip(src.uv.iter()) {
        concat_attribute(dst_uv, offset, src_uv, added, DVec2::ZERO);
    }

    dst.vertices.extend_from_slice(&src.vertices);
    // The ceiling keeps `offset` well inside u32.
    dst.triangles
        .extend(src.triangles.iter().map(|&i| i + offset as u32));
}

fn concat_attribute<T: Copy>(
    dst: &mut Vec<T>,
    dst_count: usize,
    src: &[T],
    src_count: usize,
    fill: T,
) {
    if dst.is_empty() && src.is_empty() {
        return;
    }
    dst.resize(dst_count, fill);
    if src.len() == src_count {
        dst.extend_from_slice(src);
    } else {
        dst.extend(std::iter::repeat(fill).take(src_count));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::FRAC_PI_2;

    fn triangle() -> MeshBuffer {
        MeshBuffer::from_parts(vec![DVec3::ZERO, DVec3::X, DVec3::Y], vec![0, 1, 2])
    }

    #[test]
    fn test_append_shifts_indices() {
        let mut dst = triangle();
        append(&mut dst, &triangle(), DVec3::ZERO, DQuat::IDENTITY, DVec3::ONE).unwrap();
        assert_eq!(dst.vertex_count(), 6);
        assert_eq!(dst.triangle(1), [3, 4, 5]);
    }

    #[test]
    fn test_append_applies_trs() {
        let mut dst = MeshBuffer::new();
        append(
            &mut dst,
            &triangle(),
            DVec3::new(0.0, 0.0, 5.0),
            DQuat::from_rotation_z(FRAC_PI_2),
            DVec3::splat(2.0),
        )
        .unwrap();
        let moved = dst.vertices()[1];
        assert_relative_eq!(moved.x, 0.0, epsilon = 1e-12);
        assert_relative_eq!(moved.y, 2.0, epsilon = 1e-12);
        assert_relative_eq!(moved.z, 5.0, epsilon = 1e-12);
    }

    #[test]
    fn test_append_nan_rotation_is_identity() {
        let mut dst = MeshBuffer::new();
        let nan = DQuat::from_xyzw(f64::NAN, f64::NAN, f64::NAN, f64::NAN);
        append(&mut dst, &triangle(), DVec3::ONE, nan, DVec3::ONE).unwrap();
        assert!(dst.vertices().iter().all(|v| v.is_finite()));
        assert_eq!(dst.vertices()[0], DVec3::ONE);
    }

    #[test]
    fn test_append_refused_at_ceiling() {
        let mut dst = MeshBuffer::from_parts(vec![DVec3::ZERO; 40_000], Vec::new());
        let src = MeshBuffer::from_parts(vec![DVec3::ONE; 25_534], Vec::new());
        let before = dst.clone();
        let err = append(&mut dst, &src, DVec3::ZERO, DQuat::IDENTITY, DVec3::ONE).unwrap_err();
        assert_eq!(err, GeometryError::capacity(65_534, MAX_VERTICES));
        assert_eq!(dst, before);
    }

    #[test]
    fn test_append_just_below_ceiling() {
        let mut dst = MeshBuffer::from_parts(vec![DVec3::ZERO; 40_000], Vec::new());
        let src = MeshBuffer::from_parts(vec![DVec3::ONE; 25_533], Vec::new());
        assert!(append(&mut dst, &src, DVec3::ZERO, DQuat::IDENTITY, DVec3::ONE).is_ok());
        assert_eq!(dst.vertex_count(), 65_533);
    }

    #[test]
    fn test_append_rotates_normals() {
        let src = triangle().with_normals(vec![DVec3::X; 3]);
        let mut dst = MeshBuffer::new();
        append(
            &mut dst,
            &src,
            DVec3::new(9.0, 9.0, 9.0),
            DQuat::from_rotation_z(FRAC_PI_2),
            DVec3::new(3.0, 1.0, 1.0),
        )
        .unwrap();
        for n in dst.normals() {
            assert_relative_eq!(n.y, 1.0, epsilon = 1e-12);
            assert_relative_eq!(n.length(), 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_append_pads_missing_colors() {
        let mut dst = triangle();
        let src = triangle().with_colors(vec![[1.0, 0.0, 0.0, 1.0]; 3]);
        dst.append(&src, &Transform::IDENTITY).unwrap();
        assert_eq!(dst.colors().len(), 6);
        assert_eq!(dst.colors()[0], DEFAULT_COLOR);
        assert_eq!(dst.colors()[5], [1.0, 0.0, 0.0, 1.0]);
        assert!(dst.validate().is_ok());
    }

    #[test]
    fn test_append_keeps_uv_channels() {
        let mut dst = triangle().with_uv(1, vec![DVec2::ONE; 3]);
        dst.append(&triangle(), &Transform::IDENTITY).unwrap();
        assert_eq!(dst.uv(1).len(), 6);
        assert_eq!(dst.uv(1)[4], DVec2::ZERO);
        assert!(dst.uv(0).is_empty());
    }

    #[test]
    fn test_transform_vertices_and_shift() {
        let moved = transform_vertices(&[DVec3::ZERO], &Transform::from_translation(DVec3::X));
        assert_eq!(moved, vec![DVec3::X]);
        assert_eq!(shift_indices(&[0, 1, 2], 10).unwrap(), vec![10, 11, 12]);
    }

    #[test]
    fn test_shift_indices_overflow() {
        let err = shift_indices(&[0, u32::MAX], 1).unwrap_err();
        assert!(matches!(err, GeometryError::InvalidParameter { .. }));
        assert_eq!(shift_indices(&[u32::MAX - 1], 1).unwrap(), vec![u32::MAX]);
    }

    #[test]
    fn test_merge_all_packs_in_order() {
        let parts: Vec<(MeshBuffer, Transform)> = (0..4)
            .map(|i| (triangle(), Transform::from_translation(DVec3::new(i as f64, 0.0, 0.0))))
            .collect();
        let packed = merge_all(&parts);
        assert_eq!(packed.len(), 1);
        assert_eq!(packed[0].vertex_count(), 12);
        assert_eq!(packed[0].vertices()[9], DVec3::new(3.0, 0.0, 0.0));
        assert_eq!(packed[0].triangle(3), [9, 10, 11]);
    }

    #[test]
    fn test_merge_all_splits_at_ceiling() {
        let big = MeshBuffer::from_parts(vec![DVec3::ZERO; 40_000], Vec::new());
        let huge = MeshBuffer::from_parts(vec![DVec3::ZERO; MAX_VERTICES], Vec::new());
        let parts = vec![
            (big.clone(), Transform::IDENTITY),
            (huge, Transform::IDENTITY),
            (big, Transform::IDENTITY),
        ];
        let packed = merge_all(&parts);
        assert_eq!(packed.len(), 2);
        assert!(packed.iter().all(|m| m.vertex_count() == 40_000));
    }
}
