//! # Transforms
//!
//! Translation / rotation / scale frames and rotation helpers.
//!
//! A [`Transform`] maps points from its own (local) frame into its parent
//! frame as `translate ∘ rotate ∘ scale`. Hierarchies are flattened by the
//! caller: a leaf hands over its local-to-world transform, never a parent
//! chain.

use config::constants::approx_zero;
use glam::{DMat4, DQuat, DVec3};
use serde::{Deserialize, Serialize};

/// A TRS frame.
///
/// # Example
///
/// ```rust
/// use meshkit::Transform;
/// use glam::{DQuat, DVec3};
///
/// let t = Transform::new(DVec3::new(1.0, 0.0, 0.0), DQuat::IDENTITY, DVec3::splat(2.0));
/// assert_eq!(t.transform_point(DVec3::ONE), DVec3::new(3.0, 2.0, 2.0));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    /// Position in the parent frame.
    pub translation: DVec3,
    /// Orientation in the parent frame.
    pub rotation: DQuat,
    /// Per-axis scale.
    pub scale: DVec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    /// The identity frame.
    pub const IDENTITY: Self = Self {
        translation: DVec3::ZERO,
        rotation: DQuat::IDENTITY,
        scale: DVec3::ONE,
    };

    /// Creates a transform. The rotation is passed through
    /// [`sanitize_rotation`] so a NaN or zero quaternion becomes identity.
    pub fn new(translation: DVec3, rotation: DQuat, scale: DVec3) -> Self {
        Self {
            translation,
            rotation: sanitize_rotation(rotation),
            scale,
        }
    }

    /// Creates a pure translation.
    pub fn from_translation(translation: DVec3) -> Self {
        Self {
            translation,
            ..Self::IDENTITY
        }
    }

    /// Creates a translation plus rotation with unit scale.
    pub fn from_translation_rotation(translation: DVec3, rotation: DQuat) -> Self {
        Self::new(translation, rotation, DVec3::ONE)
    }

    /// Returns the equivalent affine matrix.
    pub fn matrix(&self) -> DMat4 {
        DMat4::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }

    /// Maps a point from this frame into the parent frame.
    #[inline]
    pub fn transform_point(&self, point: DVec3) -> DVec3 {
        self.translation + self.rotation * (self.scale * point)
    }

    /// Maps a direction (affected by rotation and scale, not translation).
    #[inline]
    pub fn transform_vector(&self, vector: DVec3) -> DVec3 {
        self.rotation * (self.scale * vector)
    }

    /// Maps a point from the parent frame back into this frame.
    ///
    /// Axes with zero scale collapse to zero instead of producing infinities.
    pub fn inverse_transform_point(&self, point: DVec3) -> DVec3 {
        let unrotated = self.rotation.inverse() * (point - self.translation);
        unrotated * safe_recip(self.scale)
    }

    /// Converts a point expressed in this frame into `other`'s frame, going
    /// through the shared parent (world) frame.
    pub fn point_to_space(&self, point: DVec3, other: &Transform) -> DVec3 {
        other.inverse_transform_point(self.transform_point(point))
    }
}

fn safe_recip(v: DVec3) -> DVec3 {
    let recip = |s: f64| if approx_zero(s) { 0.0 } else { 1.0 / s };
    DVec3::new(recip(v.x), recip(v.y), recip(v.z))
}

// =============================================================================
// ROTATION HELPERS
// =============================================================================

/// Returns false for quaternions that would poison interpolation or vertex
/// transforms: any NaN component, or all components zero.
pub fn is_valid_rotation(rotation: DQuat) -> bool {
    let is_nan = (rotation.x + rotation.y + rotation.z + rotation.w).is_nan();
    let is_zero = rotation.x == 0.0 && rotation.y == 0.0 && rotation.z == 0.0 && rotation.w == 0.0;
    !(is_nan || is_zero)
}

/// Turns any quaternion into a usable unit rotation.
///
/// NaN components are zeroed; a quaternion left with (near) zero length
/// becomes identity; anything else is normalized.
///
/// # Example
///
/// ```rust
/// use meshkit::transform::sanitize_rotation;
/// use glam::DQuat;
///
/// let fixed = sanitize_rotation(DQuat::from_xyzw(f64::NAN, 0.0, 0.0, 0.0));
/// assert_eq!(fixed, DQuat::IDENTITY);
/// ```
pub fn sanitize_rotation(rotation: DQuat) -> DQuat {
    let zero_nan = |c: f64| if c.is_nan() { 0.0 } else { c };
    let fixed = DQuat::from_xyzw(
        zero_nan(rotation.x),
        zero_nan(rotation.y),
        zero_nan(rotation.z),
        zero_nan(rotation.w),
    );
    let length = fixed.length();
    if !length.is_finite() || approx_zero(length) {
        DQuat::IDENTITY
    } else {
        fixed / length
    }
}

/// Flips a quaternion so that `w >= 0`, picking the short way around.
pub fn shorten_rotation(rotation: DQuat) -> DQuat {
    if rotation.w < 0.0 {
        -rotation
    } else {
        rotation
    }
}

/// Component-wise mean of rotations, normalized. `None` for an empty input.
///
/// Only meaningful for rotations that are close to each other; callers
/// averaging widely different orientations should shorten them first.
pub fn average_rotations(rotations: &[DQuat]) -> Option<DQuat> {
    if rotations.is_empty() {
        return None;
    }
    let sum = rotations
        .iter()
        .fold(DQuat::from_xyzw(0.0, 0.0, 0.0, 0.0), |acc, q| acc + *q);
    Some(sanitize_rotation(sum / rotations.len() as f64))
}

/// Angle (radians, in `[0, π]`) a rotation turns `reference` around `axis`.
///
/// `reference` must be orthogonal to `axis`. The rotated reference is
/// projected onto the plane perpendicular to the axis before measuring.
pub fn axis_angle_about(rotation: DQuat, axis: DVec3, reference: DVec3) -> f64 {
    let axis = axis.normalize_or_zero();
    let reference = reference.normalize_or_zero();
    let rotated = rotation * reference;
    let flattened = (rotated - rotated.dot(axis) * axis).normalize_or_zero();
    reference.dot(flattened).clamp(-1.0, 1.0).acos()
}
