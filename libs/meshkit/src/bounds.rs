//! # Bounds
//!
//! Axis-aligned box described by a center and half-size (extents).
//!
//! `Bounds` is a plain value: every combining operation returns a new box and
//! extents are never negative.

use crate::transform::Transform;
use glam::DVec3;
use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box.
///
/// # Example
///
/// ```rust
/// use meshkit::Bounds;
/// use glam::DVec3;
///
/// let a = Bounds::new(DVec3::ZERO, DVec3::splat(2.0));
/// let b = Bounds::new(DVec3::new(3.0, 0.0, 0.0), DVec3::splat(2.0));
/// let both = a.encapsulate(&b);
/// assert_eq!(both.min(), DVec3::new(-1.0, -1.0, -1.0));
/// assert_eq!(both.max(), DVec3::new(4.0, 1.0, 1.0));
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    // Corners are stored so that unions are exact min/max operations.
    min: DVec3,
    max: DVec3,
}

impl Bounds {
    /// Creates bounds from a center and a full size.
    pub fn new(center: DVec3, size: DVec3) -> Self {
        Self::from_center_extents(center, size * 0.5)
    }

    /// Creates bounds from a center and half-size. Negative extents are
    /// flipped positive.
    pub fn from_center_extents(center: DVec3, extents: DVec3) -> Self {
        let extents = extents.abs();
        Self {
            min: center - extents,
            max: center + extents,
        }
    }

    /// Creates zero-extent bounds at a point.
    pub fn from_point(point: DVec3) -> Self {
        Self {
            min: point,
            max: point,
        }
    }

    /// Creates bounds spanning two corners in any order.
    pub fn from_min_max(a: DVec3, b: DVec3) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// Smallest bounds containing every point, or `None` when empty.
    pub fn from_points<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = DVec3>,
    {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let (min, max) = iter.fold((first, first), |(min, max), p| (min.min(p), max.max(p)));
        Some(Self { min, max })
    }

    /// Center of the box.
    #[inline]
    pub fn center(&self) -> DVec3 {
        (self.min + self.max) * 0.5
    }

    /// Half-size of the box.
    #[inline]
    pub fn extents(&self) -> DVec3 {
        (self.max - self.min) * 0.5
    }

    /// Full size of the box.
    #[inline]
    pub fn size(&self) -> DVec3 {
        self.max - self.min
    }

    /// Minimum corner.
    #[inline]
    pub fn min(&self) -> DVec3 {
        self.min
    }

    /// Maximum corner.
    #[inline]
    pub fn max(&self) -> DVec3 {
        self.max
    }

    /// True if the box has zero extents on every axis.
    pub fn is_point(&self) -> bool {
        self.min == self.max
    }

    /// Inclusive containment test.
    pub fn contains(&self, point: DVec3) -> bool {
        point.cmpge(self.min).all() && point.cmple(self.max).all()
    }

    /// Returns the union of two boxes.
    #[must_use]
    pub fn encapsulate(&self, other: &Bounds) -> Bounds {
        Bounds {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// Returns the box grown to include a point.
    #[must_use]
    pub fn encapsulate_point(&self, point: DVec3) -> Bounds {
        Bounds {
            min: self.min.min(point),
            max: self.max.max(point),
        }
    }

    /// Union of any number of boxes, or `None` when there are none.
    pub fn combine<'a, I>(bounds: I) -> Option<Bounds>
    where
        I: IntoIterator<Item = &'a Bounds>,
    {
        let mut iter = bounds.into_iter();
        let first = *iter.next()?;
        Some(iter.fold(first, |acc, b| acc.encapsulate(b)))
    }

    /// Maps local bounds into the transform's parent frame.
    ///
    /// The center is transformed as a point; the extents become the absolute
    /// sum of the three transformed half-axis vectors, which is the tightest
    /// axis-aligned box around the rotated one.
    #[must_use]
    pub fn transformed(&self, transform: &Transform) -> Bounds {
        let extents = self.extents();
        let center = transform.transform_point(self.center());
        let axis_x = transform.transform_vector(DVec3::new(extents.x, 0.0, 0.0)).abs();
        let axis_y = transform.transform_vector(DVec3::new(0.0, extents.y, 0.0)).abs();
        let axis_z = transform.transform_vector(DVec3::new(0.0, 0.0, extents.z)).abs();
        Self::from_center_extents(center, axis_x + axis_y + axis_z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use glam::DQuat;
    use std::f64::consts::FRAC_PI_4;

    #[test]
    fn test_new_halves_size() {
        let b = Bounds::new(DVec3::new(1.0, 2.0, 3.0), DVec3::new(2.0, 4.0, 6.0));
        assert_eq!(b.extents(), DVec3::new(1.0, 2.0, 3.0));
        assert_eq!(b.size(), DVec3::new(2.0, 4.0, 6.0));
        assert_eq!(b.min(), DVec3::new(0.0, 0.0, 0.0));
        assert_eq!(b.max(), DVec3::new(2.0, 4.0, 6.0));
    }

    #[test]
    fn test_negative_extents_flipped() {
        let b = Bounds::from_center_extents(DVec3::ZERO, DVec3::new(-1.0, 2.0, -3.0));
        assert_eq!(b.extents(), DVec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn test_from_min_max_any_order() {
        let b = Bounds::from_min_max(DVec3::new(1.0, -1.0, 5.0), DVec3::new(-1.0, 1.0, 3.0));
        assert_eq!(b.min(), DVec3::new(-1.0, -1.0, 3.0));
        assert_eq!(b.max(), DVec3::new(1.0, 1.0, 5.0));
    }

    #[test]
    fn test_from_points() {
        assert!(Bounds::from_points(Vec::new()).is_none());
        let b = Bounds::from_points([DVec3::ZERO, DVec3::new(2.0, -1.0, 4.0)]).unwrap();
        assert_eq!(b.center(), DVec3::new(1.0, -0.5, 2.0));
    }

    #[test]
    fn test_point_bounds() {
        let b = Bounds::from_point(DVec3::ONE);
        assert!(b.is_point());
        assert!(b.contains(DVec3::ONE));
        assert!(!b.contains(DVec3::ZERO));
    }

    #[test]
    fn test_contains_inclusive() {
        let b = Bounds::new(DVec3::ZERO, DVec3::splat(2.0));
        assert!(b.contains(DVec3::new(1.0, 1.0, 1.0)));
        assert!(b.contains(DVec3::new(-1.0, 0.0, 0.5)));
        assert!(!b.contains(DVec3::new(1.0001, 0.0, 0.0)));
    }

    #[test]
    fn test_encapsulate_point() {
        let b = Bounds::from_point(DVec3::ZERO).encapsulate_point(DVec3::new(2.0, 0.0, -2.0));
        assert_eq!(b.min(), DVec3::new(0.0, 0.0, -2.0));
        assert_eq!(b.max(), DVec3::new(2.0, 0.0, 0.0));
    }

    #[test]
    fn test_combine() {
        assert!(Bounds::combine(&[] as &[Bounds]).is_none());
        let boxes = [
            Bounds::from_point(DVec3::ZERO),
            Bounds::from_point(DVec3::new(-3.0, 1.0, 0.0)),
            Bounds::new(DVec3::new(0.0, 0.0, 5.0), DVec3::ONE),
        ];
        let all = Bounds::combine(&boxes).unwrap();
        assert_eq!(all.min(), DVec3::new(-3.0, -0.5, 0.0));
        assert_eq!(all.max(), DVec3::new(0.5, 1.0, 5.5));
    }

    #[test]
    fn test_transformed_translation_and_scale() {
        let b = Bounds::new(DVec3::ZERO, DVec3::splat(2.0));
        let t = Transform::new(DVec3::new(10.0, 0.0, 0.0), DQuat::IDENTITY, DVec3::new(2.0, 1.0, 3.0));
        let w = b.transformed(&t);
        assert_eq!(w.center(), DVec3::new(10.0, 0.0, 0.0));
        assert_eq!(w.extents(), DVec3::new(2.0, 1.0, 3.0));
    }

    #[test]
    fn test_transformed_rotation_grows_extents() {
        let b = Bounds::new(DVec3::ZERO, DVec3::new(2.0, 2.0, 2.0));
        let t = Transform::from_translation_rotation(DVec3::ZERO, DQuat::from_rotation_z(FRAC_PI_4));
        let w = b.transformed(&t);
        let expected = 2.0_f64.sqrt();
        assert_relative_eq!(w.extents().x, expected, epsilon = 1e-9);
        assert_relative_eq!(w.extents().y, expected, epsilon = 1e-9);
        assert_relative_eq!(w.extents().z, 1.0, epsilon = 1e-9);
    }
}
