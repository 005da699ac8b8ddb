//! Quadric error metric.
//!
//! A quadric sums squared distances to a set of planes. Each vertex starts
//! with the planes of its faces; a collapse adds the two endpoint quadrics
//! and places the merged vertex where their sum is smallest.

use glam::{DMat3, DVec3};
use std::ops::{Add, AddAssign};

/// Symmetric 4x4 quadric stored as its upper triangle.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Quadric {
    // [a b c d]
    // [  e f g]
    // [    h i]
    // [      j]
    a: f64,
    b: f64,
    c: f64,
    d: f64,
    e: f64,
    f: f64,
    g: f64,
    h: f64,
    i: f64,
    j: f64,
}

impl Quadric {
    /// Quadric of the plane `normal . p + offset = 0`. `normal` must be unit
    /// length for the error to be a squared distance.
    pub fn from_plane(normal: DVec3, offset: f64) -> Self {
        let DVec3 { x, y, z } = normal;
        Self {
            a: x * x,
            b: x * y,
            c: x * z,
            d: x * offset,
            e: y * y,
            f: y * z,
            g: y * offset,
            h: z * z,
            i: z * offset,
            j: offset * offset,
        }
    }

    /// Quadric of the plane through `point` with unit `normal`.
    pub fn from_point_normal(point: DVec3, normal: DVec3) -> Self {
        Self::from_plane(normal, -normal.dot(point))
    }

    /// Every coefficient multiplied by `weight`.
    #[must_use]
    pub fn scaled(&self, weight: f64) -> Self {
        Self {
            a: self.a * weight,
            b: self.b * weight,
            c: self.c * weight,
            d: self.d * weight,
            e: self.e * weight,
            f: self.f * weight,
            g: self.g * weight,
            h: self.h * weight,
            i: self.i * weight,
            j: self.j * weight,
        }
    }

    /// `v^T Q v` with `v = [p, 1]`.
    pub fn evaluate(&self, p: DVec3) -> f64 {
        let DVec3 { x, y, z } = p;
        x * (self.a * x + 2.0 * (self.b * y + self.c * z + self.d))
            + y * (self.e * y + 2.0 * (self.f * z + self.g))
            + z * (self.h * z + 2.0 * self.i)
            + self.j
    }

    /// Point minimizing the error, or `None` when the 3x3 part is singular
    /// (flat or straight neighborhoods).
    pub fn optimal_point(&self) -> Option<DVec3> {
        let m = DMat3::from_cols(
            DVec3::new(self.a, self.b, self.c),
            DVec3::new(self.b, self.e, self.f),
            DVec3::new(self.c, self.f, self.h),
        );
        let det = m.determinant();
        if det.abs() < 1e-10 {
            return None;
        }
        let p = m.inverse() * DVec3::new(-self.d, -self.g, -self.i);
        p.is_finite().then_some(p)
    }
}

impl AddAssign for Quadric {
    fn add_assign(&mut self, other: Self) {
        self.a += other.a;
        self.b += other.b;
        self.c += other.c;
        self.d += other.d;
        self.e += other.e;
        self.f += other.f;
        self.g += other.g;
        self.h += other.h;
        self.i += other.i;
        self.j += other.j;
    }
}

impl Add for Quadric {
    type Output = Self;

    fn add(mut self, other: Self) -> Self {
        self += other;
        self
    }
}
