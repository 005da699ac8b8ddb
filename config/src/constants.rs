//! # Configuration Constants
//!
//! Centralized constants for the meshkit geometry core. Capacity limits,
//! query tolerances, and acceleration-structure tuning live here.
//!
//! ## Categories
//!
//! - **Precision**: Floating-point comparison tolerances
//! - **Limits**: Index-format ceilings
//! - **Queries**: Surface and interior query parameters
//! - **Hull / Decimation**: Tolerances for hull and simplification

use thiserror::Error;

// =============================================================================
// PRECISION CONSTANTS
// =============================================================================

/// Magnitudes below this count as zero: scale factors, quaternion lengths,
/// ray-plane determinants and ray parameters.
pub const EPSILON: f64 = 1e-10;

/// Smallest triangle area still considered non-degenerate.
///
/// Decimation refuses any collapse that would leave a triangle at or below
/// this area.
pub const MIN_TRIANGLE_AREA: f64 = 1e-12;

// =============================================================================
// LIMIT CONSTANTS
// =============================================================================

/// Maximum number of vertices in a single mesh buffer.
///
/// Imposed by the 16-bit index format of the consuming render pipeline.
/// A merge whose combined vertex count would reach this value is refused.
///
/// # Example
///
/// ```rust
/// use config::constants::MAX_VERTICES;
///
/// let combined = 40_000 + 30_000;
/// assert!(combined >= MAX_VERTICES);
/// ```
pub const MAX_VERTICES: usize = 65_534;

/// Layer mask that selects every layer.
pub const ALL_LAYERS: u32 = u32::MAX;

// =============================================================================
// QUERY CONSTANTS
// =============================================================================

/// Maximum perpendicular distance from a triangle's plane for the exact
/// surface query.
pub const SURFACE_PLANE_TOLERANCE: f64 = 0.01;

/// Lower clamp for the half-size of the approximate surface query cube.
///
/// # Example
///
/// ```rust
/// use config::constants::MIN_SURFACE_RANGE;
///
/// let range: f64 = 0.01;
/// assert_eq!(range.max(MIN_SURFACE_RANGE), 0.1);
/// ```
pub const MIN_SURFACE_RANGE: f64 = 0.1;

/// Maximum triangles stored in one bounding-volume tree leaf.
pub const BVH_MAX_LEAF_SIZE: usize = 8;

// =============================================================================
// HULL / DECIMATION CONSTANTS
// =============================================================================

/// Default plane-distance tolerance for convex hull construction.
///
/// A point no farther than this from a candidate face plane is treated as
/// lying on the face.
pub const DEFAULT_PLANE_DISTANCE_TOLERANCE: f64 = 1e-10;

// =============================================================================
// COLOR CONSTANTS
// =============================================================================

/// Default vertex color (light gray), RGBA in [0.0, 1.0].
///
/// Used to pad the color channel when merging a colored mesh into one that
/// carries no colors.
pub const DEFAULT_COLOR: [f32; 4] = [0.8, 0.8, 0.8, 1.0];

// =============================================================================
// GEOMETRY CONFIG
// =============================================================================

/// Immutable snapshot of tunable geometry settings shared between crates.
///
/// # Examples
/// ```
/// use config::constants::GeometryConfig;
/// let config = GeometryConfig::default();
/// assert!(config.plane_distance_tolerance > 0.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeometryConfig {
    /// Plane-distance tolerance used by hull construction.
    pub plane_distance_tolerance: f64,
    /// Plane tolerance used by the exact surface query.
    pub surface_tolerance: f64,
    /// Maximum triangles per bounding-volume tree leaf.
    pub bvh_leaf_size: usize,
}

impl GeometryConfig {
    /// Builds a configuration, rejecting non-positive tolerances and an
    /// empty leaf size.
    ///
    /// # Examples
    /// ```
    /// use config::constants::GeometryConfig;
    /// let cfg = GeometryConfig::new(1.0e-6, 0.02, 4).expect("valid config");
    /// assert_eq!(cfg.bvh_leaf_size, 4);
    /// ```
    pub fn new(
        plane_distance_tolerance: f64,
        surface_tolerance: f64,
        bvh_leaf_size: usize,
    ) -> Result<Self, ConfigError> {
        if !(plane_distance_tolerance.is_finite() && plane_distance_tolerance > 0.0) {
            return Err(ConfigError::InvalidTolerance(plane_distance_tolerance));
        }
        if !(surface_tolerance.is_finite() && surface_tolerance >= 0.0) {
            return Err(ConfigError::InvalidTolerance(surface_tolerance));
        }
        if bvh_leaf_size == 0 {
            return Err(ConfigError::InvalidLeafSize(bvh_leaf_size));
        }
        Ok(Self {
            plane_distance_tolerance,
            surface_tolerance,
            bvh_leaf_size,
        })
    }
}

impl Default for GeometryConfig {
    fn default() -> Self {
        Self {
            plane_distance_tolerance: DEFAULT_PLANE_DISTANCE_TOLERANCE,
            surface_tolerance: SURFACE_PLANE_TOLERANCE,
            bvh_leaf_size: BVH_MAX_LEAF_SIZE,
        }
    }
}

/// Error returned when invalid configuration values are provided.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// Tolerance is negative, zero where a positive value is needed, or not finite.
    #[error("tolerance must be positive and finite: {0}")]
    InvalidTolerance(f64),
    /// Leaf size cannot hold a triangle.
    #[error("bvh_leaf_size must be >= 1: {0}")]
    InvalidLeafSize(usize),
}

// =============================================================================
// HELPERS
// =============================================================================

/// True when `value` is within [`EPSILON`] of zero.
///
/// ```rust
/// use config::constants::approx_zero;
///
/// assert!(approx_zero(-3e-11));
/// assert!(!approx_zero(1e-3));
/// ```
#[inline]
pub fn approx_zero(value: f64) -> bool {
    value.abs() < EPSILON
}
