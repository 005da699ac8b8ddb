//! # Point Queries
//!
//! Point-versus-mesh predicates. All queries work in the mesh's local frame.
//!
//! - [`surface`]: brute-force near/on-surface checks
//! - [`interior`]: tree-backed inside/outside classification

pub mod interior;
pub mod surface;

pub use interior::{is_point_inside, InteriorQuery};
pub use surface::{is_point_near_surface, is_point_on_surface, is_point_on_surface_with, point_in_triangle};
