//! # Mesh Operations
//!
//! Operations that produce new mesh data.
//!
//! ## Modules
//!
//! - [`merge`]: append buffers under a transform
//! - [`filter`]: select triangles by index range
//! - [`decimate`]: quadric edge-collapse reduction
//! - [`hull`]: QuickHull convex hulls

pub mod decimate;
pub mod filter;
pub mod hull;
pub mod merge;

pub use decimate::{decimate, reduce_to_triangles, reduce_to_vertices, DecimateOutcome, DecimateTarget, DecimationResult};
pub use filter::{find_triangles, TriangleSearch};
pub use hull::{build_hull, build_hull_with, convex_hull, hull_of_meshes, HullOutcome, HullResult};
pub use merge::{append, append_transformed, merge_all};
