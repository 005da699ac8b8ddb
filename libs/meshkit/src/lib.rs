//! # meshkit
//!
//! Geometry core for triangle meshes and axis-aligned bounds.
//! Callers hand in raw vertex, triangle and transform data and get plain
//! geometric results back.
//!
//! ## Architecture
//!
//! ```text
//! Bounds / Transform / MeshBuffer (value types)
//!        ├── aggregate  (bounds over leaf sets)
//!        ├── ops        (merge, filter, decimate, hull)
//!        └── query      (surface and interior tests)
//! ```
//!
//! ## Algorithms
//!
//! - **Decimation**: quadric error metric edge collapse
//! - **Hull**: QuickHull
//! - **Interior test**: BVH-accelerated signed ray crossings, three-ray vote
//!
//! ## Usage
//!
//! ```rust
//! use meshkit::{MeshBuffer, Transform};
//! use glam::DVec3;
//!
//! let tri = MeshBuffer::from_parts(vec![DVec3::ZERO, DVec3::X, DVec3::Y], vec![0, 1, 2]);
//! let mut scene = MeshBuffer::new();
//! scene.append(&tri, &Transform::from_translation(DVec3::Z))?;
//! assert_eq!(scene.vertex_count(), 3);
//! # Ok::<(), meshkit::GeometryError>(())
//! ```

pub mod aggregate;
pub mod bounds;
pub mod error;
pub mod mesh;
pub mod ops;
pub mod query;
pub mod transform;

pub use aggregate::{aggregate_bounds, AggregateOptions, BoundedLeaf, BoundsRoot, BoundsSource, Space};
pub use bounds::Bounds;
pub use error::GeometryError;
pub use mesh::MeshBuffer;
pub use transform::Transform;
