//! # Config Crate
//!
//! Centralized configuration constants for the meshkit geometry core.
//! Capacity ceilings, query tolerances and tuning values are defined here so
//! the geometry crates never scatter literals.
//!
//! ## Usage
//!
//! ```rust
//! use config::constants::{GeometryConfig, MAX_VERTICES, SURFACE_PLANE_TOLERANCE};
//!
//! let incoming = 1200;
//! let current = 64_000;
//! assert!(current + incoming >= MAX_VERTICES);
//!
//! let cfg = GeometryConfig::default();
//! assert_eq!(cfg.surface_tolerance, SURFACE_PLANE_TOLERANCE);
//! ```

pub mod constants;
