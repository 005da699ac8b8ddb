//! # Geometry Errors
//!
//! Error types for the geometry core. None of these are fatal: every failure
//! path leaves caller data untouched and reports through a `Result`.

use thiserror::Error;

/// Errors that can occur in mesh and bounds operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeometryError {
    /// The operation would push a mesh past the 16-bit vertex ceiling.
    #[error("Capacity exceeded: {count} vertices (max: {max})")]
    CapacityExceeded { count: usize, max: usize },

    /// Input has too little extent to produce a result.
    #[error("Degenerate input: {message}")]
    DegenerateInput { message: String },

    /// A collider shape with no bounds conversion.
    #[error("Unsupported shape: {kind}")]
    UnsupportedShape { kind: String },

    /// Tolerance exceeded or non-finite data encountered.
    #[error("Numerical failure: {message}")]
    NumericalFailure { message: String },

    /// Index or attribute arrays are inconsistent.
    #[error("Invalid mesh: {message}")]
    InvalidMesh { message: String },

    /// A caller-supplied parameter is out of its domain.
    #[error("Invalid parameter: {message}")]
    InvalidParameter { message: String },
}

impl GeometryError {
    /// Creates a capacity exceeded error.
    pub fn capacity(count: usize, max: usize) -> Self {
        Self::CapacityExceeded { count, max }
    }

    /// Creates a degenerate input error.
    pub fn degenerate(message: impl Into<String>) -> Self {
        Self::DegenerateInput {
            message: message.into(),
        }
    }

    /// Creates an unsupported shape error.
    pub fn unsupported(kind: impl Into<String>) -> Self {
        Self::UnsupportedShape { kind: kind.into() }
    }

    /// Creates a numerical failure error.
    pub fn numerical(message: impl Into<String>) -> Self {
        Self::NumericalFailure {
            message: message.into(),
        }
    }

    /// Creates an invalid mesh error.
    pub fn invalid_mesh(message: impl Into<String>) -> Self {
        Self::InvalidMesh {
            message: message.into(),
        }
    }

    /// Creates an invalid parameter error.
    pub fn invalid_parameter(message: impl Into<String>) -> Self {
        Self::InvalidParameter {
            message: message.into(),
        }
    }
}
