//! # Decimation
//!
//! Reduces triangle or vertex counts by iterative edge collapse ranked with
//! the quadric error metric.
//!
//! ## Algorithm Overview
//!
//! 1. Sum face-plane quadrics per vertex, plus heavy constraint planes
//!    along open borders
//! 2. Queue every edge with its cheapest merge position among the quadric
//!    optimum, both endpoints and the midpoint
//! 3. Pop the cheapest edge; skip it if stale, reject it if the collapse
//!    breaks the link condition or leaves a face flipped or without area
//! 4. Collapse, re-queue the survivor's edges, and repeat until the budget
//!    is met or nothing valid remains
//!
//! Running out of valid collapses is reported as
//! [`DecimateOutcome::BudgetUnreachable`] together with the best-effort
//! mesh; it is not an error.

mod collapse;
mod quadric;

#[cfg(test)]
mod tests;

pub use quadric::Quadric;

use crate::error::GeometryError;
use crate::mesh::MeshBuffer;
use collapse::{Budget, Collapser};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::info;

/// What to reduce and by how much, as a fraction of the original count.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum DecimateTarget {
    /// Fraction of the original triangle count to keep.
    Triangles(f64),
    /// Fraction of the original vertex count to keep.
    Vertices(f64),
}

/// Whether the requested budget was reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DecimateOutcome {
    TargetMet,
    /// No valid collapse remained before reaching the budget.
    BudgetUnreachable,
}

/// Result of a decimation run.
#[derive(Debug, Clone)]
pub struct DecimationResult {
    /// The reduced, compacted mesh.
    pub mesh: MeshBuffer,
    pub original_triangles: usize,
    pub final_triangles: usize,
    pub original_vertices: usize,
    pub final_vertices: usize,
    pub collapses_performed: usize,
    /// Collapses refused by the link, area or orientation checks.
    pub collapses_rejected: usize,
    pub outcome: DecimateOutcome,
}

impl DecimationResult {
    /// Final triangle count over original, 1.0 for an empty input.
    pub fn reduction_ratio(&self) -> f64 {
        if self.original_triangles == 0 {
            1.0
        } else {
            self.final_triangles as f64 / self.original_triangles as f64
        }
    }

    pub fn target_met(&self) -> bool {
        self.outcome == DecimateOutcome::TargetMet
    }
}

impl fmt::Display for DecimationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Decimation: {} -> {} triangles ({:.1}% reduction, {} collapses, {:?})",
            self.original_triangles,
            self.final_triangles,
            (1.0 - self.reduction_ratio()) * 100.0,
            self.collapses_performed,
            self.outcome
        )
    }
}

/// Reduces to `round(fraction * triangle_count)` triangles.
///
/// # Example
///
/// ```rust
/// use meshkit::{ops::decimate::reduce_to_triangles, MeshBuffer};
/// use glam::DVec3;
///
/// let quad = MeshBuffer::from_parts(
///     vec![DVec3::ZERO, DVec3::X, DVec3::new(1.0, 1.0, 0.0), DVec3::Y],
///     vec![0, 1, 2, 0, 2, 3],
/// );
/// let result = reduce_to_triangles(&quad, 1.0).unwrap();
/// assert!(result.target_met());
/// assert_eq!(result.final_triangles, 2);
/// ```
pub fn reduce_to_triangles(mesh: &MeshBuffer, fraction: f64) -> Result<DecimationResult, GeometryError> {
    decimate(mesh, DecimateTarget::Triangles(fraction))
}

/// Reduces to `round(fraction * vertex_count)` vertices.
pub fn reduce_to_vertices(mesh: &MeshBuffer, fraction: f64) -> Result<DecimationResult, GeometryError> {
    decimate(mesh, DecimateTarget::Vertices(fraction))
}

/// Runs the decimator against either budget.
///
/// # Errors
///
/// - [`GeometryError::InvalidParameter`] for a non-finite fraction
/// - the [`MeshBuffer::validate`] error for an inconsistent mesh
pub fn decimate(mesh: &MeshBuffer, target: DecimateTarget) -> Result<DecimationResult, GeometryError> {
    let fraction = match target {
        DecimateTarget::Triangles(f) | DecimateTarget::Vertices(f) => f,
    };
    if !fraction.is_finite() {
        return Err(GeometryError::invalid_parameter(format!(
            "decimation fraction must be finite, got {fraction}"
        )));
    }
    mesh.validate()?;

    let fraction = fraction.clamp(0.0, 1.0);
    let original_triangles = mesh.triangle_count();
    let original_vertices = mesh.vertex_count();
    let budget = match target {
        DecimateTarget::Triangles(_) => {
            Budget::Triangles((fraction * original_triangles as f64).round() as usize)
        }
        DecimateTarget::Vertices(_) => {
            Budget::Vertices((fraction * original_vertices as f64).round() as usize)
        }
    };

    let already_met = match budget {
        Budget::Triangles(n) => original_triangles <= n,
        Budget::Vertices(n) => original_vertices <= n,
    };
    if already_met {
        return Ok(DecimationResult {
            mesh: mesh.clone(),
            original_triangles,
            final_triangles: original_triangles,
            original_vertices,
            final_vertices: original_vertices,
            collapses_performed: 0,
            collapses_rejected: 0,
            outcome: DecimateOutcome::TargetMet,
        });
    }

    info!(
        triangles = original_triangles,
        vertices = original_vertices,
        ?budget,
        "starting decimation"
    );

    let mut engine = Collapser::new(mesh);
    let stats = engine.run(budget);
    let final_triangles = engine.live_faces();
    let reduced = engine.into_mesh(mesh);

    let outcome = if stats.target_met {
        DecimateOutcome::TargetMet
    } else {
        DecimateOutcome::BudgetUnreachable
    };
    let result = DecimationResult {
        final_vertices: reduced.vertex_count(),
        mesh: reduced,
        original_triangles,
        final_triangles,
        original_vertices,
        collapses_performed: stats.performed,
        collapses_rejected: stats.rejected,
        outcome,
    };

    info!(
        final_triangles = result.final_triangles,
        final_vertices = result.final_vertices,
        collapses = result.collapses_performed,
        rejected = result.collapses_rejected,
        outcome = ?result.outcome,
        "decimation finished"
    );
    Ok(result)
}
