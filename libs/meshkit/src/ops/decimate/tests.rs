//! # Decimation Tests

use super::*;
use crate::mesh::{triangle_area, triangle_normal};
use config::constants::MIN_TRIANGLE_AREA;
use glam::DVec3;
use std::f64::consts::TAU;

/// Closed torus: `rings * sides` quads, two triangles each.
fn torus(rings: u32, sides: u32) -> MeshBuffer {
    let (major, minor) = (3.0, 1.0);
    let mut vertices = Vec::new();
    for i in 0..rings {
        let theta = TAU * f64::from(i) / f64::from(rings);
        for j in 0..sides {
            let phi = TAU * f64::from(j) / f64::from(sides);
            let ring = major + minor * phi.cos();
            vertices.push(DVec3::new(ring * theta.cos(), ring * theta.sin(), minor * phi.sin()));
        }
    }
    let index = |i: u32, j: u32| (i % rings) * sides + (j % sides);
    let mut triangles = Vec::new();
    for i in 0..rings {
        for j in 0..sides {
            let (a, b, c, d) = (index(i, j), index(i + 1, j), index(i + 1, j + 1), index(i, j + 1));
            triangles.extend_from_slice(&[a, b, c, a, c, d]);
        }
    }
    MeshBuffer::from_parts(vertices, triangles)
}

/// Flat `n x n` quad grid in the z = 0 plane, facing +Z.
fn grid(n: u32) -> MeshBuffer {
    let mut vertices = Vec::new();
    for j in 0..=n {
        for i in 0..=n {
            vertices.push(DVec3::new(f64::from(i), f64::from(j), 0.0));
        }
    }
    let index = |i: u32, j: u32| j * (n + 1) + i;
    let mut triangles = Vec::new();
    for j in 0..n {
        for i in 0..n {
            let (a, b, c, d) = (index(i, j), index(i + 1, j), index(i + 1, j + 1), index(i, j + 1));
            triangles.extend_from_slice(&[a, b, c, a, c, d]);
        }
    }
    MeshBuffer::from_parts(vertices, triangles)
}

fn tetrahedron() -> MeshBuffer {
    MeshBuffer::from_parts(
        vec![DVec3::ZERO, DVec3::X, DVec3::Y, DVec3::Z],
        vec![0, 2, 1, 0, 1, 3, 0, 3, 2, 1, 2, 3],
    )
}

fn assert_no_zero_area(mesh: &MeshBuffer) {
    for i in 0..mesh.triangle_count() {
        let [a, b, c] = mesh.triangle_positions(i);
        assert!(triangle_area(a, b, c) > MIN_TRIANGLE_AREA, "triangle {i} has no area");
    }
}

#[test]
fn test_torus_fixture() {
    let mesh = torus(25, 20);
    assert_eq!(mesh.triangle_count(), 1000);
    assert_eq!(mesh.vertex_count(), 500);
    assert!(mesh.validate().is_ok());
}

#[test]
fn test_halve_1000_triangles() {
    let result = reduce_to_triangles(&torus(25, 20), 0.5).unwrap();
    assert_eq!(result.outcome, DecimateOutcome::TargetMet);
    assert!(result.final_triangles <= 500);
    assert_eq!(result.mesh.triangle_count(), result.final_triangles);
    assert!(result.mesh.validate().is_ok());
    assert_no_zero_area(&result.mesh);
}

#[test]
fn test_vertex_budget() {
    let result = reduce_to_vertices(&torus(25, 20), 0.5).unwrap();
    assert!(result.target_met());
    assert!(result.final_vertices <= 250);
    assert_eq!(result.mesh.vertex_count(), result.final_vertices);
    assert!(result.mesh.validate().is_ok());
}

#[test]
fn test_no_dangling_indices() {
    let result = reduce_to_triangles(&torus(12, 10), 0.3).unwrap();
    let count = result.mesh.vertex_count() as u32;
    assert!(result.mesh.triangles().iter().all(|&i| i < count));
    // Every surviving vertex is referenced.
    let mut used = vec![false; count as usize];
    for &i in result.mesh.triangles() {
        used[i as usize] = true;
    }
    assert!(used.iter().all(|&u| u));
}

#[test]
fn test_flat_grid_stays_flat_and_unflipped() {
    let result = reduce_to_triangles(&grid(10), 0.6).unwrap();
    assert!(result.target_met());
    assert!(result.final_triangles <= 120);
    assert!(result.mesh.vertices().iter().all(|v| v.z.abs() < 1e-9));
    for i in 0..result.mesh.triangle_count() {
        let [a, b, c] = result.mesh.triangle_positions(i);
        let normal = triangle_normal(a, b, c).unwrap();
        assert!(normal.z > 0.0);
    }
}

#[test]
fn test_zero_budget_is_unreachable() {
    let result = reduce_to_triangles(&torus(12, 10), 0.0).unwrap();
    assert_eq!(result.outcome, DecimateOutcome::BudgetUnreachable);
    assert!(result.final_triangles > 0);
    assert!(result.mesh.validate().is_ok());
    assert_no_zero_area(&result.mesh);
}

#[test]
fn test_tetrahedron_cannot_collapse() {
    let result = reduce_to_triangles(&tetrahedron(), 0.5).unwrap();
    assert_eq!(result.outcome, DecimateOutcome::BudgetUnreachable);
    assert_eq!(result.final_triangles, 4);
    assert_eq!(result.collapses_performed, 0);
}

#[test]
fn test_fraction_clamped_above_one() {
    let mesh = torus(6, 5);
    let result = reduce_to_triangles(&mesh, 2.0).unwrap();
    assert!(result.target_met());
    assert_eq!(result.mesh, mesh);
    assert_eq!(result.reduction_ratio(), 1.0);
}

#[test]
fn test_non_finite_fraction_rejected() {
    let err = reduce_to_triangles(&tetrahedron(), f64::NAN).unwrap_err();
    assert!(matches!(err, GeometryError::InvalidParameter { .. }));
}

#[test]
fn test_invalid_mesh_rejected() {
    let mesh = MeshBuffer::from_parts(vec![DVec3::ZERO], vec![0, 1, 2]);
    let err = reduce_to_triangles(&mesh, 0.5).unwrap_err();
    assert!(matches!(err, GeometryError::InvalidMesh { .. }));
}

#[test]
fn test_empty_mesh() {
    let result = reduce_to_triangles(&MeshBuffer::new(), 0.5).unwrap();
    assert!(result.target_met());
    assert_eq!(result.final_triangles, 0);
}

#[test]
fn test_attributes_follow_survivors() {
    let mesh = grid(6);
    let colors = vec![[0.2, 0.4, 0.6, 1.0]; mesh.vertex_count()];
    let normals = vec![DVec3::Z; mesh.vertex_count()];
    let mesh = mesh.with_colors(colors).with_normals(normals);
    let result = decimate(&mesh, DecimateTarget::Triangles(0.5)).unwrap();
    assert_eq!(result.mesh.colors().len(), result.mesh.vertex_count());
    assert_eq!(result.mesh.normals().len(), result.mesh.vertex_count());
    assert!(result.mesh.validate().is_ok());
}

#[test]
fn test_display() {
    let result = reduce_to_triangles(&torus(25, 20), 0.5).unwrap();
    let text = result.to_string();
    assert!(text.contains("1000"));
    assert!(text.contains("TargetMet"));
}
