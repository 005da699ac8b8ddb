//! Property-based tests for the geometry core.
//!
//! Run with: cargo test -p meshkit -- properties

use glam::{DQuat, DVec3};
use meshkit::aggregate::{aggregate_bounds, AggregateOptions, BoundedLeaf, BoundsRoot, Space};
use meshkit::ops::filter::{find_triangles, TriangleSearch};
use meshkit::ops::hull::{build_hull, convex_hull, HullOutcome};
use meshkit::ops::merge::append;
use meshkit::query::{is_point_on_surface, InteriorQuery};
use meshkit::{Bounds, MeshBuffer, Transform};
use proptest::prelude::*;

// =============================================================================
// Strategies
// =============================================================================

fn arb_point(range: f64) -> impl Strategy<Value = DVec3> {
    prop::array::uniform3(-range..range).prop_map(DVec3::from_array)
}

fn arb_bounds() -> impl Strategy<Value = Bounds> {
    (arb_point(50.0), prop::array::uniform3(0.0..10.0f64))
        .prop_map(|(center, size)| Bounds::new(center, DVec3::from_array(size)))
}

fn arb_frame() -> impl Strategy<Value = Transform> {
    (arb_point(20.0), prop::array::uniform3(-3.0..3.0f64), prop::array::uniform3(0.5..2.0f64)).prop_map(
        |(translation, [x, y, z], scale)| {
            let rotation = DQuat::from_euler(glam::EulerRot::XYZ, x, y, z);
            Transform::new(translation, rotation, DVec3::from_array(scale))
        },
    )
}

fn arb_leaf() -> impl Strategy<Value = BoundedLeaf> {
    (arb_bounds(), arb_frame()).prop_map(|(bounds, world)| BoundedLeaf::renderer(bounds, world))
}

fn arb_space() -> impl Strategy<Value = Space> {
    prop_oneof![Just(Space::World), Just(Space::Local)]
}

/// A mesh with `vertices` points and random in-range triangles.
fn arb_mesh(max_vertices: u32, max_triangles: usize) -> impl Strategy<Value = MeshBuffer> {
    (3..=max_vertices).prop_flat_map(move |n| {
        (
            prop::collection::vec(arb_point(10.0), n as usize),
            prop::collection::vec(prop::array::uniform3(0..n), 0..=max_triangles),
        )
            .prop_map(|(vertices, triangles)| {
                MeshBuffer::from_parts(vertices, triangles.into_iter().flatten().collect())
            })
    })
}

fn unit_cube() -> MeshBuffer {
    let corners: Vec<DVec3> = (0..8)
        .map(|i| DVec3::new(f64::from(i & 1), f64::from((i >> 1) & 1), f64::from((i >> 2) & 1)))
        .collect();
    convex_hull(&corners).unwrap()
}

// =============================================================================
// Aggregation
// =============================================================================

proptest! {
    #[test]
    fn aggregation_widens_monotonically(
        leaves in prop::collection::vec(arb_leaf(), 1..12),
        root_frame in arb_frame(),
        space in arb_space(),
    ) {
        let root = BoundsRoot {
            world: root_frame,
            local_position: DVec3::ZERO,
        };
        let options = AggregateOptions {
            space,
            ..AggregateOptions::default()
        };
        let mut previous: Option<Bounds> = None;
        for n in 1..=leaves.len() {
            let total = aggregate_bounds(&root, &leaves[..n], &options);
            if let Some(prev) = previous {
                prop_assert!(total.min().cmple(prev.min()).all());
                prop_assert!(total.max().cmpge(prev.max()).all());
            }
            previous = Some(total);
        }
    }

    #[test]
    fn aggregation_of_nothing_sits_on_root(position in arb_point(100.0)) {
        let root = BoundsRoot {
            world: Transform::from_translation(position),
            local_position: DVec3::ZERO,
        };
        let total = aggregate_bounds(&root, &[], &AggregateOptions::default());
        prop_assert_eq!(total.center(), position);
        prop_assert_eq!(total.extents(), DVec3::ZERO);
    }
}

// =============================================================================
// Merge
// =============================================================================

proptest! {
    #[test]
    fn append_sums_counts_and_shifts_indices(
        dst in arb_mesh(40, 20),
        src in arb_mesh(40, 20),
        offset in arb_point(5.0),
    ) {
        let mut merged = dst.clone();
        append(&mut merged, &src, offset, DQuat::IDENTITY, DVec3::ONE).unwrap();

        prop_assert_eq!(merged.vertex_count(), dst.vertex_count() + src.vertex_count());
        prop_assert_eq!(&merged.triangles()[..dst.triangles().len()], dst.triangles());
        let old = dst.vertex_count() as u32;
        let new = merged.vertex_count() as u32;
        for &i in &merged.triangles()[dst.triangles().len()..] {
            prop_assert!(i >= old && i < new);
        }
        prop_assert!(merged.validate().is_ok());
    }
}

#[test]
fn append_at_ceiling_leaves_destination_unchanged() {
    let big = MeshBuffer::from_parts(vec![DVec3::ZERO; 60_000], Vec::new());
    let extra = MeshBuffer::from_parts(vec![DVec3::ONE; 5_534], Vec::new());
    let mut dst = big.clone();
    assert!(append(&mut dst, &extra, DVec3::ZERO, DQuat::IDENTITY, DVec3::ONE).is_err());
    assert_eq!(dst, big);
}

// =============================================================================
// Filter
// =============================================================================

proptest! {
    #[test]
    fn filter_all_keeps_fully_inside_input(
        triangles in prop::collection::vec(0u32..100, 0..60),
        lo in 0u32..20,
    ) {
        let whole = triangles.len() / 3 * 3;
        let shifted: Vec<u32> = triangles[..whole].iter().map(|i| i + lo).collect();
        let hi = lo + 99;
        prop_assert_eq!(find_triangles(&shifted, lo, hi, TriangleSearch::All), shifted.clone());
        prop_assert!(find_triangles(&shifted, lo, hi, TriangleSearch::None).is_empty());
    }

    #[test]
    fn filter_partitions_any_and_none(
        triangles in prop::collection::vec(0u32..30, 0..60),
        lo in 0u32..30,
        width in 0u32..10,
    ) {
        let hi = lo + width;
        let any = find_triangles(&triangles, lo, hi, TriangleSearch::Any);
        let none = find_triangles(&triangles, lo, hi, TriangleSearch::None);
        prop_assert_eq!(any.len() + none.len(), triangles.len() / 3 * 3);
    }
}

// =============================================================================
// Queries and hull
// =============================================================================

proptest! {
    #[test]
    fn hull_of_cube_ignores_interior_points(
        interior in prop::collection::vec(prop::array::uniform3(0.01..0.99f64), 0..40),
    ) {
        let mut points: Vec<DVec3> = unit_cube().vertices().to_vec();
        points.extend(interior.into_iter().map(DVec3::from_array));
        let hull = build_hull(&points, 1e-10);
        prop_assert_eq!(hull.outcome(), HullOutcome::Success);
        let mesh = hull.mesh().unwrap();
        prop_assert_eq!(mesh.vertex_count(), 8);
        prop_assert_eq!(mesh.triangle_count(), 12);
    }

    #[test]
    fn interior_query_classifies_cube(
        inside in prop::array::uniform3(0.05..0.95f64),
        outside in prop::array::uniform3(1.5..3.0f64),
    ) {
        let query = InteriorQuery::new(&unit_cube());
        prop_assert!(query.contains(DVec3::from_array(inside)));
        prop_assert!(!query.contains(DVec3::from_array(outside)));
        prop_assert!(!query.contains(-DVec3::from_array(outside)));
    }

    #[test]
    fn points_on_triangle_are_on_surface(u in 0.01..0.98f64, t in 0.0..1.0f64) {
        let v = (1.0 - u) * t * 0.99;
        let mesh = MeshBuffer::from_parts(vec![DVec3::ZERO, DVec3::X, DVec3::Y], vec![0, 1, 2]);
        prop_assert!(is_point_on_surface(&mesh, DVec3::new(u, v, 0.0)));
        prop_assert!(!is_point_on_surface(&mesh, DVec3::new(u, v, 1.0)));
    }
}

// =============================================================================
// Reference cases
// =============================================================================

#[test]
fn surface_reference_points() {
    let mesh = MeshBuffer::from_parts(vec![DVec3::ZERO, DVec3::X, DVec3::Y], vec![0, 1, 2]);
    assert!(is_point_on_surface(&mesh, DVec3::new(0.25, 0.25, 0.0)));
    assert!(!is_point_on_surface(&mesh, DVec3::new(2.0, 2.0, 0.0)));
    assert!(!is_point_on_surface(&mesh, DVec3::new(0.25, 0.25, 1.0)));
}

#[test]
fn unit_cube_hull_is_closed_and_outward() {
    let cube = unit_cube();
    assert_eq!(cube.vertex_count(), 8);
    assert_eq!(cube.triangle_count(), 12);
    let center = DVec3::splat(0.5);
    for i in 0..cube.triangle_count() {
        let [a, b, c] = cube.triangle_positions(i);
        let normal = (b - a).cross(c - a);
        assert!(normal.dot((a + b + c) / 3.0 - center) > 0.0);
    }
}
