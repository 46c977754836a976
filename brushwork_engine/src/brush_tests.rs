// Copyright (C) 2026 the brushwork contributors
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use crate::math::{Aabb, Ray, ALMOST_ZERO, POINT_STATUS_EPSILON};
use crate::prelude::*;

fn world_bounds() -> Aabb {
    Aabb::new(Vec3::splat(-1024.0), Vec3::splat(1024.0))
}

fn brush_bounds() -> Aabb {
    Aabb::new(Vec3::splat(-32.0), Vec3::splat(32.0))
}

/// The standard test subject: a 64^3 box brush centred on the origin.
fn seed_brush() -> Brush {
    Brush::from_bounds(
        world_bounds(),
        brush_bounds(),
        &FaceAttributes::with_texture("base/metal1_1"),
    )
    .unwrap()
}

fn face(p0: Vec3, p1: Vec3, p2: Vec3) -> Face {
    Face::new(world_bounds(), p0, p1, p2, FaceAttributes::default()).unwrap()
}

/// A face whose plane is `x = offset` with the normal along +X.
fn face_at_x(offset: f32) -> Face {
    face(
        Vec3::new(offset, 0.0, 0.0),
        Vec3::new(offset, 0.0, 1.0),
        Vec3::new(offset, 1.0, 0.0),
    )
}

fn counts(brush: &Brush) -> (usize, usize, usize) {
    let geometry = brush.geometry();
    (
        geometry.num_vertices(),
        geometry.num_edges(),
        geometry.num_sides(),
    )
}

fn sorted_positions(brush: &Brush) -> Vec<Vec3Ord> {
    let mut positions = brush
        .vertex_positions()
        .into_iter()
        .map(|p| p.to_ord())
        .collect_vec();
    positions.sort();
    positions
}

fn has_vertex(brush: &Brush, position: Vec3) -> bool {
    brush.geometry().find_vertex(position, ALMOST_ZERO).is_some()
}

/// Checks the universal invariants: structural integrity, convexity against
/// every face plane, cached bounds, and consistent face/side back-links.
fn assert_valid(brush: &Brush) {
    brush.geometry().integrity().unwrap();

    for (_, face) in brush.iter_faces() {
        for (_, vertex) in brush.geometry().iter_vertices() {
            let distance = face.boundary().point_distance(vertex.position);
            assert!(
                distance <= POINT_STATUS_EPSILON,
                "Vertex {:?} is {distance} above a face plane",
                vertex.position
            );
        }
    }

    let recomputed = Aabb::of_points(brush.geometry().iter_vertices().map(|(_, v)| v.position));
    assert_eq!(recomputed, *brush.bounds());

    for (face_id, face) in brush.iter_faces() {
        let side_id = face.side().expect("Face detached from its side");
        assert_eq!(brush.geometry().side(side_id).face, Some(face_id));
    }
    for (side_id, side) in brush.geometry().iter_sides() {
        if let Some(face_id) = side.face {
            assert_eq!(brush.face(face_id).side(), Some(side_id));
        }
    }
}

#[test]
fn world_seeded_box_has_box_topology() {
    let brush = Brush::new(world_bounds());
    assert_eq!(counts(&brush), (8, 12, 6));
    assert!(!brush.closed());
    brush.geometry().integrity().unwrap();
    assert_eq!(*brush.bounds(), world_bounds());
}

#[test]
fn box_brush_is_closed() {
    let brush = seed_brush();
    assert_eq!(counts(&brush), (8, 12, 6));
    assert!(brush.closed());
    assert_eq!(brush.num_faces(), 6);
    assert_eq!(*brush.bounds(), brush_bounds());
    assert_eq!(brush.center(), Vec3::ZERO);
    assert_valid(&brush);

    for corner in brush_bounds().corners() {
        assert!(has_vertex(&brush, corner));
    }
}

#[test]
fn cut_in_half() {
    let mut brush = seed_brush();
    let mut dropped = Vec::new();
    let result = brush.add_face(face_at_x(0.0), &mut dropped).unwrap();

    assert_eq!(result, CutResult::Split);
    assert_eq!(counts(&brush), (8, 12, 6));
    assert!(brush.closed());
    assert_valid(&brush);

    // The old +X face is the caller's to destroy now.
    assert_eq!(dropped.len(), 1);
    assert!((dropped[0].boundary().normal - Vec3::X).length() < 1e-5);

    // The new side is a quad at x = 0.
    let new_face = brush
        .iter_faces()
        .find(|(_, f)| f.boundary().normal.abs_diff_eq(Vec3::X, 1e-5))
        .map(|(id, _)| id)
        .expect("No face with a +X normal");
    let side = brush.face(new_face).side().unwrap();
    let ring = &brush.geometry().side(side).vertices;
    assert_eq!(ring.len(), 4);
    for y in [-32.0, 32.0] {
        for z in [-32.0, 32.0] {
            assert!(has_vertex(&brush, Vec3::new(0.0, y, z)));
        }
    }
    assert_eq!(*brush.bounds(), Aabb::new(Vec3::splat(-32.0), Vec3::new(0.0, 32.0, 32.0)));
}

#[test]
fn fully_above_cut_is_redundant() {
    let mut brush = seed_brush();
    let before = sorted_positions(&brush);
    let mut dropped = Vec::new();

    let result = brush.add_face(face_at_x(64.0), &mut dropped).unwrap();

    assert_eq!(result, CutResult::Redundant);
    assert!(dropped.is_empty());
    assert_eq!(counts(&brush), (8, 12, 6));
    assert_eq!(sorted_positions(&brush), before);
    assert_valid(&brush);
}

#[test]
fn fully_below_cut_is_null() {
    let mut brush = seed_brush();
    let before = sorted_positions(&brush);
    let mut dropped = Vec::new();

    let result = brush.add_face(face_at_x(-64.0), &mut dropped).unwrap();

    assert_eq!(result, CutResult::Null);
    assert!(dropped.is_empty());
    assert_eq!(sorted_positions(&brush), before);
    assert_valid(&brush);
}

#[test]
fn coplanar_cut_is_redundant_and_brush_unchanged() {
    let mut brush = seed_brush();
    let before = sorted_positions(&brush);
    let faces_before = brush.num_faces();
    let mut dropped = Vec::new();

    // Same plane as the existing +X side.
    let result = brush.add_face(face_at_x(32.0), &mut dropped).unwrap();

    assert_eq!(result, CutResult::Redundant);
    assert!(dropped.is_empty());
    assert_eq!(brush.num_faces(), faces_before);
    assert_eq!(sorted_positions(&brush), before);
    assert_valid(&brush);
}

#[test]
fn corner_chamfer() {
    let mut brush = seed_brush();
    let mut dropped = Vec::new();

    let chamfer = face(
        Vec3::new(32.0, 32.0, 0.0),
        Vec3::new(32.0, 0.0, 32.0),
        Vec3::new(0.0, 32.0, 32.0),
    );
    let result = brush.add_face(chamfer, &mut dropped).unwrap();

    assert_eq!(result, CutResult::Split);
    assert!(dropped.is_empty());
    assert_eq!(counts(&brush), (10, 15, 7));
    assert!(brush.closed());
    assert_valid(&brush);

    // One new triangle, three pentagons, three untouched quads.
    let mut ring_sizes = brush
        .geometry()
        .iter_sides()
        .map(|(_, s)| s.vertices.len())
        .collect_vec();
    ring_sizes.sort();
    assert_eq!(ring_sizes, vec![3, 4, 4, 4, 5, 5, 5]);

    for position in [
        Vec3::new(32.0, 32.0, 0.0),
        Vec3::new(32.0, 0.0, 32.0),
        Vec3::new(0.0, 32.0, 32.0),
    ] {
        assert!(has_vertex(&brush, position));
    }
    assert!(!has_vertex(&brush, Vec3::splat(32.0)));
}

#[test]
fn cut_is_idempotent_after_chamfer() {
    let mut brush = seed_brush();
    let mut dropped = Vec::new();
    let chamfer = face(
        Vec3::new(32.0, 32.0, 0.0),
        Vec3::new(32.0, 0.0, 32.0),
        Vec3::new(0.0, 32.0, 32.0),
    );
    brush.add_face(chamfer, &mut dropped).unwrap();

    let before = sorted_positions(&brush);
    let again = face(
        Vec3::new(32.0, 32.0, 0.0),
        Vec3::new(32.0, 0.0, 32.0),
        Vec3::new(0.0, 32.0, 32.0),
    );
    let result = brush.add_face(again, &mut dropped).unwrap();

    assert_eq!(result, CutResult::Redundant);
    assert_eq!(sorted_positions(&brush), before);
    assert_valid(&brush);
}

#[test]
fn add_faces_rejects_empty_input() {
    let mut brush = Brush::new(world_bounds());
    let mut dropped = Vec::new();
    let err = brush.add_faces(Vec::new(), &mut dropped).unwrap_err();
    assert_eq!(
        err.downcast_ref::<GeometryError>(),
        Some(&GeometryError::NoFaces)
    );
}

#[test]
fn add_faces_reports_annihilation() {
    let mut brush = seed_brush();
    let mut dropped = Vec::new();
    let err = brush
        .add_faces(vec![face_at_x(-64.0)], &mut dropped)
        .unwrap_err();
    assert_eq!(
        err.downcast_ref::<GeometryError>(),
        Some(&GeometryError::BrushAnnihilated)
    );
}

#[test]
fn vertex_move_onto_neighbour_merges() {
    let mut brush = seed_brush();
    let corner = Vec3::splat(32.0);
    let delta = Vec3::new(-64.0, 0.0, 0.0);

    assert!(brush.can_move_vertex(corner, delta));
    let outcome = brush.move_vertex(corner, delta, true);
    assert_eq!(outcome.moved, MoveVertexResult::Deleted);

    // The result is the convex hull of the remaining seven corners: three
    // quads survive, the three sides at the old corner degenerate to
    // triangles, and a fourth triangle spans the gap.
    let (vertices, edges, sides) = counts(&brush);
    assert_eq!(vertices, 7);
    assert_eq!(vertices + sides, edges + 2);
    assert!(brush.closed());
    assert_valid(&brush);

    let mut ring_sizes = brush
        .geometry()
        .iter_sides()
        .map(|(_, s)| s.vertices.len())
        .collect_vec();
    ring_sizes.sort();
    assert_eq!(ring_sizes, vec![3, 3, 3, 3, 4, 4, 4]);
    assert!(!has_vertex(&brush, corner));
}

#[test]
fn vertex_drag_continues_past_a_merged_neighbour() {
    // Dragging the +++ corner straight down runs in several steps: the first
    // stops on the corner below and merges with it, re-inflating the bottom
    // quad around the surviving vertex; the rest of the drag re-triangulates
    // that quad and pulls the merged corner out below the brush.
    let mut brush = seed_brush();
    let corner = Vec3::splat(32.0);
    let delta = Vec3::new(0.0, 0.0, -96.0);

    assert!(brush.can_move_vertex(corner, delta));
    let outcome = brush.move_vertex(corner, delta, true);
    assert_eq!(outcome.moved, MoveVertexResult::Moved(Vec3::new(32.0, 32.0, -64.0)));

    assert!(has_vertex(&brush, Vec3::new(32.0, 32.0, -64.0)));
    assert!(!has_vertex(&brush, corner));
    assert!(!has_vertex(&brush, Vec3::new(32.0, 32.0, -32.0)));

    let (vertices, edges, sides) = counts(&brush);
    assert_eq!(vertices, 7);
    assert_eq!(vertices + sides, edges + 2);
    assert_eq!(
        *brush.bounds(),
        Aabb::new(Vec3::new(-32.0, -32.0, -64.0), Vec3::splat(32.0))
    );
    assert!(brush.closed());
    assert_valid(&brush);
}

#[test]
fn vertex_move_without_merge_is_cancelled() {
    let mut brush = seed_brush();
    let corner = Vec3::splat(32.0);
    let delta = Vec3::new(-64.0, 0.0, 0.0);
    let before = sorted_positions(&brush);

    let outcome = brush.move_vertex(corner, delta, false);
    assert_eq!(outcome.moved, MoveVertexResult::Unchanged);
    assert_eq!(sorted_positions(&brush), before);
    assert_valid(&brush);
}

#[test]
fn vertex_move_and_back_restores_positions() {
    let mut brush = seed_brush();
    let corner = Vec3::splat(32.0);
    let delta = Vec3::new(16.0, 0.0, 0.0);
    let before = sorted_positions(&brush);

    assert!(brush.can_move_vertex(corner, delta));
    let outcome = brush.move_vertex(corner, delta, true);
    assert_eq!(outcome.moved, MoveVertexResult::Moved(corner + delta));
    assert_valid(&brush);

    assert!(brush.can_move_vertex(corner + delta, -delta));
    let outcome = brush.move_vertex(corner + delta, -delta, true);
    assert_eq!(outcome.moved, MoveVertexResult::Moved(corner));
    assert_valid(&brush);

    let after = sorted_positions(&brush);
    assert_eq!(before.len(), after.len());
    for (b, a) in before.iter().zip(&after) {
        assert!(b.to_vec().abs_diff_eq(a.to_vec(), ALMOST_ZERO));
    }
}

#[test]
fn face_move_preserves_identity() {
    let mut brush = seed_brush();
    let delta = Vec3::new(0.0, 0.0, 32.0);

    let top_loop = SideLocator::new(vec![
        Vec3::new(-32.0, -32.0, 32.0),
        Vec3::new(-32.0, 32.0, 32.0),
        Vec3::new(32.0, 32.0, 32.0),
        Vec3::new(32.0, -32.0, 32.0),
    ]);
    let top_side = brush
        .geometry()
        .find_side(&top_loop.vertices, ALMOST_ZERO)
        .expect("No top side");
    let top_face = brush.geometry().side(top_side).face.unwrap();

    assert!(brush.can_move_faces(std::slice::from_ref(&top_loop), delta));
    let outcome = brush.move_faces(std::slice::from_ref(&top_loop), delta);

    assert_eq!(outcome.moved.len(), 1);
    assert_eq!(
        *brush.bounds(),
        Aabb::new(Vec3::splat(-32.0), Vec3::new(32.0, 32.0, 64.0))
    );
    assert_eq!(counts(&brush), (8, 12, 6));
    assert!(brush.closed());
    assert_valid(&brush);

    // The lifted quad still realizes the same face object.
    let moved_side = brush
        .geometry()
        .find_side(&outcome.moved[0].vertices, ALMOST_ZERO)
        .expect("Top side missing after move");
    assert_eq!(brush.geometry().side(moved_side).face, Some(top_face));
}

#[test]
fn edge_move_tilts_the_top_face() {
    let mut brush = seed_brush();
    let edge = EdgeLocator::new(Vec3::new(-32.0, -32.0, 32.0), Vec3::new(32.0, -32.0, 32.0));
    let delta = Vec3::new(0.0, 0.0, 16.0);

    assert!(brush.can_move_edges(&[edge], delta));
    let outcome = brush.move_edges(&[edge], delta);

    assert_eq!(outcome.moved, vec![edge.translated(delta)]);
    assert!(brush
        .geometry()
        .find_edge(
            Vec3::new(-32.0, -32.0, 48.0),
            Vec3::new(32.0, -32.0, 48.0),
            ALMOST_ZERO
        )
        .is_some());

    // Lifting one rim of the top quad leaves it planar but tilted; the box
    // topology survives.
    assert_eq!(counts(&brush), (8, 12, 6));
    assert!(brush.closed());
    assert_valid(&brush);
}

#[test]
fn split_edge_introduces_midpoint_vertex() {
    let mut brush = seed_brush();
    let edge = EdgeLocator::new(Vec3::new(-32.0, -32.0, 32.0), Vec3::new(32.0, -32.0, 32.0));
    let delta = Vec3::new(0.0, 0.0, 16.0);

    assert!(brush.can_split_edge(&edge, delta));
    let outcome = brush.split_edge(&edge, delta);

    assert_eq!(outcome.moved, Vec3::new(0.0, -32.0, 48.0));
    assert!(has_vertex(&brush, outcome.moved));
    assert_eq!(brush.geometry().num_vertices(), 9);
    assert!(brush.closed());
    assert_valid(&brush);
}

#[test]
fn split_edge_rejects_indenting_drag() {
    let brush = seed_brush();
    let edge = EdgeLocator::new(Vec3::new(-32.0, -32.0, 32.0), Vec3::new(32.0, -32.0, 32.0));
    assert!(!brush.can_split_edge(&edge, Vec3::new(0.0, 0.0, -16.0)));
}

#[test]
fn split_face_builds_pyramid() {
    let mut brush = seed_brush();
    let top_loop = SideLocator::new(vec![
        Vec3::new(-32.0, -32.0, 32.0),
        Vec3::new(-32.0, 32.0, 32.0),
        Vec3::new(32.0, 32.0, 32.0),
        Vec3::new(32.0, -32.0, 32.0),
    ]);
    let delta = Vec3::new(0.0, 0.0, 16.0);

    assert!(brush.can_split_face(&top_loop, delta));
    let outcome = brush.split_face(&top_loop, delta);

    assert_eq!(outcome.moved, Vec3::new(0.0, 0.0, 48.0));
    let (vertices, edges, sides) = counts(&brush);
    assert_eq!(vertices, 9);
    assert_eq!(sides, 9);
    assert_eq!(vertices + sides, edges + 2);
    assert!(brush.closed());
    assert_valid(&brush);
}

#[test]
fn split_face_rejects_tangent_drag() {
    let brush = seed_brush();
    let top_loop = SideLocator::new(vec![
        Vec3::new(-32.0, -32.0, 32.0),
        Vec3::new(-32.0, 32.0, 32.0),
        Vec3::new(32.0, 32.0, 32.0),
        Vec3::new(32.0, -32.0, 32.0),
    ]);
    assert!(!brush.can_split_face(&top_loop, Vec3::new(16.0, 0.0, 0.0)));
}

#[test]
fn snap_is_idempotent() {
    let mut brush = Brush::from_bounds(
        world_bounds(),
        Aabb::new(Vec3::splat(-30.3), Vec3::splat(29.2)),
        &FaceAttributes::default(),
    )
    .unwrap();

    brush.snap(16.0);
    assert_eq!(*brush.bounds(), Aabb::new(Vec3::splat(-32.0), Vec3::splat(32.0)));
    assert_valid(&brush);

    let before = sorted_positions(&brush);
    let delta = brush.snap(16.0);
    assert!(delta.new.is_empty());
    assert!(delta.dropped.is_empty());
    assert_eq!(sorted_positions(&brush), before);
}

#[test]
fn correct_rounds_drifted_coordinates() {
    // Drift beyond the construction-time tolerance, within the requested one.
    let mut brush = Brush::from_bounds(
        world_bounds(),
        Aabb::new(Vec3::splat(-32.004), Vec3::splat(31.996)),
        &FaceAttributes::default(),
    )
    .unwrap();
    assert!(has_vertex(&brush, Vec3::splat(-32.004)));

    brush.correct(0.01);
    assert_eq!(*brush.bounds(), Aabb::new(Vec3::splat(-32.0), Vec3::splat(32.0)));
    assert_valid(&brush);
}

#[test]
fn translate_shifts_everything() {
    let mut brush = seed_brush();
    let delta = Vec3::new(16.0, 8.0, -4.0);
    brush.translate(delta);

    assert_eq!(
        *brush.bounds(),
        Aabb::new(Vec3::splat(-32.0) + delta, Vec3::splat(32.0) + delta)
    );
    assert!(brush.closed());
    assert_valid(&brush);
    assert!(brush.contains_point(delta));
    assert!(!brush.contains_point(Vec3::splat(-31.0)));
}

#[test]
fn contains_and_intersects_points_and_brushes() {
    let brush = seed_brush();

    assert!(brush.contains_point(Vec3::ZERO));
    assert!(brush.contains_point(Vec3::new(32.0, 0.0, 0.0)));
    assert!(!brush.contains_point(Vec3::new(33.0, 0.0, 0.0)));

    let inner = Brush::from_bounds(
        world_bounds(),
        Aabb::new(Vec3::splat(-16.0), Vec3::splat(16.0)),
        &FaceAttributes::default(),
    )
    .unwrap();
    assert!(brush.contains_brush(&inner));
    assert!(!inner.contains_brush(&brush));
    assert!(brush.intersects_brush(&inner));
    assert!(inner.intersects_brush(&brush));

    let offset = Brush::from_bounds(
        world_bounds(),
        Aabb::new(Vec3::splat(0.0), Vec3::splat(64.0)),
        &FaceAttributes::default(),
    )
    .unwrap();
    assert!(brush.intersects_brush(&offset));
    assert!(!brush.contains_brush(&offset));

    let disjoint = Brush::from_bounds(
        world_bounds(),
        Aabb::new(Vec3::splat(100.0), Vec3::splat(164.0)),
        &FaceAttributes::default(),
    )
    .unwrap();
    assert!(!brush.intersects_brush(&disjoint));
    assert!(!disjoint.intersects_brush(&brush));
}

#[test]
fn separating_face_means_no_intersection() {
    // Chamfer the +++ corner of A deeply and tuck B into the void: the two
    // bounding boxes overlap, but A's chamfer face has every vertex of B
    // strictly above it.
    let mut a = seed_brush();
    let mut dropped = Vec::new();
    let chamfer = face(
        Vec3::new(48.0, 0.0, 0.0),
        Vec3::new(0.0, 0.0, 48.0),
        Vec3::new(0.0, 48.0, 0.0),
    );
    assert_eq!(a.add_face(chamfer, &mut dropped).unwrap(), CutResult::Split);

    let b = Brush::from_bounds(
        world_bounds(),
        Aabb::new(Vec3::splat(24.0), Vec3::splat(31.0)),
        &FaceAttributes::default(),
    )
    .unwrap();

    assert!(a.bounds().intersects_aabb(b.bounds()));
    assert!(!a.intersects_brush(&b));
    assert!(!b.intersects_brush(&a));
}

#[test]
fn entity_predicates() {
    let brush = seed_brush();

    let inside = Aabb::new(Vec3::splat(-8.0), Vec3::splat(8.0));
    assert!(brush.contains_entity(&inside));
    assert!(brush.intersects_entity(&inside));

    let straddling = Aabb::new(Vec3::splat(16.0), Vec3::splat(48.0));
    assert!(!brush.contains_entity(&straddling));
    assert!(brush.intersects_entity(&straddling));

    let outside = Aabb::new(Vec3::splat(64.0), Vec3::splat(96.0));
    assert!(!brush.contains_entity(&outside));
    assert!(!brush.intersects_entity(&outside));
}

#[test]
fn pick_hits_nearest_side() {
    let brush = seed_brush();

    let ray = Ray::new(Vec3::new(-100.0, 0.0, 0.0), Vec3::X);
    let hit = brush.pick(&ray).expect("Ray should hit the brush");
    assert!((hit.distance - 68.0).abs() < 1e-4);
    assert_eq!(hit.position, Vec3::new(-32.0, 0.0, 0.0));
    assert!(brush
        .face(hit.face)
        .boundary()
        .normal
        .abs_diff_eq(-Vec3::X, 1e-5));

    let miss = Ray::new(Vec3::new(-100.0, 64.0, 0.0), Vec3::X);
    assert!(brush.pick(&miss).is_none());

    let away = Ray::new(Vec3::new(-100.0, 0.0, 0.0), -Vec3::X);
    assert!(brush.pick(&away).is_none());
}

#[test]
fn template_copy_matches_original() {
    let mut original = seed_brush();
    let mut dropped = Vec::new();
    let chamfer = face(
        Vec3::new(32.0, 32.0, 0.0),
        Vec3::new(32.0, 0.0, 32.0),
        Vec3::new(0.0, 32.0, 32.0),
    );
    original.add_face(chamfer, &mut dropped).unwrap();

    let copy = Brush::from_template(world_bounds(), &original).unwrap();
    assert_eq!(counts(&copy), counts(&original));
    assert_eq!(sorted_positions(&copy), sorted_positions(&original));
    assert!(copy.closed());
    assert_valid(&copy);
}

#[test]
fn predicates_leave_the_brush_untouched() {
    let brush = seed_brush();
    let before = sorted_positions(&brush);
    let corner = Vec3::splat(32.0);

    assert!(brush.can_move_vertex(corner, Vec3::new(-64.0, 0.0, 0.0)));
    assert!(brush.can_move_vertices(&[corner], Vec3::new(16.0, 16.0, 16.0)));
    assert!(!brush.can_move_vertices(&[Vec3::splat(500.0)], Vec3::X));
    assert!(!brush.can_move_vertices(&[corner], Vec3::ZERO));

    // Dragging past the world bounds must be rejected.
    assert!(!brush.can_move_vertices(&[corner], Vec3::new(1100.0, 0.0, 0.0)));

    assert_eq!(sorted_positions(&brush), before);
    assert_eq!(counts(&brush), (8, 12, 6));
    assert_valid(&brush);
}
