// Copyright (C) 2026 the brushwork contributors
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use float_ord::FloatOrd;
use glam::Vec3;
use slotmap::SlotMap;

use crate::math::{correct_vec3, is_neg, Plane, ALMOST_ZERO, POINT_STATUS_EPSILON};
use crate::prelude::*;

use super::{cleanup, Brush, BrushGeometry, Edge, EdgeId, Face, FaceId, Side, SideId, VertexId};

/// Result of moving a single vertex.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MoveVertexResult {
    /// The move would have produced an invalid brush; nothing changed.
    Unchanged,
    /// The vertex now sits at the reported position.
    Moved(Vec3),
    /// The vertex was merged into a neighbour and no longer exists.
    Deleted,
}

/// The face bookkeeping every mutating operation reports back: faces the
/// operation created (now owned by the brush) and faces it released (now the
/// caller's to destroy).
#[derive(Debug, Default)]
pub struct FaceDelta {
    pub new: Vec<FaceId>,
    pub dropped: Vec<Face>,
}

#[derive(Debug)]
pub struct MoveOutcome<T> {
    pub moved: T,
    pub faces: FaceDelta,
}

/// Identifies an edge by its endpoint positions, which survive topology
/// changes where ids do not.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeLocator {
    pub start: Vec3,
    pub end: Vec3,
}

impl EdgeLocator {
    pub fn new(start: Vec3, end: Vec3) -> Self {
        Self { start, end }
    }

    pub fn translated(&self, delta: Vec3) -> Self {
        Self::new(self.start + delta, self.end + delta)
    }
}

/// Identifies a side by its vertex loop, up to rotation.
#[derive(Debug, Clone, PartialEq)]
pub struct SideLocator {
    pub vertices: Vec<Vec3>,
}

impl SideLocator {
    pub fn new(vertices: Vec<Vec3>) -> Self {
        Self { vertices }
    }

    pub fn translated(&self, delta: Vec3) -> Self {
        Self::new(self.vertices.iter().map(|v| *v + delta).collect())
    }
}

enum VertexMove {
    Unchanged,
    Moved(VertexId),
    Deleted,
}

/// Per-operation face bookkeeping. Triangulation spawns copies of a face, one
/// per triangle; when a side is dropped again during cleanup a copy is
/// promoted to replace the original where possible, so callers see a stable
/// face identity wherever one triangle of the original remains. Only the
/// copies that survive the whole operation are reported as new.
#[derive(Debug, Default)]
pub(crate) struct FaceManager {
    copies: BTreeMap<FaceId, Vec<FaceId>>,
    dropped: Vec<Face>,
}

impl FaceManager {
    pub(crate) fn add_copy(&mut self, original: FaceId, copy: FaceId) {
        debug_assert!(original != copy);
        self.copies.entry(original).or_default().push(copy);
    }

    /// Detaches and accounts for the face of a side that is going away. An
    /// original with live copies is promoted into one of them; a copy is
    /// destroyed silently; any other face is released to the caller.
    pub(crate) fn drop_side_face(
        &mut self,
        faces: &mut SlotMap<FaceId, Face>,
        geometry: &mut BrushGeometry,
        side_id: SideId,
    ) {
        let Some(face_id) = geometry.sides[side_id].face.take() else {
            return;
        };

        if let Some(face_copies) = self.copies.get_mut(&face_id) {
            debug_assert!(!face_copies.is_empty());
            let copy_id = face_copies.remove(0);
            if face_copies.is_empty() {
                self.copies.remove(&face_id);
            }
            let copy = faces.remove(copy_id).expect("Face copy was already removed");
            if let Some(copy_side) = copy.side() {
                geometry.sides[copy_side].face = Some(face_id);
                faces[face_id].set_side(Some(copy_side));
            }
            return;
        }

        let was_copy = self.copies.values_mut().any(|face_copies| {
            if let Some(i) = face_copies.iter().position(|c| *c == face_id) {
                face_copies.remove(i);
                true
            } else {
                false
            }
        });
        self.copies.retain(|_, face_copies| !face_copies.is_empty());

        if was_copy {
            faces.remove(face_id);
        } else {
            let mut face = faces.remove(face_id).expect("Face was already removed");
            face.set_side(None);
            self.dropped.push(face);
        }
    }

    pub(crate) fn into_delta(self) -> FaceDelta {
        FaceDelta {
            new: self.copies.into_values().flatten().collect(),
            dropped: self.dropped,
        }
    }
}

impl Brush {
    /// Whether every position in `positions` names a vertex that can be moved
    /// by `delta` while keeping the brush convex, at least four-sided and
    /// inside the world bounds. Runs the move on a throwaway copy; the brush
    /// itself is untouched.
    pub fn can_move_vertices(&self, positions: &[Vec3], delta: Vec3) -> bool {
        if delta == Vec3::ZERO {
            return false;
        }
        let mut test = self.clone();
        let mut manager = FaceManager::default();

        for position in sorted_against(positions.iter_cpy(), delta) {
            let Some(vertex_id) = test.geometry.find_vertex(position, ALMOST_ZERO) else {
                return false;
            };
            let start = test.geometry.vertices[vertex_id].position;
            if matches!(
                move_vertex_core(&mut test, vertex_id, true, start, start + delta, &mut manager),
                VertexMove::Unchanged
            ) {
                return false;
            }
        }

        test.geometry.num_sides() >= 3 && self.world_bounds.contains_aabb(test.geometry.bounds())
    }

    pub fn can_move_vertex(&self, position: Vec3, delta: Vec3) -> bool {
        self.can_move_vertices(&[position], delta)
    }

    /// Moves the named vertices by `delta`, merging vertices that land on an
    /// adjacent one. Returns the new positions of the vertices that survived.
    /// The corresponding `can_move_vertices` must hold.
    #[profiling::function]
    pub fn move_vertices(&mut self, positions: &[Vec3], delta: Vec3) -> MoveOutcome<Vec<Vec3>> {
        debug_assert!(self.can_move_vertices(positions, delta));

        let mut manager = FaceManager::default();
        let mut moved = Vec::new();
        for position in sorted_against(positions.iter_cpy(), delta) {
            let vertex_id = self
                .geometry
                .find_vertex(position, ALMOST_ZERO)
                .expect("Vertex vanished mid-move");
            let start = self.geometry.vertices[vertex_id].position;
            let result = move_vertex_core(self, vertex_id, true, start, start + delta, &mut manager);
            if let VertexMove::Moved(id) = result {
                moved.push(id);
            }
            self.update_face_points(&mut manager);
        }

        let positions = moved
            .into_iter()
            .map(|id| self.geometry.vertices[id].position)
            .collect();
        MoveOutcome {
            moved: positions,
            faces: manager.into_delta(),
        }
    }

    /// Moves a single vertex, reporting what became of it. With
    /// `merge_if_colocated`, a vertex landing exactly on an adjacent one
    /// collapses the connecting edge; otherwise such a landing cancels the
    /// move.
    #[profiling::function]
    pub fn move_vertex(
        &mut self,
        position: Vec3,
        delta: Vec3,
        merge_if_colocated: bool,
    ) -> MoveOutcome<MoveVertexResult> {
        let mut manager = FaceManager::default();
        let Some(vertex_id) = self.geometry.find_vertex(position, ALMOST_ZERO) else {
            return MoveOutcome {
                moved: MoveVertexResult::Unchanged,
                faces: FaceDelta::default(),
            };
        };
        if delta == Vec3::ZERO {
            return MoveOutcome {
                moved: MoveVertexResult::Unchanged,
                faces: FaceDelta::default(),
            };
        }

        // An unchanged result must mean the delta was not applied at all, so
        // a move that gives up partway is undone wholesale.
        let snapshot = (self.geometry.clone(), self.faces.clone());

        let start = self.geometry.vertices[vertex_id].position;
        let result = move_vertex_core(
            self,
            vertex_id,
            merge_if_colocated,
            start,
            start + delta,
            &mut manager,
        );
        if matches!(result, VertexMove::Unchanged) {
            (self.geometry, self.faces) = snapshot;
            return MoveOutcome {
                moved: MoveVertexResult::Unchanged,
                faces: FaceDelta::default(),
            };
        }
        self.update_face_points(&mut manager);

        let moved = match result {
            VertexMove::Unchanged => MoveVertexResult::Unchanged,
            VertexMove::Moved(id) => MoveVertexResult::Moved(self.geometry.vertices[id].position),
            VertexMove::Deleted => MoveVertexResult::Deleted,
        };
        MoveOutcome {
            moved,
            faces: manager.into_delta(),
        }
    }

    /// Whether every named edge can be translated by `delta`. Merging is
    /// forbidden, and each edge must still exist at its translated position
    /// afterwards.
    pub fn can_move_edges(&self, edges: &[EdgeLocator], delta: Vec3) -> bool {
        if delta == Vec3::ZERO {
            return false;
        }
        let mut test = self.clone();
        let mut manager = FaceManager::default();

        let endpoints = edges.iter().flat_map(|e| [e.start, e.end]);
        for position in sorted_against(endpoints, delta) {
            let Some(vertex_id) = test.geometry.find_vertex(position, ALMOST_ZERO) else {
                return false;
            };
            let start = test.geometry.vertices[vertex_id].position;
            if !matches!(
                move_vertex_core(&mut test, vertex_id, false, start, start + delta, &mut manager),
                VertexMove::Moved(_)
            ) {
                return false;
            }
        }

        edges.iter().all(|edge| {
            let translated = edge.translated(delta);
            test.geometry
                .find_edge(translated.start, translated.end, ALMOST_ZERO)
                .is_some()
        }) && test.geometry.num_sides() >= 3
            && self.world_bounds.contains_aabb(test.geometry.bounds())
    }

    /// Translates the named edges by `delta`. The corresponding
    /// `can_move_edges` must hold.
    #[profiling::function]
    pub fn move_edges(&mut self, edges: &[EdgeLocator], delta: Vec3) -> MoveOutcome<Vec<EdgeLocator>> {
        debug_assert!(self.can_move_edges(edges, delta));

        let mut manager = FaceManager::default();
        let endpoints = edges.iter().flat_map(|e| [e.start, e.end]);
        for position in sorted_against(endpoints, delta) {
            let vertex_id = self
                .geometry
                .find_vertex(position, ALMOST_ZERO)
                .expect("Edge endpoint vanished mid-move");
            let start = self.geometry.vertices[vertex_id].position;
            let result = move_vertex_core(self, vertex_id, false, start, start + delta, &mut manager);
            debug_assert!(matches!(result, VertexMove::Moved(_)));
            self.update_face_points(&mut manager);
        }

        let moved = edges
            .iter()
            .map(|edge| {
                let translated = edge.translated(delta);
                debug_assert!(self
                    .geometry
                    .find_edge(translated.start, translated.end, ALMOST_ZERO)
                    .is_some());
                translated
            })
            .collect();
        MoveOutcome {
            moved,
            faces: manager.into_delta(),
        }
    }

    /// Whether every named side can be translated by `delta`. Merging is
    /// forbidden, and each translated vertex loop must still identify a side
    /// afterwards.
    pub fn can_move_faces(&self, sides: &[SideLocator], delta: Vec3) -> bool {
        if delta == Vec3::ZERO {
            return false;
        }
        let mut test = self.clone();
        let mut manager = FaceManager::default();

        let loop_vertices = sides.iter().flat_map(|s| s.vertices.iter_cpy());
        for position in sorted_against(loop_vertices, delta) {
            let Some(vertex_id) = test.geometry.find_vertex(position, ALMOST_ZERO) else {
                return false;
            };
            let start = test.geometry.vertices[vertex_id].position;
            if !matches!(
                move_vertex_core(&mut test, vertex_id, false, start, start + delta, &mut manager),
                VertexMove::Moved(_)
            ) {
                return false;
            }
        }

        sides.iter().all(|side| {
            let translated = side.translated(delta);
            test.geometry
                .find_side(&translated.vertices, ALMOST_ZERO)
                .is_some()
        }) && test.geometry.num_sides() >= 3
            && self.world_bounds.contains_aabb(test.geometry.bounds())
    }

    /// Translates the named sides by `delta`, preserving face identities. The
    /// corresponding `can_move_faces` must hold.
    #[profiling::function]
    pub fn move_faces(&mut self, sides: &[SideLocator], delta: Vec3) -> MoveOutcome<Vec<SideLocator>> {
        debug_assert!(self.can_move_faces(sides, delta));

        let mut manager = FaceManager::default();
        let loop_vertices = sides.iter().flat_map(|s| s.vertices.iter_cpy());
        for position in sorted_against(loop_vertices, delta) {
            let vertex_id = self
                .geometry
                .find_vertex(position, ALMOST_ZERO)
                .expect("Side vertex vanished mid-move");
            let start = self.geometry.vertices[vertex_id].position;
            let result = move_vertex_core(self, vertex_id, false, start, start + delta, &mut manager);
            debug_assert!(matches!(result, VertexMove::Moved(_)));
        }
        self.update_face_points(&mut manager);

        let moved = sides
            .iter()
            .map(|side| {
                let translated = side.translated(delta);
                debug_assert!(self
                    .geometry
                    .find_side(&translated.vertices, ALMOST_ZERO)
                    .is_some());
                translated
            })
            .collect();
        MoveOutcome {
            moved,
            faces: manager.into_delta(),
        }
    }

    /// Whether the named edge can be split at its midpoint with the new
    /// vertex dragged by `delta`. Dragging against either incident face
    /// normal would indent the brush, so that is rejected up front, with a
    /// little leeway so near-tangent drags still work.
    pub fn can_split_edge(&self, edge: &EdgeLocator, delta: Vec3) -> bool {
        let Some(edge_id) = self.geometry.find_edge(edge.start, edge.end, ALMOST_ZERO) else {
            return false;
        };

        let e = &self.geometry.edges[edge_id];
        let left_normal = self.side_face_normal(e.left.expect("Edge without a left side"));
        let right_normal = self.side_face_normal(e.right.expect("Edge without a right side"));
        if is_neg(delta.dot(left_normal), POINT_STATUS_EPSILON)
            || is_neg(delta.dot(right_normal), POINT_STATUS_EPSILON)
        {
            return false;
        }

        let mut test = self.clone();
        let mut manager = FaceManager::default();
        let test_edge = test
            .geometry
            .find_edge(edge.start, edge.end, ALMOST_ZERO)
            .expect("Edge exists in the clone");
        let new_vertex = split_edge_mid(&mut test.geometry, test_edge);
        let start = test.geometry.vertices[new_vertex].position;
        matches!(
            move_vertex_core(&mut test, new_vertex, false, start, start + delta, &mut manager),
            VertexMove::Moved(_)
        ) && test.geometry.num_sides() >= 3
            && self.world_bounds.contains_aabb(test.geometry.bounds())
    }

    /// Splits the named edge at its midpoint and drags the new vertex by
    /// `delta`. Returns the vertex's final position. The corresponding
    /// `can_split_edge` must hold.
    #[profiling::function]
    pub fn split_edge(&mut self, edge: &EdgeLocator, delta: Vec3) -> MoveOutcome<Vec3> {
        debug_assert!(self.can_split_edge(edge, delta));

        let edge_id = self
            .geometry
            .find_edge(edge.start, edge.end, ALMOST_ZERO)
            .expect("Edge to split not found");
        let mut manager = FaceManager::default();
        let new_vertex = split_edge_mid(&mut self.geometry, edge_id);
        let start = self.geometry.vertices[new_vertex].position;
        let result = move_vertex_core(self, new_vertex, false, start, start + delta, &mut manager);
        self.update_face_points(&mut manager);

        let VertexMove::Moved(id) = result else {
            panic!("split_edge precondition violated");
        };
        MoveOutcome {
            moved: self.geometry.vertices[id].position,
            faces: manager.into_delta(),
        }
    }

    /// Whether the named side can be split at its centroid with the new
    /// vertex dragged by `delta`. A drag tangent to the face plane would
    /// indent the brush and is rejected.
    pub fn can_split_face(&self, side: &SideLocator, delta: Vec3) -> bool {
        let Some(side_id) = self.geometry.find_side(&side.vertices, ALMOST_ZERO) else {
            return false;
        };

        let normal = self.side_face_normal(side_id);
        if delta.dot(normal).abs() <= ALMOST_ZERO {
            return false;
        }

        let mut test = self.clone();
        let mut manager = FaceManager::default();
        let test_side = test
            .geometry
            .find_side(&side.vertices, ALMOST_ZERO)
            .expect("Side exists in the clone");
        let new_vertex = split_side_fan(&mut test, test_side, &mut manager);
        let start = test.geometry.vertices[new_vertex].position;
        matches!(
            move_vertex_core(&mut test, new_vertex, false, start, start + delta, &mut manager),
            VertexMove::Moved(_)
        ) && test.geometry.num_sides() >= 3
            && self.world_bounds.contains_aabb(test.geometry.bounds())
    }

    /// Fan-triangulates the named side around its centroid and drags the new
    /// central vertex by `delta`. Returns the vertex's final position. The
    /// corresponding `can_split_face` must hold.
    #[profiling::function]
    pub fn split_face(&mut self, side: &SideLocator, delta: Vec3) -> MoveOutcome<Vec3> {
        debug_assert!(self.can_split_face(side, delta));

        let side_id = self
            .geometry
            .find_side(&side.vertices, ALMOST_ZERO)
            .expect("Side to split not found");
        let mut manager = FaceManager::default();
        let new_vertex = split_side_fan(self, side_id, &mut manager);
        let start = self.geometry.vertices[new_vertex].position;
        let result = move_vertex_core(self, new_vertex, false, start, start + delta, &mut manager);
        self.update_face_points(&mut manager);

        let VertexMove::Moved(id) = result else {
            panic!("split_face precondition violated");
        };
        MoveOutcome {
            moved: self.geometry.vertices[id].position,
            faces: manager.into_delta(),
        }
    }

    /// Rounds every vertex coordinate to the nearest multiple of `grid_size`,
    /// as a sequence of merging single-vertex moves.
    #[profiling::function]
    pub fn snap(&mut self, grid_size: f32) -> FaceDelta {
        debug_assert!(grid_size > 0.0);
        self.move_towards(|start| (start / grid_size).round() * grid_size)
    }

    /// Rounds every vertex coordinate to the nearest integer when within
    /// `epsilon` of it, undoing floating-point drift.
    #[profiling::function]
    pub fn correct(&mut self, epsilon: f32) -> FaceDelta {
        debug_assert!(epsilon >= 0.0);
        self.move_towards(|start| correct_vec3(start, epsilon))
    }

    fn move_towards(&mut self, target: impl Fn(Vec3) -> Vec3) -> FaceDelta {
        let mut targets = BTreeMap::new();
        for vertex in self.geometry.vertices.values() {
            let start = vertex.position;
            let end = target(start);
            if start != end {
                targets.insert(start.to_ord(), end);
            }
        }
        if targets.is_empty() {
            return FaceDelta::default();
        }

        let mut manager = FaceManager::default();
        for (start, end) in targets {
            let start = start.to_vec();
            // The vertex may already have been merged away by an earlier step.
            if let Some(vertex_id) = self.geometry.find_vertex(start, ALMOST_ZERO) {
                let actual = self.geometry.vertices[vertex_id].position;
                if actual != end {
                    move_vertex_core(self, vertex_id, true, actual, end, &mut manager);
                }
            }
            self.update_face_points(&mut manager);
        }
        manager.into_delta()
    }

    /// Rigid translation of the whole brush: vertices, face seed points,
    /// bounds and centroid.
    pub fn translate(&mut self, delta: Vec3) {
        self.geometry.translate(delta);
        for face in self.faces.values_mut() {
            face.translate(delta);
        }
    }

    fn side_face_normal(&self, side_id: SideId) -> Vec3 {
        let face_id = self.geometry.sides[side_id]
            .face
            .expect("Operation requires a closed brush");
        self.faces[face_id].boundary().normal
    }
}

/// Positions sorted by decreasing dot product with `delta`, so the vertex
/// farthest along the move direction travels first and trailing vertices
/// cannot overrun it mid-operation.
fn sorted_against(positions: impl Iterator<Item = Vec3>, delta: Vec3) -> Vec<Vec3> {
    let mut sorted = positions.collect_vec();
    sorted.sort_by_key(|p| std::cmp::Reverse(FloatOrd(p.dot(delta))));
    sorted
}

/// Moves one vertex from `start` towards `end` in discrete steps, keeping the
/// brush convex after every step. Each step triangulates the incident sides,
/// advances to the nearest constraint plane crossing, resolves colocations,
/// and runs the merge passes.
#[profiling::function]
fn move_vertex_core(
    brush: &mut Brush,
    vertex_id: VertexId,
    merge_if_colocated: bool,
    start: Vec3,
    end: Vec3,
    manager: &mut FaceManager,
) -> VertexMove {
    debug_assert!(start != end);
    debug_assert!(brush.geometry.integrity().is_ok());

    let mut last_frac = 0.0f32;
    while brush.geometry.vertices[vertex_id].position != end {
        let last_position = brush.geometry.vertices[vertex_id].position;

        triangulate_incident(brush, vertex_id, end, manager);

        let Some(min_frac) = min_move_fraction(&brush.geometry, vertex_id, start, end, last_frac)
        else {
            // Constraint planes degenerated; stop gracefully where we are.
            log::warn!("Aborting vertex move: constraint plane points are colinear");
            run_merge_passes(brush, manager);
            return VertexMove::Unchanged;
        };
        debug_assert!(min_frac > last_frac);
        last_frac = min_frac;

        brush.geometry.vertices[vertex_id].position = if last_frac >= 1.0 {
            end
        } else {
            lerp(start, end, last_frac)
        };

        // Did the vertex land on another one?
        let mut merged = false;
        let position = brush.geometry.vertices[vertex_id].position;
        let colocated = brush
            .geometry
            .vertices
            .iter()
            .find(|(id, v)| *id != vertex_id && v.position.abs_diff_eq(position, ALMOST_ZERO))
            .map(|(id, _)| id);
        if let Some(candidate) = colocated {
            let connecting = brush
                .geometry
                .edges
                .iter()
                .find(|(_, e)| e.connects(vertex_id, candidate))
                .map(|(id, _)| id);
            match connecting {
                Some(edge_id) if merge_if_colocated => {
                    merge_colocated(brush, vertex_id, candidate, edge_id, manager);
                    merged = true;
                }
                _ => {
                    // Landed on a non-adjacent vertex, or merging is not
                    // allowed; undo the step.
                    brush.geometry.vertices[vertex_id].position = last_position;
                    run_merge_passes(brush, manager);
                    return VertexMove::Unchanged;
                }
            }
        }

        // A step that flattens any incident triangle is invalid.
        let colinear = brush
            .geometry
            .incident_sides(vertex_id)
            .iter_cpy()
            .any(|side_id| brush.geometry.colinear_triangle(side_id).is_some());
        if colinear {
            brush.geometry.vertices[vertex_id].position = last_position;
            run_merge_passes(brush, manager);
            return VertexMove::Unchanged;
        }

        run_merge_passes(brush, manager);
        brush.geometry.update_bounds_and_center();
        debug_assert!(brush.geometry.integrity().is_ok());

        // The merge passes may have dissolved the vertex itself; a merge at
        // the target position likewise ends the move with one vertex less.
        if !brush.geometry.vertices.contains_key(vertex_id) {
            return VertexMove::Deleted;
        }
        if merged && brush.geometry.vertices[vertex_id].position == end {
            return VertexMove::Deleted;
        }
    }

    VertexMove::Moved(vertex_id)
}

fn run_merge_passes(brush: &mut Brush, manager: &mut FaceManager) {
    cleanup::merge_sides(brush, manager);
    cleanup::merge_edges(&mut brush.geometry);
}

/// Reduces every side incident to `vertex_id` to a triangle. Sides the vertex
/// will end up below lose the triangle at the vertex (the side itself no
/// longer touches it); all others are fan-triangulated from the vertex. Each
/// new triangle carries a fresh copy of the side's face.
///
/// The chop-or-fan decision reads the face's cached plane, which stays frozen
/// for the whole move: seed points are only regenerated after the operation
/// returns. A side re-inflated by a mid-move merge would otherwise be judged
/// against a ring that already contains the half-moved vertex.
fn triangulate_incident(brush: &mut Brush, vertex_id: VertexId, end: Vec3, manager: &mut FaceManager) {
    for side_id in brush.geometry.incident_sides(vertex_id) {
        if brush.geometry.sides[side_id].vertices.len() <= 3 {
            continue;
        }

        let below = {
            let face_id = brush.geometry.sides[side_id]
                .face
                .expect("Triangulation requires a closed brush");
            let boundary = brush.faces[face_id].boundary();
            is_neg(boundary.point_distance(end), ALMOST_ZERO)
        };

        if below {
            let index = brush
                .geometry
                .side_vertex_index(side_id, vertex_id)
                .expect("Vertex missing from incident side");
            chop(brush, side_id, index, manager);
        } else {
            while brush.geometry.sides[side_id].vertices.len() > 3 {
                let count = brush.geometry.sides[side_id].vertices.len();
                let index = brush
                    .geometry
                    .side_vertex_index(side_id, vertex_id)
                    .expect("Vertex missing from incident side");
                chop(brush, side_id, succ(index, count), manager);
            }
        }
    }
}

/// Cuts the triangle around ring position `index` off of `side_id` into a new
/// side of its own, connected by one new edge between the two ring
/// neighbours. The new side carries a copy of the face.
fn chop(brush: &mut Brush, side_id: SideId, index: usize, manager: &mut FaceManager) {
    let geometry = &mut brush.geometry;
    let count = geometry.sides[side_id].vertices.len();
    debug_assert!(count > 3);
    debug_assert!(index < count);

    let next_vertex = geometry.sides[side_id].vertices[succ(index, count)];
    let prev_vertex = geometry.sides[side_id].vertices[pred(index, count)];
    let edge_id = geometry.sides[side_id].edges[index];
    let prev_edge_id = geometry.sides[side_id].edges[pred(index, count)];

    let new_edge = geometry.alloc_edge(Edge {
        start: prev_vertex,
        end: next_vertex,
        left: None,
        right: Some(side_id),
    });

    let triangle = geometry.alloc_side(Side {
        vertices: SVec::new(),
        edges: SVec::new(),
        face: None,
    });
    let ring = [
        (prev_edge_id, geometry.edges[prev_edge_id].left == Some(side_id)),
        (edge_id, geometry.edges[edge_id].left == Some(side_id)),
        (new_edge, true),
    ];
    for (ring_edge, inverted) in ring {
        let edge = &mut geometry.edges[ring_edge];
        let vertex = if inverted {
            edge.left = Some(triangle);
            edge.end
        } else {
            edge.right = Some(triangle);
            edge.start
        };
        let side = &mut geometry.sides[triangle];
        side.edges.push(ring_edge);
        side.vertices.push(vertex);
    }

    geometry.side_replace_edges(side_id, pred_n(index, count, 2), succ(index, count), new_edge);

    let original_face = geometry.sides[side_id]
        .face
        .expect("Triangulation requires a closed brush");
    let copy = brush.faces[original_face].detached_clone();
    let copy_id = brush.faces.insert(copy);
    brush.faces[copy_id].set_side(Some(triangle));
    brush.geometry.sides[triangle].face = Some(copy_id);
    manager.add_copy(original_face, copy_id);
}

/// The largest step the vertex can take along `start -> end` without pushing
/// the brush out of convexity. Two planes constrain each incident side: the
/// plane spanned with its clockwise neighbour at the vertex, and the plane of
/// the non-incident neighbour across the side's far edge. `None` when a
/// constraint plane cannot be built from its points.
fn min_move_fraction(
    geometry: &BrushGeometry,
    vertex_id: VertexId,
    start: Vec3,
    end: Vec3,
    last_frac: f32,
) -> Option<f32> {
    let affected = geometry.incident_sides(vertex_id);
    let mut min_frac = 1.0f32;

    let mut consider = |plane: Plane| {
        let start_dot = plane.point_distance(start);
        let end_dot = plane.point_distance(end);
        if start_dot.abs() >= ALMOST_ZERO || end_dot.abs() >= ALMOST_ZERO {
            if (start_dot > 0.0) != (end_dot > 0.0) {
                let frac = if start_dot.abs() < ALMOST_ZERO {
                    1.0
                } else {
                    start_dot.abs() / (start_dot.abs() + end_dot.abs())
                };
                if frac > last_frac && frac < min_frac {
                    min_frac = frac;
                }
            }
        }
    };

    for (i, side_id) in affected.iter().enumerate() {
        let side = &geometry.sides[*side_id];
        let next_id = affected[succ(i, affected.len())];
        let next = &geometry.sides[next_id];

        let side_index0 = geometry
            .side_vertex_index(*side_id, vertex_id)
            .expect("Vertex missing from incident side");
        let next_index0 = geometry
            .side_vertex_index(next_id, vertex_id)
            .expect("Vertex missing from incident side");

        // The plane spanned by this side and its clockwise neighbour at the
        // moving vertex. Crossing it would fold the two sides into a
        // reflex configuration.
        let side_count = side.vertices.len();
        let side_index1 = succ(side_index0, side_count);
        let side_index2 = succ_n(side_index0, side_count, 2);
        let next_index1 = succ_n(next_index0, next.vertices.len(), 2);

        let p1 = geometry.vertices[side.vertices[side_index1]].position;
        let p2 = geometry.vertices[side.vertices[side_index2]].position;
        let p3 = geometry.vertices[next.vertices[next_index1]].position;
        consider(Plane::from_points(p1, p2, p3)?);

        // The plane of the side's non-incident neighbour across its far edge.
        // Its ring is authoritative here; the face's cached plane may lag
        // behind the current vertex positions.
        let far_edge = side.edges[side_index1];
        let far_side_id = geometry.edges[far_edge]
            .neighbour(*side_id)
            .expect("Far edge without a second side");
        let far_side = &geometry.sides[far_side_id];
        let b1 = geometry.vertices[far_side.vertices[0]].position;
        let b2 = geometry.vertices[far_side.vertices[1]].position;
        let b3 = geometry.vertices[far_side.vertices[2]].position;
        consider(Plane::from_points(b1, b2, b3)?);
    }

    Some(min_frac)
}

/// Merges `obsolete` (which sits at the same position) into `vertex`: all
/// edges and rings are repointed, the degenerate triangles flanking the
/// connecting edge are dissolved, and the collapsed edge and vertex removed.
fn merge_colocated(
    brush: &mut Brush,
    vertex: VertexId,
    obsolete: VertexId,
    connecting: EdgeId,
    manager: &mut FaceManager,
) {
    let geometry = &mut brush.geometry;

    let edge_ids = geometry.edges.keys().collect_vec();
    for edge_id in edge_ids {
        if edge_id == connecting || !geometry.edges[edge_id].touches(obsolete) {
            continue;
        }
        let (left_slot, right_slot) = {
            let edge = &mut geometry.edges[edge_id];
            if edge.start == obsolete {
                edge.start = vertex;
            } else {
                edge.end = vertex;
            }
            (edge.left, edge.right)
        };
        for slot in [left_slot, right_slot] {
            let Some(side_id) = slot else { continue };
            for ring_vertex in geometry.sides[side_id].vertices.iter_mut() {
                if *ring_vertex == obsolete {
                    *ring_vertex = vertex;
                }
            }
        }
    }

    let left = geometry.edges[connecting]
        .left
        .expect("Connecting edge without a left side");
    let right = geometry.edges[connecting]
        .right
        .expect("Connecting edge without a right side");
    delete_degenerate_triangle(brush, left, connecting, manager);
    delete_degenerate_triangle(brush, right, connecting, manager);

    brush.geometry.remove_edge(connecting);
    brush.geometry.remove_vertex(obsolete);
}

/// Dissolves a triangle that has collapsed onto `edge_id`: its one other kept
/// edge takes the triangle's place in the neighbouring ring, and the
/// triangle, its face and its redundant edge go away.
fn delete_degenerate_triangle(
    brush: &mut Brush,
    side_id: SideId,
    edge_id: EdgeId,
    manager: &mut FaceManager,
) {
    let geometry = &mut brush.geometry;
    debug_assert_eq!(geometry.sides[side_id].edges.len(), 3);

    let index = geometry
        .side_edge_index(side_id, edge_id)
        .expect("Collapsed edge missing from its side");
    geometry.side_shift(side_id, index);

    let keep_edge = geometry.sides[side_id].edges[1];
    let drop_edge = geometry.sides[side_id].edges[2];
    let neighbour = geometry.edges[drop_edge]
        .neighbour(side_id)
        .expect("Degenerate triangle without a neighbour");

    geometry.edges[keep_edge].replace_side(side_id, Some(neighbour));

    let delete_index = geometry
        .side_edge_index(neighbour, drop_edge)
        .expect("Dropped edge missing from the neighbour ring");
    let count = geometry.sides[neighbour].edges.len();
    geometry.side_replace_edges(
        neighbour,
        pred(delete_index, count),
        succ(delete_index, count),
        keep_edge,
    );

    manager.drop_side_face(&mut brush.faces, &mut brush.geometry, side_id);
    brush.geometry.remove_side(side_id);
    brush.geometry.remove_edge(drop_edge);
}

/// Splits `edge_id` at its midpoint, producing two edges that keep the
/// original's orientation and side slots. Returns the new vertex.
pub(crate) fn split_edge_mid(geometry: &mut BrushGeometry, edge_id: EdgeId) -> VertexId {
    let left = geometry.edges[edge_id].left.expect("Edge without a left side");
    let right = geometry.edges[edge_id]
        .right
        .expect("Edge without a right side");

    // Rotate both rings so the edge sits last in each.
    let left_index = geometry
        .side_edge_index(left, edge_id)
        .expect("Edge missing from its left side");
    geometry.side_shift(left, left_index + 1);
    let right_index = geometry
        .side_edge_index(right, edge_id)
        .expect("Edge missing from its right side");
    geometry.side_shift(right, right_index + 1);

    let center = {
        let edge = &geometry.edges[edge_id];
        geometry.edge_center(edge)
    };
    let mid = geometry.alloc_vertex(center);
    geometry.sides[left].vertices.push(mid);
    geometry.sides[right].vertices.push(mid);

    let (start, end) = (geometry.edges[edge_id].start, geometry.edges[edge_id].end);
    let first_half = geometry.alloc_edge(Edge {
        start,
        end: mid,
        left: Some(left),
        right: Some(right),
    });
    let second_half = geometry.alloc_edge(Edge {
        start: mid,
        end,
        left: Some(left),
        right: Some(right),
    });

    let left_side = &mut geometry.sides[left];
    left_side.edges.pop();
    left_side.edges.push(second_half);
    left_side.edges.push(first_half);

    let right_side = &mut geometry.sides[right];
    right_side.edges.pop();
    right_side.edges.push(first_half);
    right_side.edges.push(second_half);

    geometry.remove_edge(edge_id);
    mid
}

/// Fan-triangulates `side_id` around its centroid: one new vertex, one new
/// edge per ring vertex, and one triangle per ring edge, each carrying a copy
/// of the side's face. The original side is dropped, promoting its face into
/// one of the copies. Returns the new central vertex.
pub(crate) fn split_side_fan(brush: &mut Brush, side_id: SideId, manager: &mut FaceManager) -> VertexId {
    let original_face = brush.geometry.sides[side_id]
        .face
        .expect("Splitting requires a closed brush");
    let ring = brush.geometry.sides[side_id].edges.clone();
    let count = ring.len();

    let centroid = {
        let geometry = &brush.geometry;
        let sum: Vec3 = geometry.sides[side_id]
            .vertices
            .iter()
            .map(|v| geometry.vertices[*v].position)
            .fold(Vec3::ZERO, |acc, p| acc + p);
        sum / count as f32
    };
    let mid = brush.geometry.alloc_vertex(centroid);

    let first_spoke = {
        let start_vertex = brush.geometry.edges[ring[0]].start_vertex(side_id);
        brush.geometry.alloc_edge(Edge::new(mid, start_vertex))
    };

    let mut last_spoke = first_spoke;
    for (i, ring_edge) in ring.iter_cpy().enumerate() {
        let geometry = &mut brush.geometry;
        let spoke = if i == count - 1 {
            first_spoke
        } else {
            let end_vertex = geometry.edges[ring_edge].end_vertex(side_id);
            geometry.alloc_edge(Edge::new(mid, end_vertex))
        };

        let triangle = geometry.alloc_side(Side {
            vertices: SVec::new(),
            edges: SVec::new(),
            face: None,
        });

        geometry.edges[last_spoke].right = Some(triangle);
        let last_spoke_end = geometry.edges[last_spoke].end;
        geometry.edges[ring_edge].replace_side(side_id, Some(triangle));
        geometry.edges[spoke].left = Some(triangle);
        let spoke_end = geometry.edges[spoke].end;

        let side = &mut geometry.sides[triangle];
        side.vertices.push(mid);
        side.edges.push(last_spoke);
        side.vertices.push(last_spoke_end);
        side.edges.push(ring_edge);
        side.vertices.push(spoke_end);
        side.edges.push(spoke);

        let copy = brush.faces[original_face].detached_clone();
        let copy_id = brush.faces.insert(copy);
        brush.faces[copy_id].set_side(Some(triangle));
        brush.geometry.sides[triangle].face = Some(copy_id);
        manager.add_copy(original_face, copy_id);

        last_spoke = spoke;
    }

    manager.drop_side_face(&mut brush.faces, &mut brush.geometry, side_id);
    brush.geometry.remove_side(side_id);
    mid
}
