// Copyright (C) 2026 the brushwork contributors
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use float_ord::FloatOrd;
use glam::Vec3;
use slotmap::SlotMap;

use crate::math::{parallel, Aabb, Plane, ALMOST_ZERO, COLINEAR_EPSILON};
use crate::prelude::*;

/// Type-safe wrappers over the internal allocator indices used as references
pub mod id_types;
pub use id_types::*;

/// The face payload attached to sides: seed points, cached plane, texture
/// attributes
pub mod face;
pub use face::*;

/// Seed geometry: the world-bounds box and box-shaped brushes
pub mod primitives;

/// The half-space cutter: clipping the polyhedron against a new face plane
pub mod cut;
pub use cut::CutResult;

/// Interactive edit operations: vertex, edge and face movers plus edge/face
/// splitting, grid snapping and drift correction
pub mod move_ops;
pub use move_ops::{EdgeLocator, FaceDelta, MoveOutcome, MoveVertexResult, SideLocator};

/// Merging of coplanar neighbour sides and colinear edge chains
pub mod cleanup;

/// Spatial predicates and ray picking
pub mod queries;
pub use queries::PickHit;

/// Rings are walked by chasing indices; a malformed ring could otherwise spin
/// forever. Bail out after this many steps.
pub const MAX_RING_ITERATIONS: usize = 8196;

/// Fatal conditions of a single geometry operation. The brush itself survives:
/// every operation that can raise one of these either rolls the geometry back
/// or (for face point regeneration inside a mover) drops the offending face.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeometryError {
    /// The edges produced by a cut could not be chained into a closed polygon.
    OpenSideRing,
    /// A side's edge ring had no coherent kept/dropped transition during a cut.
    InvalidSideSplit,
    /// `add_faces` was given an empty face list.
    NoFaces,
    /// A cut removed every vertex of the brush.
    BrushAnnihilated,
    /// A face's vertex ring no longer yields three non-colinear seed points.
    ColinearFacePoints,
}

impl std::fmt::Display for GeometryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_fmt(format_args!("{self:?}"))
    }
}
impl std::error::Error for GeometryError {}

#[derive(Debug, Clone, PartialEq)]
pub struct Vertex {
    pub position: Vec3,
}

/// An undirected boundary segment with one oriented incidence per side. The
/// left side traverses the edge from `end` to `start`, the right side from
/// `start` to `end`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edge {
    pub start: VertexId,
    pub end: VertexId,
    pub left: Option<SideId>,
    pub right: Option<SideId>,
}

impl Edge {
    pub fn new(start: VertexId, end: VertexId) -> Self {
        Self {
            start,
            end,
            left: None,
            right: None,
        }
    }

    /// The first vertex of this edge as seen from `side`.
    pub fn start_vertex(&self, side: SideId) -> VertexId {
        if self.left == Some(side) {
            self.end
        } else if self.right == Some(side) {
            self.start
        } else {
            panic!("Edge is not incident to side {side:?}")
        }
    }

    /// The second vertex of this edge as seen from `side`.
    pub fn end_vertex(&self, side: SideId) -> VertexId {
        if self.left == Some(side) {
            self.start
        } else if self.right == Some(side) {
            self.end
        } else {
            panic!("Edge is not incident to side {side:?}")
        }
    }

    pub fn connects(&self, a: VertexId, b: VertexId) -> bool {
        (self.start == a && self.end == b) || (self.start == b && self.end == a)
    }

    pub fn touches(&self, v: VertexId) -> bool {
        self.start == v || self.end == v
    }

    /// Whether the two edges share at least one endpoint.
    pub fn incident_with(&self, other: &Edge) -> bool {
        self.touches(other.start) || self.touches(other.end)
    }

    /// Reverses the direction of the edge without changing which sides see
    /// which traversal order.
    pub fn flip(&mut self) {
        std::mem::swap(&mut self.left, &mut self.right);
        std::mem::swap(&mut self.start, &mut self.end);
    }

    /// Replaces whichever side slot currently holds `from` with `to`.
    pub fn replace_side(&mut self, from: SideId, to: Option<SideId>) {
        if self.left == Some(from) {
            self.left = to;
        } else if self.right == Some(from) {
            self.right = to;
        }
    }

    /// The side on the other side of the edge from `side`.
    pub fn neighbour(&self, side: SideId) -> Option<SideId> {
        if self.left == Some(side) {
            self.right
        } else {
            self.left
        }
    }
}

/// A convex polygon of the boundary. `vertices[i]` is the start vertex of
/// `edges[i]` as seen from this side, and `edges[i]` connects `vertices[i]` to
/// `vertices[(i + 1) % n]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Side {
    pub vertices: SVec<VertexId>,
    pub edges: SVec<EdgeId>,
    pub face: Option<FaceId>,
}

/// The boundary representation of one convex polyhedron: flat arenas of
/// vertices, edges and sides that reference each other through ids, plus the
/// cached bounding box and centroid.
#[derive(Debug, Clone)]
pub struct BrushGeometry {
    pub(crate) vertices: SlotMap<VertexId, Vertex>,
    pub(crate) edges: SlotMap<EdgeId, Edge>,
    pub(crate) sides: SlotMap<SideId, Side>,
    pub(crate) bounds: Aabb,
    pub(crate) center: Vec3,
}

impl BrushGeometry {
    pub fn bounds(&self) -> &Aabb {
        &self.bounds
    }

    pub fn center(&self) -> Vec3 {
        self.center
    }

    pub fn iter_vertices(&self) -> impl Iterator<Item = (VertexId, &Vertex)> {
        self.vertices.iter()
    }

    pub fn iter_edges(&self) -> impl Iterator<Item = (EdgeId, &Edge)> {
        self.edges.iter()
    }

    pub fn iter_sides(&self) -> impl Iterator<Item = (SideId, &Side)> {
        self.sides.iter()
    }

    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }

    pub fn num_sides(&self) -> usize {
        self.sides.len()
    }

    pub fn vertex(&self, id: VertexId) -> &Vertex {
        &self.vertices[id]
    }

    pub fn edge(&self, id: EdgeId) -> &Edge {
        &self.edges[id]
    }

    pub fn side(&self, id: SideId) -> &Side {
        &self.sides[id]
    }

    /// Whether every side realizes a face. A freshly seeded geometry is not
    /// closed until the caller's faces have been cut in.
    pub fn is_closed(&self) -> bool {
        self.sides.values().all(|side| side.face.is_some())
    }

    // --- Allocation ---

    pub(crate) fn alloc_vertex(&mut self, position: Vec3) -> VertexId {
        self.vertices.insert(Vertex { position })
    }

    pub(crate) fn alloc_edge(&mut self, edge: Edge) -> EdgeId {
        self.edges.insert(edge)
    }

    pub(crate) fn alloc_side(&mut self, side: Side) -> SideId {
        self.sides.insert(side)
    }

    pub(crate) fn remove_vertex(&mut self, id: VertexId) {
        self.vertices.remove(id);
    }

    pub(crate) fn remove_edge(&mut self, id: EdgeId) {
        self.edges.remove(id);
    }

    pub(crate) fn remove_side(&mut self, id: SideId) {
        self.sides.remove(id);
    }

    // --- Lookup ---

    pub fn find_vertex(&self, position: Vec3, epsilon: f32) -> Option<VertexId> {
        self.vertices
            .iter()
            .find(|(_, v)| v.position.abs_diff_eq(position, epsilon))
            .map(|(id, _)| id)
    }

    pub fn find_edge(&self, p1: Vec3, p2: Vec3, epsilon: f32) -> Option<EdgeId> {
        self.edges
            .iter()
            .find(|(_, e)| {
                let start = self.vertices[e.start].position;
                let end = self.vertices[e.end].position;
                (start.abs_diff_eq(p1, epsilon) && end.abs_diff_eq(p2, epsilon))
                    || (start.abs_diff_eq(p2, epsilon) && end.abs_diff_eq(p1, epsilon))
            })
            .map(|(id, _)| id)
    }

    /// Finds the side whose vertex ring matches `positions` up to rotation.
    pub fn find_side(&self, positions: &[Vec3], epsilon: f32) -> Option<SideId> {
        self.sides
            .iter()
            .find(|(id, _)| self.side_has_vertices(*id, positions, epsilon))
            .map(|(id, _)| id)
    }

    fn side_has_vertices(&self, side_id: SideId, positions: &[Vec3], epsilon: f32) -> bool {
        let side = &self.sides[side_id];
        let n = side.vertices.len();
        if n != positions.len() {
            return false;
        }
        (0..n).any(|offset| {
            (0..n).all(|i| {
                self.vertices[side.vertices[succ_n(i, n, offset)]]
                    .position
                    .abs_diff_eq(positions[i], epsilon)
            })
        })
    }

    pub fn edge_vector(&self, edge: &Edge) -> Vec3 {
        self.vertices[edge.start].position - self.vertices[edge.end].position
    }

    pub fn edge_center(&self, edge: &Edge) -> Vec3 {
        (self.vertices[edge.start].position + self.vertices[edge.end].position) * 0.5
    }

    /// The plane spanned by the first three vertices of the side's ring. Not
    /// the face's cached plane: during edits the ring is ahead of the cache.
    pub fn side_plane(&self, side_id: SideId) -> Option<Plane> {
        let side = &self.sides[side_id];
        Plane::from_points(
            self.vertices[side.vertices[0]].position,
            self.vertices[side.vertices[1]].position,
            self.vertices[side.vertices[2]].position,
        )
    }

    pub fn side_edge_index(&self, side_id: SideId, edge_id: EdgeId) -> Option<usize> {
        self.sides[side_id].edges.iter().position(|e| *e == edge_id)
    }

    pub fn side_vertex_index(&self, side_id: SideId, vertex_id: VertexId) -> Option<usize> {
        self.sides[side_id]
            .vertices
            .iter()
            .position(|v| *v == vertex_id)
    }

    /// The sides incident to `vertex`, in clockwise order around it when seen
    /// from outside the polyhedron.
    pub fn incident_sides(&self, vertex: VertexId) -> SVec<SideId> {
        let (first_edge_id, first_edge) = self
            .edges
            .iter()
            .find(|(_, e)| e.touches(vertex))
            .expect("Vertex is not part of any edge");

        let side_of = |edge: &Edge| {
            if edge.start == vertex {
                edge.right
            } else {
                edge.left
            }
        };

        let mut result = SVec::new();
        let mut edge_id = first_edge_id;
        let mut side_id = side_of(first_edge).expect("Boundary edge while walking a vertex fan");
        let mut counter = 0;
        loop {
            if counter > MAX_RING_ITERATIONS {
                panic!("Max number of iterations reached. Is the brush malformed?");
            }
            counter += 1;

            result.push(side_id);
            let side = &self.sides[side_id];
            let i = self
                .side_edge_index(side_id, edge_id)
                .expect("Edge missing from its incident side");
            edge_id = side.edges[pred(i, side.edges.len())];
            side_id =
                side_of(&self.edges[edge_id]).expect("Boundary edge while walking a vertex fan");
            if side_id == result[0] {
                break;
            }
        }
        result
    }

    /// Rotates a side's rings so that the element at `offset` comes first.
    pub(crate) fn side_shift(&mut self, side_id: SideId, offset: usize) {
        let side = &mut self.sides[side_id];
        let count = side.edges.len();
        if offset % count == 0 {
            return;
        }
        side.edges = rotate_iter(side.edges.iter_cpy(), offset % count, count).collect();
        side.vertices = rotate_iter(side.vertices.iter_cpy(), offset % count, count).collect();
    }

    /// Splices `new_edge` into a side's ring in place of the run of edges
    /// strictly between `index1` and `index2` (cyclically, in ring order). The
    /// new edge's side slots must already be set so its directed view from
    /// this side is defined.
    pub(crate) fn side_replace_edges(
        &mut self,
        side_id: SideId,
        index1: usize,
        index2: usize,
        new_edge: EdgeId,
    ) {
        let edge = &self.edges[new_edge];
        let new_start = edge.start_vertex(side_id);
        let new_end = edge.end_vertex(side_id);

        let side = &mut self.sides[side_id];
        if index2 > index1 {
            side.vertices.drain(index1 + 1..index2 + 1);
            side.edges.drain(index1 + 1..index2);

            side.vertices.insert(index1 + 1, new_start);
            side.vertices.insert(index1 + 2, new_end);
            side.edges.insert(index1 + 1, new_edge);

            debug_assert!(side.vertices[index1 + 1] == new_start);
            debug_assert!(side.vertices[index1 + 2] == new_end);
        } else {
            side.vertices.drain(index1 + 1..);
            side.vertices.drain(..index2 + 1);
            side.edges.drain(index1 + 1..);
            side.edges.drain(..index2);

            side.vertices.push(new_start);
            side.vertices.insert(0, new_end);
            side.edges.push(new_edge);

            debug_assert!(*side.vertices.last().unwrap() == new_start);
            debug_assert!(side.vertices[0] == new_end);
        }

        debug_assert!(side.vertices.len() == side.edges.len());
    }

    /// For a triangular side whose vertices have become colinear, the index of
    /// its longest edge. `None` for healthy triangles and all larger sides.
    pub fn colinear_triangle(&self, side_id: SideId) -> Option<usize> {
        let side = &self.sides[side_id];
        debug_assert!(side.edges.len() >= 3);
        if side.edges.len() > 3 {
            return None;
        }

        let v0 = self.edge_vector(&self.edges[side.edges[0]]);
        let v1 = self.edge_vector(&self.edges[side.edges[1]]);
        let v2 = self.edge_vector(&self.edges[side.edges[2]]);

        if parallel(v0, v1, COLINEAR_EPSILON)
            && parallel(v0, v2, COLINEAR_EPSILON)
            && parallel(v1, v2, COLINEAR_EPSILON)
        {
            let lengths = [v0.length_squared(), v1.length_squared(), v2.length_squared()];
            let longest = (0..3)
                .max_by(|a, b| FloatOrd(lengths[*a]).cmp(&FloatOrd(lengths[*b])))
                .unwrap();
            Some(longest)
        } else {
            None
        }
    }

    pub(crate) fn update_bounds_and_center(&mut self) {
        self.bounds = Aabb::of_points(self.vertices.values().map(|v| v.position));
        let sum: Vec3 = self
            .vertices
            .values()
            .map(|v| v.position)
            .fold(Vec3::ZERO, |acc, p| acc + p);
        self.center = sum / self.vertices.len() as f32;
    }

    pub(crate) fn translate(&mut self, delta: Vec3) {
        for vertex in self.vertices.values_mut() {
            vertex.position += delta;
        }
        self.bounds.translate(delta);
        self.center += delta;
    }

    /// Validates the structural invariants: Euler characteristic, ring
    /// consistency and orientation, two distinct sides per edge, and
    /// non-duplication of vertices and edges. Meant for tests and debug
    /// assertions after mutations.
    pub fn integrity(&self) -> Result<()> {
        if self.vertices.len() + self.sides.len() != self.edges.len() + 2 {
            bail!(
                "Euler check failed: V={} E={} F={}",
                self.vertices.len(),
                self.edges.len(),
                self.sides.len()
            );
        }

        let mut edge_visits: HashMap<EdgeId, usize> = HashMap::new();
        let mut vertex_visits: HashMap<VertexId, usize> = HashMap::new();

        for (side_id, side) in self.sides.iter() {
            if side.vertices.len() != side.edges.len() {
                bail!("Side {side_id:?} has mismatched vertex and edge rings");
            }
            if side.vertices.len() < 3 {
                bail!("Side {side_id:?} has fewer than three vertices");
            }
            for (i, edge_id) in side.edges.iter().enumerate() {
                let edge = self
                    .edges
                    .get(*edge_id)
                    .ok_or_else(|| anyhow!("Side {side_id:?} references a removed edge"))?;
                if edge.left != Some(side_id) && edge.right != Some(side_id) {
                    bail!("Edge {edge_id:?} of side {side_id:?} does not point back at it");
                }
                let start = edge.start_vertex(side_id);
                if side.vertices[i] != start {
                    bail!("Ring of side {side_id:?} is inconsistent at index {i}");
                }
                if side.vertices[i] == side.vertices[succ(i, side.vertices.len())] {
                    bail!("Side {side_id:?} repeats a vertex at index {i}");
                }
                *edge_visits.entry(*edge_id).or_insert(0) += 1;
                *vertex_visits.entry(start).or_insert(0) += 1;
            }
        }

        for (vertex_id, vertex) in self.vertices.iter() {
            if !vertex_visits.contains_key(&vertex_id) {
                bail!("Vertex {vertex_id:?} does not belong to any side");
            }
            for (other_id, other) in self.vertices.iter() {
                if vertex_id != other_id && vertex.position.abs_diff_eq(other.position, ALMOST_ZERO)
                {
                    bail!("Vertices {vertex_id:?} and {other_id:?} are colocated");
                }
            }
        }

        for (edge_id, edge) in self.edges.iter() {
            if edge_visits.get(&edge_id) != Some(&2) {
                bail!(
                    "Edge {edge_id:?} is used by {} side rings, expected 2",
                    edge_visits.get(&edge_id).unwrap_or(&0)
                );
            }
            if edge.start == edge.end {
                bail!("Edge {edge_id:?} has equal endpoints");
            }
            if edge.left == edge.right {
                bail!("Edge {edge_id:?} has the same side on both slots");
            }
            for (other_id, other) in self.edges.iter() {
                if edge_id != other_id && other.connects(edge.start, edge.end) {
                    bail!("Edges {edge_id:?} and {other_id:?} connect the same vertices");
                }
            }
        }

        Ok(())
    }
}

/// A convex solid: the unit of world geometry. Owns the face payloads and the
/// boundary representation realizing them, and exposes every kernel operation.
#[derive(Debug, Clone)]
pub struct Brush {
    pub(crate) world_bounds: Aabb,
    pub(crate) faces: SlotMap<FaceId, Face>,
    pub(crate) geometry: BrushGeometry,
}

impl Brush {
    /// Seeds the brush as the world-bounds box. No faces are attached; the
    /// brush only becomes `closed` once caller faces are cut in.
    pub fn new(world_bounds: Aabb) -> Self {
        Self {
            world_bounds,
            faces: SlotMap::with_key(),
            geometry: BrushGeometry::seeded(&world_bounds),
        }
    }

    /// Deep copy of `template` within (possibly different) world bounds,
    /// rebuilt by re-adding copies of its faces.
    pub fn from_template(world_bounds: Aabb, template: &Brush) -> Result<Self> {
        let mut brush = Self::new(world_bounds);
        let faces = template
            .faces
            .values()
            .map(|f| f.detached_clone())
            .collect_vec();
        let mut dropped = Vec::new();
        brush.add_faces(faces, &mut dropped)?;
        Ok(brush)
    }

    pub fn world_bounds(&self) -> &Aabb {
        &self.world_bounds
    }

    pub fn bounds(&self) -> &Aabb {
        &self.geometry.bounds
    }

    pub fn center(&self) -> Vec3 {
        self.geometry.center
    }

    pub fn geometry(&self) -> &BrushGeometry {
        &self.geometry
    }

    pub fn closed(&self) -> bool {
        self.geometry.is_closed()
    }

    pub fn face(&self, id: FaceId) -> &Face {
        &self.faces[id]
    }

    pub fn iter_faces(&self) -> impl Iterator<Item = (FaceId, &Face)> {
        self.faces.iter()
    }

    pub fn num_faces(&self) -> usize {
        self.faces.len()
    }

    pub fn vertex_positions(&self) -> Vec<Vec3> {
        self.geometry
            .vertices
            .values()
            .map(|v| v.position)
            .collect()
    }

    /// Refreshes every face's seed points from its current vertex ring; faces
    /// whose rings have collapsed to a line are dropped through `manager`.
    pub(crate) fn update_face_points(&mut self, manager: &mut move_ops::FaceManager) {
        let side_ids = self.geometry.sides.keys().collect_vec();
        for side_id in side_ids {
            let Some(face_id) = self.geometry.sides[side_id].face else {
                continue;
            };
            let mut face = self.faces[face_id].clone();
            match face.update_points_from_vertices(&self.geometry, side_id) {
                Ok(()) => self.faces[face_id] = face,
                // Only sound at the end of a vertex operation, where the ring
                // is about to be merged away anyway.
                Err(_) => manager.drop_side_face(&mut self.faces, &mut self.geometry, side_id),
            }
        }
    }
}
