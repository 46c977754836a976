// Copyright (C) 2026 the brushwork contributors
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use glam::Vec3;
use slotmap::SecondaryMap;

use crate::math::{correct_vec3, Plane, PointStatus, CORRECT_EPSILON, CUT_VERTEX_EPSILON};
use crate::prelude::*;

use super::{
    Brush, BrushGeometry, Edge, EdgeId, Face, GeometryError, Side, SideId, VertexId,
};

/// How a new face related to the polyhedron it was cut into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CutResult {
    /// The face's half-space already contains the whole polyhedron; nothing
    /// was incorporated.
    Redundant,
    /// The face's half-space excludes the whole polyhedron; accepting it
    /// would annihilate the brush.
    Null,
    /// The plane cut through the polyhedron, which has been clipped; the face
    /// is now realized by a new side.
    Split,
}

/// Transient per-vertex classification against the cutting plane. Absence
/// from the map means "unknown", i.e. not yet classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum VertexMark {
    Drop,
    Keep,
    Undecided,
    New,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EdgeMark {
    Drop,
    Keep,
    Split,
    Undecided,
    New,
}

/// What became of one side while clipping.
enum SideFate {
    /// The side survives unchanged. When the cutting plane grazed one of its
    /// edges, that edge is carried over into the new side's ring.
    Keep { undecided: Option<EdgeId> },
    /// Every vertex of the side is above the plane; it is deleted and its
    /// face released.
    Drop,
    /// The plane crossed the side; its dropped span was replaced by a fresh
    /// edge lying on the plane.
    Split { new_edge: EdgeId },
}

type VertexMarks = SecondaryMap<VertexId, VertexMark>;
type EdgeMarks = SecondaryMap<EdgeId, EdgeMark>;

impl Brush {
    /// Clips the brush against `face`'s supporting plane, keeping the
    /// negative half-space. Faces of sides that end up entirely above the
    /// plane are appended to `dropped` and become the caller's to destroy.
    /// The face itself is consumed; it only survives (inside the brush) when
    /// the result is `Split`.
    ///
    /// When the clipped rings cannot be reassembled into a closed polygon the
    /// brush is restored to its pre-call state and a [`GeometryError`] is
    /// returned.
    #[profiling::function]
    pub fn add_face(&mut self, face: Face, dropped: &mut Vec<Face>) -> Result<CutResult> {
        // A face whose three seed points lie on an existing side's plane is a
        // coplanar duplicate.
        for side in self.geometry.sides.values() {
            let Some(face_id) = side.face else { continue };
            let previous = &self.faces[face_id];
            let on_previous = face
                .points()
                .iter()
                .filter(|p| previous.boundary().point_status(**p) == PointStatus::Inside)
                .count();
            if on_previous == 3 {
                return Ok(CutResult::Redundant);
            }
        }

        let boundary = *face.boundary();

        let mut vertex_marks = VertexMarks::new();
        let mut keep = 0;
        let mut drop = 0;
        let mut undecided = 0;
        for (vertex_id, vertex) in self.geometry.vertices.iter() {
            let mark = match boundary.point_status_eps(vertex.position, CUT_VERTEX_EPSILON) {
                PointStatus::Above => {
                    drop += 1;
                    VertexMark::Drop
                }
                PointStatus::Below => {
                    keep += 1;
                    VertexMark::Keep
                }
                PointStatus::Inside => {
                    undecided += 1;
                    VertexMark::Undecided
                }
            };
            vertex_marks.insert(vertex_id, mark);
        }

        let total = self.geometry.num_vertices();
        if keep + undecided == total {
            return Ok(CutResult::Redundant);
        }
        if drop + undecided == total {
            return Ok(CutResult::Null);
        }

        // The clip mutates rings in place; keep a copy so a failed reassembly
        // leaves the brush untouched.
        let snapshot = self.geometry.clone();
        match self.clip(face, &boundary, &mut vertex_marks, dropped) {
            Ok(()) => Ok(CutResult::Split),
            Err(err) => {
                self.geometry = snapshot;
                Err(err.into())
            }
        }
    }

    /// Cuts all `faces` into the brush in order. Redundant faces are reported
    /// through `dropped`; a face that would annihilate the brush is an error.
    /// Finishes with a drift-correction sweep over all vertex coordinates.
    pub fn add_faces(&mut self, faces: Vec<Face>, dropped: &mut Vec<Face>) -> Result<()> {
        if faces.is_empty() {
            return Err(GeometryError::NoFaces.into());
        }
        for face in faces {
            if self.add_face(face, dropped)? == CutResult::Null {
                return Err(GeometryError::BrushAnnihilated.into());
            }
        }
        for vertex in self.geometry.vertices.values_mut() {
            vertex.position = correct_vec3(vertex.position, CORRECT_EPSILON);
        }
        self.geometry.update_bounds_and_center();
        Ok(())
    }

    /// The mutating part of a cut. On error the caller restores the geometry
    /// from its snapshot; the face is consumed either way.
    fn clip(
        &mut self,
        face: Face,
        boundary: &Plane,
        vertex_marks: &mut VertexMarks,
        dropped: &mut Vec<Face>,
    ) -> std::result::Result<(), GeometryError> {
        let geometry = &mut self.geometry;

        // Classify edges from their endpoint marks, splitting the ones the
        // plane crosses.
        let mut edge_marks = EdgeMarks::new();
        let edge_ids = geometry.edges.keys().collect_vec();
        for edge_id in edge_ids {
            let mark = edge_mark_from_vertices(geometry, edge_id, vertex_marks);
            edge_marks.insert(edge_id, mark);
            if mark == EdgeMark::Split {
                split_edge_at_plane(geometry, edge_id, boundary, vertex_marks);
            }
        }

        // Process each side: keep, drop, or split its ring at the plane. Face
        // releases are deferred until the new ring is known to assemble.
        let mut new_edges = Vec::new();
        let mut released_faces = Vec::new();
        let side_ids = geometry.sides.keys().collect_vec();
        for side_id in side_ids {
            match split_side(geometry, side_id, vertex_marks, &mut edge_marks)? {
                SideFate::Keep { undecided: None } => {}
                SideFate::Keep {
                    undecided: Some(edge_id),
                } => {
                    // A grazed edge acts as a ring edge of the new side; flip
                    // it so the kept side stays on its right slot.
                    if geometry.edges[edge_id].right != Some(side_id) {
                        geometry.edges[edge_id].flip();
                    }
                    new_edges.push(edge_id);
                }
                SideFate::Drop => {
                    let side = geometry
                        .sides
                        .remove(side_id)
                        .expect("Dropped side was already removed");
                    for edge_id in side.edges.iter_cpy() {
                        if let Some(edge) = geometry.edges.get_mut(edge_id) {
                            edge.replace_side(side_id, None);
                        }
                    }
                    if let Some(face_id) = side.face {
                        released_faces.push(face_id);
                    }
                }
                SideFate::Split { new_edge } => new_edges.push(new_edge),
            }
        }

        // Chain the new edges into a closed clockwise polygon around the new
        // face's normal: each edge's raw end vertex must meet the raw start of
        // its predecessor.
        if new_edges.len() < 3 {
            return Err(GeometryError::OpenSideRing);
        }
        for i in 0..new_edges.len() - 1 {
            let start = geometry.edges[new_edges[i]].start;
            for j in i + 2..new_edges.len() {
                if geometry.edges[new_edges[j]].end == start {
                    new_edges.swap(i + 1, j);
                    break;
                }
            }
        }
        let closed = (0..new_edges.len()).all(|i| {
            let next = new_edges[succ(i, new_edges.len())];
            geometry.edges[next].end == geometry.edges[new_edges[i]].start
        });
        if !closed {
            return Err(GeometryError::OpenSideRing);
        }

        // Build the new side over the chained edges; it takes every edge's
        // left slot.
        let face_id = self.faces.insert(face);
        let side_id = geometry.alloc_side(Side {
            vertices: SVec::new(),
            edges: SVec::new(),
            face: Some(face_id),
        });
        for edge_id in new_edges.iter_cpy() {
            let edge = &mut geometry.edges[edge_id];
            edge.left = Some(side_id);
            let start_vertex = edge.end;
            let side = &mut geometry.sides[side_id];
            side.edges.push(edge_id);
            side.vertices.push(start_vertex);
        }
        self.faces[face_id].set_side(Some(side_id));

        for face_id in released_faces {
            let mut released = self.faces.remove(face_id).expect("Face released twice");
            released.set_side(None);
            dropped.push(released);
        }

        // Sweep out everything above the plane.
        let vertex_ids = geometry.vertices.keys().collect_vec();
        for vertex_id in vertex_ids {
            if vertex_marks.get(vertex_id) == Some(&VertexMark::Drop) {
                geometry.remove_vertex(vertex_id);
            }
        }
        let edge_ids = geometry.edges.keys().collect_vec();
        for edge_id in edge_ids {
            if edge_marks.get(edge_id) == Some(&EdgeMark::Drop) {
                geometry.remove_edge(edge_id);
            }
        }

        geometry.update_bounds_and_center();
        Ok(())
    }
}

fn edge_mark_from_vertices(
    geometry: &BrushGeometry,
    edge_id: EdgeId,
    vertex_marks: &VertexMarks,
) -> EdgeMark {
    let edge = &geometry.edges[edge_id];
    let mut keep = 0;
    let mut drop = 0;
    for vertex in [edge.start, edge.end] {
        match vertex_marks.get(vertex) {
            Some(VertexMark::Keep) => keep += 1,
            Some(VertexMark::Drop) => drop += 1,
            _ => {}
        }
    }
    if keep == 1 && drop == 1 {
        EdgeMark::Split
    } else if keep > 0 {
        EdgeMark::Keep
    } else if drop > 0 {
        EdgeMark::Drop
    } else {
        EdgeMark::Undecided
    }
}

/// Splits an edge the plane crosses, the way QBSP does: the crossing point is
/// interpolated in f64 from the two signed distances, except along axes where
/// the plane normal is exactly axial, where the plane equation fixes the
/// coordinate outright. The new vertex replaces the dropped endpoint on this
/// edge only; other edges at that endpoint are dropped wholesale later.
fn split_edge_at_plane(
    geometry: &mut BrushGeometry,
    edge_id: EdgeId,
    plane: &Plane,
    vertex_marks: &mut VertexMarks,
) -> VertexId {
    let edge = &geometry.edges[edge_id];
    let start_pos = geometry.vertices[edge.start].position;
    let end_pos = geometry.vertices[edge.end].position;

    let start_dist = plane.point_distance(start_pos) as f64;
    let end_dist = plane.point_distance(end_pos) as f64;
    debug_assert!(start_dist != end_dist);
    let dot = start_dist / (start_dist - end_dist);

    let mut position = Vec3::ZERO;
    for axis in 0..3 {
        position[axis] = if plane.normal[axis] == 1.0 {
            plane.distance
        } else if plane.normal[axis] == -1.0 {
            -plane.distance
        } else {
            let start = start_pos[axis] as f64;
            let end = end_pos[axis] as f64;
            (start + dot * (end - start)) as f32
        };
    }
    let position = correct_vec3(position, CORRECT_EPSILON);

    let new_vertex = geometry.alloc_vertex(position);
    vertex_marks.insert(new_vertex, VertexMark::New);

    let edge = &mut geometry.edges[edge_id];
    if vertex_marks.get(edge.start) == Some(&VertexMark::Drop) {
        edge.start = new_vertex;
    } else {
        edge.end = new_vertex;
    }
    new_vertex
}

/// Decides a side's fate under the cut and, for split sides, replaces the
/// dropped span of its ring with a fresh edge lying on the plane. The fresh
/// edge takes the side on its right slot; its left slot stays open for the
/// new side.
fn split_side(
    geometry: &mut BrushGeometry,
    side_id: SideId,
    vertex_marks: &VertexMarks,
    edge_marks: &mut EdgeMarks,
) -> std::result::Result<SideFate, GeometryError> {
    let ring = geometry.sides[side_id].edges.clone();
    let count = ring.len();
    debug_assert!(count >= 3);

    let mut keep = 0;
    let mut drop = 0;
    let mut undecided = 0;
    let mut undecided_edge = None;
    let mut split_index1: Option<usize> = None;
    let mut split_index2: Option<usize> = None;

    let mut last_mark = edge_marks[*ring.last().unwrap()];
    for (i, edge_id) in ring.iter().enumerate() {
        let current = edge_marks[*edge_id];
        match current {
            EdgeMark::Split => {
                let start = geometry.edges[*edge_id].start_vertex(side_id);
                if vertex_marks.get(start) == Some(&VertexMark::Keep) {
                    split_index1 = Some(i);
                } else {
                    split_index2 = Some(i);
                }
            }
            EdgeMark::Undecided => {
                undecided += 1;
                undecided_edge = Some(*edge_id);
            }
            EdgeMark::Keep => {
                if last_mark == EdgeMark::Drop {
                    split_index2 = Some(i);
                }
                keep += 1;
            }
            EdgeMark::Drop => {
                if last_mark == EdgeMark::Keep {
                    split_index1 = Some(if i > 0 { i - 1 } else { count - 1 });
                }
                drop += 1;
            }
            EdgeMark::New => unreachable!("New edges are never classified"),
        }
        last_mark = current;
    }

    if keep == count {
        return Ok(SideFate::Keep { undecided: None });
    }
    if undecided == 1 && keep == count - 1 {
        return Ok(SideFate::Keep {
            undecided: undecided_edge,
        });
    }
    if drop + undecided == count {
        return Ok(SideFate::Drop);
    }

    let (Some(index1), Some(index2)) = (split_index1, split_index2) else {
        return Err(GeometryError::InvalidSideSplit);
    };

    let start = geometry.edges[ring[index1]].end_vertex(side_id);
    let end = geometry.edges[ring[index2]].start_vertex(side_id);
    let new_edge = geometry.alloc_edge(Edge {
        start,
        end,
        left: None,
        right: Some(side_id),
    });
    edge_marks.insert(new_edge, EdgeMark::New);

    geometry.side_replace_edges(side_id, index1, index2, new_edge);
    Ok(SideFate::Split { new_edge })
}
