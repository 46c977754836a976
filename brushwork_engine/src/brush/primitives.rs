// Copyright (C) 2026 the brushwork contributors
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use glam::Vec3;

use crate::math::Aabb;
use crate::prelude::*;

use super::{Brush, BrushGeometry, Edge, EdgeId, Face, FaceAttributes, Side, SideId};

impl BrushGeometry {
    /// Seeds the geometry as the axis-aligned box spanning `bounds`: eight
    /// vertices, twelve edges, six quad sides, no faces attached.
    pub(crate) fn seeded(bounds: &Aabb) -> Self {
        let mut geometry = BrushGeometry {
            vertices: Default::default(),
            edges: Default::default(),
            sides: Default::default(),
            bounds: *bounds,
            center: bounds.center(),
        };

        let (lo, hi) = (bounds.min, bounds.max);
        // Naming: l/r = x, f/b = y, d/u = z
        let lfd = geometry.alloc_vertex(Vec3::new(lo.x, lo.y, lo.z));
        let lfu = geometry.alloc_vertex(Vec3::new(lo.x, lo.y, hi.z));
        let lbd = geometry.alloc_vertex(Vec3::new(lo.x, hi.y, lo.z));
        let lbu = geometry.alloc_vertex(Vec3::new(lo.x, hi.y, hi.z));
        let rfd = geometry.alloc_vertex(Vec3::new(hi.x, lo.y, lo.z));
        let rfu = geometry.alloc_vertex(Vec3::new(hi.x, lo.y, hi.z));
        let rbd = geometry.alloc_vertex(Vec3::new(hi.x, hi.y, lo.z));
        let rbu = geometry.alloc_vertex(Vec3::new(hi.x, hi.y, hi.z));

        let lfd_lbd = geometry.alloc_edge(Edge::new(lfd, lbd));
        let lbd_lbu = geometry.alloc_edge(Edge::new(lbd, lbu));
        let lbu_lfu = geometry.alloc_edge(Edge::new(lbu, lfu));
        let lfu_lfd = geometry.alloc_edge(Edge::new(lfu, lfd));
        let rfd_rfu = geometry.alloc_edge(Edge::new(rfd, rfu));
        let rfu_rbu = geometry.alloc_edge(Edge::new(rfu, rbu));
        let rbu_rbd = geometry.alloc_edge(Edge::new(rbu, rbd));
        let rbd_rfd = geometry.alloc_edge(Edge::new(rbd, rfd));
        let lfu_rfu = geometry.alloc_edge(Edge::new(lfu, rfu));
        let rfd_lfd = geometry.alloc_edge(Edge::new(rfd, lfd));
        let lbd_rbd = geometry.alloc_edge(Edge::new(lbd, rbd));
        let rbu_lbu = geometry.alloc_edge(Edge::new(rbu, lbu));

        const NONE: [bool; 4] = [false, false, false, false];
        const ALL: [bool; 4] = [true, true, true, true];
        const ODD: [bool; 4] = [false, true, false, true];

        geometry.side_from_edges(&[lfd_lbd, lbd_lbu, lbu_lfu, lfu_lfd], &NONE);
        geometry.side_from_edges(&[rfd_rfu, rfu_rbu, rbu_rbd, rbd_rfd], &NONE);
        geometry.side_from_edges(&[lfu_rfu, rfd_rfu, rfd_lfd, lfu_lfd], &ODD);
        geometry.side_from_edges(&[rbu_lbu, lbd_lbu, lbd_rbd, rbu_rbd], &ODD);
        geometry.side_from_edges(&[lbu_lfu, rbu_lbu, rfu_rbu, lfu_rfu], &ALL);
        geometry.side_from_edges(&[rfd_lfd, rbd_rfd, lbd_rbd, lfd_lbd], &ALL);

        debug_assert!(geometry.integrity().is_ok());
        geometry
    }

    /// Builds a side over existing edges. An inverted edge takes this side on
    /// its left slot and contributes its `end` vertex to the ring; otherwise
    /// the right slot and its `start` vertex.
    fn side_from_edges(&mut self, edge_ids: &[EdgeId; 4], invert: &[bool; 4]) -> SideId {
        let side_id = self.alloc_side(Side {
            vertices: SVec::new(),
            edges: SVec::new(),
            face: None,
        });
        for (&edge_id, &inverted) in edge_ids.iter().zip(invert) {
            let edge = &mut self.edges[edge_id];
            let vertex = if inverted {
                edge.left = Some(side_id);
                edge.end
            } else {
                edge.right = Some(side_id);
                edge.start
            };
            let side = &mut self.sides[side_id];
            side.edges.push(edge_id);
            side.vertices.push(vertex);
        }
        side_id
    }
}

impl Brush {
    /// A box-shaped brush spanning `bounds`, with six axis-aligned faces all
    /// carrying a copy of `attributes`.
    pub fn from_bounds(
        world_bounds: Aabb,
        bounds: Aabb,
        attributes: &FaceAttributes,
    ) -> Result<Self> {
        let (lo, hi) = (bounds.min, bounds.max);

        let face = |p0: Vec3, p1: Vec3, p2: Vec3| {
            Face::new(world_bounds, p0, p1, p2, attributes.clone())
        };

        let front = face(lo, Vec3::new(lo.x, lo.y, hi.z), Vec3::new(hi.x, lo.y, lo.z))?;
        let left = face(lo, Vec3::new(lo.x, hi.y, lo.z), Vec3::new(lo.x, lo.y, hi.z))?;
        let bottom = face(lo, Vec3::new(hi.x, lo.y, lo.z), Vec3::new(lo.x, hi.y, lo.z))?;
        let back = face(hi, Vec3::new(lo.x, hi.y, hi.z), Vec3::new(hi.x, hi.y, lo.z))?;
        let right = face(hi, Vec3::new(hi.x, hi.y, lo.z), Vec3::new(hi.x, lo.y, hi.z))?;
        let top = face(hi, Vec3::new(hi.x, lo.y, hi.z), Vec3::new(lo.x, hi.y, hi.z))?;

        let mut brush = Brush::new(world_bounds);
        let mut dropped = Vec::new();
        brush.add_faces(
            vec![front, left, bottom, back, right, top],
            &mut dropped,
        )?;
        debug_assert!(dropped.is_empty());
        debug_assert!(brush.closed());
        Ok(brush)
    }
}
