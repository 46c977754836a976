// Copyright (C) 2026 the brushwork contributors
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use glam::Vec3;

use crate::math::{Aabb, Plane};
use crate::prelude::*;

use super::{BrushGeometry, GeometryError, SideId};

/// Texture mapping state carried by a face. Opaque to the kernel: it travels
/// with the face through cuts, splits and merges but never influences
/// geometry.
#[derive(Debug, Clone, PartialEq)]
pub struct FaceAttributes {
    pub texture: String,
    pub x_offset: f32,
    pub y_offset: f32,
    pub rotation: f32,
    pub x_scale: f32,
    pub y_scale: f32,
}

impl Default for FaceAttributes {
    fn default() -> Self {
        Self {
            texture: String::new(),
            x_offset: 0.0,
            y_offset: 0.0,
            rotation: 0.0,
            x_scale: 1.0,
            y_scale: 1.0,
        }
    }
}

impl FaceAttributes {
    pub fn with_texture(texture: impl Into<String>) -> Self {
        Self {
            texture: texture.into(),
            ..Default::default()
        }
    }
}

/// The caller-supplied identity realized by a side: three seed points that
/// define the supporting plane, the cached plane itself, and texture
/// attributes. The kernel reads the plane, regenerates the seed points from
/// the side's vertex ring after edits, and otherwise treats faces as opaque.
#[derive(Debug, Clone, PartialEq)]
pub struct Face {
    points: [Vec3; 3],
    boundary: Plane,
    world_bounds: Aabb,
    force_integer_points: bool,
    side: Option<SideId>,
    pub attributes: FaceAttributes,
}

impl Face {
    pub fn new(
        world_bounds: Aabb,
        p0: Vec3,
        p1: Vec3,
        p2: Vec3,
        attributes: FaceAttributes,
    ) -> Result<Self> {
        let mut face = Self {
            points: [p0, p1, p2],
            boundary: Plane::default(),
            world_bounds,
            force_integer_points: false,
            side: None,
            attributes,
        };
        face.set_points(p0, p1, p2)?;
        Ok(face)
    }

    pub fn points(&self) -> [Vec3; 3] {
        self.points
    }

    /// The supporting plane, oriented so the brush interior is on the
    /// negative side.
    pub fn boundary(&self) -> &Plane {
        &self.boundary
    }

    pub fn world_bounds(&self) -> &Aabb {
        &self.world_bounds
    }

    /// The side currently realizing this face, if any.
    pub fn side(&self) -> Option<SideId> {
        self.side
    }

    pub(crate) fn set_side(&mut self, side: Option<SideId>) {
        self.side = side;
    }

    pub fn force_integer_points(&self) -> bool {
        self.force_integer_points
    }

    /// When set, regenerated seed points are rounded to integers as a pure
    /// post-processing step. Vertex positions are unaffected.
    pub fn set_force_integer_points(&mut self, force: bool) {
        self.force_integer_points = force;
    }

    /// A copy suitable for attaching to a different side (or brush): same
    /// plane and attributes, no side link.
    pub fn detached_clone(&self) -> Self {
        let mut copy = self.clone();
        copy.side = None;
        copy
    }

    fn set_points(&mut self, p0: Vec3, p1: Vec3, p2: Vec3) -> Result<()> {
        self.points = if self.force_integer_points {
            [p0.round(), p1.round(), p2.round()]
        } else {
            [p0, p1, p2]
        };
        self.boundary = Plane::from_points(self.points[0], self.points[1], self.points[2])
            .ok_or(GeometryError::ColinearFacePoints)?;
        Ok(())
    }

    /// Picks three seed points from the side's current vertex ring, favouring
    /// the corner with the widest angle so the derived plane is as stable as
    /// possible, and refreshes the cached plane from them.
    pub(crate) fn update_points_from_vertices(
        &mut self,
        geometry: &BrushGeometry,
        side_id: SideId,
    ) -> Result<()> {
        let ring = &geometry.side(side_id).vertices;
        let count = ring.len();
        let position = |i: usize| geometry.vertex(ring[i]).position;

        let mut best: Option<usize> = None;
        let mut best_dot = 1.0f32;
        for i in 0..count {
            if best_dot <= 0.0 {
                break;
            }
            let p0 = position(i);
            let v1 = (position(pred(i, count)) - p0).normalize();
            let v2 = (position(succ(i, count)) - p0).normalize();
            let dot = v1.dot(v2);
            if dot < best_dot {
                best_dot = dot;
                best = Some(i);
            }
        }

        let best = best.ok_or(GeometryError::ColinearFacePoints)?;
        self.set_points(
            position(best),
            position(succ(best, count)),
            position(pred(best, count)),
        )
    }

    pub(crate) fn translate(&mut self, delta: Vec3) {
        for point in &mut self.points {
            *point += delta;
        }
        self.boundary.translate(delta);
    }
}
