// Copyright (C) 2026 the brushwork contributors
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use glam::Vec3;

use crate::math::{
    dominant_axis, is_neg, is_zero, project_dropping_axis, Aabb, PointStatus, Ray, ALMOST_ZERO,
};
use crate::prelude::*;

use super::{Brush, FaceId, SideId, VertexId};

/// The nearest side a ray crosses.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PickHit {
    pub side: SideId,
    pub face: FaceId,
    pub distance: f32,
    pub position: Vec3,
}

impl Brush {
    /// Whether `point` lies on the non-positive side of every face's plane.
    pub fn contains_point(&self, point: Vec3) -> bool {
        if !self.geometry.bounds.contains_point(point) {
            return false;
        }
        self.faces
            .values()
            .all(|face| face.boundary().point_status(point) != PointStatus::Above)
    }

    /// Whether every vertex of `other` lies inside this brush.
    pub fn contains_brush(&self, other: &Brush) -> bool {
        if !self.geometry.bounds.contains_aabb(&other.geometry.bounds) {
            return false;
        }
        other
            .geometry
            .vertices
            .values()
            .all(|v| self.contains_point(v.position))
    }

    /// Separating-axis test between two brushes: they are disjoint iff some
    /// face normal of either, or the cross product of one edge from each,
    /// separates their vertex sets.
    #[profiling::function]
    pub fn intersects_brush(&self, other: &Brush) -> bool {
        if !self.geometry.bounds.intersects_aabb(&other.geometry.bounds) {
            return false;
        }

        for face in other.faces.values() {
            let ray = Ray::new(face.points()[0], face.boundary().normal);
            if vertex_status_from_ray(&ray, self.geometry.vertices.values().map(|v| v.position))
                == PointStatus::Above
            {
                return false;
            }
        }
        for face in self.faces.values() {
            let ray = Ray::new(face.points()[0], face.boundary().normal);
            if vertex_status_from_ray(&ray, other.geometry.vertices.values().map(|v| v.position))
                == PointStatus::Above
            {
                return false;
            }
        }

        for my_edge in self.geometry.edges.values() {
            let my_start = self.geometry.vertices[my_edge.start].position;
            let my_vector = self.geometry.vertices[my_edge.end].position - my_start;
            for their_edge in other.geometry.edges.values() {
                let their_vector = other.geometry.vertices[their_edge.end].position
                    - other.geometry.vertices[their_edge.start].position;
                let ray = Ray::new(my_start, my_vector.cross(their_vector));

                let my_status = vertex_status_from_ray(
                    &ray,
                    self.geometry.vertices.values().map(|v| v.position),
                );
                if my_status == PointStatus::Inside {
                    continue;
                }
                let their_status = vertex_status_from_ray(
                    &ray,
                    other.geometry.vertices.values().map(|v| v.position),
                );
                if their_status != PointStatus::Inside && my_status != their_status {
                    return false;
                }
            }
        }

        true
    }

    /// Whether the axis-aligned box of an entity lies entirely inside the
    /// brush.
    pub fn contains_entity(&self, entity_bounds: &Aabb) -> bool {
        if !self.geometry.bounds.contains_aabb(entity_bounds) {
            return false;
        }
        entity_bounds
            .corners()
            .into_iter()
            .all(|corner| self.contains_point(corner))
    }

    /// Whether the axis-aligned box of an entity overlaps the brush.
    pub fn intersects_entity(&self, entity_bounds: &Aabb) -> bool {
        if !self.geometry.bounds.intersects_aabb(entity_bounds) {
            return false;
        }
        entity_bounds
            .corners()
            .into_iter()
            .any(|corner| self.contains_point(corner))
            || self
                .geometry
                .vertices
                .values()
                .any(|v| entity_bounds.contains_point(v.position))
    }

    /// The nearest side the ray crosses, front faces only. A convex brush has
    /// at most one such crossing.
    #[profiling::function]
    pub fn pick(&self, ray: &Ray) -> Option<PickHit> {
        self.geometry.bounds.intersect_ray(ray)?;

        for (side_id, side) in self.geometry.sides.iter() {
            let Some(face_id) = side.face else { continue };
            if let Some(distance) = self.side_intersect_ray(side_id, face_id, ray) {
                return Some(PickHit {
                    side: side_id,
                    face: face_id,
                    distance,
                    position: ray.point_at_distance(distance),
                });
            }
        }
        None
    }

    /// Distance at which the ray crosses the given side, or `None`. The hit
    /// point and the side's ring are projected onto the coordinate plane
    /// across the dominant axis of the side's normal, where an even-odd
    /// ray-cast decides containment.
    fn side_intersect_ray(&self, side_id: SideId, face_id: FaceId, ray: &Ray) -> Option<f32> {
        let boundary = self.faces[face_id].boundary();
        let dot = boundary.normal.dot(ray.direction);
        if !is_neg(dot, ALMOST_ZERO) {
            return None;
        }
        let distance = boundary.intersect_ray(ray)?;

        let axis = dominant_axis(boundary.normal);
        let hit = ray.point_at_distance(distance);
        let (hit_x, hit_y) = project_dropping_axis(hit, axis);
        let project = |v: VertexId| {
            let (x, y) = project_dropping_axis(self.geometry.vertices[v].position, axis);
            (x - hit_x, y - hit_y)
        };

        let ring = &self.geometry.sides[side_id].vertices;
        let (mut x0, mut y0) = project(*ring.last().unwrap());
        let mut crossings = 0;
        for vertex in ring.iter_cpy() {
            let (x1, y1) = project(vertex);

            if (is_zero(x0, ALMOST_ZERO) && is_zero(y0, ALMOST_ZERO))
                || (is_zero(x1, ALMOST_ZERO) && is_zero(y1, ALMOST_ZERO))
            {
                // The hit point coincides with a ring vertex.
                crossings = 1;
                break;
            }

            // A ring segment crosses the positive X axis iff its endpoints'
            // Y coordinates have different signs (zero counting as negative)
            // and the crossing's X coordinate is positive.
            if (y0 > 0.0 && y1 <= 0.0) || (y0 <= 0.0 && y1 > 0.0) {
                if x0 > 0.0 && x1 > 0.0 {
                    crossings += 1;
                } else if (x0 > 0.0 && x1 <= 0.0) || (x0 <= 0.0 && x1 > 0.0) {
                    let x = -y0 * (x1 - x0) / (y1 - y0) + x0;
                    if x >= 0.0 {
                        crossings += 1;
                    }
                }
            }

            (x0, y0) = (x1, y1);
        }

        if crossings % 2 == 0 {
            None
        } else {
            Some(distance)
        }
    }
}

/// Classifies a vertex cloud against the plane through `ray.origin` with
/// normal `ray.direction`: `Inside` as soon as vertices fall on both sides.
fn vertex_status_from_ray(ray: &Ray, positions: impl Iterator<Item = Vec3>) -> PointStatus {
    let mut above = 0;
    let mut below = 0;
    for position in positions {
        match ray.point_status(position) {
            PointStatus::Above => above += 1,
            PointStatus::Below => below += 1,
            PointStatus::Inside => {}
        }
        if above > 0 && below > 0 {
            return PointStatus::Inside;
        }
    }
    if above > 0 {
        PointStatus::Above
    } else {
        PointStatus::Below
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vertex_cloud_classification() {
        let ray = Ray::new(Vec3::ZERO, Vec3::Z);
        let above = [Vec3::new(0.0, 0.0, 1.0), Vec3::new(4.0, 2.0, 3.0)];
        let below = [Vec3::new(0.0, 0.0, -1.0), Vec3::new(-2.0, 1.0, -5.0)];

        assert_eq!(
            vertex_status_from_ray(&ray, above.into_iter()),
            PointStatus::Above
        );
        assert_eq!(
            vertex_status_from_ray(&ray, below.into_iter()),
            PointStatus::Below
        );
        assert_eq!(
            vertex_status_from_ray(&ray, above.into_iter().chain(below)),
            PointStatus::Inside
        );
        // Points on the plane never tip the balance.
        assert_eq!(
            vertex_status_from_ray(&ray, [Vec3::X, Vec3::new(0.0, 0.0, 2.0)].into_iter()),
            PointStatus::Above
        );
    }
}
