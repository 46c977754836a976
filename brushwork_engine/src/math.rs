// Copyright (C) 2026 the brushwork contributors
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use glam::Vec3;

/// General-purpose tolerance for "is this value basically zero" checks.
pub const ALMOST_ZERO: f32 = 0.001;

/// Tolerance used when classifying points against a plane. Points within this
/// distance of the plane count as lying on it.
pub const POINT_STATUS_EPSILON: f32 = 0.01;

/// Wider tolerance used when classifying brush vertices against a cutting
/// plane. A plane is allowed to pass through existing vertices, so anything
/// it nearly touches counts as on it rather than cut by it.
pub const CUT_VERTEX_EPSILON: f32 = 0.1;

/// Tolerance below which a vertex coordinate snaps to the nearest integer.
/// This is what QBSP uses.
pub const CORRECT_EPSILON: f32 = 0.001;

/// Tolerance for parallelism and coplanarity tests.
pub const COLINEAR_EPSILON: f32 = 0.01;

pub fn is_zero(v: f32, epsilon: f32) -> bool {
    v.abs() <= epsilon
}

pub fn is_pos(v: f32, epsilon: f32) -> bool {
    v > epsilon
}

pub fn is_neg(v: f32, epsilon: f32) -> bool {
    v < -epsilon
}

/// Rounds `v` to the nearest integer if it is within `epsilon` of it,
/// otherwise returns `v` unchanged.
pub fn correct(v: f32, epsilon: f32) -> f32 {
    let r = v.round();
    if (v - r).abs() < epsilon {
        r
    } else {
        v
    }
}

pub fn correct_vec3(v: Vec3, epsilon: f32) -> Vec3 {
    Vec3::new(
        correct(v.x, epsilon),
        correct(v.y, epsilon),
        correct(v.z, epsilon),
    )
}

/// Whether two (non-zero) vectors point along the same line, in either
/// direction. Scale-invariant: the test is on the sine of the enclosed angle.
pub fn parallel(a: Vec3, b: Vec3, epsilon: f32) -> bool {
    a.normalize().cross(b.normalize()).length() <= epsilon
}

/// Classification of a point relative to an oriented plane (or ray).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointStatus {
    Above,
    Below,
    Inside,
}

/// An oriented plane in normal-distance form: `p` lies on the plane iff
/// `normal.dot(p) == distance`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Plane {
    pub normal: Vec3,
    pub distance: f32,
}

impl Plane {
    pub fn new(normal: Vec3, distance: f32) -> Self {
        Self { normal, distance }
    }

    /// Builds the plane through three points, with the normal oriented so the
    /// points wind clockwise when viewed from the positive side. Returns
    /// `None` when the points are colinear.
    pub fn from_points(p0: Vec3, p1: Vec3, p2: Vec3) -> Option<Self> {
        let normal = (p2 - p0).cross(p1 - p0);
        if normal.length() <= ALMOST_ZERO {
            return None;
        }
        let normal = normal.normalize();
        Some(Self {
            normal,
            distance: p0.dot(normal),
        })
    }

    pub fn anchor(&self) -> Vec3 {
        self.normal * self.distance
    }

    pub fn point_distance(&self, point: Vec3) -> f32 {
        point.dot(self.normal) - self.distance
    }

    pub fn point_status_eps(&self, point: Vec3, epsilon: f32) -> PointStatus {
        let dist = self.point_distance(point);
        if dist > epsilon {
            PointStatus::Above
        } else if dist < -epsilon {
            PointStatus::Below
        } else {
            PointStatus::Inside
        }
    }

    pub fn point_status(&self, point: Vec3) -> PointStatus {
        self.point_status_eps(point, POINT_STATUS_EPSILON)
    }

    pub fn equals(&self, other: &Plane, epsilon: f32) -> bool {
        (self.distance - other.distance).abs() <= epsilon
            && (self.normal.x - other.normal.x).abs() <= epsilon
            && (self.normal.y - other.normal.y).abs() <= epsilon
            && (self.normal.z - other.normal.z).abs() <= epsilon
    }

    /// Distance along `ray` at which it crosses the plane. `None` when the ray
    /// is parallel to the plane or the crossing lies behind the origin.
    pub fn intersect_ray(&self, ray: &Ray) -> Option<f32> {
        let denom = ray.direction.dot(self.normal);
        if is_zero(denom, ALMOST_ZERO) {
            return None;
        }
        let dist = (self.anchor() - ray.origin).dot(self.normal) / denom;
        if dist < 0.0 {
            None
        } else {
            Some(dist)
        }
    }

    pub fn translate(&mut self, delta: Vec3) {
        self.distance += self.normal.dot(delta);
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self { origin, direction }
    }

    pub fn point_at_distance(&self, distance: f32) -> Vec3 {
        self.origin + self.direction * distance
    }

    /// Which side of the plane through the origin, orthogonal to the ray
    /// direction, the point lies on.
    pub fn point_status(&self, point: Vec3) -> PointStatus {
        let dot = self.direction.dot(point - self.origin);
        if dot > POINT_STATUS_EPSILON {
            PointStatus::Above
        } else if dot < -POINT_STATUS_EPSILON {
            PointStatus::Below
        } else {
            PointStatus::Inside
        }
    }
}

/// An axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// The degenerate box containing only `point`.
    pub fn at_point(point: Vec3) -> Self {
        Self {
            min: point,
            max: point,
        }
    }

    /// The smallest box containing every point of the iterator. Panics on an
    /// empty iterator.
    pub fn of_points(mut points: impl Iterator<Item = Vec3>) -> Self {
        let first = points.next().expect("Bounds of an empty point set");
        let mut bounds = Self::at_point(first);
        for p in points {
            bounds.merge_point(p);
        }
        bounds
    }

    pub fn merge_point(&mut self, point: Vec3) {
        self.min = self.min.min(point);
        self.max = self.max.max(point);
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    pub fn translate(&mut self, delta: Vec3) {
        self.min += delta;
        self.max += delta;
    }

    pub fn contains_point(&self, p: Vec3) -> bool {
        p.x >= self.min.x
            && p.x <= self.max.x
            && p.y >= self.min.y
            && p.y <= self.max.y
            && p.z >= self.min.z
            && p.z <= self.max.z
    }

    pub fn contains_aabb(&self, other: &Aabb) -> bool {
        self.contains_point(other.min) && self.contains_point(other.max)
    }

    pub fn intersects_aabb(&self, other: &Aabb) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
            && self.min.z <= other.max.z
            && self.max.z >= other.min.z
    }

    /// The eight corners, in no particular order.
    pub fn corners(&self) -> [Vec3; 8] {
        let (lo, hi) = (self.min, self.max);
        [
            Vec3::new(lo.x, lo.y, lo.z),
            Vec3::new(hi.x, lo.y, lo.z),
            Vec3::new(hi.x, hi.y, lo.z),
            Vec3::new(lo.x, hi.y, lo.z),
            Vec3::new(lo.x, lo.y, hi.z),
            Vec3::new(hi.x, lo.y, hi.z),
            Vec3::new(hi.x, hi.y, hi.z),
            Vec3::new(lo.x, hi.y, hi.z),
        ]
    }

    /// Slab test. Returns the distance along the ray to the first boundary
    /// crossing, or `None` when the ray misses the box. A ray starting inside
    /// the box hits at distance zero.
    pub fn intersect_ray(&self, ray: &Ray) -> Option<f32> {
        if self.contains_point(ray.origin) {
            return Some(0.0);
        }
        let mut t_min = f32::NEG_INFINITY;
        let mut t_max = f32::INFINITY;
        for axis in 0..3 {
            let dir = ray.direction[axis];
            let origin = ray.origin[axis];
            if is_zero(dir, ALMOST_ZERO) {
                if origin < self.min[axis] || origin > self.max[axis] {
                    return None;
                }
            } else {
                let t0 = (self.min[axis] - origin) / dir;
                let t1 = (self.max[axis] - origin) / dir;
                t_min = t_min.max(t0.min(t1));
                t_max = t_max.min(t0.max(t1));
            }
        }
        if t_min > t_max || t_max < 0.0 {
            None
        } else {
            Some(t_min.max(0.0))
        }
    }
}

/// Index of the axis along which `v` has the largest magnitude.
pub fn dominant_axis(v: Vec3) -> usize {
    let a = v.abs();
    if a.x >= a.y && a.x >= a.z {
        0
    } else if a.y >= a.x && a.y >= a.z {
        1
    } else {
        2
    }
}

/// Projects `p` onto the coordinate plane orthogonal to `axis`, dropping that
/// coordinate. The winding of projected polygons may flip, which parity-based
/// point-in-polygon tests are insensitive to.
pub fn project_dropping_axis(p: Vec3, axis: usize) -> (f32, f32) {
    match axis {
        0 => (p.y, p.z),
        1 => (p.x, p.z),
        _ => (p.x, p.y),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plane_from_points_orientation() {
        // Clockwise when viewed from +Z
        let plane = Plane::from_points(
            Vec3::new(0.0, 0.0, 16.0),
            Vec3::new(0.0, 1.0, 16.0),
            Vec3::new(1.0, 0.0, 16.0),
        )
        .unwrap();
        assert!((plane.normal - Vec3::Z).length() < 1e-6);
        assert!((plane.distance - 16.0).abs() < 1e-6);

        assert_eq!(
            plane.point_status(Vec3::new(5.0, 5.0, 17.0)),
            PointStatus::Above
        );
        assert_eq!(
            plane.point_status(Vec3::new(5.0, 5.0, 15.0)),
            PointStatus::Below
        );
        assert_eq!(
            plane.point_status(Vec3::new(5.0, 5.0, 16.005)),
            PointStatus::Inside
        );
    }

    #[test]
    fn plane_from_colinear_points() {
        assert!(Plane::from_points(Vec3::ZERO, Vec3::X, Vec3::X * 2.0).is_none());
    }

    #[test]
    fn aabb_ray_intersection() {
        let bounds = Aabb::new(Vec3::splat(-32.0), Vec3::splat(32.0));
        let ray = Ray::new(Vec3::new(-64.0, 0.0, 0.0), Vec3::X);
        assert_eq!(bounds.intersect_ray(&ray), Some(32.0));

        let miss = Ray::new(Vec3::new(-64.0, 64.0, 0.0), Vec3::X);
        assert_eq!(bounds.intersect_ray(&miss), None);

        let inside = Ray::new(Vec3::ZERO, Vec3::X);
        assert_eq!(bounds.intersect_ray(&inside), Some(0.0));

        let behind = Ray::new(Vec3::new(64.0, 0.0, 0.0), Vec3::X);
        assert_eq!(bounds.intersect_ray(&behind), None);
    }

    #[test]
    fn correction_rounds_near_integers() {
        assert_eq!(correct(15.9995, CORRECT_EPSILON), 16.0);
        assert_eq!(correct(15.9, CORRECT_EPSILON), 15.9);
        let v = correct_vec3(Vec3::new(0.0004, -7.9999, 3.5), CORRECT_EPSILON);
        assert_eq!(v, Vec3::new(0.0, -8.0, 3.5));
    }

    #[test]
    fn parallel_is_scale_invariant() {
        assert!(parallel(Vec3::X, Vec3::X * -100.0, COLINEAR_EPSILON));
        assert!(!parallel(Vec3::X, Vec3::new(1.0, 0.1, 0.0), COLINEAR_EPSILON));
    }
}
