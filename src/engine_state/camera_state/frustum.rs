//! View frustum culling for chunk bounding spheres.

use cgmath::{InnerSpace, Point3, Vector3};

use super::camera::{Camera, Projection};

/// A snapshot of the camera's view volume.
///
/// Spheres are tested in camera space: depth against the clip planes, then the
/// vertical and horizontal offsets against the half-angles of the field of
/// view, widened by the sphere radius.
#[derive(Debug, Clone, PartialEq)]
pub struct Frustum {
    position: Point3<f32>,
    forward: Vector3<f32>,
    right: Vector3<f32>,
    up: Vector3<f32>,
    znear: f32,
    zfar: f32,
    factor_x: f32,
    tan_x: f32,
    factor_y: f32,
    tan_y: f32,
}

impl Frustum {
    /// Builds the frustum of `camera` viewed through `projection`.
    pub fn new(camera: &Camera, projection: &Projection) -> Self {
        let half_y = projection.fovy().0 * 0.5;
        let half_x = projection.fovx().0 * 0.5;
        Self {
            position: camera.position,
            forward: camera.forward(),
            right: camera.right(),
            up: camera.up(),
            znear: projection.znear(),
            zfar: projection.zfar(),
            factor_x: 1.0 / half_x.cos(),
            tan_x: half_x.tan(),
            factor_y: 1.0 / half_y.cos(),
            tan_y: half_y.tan(),
        }
    }

    /// The camera position the frustum was built from.
    pub fn position(&self) -> Point3<f32> {
        self.position
    }

    /// Returns `true` if any part of the sphere may be visible.
    pub fn contains_sphere(&self, center: Point3<f32>, radius: f32) -> bool {
        let offset = center - self.position;

        let sz = offset.dot(self.forward);
        if sz < self.znear - radius || sz > self.zfar + radius {
            return false;
        }

        let sy = offset.dot(self.up);
        let limit_y = self.factor_y * radius + sz * self.tan_y;
        if sy.abs() > limit_y {
            return false;
        }

        let sx = offset.dot(self.right);
        let limit_x = self.factor_x * radius + sz * self.tan_x;
        sx.abs() <= limit_x
    }
}
