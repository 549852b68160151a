//! The axis-aligned box the player occupies, used to reject placements.

use cgmath::Point3;

/// Player collision volume around the eye position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayerBody {
    /// Minimum corner in world space
    pub min: Point3<f32>,
    /// Maximum corner in world space
    pub max: Point3<f32>,
}

impl PlayerBody {
    /// Builds the body of a player whose eyes are at `eye`.
    ///
    /// # Arguments
    /// * `eye` - Camera position
    /// * `half_width` - Half the body extent along x and z
    /// * `eye_height` - Distance from the feet up to the eyes
    /// * `head_clearance` - Distance from the eyes up to the top of the head
    pub fn around_eye(eye: Point3<f32>, half_width: f32, eye_height: f32, head_clearance: f32) -> Self {
        Self {
            min: Point3::new(eye.x - half_width, eye.y - eye_height, eye.z - half_width),
            max: Point3::new(eye.x + half_width, eye.y + head_clearance, eye.z + half_width),
        }
    }

    /// Returns `true` if the unit cell of `voxel` overlaps the body.
    ///
    /// Touching faces do not count as overlap.
    pub fn intersects_voxel(&self, voxel: Point3<i32>) -> bool {
        let low = Point3::new(voxel.x as f32, voxel.y as f32, voxel.z as f32);
        (0..3).all(|axis| low[axis] < self.max[axis] && low[axis] + 1.0 > self.min[axis])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_body_covers_feet_to_head() {
        let body = PlayerBody::around_eye(Point3::new(0.5, 10.6, 0.5), 0.3, 1.6, 0.2);
        assert!(body.intersects_voxel(Point3::new(0, 9, 0)));
        assert!(body.intersects_voxel(Point3::new(0, 10, 0)));
        assert!(!body.intersects_voxel(Point3::new(0, 11, 0)));
        assert!(!body.intersects_voxel(Point3::new(0, 8, 0)));
        assert!(!body.intersects_voxel(Point3::new(1, 9, 0)));
    }

    #[test]
    fn test_body_straddling_cells() {
        let body = PlayerBody::around_eye(Point3::new(1.0, 1.6, 1.0), 0.3, 1.6, 0.2);
        assert!(body.intersects_voxel(Point3::new(0, 0, 0)));
        assert!(body.intersects_voxel(Point3::new(1, 0, 1)));
        assert!(!body.intersects_voxel(Point3::new(2, 0, 1)));
    }
}
