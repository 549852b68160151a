use cgmath::{Point3, Vector3};

use crate::engine_state::voxels::block::{block_side::BlockSide, BlockTypeSize};

/// Light factor per ambient occlusion level, from fully enclosed to fully open.
pub const AO_LEVELS: [f32; 4] = [0.1, 0.25, 0.5, 1.0];

/// Represents a single quad face of a voxel in the mesh.
///
/// A face is defined by four corner points (lower-left, lower-right, upper-left,
/// upper-right). Corners are wound so that ll, lr, ur is counter-clockwise when
/// seen from outside the voxel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Face {
    /// Lower-left corner of the face in chunk coordinates
    pub ll: Point3<i32>,
    /// Lower-right corner of the face in chunk coordinates
    pub lr: Point3<i32>,
    /// Upper-left corner of the face in chunk coordinates
    pub ul: Point3<i32>,
    /// Upper-right corner of the face in chunk coordinates
    pub ur: Point3<i32>,
    /// The voxel ID, used for texture mapping
    pub voxel_id: BlockTypeSize,
    /// Which side of the voxel this face represents
    pub block_side: BlockSide,
}

impl Face {
    /// Creates a new face for a voxel at the given coordinates.
    ///
    /// # Arguments
    /// * `i`, `j`, `k` - The coordinates of the voxel in chunk space
    /// * `voxel_id` - The ID of the voxel, used for texture mapping
    /// * `block_side` - Which side of the voxel this face represents
    pub fn new(i: i32, j: i32, k: i32, voxel_id: BlockTypeSize, block_side: BlockSide) -> Self {
        let p = Point3::new;
        let (ll, lr, ul, ur) = match block_side {
            BlockSide::FRONT => (p(i, j, k), p(i, j, k + 1), p(i, j + 1, k), p(i, j + 1, k + 1)),
            BlockSide::BACK => (
                p(i + 1, j, k + 1),
                p(i + 1, j, k),
                p(i + 1, j + 1, k + 1),
                p(i + 1, j + 1, k),
            ),
            BlockSide::BOTTOM => (p(i, j, k + 1), p(i, j, k), p(i + 1, j, k + 1), p(i + 1, j, k)),
            BlockSide::TOP => (
                p(i, j + 1, k),
                p(i, j + 1, k + 1),
                p(i + 1, j + 1, k),
                p(i + 1, j + 1, k + 1),
            ),
            BlockSide::LEFT => (p(i + 1, j, k), p(i, j, k), p(i + 1, j + 1, k), p(i, j + 1, k)),
            BlockSide::RIGHT => (
                p(i, j, k + 1),
                p(i + 1, j, k + 1),
                p(i, j + 1, k + 1),
                p(i + 1, j + 1, k + 1),
            ),
        };

        Face {
            ll,
            lr,
            ul,
            ur,
            voxel_id,
            block_side,
        }
    }

    /// The corners in [ll, lr, ul, ur] order.
    pub fn corners(&self) -> [Point3<i32>; 4] {
        [self.ll, self.lr, self.ul, self.ur]
    }

    /// Ambient occlusion level (0 darkest, 3 open) of each corner, in [ll, lr, ul, ur] order.
    ///
    /// Each corner looks at the three voxels that touch it in the layer just
    /// outside the face: the two edge neighbours and the diagonal one. Two solid
    /// edge neighbours fully occlude the corner regardless of the diagonal.
    ///
    /// # Arguments
    /// * `voxel` - Chunk coordinate of the voxel owning the face
    /// * `is_solid` - Occupancy lookup in chunk coordinates, valid one voxel past every chunk face
    pub fn ambient_occlusion(&self, voxel: Point3<i32>, is_solid: impl Fn(Point3<i32>) -> bool) -> [u8; 4] {
        let outside = voxel + self.block_side.normal();
        let normal_axis = self.block_side.axis();
        let mut tangents = (0..3).filter(|axis| *axis != normal_axis);
        let (first_axis, second_axis) = match (tangents.next(), tangents.next()) {
            (Some(first), Some(second)) => (first, second),
            _ => return [3; 4],
        };

        self.corners().map(|corner| {
            let toward = |axis: usize| {
                let mut step = Vector3::new(0, 0, 0);
                step[axis] = if corner[axis] > voxel[axis] { 1 } else { -1 };
                step
            };
            let first = toward(first_axis);
            let second = toward(second_axis);

            let side1 = is_solid(outside + first);
            let side2 = is_solid(outside + second);
            let diagonal = is_solid(outside + first + second);

            if side1 && side2 {
                0
            } else {
                3 - (side1 as u8 + side2 as u8 + diagonal as u8)
            }
        })
    }

    /// Whether the quad should be split along the lr-ul diagonal.
    ///
    /// Flipping when the ll-ur pair is darker keeps the occlusion gradient
    /// symmetric instead of smearing it along one triangle.
    pub fn should_flip(ao: [u8; 4]) -> bool {
        let [ll, lr, ul, ur] = ao.map(u32::from);
        ll + ur < lr + ul
    }
}

#[cfg(test)]
mod tests {
    use cgmath::InnerSpace;

    use super::*;

    #[test]
    fn test_faces_wind_outward() {
        for side in BlockSide::all() {
            let face = Face::new(0, 0, 0, 1, side);
            let to_vec = |p: Point3<i32>| Vector3::new(p.x as f32, p.y as f32, p.z as f32);
            let edge1 = to_vec(face.lr) - to_vec(face.ll);
            let edge2 = to_vec(face.ur) - to_vec(face.ll);
            let normal = edge1.cross(edge2).normalize();
            let expected = side.normal();
            let expected = Vector3::new(expected.x as f32, expected.y as f32, expected.z as f32);
            assert!((normal - expected).magnitude() < 1e-6, "{side:?} winds inward");
        }
    }

    #[test]
    fn test_open_face_has_full_light() {
        let face = Face::new(4, 4, 4, 1, BlockSide::TOP);
        assert_eq!(face.ambient_occlusion(Point3::new(4, 4, 4), |_| false), [3; 4]);
        assert!(!Face::should_flip([3; 4]));
    }

    #[test]
    fn test_single_occluder_darkens_one_corner() {
        let face = Face::new(4, 4, 4, 1, BlockSide::TOP);
        // Diagonal voxel above the (-x, -z) corner only touches ll.
        let ao = face.ambient_occlusion(Point3::new(4, 4, 4), |p| p == Point3::new(3, 5, 3));
        assert_eq!(ao, [2, 3, 3, 3]);
        assert!(Face::should_flip(ao));
    }

    #[test]
    fn test_two_edge_neighbours_fully_occlude() {
        let face = Face::new(4, 4, 4, 1, BlockSide::TOP);
        let ao = face.ambient_occlusion(Point3::new(4, 4, 4), |p| {
            p == Point3::new(3, 5, 4) || p == Point3::new(4, 5, 3)
        });
        assert_eq!(ao[0], 0);
    }
}
