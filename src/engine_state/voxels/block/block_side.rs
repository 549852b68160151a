//! # Block Side Module
//!
//! The six faces of a voxel cube, their outward normals, and the fixed face
//! order used everywhere faces are enumerated.

use cgmath::Vector3;

/// Represents the six possible faces of a voxel block.
///
/// The discriminant is the face id written into vertices and the index into
/// per-side arrays. The order is: [FRONT, BACK, BOTTOM, TOP, LEFT, RIGHT]
#[derive(PartialEq, Eq, Hash, Copy, Clone, Debug)]
pub enum BlockSide {
    /// The face facing negative X
    FRONT = 0,

    /// The face facing positive X
    BACK = 1,

    /// The face facing negative Y
    BOTTOM = 2,

    /// The face facing positive Y
    TOP = 3,

    /// The face facing negative Z
    LEFT = 4,

    /// The face facing positive Z
    RIGHT = 5,
}

impl BlockSide {
    /// Returns an array containing all six block faces in a consistent order.
    ///
    /// # Returns
    /// An array containing all `BlockSide` variants.
    pub fn all() -> [BlockSide; 6] {
        [
            BlockSide::FRONT,
            BlockSide::BACK,
            BlockSide::BOTTOM,
            BlockSide::TOP,
            BlockSide::LEFT,
            BlockSide::RIGHT,
        ]
    }

    /// The unit vector pointing out of the face.
    pub fn normal(self) -> Vector3<i32> {
        match self {
            BlockSide::FRONT => Vector3::new(-1, 0, 0),
            BlockSide::BACK => Vector3::new(1, 0, 0),
            BlockSide::BOTTOM => Vector3::new(0, -1, 0),
            BlockSide::TOP => Vector3::new(0, 1, 0),
            BlockSide::LEFT => Vector3::new(0, 0, -1),
            BlockSide::RIGHT => Vector3::new(0, 0, 1),
        }
    }

    /// The face on the other side of the cube.
    pub fn opposite(self) -> BlockSide {
        match self {
            BlockSide::FRONT => BlockSide::BACK,
            BlockSide::BACK => BlockSide::FRONT,
            BlockSide::BOTTOM => BlockSide::TOP,
            BlockSide::TOP => BlockSide::BOTTOM,
            BlockSide::LEFT => BlockSide::RIGHT,
            BlockSide::RIGHT => BlockSide::LEFT,
        }
    }

    /// Index of the axis the normal lies on (0 = x, 1 = y, 2 = z).
    pub fn axis(self) -> usize {
        match self {
            BlockSide::FRONT | BlockSide::BACK => 0,
            BlockSide::BOTTOM | BlockSide::TOP => 1,
            BlockSide::LEFT | BlockSide::RIGHT => 2,
        }
    }

    /// Returns `true` if the normal points along the positive axis.
    pub fn is_positive(self) -> bool {
        matches!(self, BlockSide::BACK | BlockSide::TOP | BlockSide::RIGHT)
    }

    /// Fixed directional light factor applied to every quad of this face.
    pub fn shading(self) -> f32 {
        match self {
            BlockSide::TOP => 1.0,
            BlockSide::BOTTOM => 0.5,
            BlockSide::BACK => 0.5,
            BlockSide::FRONT => 0.8,
            BlockSide::LEFT => 0.5,
            BlockSide::RIGHT => 0.8,
        }
    }

    /// Looks up the side whose normal equals `normal`.
    ///
    /// # Returns
    /// `None` unless `normal` is one of the six axis-aligned unit vectors.
    pub fn from_normal(normal: Vector3<i32>) -> Option<BlockSide> {
        BlockSide::all()
            .into_iter()
            .find(|side| side.normal() == normal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opposite_normals_cancel() {
        for side in BlockSide::all() {
            assert_eq!(side.normal() + side.opposite().normal(), Vector3::new(0, 0, 0));
            assert_eq!(side.opposite().opposite(), side);
        }
    }

    #[test]
    fn test_from_normal() {
        for side in BlockSide::all() {
            assert_eq!(BlockSide::from_normal(side.normal()), Some(side));
        }
        assert_eq!(BlockSide::from_normal(Vector3::new(1, 1, 0)), None);
    }

    #[test]
    fn test_discriminants_follow_all_order() {
        for (index, side) in BlockSide::all().into_iter().enumerate() {
            assert_eq!(side as usize, index);
        }
    }
}
