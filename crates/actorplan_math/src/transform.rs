//! Object transforms and transform baking.
//!
//! A node in the host scene carries an object-level [`Transform`] on top of
//! its geometry. "Baking" moves some of those components into the geometry
//! and resets them on the object, leaving the world placement unchanged.

use glam::{Mat4, Quat, Vec3};

/// Transform components that can be composed into a matrix.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    /// Translation
    pub translation: Vec3,

    /// Rotation (as quaternion)
    pub rotation: Quat,

    /// Scale
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    /// The identity transform.
    pub const IDENTITY: Self = Self {
        translation: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    /// Create a transform placed at `translation` and turned about the
    /// vertical (Z) axis by `degrees`.
    pub fn from_translation_yaw_degrees(translation: Vec3, degrees: f32) -> Self {
        Self {
            translation,
            rotation: Quat::from_rotation_z(degrees.to_radians()),
            scale: Vec3::ONE,
        }
    }

    /// Decompose a 4x4 matrix into translation, rotation, and scale.
    pub fn from_matrix(matrix: Mat4) -> Self {
        let (scale, rotation, translation) = matrix.to_scale_rotation_translation();
        Self {
            translation,
            rotation,
            scale,
        }
    }

    /// Convert to a 4x4 transformation matrix.
    ///
    /// Order: Scale -> Rotate -> Translate (SRT)
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }

    /// Bake the components selected by `mask` into geometry.
    ///
    /// Returns `(geometry_matrix, residual)`: the matrix to pre-multiply into
    /// the node's vertex data and the transform left on the object. The
    /// invariant `residual.to_matrix() * geometry_matrix == self.to_matrix()`
    /// holds, so world placement is preserved.
    pub fn bake(&self, mask: BakeMask) -> (Mat4, Transform) {
        if mask.is_empty() {
            return (Mat4::IDENTITY, *self);
        }

        let residual = Transform {
            translation: if mask.translation { Vec3::ZERO } else { self.translation },
            rotation: if mask.rotation { Quat::IDENTITY } else { self.rotation },
            scale: if mask.scale { Vec3::ONE } else { self.scale },
        };

        let geometry = residual.to_matrix().inverse() * self.to_matrix();
        (geometry, residual)
    }
}

/// Which transform components a bake moves into geometry.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BakeMask {
    pub translation: bool,
    pub rotation: bool,
    pub scale: bool,
}

impl BakeMask {
    /// Bake nothing.
    pub const NONE: Self = Self {
        translation: false,
        rotation: false,
        scale: false,
    };

    /// Bake translation, rotation and scale.
    pub const ALL: Self = Self {
        translation: true,
        rotation: true,
        scale: true,
    };

    /// Bake scale only.
    pub const SCALE: Self = Self {
        translation: false,
        rotation: false,
        scale: true,
    };

    pub fn is_empty(&self) -> bool {
        !(self.translation || self.rotation || self.scale)
    }
}
