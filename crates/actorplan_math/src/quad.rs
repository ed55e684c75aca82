//! Flat quad geometry used for ground decals.

use glam::Vec3;

/// A flat, axis-aligned quad centred on the origin in the XY plane.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Quad {
    /// Extent along X
    pub width: f32,

    /// Extent along Y
    pub depth: f32,
}

impl Quad {
    /// Vertex order of the single quad face.
    pub const FACE: [u32; 4] = [0, 1, 3, 2];

    pub fn new(width: f32, depth: f32) -> Self {
        Self { width, depth }
    }

    /// Corner positions: (-x,-y), (+x,-y), (-x,+y), (+x,+y).
    pub fn positions(&self) -> [Vec3; 4] {
        let hw = self.width / 2.0;
        let hd = self.depth / 2.0;
        [
            Vec3::new(-hw, -hd, 0.0),
            Vec3::new(hw, -hd, 0.0),
            Vec3::new(-hw, hd, 0.0),
            Vec3::new(hw, hd, 0.0),
        ]
    }

    /// A reset UV layout that maps the full texture once over the quad.
    pub fn uvs(&self) -> [[f32; 2]; 4] {
        [[0.0, 0.0], [1.0, 0.0], [0.0, 1.0], [1.0, 1.0]]
    }

    /// The face split into two triangles.
    pub fn triangles(&self) -> [u32; 6] {
        let [a, b, c, d] = Self::FACE;
        [a, b, c, a, c, d]
    }
}
