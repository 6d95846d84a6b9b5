//! Source-to-engine coordinate conversion.
//!
//! The authoring tool and the engine disagree on both axis convention and
//! units. A single fixed change-of-basis matrix (cyclic axis permutation
//! times a uniform scale) normalizes both everywhere positions or
//! orientations are emitted. Matrices are conjugated (`basis * m * basis⁻¹`);
//! raw positions are mapped forward only (`basis * (world * v)`). The two
//! maps are intentionally different: vectors and linear maps do not
//! transform the same way under a change of basis.

use glam::{Mat4, Vec3, Vec4};

/// Default uniform scale (source units to engine meters)
pub const DEFAULT_SCALE: f32 = 0.00254;

/// Fixed change-of-basis + uniform-scale map
#[derive(Debug, Clone, Copy)]
pub struct Basis {
    forward: Mat4,
    inverse: Mat4,
}

impl Basis {
    /// Build the basis for a given uniform scale.
    ///
    /// The axis permutation is fixed: a source point (x, y, z) lands at
    /// scale * (y, z, x) in engine space. The permutation is cyclic, so the
    /// determinant stays positive and no mirroring sneaks in.
    pub fn with_scale(scale: f32) -> Self {
        let forward = Mat4::from_cols(
            Vec4::new(0.0, 0.0, scale, 0.0),
            Vec4::new(scale, 0.0, 0.0, 0.0),
            Vec4::new(0.0, scale, 0.0, 0.0),
            Vec4::W,
        );
        Self {
            forward,
            inverse: forward.inverse(),
        }
    }

    /// Conjugate a matrix into engine space: `basis * m * basis⁻¹`.
    ///
    /// Rotation parts come through unscaled (the uniform scale cancels);
    /// translation parts are permuted and scaled.
    pub fn conjugate(&self, m: Mat4) -> Mat4 {
        self.forward * m * self.inverse
    }

    /// Map a local-space position through an object's world matrix into
    /// engine space: `basis * (world * v)`. No inverse on the right, this is
    /// a forward point map, not a conjugation.
    pub fn transform_point(&self, world: Mat4, v: Vec3) -> Vec3 {
        (self.forward * world).transform_point3(v)
    }

    /// The raw basis matrix
    pub fn matrix(&self) -> Mat4 {
        self.forward
    }
}

impl Default for Basis {
    fn default() -> Self {
        Self::with_scale(DEFAULT_SCALE)
    }
}
