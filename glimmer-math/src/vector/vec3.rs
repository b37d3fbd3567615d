use bytemuck::{Pod, Zeroable};

use super::Vec4;

/// A three-dimensional vector of 32-bit floats.
///
/// This struct is `repr(C)`, so it is guaranteed to be identical to `[f32; 3]`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

super::impl_vector_basics!(Vec3, 3, { 0: x, 1: y, 2: z });

impl Vec3 {
    /// Computes the cross product between this and another vector.
    #[inline]
    pub fn cross(&self, rhs: &Vec3) -> Vec3 {
        Vec3 {
            x: self.y * rhs.z - self.z * rhs.y,
            y: self.z * rhs.x - self.x * rhs.z,
            z: self.x * rhs.y - self.y * rhs.x,
        }
    }

    /// Creates a new [`Vec4`] out of this vector's components and a given `w` component.
    #[inline]
    pub const fn to_vec4(&self, w: f32) -> Vec4 {
        Vec4::new(self.x, self.y, self.z, w)
    }
}
