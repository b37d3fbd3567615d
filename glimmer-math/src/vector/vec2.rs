use bytemuck::{Pod, Zeroable};

/// A two-dimensional vector of 32-bit floats.
///
/// This struct is `repr(C)`, so it is guaranteed to be identical to `[f32; 2]`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

super::impl_vector_basics!(Vec2, 2, { 0: x, 1: y });

impl Vec2 {
    /// Computes the signed area of the parallelogram spanned by this vector and `rhs`.
    ///
    /// This is the z-component of the 3D cross product; its sign encodes which side of `self` the
    /// vector `rhs` lies on.
    #[inline]
    pub fn area(&self, rhs: &Vec2) -> f32 {
        self.x * rhs.y - self.y * rhs.x
    }

    /// Returns the sign of [`area`][Self::area] as `-1`, `0` or `1`.
    #[inline]
    pub fn area_sign(&self, rhs: &Vec2) -> i32 {
        let a = self.area(rhs);
        if a > 0.0 {
            1
        } else if a < 0.0 {
            -1
        } else {
            0
        }
    }
}
