use bytemuck::{Pod, Zeroable};

use super::{Vec2, Vec3};

/// A four-dimensional vector of 32-bit floats.
///
/// This struct is `repr(C)`, so it is guaranteed to be identical to `[f32; 4]`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct Vec4 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

super::impl_vector_basics!(Vec4, 4, { 0: x, 1: y, 2: z, 3: w });

impl Vec4 {
    /// Creates a new [`Vec4`] out of a [`Vec3`]'s components and a given `w` component.
    #[inline]
    pub const fn from_vec3(xyz: Vec3, w: f32) -> Vec4 {
        Vec4::new(xyz.x, xyz.y, xyz.z, w)
    }

    /// Creates a new [`Vec3`] by ignoring this vector's `w` component.
    #[inline]
    pub const fn to_vec3(&self) -> Vec3 {
        Vec3::new(self.x, self.y, self.z)
    }

    /// Returns the `x` and `y` components as a [`Vec2`].
    #[inline]
    pub const fn xy(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    /// Performs the perspective divide, replacing `w` with its reciprocal.
    ///
    /// After this call, `(x, y, z)` hold normalized device coordinates and `w` holds `1 / w_clip`,
    /// which the attribute interpolators need downstream.
    #[inline]
    pub fn divide_by_w(&mut self) {
        let inv_w = 1.0 / self.w;
        self.x *= inv_w;
        self.y *= inv_w;
        self.z *= inv_w;
        self.w = inv_w;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn divide_by_w_stores_reciprocal() {
        let mut v = Vec4::new(2.0, 4.0, 6.0, 2.0);
        v.divide_by_w();
        assert_eq!(v, Vec4::new(1.0, 2.0, 3.0, 0.5));
    }

    #[test]
    fn lerp_endpoints_and_midpoint() {
        let a = Vec4::new(0.0, 1.0, 2.0, 3.0);
        let b = Vec4::new(4.0, 3.0, 2.0, 1.0);

        assert_eq!(Vec4::lerp(0.0, a, b), a);
        assert_eq!(Vec4::lerp(1.0, a, b), b);
        assert_eq!(Vec4::lerp(0.5, a, b), Vec4::new(2.0, 2.0, 2.0, 2.0));
    }

    #[test]
    fn clamp01_saturates() {
        let v = Vec4::new(-1.0, 0.25, 1.5, 1.0);
        assert_eq!(v.clamp01(), Vec4::new(0.0, 0.25, 1.0, 1.0));
    }
}
