use bytemuck::{Pod, Zeroable};

use crate::{operator, Vec4};

/// A 4×4 column-major matrix of 32-bit floats.
///
/// This struct is `repr(C)`, so it is guaranteed to be identical to `[[f32; 4]; 4]` or
/// `[f32; 16]`. Columns are stored contiguously, matching what vertex shaders expect when they
/// multiply a matrix uniform with a position.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct Mat4 {
    m: [[f32; 4]; 4],
}

impl Default for Mat4 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mat4 {
    /// The 4×4 identity matrix.
    #[rustfmt::skip]
    pub const IDENTITY: Mat4 = Mat4::from_cols(
        Vec4::new(1.0, 0.0, 0.0, 0.0),
        Vec4::new(0.0, 1.0, 0.0, 0.0),
        Vec4::new(0.0, 0.0, 1.0, 0.0),
        Vec4::new(0.0, 0.0, 0.0, 1.0),
    );

    /// Creates a matrix from four column vectors.
    #[inline]
    pub const fn from_cols(c0: Vec4, c1: Vec4, c2: Vec4, c3: Vec4) -> Mat4 {
        Mat4 {
            m: [
                [c0.x, c0.y, c0.z, c0.w],
                [c1.x, c1.y, c1.z, c1.w],
                [c2.x, c2.y, c2.z, c2.w],
                [c3.x, c3.y, c3.z, c3.w],
            ],
        }
    }

    /// Creates a matrix from row-major scalars, i.e. written down the way it reads on paper.
    #[inline]
    #[allow(clippy::too_many_arguments)]
    #[rustfmt::skip]
    pub const fn new(
        n00: f32, n01: f32, n02: f32, n03: f32,
        n10: f32, n11: f32, n12: f32, n13: f32,
        n20: f32, n21: f32, n22: f32, n23: f32,
        n30: f32, n31: f32, n32: f32, n33: f32,
    ) -> Mat4 {
        Mat4 {
            m: [
                [n00, n10, n20, n30],
                [n01, n11, n21, n31],
                [n02, n12, n22, n32],
                [n03, n13, n23, n33],
            ],
        }
    }

    /// Returns the `i`-th column.
    #[inline]
    pub fn col(&self, i: usize) -> Vec4 {
        Vec4::from(self.m[i])
    }

    /// Computes a new matrix which is this matrix's transpose.
    #[rustfmt::skip]
    pub fn transpose(&self) -> Mat4 {
        let m = &self.m;
        Mat4 {
            m: [
                [m[0][0], m[1][0], m[2][0], m[3][0]],
                [m[0][1], m[1][1], m[2][1], m[3][1]],
                [m[0][2], m[1][2], m[2][2], m[3][2]],
                [m[0][3], m[1][3], m[2][3], m[3][3]],
            ],
        }
    }

    /// Interprets this matrix as a flat array of 16 floats in column-major order.
    #[inline]
    pub fn as_array(&self) -> &[f32; 16] {
        bytemuck::cast_ref(self)
    }
}

operator!(* |a: Mat4, b: Mat4| -> Mat4 {
    let mut m = [[0.0f32; 4]; 4];
    for (col, out) in m.iter_mut().enumerate() {
        for (row, cell) in out.iter_mut().enumerate() {
            *cell = a.m[0][row] * b.m[col][0]
                + a.m[1][row] * b.m[col][1]
                + a.m[2][row] * b.m[col][2]
                + a.m[3][row] * b.m[col][3];
        }
    }
    Mat4 { m }
});

operator!(* |a: Mat4, b: Vec4| -> Vec4 {
    Vec4::new(
        a.m[0][0] * b.x + a.m[1][0] * b.y + a.m[2][0] * b.z + a.m[3][0] * b.w,
        a.m[0][1] * b.x + a.m[1][1] * b.y + a.m[2][1] * b.z + a.m[3][1] * b.w,
        a.m[0][2] * b.x + a.m[1][2] * b.y + a.m[2][2] * b.z + a.m[3][2] * b.w,
        a.m[0][3] * b.x + a.m[1][3] * b.y + a.m[2][3] * b.z + a.m[3][3] * b.w,
    )
});
