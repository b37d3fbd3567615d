//! Floating-point and fixed-point edge functions.

use glimmer_math::{Fixed24_8, Vec2, Vec2Fixed};

/// Given a point `p` and an oriented line, the edge function of the line determines on which side
/// of the line (with respect to its orientation) `p` lies.
///
/// A value of `0` means the point is on the line; the sign distinguishes the two half-planes. For
/// a triangle with clockwise winding (in a y-down coordinate system), a point is inside exactly
/// when all three edge functions are non-positive, which is why the rasterizer negates them to
/// obtain "inside is positive" barycentric values.
#[derive(Debug, Clone, Copy)]
pub struct EdgeFunction {
    /// Constant term of the line equation.
    pub c: f32,

    /// Difference vector of the two defining points.
    pub v_diff: Vec2,
}

impl EdgeFunction {
    /// Constructs the edge function for the oriented line from `v0` to `v1`.
    pub fn new(v0: Vec2, v1: Vec2) -> EdgeFunction {
        let v_diff = v1 - v0;
        // The constant term is the scalar product of the line normal with any point on the line;
        // we choose v0.
        EdgeFunction {
            c: v0.area(&v_diff),
            v_diff,
        }
    }

    /// Evaluates the edge function at `p`.
    #[inline]
    pub fn evaluate(&self, p: Vec2) -> f32 {
        p.area(&self.v_diff) - self.c
    }

    /// Returns the change rate for unit steps in x and y. This is the line's normal.
    #[inline]
    pub fn change_rate(&self) -> Vec2 {
        Vec2::new(self.v_diff.y, -self.v_diff.x)
    }
}

/// The edge function over 28.4 fixed-point coordinates.
///
/// This is not just [`EdgeFunction`] with the scalar type swapped: the multiplication inside
/// [`area`][Vec2Fixed::area] widens the format, so the constant term and all evaluations carry
/// 8 fractional bits.
#[derive(Debug, Clone, Copy)]
pub struct EdgeFunctionFixed {
    /// Constant term, in 24.8 to account for the multiplication involved.
    pub c: Fixed24_8,

    /// Difference vector of the two defining points, on the subpixel grid.
    pub v_diff: Vec2Fixed,
}

impl EdgeFunctionFixed {
    /// Constructs the edge function for the oriented line from `v0` to `v1`.
    pub fn new(v0: Vec2Fixed, v1: Vec2Fixed) -> EdgeFunctionFixed {
        let v_diff = v1 - v0;
        EdgeFunctionFixed {
            c: v0.area(&v_diff),
            v_diff,
        }
    }

    /// Evaluates the edge function at `p`. The result carries 8 fractional bits.
    #[inline]
    pub fn evaluate(&self, p: Vec2Fixed) -> Fixed24_8 {
        p.area(&self.v_diff) - self.c
    }

    /// Change rate for one unit step in x direction.
    #[inline]
    pub fn change_x(&self) -> Fixed24_8 {
        self.v_diff.y.widen()
    }

    /// Change rate for one unit step in y direction.
    #[inline]
    pub fn change_y(&self) -> Fixed24_8 {
        -self.v_diff.x.widen()
    }
}
