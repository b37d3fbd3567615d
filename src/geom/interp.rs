//! Linear interpolators in one and two directions.
//!
//! These advance a value incrementally as the rasterizer walks pixels and blocks. The 2D variant
//! keeps a `row_start` so a block can be traversed row-major: `advance_y` jumps to the next row
//! and resets the x direction.

use core::ops::{Add, AddAssign};

use glimmer_math::{Fixed24_8, Vec4};

/// A value that can be stepped by an integer multiple of its unit step.
pub trait StepValue: Copy + Add<Output = Self> + AddAssign {
    /// Returns `self` scaled by `n`.
    fn scaled(self, n: i32) -> Self;
}

/// A [`StepValue`] that can additionally be weighted by a float parameter, which the
/// interpolators need to initialize from a reference value.
pub trait LerpValue: StepValue {
    /// Returns `self` scaled by `t`.
    fn weighted(self, t: f32) -> Self;
}

impl StepValue for f32 {
    #[inline]
    fn scaled(self, n: i32) -> f32 {
        self * n as f32
    }
}

impl LerpValue for f32 {
    #[inline]
    fn weighted(self, t: f32) -> f32 {
        self * t
    }
}

impl StepValue for Vec4 {
    #[inline]
    fn scaled(self, n: i32) -> Vec4 {
        self * n as f32
    }
}

impl LerpValue for Vec4 {
    #[inline]
    fn weighted(self, t: f32) -> Vec4 {
        self * t
    }
}

impl StepValue for Fixed24_8 {
    #[inline]
    fn scaled(self, n: i32) -> Fixed24_8 {
        self * n
    }
}

/// A pair of values for the two interpolation directions.
#[derive(Debug, Clone, Copy, Default)]
pub struct StepPair<T> {
    pub x: T,
    pub y: T,
}

impl<T> StepPair<T> {
    pub const fn new(x: T, y: T) -> StepPair<T> {
        StepPair { x, y }
    }
}

/// Linear interpolator for data with one interpolation direction.
#[derive(Debug, Clone, Copy, Default)]
pub struct LinearInterpolator1d<T> {
    /// Current (possibly weighted) value.
    pub value: T,

    /// Unit step size.
    pub step: T,

    /// Difference along the edge.
    pub diff: T,
}

impl<T: StepValue> LinearInterpolator1d<T> {
    pub fn new(value: T, step: T, diff: T) -> LinearInterpolator1d<T> {
        LinearInterpolator1d { value, step, diff }
    }

    /// Steps once along the parameter direction.
    #[inline]
    pub fn advance(&mut self) {
        self.value += self.step;
    }
}

impl<T: LerpValue> LinearInterpolator1d<T> {
    /// Initializes the value at parameter `lambda` from a reference value.
    pub fn set_value_from_reference(&mut self, reference: T, lambda: f32) {
        self.value = reference + self.diff.weighted(lambda);
    }
}

/// Linear interpolator for data with two interpolation directions.
#[derive(Debug, Clone, Copy, Default)]
pub struct LinearInterpolator2d<T> {
    /// Current (possibly weighted) value.
    pub value: T,

    /// Unit step sizes in x and y.
    pub step: StepPair<T>,

    /// Differences along two linearly independent vectors.
    pub diffs: StepPair<T>,

    /// Value at the start of the current row.
    pub row_start: T,
}

impl<T: StepValue> LinearInterpolator2d<T> {
    pub fn new(value: T, step: StepPair<T>, diffs: StepPair<T>) -> LinearInterpolator2d<T> {
        LinearInterpolator2d {
            value,
            step,
            diffs,
            row_start: value,
        }
    }

    /// Stores the current value as the row start, so that `advance_y` restarts rows here.
    #[inline]
    pub fn setup_block_processing(&mut self) {
        self.row_start = self.value;
    }

    /// Overwrites the value and the row start.
    #[inline]
    pub fn set_value(&mut self, value: T) {
        self.value = value;
        self.row_start = value;
    }

    /// Steps once in x direction.
    #[inline]
    pub fn advance_x(&mut self) {
        self.value += self.step.x;
    }

    /// Steps `n` times in x direction.
    #[inline]
    pub fn advance_x_by(&mut self, n: i32) {
        self.value += self.step.x.scaled(n);
    }

    /// Advances to the next row and resets the x direction.
    #[inline]
    pub fn advance_y(&mut self) {
        self.row_start += self.step.y;
        self.value = self.row_start;
    }

    /// Advances `n` rows and resets the x direction.
    #[inline]
    pub fn advance_y_by(&mut self, n: i32) {
        self.row_start += self.step.y.scaled(n);
        self.value = self.row_start;
    }

    /// Steps `n` times in y direction without touching the row start.
    ///
    /// If the interpolator is to be used for block processing afterwards,
    /// `setup_block_processing` has to be called first.
    #[inline]
    pub fn step_y(&mut self, n: i32) {
        self.value += self.step.y.scaled(n);
    }
}

impl<T: LerpValue> LinearInterpolator2d<T> {
    /// Initializes the value at barycentric parameters `(lambda1, lambda2)` from a reference.
    pub fn set_value_from_reference(&mut self, reference: T, lambda1: f32, lambda2: f32) {
        self.row_start = reference + self.diffs.x.weighted(lambda1) + self.diffs.y.weighted(lambda2);
        self.value = self.row_start;
    }
}
