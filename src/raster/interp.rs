//! Interpolators for quantities on lines and triangles: depth, reciprocal viewport z and the
//! user-declared varyings, advanced incrementally across blocks and pixels.
//!
//! Smooth varyings are stored premultiplied by the vertex's clip `w` (which, after the
//! perspective divide, lives in `coords.w` as `1 / w_clip`); the fragment stage divides by the
//! interpolated reciprocal to recover perspective-correct values. `no_perspective` varyings are
//! interpolated linearly in window space and passed through at the fragment. Flat varyings carry
//! the provoking vertex's value verbatim.

use arrayvec::ArrayVec;
use glimmer_math::{Vec2, Vec4};

use crate::geom::interp::{LinearInterpolator1d, LinearInterpolator2d, StepPair};
use crate::geom::limits::MAX_VARYINGS;
use crate::geom::{EdgeFunction, Vertex};
use crate::shader::{InterpolationQualifier, Varying};

/// Interpolator for one varying with up to two interpolation directions.
#[derive(Debug, Clone, Copy, Default)]
pub struct VaryingInterpolator {
    /// Current (possibly weighted) value.
    pub value: Vec4,

    /// Interpolation qualifier.
    pub iq: InterpolationQualifier,

    /// The input reference value (possibly weighted).
    input_value: Vec4,

    /// Linear or weighted step with respect to window coordinates.
    step: StepPair<Vec4>,

    /// Differences along two linearly independent vectors.
    diffs: StepPair<Vec4>,

    /// Value at the start of the current row.
    row_start: Vec4,
}

impl VaryingInterpolator {
    fn new(
        value: Vec4,
        iq: InterpolationQualifier,
        step: StepPair<Vec4>,
        diffs: StepPair<Vec4>,
    ) -> VaryingInterpolator {
        VaryingInterpolator {
            value,
            iq,
            input_value: value,
            step,
            diffs,
            row_start: value,
        }
    }

    /// Initializes the value at barycentric offsets `(lambda1, lambda2)` from the reference.
    fn set_value_from_reference(&mut self, lambda1: f32, lambda2: f32) {
        self.value = self.input_value + self.diffs.x * lambda1 + self.diffs.y * lambda2;
        self.row_start = self.value;
    }

    #[inline]
    fn setup_block_processing(&mut self) {
        self.row_start = self.value;
    }

    #[inline]
    fn advance_x(&mut self) {
        self.value += self.step.x;
    }

    #[inline]
    fn advance_x_by(&mut self, n: i32) {
        self.value += self.step.x * n as f32;
    }

    #[inline]
    fn advance_y(&mut self) {
        self.row_start += self.step.y;
        self.value = self.row_start;
    }

    #[inline]
    fn advance_y_by(&mut self, n: i32) {
        self.row_start += self.step.y * n as f32;
        self.value = self.row_start;
    }

    /// Extracts the varying as seen by the fragment shader. The window-space steps double as the
    /// derivative approximations.
    #[inline]
    fn to_varying(&self) -> Varying {
        Varying::new(self.value, self.step.x, self.step.y, self.iq)
    }
}

/// Interpolates vertex data along a line.
#[derive(Debug, Clone)]
pub struct LineInterpolator {
    reference_depth: f32,
    reference_one_over_viewport_z: f32,

    /// Interpolated depth value for the depth buffer.
    pub depth: LinearInterpolator1d<f32>,

    /// Interpolated reciprocal viewport z.
    pub one_over_viewport_z: LinearInterpolator1d<f32>,

    /// Varying interpolators.
    pub varyings: ArrayVec<VaryingInterpolator, MAX_VARYINGS>,
}

impl LineInterpolator {
    /// Sets up interpolation from `v1` to `v2` with `v_ref` as the provoking vertex.
    /// `one_over_span_length` is the reciprocal of the span along the major axis.
    pub fn new(
        v1: &Vertex,
        v2: &Vertex,
        v_ref: &Vertex,
        iqs: &[InterpolationQualifier],
        one_over_span_length: f32,
    ) -> LineInterpolator {
        let depth_diff = v2.coords.z - v1.coords.z;
        let depth = LinearInterpolator1d::new(v1.coords.z, depth_diff * one_over_span_length, depth_diff);

        let z_diff = v2.coords.w - v1.coords.w;
        let one_over_viewport_z =
            LinearInterpolator1d::new(v1.coords.w, z_diff * one_over_span_length, z_diff);

        debug_assert_eq!(v1.varyings.len(), v2.varyings.len());
        debug_assert_eq!(v1.varyings.len(), iqs.len());

        let mut varyings = ArrayVec::new();
        for (i, &iq) in iqs.iter().enumerate() {
            let interpolator = match iq {
                InterpolationQualifier::Smooth | InterpolationQualifier::NoPerspective => {
                    let (a, b) = if iq == InterpolationQualifier::Smooth {
                        (v1.varyings[i] * v1.coords.w, v2.varyings[i] * v2.coords.w)
                    } else {
                        (v1.varyings[i], v2.varyings[i])
                    };

                    let dir = b - a;
                    VaryingInterpolator::new(
                        a,
                        iq,
                        StepPair::new(dir * one_over_span_length, Vec4::ZERO),
                        StepPair::new(dir, Vec4::ZERO),
                    )
                }
                InterpolationQualifier::Flat => VaryingInterpolator::new(
                    v_ref.varyings[i],
                    iq,
                    StepPair::default(),
                    StepPair::default(),
                ),
            };
            varyings.push(interpolator);
        }

        LineInterpolator {
            reference_depth: v1.coords.z,
            reference_one_over_viewport_z: v1.coords.w,
            depth,
            one_over_viewport_z,
            varyings,
        }
    }

    /// Re-initializes all quantities at the span fraction `lambda`, used when the diamond-exit
    /// rule shifts the line's start point.
    pub fn setup(&mut self, lambda: f32) {
        self.depth.set_value_from_reference(self.reference_depth, lambda);
        self.one_over_viewport_z
            .set_value_from_reference(self.reference_one_over_viewport_z, lambda);
        for v in &mut self.varyings {
            v.set_value_from_reference(lambda, 0.0);
        }
    }

    /// Steps all quantities along the line parameter.
    pub fn advance(&mut self) {
        self.depth.advance();
        self.one_over_viewport_z.advance();
        for v in &mut self.varyings {
            v.advance_x();
        }
    }

    /// Extracts the current varying values.
    pub fn varyings(&self) -> ArrayVec<Varying, MAX_VARYINGS> {
        self.varyings.iter().map(VaryingInterpolator::to_varying).collect()
    }
}

/// Interpolates vertex data on a triangle using unnormalized barycentric coordinates with
/// respect to the two edges chosen at construction.
#[derive(Debug, Clone)]
pub struct TriangleInterpolator {
    reference_depth: f32,
    reference_one_over_viewport_z: f32,

    /// Inverse parallelogram area, needed for normalization.
    inv_area: f32,

    /// The two triangle edge functions used as a (generally non-orthogonal) basis.
    edge_v0v1: EdgeFunction,
    edge_v0v2: EdgeFunction,

    /// Interpolated depth value for the depth buffer.
    pub depth: LinearInterpolator2d<f32>,

    /// Interpolated reciprocal viewport z.
    pub one_over_viewport_z: LinearInterpolator2d<f32>,

    /// Varying interpolators.
    pub varyings: ArrayVec<VaryingInterpolator, MAX_VARYINGS>,
}

impl TriangleInterpolator {
    /// Sets up interpolation over the triangle `(v0, v1, v2)` (clockwise in viewport
    /// coordinates) with `v_ref` as the provoking vertex for flat varyings.
    pub fn new(
        v0: &Vertex,
        v1: &Vertex,
        v2: &Vertex,
        v_ref: &Vertex,
        iqs: &[InterpolationQualifier],
        one_over_area: f32,
    ) -> TriangleInterpolator {
        let edge_v0v1 = EdgeFunction::new(v0.coords.xy(), v1.coords.xy());
        let edge_v0v2 = EdgeFunction::new(v0.coords.xy(), v2.coords.xy());

        let nd_v0v1 = edge_v0v1.v_diff * one_over_area;
        let nd_v0v2 = edge_v0v2.v_diff * one_over_area;

        // Window-space steps of a quantity with differences (d1, d2) along the basis edges.
        let steps = |d1: f32, d2: f32| -> StepPair<f32> {
            StepPair::new(
                d1 * nd_v0v2.y - d2 * nd_v0v1.y,
                -d1 * nd_v0v2.x + d2 * nd_v0v1.x,
            )
        };
        let steps_v4 = |d1: Vec4, d2: Vec4| -> StepPair<Vec4> {
            StepPair::new(
                d1 * nd_v0v2.y - d2 * nd_v0v1.y,
                d1 * -nd_v0v2.x + d2 * nd_v0v1.x,
            )
        };

        let depth_d1 = v1.coords.z - v0.coords.z;
        let depth_d2 = v2.coords.z - v0.coords.z;
        let depth = LinearInterpolator2d::new(
            v0.coords.z,
            steps(depth_d1, depth_d2),
            StepPair::new(depth_d1, depth_d2),
        );

        let z_d1 = v1.coords.w - v0.coords.w;
        let z_d2 = v2.coords.w - v0.coords.w;
        let one_over_viewport_z = LinearInterpolator2d::new(
            v0.coords.w,
            steps(z_d1, z_d2),
            StepPair::new(z_d1, z_d2),
        );

        debug_assert_eq!(v0.varyings.len(), v1.varyings.len());
        debug_assert_eq!(v1.varyings.len(), v2.varyings.len());
        debug_assert_eq!(iqs.len(), v0.varyings.len());

        let mut varyings = ArrayVec::new();
        for (i, &iq) in iqs.iter().enumerate() {
            let interpolator = match iq {
                InterpolationQualifier::Smooth | InterpolationQualifier::NoPerspective => {
                    let (a, b, c) = if iq == InterpolationQualifier::Smooth {
                        (
                            v0.varyings[i] * v0.coords.w,
                            v1.varyings[i] * v1.coords.w,
                            v2.varyings[i] * v2.coords.w,
                        )
                    } else {
                        (v0.varyings[i], v1.varyings[i], v2.varyings[i])
                    };

                    let d1 = b - a;
                    let d2 = c - a;
                    VaryingInterpolator::new(a, iq, steps_v4(d1, d2), StepPair::new(d1, d2))
                }
                InterpolationQualifier::Flat => VaryingInterpolator::new(
                    v_ref.varyings[i],
                    iq,
                    StepPair::default(),
                    StepPair::default(),
                ),
            };
            varyings.push(interpolator);
        }

        TriangleInterpolator {
            reference_depth: v0.coords.z,
            reference_one_over_viewport_z: v0.coords.w,
            inv_area: one_over_area,
            edge_v0v1,
            edge_v0v2,
            depth,
            one_over_viewport_z,
            varyings,
        }
    }

    /// Initializes all quantities at the given screen position (a pixel center).
    pub fn setup_from_screen_coords(&mut self, p: Vec2) {
        let lambda1 = self.edge_v0v2.evaluate(p) * self.inv_area;
        let lambda2 = -self.edge_v0v1.evaluate(p) * self.inv_area;

        self.depth
            .set_value_from_reference(self.reference_depth, lambda1, lambda2);
        self.one_over_viewport_z.set_value_from_reference(
            self.reference_one_over_viewport_z,
            lambda1,
            lambda2,
        );
        for v in &mut self.varyings {
            v.set_value_from_reference(lambda1, lambda2);
        }
    }

    /// Steps once in x direction.
    pub fn advance_x(&mut self) {
        self.depth.advance_x();
        self.one_over_viewport_z.advance_x();
        for v in &mut self.varyings {
            v.advance_x();
        }
    }

    /// Steps `n` times in x direction.
    pub fn advance_x_by(&mut self, n: i32) {
        self.depth.advance_x_by(n);
        self.one_over_viewport_z.advance_x_by(n);
        for v in &mut self.varyings {
            v.advance_x_by(n);
        }
    }

    /// Advances one row and resets the x direction.
    pub fn advance_y(&mut self) {
        self.depth.advance_y();
        self.one_over_viewport_z.advance_y();
        for v in &mut self.varyings {
            v.advance_y();
        }
    }

    /// Advances `n` rows and resets the x direction.
    pub fn advance_y_by(&mut self, n: i32) {
        self.depth.advance_y_by(n);
        self.one_over_viewport_z.advance_y_by(n);
        for v in &mut self.varyings {
            v.advance_y_by(n);
        }
    }

    /// Stores the current values as the row start for block traversal.
    pub fn setup_block_processing(&mut self) {
        self.depth.setup_block_processing();
        self.one_over_viewport_z.setup_block_processing();
        for v in &mut self.varyings {
            v.setup_block_processing();
        }
    }

    /// Extracts the current varying values.
    pub fn varyings(&self) -> ArrayVec<Varying, MAX_VARYINGS> {
        self.varyings.iter().map(VaryingInterpolator::to_varying).collect()
    }

    /// Extracts the varying values of a 2×2 quad anchored at the current position.
    ///
    /// Lane order: `(x, y)`, `(x+1, y)`, `(x, y+1)`, `(x+1, y+1)`.
    pub fn varyings_quad(&self) -> [ArrayVec<Varying, MAX_VARYINGS>; 4] {
        let mut out: [ArrayVec<Varying, MAX_VARYINGS>; 4] = Default::default();

        for v in &self.varyings {
            let mut it = *v;
            it.setup_block_processing();

            out[0].push(it.to_varying());
            it.advance_x();
            out[1].push(it.to_varying());
            it.advance_y();
            out[2].push(it.to_varying());
            it.advance_x();
            out[3].push(it.to_varying());
        }

        out
    }

    /// Extracts the depth values of a 2×2 quad anchored at the current position.
    pub fn depth_quad(&self) -> [f32; 4] {
        let mut it = self.depth;
        it.setup_block_processing();

        let mut out = [0.0; 4];
        out[0] = it.value;
        it.advance_x();
        out[1] = it.value;
        it.advance_y();
        out[2] = it.value;
        it.advance_x();
        out[3] = it.value;
        out
    }

    /// Extracts the reciprocal viewport z values of a 2×2 quad anchored at the current position.
    pub fn one_over_viewport_z_quad(&self) -> [f32; 4] {
        let mut it = self.one_over_viewport_z;
        it.setup_block_processing();

        let mut out = [0.0; 4];
        out[0] = it.value;
        it.advance_x();
        out[1] = it.value;
        it.advance_y();
        out[2] = it.value;
        it.advance_x();
        out[3] = it.value;
        out
    }
}
