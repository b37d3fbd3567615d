//! Line setup and drawing.
//!
//! Lines use the diamond-exit rule to decide whether their start and end pixels are drawn, so
//! strips do not double-count shared interior endpoints: a pixel belongs to the line when the
//! line exits the unit diamond around that pixel's center, and an endpoint resting exactly on a
//! pixel center claims that pixel. The decisions adjust the first and last column of the
//! traversal — equivalent to shifting the endpoint along the line to the diamond boundary —
//! after which the line is walked with integer-stepped Bresenham over 28.4 fixed-point
//! coordinates, the minor axis driven by the classic doubled error term and the attribute
//! interpolator advanced in lockstep.

use glimmer_math::{Fixed28_4, Vec2};

use crate::framebuffer::{FragmentOutput, RasterTarget};
use crate::geom::Vertex;
use crate::states::StateSnapshot;

use super::fragment::{FragmentContext, FragmentInfo};
use super::interp::LineInterpolator;
use super::sweep::SweepRasterizer;

use std::sync::Arc;

#[inline]
fn sign(f: f32) -> i32 {
    if f > 0.0 {
        1
    } else if f < 0.0 {
        -1
    } else {
        0
    }
}

/// Fractional part of a float.
#[inline]
fn fracf(f: f32) -> f32 {
    f - f.floor()
}

/// Line setup info.
struct LineInfo<'a> {
    /// The line's vertices. After `setup`, the line runs in the positive major direction.
    v1: &'a Vertex,
    v2: &'a Vertex,

    /// Deltas, always from `v1` towards `v2`.
    dx: f32,
    dy: f32,

    /// The larger absolute delta; the span of the traversal parameter.
    max_absolute_delta: f32,

    /// Whether the line is parameterized over the x axis (`|dy| <= |dx|`).
    is_x_major: bool,

    /// Whether the start resp. end pixel belongs to the line.
    draw_start: bool,
    draw_end: bool,
}

impl<'a> LineInfo<'a> {
    fn new(v1: &'a Vertex, v2: &'a Vertex) -> LineInfo<'a> {
        let dx = v2.coords.x - v1.coords.x;
        let dy = v2.coords.y - v1.coords.y;
        LineInfo {
            v1,
            v2,
            dx,
            dy,
            max_absolute_delta: dx.abs().max(dy.abs()),
            is_x_major: dy.abs() <= dx.abs(),
            draw_start: false,
            draw_end: false,
        }
    }

    /// Applies the diamond-exit rule and normalizes the traversal direction.
    ///
    /// The endpoint offsets into their pixels are in `[-0.5, 0.5)`; together with the signs of
    /// the deltas they decide whether the line crosses each endpoint pixel's center axis, which
    /// is equivalent to exiting that pixel's diamond.
    fn setup(&mut self) {
        let v1_diff = Vec2::new(
            fracf(self.v1.coords.x) - 0.5,
            fracf(self.v1.coords.y) - 0.5,
        );
        let mut v2_diff = Vec2::new(
            fracf(self.v2.coords.x) - 0.5,
            fracf(self.v2.coords.y) - 0.5,
        );

        if self.is_x_major {
            let dydx = self.dy / self.dx;

            // An end point vertically half-way between two pixels with the line coming from
            // above counts towards the upper pixel.
            if v2_diff.y == -0.5 && self.dy >= 0.0 {
                v2_diff.y = 0.5;
            }

            self.draw_start = if v1_diff.x.abs() + v1_diff.y.abs() < 0.5 {
                // The start lies inside the diamond; the line exits through it.
                true
            } else if sign(-self.dx) == sign(-v1_diff.x) {
                // Outside the diamond, on the side the line leaves through.
                false
            } else if sign(-self.dy) != sign(-v1_diff.y) {
                // Outside, but the line crosses the diamond horizontally.
                true
            } else {
                // Intersection with the vertical center axis decides.
                let yintersect = fracf(self.v1.coords.y) + dydx * v1_diff.x;
                (0.0..1.0).contains(&yintersect)
            };

            self.draw_end = if v2_diff.x == 0.0 && v2_diff.y == 0.0 {
                // Resting exactly on the pixel center claims the pixel.
                true
            } else if v2_diff.x.abs() + v2_diff.y.abs() < 0.5 {
                // The line stops inside the diamond without exiting it.
                false
            } else if sign(-self.dx) == sign(v2_diff.x) {
                false
            } else if sign(self.dy) == sign(v2_diff.y) {
                true
            } else {
                let yintersect = fracf(self.v2.coords.y) + dydx * v2_diff.x;
                (0.0..1.0).contains(&yintersect)
            };

            if self.dx < 0.0 {
                self.reverse();
            }
        } else {
            let dxdy = self.dx / self.dy;

            if v2_diff.x == -0.5 && self.dx >= 0.0 {
                v2_diff.x = 0.5;
            }

            self.draw_start = if v1_diff.x.abs() + v1_diff.y.abs() < 0.5 {
                true
            } else if sign(-self.dy) == sign(-v1_diff.y) {
                false
            } else if sign(-self.dx) != sign(-v1_diff.x) {
                true
            } else {
                let xintersect = fracf(self.v1.coords.x) + dxdy * v1_diff.y;
                (0.0..1.0).contains(&xintersect)
            };

            self.draw_end = if v2_diff.x == 0.0 && v2_diff.y == 0.0 {
                true
            } else if v2_diff.x.abs() + v2_diff.y.abs() < 0.5 {
                false
            } else if sign(self.dy) != sign(v2_diff.y) {
                false
            } else if sign(self.dx) == sign(v2_diff.x) {
                true
            } else {
                let xintersect = fracf(self.v2.coords.x) + dxdy * v2_diff.y;
                (0.0..1.0).contains(&xintersect)
            };

            if self.dy < 0.0 {
                self.reverse();
            }
        }
    }

    /// Flips the traversal direction; the endpoint decisions travel with their vertices.
    fn reverse(&mut self) {
        std::mem::swap(&mut self.v1, &mut self.v2);
        std::mem::swap(&mut self.draw_start, &mut self.draw_end);
        self.dx = -self.dx;
        self.dy = -self.dy;
    }
}

impl SweepRasterizer {
    /// Draws a line. Viewport clipping happens during traversal; the scissor applies per
    /// fragment.
    pub(crate) fn draw_line(
        &self,
        target: &RasterTarget,
        snapshot: &Arc<StateSnapshot>,
        v1: &Vertex,
        v2: &Vertex,
    ) {
        let mut info = LineInfo::new(v1, v2);

        // Zero-length lines emit no fragments.
        if info.max_absolute_delta == 0.0 {
            return;
        }

        info.setup();

        let ctx = FragmentContext::new(snapshot, target, &self.stats);
        let states = &snapshot.states;
        let blending = states
            .blending_enabled
            .then_some((states.blend_src, states.blend_dst));

        // Major/minor decomposition after direction normalization.
        let (major1, minor1, major2, major_limit, minor_limit) = if info.is_x_major {
            (
                info.v1.coords.x,
                info.v1.coords.y,
                info.v2.coords.x,
                target.width(),
                target.height(),
            )
        } else {
            (
                info.v1.coords.y,
                info.v1.coords.x,
                info.v2.coords.y,
                target.height(),
                target.width(),
            )
        };

        // First and last column per the diamond-exit decisions, clipped to the raster.
        let first = (major1.floor() as i32 + i32::from(!info.draw_start)).max(0);
        let last = (major2.floor() as i32 - i32::from(!info.draw_end)).min(major_limit - 1);
        if first > last {
            return;
        }

        // Gradients along the line; the provoking vertex is the unswapped first vertex. The
        // interpolators are seeded at the starting column's center and advance per column.
        let mut attr = LineInterpolator::new(
            info.v1,
            info.v2,
            v1,
            &snapshot.program.iqs,
            1.0 / info.max_absolute_delta,
        );
        attr.setup((major1.floor() + 0.5 - major1) / info.max_absolute_delta);

        /*
         * Initialize Bresenham's decision variable.
         *
         * With the line parameterized over the major axis (parameter p, value v, deltas dp and
         * dv), the doubled implicit line equation 2*F(p, v) = 2*dv*p - 2*dp*v + 2*dp*b vanishes
         * on the line, and the error term D = 2*dv - dp evaluated at the midpoint (p+1, v+1/2)
         * decides whether the next column keeps v or steps it by one. All quantities live on
         * the 28.4 subpixel grid, so the update is pure integer arithmetic.
         */
        let (fix_dp, fix_dv, inc_v) = if info.is_x_major {
            (
                Fixed28_4::from_f32(info.dx),
                Fixed28_4::from_f32(info.dy.abs()),
                sign(info.dy),
            )
        } else {
            (
                Fixed28_4::from_f32(info.dy),
                Fixed28_4::from_f32(info.dx.abs()),
                sign(info.dx),
            )
        };
        let inc_v_fixed = Fixed28_4::from_i32(inc_v);

        let mut p = Fixed28_4::from_f32(major1);
        let mut v = Fixed28_4::from_f32(minor1);
        let mut error = fix_dv * 2 - fix_dp;

        // Step past columns excluded by the diamond-exit rule or lying left of the raster.
        while p.floor() < first {
            if error > Fixed28_4::ZERO {
                v += inc_v_fixed;
                error -= fix_dp * 2;
            }
            error += fix_dv * 2;
            p += Fixed28_4::ONE;
            attr.advance();
        }

        while p.floor() <= last {
            let vi = v.floor();

            if vi >= 0 && vi < minor_limit {
                let (x, y) = if info.is_x_major {
                    (p.floor(), vi)
                } else {
                    (vi, p.floor())
                };

                let mut fragment = FragmentInfo::new(attr.depth.value, true, attr.varyings());
                let mut out = FragmentOutput::default();

                ctx.process_fragment(x, y, attr.one_over_viewport_z.value, &mut fragment, &mut out);
                target.merge_fragment(x, y, blending, &out);
            }

            if error > Fixed28_4::ZERO {
                v += inc_v_fixed;
                error -= fix_dp * 2;
            }
            error += fix_dv * 2;
            p += Fixed28_4::ONE;
            attr.advance();
        }
    }
}
