//! Triangle setup and block traversal.
//!
//! The filled-triangle path converts the viewport-space vertices to 28.4 fixed point, builds the
//! three edge functions in 24.8, applies the top-left fill rule, and sweeps the block-aligned
//! bounding box. Each block's four-corner barycentric triple classifies it as completely
//! covered, partially covered, or outside; covered and partial blocks queue on the tile cache
//! with a snapshot of the attribute interpolators.

use glimmer_math::{Fixed24_8, Fixed28_4, Vec2, Vec2Fixed};

use crate::framebuffer::RasterTarget;
use crate::geom::interp::{LinearInterpolator2d, StepPair};
use crate::geom::{BarycentricBlock, BlockCoverage, EdgeFunctionFixed, Vertex};
use crate::states::StateSnapshot;

use super::interp::TriangleInterpolator;
use super::sweep::SweepRasterizer;
use super::tile::RasterizationMode;
use super::{
    lower_align_on_block_size, upper_align_on_block_size, BLOCK_SIZE, FILL_RULE_EDGE_BIAS,
};
use std::sync::Arc;

impl SweepRasterizer {
    /// Draws the filled triangle `(v1, v2, v3)` in viewport coordinates. The triangle is
    /// rasterized regardless of its orientation; `front_facing` only reaches the fragment
    /// shader.
    pub(crate) fn draw_filled_triangle(
        &mut self,
        target: &RasterTarget,
        snapshot: &Arc<StateSnapshot>,
        front_facing: bool,
        v1: &Vertex,
        v2: &Vertex,
        v3: &Vertex,
    ) {
        let mut v1_xy = v1.coords.xy();
        let mut v2_xy = v2.coords.xy();
        let v3_xy = v3.coords.xy();

        let mut area = (v2_xy - v1_xy).area(&(v3_xy - v1_xy));

        // Degenerate on the subpixel grid.
        if Fixed24_8::from_f32(area) == Fixed24_8::ZERO {
            return;
        }

        // Only consider CW triangles with respect to the y-down raster coordinate system, so a
        // pixel is inside exactly when all (negated) edge values are positive.
        let (v1_cw, v2_cw) = if area > 0.0 {
            (v1, v2)
        } else {
            std::mem::swap(&mut v1_xy, &mut v2_xy);
            area = -area;
            (v2, v1)
        };

        // Edge functions on the 4-bit subpixel grid; evaluations carry 8 fractional bits. Order
        // does not matter, orientation does.
        let v1_fix = Vec2Fixed::from_vec2(v1_xy);
        let v2_fix = Vec2Fixed::from_vec2(v2_xy);
        let v3_fix = Vec2Fixed::from_vec2(v3_xy);
        let mut edges = [
            EdgeFunctionFixed::new(v1_fix, v2_fix),
            EdgeFunctionFixed::new(v2_fix, v3_fix),
            EdgeFunctionFixed::new(v3_fix, v1_fix),
        ];

        // Top-left fill rule: shift the zero contour of top edges (exactly horizontal, pointing
        // right under CW winding) and left edges (strictly upward, i.e. negative y difference)
        // by one subpixel unit, so an edge shared by two triangles is claimed by exactly one.
        for edge in &mut edges {
            let top = edge.v_diff.y == Fixed28_4::ZERO && edge.v_diff.x > Fixed28_4::ZERO;
            let left = edge.v_diff.y < Fixed28_4::ZERO;
            if top || left {
                edge.c += Fixed24_8::from_bits(FILL_RULE_EDGE_BIAS);
            }
        }

        // Bounding box, intersected with the scissor box (when enabled) or the raster, then
        // rounded outward onto block boundaries. The raster dimensions are block-aligned, so
        // every visited block is fully in bounds; scissoring within a block happens per pixel.
        let states = &snapshot.states;
        let (clip_x, clip_y) = if states.scissor_test_enabled {
            let b = &states.scissor_box;
            (
                (b.x_min.max(0), b.x_max.min(target.width())),
                ((target.height() - b.y_max).max(0), (target.height() - b.y_min).min(target.height())),
            )
        } else {
            ((0, target.width()), (0, target.height()))
        };

        let min_x = v1_xy.x.min(v2_xy.x).min(v3_xy.x).floor() as i32;
        let max_x = v1_xy.x.max(v2_xy.x).max(v3_xy.x).floor() as i32;
        let min_y = v1_xy.y.min(v2_xy.y).min(v3_xy.y).floor() as i32;
        let max_y = v1_xy.y.max(v2_xy.y).max(v3_xy.y).floor() as i32;

        let start_x = lower_align_on_block_size(min_x.max(clip_x.0));
        let end_x = upper_align_on_block_size((max_x + 1).min(clip_x.1));
        let start_y = lower_align_on_block_size(min_y.max(clip_y.0));
        let end_y = upper_align_on_block_size((max_y + 1).min(clip_y.1));

        if start_x >= end_x || start_y >= end_y {
            return;
        }

        // Lambdas for point-in-triangle detection: the negated edge functions, evaluated at the
        // first pixel center, stepped incrementally from there.
        let start_center = Vec2Fixed {
            x: Fixed28_4::from_i32(start_x) + Fixed28_4::from_f32(0.5),
            y: Fixed28_4::from_i32(start_y) + Fixed28_4::from_f32(0.5),
        };
        let mut lambda_row_next: [LinearInterpolator2d<Fixed24_8>; 3] = std::array::from_fn(|i| {
            LinearInterpolator2d::new(
                -edges[i].evaluate(start_center),
                StepPair::new(-edges[i].change_x(), -edges[i].change_y()),
                StepPair::default(),
            )
        });

        // Attribute interpolators over the CW basis; the provoking vertex for flat varyings is
        // the primitive's first vertex, regardless of the reordering.
        let mut attributes = TriangleInterpolator::new(
            v1_cw,
            v2_cw,
            v3,
            v1,
            &snapshot.program.iqs,
            1.0 / area,
        );
        attributes.setup_from_screen_coords(Vec2::new(
            start_x as f32 + 0.5,
            start_y as f32 + 0.5,
        ));

        let mut y = start_y;
        while y < end_y {
            let lambda_row = lambda_row_next;
            for lambda in &mut lambda_row_next {
                lambda.step_y(BLOCK_SIZE);
            }

            // Corner evaluator for trivial accept/reject across this row of blocks.
            let mut corners = BarycentricBlock::new(
                [lambda_row[0].value, lambda_row[1].value, lambda_row[2].value],
                [lambda_row[0].step, lambda_row[1].step, lambda_row[2].step],
            );
            corners.setup(BLOCK_SIZE, BLOCK_SIZE);

            // Top-left lambdas of the current block, advanced across the row.
            let mut lambda_block = lambda_row;

            let mut attributes_row = attributes.clone();

            let mut x = start_x;
            while x < end_x {
                match corners.coverage() {
                    BlockCoverage::Outside => {}
                    coverage => {
                        let mode = if coverage == BlockCoverage::Full {
                            RasterizationMode::Block
                        } else {
                            RasterizationMode::Checked
                        };

                        self.queue_block(
                            target,
                            snapshot,
                            attributes_row.clone(),
                            lambda_block,
                            x,
                            y,
                            front_facing,
                            mode,
                        );
                    }
                }

                corners.step_x(BLOCK_SIZE);
                for lambda in &mut lambda_block {
                    lambda.advance_x_by(BLOCK_SIZE);
                }
                attributes_row.advance_x_by(BLOCK_SIZE);
                x += BLOCK_SIZE;
            }

            attributes.advance_y_by(BLOCK_SIZE);
            y += BLOCK_SIZE;
        }
    }

    /// Queues one block on the tile cache, flushing the queue first if it is full.
    #[allow(clippy::too_many_arguments)]
    fn queue_block(
        &mut self,
        target: &RasterTarget,
        snapshot: &Arc<StateSnapshot>,
        attributes: TriangleInterpolator,
        lambdas: [LinearInterpolator2d<Fixed24_8>; 3],
        x: i32,
        y: i32,
        front_facing: bool,
        mode: RasterizationMode,
    ) {
        if !self
            .cache
            .add_triangle(snapshot, attributes.clone(), lambdas, x, y, front_facing, mode)
        {
            self.flush_tiles(target);
            let queued = self
                .cache
                .add_triangle(snapshot, attributes, lambdas, x, y, front_facing, mode);
            debug_assert!(queued);
        }
    }
}
