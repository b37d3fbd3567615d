//! Point rasterization.
//!
//! A point maps to the single pixel whose diamond contains it, with the triangle fill-rule bias
//! applied — conceptually the point is two covered triangles in a Z pattern, so a point exactly
//! on a pixel boundary resolves the same way a shared triangle edge would. The full fragment
//! path runs with `front_facing = true` and zero derivatives.

use arrayvec::ArrayVec;
use glimmer_math::{Fixed28_4, Vec2Fixed, Vec4};

use crate::framebuffer::{FragmentOutput, RasterTarget};
use crate::geom::Vertex;
use crate::shader::Varying;
use crate::states::StateSnapshot;

use super::fragment::{FragmentContext, FragmentInfo};
use super::sweep::SweepRasterizer;
use super::FILL_RULE_EDGE_BIAS;

use std::sync::Arc;

impl SweepRasterizer {
    /// Draws a single point at the vertex's viewport position.
    pub(crate) fn draw_point(
        &self,
        target: &RasterTarget,
        snapshot: &Arc<StateSnapshot>,
        v: &Vertex,
    ) {
        let coords = Vec2Fixed::from_vec2(v.coords.xy());

        // Nearest diamond with the top-left bias, in subpixel units.
        let bias = Fixed28_4::from_bits(FILL_RULE_EDGE_BIAS);
        let x = (coords.x - bias).floor();
        let y = (coords.y - bias).floor();

        if x < 0 || x >= target.width() || y < 0 || y >= target.height() {
            return;
        }

        let ctx = FragmentContext::new(snapshot, target, &self.stats);
        let states = &snapshot.states;
        let blending = states
            .blending_enabled
            .then_some((states.blend_src, states.blend_dst));

        // Point varyings have no extent: zero derivatives. Smooth values are premultiplied by
        // the reciprocal clip-w, matching the contract of the fragment stage, which divides
        // them back out.
        let iqs = &snapshot.program.iqs;
        let varyings: ArrayVec<Varying, { crate::geom::limits::MAX_VARYINGS }> = v
            .varyings
            .iter()
            .zip(iqs.iter())
            .map(|(&value, &iq)| {
                let value = match iq {
                    crate::shader::InterpolationQualifier::Smooth => value * v.coords.w,
                    _ => value,
                };
                Varying::new(value, Vec4::ZERO, Vec4::ZERO, iq)
            })
            .collect();

        let mut fragment = FragmentInfo::new(v.coords.z, true, varyings);
        let mut out = FragmentOutput::default();

        ctx.process_fragment(x, y, v.coords.w, &mut fragment, &mut out);
        target.merge_fragment(x, y, blending, &out);
    }
}
