//! Fragment processing.
//!
//! For each candidate pixel (alone or as a 2×2 quad), in order:
//!
//! 1. scissor test;
//! 2. perspective divide of the smooth varyings;
//! 3. fragment shader invocation;
//! 4. depth test with write mask (after the shader, which may modify the depth output);
//! 5. the caller merges the output: pixel-format conversion, blending, store.

use arrayvec::ArrayVec;
use glimmer_math::{DepthValue, Vec2, Vec4};

use crate::framebuffer::{FragmentOutput, FragmentOutputQuad, RasterTarget};
use crate::geom::limits::{MAX_TEXTURE_UNITS, MAX_VARYINGS};
use crate::shader::{
    FragmentResult, FragmentShaderArgs, InterpolationQualifier, Varying,
};
use crate::states::{ComparisonFunc, StateSnapshot};
use crate::stats::FragmentStats;
use crate::texture::Texture2d;

/// Information on a fragment handed to the fragment shader.
#[derive(Debug, Clone)]
pub struct FragmentInfo {
    /// Fragment z coordinate in `[0, 1]`, compared against and possibly written to the depth
    /// buffer.
    pub depth: f32,

    /// Whether this fragment comes from a front-facing primitive.
    pub front_facing: bool,

    /// Varyings at the fragment position.
    pub varyings: ArrayVec<Varying, MAX_VARYINGS>,
}

impl FragmentInfo {
    pub fn new(
        depth: f32,
        front_facing: bool,
        varyings: ArrayVec<Varying, MAX_VARYINGS>,
    ) -> FragmentInfo {
        FragmentInfo {
            depth,
            front_facing,
            varyings,
        }
    }
}

/// Everything the fragment stage needs per primitive: the state snapshot, resolved texture
/// references, the raster target and the statistics sink.
pub struct FragmentContext<'a> {
    pub snapshot: &'a StateSnapshot,
    pub target: &'a RasterTarget,
    pub stats: &'a FragmentStats,
    textures: ArrayVec<Option<&'a Texture2d>, MAX_TEXTURE_UNITS>,
}

impl<'a> FragmentContext<'a> {
    pub fn new(
        snapshot: &'a StateSnapshot,
        target: &'a RasterTarget,
        stats: &'a FragmentStats,
    ) -> FragmentContext<'a> {
        FragmentContext {
            snapshot,
            target,
            stats,
            textures: snapshot.texture_refs(),
        }
    }

    /// Scissor test in raster coordinates. The scissor box lives in viewport coordinates with y
    /// up, so the y range is flipped against the raster height.
    #[inline]
    fn scissor_accepts(&self, x: i32, y: i32) -> bool {
        let states = &self.snapshot.states;
        if !states.scissor_test_enabled {
            return true;
        }

        let height = self.target.height();
        let b = &states.scissor_box;
        x >= b.x_min && x < b.x_max && y >= height - b.y_max && y < height - b.y_min
    }

    /// Runs the shader and the depth test for one fragment at `(x, y)`.
    ///
    /// On return, `out.write_color` says whether the caller should merge the color.
    pub fn process_fragment(
        &self,
        x: i32,
        y: i32,
        one_over_viewport_z: f32,
        info: &mut FragmentInfo,
        out: &mut FragmentOutput,
    ) {
        FragmentStats::add(&self.stats.count, 1);
        out.write_color = false;

        let states = &self.snapshot.states;

        if !self.scissor_accepts(x, y) {
            FragmentStats::add(&self.stats.discard_scissor, 1);
            return;
        }

        // Perspective divide of the varyings: smooth values were premultiplied by 1/w and are
        // recovered by the interpolated viewport z.
        let z = 1.0 / one_over_viewport_z;
        for v in &mut info.varyings {
            if v.iq == InterpolationQualifier::Smooth {
                v.value *= z;
                v.d_fdx *= z;
                v.d_fdy *= z;
            }
        }

        // The default fragment color is unspecified by the reference API; (0, 0, 0, 1) here.
        out.color = Vec4::new(0.0, 0.0, 0.0, 1.0);
        let mut depth_value = info.depth;

        let height = self.target.height() as f32;
        let frag_coord = Vec4::new(
            x as f32 - 0.5,
            height - (y as f32 - 0.5),
            z,
            0.0,
        );

        let mut args = FragmentShaderArgs {
            frag_coord,
            front_facing: info.front_facing,
            point_coord: Vec2::ZERO,
            varyings: &info.varyings,
            uniforms: &states.uniforms,
            textures: &self.textures,
            raster_pos: (x, y),
            depth: &mut depth_value,
            color: &mut out.color,
        };

        if self.snapshot.program.program.fragment_shader(&mut args) == FragmentResult::Discard {
            FragmentStats::add(&self.stats.discard_shader, 1);
            return;
        }

        if states.depth_test_enabled {
            if states.depth_func == ComparisonFunc::Fail {
                FragmentStats::add(&self.stats.discard_depth, 1);
                return;
            }

            let old = self.target.depth_at(x, y);
            let new = DepthValue::from_f32(depth_value);

            if states.depth_func.compare(new, old) {
                if states.write_depth {
                    self.target.set_depth(x, y, new);
                }
            } else {
                FragmentStats::add(&self.stats.discard_depth, 1);
                return;
            }
        }

        out.write_color = true;
    }

    /// The same stages for a 2×2 quad anchored at `(x, y)`, with per-lane masks so discarded,
    /// scissored and depth-failed lanes leave their destination untouched.
    ///
    /// Lane order: `(x, y)`, `(x+1, y)`, `(x, y+1)`, `(x+1, y+1)`.
    pub fn process_fragment_quad(
        &self,
        x: i32,
        y: i32,
        one_over_viewport_z: [f32; 4],
        info: &mut [FragmentInfo; 4],
        out: &mut FragmentOutputQuad,
    ) {
        FragmentStats::add(&self.stats.count, 4);

        let states = &self.snapshot.states;
        let positions = [(x, y), (x + 1, y), (x, y + 1), (x + 1, y + 1)];

        let mut write = [true; 4];

        if states.scissor_test_enabled {
            let mut scissored = 0;
            for (lane, &(px, py)) in positions.iter().enumerate() {
                if !self.scissor_accepts(px, py) {
                    write[lane] = false;
                    scissored += 1;
                }
            }
            FragmentStats::add(&self.stats.discard_scissor, scissored);
            if scissored == 4 {
                out.write_color = [false; 4];
                return;
            }
        }

        let height = self.target.height() as f32;
        let mut depth_values = [0.0f32; 4];

        for lane in 0..4 {
            if !write[lane] {
                continue;
            }

            let (px, py) = positions[lane];
            let z = 1.0 / one_over_viewport_z[lane];

            for v in &mut info[lane].varyings {
                if v.iq == InterpolationQualifier::Smooth {
                    v.value *= z;
                    v.d_fdx *= z;
                    v.d_fdy *= z;
                }
            }

            out.color[lane] = Vec4::new(0.0, 0.0, 0.0, 1.0);
            depth_values[lane] = info[lane].depth;

            let mut args = FragmentShaderArgs {
                frag_coord: Vec4::new(px as f32 - 0.5, height - (py as f32 - 0.5), z, 0.0),
                front_facing: info[lane].front_facing,
                point_coord: Vec2::ZERO,
                varyings: &info[lane].varyings,
                uniforms: &states.uniforms,
                textures: &self.textures,
                raster_pos: (px, py),
                depth: &mut depth_values[lane],
                color: &mut out.color[lane],
            };

            if self.snapshot.program.program.fragment_shader(&mut args) == FragmentResult::Discard
            {
                FragmentStats::add(&self.stats.discard_shader, 1);
                write[lane] = false;
            }
        }

        if states.depth_test_enabled {
            if states.depth_func == ComparisonFunc::Fail {
                FragmentStats::add(
                    &self.stats.discard_depth,
                    write.iter().filter(|&&w| w).count() as u64,
                );
                out.write_color = [false; 4];
                return;
            }

            for lane in 0..4 {
                if !write[lane] {
                    continue;
                }

                let (px, py) = positions[lane];
                let old = self.target.depth_at(px, py);
                let new = DepthValue::from_f32(depth_values[lane]);

                if states.depth_func.compare(new, old) {
                    if states.write_depth {
                        self.target.set_depth(px, py, new);
                    }
                } else {
                    FragmentStats::add(&self.stats.discard_depth, 1);
                    write[lane] = false;
                }
            }
        }

        out.write_color = write;
    }
}
