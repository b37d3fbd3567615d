//! The sweep rasterizer: primitive draw list, tile dispatch and the worker barrier.
//!
//! Geometry hands assembled primitives to [`SweepRasterizer::add_point`] /
//! [`add_line`][SweepRasterizer::add_line] / [`add_triangle`][SweepRasterizer::add_triangle];
//! [`draw_primitives`][SweepRasterizer::draw_primitives] rasterizes the accumulated list into a
//! raster target. Triangles are cut into 8×8 blocks that queue on the tile cache and are flushed
//! through the worker pool; points and lines always execute on the owner thread.
//!
//! The tile queue is drained (a full barrier) whenever the cache fills, a non-triangle primitive
//! is encountered, blending is enabled, the depth test is disabled, or the depth comparison
//! function changes — this keeps blend and depth ordering deterministic.

use std::sync::Arc;

use glimmer_math::Fixed24_8;

use crate::framebuffer::{FragmentOutput, FragmentOutputQuad, RasterTarget};
use crate::geom::interp::LinearInterpolator2d;
use crate::geom::Vertex;
use crate::states::{BlendFactor, ComparisonFunc, StateSnapshot};
use crate::stats::FragmentStats;
use crate::task::DeferredPool;

use super::fragment::{FragmentContext, FragmentInfo};
use super::interp::TriangleInterpolator;
use super::tile::{RasterizationMode, TileCache, TileInfo};
use super::BLOCK_SIZE;

/// A geometric primitive understood by the sweep rasterizer.
pub enum Primitive {
    /// A point, one vertex.
    Point {
        snapshot: Arc<StateSnapshot>,
        vertex: Vertex,
    },
    /// A line, two vertices.
    Line {
        snapshot: Arc<StateSnapshot>,
        v1: Vertex,
        v2: Vertex,
    },
    /// A triangle, three vertices plus its facing.
    Triangle {
        snapshot: Arc<StateSnapshot>,
        front_facing: bool,
        vertices: Box<[Vertex; 3]>,
    },
}

impl Primitive {
    fn snapshot(&self) -> &Arc<StateSnapshot> {
        match self {
            Primitive::Point { snapshot, .. } => snapshot,
            Primitive::Line { snapshot, .. } => snapshot,
            Primitive::Triangle { snapshot, .. } => snapshot,
        }
    }
}

/// Sweep rasterizer over a block-aligned raster target.
pub struct SweepRasterizer {
    width: i32,
    height: i32,

    /// Primitives accumulated for the current present cycle.
    draw_list: Vec<Primitive>,

    /// Per-tile work queue.
    pub(crate) cache: TileCache,

    /// Worker pool for tile processing.
    pool: DeferredPool,

    /// Fragment counters, shared with the workers.
    pub stats: Arc<FragmentStats>,
}

impl SweepRasterizer {
    /// Creates a rasterizer for a `width` × `height` (block-aligned) target with
    /// `thread_count` workers. `0` runs everything on the owner thread.
    pub fn new(thread_count: usize, width: i32, height: i32) -> SweepRasterizer {
        SweepRasterizer {
            width,
            height,
            draw_list: Vec::new(),
            cache: TileCache::new(width, height),
            pool: DeferredPool::new(thread_count),
            stats: Arc::new(FragmentStats::new()),
        }
    }

    /// Raster width.
    pub fn width(&self) -> i32 {
        self.width
    }

    /// Raster height.
    pub fn height(&self) -> i32 {
        self.height
    }

    /// Number of worker threads.
    pub fn thread_count(&self) -> usize {
        self.pool.thread_count()
    }

    /// Queues a point primitive.
    pub fn add_point(&mut self, snapshot: &Arc<StateSnapshot>, vertex: Vertex) {
        self.draw_list.push(Primitive::Point {
            snapshot: Arc::clone(snapshot),
            vertex,
        });
    }

    /// Queues a line primitive.
    pub fn add_line(&mut self, snapshot: &Arc<StateSnapshot>, v1: Vertex, v2: Vertex) {
        self.draw_list.push(Primitive::Line {
            snapshot: Arc::clone(snapshot),
            v1,
            v2,
        });
    }

    /// Queues a triangle primitive.
    pub fn add_triangle(
        &mut self,
        snapshot: &Arc<StateSnapshot>,
        front_facing: bool,
        v1: Vertex,
        v2: Vertex,
        v3: Vertex,
    ) {
        self.draw_list.push(Primitive::Triangle {
            snapshot: Arc::clone(snapshot),
            front_facing,
            vertices: Box::new([v1, v2, v3]),
        });
    }

    /// Rasterizes the accumulated primitive list into `target` and empties it. Returns with all
    /// tile work completed.
    pub fn draw_primitives(&mut self, target: &RasterTarget) {
        self.stats.reset();

        let list = std::mem::take(&mut self.draw_list);
        let mut last_depth_func = list
            .first()
            .map(|p| p.snapshot().states.depth_func)
            .unwrap_or(ComparisonFunc::Less);

        for primitive in &list {
            let states = &primitive.snapshot().states;

            // Ordering barriers; see the module docs.
            if !matches!(primitive, Primitive::Triangle { .. }) {
                self.flush_tiles(target);
            } else if !states.depth_test_enabled || states.blending_enabled {
                self.flush_tiles(target);
            } else if states.depth_func != last_depth_func {
                self.flush_tiles(target);
                last_depth_func = states.depth_func;
            }

            match primitive {
                Primitive::Point { snapshot, vertex } => {
                    self.draw_point(target, snapshot, vertex);
                }
                Primitive::Line { snapshot, v1, v2 } => {
                    self.draw_line(target, snapshot, v1, v2);
                }
                Primitive::Triangle {
                    snapshot,
                    front_facing,
                    vertices,
                } => {
                    self.draw_filled_triangle(
                        target,
                        snapshot,
                        *front_facing,
                        &vertices[0],
                        &vertices[1],
                        &vertices[2],
                    );
                }
            }
        }

        self.flush_tiles(target);
    }

    /// Dispatches all queued tiles to the pool and waits for completion.
    pub(crate) fn flush_tiles(&mut self, target: &RasterTarget) {
        if self.cache.dirty_count() == 0 {
            return;
        }

        for (x, y, primitives) in self.cache.drain() {
            let target = *target;
            let stats = Arc::clone(&self.stats);
            self.pool
                .push_task(Box::new(move || process_tile(&target, &stats, x, y, primitives)));
        }

        self.pool.run_tasks_and_wait();
    }
}

fn blend_factors(snapshot: &StateSnapshot) -> Option<(BlendFactor, BlendFactor)> {
    let states = &snapshot.states;
    states
        .blending_enabled
        .then_some((states.blend_src, states.blend_dst))
}

/// Rasterizes all primitives queued on one tile, in submission order.
fn process_tile(
    target: &RasterTarget,
    stats: &FragmentStats,
    x: i32,
    y: i32,
    primitives: Vec<TileInfo>,
) {
    for info in primitives {
        let TileInfo {
            snapshot,
            front_facing,
            mut attributes,
            mut lambdas,
            mode,
        } = info;

        let ctx = FragmentContext::new(&snapshot, target, stats);
        let blending = blend_factors(&snapshot);

        match mode {
            RasterizationMode::Block => {
                process_block(&ctx, x, y, &mut attributes, front_facing, blending);
            }
            RasterizationMode::Checked => {
                process_block_checked(
                    &ctx,
                    x,
                    y,
                    &mut attributes,
                    &mut lambdas,
                    front_facing,
                    blending,
                );
            }
        }
    }
}

/// Rasterizes a completely covered block: every pixel produces a fragment. Walks the block in
/// 2×2 quads so the quad fragment path is exercised.
fn process_block(
    ctx: &FragmentContext<'_>,
    x: i32,
    y: i32,
    attr: &mut TriangleInterpolator,
    front_facing: bool,
    blending: Option<(BlendFactor, BlendFactor)>,
) {
    for qy in 0..BLOCK_SIZE / 2 {
        for qx in 0..BLOCK_SIZE / 2 {
            let px = x + qx * 2;
            let py = y + qy * 2;

            let [va, vb, vc, vd] = attr.varyings_quad();
            let depth = attr.depth_quad();
            let one_over_z = attr.one_over_viewport_z_quad();

            let mut fragments = [
                FragmentInfo::new(depth[0], front_facing, va),
                FragmentInfo::new(depth[1], front_facing, vb),
                FragmentInfo::new(depth[2], front_facing, vc),
                FragmentInfo::new(depth[3], front_facing, vd),
            ];
            let mut out = FragmentOutputQuad::default();

            ctx.process_fragment_quad(px, py, one_over_z, &mut fragments, &mut out);
            ctx.target.merge_fragment_quad(px, py, blending, &out);

            attr.advance_x_by(2);
        }
        attr.advance_y_by(2);
    }
}

/// Rasterizes a partially covered block: each pixel is tested against the three edge functions
/// and produces a fragment only when strictly inside.
fn process_block_checked(
    ctx: &FragmentContext<'_>,
    x: i32,
    y: i32,
    attr: &mut TriangleInterpolator,
    lambdas: &mut [LinearInterpolator2d<Fixed24_8>; 3],
    front_facing: bool,
    blending: Option<(BlendFactor, BlendFactor)>,
) {
    for row in 0..BLOCK_SIZE {
        for col in 0..BLOCK_SIZE {
            if lambdas.iter().all(|l| l.value.is_positive()) {
                let mut fragment =
                    FragmentInfo::new(attr.depth.value, front_facing, attr.varyings());
                let mut out = FragmentOutput::default();

                ctx.process_fragment(
                    x + col,
                    y + row,
                    attr.one_over_viewport_z.value,
                    &mut fragment,
                    &mut out,
                );
                ctx.target.merge_fragment(x + col, y + row, blending, &out);
            }

            for lambda in lambdas.iter_mut() {
                lambda.advance_x();
            }
            attr.advance_x();
        }

        for lambda in lambdas.iter_mut() {
            lambda.advance_y();
        }
        attr.advance_y();
    }
}
