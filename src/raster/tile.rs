//! The rasterizer tile cache.
//!
//! Tiles partition the raster into [`BLOCK_SIZE`]² rectangles. The triangle sweep appends work
//! to per-tile FIFO lists; a flush dispatches one task per non-empty tile, so primitives within
//! a tile are rasterized in submission order while tiles are independent of each other.

use std::sync::Arc;

use glimmer_math::Fixed24_8;

use super::interp::TriangleInterpolator;
use super::{BLOCK_SHIFT, BLOCK_SIZE};
use crate::geom::interp::LinearInterpolator2d;
use crate::states::StateSnapshot;

/// Maximum number of primitives queued on a single tile before a flush is forced.
pub const MAX_TILE_PRIMITIVES: usize = 32;

/// Maximum number of non-empty tiles before a flush is forced.
pub const MAX_CACHED_TILES: usize = 1024;

/// How the block of a tile entry is rasterized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RasterizationMode {
    /// The block is completely covered: rasterize unconditionally.
    Block,
    /// The block is partially covered: check each pixel against the edge functions.
    Checked,
}

/// Primitive data queued on a tile. Only triangles go through the tile cache.
pub struct TileInfo {
    /// Active render states of the originating draw call.
    pub snapshot: Arc<StateSnapshot>,

    /// Whether the triangle is front-facing.
    pub front_facing: bool,

    /// Attribute interpolators positioned at the tile's top-left pixel center, with block
    /// processing set up.
    pub attributes: TriangleInterpolator,

    /// Fixed-point barycentric interpolators at the tile's top-left pixel center. Only consulted
    /// in [`RasterizationMode::Checked`].
    pub lambdas: [LinearInterpolator2d<Fixed24_8>; 3],

    /// Rasterization mode for this block.
    pub mode: RasterizationMode,
}

/// A tile and its queued primitives.
pub struct Tile {
    /// Raster x coordinate of the tile's top-left corner.
    pub x: i32,

    /// Raster y coordinate of the tile's top-left corner.
    pub y: i32,

    /// Primitives queued on this tile, in submission order.
    pub primitives: Vec<TileInfo>,
}

/// The tile cache: a grid of tiles covering the raster.
pub struct TileCache {
    pitch: i32,
    entries: Vec<Tile>,

    /// Indices of tiles holding at least one primitive.
    dirty: Vec<u32>,
}

impl TileCache {
    /// Creates a cache covering a raster of the given (block-aligned) dimensions.
    pub fn new(width: i32, height: i32) -> TileCache {
        let tiles_x = width >> BLOCK_SHIFT;
        let tiles_y = height >> BLOCK_SHIFT;

        let mut entries = Vec::with_capacity((tiles_x * tiles_y) as usize);
        for ty in 0..tiles_y {
            for tx in 0..tiles_x {
                entries.push(Tile {
                    x: tx * BLOCK_SIZE,
                    y: ty * BLOCK_SIZE,
                    primitives: Vec::new(),
                });
            }
        }

        TileCache {
            pitch: tiles_x,
            entries,
            dirty: Vec::new(),
        }
    }

    /// Number of tiles currently holding work.
    pub fn dirty_count(&self) -> usize {
        self.dirty.len()
    }

    /// Queues a triangle block on the tile containing `(x, y)`.
    ///
    /// Returns `false` without queuing when the tile's list or the cache as a whole is full; the
    /// caller is expected to flush and retry.
    #[allow(clippy::too_many_arguments)]
    pub fn add_triangle(
        &mut self,
        snapshot: &Arc<StateSnapshot>,
        attributes: TriangleInterpolator,
        lambdas: [LinearInterpolator2d<Fixed24_8>; 3],
        x: i32,
        y: i32,
        front_facing: bool,
        mode: RasterizationMode,
    ) -> bool {
        let index = ((y >> BLOCK_SHIFT) * self.pitch + (x >> BLOCK_SHIFT)) as usize;
        debug_assert!(index < self.entries.len());
        debug_assert_eq!(self.entries[index].x, x);
        debug_assert_eq!(self.entries[index].y, y);

        let tile = &mut self.entries[index];
        if tile.primitives.len() == MAX_TILE_PRIMITIVES {
            return false;
        }
        if tile.primitives.is_empty() {
            if self.dirty.len() == MAX_CACHED_TILES {
                return false;
            }
            self.dirty.push(index as u32);
        }

        let mut info = TileInfo {
            snapshot: Arc::clone(snapshot),
            front_facing,
            attributes,
            lambdas,
            mode,
        };
        info.attributes.setup_block_processing();
        for lambda in &mut info.lambdas {
            lambda.setup_block_processing();
        }
        tile.primitives.push(info);

        true
    }

    /// Takes the queued work out of the cache: yields `(x, y, primitives)` per dirty tile and
    /// leaves every tile empty.
    pub fn drain(&mut self) -> Vec<(i32, i32, Vec<TileInfo>)> {
        let mut work = Vec::with_capacity(self.dirty.len());
        for &index in &self.dirty {
            let tile = &mut self.entries[index as usize];
            work.push((tile.x, tile.y, std::mem::take(&mut tile.primitives)));
        }
        self.dirty.clear();
        work
    }
}
