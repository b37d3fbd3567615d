//! Output buffers for rendering.
//!
//! The default framebuffer pairs a 32-bit color buffer with a 32-bit fixed-point depth buffer of
//! identical dimensions, both rounded up to a multiple of the rasterizer block size so block
//! traversal never needs edge handling.

use glimmer_math::{DepthValue, Vec4};

use crate::pixel::{PixelFormat, PixelFormatConverter};
use crate::raster::{upper_align_on_block_size, BLOCK_SIZE};
use crate::states::{BlendFactor, Rect};
use crate::output_merger;

/// Output of fragment processing for a single pixel, before merging.
#[derive(Debug, Clone, Copy, Default)]
pub struct FragmentOutput {
    /// Color produced by the fragment shader.
    pub color: Vec4,

    /// Whether the color value should be written to the color buffer.
    pub write_color: bool,
}

/// Output of fragment processing for a 2×2 pixel quad, with per-lane write masks.
///
/// Lane order: `(x, y)`, `(x+1, y)`, `(x, y+1)`, `(x+1, y+1)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct FragmentOutputQuad {
    pub color: [Vec4; 4],
    pub write_color: [bool; 4],
}

/// A rectangular buffer of plain values.
#[derive(Debug, Clone, Default)]
pub struct RenderBuffer<T> {
    width: i32,
    height: i32,
    data: Vec<T>,
}

impl<T: Copy + Default> RenderBuffer<T> {
    /// Allocates a `width` × `height` buffer filled with the default value.
    pub fn allocate(width: i32, height: i32) -> RenderBuffer<T> {
        RenderBuffer {
            width,
            height,
            data: vec![T::default(); (width * height) as usize],
        }
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    /// Fills the whole buffer with `v`.
    pub fn clear(&mut self, v: T) {
        self.data.fill(v);
    }

    /// Fills the given rectangle (clamped to the buffer) with `v`.
    pub fn clear_rect(&mut self, rect: Rect, v: T) {
        let x_min = rect.x_min.clamp(0, self.width);
        let x_max = rect.x_max.clamp(0, self.width);
        let y_min = rect.y_min.clamp(0, self.height);
        let y_max = rect.y_max.clamp(0, self.height);

        for y in y_min..y_max {
            let row = (y * self.width + x_min) as usize..(y * self.width + x_max) as usize;
            self.data[row].fill(v);
        }
    }

    /// Reads the value at `(x, y)`.
    #[inline]
    pub fn at(&self, x: i32, y: i32) -> T {
        self.data[(y * self.width + x) as usize]
    }

    /// Writes the value at `(x, y)`.
    #[inline]
    pub fn set(&mut self, x: i32, y: i32, v: T) {
        self.data[(y * self.width + x) as usize] = v;
    }

    /// Returns the backing storage.
    pub fn data(&self) -> &[T] {
        &self.data
    }

    fn as_mut_ptr(&mut self) -> *mut T {
        self.data.as_mut_ptr()
    }
}

/// The default framebuffer: one color and one depth attachment of identical, block-aligned
/// dimensions.
#[derive(Debug, Clone)]
pub struct DefaultFramebuffer {
    /// 32-bit color attachment in the configured pixel format.
    pub color: RenderBuffer<u32>,

    /// Fixed-point depth attachment.
    pub depth: RenderBuffer<DepthValue>,

    /// Converter for the color attachment's pixel format.
    pub converter: PixelFormatConverter,
}

impl DefaultFramebuffer {
    /// Allocates a framebuffer for a `width` × `height` context. Both attachments are rounded up
    /// to a multiple of [`BLOCK_SIZE`].
    pub fn new(width: i32, height: i32, format: PixelFormat) -> DefaultFramebuffer {
        let aligned_w = upper_align_on_block_size(width);
        let aligned_h = upper_align_on_block_size(height);
        debug_assert!(aligned_w % BLOCK_SIZE == 0 && aligned_h % BLOCK_SIZE == 0);

        DefaultFramebuffer {
            color: RenderBuffer::allocate(aligned_w, aligned_h),
            depth: RenderBuffer::allocate(aligned_w, aligned_h),
            converter: PixelFormatConverter::named(format),
        }
    }

    /// Buffer width. Both attachments match.
    pub fn width(&self) -> i32 {
        self.color.width()
    }

    /// Buffer height. Both attachments match.
    pub fn height(&self) -> i32 {
        self.color.height()
    }

    /// The color attachment as raw bytes, for hosts that blit into byte-oriented surfaces.
    pub fn color_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(self.color.data())
    }

    /// Creates a raster target view over both attachments.
    pub fn target(&mut self) -> RasterTarget {
        RasterTarget {
            color: self.color.as_mut_ptr(),
            depth: self.depth.as_mut_ptr(),
            width: self.color.width(),
            height: self.color.height(),
            converter: self.converter,
        }
    }
}

/// A raw view of the framebuffer handed to rasterization.
///
/// Tiles partition the target into disjoint rectangles, so tile tasks running on worker threads
/// write through this view without locking. Holders must respect the partition: a task may only
/// touch pixels of the tile it was dispatched for, and the view must not outlive the flush
/// barrier that precedes any reallocation of the underlying buffers.
#[derive(Debug, Clone, Copy)]
pub struct RasterTarget {
    color: *mut u32,
    depth: *mut DepthValue,
    width: i32,
    height: i32,

    /// Converter for the color attachment's pixel format.
    pub converter: PixelFormatConverter,
}

// SAFETY: see the type docs; concurrent users write disjoint pixel rectangles and the view never
// outlives a present cycle.
unsafe impl Send for RasterTarget {}
unsafe impl Sync for RasterTarget {}

impl RasterTarget {
    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    #[inline]
    fn index(&self, x: i32, y: i32) -> isize {
        debug_assert!(x >= 0 && x < self.width && y >= 0 && y < self.height);
        (y * self.width + x) as isize
    }

    /// Reads the depth value at `(x, y)`.
    #[inline]
    pub fn depth_at(&self, x: i32, y: i32) -> DepthValue {
        // SAFETY: the index is in bounds and reads race only with writes to other pixels.
        unsafe { *self.depth.offset(self.index(x, y)) }
    }

    /// Writes the depth value at `(x, y)`.
    #[inline]
    pub fn set_depth(&self, x: i32, y: i32, v: DepthValue) {
        // SAFETY: see the type docs.
        unsafe { *self.depth.offset(self.index(x, y)) = v }
    }

    /// Reads the packed color at `(x, y)`.
    #[inline]
    pub fn color_at(&self, x: i32, y: i32) -> u32 {
        // SAFETY: see the type docs.
        unsafe { *self.color.offset(self.index(x, y)) }
    }

    /// Writes the packed color at `(x, y)`.
    #[inline]
    pub fn set_color(&self, x: i32, y: i32, v: u32) {
        // SAFETY: see the type docs.
        unsafe { *self.color.offset(self.index(x, y)) = v }
    }

    /// Merges one fragment into the color buffer: clamps and packs the color, applies blending
    /// if enabled, and stores the result.
    pub fn merge_fragment(
        &self,
        x: i32,
        y: i32,
        blending: Option<(BlendFactor, BlendFactor)>,
        out: &FragmentOutput,
    ) {
        if !out.write_color {
            return;
        }

        let mut pixel = self.converter.to_pixel(out.color.clamp01());
        if let Some((src_factor, dst_factor)) = blending {
            pixel = output_merger::blend(
                &self.converter,
                src_factor,
                dst_factor,
                self.color_at(x, y),
                pixel,
            );
        }
        self.set_color(x, y, pixel);
    }

    /// Merges a 2×2 fragment quad; lanes with a cleared write mask leave their pixel untouched.
    pub fn merge_fragment_quad(
        &self,
        x: i32,
        y: i32,
        blending: Option<(BlendFactor, BlendFactor)>,
        out: &FragmentOutputQuad,
    ) {
        let offsets = [(0, 0), (1, 0), (0, 1), (1, 1)];
        for (lane, (dx, dy)) in offsets.iter().enumerate() {
            self.merge_fragment(
                x + dx,
                y + dy,
                blending,
                &FragmentOutput {
                    color: out.color[lane],
                    write_color: out.write_color[lane],
                },
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dimensions_are_block_aligned() {
        let fb = DefaultFramebuffer::new(4, 4, PixelFormat::Argb8888);
        assert_eq!(fb.width(), BLOCK_SIZE);
        assert_eq!(fb.height(), BLOCK_SIZE);

        let fb = DefaultFramebuffer::new(9, 17, PixelFormat::Argb8888);
        assert_eq!(fb.width(), 16);
        assert_eq!(fb.height(), 24);
    }

    #[test]
    fn clear_is_idempotent() {
        let mut fb = DefaultFramebuffer::new(8, 8, PixelFormat::Argb8888);

        fb.color.clear(0xff00_7f00);
        let first: Vec<u32> = fb.color.data().to_vec();

        fb.color.clear(0xff00_7f00);
        assert_eq!(fb.color.data(), &first[..]);
        assert!(fb.color.data().iter().all(|&p| p == 0xff00_7f00));
    }

    #[test]
    fn clear_rect_touches_only_the_rect() {
        let mut buf: RenderBuffer<u32> = RenderBuffer::allocate(8, 8);
        buf.clear_rect(Rect::new(2, 4, 1, 3), 7);

        for y in 0..8 {
            for x in 0..8 {
                let expected = if (2..4).contains(&x) && (1..3).contains(&y) {
                    7
                } else {
                    0
                };
                assert_eq!(buf.at(x, y), expected, "pixel ({x}, {y})");
            }
        }
    }

    #[test]
    fn target_round_trips_pixels() {
        let mut fb = DefaultFramebuffer::new(8, 8, PixelFormat::Argb8888);
        let target = fb.target();

        target.set_color(3, 5, 0xdead_beef);
        assert_eq!(target.color_at(3, 5), 0xdead_beef);

        target.set_depth(3, 5, DepthValue::from_f32(0.25));
        assert_eq!(target.depth_at(3, 5), DepthValue::from_f32(0.25));

        drop(target);
        assert_eq!(fb.color.at(3, 5), 0xdead_beef);
    }
}
