//! Texture objects and samplers.
//!
//! Textures store their texels as `Vec4` colors. The base level of a texture must have
//! power-of-two dimensions; storage for additional levels is laid out in the classic
//! 1.5×-pitch arrangement, with the base image on the left and the level pyramid stacked in the
//! right half. Levels beyond the base are only filled when the host supplies them — the engine
//! never generates mipmaps.

use glimmer_math::{Vec2, Vec4};

use crate::error::ErrorKind;
use crate::pixel::{PixelFormat, PixelFormatConverter};

/// Texture coordinate wrapping modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WrapMode {
    /// Repeat the texture.
    #[default]
    Repeat,
    /// Repeat the texture, mirroring it on every other repetition.
    MirroredRepeat,
    /// Clamp the texture coordinates to the edge texels.
    ClampToEdge,
}

/// Texture filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextureFilter {
    /// Take the nearest texel.
    #[default]
    Nearest,
    /// Take the nearest texel after a small position-keyed offset. A cheap stand-in for a
    /// Gaussian reconstruction.
    Dithered,
}

/// Texture targets. Only 2D textures are handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextureTarget {
    #[default]
    Texture2d,
}

/// Wraps a texel coordinate into `[0, max)`. `max` must be a power of two.
#[inline]
pub fn wrap(mode: WrapMode, coord: i32, max: i32) -> i32 {
    match mode {
        WrapMode::Repeat => coord & (max - 1),
        WrapMode::MirroredRepeat => {
            let t = coord & (max - 1);
            if coord & max != 0 {
                (max - 1) - t
            } else {
                t
            }
        }
        WrapMode::ClampToEdge => coord.clamp(0, max - 1),
    }
}

/// Texel storage for a texture and its pre-supplied levels.
#[derive(Debug, Clone, Default)]
struct TextureStorage {
    /// Texel buffer holding the base image and all levels.
    buffer: Vec<Vec4>,

    /// Start offset of each level inside `buffer`.
    level_offsets: Vec<usize>,

    /// Row pitch in texels; `width` for single-level storage, `width * 3 / 2` otherwise.
    pitch: usize,
}

impl TextureStorage {
    /// Allocates storage for a `width` × `height` base image plus its level pyramid.
    ///
    /// Level n ≥ 1 of size `(width >> n) × (height >> n)` starts at column `width` of the row
    /// where the previous levels ended.
    fn allocate(&mut self, width: usize, height: usize) {
        self.buffer.clear();
        self.level_offsets.clear();

        self.buffer.resize(width * height + (width * height) / 2, Vec4::ZERO);
        self.pitch = width + (width >> 1);

        self.level_offsets.push(0);
        let mut h_offs = 0;
        let mut h = height >> 1;
        while h > 0 {
            self.level_offsets.push(h_offs * self.pitch + width);
            h_offs += h;
            h >>= 1;
        }
    }

    fn level_count(&self) -> usize {
        self.level_offsets.len()
    }

    fn texel(&self, level: usize, x: usize, y: usize) -> Vec4 {
        self.buffer[self.level_offsets[level] + y * self.pitch + x]
    }

    fn texel_mut(&mut self, level: usize, x: usize, y: usize) -> &mut Vec4 {
        &mut self.buffer[self.level_offsets[level] + y * self.pitch + x]
    }
}

/// A 2-dimensional texture with its sampler state.
#[derive(Debug, Clone, Default)]
pub struct Texture2d {
    /// Base level dimensions. Powers of two.
    pub width: i32,
    pub height: i32,

    storage: TextureStorage,

    wrap_s: WrapMode,
    wrap_t: WrapMode,
    filter_mag: TextureFilter,
    filter_min: TextureFilter,
}

impl Texture2d {
    /// Creates an empty texture with default sampler state.
    pub fn new() -> Texture2d {
        Texture2d::default()
    }

    /// Sets the wrapping modes.
    pub fn set_wrap(&mut self, s: WrapMode, t: WrapMode) {
        self.wrap_s = s;
        self.wrap_t = t;
    }

    /// Returns the wrapping modes as `(s, t)`.
    pub fn wrap_modes(&self) -> (WrapMode, WrapMode) {
        (self.wrap_s, self.wrap_t)
    }

    /// Sets the magnification filter.
    pub fn set_filter_mag(&mut self, filter: TextureFilter) {
        self.filter_mag = filter;
    }

    /// Sets the minification filter.
    pub fn set_filter_min(&mut self, filter: TextureFilter) {
        self.filter_min = filter;
    }

    /// Returns the filters as `(mag, min)`.
    pub fn filters(&self) -> (TextureFilter, TextureFilter) {
        (self.filter_mag, self.filter_min)
    }

    /// Number of allocated levels (1 base + pre-supplied level slots).
    pub fn level_count(&self) -> usize {
        self.storage.level_count()
    }

    /// Uploads image data for a level.
    ///
    /// Level 0 (re-)allocates the storage and requires power-of-two dimensions; level n requires
    /// dimensions `(width >> n, height >> n)` of already-allocated storage. `data` holds 4 bytes
    /// per texel in the channel order of `format`.
    pub fn set_data(
        &mut self,
        level: u32,
        width: i32,
        height: i32,
        format: PixelFormat,
        data: &[u8],
    ) -> Result<(), ErrorKind> {
        if width <= 0 || height <= 0 || data.is_empty() {
            return Err(ErrorKind::InvalidValue);
        }
        if data.len() != (width * height * 4) as usize {
            return Err(ErrorKind::InvalidValue);
        }

        if level == 0 {
            if width & (width - 1) != 0 || height & (height - 1) != 0 {
                return Err(ErrorKind::InvalidValue);
            }

            if self.width != width || self.height != height {
                self.storage.allocate(width as usize, height as usize);
                self.width = width;
                self.height = height;
            }
        } else {
            if level as usize >= self.storage.level_count() {
                return Err(ErrorKind::InvalidValue);
            }
            if width != self.width >> level || height != self.height >> level {
                return Err(ErrorKind::InvalidValue);
            }
        }

        let converter = PixelFormatConverter::named(format);
        for y in 0..height as usize {
            for x in 0..width as usize {
                let i = (y * width as usize + x) * 4;
                let pixel = u32::from_be_bytes([data[i], data[i + 1], data[i + 2], data[i + 3]]);
                *self.storage.texel_mut(level as usize, x, y) = converter.to_color(pixel);
            }
        }

        Ok(())
    }

    /// Updates part of a level. Only valid after `set_data` allocated the storage; the updated
    /// rectangle is clamped to the level dimensions.
    pub fn set_sub_data(
        &mut self,
        level: u32,
        x: i32,
        y: i32,
        width: i32,
        height: i32,
        format: PixelFormat,
        data: &[u8],
    ) -> Result<(), ErrorKind> {
        if width <= 0 || height <= 0 || data.is_empty() {
            return Err(ErrorKind::InvalidValue);
        }
        if data.len() != (width * height * 4) as usize {
            return Err(ErrorKind::InvalidValue);
        }
        if level as usize >= self.storage.level_count() {
            return Err(ErrorKind::InvalidValue);
        }
        if x < 0 || y < 0 || x >= self.width || y >= self.height {
            return Err(ErrorKind::InvalidValue);
        }

        let level_w = (self.width >> level).max(1);
        let level_h = (self.height >> level).max(1);
        let max_w = ((x + width).min(level_w) - x).max(0) as usize;
        let max_h = ((y + height).min(level_h) - y).max(0) as usize;

        let converter = PixelFormatConverter::named(format);
        for row in 0..max_h {
            for col in 0..max_w {
                let i = (row * width as usize + col) * 4;
                let pixel = u32::from_be_bytes([data[i], data[i + 1], data[i + 2], data[i + 3]]);
                *self
                    .storage
                    .texel_mut(level as usize, x as usize + col, y as usize + row) =
                    converter.to_color(pixel);
            }
        }

        Ok(())
    }

    /// Reads one texel of a level with wrapping applied.
    fn read_wrapped(&self, level: usize, x: i32, y: i32) -> Vec4 {
        let w = (self.width >> level).max(1);
        let h = (self.height >> level).max(1);
        let tx = wrap(self.wrap_s, x, w);
        let ty = wrap(self.wrap_t, y, h);
        self.storage.texel(level, tx as usize, ty as usize)
    }

    /// Nearest-texel lookup at the given level.
    fn sample_nearest(&self, uv: Vec2, level: usize) -> Vec4 {
        let w = (self.width >> level).max(1);
        let h = (self.height >> level).max(1);
        self.read_wrapped(level, (uv.x * w as f32) as i32, (uv.y * h as f32) as i32)
    }

    /// Nearest-texel lookup at the given level after applying a dither offset in texel space.
    fn sample_dithered(&self, uv: Vec2, level: usize, dither_offset: Vec2) -> Vec4 {
        let w = (self.width >> level).max(1);
        let h = (self.height >> level).max(1);
        let tx = (uv.x * w as f32) as i32 as f32 + dither_offset.x;
        let ty = (uv.y * h as f32) as i32 as f32 + dither_offset.y;
        self.read_wrapped(level, tx as i32, ty as i32)
    }
}

/// A texture sampler: one pure lookup function respecting the texture's filters.
pub trait Sampler2d {
    /// Returns a texel as a 4-vector while respecting the active texture filters.
    fn sample_at(&self, uv: Vec2) -> Vec4;
}

/// Dither kernel, keyed on `(x & 1, y & 1)` of the fragment position.
const DITHER_KERNEL: [f32; 8] = [0.00, -0.25, 0.25, 0.50, 0.50, 0.25, -0.25, 0.00];

/// Sampler over a [`Texture2d`], bound to the fragment position that determines the dither
/// offset.
///
/// The mipmap parameters have to be supplied from outside via
/// [`with_gradients`][Self::with_gradients], since the sampler has no knowledge of the
/// texel-to-pixel mapping; without them, lookups read the base level through the magnification
/// filter.
#[derive(Debug, Clone, Copy)]
pub struct TextureSampler<'a> {
    texture: &'a Texture2d,
    dither_offset: Vec2,

    /// Selected mipmap level.
    mipmap_level: usize,

    /// Fractional level-of-detail parameter the level was derived from.
    mipmap_level_parameter: f32,
}

impl<'a> TextureSampler<'a> {
    /// Creates a sampler for a fragment at raster position `(x, y)`.
    pub fn new(texture: &'a Texture2d, x: i32, y: i32) -> TextureSampler<'a> {
        let i = (((x & 1) << 2) | ((y & 1) << 1)) as usize;
        TextureSampler {
            texture,
            dither_offset: Vec2::new(DITHER_KERNEL[i], DITHER_KERNEL[i + 1]),
            mipmap_level: 0,
            mipmap_level_parameter: 0.0,
        }
    }

    /// Selects the effective mipmap level from the texture-coordinate gradients of the
    /// fragment, i.e. the change of `uv` per pixel step in x and y.
    ///
    /// The level-of-detail parameter is the log2 of the largest texel-space footprint of the
    /// two gradients; the level is its integral part, clamped to the allocated pyramid.
    pub fn with_gradients(mut self, d_uv_dx: Vec2, d_uv_dy: Vec2) -> TextureSampler<'a> {
        let w = self.texture.width as f32;
        let h = self.texture.height as f32;

        let dx = Vec2::new(d_uv_dx.x * w, d_uv_dx.y * h);
        let dy = Vec2::new(d_uv_dy.x * w, d_uv_dy.y * h);
        let delta_max_sq = dx.mag_sq().max(dy.mag_sq());

        self.mipmap_level_parameter = 0.5 * delta_max_sq.max(f32::MIN_POSITIVE).log2();

        let max_level = self.texture.level_count().saturating_sub(1);
        self.mipmap_level = (self.mipmap_level_parameter.floor() as i32)
            .clamp(0, max_level as i32) as usize;

        self
    }
}

impl Sampler2d for TextureSampler<'_> {
    fn sample_at(&self, uv: Vec2) -> Vec4 {
        if self.texture.width == 0 || self.texture.height == 0 {
            return Vec4::ZERO;
        }

        // Dithered magnification does not look good where the texel-to-pixel ratio approaches
        // one; switch to the minification filter just below the first level boundary.
        let force_minification = self.texture.filter_mag == TextureFilter::Dithered
            && self.mipmap_level == 0
            && self.mipmap_level_parameter > 0.5;

        let filter = if self.mipmap_level > 0 || force_minification {
            self.texture.filter_min
        } else {
            self.texture.filter_mag
        };

        match filter {
            TextureFilter::Nearest => self.texture.sample_nearest(uv, self.mipmap_level),
            TextureFilter::Dithered => {
                self.texture
                    .sample_dithered(uv, self.mipmap_level, self.dither_offset)
            }
        }
    }
}
