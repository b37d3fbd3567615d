//! Pixel formats of the 32-bit color buffer.

use glimmer_math::Vec4;

/// Named 32-bit pixel formats, 8 bits per channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PixelFormat {
    /// Red at bit 24, green at 16, blue at 8, alpha at 0.
    Rgba8888,
    /// Alpha at bit 24, red at 16, green at 8, blue at 0.
    #[default]
    Argb8888,
    /// Blue at bit 24, green at 16, red at 8, alpha at 0.
    Bgra8888,
}

/// Per-channel bit widths and shifts of a 32-bit pixel format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelFormatDescriptor {
    pub name: PixelFormat,
    pub red_bits: u32,
    pub red_shift: u32,
    pub green_bits: u32,
    pub green_shift: u32,
    pub blue_bits: u32,
    pub blue_shift: u32,
    pub alpha_bits: u32,
    pub alpha_shift: u32,
}

impl PixelFormatDescriptor {
    /// Returns the descriptor of a named format.
    pub const fn named_format(name: PixelFormat) -> PixelFormatDescriptor {
        let (red_shift, green_shift, blue_shift, alpha_shift) = match name {
            PixelFormat::Rgba8888 => (24, 16, 8, 0),
            PixelFormat::Argb8888 => (16, 8, 0, 24),
            PixelFormat::Bgra8888 => (8, 16, 24, 0),
        };

        PixelFormatDescriptor {
            name,
            red_bits: 8,
            red_shift,
            green_bits: 8,
            green_shift,
            blue_bits: 8,
            blue_shift,
            alpha_bits: 8,
            alpha_shift,
        }
    }
}

/// Converts between float colors and packed pixels for a fixed descriptor.
#[derive(Debug, Clone, Copy)]
pub struct PixelFormatConverter {
    /// The underlying format description.
    pub descriptor: PixelFormatDescriptor,

    /// The maximum representable value per channel, e.g. `(255, 255, 255, 255)`.
    max_per_channel: Vec4,

    red_mask: u32,
    green_mask: u32,
    blue_mask: u32,
    alpha_mask: u32,
}

impl PixelFormatConverter {
    /// Creates a converter for the given descriptor.
    pub fn new(descriptor: PixelFormatDescriptor) -> PixelFormatConverter {
        let max_r = (1u32 << descriptor.red_bits) - 1;
        let max_g = (1u32 << descriptor.green_bits) - 1;
        let max_b = (1u32 << descriptor.blue_bits) - 1;
        let max_a = (1u32 << descriptor.alpha_bits) - 1;

        PixelFormatConverter {
            descriptor,
            max_per_channel: Vec4::new(max_r as f32, max_g as f32, max_b as f32, max_a as f32),
            red_mask: max_r << descriptor.red_shift,
            green_mask: max_g << descriptor.green_shift,
            blue_mask: max_b << descriptor.blue_shift,
            alpha_mask: max_a << descriptor.alpha_shift,
        }
    }

    /// Creates a converter for a named format.
    pub fn named(format: PixelFormat) -> PixelFormatConverter {
        PixelFormatConverter::new(PixelFormatDescriptor::named_format(format))
    }

    /// Returns the format name.
    pub fn name(&self) -> PixelFormat {
        self.descriptor.name
    }

    /// Packs a color with components in `[0, 1]` into a pixel. Scaled channel values are
    /// truncated, so e.g. `0.5` maps to `127` in an 8-bit channel.
    pub fn to_pixel(&self, color: Vec4) -> u32 {
        let scaled = color * self.max_per_channel;
        let d = &self.descriptor;
        ((scaled.x as u32) << d.red_shift)
            | ((scaled.y as u32) << d.green_shift)
            | ((scaled.z as u32) << d.blue_shift)
            | ((scaled.w as u32) << d.alpha_shift)
    }

    /// Unpacks a pixel into a color with components in `[0, 1]`.
    pub fn to_color(&self, pixel: u32) -> Vec4 {
        let d = &self.descriptor;
        let r = (pixel & self.red_mask) >> d.red_shift;
        let g = (pixel & self.green_mask) >> d.green_shift;
        let b = (pixel & self.blue_mask) >> d.blue_shift;
        let a = (pixel & self.alpha_mask) >> d.alpha_shift;
        Vec4::new(r as f32, g as f32, b as f32, a as f32) / self.max_per_channel
    }
}
