//! The vertex record flowing through the pipeline.

use arrayvec::ArrayVec;
use glimmer_math::Vec4;

use super::limits::{MAX_ATTRIBUTES, MAX_VARYINGS};

/// Flags associated to a vertex.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VertexFlags(u32);

impl VertexFlags {
    /// No flags set.
    pub const NONE: VertexFlags = VertexFlags(0);

    /// This is the last vertex in a line strip.
    pub const STRIP_END: VertexFlags = VertexFlags(1);

    /// This vertex does not lie inside the view volume.
    pub const CLIP_DISCARD: VertexFlags = VertexFlags(2);

    /// This vertex was generated by interpolation during clipping.
    pub const INTERPOLATED: VertexFlags = VertexFlags(4);

    /// Returns `true` if all flags in `other` are set in `self`.
    #[inline]
    pub const fn contains(self, other: VertexFlags) -> bool {
        self.0 & other.0 == other.0
    }

    /// Sets all flags in `other`.
    #[inline]
    pub fn insert(&mut self, other: VertexFlags) {
        self.0 |= other.0;
    }
}

impl core::ops::BitOr for VertexFlags {
    type Output = VertexFlags;

    #[inline]
    fn bitor(self, rhs: VertexFlags) -> VertexFlags {
        VertexFlags(self.0 | rhs.0)
    }
}

/// A vertex as it flows through the pipeline.
///
/// Depending on the stage, `coords` holds the position input, the homogeneous clip coordinates
/// written by the vertex shader, or the viewport coordinates after the perspective divide (where
/// `w` holds `1 / w_clip`).
#[derive(Debug, Clone, Default)]
pub struct Vertex {
    /// Coordinates at the current stage of the pipeline.
    pub coords: Vec4,

    /// Vertex attributes, gathered from the enabled attribute buffers.
    pub attribs: ArrayVec<Vec4, MAX_ATTRIBUTES>,

    /// Varyings, i.e. the vertex shader outputs.
    pub varyings: ArrayVec<Vec4, MAX_VARYINGS>,

    /// Vertex flags.
    pub flags: VertexFlags,
}

impl Vertex {
    /// Creates a vertex with the given coordinates and no attributes.
    pub fn new(coords: Vec4) -> Vertex {
        Vertex {
            coords,
            ..Vertex::default()
        }
    }
}

/// Linearly interpolates vertex data in the clipping stage.
///
/// This runs after the vertex shader, so varyings are interpolated alongside the clip
/// coordinates. Smooth varyings are not yet premultiplied by `w` at this point, so a plain lerp
/// is the correct operation for every qualifier.
pub fn lerp_vertex(t: f32, a: &Vertex, b: &Vertex) -> Vertex {
    let mut out = Vertex::new(Vec4::lerp(t, a.coords, b.coords));

    debug_assert_eq!(a.varyings.len(), b.varyings.len());
    for (va, vb) in a.varyings.iter().zip(&b.varyings) {
        out.varyings.push(Vec4::lerp(t, *va, *vb));
    }

    out.flags.insert(VertexFlags::INTERPOLATED);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_contain_and_combine() {
        let mut flags = VertexFlags::NONE;
        assert!(!flags.contains(VertexFlags::STRIP_END));

        flags.insert(VertexFlags::STRIP_END);
        flags.insert(VertexFlags::CLIP_DISCARD);
        assert!(flags.contains(VertexFlags::STRIP_END));
        assert!(flags.contains(VertexFlags::STRIP_END | VertexFlags::CLIP_DISCARD));
        assert!(!flags.contains(VertexFlags::INTERPOLATED));
    }

    #[test]
    fn lerp_marks_interpolated_and_blends_varyings() {
        let mut a = Vertex::new(Vec4::new(0.0, 0.0, 0.0, 1.0));
        let mut b = Vertex::new(Vec4::new(2.0, 4.0, 6.0, 1.0));
        a.varyings.push(Vec4::splat(0.0));
        b.varyings.push(Vec4::splat(1.0));

        let mid = lerp_vertex(0.5, &a, &b);
        assert_eq!(mid.coords, Vec4::new(1.0, 2.0, 3.0, 1.0));
        assert_eq!(mid.varyings[0], Vec4::splat(0.5));
        assert!(mid.flags.contains(VertexFlags::INTERPOLATED));
    }
}
