//! Vertex, index and attribute buffer storage.
//!
//! Buffers are plain data owned by the context's slot maps and addressed by the small integer
//! handles those maps produce. Positions enter the pipeline through attribute slot 0 by
//! convention; a [`VertexBuffer`] is position-only staging storage for hosts that keep their
//! positions separate from the rest of the vertex data.

use glimmer_math::Vec4;

/// Default positions of well-known data inside the vertex attributes.
pub mod default_slot {
    pub const POSITION: u32 = 0;
    pub const COLOR: u32 = 1;
    pub const TEX_COORD: u32 = 2;
    pub const NORMAL: u32 = 3;
}

/// An ordered sequence of plain 4-vectors used as position-only input.
#[derive(Debug, Clone, Default)]
pub struct VertexBuffer {
    pub data: Vec<Vec4>,
}

impl VertexBuffer {
    pub fn new(data: Vec<Vec4>) -> VertexBuffer {
        VertexBuffer { data }
    }
}

/// An ordered sequence of 32-bit indices into the vertex list of a draw call.
#[derive(Debug, Clone, Default)]
pub struct IndexBuffer {
    pub data: Vec<u32>,
}

impl IndexBuffer {
    pub fn new(data: Vec<u32>) -> IndexBuffer {
        IndexBuffer { data }
    }
}

/// An ordered sequence of 4-vectors feeding one attribute slot, one entry per vertex.
#[derive(Debug, Clone, Default)]
pub struct AttributeBuffer {
    /// The slot this buffer is currently bound to, if any.
    pub slot: Option<u32>,

    /// Buffer data.
    pub data: Vec<Vec4>,
}

impl AttributeBuffer {
    pub fn new(data: Vec<Vec4>) -> AttributeBuffer {
        AttributeBuffer { slot: None, data }
    }
}
