//! Render objects: draw-list entries.
//!
//! A draw call snapshots the active render states and the referenced vertex data into a
//! [`RenderObject`]. The object exclusively owns its cloned state and indices and borrows
//! attribute data by copy, so later buffer or state mutations cannot affect it. Objects live for
//! a single present cycle.

use std::sync::Arc;

use crate::geom::Vertex;
use crate::states::{PrimitiveMode, StateSnapshot};

/// The representation of one draw call inside the rendering pipeline.
pub struct RenderObject {
    /// Vertices with attributes gathered from the enabled attribute buffers. Coordinates and
    /// varyings are filled in by the vertex shader during present.
    pub vertices: Vec<Vertex>,

    /// Indices into `vertices`.
    pub indices: Vec<u32>,

    /// Drawing mode.
    pub mode: PrimitiveMode,

    /// Active render states at draw-call time.
    pub snapshot: Arc<StateSnapshot>,

    /// Ordered vertices after clipping.
    pub clipped: Vec<Vertex>,
}

impl RenderObject {
    /// Creates a render object over `vertices` drawn in buffer order.
    pub fn new(
        vertices: Vec<Vertex>,
        mode: PrimitiveMode,
        snapshot: Arc<StateSnapshot>,
    ) -> RenderObject {
        let indices = (0..vertices.len() as u32).collect();
        RenderObject {
            vertices,
            indices,
            mode,
            snapshot,
            clipped: Vec::new(),
        }
    }

    /// Creates a render object over `vertices` drawn through an index buffer.
    pub fn with_indices(
        vertices: Vec<Vertex>,
        indices: Vec<u32>,
        mode: PrimitiveMode,
        snapshot: Arc<StateSnapshot>,
    ) -> RenderObject {
        RenderObject {
            vertices,
            indices,
            mode,
            snapshot,
            clipped: Vec::new(),
        }
    }
}
