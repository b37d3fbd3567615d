//! Render pipeline state management.
//!
//! [`RenderStates`] is the mutable state block of a context. Every draw call snapshots it (plus
//! the resolved program and texture references) into a [`StateSnapshot`] that travels with the
//! render object through the pipeline, so later state changes cannot affect queued work.

use std::sync::Arc;

use arrayvec::ArrayVec;

use crate::geom::limits::MAX_TEXTURE_UNITS;
use crate::shader::{ProgramInfo, Uniform};
use crate::texture::Texture2d;

/// How the vertex list of a draw call is interpreted.
///
/// The higher-order modes (`TriangleFan` and up) belong to the immediate-mode convenience layer,
/// which expands them into triangles before they reach the core; the core itself draws points,
/// lines and triangles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PrimitiveMode {
    Points,
    Lines,
    #[default]
    Triangles,
    TriangleFan,
    TriangleStrip,
    Quads,
    Polygon,
}

/// Comparison functions for the depth test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ComparisonFunc {
    /// Always accept the new value.
    Pass,
    /// Always reject the new value.
    Fail,
    Equal,
    NotEqual,
    #[default]
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
}

impl ComparisonFunc {
    /// Compares a new value against a stored value.
    #[inline]
    pub fn compare<T: PartialOrd>(self, new: T, old: T) -> bool {
        match self {
            ComparisonFunc::Pass => true,
            ComparisonFunc::Fail => false,
            ComparisonFunc::Equal => new == old,
            ComparisonFunc::NotEqual => new != old,
            ComparisonFunc::Less => new < old,
            ComparisonFunc::LessEqual => new <= old,
            ComparisonFunc::Greater => new > old,
            ComparisonFunc::GreaterEqual => new >= old,
        }
    }
}

/// Winding that makes a triangle front-facing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FrontFaceOrientation {
    /// Clockwise triangles are front-facing.
    Cw,
    /// Counter-clockwise triangles are front-facing.
    #[default]
    Ccw,
}

/// Which faces are candidates for culling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CullFaceDirection {
    Front,
    #[default]
    Back,
    FrontAndBack,
}

/// Polygon rasterization modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PolygonMode {
    /// Draw polygon vertices as points.
    Point,
    /// Draw polygon outlines as line strips.
    Line,
    /// Draw filled polygons.
    #[default]
    Fill,
}

/// Blend factors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlendFactor {
    Zero,
    One,
    SrcAlpha,
    SrcColor,
    OneMinusSrcAlpha,
}

/// Pipeline states that can be enabled or disabled through
/// [`set_state`][crate::context::RenderContext::set_state].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateFlag {
    /// Blending. Initially disabled.
    Blend,
    /// Face culling. Initially disabled.
    CullFace,
    /// Depth testing. Initially enabled.
    DepthTest,
    /// Depth writing. Initially enabled.
    DepthWrite,
    /// Scissor test. Initially disabled.
    ScissorTest,
    /// Texturing. Initially disabled.
    Texture,
}

/// An axis-aligned rectangle in viewport coordinates, `[x_min, x_max) × [y_min, y_max)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect {
    pub x_min: i32,
    pub x_max: i32,
    pub y_min: i32,
    pub y_max: i32,
}

impl Rect {
    pub const fn new(x_min: i32, x_max: i32, y_min: i32, y_max: i32) -> Rect {
        Rect {
            x_min,
            x_max,
            y_min,
            y_max,
        }
    }
}

/// States that are captured on a per-draw-call basis.
#[derive(Debug, Clone)]
pub struct RenderStates {
    /// Viewport transform.
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
    pub z_near: f32,
    pub z_far: f32,

    /// Scissor test.
    pub scissor_test_enabled: bool,
    pub scissor_box: Rect,

    /// Depth test.
    pub depth_test_enabled: bool,
    pub write_depth: bool,
    pub depth_func: ComparisonFunc,

    /// Culling.
    pub culling_enabled: bool,
    pub front_face: FrontFaceOrientation,
    pub cull_mode: CullFaceDirection,

    pub poly_mode: PolygonMode,

    /// Blending.
    pub blending_enabled: bool,
    pub blend_src: BlendFactor,
    pub blend_dst: BlendFactor,

    /// Texturing.
    pub texturing_enabled: bool,

    /// Currently bound shader handle. `0` is the built-in no-op program.
    pub shader_id: u32,

    /// Per-unit bound texture handles. `0` is the built-in checkerboard.
    pub bound_textures: [u32; MAX_TEXTURE_UNITS],

    /// Uniform locations, grown on write. Unset locations read as zero.
    pub uniforms: Vec<Uniform>,
}

impl RenderStates {
    /// Initial states for a context of the given dimensions.
    pub fn new(width: u32, height: u32) -> RenderStates {
        RenderStates {
            x: 0,
            y: 0,
            width,
            height,
            z_near: 0.0,
            z_far: 1.0,
            scissor_test_enabled: false,
            scissor_box: Rect::new(0, width as i32, 0, height as i32),
            depth_test_enabled: true,
            write_depth: true,
            depth_func: ComparisonFunc::Less,
            culling_enabled: false,
            front_face: FrontFaceOrientation::Ccw,
            cull_mode: CullFaceDirection::Back,
            poly_mode: PolygonMode::Fill,
            blending_enabled: false,
            blend_src: BlendFactor::One,
            blend_dst: BlendFactor::Zero,
            texturing_enabled: false,
            shader_id: 0,
            bound_textures: [0; MAX_TEXTURE_UNITS],
            uniforms: Vec::new(),
        }
    }
}

/// An immutable snapshot of the render states at draw-call time, with shader and texture handles
/// resolved to shared references.
pub struct StateSnapshot {
    /// Cloned states.
    pub states: RenderStates,

    /// The bound program's pre-linked info.
    pub program: Arc<ProgramInfo>,

    /// Per-unit textures, resolved when texturing is enabled.
    pub textures: ArrayVec<Option<Arc<Texture2d>>, MAX_TEXTURE_UNITS>,
}

impl StateSnapshot {
    /// Materializes the per-unit texture references for the fragment stage.
    pub(crate) fn texture_refs(&self) -> ArrayVec<Option<&Texture2d>, MAX_TEXTURE_UNITS> {
        self.textures.iter().map(|t| t.as_deref()).collect()
    }
}
