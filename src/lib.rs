//! glimmer — a software rasterizer.
//!
//! The engine reproduces a small, fixed subset of a classic retained-mode 3D graphics API,
//! executed entirely on the CPU. The host application supplies vertex and fragment stages as an
//! implementation of the [`Program`][shader::Program] trait together with vertex, index and
//! attribute buffers; the engine produces a raster image in a 32-bit color buffer plus a
//! fixed-point depth image.
//!
//! The pipeline, in order:
//!
//! 1. per-vertex shader invocation and clip preprocessing;
//! 2. homogeneous clipping against the `w` plane and the six frustum planes;
//! 3. perspective divide and viewport transform;
//! 4. primitive assembly with fill-rule-aware face culling;
//! 5. an edge-function sweep rasterizer over 28.4 fixed-point subpixel coordinates, classifying
//!    8×8 blocks as fully covered, partially covered or outside;
//! 6. perspective-correct attribute interpolation, the fragment stage (scissor, shader dispatch,
//!    depth test) and the output merger (pixel-format conversion and alpha blending).
//!
//! All operations hang off a [`RenderContext`][context::RenderContext], created with a pixel
//! format and dimensions and driven through buffer/shader/texture registration, draw calls and
//! [`present`][context::RenderContext::present].

pub mod assembly;
pub mod buffers;
pub mod clip;
pub mod context;
pub mod cull;
pub mod error;
pub mod framebuffer;
pub mod geom;
pub mod output_merger;
pub mod pipeline;
pub mod pixel;
pub mod raster;
pub mod render_object;
pub mod shader;
pub mod slot_map;
pub mod states;
pub mod stats;
pub mod task;
pub mod texture;

pub use context::{HostSurface, RenderContext};
pub use error::{ContextError, ErrorKind};
pub use pixel::PixelFormat;
pub use shader::{
    FragmentResult, FragmentShaderArgs, InterpolationQualifier, Program, Uniform, Varying,
    VertexShaderArgs,
};
pub use states::{
    BlendFactor, ComparisonFunc, CullFaceDirection, FrontFaceOrientation, PolygonMode,
    PrimitiveMode, StateFlag,
};
pub use texture::{Sampler2d, TextureFilter, TextureTarget, WrapMode};

/// Library version, following the `(major, minor, patch)` convention.
pub const VERSION: (u32, u32, u32) = (0, 1, 0);

/// Returns the library version as `(major, minor, patch)`.
pub fn version() -> (u32, u32, u32) {
    VERSION
}
