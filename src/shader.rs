//! Shader programs, varyings and uniforms.
//!
//! A shader program is supplied by the host as an implementation of [`Program`]. Registration
//! pre-links the program — collecting the varying count and one interpolation qualifier per
//! varying — and returns a positive handle; handle `0` is reserved for a built-in no-op program
//! created at context init. Per-fragment dispatch goes through a single `dyn Program` indirect
//! call and never allocates.

use arrayvec::ArrayVec;
use glimmer_math::{Mat4, Vec2, Vec4};

use crate::geom::limits::MAX_VARYINGS;
use crate::texture::{Texture2d, TextureSampler};

/// Interpolation qualifier of a varying.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InterpolationQualifier {
    /// Constant over the primitive; the provoking vertex's value is used verbatim.
    Flat,
    /// Linear interpolation in window space.
    NoPerspective,
    /// Perspective-correct interpolation.
    #[default]
    Smooth,
}

/// A uniform value, addressed by integer location.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Uniform {
    Int(i32),
    Float(f32),
    Vec4(Vec4),
    Mat4(Mat4),
}

impl Default for Uniform {
    fn default() -> Self {
        Uniform::Int(0)
    }
}

impl Uniform {
    /// Returns the integer value, or `0` if the location holds another type.
    pub fn as_int(&self) -> i32 {
        match self {
            Uniform::Int(v) => *v,
            _ => 0,
        }
    }

    /// Returns the float value, or `0.0` if the location holds another type.
    pub fn as_float(&self) -> f32 {
        match self {
            Uniform::Float(v) => *v,
            _ => 0.0,
        }
    }

    /// Returns the vector value, or zero if the location holds another type.
    pub fn as_vec4(&self) -> Vec4 {
        match self {
            Uniform::Vec4(v) => *v,
            _ => Vec4::ZERO,
        }
    }

    /// Returns the matrix value, or identity if the location holds another type.
    pub fn as_mat4(&self) -> Mat4 {
        match self {
            Uniform::Mat4(v) => *v,
            _ => Mat4::IDENTITY,
        }
    }
}

impl From<i32> for Uniform {
    fn from(v: i32) -> Uniform {
        Uniform::Int(v)
    }
}

impl From<f32> for Uniform {
    fn from(v: f32) -> Uniform {
        Uniform::Float(v)
    }
}

impl From<Vec4> for Uniform {
    fn from(v: Vec4) -> Uniform {
        Uniform::Vec4(v)
    }
}

impl From<Mat4> for Uniform {
    fn from(v: Mat4) -> Uniform {
        Uniform::Mat4(v)
    }
}

/// A varying as seen by the fragment shader.
#[derive(Debug, Clone, Copy, Default)]
pub struct Varying {
    /// Current value of the varying.
    pub value: Vec4,

    /// Approximation of the partial derivative with respect to x.
    pub d_fdx: Vec4,

    /// Approximation of the partial derivative with respect to y.
    pub d_fdy: Vec4,

    /// Interpolation qualifier.
    pub iq: InterpolationQualifier,
}

impl Varying {
    pub fn new(value: Vec4, d_fdx: Vec4, d_fdy: Vec4, iq: InterpolationQualifier) -> Varying {
        Varying {
            value,
            d_fdx,
            d_fdy,
            iq,
        }
    }
}

/// Result of a fragment shader invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FragmentResult {
    /// Drop the fragment.
    Discard,
    /// Keep the fragment.
    Accept,
}

/// Inputs and outputs of one vertex shader invocation.
pub struct VertexShaderArgs<'a> {
    /// Index of the vertex inside the draw call.
    pub vertex_id: i32,

    /// Instance index. Always `0`; instancing is not part of the API subset.
    pub instance_id: i32,

    /// Vertex attributes gathered from the enabled attribute buffers.
    pub attribs: &'a [Vec4],

    /// Uniforms bound at draw-call time.
    pub uniforms: &'a [Uniform],

    /// Homogeneous clip-space position; written by the shader.
    pub position: &'a mut Vec4,

    /// Point size output. Carried but unused by the rasterizer.
    pub point_size: &'a mut f32,

    /// Varying outputs, pre-sized to the program's varying count.
    pub varyings: &'a mut [Vec4],
}

/// Inputs and outputs of one fragment shader invocation.
pub struct FragmentShaderArgs<'a> {
    /// Fragment coordinate: `(x - 0.5, raster_height - (y - 0.5), z)` with `z` the viewport z.
    pub frag_coord: Vec4,

    /// Whether the fragment comes from a front-facing primitive.
    pub front_facing: bool,

    /// Coordinate of the fragment within a point. Currently always zero.
    pub point_coord: Vec2,

    /// Interpolated varyings, already divided by `w` where the qualifier asks for it.
    pub varyings: &'a [Varying],

    /// Uniforms bound at draw-call time.
    pub uniforms: &'a [Uniform],

    /// Textures bound to the texture units at draw-call time.
    pub(crate) textures: &'a [Option<&'a Texture2d>],

    /// Raster position; keys the dither offset of [`sampler`][Self::sampler].
    pub(crate) raster_pos: (i32, i32),

    /// Fragment depth. Initialized to the interpolated depth; the shader may overwrite it.
    pub depth: &'a mut f32,

    /// Fragment color output. Initialized to `(0, 0, 0, 1)`.
    pub color: &'a mut Vec4,
}

impl FragmentShaderArgs<'_> {
    /// Returns a sampler for the texture bound to `unit`, or `None` if the unit is empty.
    pub fn sampler(&self, unit: usize) -> Option<TextureSampler<'_>> {
        self.textures
            .get(unit)
            .copied()
            .flatten()
            .map(|tex| TextureSampler::new(tex, self.raster_pos.0, self.raster_pos.1))
    }
}

/// A complete graphics program, consisting of a vertex and a fragment stage.
///
/// `Send + Sync` is required because fragment processing may run on rasterizer worker threads.
pub trait Program: Send + Sync {
    /// Pre-link step: reports the interpolation qualifiers of the program's varyings, one entry
    /// per varying. Their count defines the program's varying count.
    fn pre_link(&self) -> ArrayVec<InterpolationQualifier, MAX_VARYINGS> {
        ArrayVec::new()
    }

    /// Vertex shader entry point. Reads attributes, writes the clip-space position and the
    /// varyings.
    fn vertex_shader(&self, args: &mut VertexShaderArgs<'_>);

    /// Fragment shader entry point. May write color and depth, sample textures, or discard.
    fn fragment_shader(&self, args: &mut FragmentShaderArgs<'_>) -> FragmentResult;
}

/// Program flags used by the registry.
pub mod program_flags {
    /// The program's pre-link step ran and its varying metadata is recorded.
    pub const PRELINKED: u32 = 1;
    /// The program is linked against the context.
    pub const LINKED: u32 = 2;
}

/// A registered program together with its pre-linked metadata.
pub struct ProgramInfo {
    /// Varying count. Matches `iqs.len()`.
    pub varying_count: usize,

    /// Interpolation qualifiers for the varyings.
    pub iqs: ArrayVec<InterpolationQualifier, MAX_VARYINGS>,

    /// Flags; see [`program_flags`].
    pub flags: u32,

    /// The program itself.
    pub program: Box<dyn Program>,
}

impl ProgramInfo {
    /// Wraps and pre-links a program.
    pub fn new(program: Box<dyn Program>) -> ProgramInfo {
        let iqs = program.pre_link();
        ProgramInfo {
            varying_count: iqs.len(),
            iqs,
            flags: program_flags::PRELINKED,
            program,
        }
    }

    /// Consistency check between the varying count and the recorded qualifiers.
    pub fn validate(&self) -> bool {
        self.varying_count == self.iqs.len()
    }

    pub fn is_prelinked(&self) -> bool {
        self.flags & program_flags::PRELINKED != 0
    }

    pub fn is_linked(&self) -> bool {
        self.flags & program_flags::LINKED != 0
    }
}

impl core::fmt::Debug for ProgramInfo {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ProgramInfo")
            .field("varying_count", &self.varying_count)
            .field("flags", &self.flags)
            .finish_non_exhaustive()
    }
}

/// The built-in program bound to handle `0`: passes positions through unchanged and outputs
/// empty fragments.
#[derive(Debug, Default)]
pub struct DefaultProgram;

impl Program for DefaultProgram {
    fn vertex_shader(&self, args: &mut VertexShaderArgs<'_>) {
        if let Some(position) = args.attribs.first() {
            *args.position = *position;
        }
    }

    fn fragment_shader(&self, _args: &mut FragmentShaderArgs<'_>) -> FragmentResult {
        FragmentResult::Accept
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_accessors_fall_back_to_zero() {
        let u = Uniform::Float(2.5);
        assert_eq!(u.as_float(), 2.5);
        assert_eq!(u.as_int(), 0);
        assert_eq!(u.as_vec4(), Vec4::ZERO);

        assert_eq!(Uniform::default().as_int(), 0);
        assert_eq!(Uniform::from(7).as_int(), 7);
        assert_eq!(Uniform::from(Mat4::IDENTITY).as_mat4(), Mat4::IDENTITY);
    }

    #[test]
    fn program_info_records_prelink_metadata() {
        struct TwoVaryings;

        impl Program for TwoVaryings {
            fn pre_link(&self) -> ArrayVec<InterpolationQualifier, MAX_VARYINGS> {
                let mut iqs = ArrayVec::new();
                iqs.push(InterpolationQualifier::Smooth);
                iqs.push(InterpolationQualifier::Flat);
                iqs
            }

            fn vertex_shader(&self, _args: &mut VertexShaderArgs<'_>) {}

            fn fragment_shader(&self, _args: &mut FragmentShaderArgs<'_>) -> FragmentResult {
                FragmentResult::Accept
            }
        }

        let info = ProgramInfo::new(Box::new(TwoVaryings));
        assert_eq!(info.varying_count, 2);
        assert!(info.is_prelinked());
        assert!(!info.is_linked());
        assert!(info.validate());
    }
}
