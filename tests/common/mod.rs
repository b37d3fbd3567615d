//! Shared fixtures for the integration suites.

use arrayvec::ArrayVec;
use glimmer_math::Vec4;

use glimmer::geom::limits::MAX_VARYINGS;
use glimmer::{
    FragmentResult, FragmentShaderArgs, InterpolationQualifier, PixelFormat, Program,
    RenderContext, VertexShaderArgs,
};

/// A program passing attribute slot 0 through as the clip-space position and filling fragments
/// with the color bound at uniform location 0.
pub struct SolidColorProgram;

impl Program for SolidColorProgram {
    fn vertex_shader(&self, args: &mut VertexShaderArgs<'_>) {
        *args.position = args.attribs[0];
    }

    fn fragment_shader(&self, args: &mut FragmentShaderArgs<'_>) -> FragmentResult {
        *args.color = args
            .uniforms
            .first()
            .map(|u| u.as_vec4())
            .unwrap_or(Vec4::ONE);
        FragmentResult::Accept
    }
}

/// Like [`SolidColorProgram`], but with a smooth color varying sourced from attribute slot 1.
pub struct VertexColorProgram;

impl Program for VertexColorProgram {
    fn pre_link(&self) -> ArrayVec<InterpolationQualifier, MAX_VARYINGS> {
        let mut iqs = ArrayVec::new();
        iqs.push(InterpolationQualifier::Smooth);
        iqs
    }

    fn vertex_shader(&self, args: &mut VertexShaderArgs<'_>) {
        *args.position = args.attribs[0];
        args.varyings[0] = args.attribs[1];
    }

    fn fragment_shader(&self, args: &mut FragmentShaderArgs<'_>) -> FragmentResult {
        *args.color = args.varyings[0].value;
        FragmentResult::Accept
    }
}

/// A program with a smooth UV varying from attribute slot 1, sampling texture unit 0.
pub struct TexturedProgram;

impl Program for TexturedProgram {
    fn pre_link(&self) -> ArrayVec<InterpolationQualifier, MAX_VARYINGS> {
        let mut iqs = ArrayVec::new();
        iqs.push(InterpolationQualifier::Smooth);
        iqs
    }

    fn vertex_shader(&self, args: &mut VertexShaderArgs<'_>) {
        *args.position = args.attribs[0];
        args.varyings[0] = args.attribs[1];
    }

    fn fragment_shader(&self, args: &mut FragmentShaderArgs<'_>) -> FragmentResult {
        use glimmer::Sampler2d;

        let uv = &args.varyings[0];
        *args.color = match args.sampler(0) {
            Some(sampler) => {
                // The uv derivatives drive minification-level selection.
                let sampler = sampler.with_gradients(uv.d_fdx.xy(), uv.d_fdy.xy());
                sampler.sample_at(uv.value.xy())
            }
            None => Vec4::new(1.0, 0.0, 1.0, 1.0),
        };
        FragmentResult::Accept
    }
}

/// Creates a single-threaded ARGB8888 context with an identity-style viewport over the whole
/// target, depth testing enabled and both buffers cleared.
pub fn test_context(width: i32, height: i32) -> RenderContext {
    // Logging output helps when a scenario fails; repeated initialization is fine to ignore.
    let _ = simple_logger::SimpleLogger::new().init();

    let mut ctx = RenderContext::new(width, height, PixelFormat::Argb8888, 0)
        .expect("context creation");
    assert!(ctx.make_current());

    ctx.set_clear_color(0.0, 0.0, 0.0, 1.0);
    ctx.set_clear_depth(1.0);
    ctx.clear_color_buffer();
    ctx.clear_depth_buffer();
    ctx
}

/// Maps a viewport coordinate on a `width` × `height` target to the NDC value that the viewport
/// transform sends there.
pub fn ndc_x(viewport_x: f32, width: i32) -> f32 {
    viewport_x / width as f32 * 2.0 - 1.0
}

/// See [`ndc_x`]; the y axis flips.
pub fn ndc_y(viewport_y: f32, height: i32) -> f32 {
    1.0 - viewport_y / height as f32 * 2.0
}

/// Builds the clip-space position for a viewport point at depth `viewport_z` (in `[0, 1]` with
/// the default depth range).
pub fn clip_position(ctx_size: (i32, i32), x: f32, y: f32, viewport_z: f32) -> Vec4 {
    Vec4::new(
        ndc_x(x, ctx_size.0),
        ndc_y(y, ctx_size.1),
        viewport_z * 2.0 - 1.0,
        1.0,
    )
}

/// Uploads positions to attribute slot 0 and returns the buffer id.
pub fn bind_positions(ctx: &mut RenderContext, positions: Vec<Vec4>) -> u32 {
    let id = ctx.create_attribute_buffer(positions);
    ctx.enable_attribute_buffer(id, 0);
    id
}
