//! The geometry front-end of the pipeline.
//!
//! For each draw-list entry, present runs: the vertex shader over all vertices, clip
//! preprocessing (marking vertices outside the view volume), clipping, the perspective divide
//! with viewport transform, and primitive assembly. The assembled primitives are drawn by the
//! rasterizer afterwards.

use glimmer_math::{lerp, Vec4};

use crate::geom::{Vertex, VertexFlags};
use crate::shader::{ProgramInfo, Uniform, VertexShaderArgs};

/// Sets the clipping marker on a vertex whose clip coordinates leave the view volume.
///
/// A visible vertex satisfies `-w <= x, y, z <= w` and `w > 0`.
pub fn set_clip_flags(vertex: &mut Vertex) {
    let c = vertex.coords;
    let outside = c.x < -c.w
        || c.x > c.w
        || c.y < -c.w
        || c.y > c.w
        || c.z < -c.w
        || c.z > c.w
        || c.w <= 0.0;

    if outside {
        vertex.flags.insert(VertexFlags::CLIP_DISCARD);
    }
}

/// Invokes the vertex shader on every vertex and sets the clipping markers.
///
/// Returns `true` when every vertex left the view volume, in which case the whole buffer can be
/// discarded without clipping.
pub(crate) fn invoke_vertex_shader_and_clip_preprocess(
    program: &ProgramInfo,
    uniforms: &[Uniform],
    vertices: &mut [Vertex],
) -> bool {
    let mut discard_buffer = true;

    for (vertex_id, vertex) in vertices.iter_mut().enumerate() {
        // Allocate space for the varyings and invoke the shader. It reads view coordinates from
        // the attributes and writes homogeneous clip coordinates.
        vertex.varyings.clear();
        for _ in 0..program.varying_count {
            vertex.varyings.push(Vec4::ZERO);
        }

        let mut point_size = 0.0;
        let mut args = VertexShaderArgs {
            vertex_id: vertex_id as i32,
            instance_id: 0,
            attribs: &vertex.attribs,
            uniforms,
            position: &mut vertex.coords,
            point_size: &mut point_size,
            varyings: &mut vertex.varyings,
        };
        program.program.vertex_shader(&mut args);

        set_clip_flags(vertex);
        if !vertex.flags.contains(VertexFlags::CLIP_DISCARD) {
            discard_buffer = false;
        }
    }

    discard_buffer
}

/// Transforms clip coordinates to viewport coordinates.
///
/// The perspective divide leaves `1 / w_clip` in `w`. Normalized device coordinates in `[-1, 1]`
/// map into the viewport rectangle; the y axis flips because raster y grows downwards, which
/// also flips primitive orientation. The z range `[-1, 1]` maps linearly to
/// `[z_near, z_far]`.
pub(crate) fn transform_to_viewport(
    vertices: &mut [Vertex],
    x: i32,
    y: i32,
    width: u32,
    height: u32,
    z_near: f32,
    z_far: f32,
) {
    let (x, y) = (x as f32, y as f32);
    let (width, height) = (width as f32, height as f32);

    for vertex in vertices {
        vertex.coords.divide_by_w();

        let viewport_x = (1.0 + vertex.coords.x) * 0.5 * width + x;
        let viewport_y = (1.0 - vertex.coords.y) * 0.5 * height + y;
        let viewport_z = lerp(0.5 * (1.0 + vertex.coords.z), z_near, z_far);

        vertex.coords = Vec4::new(viewport_x, viewport_y, viewport_z, vertex.coords.w);
    }
}
