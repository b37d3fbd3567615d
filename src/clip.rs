//! Clipping in homogeneous coordinates.
//!
//! A visible vertex satisfies
//!
//! ```text
//! -w <= x <= w
//! -w <= y <= w
//! -w <= z <= w
//!   0 <  w
//! ```
//!
//! Triangles are clipped Sutherland–Hodgman-style: first against the plane `w = 1` (a positive
//! offset avoids dividing by zero in the later perspective divide), then against the six frustum
//! planes `±x = w`, `±y = w`, `±z = w` in sequence. Each pass rewrites the polygon with a
//! previous/current vertex scan, introducing a vertex wherever the inside test changes.
//!
//! For determinism across triangles sharing an edge, the interpolation parameter is always
//! computed with the *inside* vertex first, so both triangles derive bit-identical intersection
//! points regardless of their winding around the shared edge.

use crate::geom::{lerp_vertex, Vertex, VertexFlags};

/// Output primitive layouts of the clipper.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClipOutput {
    /// Emit the clipped vertices as a list of points.
    PointList,
    /// Emit line segments; each segment's terminal vertex is flagged
    /// [`STRIP_END`][VertexFlags::STRIP_END].
    LineList,
    /// Emit a triangle list, fanning clipped polygons from their first vertex.
    TriangleList,
}

/// Offset of the `w` clipping plane. Clipping against `w = 1` instead of `w = 0` keeps clip-space
/// `w` bounded away from zero for the perspective divide.
const W_CLIPPING_PLANE: f32 = 1.0;

/// Signed distances to the seven clip planes; a vertex is inside a plane when its distance is
/// non-negative.
const PLANE_COUNT: usize = 7;

#[inline]
fn plane_distance(plane: usize, v: &Vertex) -> f32 {
    let c = v.coords;
    match plane {
        0 => c.w - W_CLIPPING_PLANE,
        1 => c.w - c.x,
        2 => c.w + c.x,
        3 => c.w - c.y,
        4 => c.w + c.y,
        5 => c.w - c.z,
        _ => c.w + c.z,
    }
}

/// Clips the intersection vertex of an edge crossing a plane, naming the inside vertex first so
/// shared edges resolve identically in adjacent triangles.
#[inline]
fn intersect(plane: usize, inside: &Vertex, outside: &Vertex) -> Vertex {
    let d_in = plane_distance(plane, inside);
    let d_out = plane_distance(plane, outside);
    let t = d_in / (d_in - d_out);
    debug_assert!((0.0..=1.0).contains(&t));
    lerp_vertex(t, inside, outside)
}

/// One Sutherland–Hodgman pass of `input` against a single plane.
fn clip_polygon_on_plane(plane: usize, input: &[Vertex], out: &mut Vec<Vertex>) {
    out.clear();
    let Some(mut prev) = input.last() else {
        return;
    };
    let mut prev_inside = plane_distance(plane, prev) >= 0.0;

    for vert in input {
        let inside = plane_distance(plane, vert) >= 0.0;

        if inside != prev_inside {
            let (in_v, out_v) = if prev_inside { (prev, vert) } else { (vert, prev) };
            out.push(intersect(plane, in_v, out_v));
        }
        if inside {
            out.push(vert.clone());
        }

        prev = vert;
        prev_inside = inside;
    }
}

/// Clips a single segment against all planes. Returns `None` when the segment leaves the
/// frustum entirely.
fn clip_segment(a: &Vertex, b: &Vertex) -> Option<(Vertex, Vertex)> {
    let mut va = a.clone();
    let mut vb = b.clone();

    for plane in 0..PLANE_COUNT {
        let da = plane_distance(plane, &va);
        let db = plane_distance(plane, &vb);

        if da < 0.0 && db < 0.0 {
            return None;
        }
        if da < 0.0 {
            va = intersect(plane, &vb, &va);
        } else if db < 0.0 {
            vb = intersect(plane, &va, &vb);
        }
    }

    Some((va, vb))
}

/// Scratch buffers for polygon clipping, reused across triangles of a draw call.
#[derive(Default)]
struct ClipScratch {
    polygon: Vec<Vertex>,
    temp: Vec<Vertex>,
}

impl ClipScratch {
    /// Clips the triangle `(v1, v2, v3)` against all planes; the result is left in
    /// `self.polygon`.
    fn clip_triangle(&mut self, v1: &Vertex, v2: &Vertex, v3: &Vertex) {
        self.polygon.clear();
        self.polygon.push(v1.clone());
        self.polygon.push(v2.clone());
        self.polygon.push(v3.clone());

        for plane in 0..PLANE_COUNT {
            clip_polygon_on_plane(plane, &self.polygon, &mut self.temp);
            core::mem::swap(&mut self.polygon, &mut self.temp);
            if self.polygon.is_empty() {
                return;
            }
        }
    }
}

fn emit_clipped(polygon: &[Vertex], output_type: ClipOutput, out: &mut Vec<Vertex>) {
    match output_type {
        ClipOutput::PointList => out.extend_from_slice(polygon),
        ClipOutput::LineList if polygon.len() >= 2 => {
            out.extend_from_slice(polygon);
            out.last_mut().unwrap().flags.insert(VertexFlags::STRIP_END);
        }
        ClipOutput::TriangleList if polygon.len() >= 3 => {
            // A clipped triangle is convex by construction, so it fans from any vertex.
            let center = &polygon[0];
            for pair in polygon[1..].windows(2) {
                out.push(center.clone());
                out.push(pair[0].clone());
                out.push(pair[1].clone());
            }
        }
        _ => {}
    }
}

/// Clips a vertex/index buffer pair holding a triangle list.
///
/// Triangles whose vertices all carry no [`CLIP_DISCARD`][VertexFlags::CLIP_DISCARD] marker are
/// passed through bit-for-bit; the rest run the plane pipeline. Produces an empty output for an
/// empty index buffer or when every triangle collapses.
pub fn clip_triangle_buffer(
    vertices: &[Vertex],
    indices: &[u32],
    output_type: ClipOutput,
    out: &mut Vec<Vertex>,
) {
    out.clear();
    out.reserve(indices.len());

    let mut scratch = ClipScratch::default();

    for tri in indices.chunks_exact(3) {
        let (Some(v1), Some(v2), Some(v3)) = (
            vertices.get(tri[0] as usize),
            vertices.get(tri[1] as usize),
            vertices.get(tri[2] as usize),
        ) else {
            continue;
        };

        let needs_clip = [v1, v2, v3]
            .iter()
            .any(|v| v.flags.contains(VertexFlags::CLIP_DISCARD));

        if needs_clip {
            scratch.clip_triangle(v1, v2, v3);
            emit_clipped(&scratch.polygon, output_type, out);
        } else {
            out.push(v1.clone());
            out.push(v2.clone());
            out.push(v3.clone());
            if output_type == ClipOutput::LineList {
                out.last_mut().unwrap().flags.insert(VertexFlags::STRIP_END);
            }
        }
    }
}

/// Clips a vertex/index buffer pair holding a line list (consecutive index pairs).
///
/// Surviving segments are emitted as two vertices each, the second flagged
/// [`STRIP_END`][VertexFlags::STRIP_END].
pub fn clip_line_buffer(
    vertices: &[Vertex],
    indices: &[u32],
    output_type: ClipOutput,
    out: &mut Vec<Vertex>,
) {
    out.clear();

    for pair in indices.chunks_exact(2) {
        let (Some(a), Some(b)) = (
            vertices.get(pair[0] as usize),
            vertices.get(pair[1] as usize),
        ) else {
            continue;
        };

        let needs_clip = a.flags.contains(VertexFlags::CLIP_DISCARD)
            || b.flags.contains(VertexFlags::CLIP_DISCARD);

        let segment = if needs_clip {
            clip_segment(a, b)
        } else {
            Some((a.clone(), b.clone()))
        };

        if let Some((va, mut vb)) = segment {
            match output_type {
                ClipOutput::PointList | ClipOutput::LineList => {
                    if output_type == ClipOutput::LineList {
                        vb.flags.insert(VertexFlags::STRIP_END);
                    }
                    out.push(va);
                    out.push(vb);
                }
                ClipOutput::TriangleList => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use glimmer_math::Vec4;

    use super::*;
    use crate::pipeline::set_clip_flags;

    fn vertex(x: f32, y: f32, z: f32, w: f32) -> Vertex {
        Vertex::new(Vec4::new(x, y, z, w))
    }

    fn flagged(mut v: Vertex) -> Vertex {
        set_clip_flags(&mut v);
        v
    }

    #[test]
    fn empty_input_produces_empty_output() {
        let mut out = vec![vertex(0.0, 0.0, 0.0, 1.0)];

        for output_type in [
            ClipOutput::PointList,
            ClipOutput::LineList,
            ClipOutput::TriangleList,
        ] {
            clip_triangle_buffer(&[], &[], output_type, &mut out);
            assert!(out.is_empty());

            clip_line_buffer(&[], &[], output_type, &mut out);
            assert!(out.is_empty());
        }
    }

    #[test]
    fn interior_triangle_is_preserved_bit_for_bit() {
        let vertices: Vec<Vertex> = [
            vertex(0.25, 0.5, 0.0, 2.0),
            vertex(-0.5, 0.125, 0.25, 2.0),
            vertex(0.0, -0.75, -0.5, 2.0),
        ]
        .into_iter()
        .map(flagged)
        .collect();

        let mut out = Vec::new();
        clip_triangle_buffer(&vertices, &[0, 1, 2], ClipOutput::TriangleList, &mut out);

        assert_eq!(out.len(), 3);
        for (a, b) in out.iter().zip(&vertices) {
            assert_eq!(a.coords.as_array(), b.coords.as_array());
        }
    }

    #[test]
    fn fully_outside_triangle_collapses() {
        // All vertices behind the w plane.
        let vertices: Vec<Vertex> = [
            vertex(0.0, 0.0, 0.0, 0.5),
            vertex(1.0, 0.0, 0.0, 0.5),
            vertex(0.0, 1.0, 0.0, 0.5),
        ]
        .into_iter()
        .map(flagged)
        .collect();

        let mut out = Vec::new();
        clip_triangle_buffer(&vertices, &[0, 1, 2], ClipOutput::TriangleList, &mut out);
        assert!(out.is_empty());
    }

    #[test]
    fn straddling_triangle_yields_clipped_polygon() {
        // One vertex far outside +x.
        let vertices: Vec<Vertex> = [
            vertex(0.0, -0.5, 0.0, 1.5),
            vertex(4.0, 0.0, 0.0, 1.5),
            vertex(0.0, 0.5, 0.0, 1.5),
        ]
        .into_iter()
        .map(flagged)
        .collect();

        let mut out = Vec::new();
        clip_triangle_buffer(&vertices, &[0, 1, 2], ClipOutput::TriangleList, &mut out);

        assert!(!out.is_empty());
        assert_eq!(out.len() % 3, 0);
        for v in &out {
            assert!(v.coords.x <= v.coords.w + 1e-4);
        }
        assert!(out
            .iter()
            .any(|v| v.flags.contains(VertexFlags::INTERPOLATED)));
    }

    #[test]
    fn shared_edge_intersections_are_bitwise_identical() {
        // Two triangles sharing the edge (a, b), wound in opposite directions around it, with
        // the edge crossing the +x plane.
        let a = flagged(vertex(0.5, -1.0, 0.0, 1.5));
        let b = flagged(vertex(3.0, 1.0, 0.0, 1.5));
        let c = flagged(vertex(-0.5, 0.0, 0.0, 1.5));
        let d = flagged(vertex(0.5, 1.25, 0.0, 1.5));

        let mut out1 = Vec::new();
        let mut out2 = Vec::new();
        clip_triangle_buffer(
            &[a.clone(), b.clone(), c],
            &[0, 1, 2],
            ClipOutput::TriangleList,
            &mut out1,
        );
        clip_triangle_buffer(&[b, a, d], &[0, 1, 2], ClipOutput::TriangleList, &mut out2);

        let on_plane =
            |v: &&Vertex| v.flags.contains(VertexFlags::INTERPOLATED) && (v.coords.x - v.coords.w).abs() < 1e-5;
        let points1: Vec<[f32; 4]> = out1.iter().filter(on_plane).map(|v| *v.coords.as_array()).collect();
        let points2: Vec<[f32; 4]> = out2.iter().filter(on_plane).map(|v| *v.coords.as_array()).collect();

        // The shared edge (a, b) crosses the plane once; both triangles must compute that
        // intersection bitwise identically. (Each list also holds intersections of its own
        // non-shared edges.)
        assert!(!points1.is_empty() && !points2.is_empty());
        assert!(
            points1.iter().any(|p| points2.contains(p)),
            "no bitwise-shared intersection between {points1:?} and {points2:?}"
        );
    }

    #[test]
    fn varyings_are_interpolated_at_introduced_vertices() {
        let mut a = vertex(0.0, 0.0, 0.0, 2.0);
        let mut b = vertex(6.0, 0.0, 0.0, 2.0);
        a.varyings.push(Vec4::splat(0.0));
        b.varyings.push(Vec4::splat(1.0));
        let a = flagged(a);
        let b = flagged(b);

        let mut out = Vec::new();
        clip_line_buffer(&[a, b], &[0, 1], ClipOutput::LineList, &mut out);

        assert_eq!(out.len(), 2);
        let end = &out[1];
        assert!(end.flags.contains(VertexFlags::STRIP_END));
        // The segment is cut at x = w = 2, a third of the way along.
        assert!((end.coords.x - 2.0).abs() < 1e-5);
        assert!((end.varyings[0].x - 1.0 / 3.0).abs() < 1e-5);
    }

    #[test]
    fn line_list_marks_every_segment_end() {
        let verts: Vec<Vertex> = [
            vertex(0.0, 0.0, 0.0, 2.0),
            vertex(1.0, 0.0, 0.0, 2.0),
            vertex(0.0, 1.0, 0.0, 2.0),
        ]
        .into_iter()
        .map(flagged)
        .collect();

        let mut out = Vec::new();
        clip_triangle_buffer(&verts, &[0, 1, 2], ClipOutput::LineList, &mut out);
        assert_eq!(out.len(), 3);
        assert!(out[2].flags.contains(VertexFlags::STRIP_END));
    }
}
