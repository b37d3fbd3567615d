//! Clipper suites: preservation of interior geometry, boundary behavior and a randomized sweep
//! checking that every clipped output vertex satisfies the visibility inequalities.

use glimmer_math::Vec4;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use glimmer::clip::{clip_line_buffer, clip_triangle_buffer, ClipOutput};
use glimmer::geom::{Vertex, VertexFlags};
use glimmer::pipeline::set_clip_flags;

fn vertex(x: f32, y: f32, z: f32, w: f32) -> Vertex {
    let mut v = Vertex::new(Vec4::new(x, y, z, w));
    set_clip_flags(&mut v);
    v
}

fn assert_inside(v: &Vertex) {
    let c = v.coords;
    let eps = c.w.abs() * 1e-5 + 1e-5;
    assert!(
        c.x.abs() <= c.w + eps && c.y.abs() <= c.w + eps && c.z.abs() <= c.w + eps && c.w > 0.0,
        "clipped vertex escaped the frustum: {c:?}"
    );
}

#[test]
fn interior_triangles_pass_through_bit_for_bit() {
    let mut rng = StdRng::seed_from_u64(7);
    let mut out = Vec::new();

    for _ in 0..1000 {
        let w = rng.gen_range(1.0f32..10.0);
        let verts: Vec<Vertex> = (0..3)
            .map(|_| {
                vertex(
                    rng.gen_range(-0.99..0.99) * w,
                    rng.gen_range(-0.99..0.99) * w,
                    rng.gen_range(-0.99..0.99) * w,
                    w,
                )
            })
            .collect();

        assert!(verts
            .iter()
            .all(|v| !v.flags.contains(VertexFlags::CLIP_DISCARD)));

        clip_triangle_buffer(&verts, &[0, 1, 2], ClipOutput::TriangleList, &mut out);
        assert_eq!(out.len(), 3);
        for (a, b) in out.iter().zip(&verts) {
            assert_eq!(a.coords.as_array(), b.coords.as_array());
        }
    }
}

#[test]
fn randomized_triangles_stay_inside_the_frustum() {
    let mut rng = StdRng::seed_from_u64(42);
    let mut out = Vec::new();

    for _ in 0..2000 {
        let verts: Vec<Vertex> = (0..3)
            .map(|_| {
                vertex(
                    rng.gen_range(-6.0f32..6.0),
                    rng.gen_range(-6.0f32..6.0),
                    rng.gen_range(-6.0f32..6.0),
                    rng.gen_range(-2.0f32..4.0),
                )
            })
            .collect();

        clip_triangle_buffer(&verts, &[0, 1, 2], ClipOutput::TriangleList, &mut out);

        assert_eq!(out.len() % 3, 0);
        for v in &out {
            assert_inside(v);
        }
    }
}

#[test]
fn randomized_lines_stay_inside_the_frustum() {
    let mut rng = StdRng::seed_from_u64(1337);
    let mut out = Vec::new();

    for _ in 0..2000 {
        let verts: Vec<Vertex> = (0..2)
            .map(|_| {
                vertex(
                    rng.gen_range(-6.0f32..6.0),
                    rng.gen_range(-6.0f32..6.0),
                    rng.gen_range(-6.0f32..6.0),
                    rng.gen_range(-2.0f32..4.0),
                )
            })
            .collect();

        clip_line_buffer(&verts, &[0, 1], ClipOutput::LineList, &mut out);

        assert!(out.len() == 0 || out.len() == 2);
        for v in &out {
            assert_inside(v);
        }
        if let [_, end] = &out[..] {
            assert!(end.flags.contains(VertexFlags::STRIP_END));
        }
    }
}

#[test]
fn hull_overlap_with_all_vertices_outside_still_produces_output() {
    // Every vertex is far outside the frustum, yet the triangle covers it completely.
    let verts = vec![
        vertex(0.0, 10.0, 0.0, 1.0),
        vertex(10.0, -10.0, 0.0, 1.0),
        vertex(-10.0, -10.0, 0.0, 1.0),
    ];
    assert!(verts
        .iter()
        .all(|v| v.flags.contains(VertexFlags::CLIP_DISCARD)));

    let mut out = Vec::new();
    clip_triangle_buffer(&verts, &[0, 1, 2], ClipOutput::TriangleList, &mut out);

    assert!(!out.is_empty());
    assert_eq!(out.len() % 3, 0);
    for v in &out {
        assert_inside(v);
    }
}

#[test]
fn triangles_behind_the_eye_collapse() {
    let verts = vec![
        vertex(0.0, 0.0, 0.0, -1.0),
        vertex(1.0, 0.0, 0.0, -2.0),
        vertex(0.0, 1.0, 0.0, -1.5),
    ];

    let mut out = Vec::new();
    clip_triangle_buffer(&verts, &[0, 1, 2], ClipOutput::TriangleList, &mut out);
    assert!(out.is_empty());
}

#[test]
fn clustered_triangles_near_the_planes_stay_inside() {
    use rand_distr::{Distribution, Normal};

    // Gaussian clusters centered on the +x plane produce many edge-grazing configurations.
    let mut rng = StdRng::seed_from_u64(99);
    let around_plane = Normal::new(1.0f32, 0.25).unwrap();
    let spread = Normal::new(0.0f32, 0.5).unwrap();

    let mut out = Vec::new();
    for _ in 0..2000 {
        let verts: Vec<Vertex> = (0..3)
            .map(|_| {
                vertex(
                    around_plane.sample(&mut rng),
                    spread.sample(&mut rng),
                    spread.sample(&mut rng),
                    1.0,
                )
            })
            .collect();

        clip_triangle_buffer(&verts, &[0, 1, 2], ClipOutput::TriangleList, &mut out);

        assert_eq!(out.len() % 3, 0);
        for v in &out {
            assert_inside(v);
        }
    }
}

#[test]
fn too_few_vertices_produce_empty_output() {
    let verts = vec![vertex(0.0, 0.0, 0.0, 1.0), vertex(0.5, 0.0, 0.0, 1.0)];
    let mut out = Vec::new();

    // An index buffer that is not a whole number of triangles contributes nothing.
    clip_triangle_buffer(&verts, &[0, 1], ClipOutput::TriangleList, &mut out);
    assert!(out.is_empty());
}
