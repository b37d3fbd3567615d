//! End-to-end pipeline scenarios: clear/readback, point, line, shared-edge triangles, depth,
//! blending and scissoring, each exercising the whole geometry front-end, rasterizer and output
//! merger on small offscreen targets.

mod common;

use glimmer_math::Vec4;

use common::{bind_positions, clip_position, test_context, SolidColorProgram, VertexColorProgram};
use glimmer::{
    BlendFactor, ComparisonFunc, PixelFormat, PrimitiveMode, RenderContext, StateFlag,
};

fn draw_solid(ctx: &mut RenderContext, positions: Vec<Vec4>, color: Vec4, mode: PrimitiveMode) {
    let shader = ctx.register_shader(Box::new(SolidColorProgram));
    assert!(ctx.bind_shader(shader));
    ctx.bind_uniform(0, color);

    let count = positions.len();
    let buffer = bind_positions(ctx, positions);
    ctx.draw_elements(count, mode);
    ctx.present();

    ctx.disable_attribute_buffer(buffer);
    ctx.delete_attribute_buffer(buffer);
    ctx.unregister_shader(shader);
}

/// Pixels whose color differs from the clear color.
fn touched_pixels(ctx: &RenderContext, clear: u32) -> Vec<(i32, i32)> {
    let mut out = Vec::new();
    for y in 0..ctx.height() {
        for x in 0..ctx.width() {
            if ctx.framebuffer().color.at(x, y) != clear {
                out.push((x, y));
            }
        }
    }
    out
}

#[test]
fn clear_and_read_back() {
    let mut ctx = test_context(4, 4);
    ctx.set_clear_color(0.0, 0.5, 0.0, 1.0);
    ctx.clear_color_buffer();
    ctx.present();

    // 0.5 × 255 truncates to 127.
    assert_eq!(ctx.framebuffer().color.at(0, 0), 0xff00_7f00);
}

#[test]
fn clear_is_idempotent() {
    let mut ctx = test_context(4, 4);
    ctx.set_clear_color(0.25, 0.5, 0.75, 1.0);

    ctx.clear_color_buffer();
    let first = ctx.framebuffer().color.data().to_vec();

    ctx.clear_color_buffer();
    assert_eq!(ctx.framebuffer().color.data(), &first[..]);
}

#[test]
fn point_inside_covers_exactly_one_pixel() {
    let mut ctx = test_context(4, 4);
    ctx.set_state(StateFlag::DepthTest, false);

    let position = clip_position((4, 4), 2.5, 2.5, 0.5);
    draw_solid(&mut ctx, vec![position], Vec4::ONE, PrimitiveMode::Points);

    assert_eq!(touched_pixels(&ctx, 0xff00_0000), vec![(2, 2)]);

    let (processed, _, _, _) = ctx.fragment_stats();
    assert_eq!(processed, 1);
}

#[test]
fn diagonal_line_follows_the_diamond_exit_rule() {
    let mut ctx = test_context(4, 4);
    ctx.set_state(StateFlag::DepthTest, false);

    let positions = vec![
        clip_position((4, 4), 0.5, 0.5, 0.5),
        clip_position((4, 4), 3.5, 3.5, 0.5),
    ];
    draw_solid(&mut ctx, positions, Vec4::ONE, PrimitiveMode::Lines);

    assert_eq!(
        touched_pixels(&ctx, 0xff00_0000),
        vec![(0, 0), (1, 1), (2, 2), (3, 3)]
    );
}

#[test]
fn zero_length_line_emits_nothing() {
    let mut ctx = test_context(4, 4);
    ctx.set_state(StateFlag::DepthTest, false);

    let p = clip_position((4, 4), 1.5, 1.5, 0.5);
    draw_solid(&mut ctx, vec![p, p], Vec4::ONE, PrimitiveMode::Lines);

    assert!(touched_pixels(&ctx, 0xff00_0000).is_empty());
}

#[test]
fn shared_edge_triangles_cover_each_pixel_once() {
    let mut ctx = test_context(4, 4);
    ctx.set_state(StateFlag::DepthTest, false);

    // Two triangles covering the full 4x4 quad, sharing the diagonal (4,0)-(0,4). Blending with
    // additive factors makes any double-covered pixel overshoot.
    ctx.set_state(StateFlag::Blend, true);
    ctx.set_blend_func(BlendFactor::One, BlendFactor::One);

    let positions = vec![
        clip_position((4, 4), 0.0, 0.0, 0.5),
        clip_position((4, 4), 4.0, 0.0, 0.5),
        clip_position((4, 4), 0.0, 4.0, 0.5),
        clip_position((4, 4), 4.0, 0.0, 0.5),
        clip_position((4, 4), 4.0, 4.0, 0.5),
        clip_position((4, 4), 0.0, 4.0, 0.5),
    ];
    let color = Vec4::new(0.25, 0.25, 0.25, 1.0);
    draw_solid(&mut ctx, positions, color, PrimitiveMode::Triangles);

    // Every pixel covered exactly once: one additive write over black.
    let expected = {
        let conv = ctx.framebuffer().converter;
        let base = conv.to_color(0xff00_0000);
        conv.to_pixel(Vec4::new(
            base.x + 0.25,
            base.y + 0.25,
            base.z + 0.25,
            1.0,
        ))
    };

    for y in 0..4 {
        for x in 0..4 {
            let pixel = ctx.framebuffer().color.at(x, y);
            let got = ctx.framebuffer().converter.to_color(pixel);
            assert!(
                (got.x - 0.25).abs() <= 2.0 / 255.0,
                "pixel ({x}, {y}) = {pixel:08x}, expected near {expected:08x}"
            );
        }
    }
}

#[test]
fn depth_test_orders_overlapping_triangles() {
    let mut ctx = test_context(8, 8);

    let full_screen = |z: f32| {
        vec![
            clip_position((8, 8), -8.0, -8.0, z),
            clip_position((8, 8), 24.0, -8.0, z),
            clip_position((8, 8), -8.0, 24.0, z),
        ]
    };

    let shader = ctx.register_shader(Box::new(SolidColorProgram));
    assert!(ctx.bind_shader(shader));

    // Far red triangle, then a near green one; with `less` the near one wins everywhere.
    let far = bind_positions(&mut ctx, full_screen(0.9));
    ctx.bind_uniform(0, Vec4::new(1.0, 0.0, 0.0, 1.0));
    ctx.draw_elements(3, PrimitiveMode::Triangles);

    ctx.disable_attribute_buffer(far);
    let near = bind_positions(&mut ctx, full_screen(0.1));
    ctx.bind_uniform(0, Vec4::new(0.0, 1.0, 0.0, 1.0));
    ctx.draw_elements(3, PrimitiveMode::Triangles);

    ctx.present();

    for y in 0..8 {
        for x in 0..8 {
            assert_eq!(
                ctx.framebuffer().color.at(x, y),
                0xff00_ff00,
                "pixel ({x}, {y})"
            );
        }
    }
    let _ = near;
}

#[test]
fn depth_funcs_pass_and_fail_are_absolute() {
    for (func, expect_drawn) in [(ComparisonFunc::Pass, true), (ComparisonFunc::Fail, false)] {
        let mut ctx = test_context(4, 4);
        ctx.set_depth_test(func);

        let positions = vec![
            clip_position((4, 4), -4.0, -4.0, 0.5),
            clip_position((4, 4), 12.0, -4.0, 0.5),
            clip_position((4, 4), -4.0, 12.0, 0.5),
        ];
        draw_solid(&mut ctx, positions, Vec4::ONE, PrimitiveMode::Triangles);

        let touched = !touched_pixels(&ctx, 0xff00_0000).is_empty();
        assert_eq!(touched, expect_drawn, "depth func {func:?}");
    }
}

#[test]
fn blend_over_averages_source_and_destination() {
    let mut ctx = test_context(4, 4);
    ctx.set_state(StateFlag::DepthTest, false);
    ctx.set_clear_color(1.0, 0.0, 0.0, 1.0);
    ctx.clear_color_buffer();

    ctx.set_state(StateFlag::Blend, true);
    ctx.set_blend_func(BlendFactor::SrcAlpha, BlendFactor::OneMinusSrcAlpha);

    let positions = vec![
        clip_position((4, 4), -4.0, -4.0, 0.5),
        clip_position((4, 4), 12.0, -4.0, 0.5),
        clip_position((4, 4), -4.0, 12.0, 0.5),
    ];
    draw_solid(
        &mut ctx,
        positions,
        Vec4::new(1.0, 1.0, 1.0, 0.5),
        PrimitiveMode::Triangles,
    );

    // 0.5 · white + 0.5 · red, within the byte-wise approximation's tolerance.
    let got = ctx
        .framebuffer()
        .converter
        .to_color(ctx.framebuffer().color.at(1, 1));
    assert!((got.x - 1.0).abs() <= 2.0 / 255.0, "red {}", got.x);
    assert!((got.y - 0.5).abs() <= 2.0 / 255.0, "green {}", got.y);
    assert!((got.z - 0.5).abs() <= 2.0 / 255.0, "blue {}", got.z);
}

#[test]
fn empty_scissor_box_clips_everything() {
    let mut ctx = test_context(4, 4);
    ctx.set_state(StateFlag::ScissorTest, true);
    ctx.set_scissor_box(0, 0, 0, 0);

    let positions = vec![
        clip_position((4, 4), -4.0, -4.0, 0.5),
        clip_position((4, 4), 12.0, -4.0, 0.5),
        clip_position((4, 4), -4.0, 12.0, 0.5),
    ];
    draw_solid(&mut ctx, positions, Vec4::ONE, PrimitiveMode::Triangles);

    assert!(touched_pixels(&ctx, 0xff00_0000).is_empty());
}

#[test]
fn smooth_varyings_interpolate_across_a_triangle() {
    let mut ctx = test_context(8, 8);
    ctx.set_state(StateFlag::DepthTest, false);

    let shader = ctx.register_shader(Box::new(VertexColorProgram));
    assert!(ctx.bind_shader(shader));

    let positions = bind_positions(
        &mut ctx,
        vec![
            clip_position((8, 8), -8.0, -8.0, 0.5),
            clip_position((8, 8), 24.0, -8.0, 0.5),
            clip_position((8, 8), -8.0, 24.0, 0.5),
        ],
    );
    let colors = ctx.create_attribute_buffer(vec![
        Vec4::new(1.0, 0.0, 0.0, 1.0),
        Vec4::new(0.0, 1.0, 0.0, 1.0),
        Vec4::new(0.0, 0.0, 1.0, 1.0),
    ]);
    ctx.enable_attribute_buffer(colors, 1);

    ctx.draw_elements(3, PrimitiveMode::Triangles);
    ctx.present();

    // Red dominates near the first vertex's corner, green towards +x, blue towards +y.
    let conv = ctx.framebuffer().converter;
    let near_v1 = conv.to_color(ctx.framebuffer().color.at(0, 0));
    let near_v2 = conv.to_color(ctx.framebuffer().color.at(7, 0));
    let near_v3 = conv.to_color(ctx.framebuffer().color.at(0, 7));

    assert!(near_v1.x > near_v1.y && near_v1.x > near_v1.z, "{near_v1:?}");
    assert!(near_v2.y > near_v2.x && near_v2.y > near_v2.z, "{near_v2:?}");
    assert!(near_v3.z > near_v3.x && near_v3.z > near_v3.y, "{near_v3:?}");
    let _ = positions;
}

#[test]
fn indexed_draws_match_direct_draws() {
    let mut ctx = test_context(4, 4);
    ctx.set_state(StateFlag::DepthTest, false);

    let shader = ctx.register_shader(Box::new(SolidColorProgram));
    assert!(ctx.bind_shader(shader));
    ctx.bind_uniform(0, Vec4::ONE);

    bind_positions(
        &mut ctx,
        vec![
            clip_position((4, 4), 0.0, 0.0, 0.5),
            clip_position((4, 4), 4.0, 0.0, 0.5),
            clip_position((4, 4), 0.0, 4.0, 0.5),
            clip_position((4, 4), 4.0, 4.0, 0.5),
        ],
    );
    let indices = ctx.create_index_buffer(vec![0, 1, 2, 1, 3, 2]);

    ctx.draw_indexed_elements(indices, PrimitiveMode::Triangles);
    ctx.present();

    // The two triangles tile the full target.
    assert_eq!(touched_pixels(&ctx, 0xff00_0000).len(), 16);
}

#[test]
fn present_empties_the_draw_list_and_keeps_handles_valid() {
    let mut ctx = test_context(4, 4);
    ctx.set_state(StateFlag::DepthTest, false);

    let shader = ctx.register_shader(Box::new(SolidColorProgram));
    assert!(ctx.bind_shader(shader));
    ctx.bind_uniform(0, Vec4::ONE);

    let vb = ctx.create_vertex_buffer(vec![Vec4::ONE]);
    let positions = bind_positions(
        &mut ctx,
        vec![
            clip_position((4, 4), 0.0, 0.0, 0.5),
            clip_position((4, 4), 4.0, 0.0, 0.5),
            clip_position((4, 4), 0.0, 4.0, 0.5),
        ],
    );

    ctx.draw_elements(3, PrimitiveMode::Triangles);
    ctx.present();
    let after_first = touched_pixels(&ctx, 0xff00_0000).len();
    assert!(after_first > 0);

    // A second present without new draws changes nothing.
    ctx.clear_color_buffer();
    ctx.present();
    assert!(touched_pixels(&ctx, 0xff00_0000).is_empty());

    // Handles survive presents.
    assert!(ctx.vertex_buffer(vb).is_some());
    ctx.draw_elements(3, PrimitiveMode::Triangles);
    ctx.present();
    assert_eq!(touched_pixels(&ctx, 0xff00_0000).len(), after_first);
    let _ = positions;
}

#[test]
fn multithreaded_present_matches_single_threaded() {
    let render = |threads: usize| -> Vec<u32> {
        let mut ctx = RenderContext::new(16, 16, PixelFormat::Argb8888, threads).unwrap();
        ctx.set_clear_color(0.0, 0.0, 0.0, 1.0);
        ctx.clear_color_buffer();
        ctx.clear_depth_buffer();

        let shader = ctx.register_shader(Box::new(SolidColorProgram));
        assert!(ctx.bind_shader(shader));

        // A stack of depth-sorted triangles; `less` with unique depths is order-independent.
        for (i, z) in [0.9f32, 0.7, 0.5, 0.3].iter().enumerate() {
            let extent = 16.0 - i as f32 * 3.0;
            let buffer = ctx.create_attribute_buffer(vec![
                clip_position((16, 16), 0.0, 0.0, *z),
                clip_position((16, 16), extent * 2.0, 0.0, *z),
                clip_position((16, 16), 0.0, extent * 2.0, *z),
            ]);
            ctx.enable_attribute_buffer(buffer, 0);
            ctx.bind_uniform(0, Vec4::new(*z, 1.0 - z, 0.25, 1.0));
            ctx.draw_elements(3, PrimitiveMode::Triangles);
        }

        ctx.present();
        ctx.framebuffer().color.data().to_vec()
    };

    assert_eq!(render(0), render(3));
}

#[test]
fn last_error_reports_and_clears() {
    let mut ctx = test_context(4, 4);
    assert_eq!(ctx.get_last_error(), glimmer::ErrorKind::None);

    ctx.delete_vertex_buffer(1234);
    assert_eq!(ctx.get_last_error(), glimmer::ErrorKind::InvalidValue);
    assert_eq!(ctx.get_last_error(), glimmer::ErrorKind::None);

    // Higher-order modes belong to the immediate-mode adapter.
    ctx.draw_elements(4, PrimitiveMode::Quads);
    assert_eq!(ctx.get_last_error(), glimmer::ErrorKind::InvalidOperation);
}

#[test]
fn textured_triangles_sample_the_bound_texture() {
    let mut ctx = test_context(8, 8);
    ctx.set_state(StateFlag::DepthTest, false);

    // A 2x2 texture: red / green / blue / white quadrants.
    let texture = ctx.create_texture();
    let texels: [u8; 16] = [
        0xff, 0x00, 0x00, 0xff, 0x00, 0xff, 0x00, 0xff, //
        0x00, 0x00, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff,
    ];
    ctx.set_image(texture, 0, 2, 2, PixelFormat::Rgba8888, &texels);
    assert_eq!(ctx.get_last_error(), glimmer::ErrorKind::None);

    ctx.set_state(StateFlag::Texture, true);
    ctx.active_texture(0);
    assert!(ctx.bind_texture(glimmer::TextureTarget::Texture2d, texture));
    ctx.set_texture_wrap_mode(texture, glimmer::WrapMode::ClampToEdge, glimmer::WrapMode::ClampToEdge);

    let shader = ctx.register_shader(Box::new(common::TexturedProgram));
    assert!(ctx.bind_shader(shader));

    // Two triangles over the full target, with UVs spanning [0, 1]^2.
    bind_positions(
        &mut ctx,
        vec![
            clip_position((8, 8), 0.0, 0.0, 0.5),
            clip_position((8, 8), 8.0, 0.0, 0.5),
            clip_position((8, 8), 0.0, 8.0, 0.5),
            clip_position((8, 8), 8.0, 0.0, 0.5),
            clip_position((8, 8), 8.0, 8.0, 0.5),
            clip_position((8, 8), 0.0, 8.0, 0.5),
        ],
    );
    let uvs = ctx.create_attribute_buffer(vec![
        Vec4::new(0.0, 0.0, 0.0, 0.0),
        Vec4::new(1.0, 0.0, 0.0, 0.0),
        Vec4::new(0.0, 1.0, 0.0, 0.0),
        Vec4::new(1.0, 0.0, 0.0, 0.0),
        Vec4::new(1.0, 1.0, 0.0, 0.0),
        Vec4::new(0.0, 1.0, 0.0, 0.0),
    ]);
    ctx.enable_attribute_buffer(uvs, 1);

    ctx.draw_elements(6, PrimitiveMode::Triangles);
    ctx.present();

    // Quadrant centers pick up the four texel colors.
    let conv = ctx.framebuffer().converter;
    let sample = |x, y| conv.to_color(ctx.framebuffer().color.at(x, y));

    let top_left = sample(1, 1);
    let top_right = sample(6, 1);
    let bottom_left = sample(1, 6);
    let bottom_right = sample(6, 6);

    assert!(top_left.x > 0.9 && top_left.y < 0.1, "{top_left:?}");
    assert!(top_right.y > 0.9 && top_right.x < 0.1, "{top_right:?}");
    assert!(bottom_left.z > 0.9 && bottom_left.x < 0.1, "{bottom_left:?}");
    assert!(
        bottom_right.x > 0.9 && bottom_right.y > 0.9 && bottom_right.z > 0.9,
        "{bottom_right:?}"
    );
}

#[test]
fn minification_samples_the_pre_supplied_level() {
    let mut ctx = test_context(8, 8);
    ctx.set_state(StateFlag::DepthTest, false);

    // Base level red, pre-supplied 1x1 level blue.
    let texture = ctx.create_texture();
    let red = [0xffu8, 0x00, 0x00, 0xff];
    let base: Vec<u8> = red.iter().copied().cycle().take(16).collect();
    ctx.set_image(texture, 0, 2, 2, PixelFormat::Rgba8888, &base);
    ctx.set_image(texture, 1, 1, 1, PixelFormat::Rgba8888, &[0x00, 0x00, 0xff, 0xff]);
    assert_eq!(ctx.get_last_error(), glimmer::ErrorKind::None);

    ctx.set_state(StateFlag::Texture, true);
    ctx.active_texture(0);
    assert!(ctx.bind_texture(glimmer::TextureTarget::Texture2d, texture));

    let shader = ctx.register_shader(Box::new(common::TexturedProgram));
    assert!(ctx.bind_shader(shader));

    // uv spans [0, 8] over 8 pixels: one uv step per pixel covers two texels of the 2x2 base,
    // which selects level 1.
    bind_positions(
        &mut ctx,
        vec![
            clip_position((8, 8), 0.0, 0.0, 0.5),
            clip_position((8, 8), 8.0, 0.0, 0.5),
            clip_position((8, 8), 0.0, 8.0, 0.5),
            clip_position((8, 8), 8.0, 0.0, 0.5),
            clip_position((8, 8), 8.0, 8.0, 0.5),
            clip_position((8, 8), 0.0, 8.0, 0.5),
        ],
    );
    let uvs = ctx.create_attribute_buffer(vec![
        Vec4::new(0.0, 0.0, 0.0, 0.0),
        Vec4::new(8.0, 0.0, 0.0, 0.0),
        Vec4::new(0.0, 8.0, 0.0, 0.0),
        Vec4::new(8.0, 0.0, 0.0, 0.0),
        Vec4::new(8.0, 8.0, 0.0, 0.0),
        Vec4::new(0.0, 8.0, 0.0, 0.0),
    ]);
    ctx.enable_attribute_buffer(uvs, 1);

    ctx.draw_elements(6, PrimitiveMode::Triangles);
    ctx.present();

    for y in 0..8 {
        for x in 0..8 {
            assert_eq!(
                ctx.framebuffer().color.at(x, y),
                0xff00_00ff,
                "pixel ({x}, {y})"
            );
        }
    }
}

/// Collects rows pushed through the host-surface interface.
struct CaptureSurface {
    width: u32,
    height: u32,
    rows: Vec<Vec<u32>>,
}

impl glimmer::HostSurface for CaptureSurface {
    fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn write_row(&mut self, y: u32, row: &[u32]) {
        assert_eq!(y as usize, self.rows.len());
        self.rows.push(row.to_vec());
    }
}

#[test]
fn copy_out_delivers_the_visible_rectangle() {
    let mut ctx = test_context(4, 4);
    ctx.set_clear_color(0.0, 0.5, 0.0, 1.0);
    ctx.clear_color_buffer();

    let mut surface = CaptureSurface {
        width: 4,
        height: 4,
        rows: Vec::new(),
    };
    ctx.copy_default_color_buffer(&mut surface);

    assert_eq!(surface.rows.len(), 4);
    for row in &surface.rows {
        assert_eq!(row.len(), 4);
        assert!(row.iter().all(|&p| p == 0xff00_7f00));
    }

    // The byte view covers the (aligned) color attachment.
    let bytes = ctx.framebuffer().color_bytes();
    assert_eq!(
        bytes.len(),
        (ctx.framebuffer().width() * ctx.framebuffer().height() * 4) as usize
    );
}

#[test]
fn depth_buffer_visualization_writes_grayscale() {
    let mut ctx = test_context(4, 4);
    ctx.set_clear_depth(1.0);
    ctx.clear_depth_buffer();

    ctx.display_depth_buffer();
    // Far plane everywhere renders as white.
    assert_eq!(ctx.framebuffer().color.at(0, 0), 0xffff_ffff);
}

#[test]
fn make_current_is_exclusive_per_thread() {
    let mut a = test_context(4, 4);
    let mut b = RenderContext::new(4, 4, PixelFormat::Argb8888, 0).unwrap();

    // `a` is current (test_context made it so); `b` cannot take over.
    assert!(a.is_current());
    assert!(!b.make_current());
    assert_eq!(b.get_last_error(), glimmer::ErrorKind::InvalidOperation);

    // Re-acquiring the current context is fine; releasing frees the slot.
    assert!(a.make_current());
    a.release_current();
    assert!(b.make_current());
    assert!(b.is_current());
}

#[test]
fn polygon_mode_line_draws_only_the_outline() {
    let mut ctx = test_context(8, 8);
    ctx.set_state(StateFlag::DepthTest, false);
    ctx.set_polygon_mode(glimmer::PolygonMode::Line);

    let positions = vec![
        clip_position((8, 8), 0.0, 0.0, 0.5),
        clip_position((8, 8), 8.0, 0.0, 0.5),
        clip_position((8, 8), 0.0, 8.0, 0.5),
    ];
    draw_solid(&mut ctx, positions, Vec4::ONE, PrimitiveMode::Triangles);

    let touched = touched_pixels(&ctx, 0xff00_0000);
    assert!(!touched.is_empty());
    // A pixel strictly inside the triangle and away from all three edges stays untouched.
    assert!(!touched.contains(&(1, 1)), "interior filled: {touched:?}");
}

#[test]
fn culling_rejects_and_accepts_by_mode() {
    use glimmer::CullFaceDirection;

    let draw_with = |cull: Option<CullFaceDirection>| -> usize {
        let mut ctx = test_context(4, 4);
        ctx.set_state(StateFlag::DepthTest, false);
        if let Some(mode) = cull {
            ctx.set_state(StateFlag::CullFace, true);
            ctx.set_cull_mode(mode);
        }

        let positions = vec![
            clip_position((4, 4), 0.0, 0.0, 0.5),
            clip_position((4, 4), 4.0, 0.0, 0.5),
            clip_position((4, 4), 0.0, 4.0, 0.5),
        ];
        draw_solid(&mut ctx, positions, Vec4::ONE, PrimitiveMode::Triangles);
        touched_pixels(&ctx, 0xff00_0000).len()
    };

    assert!(draw_with(None) > 0);
    assert_eq!(draw_with(Some(CullFaceDirection::FrontAndBack)), 0);

    // The triangle has one orientation, so exactly one of front/back culling removes it.
    let front = draw_with(Some(CullFaceDirection::Front));
    let back = draw_with(Some(CullFaceDirection::Back));
    assert!(
        (front == 0) != (back == 0),
        "front-culled: {front}, back-culled: {back}"
    );
}

#[test]
fn version_is_reported() {
    let (major, minor, patch) = glimmer::version();
    assert_eq!((major, minor, patch), glimmer::VERSION);
}
