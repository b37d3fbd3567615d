//! Primitive assembly.
//!
//! Takes the clipped vertex list of a draw call and hands base primitives (points, lines,
//! triangles) to the rasterizer. Face culling happens here: filled triangles via the signed-area
//! orientation test, line-mode polygons via a convexity/orientation scan over the rebuilt strip.

use std::sync::Arc;

use glimmer_math::Vec2;

use crate::cull::{cull_reject, face_orientation};
use crate::geom::{Vertex, VertexFlags};
use crate::raster::SweepRasterizer;
use crate::states::{CullFaceDirection, FrontFaceOrientation, PolygonMode, PrimitiveMode, StateSnapshot};

/// Orientation of a polygon in the viewport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PolyOrientation {
    NotConvex,
    Degenerate,
    Clockwise,
    CounterClockwise,
}

/// Finds the end of the polygon starting at `start`: the next vertex carrying the
/// [`STRIP_END`][VertexFlags::STRIP_END] marker.
fn next_polygon_end(buffer: &[Vertex], start: usize) -> Option<usize> {
    (start..buffer.len()).find(|&i| buffer[i].flags.contains(VertexFlags::STRIP_END))
}

#[inline]
fn area_sign(v1: Vec2, v2: Vec2, v3: Vec2) -> i32 {
    (v2 - v1).area_sign(&(v3 - v1))
}

/// Calculates the orientation of a convex 2D polygon `buffer[start..=end]` from its raster
/// coordinates. Detects non-convex and degenerate inputs.
fn convex_polygon_orientation(buffer: &[Vertex], start: usize, end: usize) -> PolyOrientation {
    debug_assert!(end < buffer.len());

    // A non-degenerate polygon needs at least 3 vertices.
    if start + 2 > end {
        return PolyOrientation::Degenerate;
    }

    let mut positive = 0;
    let mut negative = 0;

    let mut corner = |s: i32| {
        positive += (s > 0) as i32;
        negative += (s < 0) as i32;
    };

    for i in start..=end - 2 {
        corner(area_sign(
            buffer[i].coords.xy(),
            buffer[i + 1].coords.xy(),
            buffer[i + 2].coords.xy(),
        ));
    }

    // The loop misses the two wrap-around corners.
    corner(area_sign(
        buffer[end - 1].coords.xy(),
        buffer[end].coords.xy(),
        buffer[start].coords.xy(),
    ));
    corner(area_sign(
        buffer[end].coords.xy(),
        buffer[start].coords.xy(),
        buffer[start + 1].coords.xy(),
    ));

    match (positive > 0, negative > 0) {
        (true, false) => PolyOrientation::Clockwise,
        (false, true) => PolyOrientation::CounterClockwise,
        (true, true) => PolyOrientation::NotConvex,
        (false, false) => PolyOrientation::Degenerate,
    }
}

/// Decides whether to cull a polygon with a known orientation.
fn face_cull_polygon(
    front_face: FrontFaceOrientation,
    cull_mode: CullFaceDirection,
    orientation: PolyOrientation,
) -> bool {
    if cull_mode == CullFaceDirection::FrontAndBack {
        return true;
    }

    let is_front = matches!(
        (front_face, orientation),
        (FrontFaceOrientation::Cw, PolyOrientation::Clockwise)
            | (FrontFaceOrientation::Ccw, PolyOrientation::CounterClockwise)
    );

    match cull_mode {
        CullFaceDirection::Front => is_front,
        CullFaceDirection::Back => !is_front,
        CullFaceDirection::FrontAndBack => true,
    }
}

/// Assembles base primitives from a clipped vertex buffer and stores them in the rasterizer.
pub fn assemble_primitives(
    rasterizer: &mut SweepRasterizer,
    snapshot: &Arc<StateSnapshot>,
    mode: PrimitiveMode,
    buffer: &[Vertex],
) {
    let states = &snapshot.states;

    if mode == PrimitiveMode::Points || states.poly_mode == PolygonMode::Point {
        for vertex in buffer {
            rasterizer.add_point(snapshot, vertex.clone());
        }
        return;
    }

    if mode == PrimitiveMode::Lines {
        for pair in buffer.chunks_exact(2) {
            rasterizer.add_line(snapshot, pair[0].clone(), pair[1].clone());
        }
        return;
    }

    debug_assert_eq!(mode, PrimitiveMode::Triangles);
    if buffer.len() < 3 {
        return;
    }

    match states.poly_mode {
        PolygonMode::Line => {
            // Rebuild the polygons the clipper flattened into the buffer and draw their
            // outlines as closed line strips.
            let mut first = 0;
            while first < buffer.len() {
                let Some(last) = next_polygon_end(buffer, first) else {
                    break;
                };

                if states.culling_enabled {
                    let orientation = convex_polygon_orientation(buffer, first, last);
                    if orientation == PolyOrientation::NotConvex
                        || orientation == PolyOrientation::Degenerate
                        || face_cull_polygon(states.front_face, states.cull_mode, orientation)
                    {
                        first = last + 1;
                        continue;
                    }
                }

                for i in first..last {
                    rasterizer.add_line(snapshot, buffer[i].clone(), buffer[i + 1].clone());
                }
                // Close the strip.
                rasterizer.add_line(snapshot, buffer[last].clone(), buffer[first].clone());

                first = last + 1;
            }
        }
        PolygonMode::Fill => {
            for tri in buffer.chunks_exact(3) {
                let orientation = face_orientation(
                    states.front_face,
                    tri[0].coords.xy(),
                    tri[1].coords.xy(),
                    tri[2].coords.xy(),
                );
                let is_front_facing = orientation == CullFaceDirection::Front;

                if states.culling_enabled && cull_reject(states.cull_mode, orientation) {
                    continue;
                }

                rasterizer.add_triangle(
                    snapshot,
                    is_front_facing,
                    tri[0].clone(),
                    tri[1].clone(),
                    tri[2].clone(),
                );
            }
        }
        PolygonMode::Point => unreachable!("handled above"),
    }
}
