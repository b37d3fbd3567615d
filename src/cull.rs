//! Face orientation and culling.

use glimmer_math::Vec2;

use crate::states::{CullFaceDirection, FrontFaceOrientation};

/// Orientation of a primitive in the viewport: front- or back-facing.
pub type FaceOrientation = CullFaceDirection;

/// Determines whether the triangle `(v1, v2, v3)` is front-facing in viewport coordinates.
///
/// The viewport transform flips the y axis, which flips the winding: under the default
/// counter-clockwise front-face convention a front-facing triangle has non-positive signed area
/// here.
pub fn face_orientation(
    front_face: FrontFaceOrientation,
    v1: Vec2,
    v2: Vec2,
    v3: Vec2,
) -> FaceOrientation {
    let area_sign = (v2 - v1).area_sign(&(v3 - v1));

    let is_front = match front_face {
        FrontFaceOrientation::Cw => area_sign >= 0,
        FrontFaceOrientation::Ccw => area_sign <= 0,
    };

    if is_front {
        CullFaceDirection::Front
    } else {
        CullFaceDirection::Back
    }
}

/// Returns `true` if a face with the given orientation is rejected under `mode`.
pub fn cull_reject(mode: CullFaceDirection, orientation: FaceOrientation) -> bool {
    mode == CullFaceDirection::FrontAndBack || mode == orientation
}
