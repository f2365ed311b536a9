//! World to screen projection for caption anchoring

use glam::{Vec2, Vec3};

use super::{PerspectiveCamera, ViewportSize};

/// Project a world point into viewport pixels, origin top-left, Y down.
///
/// Points behind the camera are not special-cased; the perspective divide
/// mirrors them and the caller gets whatever the projection says.
pub fn project(world: Vec3, camera: &PerspectiveCamera, viewport: ViewportSize) -> Vec2 {
    let ndc = camera.view_projection_matrix().project_point3(world);
    Vec2::new(
        (ndc.x * 0.5 + 0.5) * viewport.width as f32,
        (-ndc.y * 0.5 + 0.5) * viewport.height as f32,
    )
}
