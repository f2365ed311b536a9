//! Perspective camera for the gallery
//!
//! Holds an explicit eye/target pair rather than spherical coordinates; the
//! orbit controls own the spherical state and write the result back here
//! once per tick.

use glam::{Mat4, Vec3};

/// Default vertical field of view, in degrees
pub const DEFAULT_FOV_Y_DEGREES: f32 = 75.0;

/// Perspective camera read by the hit tester, projector and renderer
#[derive(Debug, Clone, PartialEq)]
pub struct PerspectiveCamera {
    /// Eye position in world space
    pub position: Vec3,
    /// Point the camera looks at
    pub target: Vec3,
    /// World up direction
    pub up: Vec3,
    /// Vertical field of view in radians
    pub fov_y: f32,
    aspect: f32,
    /// Near clipping plane
    pub near: f32,
    /// Far clipping plane
    pub far: f32,
}

impl PerspectiveCamera {
    pub fn new(fov_y_degrees: f32, aspect: f32, near: f32, far: f32) -> Self {
        Self {
            position: Vec3::new(0.0, 1.0, 5.0),
            target: Vec3::ZERO,
            up: Vec3::Y,
            fov_y: fov_y_degrees.to_radians(),
            aspect: sanitize_aspect(aspect),
            near,
            far,
        }
    }

    /// Point the camera from `position` at `target`
    pub fn look_at(&mut self, position: Vec3, target: Vec3) {
        self.position = position;
        self.target = target;
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, self.up)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y, self.aspect, self.near, self.far)
    }

    /// Combined view-projection matrix
    pub fn view_projection_matrix(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// Clip space back to world space, used to unproject pointer rays
    pub fn inverse_view_projection(&self) -> Mat4 {
        self.view_projection_matrix().inverse()
    }

    /// Unit vector from the eye toward the target
    pub fn forward(&self) -> Vec3 {
        (self.target - self.position).normalize_or_zero()
    }

    /// Update aspect ratio on resize
    pub fn set_aspect(&mut self, aspect: f32) {
        self.aspect = sanitize_aspect(aspect);
    }

    pub fn aspect(&self) -> f32 {
        self.aspect
    }
}

impl Default for PerspectiveCamera {
    fn default() -> Self {
        Self::new(DEFAULT_FOV_Y_DEGREES, 16.0 / 9.0, 0.1, 1000.0)
    }
}

fn sanitize_aspect(aspect: f32) -> f32 {
    if aspect.is_finite() && aspect > 0.0 {
        aspect
    } else {
        1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_camera() {
        let camera = PerspectiveCamera::default();
        assert_eq!(camera.position, Vec3::new(0.0, 1.0, 5.0));
        assert_eq!(camera.target, Vec3::ZERO);
        assert!((camera.fov_y - 75f32.to_radians()).abs() < 1e-6);
        assert_eq!(camera.near, 0.1);
        assert_eq!(camera.far, 1000.0);
    }

    #[test]
    fn test_target_projects_to_center() {
        let mut camera = PerspectiveCamera::default();
        camera.look_at(Vec3::new(2.0, 3.0, 4.0), Vec3::new(-1.0, 0.5, -2.0));
        let clip = camera.view_projection_matrix().project_point3(camera.target);
        assert!(clip.x.abs() < 1e-5 && clip.y.abs() < 1e-5);
        assert!((0.0..=1.0).contains(&clip.z));
    }

    #[test]
    fn test_inverse_round_trips() {
        let camera = PerspectiveCamera::default();
        let point = Vec3::new(0.5, 0.25, -3.0);
        let ndc = camera.view_projection_matrix().project_point3(point);
        let back = camera.inverse_view_projection().project_point3(ndc);
        assert!(back.abs_diff_eq(point, 1e-3));
    }

    #[test]
    fn test_set_aspect_ignores_degenerate_values() {
        let mut camera = PerspectiveCamera::default();
        camera.set_aspect(2.0);
        assert_eq!(camera.aspect(), 2.0);
        camera.set_aspect(f32::NAN);
        assert_eq!(camera.aspect(), 1.0);
    }
}
