//! Damped orbit controls
//!
//! Input handlers only accumulate deltas. `update` is called once per frame by
//! the scheduler; it applies a `damping_factor` share of the pending motion
//! and decays the rest, so the camera glides to a stop after the mouse is
//! released.

use std::f32::consts::{PI, TAU};

use glam::Vec3;

use super::PerspectiveCamera;

/// Default share of the pending motion applied per frame
pub const DEFAULT_DAMPING_FACTOR: f32 = 0.05;

const MIN_POLAR: f32 = 1e-4;
const MAX_POLAR: f32 = PI - 1e-4;
const ZOOM_STEP: f32 = 0.95;
/// Below this the pending motion counts as settled
const SETTLE_EPSILON: f32 = 1e-5;

/// Spherical orbit around a target point with inertia
#[derive(Debug, Clone)]
pub struct OrbitControls {
    target: Vec3,
    /// Pending azimuth change, radians
    delta_theta: f32,
    /// Pending polar change, radians
    delta_phi: f32,
    /// Pending target offset in world units
    pan_offset: Vec3,
    /// Zoom multiplier applied on the next update
    scale: f32,
    damping_factor: f32,
    /// Radians per pixel, relative to a full turn per viewport height
    pub rotate_speed: f32,
    pub min_distance: f32,
    pub max_distance: f32,
}

impl OrbitControls {
    /// Orbit around whatever `camera` currently looks at
    pub fn new(camera: &PerspectiveCamera, damping_factor: f32) -> Self {
        Self {
            target: camera.target,
            delta_theta: 0.0,
            delta_phi: 0.0,
            pan_offset: Vec3::ZERO,
            scale: 1.0,
            damping_factor: damping_factor.clamp(0.001, 1.0),
            rotate_speed: 1.0,
            min_distance: 0.5,
            max_distance: 100.0,
        }
    }

    pub fn target(&self) -> Vec3 {
        self.target
    }

    /// Re-center the orbit and drop any pending motion
    pub fn set_target(&mut self, target: Vec3) {
        self.target = target;
        self.delta_theta = 0.0;
        self.delta_phi = 0.0;
        self.pan_offset = Vec3::ZERO;
        self.scale = 1.0;
    }

    /// Left-drag: orbit by a pixel delta
    pub fn on_mouse_drag(&mut self, delta: (f32, f32), viewport_height: f32) {
        let height = viewport_height.max(1.0);
        self.delta_theta -= TAU * delta.0 / height * self.rotate_speed;
        self.delta_phi -= TAU * delta.1 / height * self.rotate_speed;
    }

    /// Right-drag: move the target in the camera's screen plane
    pub fn on_pan_drag(&mut self, delta: (f32, f32), viewport_height: f32, camera: &PerspectiveCamera) {
        let height = viewport_height.max(1.0);
        let distance = (camera.position - self.target).length() * (camera.fov_y * 0.5).tan();

        let forward = camera.forward();
        let right = forward.cross(camera.up).normalize_or_zero();
        let up = right.cross(forward);

        self.pan_offset -= right * (2.0 * delta.0 * distance / height);
        self.pan_offset += up * (2.0 * delta.1 * distance / height);
    }

    /// Wheel: positive `delta` zooms in
    pub fn on_scroll(&mut self, delta: f32) {
        if delta > 0.0 {
            self.scale *= ZOOM_STEP;
        } else if delta < 0.0 {
            self.scale /= ZOOM_STEP;
        }
    }

    /// Advance damping one frame and write the result into `camera`
    pub fn update(&mut self, camera: &mut PerspectiveCamera) {
        let offset = camera.position - self.target;
        let radius = offset.length().max(f32::EPSILON);
        let mut theta = offset.x.atan2(offset.z);
        let mut phi = (offset.y / radius).clamp(-1.0, 1.0).acos();

        theta += self.delta_theta * self.damping_factor;
        phi = (phi + self.delta_phi * self.damping_factor).clamp(MIN_POLAR, MAX_POLAR);
        let radius = (radius * self.scale).clamp(self.min_distance, self.max_distance);
        self.target += self.pan_offset * self.damping_factor;

        let offset = Vec3::new(
            radius * phi.sin() * theta.sin(),
            radius * phi.cos(),
            radius * phi.sin() * theta.cos(),
        );
        camera.look_at(self.target + offset, self.target);

        let decay = 1.0 - self.damping_factor;
        self.delta_theta *= decay;
        self.delta_phi *= decay;
        self.pan_offset *= decay;
        self.scale = 1.0;
    }

    /// No pending motion left
    pub fn is_settled(&self) -> bool {
        self.delta_theta.abs() < SETTLE_EPSILON
            && self.delta_phi.abs() < SETTLE_EPSILON
            && self.pan_offset.length() < SETTLE_EPSILON
            && self.scale == 1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_idle_update_keeps_camera() {
        let mut camera = PerspectiveCamera::default();
        let mut controls = OrbitControls::new(&camera, DEFAULT_DAMPING_FACTOR);
        let before = camera.position;
        controls.update(&mut camera);
        assert!(camera.position.abs_diff_eq(before, 1e-5));
        assert!(controls.is_settled());
    }

    #[test]
    fn test_damping_converges() {
        let mut camera = PerspectiveCamera::default();
        let mut controls = OrbitControls::new(&camera, DEFAULT_DAMPING_FACTOR);
        let radius = camera.position.length();

        controls.on_mouse_drag((100.0, 0.0), 800.0);
        let mut last_step = f32::MAX;
        let mut previous = camera.position;
        for _ in 0..400 {
            controls.update(&mut camera);
            let step = camera.position.distance(previous);
            assert!(step <= last_step + 1e-5, "motion should only decay");
            last_step = step;
            previous = camera.position;
        }

        assert!(controls.is_settled());
        // Orbiting keeps the distance to the target
        assert!((camera.position.length() - radius).abs() < 1e-3);
        assert_eq!(camera.target, Vec3::ZERO);
    }

    #[test]
    fn test_total_rotation_matches_input() {
        let mut camera = PerspectiveCamera::default();
        camera.look_at(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO);
        let mut controls = OrbitControls::new(&camera, 0.5);

        // A quarter of the viewport height is a quarter turn
        controls.on_mouse_drag((-200.0, 0.0), 800.0);
        for _ in 0..60 {
            controls.update(&mut camera);
        }
        assert!(camera.position.abs_diff_eq(Vec3::new(5.0, 0.0, 0.0), 1e-3));
    }

    #[test]
    fn test_scroll_zooms_toward_target() {
        let mut camera = PerspectiveCamera::default();
        let mut controls = OrbitControls::new(&camera, DEFAULT_DAMPING_FACTOR);
        let before = camera.position.length();
        controls.on_scroll(1.0);
        controls.update(&mut camera);
        assert!((camera.position.length() - before * ZOOM_STEP).abs() < 1e-4);
    }

    #[test]
    fn test_polar_angle_stays_clamped() {
        let mut camera = PerspectiveCamera::default();
        let mut controls = OrbitControls::new(&camera, 1.0);
        controls.on_mouse_drag((0.0, 10_000.0), 100.0);
        controls.update(&mut camera);
        assert!(camera.position.is_finite());
        assert!(camera.position.y <= camera.position.length());
    }

    #[test]
    fn test_pan_moves_target() {
        let mut camera = PerspectiveCamera::default();
        let mut controls = OrbitControls::new(&camera, 1.0);
        controls.on_pan_drag((50.0, 0.0), 600.0, &camera);
        controls.update(&mut camera);
        // Dragging right moves the scene right, so the target moves left
        assert!(controls.target().x < 0.0);
        assert_eq!(camera.target, controls.target());
    }
}
