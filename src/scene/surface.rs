//! Plaque data model
//!
//! A `Surface` is one labeled, textured rectangle placed in world space.
//! Geometry is validated once, when the surface is built, so hit testing and
//! rendering never see degenerate rectangles.

use glam::{Mat4, Quat, Vec3};

use super::SurfaceError;

/// Opaque handle to a live texture supplied by the media collaborator.
///
/// The scene never looks inside it; the renderer resolves it back to a GPU
/// texture view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextureHandle(pub u32);

/// One labeled plaque in the gallery
#[derive(Debug, Clone, PartialEq)]
pub struct Surface {
    geometry_width: f32,
    geometry_height: f32,
    /// Center of the plaque in world space
    pub position: Vec3,
    /// Rotation about the world Y axis, in radians
    pub rotation_y: f32,
    /// Texture bound when rendering
    pub texture: TextureHandle,
    label: String,
    /// Hit-testable and visible from both faces
    pub double_sided: bool,
}

impl Surface {
    /// Build a plaque, rejecting non-positive or non-finite dimensions.
    pub fn new(
        geometry_width: f32,
        geometry_height: f32,
        position: Vec3,
        rotation_y: f32,
        texture: TextureHandle,
        label: impl Into<String>,
    ) -> Result<Self, SurfaceError> {
        let valid = |v: f32| v.is_finite() && v > 0.0;
        if !valid(geometry_width) || !valid(geometry_height) {
            return Err(SurfaceError::InvalidGeometry {
                width: geometry_width,
                height: geometry_height,
            });
        }

        Ok(Self {
            geometry_width,
            geometry_height,
            position,
            rotation_y,
            texture,
            label: label.into(),
            double_sided: true,
        })
    }

    /// Same plaque, visible and hit-testable from the front face only
    pub fn single_sided(mut self) -> Self {
        self.double_sided = false;
        self
    }

    pub fn geometry_width(&self) -> f32 {
        self.geometry_width
    }

    pub fn geometry_height(&self) -> f32 {
        self.geometry_height
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Local-to-world transform. The unit plaque lies in local XY, facing +Z.
    pub fn model_matrix(&self) -> Mat4 {
        Mat4::from_rotation_translation(Quat::from_rotation_y(self.rotation_y), self.position)
    }

    /// World-space direction the front face points at
    pub fn normal(&self) -> Vec3 {
        Quat::from_rotation_y(self.rotation_y) * Vec3::Z
    }

    /// Point the caption anchors to: the geometric middle of the plaque
    pub fn anchor(&self) -> Vec3 {
        self.position
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::{FRAC_PI_2, PI};

    #[test]
    fn test_rejects_non_positive_dimensions() {
        for (w, h) in [(0.0, 1.0), (1.0, 0.0), (-4.0, 2.25), (f32::NAN, 1.0), (1.0, f32::INFINITY)] {
            let result = Surface::new(w, h, Vec3::ZERO, 0.0, TextureHandle(0), "bad");
            assert!(
                matches!(result, Err(SurfaceError::InvalidGeometry { .. })),
                "{w}x{h} should be rejected"
            );
        }
    }

    #[test]
    fn test_defaults_to_double_sided() {
        let surface = Surface::new(4.0, 2.25, Vec3::ZERO, 0.0, TextureHandle(0), "a").unwrap();
        assert!(surface.double_sided);
        assert!(!surface.single_sided().double_sided);
    }

    #[test]
    fn test_normal_follows_rotation() {
        let facing = |rotation: f32| {
            Surface::new(1.0, 1.0, Vec3::ZERO, rotation, TextureHandle(0), "n")
                .unwrap()
                .normal()
        };
        assert!(facing(0.0).abs_diff_eq(Vec3::Z, 1e-6));
        assert!(facing(FRAC_PI_2).abs_diff_eq(Vec3::X, 1e-6));
        assert!(facing(PI).abs_diff_eq(-Vec3::Z, 1e-6));
    }

    #[test]
    fn test_anchor_is_center_regardless_of_rotation() {
        let position = Vec3::new(-6.0, 1.0, -3.0);
        let surface =
            Surface::new(4.0, 2.25, position, FRAC_PI_2, TextureHandle(3), "anchor").unwrap();
        assert_eq!(surface.anchor(), position);
        assert!(surface
            .model_matrix()
            .transform_point3(Vec3::ZERO)
            .abs_diff_eq(position, 1e-6));
    }
}
