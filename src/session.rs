//! The gallery session: everything one running gallery owns
//!
//! Pointer, resize and tick events come in as explicit calls with explicit
//! payloads. Nothing here touches the GPU or the window.

use glam::{Vec2, Vec3};

use crate::media::MediaProvider;
use crate::scene::{
    HoverController, LabelOverlay, OrbitControls, PerspectiveCamera, RenderOutput, Surface,
    SurfaceError, SurfaceHandle, SurfaceRegistry, ViewportSize, ViewportSync,
};
use crate::settings::{CameraSettings, Placement};

/// Scene state for one gallery window
#[derive(Debug)]
pub struct GallerySession {
    registry: SurfaceRegistry,
    camera: PerspectiveCamera,
    controls: OrbitControls,
    hover: HoverController,
    viewport: ViewportSync,
}

impl GallerySession {
    /// Build the scene from a placement list.
    ///
    /// Fails on the first plaque with invalid geometry.
    pub fn new(
        placements: &[Placement],
        camera_settings: &CameraSettings,
        media: &mut dyn MediaProvider,
        viewport: ViewportSize,
    ) -> Result<Self, SurfaceError> {
        let mut registry = SurfaceRegistry::new();
        for placement in placements {
            let texture = media.texture_for(&placement.media);
            let mut surface = Surface::new(
                placement.width,
                placement.height,
                placement.position.into(),
                placement.rotation_y,
                texture,
                placement.label.as_str(),
            )?;
            surface.double_sided = placement.double_sided;
            registry.add(surface)?;
        }

        let mut camera = PerspectiveCamera::new(
            camera_settings.fov_y,
            viewport.aspect(),
            camera_settings.near,
            camera_settings.far,
        );
        camera.look_at(camera_settings.position.into(), camera_settings.target.into());
        let controls = OrbitControls::new(&camera, camera_settings.damping_factor);

        tracing::info!(plaques = registry.len(), "Gallery scene ready");

        Ok(Self {
            registry,
            camera,
            controls,
            hover: HoverController::new(),
            viewport: ViewportSync::new(viewport),
        })
    }

    /// Hit test and project for a pointer at `pointer` (viewport pixels)
    pub fn pointer_moved(&mut self, pointer: Vec2) -> Option<SurfaceHandle> {
        self.hover
            .pointer_moved(pointer, self.viewport.current(), &self.camera, &self.registry)
    }

    /// Resize camera projection and render output together
    pub fn resize(&mut self, size: ViewportSize, output: &mut dyn RenderOutput) -> bool {
        self.viewport.apply(size, &mut self.camera, output)
    }

    /// Per-frame update: advance orbit damping. Never hit-tests.
    pub fn tick(&mut self) {
        self.controls.update(&mut self.camera);
    }

    /// Left-drag by a pixel delta
    pub fn orbit(&mut self, delta: Vec2) {
        let height = self.viewport.current().height as f32;
        self.controls.on_mouse_drag((delta.x, delta.y), height);
    }

    /// Right-drag by a pixel delta
    pub fn pan(&mut self, delta: Vec2) {
        let height = self.viewport.current().height as f32;
        self.controls
            .on_pan_drag((delta.x, delta.y), height, &self.camera);
    }

    /// Wheel; positive zooms in
    pub fn zoom(&mut self, delta: f32) {
        self.controls.on_scroll(delta);
    }

    /// Place the camera and re-center the orbit on `target`
    pub fn look_at(&mut self, position: Vec3, target: Vec3) {
        self.camera.look_at(position, target);
        self.controls.set_target(target);
    }

    pub fn registry(&self) -> &SurfaceRegistry {
        &self.registry
    }

    pub fn camera(&self) -> &PerspectiveCamera {
        &self.camera
    }

    pub fn overlay(&self) -> &LabelOverlay {
        self.hover.overlay()
    }

    pub fn hovered(&self) -> Option<SurfaceHandle> {
        self.hover.hovered()
    }

    pub fn viewport(&self) -> ViewportSize {
        self.viewport.current()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::MediaLibrary;
    use crate::settings::{default_plaques, Point3};

    const VIEWPORT: ViewportSize = ViewportSize::new(800, 600);

    fn gallery() -> GallerySession {
        let mut media = MediaLibrary::new("/nonexistent");
        GallerySession::new(&default_plaques(), &CameraSettings::default(), &mut media, VIEWPORT).unwrap()
    }

    fn center() -> Vec2 {
        Vec2::new(400.0, 300.0)
    }

    #[derive(Default)]
    struct FakeOutput(ViewportSize);

    impl RenderOutput for FakeOutput {
        fn resize(&mut self, size: ViewportSize) {
            self.0 = size;
        }

        fn size(&self) -> ViewportSize {
            self.0
        }
    }

    #[test]
    fn test_five_plaques_in_declaration_order() {
        let session = gallery();
        let labels: Vec<_> = session.registry().all().map(Surface::label).collect();
        assert_eq!(labels.len(), 5);
        assert_eq!(labels[0], "Lensvelt Contract B.V. Boring collection");
        assert_eq!(labels[1], "Federico D’Orazio: O");
        assert_eq!(labels[2], labels[3]);
        assert_eq!(labels[4], "Swip Stolk. Is getekent ‘Zwart op wit’");
    }

    #[test]
    fn test_center_pointer_on_front_plaque_shows_its_label() {
        let mut session = gallery();
        session.look_at(Vec3::new(0.0, 1.0, 5.0), Vec3::new(-3.0, 1.0, 0.0));

        let hit = session.pointer_moved(center());
        let surface = session.registry().get(hit.unwrap()).unwrap();
        assert_eq!(surface.label(), "Federico D’Orazio: O");

        let overlay = session.overlay();
        assert!(overlay.visible);
        assert_eq!(overlay.text, "Federico D’Orazio: O");
        assert!(overlay.position().abs_diff_eq(center(), 1e-2));
    }

    #[test]
    fn test_nearer_plaque_occludes_the_one_behind() {
        // (-3, 1, -6) sits behind (-3, 1, 0) from this viewpoint
        let mut session = gallery();
        session.look_at(Vec3::new(-3.0, 1.0, 5.0), Vec3::new(-3.0, 1.0, -6.0));
        let hit = session.pointer_moved(center()).unwrap();
        assert_eq!(session.registry().get(hit).unwrap().position, Vec3::new(-3.0, 1.0, 0.0));
    }

    #[test]
    fn test_default_view_center_is_between_plaques() {
        let mut session = gallery();
        assert_eq!(session.pointer_moved(center()), None);
        assert!(!session.overlay().visible);
    }

    #[test]
    fn test_corner_pointer_hides_label() {
        let mut session = gallery();
        session.look_at(Vec3::new(0.0, 1.0, 5.0), Vec3::new(-3.0, 1.0, 0.0));
        session.pointer_moved(center());
        assert!(session.overlay().visible);

        assert_eq!(session.pointer_moved(Vec2::ZERO), None);
        assert!(!session.overlay().visible);
    }

    #[test]
    fn test_tick_never_changes_overlay() {
        let mut session = gallery();
        session.look_at(Vec3::new(0.0, 1.0, 5.0), Vec3::new(-3.0, 1.0, 0.0));
        session.pointer_moved(center());
        let before = session.overlay().clone();

        session.orbit(Vec2::new(300.0, 0.0));
        for _ in 0..10 {
            session.tick();
        }
        assert_eq!(session.overlay(), &before);
    }

    #[test]
    fn test_resize_updates_camera_and_output() {
        let mut session = gallery();
        let mut output = FakeOutput::default();
        assert!(session.resize(ViewportSize::new(1920, 1080), &mut output));
        assert_eq!(output.size(), ViewportSize::new(1920, 1080));
        assert_eq!(session.viewport(), ViewportSize::new(1920, 1080));
        assert!((session.camera().aspect() - 1920.0 / 1080.0).abs() < 1e-6);

        assert!(!session.resize(ViewportSize::new(0, 1080), &mut output));
        assert_eq!(output.size(), ViewportSize::new(1920, 1080));
    }

    #[test]
    fn test_invalid_placement_fails_fast() {
        let mut placements = default_plaques();
        placements[2].height = -1.0;
        let mut media = MediaLibrary::new("/nonexistent");
        let result = GallerySession::new(&placements, &CameraSettings::default(), &mut media, VIEWPORT);
        assert!(matches!(result, Err(SurfaceError::InvalidGeometry { .. })));
    }

    #[test]
    fn test_single_sided_placement_is_respected() {
        let mut placements = default_plaques();
        placements[1].double_sided = false;
        placements[1].rotation_y = std::f32::consts::PI;
        let camera = CameraSettings {
            target: Point3::new(-3.0, 1.0, 0.0),
            ..CameraSettings::default()
        };
        let mut media = MediaLibrary::new("/nonexistent");
        let mut session = GallerySession::new(&placements, &camera, &mut media, VIEWPORT).unwrap();

        // Federico now faces away; the ray continues past it
        let hit = session.pointer_moved(center());
        assert!(hit.map_or(true, |h| session.registry().get(h).unwrap().label() != "Federico D’Orazio: O"));
    }
}
