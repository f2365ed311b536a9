//! Keeps camera aspect and render output size in agreement

use super::PerspectiveCamera;

/// Drawable size in physical pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ViewportSize {
    pub width: u32,
    pub height: u32,
}

impl ViewportSize {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// True when either side is zero (minimised window)
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Width over height; 1.0 for an empty viewport
    pub fn aspect(&self) -> f32 {
        if self.is_empty() {
            1.0
        } else {
            self.width as f32 / self.height as f32
        }
    }
}

impl From<winit::dpi::PhysicalSize<u32>> for ViewportSize {
    fn from(size: winit::dpi::PhysicalSize<u32>) -> Self {
        Self::new(size.width, size.height)
    }
}

/// Anything that draws at a given pixel size
pub trait RenderOutput {
    fn resize(&mut self, size: ViewportSize);
    fn size(&self) -> ViewportSize;
}

/// Applies resize events to the camera and the render output together
#[derive(Debug, Default)]
pub struct ViewportSync {
    current: ViewportSize,
}

impl ViewportSync {
    pub fn new(initial: ViewportSize) -> Self {
        Self { current: initial }
    }

    pub fn current(&self) -> ViewportSize {
        self.current
    }

    /// Apply a resize. Returns `false` when the size was ignored.
    ///
    /// Zero-sized requests leave both camera and output untouched so the
    /// pair never disagrees.
    pub fn apply(
        &mut self,
        size: ViewportSize,
        camera: &mut PerspectiveCamera,
        output: &mut dyn RenderOutput,
    ) -> bool {
        if size.is_empty() {
            tracing::debug!(width = size.width, height = size.height, "Ignoring empty resize");
            return false;
        }

        camera.set_aspect(size.aspect());
        output.resize(size);
        self.current = size;
        tracing::debug!(width = size.width, height = size.height, "Viewport resized");
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct FakeOutput {
        size: ViewportSize,
        resizes: usize,
    }

    impl RenderOutput for FakeOutput {
        fn resize(&mut self, size: ViewportSize) {
            self.size = size;
            self.resizes += 1;
        }

        fn size(&self) -> ViewportSize {
            self.size
        }
    }

    #[test]
    fn test_resize_keeps_camera_and_output_consistent() {
        let mut camera = PerspectiveCamera::default();
        let mut output = FakeOutput::default();
        let mut sync = ViewportSync::default();

        let size = ViewportSize::new(1920, 1080);
        assert!(sync.apply(size, &mut camera, &mut output));
        assert_eq!(output.size(), size);
        assert!((camera.aspect() - 1920.0 / 1080.0).abs() < 1e-6);
        assert_eq!(sync.current(), size);
    }

    #[test]
    fn test_resize_round_trip() {
        let mut camera = PerspectiveCamera::default();
        let mut output = FakeOutput::default();
        let mut sync = ViewportSync::default();

        let a = ViewportSize::new(800, 600);
        let b = ViewportSize::new(600, 900);
        sync.apply(a, &mut camera, &mut output);
        let (aspect_a, size_a) = (camera.aspect(), output.size());
        sync.apply(b, &mut camera, &mut output);
        sync.apply(a, &mut camera, &mut output);

        assert_eq!(camera.aspect(), aspect_a);
        assert_eq!(output.size(), size_a);
    }

    #[test]
    fn test_repeated_resize_is_idempotent() {
        let mut camera = PerspectiveCamera::default();
        let mut output = FakeOutput::default();
        let mut sync = ViewportSync::default();
        let size = ViewportSize::new(1024, 768);
        sync.apply(size, &mut camera, &mut output);
        let once = (camera.clone(), output.size());
        sync.apply(size, &mut camera, &mut output);
        assert_eq!((camera, output.size()), once);
    }

    #[test]
    fn test_empty_resize_is_ignored() {
        let mut camera = PerspectiveCamera::default();
        let mut output = FakeOutput::default();
        let mut sync = ViewportSync::default();
        sync.apply(ViewportSize::new(800, 600), &mut camera, &mut output);

        assert!(!sync.apply(ViewportSize::new(0, 0), &mut camera, &mut output));
        assert_eq!(output.resizes, 1);
        assert_eq!(output.size(), ViewportSize::new(800, 600));
        assert!((camera.aspect() - 800.0 / 600.0).abs() < 1e-6);
    }
}
