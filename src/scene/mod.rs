//! Scene composition, pointer hit testing and label projection
//!
//! Everything in here is pure CPU state: no GPU, no window. The renderer and
//! the egui overlay read from it; pointer and resize events write to it.

pub mod camera;
pub mod controls;
pub mod overlay;
pub mod projector;
pub mod registry;
pub mod surface;
pub mod viewport;

pub use camera::PerspectiveCamera;
pub use controls::OrbitControls;
pub use hit_test::{hit_test, hit_test_detailed, pixel_to_ndc, Ray, SurfaceHit};
pub use overlay::{HoverController, LabelOverlay};
pub use projector::project;
pub use registry::{SurfaceHandle, SurfaceRegistry};
pub use surface::{Surface, TextureHandle};
pub use viewport::{RenderOutput, ViewportSize, ViewportSync};

/// Errors raised while building or editing the scene
#[derive(Debug, thiserror::Error)]
pub enum SurfaceError {
    #[error("invalid plaque geometry {width}x{height}: dimensions must be positive and finite")]
    InvalidGeometry { width: f32, height: f32 },

    #[error("no plaque registered for {0:?}")]
    UnknownHandle(SurfaceHandle),
}
