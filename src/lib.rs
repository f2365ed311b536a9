//! Plaque Gallery Library
//!
//! An explorable 3D gallery of video plaques. Hovering a plaque shows its
//! caption at the plaque's projected screen position while the camera orbits
//! and the videos keep playing.
//!
//! The `scene` module and `GallerySession` hold everything that decides what
//! is under the pointer; they never touch the GPU and are tested without one.

pub mod app;
pub mod gpu_context;
pub mod media;
pub mod render;
pub mod scene;
pub mod scheduler;
pub mod session;
pub mod settings;
pub mod shaders;
pub mod telemetry;
pub mod ui;

pub use app::GalleryApp;
pub use scene::{hit_test, project, LabelOverlay, PerspectiveCamera, Surface, SurfaceHandle, SurfaceRegistry, ViewportSize};
pub use session::GallerySession;
pub use settings::{GallerySettings, Placement, SettingsError};
