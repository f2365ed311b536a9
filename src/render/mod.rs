//! wgpu rendering of the gallery scene

pub mod mesh;
pub mod renderer;

pub use mesh::{plaque_transform, PlaqueMesh, PlaqueVertex};
pub use renderer::GalleryRenderer;
