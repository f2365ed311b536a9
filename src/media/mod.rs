//! Media playback for plaque textures
//!
//! The scene only ever sees a `TextureHandle`. Behind it sits a frame source
//! (a decoded video, or a procedural placeholder when the video is missing or
//! the crate was built without FFmpeg) and a GPU texture the renderer samples.

pub mod environment;
pub mod frame;
pub mod library;
pub mod placeholder;
pub mod texture;

#[cfg(feature = "video")]
pub mod decoder;
#[cfg(feature = "video")]
pub mod player;

use std::time::Duration;

pub use environment::{EnvironmentImage, EnvironmentTexture};
pub use frame::DecodedFrame;
pub use library::MediaLibrary;
pub use placeholder::PlaceholderSource;
pub use texture::VideoTexture;

#[cfg(feature = "video")]
pub use decoder::VideoDecoder;
#[cfg(feature = "video")]
pub use player::VideoPlayer;

use crate::scene::TextureHandle;

/// Errors from media loading and decoding
#[derive(Debug, thiserror::Error)]
pub enum MediaError {
    #[error("decode failed: {0}")]
    Decode(String),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Something that produces frames for one plaque
pub trait FrameSource {
    /// Newest frame since the last call, if any.
    ///
    /// `elapsed` is time since playback started; sources that pace themselves
    /// may ignore it.
    fn next_frame(&mut self, elapsed: Duration) -> Option<DecodedFrame>;

    /// Frame size in pixels
    fn dimensions(&self) -> (u32, u32);

    /// Short description for logs
    fn describe(&self) -> String;
}

/// Resolves media references to texture handles for the scene
pub trait MediaProvider {
    /// Handle for `media_ref`; never fails, missing media gets a placeholder
    fn texture_for(&mut self, media_ref: &str) -> TextureHandle;
}
