//! Media library: one frame source and GPU texture per media reference

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::{FrameSource, MediaProvider, PlaceholderSource, VideoTexture};
use crate::scene::TextureHandle;

struct MediaEntry {
    media_ref: String,
    source: Box<dyn FrameSource>,
    /// Created on the first `update` with a GPU
    texture: Option<VideoTexture>,
}

/// Owns every plaque's playback and texture.
///
/// Plaques naming the same media reference share one source and texture.
pub struct MediaLibrary {
    root: PathBuf,
    entries: Vec<MediaEntry>,
    by_ref: HashMap<String, TextureHandle>,
}

impl MediaLibrary {
    /// Media references resolve against `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            entries: Vec::new(),
            by_ref: HashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Media reference behind a handle
    pub fn media_ref(&self, handle: TextureHandle) -> Option<&str> {
        self.entries
            .get(handle.0 as usize)
            .map(|entry| entry.media_ref.as_str())
    }

    /// Pull new frames and upload them.
    ///
    /// Returns handles whose texture view was (re)created this call.
    pub fn update(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        elapsed: Duration,
    ) -> Vec<TextureHandle> {
        let mut recreated = Vec::new();

        for (idx, entry) in self.entries.iter_mut().enumerate() {
            let handle = TextureHandle(idx as u32);
            if entry.texture.is_none() {
                let (width, height) = entry.source.dimensions();
                entry.texture = Some(VideoTexture::new(device, width, height));
                recreated.push(handle);
            }
            let Some(texture) = entry.texture.as_mut() else {
                continue;
            };

            if let Some(frame) = entry.source.next_frame(elapsed) {
                if texture.upload(device, queue, &frame) && !recreated.contains(&handle) {
                    recreated.push(handle);
                }
            }
        }
        recreated
    }

    /// Texture view for a handle, once `update` has created it
    pub fn view(&self, handle: TextureHandle) -> Option<&wgpu::TextureView> {
        self.entries
            .get(handle.0 as usize)
            .and_then(|entry| entry.texture.as_ref())
            .map(VideoTexture::view)
    }
}

impl MediaProvider for MediaLibrary {
    fn texture_for(&mut self, media_ref: &str) -> TextureHandle {
        if let Some(&handle) = self.by_ref.get(media_ref) {
            return handle;
        }

        let handle = TextureHandle(self.entries.len() as u32);
        let source = open_source(&self.root.join(media_ref), media_ref);
        tracing::info!(media = media_ref, source = %source.describe(), "Opened plaque media");

        self.entries.push(MediaEntry {
            media_ref: media_ref.to_string(),
            source,
            texture: None,
        });
        self.by_ref.insert(media_ref.to_string(), handle);
        handle
    }
}

/// Video player for `path`, or a placeholder if it can't be played
fn open_source(path: &Path, media_ref: &str) -> Box<dyn FrameSource> {
    #[cfg(feature = "video")]
    {
        match super::VideoPlayer::open(path) {
            Ok(player) => return Box::new(player),
            Err(e) => tracing::warn!("Can't play {}: {}. Using placeholder.", path.display(), e),
        }
    }
    #[cfg(not(feature = "video"))]
    tracing::debug!(
        "Built without the video feature, placeholder for {}",
        path.display()
    );

    Box::new(PlaceholderSource::new(media_ref))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_media_ref_shares_a_handle() {
        let mut library = MediaLibrary::new("/nonexistent");
        let a = library.texture_for("videos/video2.mp4");
        let b = library.texture_for("videos/video3.mp4");
        let again = library.texture_for("videos/video2.mp4");

        assert_eq!(a, again);
        assert_ne!(a, b);
        assert_eq!(library.len(), 2);
        assert_eq!(library.media_ref(b), Some("videos/video3.mp4"));
    }

    #[test]
    fn test_missing_media_still_gets_a_handle() {
        let mut library = MediaLibrary::new("/nonexistent");
        let handle = library.texture_for("missing.mp4");
        assert_eq!(handle, TextureHandle(0));
        // No GPU yet, so no view
        assert!(library.view(handle).is_none());
    }
}
