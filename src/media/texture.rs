//! GPU texture for plaque frames
//!
//! One texture per plaque source. Frames are RGBA8 and uploaded with
//! `queue.write_texture`; a frame of a different size recreates the texture.

use super::DecodedFrame;

/// A GPU texture receiving plaque frames
pub struct VideoTexture {
    texture: wgpu::Texture,
    view: wgpu::TextureView,
    width: u32,
    height: u32,
}

impl VideoTexture {
    pub fn new(device: &wgpu::Device, width: u32, height: u32) -> Self {
        let (texture, view) = Self::create_texture(device, width, height);
        Self {
            texture,
            view,
            width,
            height,
        }
    }

    fn create_texture(
        device: &wgpu::Device,
        width: u32,
        height: u32,
    ) -> (wgpu::Texture, wgpu::TextureView) {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Plaque Texture"),
            size: wgpu::Extent3d {
                width: width.max(1),
                height: height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            // Video frames are sRGB encoded
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::COPY_DST | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        (texture, view)
    }

    /// Upload a frame, recreating the texture if its size changed.
    ///
    /// Returns `true` when the texture was recreated; bind groups holding the
    /// old view must then be rebuilt. Malformed frames are dropped.
    pub fn upload(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, frame: &DecodedFrame) -> bool {
        if !frame.is_valid() {
            log::warn!(
                "Dropping malformed {}x{} frame ({} bytes)",
                frame.width,
                frame.height,
                frame.data.len()
            );
            return false;
        }

        let recreated = self.resize(device, frame.width, frame.height);

        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &self.texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            &frame.data,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(frame.stride() as u32),
                rows_per_image: Some(frame.height),
            },
            wgpu::Extent3d {
                width: frame.width,
                height: frame.height,
                depth_or_array_layers: 1,
            },
        );
        recreated
    }

    fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) -> bool {
        if self.width == width && self.height == height {
            return false;
        }

        let (texture, view) = Self::create_texture(device, width, height);
        self.texture = texture;
        self.view = view;
        self.width = width;
        self.height = height;

        log::debug!("Resized plaque texture to {}x{}", width, height);
        true
    }

    pub fn view(&self) -> &wgpu::TextureView {
        &self.view
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }
}
