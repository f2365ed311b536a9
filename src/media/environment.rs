//! Equirectangular HDR environment used as the gallery background
//!
//! Loaded once at startup. A missing or unreadable file falls back to a
//! procedural gradient so the gallery still has a horizon.

use std::path::Path;

use image::imageops::FilterType;

use super::MediaError;

/// Environments wider than this are downscaled before upload
const MAX_WIDTH: u32 = 4096;

/// Linear RGBA float pixels, row-major, top row first
#[derive(Debug, Clone)]
pub struct EnvironmentImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<f32>,
}

impl EnvironmentImage {
    /// Decode an HDR (or any `image`-supported) file
    pub fn load(path: &Path) -> Result<Self, MediaError> {
        let mut image = image::open(path)?.into_rgba32f();

        if image.width() > MAX_WIDTH {
            let height = (image.height() as u64 * MAX_WIDTH as u64 / image.width() as u64).max(1) as u32;
            tracing::debug!(
                "Downscaling environment {}x{} to {}x{}",
                image.width(),
                image.height(),
                MAX_WIDTH,
                height
            );
            image = image::imageops::resize(&image, MAX_WIDTH, height, FilterType::Triangle);
        }

        Ok(Self {
            width: image.width(),
            height: image.height(),
            pixels: image.into_raw(),
        })
    }

    /// Warm ceiling fading to a dark floor
    pub fn gradient() -> Self {
        const WIDTH: u32 = 64;
        const HEIGHT: u32 = 32;
        let sky = [1.2f32, 1.0, 0.8];
        let floor = [0.05f32, 0.04, 0.04];

        let mut pixels = Vec::with_capacity((WIDTH * HEIGHT * 4) as usize);
        for y in 0..HEIGHT {
            let t = y as f32 / (HEIGHT - 1) as f32;
            let rgb: Vec<f32> = sky.iter().zip(floor).map(|(s, f)| s + (f - s) * t).collect();
            for _ in 0..WIDTH {
                pixels.extend_from_slice(&rgb);
                pixels.push(1.0);
            }
        }

        Self {
            width: WIDTH,
            height: HEIGHT,
            pixels,
        }
    }

    /// `load`, or the gradient with a warning
    pub fn load_or_gradient(path: &Path) -> Self {
        match Self::load(path) {
            Ok(image) => {
                tracing::info!("Loaded environment {} ({}x{})", path.display(), image.width, image.height);
                image
            }
            Err(e) => {
                tracing::warn!("Environment {} unavailable: {}. Using gradient.", path.display(), e);
                Self::gradient()
            }
        }
    }
}

/// GPU copy of the environment.
///
/// `Rgba32Float` is not filterable everywhere, so it is sampled with a
/// non-filtering sampler.
pub struct EnvironmentTexture {
    _texture: wgpu::Texture,
    view: wgpu::TextureView,
}

impl EnvironmentTexture {
    pub fn new(device: &wgpu::Device, queue: &wgpu::Queue, image: &EnvironmentImage) -> Self {
        let size = wgpu::Extent3d {
            width: image.width,
            height: image.height,
            depth_or_array_layers: 1,
        };
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Environment Texture"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba32Float,
            usage: wgpu::TextureUsages::COPY_DST | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });

        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            bytemuck::cast_slice(&image.pixels),
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(image.width * 16),
                rows_per_image: Some(image.height),
            },
            size,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        Self {
            _texture: texture,
            view,
        }
    }

    pub fn view(&self) -> &wgpu::TextureView {
        &self.view
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gradient_shape() {
        let image = EnvironmentImage::gradient();
        assert_eq!(image.pixels.len(), (image.width * image.height * 4) as usize);
        // Top row brighter than bottom row
        let top = image.pixels[0];
        let bottom = image.pixels[image.pixels.len() - 4];
        assert!(top > bottom);
    }

    #[test]
    fn test_missing_file_falls_back() {
        let image = EnvironmentImage::load_or_gradient(Path::new("/nonexistent/lobby.hdr"));
        assert_eq!(image.width, EnvironmentImage::gradient().width);
    }

    #[test]
    fn test_load_reports_error() {
        assert!(EnvironmentImage::load(Path::new("/nonexistent/lobby.hdr")).is_err());
    }
}
