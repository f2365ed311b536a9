//! Software video decoding with FFmpeg
//!
//! Plaques are muted, so only the best video stream is read. Every frame is
//! scaled to packed RGBA for direct upload.

use std::path::Path;

use super::{DecodedFrame, MediaError};

impl From<ffmpeg_next::Error> for MediaError {
    fn from(e: ffmpeg_next::Error) -> Self {
        MediaError::Decode(e.to_string())
    }
}

/// Decodes one video file to RGBA frames
pub struct VideoDecoder {
    input: ffmpeg_next::format::context::Input,
    video_stream_index: usize,
    decoder: ffmpeg_next::decoder::Video,
    scaler: ffmpeg_next::software::scaling::Context,
    width: u32,
    height: u32,
    frame_rate: f64,
    /// Seconds per PTS tick
    time_base: f64,
    eof: bool,
}

impl VideoDecoder {
    pub fn open(path: &Path) -> Result<Self, MediaError> {
        // Safe to call more than once
        ffmpeg_next::init()?;

        let input = ffmpeg_next::format::input(&path)
            .map_err(|e| MediaError::Decode(format!("can't open {}: {}", path.display(), e)))?;

        let stream = input
            .streams()
            .best(ffmpeg_next::media::Type::Video)
            .ok_or_else(|| MediaError::Decode(format!("no video stream in {}", path.display())))?;
        let video_stream_index = stream.index();

        let time_base = stream.time_base();
        let time_base = time_base.numerator() as f64 / time_base.denominator().max(1) as f64;

        let rate = stream.avg_frame_rate();
        let frame_rate = if rate.denominator() > 0 && rate.numerator() > 0 {
            rate.numerator() as f64 / rate.denominator() as f64
        } else {
            30.0
        };

        let context = ffmpeg_next::codec::context::Context::from_parameters(stream.parameters())?;
        let decoder = context.decoder().video()?;
        let (width, height) = (decoder.width(), decoder.height());

        let scaler = ffmpeg_next::software::scaling::Context::get(
            decoder.format(),
            width,
            height,
            ffmpeg_next::format::Pixel::RGBA,
            width,
            height,
            ffmpeg_next::software::scaling::Flags::BILINEAR,
        )?;

        tracing::info!(
            "Opened video {}: {}x{} @ {:.2}fps",
            path.display(),
            width,
            height,
            frame_rate
        );

        Ok(Self {
            input,
            video_stream_index,
            decoder,
            scaler,
            width,
            height,
            frame_rate,
            time_base,
            eof: false,
        })
    }

    /// Next frame, or `None` at end of file
    pub fn decode_next_frame(&mut self) -> Result<Option<DecodedFrame>, MediaError> {
        let mut decoded = ffmpeg_next::frame::Video::empty();

        loop {
            match self.decoder.receive_frame(&mut decoded) {
                Ok(()) => return self.convert(&decoded).map(Some),
                Err(ffmpeg_next::Error::Other {
                    errno: ffmpeg_next::error::EAGAIN,
                }) => {}
                Err(ffmpeg_next::Error::Eof) => return Ok(None),
                Err(e) => return Err(e.into()),
            }

            if self.eof {
                return Ok(None);
            }
            self.feed_packet()?;
        }
    }

    /// Send the next video packet, or EOF, to the decoder
    fn feed_packet(&mut self) -> Result<(), MediaError> {
        for (stream, packet) in self.input.packets() {
            if stream.index() == self.video_stream_index {
                self.decoder.send_packet(&packet)?;
                return Ok(());
            }
        }
        self.decoder.send_eof()?;
        self.eof = true;
        Ok(())
    }

    fn convert(&mut self, decoded: &ffmpeg_next::frame::Video) -> Result<DecodedFrame, MediaError> {
        if decoded.format() != self.scaler.input().format {
            self.scaler = ffmpeg_next::software::scaling::Context::get(
                decoded.format(),
                self.width,
                self.height,
                ffmpeg_next::format::Pixel::RGBA,
                self.width,
                self.height,
                ffmpeg_next::software::scaling::Flags::BILINEAR,
            )?;
        }

        let mut rgba = ffmpeg_next::frame::Video::empty();
        self.scaler.run(decoded, &mut rgba)?;

        // Strip row padding
        let data = rgba.data(0);
        let stride = rgba.stride(0);
        let row = self.width as usize * 4;
        let mut packed = Vec::with_capacity(DecodedFrame::expected_size(self.width, self.height));
        for y in 0..self.height as usize {
            packed.extend_from_slice(&data[y * stride..y * stride + row]);
        }

        let pts = decoded.pts().unwrap_or(0) as f64 * self.time_base;
        let index = (pts * self.frame_rate).round().max(0.0) as u64;
        Ok(DecodedFrame::new(packed, self.width, self.height, pts, index))
    }

    /// Seek back to the first frame
    pub fn reset(&mut self) -> Result<(), MediaError> {
        self.input.seek(0, ..)?;
        self.decoder.flush();
        self.eof = false;
        Ok(())
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn frame_rate(&self) -> f64 {
        self.frame_rate
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_is_decode_error() {
        let result = VideoDecoder::open(Path::new("/nonexistent/video.mp4"));
        assert!(matches!(result, Err(MediaError::Decode(_))));
    }
}
