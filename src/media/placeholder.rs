//! Procedural stand-in for plaques whose video can't be played
//!
//! Draws slowly scrolling diagonal stripes in a color derived from the media
//! reference, so different plaques stay distinguishable and motion shows the
//! render loop is alive.

use std::time::Duration;

use image::{Rgba, RgbaImage};

use super::{DecodedFrame, FrameSource};

const WIDTH: u32 = 320;
const HEIGHT: u32 = 180;
const FPS: f64 = 30.0;
const STRIPE: u32 = 24;

/// Animated placeholder frames
#[derive(Debug)]
pub struct PlaceholderSource {
    name: String,
    base: [u8; 3],
    last_index: Option<u64>,
}

impl PlaceholderSource {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            base: color_for(name),
            last_index: None,
        }
    }

    /// Render the frame shown at `index`
    pub fn render(&self, index: u64) -> RgbaImage {
        let [r, g, b] = self.base;
        let dark = Rgba([r / 3, g / 3, b / 3, 255]);
        let light = Rgba([r, g, b, 255]);
        let offset = (index % (STRIPE as u64 * 2)) as u32;

        RgbaImage::from_fn(WIDTH, HEIGHT, |x, y| {
            if ((x + y + offset) / STRIPE) % 2 == 0 {
                light
            } else {
                dark
            }
        })
    }
}

impl FrameSource for PlaceholderSource {
    fn next_frame(&mut self, elapsed: Duration) -> Option<DecodedFrame> {
        let index = (elapsed.as_secs_f64() * FPS) as u64;
        if self.last_index == Some(index) {
            return None;
        }
        self.last_index = Some(index);

        let image = self.render(index);
        Some(DecodedFrame::new(
            image.into_raw(),
            WIDTH,
            HEIGHT,
            index as f64 / FPS,
            index,
        ))
    }

    fn dimensions(&self) -> (u32, u32) {
        (WIDTH, HEIGHT)
    }

    fn describe(&self) -> String {
        format!("placeholder for {}", self.name)
    }
}

/// Stable, reasonably saturated color from a name (FNV-1a)
fn color_for(name: &str) -> [u8; 3] {
    let hash = name
        .bytes()
        .fold(0xcbf2_9ce4_8422_2325u64, |h, b| (h ^ b as u64).wrapping_mul(0x0100_0000_01b3));
    let channel = |shift: u32| 64 + ((hash >> shift) & 0xff) as u8 / 2;
    [channel(0), channel(8), channel(16)]
}
