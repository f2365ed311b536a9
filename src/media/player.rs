//! Background-threaded looping video player
//!
//! Decodes on its own thread at the video's frame rate and parks the newest
//! frame in a shared slot. The render thread picks it up without blocking.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use super::{DecodedFrame, FrameSource, MediaError, VideoDecoder};

/// Shared state between decode thread and render thread
struct SharedState {
    current_frame: Mutex<Option<DecodedFrame>>,
    new_frame_available: AtomicBool,
    running: AtomicBool,
}

/// Looping, muted video for one plaque
pub struct VideoPlayer {
    state: Arc<SharedState>,
    thread_handle: Option<JoinHandle<()>>,
    width: u32,
    height: u32,
    path: PathBuf,
}

impl VideoPlayer {
    /// Open a video file and start decoding in the background
    pub fn open(path: &Path) -> Result<Self, MediaError> {
        // Open errors reach the caller; the thread opens its own decoder
        let (width, height) = {
            let decoder = VideoDecoder::open(path)?;
            (decoder.width(), decoder.height())
        };

        let state = Arc::new(SharedState {
            current_frame: Mutex::new(None),
            new_frame_available: AtomicBool::new(false),
            running: AtomicBool::new(true),
        });

        let thread_state = Arc::clone(&state);
        let thread_path = path.to_path_buf();
        let thread_handle = thread::Builder::new()
            .name(format!("decode {}", path.display()))
            .spawn(move || decode_loop(thread_state, &thread_path))?;

        Ok(Self {
            state,
            thread_handle: Some(thread_handle),
            width,
            height,
            path: path.to_path_buf(),
        })
    }

    /// Take the latest decoded frame if a new one is ready
    pub fn take_frame(&self) -> Option<DecodedFrame> {
        if self.state.new_frame_available.swap(false, Ordering::AcqRel) {
            if let Ok(mut current) = self.state.current_frame.lock() {
                return current.take();
            }
        }
        None
    }
}

fn decode_loop(state: Arc<SharedState>, path: &Path) {
    let mut decoder = match VideoDecoder::open(path) {
        Ok(d) => d,
        Err(e) => {
            tracing::error!("Failed to open video in decode thread: {}", e);
            return;
        }
    };
    let frame_duration = Duration::from_secs_f64(1.0 / decoder.frame_rate());
    let mut next_frame_time = Instant::now();
    let mut consecutive_errors = 0u32;
    let mut frames_this_loop = 0u64;

    while state.running.load(Ordering::Acquire) {
        let now = Instant::now();
        if now < next_frame_time {
            thread::sleep(next_frame_time - now);
        }

        match decoder.decode_next_frame() {
            Ok(Some(frame)) => {
                consecutive_errors = 0;
                frames_this_loop += 1;
                if let Ok(mut current) = state.current_frame.lock() {
                    *current = Some(frame);
                    state.new_frame_available.store(true, Ordering::Release);
                }
            }
            Ok(None) => {
                if frames_this_loop == 0 {
                    tracing::warn!("Video has no decodable frames");
                    break;
                }
                // End of video - loop
                frames_this_loop = 0;
                if let Err(e) = decoder.reset() {
                    tracing::warn!("Failed to rewind video: {}", e);
                    break;
                }
                tracing::trace!("Video looped");
                next_frame_time = Instant::now();
                continue;
            }
            Err(e) => {
                consecutive_errors += 1;
                tracing::error!("Decode error: {}", e);
                if consecutive_errors > 30 {
                    tracing::warn!("Giving up on video after repeated errors");
                    break;
                }
            }
        }

        next_frame_time += frame_duration;
        // Fell behind: don't try to catch up
        let now = Instant::now();
        if next_frame_time < now {
            next_frame_time = now;
        }
    }

    tracing::debug!("Decode thread stopped");
}

impl FrameSource for VideoPlayer {
    fn next_frame(&mut self, _elapsed: Duration) -> Option<DecodedFrame> {
        self.take_frame()
    }

    fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn describe(&self) -> String {
        format!("video {} ({}x{})", self.path.display(), self.width, self.height)
    }
}

impl Drop for VideoPlayer {
    fn drop(&mut self) {
        self.state.running.store(false, Ordering::Release);
        if let Some(handle) = self.thread_handle.take() {
            if let Err(e) = handle.join() {
                tracing::warn!("Failed to join decode thread: {:?}", e);
            }
        }
    }
}
