//! Render loop pacing and frame statistics
//!
//! The scheduler decides *when* the next frame is drawn; the app decides what
//! a frame is (advance orbit damping, then render). With VSYNC on, the display
//! paces us through the Fifo present mode and a redraw is requested on every
//! event loop turn. With VSYNC off, redraws are spaced at `target_fps` using
//! integer nanoseconds so long sessions do not drift.

use std::time::{Duration, Instant};

/// Within this of the deadline, spin instead of sleeping
const SPIN_THRESHOLD: Duration = Duration::from_micros(2000);
/// Sleeps end this much before the deadline
const WAKE_EARLY: Duration = Duration::from_micros(1000);

/// What the event loop should do on this turn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pacing {
    /// Request a redraw and keep polling
    Continuous,
    /// Not time yet; sleep until the given instant
    Wait { wake_at: Instant },
    /// Request a redraw (after spinning to `not_before` if set), then sleep
    /// until `wake_at`
    Redraw {
        not_before: Option<Instant>,
        wake_at: Instant,
    },
}

/// Continuous render loop driver
#[derive(Debug)]
pub struct FrameScheduler {
    vsync: bool,
    target_fps: u32,
    next_redraw_at: Instant,
    stats: FrameStats,
}

impl FrameScheduler {
    pub fn new(vsync: bool, target_fps: u32, now: Instant) -> Self {
        let target_fps = target_fps.clamp(24, 240);
        Self {
            vsync,
            target_fps,
            next_redraw_at: now,
            stats: FrameStats::new(target_fps as f64, now),
        }
    }

    pub fn vsync(&self) -> bool {
        self.vsync
    }

    pub fn target_fps(&self) -> u32 {
        self.target_fps
    }

    /// Change the pacing target; the next redraw is due immediately
    pub fn set_target_fps(&mut self, fps: u32, now: Instant) {
        let fps = fps.clamp(24, 240);
        if fps != self.target_fps {
            self.target_fps = fps;
            self.next_redraw_at = now;
        }
    }

    pub fn frame_duration(&self) -> Duration {
        Duration::from_nanos(1_000_000_000u64 / self.target_fps as u64)
    }

    /// Decide this event loop turn
    pub fn pace(&mut self, now: Instant) -> Pacing {
        if self.vsync {
            return Pacing::Continuous;
        }

        let frame_duration = self.frame_duration();
        let mut not_before = None;
        if now < self.next_redraw_at {
            if self.next_redraw_at.duration_since(now) <= SPIN_THRESHOLD {
                not_before = Some(self.next_redraw_at);
            } else {
                return Pacing::Wait {
                    wake_at: wake_before(self.next_redraw_at),
                };
            }
        }

        let redraw_at = not_before.unwrap_or(now);
        self.next_redraw_at += frame_duration;

        // Reset if more than 2 frames behind
        if redraw_at > self.next_redraw_at + frame_duration * 2 {
            self.next_redraw_at = redraw_at + frame_duration;
        }

        Pacing::Redraw {
            not_before,
            wake_at: wake_before(self.next_redraw_at),
        }
    }

    /// Count a rendered frame
    pub fn record_frame(&mut self, now: Instant) {
        self.stats.record(now);
    }

    pub fn stats(&self) -> &FrameStats {
        &self.stats
    }
}

fn wake_before(deadline: Instant) -> Instant {
    deadline.checked_sub(WAKE_EARLY).unwrap_or(deadline)
}

/// Frame counter with an FPS estimate refreshed once per second
#[derive(Debug, Clone)]
pub struct FrameStats {
    frame_count: u64,
    frames_since_update: u32,
    last_update: Instant,
    fps: f64,
}

impl FrameStats {
    fn new(initial_fps: f64, now: Instant) -> Self {
        Self {
            frame_count: 0,
            frames_since_update: 0,
            last_update: now,
            // Initialize to target so the first second doesn't report 0
            fps: initial_fps,
        }
    }

    fn record(&mut self, now: Instant) {
        self.frame_count += 1;
        self.frames_since_update += 1;

        let elapsed = now.duration_since(self.last_update).as_secs_f64();
        if elapsed >= 1.0 {
            self.fps = self.frames_since_update as f64 / elapsed;
            self.frames_since_update = 0;
            self.last_update = now;
            tracing::trace!(fps = self.fps, frames = self.frame_count, "Frame stats");
        }
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    pub fn fps(&self) -> f64 {
        self.fps
    }

    pub fn frame_time_ms(&self) -> f64 {
        if self.fps > 0.0 {
            1000.0 / self.fps
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vsync_redraws_every_turn() {
        let now = Instant::now();
        let mut scheduler = FrameScheduler::new(true, 60, now);
        for _ in 0..3 {
            assert_eq!(scheduler.pace(now), Pacing::Continuous);
        }
    }

    #[test]
    fn test_target_fps_is_clamped() {
        let now = Instant::now();
        assert_eq!(FrameScheduler::new(false, 1000, now).target_fps(), 240);
        assert_eq!(FrameScheduler::new(false, 1, now).target_fps(), 24);
    }

    #[test]
    fn test_first_frame_is_immediate_then_waits() {
        let start = Instant::now();
        let mut scheduler = FrameScheduler::new(false, 60, start);
        let frame = scheduler.frame_duration();

        match scheduler.pace(start) {
            Pacing::Redraw { not_before, wake_at } => {
                assert_eq!(not_before, None);
                assert_eq!(wake_at, start + frame - WAKE_EARLY);
            }
            other => panic!("expected redraw, got {other:?}"),
        }

        // Same instant again: too early, sleep until 1ms before the deadline
        assert_eq!(
            scheduler.pace(start),
            Pacing::Wait {
                wake_at: start + frame - WAKE_EARLY
            }
        );
    }

    #[test]
    fn test_close_to_deadline_spins() {
        let start = Instant::now();
        let mut scheduler = FrameScheduler::new(false, 60, start);
        let frame = scheduler.frame_duration();
        scheduler.pace(start);

        let almost = start + frame - Duration::from_micros(500);
        match scheduler.pace(almost) {
            Pacing::Redraw { not_before, .. } => assert_eq!(not_before, Some(start + frame)),
            other => panic!("expected redraw, got {other:?}"),
        }
    }

    #[test]
    fn test_falling_behind_resets_schedule() {
        let start = Instant::now();
        let mut scheduler = FrameScheduler::new(false, 60, start);
        let frame = scheduler.frame_duration();
        scheduler.pace(start);

        let late = start + frame * 10;
        match scheduler.pace(late) {
            Pacing::Redraw { wake_at, .. } => assert_eq!(wake_at, late + frame - WAKE_EARLY),
            other => panic!("expected redraw, got {other:?}"),
        }
    }

    #[test]
    fn test_integer_frame_duration() {
        let scheduler = FrameScheduler::new(false, 60, Instant::now());
        assert_eq!(scheduler.frame_duration(), Duration::from_nanos(16_666_666));
    }

    #[test]
    fn test_fps_updates_once_per_second() {
        let start = Instant::now();
        let mut scheduler = FrameScheduler::new(false, 60, start);
        assert_eq!(scheduler.stats().fps(), 60.0);

        for i in 1..=30 {
            scheduler.record_frame(start + Duration::from_millis(i * 20));
        }
        // 600ms in: still the initial estimate
        assert_eq!(scheduler.stats().fps(), 60.0);

        for i in 31..=50 {
            scheduler.record_frame(start + Duration::from_millis(i * 20));
        }
        assert_eq!(scheduler.stats().frame_count(), 50);
        assert!((scheduler.stats().fps() - 50.0).abs() < 1e-6);
        assert!((scheduler.stats().frame_time_ms() - 20.0).abs() < 1e-6);
    }
}
