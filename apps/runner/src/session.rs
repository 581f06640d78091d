use std::sync::Arc;
use std::time::{Instant, SystemTime, UNIX_EPOCH};

use parking_lot::Mutex;
use tracing::info;
use uuid::Uuid;

use hud_feed_core::{FeedError, MemoryParams, ParamStore, ScreenRecorder, SubscriberFeed, UpdateRx};
use hud_io::FrameTiming;
use hud_model::Frame;
use hud_render::{Capabilities, FrameLoop, FrameLoopConfig};

/// Recorder stand-in for headless runs: tracks state and counts captured frames.
#[derive(Default)]
pub struct TracingRecorder {
    recording: bool,
    captured: u64,
}

impl ScreenRecorder for TracingRecorder {
    fn toggle(&mut self) {
        self.recording = !self.recording;
        info!(recording = self.recording, captured = self.captured, "screen recorder toggled");
    }

    fn update_screen(&mut self) {
        if self.recording {
            self.captured += 1;
        }
    }

    fn stop(&mut self, save: bool) {
        if self.recording {
            info!(save, captured = self.captured, "screen recorder stopped");
        }
        self.recording = false;
        self.captured = 0;
    }
}

pub struct HudSession {
    pub id: Uuid,
    pub inner: Mutex<Inner>,
}

pub struct Inner {
    pub frame_loop: FrameLoop,
    pub feed: SubscriberFeed,
    pub frames: Vec<Frame>,
    pub timings: Vec<FrameTiming>,
    pub keep_frames: bool,
    pub keep_timings: bool,
    pub slow_frames: u64,
    slow_ms: f64,
}

/// Nanoseconds since the Unix epoch; producers stamp ping times in the same clock.
fn wall_clock_ns() -> u64 {
    SystemTime::now().duration_since(UNIX_EPOCH).map_or(0, |d| d.as_nanos() as u64)
}

impl HudSession {
    pub fn new(
        cfg: FrameLoopConfig,
        params: Arc<MemoryParams>,
        rx: UpdateRx,
        keep_frames: bool,
        keep_timings: bool,
    ) -> Self {
        let caps = Capabilities { recorder: Some(Box::new(TracingRecorder::default())), ..Default::default() };
        let slow_ms = cfg.slow_frame.as_secs_f64() * 1000.0;
        let params: Arc<dyn ParamStore> = params;
        Self {
            id: Uuid::new_v4(),
            inner: Mutex::new(Inner {
                frame_loop: FrameLoop::new(cfg, params, caps),
                feed: SubscriberFeed::new(rx),
                frames: Vec::new(),
                timings: Vec::new(),
                keep_frames,
                keep_timings,
                slow_frames: 0,
                slow_ms,
            }),
        }
    }

    /// One refresh and paint. Returns false once the feed has closed.
    pub fn tick(&self, now: Instant) -> bool {
        let mut inner = self.inner.lock();
        match inner.feed.update(now) {
            Ok(_) => {}
            Err(FeedError::Closed) => return false,
            Err(e) => {
                tracing::warn!(error = %e, "state feed update failed");
                return true;
            }
        }
        let inner = &mut *inner;
        if inner.frame_loop.is_offroad() {
            inner.frame_loop.offroad_transition(false);
        }
        let signals = inner.frame_loop.tick(&inner.feed, now, wall_clock_ns());
        tracing::trace!(?signals, "tick");

        let frame = inner.frame_loop.paint(now);
        let dt = inner.frame_loop.last_frame_time();
        if let Some(dt) = dt {
            let dt_ms = dt.as_secs_f64() * 1000.0;
            let slow = dt_ms > inner.slow_ms;
            inner.slow_frames += u64::from(slow);
            if inner.keep_timings {
                inner.timings.push(FrameTiming { frame: frame.frame, dt_ms, slow });
            }
        }
        if inner.keep_frames {
            inner.frames.push(frame);
        }
        true
    }

    pub fn record_tick(&self) {
        self.inner.lock().frame_loop.record_tick();
    }

    pub fn go_offroad(&self) {
        let mut inner = self.inner.lock();
        if !inner.frame_loop.is_offroad() {
            inner.frame_loop.offroad_transition(true);
        }
    }
}
