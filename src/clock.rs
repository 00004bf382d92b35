use std::time::Instant;

/// Longest frame step fed to movement, so a stalled window does not teleport the player.
pub const MAX_FRAME_MILLIS: u64 = 100;

/// Monotonic millisecond timer.
pub struct Stopwatch {
    start: Instant,
}

impl Stopwatch {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    pub fn now_millis(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }
}

impl Default for Stopwatch {
    fn default() -> Self {
        Self::new()
    }
}

/// Per-frame timing, updated once at the start of every iteration.
#[derive(Debug, Default, Clone, Copy)]
pub struct FrameClock {
    prev_ms: Option<u64>,
    now_ms: u64,
}

impl FrameClock {
    /// Advances to `now_ms` and returns the delta in seconds. The first tick yields 0.
    pub fn tick(&mut self, now_ms: u64) -> f32 {
        let elapsed = match self.prev_ms {
            Some(prev) => now_ms.saturating_sub(prev).min(MAX_FRAME_MILLIS),
            None => 0,
        };
        self.prev_ms = Some(now_ms);
        self.now_ms = now_ms;
        elapsed as f32 / 1000.0
    }

    #[inline]
    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }
}
