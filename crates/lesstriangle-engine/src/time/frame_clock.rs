use std::time::{Duration, Instant};

/// Frame timing snapshot.
#[derive(Debug, Copy, Clone)]
pub struct FrameTime {
    /// Time elapsed since the previous frame tick, in seconds.
    pub dt: f32,

    /// Wall-clock seconds since the clock was created.
    ///
    /// Monotonically non-decreasing.
    pub elapsed: f32,

    /// Monotonic timestamp taken at the tick.
    pub now: Instant,

    /// Monotonic frame counter.
    pub frame_index: u64,
}

/// Frame clock producing `FrameTime` snapshots.
///
/// The clock reads `Instant`, a monotonic wall clock, so shader time keeps
/// pace with real time regardless of how much CPU the process gets.
///
/// Delta time is clamped to avoid pathological values when the application is paused
/// by the debugger, minimized, or stalls. Elapsed time is not clamped.
#[derive(Debug, Clone)]
pub struct FrameClock {
    start: Instant,
    last: Instant,
    frame_index: u64,
    dt_min: Duration,
    dt_max: Duration,
}

impl FrameClock {
    /// Creates a new clock with default clamps.
    ///
    /// Clamp rationale:
    /// - minimum prevents zero-dt behavior from tight loops on some platforms
    /// - maximum prevents animation jumps after long stalls
    pub fn new() -> Self {
        Self::starting_at(Instant::now())
    }

    /// Creates a clock whose baseline is `start`.
    pub fn starting_at(start: Instant) -> Self {
        Self {
            start,
            last: start,
            frame_index: 0,
            dt_min: Duration::from_micros(100), // 0.0001s
            dt_max: Duration::from_millis(250), // 0.25s
        }
    }

    /// Advances the clock and returns a new `FrameTime`.
    pub fn tick(&mut self) -> FrameTime {
        self.tick_at(Instant::now())
    }

    /// Advances the clock to `now`.
    ///
    /// Timestamps earlier than the previous tick are treated as equal to it,
    /// so `elapsed` never goes backwards.
    pub fn tick_at(&mut self, now: Instant) -> FrameTime {
        let now = now.max(self.last);
        let dt = now
            .saturating_duration_since(self.last)
            .clamp(self.dt_min, self.dt_max);

        self.last = now;

        let ft = FrameTime {
            dt: dt.as_secs_f32(),
            elapsed: now.saturating_duration_since(self.start).as_secs_f32(),
            now,
            frame_index: self.frame_index,
        };

        self.frame_index = self.frame_index.wrapping_add(1);

        ft
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── elapsed ───────────────────────────────────────────────────────────

    #[test]
    fn elapsed_tracks_wall_time_since_start() {
        let start = Instant::now();
        let mut clock = FrameClock::starting_at(start);
        let ft = clock.tick_at(start + Duration::from_millis(1500));
        assert!((ft.elapsed - 1.5).abs() < 1e-6);
    }

    #[test]
    fn elapsed_is_non_decreasing_across_frames() {
        let start = Instant::now();
        let mut clock = FrameClock::starting_at(start);
        let mut prev = 0.0f32;
        for ms in [0u64, 16, 33, 33, 50, 2_000, 2_016] {
            let ft = clock.tick_at(start + Duration::from_millis(ms));
            assert!(ft.elapsed >= prev, "{} < {}", ft.elapsed, prev);
            prev = ft.elapsed;
        }
    }

    #[test]
    fn earlier_timestamp_does_not_rewind() {
        let start = Instant::now();
        let mut clock = FrameClock::starting_at(start);
        let a = clock.tick_at(start + Duration::from_secs(2));
        let b = clock.tick_at(start + Duration::from_secs(1));
        assert_eq!(a.elapsed, b.elapsed);
    }

    #[test]
    fn real_clock_is_monotonic() {
        let mut clock = FrameClock::new();
        let a = clock.tick();
        let b = clock.tick();
        assert!(b.elapsed >= a.elapsed);
    }

    // ── dt clamps ─────────────────────────────────────────────────────────

    #[test]
    fn dt_is_clamped_after_stall() {
        let start = Instant::now();
        let mut clock = FrameClock::starting_at(start);
        let ft = clock.tick_at(start + Duration::from_secs(10));
        assert_eq!(ft.dt, 0.25);
        assert!((ft.elapsed - 10.0).abs() < 1e-6);
    }

    #[test]
    fn dt_has_a_floor() {
        let start = Instant::now();
        let mut clock = FrameClock::starting_at(start);
        let ft = clock.tick_at(start);
        assert!(ft.dt > 0.0);
    }

    // ── frame index ───────────────────────────────────────────────────────

    #[test]
    fn frame_index_counts_ticks() {
        let mut clock = FrameClock::new();
        assert_eq!(clock.tick().frame_index, 0);
        assert_eq!(clock.tick().frame_index, 1);
        assert_eq!(clock.tick().frame_index, 2);
    }
}
