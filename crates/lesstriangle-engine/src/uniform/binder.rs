use super::UniformValue;

/// Framebuffer size in pixels, possibly scaled down (see [`scaled_resolution`]).
pub const RESOLUTION: &str = "resolution";
/// Seconds since the render loop started.
pub const U_TIME: &str = "u_time";
/// `1` for day lighting, `0` for night.
pub const DAY_TIME: &str = "day_time";

/// Receiver of named uniform writes.
pub trait UniformTarget {
    /// Sets `name` to `value`. A name the target does not know is a silent no-op.
    fn set_uniform(&mut self, name: &str, value: UniformValue);
}

/// Per-frame input to the binder, recomputed every iteration.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct FrameState {
    pub elapsed_time: f32,
    pub resolution: (i32, i32),
    pub night_mode: bool,
}

/// Pushes [`FrameState`] into the active program's uniforms.
///
/// `u_time` and `day_time` are written every frame. `resolution` is written on
/// the first frame and then only when it changes.
#[derive(Debug, Clone, Default)]
pub struct FrameUniformBinder {
    bound_resolution: Option<(i32, i32)>,
}

impl FrameUniformBinder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bind<T>(&mut self, target: &mut T, state: &FrameState)
    where
        T: UniformTarget + ?Sized,
    {
        if self.bound_resolution != Some(state.resolution) {
            let (w, h) = state.resolution;
            target.set_uniform(RESOLUTION, UniformValue::IVec2([w, h]));
            self.bound_resolution = Some(state.resolution);
        }

        target.set_uniform(U_TIME, UniformValue::Float(state.elapsed_time));
        target.set_uniform(DAY_TIME, UniformValue::Int(i32::from(!state.night_mode)));
    }

    /// Forces `resolution` to be written again on the next `bind`.
    pub fn invalidate(&mut self) {
        self.bound_resolution = None;
    }
}

/// Framebuffer size divided by `divisor` (a divisor of 0 counts as 1).
pub fn scaled_resolution(width: u32, height: u32, divisor: u32) -> (i32, i32) {
    let d = divisor.max(1);
    let clamp = |v: u32| i32::try_from(v / d).unwrap_or(i32::MAX);
    (clamp(width), clamp(height))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        writes: Vec<(String, UniformValue)>,
    }

    impl UniformTarget for Recorder {
        fn set_uniform(&mut self, name: &str, value: UniformValue) {
            self.writes.push((name.to_string(), value));
        }
    }

    impl Recorder {
        fn names(&self) -> Vec<&str> {
            self.writes.iter().map(|(n, _)| n.as_str()).collect()
        }
    }

    fn state(t: f32) -> FrameState {
        FrameState { elapsed_time: t, resolution: (128, 96), night_mode: true }
    }

    // ── binding order ─────────────────────────────────────────────────────

    #[test]
    fn first_frame_binds_all_three() {
        let mut r = Recorder::default();
        FrameUniformBinder::new().bind(&mut r, &state(0.0));
        assert_eq!(r.names(), [RESOLUTION, U_TIME, DAY_TIME]);
        assert_eq!(r.writes[0].1, UniformValue::IVec2([128, 96]));
    }

    #[test]
    fn resolution_is_bound_once_while_unchanged() {
        let mut r = Recorder::default();
        let mut b = FrameUniformBinder::new();
        b.bind(&mut r, &state(0.0));
        b.bind(&mut r, &state(0.016));
        b.bind(&mut r, &state(0.033));
        assert_eq!(r.names().iter().filter(|n| **n == RESOLUTION).count(), 1);
        assert_eq!(r.names().iter().filter(|n| **n == U_TIME).count(), 3);
    }

    #[test]
    fn resolution_change_is_rebound() {
        let mut r = Recorder::default();
        let mut b = FrameUniformBinder::new();
        b.bind(&mut r, &state(0.0));
        b.bind(&mut r, &FrameState { resolution: (256, 192), ..state(0.1) });
        assert_eq!(r.writes[3], (RESOLUTION.to_string(), UniformValue::IVec2([256, 192])));
    }

    #[test]
    fn invalidate_forces_rebind() {
        let mut r = Recorder::default();
        let mut b = FrameUniformBinder::new();
        b.bind(&mut r, &state(0.0));
        b.invalidate();
        b.bind(&mut r, &state(0.1));
        assert_eq!(r.names().iter().filter(|n| **n == RESOLUTION).count(), 2);
    }

    // ── values ────────────────────────────────────────────────────────────

    #[test]
    fn day_time_is_negated_night_flag() {
        let mut r = Recorder::default();
        let mut b = FrameUniformBinder::new();
        b.bind(&mut r, &state(0.0));
        b.bind(&mut r, &FrameState { night_mode: false, ..state(0.0) });
        let day: Vec<_> = r.writes.iter().filter(|(n, _)| n == DAY_TIME).map(|(_, v)| *v).collect();
        assert_eq!(day, [UniformValue::Int(0), UniformValue::Int(1)]);
    }

    #[test]
    fn u_time_carries_elapsed_seconds() {
        let mut r = Recorder::default();
        FrameUniformBinder::new().bind(&mut r, &state(3.25));
        assert!(r.writes.contains(&(U_TIME.to_string(), UniformValue::Float(3.25))));
    }

    // ── scaled_resolution ─────────────────────────────────────────────────

    #[test]
    fn scaled_resolution_divides() {
        assert_eq!(scaled_resolution(1024, 768, 8), (128, 96));
        assert_eq!(scaled_resolution(1024, 768, 1), (1024, 768));
    }

    #[test]
    fn scaled_resolution_zero_divisor_is_identity() {
        assert_eq!(scaled_resolution(640, 480, 0), (640, 480));
    }
}
