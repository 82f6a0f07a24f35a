//! Simulation frame clock.
//!
//! The host calls [`SimClock::advance`] once per rendered frame with the
//! wall-clock delta. The clock is the only time source in the simulation:
//! spawn admission, power-up timers, invulnerability windows, and the
//! difficulty sampler all compare against [`SimClock::now`].
//!
//! Deltas are sanitised before use. Non-finite or negative deltas count as
//! zero and a stalled host (tab in the background, debugger pause) is
//! clamped to `max_frame_dt`, so one late frame never teleports animals.

/// Default upper bound on a single frame's delta, in seconds.
pub const DEFAULT_MAX_FRAME_DT: f32 = 0.1;

/// Frame counter and simulation time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimClock {
    frame: u64,
    time: f64,
    last_dt: f32,
    max_frame_dt: f32,
}

impl Default for SimClock {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_FRAME_DT)
    }
}

impl SimClock {
    /// Create a clock at frame 0, time 0.
    pub const fn new(max_frame_dt: f32) -> Self {
        Self {
            frame: 0,
            time: 0.0,
            last_dt: 0.0,
            max_frame_dt,
        }
    }

    /// Advance one frame. Returns the new frame number.
    pub fn advance(&mut self, dt: f32) -> u64 {
        let dt = self.sanitize(dt);
        self.frame = self.frame.saturating_add(1);
        self.time += f64::from(dt);
        self.last_dt = dt;
        self.frame
    }

    /// Current frame number (0 before the first advance).
    pub const fn frame(&self) -> u64 {
        self.frame
    }

    /// Simulation seconds elapsed.
    pub const fn now(&self) -> f64 {
        self.time
    }

    /// The clamped delta of the last frame.
    pub const fn last_dt(&self) -> f32 {
        self.last_dt
    }

    fn sanitize(&self, dt: f32) -> f32 {
        if !dt.is_finite() || dt <= 0.0 {
            return 0.0;
        }
        let cap = if self.max_frame_dt.is_finite() && self.max_frame_dt > 0.0 {
            self.max_frame_dt
        } else {
            DEFAULT_MAX_FRAME_DT
        };
        dt.min(cap)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_starts_at_zero() {
        let clock = SimClock::default();
        assert_eq!(clock.frame(), 0);
        assert!(clock.now().abs() < f64::EPSILON);
    }

    #[test]
    fn advance_accumulates_time() {
        let mut clock = SimClock::default();
        assert_eq!(clock.advance(0.016), 1);
        assert_eq!(clock.advance(0.016), 2);
        assert!((clock.now() - 0.032).abs() < 1e-6);
    }

    #[test]
    fn large_deltas_are_clamped() {
        let mut clock = SimClock::default();
        clock.advance(5.0);
        assert!((clock.last_dt() - 0.1).abs() < f32::EPSILON);
        assert!((clock.now() - 0.1).abs() < 1e-6);
    }

    #[test]
    fn bad_deltas_count_as_zero() {
        let mut clock = SimClock::default();
        for dt in [f32::NAN, f32::INFINITY, -1.0, 0.0] {
            clock.advance(dt);
        }
        assert_eq!(clock.frame(), 4);
        assert!(clock.now().abs() < f64::EPSILON);
    }
}
