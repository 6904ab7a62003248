/// Tracks simulation time: a monotonic tick counter.
///
/// Tick 0 is "before the first step"; the first call to [`SimClock::advance`]
/// yields tick 1.
#[derive(Debug, Clone)]
pub struct SimClock {
    tick: u64,
    ticks_per_hour: u64,
}

impl SimClock {
    /// Create a new clock at tick 0.
    pub fn new(ticks_per_hour: u64) -> Self {
        Self {
            tick: 0,
            ticks_per_hour: ticks_per_hour.max(1),
        }
    }

    /// Advance the clock by one tick. Returns the new tick number.
    pub fn advance(&mut self) -> u64 {
        self.tick += 1;
        self.tick
    }

    /// Return the current tick number.
    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Elapsed in-world hours.
    pub fn elapsed_hours(&self) -> f64 {
        self.tick as f64 / self.ticks_per_hour as f64
    }

    /// Return the configured number of ticks per in-world hour.
    pub fn ticks_per_hour(&self) -> u64 {
        self.ticks_per_hour
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_initial_state() {
        let clock = SimClock::new(2500);
        assert_eq!(clock.tick(), 0);
        assert_eq!(clock.elapsed_hours(), 0.0);
    }

    #[test]
    fn clock_advance_increments() {
        let mut clock = SimClock::new(2);
        clock.advance();
        clock.advance();
        assert_eq!(clock.advance(), 3);
        assert!((clock.elapsed_hours() - 1.5).abs() < f64::EPSILON);
    }

    #[test]
    fn zero_ticks_per_hour_is_clamped() {
        let clock = SimClock::new(0);
        assert_eq!(clock.ticks_per_hour(), 1);
    }
}
