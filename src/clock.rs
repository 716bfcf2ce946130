use std::time::Duration;

/// Most ticks a single `advance` hands out, so a stalled terminal does not
/// replay seconds of simulation in one frame.
const MAX_CATCH_UP: u32 = 5;

/// Converts elapsed wall-clock time into whole fixed-length ticks.
#[derive(Clone, Debug)]
pub struct Ticker {
    period: Duration,
    accumulator: Duration,
}

impl Ticker {
    pub fn new(period: Duration) -> Self {
        Self {
            period: period.max(Duration::from_millis(1)),
            accumulator: Duration::ZERO,
        }
    }

    /// Adds `elapsed` and returns how many ticks are now due.
    pub fn advance(&mut self, elapsed: Duration) -> u32 {
        self.accumulator += elapsed;
        let mut ticks = 0;
        while self.accumulator >= self.period {
            self.accumulator -= self.period;
            ticks += 1;
            if ticks == MAX_CATCH_UP {
                self.accumulator = Duration::ZERO;
                break;
            }
        }
        ticks
    }

    /// Drops any partial tick.
    pub fn reset(&mut self) {
        self.accumulator = Duration::ZERO;
    }
}
