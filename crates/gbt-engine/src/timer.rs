//! Frame-rate pacer for row timing.

use gbt_ir::{Speed, DEFAULT_SPEED, SPEED_MAX, SPEED_MIN, UNIT_SPEED};

/// Decides which frames start a new row.
///
/// The period is a Q4.4 frames-per-row value. Every frame adds one unit to
/// the counter; the row ends when the counter reaches the period and the
/// remainder carries over, so fractional speeds alternate row lengths.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Timer {
    period: Speed,
    counter: u8,
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}

impl Timer {
    pub const fn new() -> Self {
        Self {
            period: DEFAULT_SPEED,
            counter: 0,
        }
    }

    /// True on the first frame of a row.
    pub fn active(&self) -> bool {
        self.counter < UNIT_SPEED
    }

    pub fn period(&self) -> Speed {
        self.period
    }

    /// Set the speed, clamped to `SPEED_MIN..=SPEED_MAX`.
    pub fn set_period(&mut self, period: Speed) {
        self.period = period.clamp(SPEED_MIN, SPEED_MAX);
        if self.counter >= self.period {
            self.counter = 0;
        }
    }

    /// Advance one frame. Returns true when the current row is over.
    pub fn step(&mut self) -> bool {
        // period <= 0xF0 so this cannot overflow
        self.counter += UNIT_SPEED;
        if self.counter >= self.period {
            self.counter -= self.period;
            true
        } else {
            false
        }
    }

    pub fn reset(&mut self) {
        self.counter = 0;
    }
}
