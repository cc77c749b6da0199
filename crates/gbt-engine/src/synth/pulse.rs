//! Square wave channels 1 and 2.

use super::envelope::{Envelope, LengthCounter};

/// Duty waveforms, one bit per eighth of a period: 12.5%, 25%, 50%, 75%.
const DUTY: [u8; 4] = [0b0000_0001, 0b1000_0001, 0b1000_0111, 0b0111_1110];

const MAX_FREQUENCY: u16 = 2047;

/// Outcome of a sweep clock.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum SweepStep {
    Idle,
    Update(u16),
    Overflow,
}

/// NR10 frequency sweep, clocked at 128 Hz.
#[derive(Clone, Copy, Debug, Default)]
struct Sweep {
    period: u8,
    negate: bool,
    shift: u8,
    timer: u8,
    shadow: u16,
    enabled: bool,
}

impl Sweep {
    fn write(&mut self, nr10: u8) {
        self.period = (nr10 >> 4) & 0x07;
        self.negate = nr10 & 0x08 != 0;
        self.shift = nr10 & 0x07;
    }

    fn reload(&mut self) {
        self.timer = if self.period == 0 { 8 } else { self.period };
    }

    fn next(&self) -> Option<u16> {
        let delta = self.shadow >> self.shift;
        let freq = if self.negate {
            self.shadow - delta
        } else {
            self.shadow + delta
        };
        (freq <= MAX_FREQUENCY).then_some(freq)
    }

    /// Returns false if the first calculation already overflows.
    fn trigger(&mut self, frequency: u16) -> bool {
        self.shadow = frequency;
        self.reload();
        self.enabled = self.period != 0 || self.shift != 0;
        self.shift == 0 || self.next().is_some()
    }

    fn clock(&mut self) -> SweepStep {
        self.timer = self.timer.saturating_sub(1);
        if self.timer != 0 {
            return SweepStep::Idle;
        }
        self.reload();
        if !self.enabled || self.period == 0 {
            return SweepStep::Idle;
        }
        match self.next() {
            None => SweepStep::Overflow,
            Some(_) if self.shift == 0 => SweepStep::Idle,
            Some(freq) => {
                self.shadow = freq;
                if self.next().is_some() {
                    SweepStep::Update(freq)
                } else {
                    SweepStep::Overflow
                }
            }
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub(crate) struct Pulse {
    enabled: bool,
    has_sweep: bool,
    duty: u8,
    frequency: u16,
    phase: f32,
    envelope: Envelope,
    length: LengthCounter,
    sweep: Sweep,
}

impl Pulse {
    pub fn new(has_sweep: bool) -> Self {
        Self {
            enabled: false,
            has_sweep,
            duty: 2,
            frequency: 0,
            phase: 0.0,
            envelope: Envelope::default(),
            length: LengthCounter::new(64),
            sweep: Sweep::default(),
        }
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Write NRx0..NRx4, given as an offset 0-4.
    pub fn write(&mut self, offset: u8, value: u8) {
        match offset {
            0 => self.sweep.write(value),
            1 => {
                self.duty = value >> 6;
                self.length.load(value & 0x3F);
            }
            2 => {
                self.envelope.write(value);
                if !self.envelope.dac_enabled() {
                    self.enabled = false;
                }
            }
            3 => self.frequency = (self.frequency & 0x700) | value as u16,
            4 => {
                self.frequency = (self.frequency & 0xFF) | ((value as u16 & 0x07) << 8);
                self.length.enabled = value & 0x40 != 0;
                if value & 0x80 != 0 {
                    self.trigger();
                }
            }
            _ => {}
        }
    }

    fn trigger(&mut self) {
        self.enabled = self.envelope.dac_enabled();
        self.length.trigger();
        self.envelope.trigger();
        if self.has_sweep && !self.sweep.trigger(self.frequency) {
            self.enabled = false;
        }
    }

    pub fn clock_length(&mut self) {
        if self.length.clock() {
            self.enabled = false;
        }
    }

    pub fn clock_envelope(&mut self) {
        self.envelope.clock();
    }

    pub fn clock_sweep(&mut self) {
        if !self.has_sweep {
            return;
        }
        match self.sweep.clock() {
            SweepStep::Idle => {}
            SweepStep::Update(freq) => self.frequency = freq,
            SweepStep::Overflow => self.enabled = false,
        }
    }

    /// Advance by one output sample and return the level, -1.0 to 1.0.
    pub fn sample(&mut self, sample_rate: f32) -> f32 {
        if !self.enabled {
            return 0.0;
        }
        let hz = 131072.0 / (2048 - self.frequency) as f32;
        self.phase = (self.phase + hz / sample_rate).fract();
        let step = (self.phase * 8.0) as u8 & 0x07;
        let volume = self.envelope.volume() as f32 / 15.0;
        if DUTY[self.duty as usize] >> step & 1 != 0 {
            volume
        } else {
            -volume
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trigger_needs_dac() {
        let mut pulse = Pulse::new(false);
        pulse.write(4, 0x80);
        assert!(!pulse.enabled());

        pulse.write(2, 0xF0);
        pulse.write(4, 0x80);
        assert!(pulse.enabled());

        pulse.write(2, 0x00);
        assert!(!pulse.enabled());
    }

    #[test]
    fn sweep_overflow_disables() {
        let mut pulse = Pulse::new(true);
        pulse.write(0, 0x11);
        pulse.write(2, 0xF0);
        pulse.write(3, 0x00);
        pulse.write(4, 0x85);
        assert!(pulse.enabled());

        // 0x500 -> 0x780, and the follow-up check overflows
        pulse.clock_sweep();
        assert!(!pulse.enabled());
    }

    #[test]
    fn sweep_raises_frequency() {
        let mut pulse = Pulse::new(true);
        pulse.write(0, 0x12);
        pulse.write(2, 0xF0);
        pulse.write(3, 0x00);
        pulse.write(4, 0x81);
        pulse.clock_sweep();
        assert_eq!(pulse.frequency, 0x140);
    }

    #[test]
    fn output_swings_both_ways() {
        let mut pulse = Pulse::new(false);
        pulse.write(1, 0x80);
        pulse.write(2, 0xF0);
        pulse.write(3, 0x00);
        pulse.write(4, 0x87);

        let samples: alloc::vec::Vec<f32> = (0..200).map(|_| pulse.sample(48000.0)).collect();
        assert!(samples.iter().any(|s| *s == 1.0));
        assert!(samples.iter().any(|s| *s == -1.0));
    }
}
