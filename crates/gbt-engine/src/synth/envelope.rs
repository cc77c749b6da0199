//! Volume envelope and length counter shared by the channels.

/// NRx2 volume envelope, clocked at 64 Hz.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct Envelope {
    initial: u8,
    up: bool,
    period: u8,
    volume: u8,
    timer: u8,
}

impl Envelope {
    pub fn write(&mut self, nrx2: u8) {
        self.initial = nrx2 >> 4;
        self.up = nrx2 & 0x08 != 0;
        self.period = nrx2 & 0x07;
    }

    /// The DAC is off when the top five bits of NRx2 are clear.
    pub fn dac_enabled(&self) -> bool {
        self.initial != 0 || self.up
    }

    pub fn trigger(&mut self) {
        self.volume = self.initial;
        self.timer = self.period;
    }

    pub fn clock(&mut self) {
        if self.period == 0 {
            return;
        }
        self.timer = self.timer.saturating_sub(1);
        if self.timer == 0 {
            self.timer = self.period;
            if self.up && self.volume < 15 {
                self.volume += 1;
            } else if !self.up && self.volume > 0 {
                self.volume -= 1;
            }
        }
    }

    pub fn volume(&self) -> u8 {
        self.volume
    }
}

/// Length counter, clocked at 256 Hz. Disables its channel when it runs out.
#[derive(Clone, Copy, Debug)]
pub(crate) struct LengthCounter {
    max: u16,
    counter: u16,
    pub enabled: bool,
}

impl LengthCounter {
    pub const fn new(max: u16) -> Self {
        Self {
            max,
            counter: 0,
            enabled: false,
        }
    }

    pub fn load(&mut self, value: u8) {
        self.counter = self.max - (value as u16).min(self.max - 1);
    }

    pub fn trigger(&mut self) {
        if self.counter == 0 {
            self.counter = self.max;
        }
    }

    /// Returns true when the counter just expired.
    pub fn clock(&mut self) -> bool {
        if self.enabled && self.counter > 0 {
            self.counter -= 1;
            self.counter == 0
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_decays_to_zero() {
        let mut env = Envelope::default();
        env.write(0x31);
        assert!(env.dac_enabled());
        env.trigger();
        assert_eq!(env.volume(), 3);
        for _ in 0..10 {
            env.clock();
        }
        assert_eq!(env.volume(), 0);
    }

    #[test]
    fn envelope_rises_with_period() {
        let mut env = Envelope::default();
        env.write(0x0A);
        env.trigger();
        env.clock();
        assert_eq!(env.volume(), 0);
        env.clock();
        assert_eq!(env.volume(), 1);
    }

    #[test]
    fn zero_envelope_turns_dac_off() {
        let mut env = Envelope::default();
        env.write(0x07);
        assert!(!env.dac_enabled());
    }

    #[test]
    fn length_expires() {
        let mut length = LengthCounter::new(64);
        length.load(62);
        length.enabled = true;
        assert!(!length.clock());
        assert!(length.clock());
        assert!(!length.clock());
    }
}
