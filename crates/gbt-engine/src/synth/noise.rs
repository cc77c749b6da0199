//! Channel 4, the LFSR noise channel.

use super::envelope::{Envelope, LengthCounter};

#[derive(Clone, Copy, Debug)]
pub(crate) struct Noise {
    enabled: bool,
    envelope: Envelope,
    length: LengthCounter,
    lfsr: u16,
    /// 7-bit mode
    short: bool,
    shift: u8,
    divisor: u8,
    phase: f32,
}

impl Noise {
    pub fn new() -> Self {
        Self {
            enabled: false,
            envelope: Envelope::default(),
            length: LengthCounter::new(64),
            lfsr: 0x7FFF,
            short: false,
            shift: 0,
            divisor: 0,
            phase: 0.0,
        }
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Write NR41..NR44, given as an offset 1-4.
    pub fn write(&mut self, offset: u8, value: u8) {
        match offset {
            1 => self.length.load(value & 0x3F),
            2 => {
                self.envelope.write(value);
                if !self.envelope.dac_enabled() {
                    self.enabled = false;
                }
            }
            3 => {
                self.shift = value >> 4;
                self.short = value & 0x08 != 0;
                self.divisor = value & 0x07;
            }
            4 => {
                self.length.enabled = value & 0x40 != 0;
                if value & 0x80 != 0 {
                    self.enabled = self.envelope.dac_enabled();
                    self.length.trigger();
                    self.envelope.trigger();
                    self.lfsr = 0x7FFF;
                }
            }
            _ => {}
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

    /// LFSR clocks per second: 524288 / r / 2^(s+1), with r = 0 read as 0.5.
    fn rate(&self) -> f32 {
        let divisor = if self.divisor == 0 { 0.5 } else { self.divisor as f32 };
        524288.0 / divisor / (1u32 << (self.shift + 1)) as f32
    }

    fn clock_lfsr(&mut self) {
        let bit = (self.lfsr ^ (self.lfsr >> 1)) & 1;
        self.lfsr = (self.lfsr >> 1) | (bit << 14);
        if self.short {
            self.lfsr = (self.lfsr & !(1 << 6)) | (bit << 6);
        }
    }

    /// Advance by one output sample and return the level, -1.0 to 1.0.
    pub fn sample(&mut self, sample_rate: f32) -> f32 {
        if !self.enabled {
            return 0.0;
        }
        self.phase += self.rate() / sample_rate;
        let clocks = self.phase as u32;
        self.phase -= clocks as f32;
        for _ in 0..clocks {
            self.clock_lfsr();
        }

        let volume = self.envelope.volume() as f32 / 15.0;
        if self.lfsr & 1 == 0 {
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
    fn short_mode_repeats_every_127_clocks() {
        let mut noise = Noise::new();
        noise.short = true;
        let mut bits = alloc::vec::Vec::new();
        for _ in 0..254 {
            noise.clock_lfsr();
            bits.push(noise.lfsr & 1);
        }
        assert_eq!(bits[..127], bits[127..]);
    }

    #[test]
    fn rate_from_nr43() {
        let mut noise = Noise::new();
        noise.write(3, 0x00);
        assert_eq!(noise.rate(), 524288.0);
        noise.write(3, 0x21);
        assert_eq!(noise.rate(), 65536.0);
    }

    #[test]
    fn output_is_noisy() {
        let mut noise = Noise::new();
        noise.write(2, 0xF0);
        noise.write(3, 0x10);
        noise.write(4, 0x80);
        assert!(noise.enabled());

        let samples: alloc::vec::Vec<f32> = (0..100).map(|_| noise.sample(44100.0)).collect();
        assert!(samples.iter().any(|s| *s > 0.0));
        assert!(samples.iter().any(|s| *s < 0.0));
    }
}
