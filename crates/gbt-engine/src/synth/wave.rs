//! Channel 3, the wave RAM channel.

use super::envelope::LengthCounter;

#[derive(Clone, Copy, Debug)]
pub(crate) struct Wave {
    enabled: bool,
    dac: bool,
    /// NR32 output level: 0 = mute, 1 = 100%, 2 = 50%, 3 = 25%
    level: u8,
    frequency: u16,
    phase: f32,
    length: LengthCounter,
}

impl Wave {
    pub fn new() -> Self {
        Self {
            enabled: false,
            dac: false,
            level: 0,
            frequency: 0,
            phase: 0.0,
            length: LengthCounter::new(256),
        }
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Write NR30..NR34, given as an offset 0-4.
    pub fn write(&mut self, offset: u8, value: u8) {
        match offset {
            0 => {
                self.dac = value & 0x80 != 0;
                if !self.dac {
                    self.enabled = false;
                }
            }
            1 => self.length.load(value),
            2 => self.level = (value >> 5) & 0x03,
            3 => self.frequency = (self.frequency & 0x700) | value as u16,
            4 => {
                self.frequency = (self.frequency & 0xFF) | ((value as u16 & 0x07) << 8);
                self.length.enabled = value & 0x40 != 0;
                if value & 0x80 != 0 {
                    self.enabled = self.dac;
                    self.length.trigger();
                    self.phase = 0.0;
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

    /// Advance by one output sample and return the level, -1.0 to 1.0.
    pub fn sample(&mut self, ram: &[u8; 16], sample_rate: f32) -> f32 {
        if !self.enabled {
            return 0.0;
        }
        let hz = 65536.0 / (2048 - self.frequency) as f32;
        self.phase = (self.phase + hz / sample_rate).fract();
        if self.level == 0 {
            return 0.0;
        }

        let index = (self.phase * 32.0) as usize & 31;
        let byte = ram[index / 2];
        let nibble = if index % 2 == 0 { byte >> 4 } else { byte & 0x0F };
        let shift = self.level - 1;
        let max = (15 >> shift) as f32;
        ((nibble >> shift) as f32 * 2.0 - max) / 15.0
    }
}
