//! Software APU.
//!
//! `Synth` accepts the same register writes as the hardware and renders
//! them to interleaved stereo samples. Channels are point sampled once per
//! output sample; the 512 Hz frame sequencer clocks length counters (256 Hz),
//! sweep (128 Hz) and envelopes (64 Hz).

mod envelope;
mod noise;
mod pulse;
mod wave;

use gbt_ir::ChType;

use crate::apu::{reg, Apu};
use crate::frame::Frame;
use crate::mixer::{Mixer, OutputFlags, Terminal};

use noise::Noise;
use pulse::Pulse;
use wave::Wave;

/// Master clock of the sound hardware, in Hz.
pub const CLOCK_RATE: u32 = 4_194_304;

const SEQUENCER_RATE: f32 = 512.0;

/// A register-driven four-channel synthesizer.
#[derive(Clone, Debug)]
pub struct Synth {
    sample_rate: u32,
    regs: [u8; 0x20],
    power: bool,
    ch1: Pulse,
    ch2: Pulse,
    ch3: Wave,
    ch4: Noise,
    wave_ram: [u8; 16],
    sequencer_phase: f32,
    sequencer_step: u8,
    mixer: Mixer,
}

impl Synth {
    pub fn new(sample_rate: u32) -> Self {
        let mut mixer = Mixer::new();
        mixer.set_terminal_enable(Terminal::S01, false);
        mixer.set_terminal_enable(Terminal::S02, false);
        Self {
            sample_rate: sample_rate.max(1),
            regs: [0; 0x20],
            power: false,
            ch1: Pulse::new(true),
            ch2: Pulse::new(false),
            ch3: Wave::new(),
            ch4: Noise::new(),
            wave_ram: [0; 16],
            sequencer_phase: 0.0,
            sequencer_step: 0,
            mixer,
        }
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Power off and forget all register state.
    pub fn reset(&mut self) {
        *self = Self::new(self.sample_rate);
    }

    pub fn mixer(&self) -> &Mixer {
        &self.mixer
    }

    pub fn is_powered(&self) -> bool {
        self.power
    }

    /// Is the channel currently producing sound?
    pub fn channel_enabled(&self, ch: ChType) -> bool {
        match ch {
            ChType::Ch1 => self.ch1.enabled(),
            ChType::Ch2 => self.ch2.enabled(),
            ChType::Ch3 => self.ch3.enabled(),
            ChType::Ch4 => self.ch4.enabled(),
        }
    }

    fn power_off(&mut self) {
        let wave_ram = self.wave_ram;
        self.reset();
        self.wave_ram = wave_ram;
    }

    fn power_on(&mut self) {
        self.power = true;
        self.sequencer_step = 0;
        self.mixer.set_terminal_enable(Terminal::S01, true);
        self.mixer.set_terminal_enable(Terminal::S02, true);
    }

    fn clock_sequencer(&mut self) {
        let step = self.sequencer_step;
        if step % 2 == 0 {
            self.ch1.clock_length();
            self.ch2.clock_length();
            self.ch3.clock_length();
            self.ch4.clock_length();
        }
        if step == 2 || step == 6 {
            self.ch1.clock_sweep();
        }
        if step == 7 {
            self.ch1.clock_envelope();
            self.ch2.clock_envelope();
            self.ch4.clock_envelope();
        }
        self.sequencer_step = (step + 1) % 8;
    }

    /// Render one stereo frame.
    pub fn next_frame(&mut self) -> Frame {
        if !self.power {
            return Frame::silence();
        }
        let rate = self.sample_rate as f32;
        self.sequencer_phase += SEQUENCER_RATE / rate;
        while self.sequencer_phase >= 1.0 {
            self.sequencer_phase -= 1.0;
            self.clock_sequencer();
        }

        let in1 = self.ch1.sample(rate);
        let in2 = self.ch2.sample(rate);
        let in3 = self.ch3.sample(&self.wave_ram, rate);
        let in4 = self.ch4.sample(rate);
        self.mixer.get_output(in1, in2, in3, in4)
    }

    /// Fill `out` with interleaved stereo samples. A trailing odd sample is
    /// left untouched.
    pub fn run(&mut self, out: &mut [f32]) {
        for pair in out.chunks_exact_mut(2) {
            let frame = self.next_frame();
            pair[0] = frame.left;
            pair[1] = frame.right;
        }
    }
}

impl Apu for Synth {
    fn write_register(&mut self, register: u8, value: u8) {
        if (reg::WAVE_RAM..=reg::WAVE_RAM_END).contains(&register) {
            self.wave_ram[(register - reg::WAVE_RAM) as usize] = value;
            return;
        }
        if register == reg::NR52 {
            match (self.power, value & 0x80 != 0) {
                (true, false) => self.power_off(),
                (false, true) => self.power_on(),
                _ => {}
            }
            return;
        }
        if !self.power || !(reg::NR10..reg::NR52).contains(&register) {
            return;
        }

        self.regs[(register - 0x10) as usize] = value;
        match register {
            reg::NR10..=reg::NR14 => self.ch1.write(register - reg::NR10, value),
            reg::NR21..=reg::NR24 => self.ch2.write(register - (reg::NR21 - 1), value),
            reg::NR30..=reg::NR34 => self.ch3.write(register - reg::NR30, value),
            reg::NR41..=reg::NR44 => self.ch4.write(register - (reg::NR41 - 1), value),
            reg::NR50 => {
                self.mixer.set_terminal_volume(Terminal::S01, value & 0x07);
                self.mixer.set_terminal_volume(Terminal::S02, (value >> 4) & 0x07);
            }
            reg::NR51 => self.mixer.set_enable(OutputFlags::from_bits_retain(value)),
            _ => {}
        }
    }

    fn read_register(&self, register: u8) -> u8 {
        match register {
            reg::NR52 => {
                let mut value = 0x70;
                if self.power {
                    value |= 0x80;
                }
                for ch in ChType::ALL {
                    if self.channel_enabled(ch) {
                        value |= 1 << ch.index();
                    }
                }
                value
            }
            reg::WAVE_RAM..=reg::WAVE_RAM_END => self.wave_ram[(register - reg::WAVE_RAM) as usize],
            0x10..=0x2F => self.regs[(register - 0x10) as usize],
            _ => 0xFF,
        }
    }
}
