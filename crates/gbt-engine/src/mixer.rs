//! Four-channel to stereo mixer.

use bitflags::bitflags;

use crate::frame::Frame;

/// Highest terminal volume.
pub const MAX_VOLUME: u8 = 7;

/// Gain for each terminal volume step, `((v + 1) / 8)^2`.
pub const VOLUME_TABLE: [f32; MAX_VOLUME as usize + 1] =
    [0.015625, 0.0625, 0.140625, 0.25, 0.390625, 0.5625, 0.765625, 1.0];

/// Per-channel gain, so four full-scale channels stay within 0.8.
const VOL_MULTIPLIER: f32 = 0.2;

/// Output terminal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Terminal {
    /// Left
    S01,
    /// Right
    S02,
}

impl Terminal {
    const fn index(self) -> usize {
        self as usize
    }
}

bitflags! {
    /// Channel to terminal routing, laid out like NR51.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct OutputFlags: u8 {
        const LEFT1 = 0x01;
        const LEFT2 = 0x02;
        const LEFT3 = 0x04;
        const LEFT4 = 0x08;
        const RIGHT1 = 0x10;
        const RIGHT2 = 0x20;
        const RIGHT3 = 0x40;
        const RIGHT4 = 0x80;
    }
}

/// Folds four channel outputs into one stereo frame.
#[derive(Clone, Copy, Debug)]
pub struct Mixer {
    enabled: [bool; 2],
    volume: [u8; 2],
    routing: OutputFlags,
}

impl Default for Mixer {
    fn default() -> Self {
        Self::new()
    }
}

impl Mixer {
    /// Both terminals on at full volume, nothing routed.
    pub const fn new() -> Self {
        Self {
            enabled: [true; 2],
            volume: [MAX_VOLUME; 2],
            routing: OutputFlags::empty(),
        }
    }

    pub fn set_terminal_enable(&mut self, term: Terminal, enabled: bool) {
        self.enabled[term.index()] = enabled;
    }

    /// Set a terminal's volume. Values above `MAX_VOLUME` are clamped.
    pub fn set_terminal_volume(&mut self, term: Terminal, volume: u8) {
        self.volume[term.index()] = volume.min(MAX_VOLUME);
    }

    pub fn terminal_volume(&self, term: Terminal) -> u8 {
        self.volume[term.index()]
    }

    pub fn is_terminal_enabled(&self, term: Terminal) -> bool {
        self.enabled[term.index()]
    }

    pub fn set_enable(&mut self, routing: OutputFlags) {
        self.routing = routing;
    }

    pub fn enable(&self) -> OutputFlags {
        self.routing
    }

    /// Mix one sample from each channel.
    pub fn get_output(&self, in1: f32, in2: f32, in3: f32, in4: f32) -> Frame {
        let inputs = [in1, in2, in3, in4];
        Frame {
            left: self.terminal_output(Terminal::S01, &inputs),
            right: self.terminal_output(Terminal::S02, &inputs),
        }
    }

    fn terminal_output(&self, term: Terminal, inputs: &[f32; 4]) -> f32 {
        if !self.enabled[term.index()] {
            return 0.0;
        }
        let shift = term.index() * 4;
        let routing = self.routing.bits() >> shift;
        let sum: f32 = inputs
            .iter()
            .enumerate()
            .filter(|(i, _)| routing & (1 << i) != 0)
            .map(|(_, sample)| sample * VOL_MULTIPLIER)
            .sum();
        sum * VOLUME_TABLE[self.volume[term.index()] as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn all_routed_is_balanced_and_headroomed() {
        let mut mixer = Mixer::new();
        mixer.set_enable(OutputFlags::all());
        let frame = mixer.get_output(1.0, 1.0, 1.0, 1.0);

        assert_eq!(frame.left, frame.right);
        assert!(frame.left <= 0.8 * VOLUME_TABLE[MAX_VOLUME as usize] + f32::EPSILON);
        assert_relative_eq!(frame.left, 0.8, epsilon = 1e-6);
    }

    #[test]
    fn routing_selects_inputs() {
        let mut mixer = Mixer::new();
        mixer.set_enable(OutputFlags::LEFT1 | OutputFlags::RIGHT3);
        let frame = mixer.get_output(0.5, 1.0, -1.0, 1.0);

        assert_relative_eq!(frame.left, 0.1);
        assert_relative_eq!(frame.right, -0.2);
    }

    #[test]
    fn disabled_terminal_is_silent() {
        let mut mixer = Mixer::new();
        mixer.set_enable(OutputFlags::all());
        mixer.set_terminal_enable(Terminal::S02, false);
        let frame = mixer.get_output(1.0, 1.0, 1.0, 1.0);
        assert_eq!(frame.right, 0.0);
        assert!(frame.left > 0.0);
    }

    #[test]
    fn volume_is_clamped_and_scales() {
        let mut mixer = Mixer::new();
        mixer.set_terminal_volume(Terminal::S01, 20);
        assert_eq!(mixer.terminal_volume(Terminal::S01), MAX_VOLUME);

        mixer.set_enable(OutputFlags::LEFT2);
        mixer.set_terminal_volume(Terminal::S01, 3);
        let frame = mixer.get_output(0.0, 1.0, 0.0, 0.0);
        assert_relative_eq!(frame.left, 0.2 * 0.25);
    }

    #[test]
    fn default_routes_nothing() {
        let mixer = Mixer::default();
        assert_eq!(mixer.enable(), OutputFlags::empty());
        assert_eq!(mixer.get_output(1.0, 1.0, 1.0, 1.0), Frame::silence());
    }
}
