//! Per-channel register state computed by the runtime.

use bitflags::bitflags;
use gbt_ir::ChType;

bitflags! {
    /// Which parts of a channel changed this frame and need writing.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct UpdateFlags: u8 {
        /// Envelope (or waveform on channel 3)
        const ENVELOPE = 0x01;
        /// Duty, wave output level or noise width
        const TIMBRE = 0x02;
        const PANNING = 0x04;
        /// Channel 1 sweep
        const SWEEP = 0x08;
        const FREQUENCY = 0x10;
        /// Retrigger the channel
        const INIT = 0x20;
        /// Silence the channel
        const CUT = 0x40;
    }
}

/// What a channel should currently sound like.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChannelState {
    /// Is a note sounding?
    pub playing: bool,
    /// NRx2 envelope, or waveform id on channel 3
    pub envelope: u8,
    /// 0-3
    pub timbre: u8,
    /// Bit 0 = left terminal, bit 1 = right terminal
    pub panning: u8,
    /// NR10 (channel 1 only)
    pub sweep: u8,
    /// Frequency register (tone) or noise table index (noise)
    pub frequency: u16,
}

impl ChannelState {
    /// Power-on state for a channel.
    pub const fn new(ch: ChType) -> Self {
        let (envelope, timbre) = match ch {
            ChType::Ch1 | ChType::Ch2 => (0xF0, 2),
            ChType::Ch3 => (0x00, 3),
            ChType::Ch4 => (0xF0, 0),
        };
        Self {
            playing: false,
            envelope,
            timbre,
            panning: 0x3,
            sweep: 0x00,
            frequency: 0,
        }
    }

    /// Flags for every field that differs from `previous`.
    pub fn diff(&self, previous: &ChannelState) -> UpdateFlags {
        let mut flags = UpdateFlags::empty();
        flags.set(UpdateFlags::ENVELOPE, self.envelope != previous.envelope);
        flags.set(UpdateFlags::TIMBRE, self.timbre != previous.timbre);
        flags.set(UpdateFlags::PANNING, self.panning != previous.panning);
        flags.set(UpdateFlags::SWEEP, self.sweep != previous.sweep);
        flags.set(UpdateFlags::FREQUENCY, self.frequency != previous.frequency);
        flags
    }
}
