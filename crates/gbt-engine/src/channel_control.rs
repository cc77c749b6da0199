//! Channel state to register writes.

use gbt_ir::ChType;

use crate::apu::{reg, Apu};
use crate::channel::{ChannelState, UpdateFlags};
use crate::context::RuntimeContext;
use crate::frequency::NOISE_TABLE;

/// NR32 output level for each wave timbre (mute, 25%, 50%, 100%).
const WAVE_LEVELS: [u8; 4] = [0x00, 0x60, 0x40, 0x20];

/// Register just below NRx1 for a channel, so NRx1..NRx4 are base+1..base+4.
const fn base(ch: ChType) -> u8 {
    match ch {
        ChType::Ch1 => reg::NR10,
        ChType::Ch2 => reg::NR21 - 1,
        ChType::Ch3 => reg::NR30,
        ChType::Ch4 => reg::NR41 - 1,
    }
}

/// Write whatever `flags` says changed. `INIT` writes everything and
/// retriggers.
pub(crate) fn update(ch: ChType, ctx: &mut RuntimeContext<'_>, state: &ChannelState, flags: UpdateFlags) {
    if flags.contains(UpdateFlags::PANNING) {
        write_panning(ch, ctx.apu, state.panning);
    }
    if flags.contains(UpdateFlags::CUT) {
        disable(ch, ctx.apu);
        return;
    }
    if !state.playing {
        return;
    }

    let init = flags.contains(UpdateFlags::INIT);
    let base = base(ch);

    if ch == ChType::Ch1 && (init || flags.contains(UpdateFlags::SWEEP)) {
        ctx.apu.write_register(reg::NR10, state.sweep);
    }

    match ch {
        ChType::Ch1 | ChType::Ch2 => {
            if init || flags.contains(UpdateFlags::TIMBRE) {
                ctx.apu.write_register(base + 1, (state.timbre & 0x3) << 6);
            }
            if init || flags.contains(UpdateFlags::ENVELOPE) {
                ctx.apu.write_register(base + 2, state.envelope);
            }
            if init || flags.contains(UpdateFlags::FREQUENCY) {
                write_tone_frequency(ctx.apu, base, state.frequency, init);
            }
        }
        ChType::Ch3 => {
            if init || flags.contains(UpdateFlags::TIMBRE) {
                ctx.apu.write_register(reg::NR32, WAVE_LEVELS[(state.timbre & 0x3) as usize]);
            }
            if init || flags.contains(UpdateFlags::ENVELOPE) {
                upload_wave(ctx, state.envelope);
            }
            if init || flags.contains(UpdateFlags::FREQUENCY) {
                write_tone_frequency(ctx.apu, base, state.frequency, init);
            }
        }
        ChType::Ch4 => {
            if init || flags.contains(UpdateFlags::ENVELOPE) {
                ctx.apu.write_register(reg::NR42, state.envelope);
            }
            if init || flags.intersects(UpdateFlags::FREQUENCY | UpdateFlags::TIMBRE) {
                let index = (state.frequency as usize).min(NOISE_TABLE.len() - 1);
                let width = (state.timbre & 0x1) << 3;
                ctx.apu.write_register(reg::NR43, NOISE_TABLE[index] | width);
            }
            if init {
                ctx.apu.write_register(reg::NR44, 0x80);
            }
        }
    }
}

/// Write the channel's full state, as if it had been owned all along.
pub(crate) fn init(ch: ChType, ctx: &mut RuntimeContext<'_>, state: &ChannelState) {
    if state.playing {
        let flags = UpdateFlags::all().difference(UpdateFlags::CUT);
        update(ch, ctx, state, flags);
    } else {
        disable(ch, ctx.apu);
        write_panning(ch, ctx.apu, state.panning);
    }
}

/// Silence a channel by turning its DAC off.
pub(crate) fn disable(ch: ChType, apu: &mut dyn Apu) {
    match ch {
        ChType::Ch3 => apu.write_register(reg::NR30, 0x00),
        _ => apu.write_register(base(ch) + 2, 0x00),
    }
}

fn write_tone_frequency(apu: &mut dyn Apu, base: u8, frequency: u16, init: bool) {
    let trigger = if init { 0x80 } else { 0x00 };
    apu.write_register(base + 3, (frequency & 0xFF) as u8);
    apu.write_register(base + 4, trigger | ((frequency >> 8) & 0x7) as u8);
}

fn upload_wave(ctx: &mut RuntimeContext<'_>, id: u8) {
    ctx.apu.write_register(reg::NR30, 0x00);
    if let Some(wave) = ctx.waveforms.get(id) {
        for (i, byte) in wave.data.iter().enumerate() {
            ctx.apu.write_register(reg::WAVE_RAM + i as u8, *byte);
        }
    }
    ctx.apu.write_register(reg::NR30, 0x80);
}

fn write_panning(ch: ChType, apu: &mut dyn Apu, panning: u8) {
    let left = 1u8 << ch.index();
    let right = left << 4;
    let mut nr51 = apu.read_register(reg::NR51) & !(left | right);
    if panning & 0x1 != 0 {
        nr51 |= left;
    }
    if panning & 0x2 != 0 {
        nr51 |= right;
    }
    apu.write_register(reg::NR51, nr51);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::apu::RegisterFile;
    use gbt_ir::{InstrumentTable, Waveform, WaveformTable};

    fn playing(ch: ChType, frequency: u16) -> ChannelState {
        let mut state = ChannelState::new(ch);
        state.playing = true;
        state.frequency = frequency;
        state
    }

    #[test]
    fn tone_trigger_writes_registers() {
        let mut apu = RegisterFile::new();
        let instruments = InstrumentTable::new();
        let waveforms = WaveformTable::new();
        let mut ctx = RuntimeContext::new(&mut apu, &instruments, &waveforms);

        let state = playing(ChType::Ch2, 0x6A5);
        init(ChType::Ch2, &mut ctx, &state);

        assert_eq!(apu.read_register(reg::NR21), 0x80);
        assert_eq!(apu.read_register(reg::NR22), 0xF0);
        assert_eq!(apu.read_register(reg::NR23), 0xA5);
        assert_eq!(apu.read_register(reg::NR24), 0x86);
        assert_eq!(apu.read_register(reg::NR51), 0x22);
    }

    #[test]
    fn frequency_change_does_not_retrigger() {
        let mut apu = RegisterFile::new();
        let instruments = InstrumentTable::new();
        let waveforms = WaveformTable::new();
        let mut ctx = RuntimeContext::new(&mut apu, &instruments, &waveforms);

        update(ChType::Ch1, &mut ctx, &playing(ChType::Ch1, 0x123), UpdateFlags::FREQUENCY);
        assert_eq!(apu.read_register(reg::NR14), 0x01);
        assert_eq!(apu.writes(), 2);
    }

    #[test]
    fn wave_upload_brackets_dac() {
        let mut apu = RegisterFile::new();
        let instruments = InstrumentTable::new();
        let mut waveforms = WaveformTable::new();
        assert!(waveforms.insert(2, Waveform::square()).is_ok());
        let mut ctx = RuntimeContext::new(&mut apu, &instruments, &waveforms);

        let mut state = playing(ChType::Ch3, 0x400);
        state.envelope = 2;
        update(ChType::Ch3, &mut ctx, &state, UpdateFlags::ENVELOPE);

        assert_eq!(apu.read_register(reg::NR30), 0x80);
        assert_eq!(apu.wave_ram(), &Waveform::square().data);
        assert_eq!(apu.channel_writes(ChType::Ch3), 18);
    }

    #[test]
    fn noise_uses_table_and_width() {
        let mut apu = RegisterFile::new();
        let instruments = InstrumentTable::new();
        let waveforms = WaveformTable::new();
        let mut ctx = RuntimeContext::new(&mut apu, &instruments, &waveforms);

        let mut state = playing(ChType::Ch4, 59);
        state.timbre = 1;
        update(ChType::Ch4, &mut ctx, &state, UpdateFlags::INIT);
        assert_eq!(apu.read_register(reg::NR43), 0x08);
        assert_eq!(apu.read_register(reg::NR44), 0x80);
    }

    #[test]
    fn cut_and_panning() {
        let mut apu = RegisterFile::new();
        apu.write_register(reg::NR51, 0xFF);
        apu.write_register(reg::NR12, 0xF0);
        let instruments = InstrumentTable::new();
        let waveforms = WaveformTable::new();
        let mut ctx = RuntimeContext::new(&mut apu, &instruments, &waveforms);

        let mut state = ChannelState::new(ChType::Ch1);
        state.panning = 0x2;
        update(ChType::Ch1, &mut ctx, &state, UpdateFlags::CUT | UpdateFlags::PANNING);

        assert_eq!(apu.read_register(reg::NR12), 0x00);
        assert_eq!(apu.read_register(reg::NR51), 0xFE);
    }
}
