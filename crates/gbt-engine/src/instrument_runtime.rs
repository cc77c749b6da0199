//! Per-frame instrument sequence playback.

use gbt_ir::{InstrumentTable, SequenceEnumerator, SequenceKind};

use crate::channel::ChannelState;
use crate::frequency::FrequencyControl;

/// Plays an instrument's sequences, one value per frame.
///
/// Holds the instrument by id and looks it up each frame, so the runtime
/// never owns instrument data. An id with no instrument behind it does
/// nothing.
#[derive(Clone, Copy, Debug, Default)]
pub struct InstrumentRuntime {
    instrument: Option<u8>,
    cursors: [SequenceEnumerator; 4],
}

impl InstrumentRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn instrument(&self) -> Option<u8> {
        self.instrument
    }

    /// Select an instrument. Sequences start over on the next `restart`.
    pub fn set_instrument(&mut self, id: Option<u8>) {
        self.instrument = id;
    }

    /// Rewind all sequences, done on every note trigger.
    pub fn restart(&mut self) {
        for cursor in &mut self.cursors {
            cursor.restart();
        }
    }

    /// Advance each sequence by one frame and apply its value.
    pub fn step(
        &mut self,
        instruments: &InstrumentTable,
        state: &mut ChannelState,
        fc: &mut FrequencyControl,
    ) {
        let Some(inst) = self.instrument.and_then(|id| instruments.get(id)) else {
            return;
        };

        for kind in SequenceKind::ALL {
            let Some(value) = self.cursors[kind.index()].next(inst.sequence(kind)) else {
                continue;
            };
            match kind {
                SequenceKind::Arp => fc.set_instrument_arp(value as i8),
                SequenceKind::Panning => state.panning = value & 0x3,
                SequenceKind::Pitch => fc.add_instrument_pitch(value as i8),
                SequenceKind::Timbre => state.timbre = value & 0x3,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frequency::NOTE_TABLE;
    use gbt_ir::{ChType, ChannelKind, Instrument, Sequence};

    fn table() -> InstrumentTable {
        let mut inst = Instrument::new("lead");
        *inst.sequence_mut(SequenceKind::Timbre) = Sequence::new(&[0, 1, 2], Some(1));
        *inst.sequence_mut(SequenceKind::Arp) = Sequence::signed(&[0, 12], None);
        *inst.sequence_mut(SequenceKind::Pitch) = Sequence::signed(&[-1], Some(0));

        let mut instruments = InstrumentTable::new();
        assert!(instruments.insert(3, inst).is_ok());
        instruments
    }

    #[test]
    fn sequences_drive_channel_state() {
        let instruments = table();
        let mut ir = InstrumentRuntime::new();
        let mut state = ChannelState::new(ChType::Ch1);
        let mut fc = FrequencyControl::new(ChannelKind::Tone);
        fc.apply(Some(24), &[]);

        ir.set_instrument(Some(3));
        ir.restart();

        let mut timbres = alloc::vec::Vec::new();
        let mut freqs = alloc::vec::Vec::new();
        for _ in 0..5 {
            ir.step(&instruments, &mut state, &mut fc);
            fc.step();
            timbres.push(state.timbre);
            freqs.push(fc.frequency());
        }

        assert_eq!(timbres, [0, 1, 2, 1, 2]);
        // arp holds its last value, pitch keeps accumulating
        assert_eq!(
            freqs,
            [
                NOTE_TABLE[24] - 1,
                NOTE_TABLE[36] - 2,
                NOTE_TABLE[36] - 3,
                NOTE_TABLE[36] - 4,
                NOTE_TABLE[36] - 5,
            ]
        );
    }

    #[test]
    fn unknown_instrument_is_ignored() {
        let instruments = table();
        let mut ir = InstrumentRuntime::new();
        let mut state = ChannelState::new(ChType::Ch2);
        let mut fc = FrequencyControl::new(ChannelKind::Tone);

        ir.set_instrument(Some(40));
        ir.step(&instruments, &mut state, &mut fc);
        assert_eq!(state, ChannelState::new(ChType::Ch2));
    }
}
