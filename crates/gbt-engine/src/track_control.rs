//! Per-channel row interpreter.

use gbt_ir::{ChType, Effect, InstrumentTable, Note, TrackRow};

use crate::channel::{ChannelState, UpdateFlags};
use crate::frequency::FrequencyControl;
use crate::instrument_runtime::InstrumentRuntime;

/// Interprets one channel's track rows and keeps its `ChannelState`.
///
/// Tone and noise channels share this type; the differences live in
/// `FrequencyControl` (pitch units) and in which effects apply (sweep is
/// channel 1 only).
#[derive(Clone, Copy, Debug)]
pub struct TrackControl {
    ch: ChType,
    state: ChannelState,
    fc: FrequencyControl,
    ir: InstrumentRuntime,
    /// Row waiting to be applied
    pending: Option<TrackRow>,
    /// Frames left before `pending` applies
    delay: u8,
    /// Frames left before the channel is cut
    cut: Option<u8>,
}

impl TrackControl {
    pub fn new(ch: ChType) -> Self {
        Self {
            ch,
            state: ChannelState::new(ch),
            fc: FrequencyControl::new(ch.kind()),
            ir: InstrumentRuntime::new(),
            pending: None,
            delay: 0,
            cut: None,
        }
    }

    pub fn channel(&self) -> ChType {
        self.ch
    }

    pub fn state(&self) -> &ChannelState {
        &self.state
    }

    pub fn reset(&mut self) {
        *self = Self::new(self.ch);
    }

    /// Queue a row. It is applied on the next `step`, or after the frames
    /// given by a `DelayedNote` effect.
    pub fn set_row(&mut self, row: &TrackRow) {
        if row.is_empty() {
            return;
        }
        self.delay = row
            .effects
            .iter()
            .find_map(|e| match *e {
                Effect::DelayedNote(frames) => Some(frames),
                _ => None,
            })
            .unwrap_or(0);
        self.pending = Some(*row);
    }

    /// Run one frame and return the registers that need writing.
    pub fn step(&mut self, instruments: &InstrumentTable) -> UpdateFlags {
        let before = self.state;
        let mut flags = UpdateFlags::empty();

        if self.pending.is_some() {
            if self.delay == 0 {
                if let Some(row) = self.pending.take() {
                    flags |= self.apply_row(&row, instruments);
                }
            } else {
                self.delay -= 1;
            }
        }

        if let Some(frames) = self.cut {
            if frames == 0 {
                self.cut = None;
                if self.state.playing {
                    self.state.playing = false;
                    flags |= UpdateFlags::CUT;
                }
            } else {
                self.cut = Some(frames - 1);
            }
        }

        if self.state.playing {
            self.ir.step(instruments, &mut self.state, &mut self.fc);
            self.fc.step();
            self.state.frequency = self.fc.frequency();
        }

        flags | self.state.diff(&before)
    }

    fn apply_row(&mut self, row: &TrackRow, instruments: &InstrumentTable) -> UpdateFlags {
        let mut flags = UpdateFlags::empty();
        let envelope = self.state.envelope;

        let note = match row.note {
            Note::On(n) => Some(n),
            _ => None,
        };
        self.fc.apply(note, &row.effects);

        if row.instrument.is_some() {
            self.ir.set_instrument(row.instrument);
        }

        match row.note {
            Note::On(_) => {
                let glide = self.state.playing && self.fc.is_portamento();
                self.state.playing = true;
                if !glide {
                    flags |= UpdateFlags::INIT;
                    self.ir.restart();
                    let inst_envelope = self
                        .ir
                        .instrument()
                        .and_then(|id| instruments.get(id))
                        .and_then(|inst| inst.envelope);
                    if let Some(env) = inst_envelope {
                        self.state.envelope = env;
                    }
                }
            }
            Note::Cut => {
                self.state.playing = false;
                self.cut = None;
                flags |= UpdateFlags::CUT;
            }
            Note::None => {}
        }

        // Row effects override the instrument's envelope.
        for effect in &row.effects {
            match *effect {
                Effect::SetEnvelope(v) => self.state.envelope = v,
                Effect::SetTimbre(v) => self.state.timbre = v & 0x3,
                Effect::SetPanning(v) => self.state.panning = v & 0x3,
                Effect::SetSweep(v) if self.ch == ChType::Ch1 => self.state.sweep = v,
                Effect::DelayedCut(frames) => self.cut = Some(frames),
                _ => {}
            }
        }

        // A new envelope only takes hold on retrigger.
        if self.state.playing && self.state.envelope != envelope {
            flags |= UpdateFlags::INIT;
        }

        flags
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frequency::NOTE_TABLE;
    use gbt_ir::{Instrument, SequenceKind, Sequence};

    fn instruments() -> InstrumentTable {
        let mut inst = Instrument::new("pluck");
        inst.envelope = Some(0xA3);
        *inst.sequence_mut(SequenceKind::Timbre) = Sequence::new(&[1], None);
        let mut table = InstrumentTable::new();
        assert!(table.insert(0, inst).is_ok());
        table
    }

    #[test]
    fn note_triggers_channel() {
        let table = instruments();
        let mut tc = TrackControl::new(ChType::Ch1);
        tc.set_row(&TrackRow::note(Note::On(24)).with_instrument(0));

        let flags = tc.step(&table);
        assert!(flags.contains(UpdateFlags::INIT | UpdateFlags::FREQUENCY | UpdateFlags::ENVELOPE));
        assert!(flags.contains(UpdateFlags::TIMBRE));
        let state = tc.state();
        assert!(state.playing);
        assert_eq!(state.envelope, 0xA3);
        assert_eq!(state.timbre, 1);
        assert_eq!(state.frequency, NOTE_TABLE[24]);

        // nothing changes on the next frame
        assert!(tc.step(&table).is_empty());
    }

    #[test]
    fn delayed_note_waits() {
        let table = InstrumentTable::new();
        let mut tc = TrackControl::new(ChType::Ch2);
        tc.set_row(&TrackRow::note(Note::On(12)).with_effect(Effect::DelayedNote(2)));

        assert!(tc.step(&table).is_empty());
        assert!(tc.step(&table).is_empty());
        assert!(tc.step(&table).contains(UpdateFlags::INIT));
        assert!(tc.state().playing);
    }

    #[test]
    fn delayed_cut_stops_on_third_frame() {
        let table = InstrumentTable::new();
        let mut tc = TrackControl::new(ChType::Ch4);
        tc.set_row(&TrackRow::note(Note::On(30)).with_effect(Effect::DelayedCut(2)));

        assert!(tc.step(&table).contains(UpdateFlags::INIT));
        assert!(!tc.step(&table).contains(UpdateFlags::CUT));
        assert!(tc.step(&table).contains(UpdateFlags::CUT));
        assert!(!tc.state().playing);
    }

    #[test]
    fn note_cut() {
        let table = InstrumentTable::new();
        let mut tc = TrackControl::new(ChType::Ch3);
        tc.set_row(&TrackRow::note(Note::On(30)));
        tc.step(&table);
        tc.set_row(&TrackRow::note(Note::Cut));
        assert!(tc.step(&table).contains(UpdateFlags::CUT));
        assert!(!tc.state().playing);
    }

    #[test]
    fn envelope_change_retriggers_playing_channel() {
        let table = InstrumentTable::new();
        let mut tc = TrackControl::new(ChType::Ch1);
        tc.set_row(&TrackRow::empty().with_effect(Effect::SetEnvelope(0x57)));
        let flags = tc.step(&table);
        assert_eq!(flags, UpdateFlags::ENVELOPE);

        tc.set_row(&TrackRow::note(Note::On(0)));
        tc.step(&table);
        tc.set_row(&TrackRow::empty().with_effect(Effect::SetEnvelope(0x80)));
        assert!(tc.step(&table).contains(UpdateFlags::INIT | UpdateFlags::ENVELOPE));
    }

    #[test]
    fn portamento_does_not_retrigger() {
        let table = InstrumentTable::new();
        let mut tc = TrackControl::new(ChType::Ch1);
        tc.set_row(&TrackRow::note(Note::On(24)).with_effect(Effect::AutoPortamento(4)));
        assert!(tc.step(&table).contains(UpdateFlags::INIT));

        tc.set_row(&TrackRow::note(Note::On(25)));
        let flags = tc.step(&table);
        assert!(!flags.contains(UpdateFlags::INIT));
        assert_eq!(tc.state().frequency, NOTE_TABLE[24] + 4);
    }

    #[test]
    fn sweep_only_on_channel_one() {
        let table = InstrumentTable::new();
        let row = TrackRow::empty().with_effect(Effect::SetSweep(0x17));

        let mut ch1 = TrackControl::new(ChType::Ch1);
        ch1.set_row(&row);
        assert_eq!(ch1.step(&table), UpdateFlags::SWEEP);

        let mut ch2 = TrackControl::new(ChType::Ch2);
        ch2.set_row(&row);
        assert!(ch2.step(&table).is_empty());
    }
}
