//! Instruments and their sequences.

use arrayvec::{ArrayString, ArrayVec};

use crate::channel::ChType;

/// Longest sequence an instrument can hold.
pub const MAX_SEQUENCE_LEN: usize = 256;

/// Which channel parameter a sequence drives.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SequenceKind {
    /// Signed semitone offset from the played note
    Arp,
    /// Panning bits (0-3)
    Panning,
    /// Signed pitch delta, accumulated every frame
    Pitch,
    /// Timbre (0-3)
    Timbre,
}

impl SequenceKind {
    pub const ALL: [SequenceKind; 4] = [
        SequenceKind::Arp,
        SequenceKind::Panning,
        SequenceKind::Pitch,
        SequenceKind::Timbre,
    ];

    pub const fn index(self) -> usize {
        self as usize
    }
}

/// A per-frame value sequence with an optional loop point.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Sequence {
    pub data: ArrayVec<u8, MAX_SEQUENCE_LEN>,
    /// Index to jump back to after the last value
    pub loop_index: Option<u8>,
}

impl Sequence {
    /// Create a sequence, truncating data past `MAX_SEQUENCE_LEN`.
    pub fn new(data: &[u8], loop_index: Option<u8>) -> Self {
        let mut seq = Self { data: ArrayVec::new(), loop_index };
        seq.data.extend(data.iter().copied().take(MAX_SEQUENCE_LEN));
        seq
    }

    /// Create a sequence of signed values.
    pub fn signed(data: &[i8], loop_index: Option<u8>) -> Self {
        let mut seq = Self { data: ArrayVec::new(), loop_index };
        seq.data.extend(data.iter().map(|v| *v as u8).take(MAX_SEQUENCE_LEN));
        seq
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Start enumerating from the beginning.
    pub fn enumerator(&self) -> SequenceEnumerator {
        SequenceEnumerator::default()
    }
}

/// Read cursor over a `Sequence`.
///
/// The cursor does not borrow its sequence, so a runtime can keep one per
/// sequence across frames and look the instrument up again each frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SequenceEnumerator {
    index: usize,
}

impl SequenceEnumerator {
    /// Return the next value, following the loop point at the end.
    /// Returns `None` once a sequence without a loop is exhausted.
    pub fn next(&mut self, seq: &Sequence) -> Option<u8> {
        if self.index >= seq.data.len() {
            let lp = seq.loop_index? as usize;
            if lp >= seq.data.len() {
                return None;
            }
            self.index = lp;
        }
        let value = seq.data[self.index];
        self.index += 1;
        Some(value)
    }

    pub fn restart(&mut self) {
        self.index = 0;
    }
}

/// An instrument definition.
#[derive(Clone, Debug)]
pub struct Instrument {
    /// Instrument name
    pub name: ArrayString<32>,
    /// Channel the instrument was designed for (editor hint)
    pub channel: ChType,
    /// Envelope (or waveform id on channel 3) written on every trigger
    pub envelope: Option<u8>,
    /// Sequences indexed by `SequenceKind::index()`
    pub sequences: [Sequence; 4],
}

impl Default for Instrument {
    fn default() -> Self {
        Self {
            name: ArrayString::new(),
            channel: ChType::Ch1,
            envelope: None,
            sequences: Default::default(),
        }
    }
}

impl Instrument {
    /// Create a new instrument with default settings.
    pub fn new(name: &str) -> Self {
        let mut inst = Self::default();
        let _ = inst.name.try_push_str(name);
        inst
    }

    pub fn sequence(&self, kind: SequenceKind) -> &Sequence {
        &self.sequences[kind.index()]
    }

    pub fn sequence_mut(&mut self, kind: SequenceKind) -> &mut Sequence {
        &mut self.sequences[kind.index()]
    }
}
