//! Track rows and tracks.

use alloc::vec::Vec;

use crate::effects::Effect;
use crate::note::Note;

/// Number of effect columns per row.
pub const EFFECTS_PER_ROW: usize = 3;

/// A single row of one channel's track.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TrackRow {
    /// Note value
    pub note: Note,
    /// Instrument id, if the row sets one
    pub instrument: Option<u8>,
    /// Effect columns
    pub effects: [Effect; EFFECTS_PER_ROW],
}

impl TrackRow {
    /// Create an empty row.
    pub const fn empty() -> Self {
        Self {
            note: Note::None,
            instrument: None,
            effects: [Effect::None; EFFECTS_PER_ROW],
        }
    }

    /// Create a row playing a note.
    pub const fn note(note: Note) -> Self {
        Self {
            note,
            instrument: None,
            effects: [Effect::None; EFFECTS_PER_ROW],
        }
    }

    /// Builder: set the instrument column.
    pub const fn with_instrument(mut self, instrument: u8) -> Self {
        self.instrument = Some(instrument);
        self
    }

    /// Builder: put an effect in the first free column. Extra effects are dropped.
    pub fn with_effect(mut self, effect: Effect) -> Self {
        if let Some(slot) = self.effects.iter_mut().find(|e| **e == Effect::None) {
            *slot = effect;
        }
        self
    }

    /// Returns true if the row is completely empty.
    pub fn is_empty(&self) -> bool {
        self.note == Note::None
            && self.instrument.is_none()
            && self.effects.iter().all(|e| *e == Effect::None)
    }
}

/// One channel's data for one pattern.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Track {
    pub rows: Vec<TrackRow>,
}

impl Track {
    /// Create a track of empty rows.
    pub fn new(rows: u16) -> Self {
        Self {
            rows: alloc::vec![TrackRow::empty(); rows as usize],
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Get a row, or `None` past the end.
    pub fn row(&self, row: u8) -> Option<&TrackRow> {
        self.rows.get(row as usize)
    }

    /// Get a mutable row. Panics past the end.
    pub fn row_mut(&mut self, row: u8) -> &mut TrackRow {
        &mut self.rows[row as usize]
    }
}
