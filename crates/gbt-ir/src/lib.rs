//! Song data model for gbtracker.
//!
//! Defines the orders, tracks, rows, effects, instruments and waveforms
//! that the playback engine reads. Nothing in here mutates during playback.
//!
//! Designed to be `no_std` compatible with the `alloc` crate.

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

mod analysis;
mod channel;
mod effects;
mod instrument;
mod note;
pub mod song;
mod table;
mod track;
mod waveform;

pub use analysis::{analyze, SongFeatures};
pub use channel::{ChType, ChannelKind};
pub use effects::Effect;
pub use instrument::{Instrument, Sequence, SequenceEnumerator, SequenceKind, MAX_SEQUENCE_LEN};
pub use note::{Note, NOTE_LAST, NOTE_NOISE_LAST};
pub use song::{
    Order, Song, SongError, Speed, DEFAULT_SPEED, MAX_ORDERS, MAX_PATTERN_SIZE, SPEED_MAX,
    SPEED_MIN, UNIT_SPEED,
};
pub use table::{InstrumentTable, Table, WaveformTable, MAX_TABLE_ITEMS};
pub use track::{Track, TrackRow, EFFECTS_PER_ROW};
pub use waveform::Waveform;
