//! Song structure and sequencing types.

use alloc::collections::BTreeMap;
use alloc::vec::Vec;
use arrayvec::ArrayString;
use core::fmt;

use crate::channel::ChType;
use crate::track::{Track, TrackRow};

/// Frames per row in Q4.4 fixed point (0x60 = 6 frames, 0x68 = 6.5 frames).
pub type Speed = u8;

/// One frame, in speed units.
pub const UNIT_SPEED: Speed = 0x10;
pub const SPEED_MIN: Speed = 0x10;
pub const SPEED_MAX: Speed = 0xF0;
pub const DEFAULT_SPEED: Speed = 0x60;

pub const MAX_ORDERS: usize = 256;
pub const MAX_PATTERN_SIZE: u16 = 256;

/// An order: the track id each channel plays.
pub type Order = [u8; 4];

/// A complete song.
#[derive(Clone, Debug)]
pub struct Song {
    /// Song name
    pub name: ArrayString<32>,
    /// Rows per beat (display/tempo only)
    pub rows_per_beat: u8,
    /// Rows per measure (display only)
    pub rows_per_measure: u8,
    /// Initial speed
    pub speed: Speed,
    /// Rows in every track (1-256)
    pub pattern_size: u16,
    /// Order list, played front to back then looped
    pub orders: Vec<Order>,
    /// Sparse per-channel track storage keyed by track id
    tracks: [BTreeMap<u8, Track>; 4],
}

impl Default for Song {
    fn default() -> Self {
        Self {
            name: ArrayString::new(),
            rows_per_beat: 4,
            rows_per_measure: 16,
            speed: DEFAULT_SPEED,
            pattern_size: 64,
            orders: alloc::vec![[0; 4]],
            tracks: Default::default(),
        }
    }
}

impl Song {
    /// Create a new song with a single order of empty tracks.
    pub fn new(name: &str) -> Self {
        let mut song = Self::default();
        let _ = song.name.try_push_str(name);
        song
    }

    /// Create a song with a given pattern size.
    pub fn with_pattern_size(name: &str, pattern_size: u16) -> Self {
        let mut song = Self::new(name);
        song.pattern_size = pattern_size;
        song
    }

    pub fn order_count(&self) -> usize {
        self.orders.len()
    }

    /// Get a stored track.
    pub fn track(&self, ch: ChType, id: u8) -> Option<&Track> {
        self.tracks[ch.index()].get(&id)
    }

    /// Get a track for editing, creating an empty one if it doesn't exist yet.
    pub fn track_mut(&mut self, ch: ChType, id: u8) -> &mut Track {
        let rows = self.pattern_size;
        self.tracks[ch.index()]
            .entry(id)
            .or_insert_with(|| Track::new(rows))
    }

    /// Iterate over the stored tracks of one channel.
    pub fn tracks(&self, ch: ChType) -> impl Iterator<Item = (u8, &Track)> {
        self.tracks[ch.index()].iter().map(|(id, t)| (*id, t))
    }

    /// Look up the row a channel plays at an order/row position.
    ///
    /// Missing tracks and positions past the end read as empty rows.
    pub fn row(&self, ch: ChType, order: u8, row: u8) -> TrackRow {
        self.orders
            .get(order as usize)
            .and_then(|o| self.track(ch, o[ch.index()]))
            .and_then(|t| t.row(row))
            .copied()
            .unwrap_or_default()
    }

    /// Check the preconditions the playback engine relies on.
    pub fn validate(&self) -> Result<(), SongError> {
        if self.orders.is_empty() {
            return Err(SongError::NoOrders);
        }
        if self.orders.len() > MAX_ORDERS {
            return Err(SongError::TooManyOrders(self.orders.len()));
        }
        if self.pattern_size == 0 || self.pattern_size > MAX_PATTERN_SIZE {
            return Err(SongError::PatternSize(self.pattern_size));
        }
        if !(SPEED_MIN..=SPEED_MAX).contains(&self.speed) {
            return Err(SongError::Speed(self.speed));
        }
        for ch in ChType::ALL {
            for (id, track) in self.tracks(ch) {
                if track.len() != self.pattern_size as usize {
                    return Err(SongError::TrackLength { ch, id, len: track.len() });
                }
            }
        }
        Ok(())
    }
}

/// A violated song precondition.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SongError {
    /// The order list is empty
    NoOrders,
    /// More than `MAX_ORDERS` orders
    TooManyOrders(usize),
    /// Pattern size outside 1-256
    PatternSize(u16),
    /// Speed outside `SPEED_MIN..=SPEED_MAX`
    Speed(Speed),
    /// A track whose length differs from the pattern size
    TrackLength { ch: ChType, id: u8, len: usize },
}

impl fmt::Display for SongError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SongError::NoOrders => write!(f, "song has no orders"),
            SongError::TooManyOrders(n) => write!(f, "song has {} orders (max {})", n, MAX_ORDERS),
            SongError::PatternSize(n) => write!(f, "invalid pattern size {}", n),
            SongError::Speed(s) => write!(f, "invalid speed {:#04x}", s),
            SongError::TrackLength { ch, id, len } => {
                write!(f, "{} track {:02X} has {} rows", ch, id, len)
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for SongError {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::note::Note;

    #[test]
    fn missing_tracks_read_empty() {
        let song = Song::new("empty");
        assert!(song.row(ChType::Ch2, 0, 5).is_empty());
        assert!(song.row(ChType::Ch2, 9, 5).is_empty());
    }

    #[test]
    fn row_follows_order_mapping() {
        let mut song = Song::with_pattern_size("map", 8);
        song.orders = alloc::vec![[0, 0, 0, 0], [1, 0, 0, 0]];
        song.track_mut(ChType::Ch1, 1).row_mut(3).note = Note::On(12);

        assert_eq!(song.row(ChType::Ch1, 1, 3).note, Note::On(12));
        assert_eq!(song.row(ChType::Ch1, 0, 3).note, Note::None);
        assert_eq!(song.row(ChType::Ch2, 1, 3).note, Note::None);
    }

    #[test]
    fn validate_rejects_bad_songs() {
        let mut song = Song::new("bad");
        assert_eq!(song.validate(), Ok(()));

        song.orders.clear();
        assert_eq!(song.validate(), Err(SongError::NoOrders));

        song.orders.push([0; 4]);
        song.speed = 0x08;
        assert_eq!(song.validate(), Err(SongError::Speed(0x08)));

        song.speed = DEFAULT_SPEED;
        song.track_mut(ChType::Ch3, 2);
        song.pattern_size = 32;
        assert!(matches!(
            song.validate(),
            Err(SongError::TrackLength { ch: ChType::Ch3, id: 2, len: 64 })
        ));
    }
}
