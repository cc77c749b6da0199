//! Song feature analysis. Scans the tracks the order list references.

use alloc::collections::BTreeSet;
use core::fmt;

use crate::channel::ChType;
use crate::note::Note;
use crate::song::Song;
use crate::track::TrackRow;

/// Summary of features used in a song.
pub struct SongFeatures {
    pub effects: BTreeSet<&'static str>,
    pub has_note_cut: bool,
    pub note_range: Option<(u8, u8)>,
    pub instruments_used: BTreeSet<u8>,
    pub total_notes: usize,
    /// Rows played through one pass of the order list
    pub total_rows: usize,
}

/// Analyze a song and return a summary of which features it uses.
pub fn analyze(song: &Song) -> SongFeatures {
    let mut features = SongFeatures {
        effects: BTreeSet::new(),
        has_note_cut: false,
        note_range: None,
        instruments_used: BTreeSet::new(),
        total_notes: 0,
        total_rows: song.orders.len() * song.pattern_size as usize,
    };

    // Each distinct track is counted once, even if several orders reuse it.
    for ch in ChType::ALL {
        let used: BTreeSet<u8> = song.orders.iter().map(|o| o[ch.index()]).collect();
        for id in used {
            if let Some(track) = song.track(ch, id) {
                for row in &track.rows {
                    analyze_row(ch, row, &mut features);
                }
            }
        }
    }

    features
}

fn analyze_row(ch: ChType, row: &TrackRow, features: &mut SongFeatures) {
    match row.note {
        // Noise notes index a different table and would skew the range.
        Note::On(n) if ch != ChType::Ch4 => {
            features.total_notes += 1;
            features.note_range = Some(match features.note_range {
                Some((lo, hi)) => (lo.min(n), hi.max(n)),
                None => (n, n),
            });
        }
        Note::On(_) => features.total_notes += 1,
        Note::Cut => features.has_note_cut = true,
        Note::None => {}
    }

    if let Some(id) = row.instrument {
        features.instruments_used.insert(id);
    }

    for effect in &row.effects {
        let name = effect.name();
        if name != "None" {
            features.effects.insert(name);
        }
    }
}

impl fmt::Display for SongFeatures {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Rows:     {} per loop", self.total_rows)?;
        writeln!(f, "Notes:    {} total", self.total_notes)?;
        if let Some((lo, hi)) = self.note_range {
            writeln!(f, "Range:    {} - {}", lo, hi)?;
        }
        writeln!(
            f,
            "Note types: On{}",
            if self.has_note_cut { ", Cut" } else { "" },
        )?;
        writeln!(f, "Instruments: {} used", self.instruments_used.len())?;

        if self.effects.is_empty() {
            writeln!(f, "Effects:  (none)")?;
        } else {
            let effects: alloc::vec::Vec<&str> = self.effects.iter().copied().collect();
            writeln!(f, "Effects:  {}", effects.join(", "))?;
        }

        Ok(())
    }
}
