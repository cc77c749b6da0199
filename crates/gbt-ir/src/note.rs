//! Note values stored in track rows.

/// Highest tone note (B-8). Note 0 is C-2.
pub const NOTE_LAST: u8 = 83;

/// Highest note on the noise channel, an index into the noise table.
pub const NOTE_NOISE_LAST: u8 = 59;

/// A note value in a track row.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Note {
    /// No note
    #[default]
    None,
    /// Note on (0 = C-2, 12 per octave)
    On(u8),
    /// Stop the channel
    Cut,
}

impl Note {
    /// Create a note from octave (2-8) and semitone (0-11).
    pub const fn from_octave_semitone(octave: u8, semitone: u8) -> Self {
        Note::On((octave - 2) * 12 + semitone)
    }

    /// Get the octave if this is a note on.
    pub const fn octave(self) -> Option<u8> {
        match self {
            Note::On(n) => Some(n / 12 + 2),
            _ => None,
        }
    }

    /// Get the semitone (0-11) if this is a note on.
    pub const fn semitone(self) -> Option<u8> {
        match self {
            Note::On(n) => Some(n % 12),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn note_octave_semitone() {
        let c4 = Note::from_octave_semitone(4, 0);
        assert_eq!(c4, Note::On(24));
        assert_eq!(c4.octave(), Some(4));
        assert_eq!(c4.semitone(), Some(0));

        let b8 = Note::from_octave_semitone(8, 11);
        assert_eq!(b8, Note::On(NOTE_LAST));
        assert_eq!(Note::Cut.octave(), None);
    }
}
