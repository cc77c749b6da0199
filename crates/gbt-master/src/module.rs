//! Everything a song needs to play.

use gbt_ir::{InstrumentTable, Song, SongError, WaveformTable};

/// A song plus the instrument and waveform tables its rows refer to.
#[derive(Clone, Debug, Default)]
pub struct Module {
    pub song: Song,
    pub instruments: InstrumentTable,
    pub waveforms: WaveformTable,
}

impl Module {
    pub fn new(song: Song) -> Self {
        Self {
            song,
            instruments: InstrumentTable::new(),
            waveforms: WaveformTable::new(),
        }
    }

    /// Check that the song can be handed to the runtime.
    pub fn validate(&self) -> Result<(), SongError> {
        self.song.validate()
    }
}
