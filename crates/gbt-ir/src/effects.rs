//! Effect command types for track rows.

/// Effect column command.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Effect {
    #[default]
    None,

    // === Global (song position and timing) ===
    /// Jump to the given order once the current row ends
    PatternGoto(u8),
    /// Stop playback for good
    PatternHalt,
    /// Continue at the given row of the next order once the current row ends
    PatternSkip(u8),
    /// Set frames per row (Q4.4 fixed point)
    SetSpeed(u8),
    /// Set master volume as NR50: left (S01) in bits 0-2, right (S02) in bits 4-6
    SetGlobalVolume(u8),

    // === Channel settings ===
    /// Set envelope (tone/noise) or waveform id (channel 3)
    SetEnvelope(u8),
    /// Set duty (pulse), output level (wave) or LFSR width (noise), 0-3
    SetTimbre(u8),
    /// Set panning: bit 0 = left terminal, bit 1 = right terminal
    SetPanning(u8),
    /// Set the frequency sweep register (channel 1 only)
    SetSweep(u8),
    /// Stop the channel after n frames
    DelayedCut(u8),
    /// Delay the row's note and channel effects by n frames
    DelayedNote(u8),

    // === Pitch ===
    /// Cycle between note, note+x, note+y each frame
    Arpeggio { x: u8, y: u8 },
    /// Slide pitch up by amount per frame
    PitchUp(u8),
    /// Slide pitch down by amount per frame
    PitchDown(u8),
    /// Slide toward each new note instead of jumping to it
    AutoPortamento(u8),
    /// Vibrato with speed (frames per half period) and extent
    Vibrato { speed: u8, extent: u8 },
    /// Frames to wait after a note before vibrato starts
    VibratoDelay(u8),
    /// Fine tuning, 0x80 = no offset
    Tuning(u8),
    /// Slide up by semitones at speed, then stop
    NoteSlideUp { speed: u8, semitones: u8 },
    /// Slide down by semitones at speed, then stop
    NoteSlideDown { speed: u8, semitones: u8 },
}

impl Effect {
    /// Returns the variant name as a static string (ignoring parameters).
    pub fn name(&self) -> &'static str {
        match self {
            Effect::None => "None",
            Effect::PatternGoto(_) => "PatternGoto",
            Effect::PatternHalt => "PatternHalt",
            Effect::PatternSkip(_) => "PatternSkip",
            Effect::SetSpeed(_) => "SetSpeed",
            Effect::SetGlobalVolume(_) => "SetGlobalVolume",
            Effect::SetEnvelope(_) => "SetEnvelope",
            Effect::SetTimbre(_) => "SetTimbre",
            Effect::SetPanning(_) => "SetPanning",
            Effect::SetSweep(_) => "SetSweep",
            Effect::DelayedCut(_) => "DelayedCut",
            Effect::DelayedNote(_) => "DelayedNote",
            Effect::Arpeggio { .. } => "Arpeggio",
            Effect::PitchUp(_) => "PitchUp",
            Effect::PitchDown(_) => "PitchDown",
            Effect::AutoPortamento(_) => "AutoPortamento",
            Effect::Vibrato { .. } => "Vibrato",
            Effect::VibratoDelay(_) => "VibratoDelay",
            Effect::Tuning(_) => "Tuning",
            Effect::NoteSlideUp { .. } => "NoteSlideUp",
            Effect::NoteSlideDown { .. } => "NoteSlideDown",
        }
    }

    /// Returns true if this effect acts on the song rather than its channel.
    ///
    /// Global effects are applied on the row's first frame regardless of
    /// note delays and regardless of whether the channel is locked.
    pub fn is_global(&self) -> bool {
        matches!(
            self,
            Effect::PatternGoto(_)
                | Effect::PatternHalt
                | Effect::PatternSkip(_)
                | Effect::SetSpeed(_)
                | Effect::SetGlobalVolume(_)
        )
    }
}
