//! Note tables and the per-channel pitch state machine.
//!
//! Tone channels are pitched by the 11-bit frequency register, where the
//! output is 131072 / (2048 - f) Hz. The noise channel is pitched by an index
//! into `NOISE_TABLE`, so slides and arpeggios there move in table steps.

use gbt_ir::{ChannelKind, Effect, NOTE_LAST, NOTE_NOISE_LAST};

/// Frequency register values for notes C-2 (0) through B-8 (83), A-4 = 440 Hz.
pub const NOTE_TABLE: [u16; NOTE_LAST as usize + 1] = [
    44, 157, 263, 363, 457, 547, 631, 711, 786, 856, 923, 986,
    1046, 1102, 1155, 1205, 1253, 1297, 1339, 1379, 1417, 1452, 1486, 1517,
    1547, 1575, 1602, 1627, 1650, 1673, 1694, 1714, 1732, 1750, 1767, 1783,
    1798, 1812, 1825, 1837, 1849, 1860, 1871, 1881, 1890, 1899, 1907, 1915,
    1923, 1930, 1936, 1943, 1949, 1954, 1959, 1964, 1969, 1974, 1978, 1982,
    1985, 1989, 1992, 1995, 1998, 2001, 2004, 2006, 2009, 2011, 2013, 2015,
    2017, 2018, 2020, 2022, 2023, 2025, 2026, 2027, 2028, 2029, 2030, 2031,
];

/// NR43 values for noise notes, lowest pitch first (shift 13..0, divisor 7..4,
/// then divisors 3..0 at shift 0).
pub const NOISE_TABLE: [u8; NOTE_NOISE_LAST as usize + 1] = [
    0xD7, 0xD6, 0xD5, 0xD4, 0xC7, 0xC6, 0xC5, 0xC4, 0xB7, 0xB6, 0xB5, 0xB4,
    0xA7, 0xA6, 0xA5, 0xA4, 0x97, 0x96, 0x95, 0x94, 0x87, 0x86, 0x85, 0x84,
    0x77, 0x76, 0x75, 0x74, 0x67, 0x66, 0x65, 0x64, 0x57, 0x56, 0x55, 0x54,
    0x47, 0x46, 0x45, 0x44, 0x37, 0x36, 0x35, 0x34, 0x27, 0x26, 0x25, 0x24,
    0x17, 0x16, 0x15, 0x14, 0x07, 0x06, 0x05, 0x04, 0x03, 0x02, 0x01, 0x00,
];

const TONE_MAX: u16 = 2047;

/// Frequency value of a note for a channel kind. Out-of-range notes clamp.
pub fn note_frequency(kind: ChannelKind, note: u8) -> u16 {
    match kind {
        ChannelKind::Tone => NOTE_TABLE[note.min(NOTE_LAST) as usize],
        ChannelKind::Noise => note.min(NOTE_NOISE_LAST) as u16,
    }
}

/// The pitch modulation currently active. Only one runs at a time.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
enum ModMode {
    #[default]
    None,
    /// Slide toward each new note
    Portamento,
    /// Slide toward the frequency limit
    PitchSlide,
    /// Slide toward a note, then stop
    NoteSlide,
    Arpeggio,
}

#[derive(Clone, Copy, Debug, Default)]
struct Vibrato {
    speed: u8,
    extent: u8,
    delay: u8,
    delay_counter: u8,
    counter: u8,
    value: i8,
    rising: bool,
}

/// Pitch state for one channel.
#[derive(Clone, Copy, Debug)]
pub struct FrequencyControl {
    kind: ChannelKind,
    mode: ModMode,
    /// A note has been played since the last reset
    note_set: bool,
    note: u8,
    tune: i8,
    /// Base frequency, moved by slides
    frequency: u16,
    slide_amount: u8,
    slide_target: u16,
    slide_note: u8,
    chord: [u8; 2],
    chord_index: u8,
    vibrato: Vibrato,
    /// Semitone offset from the instrument's arp sequence
    arp_offset: i8,
    /// Accumulated offset from the instrument's pitch sequence
    instrument_pitch: i16,
}

impl FrequencyControl {
    pub fn new(kind: ChannelKind) -> Self {
        Self {
            kind,
            mode: ModMode::None,
            note_set: false,
            note: 0,
            tune: 0,
            frequency: 0,
            slide_amount: 0,
            slide_target: 0,
            slide_note: 0,
            chord: [0; 2],
            chord_index: 0,
            vibrato: Vibrato::default(),
            arp_offset: 0,
            instrument_pitch: 0,
        }
    }

    pub fn reset(&mut self) {
        *self = Self::new(self.kind);
    }

    fn max_frequency(&self) -> u16 {
        match self.kind {
            ChannelKind::Tone => TONE_MAX,
            ChannelKind::Noise => NOTE_NOISE_LAST as u16,
        }
    }

    fn max_note(&self) -> u8 {
        match self.kind {
            ChannelKind::Tone => NOTE_LAST,
            ChannelKind::Noise => NOTE_NOISE_LAST,
        }
    }

    fn clamp_note(&self, note: i16) -> u8 {
        note.clamp(0, self.max_note() as i16) as u8
    }

    /// True while automatic portamento is on and a note has played, so a new
    /// note glides instead of retriggering.
    pub fn is_portamento(&self) -> bool {
        self.mode == ModMode::Portamento && self.note_set
    }

    /// Apply a row's note and pitch effects. Effects are read first so a
    /// portamento or note slide on the same row sees the new note.
    pub fn apply(&mut self, note: Option<u8>, effects: &[Effect]) {
        let mut note_slide = None;

        for effect in effects {
            match *effect {
                Effect::Arpeggio { x, y } => {
                    if x == 0 && y == 0 {
                        self.end_mode(ModMode::Arpeggio);
                    } else {
                        self.mode = ModMode::Arpeggio;
                        self.chord = [x, y];
                        self.chord_index = 2;
                    }
                }
                Effect::PitchUp(amount) => self.set_slide(amount, self.max_frequency()),
                Effect::PitchDown(amount) => self.set_slide(amount, 0),
                Effect::AutoPortamento(amount) => {
                    if amount == 0 {
                        self.end_mode(ModMode::Portamento);
                    } else {
                        self.mode = ModMode::Portamento;
                        self.slide_amount = amount;
                        self.slide_target = self.frequency;
                    }
                }
                Effect::Vibrato { speed, extent } => {
                    self.vibrato.speed = speed;
                    self.vibrato.extent = extent & 0x7F;
                    if extent == 0 {
                        self.vibrato.value = 0;
                    }
                }
                Effect::VibratoDelay(delay) => self.vibrato.delay = delay,
                Effect::Tuning(tune) => self.tune = tune.wrapping_sub(0x80) as i8,
                Effect::NoteSlideUp { speed, semitones } => {
                    note_slide = Some((speed, semitones as i16));
                }
                Effect::NoteSlideDown { speed, semitones } => {
                    note_slide = Some((speed, -(semitones as i16)));
                }
                _ => {}
            }
        }

        if let Some(note) = note {
            self.set_note(note);
        }

        if let Some((speed, semitones)) = note_slide {
            if speed == 0 {
                self.end_mode(ModMode::NoteSlide);
            } else {
                let target = self.clamp_note(self.note as i16 + semitones);
                self.slide_note = target;
                self.slide_target = note_frequency(self.kind, target);
                self.slide_amount = speed;
                self.mode = ModMode::NoteSlide;
            }
        }
    }

    fn end_mode(&mut self, mode: ModMode) {
        if self.mode == mode {
            self.mode = ModMode::None;
        }
    }

    fn set_slide(&mut self, amount: u8, target: u16) {
        if amount == 0 {
            self.end_mode(ModMode::PitchSlide);
        } else {
            self.mode = ModMode::PitchSlide;
            self.slide_amount = amount;
            self.slide_target = target;
        }
    }

    fn set_note(&mut self, note: u8) {
        let note = note.min(self.max_note());
        let freq = note_frequency(self.kind, note);

        let glide = self.is_portamento();
        if self.mode == ModMode::Portamento {
            self.slide_target = freq;
        }
        if !glide {
            self.frequency = freq;
            // The old slide target was relative to the previous note.
            self.end_mode(ModMode::NoteSlide);
        }

        self.note = note;
        self.note_set = true;
        self.arp_offset = 0;
        self.instrument_pitch = 0;
        // so the next step lands on the base note
        self.chord_index = 2;
        self.vibrato.delay_counter = self.vibrato.delay;
        self.vibrato.counter = 0;
        self.vibrato.value = 0;
        self.vibrato.rising = true;
    }

    /// Set the semitone offset from the instrument's arp sequence.
    pub fn set_instrument_arp(&mut self, offset: i8) {
        self.arp_offset = offset;
    }

    /// Add a delta from the instrument's pitch sequence.
    pub fn add_instrument_pitch(&mut self, delta: i8) {
        let limit = self.max_frequency() as i16;
        self.instrument_pitch = (self.instrument_pitch + delta as i16).clamp(-limit, limit);
    }

    /// Advance slides, arpeggio and vibrato by one frame.
    pub fn step(&mut self) {
        match self.mode {
            ModMode::Portamento | ModMode::PitchSlide | ModMode::NoteSlide => {
                let amount = self.slide_amount as u16;
                if self.frequency < self.slide_target {
                    self.frequency = (self.frequency + amount).min(self.slide_target);
                } else if self.frequency > self.slide_target {
                    self.frequency = self.frequency.saturating_sub(amount).max(self.slide_target);
                }
                if self.mode == ModMode::NoteSlide && self.frequency == self.slide_target {
                    self.note = self.slide_note;
                    self.mode = ModMode::None;
                }
            }
            ModMode::Arpeggio => self.chord_index = (self.chord_index + 1) % 3,
            ModMode::None => {}
        }

        let vibrato = &mut self.vibrato;
        if vibrato.extent != 0 {
            if vibrato.delay_counter > 0 {
                vibrato.delay_counter -= 1;
            } else {
                if vibrato.counter == 0 {
                    vibrato.counter = vibrato.speed.max(1);
                    let extent = vibrato.extent as i8;
                    vibrato.value = if vibrato.rising { extent } else { -extent };
                    vibrato.rising = !vibrato.rising;
                }
                vibrato.counter -= 1;
            }
        }
    }

    /// The frequency to write this frame.
    pub fn frequency(&self) -> u16 {
        let base = if self.mode == ModMode::Arpeggio || self.arp_offset != 0 {
            let chord = match (self.mode, self.chord_index) {
                (ModMode::Arpeggio, 1) => self.chord[0],
                (ModMode::Arpeggio, 2) => self.chord[1],
                _ => 0,
            };
            let note = self.clamp_note(self.note as i16 + chord as i16 + self.arp_offset as i16);
            note_frequency(self.kind, note) as i32
        } else {
            self.frequency as i32
        };

        let offset = self.tune as i32 + self.instrument_pitch as i32 + self.vibrato.value as i32;
        (base + offset).clamp(0, self.max_frequency() as i32) as u16
    }
}
