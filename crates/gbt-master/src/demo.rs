//! Demo songs built in code.

use gbt_ir::{
    ChType, Effect, Instrument, Note, Sequence, SequenceKind, Song, TrackRow, Waveform,
};

use crate::module::Module;

const NAMES: [&str; 3] = ["chiptune", "slides", "drums"];

/// Names accepted by `build`.
pub fn song_names() -> &'static [&'static str] {
    &NAMES
}

/// Build a demo module by name.
pub fn build(name: &str) -> Option<Module> {
    match name {
        "chiptune" => Some(chiptune()),
        "slides" => Some(slides()),
        "drums" => Some(drums()),
        _ => None,
    }
}

fn note(octave: u8, semitone: u8) -> Note {
    Note::from_octave_semitone(octave, semitone)
}

fn set(song: &mut Song, ch: ChType, track: u8, row: u8, value: TrackRow) {
    *song.track_mut(ch, track).row_mut(row) = value;
}

fn insert_instrument(module: &mut Module, id: u8, inst: Instrument) {
    // ids are below the table limit
    let _ = module.instruments.insert(id, inst);
}

fn kick_and_hat(module: &mut Module) {
    let mut kick = Instrument::new("kick");
    kick.channel = ChType::Ch4;
    kick.envelope = Some(0xF2);
    *kick.sequence_mut(SequenceKind::Arp) = Sequence::signed(&[0, -6, -12, -18], None);
    insert_instrument(module, 10, kick);

    let mut hat = Instrument::new("hat");
    hat.channel = ChType::Ch4;
    hat.envelope = Some(0x81);
    *hat.sequence_mut(SequenceKind::Timbre) = Sequence::new(&[1], None);
    insert_instrument(module, 11, hat);
}

fn drum_track(song: &mut Song, track: u8, rows: u8) {
    for row in 0..rows {
        let value = match row % 8 {
            0 | 4 => TrackRow::note(Note::On(20)).with_instrument(10),
            2 | 6 => TrackRow::note(Note::On(54)).with_instrument(11),
            _ => continue,
        };
        set(song, ChType::Ch4, track, row, value);
    }
}

/// Four channels, two orders, loops forever.
fn chiptune() -> Module {
    let mut song = Song::with_pattern_size("chiptune", 32);
    song.speed = 0x60;
    song.orders = vec![[0, 0, 0, 0], [1, 1, 0, 0]];
    let mut module = Module::new(song);

    let mut lead = Instrument::new("lead");
    lead.envelope = Some(0xC3);
    *lead.sequence_mut(SequenceKind::Timbre) = Sequence::new(&[2, 2, 1], Some(2));
    insert_instrument(&mut module, 0, lead);

    let mut bass = Instrument::new("bass");
    bass.channel = ChType::Ch3;
    bass.envelope = Some(0);
    insert_instrument(&mut module, 1, bass);
    kick_and_hat(&mut module);
    let _ = module.waveforms.insert(0, Waveform::triangle());

    let song = &mut module.song;
    let melody = [(4, 0), (4, 4), (4, 7), (5, 0), (4, 9), (4, 7), (4, 4), (4, 2)];
    for (i, (oct, semi)) in melody.iter().enumerate() {
        let row = (i * 4) as u8;
        set(song, ChType::Ch1, 0, row, TrackRow::note(note(*oct, *semi)).with_instrument(0));
        set(
            song,
            ChType::Ch1,
            1,
            row,
            TrackRow::note(note(*oct, *semi))
                .with_instrument(0)
                .with_effect(Effect::Arpeggio { x: 3, y: 7 }),
        );
    }

    for row in (0..32u8).step_by(8) {
        set(
            song,
            ChType::Ch2,
            0,
            row,
            TrackRow::note(note(3, 0))
                .with_effect(Effect::SetEnvelope(0x92))
                .with_effect(Effect::SetTimbre(1)),
        );
        set(
            song,
            ChType::Ch2,
            1,
            row,
            TrackRow::note(note(3, 5))
                .with_effect(Effect::SetEnvelope(0x92))
                .with_effect(Effect::SetPanning(0x1)),
        );
    }

    let bass_line = [(2, 0), (2, 0), (2, 7), (2, 5)];
    for (i, (oct, semi)) in bass_line.iter().enumerate() {
        set(
            song,
            ChType::Ch3,
            0,
            (i * 8) as u8,
            TrackRow::note(note(*oct, *semi)).with_instrument(1),
        );
    }

    drum_track(song, 0, 32);
    module
}

/// Pitch effects on two channels, then halts.
fn slides() -> Module {
    let mut song = Song::with_pattern_size("slides", 16);
    song.speed = 0x80;
    let mut module = Module::new(song);
    let song = &mut module.song;

    set(
        song,
        ChType::Ch1,
        0,
        0,
        TrackRow::note(note(4, 0))
            .with_effect(Effect::AutoPortamento(0x10))
            .with_effect(Effect::Vibrato { speed: 3, extent: 2 })
            .with_effect(Effect::VibratoDelay(8)),
    );
    set(song, ChType::Ch1, 0, 4, TrackRow::note(note(4, 7)));
    set(song, ChType::Ch1, 0, 8, TrackRow::note(note(5, 0)));
    set(
        song,
        ChType::Ch1,
        0,
        12,
        TrackRow::empty().with_effect(Effect::NoteSlideDown { speed: 0x20, semitones: 12 }),
    );

    set(
        song,
        ChType::Ch2,
        0,
        0,
        TrackRow::note(note(3, 0))
            .with_effect(Effect::SetEnvelope(0x70))
            .with_effect(Effect::PitchUp(2)),
    );
    set(song, ChType::Ch2, 0, 8, TrackRow::empty().with_effect(Effect::PitchUp(0)));
    set(
        song,
        ChType::Ch2,
        0,
        10,
        TrackRow::note(note(3, 7)).with_effect(Effect::DelayedCut(6)),
    );

    set(
        song,
        ChType::Ch3,
        0,
        15,
        TrackRow::note(Note::Cut).with_effect(Effect::PatternHalt),
    );
    module
}

/// Noise channel only, with a speed change halfway.
fn drums() -> Module {
    let mut song = Song::with_pattern_size("drums", 16);
    song.speed = 0x50;
    song.orders = vec![[0, 0, 0, 0], [0, 0, 0, 1]];
    let mut module = Module::new(song);
    kick_and_hat(&mut module);

    let song = &mut module.song;
    drum_track(song, 0, 16);
    drum_track(song, 1, 16);
    for row in [3u8, 11, 13] {
        set(
            song,
            ChType::Ch4,
            1,
            row,
            TrackRow::note(Note::On(40))
                .with_instrument(11)
                .with_effect(Effect::DelayedNote(2)),
        );
    }
    set(
        song,
        ChType::Ch1,
        0,
        8,
        TrackRow::empty().with_effect(Effect::SetSpeed(0x38)),
    );
    set(
        song,
        ChType::Ch1,
        0,
        15,
        TrackRow::empty().with_effect(Effect::SetSpeed(0x50)),
    );
    module
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_demo_is_valid() {
        for name in song_names() {
            let module = build(name).unwrap();
            assert!(module.validate().is_ok(), "{name}");
            assert!(gbt_ir::analyze(&module.song).total_notes > 0, "{name}");
        }
        assert!(build("missing").is_none());
    }
}
