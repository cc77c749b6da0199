//! Runtime plus software APU, producing samples.

use gbt_engine::synth::CLOCK_RATE;
use gbt_engine::{MusicRuntime, RuntimeContext, Synth, MAX_VOLUME, VOLUME_TABLE};
use gbt_ir::ChType;

use crate::module::Module;
use crate::Position;

/// CPU cycles per video frame.
const CYCLES_PER_FRAME: u32 = 70224;

/// Runtime steps per second, about 59.73.
pub const FRAME_RATE: f64 = CLOCK_RATE as f64 / CYCLES_PER_FRAME as f64;

/// Steps a `MusicRuntime` once per frame and renders the samples in
/// between with a `Synth`.
pub struct Renderer<'m> {
    module: &'m Module,
    runtime: MusicRuntime<'m>,
    synth: Synth,
    samples_per_frame: f64,
    /// Fractional samples carried into the next frame
    carry: f64,
    /// Samples left before the next runtime step
    pending: usize,
    gain: f32,
    halted: bool,
}

impl<'m> Renderer<'m> {
    pub fn new(module: &'m Module, sample_rate: u32, order: u8, row: u8) -> Self {
        let synth = Synth::new(sample_rate);
        Self {
            module,
            runtime: MusicRuntime::new(&module.song, order, row),
            samples_per_frame: synth.sample_rate() as f64 / FRAME_RATE,
            synth,
            carry: 0.0,
            pending: 0,
            gain: 1.0,
            halted: false,
        }
    }

    pub fn sample_rate(&self) -> u32 {
        self.synth.sample_rate()
    }

    pub fn runtime(&self) -> &MusicRuntime<'m> {
        &self.runtime
    }

    pub fn synth(&self) -> &Synth {
        &self.synth
    }

    pub fn position(&self) -> Position {
        Position {
            order: self.runtime.current_order(),
            row: self.runtime.current_row(),
            speed: self.runtime.current_speed(),
        }
    }

    /// Software gain applied to the rendered samples, on the same 0 to
    /// `MAX_VOLUME` curve as the mixer. Independent of NR50, which the song
    /// controls.
    pub fn set_output_gain(&mut self, volume: u8) {
        self.gain = VOLUME_TABLE[volume.min(MAX_VOLUME) as usize];
    }

    fn step(&mut self) -> bool {
        let module = self.module;
        let mut ctx = RuntimeContext::new(&mut self.synth, &module.instruments, &module.waveforms);
        self.runtime.step(&mut ctx)
    }

    /// Fill `out` with interleaved stereo samples. Returns false once the
    /// song has halted; the rest of `out` is then silence.
    pub fn render(&mut self, out: &mut [f32]) -> bool {
        let mut pos = 0;
        while out.len() - pos >= 2 {
            if self.halted {
                out[pos..].fill(0.0);
                return false;
            }
            if self.pending == 0 {
                if !self.step() {
                    self.halted = true;
                    continue;
                }
                self.carry += self.samples_per_frame;
                self.pending = self.carry as usize;
                self.carry -= self.pending as f64;
            }

            let frames = self.pending.min((out.len() - pos) / 2);
            let block = &mut out[pos..pos + frames * 2];
            self.synth.run(block);
            if self.gain != 1.0 {
                block.iter_mut().for_each(|s| *s *= self.gain);
            }
            self.pending -= frames;
            pos += frames * 2;
        }
        !self.halted
    }

    pub fn lock(&mut self, ch: ChType) {
        let module = self.module;
        let mut ctx = RuntimeContext::new(&mut self.synth, &module.instruments, &module.waveforms);
        self.runtime.lock(&mut ctx, ch);
    }

    pub fn unlock(&mut self, ch: ChType) {
        let module = self.module;
        let mut ctx = RuntimeContext::new(&mut self.synth, &module.instruments, &module.waveforms);
        self.runtime.unlock(&mut ctx, ch);
    }

    pub fn halt(&mut self) {
        let module = self.module;
        let mut ctx = RuntimeContext::new(&mut self.synth, &module.instruments, &module.waveforms);
        self.runtime.halt(&mut ctx);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gbt_ir::{Effect, Note, Song, TrackRow};

    fn beep() -> Module {
        let mut song = Song::with_pattern_size("beep", 4);
        song.speed = 0x10;
        *song.track_mut(ChType::Ch1, 0).row_mut(0) = TrackRow::note(Note::On(36));
        *song.track_mut(ChType::Ch1, 0).row_mut(3) =
            TrackRow::empty().with_effect(Effect::PatternHalt);
        Module::new(song)
    }

    #[test]
    fn frame_rate_matches_hardware() {
        approx::assert_relative_eq!(FRAME_RATE, 59.7275, epsilon = 1e-4);
    }

    #[test]
    fn renders_until_halt() {
        let module = beep();
        let mut renderer = Renderer::new(&module, 48000, 0, 0);

        // three rows at one frame each, about 804 samples per frame
        let mut out = vec![0.0f32; 48000];
        assert!(!renderer.render(&mut out));
        assert!(out[..1600].iter().any(|s| *s != 0.0));
        assert!(out[6000..].iter().all(|s| *s == 0.0));
        assert!(renderer.runtime().is_halted());

        let mut more = [1.0f32; 16];
        assert!(!renderer.render(&mut more));
        assert!(more.iter().all(|s| *s == 0.0));
    }

    #[test]
    fn block_size_does_not_change_output() {
        let module = beep();
        let mut whole = vec![0.0f32; 4096];
        Renderer::new(&module, 44100, 0, 0).render(&mut whole);

        let mut pieces = vec![0.0f32; 4096];
        let mut renderer = Renderer::new(&module, 44100, 0, 0);
        for chunk in pieces.chunks_mut(100) {
            renderer.render(chunk);
        }
        assert_eq!(whole, pieces);
    }

    #[test]
    fn output_gain_scales_after_mixer() {
        let module = beep();
        let mut full = vec![0.0f32; 2048];
        Renderer::new(&module, 44100, 0, 0).render(&mut full);

        let mut quiet = vec![0.0f32; 2048];
        let mut renderer = Renderer::new(&module, 44100, 0, 0);
        renderer.set_output_gain(3);
        renderer.render(&mut quiet);

        assert!(full.iter().any(|s| *s != 0.0));
        for (q, f) in quiet.iter().zip(&full) {
            approx::assert_relative_eq!(*q, *f * VOLUME_TABLE[3]);
        }
        // the song's NR50 is untouched
        let nr50_left = renderer.synth().mixer().terminal_volume(gbt_engine::Terminal::S01);
        assert_eq!(nr50_left, MAX_VOLUME);
    }

    #[test]
    fn unlock_silences_channel() {
        let module = beep();
        let mut renderer = Renderer::new(&module, 44100, 0, 0);
        let mut out = vec![0.0f32; 200];
        renderer.render(&mut out);
        assert!(renderer.synth().channel_enabled(ChType::Ch1));

        renderer.unlock(ChType::Ch1);
        assert!(!renderer.synth().channel_enabled(ChType::Ch1));
    }
}
