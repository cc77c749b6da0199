//! Headless controller for gbtracker.
//!
//! Owns the render thread that drives a `Renderer` into the audio device,
//! and provides offline rendering for WAV export. The CLI only talks to
//! this crate.

mod config;
pub mod demo;
mod module;
mod renderer;
mod wav;

use std::io::Write;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use gbt_audio::{AudioError, AudioOutput, AudioWriter, CpalOutput};
use thiserror::Error;
use tracing::{debug, error, info, warn};

// Re-export common types so callers don't need gbt-ir/gbt-engine directly.
pub use config::{ConfigError, PlayerConfig};
pub use gbt_engine::Frame;
pub use gbt_ir::{analyze, ChType, Song, SongError, SongFeatures};
pub use module::Module;
pub use renderer::{Renderer, FRAME_RATE};
pub use wav::write_wav;

/// Frames rendered per block on the render thread.
const BLOCK_FRAMES: usize = 256;

/// Playback position as seen by the runtime.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Position {
    pub order: u8,
    pub row: u8,
    pub speed: u8,
}

impl Position {
    /// Pack into one word so the render thread can publish it atomically.
    pub const fn pack(self) -> u32 {
        (self.order as u32) << 16 | (self.row as u32) << 8 | self.speed as u32
    }

    pub const fn unpack(word: u32) -> Self {
        Self {
            order: (word >> 16) as u8,
            row: (word >> 8) as u8,
            speed: word as u8,
        }
    }
}

/// Requests sent to the render thread.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    Lock(ChType),
    Unlock(ChType),
    Halt,
    Stop,
}

#[derive(Debug, Error)]
pub enum PlayerError {
    #[error("invalid song: {0}")]
    InvalidSong(#[from] SongError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("audio output: {0}")]
    Audio(#[from] AudioError),
    #[error("start order {order} is past the end of a {len} order song")]
    StartOrder { order: u8, len: usize },
    #[error("render thread exited before opening the device")]
    ThreadExited,
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Live playback of one module at a time.
pub struct Player {
    config: PlayerConfig,
    playback: Option<PlaybackHandle>,
}

struct PlaybackHandle {
    commands: Sender<Command>,
    position: Arc<AtomicU32>,
    finished: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
}

impl Player {
    pub fn new(config: PlayerConfig) -> Result<Self, PlayerError> {
        config.validate()?;
        Ok(Self {
            config,
            playback: None,
        })
    }

    pub fn config(&self) -> &PlayerConfig {
        &self.config
    }

    /// Start playing `module` from `order`/`row` on the default device.
    ///
    /// Any current playback is stopped first. Returns once the device is
    /// open, or with the error that prevented it.
    pub fn play(&mut self, module: Arc<Module>, order: u8, row: u8) -> Result<(), PlayerError> {
        self.stop();
        check_start(&module, order)?;

        let (commands, receiver) = mpsc::channel();
        let (ready_tx, ready_rx) = mpsc::sync_channel(1);
        let position = Arc::new(AtomicU32::new(
            Position {
                order,
                row,
                speed: module.song.speed,
            }
            .pack(),
        ));
        let finished = Arc::new(AtomicBool::new(false));

        let shared = Shared {
            position: position.clone(),
            finished: finished.clone(),
        };
        let config = self.config.clone();
        let thread = std::thread::Builder::new()
            .name("gbt-render".into())
            .spawn(move || {
                // The cpal stream is not Send, so it is opened on this thread.
                let (mut output, writer) = match CpalOutput::open(config.buffer_ms) {
                    Ok(opened) => opened,
                    Err(err) => {
                        shared.finished.store(true, Ordering::Relaxed);
                        let _ = ready_tx.send(Err(err));
                        return;
                    }
                };
                let _ = ready_tx.send(Ok(output.sample_rate()));
                render_thread(&module, &config, (order, row), &mut output, writer, receiver, &shared);
            })?;

        let handle = PlaybackHandle {
            commands,
            position,
            finished,
            thread: Some(thread),
        };
        match ready_rx.recv() {
            Ok(Ok(sample_rate)) => {
                info!(sample_rate, order, row, "playback started");
                self.playback = Some(handle);
                Ok(())
            }
            Ok(Err(err)) => {
                join(handle);
                Err(err.into())
            }
            Err(_) => {
                join(handle);
                Err(PlayerError::ThreadExited)
            }
        }
    }

    /// Stop playback and wait for the render thread to exit.
    pub fn stop(&mut self) {
        if let Some(pb) = self.playback.take() {
            let _ = pb.commands.send(Command::Stop);
            join(pb);
        }
    }

    /// Give `ch` back to the runtime.
    pub fn lock(&self, ch: ChType) {
        self.send(Command::Lock(ch));
    }

    /// Take `ch` away from the runtime; it is silenced and receives no
    /// further writes until locked again.
    pub fn unlock(&self, ch: ChType) {
        self.send(Command::Unlock(ch));
    }

    /// Freeze playback at the current row.
    pub fn halt(&self) {
        self.send(Command::Halt);
    }

    fn send(&self, command: Command) {
        if let Some(pb) = &self.playback {
            if pb.commands.send(command).is_err() {
                debug!(?command, "render thread already gone");
            }
        }
    }

    pub fn is_playing(&self) -> bool {
        self.playback
            .as_ref()
            .is_some_and(|p| !p.finished.load(Ordering::Relaxed))
    }

    pub fn is_finished(&self) -> bool {
        self.playback
            .as_ref()
            .is_some_and(|p| p.finished.load(Ordering::Relaxed))
    }

    /// Last position published by the render thread.
    pub fn position(&self) -> Option<Position> {
        let pb = self.playback.as_ref()?;
        if pb.finished.load(Ordering::Relaxed) {
            return None;
        }
        Some(Position::unpack(pb.position.load(Ordering::Relaxed)))
    }
}

impl Drop for Player {
    fn drop(&mut self) {
        self.stop();
    }
}

fn join(mut pb: PlaybackHandle) {
    if let Some(thread) = pb.thread.take() {
        if thread.join().is_err() {
            error!("render thread panicked");
        }
    }
}

fn check_start(module: &Module, order: u8) -> Result<(), PlayerError> {
    module.validate()?;
    let len = module.song.order_count();
    if order as usize >= len {
        return Err(PlayerError::StartOrder { order, len });
    }
    Ok(())
}

struct Shared {
    position: Arc<AtomicU32>,
    finished: Arc<AtomicBool>,
}

#[cfg(feature = "alloc_check")]
fn render_block(renderer: &mut Renderer<'_>, block: &mut [f32]) -> bool {
    assert_no_alloc::assert_no_alloc(|| renderer.render(block))
}

#[cfg(not(feature = "alloc_check"))]
fn render_block(renderer: &mut Renderer<'_>, block: &mut [f32]) -> bool {
    renderer.render(block)
}

fn render_thread(
    module: &Module,
    config: &PlayerConfig,
    (order, row): (u8, u8),
    output: &mut CpalOutput,
    mut writer: AudioWriter,
    commands: Receiver<Command>,
    shared: &Shared,
) {
    let mut renderer = Renderer::new(module, output.sample_rate(), order, row);
    renderer.set_output_gain(config.output_volume);
    let mut block = vec![0.0f32; BLOCK_FRAMES * 2];

    if let Err(err) = output.start() {
        error!("failed to start audio output: {err}");
        shared.finished.store(true, Ordering::Relaxed);
        return;
    }

    let mut stopped = false;
    'render: loop {
        for command in commands.try_iter() {
            match command {
                Command::Lock(ch) => renderer.lock(ch),
                Command::Unlock(ch) => renderer.unlock(ch),
                Command::Halt => renderer.halt(),
                Command::Stop => {
                    stopped = true;
                    break 'render;
                }
            }
        }

        if writer.available_write() < BLOCK_FRAMES {
            std::thread::sleep(Duration::from_millis(1));
            continue;
        }
        let playing = render_block(&mut renderer, &mut block);
        shared
            .position
            .store(renderer.position().pack(), Ordering::Relaxed);
        writer.full_write(&block);
        if !playing {
            info!("song halted");
            break;
        }
    }

    if !stopped {
        drain(&writer, &commands, config.buffer_ms);
    }
    if let Err(err) = output.stop() {
        warn!("failed to pause audio output: {err}");
    }
    let underruns = output.underruns();
    if underruns > 0 {
        warn!(underruns, "audio queue ran dry");
    }
    shared.finished.store(true, Ordering::Relaxed);
}

/// Let the device play out what is queued, unless told to stop.
fn drain(writer: &AudioWriter, commands: &Receiver<Command>, buffer_ms: u32) {
    let mut waited = 0;
    while writer.available_write() < writer.capacity() && waited < buffer_ms * 2 {
        if commands.try_iter().any(|c| c == Command::Stop) {
            return;
        }
        std::thread::sleep(Duration::from_millis(1));
        waited += 1;
    }
}

// --- Offline rendering ---

/// Render `module` without a device, for at most `max_seconds`.
///
/// Stops at the end of the block in which the song halts. Songs that loop
/// forever run to the time limit.
pub fn render_samples(
    module: &Module,
    config: &PlayerConfig,
    order: u8,
    row: u8,
    max_seconds: u32,
) -> Result<Vec<f32>, PlayerError> {
    config.validate()?;
    check_start(module, order)?;

    let mut renderer = Renderer::new(module, config.sample_rate, order, row);
    renderer.set_output_gain(config.output_volume);

    let max_frames = config.sample_rate as usize * max_seconds as usize;
    let mut samples = Vec::with_capacity(max_frames * 2);
    let mut block = [0.0f32; BLOCK_FRAMES * 2];
    while samples.len() < max_frames * 2 {
        let frames = BLOCK_FRAMES.min(max_frames - samples.len() / 2);
        let block = &mut block[..frames * 2];
        let playing = renderer.render(block);
        samples.extend_from_slice(block);
        if !playing {
            break;
        }
    }
    debug!(frames = samples.len() / 2, "offline render done");
    Ok(samples)
}

/// Render `module` from the start and write it as a WAV file.
pub fn render_to_wav(
    module: &Module,
    config: &PlayerConfig,
    max_seconds: u32,
    w: &mut impl Write,
) -> Result<usize, PlayerError> {
    let samples = render_samples(module, config, 0, 0, max_seconds)?;
    write_wav(w, &samples, config.sample_rate)?;
    Ok(samples.len() / 2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use gbt_ir::{Effect, Note, TrackRow};

    fn short_song() -> Module {
        let mut song = Song::with_pattern_size("short", 2);
        song.speed = 0x10;
        *song.track_mut(ChType::Ch2, 0).row_mut(0) = TrackRow::note(Note::On(30));
        *song.track_mut(ChType::Ch2, 0).row_mut(1) =
            TrackRow::empty().with_effect(Effect::PatternHalt);
        Module::new(song)
    }

    #[test]
    fn position_packs_into_one_word() {
        let pos = Position {
            order: 0x12,
            row: 0x34,
            speed: 0x56,
        };
        assert_eq!(pos.pack(), 0x12_3456);
        assert_eq!(Position::unpack(pos.pack()), pos);
    }

    #[test]
    fn offline_render_stops_after_halt() {
        let config = PlayerConfig::default();
        let samples = render_samples(&short_song(), &config, 0, 0, 10).unwrap();
        assert!(!samples.is_empty());
        // Two frames of audio, rounded up to a whole block
        assert!(samples.len() / 2 < config.sample_rate as usize / 10);
        assert!(samples.iter().any(|s| *s != 0.0));
    }

    #[test]
    fn offline_render_respects_time_limit() {
        let mut module = short_song();
        *module.song.track_mut(ChType::Ch2, 0).row_mut(1) = TrackRow::empty();
        let config = PlayerConfig {
            sample_rate: 8000,
            ..PlayerConfig::default()
        };
        let samples = render_samples(&module, &config, 0, 0, 1).unwrap();
        assert_eq!(samples.len(), 8000 * 2);
    }

    #[test]
    fn offline_render_rejects_bad_start() {
        let config = PlayerConfig::default();
        let err = render_samples(&short_song(), &config, 3, 0, 1).unwrap_err();
        assert!(matches!(err, PlayerError::StartOrder { order: 3, len: 1 }));

        let mut module = short_song();
        module.song.speed = 0;
        let err = render_samples(&module, &config, 0, 0, 1).unwrap_err();
        assert!(matches!(err, PlayerError::InvalidSong(SongError::Speed(0))));
    }

    #[test]
    fn wav_export_reports_frames() {
        let mut out = Vec::new();
        let frames = render_to_wav(&short_song(), &PlayerConfig::default(), 1, &mut out).unwrap();
        assert_eq!(out.len(), 44 + frames * 4);
        assert_eq!(&out[0..4], b"RIFF");
    }

    #[test]
    fn player_without_playback_is_idle() {
        let player = Player::new(PlayerConfig::default()).unwrap();
        assert!(!player.is_playing());
        assert!(!player.is_finished());
        assert_eq!(player.position(), None);
        player.halt();
    }
}
