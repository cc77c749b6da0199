//! CPAL-based audio output backend.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Stream, StreamConfig};
use tracing::{debug, error};

use crate::ringbuffer::{AudioReader, AudioRingbuffer, AudioWriter};
use crate::traits::{AudioError, AudioOutput};

/// CPAL-based audio output.
///
/// Owns the device stream and the reader half of the sample queue; the
/// writer half is handed to whoever renders.
pub struct CpalOutput {
    config: StreamConfig,
    stream: Stream,
    running: Arc<AtomicBool>,
    underruns: Arc<AtomicU64>,
}

impl CpalOutput {
    /// Open the default device with a queue of `buffer_ms` milliseconds.
    /// The stream starts paused.
    pub fn open(buffer_ms: u32) -> Result<(Self, AudioWriter), AudioError> {
        let host = cpal::default_host();
        let device = host.default_output_device().ok_or(AudioError::NoDevice)?;

        let mut config: StreamConfig = device.default_output_config()?.into();
        // The queue is interleaved stereo regardless of the device default
        config.channels = 2;

        let frames = (config.sample_rate.0 as usize * buffer_ms as usize / 1000).max(1);
        let (writer, reader) = AudioRingbuffer::init(frames)?;
        debug!(
            sample_rate = config.sample_rate.0,
            frames, "opened audio output"
        );

        let running = Arc::new(AtomicBool::new(false));
        let underruns = Arc::new(AtomicU64::new(0));
        let stream = device.build_output_stream(
            &config,
            data_callback(reader, running.clone(), underruns.clone()),
            |err| error!("audio stream error: {err}"),
            None,
        )?;
        stream.pause()?;

        let output = Self {
            config,
            stream,
            running,
            underruns,
        };
        Ok((output, writer))
    }

    /// Callbacks that found fewer frames queued than the device asked for.
    pub fn underruns(&self) -> u64 {
        self.underruns.load(Ordering::Relaxed)
    }
}

fn data_callback(
    mut reader: AudioReader,
    running: Arc<AtomicBool>,
    underruns: Arc<AtomicU64>,
) -> impl FnMut(&mut [f32], &cpal::OutputCallbackInfo) + Send + 'static {
    move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
        if !running.load(Ordering::Relaxed) {
            data.fill(0.0);
            return;
        }
        let filled = reader.full_read(data) * 2;
        if filled < data.len() {
            data[filled..].fill(0.0);
            underruns.fetch_add(1, Ordering::Relaxed);
        }
    }
}

impl AudioOutput for CpalOutput {
    fn sample_rate(&self) -> u32 {
        self.config.sample_rate.0
    }

    fn start(&mut self) -> Result<(), AudioError> {
        self.running.store(true, Ordering::Relaxed);
        self.stream.play()?;
        Ok(())
    }

    fn stop(&mut self) -> Result<(), AudioError> {
        self.running.store(false, Ordering::Relaxed);
        self.stream.pause()?;
        Ok(())
    }
}
