//! Audio output trait and error types.

use thiserror::Error;

use crate::ringbuffer::RingbufferError;

/// Error type for audio operations.
#[derive(Debug, Error)]
pub enum AudioError {
    /// No audio device available
    #[error("no audio output device available")]
    NoDevice,
    /// Failed to query the device configuration
    #[error("device init error: {0}")]
    DeviceInit(#[from] cpal::DefaultStreamConfigError),
    /// Failed to create the output stream
    #[error("stream create error: {0}")]
    StreamCreate(#[from] cpal::BuildStreamError),
    #[error("stream play error: {0}")]
    Play(#[from] cpal::PlayStreamError),
    #[error("stream pause error: {0}")]
    Pause(#[from] cpal::PauseStreamError),
    #[error("sample buffer: {0}")]
    Buffer(#[from] RingbufferError),
}

/// An output device fed from a sample queue.
pub trait AudioOutput {
    /// Device sample rate in Hz.
    fn sample_rate(&self) -> u32;

    /// Start (or resume) pulling samples.
    fn start(&mut self) -> Result<(), AudioError>;

    /// Pause; the device outputs silence and the queue is left alone.
    fn stop(&mut self) -> Result<(), AudioError>;
}
