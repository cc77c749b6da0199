//! Audio delivery for gbtracker.
//!
//! The render thread writes interleaved stereo frames into an
//! `AudioRingbuffer`; the device callback drains it. Each side holds its own
//! half, so the SPSC discipline is enforced by ownership.

mod cpal_backend;
mod ringbuffer;
mod traits;

pub use cpal_backend::CpalOutput;
pub use ringbuffer::{
    AudioReader, AudioRingbuffer, AudioWriter, Reader, Ringbuffer, RingbufferError, Writer,
};
pub use traits::{AudioError, AudioOutput};
