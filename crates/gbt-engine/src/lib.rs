//! Playback engine for gbtracker.
//!
//! `MusicRuntime` walks a song frame by frame and writes channel registers
//! through the `Apu` trait. `Synth` is a software APU that turns those
//! register writes into samples, folded to stereo by the `Mixer`.

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub mod apu;
mod channel;
mod channel_control;
mod context;
mod frame;
mod frequency;
mod global_state;
mod instrument_runtime;
mod mixer;
mod music_runtime;
pub mod synth;
mod timer;
mod track_control;

pub use apu::{Apu, RegisterFile};
pub use channel::{ChannelState, UpdateFlags};
pub use context::RuntimeContext;
pub use frame::Frame;
pub use frequency::{note_frequency, FrequencyControl, NOISE_TABLE, NOTE_TABLE};
pub use global_state::{GlobalState, PatternCommand};
pub use instrument_runtime::InstrumentRuntime;
pub use mixer::{Mixer, OutputFlags, Terminal, MAX_VOLUME, VOLUME_TABLE};
pub use music_runtime::{MusicRuntime, RuntimeFlags};
pub use synth::Synth;
pub use timer::Timer;
pub use track_control::TrackControl;
