//! The song sequencer.
//!
//! `MusicRuntime` is stepped once per frame (59.7 Hz on hardware). Each step
//! reads a new row when the timer says so, runs the four track controls and
//! writes the register changes of every channel it owns to the `Apu`.

use bitflags::bitflags;
use gbt_ir::{ChType, Song, Speed};

use crate::apu::reg;
use crate::channel_control;
use crate::context::RuntimeContext;
use crate::global_state::{GlobalState, PatternCommand};
use crate::timer::Timer;
use crate::track_control::TrackControl;

bitflags! {
    /// Runtime ownership and lifecycle flags.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct RuntimeFlags: u8 {
        const LOCK_CH1 = 0x01;
        const LOCK_CH2 = 0x02;
        const LOCK_CH3 = 0x04;
        const LOCK_CH4 = 0x08;
        const LOCK_ALL = 0x0F;
        /// Playback is over for good
        const HALT = 0x10;
        /// The first step has not run yet
        const INIT = 0x20;
    }
}

impl RuntimeFlags {
    /// The lock flag for one channel.
    pub const fn lock(ch: ChType) -> Self {
        Self::from_bits_truncate(1 << ch.index())
    }
}

impl Default for RuntimeFlags {
    fn default() -> Self {
        Self::LOCK_ALL | Self::INIT
    }
}

/// Plays one song, frame by frame, for its whole lifetime.
///
/// A channel is locked while the runtime owns its registers. Unlocked
/// channels are still sequenced so a later `lock` can restore them exactly,
/// but nothing is written to them.
pub struct MusicRuntime<'s> {
    song: &'s Song,
    order: u8,
    row: u8,
    timer: Timer,
    global: GlobalState,
    tracks: [TrackControl; 4],
    flags: RuntimeFlags,
}

impl<'s> MusicRuntime<'s> {
    /// Start at `order`/`row`. Positions past the end of the song start at
    /// the beginning of it.
    pub fn new(song: &'s Song, order: u8, row: u8) -> Self {
        let order = if (order as usize) < song.order_count() { order } else { 0 };
        let row = if (row as u16) < song.pattern_size { row } else { 0 };
        Self {
            song,
            order,
            row,
            timer: Timer::new(),
            global: GlobalState::default(),
            tracks: ChType::ALL.map(TrackControl::new),
            flags: RuntimeFlags::default(),
        }
    }

    pub fn song(&self) -> &'s Song {
        self.song
    }

    pub fn current_order(&self) -> u8 {
        self.order
    }

    pub fn current_row(&self) -> u8 {
        self.row
    }

    pub fn current_speed(&self) -> Speed {
        self.timer.period()
    }

    pub fn is_halted(&self) -> bool {
        self.flags.contains(RuntimeFlags::HALT)
    }

    pub fn is_locked(&self, ch: ChType) -> bool {
        self.flags.contains(RuntimeFlags::lock(ch))
    }

    pub fn flags(&self) -> RuntimeFlags {
        self.flags
    }

    /// Channel state as currently sequenced, owned or not.
    pub fn track(&self, ch: ChType) -> &TrackControl {
        &self.tracks[ch.index()]
    }

    /// Run one frame. Returns false once playback has halted.
    pub fn step(&mut self, ctx: &mut RuntimeContext<'_>) -> bool {
        if self.is_halted() {
            return false;
        }

        if self.flags.contains(RuntimeFlags::INIT) {
            self.initialize(ctx);
        }

        if self.timer.active() {
            self.global.clear();
            for ch in ChType::ALL {
                let row = self.song.row(ch, self.order, self.row);
                self.global.apply_row(&row);
                self.tracks[ch.index()].set_row(&row);
            }

            if self.global.halt {
                self.halt(ctx);
                return false;
            }
            if let Some(speed) = self.global.speed {
                self.timer.set_period(speed);
            }
            if let Some(volume) = self.global.volume {
                ctx.apu.write_register(reg::NR50, volume);
            }
        }

        for ch in ChType::ALL {
            let track = &mut self.tracks[ch.index()];
            let flags = track.step(ctx.instruments);
            if self.flags.contains(RuntimeFlags::lock(ch)) {
                channel_control::update(ch, ctx, track.state(), flags);
            }
        }

        if self.timer.step() {
            self.advance();
        }

        true
    }

    fn initialize(&mut self, ctx: &mut RuntimeContext<'_>) {
        ctx.apu.write_register(reg::NR52, 0x80);
        ctx.apu.write_register(reg::NR50, 0x77);

        self.timer.set_period(self.song.speed);
        self.timer.reset();

        // Nothing is playing yet, so this silences each owned channel and
        // routes it by its default panning.
        for ch in self.locked() {
            channel_control::init(ch, ctx, self.tracks[ch.index()].state());
        }
        self.flags.remove(RuntimeFlags::INIT);
    }

    fn locked(&self) -> impl Iterator<Item = ChType> + '_ {
        ChType::ALL.into_iter().filter(|ch| self.is_locked(*ch))
    }

    fn advance(&mut self) {
        let orders = self.song.order_count().max(1);
        let next_order = ((self.order as usize + 1) % orders) as u8;
        let last_row = self.song.pattern_size.saturating_sub(1);

        match self.global.pattern_command {
            PatternCommand::Jump(order) => {
                self.order = (order as usize % orders) as u8;
                self.row = 0;
            }
            PatternCommand::Next(row) => {
                self.order = next_order;
                self.row = (row as u16).min(last_row) as u8;
            }
            PatternCommand::None => {
                if self.row as u16 >= last_row {
                    self.order = next_order;
                    self.row = 0;
                } else {
                    self.row += 1;
                }
            }
        }
        // One command per row.
        self.global.pattern_command = PatternCommand::None;
    }

    /// Take ownership of a channel and write its full current state.
    pub fn lock(&mut self, ctx: &mut RuntimeContext<'_>, ch: ChType) {
        if self.is_locked(ch) {
            return;
        }
        self.flags.insert(RuntimeFlags::lock(ch));
        if !self.flags.intersects(RuntimeFlags::HALT | RuntimeFlags::INIT) {
            channel_control::init(ch, ctx, self.tracks[ch.index()].state());
        }
    }

    /// Release a channel. It is silenced once and then left alone.
    pub fn unlock(&mut self, ctx: &mut RuntimeContext<'_>, ch: ChType) {
        if !self.is_locked(ch) {
            return;
        }
        self.flags.remove(RuntimeFlags::lock(ch));
        if !self.flags.intersects(RuntimeFlags::HALT | RuntimeFlags::INIT) {
            channel_control::disable(ch, ctx.apu);
        }
    }

    /// Stop playback for good and silence every owned channel.
    pub fn halt(&mut self, ctx: &mut RuntimeContext<'_>) {
        if self.is_halted() {
            return;
        }
        self.flags.insert(RuntimeFlags::HALT);
        for ch in self.locked() {
            channel_control::disable(ch, ctx.apu);
        }
    }
}
