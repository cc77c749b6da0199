//! The synthesis target the runtime writes to.

use gbt_ir::ChType;

/// Register addresses, as offsets into the 0xFFxx I/O page.
pub mod reg {
    pub const NR10: u8 = 0x10;
    pub const NR11: u8 = 0x11;
    pub const NR12: u8 = 0x12;
    pub const NR13: u8 = 0x13;
    pub const NR14: u8 = 0x14;
    pub const NR21: u8 = 0x16;
    pub const NR22: u8 = 0x17;
    pub const NR23: u8 = 0x18;
    pub const NR24: u8 = 0x19;
    pub const NR30: u8 = 0x1A;
    pub const NR31: u8 = 0x1B;
    pub const NR32: u8 = 0x1C;
    pub const NR33: u8 = 0x1D;
    pub const NR34: u8 = 0x1E;
    pub const NR41: u8 = 0x20;
    pub const NR42: u8 = 0x21;
    pub const NR43: u8 = 0x22;
    pub const NR44: u8 = 0x23;
    pub const NR50: u8 = 0x24;
    pub const NR51: u8 = 0x25;
    pub const NR52: u8 = 0x26;
    /// First of 16 wave RAM bytes
    pub const WAVE_RAM: u8 = 0x30;
    pub const WAVE_RAM_END: u8 = 0x3F;
}

/// Register-level sound hardware. The runtime only ever talks to this.
pub trait Apu {
    fn write_register(&mut self, reg: u8, value: u8);
    fn read_register(&self, reg: u8) -> u8;
}

/// The channel a register belongs to, or `None` for the shared registers.
pub fn register_channel(reg: u8) -> Option<ChType> {
    match reg {
        reg::NR10..=reg::NR14 => Some(ChType::Ch1),
        reg::NR21..=reg::NR24 => Some(ChType::Ch2),
        reg::NR30..=reg::NR34 | reg::WAVE_RAM..=reg::WAVE_RAM_END => Some(ChType::Ch3),
        reg::NR41..=reg::NR44 => Some(ChType::Ch4),
        _ => None,
    }
}

/// An `Apu` that only remembers what was written.
///
/// Keeps a mirror of every register plus write counters, for tests and
/// register dumps.
#[derive(Clone, Debug)]
pub struct RegisterFile {
    regs: [u8; 0x30],
    writes: usize,
    channel_writes: [usize; 4],
}

impl Default for RegisterFile {
    fn default() -> Self {
        Self::new()
    }
}

impl RegisterFile {
    pub fn new() -> Self {
        Self {
            regs: [0; 0x30],
            writes: 0,
            channel_writes: [0; 4],
        }
    }

    /// Total number of writes.
    pub fn writes(&self) -> usize {
        self.writes
    }

    /// Writes to registers owned by one channel (NR51 is shared and not counted).
    pub fn channel_writes(&self, ch: ChType) -> usize {
        self.channel_writes[ch.index()]
    }

    /// Wave RAM contents.
    pub fn wave_ram(&self) -> &[u8] {
        let start = (reg::WAVE_RAM - 0x10) as usize;
        &self.regs[start..start + 16]
    }
}

impl Apu for RegisterFile {
    fn write_register(&mut self, reg: u8, value: u8) {
        if !(0x10..0x40).contains(&reg) {
            return;
        }
        self.regs[(reg - 0x10) as usize] = value;
        self.writes += 1;
        if let Some(ch) = register_channel(reg) {
            self.channel_writes[ch.index()] += 1;
        }
    }

    fn read_register(&self, reg: u8) -> u8 {
        if (0x10..0x40).contains(&reg) {
            self.regs[(reg - 0x10) as usize]
        } else {
            0xFF
        }
    }
}
