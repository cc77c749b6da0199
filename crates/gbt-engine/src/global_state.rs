//! Song-wide effects collected from a row.

use gbt_ir::{Effect, Speed, TrackRow};

/// What to do with the song position once the current row ends.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PatternCommand {
    #[default]
    None,
    /// Continue at this row of the next order
    Next(u8),
    /// Continue at row 0 of this order
    Jump(u8),
}

/// Global effects gathered from all four channels of the current row.
///
/// Cleared on every new row. When channels disagree, the higher channel
/// wins.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GlobalState {
    pub speed: Option<Speed>,
    pub halt: bool,
    pub pattern_command: PatternCommand,
    /// NR50 value to write
    pub volume: Option<u8>,
}

impl GlobalState {
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Collect the global effects of one channel's row.
    pub fn apply_row(&mut self, row: &TrackRow) {
        for effect in &row.effects {
            match *effect {
                Effect::PatternGoto(order) => self.pattern_command = PatternCommand::Jump(order),
                Effect::PatternSkip(row) => self.pattern_command = PatternCommand::Next(row),
                Effect::PatternHalt => self.halt = true,
                Effect::SetSpeed(speed) => self.speed = Some(speed),
                Effect::SetGlobalVolume(v) => self.volume = Some(v & 0x77),
                _ => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collects_global_effects_only() {
        let mut global = GlobalState::default();
        let row = TrackRow::empty()
            .with_effect(Effect::SetTimbre(1))
            .with_effect(Effect::SetSpeed(0x30))
            .with_effect(Effect::PatternSkip(4));
        global.apply_row(&row);

        assert_eq!(global.speed, Some(0x30));
        assert_eq!(global.pattern_command, PatternCommand::Next(4));
        assert!(!global.halt);

        global.apply_row(&TrackRow::empty().with_effect(Effect::PatternGoto(2)));
        assert_eq!(global.pattern_command, PatternCommand::Jump(2));

        global.clear();
        assert_eq!(global, GlobalState::default());
    }

    #[test]
    fn volume_is_masked_to_register_bits() {
        let mut global = GlobalState::default();
        global.apply_row(&TrackRow::empty().with_effect(Effect::SetGlobalVolume(0xFF)));
        assert_eq!(global.volume, Some(0x77));
    }
}
