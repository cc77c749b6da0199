//! Channel identifiers.

/// One of the four hardware channels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ChType {
    Ch1,
    Ch2,
    Ch3,
    Ch4,
}

/// The two kinds of channel the engine knows how to drive.
///
/// Channels 1-3 are pitched tone channels (pulse, pulse, wave) whose
/// frequency is an 11-bit period register. Channel 4 is the noise channel,
/// pitched by an index into the noise frequency table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChannelKind {
    Tone,
    Noise,
}

impl ChType {
    pub const ALL: [ChType; 4] = [ChType::Ch1, ChType::Ch2, ChType::Ch3, ChType::Ch4];

    /// Zero-based channel index.
    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn from_index(index: usize) -> Option<ChType> {
        match index {
            0 => Some(ChType::Ch1),
            1 => Some(ChType::Ch2),
            2 => Some(ChType::Ch3),
            3 => Some(ChType::Ch4),
            _ => None,
        }
    }

    pub const fn kind(self) -> ChannelKind {
        match self {
            ChType::Ch4 => ChannelKind::Noise,
            _ => ChannelKind::Tone,
        }
    }
}

impl core::fmt::Display for ChType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "CH{}", self.index() + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_round_trips() {
        for ch in ChType::ALL {
            assert_eq!(ChType::from_index(ch.index()), Some(ch));
        }
        assert_eq!(ChType::from_index(4), None);
    }

    #[test]
    fn only_ch4_is_noise() {
        assert_eq!(ChType::Ch3.kind(), ChannelKind::Tone);
        assert_eq!(ChType::Ch4.kind(), ChannelKind::Noise);
    }
}
