//! Audio frame type.

/// A stereo audio frame.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Frame {
    pub left: f32,
    pub right: f32,
}

impl Frame {
    /// Create a silent frame.
    pub const fn silence() -> Self {
        Self {
            left: 0.0,
            right: 0.0,
        }
    }

    /// Create a mono frame (same value for both channels).
    pub const fn mono(value: f32) -> Self {
        Self {
            left: value,
            right: value,
        }
    }

    /// Convert to 16-bit PCM, clamping out-of-range samples.
    pub fn to_i16(self) -> [i16; 2] {
        [to_i16(self.left), to_i16(self.right)]
    }
}

fn to_i16(sample: f32) -> i16 {
    (sample.clamp(-1.0, 1.0) * 32767.0) as i16
}
