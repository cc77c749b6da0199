//! Channel 3 waveforms.

/// 32 four-bit samples, two per byte, high nibble first.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Waveform {
    pub data: [u8; 16],
}

impl Default for Waveform {
    fn default() -> Self {
        Self::triangle()
    }
}

impl Waveform {
    pub const fn new(data: [u8; 16]) -> Self {
        Self { data }
    }

    /// Sample `index` (0-31) as a value 0-15.
    pub const fn sample(&self, index: usize) -> u8 {
        let byte = self.data[(index / 2) % 16];
        if index % 2 == 0 {
            byte >> 4
        } else {
            byte & 0x0F
        }
    }

    pub const fn triangle() -> Self {
        Self::new([
            0x01, 0x23, 0x45, 0x67, 0x89, 0xAB, 0xCD, 0xEF, 0xFE, 0xDC, 0xBA, 0x98, 0x76, 0x54,
            0x32, 0x10,
        ])
    }

    pub const fn square() -> Self {
        Self::new([
            0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
            0x00, 0x00,
        ])
    }

    pub const fn sawtooth() -> Self {
        Self::new([
            0x00, 0x11, 0x22, 0x33, 0x44, 0x55, 0x66, 0x77, 0x88, 0x99, 0xAA, 0xBB, 0xCC, 0xDD,
            0xEE, 0xFF,
        ])
    }
}
