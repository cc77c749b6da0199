//! WAV export of rendered samples.

use gbt_engine::Frame;
use std::io::Write;

const CHANNELS: u16 = 2;
const BYTES_PER_FRAME: u16 = CHANNELS * 2;
const HEADER_LEN: usize = 44;

/// Canonical 44-byte header for 16-bit stereo PCM holding `frames` frames.
fn header(frames: usize, sample_rate: u32) -> [u8; HEADER_LEN] {
    let data_len = frames as u32 * BYTES_PER_FRAME as u32;
    let mut out = [0u8; HEADER_LEN];
    let fields: [(usize, &[u8]); 12] = [
        (0, b"RIFF"),
        (4, &(data_len + HEADER_LEN as u32 - 8).to_le_bytes()),
        (8, b"WAVEfmt "),
        (16, &16u32.to_le_bytes()),
        (20, &1u16.to_le_bytes()),
        (22, &CHANNELS.to_le_bytes()),
        (24, &sample_rate.to_le_bytes()),
        (28, &(sample_rate * BYTES_PER_FRAME as u32).to_le_bytes()),
        (32, &BYTES_PER_FRAME.to_le_bytes()),
        (34, &16u16.to_le_bytes()),
        (36, b"data"),
        (40, &data_len.to_le_bytes()),
    ];
    for (offset, bytes) in fields {
        out[offset..offset + bytes.len()].copy_from_slice(bytes);
    }
    out
}

/// Write interleaved stereo `f32` samples as a 16-bit PCM WAV file.
/// A trailing odd sample is dropped.
pub fn write_wav(w: &mut impl Write, samples: &[f32], sample_rate: u32) -> std::io::Result<()> {
    let frames = samples.chunks_exact(2);
    w.write_all(&header(frames.len(), sample_rate))?;
    for pair in frames {
        let pcm = Frame {
            left: pair[0],
            right: pair[1],
        }
        .to_i16();
        for s in pcm {
            w.write_all(&s.to_le_bytes())?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_and_data_sizes() {
        let mut buf = Vec::new();
        write_wav(&mut buf, &[0.0, 1.0, -1.0, 0.5, 0.25], 22050).unwrap();

        assert_eq!(&buf[..4], b"RIFF");
        assert_eq!(u32::from_le_bytes([buf[4], buf[5], buf[6], buf[7]]), 36 + 8);
        assert_eq!(&buf[8..16], b"WAVEfmt ");
        assert_eq!(u32::from_le_bytes([buf[28], buf[29], buf[30], buf[31]]), 22050 * 4);
        assert_eq!(u32::from_le_bytes([buf[40], buf[41], buf[42], buf[43]]), 8);
        assert_eq!(buf.len(), 44 + 8);
        assert_eq!(i16::from_le_bytes([buf[46], buf[47]]), 32767);
        assert_eq!(i16::from_le_bytes([buf[48], buf[49]]), -32767);
    }
}
