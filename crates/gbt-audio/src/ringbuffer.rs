//! Single-producer single-consumer sample queue.
//!
//! A thin frame-counted layer over `ringbuf`'s heap buffer. All counts are in
//! frames of `CHANNELS` elements; since every transfer moves whole frames,
//! both cursors always sit on frame boundaries.

use std::marker::PhantomData;
use std::mem::MaybeUninit;

use ringbuf::traits::{Consumer, Observer, Producer, Split};
use ringbuf::{HeapCons, HeapProd, HeapRb};
use thiserror::Error;

/// Why a ring buffer could not be created.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum RingbufferError {
    #[error("ring buffer needs a non-zero frame count")]
    ZeroCapacity,
    #[error("ring buffer needs at least one channel")]
    ZeroChannels,
    #[error("ring buffer of {0} frames is too large")]
    TooLarge(usize),
}

/// Constructor for the two halves of a frame queue.
pub struct Ringbuffer<T, const CHANNELS: usize>(PhantomData<T>);

/// Interleaved stereo `f32` queue between the renderer and the device.
pub type AudioRingbuffer = Ringbuffer<f32, 2>;
pub type AudioReader = Reader<f32, 2>;
pub type AudioWriter = Writer<f32, 2>;

impl<T: Copy, const CHANNELS: usize> Ringbuffer<T, CHANNELS> {
    /// Allocate a queue holding `frames` frames and split it.
    pub fn init(frames: usize) -> Result<(Writer<T, CHANNELS>, Reader<T, CHANNELS>), RingbufferError> {
        if CHANNELS == 0 {
            return Err(RingbufferError::ZeroChannels);
        }
        if frames == 0 {
            return Err(RingbufferError::ZeroCapacity);
        }
        let len = frames
            .checked_mul(CHANNELS)
            .ok_or(RingbufferError::TooLarge(frames))?;

        // Allocation failure and capacity overflow both map to TooLarge.
        let mut storage = Vec::<T>::new();
        storage
            .try_reserve_exact(len)
            .map_err(|_| RingbufferError::TooLarge(frames))?;
        let (prod, cons) = HeapRb::<T>::from(storage).split();
        Ok((Writer { prod }, Reader { cons }))
    }

    /// Empty the queue. Taking both halves by `&mut` means neither side can
    /// be in use.
    pub fn reset(_writer: &mut Writer<T, CHANNELS>, reader: &mut Reader<T, CHANNELS>) {
        reader.cons.clear();
    }
}

/// Consumer half.
pub struct Reader<T, const CHANNELS: usize> {
    cons: HeapCons<T>,
}

impl<T: Copy, const CHANNELS: usize> Reader<T, CHANNELS> {
    pub fn capacity(&self) -> usize {
        self.cons.capacity().get() / CHANNELS
    }

    /// Frames ready to read. May already be out of date when acted upon.
    pub fn available_read(&self) -> usize {
        self.cons.occupied_len() / CHANNELS
    }

    fn contiguous(&self) -> usize {
        self.cons.as_slices().0.len() / CHANNELS
    }

    /// Read from the contiguous region only. Returns frames read, which is
    /// short when the data wraps.
    pub fn read(&mut self, buf: &mut [T]) -> usize {
        let frames = (buf.len() / CHANNELS).min(self.contiguous());
        self.cons.pop_slice(&mut buf[..frames * CHANNELS]) / CHANNELS
    }

    /// Read as much as fits, across the wrap point. Returns frames read.
    pub fn full_read(&mut self, buf: &mut [T]) -> usize {
        let frames = buf.len() / CHANNELS;
        self.cons.pop_slice(&mut buf[..frames * CHANNELS]) / CHANNELS
    }

    /// Borrow up to `frames` readable frames in place. Follow with
    /// `commit_read` for however many were used.
    pub fn acquire_read(&self, frames: usize) -> &[T] {
        let first = self.cons.as_slices().0;
        let len = frames.saturating_mul(CHANNELS).min(first.len());
        &first[..len]
    }

    /// Release frames seen through `acquire_read`. Returns frames released.
    pub fn commit_read(&mut self, frames: usize) -> usize {
        let frames = frames.min(self.contiguous());
        self.cons.skip(frames * CHANNELS) / CHANNELS
    }

    /// Drop up to `frames` frames without reading them.
    pub fn seek_read(&mut self, frames: usize) -> usize {
        let frames = frames.min(self.available_read());
        self.cons.skip(frames * CHANNELS) / CHANNELS
    }

    /// Drop everything queued. Returns frames dropped.
    pub fn flush(&mut self) -> usize {
        self.cons.clear() / CHANNELS
    }
}

/// Producer half.
pub struct Writer<T, const CHANNELS: usize> {
    prod: HeapProd<T>,
}

impl<T: Copy, const CHANNELS: usize> Writer<T, CHANNELS> {
    pub fn capacity(&self) -> usize {
        self.prod.capacity().get() / CHANNELS
    }

    /// Frames of free space. May already be out of date when acted upon.
    pub fn available_write(&self) -> usize {
        self.prod.vacant_len() / CHANNELS
    }

    fn contiguous(&mut self) -> usize {
        self.prod.vacant_slices_mut().0.len() / CHANNELS
    }

    /// Write into the contiguous free region only. Returns frames written;
    /// the rest of `buf` is dropped.
    pub fn write(&mut self, buf: &[T]) -> usize {
        let frames = (buf.len() / CHANNELS).min(self.contiguous());
        self.prod.push_slice(&buf[..frames * CHANNELS]) / CHANNELS
    }

    /// Write as much as fits, across the wrap point. Returns frames written.
    pub fn full_write(&mut self, buf: &[T]) -> usize {
        let frames = buf.len() / CHANNELS;
        self.prod.push_slice(&buf[..frames * CHANNELS]) / CHANNELS
    }

    /// Borrow up to `frames` frames of free space in place.
    pub fn acquire_write(&mut self, frames: usize) -> &mut [MaybeUninit<T>] {
        let first = self.prod.vacant_slices_mut().0;
        let len = frames.saturating_mul(CHANNELS).min(first.len());
        &mut first[..len]
    }

    /// Publish frames filled through `acquire_write`. `frames` is clamped
    /// to the contiguous free region. Returns frames published.
    ///
    /// # Safety
    ///
    /// The first `frames` frames of the last `acquire_write` slice must have
    /// been initialized.
    pub unsafe fn commit_write(&mut self, frames: usize) -> usize {
        let frames = frames.min(self.contiguous());
        self.prod.advance_write_index(frames * CHANNELS);
        frames
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_rejects_empty() {
        assert_eq!(
            AudioRingbuffer::init(0).err(),
            Some(RingbufferError::ZeroCapacity)
        );
        assert_eq!(
            Ringbuffer::<u8, 0>::init(8).err(),
            Some(RingbufferError::ZeroChannels)
        );
    }

    #[test]
    fn init_reports_oversized_queue() {
        assert_eq!(
            AudioRingbuffer::init(usize::MAX / 4).err(),
            Some(RingbufferError::TooLarge(usize::MAX / 4))
        );
        assert_eq!(
            AudioRingbuffer::init(usize::MAX).err(),
            Some(RingbufferError::TooLarge(usize::MAX))
        );
    }

    #[test]
    fn fifo_in_frames() {
        let (mut writer, mut reader) = AudioRingbuffer::init(4).unwrap();
        assert_eq!(writer.capacity(), 4);
        assert_eq!(writer.write(&[1.0, 2.0, 3.0, 4.0, 5.0]), 2);
        assert_eq!(reader.available_read(), 2);
        assert_eq!(writer.available_write(), 2);

        let mut out = [0.0; 4];
        assert_eq!(reader.read(&mut out), 2);
        assert_eq!(out, [1.0, 2.0, 3.0, 4.0]);
        assert_eq!(reader.available_read(), 0);
    }

    #[test]
    fn write_truncates_to_space() {
        let (mut writer, mut reader) = Ringbuffer::<u8, 1>::init(3).unwrap();
        assert_eq!(writer.full_write(b"abcdef"), 3);
        assert_eq!(writer.full_write(b"x"), 0);

        let mut out = [0u8; 8];
        assert_eq!(reader.full_read(&mut out), 3);
        assert_eq!(&out[..3], b"abc");
    }

    #[test]
    fn full_read_crosses_wrap() {
        let (mut writer, mut reader) = Ringbuffer::<u8, 1>::init(4).unwrap();
        let mut out = [0u8; 4];
        writer.full_write(b"xyz");
        reader.full_read(&mut out[..3]);

        // write position is now 3, so this wraps
        assert_eq!(writer.full_write(b"abcd"), 4);
        assert_eq!(reader.read(&mut out), 1);
        assert_eq!(out[0], b'a');
        assert_eq!(reader.full_read(&mut out), 3);
        assert_eq!(&out[..3], b"bcd");

        writer.full_write(b"efgh");
        assert_eq!(reader.full_read(&mut out), 4);
        assert_eq!(&out, b"efgh");
    }

    #[test]
    fn acquire_commit() {
        let (mut writer, mut reader) = AudioRingbuffer::init(8).unwrap();

        let region = writer.acquire_write(3);
        assert_eq!(region.len(), 6);
        for (i, slot) in region.iter_mut().enumerate() {
            slot.write(i as f32);
        }
        assert_eq!(unsafe { writer.commit_write(3) }, 3);
        assert_eq!(reader.available_read(), 3);

        let region = reader.acquire_read(2);
        assert_eq!(region, &[0.0, 1.0, 2.0, 3.0]);
        assert_eq!(reader.commit_read(2), 2);

        let mut out = [0.0; 2];
        assert_eq!(reader.full_read(&mut out), 1);
        assert_eq!(out, [4.0, 5.0]);
    }

    #[test]
    fn commit_write_clamps_to_acquired_region() {
        let (mut writer, reader) = Ringbuffer::<u8, 1>::init(8).unwrap();
        for slot in writer.acquire_write(usize::MAX) {
            slot.write(7);
        }
        assert_eq!(unsafe { writer.commit_write(20) }, 8);
        assert_eq!(reader.available_read(), 8);
        assert_eq!(writer.available_write(), 0);
    }

    #[test]
    fn seek_flush_and_reset() {
        let (mut writer, mut reader) = Ringbuffer::<u8, 1>::init(8).unwrap();
        writer.full_write(b"abcdef");
        assert_eq!(reader.seek_read(2), 2);

        let mut out = [0u8; 1];
        reader.read(&mut out);
        assert_eq!(out[0], b'c');

        assert_eq!(reader.flush(), 3);
        writer.full_write(b"gh");
        Ringbuffer::reset(&mut writer, &mut reader);
        assert_eq!(reader.available_read(), 0);
        assert_eq!(writer.available_write(), 8);
    }
}
