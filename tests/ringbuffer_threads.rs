//! Sample queue tests across real threads.

use std::thread;

use gbt_audio::{AudioRingbuffer, Ringbuffer};

#[test]
fn frames_arrive_in_order() {
    const TOTAL: usize = 20_000;
    let (mut writer, mut reader) = AudioRingbuffer::init(64).unwrap();

    let producer = thread::spawn(move || {
        let mut next = 0usize;
        while next < TOTAL {
            let end = (next + 37).min(TOTAL);
            let chunk: Vec<f32> = (next..end)
                .flat_map(|i| [i as f32, -(i as f32)])
                .collect();
            let mut written = 0;
            while written < chunk.len() / 2 {
                let n = writer.full_write(&chunk[written * 2..]);
                if n == 0 {
                    thread::yield_now();
                }
                written += n;
            }
            next = end;
        }
    });

    let mut received = Vec::with_capacity(TOTAL * 2);
    let mut buf = [0.0f32; 50];
    while received.len() < TOTAL * 2 {
        let n = reader.full_read(&mut buf);
        if n == 0 {
            thread::yield_now();
        }
        received.extend_from_slice(&buf[..n * 2]);
    }
    producer.join().unwrap();

    for (i, frame) in received.chunks_exact(2).enumerate() {
        assert_eq!(frame, [i as f32, -(i as f32)], "frame {i}");
    }
    assert_eq!(reader.available_read(), 0);
}

#[test]
fn in_place_writes_are_seen_by_reader_thread() {
    let (mut writer, mut reader) = Ringbuffer::<u32, 1>::init(16).unwrap();

    let producer = thread::spawn(move || {
        let mut value = 0u32;
        while value < 1000 {
            let slots = writer.acquire_write(8);
            if slots.is_empty() {
                thread::yield_now();
                continue;
            }
            let n = slots.len();
            for slot in slots.iter_mut() {
                slot.write(value);
                value += 1;
            }
            // SAFETY: all `n` acquired slots were initialized above
            unsafe { writer.commit_write(n) };
        }
    });

    let mut expected = 0u32;
    while expected < 1000 {
        let got = reader.acquire_read(16);
        let n = got.len();
        for v in got {
            assert_eq!(*v, expected);
            expected += 1;
        }
        reader.commit_read(n);
        if n == 0 {
            thread::yield_now();
        }
    }
    producer.join().unwrap();
}
