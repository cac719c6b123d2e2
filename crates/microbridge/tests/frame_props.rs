// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Property tests for the wire framing layer.
//!
//! proptest generates arbitrary topics, payloads and garbage streams and
//! checks the framing invariants: the checksum law, single dispatch per
//! emitted frame, confinement of the receive buffer on adversarial input,
//! and recovery after line noise.

use microbridge::error::{Error, Result};
use microbridge::frame::{FrameDecoder, FrameEvent, FrameWriter, FRAME_OVERHEAD};
use microbridge::msgs::Message;
use microbridge::port::Port;
use proptest::collection::vec;
use proptest::prelude::*;

/// Port that captures everything written to it.
struct CapturePort {
    tx: Vec<u8>,
}

impl Port for CapturePort {
    fn init(&mut self) -> Result<()> {
        Ok(())
    }

    fn read(&mut self) -> Option<u8> {
        None
    }

    fn write(&mut self, byte: u8) -> Result<()> {
        self.tx.push(byte);
        Ok(())
    }

    fn time(&self) -> u32 {
        0
    }
}

/// Pass-through payload codec.
struct Raw<'a>(&'a [u8]);

impl Message for Raw<'_> {
    const TYPE_NAME: &'static str = "test_msgs/Raw";

    fn serialize(&self, buf: &mut [u8]) -> Result<usize> {
        if self.0.len() > buf.len() {
            return Err(Error::BufferTooSmall);
        }
        buf[..self.0.len()].copy_from_slice(self.0);
        Ok(self.0.len())
    }
}

fn emit(topic: u16, payload: &[u8]) -> Vec<u8> {
    let mut port = CapturePort { tx: Vec::new() };
    let mut writer = FrameWriter::<512>::new();
    writer.publish(&mut port, topic, &Raw(payload)).unwrap();
    port.tx
}

/// Feed a byte stream and collect every dispatched frame.
fn collect_frames<const N: usize>(decoder: &mut FrameDecoder<N>, stream: &[u8]) -> Vec<(u16, Vec<u8>)> {
    let mut frames = Vec::new();
    for &byte in stream {
        if let FrameEvent::Frame { topic, len } = decoder.feed(byte) {
            frames.push((topic, decoder.payload(len).to_vec()));
        }
    }
    frames
}

proptest! {
    /// For every well-formed frame, the 8-bit sum of everything after the
    /// sync bytes is congruent to 255.
    #[test]
    fn checksum_law(topic in any::<u16>(), payload in vec(any::<u8>(), 0..=512)) {
        let bytes = emit(topic, &payload);
        prop_assert_eq!(bytes.len(), payload.len() + FRAME_OVERHEAD);
        prop_assert_eq!(&bytes[..2], &[0xFF, 0xFF]);

        let sum: u32 = bytes[2..].iter().map(|&b| u32::from(b)).sum();
        prop_assert_eq!(sum % 256, 255);
    }

    /// Feeding an emitted frame byte-at-a-time from the hunting state
    /// dispatches it exactly once, unchanged.
    #[test]
    fn roundtrip_dispatches_exactly_once(
        topic in any::<u16>(),
        payload in vec(any::<u8>(), 0..=512),
    ) {
        let bytes = emit(topic, &payload);
        let mut decoder = FrameDecoder::<512>::new();
        let frames = collect_frames(&mut decoder, &bytes);

        prop_assert_eq!(frames.len(), 1);
        prop_assert_eq!(frames[0].0, topic);
        prop_assert_eq!(&frames[0].1, &payload);
        prop_assert!(!decoder.is_receiving());
    }

    /// No adversarial byte stream makes the decoder write outside its
    /// fixed buffer (an escape would index out of bounds and panic).
    #[test]
    fn adversarial_stream_never_overflows(stream in vec(any::<u8>(), 0..4096)) {
        let mut decoder = FrameDecoder::<256>::new();
        for &byte in &stream {
            let _ = decoder.feed(byte);
        }
    }

    /// A declared length above the capacity is rejected at the size field,
    /// before any payload byte is stored.
    #[test]
    fn oversize_rejected_at_size_field(
        topic in any::<u16>(),
        declared in 257u16..,
    ) {
        let mut decoder = FrameDecoder::<256>::new();
        let header = [
            0xFF,
            0xFF,
            (topic & 0xFF) as u8,
            (topic >> 8) as u8,
            (declared & 0xFF) as u8,
            (declared >> 8) as u8,
        ];
        let mut last = FrameEvent::Pending;
        for &byte in &header {
            last = decoder.feed(byte);
        }
        prop_assert_eq!(last, FrameEvent::Error(microbridge::frame::FrameError::Size));
        prop_assert!(!decoder.is_receiving());
    }

    /// Line noise that cannot open a frame (no 0xFF bytes) only burns
    /// error events; the next valid frame still dispatches intact.
    #[test]
    fn resync_after_garbage(
        garbage in vec(0u8..0xFF, 0..64),
        topic in any::<u16>(),
        payload in vec(any::<u8>(), 0..=64),
    ) {
        let mut stream = garbage;
        stream.extend(emit(topic, &payload));

        let mut decoder = FrameDecoder::<512>::new();
        let frames = collect_frames(&mut decoder, &stream);

        prop_assert_eq!(frames.len(), 1);
        prop_assert_eq!(frames[0].0, topic);
        prop_assert_eq!(&frames[0].1, &payload);
    }

    /// Back-to-back frames all come out, in order.
    #[test]
    fn consecutive_frames_all_dispatch(
        payloads in vec(vec(any::<u8>(), 0..=32), 1..8),
    ) {
        let mut stream = Vec::new();
        for (index, payload) in payloads.iter().enumerate() {
            stream.extend(emit(100 + index as u16, payload));
        }

        let mut decoder = FrameDecoder::<512>::new();
        let frames = collect_frames(&mut decoder, &stream);

        prop_assert_eq!(frames.len(), payloads.len());
        for (index, payload) in payloads.iter().enumerate() {
            prop_assert_eq!(frames[index].0, 100 + index as u16);
            prop_assert_eq!(&frames[index].1, payload);
        }
    }
}
