// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Middleware timestamp type
//!
//! The host clock is the time authority; the client derives "now" from the
//! last synchronized timestamp plus the local millisecond counter. The
//! local counter is free-running and wraps, so all offsets are computed
//! with unsigned modular subtraction before being added here.

use crate::codec::{Decoder, Encoder};
use crate::error::Result;
use crate::msgs::{Decode, Message};

/// Middleware-domain timestamp: whole seconds plus nanoseconds
///
/// Also the wire message carried on the time sync channel.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Time {
    /// Whole seconds
    pub sec: u32,
    /// Nanoseconds past the second, always below 1e9 after arithmetic
    pub nsec: u32,
}

impl Time {
    /// The zero timestamp
    pub const ZERO: Self = Self { sec: 0, nsec: 0 };

    /// Create a timestamp
    pub const fn new(sec: u32, nsec: u32) -> Self {
        Self { sec, nsec }
    }

    /// Advance by a millisecond offset, normalizing the nanosecond field
    pub fn add_millis(&mut self, millis: u32) {
        let total = u64::from(self.nsec) + u64::from(millis) * 1_000_000;
        self.sec = self.sec.wrapping_add((total / 1_000_000_000) as u32);
        self.nsec = (total % 1_000_000_000) as u32;
    }
}

impl Message for Time {
    const TYPE_NAME: &'static str = "bridge_msgs/Time";

    fn serialize(&self, buf: &mut [u8]) -> Result<usize> {
        let mut encoder = Encoder::new(buf);
        encoder.encode_u32(self.sec)?;
        encoder.encode_u32(self.nsec)?;
        Ok(encoder.position())
    }
}

impl Decode for Time {
    fn deserialize(&mut self, buf: &[u8]) -> Result<usize> {
        let mut decoder = Decoder::new(buf);
        self.sec = decoder.decode_u32()?;
        self.nsec = decoder.decode_u32()?;
        Ok(decoder.position())
    }
}
