// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Error types for the bridge client

use core::fmt;

/// Result type for bridge client operations
pub type Result<T> = core::result::Result<T, Error>;

/// Error type for the bridge client
///
/// Receive-side protocol damage (bad sync bytes, oversize frames, checksum
/// mismatches, rejected payloads) is counted, not returned; see
/// [`crate::node::ErrorCounters`]. This enum covers caller-facing failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Buffer too small for operation
    BufferTooSmall,

    /// Payload decoding error
    DecodingError,

    /// Invalid parameter (over-long name, length mismatch, bad config)
    InvalidParameter,

    /// Resource exhausted (registry full)
    ResourceExhausted,

    /// Publisher has not been advertised
    NotAdvertised,

    /// Port write error
    PortError,

    /// Operation timed out
    Timeout,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::BufferTooSmall => write!(f, "Buffer too small"),
            Error::DecodingError => write!(f, "Payload decoding error"),
            Error::InvalidParameter => write!(f, "Invalid parameter"),
            Error::ResourceExhausted => write!(f, "Resource exhausted"),
            Error::NotAdvertised => write!(f, "Publisher not advertised"),
            Error::PortError => write!(f, "Port write error"),
            Error::Timeout => write!(f, "Operation timed out"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}
