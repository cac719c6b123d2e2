// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! # Microbridge - embedded pub/sub bridge client
//!
//! A `no_std` client endpoint that lets a resource-constrained
//! microcontroller participate in a publish/subscribe robotics middleware
//! over a single byte-oriented serial link (UART, USB-CDC, TCP). A
//! host-side process on the other end of the link translates the bridge
//! traffic to and from the full middleware network.
//!
//! ## Design Constraints
//!
//! - **No heap allocations** (const generics for fixed buffers)
//! - **Single-threaded cooperative** - no locks, no atomics, no async
//! - **Bounded work per spin** - the pump never blocks
//! - **`no_std` compatible** (the `std` feature adds host-side ports)
//!
//! ## Architecture
//!
//! ```text
//! +-----------------------------------------+
//! |  Application (publishers, subscribers)  |
//! +-----------------------------------------+
//!           v                    ^
//! +-----------------------------------------+
//! |  NodeHandle (registry, time sync,       |
//! |  liveness, dispatch, params, logging)   |
//! +-----------------------------------------+
//!           v                    ^
//! +-----------------------------------------+
//! |  Frame writer / receive state machine   |
//! +-----------------------------------------+
//!           v                    ^
//! +-----------------------------------------+
//! |  Port (UART / USB-CDC / TCP byte pipe)  |
//! +-----------------------------------------+
//! ```
//!
//! ## Feature Flags
//!
//! - `std` -- host-side support: [`port::TcpPort`], io-error diagnostics
//!   via the `log` facade, `std::error::Error` for [`Error`]

#![cfg_attr(not(feature = "std"), no_std)]
#![deny(unsafe_code)]
#![warn(missing_docs)]

/// Payload encoder/decoder (wire primitives for message codecs)
pub mod codec;

/// Node configuration tunables
pub mod config;

/// Error types for the bridge client
pub mod error;

/// Frame writer and receive state machine
pub mod frame;

/// Built-in protocol messages and the codec traits
pub mod msgs;

/// The node handle orchestrator
pub mod node;

/// Hardware port abstraction
pub mod port;

/// Publisher and subscriber endpoints
pub mod pubsub;

/// Middleware timestamp type
pub mod time;

// Re-exports for convenience
pub use crate::config::NodeConfig;
pub use crate::error::{Error, Result};
pub use crate::msgs::{Decode, Log, LogLevel, Message, ParamRequest, ParamResponse, TopicInfo};
pub use crate::node::{ErrorCounters, NodeHandle, CHANNEL_ID_BASE};
pub use crate::port::{NullPort, Port};
pub use crate::pubsub::{Publisher, Receiver, Subscriber};
pub use crate::time::Time;

/// Version of the bridge client
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
