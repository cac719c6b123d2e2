// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Node handle - the bridge client orchestrator
//!
//! One object multiplexes every typed publisher, subscriber and parameter
//! request over a single framed byte stream: it owns the port, drives the
//! receive state machine, answers topic negotiation, keeps the host clock
//! synchronized, and tracks link liveness.
//!
//! # Design
//!
//! - Single-threaded cooperative (no async, no locks, no atomics)
//! - Fixed registry capacity via const generics (compile-time limit)
//! - All clock comparisons use unsigned modular subtraction, so the
//!   free-running millisecond counter may wrap
//!
//! # Example
//!
//! ```
//! use microbridge::node::NodeHandle;
//! use microbridge::port::NullPort;
//!
//! let mut node: NodeHandle<NullPort> = NodeHandle::new(NullPort::new()).unwrap();
//! assert!(!node.connected());
//! assert_eq!(node.spin_once(), 0);
//! ```

use core::fmt::Write as _;

use heapless::String;

use crate::config::NodeConfig;
use crate::error::{Error, Result};
use crate::frame::{FrameDecoder, FrameError, FrameEvent, FrameWriter};
use crate::msgs::{
    Decode, Log, LogLevel, Message, ParamRequest, ParamResponse, TopicInfo, MAX_PARAM_STRING,
    MAX_TOPIC_NAME,
};
use crate::port::Port;
use crate::pubsub::{Publisher, Receiver};
use crate::time::Time;

/// First channel id available to application endpoints
///
/// Subscribers occupy `[CHANNEL_ID_BASE, CHANNEL_ID_BASE + SUBS)`,
/// publishers the `PUBS` ids after them. Ids below the base are reserved
/// protocol channels.
pub const CHANNEL_ID_BASE: u16 = 100;

/// Receive-side error counters
///
/// Purely observational: damage on the link is counted and the state
/// machine resets, but nothing is torn down and no error is returned.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ErrorCounters {
    /// Frames declaring a payload larger than the receive capacity
    pub invalid_size: u32,

    /// Completed frames that failed checksum validation, and frames on an
    /// unrecognized channel (the two share a counter)
    pub checksum: u32,

    /// Bytes that were not `0xFF` where a start marker was expected
    pub framing: u32,

    /// Payloads a subscriber's codec rejected
    pub malformed: u32,
}

/// Node-owned copy of an endpoint's catalogue identity
#[derive(Debug, Clone, PartialEq, Eq)]
struct TopicRecord {
    topic: String<MAX_TOPIC_NAME>,
    message_type: String<MAX_TOPIC_NAME>,
}

impl TopicRecord {
    fn new(topic: &str, message_type: &str) -> Result<Self> {
        Ok(Self {
            topic: String::try_from(topic).map_err(|_| Error::InvalidParameter)?,
            message_type: String::try_from(message_type).map_err(|_| Error::InvalidParameter)?,
        })
    }
}

/// The bridge client node handle
///
/// - `P` - hardware port implementation
/// - `PUBS` - publisher slots
/// - `SUBS` - subscriber slots
/// - `CAP` - payload capacity in bytes, for both directions
///
/// Registry slots fill contiguously from index 0 and are never vacated;
/// endpoints live for the program duration.
pub struct NodeHandle<'a, P: Port, const PUBS: usize = 25, const SUBS: usize = 25, const CAP: usize = 512> {
    port: P,
    config: NodeConfig,

    writer: FrameWriter<CAP>,
    decoder: FrameDecoder<CAP>,

    publishers: [Option<TopicRecord>; PUBS],
    pub_count: usize,
    sub_records: [Option<TopicRecord>; SUBS],
    subscribers: [Option<&'a mut dyn Receiver>; SUBS],
    sub_count: usize,

    connected: bool,

    /// Local ms at which the in-flight sync request went out; 0 = none
    time_sync_start: u32,
    /// Local ms at which the last sync completed
    time_sync_end: u32,
    /// Host timestamp established at `time_sync_end`
    sync_time: Time,

    param_received: bool,
    param_response: ParamResponse,

    counters: ErrorCounters,
}

impl<'a, P: Port, const PUBS: usize, const SUBS: usize, const CAP: usize>
    NodeHandle<'a, P, PUBS, SUBS, CAP>
{
    /// Create a node handle with the default configuration
    ///
    /// Takes ownership of the port and runs its `init`.
    pub fn new(port: P) -> Result<Self> {
        Self::with_config(port, NodeConfig::default())
    }

    /// Create a node handle with an explicit configuration
    pub fn with_config(mut port: P, config: NodeConfig) -> Result<Self> {
        config.validate()?;
        port.init()?;

        Ok(Self {
            port,
            config,
            writer: FrameWriter::new(),
            decoder: FrameDecoder::new(),
            publishers: core::array::from_fn(|_| None),
            pub_count: 0,
            sub_records: core::array::from_fn(|_| None),
            subscribers: core::array::from_fn(|_| None),
            sub_count: 0,
            connected: false,
            time_sync_start: 0,
            time_sync_end: 0,
            sync_time: Time::ZERO,
            param_received: false,
            param_response: ParamResponse::default(),
            counters: ErrorCounters::default(),
        })
    }

    /// Whether a time sync landed within the connection timeout
    pub const fn connected(&self) -> bool {
        self.connected
    }

    /// Snapshot of the receive-side error counters
    pub const fn counters(&self) -> ErrorCounters {
        self.counters
    }

    /// Get the active configuration
    pub const fn config(&self) -> &NodeConfig {
        &self.config
    }

    /// Get the port (immutable)
    pub const fn port(&self) -> &P {
        &self.port
    }

    /// Get the port (mutable)
    pub fn port_mut(&mut self) -> &mut P {
        &mut self.port
    }

    /// Get the most recent parameter response
    pub const fn param_response(&self) -> &ParamResponse {
        &self.param_response
    }

    /// Bind a publisher to the next free slot
    ///
    /// Copies the topic identity into the registry and writes the assigned
    /// channel id back into the handle.
    pub fn advertise<M: Message>(&mut self, publisher: &mut Publisher<'_, M>) -> Result<u16> {
        if self.pub_count == PUBS {
            return Err(Error::ResourceExhausted);
        }
        let record = TopicRecord::new(publisher.topic(), M::TYPE_NAME)?;
        let slot = self.pub_count;
        self.publishers[slot] = Some(record);
        self.pub_count += 1;

        let id = CHANNEL_ID_BASE + SUBS as u16 + slot as u16;
        publisher.bind(id);
        Ok(id)
    }

    /// Bind a subscriber to the next free slot
    ///
    /// The node keeps the exclusive borrow for its own lifetime and feeds
    /// the subscriber every validated payload on its channel.
    pub fn subscribe<S: Receiver>(&mut self, subscriber: &'a mut S) -> Result<u16> {
        if self.sub_count == SUBS {
            return Err(Error::ResourceExhausted);
        }
        let record = TopicRecord::new(subscriber.topic_name(), subscriber.message_type())?;
        let slot = self.sub_count;
        self.sub_records[slot] = Some(record);
        self.subscribers[slot] = Some(subscriber);
        self.sub_count += 1;

        Ok(CHANNEL_ID_BASE + slot as u16)
    }

    /// Publish a message through an advertised publisher
    ///
    /// The message is borrowed for the duration of the call.
    ///
    /// # Returns
    ///
    /// Total bytes put on the wire.
    pub fn publish<M: Message>(&mut self, publisher: &Publisher<'_, M>, message: &M) -> Result<usize> {
        let id = publisher.id().ok_or(Error::NotAdvertised)?;
        self.writer.publish(&mut self.port, id, message)
    }

    /// Pump the link once, without blocking
    ///
    /// Runs liveness and sync housekeeping, then consumes at most
    /// `max_bytes_per_spin` bytes from the port, dispatching every frame
    /// that completes.
    ///
    /// # Returns
    ///
    /// The number of bytes consumed this call.
    pub fn spin_once(&mut self) -> usize {
        let current = self.port.time();

        if self.connected {
            if current.wrapping_sub(self.time_sync_end) > self.config.connection_timeout_ms {
                // The host went quiet; drop the in-flight sync so the next
                // attempt is accepted, and restart frame hunting.
                self.connected = false;
                self.time_sync_start = 0;
                self.decoder.reset();
            } else if current.wrapping_sub(self.time_sync_end) > self.config.sync_period_ms {
                let _ = self.request_time_sync();
            }
        }

        let mut consumed = 0;
        while consumed < self.config.max_bytes_per_spin {
            let Some(byte) = self.port.read() else {
                break;
            };
            consumed += 1;

            match self.decoder.feed(byte) {
                FrameEvent::Pending => {}
                FrameEvent::Frame { topic, len } => self.dispatch(topic, len),
                FrameEvent::Error(kind) => self.count_frame_error(kind),
            }
        }
        consumed
    }

    /// Current time in the middleware domain
    ///
    /// Derived from the last synchronized timestamp plus the local clock.
    /// Before the first completed sync the result is meaningless.
    pub fn now(&self) -> Time {
        let mut now = self.sync_time;
        now.add_millis(self.port.time().wrapping_sub(self.time_sync_end));
        now
    }

    /// Publish a log record on the reserved log channel
    pub fn log(&mut self, level: LogLevel, msg: &str) -> Result<usize> {
        self.writer.publish(&mut self.port, TopicInfo::ID_LOG, &Log { level, msg })
    }

    /// Publish a debug-level log record
    pub fn log_debug(&mut self, msg: &str) -> Result<usize> {
        self.log(LogLevel::Debug, msg)
    }

    /// Publish an info-level log record
    pub fn log_info(&mut self, msg: &str) -> Result<usize> {
        self.log(LogLevel::Info, msg)
    }

    /// Publish a warn-level log record
    pub fn log_warn(&mut self, msg: &str) -> Result<usize> {
        self.log(LogLevel::Warn, msg)
    }

    /// Publish an error-level log record
    pub fn log_error(&mut self, msg: &str) -> Result<usize> {
        self.log(LogLevel::Error, msg)
    }

    /// Publish a fatal-level log record
    pub fn log_fatal(&mut self, msg: &str) -> Result<usize> {
        self.log(LogLevel::Fatal, msg)
    }

    /// Fetch a parameter from the host, spinning until the response lands
    /// or `timeout_ms` elapses
    ///
    /// On success the response is readable through
    /// [`NodeHandle::param_response`] and the typed getters.
    pub fn request_param(&mut self, name: &str, timeout_ms: u32) -> Result<()> {
        self.param_received = false;
        self.writer
            .publish(&mut self.port, TopicInfo::ID_PARAMETER_REQUEST, &ParamRequest { name })?;

        let start = self.port.time();
        while !self.param_received {
            self.spin_once();
            if self.port.time().wrapping_sub(start) > timeout_ms {
                return Err(Error::Timeout);
            }
        }
        Ok(())
    }

    /// Fetch an integer-array parameter
    ///
    /// Copies out only if the host sent exactly `values.len()` elements.
    pub fn get_param_ints(&mut self, name: &str, values: &mut [i32], timeout_ms: u32) -> Result<()> {
        self.request_param(name, timeout_ms)?;
        if values.len() != self.param_response.ints.len() {
            return Err(Error::InvalidParameter);
        }
        values.copy_from_slice(&self.param_response.ints);
        Ok(())
    }

    /// Fetch a float-array parameter
    ///
    /// Copies out only if the host sent exactly `values.len()` elements.
    pub fn get_param_floats(
        &mut self,
        name: &str,
        values: &mut [f32],
        timeout_ms: u32,
    ) -> Result<()> {
        self.request_param(name, timeout_ms)?;
        if values.len() != self.param_response.floats.len() {
            return Err(Error::InvalidParameter);
        }
        values.copy_from_slice(&self.param_response.floats);
        Ok(())
    }

    /// Fetch a string-array parameter into caller-provided storage
    ///
    /// Copies out only if the host sent exactly `values.len()` elements.
    pub fn get_param_strings(
        &mut self,
        name: &str,
        values: &mut [String<MAX_PARAM_STRING>],
        timeout_ms: u32,
    ) -> Result<()> {
        self.request_param(name, timeout_ms)?;
        if values.len() != self.param_response.strings.len() {
            return Err(Error::InvalidParameter);
        }
        for (dest, src) in values.iter_mut().zip(self.param_response.strings.iter()) {
            dest.clear();
            dest.push_str(src).map_err(|_| Error::BufferTooSmall)?;
        }
        Ok(())
    }

    fn count_frame_error(&mut self, kind: FrameError) {
        match kind {
            FrameError::Sync => self.counters.framing += 1,
            FrameError::Size => self.counters.invalid_size += 1,
            FrameError::Checksum => self.counters.checksum += 1,
        }
    }

    /// Route one validated frame to its consumer
    fn dispatch(&mut self, topic: u16, len: usize) {
        match topic {
            TopicInfo::ID_PUBLISHER => {
                // Inbound channel 0 is the host asking for the catalogue.
                let _ = self.request_time_sync();
                let _ = self.negotiate_topics();
            }

            TopicInfo::ID_TIME => {
                let mut stamp = Time::ZERO;
                let decoded = stamp.deserialize(self.decoder.payload(len)).is_ok();
                self.complete_time_sync(decoded.then_some(stamp));
                self.connected = true;
            }

            TopicInfo::ID_PARAMETER_REQUEST => {
                // A decode failure stays silent; the pending fetch times out.
                if self.param_response.deserialize(self.decoder.payload(len)).is_ok() {
                    self.param_received = true;
                }
            }

            _ => {
                let slot = topic.wrapping_sub(CHANNEL_ID_BASE) as usize;
                if topic >= CHANNEL_ID_BASE && slot < SUBS {
                    if let Some(subscriber) = self.subscribers[slot].as_mut() {
                        if subscriber.receive(self.decoder.payload(len)).is_err() {
                            self.counters.malformed += 1;
                        }
                        return;
                    }
                }
                // An unrecognized channel shares the checksum counter.
                self.counters.checksum += 1;
            }
        }
    }

    /// Send the catalogue: every publisher record on channel 0, then every
    /// subscriber record on channel 1
    fn negotiate_topics(&mut self) -> Result<()> {
        for slot in 0..self.pub_count {
            if let Some(record) = self.publishers[slot].clone() {
                let info = TopicInfo {
                    topic_id: CHANNEL_ID_BASE + SUBS as u16 + slot as u16,
                    topic_name: record.topic.as_str(),
                    message_type: record.message_type.as_str(),
                };
                self.writer.publish(&mut self.port, TopicInfo::ID_PUBLISHER, &info)?;
            }
        }
        for slot in 0..self.sub_count {
            if let Some(record) = self.sub_records[slot].clone() {
                let info = TopicInfo {
                    topic_id: CHANNEL_ID_BASE + slot as u16,
                    topic_name: record.topic.as_str(),
                    message_type: record.message_type.as_str(),
                };
                self.writer.publish(&mut self.port, TopicInfo::ID_SUBSCRIBER, &info)?;
            }
        }
        Ok(())
    }

    /// Start a time sync unless one is already in flight
    fn request_time_sync(&mut self) -> Result<usize> {
        if self.time_sync_start != 0 {
            // A request is already in flight.
            return Ok(0);
        }
        self.time_sync_start = self.port.time();
        self.writer.publish(&mut self.port, TopicInfo::ID_TIME, &Time::ZERO)
    }

    /// Complete an outstanding time sync from the host's reply
    ///
    /// `stamp` is `None` when the payload did not decode; the completion
    /// instant is still recorded, and the in-flight request stays armed so
    /// the next host reply can finish it.
    fn complete_time_sync(&mut self, stamp: Option<Time>) {
        self.time_sync_end = self.port.time();
        let Some(stamp) = stamp else {
            return;
        };

        // Half the round trip approximates the one-way link delay.
        let offset = self.time_sync_end.wrapping_sub(self.time_sync_start) / 2;
        self.sync_time = stamp;
        self.sync_time.add_millis(offset);
        self.time_sync_start = 0;

        let mut line: String<40> = String::new();
        if write!(line, "Time: {} {}", self.sync_time.sec, self.sync_time.nsec).is_ok() {
            let _ = self.log_debug(&line);
        }
    }
}

#[cfg(test)]
impl<'a, P: Port, const PUBS: usize, const SUBS: usize, const CAP: usize>
    NodeHandle<'a, P, PUBS, SUBS, CAP>
{
    pub(crate) fn receive_idle(&self) -> bool {
        !self.decoder.is_receiving()
    }

    pub(crate) fn time_sync_start(&self) -> u32 {
        self.time_sync_start
    }

    pub(crate) fn time_sync_end(&self) -> u32 {
        self.time_sync_end
    }

    pub(crate) fn sync_time(&self) -> Time {
        self.sync_time
    }
}
