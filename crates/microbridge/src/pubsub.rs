// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Publisher and subscriber endpoints
//!
//! Endpoints are application-owned. A publisher is a lightweight handle
//! that carries its topic name and, once advertised, the channel id the
//! registry assigned; the actual frame emission runs through the node
//! handle, which owns the port. A subscriber owns a decode scratch value
//! and a delivery callback; the node handle borrows it for its lifetime
//! and feeds it validated payloads during dispatch.

use core::marker::PhantomData;

use crate::error::Result;
use crate::msgs::{Decode, Message};

/// Registry-facing view of a subscription slot
///
/// Two capabilities: identity for catalogue emission, and a delivery entry
/// point that accepts the raw payload of a validated frame. Payload bytes
/// are only valid during the call; implementations copy out what they keep.
pub trait Receiver {
    /// Topic name, e.g. `"/cmd_vel"`
    fn topic_name(&self) -> &str;

    /// Schema name of the messages the topic carries
    fn message_type(&self) -> &str;

    /// Deliver one validated payload
    fn receive(&mut self, payload: &[u8]) -> Result<()>;
}

/// Handle for publishing typed messages on one topic
///
/// Created unbound; [`crate::node::NodeHandle::advertise`] assigns the
/// channel id. The handle stays valid for the program duration.
#[derive(Debug)]
pub struct Publisher<'a, M: Message> {
    topic: &'a str,
    id: Option<u16>,
    _message: PhantomData<M>,
}

impl<'a, M: Message> Publisher<'a, M> {
    /// Create an unbound publisher for `topic`
    pub const fn new(topic: &'a str) -> Self {
        Self { topic, id: None, _message: PhantomData }
    }

    /// Get the topic name
    pub const fn topic(&self) -> &'a str {
        self.topic
    }

    /// Get the assigned channel id, if advertised
    pub const fn id(&self) -> Option<u16> {
        self.id
    }

    pub(crate) fn bind(&mut self, id: u16) {
        self.id = Some(id);
    }
}

/// Typed subscriber delivering decoded messages to a callback
///
/// Decodes each payload into an owned scratch value and invokes the
/// callback with a borrow of it; the callback copies out anything it
/// wants to keep past the call.
#[derive(Debug)]
pub struct Subscriber<'a, M, F = fn(&M)>
where
    M: Message + Decode + Default,
    F: FnMut(&M),
{
    topic: &'a str,
    callback: F,
    scratch: M,
}

impl<'a, M, F> Subscriber<'a, M, F>
where
    M: Message + Decode + Default,
    F: FnMut(&M),
{
    /// Create a subscriber for `topic` delivering to `callback`
    pub fn new(topic: &'a str, callback: F) -> Self {
        Self { topic, callback, scratch: M::default() }
    }

    /// Get the topic name
    pub const fn topic(&self) -> &'a str {
        self.topic
    }
}

impl<M, F> Receiver for Subscriber<'_, M, F>
where
    M: Message + Decode + Default,
    F: FnMut(&M),
{
    fn topic_name(&self) -> &str {
        self.topic
    }

    fn message_type(&self) -> &str {
        M::TYPE_NAME
    }

    fn receive(&mut self, payload: &[u8]) -> Result<()> {
        self.scratch.deserialize(payload)?;
        (self.callback)(&self.scratch);
        Ok(())
    }
}
