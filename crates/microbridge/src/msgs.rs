// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Built-in bridge protocol messages
//!
//! The reserved channels below carry these schemas; application topics
//! carry whatever schema their codecs implement. String fields of the
//! outgoing records are borrowed; the storage only has to outlive the
//! publish call.

use heapless::{String, Vec};

use crate::codec::{Decoder, Encoder};
use crate::error::{Error, Result};

/// Longest topic or message-type name the registry accepts, in bytes
pub const MAX_TOPIC_NAME: usize = 64;

/// Most values a parameter response array can carry
pub const MAX_PARAM_VALUES: usize = 8;

/// Longest string a parameter response can carry, in bytes
pub const MAX_PARAM_STRING: usize = 64;

/// Serialization half of the message codec contract
///
/// One implementation per message schema. Codecs never allocate and never
/// write past the destination buffer.
pub trait Message {
    /// Fully qualified schema name, e.g. `"std_msgs/Int32"`
    const TYPE_NAME: &'static str;

    /// Encode into `buf`, returning the number of bytes written
    fn serialize(&self, buf: &mut [u8]) -> Result<usize>;
}

/// Deserialization half of the message codec contract
///
/// Decodes in place into an existing value; never reads past `buf`.
pub trait Decode {
    /// Decode from `buf`, returning the number of bytes consumed
    fn deserialize(&mut self, buf: &[u8]) -> Result<usize>;
}

/// Topic catalogue record, exchanged during negotiation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TopicInfo<'a> {
    /// Channel assigned to the endpoint
    pub topic_id: u16,
    /// Topic name, e.g. `"/chatter"`
    pub topic_name: &'a str,
    /// Schema name of the messages the topic carries
    pub message_type: &'a str,
}

impl TopicInfo<'_> {
    /// Negotiation request (host to client) and publisher catalogue
    /// (client to host)
    pub const ID_PUBLISHER: u16 = 0;
    /// Subscriber catalogue (client to host)
    pub const ID_SUBSCRIBER: u16 = 1;
    /// Parameter request/response channel
    pub const ID_PARAMETER_REQUEST: u16 = 6;
    /// Log record channel
    pub const ID_LOG: u16 = 7;
    /// Time sync channel
    pub const ID_TIME: u16 = 10;
}

impl Message for TopicInfo<'_> {
    const TYPE_NAME: &'static str = "bridge_msgs/TopicInfo";

    fn serialize(&self, buf: &mut [u8]) -> Result<usize> {
        let mut encoder = Encoder::new(buf);
        encoder.encode_u16(self.topic_id)?;
        encoder.encode_str(self.topic_name)?;
        encoder.encode_str(self.message_type)?;
        Ok(encoder.position())
    }
}

/// Log record severity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Developer tracing
    Debug = 0,
    /// Normal operation
    Info = 1,
    /// Something unexpected but recoverable
    Warn = 2,
    /// An operation failed
    Error = 3,
    /// The node cannot continue
    Fatal = 4,
}

/// Log record published on the reserved log channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Log<'a> {
    /// Severity of the record
    pub level: LogLevel,
    /// Log text
    pub msg: &'a str,
}

impl Message for Log<'_> {
    const TYPE_NAME: &'static str = "bridge_msgs/Log";

    fn serialize(&self, buf: &mut [u8]) -> Result<usize> {
        let mut encoder = Encoder::new(buf);
        encoder.encode_u8(self.level as u8)?;
        encoder.encode_str(self.msg)?;
        Ok(encoder.position())
    }
}

/// Parameter fetch request (client to host)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParamRequest<'a> {
    /// Name of the parameter to fetch
    pub name: &'a str,
}

impl Message for ParamRequest<'_> {
    const TYPE_NAME: &'static str = "bridge_msgs/RequestParam";

    fn serialize(&self, buf: &mut [u8]) -> Result<usize> {
        let mut encoder = Encoder::new(buf);
        encoder.encode_str(self.name)?;
        Ok(encoder.position())
    }
}

/// Parameter fetch response (host to client)
///
/// Each array is a `u32` count followed by the elements. Values beyond the
/// fixed capacities reject the whole payload; the pending fetch then times
/// out.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ParamResponse {
    /// Integer values
    pub ints: Vec<i32, MAX_PARAM_VALUES>,
    /// Float values
    pub floats: Vec<f32, MAX_PARAM_VALUES>,
    /// String values
    pub strings: Vec<String<MAX_PARAM_STRING>, MAX_PARAM_VALUES>,
}

impl Message for ParamResponse {
    const TYPE_NAME: &'static str = "bridge_msgs/RequestParam";

    fn serialize(&self, buf: &mut [u8]) -> Result<usize> {
        let mut encoder = Encoder::new(buf);
        encoder.encode_u32(self.ints.len() as u32)?;
        for &value in &self.ints {
            encoder.encode_i32(value)?;
        }
        encoder.encode_u32(self.floats.len() as u32)?;
        for &value in &self.floats {
            encoder.encode_f32(value)?;
        }
        encoder.encode_u32(self.strings.len() as u32)?;
        for value in &self.strings {
            encoder.encode_str(value)?;
        }
        Ok(encoder.position())
    }
}

impl Decode for ParamResponse {
    fn deserialize(&mut self, buf: &[u8]) -> Result<usize> {
        let mut decoder = Decoder::new(buf);

        self.ints.clear();
        self.floats.clear();
        self.strings.clear();

        let count = decoder.decode_u32()? as usize;
        for _ in 0..count {
            let value = decoder.decode_i32()?;
            self.ints.push(value).map_err(|_| Error::BufferTooSmall)?;
        }

        let count = decoder.decode_u32()? as usize;
        for _ in 0..count {
            let value = decoder.decode_f32()?;
            self.floats.push(value).map_err(|_| Error::BufferTooSmall)?;
        }

        let count = decoder.decode_u32()? as usize;
        for _ in 0..count {
            let value = decoder.decode_str()?;
            let owned = String::try_from(value).map_err(|_| Error::BufferTooSmall)?;
            self.strings.push(owned).map_err(|_| Error::BufferTooSmall)?;
        }

        Ok(decoder.position())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_topic_info_layout() {
        let info = TopicInfo {
            topic_id: 125,
            topic_name: "/foo",
            message_type: "std_msgs/Int32",
        };

        let mut buf = [0u8; 64];
        let len = info.serialize(&mut buf).unwrap();

        let mut decoder = Decoder::new(&buf[..len]);
        assert_eq!(decoder.decode_u16().unwrap(), 125);
        assert_eq!(decoder.decode_str().unwrap(), "/foo");
        assert_eq!(decoder.decode_str().unwrap(), "std_msgs/Int32");
        assert_eq!(decoder.remaining(), 0);
    }

    #[test]
    fn test_log_layout() {
        let record = Log { level: LogLevel::Warn, msg: "low battery" };

        let mut buf = [0u8; 64];
        let len = record.serialize(&mut buf).unwrap();

        let mut decoder = Decoder::new(&buf[..len]);
        assert_eq!(decoder.decode_u8().unwrap(), 2);
        assert_eq!(decoder.decode_str().unwrap(), "low battery");
    }

    #[test]
    fn test_param_request_layout() {
        let request = ParamRequest { name: "~wheel_radius" };
        let mut buf = [0u8; 64];
        let len = request.serialize(&mut buf).unwrap();

        let mut decoder = Decoder::new(&buf[..len]);
        assert_eq!(decoder.decode_str().unwrap(), "~wheel_radius");
    }

    #[test]
    fn test_param_response_roundtrip() {
        let mut response = ParamResponse::default();
        response.ints.extend_from_slice(&[3, -4]).unwrap();
        response.floats.push(0.5).unwrap();
        response.strings.push(String::try_from("base_link").unwrap()).unwrap();

        let mut buf = [0u8; 128];
        let len = response.serialize(&mut buf).unwrap();

        let mut decoded = ParamResponse::default();
        let consumed = decoded.deserialize(&buf[..len]).unwrap();
        assert_eq!(consumed, len);
        assert_eq!(decoded, response);
    }

    #[test]
    fn test_param_response_rejects_overflow() {
        // Declares more ints than the fixed capacity.
        let mut buf = [0u8; 128];
        let mut encoder = Encoder::new(&mut buf);
        encoder.encode_u32(MAX_PARAM_VALUES as u32 + 1).unwrap();
        for _ in 0..=MAX_PARAM_VALUES {
            encoder.encode_i32(1).unwrap();
        }
        let len = encoder.position();

        let mut decoded = ParamResponse::default();
        assert_eq!(decoded.deserialize(&buf[..len]), Err(Error::BufferTooSmall));
    }

    #[test]
    fn test_param_response_truncated() {
        // Count says two ints, only one follows.
        let mut buf = [0u8; 16];
        let mut encoder = Encoder::new(&mut buf);
        encoder.encode_u32(2).unwrap();
        encoder.encode_i32(9).unwrap();
        let len = encoder.position();

        let mut decoded = ParamResponse::default();
        assert_eq!(decoded.deserialize(&buf[..len]), Err(Error::DecodingError));
    }
}
