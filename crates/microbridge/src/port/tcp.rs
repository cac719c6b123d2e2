// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! TCP port for hosted targets
//!
//! Lets a process on a full operating system speak the bridge protocol to
//! a TCP-serving host, which is handy for bring-up and integration testing
//! before the firmware target exists.

use std::io::{self, Read, Write};
use std::net::{TcpStream, ToSocketAddrs};
use std::time::Instant;

use super::Port;
use crate::error::{Error, Result};

/// Byte pipe over a non-blocking TCP stream
///
/// The millisecond clock starts at connect time.
#[derive(Debug)]
pub struct TcpPort {
    stream: TcpStream,
    epoch: Instant,
}

impl TcpPort {
    /// Connect to a TCP-serving bridge host
    pub fn connect<A: ToSocketAddrs>(addr: A) -> io::Result<Self> {
        let stream = TcpStream::connect(addr)?;
        stream.set_nonblocking(true)?;
        stream.set_nodelay(true)?;
        Ok(Self { stream, epoch: Instant::now() })
    }
}

impl Port for TcpPort {
    fn init(&mut self) -> Result<()> {
        Ok(())
    }

    fn read(&mut self) -> Option<u8> {
        let mut byte = [0u8; 1];
        match self.stream.read(&mut byte) {
            Ok(1) => Some(byte[0]),
            // EOF; the connection timeout surfaces a dead link.
            Ok(_) => None,
            Err(e)
                if e.kind() == io::ErrorKind::WouldBlock
                    || e.kind() == io::ErrorKind::Interrupted =>
            {
                None
            }
            Err(e) => {
                log::warn!("bridge link read failed: {}", e);
                None
            }
        }
    }

    fn write(&mut self, byte: u8) -> Result<()> {
        loop {
            match self.stream.write(&[byte]) {
                Ok(0) => {
                    log::warn!("bridge link closed during write");
                    return Err(Error::PortError);
                }
                Ok(_) => return Ok(()),
                Err(e)
                    if e.kind() == io::ErrorKind::WouldBlock
                        || e.kind() == io::ErrorKind::Interrupted =>
                {
                    // The socket buffer is full; writes may block briefly.
                    continue;
                }
                Err(e) => {
                    log::warn!("bridge link write failed: {}", e);
                    return Err(Error::PortError);
                }
            }
        }
    }

    fn time(&self) -> u32 {
        self.epoch.elapsed().as_millis() as u32
    }
}
