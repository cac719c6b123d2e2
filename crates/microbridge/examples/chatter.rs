// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Classic first sketch: publish a counter once a second, print whatever
//! comes back on the echo topic.
//!
//! Point it at a TCP-serving bridge host:
//!
//! ```text
//! cargo run --example chatter -- 127.0.0.1:11411
//! ```

use std::env;
use std::thread;
use std::time::Duration;

use microbridge::codec::{Decoder, Encoder};
use microbridge::msgs::{Decode, Message};
use microbridge::port::TcpPort;
use microbridge::{NodeHandle, Port, Publisher, Result, Subscriber};

#[derive(Debug, Default)]
struct Int32 {
    data: i32,
}

impl Message for Int32 {
    const TYPE_NAME: &'static str = "std_msgs/Int32";

    fn serialize(&self, buf: &mut [u8]) -> Result<usize> {
        let mut encoder = Encoder::new(buf);
        encoder.encode_i32(self.data)?;
        Ok(encoder.position())
    }
}

impl Decode for Int32 {
    fn deserialize(&mut self, buf: &[u8]) -> Result<usize> {
        let mut decoder = Decoder::new(buf);
        self.data = decoder.decode_i32()?;
        Ok(decoder.position())
    }
}

fn on_echo(msg: &Int32) {
    println!("echo: {}", msg.data);
}

fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    let addr = env::args().nth(1).unwrap_or_else(|| "127.0.0.1:11411".to_string());

    let mut echo: Subscriber<Int32> = Subscriber::new("/echo", on_echo);

    let port = TcpPort::connect(&addr)?;
    let mut node: NodeHandle<TcpPort> = NodeHandle::new(port)?;

    let mut chatter = Publisher::<Int32>::new("/chatter");
    node.advertise(&mut chatter)?;
    node.subscribe(&mut echo)?;

    println!("bridge client up on {addr}");

    let mut count = Int32::default();
    let mut last_sent = node.port().time();
    loop {
        node.spin_once();

        let now_ms = node.port().time();
        if node.connected() && now_ms.wrapping_sub(last_sent) >= 1_000 {
            last_sent = now_ms;
            count.data += 1;
            node.publish(&chatter, &count)?;
        }

        thread::sleep(Duration::from_millis(10));
    }
}
