//! Wire formats and channels between a running simulation and the widgets.
//!
//! Inbound: one binary message per tick, a packed little-endian `f32` row
//! `[time, v0, v1, ...]`. Outbound: short text messages, `"<channel>,<value>"`
//! to set a value or `"<channel>,reset"` to hand a channel back to the
//! simulation. Both travel over the same connection in a real deployment; the
//! in-process flavour here uses two `std::sync::mpsc` channels.

use std::fmt;
use std::str::FromStr;
use std::sync::mpsc::{Receiver, SendError, Sender};

use crate::data::sample::Sample;
use crate::error::{Result, SimscopeError};

const F32_BYTES: usize = std::mem::size_of::<f32>();

/// Decode one inbound binary message into a [`Sample`].
///
/// The payload must hold exactly `n_channels + 1` floats. Anything else is a
/// `MalformedMessage` (lengths reported in bytes) and nothing is returned.
pub fn decode_sample(bytes: &[u8], n_channels: usize) -> Result<Sample> {
    let expected = (n_channels + 1) * F32_BYTES;
    if bytes.len() != expected {
        return Err(SimscopeError::MalformedMessage {
            expected,
            actual: bytes.len(),
        });
    }
    let mut row = bytes.chunks_exact(F32_BYTES).map(|chunk| {
        let mut raw = [0u8; F32_BYTES];
        raw.copy_from_slice(chunk);
        f64::from(f32::from_le_bytes(raw))
    });
    let time = row.next().unwrap_or_default();
    Ok(Sample::new(time, row.collect()))
}

/// Encode a tick as the simulation side would send it.
pub fn encode_sample(time: f32, values: &[f32]) -> Vec<u8> {
    let mut out = Vec::with_capacity((values.len() + 1) * F32_BYTES);
    out.extend_from_slice(&time.to_le_bytes());
    for v in values {
        out.extend_from_slice(&v.to_le_bytes());
    }
    out
}

/// A user edit travelling back to the simulation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OutboundMessage {
    /// Force `channel` to `value`.
    Value { channel: usize, value: f64 },
    /// Stop forcing `channel`; the simulation's own value takes over again.
    Reset { channel: usize },
}

impl OutboundMessage {
    pub fn channel(&self) -> usize {
        match *self {
            OutboundMessage::Value { channel, .. } | OutboundMessage::Reset { channel } => channel,
        }
    }
}

impl fmt::Display for OutboundMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutboundMessage::Value { channel, value } => write!(f, "{channel},{value}"),
            OutboundMessage::Reset { channel } => write!(f, "{channel},reset"),
        }
    }
}

impl FromStr for OutboundMessage {
    type Err = SimscopeError;

    fn from_str(s: &str) -> Result<Self> {
        let malformed = || SimscopeError::Transport(format!("unparseable outbound message {s:?}"));
        let (channel, rest) = s.split_once(',').ok_or_else(malformed)?;
        let channel: usize = channel.trim().parse().map_err(|_| malformed())?;
        let rest = rest.trim();
        if rest == "reset" {
            return Ok(OutboundMessage::Reset { channel });
        }
        let value: f64 = rest.parse().map_err(|_| malformed())?;
        Ok(OutboundMessage::Value { channel, value })
    }
}

/// Something that can carry outbound text to the simulation.
pub trait Transport {
    fn send_text(&mut self, text: &str) -> Result<()>;
}

impl<T: Transport + ?Sized> Transport for &mut T {
    fn send_text(&mut self, text: &str) -> Result<()> {
        (**self).send_text(text)
    }
}

/// Outbound transport backed by an in-process channel.
#[derive(Clone)]
pub struct ChannelTransport {
    tx: Sender<String>,
}

impl Transport for ChannelTransport {
    fn send_text(&mut self, text: &str) -> Result<()> {
        self.tx
            .send(text.to_string())
            .map_err(|_| SimscopeError::Transport("outbound receiver dropped".to_string()))
    }
}

/// Create an outbound channel: `(ChannelTransport, Receiver<String>)`.
/// The receiver end belongs to the simulation.
pub fn channel_transport() -> (ChannelTransport, Receiver<String>) {
    let (tx, rx) = std::sync::mpsc::channel();
    (ChannelTransport { tx }, rx)
}

/// Convenience sender the simulation uses to stream ticks to one widget.
#[derive(Clone)]
pub struct StreamSink {
    tx: Sender<Vec<u8>>,
}

impl StreamSink {
    /// Send one tick, encoded to the binary wire format.
    pub fn send_sample(&self, time: f32, values: &[f32]) -> std::result::Result<(), SendError<Vec<u8>>> {
        self.tx.send(encode_sample(time, values))
    }

    /// Send an already-encoded payload untouched.
    pub fn send_raw(&self, bytes: Vec<u8>) -> std::result::Result<(), SendError<Vec<u8>>> {
        self.tx.send(bytes)
    }
}

/// Create an inbound channel: `(StreamSink, Receiver<Vec<u8>>)`.
pub fn channel_stream() -> (StreamSink, Receiver<Vec<u8>>) {
    let (tx, rx) = std::sync::mpsc::channel();
    (StreamSink { tx }, rx)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_time_and_channels() {
        let bytes = encode_sample(0.25, &[1.0, -2.0]);
        let s = decode_sample(&bytes, 2).unwrap();
        assert_eq!(s.time, 0.25);
        assert_eq!(s.values, vec![1.0, -2.0]);
    }

    #[test]
    fn short_payload_is_malformed() {
        let bytes = encode_sample(0.25, &[1.0]);
        let err = decode_sample(&bytes, 2).unwrap_err();
        assert!(matches!(
            err,
            SimscopeError::MalformedMessage { expected: 12, actual: 8 }
        ));
    }

    #[test]
    fn ragged_payload_is_malformed() {
        let mut bytes = encode_sample(0.0, &[1.0]);
        bytes.push(0);
        assert!(decode_sample(&bytes, 1).is_err());
    }

    #[test]
    fn outbound_text_format() {
        assert_eq!(OutboundMessage::Value { channel: 1, value: 5.0 }.to_string(), "1,5");
        assert_eq!(OutboundMessage::Value { channel: 0, value: -0.25 }.to_string(), "0,-0.25");
        assert_eq!(OutboundMessage::Reset { channel: 2 }.to_string(), "2,reset");
    }

    #[test]
    fn outbound_text_parses_back() {
        assert_eq!(
            "3,0.5".parse::<OutboundMessage>().unwrap(),
            OutboundMessage::Value { channel: 3, value: 0.5 }
        );
        assert_eq!(
            "0,reset".parse::<OutboundMessage>().unwrap(),
            OutboundMessage::Reset { channel: 0 }
        );
        assert!("x,1".parse::<OutboundMessage>().is_err());
        assert!("7".parse::<OutboundMessage>().is_err());
    }

    #[test]
    fn channel_transport_reports_dropped_receiver() {
        let (mut tx, rx) = channel_transport();
        tx.send_text("0,1").unwrap();
        assert_eq!(rx.recv().unwrap(), "0,1");
        drop(rx);
        assert!(tx.send_text("0,2").is_err());
    }
}
