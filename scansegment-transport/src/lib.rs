//!
//! # scansegment-transport
//! Transport adapters and the receiver façade for LiDAR scan-segment telegrams.
//!
//! Binds a [`Transport`] (datagram or re-framed byte stream) to the COMPACT or MSGPACK decoder
//! from `scansegment-decode` and exposes a single "collect N segments" operation. The core is
//! single-threaded and cooperative: a call to `receive_segments` alternates between pulling a
//! telegram from the transport and decoding it, suspending only on the transport read.
//!

#![forbid(unsafe_code)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::correctness)]

mod datagram;
mod stream;
mod transport;

pub mod receiver;
pub mod result;

pub use datagram::DatagramTransport;
pub use receiver::{CompactReceiver, DecodeErrorPolicy, MsgpackReceiver, ReceiveOutcome};
pub use stream::StreamTransport;
pub use transport::Transport;
