//!
//! # scansegment-decode
//! Decoders and re-framing stream extractors for LiDAR scan-segment telegrams, in both the
//! self-describing MSGPACK encoding and the compact fixed-layout COMPACT encoding.
//!
//! This crate is pure: it never touches a socket. Given a telegram byte-blob it produces a
//! structured [`compact::CompactSegment`] or [`msgpack::MsgpackSegment`]; given a byte stream it
//! re-frames telegram blobs out of it via [`compact::CompactStreamExtractor`] or
//! [`msgpack::MsgpackStreamExtractor`]. Transport I/O lives in `scansegment-transport`.
//!

#![forbid(unsafe_code)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::correctness)]

mod binary_data;
mod crc;
mod half_float;
mod primitives;

pub mod bitfields;
pub mod compact;
pub mod msgpack;
pub mod result;
pub mod summarize;

pub use binary_data::BinaryData;
pub use bitfields::{BeamContent, EchoContent};
pub use crc::checksum as crc32_mpeg2;

/// A format-specific re-framing state machine that turns a byte stream into whole telegram
/// byte-blobs. Implemented by [`compact::CompactStreamExtractor`] and
/// [`msgpack::MsgpackStreamExtractor`]; lets `scansegment-transport`'s stream adapter stay
/// generic over either encoding.
pub trait StreamExtractor {
    /// Appends newly-received bytes to the extractor's internal buffer.
    fn feed(&mut self, bytes: &[u8]);

    /// Attempts to extract the next fully-framed telegram. Returns `None` when more bytes are
    /// needed; call again after the next `feed`.
    fn next_telegram(&mut self) -> Option<Vec<u8>>;
}
