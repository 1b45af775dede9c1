//!
//! The receiver façade: binds a transport adapter to a telegram decoder and exposes a
//! "collect N segments" operation.
//!

use crate::result::Error;
use crate::transport::Transport;
use scansegment_decode::compact::{self, CompactSegment};
use scansegment_decode::msgpack::{self, MsgpackSegment};

/// How a receiver responds to a single telegram failing to decode.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum DecodeErrorPolicy {
    /// Stop `receive_segments` and surface the error, returning whatever segments were already
    /// collected.
    #[default]
    FailFast,
    /// Log the error at `warn` level, discard the telegram, and keep collecting.
    SkipAndLog,
}

/// The result of a `receive_segments` call: the segments decoded so far, their frame numbers and
/// segment counters (parallel arrays, same length and order), and the error that ended collection
/// early, if any.
pub struct ReceiveOutcome<S> {
    pub segments: Vec<S>,
    pub frame_numbers: Vec<u32>,
    pub segment_counters: Vec<u32>,
    pub error: Option<Error>,
}

impl<S> ReceiveOutcome<S> {
    fn new() -> Self {
        Self {
            segments: Vec::new(),
            frame_numbers: Vec::new(),
            segment_counters: Vec::new(),
            error: None,
        }
    }
}

/// Runs the receive loop shared by [`CompactReceiver`] and [`MsgpackReceiver`]: pull a telegram
/// from `transport`, decode it with `decode`, and push the result until `n` segments are
/// collected, the transport ends, or (under [`DecodeErrorPolicy::FailFast`]) a telegram fails to
/// decode.
fn collect<T, S>(
    transport: &mut T,
    policy: DecodeErrorPolicy,
    n: usize,
    decode: impl Fn(&[u8]) -> scansegment_decode::result::Result<(u32, u32, S)>,
) -> ReceiveOutcome<S>
where
    T: Transport,
{
    let mut outcome = ReceiveOutcome::new();

    while outcome.segments.len() < n {
        let telegram = match transport.recv() {
            Ok(bytes) => bytes,
            Err(err) => {
                outcome.error = Some(err);
                break;
            }
        };

        match decode(&telegram) {
            Ok((frame_number, segment_counter, segment)) => {
                outcome.segments.push(segment);
                outcome.frame_numbers.push(frame_number);
                outcome.segment_counters.push(segment_counter);
            }
            Err(err) => match policy {
                DecodeErrorPolicy::FailFast => {
                    outcome.error = Some(Error::Decode(err));
                    break;
                }
                DecodeErrorPolicy::SkipAndLog => {
                    log::warn!("discarding telegram that failed to decode: {err} ({err:?})");
                }
            },
        }
    }

    outcome
}

/// Binds a transport adapter to the COMPACT decoder.
pub struct CompactReceiver<T> {
    transport: T,
    policy: DecodeErrorPolicy,
}

impl<T: Transport> CompactReceiver<T> {
    /// Creates a receiver with the default [`DecodeErrorPolicy::FailFast`] policy.
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            policy: DecodeErrorPolicy::default(),
        }
    }

    /// Creates a receiver with an explicit decode error policy.
    pub fn with_policy(transport: T, policy: DecodeErrorPolicy) -> Self {
        Self { transport, policy }
    }

    /// Collects up to `n` decoded segments. Returns fewer than `n` whenever the transport or
    /// decoder ends collection early, with the cause in `outcome.error`.
    pub fn receive_segments(&mut self, n: usize) -> ReceiveOutcome<CompactSegment> {
        collect(&mut self.transport, self.policy, n, |bytes| {
            compact::decode(bytes)
                .map(|segment| (segment.frame_number(), segment.segment_counter(), segment))
        })
    }

    /// Forwards to the underlying transport adapter.
    pub fn close_connection(&mut self) -> crate::result::Result<()> {
        self.transport.close()
    }
}

/// Binds a transport adapter to the MSGPACK decoder.
pub struct MsgpackReceiver<T> {
    transport: T,
    policy: DecodeErrorPolicy,
}

impl<T: Transport> MsgpackReceiver<T> {
    /// Creates a receiver with the default [`DecodeErrorPolicy::FailFast`] policy.
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            policy: DecodeErrorPolicy::default(),
        }
    }

    /// Creates a receiver with an explicit decode error policy.
    pub fn with_policy(transport: T, policy: DecodeErrorPolicy) -> Self {
        Self { transport, policy }
    }

    /// Collects up to `n` decoded segments. Returns fewer than `n` whenever the transport or
    /// decoder ends collection early, with the cause in `outcome.error`.
    pub fn receive_segments(&mut self, n: usize) -> ReceiveOutcome<MsgpackSegment> {
        collect(&mut self.transport, self.policy, n, |bytes| {
            msgpack::decode(bytes).map(|segment| {
                (segment.frame_number, segment.segment_counter, segment)
            })
        })
    }

    /// Forwards to the underlying transport adapter.
    pub fn close_connection(&mut self) -> crate::result::Result<()> {
        self.transport.close()
    }
}
