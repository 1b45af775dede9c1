//!
//! The transport adapter contract: deliver whole telegram byte-blobs, one per [`Transport::recv`]
//! call, regardless of whether the underlying medium is connectionless (datagram) or a re-framed
//! byte stream.
//!

use crate::result::Result;

/// Delivers telegram byte-blobs from an underlying socket.
///
/// A blocking call: `recv` returns once a full telegram is available or the connection ends.
/// Implementations own their socket and release it in [`Transport::close`].
pub trait Transport {
    /// Returns the next complete telegram's bytes, blocking until one is available.
    ///
    /// Fails with [`crate::result::Error::TransportClosed`] if the underlying connection ends
    /// while a telegram was still incomplete (stream transports) or the socket is gone (datagram
    /// transports).
    fn recv(&mut self) -> Result<Vec<u8>>;

    /// Releases the underlying socket. Further calls to [`Transport::recv`] fail.
    fn close(&mut self) -> Result<()>;
}
