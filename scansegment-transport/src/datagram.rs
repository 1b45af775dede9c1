//!
//! Datagram transport adapter: one telegram per receive call, no framing needed.
//!

use crate::result::{Error, Result};
use crate::transport::Transport;
use std::net::{ToSocketAddrs, UdpSocket};

/// Receives whole telegrams over UDP, one per datagram.
///
/// Binds a local socket and reads datagrams sent to it by the sensor; each datagram is assumed to
/// carry exactly one telegram, bounded by `max_datagram` bytes.
pub struct DatagramTransport {
    socket: Option<UdpSocket>,
    max_datagram: usize,
}

impl DatagramTransport {
    /// Binds a UDP socket at `addr` to receive telegrams up to `max_datagram` bytes each.
    pub fn bind<A: ToSocketAddrs>(addr: A, max_datagram: usize) -> Result<Self> {
        let socket = UdpSocket::bind(addr)?;
        log::debug!(
            "bound datagram transport on {:?}, max_datagram={max_datagram}",
            socket.local_addr()
        );
        Ok(Self {
            socket: Some(socket),
            max_datagram,
        })
    }
}

impl Transport for DatagramTransport {
    fn recv(&mut self) -> Result<Vec<u8>> {
        let socket = self.socket.as_ref().ok_or(Error::TransportClosed)?;
        let mut buffer = vec![0u8; self.max_datagram];
        let (len, peer) = socket.recv_from(&mut buffer)?;
        log::trace!("received {len} byte datagram from {peer}");
        buffer.truncate(len);
        Ok(buffer)
    }

    fn close(&mut self) -> Result<()> {
        self.socket = None;
        Ok(())
    }
}
