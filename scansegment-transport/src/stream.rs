//!
//! Stream transport adapter: re-frames telegrams out of a connected TCP byte stream using an
//! injected [`StreamExtractor`].
//!

use crate::result::{Error, Result};
use crate::transport::Transport;
use scansegment_decode::StreamExtractor;
use std::io::Read;
use std::net::{TcpStream, ToSocketAddrs};

/// Receives whole telegrams over a connected byte stream, re-framing them with an injected
/// [`StreamExtractor`] (one of [`scansegment_decode::compact::CompactStreamExtractor`] or
/// [`scansegment_decode::msgpack::MsgpackStreamExtractor`]).
pub struct StreamTransport<E> {
    stream: Option<TcpStream>,
    extractor: E,
    chunk_size: usize,
}

impl<E: StreamExtractor> StreamTransport<E> {
    /// Connects to `addr` and wraps the resulting stream with `extractor`, reading in
    /// `chunk_size`-byte increments.
    pub fn connect<A: ToSocketAddrs>(addr: A, extractor: E, chunk_size: usize) -> Result<Self> {
        let stream = TcpStream::connect(addr)?;
        log::debug!("connected stream transport to {:?}", stream.peer_addr());
        Ok(Self {
            stream: Some(stream),
            extractor,
            chunk_size,
        })
    }
}

impl<E: StreamExtractor> Transport for StreamTransport<E> {
    fn recv(&mut self) -> Result<Vec<u8>> {
        loop {
            if let Some(telegram) = self.extractor.next_telegram() {
                return Ok(telegram);
            }

            let stream = self.stream.as_mut().ok_or(Error::TransportClosed)?;
            let mut chunk = vec![0u8; self.chunk_size];
            let read = stream.read(&mut chunk)?;
            if read == 0 {
                log::debug!("stream ended with a telegram still incomplete");
                return Err(Error::TransportClosed);
            }
            log::trace!("read {read} bytes from stream");
            self.extractor.feed(&chunk[..read]);
        }
    }

    fn close(&mut self) -> Result<()> {
        self.stream = None;
        Ok(())
    }
}
