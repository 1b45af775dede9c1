const LENGTH_PREFIX_LEN: usize = 4;
const CRC_LEN: usize = 4;

/// Telegrams longer than this are considered implausible and trigger a resync rather than an
/// attempt to buffer gigabytes of misaligned stream.
const MAX_TELEGRAM_LEN: usize = 16 * 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    ReadLength,
    ReadBody { body_len: usize },
    ReadCrc { body_len: usize },
}

/// Re-frames a byte stream of length-prefixed MSGPACK telegrams into individual, CRC-terminated
/// telegram blobs.
///
/// Frame: 4-byte big-endian length `N`, `N` bytes of MSGPACK body, 4-byte CRC. Unlike the COMPACT
/// extractor there is no magic to scan for, so an implausible length (zero, or past
/// [MAX_TELEGRAM_LEN]) instead triggers a one-byte resync.
pub struct MsgpackStreamExtractor {
    buffer: Vec<u8>,
    state: State,
}

impl Default for MsgpackStreamExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl MsgpackStreamExtractor {
    pub fn new() -> Self {
        Self {
            buffer: Vec::new(),
            state: State::ReadLength,
        }
    }

    /// Appends newly-received bytes to the extractor's internal buffer.
    pub fn feed(&mut self, bytes: &[u8]) {
        self.buffer.extend_from_slice(bytes);
    }

    /// Attempts to extract the next fully-framed telegram. Returns `None` when more bytes are
    /// needed.
    pub fn next_telegram(&mut self) -> Option<Vec<u8>> {
        loop {
            match self.state {
                State::ReadLength => {
                    if self.buffer.len() < LENGTH_PREFIX_LEN {
                        return None;
                    }
                    let l = &self.buffer[..LENGTH_PREFIX_LEN];
                    let body_len = u32::from_be_bytes([l[0], l[1], l[2], l[3]]) as usize;
                    if body_len == 0 || body_len > MAX_TELEGRAM_LEN {
                        // Resync: this wasn't really a length prefix. Drop one byte and retry.
                        log::debug!("msgpack extractor: resync, implausible length prefix {body_len}");
                        self.buffer.drain(..1);
                        continue;
                    }
                    log::trace!("msgpack extractor: ReadLength -> ReadBody (body_len={body_len})");
                    self.buffer.drain(..LENGTH_PREFIX_LEN);
                    self.state = State::ReadBody { body_len };
                }
                State::ReadBody { body_len } => {
                    if self.buffer.len() < body_len {
                        return None;
                    }
                    log::trace!("msgpack extractor: ReadBody -> ReadCrc");
                    self.state = State::ReadCrc { body_len };
                }
                State::ReadCrc { body_len } => {
                    if self.buffer.len() < body_len + CRC_LEN {
                        return None;
                    }
                    let telegram = self.buffer[..body_len + CRC_LEN].to_vec();
                    self.buffer.drain(..body_len + CRC_LEN);
                    log::trace!("msgpack extractor: ReadCrc -> Emit ({} bytes)", telegram.len());
                    self.state = State::ReadLength;
                    return Some(telegram);
                }
            }
        }
    }
}

impl crate::StreamExtractor for MsgpackStreamExtractor {
    fn feed(&mut self, bytes: &[u8]) {
        MsgpackStreamExtractor::feed(self, bytes)
    }

    fn next_telegram(&mut self) -> Option<Vec<u8>> {
        MsgpackStreamExtractor::next_telegram(self)
    }
}
