use crate::compact::header::{START_OF_FRAME, SUPPORTED_VERSION};
use crate::compact::module;

const HEADER_LEN: usize = 32;
const CRC_LEN: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    SearchStart,
    ReadHeader,
    /// `module_start`/`module_len` locate the most recently accumulated module (relative to the
    /// buffer's current start); `modules_end` is the total byte offset where the next module (or
    /// the CRC, once `next_module_size == 0`) begins.
    ReadModules {
        module_start: usize,
        module_len: usize,
        modules_end: usize,
    },
    ReadCrc {
        frame_len: usize,
    },
}

/// Re-frames a byte stream of concatenated COMPACT telegrams into individual, CRC-terminated
/// telegram blobs, resynchronizing past corrupted or bogus-version frames.
///
/// Implements the `SearchStart -> ReadHeader -> ReadModules -> ReadCrc -> Emit` state machine:
/// feeding bytes one at a time or in bulk produces the same sequence of emitted telegrams.
pub struct CompactStreamExtractor {
    buffer: Vec<u8>,
    state: State,
}

impl Default for CompactStreamExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl CompactStreamExtractor {
    pub fn new() -> Self {
        Self {
            buffer: Vec::new(),
            state: State::SearchStart,
        }
    }

    /// Appends newly-received bytes to the extractor's internal buffer.
    pub fn feed(&mut self, bytes: &[u8]) {
        self.buffer.extend_from_slice(bytes);
    }

    /// Attempts to extract the next fully-framed telegram (header through trailing CRC). Returns
    /// `None` when more bytes are needed; call again after the next `feed`.
    pub fn next_telegram(&mut self) -> Option<Vec<u8>> {
        loop {
            match self.state {
                State::SearchStart => {
                    let magic = START_OF_FRAME.to_le_bytes();
                    match find_magic(&self.buffer, &magic) {
                        None => {
                            let keep = self.buffer.len().min(magic.len() - 1);
                            let drop_to = self.buffer.len() - keep;
                            self.buffer.drain(..drop_to);
                            return None;
                        }
                        Some(index) => {
                            if index > 0 {
                                self.buffer.drain(..index);
                            }
                            log::trace!("compact extractor: SearchStart -> ReadHeader");
                            self.state = State::ReadHeader;
                        }
                    }
                }
                State::ReadHeader => {
                    if self.buffer.len() < HEADER_LEN {
                        return None;
                    }
                    let version = u32::from_le_bytes([
                        self.buffer[24],
                        self.buffer[25],
                        self.buffer[26],
                        self.buffer[27],
                    ]);
                    if version != SUPPORTED_VERSION {
                        // Bogus version: this wasn't really a telegram start. Drop one byte of the
                        // matched magic and keep searching, guaranteeing forward progress.
                        log::debug!(
                            "compact extractor: resync, unsupported version {version} after magic match"
                        );
                        self.buffer.drain(..1);
                        self.state = State::SearchStart;
                        continue;
                    }
                    let size_module_0 = u32::from_le_bytes([
                        self.buffer[28],
                        self.buffer[29],
                        self.buffer[30],
                        self.buffer[31],
                    ]) as usize;
                    log::trace!("compact extractor: ReadHeader -> ReadModules (size_module_0={size_module_0})");
                    self.state = State::ReadModules {
                        module_start: HEADER_LEN,
                        module_len: size_module_0,
                        modules_end: HEADER_LEN + size_module_0,
                    };
                }
                State::ReadModules {
                    module_start,
                    module_len,
                    modules_end,
                } => {
                    if self.buffer.len() < modules_end {
                        return None;
                    }
                    let module_bytes = &self.buffer[module_start..module_start + module_len];
                    let next_module_size = match module::peek_next_module_size(module_bytes) {
                        Ok(size) => size,
                        Err(err) => {
                            // Malformed module metadata; resync past this frame's magic.
                            log::debug!("compact extractor: resync, malformed module metadata: {err}");
                            self.buffer.drain(..1);
                            self.state = State::SearchStart;
                            continue;
                        }
                    };
                    if next_module_size == 0 {
                        log::trace!("compact extractor: ReadModules -> ReadCrc");
                        self.state = State::ReadCrc {
                            frame_len: modules_end,
                        };
                    } else {
                        log::trace!(
                            "compact extractor: ReadModules -> ReadModules (next_module_size={next_module_size})"
                        );
                        self.state = State::ReadModules {
                            module_start: modules_end,
                            module_len: next_module_size as usize,
                            modules_end: modules_end + next_module_size as usize,
                        };
                    }
                }
                State::ReadCrc { frame_len } => {
                    if self.buffer.len() < frame_len + CRC_LEN {
                        return None;
                    }
                    let telegram = self.buffer[..frame_len + CRC_LEN].to_vec();
                    self.buffer.drain(..frame_len + CRC_LEN);
                    log::trace!("compact extractor: ReadCrc -> Emit ({} bytes)", telegram.len());
                    self.state = State::SearchStart;
                    return Some(telegram);
                }
            }
        }
    }
}

impl crate::StreamExtractor for CompactStreamExtractor {
    fn feed(&mut self, bytes: &[u8]) {
        CompactStreamExtractor::feed(self, bytes)
    }

    fn next_telegram(&mut self) -> Option<Vec<u8>> {
        CompactStreamExtractor::next_telegram(self)
    }
}

fn find_magic(buffer: &[u8], magic: &[u8; 4]) -> Option<usize> {
    buffer.windows(4).position(|window| window == magic)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compact::segment;

    fn minimal_telegram(telegram_counter: u64) -> Vec<u8> {
        let mut module = Vec::new();
        module.extend_from_slice(&1u32.to_le_bytes());
        module.extend_from_slice(&2u32.to_le_bytes());
        module.extend_from_slice(&3u32.to_le_bytes());
        module.extend_from_slice(&0u32.to_le_bytes()); // lines_in_module
        module.extend_from_slice(&0u32.to_le_bytes());
        module.extend_from_slice(&0u32.to_le_bytes());
        module.extend_from_slice(&1.0f32.to_le_bytes());
        module.extend_from_slice(&0u32.to_le_bytes()); // next_module_size
        module.extend_from_slice(&[0, 0, 0, 0]);

        let mut header = Vec::new();
        header.extend_from_slice(&START_OF_FRAME.to_le_bytes());
        header.extend_from_slice(&1u32.to_le_bytes());
        header.extend_from_slice(&telegram_counter.to_le_bytes());
        header.extend_from_slice(&0u64.to_le_bytes());
        header.extend_from_slice(&SUPPORTED_VERSION.to_le_bytes());
        header.extend_from_slice(&(module.len() as u32).to_le_bytes());

        let mut telegram = header;
        telegram.extend_from_slice(&module);
        let crc = crate::crc::checksum(&telegram);
        telegram.extend_from_slice(&crc.to_le_bytes());
        telegram
    }

    #[test]
    fn extracts_single_telegram_fed_whole() {
        let mut extractor = CompactStreamExtractor::new();
        extractor.feed(&minimal_telegram(1));
        let telegram = extractor.next_telegram().expect("telegram emitted");
        let decoded = segment::decode(&telegram).unwrap();
        assert_eq!(decoded.telegram_counter, 1);
        assert!(extractor.next_telegram().is_none());
    }

    #[test]
    fn extracts_telegram_fed_one_byte_at_a_time() {
        let bytes = minimal_telegram(2);
        let mut extractor = CompactStreamExtractor::new();
        let mut emitted = None;
        for byte in bytes {
            extractor.feed(&[byte]);
            if let Some(telegram) = extractor.next_telegram() {
                emitted = Some(telegram);
            }
        }
        let decoded = segment::decode(&emitted.expect("telegram emitted")).unwrap();
        assert_eq!(decoded.telegram_counter, 2);
    }

    #[test]
    fn skips_leading_noise_before_magic() {
        let mut extractor = CompactStreamExtractor::new();
        let mut stream = vec![0xAB, 0xCD, 0xEF, 0x01, 0x02, 0x03];
        stream.extend_from_slice(&minimal_telegram(3));
        extractor.feed(&stream);
        let telegram = extractor.next_telegram().expect("telegram emitted");
        let decoded = segment::decode(&telegram).unwrap();
        assert_eq!(decoded.telegram_counter, 3);
    }

    #[test]
    fn extracts_two_concatenated_telegrams() {
        let mut extractor = CompactStreamExtractor::new();
        let mut stream = minimal_telegram(10);
        stream.extend_from_slice(&minimal_telegram(11));
        extractor.feed(&stream);

        let first = extractor.next_telegram().expect("first telegram");
        let second = extractor.next_telegram().expect("second telegram");
        assert_eq!(segment::decode(&first).unwrap().telegram_counter, 10);
        assert_eq!(segment::decode(&second).unwrap().telegram_counter, 11);
        assert!(extractor.next_telegram().is_none());
    }

    #[test]
    fn resyncs_past_a_bogus_version() {
        let mut bogus = minimal_telegram(20);
        bogus[24..28].copy_from_slice(&99u32.to_le_bytes()); // corrupt version field
        let mut stream = bogus;
        stream.extend_from_slice(&minimal_telegram(21));

        let mut extractor = CompactStreamExtractor::new();
        extractor.feed(&stream);
        let telegram = extractor.next_telegram().expect("telegram emitted");
        let decoded = segment::decode(&telegram).unwrap();
        assert_eq!(decoded.telegram_counter, 21);
    }
}
