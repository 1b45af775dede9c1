//!
//! Contains the Result and Error types for scan-segment telegram decoding.
//!

use crate::BinaryData;
use thiserror::Error as ThisError;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(ThisError, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("malformed telegram: {0}")]
    MalformedTelegram(String),

    #[error("unsupported COMPACT version {version}, expected 4")]
    UnsupportedVersion { version: u32 },

    /// The telegram's declared CRC doesn't match one computed over its covered bytes. `telegram`
    /// retains the whole offending buffer for diagnostics; its `Debug` impl prints a length/hash/
    /// sample summary rather than the full bytes, so logging a batch of these never floods a log
    /// file with raw telegram dumps.
    #[error("CRC mismatch: expected {expected:#010x}, computed {computed:#010x}")]
    CrcMismatch {
        expected: u32,
        computed: u32,
        telegram: BinaryData<Vec<u8>>,
    },

    #[error("missing required field {0}")]
    MissingField(&'static str),

    #[error("field {field} has wrong type: expected {expected}")]
    TypeMismatch {
        field: &'static str,
        expected: &'static str,
    },
}
