//!
//! Contains the Result and Error types for scan-segment transport and receiver operations.
//!

use thiserror::Error as ThisError;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(ThisError, Debug)]
pub enum Error {
    #[error("transport closed while a telegram was incomplete")]
    TransportClosed,

    #[error("transport IO error")]
    Io(#[from] std::io::Error),

    #[error("telegram decode error")]
    Decode(#[from] scansegment_decode::result::Error),
}
