//!
//! Decoder and stream extractor for the MSGPACK (self-describing) scan-segment telegram encoding.
//!

mod model;
pub use model::{MsgpackSegment, Scan};

mod decoder;
pub use decoder::decode;

mod extractor;
pub use extractor::MsgpackStreamExtractor;
