use crate::primitives::{LeU32, LeU64};
use crate::result::{Error, Result};
use std::fmt::Debug;
use zerocopy::{FromBytes, Immutable, KnownLayout};

/// Magic value marking the start of a COMPACT telegram.
pub const START_OF_FRAME: u32 = 0x0202_0202;

/// The only COMPACT version this decoder understands.
pub const SUPPORTED_VERSION: u32 = 4;

/// Fixed-size COMPACT telegram header, little-endian throughout.
#[repr(C)]
#[derive(Clone, PartialEq, Debug, FromBytes, Immutable, KnownLayout)]
pub struct Header {
    pub start_of_frame: LeU32,
    pub command_id: LeU32,
    pub telegram_counter: LeU64,
    pub timestamp_transmit: LeU64,
    pub version: LeU32,
    pub size_module_0: LeU32,
}

impl Header {
    /// Decodes a reference to a [Header] from the front of `bytes`, returning the header and the
    /// remaining bytes (module 0 onward).
    ///
    /// Fails with [Error::MalformedTelegram] if the magic doesn't match, or
    /// [Error::UnsupportedVersion] if the version isn't [SUPPORTED_VERSION].
    pub fn decode(bytes: &[u8]) -> Result<(&Self, &[u8])> {
        let (header, rest) = Self::ref_from_prefix(bytes)
            .map_err(|_| Error::MalformedTelegram("truncated header".to_string()))?;

        if header.start_of_frame.get() != START_OF_FRAME {
            return Err(Error::MalformedTelegram(format!(
                "bad start-of-frame magic: {:#010x}",
                header.start_of_frame.get()
            )));
        }

        if header.version.get() != SUPPORTED_VERSION {
            return Err(Error::UnsupportedVersion {
                version: header.version.get(),
            });
        }

        Ok((header, rest))
    }
}
