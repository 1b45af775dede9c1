//!
//! Little-endian primitive wrappers used by the COMPACT decoder's fixed-size header and module
//! prefix structs. The sensor emits everything in this encoding little-endian, in contrast to the
//! big-endian wire format this crate's structure was originally modeled on.
//!

use std::fmt;
use zerocopy::{little_endian, FromBytes, Immutable, KnownLayout};

/// Little-endian unsigned 16-bit integer.
#[repr(transparent)]
#[derive(Clone, Copy, PartialEq, Eq, Hash, FromBytes, Immutable, KnownLayout)]
pub struct LeU16(little_endian::U16);

impl LeU16 {
    pub fn get(self) -> u16 {
        self.0.get()
    }
}

impl fmt::Debug for LeU16 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.get().fmt(f)
    }
}

/// Little-endian unsigned 32-bit integer.
#[repr(transparent)]
#[derive(Clone, Copy, PartialEq, Eq, Hash, FromBytes, Immutable, KnownLayout)]
pub struct LeU32(little_endian::U32);

impl LeU32 {
    pub fn get(self) -> u32 {
        self.0.get()
    }
}

impl fmt::Debug for LeU32 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.get().fmt(f)
    }
}

/// Little-endian unsigned 64-bit integer.
#[repr(transparent)]
#[derive(Clone, Copy, PartialEq, Eq, Hash, FromBytes, Immutable, KnownLayout)]
pub struct LeU64(little_endian::U64);

impl LeU64 {
    pub fn get(self) -> u64 {
        self.0.get()
    }
}

impl fmt::Debug for LeU64 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.get().fmt(f)
    }
}

/// Little-endian IEEE 754 single-precision float.
#[repr(transparent)]
#[derive(Clone, Copy, PartialEq, FromBytes, Immutable, KnownLayout)]
pub struct LeF32(little_endian::F32);

impl LeF32 {
    pub fn get(self) -> f32 {
        self.0.get()
    }
}

impl fmt::Debug for LeF32 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.get().fmt(f)
    }
}
