//!
//! Named bit constants for the COMPACT module metadata's channel-presence bytes, in place of raw
//! `u8` masking sprinkled through the decoder.
//!

use bitflags::bitflags;

bitflags! {
    /// Which per-echo channels are present in a module's measurement block.
    #[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
    pub struct EchoContent: u8 {
        const DISTANCE = 0b0000_0001;
        const RSSI     = 0b0000_0010;
    }
}

bitflags! {
    /// Which per-beam channels are present in a module's measurement block.
    #[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
    pub struct BeamContent: u8 {
        const PROPERTIES    = 0b0000_0001;
        const CHANNEL_THETA = 0b0000_0010;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn echo_content_decodes_both_bits() {
        let content = EchoContent::from_bits_truncate(0b11);
        assert!(content.contains(EchoContent::DISTANCE));
        assert!(content.contains(EchoContent::RSSI));
    }

    #[test]
    fn echo_content_decodes_neither_bit() {
        let content = EchoContent::from_bits_truncate(0b00);
        assert!(!content.contains(EchoContent::DISTANCE));
        assert!(!content.contains(EchoContent::RSSI));
    }

    #[test]
    fn beam_content_decodes_channel_theta_only() {
        let content = BeamContent::from_bits_truncate(0b10);
        assert!(!content.contains(BeamContent::PROPERTIES));
        assert!(content.contains(BeamContent::CHANNEL_THETA));
    }

    #[test]
    fn unknown_bits_are_truncated_not_rejected() {
        let content = EchoContent::from_bits_truncate(0b1111_1111);
        assert_eq!(content, EchoContent::DISTANCE | EchoContent::RSSI);
    }
}
