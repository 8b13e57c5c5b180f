//! Single-byte flag bitset carried in every frame.

/// Per-packet flags, packed into one wire byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Flags {
    /// Payload was compressed before encryption.
    pub compressed: bool,
    /// Payload was encrypted.
    pub encrypted: bool,
    /// This packet is one part of a multi-part transfer.
    pub partial: bool,
    /// Headers carry metadata beyond the reserved keys.
    pub has_metadata: bool,
    /// `preshared-hash` is present and must be checked.
    pub has_preshared_key: bool,
}

const COMPRESSED: u8 = 0b0000_0001;
const ENCRYPTED: u8 = 0b0000_0010;
const PARTIAL: u8 = 0b0000_0100;
const HAS_METADATA: u8 = 0b0000_1000;
const HAS_PRESHARED_KEY: u8 = 0b0001_0000;

impl Flags {
    /// Pack into the wire byte.
    #[must_use]
    pub fn to_byte(self) -> u8 {
        let mut byte = 0u8;
        if self.compressed {
            byte |= COMPRESSED;
        }
        if self.encrypted {
            byte |= ENCRYPTED;
        }
        if self.partial {
            byte |= PARTIAL;
        }
        if self.has_metadata {
            byte |= HAS_METADATA;
        }
        if self.has_preshared_key {
            byte |= HAS_PRESHARED_KEY;
        }
        byte
    }

    /// Unpack from a wire byte. Unknown bits are ignored rather than
    /// rejected, so future flags can be added without breaking old peers.
    #[must_use]
    pub fn from_byte(byte: u8) -> Self {
        Self {
            compressed: byte & COMPRESSED != 0,
            encrypted: byte & ENCRYPTED != 0,
            partial: byte & PARTIAL != 0,
            has_metadata: byte & HAS_METADATA != 0,
            has_preshared_key: byte & HAS_PRESHARED_KEY != 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn round_trips_every_combination() {
        for byte in 0u8..=31 {
            assert_eq!(Flags::from_byte(byte).to_byte(), byte);
        }
    }

    proptest! {
        #[test]
        fn round_trips_any_byte(byte: u8) {
            let flags = Flags::from_byte(byte);
            // Only the 5 defined bits survive; re-packing is idempotent.
            prop_assert_eq!(Flags::from_byte(flags.to_byte()), flags);
        }
    }
}
