//! Packet kind byte.

/// The kind of a [`crate::Packet`], carried as the first byte on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Kind {
    /// Initial handshake packet carrying the preshared-key digest.
    Auth = 0,
    /// A text message.
    Message = 1,
    /// Opaque bytes.
    Bytes = 2,
    /// A named object (`object-type` header set).
    Object = 3,
    /// A file transfer (`filename` header set).
    File = 4,
    /// A directory transfer (archived, `filename` header set).
    Directory = 5,
    /// An application-defined request.
    Request = 6,
    /// An application-defined response.
    Response = 7,
}

impl Kind {
    /// Convert to the wire byte.
    #[must_use]
    pub fn to_u8(self) -> u8 {
        self as u8
    }

    /// Parse from a wire byte. `None` if unrecognized.
    #[must_use]
    pub fn from_u8(byte: u8) -> Option<Self> {
        match byte {
            0 => Some(Self::Auth),
            1 => Some(Self::Message),
            2 => Some(Self::Bytes),
            3 => Some(Self::Object),
            4 => Some(Self::File),
            5 => Some(Self::Directory),
            6 => Some(Self::Request),
            7 => Some(Self::Response),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_every_variant() {
        for kind in [
            Kind::Auth,
            Kind::Message,
            Kind::Bytes,
            Kind::Object,
            Kind::File,
            Kind::Directory,
            Kind::Request,
            Kind::Response,
        ] {
            assert_eq!(Kind::from_u8(kind.to_u8()), Some(kind));
        }
    }

    #[test]
    fn rejects_unknown_byte() {
        assert_eq!(Kind::from_u8(0xFF), None);
    }
}
