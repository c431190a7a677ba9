//! H2 Synchronization Header
//!
//! Every wideband and super-wideband SCO frame starts with a two octet H2 header:
//! a constant sync word followed by a 2-bit sequence number in which each bit is
//! sent twice (`0b0000`, `0b0011`, `0b1100`, `0b1111` in the upper nibble). The
//! receiver uses it to find frame boundaries and detect lost frames.

use crate::constants::{H2_HEADER_SIZE, H2_SEQUENCE_NUMBERS, H2_SYNC_WORD};

/// Source of per-frame synchronization headers
pub trait SyncHeaderGenerator {
    /// Return to the initial sequence state
    fn reset(&mut self);

    /// Write the next header into `dest` and advance the sequence
    fn add_header(&mut self, dest: &mut [u8; H2_HEADER_SIZE]);
}

/// Standard H2 header generator
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct H2Framing {
    sequence_number: u8,
}

impl H2Framing {
    /// Create a generator starting at sequence number 0
    #[must_use]
    pub const fn new() -> Self {
        Self { sequence_number: 0 }
    }

    /// Sequence number the next header will carry
    #[must_use]
    pub const fn sequence_number(&self) -> u8 {
        self.sequence_number
    }
}

impl SyncHeaderGenerator for H2Framing {
    fn reset(&mut self) {
        self.sequence_number = 0;
    }

    fn add_header(&mut self, dest: &mut [u8; H2_HEADER_SIZE]) {
        *dest = H2Header::new(self.sequence_number).to_bytes();
        self.sequence_number = (self.sequence_number + 1) & 0x03;
    }
}

/// H2 header parsing errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, defmt::Format)]
pub enum H2Error {
    /// Fewer than two bytes supplied
    InsufficientData,
    /// First octet is not the H2 sync word
    InvalidSyncWord(u8),
    /// Second octet is not a valid sequence number pattern
    InvalidSequenceNumber(u8),
}

impl core::fmt::Display for H2Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::InsufficientData => write!(f, "Insufficient data for H2 header"),
            Self::InvalidSyncWord(b) => write!(f, "Invalid H2 sync word 0x{b:02X}"),
            Self::InvalidSequenceNumber(b) => write!(f, "Invalid H2 sequence byte 0x{b:02X}"),
        }
    }
}

/// A decoded H2 header
#[derive(Debug, Clone, Copy, PartialEq, Eq, defmt::Format)]
pub struct H2Header {
    sequence_number: u8,
}

impl H2Header {
    /// Create a header for sequence number `sequence_number & 0x03`
    #[must_use]
    pub const fn new(sequence_number: u8) -> Self {
        Self {
            sequence_number: sequence_number & 0x03,
        }
    }

    /// Sequence number (0..=3)
    #[must_use]
    pub const fn sequence_number(&self) -> u8 {
        self.sequence_number
    }

    /// Parse an H2 header from the start of a frame
    ///
    /// # Errors
    /// Returns `H2Error` if the slice is shorter than two bytes or either octet
    /// does not match the H2 pattern
    #[allow(clippy::cast_possible_truncation)]
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, H2Error> {
        if bytes.len() < H2_HEADER_SIZE {
            return Err(H2Error::InsufficientData);
        }
        if bytes[0] != H2_SYNC_WORD {
            return Err(H2Error::InvalidSyncWord(bytes[0]));
        }

        let sequence_number = H2_SEQUENCE_NUMBERS
            .iter()
            .position(|&b| b == bytes[1])
            .ok_or(H2Error::InvalidSequenceNumber(bytes[1]))?;

        // Index into a four entry table
        Ok(Self::new(sequence_number as u8))
    }

    /// Convert header to bytes
    #[must_use]
    pub const fn to_bytes(self) -> [u8; H2_HEADER_SIZE] {
        [
            H2_SYNC_WORD,
            H2_SEQUENCE_NUMBERS[self.sequence_number as usize],
        ]
    }

    /// Check whether `next` directly follows this header in sequence
    #[must_use]
    pub const fn is_followed_by(&self, next: &Self) -> bool {
        (self.sequence_number + 1) & 0x03 == next.sequence_number
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_h2_sequence_cycle() {
        let mut framing = H2Framing::new();
        let mut header = [0u8; 2];

        let expected = [0x08, 0x38, 0xC8, 0xF8, 0x08, 0x38];
        for &sn in &expected {
            framing.add_header(&mut header);
            assert_eq!(header, [0x01, sn]);
        }
        assert_eq!(framing.sequence_number(), 2);
    }

    #[test]
    fn test_h2_reset() {
        let mut framing = H2Framing::new();
        let mut header = [0u8; 2];
        framing.add_header(&mut header);
        framing.add_header(&mut header);
        assert_eq!(header, [0x01, 0x38]);

        framing.reset();
        framing.add_header(&mut header);
        assert_eq!(header, [0x01, 0x08]);
    }

    #[test]
    fn test_h2_header_parsing() {
        let header = H2Header::from_bytes(&[0x01, 0xC8, 0xFF]).unwrap();
        assert_eq!(header.sequence_number(), 2);
        assert_eq!(header.to_bytes(), [0x01, 0xC8]);
    }

    #[test]
    fn test_h2_header_parsing_errors() {
        assert_eq!(H2Header::from_bytes(&[0x01]), Err(H2Error::InsufficientData));
        assert_eq!(
            H2Header::from_bytes(&[0x02, 0x08]),
            Err(H2Error::InvalidSyncWord(0x02))
        );
        assert_eq!(
            H2Header::from_bytes(&[0x01, 0x18]),
            Err(H2Error::InvalidSequenceNumber(0x18))
        );
    }

    #[test]
    fn test_h2_sequence_continuity() {
        let h3 = H2Header::new(3);
        assert!(h3.is_followed_by(&H2Header::new(0)));
        assert!(!h3.is_followed_by(&H2Header::new(1)));
        assert!(H2Header::new(1).is_followed_by(&H2Header::new(2)));
    }
}
