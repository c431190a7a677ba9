//! SCO (Synchronous Connection-Oriented) Data Packets
//!
//! This module implements the HCI Synchronous Data packet used to carry voice
//! payload between host and controller, and drains an [`HfpCodec`] stream into
//! such packets for the transport.

use crate::{
    constants::{SCO_FRAME_SIZE, SCO_HEADER_SIZE},
    hfp::{HfpCodec, SpeechEncoder, SyncHeaderGenerator},
};
use bt_hci::param::ConnHandle;
use heapless::Vec;

/// SCO packet parsing errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, defmt::Format)]
pub enum ScoError {
    /// Packet data is too short for the header or the indicated payload
    InsufficientData,
    /// Payload exceeds buffer capacity or the 255 byte length field
    PayloadTooLarge,
}

impl core::fmt::Display for ScoError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::InsufficientData => write!(f, "Insufficient data for SCO packet"),
            Self::PayloadTooLarge => write!(f, "SCO payload exceeds buffer capacity"),
        }
    }
}

/// Packet Status flag of controller-to-host SCO packets
#[derive(Debug, Clone, Copy, PartialEq, Eq, defmt::Format)]
#[repr(u8)]
pub enum PacketStatus {
    /// Correctly received data (always used host-to-controller)
    CorrectlyReceived = 0x00,
    /// Possibly invalid data
    PossiblyInvalid = 0x01,
    /// No data received, payload is zero
    NoDataReceived = 0x02,
    /// Data partially lost
    PartiallyLost = 0x03,
}

impl PacketStatus {
    /// Convert from raw 2-bit value
    #[must_use]
    pub fn from_u8(value: u8) -> Self {
        match value & 0x03 {
            0x00 => Self::CorrectlyReceived,
            0x01 => Self::PossiblyInvalid,
            0x02 => Self::NoDataReceived,
            _ => Self::PartiallyLost,
        }
    }
}

/// SCO Data packet header
#[derive(Debug, Clone, Copy, PartialEq, Eq, defmt::Format)]
pub struct ScoHeader {
    /// Connection handle (12 bits)
    pub connection_handle: u16,
    /// Packet status flag (2 bits)
    pub packet_status: PacketStatus,
    /// Data total length
    pub data_length: u8,
}

impl ScoHeader {
    /// Create new SCO header
    #[must_use]
    pub fn new(connection_handle: u16, packet_status: PacketStatus, data_length: u8) -> Self {
        Self {
            connection_handle: connection_handle & 0x0FFF, // Only 12 bits
            packet_status,
            data_length,
        }
    }

    /// Create a host-to-controller header for an HCI connection handle
    #[must_use]
    pub fn from_conn_handle(handle: ConnHandle, data_length: u8) -> Self {
        Self::new(handle.raw(), PacketStatus::CorrectlyReceived, data_length)
    }

    /// Parse SCO header from bytes
    ///
    /// # Errors
    /// Returns `ScoError::InsufficientData` if fewer than 3 bytes are supplied
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ScoError> {
        if bytes.len() < SCO_HEADER_SIZE {
            return Err(ScoError::InsufficientData);
        }

        let handle_and_flags = u16::from_le_bytes([bytes[0], bytes[1]]);
        let connection_handle = handle_and_flags & 0x0FFF;
        let status = (handle_and_flags >> 12) as u8 & 0x03;

        Ok(Self::new(
            connection_handle,
            PacketStatus::from_u8(status),
            bytes[2],
        ))
    }

    /// Convert header to bytes
    #[must_use]
    pub fn to_bytes(self) -> [u8; SCO_HEADER_SIZE] {
        let handle_and_flags = self.connection_handle | ((self.packet_status as u16) << 12);
        let [lo, hi] = handle_and_flags.to_le_bytes();
        [lo, hi, self.data_length]
    }
}

/// SCO Data packet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoPacket<const N: usize = SCO_FRAME_SIZE> {
    /// SCO header
    pub header: ScoHeader,
    /// Voice payload
    pub data: Vec<u8, N>,
}

impl<const N: usize> ScoPacket<N> {
    /// Parse SCO packet from bytes
    ///
    /// # Errors
    /// Returns `ScoError` if the header is incomplete, the payload is shorter than
    /// the header says, or the payload does not fit in `N` bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ScoError> {
        let header = ScoHeader::from_bytes(bytes)?;
        let end = SCO_HEADER_SIZE + usize::from(header.data_length);

        if bytes.len() < end {
            return Err(ScoError::InsufficientData);
        }

        let data = Vec::from_slice(&bytes[SCO_HEADER_SIZE..end])
            .map_err(|()| ScoError::PayloadTooLarge)?;

        Ok(Self { header, data })
    }

    /// Convert packet to bytes
    ///
    /// # Errors
    /// Returns `ScoError::PayloadTooLarge` if the result does not fit in `M` bytes
    pub fn to_bytes<const M: usize>(&self) -> Result<Vec<u8, M>, ScoError> {
        let mut bytes = Vec::new();

        bytes
            .extend_from_slice(&self.header.to_bytes())
            .map_err(|()| ScoError::PayloadTooLarge)?;
        bytes
            .extend_from_slice(&self.data)
            .map_err(|()| ScoError::PayloadTooLarge)?;

        Ok(bytes)
    }

    /// Get the total packet size (header + payload)
    #[must_use]
    pub fn total_size(&self) -> usize {
        SCO_HEADER_SIZE + self.data.len()
    }
}

impl<W: SpeechEncoder, S: SpeechEncoder, H: SyncHeaderGenerator> HfpCodec<W, S, H> {
    /// Drain `len` bytes from the stream into an outgoing SCO packet
    ///
    /// `len` is usually the SCO packet length negotiated with the controller.
    ///
    /// # Panics
    /// Panics if `len` exceeds `num_bytes_available()`, `N`, or 255.
    #[must_use]
    pub fn read_sco_packet<const N: usize>(&mut self, handle: ConnHandle, len: usize) -> ScoPacket<N> {
        assert!(len <= N, "[SCO] Packet length {len} exceeds capacity {N}");
        let data_length = u8::try_from(len)
            .unwrap_or_else(|_| panic!("[SCO] Packet length {len} exceeds 255"));

        let mut data: Vec<u8, N> = Vec::new();
        data.resize_default(len)
            .unwrap_or_else(|()| unreachable!("len <= N checked above"));
        self.read_from_stream(&mut data);

        defmt::trace!("[SCO] Packet for handle {} with {} bytes", handle.raw(), len);

        ScoPacket {
            header: ScoHeader::from_conn_handle(handle, data_length),
            data,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hfp::backend::tests::FakeEncoder;
    use crate::hfp::{CodecBackends, CodecId, H2Header};

    #[test]
    fn test_sco_header_serialization() {
        let header = ScoHeader::new(0x0123, PacketStatus::CorrectlyReceived, 60);
        assert_eq!(header.to_bytes(), [0x23, 0x01, 60]);

        let parsed = ScoHeader::from_bytes(&header.to_bytes()).unwrap();
        assert_eq!(parsed, header);
    }

    #[test]
    fn test_sco_header_packet_status() {
        // handle 0x0ABC, status PartiallyLost (0b11 << 12)
        let header = ScoHeader::from_bytes(&[0xBC, 0x3A, 0x18]).unwrap();
        assert_eq!(header.connection_handle, 0x0ABC);
        assert_eq!(header.packet_status, PacketStatus::PartiallyLost);
        assert_eq!(header.data_length, 0x18);

        // Handle is masked to 12 bits
        let header = ScoHeader::new(0xFFFF, PacketStatus::NoDataReceived, 0);
        assert_eq!(header.connection_handle, 0x0FFF);
        assert_eq!(header.to_bytes(), [0xFF, 0x2F, 0x00]);
    }

    #[test]
    fn test_sco_header_parsing_errors() {
        assert_eq!(
            ScoHeader::from_bytes(&[0x01, 0x00]),
            Err(ScoError::InsufficientData)
        );
        assert_eq!(
            ScoPacket::<60>::from_bytes(&[0x01, 0x00, 0x04, 0xAA]),
            Err(ScoError::InsufficientData)
        );
        assert_eq!(
            ScoPacket::<2>::from_bytes(&[0x01, 0x00, 0x03, 0xAA, 0xBB, 0xCC]),
            Err(ScoError::PayloadTooLarge)
        );
    }

    #[test]
    fn test_sco_packet_serialization() {
        let packet = ScoPacket::<60> {
            header: ScoHeader::new(0x0040, PacketStatus::CorrectlyReceived, 3),
            data: Vec::from_slice(&[0xAA, 0xBB, 0xCC]).unwrap(),
        };
        let bytes: Vec<u8, 63> = packet.to_bytes().unwrap();
        assert_eq!(bytes.as_slice(), &[0x40, 0x00, 0x03, 0xAA, 0xBB, 0xCC]);
        assert_eq!(packet.total_size(), 6);

        let parsed = ScoPacket::<60>::from_bytes(&bytes).unwrap();
        assert_eq!(parsed, packet);
    }

    #[test]
    fn test_read_sco_packet_from_codec() {
        let mut codec = HfpCodec::init(
            CodecId::Msbc as u8,
            CodecBackends::wideband(FakeEncoder::with_seed(0x20)),
        );
        codec.encode_audio_frame(&[0i16; 120]);

        let handle = ConnHandle::new(0x0006);
        let first: ScoPacket = codec.read_sco_packet(handle, 24);
        assert_eq!(first.header.connection_handle, 0x0006);
        assert_eq!(first.header.data_length, 24);
        assert_eq!(first.data.len(), 24);
        assert_eq!(
            H2Header::from_bytes(&first.data).unwrap().sequence_number(),
            0
        );
        assert_eq!(first.data[2], 0x20);
        assert_eq!(codec.num_bytes_available(), 36);

        let rest: ScoPacket = codec.read_sco_packet(handle, 36);
        assert_eq!(rest.data[35], 0); // mSBC padding
        assert_eq!(codec.num_bytes_available(), 0);
    }

    #[test]
    fn test_read_sco_packet_fills_capacity() {
        let mut codec = HfpCodec::init(
            CodecId::Lc3Swb as u8,
            CodecBackends::super_wideband(FakeEncoder::with_seed(0x10)),
        );
        codec.encode_audio_frame(&[0i16; 240]);

        let packet: ScoPacket<60> = codec.read_sco_packet(ConnHandle::new(0x0042), 60);
        assert_eq!(packet.data.len(), 60);
        assert_eq!(packet.header.data_length, 60);
        assert_eq!(&packet.data[..3], &[0x01, 0x08, 0x10]);
        assert_eq!(packet.data[59], 0x10 + 57);
        assert_eq!(codec.num_bytes_available(), 0);
    }

    #[test]
    #[should_panic(expected = "exceeds capacity")]
    fn test_read_sco_packet_over_capacity() {
        let mut codec = HfpCodec::init(
            CodecId::Msbc as u8,
            CodecBackends::wideband(FakeEncoder::default()),
        );
        codec.encode_audio_frame(&[0i16; 120]);
        let _: ScoPacket<24> = codec.read_sco_packet(ConnHandle::new(1), 30);
    }

    #[test]
    #[should_panic(expected = "Read contract violated")]
    fn test_read_sco_packet_more_than_available() {
        let mut codec = HfpCodec::init(
            CodecId::Msbc as u8,
            CodecBackends::wideband(FakeEncoder::default()),
        );
        let _: ScoPacket = codec.read_sco_packet(ConnHandle::new(1), 10);
    }
}
