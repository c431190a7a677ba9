//! `hfpcodec` Constants
//!
//! Frame sizes, buffer sizing and H2 synchronization values used by the HFP codec
//! path. Frame layouts follow the Hands-Free Profile transparent SCO mode.

/// Size of one transparent-mode SCO payload in bytes
///
/// Also the admission threshold: a new frame may be encoded while the write
/// cursor is at or below this offset.
pub const SCO_FRAME_SIZE: usize = 60;

/// Capacity of the session's frame buffer
///
/// Admission allows a frame to start at `SCO_FRAME_SIZE`, so the buffer holds two
/// full frames.
pub const SCO_BUFFER_SIZE: usize = 2 * SCO_FRAME_SIZE;

/// Length of the H2 synchronization header
pub const H2_HEADER_SIZE: usize = 2;

/// First octet of every H2 header
pub const H2_SYNC_WORD: u8 = 0x01;

/// Second H2 octet for sequence numbers 0..=3 (SN0/SN1 bits, each doubled)
pub const H2_SEQUENCE_NUMBERS: [u8; 4] = [0x08, 0x38, 0xC8, 0xF8];

/// PCM samples per mSBC frame (7.5 ms at 16 kHz)
pub const MSBC_SAMPLES_PER_FRAME: u16 = 120;

/// Encoded mSBC frame length
pub const MSBC_FRAME_SIZE: usize = 57;

/// Padding appended after each mSBC frame to fill `SCO_FRAME_SIZE`
pub const MSBC_PADDING: usize = 1;

/// mSBC bitpool
pub const MSBC_BITPOOL: u8 = 26;

/// PCM samples per LC3-SWB frame (7.5 ms at 32 kHz)
pub const LC3_SWB_SAMPLES_PER_FRAME: u16 = 240;

/// Encoded LC3-SWB frame length
pub const LC3_SWB_OCTETS_PER_FRAME: usize = 58;

/// LC3 frame duration used for super-wideband speech, in microseconds
pub const LC3_SWB_FRAME_DURATION_US: u32 = 7_500;

/// Wideband sample rate in Hz
pub const WIDEBAND_SAMPLE_RATE: u32 = 16_000;

/// Super-wideband sample rate in Hz
pub const SUPER_WIDEBAND_SAMPLE_RATE: u32 = 32_000;

/// Size of the HCI Synchronous Data packet header
pub const SCO_HEADER_SIZE: usize = 3;
