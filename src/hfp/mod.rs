//! HFP (Hands-Free Profile) Voice Codec Path
//!
//! This module implements the encoder side of the HFP voice channel: PCM frames
//! from the microphone go in, H2-framed codec payload for the SCO link comes out.
//!
//! ## Architecture
//!
//! - **Backend Adapter**: uniform [`SpeechEncoder`] contract over mSBC and LC3-SWB
//! - **H2 Framing**: per-frame synchronization header with a 2-bit sequence number
//! - **Dispatcher**: [`HfpCodec`] owns the linear frame buffer and cursors
//! - **Shared Session**: [`SharedHfpCodec`] for producer and consumer in different tasks
//!
//! ## Usage
//!
//! ```rust
//! use hfpcodec::hfp::{CodecBackends, CodecId, EncoderConfig, HfpCodec, SpeechEncoder};
//!
//! struct Silence;
//!
//! impl SpeechEncoder for Silence {
//!     fn configure(&mut self, _config: &EncoderConfig) {}
//!     fn encode(&mut self, _pcm: &[i16], out: &mut [u8]) {
//!         out.fill(0);
//!     }
//! }
//!
//! let mut codec = HfpCodec::init(CodecId::Msbc as u8, CodecBackends::wideband(Silence));
//! let pcm = [0i16; 120];
//! if codec.can_encode_audio_frame_now() {
//!     codec.encode_audio_frame(&pcm);
//! }
//! let mut packet = [0u8; 60];
//! codec.read_from_stream(&mut packet);
//! assert_eq!(codec.num_bytes_available(), 0);
//! ```

pub mod backend;
pub mod codec;
pub mod h2;
pub mod shared;

pub use backend::*;
pub use codec::*;
pub use h2::*;
pub use shared::*;

/// HFP codec identifiers as negotiated with `AT+BAC` / `+BCS`
#[derive(Debug, Clone, Copy, PartialEq, Eq, defmt::Format)]
#[repr(u8)]
pub enum CodecId {
    /// CVSD narrowband speech (8 kHz)
    Cvsd = 0x01,
    /// mSBC wideband speech (16 kHz)
    Msbc = 0x02,
    /// LC3 super-wideband speech (32 kHz)
    Lc3Swb = 0x03,
}

impl CodecId {
    /// Convert from raw codec identifier
    #[must_use]
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0x01 => Some(Self::Cvsd),
            0x02 => Some(Self::Msbc),
            0x03 => Some(Self::Lc3Swb),
            _ => None,
        }
    }
}

impl TryFrom<u8> for CodecId {
    type Error = HfpCodecError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::from_u8(value).ok_or(HfpCodecError::UnknownCodec(value))
    }
}

impl From<CodecId> for u8 {
    fn from(id: CodecId) -> Self {
        id as u8
    }
}

/// HFP codec contract violations
///
/// None of these are transient: each one means the caller broke the session
/// contract or the session was misconfigured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, defmt::Format)]
pub enum HfpCodecError {
    /// Codec identifier is not an HFP codec
    UnknownCodec(u8),
    /// No encoder backend registered for the codec
    NoBackend(CodecId),
    /// Frame buffer is past the admission threshold
    NotAdmissible,
    /// PCM block does not match the codec's samples per frame
    WrongSampleCount {
        /// Samples per frame of the active codec
        expected: u16,
        /// Samples supplied
        actual: usize,
    },
    /// Read requested more bytes than the stream holds
    InsufficientData {
        /// Bytes requested
        requested: usize,
        /// Bytes available
        available: u16,
    },
}

impl core::fmt::Display for HfpCodecError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::UnknownCodec(id) => write!(f, "Unknown HFP codec id 0x{id:02X}"),
            Self::NoBackend(codec) => write!(f, "No encoder backend for {codec:?}"),
            Self::NotAdmissible => write!(f, "Frame buffer full, drain before encoding"),
            Self::WrongSampleCount { expected, actual } => {
                write!(f, "Expected {expected} PCM samples, got {actual}")
            }
            Self::InsufficientData {
                requested,
                available,
            } => write!(f, "Requested {requested} bytes, {available} available"),
        }
    }
}
