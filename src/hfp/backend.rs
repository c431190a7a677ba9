//! Speech Encoder Backends
//!
//! This module defines the contract every HFP speech encoder implements and the
//! two frame formats the dispatcher knows about: mSBC for wideband speech and
//! LC3-SWB for super-wideband speech. The DSP itself lives outside this crate;
//! a backend only has to turn one PCM frame into a fixed number of octets.

use super::CodecId;
use crate::constants::{
    H2_HEADER_SIZE, LC3_SWB_FRAME_DURATION_US, LC3_SWB_OCTETS_PER_FRAME,
    LC3_SWB_SAMPLES_PER_FRAME, MSBC_BITPOOL, MSBC_FRAME_SIZE, MSBC_PADDING,
    MSBC_SAMPLES_PER_FRAME, SUPER_WIDEBAND_SAMPLE_RATE, WIDEBAND_SAMPLE_RATE,
};

/// Speech encoder contract
///
/// `encode` is total: given exactly one frame of PCM it always fills `out`,
/// which is exactly the codec's octets per frame long.
pub trait SpeechEncoder {
    /// Apply codec parameters, called once when the backend is selected
    fn configure(&mut self, config: &EncoderConfig);

    /// Encode one frame of PCM into `out`
    fn encode(&mut self, pcm: &[i16], out: &mut [u8]);

    /// Release encoder resources when the session is torn down
    fn release(&mut self) {}
}

/// Encoder parameters handed to a backend at selection time
#[derive(Debug, Clone, Copy, PartialEq, Eq, defmt::Format)]
pub enum EncoderConfig {
    /// SBC parameters (mSBC for wideband speech)
    Sbc(SbcConfig),
    /// LC3 parameters (super-wideband speech)
    Lc3(Lc3Config),
}

/// SBC encoder configuration
///
/// Only the mSBC profile is used for HFP, which always runs loudness allocation
/// on a single channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, defmt::Format)]
pub struct SbcConfig {
    /// Number of blocks per frame
    pub blocks: u8,
    /// Number of subbands
    pub subbands: u8,
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Bitpool
    pub bitpool: u8,
}

impl SbcConfig {
    /// mSBC configuration: 16 blocks, 8 subbands, loudness, 16 kHz mono, bitpool 26
    #[must_use]
    pub const fn msbc() -> Self {
        Self {
            blocks: 16,
            subbands: 8,
            sample_rate: WIDEBAND_SAMPLE_RATE,
            bitpool: MSBC_BITPOOL,
        }
    }
}

/// LC3 encoder configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, defmt::Format)]
pub struct Lc3Config {
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Frame duration in microseconds
    pub frame_duration_us: u32,
    /// Target octets per encoded frame
    pub octets_per_frame: u16,
}

impl Lc3Config {
    /// LC3-SWB configuration: 32 kHz, 7.5 ms, 58 octets
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub const fn swb() -> Self {
        Self {
            sample_rate: SUPER_WIDEBAND_SAMPLE_RATE,
            frame_duration_us: LC3_SWB_FRAME_DURATION_US,
            octets_per_frame: LC3_SWB_OCTETS_PER_FRAME as u16,
        }
    }
}

/// Fixed layout of one framed codec payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, defmt::Format)]
pub struct FrameFormat {
    /// PCM samples consumed per frame
    pub samples_per_frame: u16,
    /// Octets produced by the encoder per frame
    pub octets_per_frame: usize,
    /// Zero bytes appended after the encoder output
    pub padding: usize,
}

impl FrameFormat {
    /// mSBC wideband frame
    pub const MSBC: Self = Self {
        samples_per_frame: MSBC_SAMPLES_PER_FRAME,
        octets_per_frame: MSBC_FRAME_SIZE,
        padding: MSBC_PADDING,
    };

    /// LC3-SWB super-wideband frame
    pub const LC3_SWB: Self = Self {
        samples_per_frame: LC3_SWB_SAMPLES_PER_FRAME,
        octets_per_frame: LC3_SWB_OCTETS_PER_FRAME,
        padding: 0,
    };

    /// Bytes one encoded frame adds to the stream (header + payload + padding)
    #[must_use]
    pub const fn frame_size(&self) -> usize {
        H2_HEADER_SIZE + self.octets_per_frame + self.padding
    }
}

/// Encoder that can never be constructed, marks an empty backend slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unavailable {}

impl SpeechEncoder for Unavailable {
    fn configure(&mut self, _config: &EncoderConfig) {
        match *self {}
    }

    fn encode(&mut self, _pcm: &[i16], _out: &mut [u8]) {
        match *self {}
    }
}

/// Encoders available to a session at initialization
///
/// Each slot is optional; selecting a codec whose slot is empty fails.
#[derive(Debug)]
pub struct CodecBackends<W, S> {
    wideband: Option<W>,
    super_wideband: Option<S>,
}

impl<W: SpeechEncoder> CodecBackends<W, Unavailable> {
    /// Register only a wideband (mSBC) encoder
    #[must_use]
    pub fn wideband(encoder: W) -> Self {
        Self {
            wideband: Some(encoder),
            super_wideband: None,
        }
    }
}

impl<S: SpeechEncoder> CodecBackends<Unavailable, S> {
    /// Register only a super-wideband (LC3-SWB) encoder
    #[must_use]
    pub fn super_wideband(encoder: S) -> Self {
        Self {
            wideband: None,
            super_wideband: Some(encoder),
        }
    }
}

impl<W: SpeechEncoder, S: SpeechEncoder> CodecBackends<W, S> {
    /// Register both encoders
    #[must_use]
    pub fn new(wideband: W, super_wideband: S) -> Self {
        Self {
            wideband: Some(wideband),
            super_wideband: Some(super_wideband),
        }
    }

    /// Check whether a codec has an encoder registered
    #[must_use]
    pub fn supports(&self, codec: CodecId) -> bool {
        match codec {
            CodecId::Msbc => self.wideband.is_some(),
            CodecId::Lc3Swb => self.super_wideband.is_some(),
            CodecId::Cvsd => false,
        }
    }

    /// Take the encoder for `codec` and configure it
    ///
    /// Returns `None` if no encoder is registered for the codec.
    pub(crate) fn select(self, codec: CodecId) -> Option<Backend<W, S>> {
        let mut backend = match codec {
            CodecId::Msbc => Backend::Wideband(self.wideband?),
            CodecId::Lc3Swb => Backend::SuperWideband(self.super_wideband?),
            CodecId::Cvsd => return None,
        };
        backend.configure();
        Some(backend)
    }
}

/// The single encoder bound to a session
#[derive(Debug)]
pub(crate) enum Backend<W, S> {
    /// mSBC wideband speech
    Wideband(W),
    /// LC3 super-wideband speech
    SuperWideband(S),
}

impl<W: SpeechEncoder, S: SpeechEncoder> Backend<W, S> {
    pub(crate) fn codec_id(&self) -> CodecId {
        match self {
            Self::Wideband(_) => CodecId::Msbc,
            Self::SuperWideband(_) => CodecId::Lc3Swb,
        }
    }

    pub(crate) fn format(&self) -> FrameFormat {
        match self {
            Self::Wideband(_) => FrameFormat::MSBC,
            Self::SuperWideband(_) => FrameFormat::LC3_SWB,
        }
    }

    fn configure(&mut self) {
        match self {
            Self::Wideband(encoder) => encoder.configure(&EncoderConfig::Sbc(SbcConfig::msbc())),
            Self::SuperWideband(encoder) => {
                encoder.configure(&EncoderConfig::Lc3(Lc3Config::swb()));
            }
        }
    }

    /// Encode `pcm` into the front of `out`, returning the bytes written
    ///
    /// `out` must hold at least `octets_per_frame + padding` bytes.
    pub(crate) fn encode(&mut self, pcm: &[i16], out: &mut [u8]) -> usize {
        let format = self.format();
        let (payload, rest) = out.split_at_mut(format.octets_per_frame);
        match self {
            Self::Wideband(encoder) => encoder.encode(pcm, payload),
            Self::SuperWideband(encoder) => encoder.encode(pcm, payload),
        }
        rest[..format.padding].fill(0);
        format.octets_per_frame + format.padding
    }

    pub(crate) fn release(&mut self) {
        match self {
            Self::Wideband(encoder) => encoder.release(),
            Self::SuperWideband(encoder) => encoder.release(),
        }
    }
}
