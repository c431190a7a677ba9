//! Shared HFP Codec Session
//!
//! [`HfpCodec`] assumes producer and consumer run in one context. When the audio
//! task encodes and the SCO task drains, wrap the session in a
//! [`SharedHfpCodec`] so every operation runs under an `embassy-sync` blocking
//! mutex. Pick `CriticalSectionRawMutex` when the two sides run in different
//! interrupt priorities or cores, `NoopRawMutex` when they share one executor.
//!
//! ```rust
//! use embassy_sync::blocking_mutex::raw::NoopRawMutex;
//! use hfpcodec::hfp::{CodecBackends, CodecId, EncoderConfig, HfpCodec, SharedHfpCodec, SpeechEncoder};
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
//! let codec = HfpCodec::init(CodecId::Lc3Swb as u8, CodecBackends::super_wideband(Silence));
//! let shared: SharedHfpCodec<NoopRawMutex, _, _> = SharedHfpCodec::new(codec);
//!
//! shared.encode_audio_frame(&[0i16; 240]);
//! let mut packet = [0u8; 60];
//! shared.read_from_stream(&mut packet);
//! ```

use super::{H2Framing, HfpCodec, SpeechEncoder, SyncHeaderGenerator};
use core::cell::RefCell;
use embassy_sync::blocking_mutex::{Mutex, raw::RawMutex};

/// An [`HfpCodec`] behind a blocking mutex
pub struct SharedHfpCodec<M: RawMutex, W, S, H = H2Framing> {
    inner: Mutex<M, RefCell<HfpCodec<W, S, H>>>,
}

impl<M, W, S, H> SharedHfpCodec<M, W, S, H>
where
    M: RawMutex,
    W: SpeechEncoder,
    S: SpeechEncoder,
    H: SyncHeaderGenerator,
{
    /// Wrap an initialized session
    #[must_use]
    pub fn new(codec: HfpCodec<W, S, H>) -> Self {
        Self {
            inner: Mutex::new(RefCell::new(codec)),
        }
    }

    /// Run `f` with exclusive access to the session
    ///
    /// Use this for compound operations that must not interleave with the other
    /// side, e.g. checking admission and encoding in one step.
    ///
    /// # Panics
    /// Panics if called re-entrantly from inside `f`.
    pub fn lock<R>(&self, f: impl FnOnce(&mut HfpCodec<W, S, H>) -> R) -> R {
        self.inner.lock(|codec| f(&mut *codec.borrow_mut()))
    }

    /// See [`HfpCodec::can_encode_audio_frame_now`]
    #[must_use]
    pub fn can_encode_audio_frame_now(&self) -> bool {
        self.lock(|codec| codec.can_encode_audio_frame_now())
    }

    /// See [`HfpCodec::num_audio_samples_per_frame`]
    #[must_use]
    pub fn num_audio_samples_per_frame(&self) -> u16 {
        self.lock(|codec| codec.num_audio_samples_per_frame())
    }

    /// See [`HfpCodec::encode_audio_frame`]
    ///
    /// # Panics
    /// Panics under the same conditions as [`HfpCodec::encode_audio_frame`].
    pub fn encode_audio_frame(&self, pcm: &[i16]) {
        self.lock(|codec| codec.encode_audio_frame(pcm));
    }

    /// Encode `pcm` if the session admits a frame, in one critical section
    ///
    /// Returns `false` and drops nothing if the buffer needs draining first.
    ///
    /// # Panics
    /// Panics if `pcm` does not hold exactly `num_audio_samples_per_frame()` samples.
    pub fn encode_audio_frame_if_admissible(&self, pcm: &[i16]) -> bool {
        self.lock(|codec| {
            if codec.can_encode_audio_frame_now() {
                codec.encode_audio_frame(pcm);
                true
            } else {
                false
            }
        })
    }

    /// See [`HfpCodec::num_bytes_available`]
    #[must_use]
    pub fn num_bytes_available(&self) -> u16 {
        self.lock(|codec| codec.num_bytes_available())
    }

    /// See [`HfpCodec::read_from_stream`]
    ///
    /// # Panics
    /// Panics under the same conditions as [`HfpCodec::read_from_stream`].
    pub fn read_from_stream(&self, buf: &mut [u8]) {
        self.lock(|codec| codec.read_from_stream(buf));
    }

    /// Unwrap the session
    pub fn into_inner(self) -> HfpCodec<W, S, H> {
        self.inner.into_inner().into_inner()
    }

    /// End the session and release encoder resources
    pub fn deinit(self) {
        self.into_inner().deinit();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hfp::backend::tests::FakeEncoder;
    use crate::hfp::{CodecBackends, CodecId};
    use embassy_sync::blocking_mutex::raw::NoopRawMutex;

    fn shared_msbc() -> SharedHfpCodec<NoopRawMutex, FakeEncoder, crate::hfp::Unavailable> {
        SharedHfpCodec::new(HfpCodec::init(
            CodecId::Msbc as u8,
            CodecBackends::wideband(FakeEncoder::with_seed(3)),
        ))
    }

    #[test]
    fn test_shared_encode_and_drain() {
        let shared = shared_msbc();
        assert_eq!(shared.num_audio_samples_per_frame(), 120);
        assert!(shared.can_encode_audio_frame_now());

        shared.encode_audio_frame(&[0i16; 120]);
        assert_eq!(shared.num_bytes_available(), 60);

        let mut buf = [0u8; 60];
        shared.read_from_stream(&mut buf);
        assert_eq!(&buf[..3], &[0x01, 0x08, 3]);
        assert_eq!(shared.num_bytes_available(), 0);
    }

    #[test]
    fn test_encode_if_admissible() {
        let shared = shared_msbc();
        assert!(shared.encode_audio_frame_if_admissible(&[0i16; 120]));
        assert!(shared.encode_audio_frame_if_admissible(&[0i16; 120]));
        assert!(!shared.encode_audio_frame_if_admissible(&[0i16; 120]));
        assert_eq!(shared.num_bytes_available(), 120);

        let mut buf = [0u8; 120];
        shared.read_from_stream(&mut buf);
        assert!(shared.encode_audio_frame_if_admissible(&[0i16; 120]));
    }

    #[test]
    fn test_into_inner_keeps_state() {
        let shared = shared_msbc();
        shared.encode_audio_frame(&[0i16; 120]);

        let codec = shared.into_inner();
        assert_eq!(codec.num_bytes_available(), 60);
        assert_eq!(codec.codec_id(), CodecId::Msbc);
    }
}
