//! HFP Codec Session
//!
//! [`HfpCodec`] turns PCM frames into H2-framed codec payload and hands the bytes
//! to the SCO transport as a stream. It owns one linear buffer with a write and a
//! read cursor:
//!
//! ```text
//! Empty (write = read = 0)
//!   --encode_audio_frame-->        Partial/Full (write > read)
//! Partial/Full
//!   --read_from_stream (partial)-> Partial/Full (read advanced)
//!   --read_from_stream (drained)-> Empty (both cursors reset)
//! ```
//!
//! The buffer is not a ring. Space is only reclaimed when the reader catches up
//! with the writer, so after a reset the stream is contiguous from offset zero.

use super::{
    CodecBackends, CodecId, FrameFormat, H2Framing, HfpCodecError, SpeechEncoder,
    SyncHeaderGenerator, backend::Backend,
};
use crate::constants::{H2_HEADER_SIZE, SCO_BUFFER_SIZE, SCO_FRAME_SIZE};

// Any frame admitted at the threshold must fit in the buffer.
const _: () = assert!(SCO_FRAME_SIZE + FrameFormat::MSBC.frame_size() <= SCO_BUFFER_SIZE);
const _: () = assert!(SCO_FRAME_SIZE + FrameFormat::LC3_SWB.frame_size() <= SCO_BUFFER_SIZE);

/// One active HFP voice encoding session
///
/// The session is not synchronized. Producer (`encode_audio_frame`) and consumer
/// (`read_from_stream`) must run in the same context or be serialized by the
/// caller, e.g. with [`SharedHfpCodec`](super::SharedHfpCodec).
#[derive(Debug)]
pub struct HfpCodec<W, S, H = H2Framing> {
    /// Encoder bound at init
    backend: Backend<W, S>,
    /// H2 header sequence state
    header: H,
    /// Framed codec output
    sco_packet: [u8; SCO_BUFFER_SIZE],
    /// Offset of the next byte to write
    write_pos: usize,
    /// Offset of the next byte to read
    read_pos: usize,
}

impl<W: SpeechEncoder, S: SpeechEncoder> HfpCodec<W, S, H2Framing> {
    /// Start a session for `codec_id` with standard H2 framing
    ///
    /// Selects the registered encoder for the codec and configures it.
    ///
    /// # Panics
    /// Panics if `codec_id` is not an HFP codec or no encoder is registered for it.
    #[must_use]
    pub fn init(codec_id: u8, backends: CodecBackends<W, S>) -> Self {
        Self::with_header_generator(codec_id, backends, H2Framing::new())
    }

    /// Start a session for `codec_id` with standard H2 framing
    ///
    /// # Errors
    /// Returns `HfpCodecError::UnknownCodec` for identifiers that are not HFP codecs
    /// and `HfpCodecError::NoBackend` if no encoder is registered for the codec.
    pub fn try_init(codec_id: u8, backends: CodecBackends<W, S>) -> Result<Self, HfpCodecError> {
        Self::try_with_header_generator(codec_id, backends, H2Framing::new())
    }
}

impl<W: SpeechEncoder, S: SpeechEncoder, H: SyncHeaderGenerator> HfpCodec<W, S, H> {
    /// Start a session using a custom synchronization header generator
    ///
    /// The generator is reset before the first frame.
    ///
    /// # Panics
    /// Panics if `codec_id` is not an HFP codec or no encoder is registered for it.
    #[must_use]
    pub fn with_header_generator(codec_id: u8, backends: CodecBackends<W, S>, header: H) -> Self {
        Self::try_with_header_generator(codec_id, backends, header)
            .unwrap_or_else(|e| panic!("[HFP] Codec init failed: {e}"))
    }

    /// Start a session using a custom synchronization header generator
    ///
    /// # Errors
    /// See [`HfpCodec::try_init`].
    pub fn try_with_header_generator(
        codec_id: u8,
        backends: CodecBackends<W, S>,
        mut header: H,
    ) -> Result<Self, HfpCodecError> {
        let codec = CodecId::try_from(codec_id)?;
        let backend = backends
            .select(codec)
            .ok_or(HfpCodecError::NoBackend(codec))?;
        header.reset();

        defmt::debug!("[HFP] Codec init: {}", codec);

        Ok(Self {
            backend,
            header,
            sco_packet: [0; SCO_BUFFER_SIZE],
            write_pos: 0,
            read_pos: 0,
        })
    }

    /// Codec this session encodes
    #[must_use]
    pub fn codec_id(&self) -> CodecId {
        self.backend.codec_id()
    }

    /// Frame layout of the active codec
    #[must_use]
    pub fn frame_format(&self) -> FrameFormat {
        self.backend.format()
    }

    /// Check whether another frame may be encoded now
    ///
    /// This is the only backpressure signal. When it returns `false` the caller
    /// has to drain the stream before encoding more audio.
    #[must_use]
    pub fn can_encode_audio_frame_now(&self) -> bool {
        self.write_pos <= SCO_FRAME_SIZE
    }

    /// Number of PCM samples `encode_audio_frame` expects
    #[must_use]
    pub fn num_audio_samples_per_frame(&self) -> u16 {
        self.backend.format().samples_per_frame
    }

    /// Encode one PCM frame and append it to the stream
    ///
    /// Writes the H2 header, the encoder output and, for mSBC, one padding byte.
    ///
    /// # Panics
    /// Panics if `can_encode_audio_frame_now()` is false or `pcm` does not hold
    /// exactly `num_audio_samples_per_frame()` samples.
    pub fn encode_audio_frame(&mut self, pcm: &[i16]) {
        self.try_encode_audio_frame(pcm)
            .unwrap_or_else(|e| panic!("[HFP] Encode contract violated: {e}"));
    }

    /// Encode one PCM frame and append it to the stream
    ///
    /// # Errors
    /// Returns `HfpCodecError::NotAdmissible` if the buffer is past the admission
    /// threshold and `HfpCodecError::WrongSampleCount` if `pcm` has the wrong
    /// length. The session is left unchanged in both cases.
    pub fn try_encode_audio_frame(&mut self, pcm: &[i16]) -> Result<(), HfpCodecError> {
        if !self.can_encode_audio_frame_now() {
            return Err(HfpCodecError::NotAdmissible);
        }
        let expected = self.num_audio_samples_per_frame();
        if pcm.len() != usize::from(expected) {
            return Err(HfpCodecError::WrongSampleCount {
                expected,
                actual: pcm.len(),
            });
        }

        let mut h2 = [0u8; H2_HEADER_SIZE];
        self.header.add_header(&mut h2);
        self.sco_packet[self.write_pos..self.write_pos + H2_HEADER_SIZE].copy_from_slice(&h2);
        self.write_pos += H2_HEADER_SIZE;

        let written = self
            .backend
            .encode(pcm, &mut self.sco_packet[self.write_pos..]);
        self.write_pos += written;

        defmt::debug!(
            "[HFP] Encode frame, read {}, write {}",
            self.read_pos,
            self.write_pos
        );
        Ok(())
    }

    /// Number of encoded bytes waiting to be read
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn num_bytes_available(&self) -> u16 {
        // Bounded by SCO_BUFFER_SIZE
        (self.write_pos - self.read_pos) as u16
    }

    /// Copy `buf.len()` bytes from the stream into `buf`
    ///
    /// Once everything written has been read both cursors return to zero.
    ///
    /// # Panics
    /// Panics if `buf` is longer than `num_bytes_available()`.
    pub fn read_from_stream(&mut self, buf: &mut [u8]) {
        self.try_read_from_stream(buf)
            .unwrap_or_else(|e| panic!("[HFP] Read contract violated: {e}"));
    }

    /// Copy `buf.len()` bytes from the stream into `buf`
    ///
    /// Returns the number of bytes copied.
    ///
    /// # Errors
    /// Returns `HfpCodecError::InsufficientData` if `buf` is longer than
    /// `num_bytes_available()`. Nothing is copied in that case.
    pub fn try_read_from_stream(&mut self, buf: &mut [u8]) -> Result<usize, HfpCodecError> {
        let available = self.num_bytes_available();
        if buf.len() > usize::from(available) {
            return Err(HfpCodecError::InsufficientData {
                requested: buf.len(),
                available,
            });
        }

        let count = usize::from(available).min(buf.len());
        buf[..count].copy_from_slice(&self.sco_packet[self.read_pos..self.read_pos + count]);
        self.read_pos += count;

        if self.read_pos == self.write_pos {
            self.read_pos = 0;
            self.write_pos = 0;
        }

        defmt::debug!(
            "[HFP] Read {} from stream, read {}, write {}",
            count,
            self.read_pos,
            self.write_pos
        );
        Ok(count)
    }

    /// End the session and release encoder resources
    pub fn deinit(mut self) {
        self.backend.release();
        defmt::debug!("[HFP] Codec deinit: {}", self.backend.codec_id());
    }
}
