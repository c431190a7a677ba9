#![no_std]
#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

pub mod constants;
pub mod hfp;
pub mod sco;

pub use hfp::{
    CodecBackends, CodecId, EncoderConfig, FrameFormat, H2Framing, HfpCodec, HfpCodecError,
    SharedHfpCodec, SpeechEncoder, SyncHeaderGenerator,
};
pub use sco::{PacketStatus, ScoError, ScoHeader, ScoPacket};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{SCO_BUFFER_SIZE, SCO_FRAME_SIZE};

    /// Encoder that writes the first PCM sample's low byte into every octet
    struct Echo;

    impl SpeechEncoder for Echo {
        fn configure(&mut self, _config: &EncoderConfig) {}

        #[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
        fn encode(&mut self, pcm: &[i16], out: &mut [u8]) {
            out.fill(pcm[0] as u8);
        }
    }

    #[test]
    fn test_buffer_sizing() {
        assert_eq!(SCO_BUFFER_SIZE, 2 * SCO_FRAME_SIZE);
        assert_eq!(FrameFormat::MSBC.frame_size(), SCO_FRAME_SIZE);
        assert_eq!(FrameFormat::LC3_SWB.frame_size(), SCO_FRAME_SIZE);
    }

    #[test]
    fn test_session_with_both_backends() {
        let mut codec = HfpCodec::init(CodecId::Lc3Swb as u8, CodecBackends::new(Echo, Echo));
        assert_eq!(codec.num_audio_samples_per_frame(), 240);

        let mut pcm = [0i16; 240];
        pcm[0] = 0x17;
        codec.encode_audio_frame(&pcm);

        let mut packet = [0u8; SCO_FRAME_SIZE];
        codec.read_from_stream(&mut packet);
        assert_eq!(&packet[..2], &[0x01, 0x08]);
        assert!(packet[2..].iter().all(|&b| b == 0x17));
        codec.deinit();
    }
}
