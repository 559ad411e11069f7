//! Merging ordered audio fragments into a single artifact.
//!
//! With a codec, every fragment is decoded to PCM, the samples are joined in
//! chunk order and encoded once, which gives gapless output. Without one the
//! encoded streams are glued byte for byte. MP3 players cope with that, but
//! frame padding at each seam can be audible, so that path is logged as a
//! quality downgrade every time it is taken.

use super::codec::{AudioCodec, CodecError, PcmAudio};
use crate::error::{PipelineError, Result};
use crate::tts::{AudioFragment, Gender};
use chrono::NaiveDateTime;
use tempfile::TempDir;

/// How an artifact was put together.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeMode {
    /// One fragment, returned as synthesized
    SingleFragment,
    /// Decoded, concatenated and re-encoded
    Decoded,
    /// Encoded streams concatenated without decoding
    RawConcat,
}

/// The final merged audio returned to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioArtifact {
    bytes: Vec<u8>,
    mode: MergeMode,
}

impl AudioArtifact {
    pub const MIME_TYPE: &'static str = "audio/mpeg";

    pub fn new(bytes: Vec<u8>, mode: MergeMode) -> Self {
        Self { bytes, mode }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn mode(&self) -> MergeMode {
        self.mode
    }

    pub fn mime_type(&self) -> &'static str {
        Self::MIME_TYPE
    }

    /// Download name such as `pdf2audio_20240102_030405_female.mp3`.
    pub fn suggested_filename(gender: Gender, timestamp: NaiveDateTime) -> String {
        let suffix = match gender {
            Gender::Female => "_female",
            Gender::Male => "",
        };
        format!("pdf2audio_{}{}.mp3", timestamp.format("%Y%m%d_%H%M%S"), suffix)
    }
}

/// Merges fragments, decoding them when a codec is available.
pub struct AudioStitcher {
    codec: Option<Box<dyn AudioCodec>>,
}

impl AudioStitcher {
    pub fn new(codec: Option<Box<dyn AudioCodec>>) -> Self {
        match &codec {
            Some(codec) => log::debug!("Audio stitching with {}", codec.name()),
            None => log::warn!(
                "No audio codec available; multi-chunk audio will be concatenated without decoding"
            ),
        }
        Self { codec }
    }

    pub fn has_codec(&self) -> bool {
        self.codec.is_some()
    }

    /// Merge fragments in chunk-index order.
    pub fn merge(&self, mut fragments: Vec<AudioFragment>) -> Result<AudioArtifact> {
        fragments.sort_by_key(|fragment| fragment.index);

        if fragments.is_empty() {
            return Err(PipelineError::NoAudioProduced);
        }

        if fragments.len() == 1 {
            let fragment = fragments.remove(0);
            return Ok(AudioArtifact::new(fragment.bytes, MergeMode::SingleFragment));
        }

        match &self.codec {
            Some(codec) => {
                log::info!(
                    "Merging {} fragments by decoding with {}",
                    fragments.len(),
                    codec.name()
                );
                let bytes = merge_decoded(codec.as_ref(), &fragments)?;
                Ok(AudioArtifact::new(bytes, MergeMode::Decoded))
            }
            None => {
                log::warn!(
                    "Concatenating {} encoded fragments without decoding; output may have gaps",
                    fragments.len()
                );
                Ok(AudioArtifact::new(concat_raw(&fragments), MergeMode::RawConcat))
            }
        }
    }
}

/// Decode every fragment, join the samples and encode once.
///
/// The scratch directory lives exactly as long as this call.
fn merge_decoded(
    codec: &dyn AudioCodec,
    fragments: &[AudioFragment],
) -> std::result::Result<Vec<u8>, CodecError> {
    let workdir = TempDir::new()?;

    let mut merged: Option<PcmAudio> = None;
    for fragment in fragments {
        let stem = format!("chunk_{}", fragment.index);
        let pcm = codec.decode(&fragment.bytes, workdir.path(), &stem)?;

        merged = Some(match merged {
            None => pcm,
            Some(mut acc) => {
                if !acc.same_format(&pcm) {
                    return Err(CodecError::FormatMismatch {
                        index: fragment.index,
                    });
                }
                acc.samples.extend(pcm.samples);
                acc
            }
        });
    }

    let merged = merged.unwrap_or_else(|| PcmAudio::from_le_bytes(&[], 0, 0));
    log::debug!("Encoding {} ms of merged audio", merged.duration_ms());

    codec.encode(&merged, workdir.path())
}

/// Join encoded streams back to back.
fn concat_raw(fragments: &[AudioFragment]) -> Vec<u8> {
    let total = fragments.iter().map(|f| f.bytes.len()).sum();
    let mut out = Vec::with_capacity(total);
    for fragment in fragments {
        out.extend_from_slice(&fragment.bytes);
    }
    out
}
