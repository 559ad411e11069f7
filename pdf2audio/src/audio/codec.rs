//! Audio decoding and encoding using FFmpeg.

use std::path::{Path, PathBuf};
use std::process::Command;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CodecError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{tool} failed: {stderr}")]
    ToolFailed { tool: String, stderr: String },

    #[error("Fragment {index} decoded to a different sample format")]
    FormatMismatch { index: usize },
}

/// Interleaved signed 16-bit PCM samples.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PcmAudio {
    pub sample_rate: u32,
    pub channels: u16,
    pub samples: Vec<i16>,
}

impl PcmAudio {
    /// Build from raw little-endian bytes; a trailing odd byte is dropped.
    pub fn from_le_bytes(bytes: &[u8], sample_rate: u32, channels: u16) -> Self {
        let samples = bytes
            .chunks_exact(2)
            .map(|pair| i16::from_le_bytes([pair[0], pair[1]]))
            .collect();

        Self {
            sample_rate,
            channels,
            samples,
        }
    }

    pub fn to_le_bytes(&self) -> Vec<u8> {
        self.samples.iter().flat_map(|s| s.to_le_bytes()).collect()
    }

    pub fn same_format(&self, other: &PcmAudio) -> bool {
        self.sample_rate == other.sample_rate && self.channels == other.channels
    }

    pub fn duration_ms(&self) -> u64 {
        if self.sample_rate == 0 || self.channels == 0 {
            return 0;
        }
        let frames = self.samples.len() as u64 / self.channels as u64;
        frames * 1000 / self.sample_rate as u64
    }
}

/// Capability to decode encoded audio to PCM and encode PCM back.
///
/// `workdir` is scratch space owned by the caller for the duration of one
/// merge; implementations may leave files in it.
pub trait AudioCodec: Send + Sync {
    /// Name for logs
    fn name(&self) -> &str;

    /// Decode one encoded stream. `stem` is unique per fragment within `workdir`.
    fn decode(&self, encoded: &[u8], workdir: &Path, stem: &str) -> Result<PcmAudio, CodecError>;

    /// Encode PCM into the output format (MP3).
    fn encode(&self, pcm: &PcmAudio, workdir: &Path) -> Result<Vec<u8>, CodecError>;
}

/// FFmpeg-backed codec. Every fragment is decoded to 16-bit mono 24 kHz so
/// the decoded samples can be concatenated directly.
pub struct FfmpegCodec {
    executable: PathBuf,
}

impl FfmpegCodec {
    pub const SAMPLE_RATE: u32 = 24_000;
    pub const CHANNELS: u16 = 1;
    const BITRATE: &'static str = "64k";

    /// Locate a working FFmpeg: the configured path, else `ffmpeg` on PATH.
    ///
    /// Returns None when no executable answers `-version` successfully.
    pub fn detect(configured: Option<&Path>) -> Option<Self> {
        let executable = match configured {
            Some(path) => path.to_path_buf(),
            None => which::which("ffmpeg").ok()?,
        };

        let available = Command::new(&executable)
            .arg("-version")
            .output()
            .map(|o| o.status.success())
            .unwrap_or(false);

        if available {
            log::info!("Using ffmpeg at {}", executable.display());
            Some(Self { executable })
        } else {
            log::debug!("ffmpeg at {} is not usable", executable.display());
            None
        }
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.executable);
        cmd.args(["-y", "-hide_banner", "-loglevel", "error"]);
        cmd
    }

    fn run(mut cmd: Command, tool: &str) -> Result<(), CodecError> {
        let output = cmd.output()?;

        if !output.status.success() {
            return Err(CodecError::ToolFailed {
                tool: tool.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(())
    }
}

impl AudioCodec for FfmpegCodec {
    fn name(&self) -> &str {
        "ffmpeg"
    }

    fn decode(&self, encoded: &[u8], workdir: &Path, stem: &str) -> Result<PcmAudio, CodecError> {
        let input = workdir.join(format!("{}.mp3", stem));
        let output = workdir.join(format!("{}.pcm", stem));
        std::fs::write(&input, encoded)?;

        let mut cmd = self.command();
        cmd.arg("-i")
            .arg(&input)
            .args(["-f", "s16le", "-acodec", "pcm_s16le"])
            .arg("-ac")
            .arg(Self::CHANNELS.to_string())
            .arg("-ar")
            .arg(Self::SAMPLE_RATE.to_string())
            .arg(&output);
        Self::run(cmd, "ffmpeg decode")?;

        let raw = std::fs::read(&output)?;
        Ok(PcmAudio::from_le_bytes(&raw, Self::SAMPLE_RATE, Self::CHANNELS))
    }

    fn encode(&self, pcm: &PcmAudio, workdir: &Path) -> Result<Vec<u8>, CodecError> {
        let input = workdir.join("merged.pcm");
        let output = workdir.join("merged.mp3");
        std::fs::write(&input, pcm.to_le_bytes())?;

        let mut cmd = self.command();
        cmd.args(["-f", "s16le"])
            .arg("-ar")
            .arg(pcm.sample_rate.to_string())
            .arg("-ac")
            .arg(pcm.channels.to_string())
            .arg("-i")
            .arg(&input)
            .args(["-c:a", "libmp3lame", "-b:a", Self::BITRATE, "-f", "mp3"])
            .arg(&output);
        Self::run(cmd, "ffmpeg encode")?;

        Ok(std::fs::read(&output)?)
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// Codec that treats every encoded byte as one PCM sample and back.
    ///
    /// Fragments starting with `BAD` fail to decode. Work directories seen
    /// are recorded so tests can check they were cleaned up.
    #[derive(Default)]
    pub struct ByteCodec {
        pub workdirs: Arc<Mutex<Vec<PathBuf>>>,
    }

    impl AudioCodec for ByteCodec {
        fn name(&self) -> &str {
            "bytes"
        }

        fn decode(
            &self,
            encoded: &[u8],
            workdir: &Path,
            stem: &str,
        ) -> Result<PcmAudio, CodecError> {
            self.workdirs.lock().unwrap().push(workdir.to_path_buf());
            std::fs::write(workdir.join(stem), encoded)?;

            if encoded.starts_with(b"BAD") {
                return Err(CodecError::ToolFailed {
                    tool: "bytes decode".to_string(),
                    stderr: "invalid data".to_string(),
                });
            }

            Ok(PcmAudio {
                sample_rate: 8000,
                channels: 1,
                samples: encoded.iter().map(|b| *b as i16).collect(),
            })
        }

        fn encode(&self, pcm: &PcmAudio, _workdir: &Path) -> Result<Vec<u8>, CodecError> {
            Ok(pcm.samples.iter().map(|s| *s as u8).collect())
        }
    }
}
