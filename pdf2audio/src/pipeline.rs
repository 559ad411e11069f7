//! End-to-end conversion: normalize, split, synthesize each chunk, merge.

use crate::audio::{AudioArtifact, AudioCodec, AudioStitcher, CodecError, FfmpegCodec};
use crate::config::Config;
use crate::error::{PipelineError, Result};
use crate::text::{char_len, chunk_normalized, normalize};
use crate::tts::{Gender, MIN_CHUNK_LENGTH, SynthesisClient, resolve_voice};
use anyhow::Context;
use speech_client::{GoogleTranslateProvider, SpeechProvider};
use std::sync::Arc;
use std::time::Duration;

const PREVIEW_MARKER: &str = " ... [preview truncated]";

/// Progress after each synthesized chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SynthesisProgress {
    pub completed: usize,
    pub total: usize,
}

/// Converts text into one MP3 artifact.
///
/// Holds no per-run state; every call is independent.
pub struct Pipeline {
    config: Config,
    client: SynthesisClient,
    stitcher: Arc<AudioStitcher>,
}

impl Pipeline {
    /// Create a pipeline from explicit collaborators. `codec` is None when no
    /// decoder is available, which selects raw concatenation for merging.
    pub fn new(
        config: Config,
        provider: Arc<dyn SpeechProvider>,
        codec: Option<Box<dyn AudioCodec>>,
    ) -> Self {
        let client = SynthesisClient::new(provider, MIN_CHUNK_LENGTH);
        let stitcher = Arc::new(AudioStitcher::new(codec));

        Self {
            config,
            client,
            stitcher,
        }
    }

    /// Create a pipeline using Google Translate TTS and FFmpeg if installed.
    pub fn from_config(config: Config) -> anyhow::Result<Self> {
        let timeout = Duration::from_secs(config.request_timeout_secs);
        let provider =
            GoogleTranslateProvider::new(timeout).context("Failed to create speech provider")?;

        let codec = FfmpegCodec::detect(config.ffmpeg_path.as_deref())
            .map(|codec| Box::new(codec) as Box<dyn AudioCodec>);

        Ok(Self::new(config, Arc::new(provider), codec))
    }

    /// Whether multi-chunk output will be decoded and re-encoded.
    pub fn has_codec(&self) -> bool {
        self.stitcher.has_codec()
    }

    /// Convert `raw_text` to audio.
    ///
    /// Chunks are synthesized one after another in order. The first failed
    /// chunk aborts the run; partial audio is never returned.
    pub async fn run(
        &self,
        raw_text: &str,
        language: &str,
        gender: Gender,
        max_chunk_length: usize,
    ) -> Result<AudioArtifact> {
        self.run_with_progress(raw_text, language, gender, max_chunk_length, |_| {})
            .await
    }

    /// Same as [`Pipeline::run`], reporting progress after every chunk.
    pub async fn run_with_progress<F>(
        &self,
        raw_text: &str,
        language: &str,
        gender: Gender,
        max_chunk_length: usize,
        mut on_progress: F,
    ) -> Result<AudioArtifact>
    where
        F: FnMut(SynthesisProgress),
    {
        if raw_text.trim().is_empty() {
            return Err(PipelineError::EmptyInput);
        }

        let normalized = normalize(raw_text);
        let length = char_len(&normalized);
        if length < self.config.min_text_length {
            return Err(PipelineError::TooShort {
                length,
                minimum: self.config.min_text_length,
            });
        }

        let chunks = chunk_normalized(&normalized, max_chunk_length);

        let voice = resolve_voice(language, gender);
        log::info!(
            "Generating audio: lang={} tld={} gender={} length={} chunks={}",
            voice.language,
            voice.accent.tld(),
            gender,
            length,
            chunks.len()
        );

        let total = chunks.len();
        let mut fragments = Vec::with_capacity(total);
        for chunk in &chunks {
            let fragment = self
                .client
                .synthesize(chunk, &voice)
                .await
                .map_err(|source| PipelineError::Synthesis {
                    chunk_index: chunk.index,
                    source,
                })?;
            fragments.push(fragment);

            on_progress(SynthesisProgress {
                completed: fragments.len(),
                total,
            });
        }

        // Decoding shells out, so keep it off the async worker threads.
        let stitcher = Arc::clone(&self.stitcher);
        let artifact = tokio::task::spawn_blocking(move || stitcher.merge(fragments))
            .await
            .map_err(|err| CodecError::Io(std::io::Error::other(err)))??;

        if artifact.len() <= self.config.min_output_bytes {
            return Err(PipelineError::UndersizedOutput {
                bytes: artifact.len(),
                minimum: self.config.min_output_bytes,
            });
        }

        log::info!(
            "Generated {} bytes of audio ({:?})",
            artifact.len(),
            artifact.mode()
        );
        Ok(artifact)
    }

    /// Convert only the beginning of `raw_text`, for a quick listen.
    pub async fn preview(
        &self,
        raw_text: &str,
        language: &str,
        gender: Gender,
    ) -> Result<AudioArtifact> {
        if raw_text.trim().is_empty() {
            return Err(PipelineError::EmptyInput);
        }

        let text = preview_text(&normalize(raw_text), self.config.preview_chars);
        self.run(&text, language, gender, self.config.max_chunk_length)
            .await
    }
}

/// First `limit` characters of `normalized`, marked when anything was cut.
pub fn preview_text(normalized: &str, limit: usize) -> String {
    if char_len(normalized) <= limit {
        return normalized.to_string();
    }

    let mut text: String = normalized.chars().take(limit).collect();
    text.truncate(text.trim_end().len());
    text.push_str(PREVIEW_MARKER);
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::MergeMode;
    use crate::audio::PcmAudio;
    use crate::audio::codec::test_support::ByteCodec;
    use crate::error::ErrorKind;
    use speech_client::{MockProvider, SpeechError};
    use std::path::Path;
    use std::sync::Mutex;
    use std::thread::ThreadId;

    const FIFTY_CHARS: &str = "Hello there, friend. How are you today? I am fine.";

    /// A 99-character sentence labelled with `i`.
    fn sentence(i: usize) -> String {
        let head = format!("Sentence {:02} says ", i);
        format!("{}{}.", head, "z".repeat(98 - head.len()))
    }

    fn nine_thousand_chars() -> String {
        (0..90).map(sentence).collect::<Vec<_>>().join(" ")
    }

    fn pipeline(provider: &Arc<MockProvider>, codec: Option<Box<dyn AudioCodec>>) -> Pipeline {
        Pipeline::new(Config::default(), provider.clone(), codec)
    }

    fn byte_codec() -> Option<Box<dyn AudioCodec>> {
        Some(Box::new(ByteCodec::default()))
    }

    /// Records the thread every decode runs on.
    struct ThreadRecordingCodec {
        inner: ByteCodec,
        threads: Arc<Mutex<Vec<ThreadId>>>,
    }

    impl AudioCodec for ThreadRecordingCodec {
        fn name(&self) -> &str {
            "thread-recording"
        }

        fn decode(
            &self,
            encoded: &[u8],
            workdir: &Path,
            stem: &str,
        ) -> std::result::Result<PcmAudio, CodecError> {
            self.threads.lock().unwrap().push(std::thread::current().id());
            self.inner.decode(encoded, workdir, stem)
        }

        fn encode(
            &self,
            pcm: &PcmAudio,
            workdir: &Path,
        ) -> std::result::Result<Vec<u8>, CodecError> {
            self.inner.encode(pcm, workdir)
        }
    }

    #[tokio::test]
    async fn test_short_text_single_call() {
        assert_eq!(FIFTY_CHARS.len(), 50);
        let provider = Arc::new(MockProvider::always_succeeds(2048));
        let pipeline = pipeline(&provider, byte_codec());

        let artifact = pipeline
            .run(FIFTY_CHARS, "en", Gender::Male, 4000)
            .await
            .unwrap();

        assert_eq!(provider.call_count(), 1);
        assert!(artifact.len() > 1024);
        assert_eq!(artifact.mode(), MergeMode::SingleFragment);
        assert_eq!(artifact.mime_type(), "audio/mpeg");
    }

    #[tokio::test]
    async fn test_empty_input() {
        let provider = Arc::new(MockProvider::always_succeeds(2048));
        let pipeline = pipeline(&provider, byte_codec());

        for text in ["", "   \n\t  "] {
            let err = pipeline.run(text, "en", Gender::Male, 4000).await.unwrap_err();
            assert_eq!(err.kind(), ErrorKind::EmptyInput);
        }
        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test]
    async fn test_too_short_rejected_before_synthesis() {
        let provider = Arc::new(MockProvider::always_succeeds(2048));
        let pipeline = pipeline(&provider, byte_codec());

        let err = pipeline
            .run(" Hi\n there.", "en", Gender::Male, 4000)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            PipelineError::TooShort {
                length: 9,
                minimum: 10
            }
        ));
        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test]
    async fn test_long_text_three_calls_in_order() {
        let provider = Arc::new(MockProvider::always_succeeds(2048));
        let pipeline = pipeline(&provider, byte_codec());
        let text = nine_thousand_chars();

        let artifact = pipeline.run(&text, "en", Gender::Male, 4000).await.unwrap();

        let requests = provider.requests();
        assert_eq!(requests.len(), 3);
        assert!(requests.iter().all(|r| r.text.chars().count() <= 4000));
        assert!(requests[0].text.starts_with("Sentence 00"));
        assert!(requests[1].text.starts_with("Sentence 40"));
        assert!(requests[2].text.starts_with("Sentence 80"));
        assert_eq!(
            requests.iter().map(|r| r.text.as_str()).collect::<Vec<_>>().join(" "),
            text
        );

        let expected: Vec<u8> = requests
            .iter()
            .flat_map(|r| MockProvider::fake_audio(&r.text, 2048))
            .collect();
        assert_eq!(artifact.bytes(), expected.as_slice());
        assert_eq!(artifact.mode(), MergeMode::Decoded);
    }

    #[tokio::test]
    async fn test_short_final_sentence_is_synthesized() {
        let provider = Arc::new(MockProvider::always_succeeds(2048));
        let pipeline = pipeline(&provider, byte_codec());
        let text = format!("{}. The End.", "a".repeat(59));

        let artifact = pipeline.run(&text, "en", Gender::Male, 60).await.unwrap();

        let requests = provider.requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[1].text, "The End.");
        assert_eq!(artifact.mode(), MergeMode::Decoded);
    }

    #[tokio::test]
    async fn test_short_sentence_before_oversized_one_is_synthesized() {
        let provider = Arc::new(MockProvider::always_succeeds(2048));
        let pipeline = pipeline(&provider, byte_codec());
        let text = format!("Hi there. {}.", vec!["word"; 30].join(" "));

        pipeline.run(&text, "en", Gender::Male, 40).await.unwrap();

        let requests = provider.requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].text, "Hi there.");
    }

    #[tokio::test]
    async fn test_merge_runs_off_the_async_thread() {
        let provider = Arc::new(MockProvider::always_succeeds(2048));
        let threads = Arc::new(Mutex::new(Vec::new()));
        let codec = ThreadRecordingCodec {
            inner: ByteCodec::default(),
            threads: threads.clone(),
        };
        let pipeline = pipeline(&provider, Some(Box::new(codec)));

        pipeline
            .run(&nine_thousand_chars(), "en", Gender::Male, 4000)
            .await
            .unwrap();

        let threads = threads.lock().unwrap();
        assert_eq!(threads.len(), 3);
        assert!(threads.iter().all(|id| *id != std::thread::current().id()));
    }

    #[tokio::test]
    async fn test_without_codec_falls_back_to_raw_concat() {
        let provider = Arc::new(MockProvider::always_succeeds(2048));
        let pipeline = pipeline(&provider, None);

        let artifact = pipeline
            .run(&nine_thousand_chars(), "en", Gender::Male, 4000)
            .await
            .unwrap();

        assert!(!pipeline.has_codec());
        assert_eq!(artifact.mode(), MergeMode::RawConcat);
        assert!(artifact.bytes().starts_with(b"<Sentence 00"));
    }

    #[tokio::test]
    async fn test_aborts_on_first_failed_chunk() {
        let provider = Arc::new(MockProvider::fails_on_call(
            1,
            SpeechError::Unreachable("connection reset".to_string()),
            2048,
        ));
        let pipeline = pipeline(&provider, byte_codec());

        let err = pipeline
            .run(&nine_thousand_chars(), "en", Gender::Male, 4000)
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::SynthesisError);
        assert!(matches!(err, PipelineError::Synthesis { chunk_index: 1, .. }));
        assert_eq!(provider.call_count(), 2);
    }

    #[tokio::test]
    async fn test_undersized_output_is_failure() {
        let provider = Arc::new(MockProvider::always_succeeds(100));
        let pipeline = pipeline(&provider, byte_codec());

        let err = pipeline
            .run(FIFTY_CHARS, "en", Gender::Male, 4000)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            PipelineError::UndersizedOutput {
                bytes: 100,
                minimum: 1024
            }
        ));
    }

    #[tokio::test]
    async fn test_voice_resolved_once_for_all_chunks() {
        let provider = Arc::new(MockProvider::always_succeeds(2048));
        let pipeline = pipeline(&provider, byte_codec());

        pipeline
            .run(&nine_thousand_chars(), "xx", Gender::Female, 4000)
            .await
            .unwrap();

        for request in provider.requests() {
            assert_eq!(request.language, "en");
            assert_eq!(request.accent, "com.au");
        }
    }

    #[tokio::test]
    async fn test_progress_reported_per_chunk() {
        let provider = Arc::new(MockProvider::always_succeeds(2048));
        let pipeline = pipeline(&provider, byte_codec());

        let mut seen = Vec::new();
        pipeline
            .run_with_progress(&nine_thousand_chars(), "en", Gender::Male, 4000, |p| {
                seen.push((p.completed, p.total))
            })
            .await
            .unwrap();

        assert_eq!(seen, vec![(1, 3), (2, 3), (3, 3)]);
    }

    #[tokio::test]
    async fn test_preview_truncates_long_text() {
        let provider = Arc::new(MockProvider::always_succeeds(2048));
        let pipeline = pipeline(&provider, byte_codec());

        let text = nine_thousand_chars();
        pipeline.preview(&text, "en", Gender::Male).await.unwrap();

        let requests = provider.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].text, preview_text(&text, 1500));
        assert!(requests[0].text.ends_with("z. ... [preview truncated]"));
    }

    #[test]
    fn test_preview_text_short_unchanged() {
        assert_eq!(preview_text("Short text.", 1500), "Short text.");
    }

    #[test]
    fn test_preview_text_drops_whitespace_at_cut() {
        assert_eq!(preview_text("One two three", 4), "One ... [preview truncated]");
    }

    #[test]
    fn test_preview_text_counts_characters() {
        assert_eq!(preview_text("ééééé", 3), "ééé ... [preview truncated]");
    }
}
