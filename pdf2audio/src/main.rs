//! pdf2audio - Convert extracted document text to a single MP3

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use pdf2audio::{AudioArtifact, Config, Gender, Language, Pipeline};
use std::io::Read;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "pdf2audio")]
#[command(about = "Convert extracted document text to a single MP3 using text-to-speech", long_about = None)]
#[command(version)]
struct Args {
    /// Text file to read, or "-" for stdin
    input: Option<PathBuf>,

    /// Output file path (default: pdf2audio_<timestamp>.mp3)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Language code (en, es, fr, de, it, pt, zh, ja, ko, hi, ru)
    #[arg(short, long)]
    language: Option<String>,

    /// Voice gender
    #[arg(short, long, value_enum)]
    gender: Option<Gender>,

    /// Maximum characters per synthesis request
    #[arg(long)]
    max_chunk_length: Option<usize>,

    /// Only convert the beginning of the text
    #[arg(long)]
    preview: bool,

    /// Enable debug output
    #[arg(short, long, default_value_t = false)]
    debug: bool,

    /// Subcommands
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// Show current configuration
    Show,
    /// Set default language
    SetLanguage {
        /// Language code
        code: String,
    },
    /// Set default voice gender
    SetGender {
        #[arg(value_enum)]
        gender: Gender,
    },
    /// Set maximum characters per synthesis request
    SetMaxChunkLength {
        value: usize,
    },
    /// Set the FFmpeg executable used to merge audio
    SetFfmpeg {
        /// Path to ffmpeg
        path: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let default_filter = if args.debug { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    if let Some(Commands::Config { action }) = &args.command {
        return handle_config_command(action);
    }

    let input = args.input.clone().ok_or_else(|| {
        anyhow::anyhow!("Input file is required. Run 'pdf2audio --help' for usage.")
    })?;

    let config = Config::load().context("Failed to load configuration")?;
    let text = read_input(&input, config.max_input_bytes)?;

    let language = args.language.clone().unwrap_or_else(|| config.language.clone());
    let gender = args.gender.unwrap_or(config.gender);
    let max_chunk_length = args.max_chunk_length.unwrap_or(config.max_chunk_length);

    let output_path = args.output.clone().unwrap_or_else(|| {
        PathBuf::from(AudioArtifact::suggested_filename(
            gender,
            chrono::Local::now().naive_local(),
        ))
    });

    if args.debug {
        eprintln!("Input: {}", input.display());
        eprintln!("Output: {}", output_path.display());
        eprintln!("Language: {} | Gender: {}", language, gender);
        eprintln!("Max chunk length: {}", max_chunk_length);
    }

    let pipeline = Pipeline::from_config(config)?;
    if !pipeline.has_codec() {
        eprintln!("ffmpeg not found; long texts will be joined without decoding (may have gaps)");
    }

    let artifact = if args.preview {
        eprintln!("Generating preview...");
        pipeline.preview(&text, &language, gender).await
    } else {
        let pb = ProgressBar::new(0);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} chunks ({eta})")
                .context("Invalid progress template")?
                .progress_chars("#>-"),
        );

        let result = pipeline
            .run_with_progress(&text, &language, gender, max_chunk_length, |progress| {
                pb.set_length(progress.total as u64);
                pb.set_position(progress.completed as u64);
            })
            .await;

        pb.finish_and_clear();
        result
    };

    let artifact = artifact.map_err(|e| anyhow::anyhow!("{}: {}", e.kind(), e))?;

    std::fs::write(&output_path, artifact.bytes())
        .with_context(|| format!("Failed to write {}", output_path.display()))?;

    let size_kb = artifact.len() as f64 / 1024.0;
    eprintln!("Output: {} ({:.1} KB)", output_path.display(), size_kb);

    Ok(())
}

/// Read text from a file or stdin, refusing anything over `max_bytes`.
fn read_input(input: &Path, max_bytes: u64) -> Result<String> {
    let mut bytes = Vec::new();

    if input == Path::new("-") {
        std::io::stdin()
            .take(max_bytes + 1)
            .read_to_end(&mut bytes)
            .context("Failed to read stdin")?;
    } else {
        let metadata = std::fs::metadata(input)
            .with_context(|| format!("Input file not found: {}", input.display()))?;
        if metadata.len() > max_bytes {
            anyhow::bail!("File too large (max {} MB)", max_bytes / (1024 * 1024));
        }
        bytes = std::fs::read(input)
            .with_context(|| format!("Failed to read {}", input.display()))?;
    }

    if bytes.len() as u64 > max_bytes {
        anyhow::bail!("Input too large (max {} MB)", max_bytes / (1024 * 1024));
    }

    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

fn handle_config_command(action: &ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let config = Config::load()?;
            println!("Configuration file: {:?}", Config::config_path()?);
            println!();
            println!("language = \"{}\"", config.language);
            println!("gender = \"{}\"", config.gender);
            println!("max_chunk_length = {}", config.max_chunk_length);
            println!("min_text_length = {}", config.min_text_length);
            println!("min_output_bytes = {}", config.min_output_bytes);
            println!("preview_chars = {}", config.preview_chars);
            println!("max_input_bytes = {}", config.max_input_bytes);
            println!("request_timeout_secs = {}", config.request_timeout_secs);
            if let Some(path) = &config.ffmpeg_path {
                println!("ffmpeg_path = \"{}\"", path.display());
            } else {
                println!("ffmpeg_path = (search PATH)");
            }
        }
        ConfigAction::SetLanguage { code } => {
            let language = Language::from_code(code).ok_or_else(|| {
                anyhow::anyhow!(
                    "Unsupported language '{}'. Supported: {}",
                    code,
                    Language::ALL
                        .iter()
                        .map(|l| l.as_str())
                        .collect::<Vec<_>>()
                        .join(", ")
                )
            })?;
            let mut config = Config::load()?;
            config.language = language.as_str().to_string();
            config.save()?;
            println!("Default language set to: {}", language);
        }
        ConfigAction::SetGender { gender } => {
            let mut config = Config::load()?;
            config.gender = *gender;
            config.save()?;
            println!("Default gender set to: {}", gender);
        }
        ConfigAction::SetMaxChunkLength { value } => {
            if *value == 0 {
                anyhow::bail!("Maximum chunk length must be positive");
            }
            let mut config = Config::load()?;
            config.max_chunk_length = *value;
            config.save()?;
            println!("Default max chunk length set to: {}", value);
        }
        ConfigAction::SetFfmpeg { path } => {
            let mut config = Config::load()?;
            config.ffmpeg_path = Some(path.clone());
            config.save()?;
            println!("FFmpeg path set to: {}", path.display());
        }
    }
    Ok(())
}
