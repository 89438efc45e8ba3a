// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError, info};

use subtrans::app_config::{Config, find_config};
use subtrans::providers::create_translator;
use subtrans::translation::{parse_from_index, translate_file, translate_file_from_index};

/// CLI wrapper for log levels to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<&CliLogLevel> for LevelFilter {
    fn from(cli_level: &CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => LevelFilter::Error,
            CliLogLevel::Warn => LevelFilter::Warn,
            CliLogLevel::Info => LevelFilter::Info,
            CliLogLevel::Debug => LevelFilter::Debug,
            CliLogLevel::Trace => LevelFilter::Trace,
        }
    }
}

/// subtrans - translate subtitle files with LLM providers
///
/// Reads an SRT file, translates its text in size-bounded batches and writes
/// the translated SRT. A failed run keeps its partial progress; resume it
/// with --from using the address printed in the error.
#[derive(Parser, Debug)]
#[command(name = "subtrans")]
#[command(version = "0.1.0")]
#[command(about = "LLM-backed subtitle translation")]
#[command(long_about = "subtrans translates SRT subtitle files using configurable LLM providers.

EXAMPLES:
    subtrans -i movie.srt -o movie.es.srt                 # Translate using default config
    subtrans -i movie.srt -o movie.es.srt --target-lang es
    subtrans -i movie.srt -o movie.es.srt --llm gemini    # Use a named provider
    subtrans -i movie.srt -o movie.es.srt --from 42,0,0   # Resume a failed run
    subtrans -i movie.srt -o movie.es.srt --dry-run       # No API calls

CONFIGURATION:
    Configuration is read from the --config path, ./subtrans.json, or
    <config dir>/subtrans/config.json, in that order.

SUPPORTED PROVIDERS:
    openai - any OpenAI-compatible chat-completions server (requires API key)
    gemini - Google Gemini API (requires API key)")]
struct CommandLineOptions {
    /// Input subtitle file
    #[arg(short, long)]
    input: PathBuf,

    /// Output subtitle file
    #[arg(short, long)]
    output: PathBuf,

    /// Target language, overriding the configured one
    #[arg(long)]
    target_lang: Option<String>,

    /// Configuration file path
    #[arg(short, long)]
    config_path: Option<String>,

    /// Resume from a unit address (item,line,seg)
    #[arg(long, value_name = "ITEM,LINE,SEG")]
    from: Option<String>,

    /// Prompt key from config
    #[arg(long, default_value = "default")]
    prompt: String,

    /// LLM provider to use
    #[arg(long, default_value = "default")]
    llm: String,

    /// Dry run without making API calls
    #[arg(long)]
    dry_run: bool,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        let logger = Box::new(CustomLogger::new(level));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI color code for log level
    fn color_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "\x1B[1;31m",
            Level::Warn => "\x1B[1;33m",
            Level::Info => "\x1B[1;32m",
            Level::Debug => "\x1B[1;36m",
            Level::Trace => "\x1B[1;35m",
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S%.3f");
            let color = Self::color_for_level(record.level());

            let mut stderr = std::io::stderr();
            let _ = writeln!(stderr, "{}{} {}\x1B[0m", color, now, record.args());
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize the logger once with info level by default;
    // the level is raised or lowered once CLI options are known
    CustomLogger::init(LevelFilter::Trace)?;
    log::set_max_level(LevelFilter::Info);

    let cli = CommandLineOptions::parse();

    if let Some(level) = &cli.log_level {
        log::set_max_level(level.into());
    }

    info!("input file: {}", cli.input.display());
    info!("output file: {}", cli.output.display());

    let config_path = find_config(cli.config_path.as_deref()).context("Error finding config file")?;
    info!("config file: {}", config_path.display());

    let mut config = Config::from_file(&config_path).context("Error reading config file")?;
    if let Some(target_lang) = &cli.target_lang {
        // overwrite target language
        config.target_lang = target_lang.clone();
    }
    info!("target lang: {}", config.target_lang);
    info!("LLM provider: {}", cli.llm);

    let from_index = cli
        .from
        .as_deref()
        .map(parse_from_index)
        .transpose()
        .context("Error parsing from index")?;

    let translator = create_translator(&config, &cli.prompt, &cli.llm, cli.dry_run)
        .context("Error creating translator")?;

    info!("dry run: {}", cli.dry_run);

    let translated = match from_index {
        Some((item, line, seg)) => {
            info!("resuming from index: {},{},{}", item, line, seg);
            translate_file_from_index(&cli.input, &cli.output, translator.as_ref(), item, line, seg)
                .await
                .context("Error translating file")?
        }
        None => translate_file(&cli.input, &cli.output, translator.as_ref())
            .await
            .context("Error translating file")?,
    };

    info!("Translation completed: {} units translated", translated);
    Ok(())
}
