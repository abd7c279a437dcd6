// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result, anyhow};
use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate};
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError, info};
use std::io::Write;
use std::path::PathBuf;

use script_aligner::app_config::{Config, EmbeddingProvider, LogLevel};
use script_aligner::app_controller::{AlignOptions, Controller};

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => LogLevel::Error,
            CliLogLevel::Warn => LogLevel::Warn,
            CliLogLevel::Info => LogLevel::Info,
            CliLogLevel::Debug => LogLevel::Debug,
            CliLogLevel::Trace => LogLevel::Trace,
        }
    }
}

/// CLI Wrapper for EmbeddingProvider to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliEmbeddingProvider {
    Ollama,
    Hashing,
}

impl From<CliEmbeddingProvider> for EmbeddingProvider {
    fn from(cli_provider: CliEmbeddingProvider) -> Self {
        match cli_provider {
            CliEmbeddingProvider::Ollama => EmbeddingProvider::Ollama,
            CliEmbeddingProvider::Hashing => EmbeddingProvider::Hashing,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Align a subtitle file with a screenplay
    Align(AlignArgs),

    /// Align every <stem>.srt / <stem>.txt pair in a directory
    Batch {
        /// Directory to scan recursively
        #[arg(value_name = "DIR")]
        input_dir: PathBuf,

        /// Embedding provider to use
        #[arg(short, long, value_enum)]
        provider: Option<CliEmbeddingProvider>,

        /// Score lexically only
        #[arg(long)]
        no_embeddings: bool,
    },

    /// Generate shell completions for script-aligner
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Args, Debug)]
struct AlignArgs {
    /// Subtitle file (SRT)
    #[arg(value_name = "INPUT_SRT")]
    input_srt: PathBuf,

    /// Screenplay file (plain text)
    #[arg(value_name = "INPUT_SCRIPT")]
    input_script: PathBuf,

    /// HTML alignment report
    #[arg(short, long, default_value = "output.html")]
    output: PathBuf,

    /// Write the parsed screenplay events, with timings, as JSON
    #[arg(long, value_name = "PATH")]
    save_script_blocks: Option<PathBuf>,

    /// Write the timed script lines as JSON
    #[arg(long, value_name = "PATH")]
    timed_output: Option<PathBuf>,

    /// Write the timed script lines as SRT
    #[arg(long, value_name = "PATH")]
    srt_output: Option<PathBuf>,

    /// Left tolerance for script alignment (auto-detected when unset)
    #[arg(long)]
    script_ltol: Option<usize>,

    /// Right tolerance for script alignment
    #[arg(long)]
    script_rtol: Option<usize>,

    /// Tolerance for the left tolerance auto-detection
    #[arg(long)]
    auto_aligner_tolerance: Option<f64>,

    /// Embedding provider to use
    #[arg(short, long, value_enum)]
    provider: Option<CliEmbeddingProvider>,

    /// Score lexically only
    #[arg(long)]
    no_embeddings: bool,
}

/// script-aligner - timestamps for screenplay dialogue
///
/// Aligns the dialogue of a screenplay with the subtitle track of the
/// matching video and estimates a start and end time for every line.
#[derive(Parser, Debug)]
#[command(name = "script-aligner")]
#[command(version)]
#[command(about = "Align screenplay dialogue with subtitle timings")]
#[command(long_about = "script-aligner matches screenplay dialogue against subtitle cues and projects the cue timings onto the script.

EXAMPLES:
    script-aligner align movie.srt movie.txt                        # Write output.html
    script-aligner align movie.srt movie.txt -o report.html --save-script-blocks events.json
    script-aligner align movie.srt movie.txt --no-embeddings        # Lexical scoring only
    script-aligner align movie.srt movie.txt -p hashing --srt-output script.srt
    script-aligner --log-level debug batch /scripts/                # Align every pair in a directory
    script-aligner completions bash > script-aligner.bash           # Generate bash completions

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config. If the config file doesn't exist, a default one
    will be created automatically.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long = "config", global = true, default_value = "conf.json")]
    config_path: PathBuf,

    /// Set logging level
    #[arg(short, long, global = true, value_enum)]
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
        log::set_boxed_logger(Box::new(CustomLogger::new(level)))?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI color and marker for a log level
    fn style_for_level(level: Level) -> (&'static str, &'static str) {
        match level {
            Level::Error => ("1;31", "❌"),
            Level::Warn => ("1;33", "🚧"),
            Level::Info => ("1;32", ""),
            Level::Debug => ("1;36", "🔍"),
            Level::Trace => ("1;35", "📋"),
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let (color, marker) = Self::style_for_level(record.level());
            let _ = writeln!(
                std::io::stderr(),
                "\x1B[{}m{} {} {}\x1B[0m",
                color,
                now,
                marker,
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

fn level_filter(level: &LogLevel) -> LevelFilter {
    match level {
        LogLevel::Error => LevelFilter::Error,
        LogLevel::Warn => LevelFilter::Warn,
        LogLevel::Info => LevelFilter::Info,
        LogLevel::Debug => LevelFilter::Debug,
        LogLevel::Trace => LevelFilter::Trace,
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // The logger accepts everything; the effective level is set through max_level
    CustomLogger::init(LevelFilter::Trace)?;
    log::set_max_level(LevelFilter::Info);

    let cli = CommandLineOptions::parse();

    if let Commands::Completions { shell } = cli.command {
        let mut cmd = CommandLineOptions::command();
        generate(shell, &mut cmd, "script-aligner", &mut std::io::stdout());
        return Ok(());
    }

    if let Some(level) = &cli.log_level {
        log::set_max_level(level_filter(&level.clone().into()));
    }

    let mut config = Config::load_or_create(&cli.config_path)?;
    if let Some(level) = cli.log_level {
        config.log_level = level.into();
    }
    log::set_max_level(level_filter(&config.log_level));

    match cli.command {
        Commands::Align(args) => run_align(config, args).await,
        Commands::Batch {
            input_dir,
            provider,
            no_embeddings,
        } => {
            if let Some(provider) = provider {
                config.embedding.provider = provider.into();
            }
            if no_embeddings {
                config.embedding.enabled = false;
            }
            config
                .validate()
                .context("Configuration validation failed")?;

            let controller = Controller::with_config(config)?;
            let summary = controller.run_batch(&input_dir).await?;
            if summary.failed > 0 {
                return Err(anyhow!(
                    "{} of {} pairs failed to align",
                    summary.failed,
                    summary.failed + summary.succeeded
                ));
            }
            Ok(())
        }
        Commands::Completions { .. } => Ok(()),
    }
}

async fn run_align(mut config: Config, args: AlignArgs) -> Result<()> {
    if let Some(ltol) = args.script_ltol {
        config.script.ltol = Some(ltol);
    }
    if let Some(rtol) = args.script_rtol {
        config.script.rtol = rtol;
    }
    if let Some(tolerance) = args.auto_aligner_tolerance {
        config.script.auto_tolerance = tolerance;
    }
    if let Some(provider) = args.provider {
        config.embedding.provider = provider.into();
    }
    if args.no_embeddings {
        config.embedding.enabled = false;
    }

    config
        .validate()
        .context("Configuration validation failed")?;

    let options = AlignOptions {
        report_path: args.output,
        script_blocks_path: args.save_script_blocks,
        timed_output_path: args.timed_output,
        srt_output_path: args.srt_output,
        use_embeddings: !args.no_embeddings,
    };

    let controller = Controller::with_config(config)?;
    let summary = controller
        .align_files(&args.input_srt, &args.input_script, &options)
        .await?;

    info!(
        "{} script lines, {} subtitles: {} matched, {} interpolated, {} unresolved. Report: {:?}",
        summary.script_lines,
        summary.subtitle_cues,
        summary.matches,
        summary.interpolated,
        summary.unresolved,
        options.report_path
    );

    Ok(())
}
