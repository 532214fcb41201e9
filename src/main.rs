use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use flexi_logger::Logger;
use roadsign_cv::{DetectionConfig, Result};
use std::path::PathBuf;

mod runner;

#[derive(Parser)]
#[command(name = "roadsign")]
#[command(about = "Extract road-sign regions from a frame and classify them against templates")]
#[command(version)]
struct Cli {
    /// Log level, e.g. `info` or `debug,roadsign_cv::merge=trace`.
    /// `RUST_LOG` takes precedence when set.
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Detect and classify signs in one frame.
    Detect(DetectArgs),

    /// Write the default configuration as JSON.
    DefaultConfig {
        /// Destination file.
        #[arg(long)]
        out: PathBuf,
    },
}

#[derive(Debug, Clone, Args)]
struct DetectArgs {
    /// Input frame (PNG, JPEG, BMP, ...).
    #[arg(long)]
    frame: PathBuf,

    /// Template directory; may be repeated. Overrides `template_dirs` of the config.
    #[arg(long = "templates")]
    templates: Vec<PathBuf>,

    /// JSON configuration file; defaults are used when omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Path to write detection results (JSON).
    #[arg(long)]
    out: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let _logger = Logger::try_with_env_or_str(&cli.log_level)
        .context("Invalid log level")?
        .start()
        .context("Logger initialization failed")?;

    match cli.command {
        Commands::Detect(args) => {
            let mut config = match &args.config {
                Some(path) => DetectionConfig::from_file(path)?,
                None => DetectionConfig::default(),
            };
            if !args.templates.is_empty() {
                config.template_dirs = args.templates;
            }
            runner::run_detection(&args.frame, config, args.out.as_deref())
        }
        Commands::DefaultConfig { out } => DetectionConfig::default().to_file(out),
    }
}
