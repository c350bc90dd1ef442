use clap::{Parser, Subcommand};
use pixbatch::config::{self, ProcessingConfig};
use pixbatch::output;
use pixbatch::process::BatchRunner;
use pixbatch::scan::{self, ScanOptions};
use pixbatch::types::ImageTask;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Exit code for a run that finished with at least one failed image.
const EXIT_ITEMS_FAILED: u8 = 2;

/// Environment variable holding the log filter (`tracing` EnvFilter syntax).
const LOG_ENV: &str = "PIXBATCH_LOG";

/// Selection and per-run overrides shared by `run` and `check`.
#[derive(clap::Args, Clone)]
struct BatchArgs {
    /// Image files and/or directories to process
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Output format: original, jpeg, png, webp or bmp
    #[arg(long)]
    format: Option<String>,

    /// Quality for JPEG and WebP output (1-100)
    #[arg(long)]
    quality: Option<u32>,

    /// Target width in pixels
    #[arg(long)]
    width: Option<u32>,

    /// Target height in pixels
    #[arg(long)]
    height: Option<u32>,

    /// Resize to exactly width x height instead of fitting inside
    #[arg(long)]
    stretch: bool,

    /// Output directory (created if missing)
    #[arg(long)]
    output: Option<PathBuf>,

    /// Suffix appended to each output file stem
    #[arg(long)]
    suffix: Option<String>,

    /// Descend into subdirectories of directory inputs
    #[arg(long)]
    recursive: bool,
}

impl BatchArgs {
    /// Flags that were given, as a TOML layer shaped like `pixbatch.toml`.
    fn flag_layer(&self) -> toml::Value {
        let mut output = toml::Table::new();
        if let Some(format) = &self.format {
            output.insert("format".into(), toml::Value::String(format.clone()));
        }
        if let Some(quality) = self.quality {
            output.insert("quality".into(), toml::Value::Integer(i64::from(quality)));
        }
        if let Some(dir) = &self.output {
            output.insert(
                "directory".into(),
                toml::Value::String(dir.to_string_lossy().into_owned()),
            );
        }
        if let Some(suffix) = &self.suffix {
            output.insert("suffix".into(), toml::Value::String(suffix.clone()));
        }

        let mut resize = toml::Table::new();
        if let Some(width) = self.width {
            resize.insert("width".into(), toml::Value::Integer(i64::from(width)));
        }
        if let Some(height) = self.height {
            resize.insert("height".into(), toml::Value::Integer(i64::from(height)));
        }
        if self.stretch {
            resize.insert("keep_aspect_ratio".into(), toml::Value::Boolean(false));
        }

        let mut layer = toml::Table::new();
        layer.insert("output".into(), toml::Value::Table(output));
        layer.insert("resize".into(), toml::Value::Table(resize));
        toml::Value::Table(layer)
    }
}

#[derive(Parser)]
#[command(name = "pixbatch")]
#[command(about = "Batch resize and convert images")]
#[command(long_about = "\
Batch resize and convert images

Every selected image is decoded, resized to fit inside (or stretched to) the
target size, converted to the output format, and written to the output
directory as <name><suffix>.<ext>. A broken image is reported and skipped;
the rest of the batch still runs.

Settings are layered, later layers winning:
  stock defaults → pixbatch.toml (or --config) → command-line flags

Run 'pixbatch gen-config' to generate a documented pixbatch.toml.")]
#[command(version)]
struct Cli {
    /// Config file (default: ./pixbatch.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log per-image details to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Process a batch of images
    Run {
        #[command(flatten)]
        batch: BatchArgs,

        /// Also write the per-image results as JSON
        #[arg(long)]
        summary_json: Option<PathBuf>,
    },
    /// Show resolved settings and the selected images without processing
    Check(BatchArgs),
    /// Print a stock pixbatch.toml with all options documented
    GenConfig,
}

fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Run {
            batch,
            summary_json,
        } => {
            let (tasks, config) = prepare(cli.config.as_deref(), &batch)?;

            let (tx, rx) = std::sync::mpsc::channel();
            let printer = std::thread::spawn(move || {
                for event in rx {
                    for line in output::format_progress_event(&event) {
                        println!("{}", line);
                    }
                }
            });

            let runner = BatchRunner::new();
            let handle = runner.start(tasks, config, Some(tx))?;
            let summary = handle.join()?;
            printer
                .join()
                .map_err(|_| "progress printer thread panicked")?;

            output::print_summary(&summary);
            if let Some(path) = summary_json {
                let json = serde_json::to_string_pretty(&summary)?;
                std::fs::write(&path, json)?;
            }

            if summary.is_complete_success() {
                Ok(ExitCode::SUCCESS)
            } else {
                Ok(ExitCode::from(EXIT_ITEMS_FAILED))
            }
        }
        Command::Check(batch) => {
            let (tasks, config) = prepare(cli.config.as_deref(), &batch)?;
            output::print_plan(&tasks, &config);
            Ok(ExitCode::SUCCESS)
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Resolve layered settings and expand the selection.
fn prepare(
    config_path: Option<&Path>,
    batch: &BatchArgs,
) -> Result<(Vec<ImageTask>, ProcessingConfig), Box<dyn std::error::Error>> {
    let cwd = std::env::current_dir()?;
    let file_layer = config::find_config_layer(config_path, &cwd)?;
    let settings = config::resolve_settings(file_layer.into_iter().chain([batch.flag_layer()]))?;
    let config = settings.resolve()?;

    let options = ScanOptions {
        recursive: batch.recursive,
        skip_suffix: config.suffix.clone(),
    };
    let tasks = scan::collect_tasks(&batch.inputs, &options)?;
    Ok((tasks, config))
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
