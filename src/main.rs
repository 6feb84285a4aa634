use clap::{Parser, Subcommand};
use metacanvas::config::{self, MetaConfig};
use metacanvas::imaging::{self, RustBackend, TargetSpec};
use metacanvas::process::{self, MediaJob};
use metacanvas::types::AssetClass;
use metacanvas::{inventory, output};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

fn version_string() -> &'static str {
    let hash = env!("METACANVAS_GIT_HASH");
    if hash.is_empty() {
        env!("CARGO_PKG_VERSION")
    } else {
        // Leaked once at startup
        Box::leak(format!("{}@{hash}", env!("CARGO_PKG_VERSION")).into_boxed_str())
    }
}

/// Flags shared by commands that run a batch.
#[derive(clap::Args, Clone)]
struct BatchArgs {
    /// config.toml with target sizes and processing options
    #[arg(long)]
    config: Option<PathBuf>,

    /// Stop starting new items after the first failure
    #[arg(long, overrides_with = "no_fail_fast")]
    fail_fast: bool,

    /// Keep going after failures, even if the config sets fail_fast
    #[arg(long, overrides_with = "fail_fast")]
    no_fail_fast: bool,

    /// Print the final report as JSON instead of text
    #[arg(long)]
    json: bool,
}

impl BatchArgs {
    /// The fail-fast policy after command-line flags; the last flag given wins.
    fn fail_fast(&self, configured: bool) -> bool {
        match (self.fail_fast, self.no_fail_fast) {
            (true, _) => true,
            (_, true) => false,
            _ => configured,
        }
    }
}

#[derive(Parser)]
#[command(name = "metacanvas")]
#[command(about = "Normalize game artwork into fixed-size launcher media")]
#[command(long_about = "\
Normalize game artwork into fixed-size launcher media

Every image comes out as a JPEG of exactly the target size. Sources close to
the target's aspect ratio are scaled and center-cropped; others are shrunk to
fit and placed over a blurred, darkened copy of themselves.

Output layout:

  <game>/meta/
  ├── icon.jpg           # 512x512
  ├── background.jpg     # 1920x1080
  ├── effect.mp3         # copied as-is
  ├── theme.mp3          # copied as-is
  └── screens/
      ├── screen0.jpg    # 1920x1080
      └── screen1.jpg

Run 'metacanvas gen-config' to generate a documented config.toml.")]
#[command(version = version_string())]
struct Cli {
    /// Show debug diagnostics on stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Normalize a single image
    Normalize {
        /// Source image
        source: PathBuf,
        /// Destination JPEG
        dest: PathBuf,
        /// Use the target size of an asset class
        #[arg(long, value_enum, conflicts_with = "size")]
        target: Option<AssetClass>,
        /// Explicit target size, e.g. 1280x720
        #[arg(long, value_parser = TargetSpec::parse)]
        size: Option<TargetSpec>,
        /// config.toml with target sizes
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Build a game's meta/ folder from source files
    Build {
        /// Game directory; media goes to <OUTPUT>/meta
        #[arg(short, long)]
        output: PathBuf,
        /// Icon image (required)
        #[arg(long)]
        icon: Option<PathBuf>,
        /// Background image (required)
        #[arg(long)]
        background: Option<PathBuf>,
        /// Screenshot image, repeat for more (order is kept)
        #[arg(long = "screen")]
        screens: Vec<PathBuf>,
        /// Effect audio
        #[arg(long)]
        effect: Option<PathBuf>,
        /// Theme audio
        #[arg(long)]
        theme: Option<PathBuf>,
        #[command(flatten)]
        batch: BatchArgs,
    },
    /// Re-normalize an existing meta/ folder in place
    Rebuild {
        /// Game directory containing meta/
        dir: PathBuf,
        #[command(flatten)]
        batch: BatchArgs,
    },
    /// List the media found in a game's meta/ folder
    Inspect {
        /// Game directory containing meta/
        dir: PathBuf,
        /// config.toml with target sizes to check against
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Print a stock config.toml with all options documented
    GenConfig,
}

fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Normalize {
            source,
            dest,
            target,
            size,
            config,
        } => {
            let config = load_config(config.as_deref())?;
            let target = match (size, target) {
                (Some(size), _) => size,
                (None, Some(class)) => config.targets.target_for(class),
                (None, None) => config.targets.target_for(AssetClass::Screenshot),
            };
            let strategy = imaging::normalize(&source, target, &dest)?;
            println!(
                "{}",
                output::format_normalized(&dest, &target.to_string(), &strategy.to_string())
            );
        }
        Command::Build {
            output,
            icon,
            background,
            screens,
            effect,
            theme,
            batch,
        } => {
            let mut job = MediaJob {
                icon,
                background,
                effect,
                theme,
                ..MediaJob::default()
            };
            for screen in screens {
                job.add_screen(screen);
            }
            return run_batch(&job, &output, &batch);
        }
        Command::Rebuild { dir, batch } => {
            let job = inventory::inspect(&dir)?.into_job();
            return run_batch(&job, &dir, &batch);
        }
        Command::Inspect { dir, config } => {
            let config = load_config(config.as_deref())?;
            let found = inventory::inspect(&dir)?;
            let checks = inventory::check_images(&found, &RustBackend::new(), &config.targets);
            output::print_inventory(&found, &checks);
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(ExitCode::SUCCESS)
}

/// Run a batch, streaming progress lines while workers finish.
///
/// Exits unsuccessfully if any item failed or was skipped.
fn run_batch(
    job: &MediaJob,
    output_dir: &Path,
    args: &BatchArgs,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let mut config = load_config(args.config.as_deref())?;
    config.processing.fail_fast = args.fail_fast(config.processing.fail_fast);
    init_thread_pool(&config.processing);

    let (tx, rx) = std::sync::mpsc::channel();
    let printer = std::thread::spawn(move || {
        for event in rx {
            output::print_process_event(&event);
        }
    });
    let result = process::process(job, output_dir, &config, (!args.json).then_some(tx));
    printer.join().map_err(|_| "progress printer panicked")?;
    let report = result?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!();
        output::print_report(&report);
    }

    Ok(if report.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// Stock defaults, overlaid with `path` when given.
fn load_config(path: Option<&Path>) -> Result<MetaConfig, config::ConfigError> {
    match path {
        Some(path) => config::load_config(path),
        None => config::resolve_config(None),
    }
}

/// Initialize the rayon thread pool based on processing config.
///
/// Caps at the number of available CPU cores. Users can constrain down, not up.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}

/// Diagnostics go to stderr so stdout stays clean for reports.
fn init_tracing(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
