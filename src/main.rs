use clap::Parser;
use picture_shrinker::imaging::{OutputFormat, ResizeMode, ShrinkConfig};
use picture_shrinker::{config, output, process};
use std::path::PathBuf;
use std::process::ExitCode;

/// Exactly one resize rule per run.
#[derive(clap::Args)]
#[group(required = true, multiple = false)]
struct SizeArgs {
    /// Set the greater side to SIZE pixels
    #[arg(long, value_name = "SIZE", value_parser = clap::value_parser!(u32).range(1..))]
    greater: Option<u32>,

    /// Set the lesser side to SIZE pixels
    #[arg(long, value_name = "SIZE", value_parser = clap::value_parser!(u32).range(1..))]
    lesser: Option<u32>,

    /// Scale both sides by FACTOR
    #[arg(long, value_name = "FACTOR", value_parser = parse_multiplier)]
    multiplier: Option<f64>,
}

impl SizeArgs {
    fn mode(&self) -> Option<ResizeMode> {
        self.greater
            .map(ResizeMode::GreaterSize)
            .or(self.lesser.map(ResizeMode::LesserSize))
            .or(self.multiplier.map(ResizeMode::Multiplier))
    }
}

fn parse_multiplier(s: &str) -> Result<f64, String> {
    let factor: f64 = s
        .parse()
        .map_err(|_| format!("'{s}' is not a number"))?;
    if factor.is_finite() && factor > 0.0 {
        Ok(factor)
    } else {
        Err(format!("multiplier must be a positive number, got {s}"))
    }
}

#[derive(Parser)]
#[command(name = "picture-shrinker")]
#[command(about = "Batch resize pictures into a mirrored output tree")]
#[command(long_about = "\
Batch resize pictures into a mirrored output tree

Every picture under PATH is resized by one rule and written at the same
relative position under the output root. Other files are copied unchanged.
The input tree is never modified.

  photos/                     _resized_pictures/
  ├── 2023/                   ├── 2023/
  │   ├── beach.JPG    →      │   ├── beach.jpg      (resized)
  │   └── notes.txt    →      │   └── notes.txt      (copied)
  └── cover.png        →      └── cover.jpg          (resized)

Pictures: jpg, jpe, jpeg, png, webp, tif (any case).

Settings are read from picture-shrinker.toml in the working directory when
present; flags override the file.")]
#[command(version)]
struct Cli {
    /// Picture file or directory to shrink
    path: PathBuf,

    #[command(flatten)]
    size: SizeArgs,

    /// Output root [default: _resized_pictures]
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Config file (instead of ./picture-shrinker.toml)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Output format: jpeg, png or webp [default: jpeg]
    #[arg(long, value_parser = parse_format)]
    format: Option<OutputFormat>,

    /// JPEG quality, 1-100 [default: 90]
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..=100))]
    quality: Option<u32>,

    /// Maximum number of worker threads
    #[arg(long, value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..))]
    jobs: Option<usize>,

    /// Keep pictures that are already smaller than the target at their size
    #[arg(long)]
    no_upscale: bool,

    /// Exit with status 1 if any file failed
    #[arg(long)]
    strict: bool,
}

fn parse_format(s: &str) -> Result<OutputFormat, String> {
    s.parse()
}

impl Cli {
    /// Apply flag overrides on top of the file configuration.
    fn apply(&self, config: &mut config::ShrinkerConfig) {
        if let Some(root) = &self.output {
            config.output.root = root.clone();
        }
        if let Some(format) = self.format {
            config.output.format = format;
        }
        if let Some(quality) = self.quality {
            config.output.quality = quality;
        }
        if let Some(jobs) = self.jobs {
            config.processing.max_processes = Some(jobs);
        }
        if self.no_upscale {
            config.resize.upscale = false;
        }
    }
}

fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let mode = cli.size.mode().ok_or("one of --greater, --lesser or --multiplier is required")?;

    let working_dir = std::env::current_dir()?;
    let mut settings = config::load_config(cli.config.as_deref(), &working_dir)?;
    cli.apply(&mut settings);
    settings.validate()?;

    init_thread_pool(&settings.processing);

    let run = process::RunConfig {
        input: cli.path.clone(),
        output_root: settings.output.root.clone(),
        shrink: ShrinkConfig {
            mode,
            format: settings.output.format,
            quality: settings.output.quality(),
            upscale: settings.resize.upscale,
        },
    };

    let (tx, rx) = std::sync::mpsc::channel();
    let printer = std::thread::spawn(move || {
        for event in rx {
            output::print_process_event(&event);
        }
    });
    let result = process::process(&run, Some(tx));
    printer
        .join()
        .map_err(|_| "progress printer thread panicked")?;
    let result = result?;

    output::print_summary(&result);

    if cli.strict && result.has_failures() {
        Ok(ExitCode::FAILURE)
    } else {
        Ok(ExitCode::SUCCESS)
    }
}

/// Initialize the rayon thread pool based on processing config.
///
/// Caps at the number of available CPU cores: the user can constrain down, not up.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}
