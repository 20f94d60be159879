use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "dither-overlay", version)]
struct Cli {
    /// Log at debug level (honours RUST_LOG when set).
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Dither one frame of a sprite sheet into a PNG.
    Frame(FrameArgs),
    /// Dither the first N frames of a sprite sheet into numbered PNGs.
    Sheet(SheetArgs),
    /// Follow a template manifest, logging every template update.
    Sync(SyncArgs),
}

#[derive(Args, Debug)]
struct DitherArgs {
    /// Input sprite sheet (PNG).
    #[arg(long = "in")]
    in_path: PathBuf,

    #[arg(long)]
    frame_width: u32,

    #[arg(long)]
    frame_height: u32,

    /// Fraction of pixels to keep, in (0, 1].
    #[arg(long, default_value_t = 1.0)]
    percentage: f64,

    /// Shared jitter seed, in [0, 1).
    #[arg(long, default_value_t = 0.0)]
    randomness: f64,

    #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
    offset_x: i64,

    #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
    offset_y: i64,
}

impl DitherArgs {
    fn params(&self) -> dither_overlay::DitherParams {
        dither_overlay::DitherParams {
            randomness: self.randomness,
            percentage: self.percentage,
            offset_x: self.offset_x,
            offset_y: self.offset_y,
        }
    }
}

#[derive(Args, Debug)]
struct FrameArgs {
    #[command(flatten)]
    dither: DitherArgs,

    /// Frame index (0-based, row-major).
    #[arg(long, default_value_t = 0)]
    index: u32,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Args, Debug)]
struct SheetArgs {
    #[command(flatten)]
    dither: DitherArgs,

    /// Number of frames to render, starting at frame 0.
    #[arg(long)]
    frames: u32,

    /// Directory receiving `frame_0000.png`, `frame_0001.png`, ...
    #[arg(long)]
    out_dir: PathBuf,
}

#[derive(Args, Debug)]
struct SyncArgs {
    /// Starting manifest URL.
    #[arg(long)]
    url: String,

    /// Number of ticks to run before exiting.
    #[arg(long, default_value_t = 10)]
    ticks: u32,

    #[arg(long, default_value_t = 1000)]
    interval_ms: u64,

    /// Registry settings (JSON).
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    match cli.cmd {
        Command::Frame(args) => cmd_frame(args),
        Command::Sheet(args) => cmd_sheet(args),
        Command::Sync(args) => cmd_sync(args),
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn read_sheet(path: &Path) -> anyhow::Result<image::RgbaImage> {
    let img = image::open(path).with_context(|| format!("open image '{}'", path.display()))?;
    Ok(img.to_rgba8())
}

fn write_png(path: &Path, buf: dither_overlay::PixelBuffer) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    buf.into_image()?
        .save_with_format(path, image::ImageFormat::Png)
        .with_context(|| format!("write png '{}'", path.display()))?;
    Ok(())
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let sheet = read_sheet(&args.dither.in_path)?;
    let (fw, fh) = (args.dither.frame_width, args.dither.frame_height);

    let frame = dither_overlay::extract_frame(&sheet, fw, fh, args.index)?;
    let out = dither_overlay::dither(&frame, &args.dither.params(), fw, fh)?;
    tracing::info!(
        kept = out.opaque_pixel_count(),
        of = frame.opaque_pixel_count(),
        "dithered frame {}",
        args.index
    );

    write_png(&args.out, out)?;
    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_sheet(args: SheetArgs) -> anyhow::Result<()> {
    let sheet = read_sheet(&args.dither.in_path)?;
    let frames = dither_overlay::render_sheet(
        &sheet,
        args.dither.frame_width,
        args.dither.frame_height,
        args.frames,
        &args.dither.params(),
    )?;

    for (index, frame) in frames.into_iter().enumerate() {
        write_png(&args.out_dir.join(format!("frame_{index:04}.png")), frame)?;
    }
    eprintln!("wrote {} frames to {}", args.frames, args.out_dir.display());
    Ok(())
}

/// Stand-in template for `sync`: reports what a renderer would be asked to draw.
struct LoggedTemplate {
    index: usize,
    name: String,
    steps: u64,
}

impl dither_overlay::TemplateEntity for LoggedTemplate {
    fn update(&mut self, delta_units: u32, randomness: f64, synced_seconds: f64) {
        self.steps += u64::from(delta_units);
        tracing::debug!(
            index = self.index,
            name = %self.name,
            steps = self.steps,
            randomness,
            synced_seconds,
            "template update"
        );
    }

    fn destroy(&mut self) {
        tracing::info!(index = self.index, name = %self.name, "template destroyed");
    }
}

fn cmd_sync(args: SyncArgs) -> anyhow::Result<()> {
    let config = match &args.config {
        Some(path) => dither_overlay::RegistryConfig::load(path)?,
        None => dither_overlay::RegistryConfig::default(),
    };
    let fetcher =
        dither_overlay::HttpFetcher::new(Duration::from_secs(config.request_timeout_secs))?;
    let factory = |descriptor: dither_overlay::TemplateDescriptor, index: usize| {
        let name = descriptor.name().unwrap_or("unnamed").to_owned();
        tracing::info!(index, %name, "template created");
        LoggedTemplate {
            index,
            name,
            steps: 0,
        }
    };

    let mut registry = dither_overlay::TemplateRegistry::new(
        &args.url,
        config,
        fetcher,
        factory,
        dither_overlay::SystemClock,
    )?;

    for _ in 0..args.ticks {
        std::thread::sleep(Duration::from_millis(args.interval_ms));
        registry.tick();
    }

    eprintln!(
        "{} templates, synced clock {:.3}s ({} samples)",
        registry.template_count(),
        registry.synced_seconds(),
        registry.clock_sync().sample_count()
    );
    Ok(())
}
