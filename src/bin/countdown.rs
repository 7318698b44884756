use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};
use countdown_render::{
    Canvas, ExportPipeline, FfmpegEncoderOpts, FfmpegMp4Backend, FontBook, FsVideoSaver,
    InMemoryBackend, MediaBackend, VisualConfig, render_still,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "countdown", version)]
struct Cli {
    /// Log more (`-v` debug, `-vv` trace). `RUST_LOG` takes precedence.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render the countdown video (H.264 MP4 requires `ffmpeg` on PATH).
    Render(RenderArgs),
    /// Render a single frame showing a given number of seconds as a PNG.
    Frame(FrameArgs),
    /// Write the default configuration as JSON.
    Init(InitArgs),
}

#[derive(Parser, Debug)]
struct SurfaceArgs {
    /// Countdown configuration JSON. Defaults apply when omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output width in pixels.
    #[arg(long, default_value_t = 1920)]
    width: u32,

    /// Output height in pixels.
    #[arg(long, default_value_t = 1080)]
    height: u32,

    /// Extra directory to load fonts from (repeatable).
    #[arg(long = "font-dir")]
    font_dirs: Vec<PathBuf>,
}

#[derive(Parser, Debug)]
struct RenderArgs {
    #[command(flatten)]
    surface: SurfaceArgs,

    /// Output video path.
    #[arg(long)]
    out: PathBuf,

    /// Override the configured frame rate.
    #[arg(long)]
    fps: Option<u32>,

    /// Override the configured bitrate (Mbps).
    #[arg(long)]
    bitrate_mbps: Option<u32>,

    /// Encoder/container backend.
    #[arg(long, value_enum, default_value_t = BackendChoice::Ffmpeg)]
    backend: BackendChoice,

    /// x264 speed preset (ffmpeg backend only).
    #[arg(long, default_value = "veryfast")]
    preset: String,
}

#[derive(Parser, Debug)]
struct FrameArgs {
    #[command(flatten)]
    surface: SurfaceArgs,

    /// Remaining seconds shown on the frame.
    #[arg(long)]
    second: u64,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct InitArgs {
    /// Output JSON path.
    #[arg(long)]
    out: PathBuf,

    /// Overwrite an existing file.
    #[arg(long, default_value_t = false)]
    force: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum BackendChoice {
    /// H.264 via ffmpeg, muxed to MP4.
    Ffmpeg,
    /// Raw frames in a length-prefixed container (no external tools).
    Memory,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    match cli.cmd {
        Command::Render(args) => cmd_render(args),
        Command::Frame(args) => cmd_frame(args),
        Command::Init(args) => cmd_init(args),
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn,countdown_render=info",
        1 => "countdown_render=debug",
        _ => "countdown_render=trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn load_config(path: Option<&Path>) -> anyhow::Result<VisualConfig> {
    let Some(path) = path else {
        return Ok(VisualConfig::default());
    };
    VisualConfig::from_path(path).with_context(|| format!("load config '{}'", path.display()))
}

fn font_book(dirs: &[PathBuf]) -> FontBook {
    FontBook::with_font_dirs(dirs.iter().map(PathBuf::as_path))
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let mut config = load_config(args.surface.config.as_deref())?;
    if let Some(fps) = args.fps {
        config.fps = fps;
    }
    if let Some(mbps) = args.bitrate_mbps {
        config.bitrate_mbps = mbps;
    }

    let backend: Box<dyn MediaBackend> = match args.backend {
        BackendChoice::Ffmpeg => Box::new(FfmpegMp4Backend {
            opts: FfmpegEncoderOpts {
                preset: args.preset,
                ..FfmpegEncoderOpts::default()
            },
        }),
        BackendChoice::Memory => Box::new(InMemoryBackend),
    };
    let canvas = Canvas::new(args.surface.width, args.surface.height);
    let mut pipeline = ExportPipeline::new(backend, font_book(&args.surface.font_dirs));

    let mut last = None;
    let output = pipeline
        .export(&config, canvas, &mut |pct| {
            if last != Some(pct) {
                last = Some(pct);
                eprint!("\rrendering {pct:>3}%");
            }
        })
        .map_err(|e| anyhow::anyhow!(e.user_message()))?;
    eprintln!();

    output
        .save_to(&FsVideoSaver, &args.out)
        .map_err(|e| anyhow::anyhow!(e.user_message()))?;

    eprintln!(
        "wrote {} ({} frames, {:.1}s, {} bytes)",
        args.out.display(),
        output.frame_count,
        output.duration_secs,
        output.bytes.len()
    );
    Ok(())
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let config = load_config(args.surface.config.as_deref())?;
    config.validate()?;
    let canvas = Canvas::new(args.surface.width, args.surface.height);
    let frame = render_still(
        &config,
        canvas,
        args.second,
        &font_book(&args.surface.font_dirs),
    )?;

    if let Some(parent) = args.out.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }

    image::save_buffer_with_format(
        &args.out,
        &frame.to_straight_rgba8(),
        frame.width,
        frame.height,
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", args.out.display()))?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_init(args: InitArgs) -> anyhow::Result<()> {
    if args.out.exists() && !args.force {
        anyhow::bail!(
            "'{}' already exists (pass --force to overwrite)",
            args.out.display()
        );
    }
    let json = VisualConfig::default().to_json_pretty()?;
    std::fs::write(&args.out, json + "\n")
        .with_context(|| format!("write config '{}'", args.out.display()))?;
    eprintln!("wrote {}", args.out.display());
    Ok(())
}
