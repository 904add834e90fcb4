use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(name = "maskflow", version)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Simulate up to a frame and write it as a PNG.
    Frame(FrameArgs),
    /// Render a numbered PNG sequence.
    Render(RenderArgs),
}

#[derive(Parser, Debug)]
struct FrameArgs {
    /// Scene config JSON. Image paths resolve relative to its directory.
    #[arg(long)]
    config: PathBuf,

    /// Frame index (0-based); the scene is stepped once per frame up to and including it.
    #[arg(long, default_value_t = 0)]
    frame: u64,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    /// Override the config's progress.
    #[arg(long)]
    progress: Option<f32>,

    /// Override the config's seed.
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Scene config JSON. Image paths resolve relative to its directory.
    #[arg(long)]
    config: PathBuf,

    /// Number of frames to render.
    #[arg(long)]
    frames: u64,

    /// Output directory for `frame_NNNNN.png` files.
    #[arg(long)]
    out_dir: PathBuf,

    /// Fade progress in from 0 to 1 over this many frames.
    #[arg(long)]
    ramp_frames: Option<u64>,

    /// Easing of the progress fade.
    #[arg(long, value_enum, default_value_t = EaseChoice::InOutCubic)]
    ease: EaseChoice,

    /// Override the config's seed.
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum EaseChoice {
    Linear,
    InQuad,
    OutQuad,
    InOutQuad,
    InCubic,
    OutCubic,
    InOutCubic,
}

impl From<EaseChoice> for maskflow::Ease {
    fn from(e: EaseChoice) -> Self {
        match e {
            EaseChoice::Linear => Self::Linear,
            EaseChoice::InQuad => Self::InQuad,
            EaseChoice::OutQuad => Self::OutQuad,
            EaseChoice::InOutQuad => Self::InOutQuad,
            EaseChoice::InCubic => Self::InCubic,
            EaseChoice::OutCubic => Self::OutCubic,
            EaseChoice::InOutCubic => Self::InOutCubic,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.cmd {
        Command::Frame(args) => cmd_frame(args),
        Command::Render(args) => cmd_render(args),
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        _ => tracing::Level::DEBUG,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn load_scene(config_path: &Path, seed: Option<u64>) -> anyhow::Result<maskflow::Scene> {
    let mut config = maskflow::SceneConfig::from_path(config_path)
        .with_context(|| format!("load scene config '{}'", config_path.display()))?;
    if seed.is_some() {
        config.seed = seed;
    }
    let assets_root = config_path.parent().unwrap_or_else(|| Path::new("."));
    let mut assets = maskflow::AssetStore::new(assets_root);
    Ok(maskflow::Scene::load(config, &mut assets)?)
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let mut scene = load_scene(&args.config, args.seed)?;
    if let Some(p) = args.progress {
        scene.set_progress(p)?;
    }

    let dt = scene.config().fps.frame_duration_secs();
    let mut frame = scene.tick(dt)?;
    for _ in 0..args.frame {
        frame = scene.tick(dt)?;
    }

    if let Some(parent) = args.out.parent() {
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

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let mut scene = load_scene(&args.config, args.seed)?;
    let fps = scene.config().fps;
    let ramp = args
        .ramp_frames
        .map(|n| maskflow::ProgressRamp::fade_in(n, args.ease.into()));

    let mut sink = maskflow::PngSequenceSink::new(&args.out_dir);
    scene.render_range(args.frames, fps, &mut sink, ramp.as_ref())?;

    eprintln!(
        "wrote {} frames to {}",
        sink.written().len(),
        args.out_dir.display()
    );
    Ok(())
}
