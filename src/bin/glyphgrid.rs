use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};

use glyphgrid::{Engine, GridConfig, GridPatch, PixmapSurface, SurfaceSize};

#[derive(Parser, Debug)]
#[command(name = "glyphgrid", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render the animation state at one timestamp as a PNG.
    Frame(FrameArgs),
    /// Render a PNG frame sequence covering a time span.
    Render(RenderArgs),
}

#[derive(Parser, Debug)]
struct CommonArgs {
    /// Monospace font file (TTF/OTF) used for glyph rendering.
    #[arg(long)]
    font: PathBuf,

    /// Optional JSON options file merged over the defaults.
    #[arg(long)]
    options: Option<PathBuf>,

    /// Surface width in pixels.
    #[arg(long, default_value_t = 800)]
    width: u32,

    /// Surface height in pixels.
    #[arg(long, default_value_t = 600)]
    height: u32,

    /// Animation ticks per second.
    #[arg(long, default_value_t = 60)]
    fps: u32,

    /// Seed for deterministic cell/symbol selection.
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Parser, Debug)]
struct FrameArgs {
    #[command(flatten)]
    common: CommonArgs,

    /// Timestamp to advance the animation to, in milliseconds.
    #[arg(long)]
    at_ms: u64,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct RenderArgs {
    #[command(flatten)]
    common: CommonArgs,

    /// Total animation time span, in milliseconds.
    #[arg(long)]
    duration_ms: u64,

    /// Output directory for frame_00000.png, frame_00001.png, ...
    #[arg(long)]
    out_dir: PathBuf,
}

fn main() -> anyhow::Result<()> {
    match Cli::parse().cmd {
        Command::Frame(args) => cmd_frame(args),
        Command::Render(args) => cmd_render(args),
    }
}

fn build_engine(common: &CommonArgs) -> anyhow::Result<(Engine, PixmapSurface)> {
    let mut config = GridConfig::default();
    if let Some(path) = &common.options {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("read options '{}'", path.display()))?;
        let patch: GridPatch = serde_json::from_str(&raw)
            .with_context(|| format!("parse options '{}'", path.display()))?;
        config.apply(&patch);
    }

    let size = SurfaceSize::new(common.width, common.height);
    let engine = match common.seed {
        Some(seed) => Engine::with_seed(size, config, seed)?,
        None => Engine::new(size, config)?,
    };

    let font_bytes = fs::read(&common.font)
        .with_context(|| format!("read font '{}'", common.font.display()))?;
    let surface = PixmapSurface::new(size, font_bytes)?;
    Ok((engine, surface))
}

fn tick_span(
    engine: &mut Engine,
    surface: &mut PixmapSurface,
    until_ms: u64,
    fps: u32,
) -> anyhow::Result<u64> {
    anyhow::ensure!(fps > 0, "fps must be > 0");
    let step = Duration::from_secs_f64(1.0 / f64::from(fps));
    let until = Duration::from_millis(until_ms);

    let mut frames = 0u64;
    let mut t = Duration::ZERO;
    while t <= until {
        engine.tick(t, surface)?;
        frames += 1;
        t += step;
    }
    Ok(frames)
}

fn write_png(surface: &PixmapSurface, size: SurfaceSize, out: &Path) -> anyhow::Result<()> {
    if let Some(parent) = out.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    image::save_buffer_with_format(
        out,
        surface.pixels_rgba8(),
        size.width,
        size.height,
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", out.display()))?;
    Ok(())
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let (mut engine, mut surface) = build_engine(&args.common)?;
    let size = SurfaceSize::new(args.common.width, args.common.height);

    tick_span(&mut engine, &mut surface, args.at_ms, args.common.fps)?;
    write_png(&surface, size, &args.out)?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let (mut engine, mut surface) = build_engine(&args.common)?;
    let size = SurfaceSize::new(args.common.width, args.common.height);

    anyhow::ensure!(args.common.fps > 0, "fps must be > 0");
    fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("create output dir '{}'", args.out_dir.display()))?;

    let step = Duration::from_secs_f64(1.0 / f64::from(args.common.fps));
    let until = Duration::from_millis(args.duration_ms);

    let mut frame = 0u64;
    let mut t = Duration::ZERO;
    while t <= until {
        engine.tick(t, &mut surface)?;
        let out = args.out_dir.join(format!("frame_{frame:05}.png"));
        write_png(&surface, size, &out)?;
        frame += 1;
        t += step;
    }

    eprintln!("wrote {frame} frames to {}", args.out_dir.display());
    Ok(())
}
