use std::path::PathBuf;

use anyhow::{Context, bail};
use clap::{Args, Parser, Subcommand};
use image::Rgba;
use log::info;

use aseprite_sheets::settings::Settings;
use aseprite_sheets::{
    Canvas, DrawOutcome, EffectChain, Location, SheetLoader, SheetRequest, Sprite, Surface,
    Transform,
};

#[derive(Parser)]
#[command(name = "aseprite-sheets", about = "Inspect and render Aseprite sprite sheets")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print frames and animations of a sheet
    Info {
        #[command(flatten)]
        source: SourceArgs,
    },
    /// Draw one frame (or the current frame of an animation) to a PNG
    Render(RenderArgs),
    /// Store defaults used by the other commands
    Config {
        #[arg(long)]
        base: Option<String>,
        #[arg(long)]
        scale: Option<f32>,
        #[arg(long)]
        smoothing: Option<bool>,
    },
}

#[derive(Args)]
struct SourceArgs {
    /// Logical image name; files default to `{name}.png` and `{name}.json`
    name: String,
    /// Directory or URL prefix holding the sheet
    #[arg(long)]
    base: Option<String>,
    /// Explicit image location (needs --json too)
    #[arg(long)]
    image: Option<String>,
    /// Explicit metadata location (needs --image too)
    #[arg(long)]
    json: Option<String>,
}

#[derive(Args)]
struct RenderArgs {
    #[command(flatten)]
    source: SourceArgs,
    #[arg(long, conflicts_with = "frame")]
    animation: Option<String>,
    /// Seconds into the animation
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    time: f64,
    #[arg(long)]
    frame: Option<usize>,
    /// CSS-style filter, e.g. "grayscale(100%) blur(1px)"
    #[arg(long)]
    filter: Option<String>,
    #[arg(long)]
    scale: Option<f32>,
    /// Pivot ratio as "x,y"
    #[arg(long, default_value = "0,0")]
    anchor: String,
    #[arg(long)]
    flip_x: bool,
    #[arg(long)]
    flip_y: bool,
    #[arg(long)]
    out: PathBuf,
}

impl SourceArgs {
    fn request(&self, settings: &Settings) -> SheetRequest {
        let mut request = SheetRequest::new(&self.name);
        request.base = self
            .base
            .clone()
            .or_else(|| settings.loader.asset_base.clone());
        request.image = self.image.as_deref().map(Location::parse);
        request.metadata = self.json.as_deref().map(Location::parse);
        request
    }
}

fn parse_anchor(value: &str) -> anyhow::Result<(f32, f32)> {
    let (x, y) = value
        .split_once(',')
        .with_context(|| format!("anchor must be \"x,y\", got {value:?}"))?;
    Ok((x.trim().parse()?, y.trim().parse()?))
}

async fn load_one(
    loader: &mut SheetLoader,
    source: &SourceArgs,
    settings: &Settings,
) -> anyhow::Result<()> {
    loader.load(&source.request(settings))?;
    let failures = loader.settle().await;
    if let Some(err) = failures.into_iter().next() {
        return Err(err.into());
    }
    Ok(())
}

async fn info_command(source: SourceArgs, settings: Settings) -> anyhow::Result<()> {
    let mut loader = SheetLoader::current()?;
    load_one(&mut loader, &source, &settings).await?;

    let entry = loader
        .get(&source.name)
        .context("image vanished from registry")?;
    let sheet = entry.sheet().context("metadata missing")?;

    println!("{}: {}", entry.name(), entry.status_text());
    for (i, frame) in sheet.frames.iter().enumerate() {
        let r = frame.rect;
        println!(
            "  frame {:>3}  {}x{} at ({}, {})  {} ms",
            i, r.w, r.h, r.x, r.y, frame.duration
        );
    }
    for name in sheet.animation_names() {
        if let Some(anim) = sheet.animation(name) {
            println!(
                "  animation {:<16} frames {}..={}  {} ms",
                name, anim.from, anim.to, anim.total_duration_ms
            );
        }
    }
    Ok(())
}

async fn render_command(args: RenderArgs, settings: Settings) -> anyhow::Result<()> {
    let mut loader = SheetLoader::current()?;
    load_one(&mut loader, &args.source, &settings).await?;

    let (ax, ay) = parse_anchor(&args.anchor)?;
    let scale = args.scale.unwrap_or(settings.render.scale);

    let mut sprite = match (&args.animation, args.frame) {
        (Some(animation), _) => Sprite::animation(&args.source.name, animation, args.time),
        (None, frame) => Sprite::frame(&args.source.name, frame.unwrap_or(0)),
    };
    if let Some(filter) = &args.filter {
        sprite = sprite.with_effect(filter.parse::<EffectChain>()?);
    }

    // Canvas sized to the largest frame so any pose fits.
    let entry = loader.get(&args.source.name).context("image missing")?;
    let sheet = entry.sheet().context("metadata missing")?;
    let max_w = sheet.frames.iter().map(|f| f.rect.w).max().unwrap_or(0);
    let max_h = sheet.frames.iter().map(|f| f.rect.h).max().unwrap_or(0);
    let width = ((max_w as f32) * scale).ceil().max(1.0) as u32;
    let height = ((max_h as f32) * scale).ceil().max(1.0) as u32;

    sprite = sprite.with_transform(
        Transform::at(ax * width as f32, ay * height as f32)
            .with_scale(scale)
            .with_anchor(ax, ay)
            .flipped(args.flip_x, args.flip_y),
    );

    let mut canvas = Canvas::filled(width, height, Rgba(settings.render.background));
    if !settings.render.smoothing {
        canvas.disable_smoothing();
    }

    // A filtered copy needs one more round trip before it can be drawn.
    let mut outcome = loader.draw(&mut canvas, &sprite)?;
    if outcome == DrawOutcome::NotReady {
        if let Some(err) = loader.settle().await.into_iter().next() {
            return Err(err.into());
        }
        outcome = loader.draw(&mut canvas, &sprite)?;
    }
    if outcome != DrawOutcome::Drawn {
        bail!("{} is not ready", args.source.name);
    }

    canvas.save(&args.out)?;
    info!("Wrote {}", args.out.display());
    Ok(())
}

fn config_command(
    base: Option<String>,
    scale: Option<f32>,
    smoothing: Option<bool>,
    mut settings: Settings,
) {
    if let Some(base) = base {
        settings.loader.asset_base = Some(base);
    }
    if let Some(scale) = scale {
        settings.render.scale = scale;
    }
    if let Some(smoothing) = smoothing {
        settings.render.smoothing = smoothing;
    }
    settings.save();
    println!("{:#?}", settings);
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let settings = Settings::load();

    match cli.command {
        Command::Info { source } => info_command(source, settings).await,
        Command::Render(args) => render_command(args, settings).await,
        Command::Config {
            base,
            scale,
            smoothing,
        } => {
            config_command(base, scale, smoothing, settings);
            Ok(())
        }
    }
}
