use std::{
    fs::File,
    io::{BufWriter, Write as _},
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};
use storyreel::collab::speech::manifest_from_audio_dir;
use storyreel::collab::wav::WavDurationProbe;
use storyreel::{
    AudioManifest, FrameIndex, JsonLinesSink, RenderSession, RenderSessionOpts, Schedule,
    ThemeTable, VideoConfig,
};
use tracing_subscriber::{EnvFilter, fmt};

#[derive(Parser, Debug)]
#[command(name = "storyreel", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Measure synthesized scene audio and write the audio manifest.
    Manifest(ManifestArgs),
    /// Assemble the schedule and write it as JSON.
    Schedule(ScheduleArgs),
    /// Print the evaluated state of one frame as JSON.
    Frame(FrameArgs),
    /// Evaluate every frame into a JSON-lines file.
    Render(RenderArgs),
}

#[derive(Args, Debug)]
struct InputArgs {
    /// Video configuration JSON.
    #[arg(long)]
    config: PathBuf,

    /// Audio manifest JSON with measured scene durations.
    #[arg(long)]
    manifest: Option<PathBuf>,

    /// Treat scene-level configuration problems as fatal instead of skipping the scene.
    #[arg(long)]
    strict: bool,
}

#[derive(Parser, Debug)]
struct ManifestArgs {
    /// Video configuration JSON.
    #[arg(long)]
    config: PathBuf,

    /// Directory holding `scene-{i}.wav` files.
    #[arg(long)]
    audio_dir: PathBuf,

    /// Output manifest path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct ScheduleArgs {
    #[command(flatten)]
    input: InputArgs,

    /// Output schedule JSON path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct FrameArgs {
    #[command(flatten)]
    input: InputArgs,

    /// Frame index (0-based).
    #[arg(long)]
    frame: u64,
}

#[derive(Parser, Debug)]
struct RenderArgs {
    #[command(flatten)]
    input: InputArgs,

    /// Output JSON-lines path.
    #[arg(long)]
    out: PathBuf,

    /// Evaluate frames on a dedicated worker pool.
    #[arg(long)]
    parallel: bool,

    /// Worker count for `--parallel`.
    #[arg(long)]
    threads: Option<usize>,

    /// Frames evaluated per batch.
    #[arg(long, default_value_t = 64)]
    chunk_size: usize,

    /// Check the single-background guarantee on every frame before rendering.
    #[arg(long)]
    verify: bool,
}

fn main() -> anyhow::Result<()> {
    init_logging();
    let cli = Cli::parse();
    match cli.cmd {
        Command::Manifest(args) => cmd_manifest(args),
        Command::Schedule(args) => cmd_schedule(args),
        Command::Frame(args) => cmd_frame(args),
        Command::Render(args) => cmd_render(args),
    }
}

fn init_logging() {
    let filter =
        EnvFilter::try_from_env("STORYREEL_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn read_config(path: &Path) -> anyhow::Result<VideoConfig> {
    VideoConfig::from_path(path).with_context(|| format!("load config '{}'", path.display()))
}

fn load_schedule(input: &InputArgs) -> anyhow::Result<Schedule> {
    let cfg = read_config(&input.config)?;
    if input.strict {
        cfg.validate_strict()?;
    }
    let manifest = input
        .manifest
        .as_deref()
        .map(|p| {
            AudioManifest::from_path(p)
                .with_context(|| format!("load audio manifest '{}'", p.display()))
        })
        .transpose()?;

    let themes = ThemeTable::builtin()?;
    let schedule = storyreel::compose(&cfg, manifest.as_ref(), &themes)
        .with_context(|| format!("compose '{}'", input.config.display()))?;
    for d in &schedule.diagnostics {
        match d.scene {
            Some(scene) => tracing::warn!(kind = ?d.kind, scene, "{}", d.message),
            None => tracing::warn!(kind = ?d.kind, "{}", d.message),
        }
    }
    Ok(schedule)
}

fn create_out(path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    Ok(())
}

fn cmd_manifest(args: ManifestArgs) -> anyhow::Result<()> {
    let cfg = read_config(&args.config)?;
    let manifest = manifest_from_audio_dir(&cfg, &args.audio_dir, &WavDurationProbe)
        .with_context(|| format!("measure audio in '{}'", args.audio_dir.display()))?;
    create_out(&args.out)?;
    manifest.write_path(&args.out)?;
    eprintln!(
        "wrote {} ({} scenes, {} frames)",
        args.out.display(),
        manifest.scenes.len(),
        manifest.total_frames
    );
    Ok(())
}

fn cmd_schedule(args: ScheduleArgs) -> anyhow::Result<()> {
    let schedule = load_schedule(&args.input)?;
    create_out(&args.out)?;
    let f = File::create(&args.out)
        .with_context(|| format!("create schedule '{}'", args.out.display()))?;
    let mut w = BufWriter::new(f);
    serde_json::to_writer_pretty(&mut w, &schedule).context("serialize schedule JSON")?;
    w.flush()
        .with_context(|| format!("flush '{}'", args.out.display()))?;
    eprintln!(
        "wrote {} ({} segments, {} frames)",
        args.out.display(),
        schedule.event_count(),
        schedule.total_frames
    );
    Ok(())
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let schedule = load_schedule(&args.input)?;
    let state = schedule.evaluate(FrameIndex(args.frame))?;
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    serde_json::to_writer_pretty(&mut out, &state).context("serialize frame JSON")?;
    writeln!(out).context("write stdout")?;
    Ok(())
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let schedule = load_schedule(&args.input)?;
    if args.verify {
        schedule.verify().context("background verification failed")?;
    }

    create_out(&args.out)?;
    let mut sink = JsonLinesSink::create(&args.out)?;
    let session = RenderSession::new(
        &schedule,
        RenderSessionOpts {
            parallel: args.parallel,
            chunk_size: args.chunk_size,
            threads: args.threads,
            ..RenderSessionOpts::default()
        },
    );
    let stats = session.render_all(&mut sink)?;

    eprintln!(
        "wrote {} ({} frames, fingerprint {:016x}{:016x})",
        args.out.display(),
        stats.frames_delivered,
        stats.fingerprint.hi,
        stats.fingerprint.lo
    );
    Ok(())
}
