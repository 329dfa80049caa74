use std::cell::RefCell;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::Duration;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use facelift::encode::ffmpeg::ensure_parent_dir;
use facelift::encode::sink::encode_png;
use facelift::{
    AppConfig, AppContext, DisplayLink, IntervalDisplayLink, ManualDisplayLink, RecordingFormat,
    ReplayProvider,
};

#[derive(Parser, Debug)]
#[command(name = "facelift", version)]
struct Cli {
    /// Log filter used when `RUST_LOG` is unset (e.g. `info`, `facelift=debug`).
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the overlay pipeline headlessly against a replayed tracking trace.
    Run(RunArgs),
}

#[derive(Parser, Debug)]
struct RunArgs {
    /// Configuration JSON. Asset paths resolve relative to its directory.
    #[arg(long)]
    config: PathBuf,

    /// Number of ticks to run.
    #[arg(long, default_value_t = 60)]
    ticks: u64,

    /// JSON-lines tracking trace.
    #[arg(long)]
    trace: Option<PathBuf>,

    /// Camera background image.
    #[arg(long)]
    camera: Option<PathBuf>,

    /// Record the whole run to this path (`.png` or `.mp4`).
    #[arg(long)]
    record: Option<PathBuf>,

    /// Write the final composite surface as a PNG.
    #[arg(long)]
    snapshot: Option<PathBuf>,

    /// Pace ticks at the configured fps instead of running as fast as possible.
    #[arg(long, default_value_t = false)]
    realtime: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level);
    match cli.cmd {
        Command::Run(args) => cmd_run(args),
    }
}

fn init_logging(default_filter: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn record_format(path: &Path) -> anyhow::Result<RecordingFormat> {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("mp4") => Ok(RecordingFormat::Mp4),
        Some(ext) if ext.eq_ignore_ascii_case("png") => Ok(RecordingFormat::Png),
        _ => anyhow::bail!(
            "cannot infer recording format from '{}' (use .png or .mp4)",
            path.display()
        ),
    }
}

fn cmd_run(args: RunArgs) -> anyhow::Result<()> {
    let mut cfg = AppConfig::from_path(&args.config)?;
    if let Some(path) = &args.record {
        cfg.recorder.format = record_format(path)?;
        cfg.recorder.out_path = Some(path.clone());
    }

    let records = match &args.trace {
        Some(path) => {
            let f = File::open(path).with_context(|| format!("open trace '{}'", path.display()))?;
            facelift::parse_trace(BufReader::new(f))?
        }
        None => Vec::new(),
    };

    let (publisher, reader) = facelift::track_channel(cfg.landmark_count);
    let mut provider = ReplayProvider::new(publisher).with_records(records);
    if let Some(path) = &args.camera {
        let bytes =
            std::fs::read(path).with_context(|| format!("read camera '{}'", path.display()))?;
        provider = provider.with_background(facelift::decode_camera_frame(&bytes)?);
    }

    let fps = cfg.fps;
    let mut ctx = AppContext::start(cfg, provider, reader)?;

    let failures = Rc::new(RefCell::new(Vec::new()));
    if args.record.is_some() {
        let failures = failures.clone();
        ctx.recorder_mut().on_complete(move |res| match res {
            Ok(r) => eprintln!(
                "recorded {} frames ({} dropped) as {}",
                r.frames_captured,
                r.frames_dropped,
                r.media_type()
            ),
            Err(e) => failures.borrow_mut().push(e.to_string()),
        });
        ctx.tap()?;
    }

    let mut link: Box<dyn DisplayLink> = if args.realtime {
        Box::new(IntervalDisplayLink::new(fps).with_limit(args.ticks))
    } else {
        Box::new(ManualDisplayLink::ticks(args.ticks))
    };
    let stats = ctx.run(link.as_mut());
    let pending = ctx.shutdown(Duration::from_secs(120));

    if let Some(out) = &args.snapshot {
        ensure_parent_dir(out)?;
        let png = encode_png(ctx.frame_loop().surface().read())?;
        std::fs::write(out, png).with_context(|| format!("write png '{}'", out.display()))?;
        eprintln!("wrote {}", out.display());
    }

    eprintln!(
        "ticks={} draws_failed={} refreshes_dropped={} provider_errors={}",
        stats.ticks, stats.draws_failed, stats.refreshes_dropped, stats.provider_errors
    );

    if pending > 0 {
        anyhow::bail!("{pending} recording(s) did not finish encoding");
    }
    if let Some(e) = failures.borrow().first() {
        anyhow::bail!("recording failed: {e}");
    }
    Ok(())
}
