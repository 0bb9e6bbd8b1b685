//! lenscan CLI: run the brightness analyzers on still frames.

use std::path::PathBuf;
use std::thread;
use std::time::{Duration, Instant};

use clap::{Args, Parser, Subcommand, ValueEnum};
use lenscan::core::{
    init_with_level, level_from_verbosity, AnalyzerConfig, BrightestPixelParams, ClassifierConfig,
    MeanBrightnessParams,
};
use lenscan::detect;
use lenscan::io::{ScanConfig, ScanReport};
use lenscan::session::{DisplaySize, FramePool, ScanSession, SessionOptions};
use log::{info, warn};

type CliError = Box<dyn std::error::Error>;
type CliResult<T> = Result<T, CliError>;

#[derive(Parser)]
#[command(name = "lenscan")]
#[command(about = "Flag bright reflective clusters in camera frames")]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze each image and print a JSON report.
    Analyze(AnalyzeArgs),

    /// Stream images through a scan session as if they came from a camera.
    Replay(ReplayArgs),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum StrategyArg {
    Cluster,
    Brightest,
    Mean,
}

#[derive(Debug, Clone, Args)]
struct ConfigArgs {
    /// Input images; replaces the list from --config when given.
    images: Vec<PathBuf>,

    /// JSON scan config.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Classifier strategy; defaults to the config's, or cluster.
    #[arg(long, value_enum)]
    strategy: Option<StrategyArg>,

    /// Brightness threshold (cluster), minimum peak (brightest) or minimum mean (mean).
    #[arg(long)]
    threshold: Option<f32>,

    /// Minimum bright samples for a detection (cluster only).
    #[arg(long)]
    min_count: Option<u32>,

    /// Grid sampling step in pixels.
    #[arg(long)]
    step: Option<u32>,

    /// Preview surface size as WIDTHxHEIGHT; adds overlay data to the report.
    #[arg(long, value_parser = parse_display)]
    display: Option<DisplaySize>,
}

#[derive(Debug, Clone, Args)]
struct AnalyzeArgs {
    #[command(flatten)]
    config: ConfigArgs,

    /// Write the report here instead of stdout.
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Debug, Clone, Args)]
struct ReplayArgs {
    #[command(flatten)]
    config: ConfigArgs,

    /// Simulated camera rate.
    #[arg(long, default_value = "30")]
    fps: u32,

    /// Number of passes over the image list.
    #[arg(long, default_value = "1")]
    loops: u32,
}

fn parse_display(s: &str) -> Result<DisplaySize, String> {
    let (w, h) = s
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got {s:?}"))?;
    let w: f32 = w.trim().parse().map_err(|e| format!("bad width: {e}"))?;
    let h: f32 = h.trim().parse().map_err(|e| format!("bad height: {e}"))?;
    if !(w > 0.0 && h > 0.0) {
        return Err(format!("display size must be positive, got {s:?}"));
    }
    Ok(DisplaySize::new(w, h))
}

fn main() -> CliResult<()> {
    let cli = Cli::parse();

    init_with_level(level_from_verbosity(cli.verbose))?;
    #[cfg(feature = "tracing")]
    lenscan::core::init_tracing(false);

    match cli.command {
        Commands::Analyze(args) => run_analyze(&args),
        Commands::Replay(args) => run_replay(&args),
    }
}

/// Merge the config file (if any) with command-line overrides.
fn resolve_config(args: &ConfigArgs) -> CliResult<(ScanConfig, Option<String>)> {
    let (mut cfg, config_path) = match &args.config {
        Some(path) => (
            ScanConfig::load_json(path)?,
            Some(path.display().to_string()),
        ),
        None => (ScanConfig::default(), None),
    };

    if !args.images.is_empty() {
        cfg.images = args
            .images
            .iter()
            .map(|p| p.display().to_string())
            .collect();
    }
    if let Some(display) = args.display {
        cfg.display = Some([display.width, display.height]);
    }

    let strategy = args.strategy.unwrap_or(match cfg.classifier {
        ClassifierConfig::ClusterCentroid(_) => StrategyArg::Cluster,
        ClassifierConfig::BrightestPixel(_) => StrategyArg::Brightest,
        ClassifierConfig::MeanBrightness(_) => StrategyArg::Mean,
    });
    cfg.classifier = apply_overrides(cfg.classifier, strategy, args)?;
    Ok((cfg, config_path))
}

fn apply_overrides(
    base: ClassifierConfig,
    strategy: StrategyArg,
    args: &ConfigArgs,
) -> CliResult<ClassifierConfig> {
    let threshold_u8 = |v: f32| -> CliResult<u8> {
        if v.fract() != 0.0 || !(0.0..=255.0).contains(&v) {
            return Err(format!("--threshold must be an integer in 0..=255, got {v}").into());
        }
        Ok(v as u8)
    };

    Ok(match strategy {
        StrategyArg::Cluster => {
            let mut cfg = match base {
                ClassifierConfig::ClusterCentroid(cfg) => cfg,
                _ => AnalyzerConfig::default(),
            };
            if let Some(t) = args.threshold {
                cfg.brightness_threshold = threshold_u8(t)?;
            }
            if let Some(n) = args.min_count {
                cfg.min_cluster_count = n;
            }
            if let Some(s) = args.step {
                cfg.sample_step = s;
            }
            ClassifierConfig::ClusterCentroid(cfg)
        }
        StrategyArg::Brightest => {
            let mut params = match base {
                ClassifierConfig::BrightestPixel(p) => p,
                _ => BrightestPixelParams::default(),
            };
            if let Some(t) = args.threshold {
                params.min_peak = threshold_u8(t)?;
            }
            if let Some(s) = args.step {
                params.sample_step = s;
            }
            warn_unused_min_count(args);
            ClassifierConfig::BrightestPixel(params)
        }
        StrategyArg::Mean => {
            let mut params = match base {
                ClassifierConfig::MeanBrightness(p) => p,
                _ => MeanBrightnessParams::default(),
            };
            if let Some(t) = args.threshold {
                params.min_mean = t;
            }
            if let Some(s) = args.step {
                params.sample_step = s;
            }
            warn_unused_min_count(args);
            ClassifierConfig::MeanBrightness(params)
        }
    })
}

fn warn_unused_min_count(args: &ConfigArgs) {
    if args.min_count.is_some() {
        warn!("--min-count only applies to the cluster strategy; ignoring");
    }
}

fn run_analyze(args: &AnalyzeArgs) -> CliResult<()> {
    let (mut cfg, config_path) = resolve_config(&args.config)?;
    if let Some(out) = &args.output {
        cfg.output_path = Some(out.display().to_string());
    }
    if cfg.images.is_empty() {
        return Err("no input images".into());
    }

    let classifier = cfg.classifier.build()?;
    info!(
        "analyzing {} image(s) with {}",
        cfg.images.len(),
        classifier.name()
    );
    let frames = detect::scan_files(&cfg.images, classifier.as_ref(), cfg.display_size());
    let report = ScanReport {
        config_path,
        classifier: cfg.classifier.clone(),
        frames,
    };
    info!(
        "{} of {} frame(s) flagged",
        report.detected_count(),
        report.frames.len()
    );

    match cfg.output_path() {
        Some(path) => {
            report.write_json(&path)?;
            info!("report written to {}", path.display());
        }
        None => println!("{}", serde_json::to_string_pretty(&report)?),
    }
    Ok(())
}

fn run_replay(args: &ReplayArgs) -> CliResult<()> {
    let (cfg, _) = resolve_config(&args.config)?;
    if cfg.images.is_empty() {
        return Err("no input images".into());
    }
    if args.fps == 0 {
        return Err("--fps must be positive".into());
    }

    let classifier = cfg.classifier.build()?;
    let mut session = ScanSession::start(classifier, SessionOptions::default())?;
    // Room for one snapshot per submitted frame, so none is missed.
    let expected = cfg.images.len().saturating_mul(args.loops as usize);
    let snapshots = session.state().subscribe_with_capacity(expected);
    let pool = FramePool::new(4);
    let interval = Duration::from_secs_f64(1.0 / args.fps as f64);
    let print_pending = || -> CliResult<()> {
        for snap in snapshots.try_iter() {
            println!("{}", serde_json::to_string(&snap)?);
        }
        Ok(())
    };

    for pass in 0..args.loops {
        for path in &cfg.images {
            match detect::load_frame(path, &pool) {
                Ok(frame) => {
                    session.submit(frame)?;
                }
                Err(err) => warn!("pass {pass}: {path}: {err}"),
            }
            thread::sleep(interval);
            print_pending()?;
        }
    }

    // Let the worker finish the frame in flight before stopping it, since
    // stopping releases a pending frame unanalyzed.
    let deadline = Instant::now() + Duration::from_secs(5);
    loop {
        let stats = session.stats();
        if stats.analyzed + stats.dropped >= stats.submitted || Instant::now() >= deadline {
            break;
        }
        thread::sleep(Duration::from_millis(2));
    }

    // After the join every publish has happened.
    session.stop();
    print_pending()?;
    println!("{}", serde_json::to_string(&session.stats())?);
    Ok(())
}
