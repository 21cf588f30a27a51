use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use connector_core::{
    AnnotationSpec, Annotator, ConnectorOptions, CreationRequest, EmissionMode, LengthMetric,
    Scene, SkippedPair, UngeometricPolicy,
};
use serde::Serialize;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "connector")]
#[command(about = "Measured arrow annotations between drawing objects")]
pub struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Connect the selected objects of a scene and print what was appended.
    Annotate {
        #[arg(value_name = "SCENE")]
        scene: PathBuf,
        /// Write the annotated scene description to this file.
        #[arg(long)]
        output: Option<PathBuf>,
        #[command(flatten)]
        options: OptionArgs,
    },
    /// Print the computed annotation geometry without changing the scene.
    Measure {
        #[arg(value_name = "SCENE")]
        scene: PathBuf,
        #[command(flatten)]
        options: OptionArgs,
    },
    /// Print CLI version.
    Version,
}

#[derive(Debug, Args)]
struct OptionArgs {
    /// JSON options file, applied before environment variables and flags.
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
    /// Line width in millimeters.
    #[arg(long)]
    stroke_width: Option<f64>,
    /// Label font size in pixels.
    #[arg(long)]
    text_size: Option<f64>,
    /// Multiplier from drawing distance to reported distance.
    #[arg(long, allow_negative_numbers = true)]
    scale_factor: Option<f64>,
    /// Distance between line and label.
    #[arg(long, allow_negative_numbers = true)]
    text_raise: Option<f64>,
    /// Unit suffix of the label.
    #[arg(long)]
    unit: Option<String>,
    #[arg(long, value_enum)]
    length_metric: Option<MetricArg>,
    #[arg(long, value_enum)]
    on_ungeometric: Option<PolicyArg>,
    /// Compute every pair before touching the scene.
    #[arg(long)]
    batched: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum MetricArg {
    Euclidean,
    LongestSide,
}

impl From<MetricArg> for LengthMetric {
    fn from(arg: MetricArg) -> Self {
        match arg {
            MetricArg::Euclidean => LengthMetric::Euclidean,
            MetricArg::LongestSide => LengthMetric::LongestSide,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum PolicyArg {
    Abort,
    SkipPair,
}

impl From<PolicyArg> for UngeometricPolicy {
    fn from(arg: PolicyArg) -> Self {
        match arg {
            PolicyArg::Abort => UngeometricPolicy::Abort,
            PolicyArg::SkipPair => UngeometricPolicy::SkipPair,
        }
    }
}

impl OptionArgs {
    fn resolve(&self) -> Result<ConnectorOptions> {
        let mut options = match &self.config {
            Some(path) => ConnectorOptions::from_file(path)?,
            None => ConnectorOptions::default(),
        };
        options = options.with_env_overrides()?;

        if let Some(value) = self.stroke_width {
            options.stroke_width = value;
        }
        if let Some(value) = self.text_size {
            options.text_size = value;
        }
        if let Some(value) = self.scale_factor {
            options.scale_factor = value;
        }
        if let Some(value) = self.text_raise {
            options.text_raise = value;
        }
        if let Some(unit) = &self.unit {
            options.unit = unit.clone();
        }
        if let Some(metric) = self.length_metric {
            options.length_metric = metric.into();
        }
        if let Some(policy) = self.on_ungeometric {
            options.on_ungeometric = policy.into();
        }
        if self.batched {
            options.emission = EmissionMode::Batched;
        }

        tracing::debug!(?options, "resolved options");
        Ok(options)
    }
}

#[derive(Debug, Serialize)]
struct AnnotateOutput {
    annotated_pairs: usize,
    marker_created: bool,
    emitted: Vec<CreationRequest>,
    skipped: Vec<SkippedPair>,
}

#[derive(Debug, Serialize)]
struct MeasureOutput {
    annotations: Vec<AnnotationSpec>,
    skipped: Vec<SkippedPair>,
}

pub fn run<I, T>(args: I) -> Result<()>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = Cli::parse_from(args);
    init_logging(cli.verbose);

    match cli.command {
        Commands::Annotate { scene, output, options } => {
            run_annotate(&scene, output.as_deref(), &options)
        }
        Commands::Measure { scene, options } => run_measure(&scene, &options),
        Commands::Version => {
            println!("{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    // stdout carries the JSON contract, logs go to stderr
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_target(false)
        .try_init();
}

fn run_annotate(scene_path: &Path, output: Option<&Path>, args: &OptionArgs) -> Result<()> {
    let mut scene = load_scene(scene_path)?;
    let annotator = Annotator::new(args.resolve()?)?;

    let report = annotator.annotate(&mut scene).context("failed to annotate selection")?;

    if let Some(output) = output {
        if let Some(parent) = output.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create directory {}", parent.display()))?;
        }
        let json = scene.to_json()?;
        fs::write(output, json)
            .with_context(|| format!("failed to write scene to {}", output.display()))?;
    }

    let payload = AnnotateOutput {
        annotated_pairs: report.annotated_pairs(),
        marker_created: report.marker_created,
        emitted: report.emitted,
        skipped: report.skipped,
    };
    println!("{}", serde_json::to_string_pretty(&payload)?);

    Ok(())
}

fn run_measure(scene_path: &Path, args: &OptionArgs) -> Result<()> {
    let scene = load_scene(scene_path)?;
    let annotator = Annotator::new(args.resolve()?)?;

    let plan = annotator.plan(&scene).context("failed to measure selection")?;

    let payload = MeasureOutput { annotations: plan.specs, skipped: plan.skipped };
    println!("{}", serde_json::to_string_pretty(&payload)?);

    Ok(())
}

fn load_scene(path: &Path) -> Result<Scene> {
    ensure_file_exists(path)?;
    Scene::load(path).with_context(|| format!("failed to load scene {}", path.display()))
}

fn ensure_file_exists(path: &Path) -> Result<()> {
    if !path.exists() {
        anyhow::bail!("file does not exist: {}", path.display());
    }

    if !path.is_file() {
        anyhow::bail!("path is not a file: {}", path.display());
    }

    Ok(())
}
