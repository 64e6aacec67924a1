use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use env_logger::Env;
use exo_lib::{
    config::ClientConfig,
    render::{save_plot, PlotKind, ResultView},
    sample::{write_sample_file, SAMPLE_FILE_NAME},
    AnalysisController, AnalysisPhase, AnalysisResult, MissionSlot, SubmitOutcome, UploadClient,
};
use log::info;
use serde::Serialize;
use std::{
    fs,
    path::{Path, PathBuf},
    sync::Arc,
};

#[derive(Parser)]
#[command(
    name = "exo",
    version,
    about = "ExoStacker: upload mission datasets for exoplanet-candidate classification"
)]
struct Cli {
    /// Logging verbosity (e.g., debug, info, warn)
    #[arg(long, default_value = "warn", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Args, Clone, Default)]
struct BackendArgs {
    /// TOML file with base_url / analyze_path / timeout_secs
    #[arg(long)]
    config: Option<PathBuf>,
    /// Backend base URL (overrides config file and EXO_BACKEND_URL)
    #[arg(long)]
    backend: Option<String>,
    /// Request timeout in seconds
    #[arg(long)]
    timeout_secs: Option<u64>,
}

#[derive(Subcommand)]
enum Commands {
    /// Upload one or more mission CSVs and print the analysis
    Analyze {
        /// Kepler (KOI) dataset
        #[arg(long)]
        koi: Option<PathBuf>,
        /// TESS (TOI) dataset
        #[arg(long)]
        toi: Option<PathBuf>,
        /// K2 mission dataset
        #[arg(long)]
        k2: Option<PathBuf>,
        /// Directory to write the confusion-matrix and SHAP plots into
        #[arg(long)]
        out: Option<PathBuf>,
        /// Print the raw result JSON instead of the summary
        #[arg(long)]
        json: bool,
        #[command(flatten)]
        backend: BackendArgs,
    },
    /// Render a previously saved result JSON and export its plots
    Render {
        #[arg(long)]
        result: PathBuf,
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Write the example candidate table as CSV
    SampleCsv {
        #[arg(long, default_value = SAMPLE_FILE_NAME)]
        out: PathBuf,
    },
    /// Print the effective backend configuration
    Config {
        #[command(flatten)]
        backend: BackendArgs,
    },
}

#[derive(Serialize)]
struct Summary<'a> {
    #[serde(flatten)]
    view: &'a ResultView,
    saved: Vec<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    env_logger::Builder::from_env(Env::default().default_filter_or(&cli.log_level)).init();

    match cli.command {
        Commands::Analyze {
            koi,
            toi,
            k2,
            out,
            json,
            backend,
        } => cmd_analyze(
            [
                (MissionSlot::Koi, koi),
                (MissionSlot::Toi, toi),
                (MissionSlot::K2, k2),
            ],
            out.as_deref(),
            json,
            &backend,
        )?,
        Commands::Render { result, out } => cmd_render(&result, out.as_deref())?,
        Commands::SampleCsv { out } => {
            write_sample_file(&out).with_context(|| format!("writing {}", out.display()))?;
            println!("{}", out.display());
        }
        Commands::Config { backend } => {
            let config = resolve_config(&backend)?;
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
    }
    Ok(())
}

fn resolve_config(args: &BackendArgs) -> Result<ClientConfig> {
    let mut config = ClientConfig::load(args.config.as_deref())?;
    if let Some(url) = &args.backend {
        config.base_url = url.clone();
    }
    if let Some(timeout) = args.timeout_secs {
        config.timeout_secs = timeout;
    }
    config.validate()?;
    Ok(config)
}

fn cmd_analyze(
    inputs: [(MissionSlot, Option<PathBuf>); 3],
    out: Option<&Path>,
    json: bool,
    backend: &BackendArgs,
) -> Result<()> {
    let config = resolve_config(backend)?;
    let client = UploadClient::new(&config);
    info!("Using analysis endpoint {}", client.endpoint());
    let mut controller = AnalysisController::new(Arc::new(client));
    controller.subscribe(|phase| info!("analysis phase -> {}", phase.label()));

    for (slot, path) in inputs {
        if let Some(path) = path {
            controller.select_path(slot, &path)?;
        }
    }

    match controller.submit() {
        SubmitOutcome::Dispatched => {}
        SubmitOutcome::Rejected(err) => return Err(err.into()),
        SubmitOutcome::Ignored => bail!("an analysis is already running"),
    }

    match controller.wait() {
        AnalysisPhase::Succeeded => {
            let result = controller
                .result()
                .ok_or_else(|| anyhow!("analysis finished without a result"))?;
            emit_result(result, out, json)
        }
        _ => {
            let message = controller
                .error_message()
                .unwrap_or_else(|| "An unknown error occurred during analysis.".into());
            bail!("Analysis Failed: {message}")
        }
    }
}

fn cmd_render(path: &Path, out: Option<&Path>) -> Result<()> {
    let bytes = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    let result = AnalysisResult::from_json(&bytes)
        .with_context(|| format!("parsing {}", path.display()))?;
    emit_result(&result, out, false)
}

fn emit_result(result: &AnalysisResult, out: Option<&Path>, json: bool) -> Result<()> {
    let saved = match out {
        Some(dir) => save_available_plots(result, dir)?,
        None => Vec::new(),
    };
    if json {
        println!("{}", serde_json::to_string(result)?);
        return Ok(());
    }
    let view = ResultView::from_result(result);
    println!("{}", serde_json::to_string_pretty(&Summary { view: &view, saved })?);
    Ok(())
}

fn save_available_plots(result: &AnalysisResult, dir: &Path) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    let mut saved = Vec::new();
    for kind in PlotKind::all() {
        if kind.payload(result).is_none() {
            info!("{} not present in result; skipping", kind.title());
            continue;
        }
        saved.push(save_plot(result, kind, dir)?);
    }
    Ok(saved)
}
