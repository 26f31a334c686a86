// src/main.rs
//
// -----------------------------------------------------------------------------
// workgen - expands parameterized benchmark requests into workload documents
// -----------------------------------------------------------------------------

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::info;
use workgen::config::{EmitMode, RawRequest};
use workgen::emit::Emitted;
use workgen::{constants, generator, summary, ControllerClient, DocumentStore, PlanEmitter};

// -----------------------------------------------------------------------------
// CLI definition
// -----------------------------------------------------------------------------
#[derive(Parser)]
#[command(name = "workgen", version, about = "Benchmark workload plan generator")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output (-v for info, -vv for debug, -vvv for trace)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate one workload per size group and persist or submit it
    ///
    /// Examples:
    ///   workgen generate --request request.yaml
    ///   workgen generate --request request.yaml --persist --output-dir /tmp/configs
    ///   workgen generate --request request.yaml --submit http://controller:19088/controller
    Generate {
        /// YAML generation request
        #[arg(long)]
        request: PathBuf,

        /// Output directory for persisted documents (env: WORKGEN_OUTPUT_DIR)
        #[arg(long, value_name = "DIR")]
        output_dir: Option<PathBuf>,

        /// Force persist mode regardless of the request's generate_workload flag
        #[arg(long, conflicts_with = "submit")]
        persist: bool,

        /// Force submit mode against this controller (env: WORKGEN_CONTROLLER)
        #[arg(long, value_name = "URL")]
        submit: Option<String>,
    },
    /// Print what a request would generate without writing or submitting
    ///
    /// Examples:
    ///   workgen summary --request request.yaml
    Summary {
        #[arg(long)]
        request: PathBuf,
    },
}

// -----------------------------------------------------------------------------
// main
// -----------------------------------------------------------------------------
fn main() -> Result<()> {
    // Load environment: WORKGEN_OUTPUT_DIR, WORKGEN_CONTROLLER, RUST_LOG
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Generate { request, output_dir, persist, submit } => {
            generate_cmd(&request, output_dir, persist, submit)
        }
        Commands::Summary { request } => summary_cmd(&request),
    }
}

fn init_logging(verbose: u8) {
    use tracing_subscriber::{fmt, EnvFilter};

    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("workgen={}", level)));
    fmt().with_env_filter(filter).init();
}

fn generate_cmd(
    request_path: &Path,
    output_dir: Option<PathBuf>,
    persist: bool,
    submit: Option<String>,
) -> Result<()> {
    let raw = RawRequest::from_file(request_path)?;
    let mut request = raw
        .validate()
        .with_context(|| format!("Invalid request: {}", request_path.display()))?;

    if persist {
        request.globals.mode = EmitMode::Persist;
    } else if submit.is_some() {
        request.globals.mode = EmitMode::Submit;
    }

    let output_dir = output_dir
        .or_else(|| std::env::var_os("WORKGEN_OUTPUT_DIR").map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(constants::DEFAULT_OUTPUT_DIR));
    let controller = submit.or_else(|| std::env::var("WORKGEN_CONTROLLER").ok());

    let mut client = match request.globals.mode {
        EmitMode::Submit => {
            let Some(url) = controller else {
                bail!("Submit mode needs a controller: pass --submit <URL> or set WORKGEN_CONTROLLER");
            };
            Some(ControllerClient::new(&url)?)
        }
        EmitMode::Persist => None,
    };

    let mut emitter = PlanEmitter::new();
    if request.globals.mode == EmitMode::Persist {
        let store = DocumentStore::open(&output_dir)?;
        println!("Writing workload documents to {}", store.dir().display());
        emitter = emitter.with_store(store);
    }
    if let Some(ref mut client) = client {
        emitter = emitter.with_sink(client);
    }

    let report = generator::generate(&request, &mut emitter);
    for outcome in &report.outcomes {
        match &outcome.result {
            Ok(Emitted::Persisted(path)) => println!("✅ group {}: {}", outcome.index, path.display()),
            Ok(Emitted::Submitted(id)) => println!(
                "✅ group {}: submitted {} as {}",
                outcome.index,
                outcome.name.as_deref().unwrap_or("workload"),
                id
            ),
            Err(err) => eprintln!("❌ group {}: {:#}", err.index, err.source),
        }
    }

    let failed = report.failures().count();
    if failed > 0 {
        bail!("{} of {} size group(s) failed", failed, report.outcomes.len());
    }
    info!("Generated {} workload(s)", report.outcomes.len());
    Ok(())
}

fn summary_cmd(request_path: &Path) -> Result<()> {
    let request = RawRequest::from_file(request_path)?
        .validate()
        .with_context(|| format!("Invalid request: {}", request_path.display()))?;

    if !summary::display_plan_summary(&request, &request_path.display().to_string()) {
        bail!("One or more size groups cannot be planned");
    }
    Ok(())
}
