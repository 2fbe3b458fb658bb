use anyhow::{Context, Result};
use clap::Parser;
use stackdrop::{
    catalog::Catalog,
    cli::{Cli, OutputFormat},
    config::RunConfig,
    harness::{Harness, Snapshot},
    invoker::ProcessInvoker,
    variant::{PerVariant, Variant},
};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Initialize tracing subscriber for debug output
fn init_tracing(debug: bool) {
    if debug {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::from_default_env().add_directive(tracing::Level::TRACE.into()),
            )
            .with_writer(std::io::stderr)
            .init();
    }
}

fn absolute(path: &Path) -> Result<PathBuf> {
    std::path::absolute(path).with_context(|| format!("Failed to resolve {}", path.display()))
}

fn load_catalog(args: &Cli, root: &Path) -> Result<Catalog> {
    let catalog = match &args.catalog {
        Some(path) => Catalog::from_toml(path)?,
        None => Catalog::builtin(root),
    };
    if args.only.is_empty() {
        Ok(catalog)
    } else {
        Ok(catalog.select(&args.only)?)
    }
}

fn build_config(args: &Cli, root: &Path) -> Result<RunConfig> {
    let homes = PerVariant::new(absolute(&args.baseline_home)?, absolute(&args.candidate_home)?);
    let mut config = RunConfig::with_root_layout(root, homes);
    if let Some(agent) = &args.baseline_agent {
        config.agent_paths[Variant::Baseline] = absolute(agent)?;
    }
    if let Some(agent) = &args.candidate_agent {
        config.agent_paths[Variant::Candidate] = absolute(agent)?;
    }
    if let Some(dir) = &args.results_dir {
        config.results_dir = absolute(dir)?;
    }
    config.interval = args.interval.clone();
    config.validate()?;
    Ok(config)
}

fn print_snapshot(snapshot: &Snapshot, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => {
            println!("{}", snapshot.error_rate.to_text());
            println!("{}", snapshot.failure_rate.to_text());
        }
        OutputFormat::Json => {
            let line = serde_json::to_string(snapshot).context("Failed to serialize tables")?;
            println!("{}", line);
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    let args = Cli::parse();

    init_tracing(args.debug);

    let root = absolute(&args.root)?;
    let catalog = load_catalog(&args, &root)?;
    let config = build_config(&args, &root)?;

    if !args.skip_preflight {
        config
            .check_runtimes()
            .context("Runtime preflight failed (use --skip-preflight to bypass)")?;
    }

    tracing::info!(
        "Running {} benchmarks x {} iterations",
        catalog.len(),
        args.iterations
    );

    let mut harness = Harness::new(catalog, config, ProcessInvoker::from_current_env());
    harness.run(args.iterations, |snapshot| print_snapshot(snapshot, args.format))?;

    Ok(())
}
