//! verbump - Main entry point
//!
//! usage: verbump 1.0=1.0.13 2.1=2.1.504

use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

use verbump::{Cli, StepConfig, StepKind, VersionPair, check, run};

/// Initialize the logger with appropriate settings
fn init_logger(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse_args();
    init_logger(cli.verbose);
    debug!(?cli, "CLI arguments parsed");

    if let Some(path) = &cli.write_config {
        if let Err(e) = cli.write_config_file(path) {
            error!("Failed to write configuration: {:#}", e);
            eprintln!("✗ {:#}", e);
            std::process::exit(1);
        }
        println!("✓ Configuration written to {:?}", path);
        return;
    }

    let manifests = match cli.manifest_paths() {
        Ok(paths) => paths,
        Err(e) => {
            error!("Failed to resolve manifest paths: {:#}", e);
            eprintln!("✗ {:#}", e);
            std::process::exit(1);
        }
    };
    info!(?manifests, "manifest locations resolved");

    let steps = StepKind::all();
    for pair in &cli.pairs {
        if let Err(e) = update_version(&steps, pair, &manifests, cli.check) {
            error!(%pair, "version update failed: {}", e);
            eprintln!("{}", e);
            std::process::exit(1);
        }
    }
}

fn update_version(
    steps: &[StepKind],
    pair: &VersionPair,
    manifests: &verbump::ManifestPaths,
    check_only: bool,
) -> verbump::Result<()> {
    println!("{}", pair);
    let config = StepConfig::new(&pair.tag, &pair.version).with_manifests(manifests.clone());
    if check_only {
        check(steps, &config)
    } else {
        run(steps, &config)
    }
}
