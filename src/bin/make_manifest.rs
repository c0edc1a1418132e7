use anyhow::{Context, Result};
use clap::Parser;
use icon_grid::core::icon_probe::{IconProber, DEFAULT_PROBE_TIMEOUT};
use icon_grid::core::manifest_builder::{parse_site_data, DEFAULT_SITE_COUNT};
use icon_grid::utils::{logger, validation};
use icon_grid::ManifestBuilder;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "make-manifest")]
#[command(about = "Build an icon manifest from raw per-site icon data")]
struct Args {
    /// Raw site data (JSON array of sites with their icon links)
    #[arg(long)]
    load_raw_site_data: PathBuf,

    /// Number of sites to consider, in input order
    #[arg(long, default_value_t = DEFAULT_SITE_COUNT)]
    count: usize,

    /// Extra domains to exclude (comma-separated)
    #[arg(long, value_delimiter = ',')]
    blacklist: Vec<String>,

    /// Download icons without a declared `sizes` to measure them
    #[arg(long)]
    probe_icons: bool,

    /// Per-icon download timeout in seconds
    #[arg(long, default_value_t = DEFAULT_PROBE_TIMEOUT.as_secs())]
    probe_timeout: u64,

    /// Write the manifest here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    logger::init_cli_logger(args.verbose);

    validation::validate_positive_number("count", args.count, 1)?;
    validation::validate_positive_number("probe_timeout", args.probe_timeout as usize, 1)?;

    tracing::info!(
        "Loading raw icon data from {}",
        args.load_raw_site_data.display()
    );
    let raw = tokio::fs::read(&args.load_raw_site_data)
        .await
        .with_context(|| format!("failed to read {}", args.load_raw_site_data.display()))?;
    let sites = parse_site_data(&raw).with_context(|| {
        format!(
            "{} is not valid raw site data",
            args.load_raw_site_data.display()
        )
    })?;

    let mut builder = ManifestBuilder::new(args.count).with_blacklisted(args.blacklist);
    if args.probe_icons {
        tracing::info!("Icons without declared sizes will be downloaded and measured");
        let prober = IconProber::new(Some(Duration::from_secs(args.probe_timeout)))
            .context("failed to set up icon prober")?;
        builder = builder.with_prober(prober);
    }
    let manifest = builder.build(&sites).await;
    let json = manifest.to_json_pretty()?;

    match &args.output {
        Some(path) => {
            tokio::fs::write(path, json.as_bytes())
                .await
                .with_context(|| format!("failed to write {}", path.display()))?;
            tracing::info!("📁 Manifest written to: {}", path.display());
        }
        None => println!("{}", json),
    }

    Ok(())
}
