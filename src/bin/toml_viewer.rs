use clap::Parser;
use icon_grid::core::ConfigProvider;
use icon_grid::utils::{logger, validation::Validate};
use icon_grid::{FailurePolicy, LocalStorage, TomlConfig, ViewerEngine, ViewerPipeline};

#[derive(Parser)]
#[command(name = "toml-viewer")]
#[command(about = "Render the icon grid from a TOML configuration file")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "icon-grid.toml")]
    config: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Override the failure policy from config
    #[arg(long)]
    on_failure: Option<FailurePolicy>,

    /// Dry run - show what would be fetched and written without executing
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // 初始化日誌
    logger::init_cli_logger(args.verbose);

    tracing::info!("🚀 Starting TOML-based icon viewer");
    tracing::info!("📁 Loading configuration from: {}", args.config);

    // 載入 TOML 配置
    let mut config = match TomlConfig::from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load config file '{}': {}", args.config, e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(1);
        }
    };

    // 應用命令列覆蓋設定
    if let Some(policy) = args.on_failure {
        config.error_handling.on_fetch_failure = policy;
        tracing::info!("🔧 Failure policy overridden to: {}", policy);
    }

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    tracing::info!("✅ Configuration loaded and validated successfully");

    display_config_summary(&config, &args);

    if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - nothing will be fetched or written");
        perform_dry_run(&config);
        return Ok(());
    }

    let storage = LocalStorage::new(config.output_path().to_string());
    let pipeline = ViewerPipeline::new(storage, config)?;
    let engine = ViewerEngine::new(pipeline);

    match engine.run().await {
        Ok(output_path) => {
            tracing::info!("✅ Icon grid rendered successfully!");
            println!("📁 Output saved to: {}", output_path);
        }
        Err(e) => {
            tracing::error!(
                "❌ Rendering failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());
            std::process::exit(e.severity().exit_code());
        }
    }

    Ok(())
}

fn display_config_summary(config: &TomlConfig, args: &Args) {
    println!("📋 Configuration Summary:");
    if let Some(name) = &config.viewer.name {
        println!("  Viewer: {}", name);
    }
    println!("  Source: {}", config.manifest_endpoint());
    println!(
        "  Output: {}/{}",
        config.output_path(),
        config.output_filename()
    );
    println!("  Mount point: #{}", config.mount_id());
    println!("  On failure: {}", config.failure_policy());

    if args.dry_run {
        println!("  🔍 DRY RUN MODE ENABLED");
    }

    println!();
}

fn perform_dry_run(config: &TomlConfig) {
    println!("🔍 Dry Run Analysis:");
    println!();

    println!("📡 Manifest Source:");
    println!("  Endpoint: {}", config.manifest_endpoint());
    match config.request_timeout() {
        Some(timeout) => println!("  Timeout: {:?}", timeout),
        None => println!("  Timeout: none"),
    }
    let headers = config.request_headers();
    if !headers.is_empty() {
        println!("  Headers: {} custom headers", headers.len());
    }

    println!();
    println!("🖼️ Page:");
    println!("  Title: {}", config.page_title());
    println!("  Grid mounted into: <div id=\"{}\">", config.mount_id());

    println!();
    println!("⚠️ Failure Handling:");
    match config.failure_policy() {
        FailurePolicy::Surface => println!("  Errors abort the run; nothing is written"),
        FailurePolicy::FailurePage => {
            println!("  A \"Failed to load icons\" page is written, then the run fails")
        }
        FailurePolicy::Silent => println!("  A blank page is written and the run succeeds"),
    }

    println!();
    println!("✅ Dry run analysis complete. Use --verbose for more details during actual run.");
}
