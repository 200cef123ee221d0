use clap::Parser;
use review_harvester::config::toml_config::TomlConfig;
use review_harvester::domain::ports::{ConfigProvider, ProgressSink};
use review_harvester::harvest::{BarProgress, TracingProgress};
use review_harvester::utils::error::ErrorSeverity;
use review_harvester::utils::{logger, validation::Validate};
use review_harvester::{
    check_target, ChromeLauncher, EtlEngine, HarvestStatus, LocalStorage, ReviewPipeline,
};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

#[derive(Parser)]
#[command(name = "toml-harvest")]
#[command(about = "Review harvester driven by a TOML configuration file")]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "harvest.toml")]
    config: String,

    /// Override the place URL from the config
    #[arg(long)]
    url: Option<String>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Override monitoring setting from config
    #[arg(long)]
    monitor: Option<bool>,

    /// Hide the progress bar
    #[arg(long)]
    no_progress: bool,

    /// Dry run - show what would be harvested without starting a browser
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // 載入 TOML 配置
    let mut config = match TomlConfig::from_file(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load config file '{}': {}", args.config, e);
            eprintln!("💡 Make sure the file exists and is valid TOML format");
            std::process::exit(1);
        }
    };

    // 初始化日誌
    if config.json_logs() {
        logger::init_json_logger(args.verbose, config.log_level());
    } else {
        logger::init_cli_logger(args.verbose, config.log_level());
    }

    tracing::info!("🚀 Starting TOML-based review harvester");
    tracing::info!("📁 Loaded configuration from: {}", args.config);

    // 命令列覆蓋設定
    if let Some(url) = &args.url {
        config.source.url = url.clone();
        tracing::info!("🔧 Target URL overridden to: {}", url);
    }

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    if let Err(e) = check_target(config.target_url(), &config.harvest.target_prefix) {
        tracing::error!("❌ {}", e);
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    tracing::info!("✅ Configuration loaded and validated successfully");
    display_config_summary(&config, &args);

    if args.dry_run {
        tracing::info!("🔍 DRY RUN MODE - No browser will be started");
        perform_dry_run(&config);
        return Ok(());
    }

    let monitor_enabled = args.monitor.unwrap_or_else(|| config.monitoring_enabled());
    if monitor_enabled {
        tracing::info!("🔍 System monitoring enabled");
    }

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("🛑 Interrupt received, stopping after the current step...");
            on_interrupt.cancel();
        }
    });

    let progress: Arc<dyn ProgressSink> = if args.no_progress || config.json_logs() {
        Arc::new(TracingProgress)
    } else {
        Arc::new(BarProgress::new())
    };

    let storage = LocalStorage::new(config.output_path().to_string());
    let pipeline = ReviewPipeline::new(ChromeLauncher::new(), storage, config)
        .with_progress(progress)
        .with_cancellation(cancel);

    let engine = EtlEngine::new_with_monitoring(pipeline, monitor_enabled);
    let outcome = engine.run().await;
    drop(engine);

    match outcome {
        Ok(summary) => {
            if summary.status.is_failure() {
                eprintln!("❌ {}", summary.message);
            } else {
                println!("✅ {}", summary.message);
                for path in &summary.output_paths {
                    println!("📁 Output saved to: {}", path);
                }
            }

            let exit_code = match summary.status {
                HarvestStatus::Completed
                | HarvestStatus::AttemptCapReached
                | HarvestStatus::DeadlineExceeded => 0,
                HarvestStatus::InvalidTarget => 1,
                HarvestStatus::ContainerNotFound => 2,
                HarvestStatus::SessionFailure => 3,
                HarvestStatus::Cancelled => 130,
            };
            if exit_code > 0 {
                std::process::exit(exit_code);
            }
        }
        Err(e) => {
            tracing::error!(
                "❌ Harvest failed: {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());

            // 根據錯誤嚴重程度決定退出碼
            let exit_code = match e.severity() {
                ErrorSeverity::Low => 0,
                ErrorSeverity::Medium => 2,
                ErrorSeverity::High => 1,
                ErrorSeverity::Critical => 3,
            };
            if exit_code > 0 {
                std::process::exit(exit_code);
            }
        }
    }

    Ok(())
}

fn format_list(config: &TomlConfig) -> String {
    config
        .output_formats()
        .iter()
        .map(|f| f.extension())
        .collect::<Vec<_>>()
        .join(", ")
}

fn display_config_summary(config: &TomlConfig, args: &Args) {
    let timing = &config.harvest.timing;

    println!("📋 Configuration Summary:");
    println!("  Target: {}", config.target_url());
    println!("  Output: {}", config.output_path());
    println!("  Formats: {}", format_list(config));
    println!("  Max Scroll Attempts: {}", timing.max_scroll_attempts);
    println!("  Settle Delay: {} ms", timing.settle_delay_ms);
    if let Some(budget) = timing.overall_budget_secs {
        println!("  Time Budget: {} s", budget);
    }

    if args.dry_run {
        println!("  🔍 DRY RUN MODE ENABLED");
    }

    println!();
}

fn perform_dry_run(config: &TomlConfig) {
    let harvest = &config.harvest;

    println!("🔍 Dry Run Analysis:");
    println!();

    println!("🌐 Browser:");
    println!("  Headless: {}", harvest.browser.headless);
    println!(
        "  Window: {}x{}",
        harvest.browser.window_width, harvest.browser.window_height
    );
    if let Some(path) = &harvest.browser.chrome_path {
        println!("  Binary: {}", path.display());
    }

    println!();
    println!("🔎 Selectors:");
    println!("  Review marker: {}", harvest.selectors.item_marker);
    for locator in &harvest.selectors.container {
        println!("  Container: {}", locator);
    }
    for probe in &harvest.selectors.rating {
        match &probe.attribute {
            Some(attribute) => println!("  Rating: {} @{}", probe.locator, attribute),
            None => println!("  Rating: {}", probe.locator),
        }
    }
    for probe in &harvest.selectors.text {
        println!("  Text: {}", probe.locator);
    }

    println!();
    println!("💾 Output Configuration:");
    println!("  Path: {}", config.output_path());
    println!("  Formats: {}", format_list(config));
    println!("  UTF-8 BOM: {}", config.write_bom());

    println!();
    println!("✅ Dry run analysis complete. Use --verbose for more details during actual run.");
}
