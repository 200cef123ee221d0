use clap::Parser;
use review_harvester::domain::model::RunSummary;
use review_harvester::domain::ports::ProgressSink;
use review_harvester::harvest::{BarProgress, TracingProgress};
use review_harvester::utils::error::{ErrorSeverity, HarvestError};
use review_harvester::utils::{logger, validation::Validate};
use review_harvester::{
    check_target, ChromeLauncher, CliConfig, EtlEngine, HarvestStatus, LocalStorage,
    ReviewPipeline,
};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = CliConfig::parse().resolve();

    if config.json_logs {
        logger::init_json_logger(config.verbose, None);
    } else {
        logger::init_cli_logger(config.verbose, None);
    }

    tracing::info!("Starting review-harvester");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    // rejected before any browser is started
    if let Err(e) = check_target(&config.url, &config.harvest.target_prefix) {
        tracing::error!("❌ {}", e);
        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 {}", e.recovery_suggestion());
        std::process::exit(1);
    }

    let monitor_enabled = config.monitor;
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

    let progress: Arc<dyn ProgressSink> = if config.no_progress || config.json_logs {
        Arc::new(TracingProgress)
    } else {
        Arc::new(BarProgress::new())
    };

    let storage = LocalStorage::new(config.output_path.clone());
    let pipeline = ReviewPipeline::new(ChromeLauncher::new(), storage, config)
        .with_progress(progress)
        .with_cancellation(cancel);

    let engine = EtlEngine::new_with_monitoring(pipeline, monitor_enabled);
    let outcome = engine.run().await;
    // drops the progress bar before anything is printed below it
    drop(engine);

    match outcome {
        Ok(summary) => {
            let code = report_summary(&summary);
            if code > 0 {
                std::process::exit(code);
            }
        }
        Err(e) => std::process::exit(report_error(&e)),
    }

    Ok(())
}

fn report_summary(summary: &RunSummary) -> i32 {
    if summary.status.is_failure() {
        tracing::error!(status = %summary.status, "❌ {}", summary.message);
        eprintln!("❌ {}", summary.message);
    } else {
        tracing::info!(status = %summary.status, "✅ {}", summary.message);
        println!("✅ {}", summary.message);
        for path in &summary.output_paths {
            println!("📁 Output saved to: {}", path);
        }
        if summary.record_count == 0 {
            println!("ℹ️ No reviews were found, no file was written");
        }
    }

    match summary.status {
        HarvestStatus::Completed
        | HarvestStatus::AttemptCapReached
        | HarvestStatus::DeadlineExceeded => 0,
        HarvestStatus::InvalidTarget => 1,
        HarvestStatus::ContainerNotFound => 2,
        HarvestStatus::SessionFailure => 3,
        HarvestStatus::Cancelled => 130,
    }
}

fn report_error(e: &HarvestError) -> i32 {
    tracing::error!(
        "❌ Harvest failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());

    match e.severity() {
        ErrorSeverity::Low => 0,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    }
}
