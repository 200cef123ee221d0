#![cfg(feature = "cli")]

use crate::config::HarvestConfig;
use crate::domain::model::ExportFormat;
use crate::domain::ports::ConfigProvider;
use crate::utils::error::Result;
use crate::utils::validation::{self, Validate};
use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "review-harvester")]
#[command(about = "Collect every review from a Google Maps place page into CSV")]
pub struct CliConfig {
    /// Google Maps place URL
    pub url: String,

    #[arg(long, default_value = "./output")]
    pub output_path: String,

    #[arg(long = "format", value_delimiter = ',', default_value = "csv")]
    pub output_formats: Vec<ExportFormat>,

    #[arg(long, help = "Upper bound on scroll attempts")]
    pub max_scroll_attempts: Option<usize>,

    #[arg(long, help = "Longest wait after each scroll, in milliseconds")]
    pub settle_delay_ms: Option<u64>,

    #[arg(long, help = "Overall time budget for the harvest, in seconds")]
    pub timeout_secs: Option<u64>,

    #[arg(long, help = "Chrome or Chromium binary to launch")]
    pub chrome_path: Option<PathBuf>,

    #[arg(long, help = "Show the browser window")]
    pub headful: bool,

    #[arg(long, help = "Prefix the CSV with a UTF-8 byte order mark for Excel")]
    pub bom: bool,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Log process and browser resource usage")]
    pub monitor: bool,

    #[arg(long, help = "Emit logs as JSON lines")]
    pub json_logs: bool,

    #[arg(long, help = "Hide the progress bar")]
    pub no_progress: bool,

    #[arg(skip)]
    pub harvest: HarvestConfig,
}

impl CliConfig {
    /// Folds command line overrides into the harvest settings.
    pub fn resolve(mut self) -> Self {
        let timing = &mut self.harvest.timing;
        if let Some(attempts) = self.max_scroll_attempts {
            timing.max_scroll_attempts = attempts;
        }
        if let Some(settle) = self.settle_delay_ms {
            timing.settle_delay_ms = settle;
        }
        if let Some(timeout) = self.timeout_secs {
            timing.overall_budget_secs = Some(timeout);
        }
        if let Some(path) = self.chrome_path.clone() {
            self.harvest.browser.chrome_path = Some(path);
        }
        if self.headful {
            self.harvest.browser.headless = false;
        }
        self
    }
}

impl ConfigProvider for CliConfig {
    fn target_url(&self) -> &str {
        &self.url
    }

    fn output_path(&self) -> &str {
        &self.output_path
    }

    fn output_formats(&self) -> &[ExportFormat] {
        &self.output_formats
    }

    fn write_bom(&self) -> bool {
        self.bom
    }

    fn harvest(&self) -> &HarvestConfig {
        &self.harvest
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_path("output_path", &self.output_path)?;
        validation::validate_non_empty_list("format", &self.output_formats)?;
        self.harvest.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overrides_flow_into_harvest_config() {
        let config = CliConfig::parse_from([
            "review-harvester",
            "https://www.google.com/maps/place/Somewhere",
            "--max-scroll-attempts",
            "7",
            "--settle-delay-ms",
            "1200",
            "--timeout-secs",
            "90",
            "--format",
            "csv,json",
            "--headful",
        ])
        .resolve();

        assert_eq!(config.harvest.timing.max_scroll_attempts, 7);
        assert_eq!(config.harvest.timing.settle_delay_ms, 1200);
        assert_eq!(config.harvest.timing.overall_budget_secs, Some(90));
        assert!(!config.harvest.browser.headless);
        assert_eq!(
            config.output_formats,
            vec![ExportFormat::Csv, ExportFormat::Json]
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_defaults() {
        let config =
            CliConfig::parse_from(["review-harvester", "https://www.google.com/maps/place/X"])
                .resolve();
        assert_eq!(config.output_path, "./output");
        assert_eq!(config.output_formats, vec![ExportFormat::Csv]);
        assert_eq!(config.harvest.timing.max_scroll_attempts, 50);
        assert!(!config.bom);
    }
}
