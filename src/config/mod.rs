pub mod cli;
pub mod toml_config;

use crate::domain::locator::{FieldProbe, Locator};
use crate::utils::error::Result;
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

#[cfg(feature = "cli")]
pub use cli::CliConfig;

pub const GOOGLE_MAPS_PREFIX: &str = "https://www.google.com/maps";

/// Everything the harvester needs for one run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HarvestConfig {
    /// Accepted target locators must start with this prefix.
    pub target_prefix: String,
    pub browser: BrowserConfig,
    pub selectors: SelectorConfig,
    pub timing: TimingConfig,
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self {
            target_prefix: GOOGLE_MAPS_PREFIX.to_string(),
            browser: BrowserConfig::default(),
            selectors: SelectorConfig::default(),
            timing: TimingConfig::default(),
        }
    }
}

/// Browser launch constants. Headless, fixed viewport and no sandbox by
/// default, for containers where Chrome cannot create its own sandbox.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BrowserConfig {
    pub headless: bool,
    pub sandbox: bool,
    pub window_width: u32,
    pub window_height: u32,
    pub chrome_path: Option<PathBuf>,
    pub extra_args: Vec<String>,
    pub idle_timeout_secs: u64,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: true,
            sandbox: false,
            window_width: 1920,
            window_height: 1080,
            chrome_path: None,
            extra_args: vec!["--disable-dev-shm-usage".to_string()],
            idle_timeout_secs: 120,
        }
    }
}

/// Ordered candidate lists; the first candidate that matches wins.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SelectorConfig {
    pub consent: Vec<Locator>,
    pub item_marker: Locator,
    pub container: Vec<Locator>,
    pub rating: Vec<FieldProbe>,
    pub text: Vec<FieldProbe>,
    /// "More" buttons that expand truncated review bodies.
    pub expand_more: Vec<Locator>,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            consent: vec![
                Locator::css("[aria-label*='Accept all']"),
                Locator::css("[aria-label*='Accept']"),
                Locator::xpath("//button[contains(., 'Accept')]"),
                Locator::xpath("//button[contains(., 'I agree')]"),
            ],
            item_marker: Locator::css("div[data-review-id]"),
            container: vec![
                Locator::css("div.m6QErb.DxyBCb.kA9KIf.dS8AEf"),
                Locator::css("div[data-review-id]"),
            ],
            rating: vec![
                FieldProbe::text("div.fontBodySmall"),
                FieldProbe::attribute("span.kvMYJc", "aria-label"),
                FieldProbe::attribute("span[role='img'][aria-label]", "aria-label"),
            ],
            text: vec![
                FieldProbe::text("span.wiI7pd"),
                FieldProbe::text("div.MyEned span"),
            ],
            expand_more: vec![Locator::css("button.w8nwRe")],
        }
    }
}

/// Waits and loop budgets, in milliseconds unless named otherwise.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TimingConfig {
    pub initial_load_ms: u64,
    pub consent_wait_ms: u64,
    pub after_consent_ms: u64,
    pub container_wait_ms: u64,
    /// Upper bound on the wait after each scroll. Short values under-collect
    /// on slow pages, long values waste time on every attempt.
    pub settle_delay_ms: u64,
    /// Extent polling period inside the settle window, 0 for a blind sleep.
    pub poll_interval_ms: u64,
    pub max_scroll_attempts: usize,
    /// Consecutive unchanged measurements that count as "fully loaded".
    pub stable_cycles: usize,
    pub overall_budget_secs: Option<u64>,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            initial_load_ms: 3000,
            consent_wait_ms: 2000,
            after_consent_ms: 1000,
            container_wait_ms: 10_000,
            settle_delay_ms: 2500,
            poll_interval_ms: 250,
            max_scroll_attempts: 50,
            stable_cycles: 1,
            overall_budget_secs: Some(600),
        }
    }
}

impl TimingConfig {
    pub fn initial_load(&self) -> Duration {
        Duration::from_millis(self.initial_load_ms)
    }

    pub fn consent_wait(&self) -> Duration {
        Duration::from_millis(self.consent_wait_ms)
    }

    pub fn after_consent(&self) -> Duration {
        Duration::from_millis(self.after_consent_ms)
    }

    pub fn container_wait(&self) -> Duration {
        Duration::from_millis(self.container_wait_ms)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn overall_budget(&self) -> Option<Duration> {
        self.overall_budget_secs.map(Duration::from_secs)
    }

    /// Zero-wait timings for scripted sessions.
    pub fn immediate() -> Self {
        Self {
            initial_load_ms: 0,
            consent_wait_ms: 0,
            after_consent_ms: 0,
            container_wait_ms: 0,
            settle_delay_ms: 0,
            poll_interval_ms: 0,
            overall_budget_secs: None,
            ..Self::default()
        }
    }
}

impl Validate for HarvestConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_url("harvest.target_prefix", &self.target_prefix)?;

        validation::validate_range("browser.window_width", self.browser.window_width, 320, 7680)?;
        validation::validate_range("browser.window_height", self.browser.window_height, 240, 4320)?;

        validation::validate_non_empty_string(
            "selectors.item_marker",
            self.selectors.item_marker.expression(),
        )?;
        validation::validate_non_empty_list("selectors.container", &self.selectors.container)?;
        validation::validate_non_empty_list("selectors.rating", &self.selectors.rating)?;
        validation::validate_non_empty_list("selectors.text", &self.selectors.text)?;

        validation::validate_positive_number(
            "timing.max_scroll_attempts",
            self.timing.max_scroll_attempts,
            1,
        )?;
        validation::validate_positive_number("timing.stable_cycles", self.timing.stable_cycles, 1)?;
        if let Some(budget) = self.timing.overall_budget_secs {
            validation::validate_positive_number(
                "timing.overall_budget_secs",
                budget as usize,
                1,
            )?;
        }

        Ok(())
    }
}
