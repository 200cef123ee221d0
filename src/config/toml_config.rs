use crate::config::{BrowserConfig, HarvestConfig, SelectorConfig, TimingConfig};
use crate::domain::model::ExportFormat;
use crate::domain::ports::ConfigProvider;
use crate::utils::error::{HarvestError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// File based configuration for `toml_harvest`.
///
/// ```toml
/// [source]
/// url = "https://www.google.com/maps/place/..."
///
/// [timing]
/// max_scroll_attempts = 30
///
/// [load]
/// output_path = "./output"
/// output_formats = ["csv", "json"]
/// ```
///
/// `[browser]`, `[selectors]` and `[timing]` may also be nested under
/// `[harvest]`. A top-level section replaces its nested counterpart.
/// Unknown sections and keys are rejected.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TomlConfig {
    pub source: SourceConfig,
    #[serde(default)]
    pub harvest: HarvestConfig,
    #[serde(default, skip_serializing)]
    browser: Option<BrowserConfig>,
    #[serde(default, skip_serializing)]
    selectors: Option<SelectorConfig>,
    #[serde(default, skip_serializing)]
    timing: Option<TimingConfig>,
    pub load: LoadConfig,
    pub monitoring: Option<MonitoringConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SourceConfig {
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoadConfig {
    pub output_path: String,
    #[serde(default = "default_formats")]
    pub output_formats: Vec<ExportFormat>,
    #[serde(default)]
    pub bom: bool,
}

fn default_formats() -> Vec<ExportFormat> {
    vec![ExportFormat::Csv]
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MonitoringConfig {
    #[serde(default)]
    pub enabled: bool,
    /// `EnvFilter` directives, e.g. `"review_harvester=trace"`. `RUST_LOG` wins.
    pub log_level: Option<String>,
    pub json_logs: Option<bool>,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(HarvestError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        let mut config: Self =
            toml::from_str(&processed_content).map_err(|e| HarvestError::ConfigValidationError {
                field: "toml_parsing".to_string(),
                message: format!("TOML parsing error: {}", e),
            })?;
        config.merge_top_level_sections();
        Ok(config)
    }

    /// 將頂層 [browser] [selectors] [timing] 併入 harvest
    fn merge_top_level_sections(&mut self) {
        if let Some(browser) = self.browser.take() {
            self.harvest.browser = browser;
        }
        if let Some(selectors) = self.selectors.take() {
            self.harvest.selectors = selectors;
        }
        if let Some(timing) = self.timing.take() {
            self.harvest.timing = timing;
        }
    }

    /// 替換環境變數 (例如 ${PLACE_URL})
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| HarvestError::ConfigError {
            message: format!("invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn monitoring_enabled(&self) -> bool {
        self.monitoring.as_ref().map(|m| m.enabled).unwrap_or(false)
    }

    pub fn json_logs(&self) -> bool {
        self.monitoring
            .as_ref()
            .and_then(|m| m.json_logs)
            .unwrap_or(false)
    }

    pub fn log_level(&self) -> Option<&str> {
        self.monitoring
            .as_ref()
            .and_then(|m| m.log_level.as_deref())
    }
}

impl ConfigProvider for TomlConfig {
    fn target_url(&self) -> &str {
        &self.source.url
    }

    fn output_path(&self) -> &str {
        &self.load.output_path
    }

    fn output_formats(&self) -> &[ExportFormat] {
        &self.load.output_formats
    }

    fn write_bom(&self) -> bool {
        self.load.bom
    }

    fn harvest(&self) -> &HarvestConfig {
        &self.harvest
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_non_empty_string("source.url", &self.source.url)?;
        validation::validate_path("load.output_path", &self.load.output_path)?;
        validation::validate_non_empty_list("load.output_formats", &self.load.output_formats)?;
        self.harvest.validate()
    }
}
