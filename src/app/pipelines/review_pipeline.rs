use crate::core::export;
use crate::core::{ConfigProvider, Pipeline, Storage};
use crate::domain::model::{ExportBundle, HarvestReport};
use crate::domain::ports::{BrowserLauncher, ProgressSink};
use crate::harvest::{Harvester, TracingProgress};
use crate::utils::error::Result;
use async_trait::async_trait;
use chrono::Local;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Harvests one place page and writes the reviews through `Storage`.
pub struct ReviewPipeline<L: BrowserLauncher, S: Storage, C: ConfigProvider> {
    harvester: Arc<Harvester<L>>,
    progress: Arc<dyn ProgressSink>,
    storage: S,
    config: C,
}

impl<L, S, C> ReviewPipeline<L, S, C>
where
    L: BrowserLauncher + 'static,
    S: Storage,
    C: ConfigProvider,
{
    pub fn new(launcher: L, storage: S, config: C) -> Self {
        let harvester = Harvester::new(launcher, config.harvest().clone());
        Self {
            harvester: Arc::new(harvester),
            progress: Arc::new(TracingProgress),
            storage,
            config,
        }
    }

    pub fn with_progress(mut self, progress: Arc<dyn ProgressSink>) -> Self {
        self.progress = progress;
        self
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.harvester = match Arc::try_unwrap(self.harvester) {
            Ok(harvester) => Arc::new(harvester.with_cancellation(cancel)),
            Err(shared) => {
                tracing::warn!("Harvester already shared, cancellation token not installed");
                shared
            }
        };
        self
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.harvester.cancellation_token()
    }
}

#[async_trait]
impl<L, S, C> Pipeline for ReviewPipeline<L, S, C>
where
    L: BrowserLauncher + 'static,
    S: Storage,
    C: ConfigProvider,
{
    async fn extract(&self) -> Result<HarvestReport> {
        let harvester = Arc::clone(&self.harvester);
        let progress = Arc::clone(&self.progress);
        let url = self.config.target_url().to_string();

        tracing::debug!("Harvesting {} on a blocking thread", url);
        let report =
            tokio::task::spawn_blocking(move || harvester.harvest(&url, progress.as_ref())).await?;
        Ok(report)
    }

    async fn transform(&self, report: &HarvestReport) -> Result<ExportBundle> {
        export::build_bundle(
            &report.records,
            self.config.output_formats(),
            self.config.write_bom(),
            Local::now(),
        )
    }

    async fn load(&self, bundle: ExportBundle) -> Result<Vec<String>> {
        let mut written = Vec::with_capacity(bundle.files.len());
        for file in &bundle.files {
            let path = self.storage.write_file(&file.name, &file.data).await?;
            tracing::debug!("Wrote {} bytes to {}", file.data.len(), path);
            written.push(path);
        }
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::LocalStorage;
    use crate::config::{HarvestConfig, TimingConfig};
    use crate::domain::model::{ExportFormat, HarvestStatus};
    use crate::testing::{FakeItem, FakeLauncher, FakePage, RecordingProgress};
    use tempfile::TempDir;

    struct TestConfig {
        url: String,
        output_path: String,
        formats: Vec<ExportFormat>,
        harvest: HarvestConfig,
    }

    impl ConfigProvider for TestConfig {
        fn target_url(&self) -> &str {
            &self.url
        }
        fn output_path(&self) -> &str {
            &self.output_path
        }
        fn output_formats(&self) -> &[ExportFormat] {
            &self.formats
        }
        fn write_bom(&self) -> bool {
            false
        }
        fn harvest(&self) -> &HarvestConfig {
            &self.harvest
        }
    }

    fn config(dir: &TempDir, url: &str) -> TestConfig {
        TestConfig {
            url: url.to_string(),
            output_path: dir.path().display().to_string(),
            formats: vec![ExportFormat::Csv],
            harvest: HarvestConfig {
                timing: TimingConfig::immediate(),
                ..HarvestConfig::default()
            },
        }
    }

    fn page() -> FakePage {
        FakePage::new().grows_for(2).items(vec![
            FakeItem::new()
                .text("div.fontBodySmall", "5/5")
                .text("span.wiI7pd", "Great"),
            FakeItem::new().text("span.wiI7pd", "ok"),
        ])
    }

    #[tokio::test]
    async fn test_extract_transform_load() {
        let dir = TempDir::new().unwrap();
        let config = config(&dir, "https://www.google.com/maps/place/Cafe");
        let storage = LocalStorage::new(config.output_path.clone());
        let progress = Arc::new(RecordingProgress::default());
        let pipeline = ReviewPipeline::new(FakeLauncher::new(page()), storage, config)
            .with_progress(progress.clone());

        let report = pipeline.extract().await.unwrap();
        assert_eq!(report.status, HarvestStatus::Completed);
        assert_eq!(report.records.len(), 2);
        assert_eq!(progress.percents().last(), Some(&100));

        let bundle = pipeline.transform(&report).await.unwrap();
        let paths = pipeline.load(bundle).await.unwrap();

        assert_eq!(paths.len(), 1);
        let written = std::fs::read_to_string(&paths[0]).unwrap();
        assert_eq!(written, "Rating,Review\n5,Great\n,ok\n");
    }

    #[tokio::test]
    async fn test_cancelled_token_is_honoured() {
        let dir = TempDir::new().unwrap();
        let config = config(&dir, "https://www.google.com/maps/place/Cafe");
        let storage = LocalStorage::new(config.output_path.clone());
        let token = CancellationToken::new();
        let pipeline = ReviewPipeline::new(FakeLauncher::new(page()), storage, config)
            .with_cancellation(token.clone());

        token.cancel();
        let report = pipeline.extract().await.unwrap();

        assert_eq!(report.status, HarvestStatus::Cancelled);
    }
}
