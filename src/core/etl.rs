use crate::core::Pipeline;
use crate::domain::model::RunSummary;
use crate::utils::error::Result;
use crate::utils::monitor::SystemMonitor;

pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
    monitor: SystemMonitor,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self::new_with_monitoring(pipeline, false)
    }

    pub fn new_with_monitoring(pipeline: P, monitor_enabled: bool) -> Self {
        Self {
            pipeline,
            monitor: SystemMonitor::new(monitor_enabled),
        }
    }

    /// Harvest, then export when anything was collected.
    ///
    /// Harvest failures are reported through the summary status, only
    /// export and task errors come back as `Err`.
    pub async fn run(&self) -> Result<RunSummary> {
        tracing::info!("Starting review harvest...");
        self.monitor.log_stats("start");

        let report = self.pipeline.extract().await?;
        tracing::info!(
            status = %report.status,
            "Harvested {} reviews ({} skipped) in {} scroll attempts",
            report.records.len(),
            report.skipped,
            report.scroll_attempts
        );
        self.monitor.log_stats("extract");

        let mut output_paths = Vec::new();
        if report.records.is_empty() {
            tracing::warn!("No reviews collected, nothing to export");
        } else {
            let bundle = self.pipeline.transform(&report).await?;
            tracing::debug!("Rendered {} export files", bundle.files.len());
            self.monitor.log_stats("transform");

            output_paths = self.pipeline.load(bundle).await?;
            for path in &output_paths {
                tracing::info!("Output saved to: {}", path);
            }
            self.monitor.log_stats("load");
        }

        self.monitor.log_final_stats();

        Ok(RunSummary {
            status: report.status,
            message: report.message,
            record_count: report.records.len(),
            output_paths,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{
        ExportBundle, ExportFile, HarvestReport, HarvestStatus, ReviewRecord,
    };
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    struct CannedPipeline {
        records: Vec<ReviewRecord>,
        status: HarvestStatus,
        loads: AtomicUsize,
    }

    impl CannedPipeline {
        fn new(records: Vec<ReviewRecord>, status: HarvestStatus) -> Self {
            Self {
                records,
                status,
                loads: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl Pipeline for CannedPipeline {
        async fn extract(&self) -> Result<HarvestReport> {
            Ok(HarvestReport {
                records: self.records.clone(),
                status: self.status,
                message: "done".to_string(),
                scroll_attempts: 2,
                items_seen: self.records.len(),
                skipped: 0,
                elapsed: Duration::from_millis(5),
            })
        }

        async fn transform(&self, report: &HarvestReport) -> Result<ExportBundle> {
            Ok(ExportBundle {
                files: vec![ExportFile {
                    name: "out.csv".to_string(),
                    data: Vec::new(),
                }],
                record_count: report.records.len(),
            })
        }

        async fn load(&self, bundle: ExportBundle) -> Result<Vec<String>> {
            self.loads.fetch_add(1, Ordering::SeqCst);
            Ok(bundle.files.into_iter().map(|f| f.name).collect())
        }
    }

    #[tokio::test]
    async fn test_exports_when_records_exist() {
        let records = vec![ReviewRecord::new(Some(4), "Nice").unwrap()];
        let engine = EtlEngine::new(CannedPipeline::new(records, HarvestStatus::Completed));

        let summary = engine.run().await.unwrap();

        assert_eq!(summary.status, HarvestStatus::Completed);
        assert_eq!(summary.record_count, 1);
        assert_eq!(summary.output_paths, vec!["out.csv".to_string()]);
    }

    #[tokio::test]
    async fn test_skips_export_without_records() {
        let engine = EtlEngine::new(CannedPipeline::new(
            Vec::new(),
            HarvestStatus::ContainerNotFound,
        ));

        let summary = engine.run().await.unwrap();

        assert_eq!(summary.status, HarvestStatus::ContainerNotFound);
        assert!(summary.output_paths.is_empty());
        assert_eq!(engine.pipeline.loads.load(Ordering::SeqCst), 0);
    }
}
