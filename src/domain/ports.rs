use crate::config::{BrowserConfig, HarvestConfig};
use crate::domain::locator::Locator;
use crate::domain::model::{ExportBundle, ExportFormat, HarvestReport};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::time::Duration;

/// A review element found on the page.
pub trait ItemHandle {
    /// Inner text of the first descendant matching `locator`.
    fn text_of(&self, locator: &Locator) -> Result<String>;

    /// Attribute of the first descendant matching `locator`, `None` when the
    /// element exists but carries no such attribute.
    fn attribute_of(&self, locator: &Locator, attribute: &str) -> Result<Option<String>>;
}

/// A live, exclusively owned browser tab. All calls block the calling thread.
pub trait BrowserSession {
    type Item<'a>: ItemHandle
    where
        Self: 'a;

    fn navigate(&self, url: &str) -> Result<()>;

    /// Waits up to `timeout` for `locator` and clicks it.
    fn click(&self, locator: &Locator, timeout: Duration) -> Result<()>;

    fn exists(&self, locator: &Locator) -> Result<bool>;

    fn count(&self, locator: &Locator) -> Result<usize>;

    /// Scrollable extent of the container, in pixels.
    fn extent(&self, container: &Locator) -> Result<u64>;

    /// Scrolls the container to its end, triggering lazy loading.
    fn expand(&self, container: &Locator) -> Result<()>;

    /// Clicks every element matching `locator`, returns how many were clicked.
    fn click_all(&self, locator: &Locator) -> Result<usize>;

    fn items(&self, locator: &Locator) -> Result<Vec<Self::Item<'_>>>;

    /// Releases the browser. Called exactly once by `SessionGuard`.
    fn close(&mut self);
}

pub trait BrowserLauncher: Send + Sync {
    type Session: BrowserSession;

    fn launch(&self, config: &BrowserConfig) -> Result<Self::Session>;
}

/// Receives progress synchronously, before the harvest moves on.
pub trait ProgressSink: Send + Sync {
    fn report(&self, percent: u8, message: &str);
}

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<String>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn target_url(&self) -> &str;
    fn output_path(&self) -> &str;
    fn output_formats(&self) -> &[ExportFormat];
    fn write_bom(&self) -> bool;
    fn harvest(&self) -> &HarvestConfig;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self) -> Result<HarvestReport>;
    async fn transform(&self, report: &HarvestReport) -> Result<ExportBundle>;
    async fn load(&self, bundle: ExportBundle) -> Result<Vec<String>>;
}
