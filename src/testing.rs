//! Scripted browser for exercising the harvester without Chrome.
//!
//! A `FakePage` describes how the page behaves (how long the review panel
//! keeps growing, which consent buttons exist, which reviews are present) and
//! `FakeLauncher` hands out sessions over it while counting what the
//! harvester did.

use crate::config::{BrowserConfig, SelectorConfig};
use crate::domain::locator::Locator;
use crate::domain::model::ProgressEvent;
use crate::domain::ports::{BrowserLauncher, BrowserSession, ItemHandle, ProgressSink};
use crate::utils::error::{HarvestError, Result};
use anyhow::anyhow;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const BASE_EXTENT: u64 = 1000;
pub const EXTENT_STEP: u64 = 500;

/// One scripted review element.
#[derive(Debug, Clone, Default)]
pub struct FakeItem {
    texts: HashMap<String, String>,
    attributes: HashMap<(String, String), String>,
}

impl FakeItem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, selector: &str, value: &str) -> Self {
        self.texts.insert(selector.to_string(), value.to_string());
        self
    }

    pub fn attr(mut self, selector: &str, attribute: &str, value: &str) -> Self {
        self.attributes.insert(
            (selector.to_string(), attribute.to_string()),
            value.to_string(),
        );
        self
    }

    fn has_element(&self, selector: &str) -> bool {
        self.texts.contains_key(selector) || self.attributes.keys().any(|(s, _)| s == selector)
    }
}

impl ItemHandle for FakeItem {
    fn text_of(&self, locator: &Locator) -> Result<String> {
        self.texts
            .get(locator.expression())
            .cloned()
            .ok_or_else(|| HarvestError::FieldExtraction {
                field: locator.to_string(),
                message: "no such element".to_string(),
            })
    }

    fn attribute_of(&self, locator: &Locator, attribute: &str) -> Result<Option<String>> {
        let selector = locator.expression();
        if !self.has_element(selector) {
            return Err(HarvestError::FieldExtraction {
                field: locator.to_string(),
                message: "no such element".to_string(),
            });
        }
        Ok(self
            .attributes
            .get(&(selector.to_string(), attribute.to_string()))
            .cloned())
    }
}

/// How the scripted page behaves.
#[derive(Debug, Clone)]
pub struct FakePage {
    marker: Locator,
    reviews_present: bool,
    grows_for: Option<usize>,
    clickable: HashSet<String>,
    present: HashSet<String>,
    items: Vec<FakeItem>,
    fail_on_expand: Option<usize>,
    fail_launch: bool,
}

impl Default for FakePage {
    fn default() -> Self {
        Self {
            marker: SelectorConfig::default().item_marker,
            reviews_present: true,
            grows_for: Some(0),
            clickable: HashSet::new(),
            present: HashSet::new(),
            items: Vec::new(),
            fail_on_expand: None,
            fail_launch: false,
        }
    }
}

impl FakePage {
    pub fn new() -> Self {
        Self::default()
    }

    /// The panel grows on each of the first `n` scrolls, then stays put.
    pub fn grows_for(mut self, n: usize) -> Self {
        self.grows_for = Some(n);
        self
    }

    pub fn grows_forever(mut self) -> Self {
        self.grows_for = None;
        self
    }

    pub fn without_reviews(mut self) -> Self {
        self.reviews_present = false;
        self
    }

    pub fn marker(mut self, marker: Locator) -> Self {
        self.marker = marker;
        self
    }

    pub fn clickable(mut self, selector: &str) -> Self {
        self.clickable.insert(selector.to_string());
        self
    }

    pub fn present(mut self, selector: &str) -> Self {
        self.present.insert(selector.to_string());
        self
    }

    pub fn items(mut self, items: Vec<FakeItem>) -> Self {
        self.items = items;
        self
    }

    /// The `n`th scroll (1-based) fails like a crashed tab.
    pub fn fail_on_expand(mut self, n: usize) -> Self {
        self.fail_on_expand = Some(n);
        self
    }

    pub fn fail_launch(mut self) -> Self {
        self.fail_launch = true;
        self
    }

    fn extent_after(&self, expands: usize) -> u64 {
        let grown = match self.grows_for {
            Some(limit) => expands.min(limit),
            None => expands,
        };
        BASE_EXTENT + EXTENT_STEP * grown as u64
    }
}

/// Counters shared by a launcher and every session it created.
#[derive(Debug, Default)]
pub struct FakeStats {
    launches: AtomicUsize,
    closes: AtomicUsize,
    expands: AtomicUsize,
    clicks: Mutex<Vec<String>>,
    click_alls: Mutex<Vec<String>>,
}

impl FakeStats {
    pub fn launches(&self) -> usize {
        self.launches.load(Ordering::SeqCst)
    }

    pub fn closes(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }

    pub fn expands(&self) -> usize {
        self.expands.load(Ordering::SeqCst)
    }

    /// Successful single clicks, in order.
    pub fn clicks(&self) -> Vec<String> {
        self.clicks.lock().map(|c| c.clone()).unwrap_or_default()
    }

    /// Every bulk click request, in order.
    pub fn click_alls(&self) -> Vec<String> {
        self.click_alls.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

#[derive(Debug, Clone)]
pub struct FakeLauncher {
    page: Arc<FakePage>,
    stats: Arc<FakeStats>,
}

impl FakeLauncher {
    pub fn new(page: FakePage) -> Self {
        Self {
            page: Arc::new(page),
            stats: Arc::new(FakeStats::default()),
        }
    }

    pub fn stats(&self) -> &FakeStats {
        &self.stats
    }
}

impl BrowserLauncher for FakeLauncher {
    type Session = FakeSession;

    fn launch(&self, _config: &BrowserConfig) -> Result<FakeSession> {
        if self.page.fail_launch {
            return Err(anyhow!("Chrome executable not found").into());
        }
        self.stats.launches.fetch_add(1, Ordering::SeqCst);
        Ok(FakeSession {
            page: Arc::clone(&self.page),
            stats: Arc::clone(&self.stats),
            expands: AtomicUsize::new(0),
        })
    }
}

pub struct FakeSession {
    page: Arc<FakePage>,
    stats: Arc<FakeStats>,
    expands: AtomicUsize,
}

impl FakeSession {
    fn is_marker(&self, locator: &Locator) -> bool {
        self.page.reviews_present && *locator == self.page.marker
    }
}

impl BrowserSession for FakeSession {
    type Item<'a> = FakeItem;

    fn navigate(&self, _url: &str) -> Result<()> {
        Ok(())
    }

    fn click(&self, locator: &Locator, _timeout: Duration) -> Result<()> {
        let selector = locator.expression();
        if !self.page.clickable.contains(selector) {
            return Err(anyhow!("no clickable element for {}", locator).into());
        }
        if let Ok(mut clicks) = self.stats.clicks.lock() {
            clicks.push(selector.to_string());
        }
        Ok(())
    }

    fn exists(&self, locator: &Locator) -> Result<bool> {
        Ok(self.is_marker(locator) || self.page.present.contains(locator.expression()))
    }

    fn count(&self, locator: &Locator) -> Result<usize> {
        Ok(if self.is_marker(locator) {
            self.page.items.len()
        } else {
            0
        })
    }

    fn extent(&self, _container: &Locator) -> Result<u64> {
        Ok(self.page.extent_after(self.expands.load(Ordering::SeqCst)))
    }

    fn expand(&self, _container: &Locator) -> Result<()> {
        let attempt = self.expands.fetch_add(1, Ordering::SeqCst) + 1;
        self.stats.expands.fetch_add(1, Ordering::SeqCst);
        if self.page.fail_on_expand == Some(attempt) {
            return Err(anyhow!("tab crashed while scrolling").into());
        }
        Ok(())
    }

    fn click_all(&self, locator: &Locator) -> Result<usize> {
        if let Ok(mut calls) = self.stats.click_alls.lock() {
            calls.push(locator.expression().to_string());
        }
        Ok(0)
    }

    fn items(&self, locator: &Locator) -> Result<Vec<FakeItem>> {
        Ok(if self.is_marker(locator) {
            self.page.items.clone()
        } else {
            Vec::new()
        })
    }

    fn close(&mut self) {
        self.stats.closes.fetch_add(1, Ordering::SeqCst);
    }
}

/// Collects every progress event.
#[derive(Debug, Default)]
pub struct RecordingProgress {
    events: Mutex<Vec<ProgressEvent>>,
}

impl RecordingProgress {
    pub fn events(&self) -> Vec<ProgressEvent> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }

    pub fn percents(&self) -> Vec<u8> {
        self.events().into_iter().map(|e| e.percent).collect()
    }

    pub fn messages(&self) -> Vec<String> {
        self.events().into_iter().map(|e| e.message).collect()
    }
}

impl ProgressSink for RecordingProgress {
    fn report(&self, percent: u8, message: &str) {
        if let Ok(mut events) = self.events.lock() {
            events.push(ProgressEvent {
                percent,
                message: message.to_string(),
            });
        }
    }
}
