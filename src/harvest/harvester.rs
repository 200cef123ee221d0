use crate::config::HarvestConfig;
use crate::domain::locator::Locator;
use crate::domain::model::{HarvestReport, HarvestSession, HarvestStatus};
use crate::domain::ports::{BrowserLauncher, BrowserSession, ProgressSink};
use crate::harvest::control::{Interrupt, RunControl};
use crate::harvest::extract::extract_record;
use crate::harvest::progress::{self, interpolate, ProgressTracker};
use crate::harvest::session::SessionGuard;
use crate::harvest::target::check_target;
use crate::utils::error::{HarvestError, Result};
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

const CONTAINER_POLL: Duration = Duration::from_millis(250);

/// How the scroll loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoopEnd {
    Stable,
    CapReached,
    Deadline,
    Cancelled,
}

impl From<LoopEnd> for HarvestStatus {
    fn from(end: LoopEnd) -> Self {
        match end {
            LoopEnd::Stable => HarvestStatus::Completed,
            LoopEnd::CapReached => HarvestStatus::AttemptCapReached,
            LoopEnd::Deadline => HarvestStatus::DeadlineExceeded,
            LoopEnd::Cancelled => HarvestStatus::Cancelled,
        }
    }
}

/// Progressive content harvester.
///
/// Drives one browser session through navigation, consent dismissal,
/// container lookup, the scroll-until-stable loop and record extraction.
/// `harvest` never fails: every error ends up as a status on the report.
///
/// Completeness is best-effort. The loop treats "extent unchanged after one
/// settle window" as fully loaded, which a slow page can fool.
pub struct Harvester<L: BrowserLauncher> {
    launcher: L,
    config: HarvestConfig,
    cancel: CancellationToken,
}

impl<L: BrowserLauncher> Harvester<L> {
    pub fn new(launcher: L, config: HarvestConfig) -> Self {
        Self {
            launcher,
            config,
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn harvest(&self, url: &str, sink: &dyn ProgressSink) -> HarvestReport {
        let started = Instant::now();
        let tracker = ProgressTracker::new(sink);

        let target = match check_target(url, &self.config.target_prefix) {
            Ok(target) => target,
            Err(e) => {
                tracing::warn!("Rejected target: {}", e);
                let message = e.user_friendly_message();
                tracker.status(&message);
                return HarvestReport::failed(HarvestStatus::InvalidTarget, message, started.elapsed());
            }
        };

        let control = RunControl::new(self.cancel.clone(), self.config.timing.overall_budget());
        let mut session = HarvestSession::new(target);

        tracker.report(progress::LAUNCH, "🚀 Launching browser...");
        let outcome = match self.launcher.launch(&self.config.browser) {
            Ok(browser) => {
                let browser = SessionGuard::new(browser);
                self.run(&*browser, &mut session, &control, &tracker)
            }
            Err(e) => Err(e),
        };

        let (status, message) = match outcome {
            Ok(status) => (status, Self::summary(status, &session)),
            Err(HarvestError::Cancelled) => {
                (HarvestStatus::Cancelled, Self::summary(HarvestStatus::Cancelled, &session))
            }
            Err(e @ HarvestError::DeadlineExceeded { .. }) => {
                tracing::warn!("{}", e);
                (HarvestStatus::DeadlineExceeded, e.user_friendly_message())
            }
            Err(e @ HarvestError::ContainerNotFound { .. }) => {
                tracing::warn!("{}", e);
                (HarvestStatus::ContainerNotFound, e.user_friendly_message())
            }
            Err(e) => {
                tracing::error!("Harvest failed: {}", e);
                (HarvestStatus::SessionFailure, e.user_friendly_message())
            }
        };

        if status.is_failure() {
            tracker.status(&message);
        } else {
            tracker.report(progress::DONE, &message);
        }

        tracing::info!(
            %status,
            records = session.records.len(),
            skipped = session.skipped,
            attempts = session.attempt_count,
            "Harvest finished in {:?}",
            started.elapsed()
        );

        HarvestReport {
            records: session.records,
            status,
            message,
            scroll_attempts: session.attempt_count,
            items_seen: session.items_seen,
            skipped: session.skipped,
            elapsed: started.elapsed(),
        }
    }

    fn summary(status: HarvestStatus, session: &HarvestSession) -> String {
        let found = session.records.len();
        match status {
            HarvestStatus::Completed => format!("✨ Success! Found {} reviews", found),
            HarvestStatus::AttemptCapReached => format!(
                "✨ Found {} reviews (stopped after {} scroll attempts, more may exist)",
                found, session.attempt_count
            ),
            HarvestStatus::DeadlineExceeded => format!(
                "⏱️ Time budget exhausted, kept {} reviews loaded so far",
                found
            ),
            HarvestStatus::Cancelled => format!("🛑 Cancelled, kept {} reviews", found),
            _ => format!("Found {} reviews", found),
        }
    }

    fn run<S: BrowserSession>(
        &self,
        browser: &S,
        session: &mut HarvestSession,
        control: &RunControl,
        tracker: &ProgressTracker<'_>,
    ) -> Result<HarvestStatus> {
        let timing = &self.config.timing;

        tracing::info!("Navigating to {}", session.target_url);
        browser.navigate(session.target_url.as_str())?;
        if let Some(Interrupt::Cancelled) = control.pause(timing.initial_load()) {
            return Err(HarvestError::Cancelled);
        }

        self.dismiss_interstitials(browser, control, tracker)?;

        tracker.report(progress::CONTAINER, "🔍 Finding reviews section...");
        let container = self.locate_container(browser, control)?;

        let end = self.grow(browser, &container, session, control, tracker)?;
        tracing::info!(?end, attempts = session.attempt_count, "Scroll loop finished");

        // reviews already on the page are kept when the loop was cancelled
        let stop_on_cancel = end != LoopEnd::Cancelled;
        self.extract_all(browser, session, control, tracker, stop_on_cancel)?;
        Ok(end.into())
    }

    /// Best-effort: tries each consent candidate once, first click wins.
    fn dismiss_interstitials<S: BrowserSession>(
        &self,
        browser: &S,
        control: &RunControl,
        tracker: &ProgressTracker<'_>,
    ) -> Result<()> {
        let timing = &self.config.timing;

        for candidate in &self.config.selectors.consent {
            if control.is_cancelled() {
                return Err(HarvestError::Cancelled);
            }
            match browser.click(candidate, timing.consent_wait()) {
                Ok(()) => {
                    tracing::info!("Consent prompt dismissed via {}", candidate);
                    tracker.report(progress::CONSENT, "✅ Cookies accepted");
                    if let Some(Interrupt::Cancelled) = control.pause(timing.after_consent()) {
                        return Err(HarvestError::Cancelled);
                    }
                    return Ok(());
                }
                Err(e) => tracing::debug!("Consent candidate {} not usable: {}", candidate, e),
            }
        }

        tracing::debug!("No consent prompt found");
        Ok(())
    }

    /// Waits for the first item marker, then picks the first container
    /// candidate present on the page.
    fn locate_container<S: BrowserSession>(
        &self,
        browser: &S,
        control: &RunControl,
    ) -> Result<Locator> {
        let selectors = &self.config.selectors;
        let waited = self.config.timing.container_wait();
        let deadline = Instant::now() + waited;

        loop {
            match browser.exists(&selectors.item_marker) {
                Ok(true) => break,
                Ok(false) => {}
                Err(e) => tracing::debug!("Item marker lookup failed: {}", e),
            }
            let now = Instant::now();
            if now >= deadline {
                return Err(HarvestError::ContainerNotFound { waited });
            }
            match control.pause(CONTAINER_POLL.min(deadline - now)) {
                Some(Interrupt::Cancelled) => return Err(HarvestError::Cancelled),
                Some(Interrupt::DeadlineExceeded) => {
                    return Err(HarvestError::DeadlineExceeded {
                        stage: "waiting for the reviews section".to_string(),
                    })
                }
                None => {}
            }
        }

        for candidate in &selectors.container {
            if browser.exists(candidate).unwrap_or(false) {
                tracing::debug!("Using review container {}", candidate);
                return Ok(candidate.clone());
            }
        }

        tracing::debug!("No container candidate matched, scrolling the first review element");
        Ok(selectors.item_marker.clone())
    }

    /// Scroll until the container stops growing or the attempt cap is hit.
    fn grow<S: BrowserSession>(
        &self,
        browser: &S,
        container: &Locator,
        session: &mut HarvestSession,
        control: &RunControl,
        tracker: &ProgressTracker<'_>,
    ) -> Result<LoopEnd> {
        let timing = &self.config.timing;
        let cap = timing.max_scroll_attempts;

        session.attempt_count = 0;
        session.last_extent = browser.extent(container)?;
        let mut unchanged = 0;

        loop {
            match control.check() {
                Some(Interrupt::Cancelled) => return Ok(LoopEnd::Cancelled),
                Some(Interrupt::DeadlineExceeded) => return Ok(LoopEnd::Deadline),
                None => {}
            }

            browser.expand(container)?;
            match self.settle(browser, container, session.last_extent, control)? {
                Some(Interrupt::Cancelled) => return Ok(LoopEnd::Cancelled),
                Some(Interrupt::DeadlineExceeded) => return Ok(LoopEnd::Deadline),
                None => {}
            }

            let extent = browser.extent(container)?;
            let loaded = browser
                .count(&self.config.selectors.item_marker)
                .unwrap_or_else(|e| {
                    tracing::debug!("Could not count reviews: {}", e);
                    0
                });
            tracker.report(
                interpolate(progress::CONTAINER, progress::SCROLL_END, session.attempt_count, cap),
                &format!("📜 Loaded {} reviews...", loaded),
            );

            if extent == session.last_extent {
                unchanged += 1;
                if unchanged >= timing.stable_cycles {
                    return Ok(LoopEnd::Stable);
                }
            } else {
                unchanged = 0;
            }

            session.last_extent = extent;
            session.attempt_count += 1;
            if session.attempt_count >= cap {
                tracing::warn!("Scroll attempt cap ({}) reached", cap);
                return Ok(LoopEnd::CapReached);
            }
        }
    }

    /// Waits for the container to grow past `before`, at most one settle delay.
    fn settle<S: BrowserSession>(
        &self,
        browser: &S,
        container: &Locator,
        before: u64,
        control: &RunControl,
    ) -> Result<Option<Interrupt>> {
        let timing = &self.config.timing;
        let window = timing.settle_delay();
        let poll = timing.poll_interval();

        if poll.is_zero() {
            return Ok(control.pause(window));
        }

        let started = Instant::now();
        loop {
            let elapsed = started.elapsed();
            if elapsed >= window {
                return Ok(None);
            }
            if let Some(interrupt) = control.pause(poll.min(window - elapsed)) {
                return Ok(Some(interrupt));
            }
            if browser.extent(container)? != before {
                return Ok(None);
            }
        }
    }

    fn expand_truncated<S: BrowserSession>(&self, browser: &S) {
        for locator in &self.config.selectors.expand_more {
            match browser.click_all(locator) {
                Ok(0) => {}
                Ok(n) => tracing::debug!("Expanded {} truncated reviews via {}", n, locator),
                Err(e) => tracing::debug!("Could not expand reviews via {}: {}", locator, e),
            }
        }
    }

    fn extract_all<S: BrowserSession>(
        &self,
        browser: &S,
        session: &mut HarvestSession,
        control: &RunControl,
        tracker: &ProgressTracker<'_>,
        stop_on_cancel: bool,
    ) -> Result<()> {
        let selectors = &self.config.selectors;

        tracker.report(progress::EXTRACT, "🔄 Processing reviews...");
        self.expand_truncated(browser);

        let items = browser.items(&selectors.item_marker)?;
        let total = items.len();
        session.items_seen = total;

        for (index, item) in items.iter().enumerate() {
            if stop_on_cancel && control.is_cancelled() {
                return Err(HarvestError::Cancelled);
            }

            match extract_record(item, &selectors.rating, &selectors.text) {
                Some(record) => session.records.push(record),
                None => {
                    session.skipped += 1;
                    tracing::debug!("Skipped review {} of {}: no rating or text", index + 1, total);
                }
            }

            tracker.report(
                interpolate(progress::EXTRACT, progress::DONE, index + 1, total),
                &format!("🔄 Processed {} of {} reviews", index + 1, total),
            );
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TimingConfig;
    use crate::testing::{FakeItem, FakeLauncher, FakePage, RecordingProgress};

    const PLACE: &str = "https://www.google.com/maps/place/Hotel+Example";

    fn harvester(page: FakePage) -> (Harvester<FakeLauncher>, FakeLauncher) {
        let launcher = FakeLauncher::new(page);
        let config = HarvestConfig {
            timing: TimingConfig::immediate(),
            ..HarvestConfig::default()
        };
        (Harvester::new(launcher.clone(), config), launcher)
    }

    fn reviews() -> Vec<FakeItem> {
        vec![
            FakeItem::new()
                .text("div.fontBodySmall", "5/5")
                .text("span.wiI7pd", "Great"),
            FakeItem::new().text("span.wiI7pd", "ok"),
            FakeItem::new().text("div.fontBodySmall", "3/5"),
            FakeItem::new().text("div.fontBodySmall", "last week"),
        ]
    }

    #[test]
    fn test_invalid_target_never_launches() {
        let (harvester, launcher) = harvester(FakePage::new());
        let progress = RecordingProgress::default();

        let report = harvester.harvest("https://example.com/maps", &progress);

        assert_eq!(report.status, HarvestStatus::InvalidTarget);
        assert!(report.records.is_empty());
        assert_eq!(launcher.stats().launches(), 0);
        assert_eq!(launcher.stats().closes(), 0);
    }

    #[test]
    fn test_stops_one_attempt_after_growth_stalls() {
        let (harvester, launcher) = harvester(FakePage::new().grows_for(3).items(reviews()));

        let report = harvester.harvest(PLACE, &RecordingProgress::default());

        assert_eq!(report.status, HarvestStatus::Completed);
        assert_eq!(launcher.stats().expands(), 4);
        assert_eq!(report.scroll_attempts, 3);
    }

    #[test]
    fn test_stops_exactly_at_attempt_cap() {
        let (harvester, launcher) = harvester(FakePage::new().grows_forever());

        let report = harvester.harvest(PLACE, &RecordingProgress::default());

        assert_eq!(report.status, HarvestStatus::AttemptCapReached);
        assert_eq!(launcher.stats().expands(), 50);
        assert_eq!(report.scroll_attempts, 50);
    }

    #[test]
    fn test_stable_cycles_requires_repeated_stalls() {
        let launcher = FakeLauncher::new(FakePage::new().grows_for(2));
        let mut config = HarvestConfig {
            timing: TimingConfig::immediate(),
            ..HarvestConfig::default()
        };
        config.timing.stable_cycles = 3;
        let harvester = Harvester::new(launcher.clone(), config);

        let report = harvester.harvest(PLACE, &RecordingProgress::default());

        assert_eq!(report.status, HarvestStatus::Completed);
        assert_eq!(launcher.stats().expands(), 5);
    }

    #[test]
    fn test_records_follow_filter_and_discovery_order() {
        let (harvester, _) = harvester(FakePage::new().grows_for(1).items(reviews()));

        let report = harvester.harvest(PLACE, &RecordingProgress::default());

        let summary: Vec<(Option<u8>, &str)> = report
            .records
            .iter()
            .map(|r| (r.rating, r.text.as_str()))
            .collect();
        assert_eq!(
            summary,
            vec![(Some(5), "Great"), (None, "ok"), (Some(3), "")]
        );
        assert_eq!(report.items_seen, 4);
        assert_eq!(report.skipped, 1);
    }

    #[test]
    fn test_missing_container_returns_empty_report() {
        let (harvester, launcher) = harvester(FakePage::new().without_reviews());

        let report = harvester.harvest(PLACE, &RecordingProgress::default());

        assert_eq!(report.status, HarvestStatus::ContainerNotFound);
        assert!(report.records.is_empty());
        assert!(report.message.contains("Could not find reviews section"));
        assert_eq!(launcher.stats().expands(), 0);
        assert_eq!(launcher.stats().closes(), 1);
    }

    #[test]
    fn test_configured_item_marker_drives_the_run() {
        let page = FakePage::new()
            .marker(Locator::css("div.review"))
            .grows_for(1)
            .items(reviews());
        let launcher = FakeLauncher::new(page);
        let mut config = HarvestConfig {
            timing: TimingConfig::immediate(),
            ..HarvestConfig::default()
        };
        config.selectors.item_marker = Locator::css("div.review");
        let harvester = Harvester::new(launcher.clone(), config);

        let report = harvester.harvest(PLACE, &RecordingProgress::default());

        assert_eq!(report.status, HarvestStatus::Completed);
        assert_eq!(report.records.len(), 3);
        assert_eq!(launcher.stats().expands(), 2);
    }

    #[test]
    fn test_container_without_reviews_is_not_found() {
        // the scroll panel renders but no review element ever shows up
        let (harvester, launcher) = harvester(
            FakePage::new()
                .without_reviews()
                .present("div.m6QErb.DxyBCb.kA9KIf.dS8AEf"),
        );

        let report = harvester.harvest(PLACE, &RecordingProgress::default());

        assert_eq!(report.status, HarvestStatus::ContainerNotFound);
        assert_eq!(launcher.stats().expands(), 0);
    }

    #[test]
    fn test_release_happens_once_on_success() {
        let (harvester, launcher) = harvester(FakePage::new().grows_for(2).items(reviews()));

        harvester.harvest(PLACE, &RecordingProgress::default());

        assert_eq!(launcher.stats().launches(), 1);
        assert_eq!(launcher.stats().closes(), 1);
    }

    #[test]
    fn test_mid_loop_failure_still_releases_browser() {
        let (harvester, launcher) = harvester(
            FakePage::new()
                .grows_forever()
                .fail_on_expand(4)
                .items(reviews()),
        );

        let report = harvester.harvest(PLACE, &RecordingProgress::default());

        assert_eq!(report.status, HarvestStatus::SessionFailure);
        assert!(report.records.is_empty());
        assert_eq!(launcher.stats().closes(), 1);
    }

    #[test]
    fn test_launch_failure_is_session_failure() {
        let (harvester, launcher) = harvester(FakePage::new().fail_launch());

        let report = harvester.harvest(PLACE, &RecordingProgress::default());

        assert_eq!(report.status, HarvestStatus::SessionFailure);
        assert_eq!(launcher.stats().closes(), 0);
    }

    #[test]
    fn test_progress_is_monotonic_and_finishes_at_100() {
        let (harvester, _) = harvester(FakePage::new().grows_for(7).items(reviews()));
        let progress = RecordingProgress::default();

        harvester.harvest(PLACE, &progress);

        let percents = progress.percents();
        assert!(percents.windows(2).all(|w| w[0] <= w[1]), "{percents:?}");
        assert_eq!(percents.first(), Some(&progress::LAUNCH));
        assert_eq!(percents.last(), Some(&progress::DONE));
        assert!(percents.contains(&progress::CONTAINER));
        assert!(percents.contains(&progress::EXTRACT));
    }

    #[test]
    fn test_consent_candidates_tried_in_order() {
        let (harvester, launcher) = harvester(
            FakePage::new()
                .clickable("//button[contains(., 'I agree')]")
                .clickable("[aria-label*='Accept']"),
        );
        let progress = RecordingProgress::default();

        harvester.harvest(PLACE, &progress);

        assert_eq!(
            launcher.stats().clicks(),
            vec!["[aria-label*='Accept']".to_string()]
        );
        assert!(progress
            .messages()
            .iter()
            .any(|m| m.contains("Cookies accepted")));
    }

    #[test]
    fn test_missing_consent_prompt_is_not_an_error() {
        let (harvester, launcher) = harvester(FakePage::new().items(reviews()));

        let report = harvester.harvest(PLACE, &RecordingProgress::default());

        assert_eq!(report.status, HarvestStatus::Completed);
        assert!(launcher.stats().clicks().is_empty());
    }

    #[test]
    fn test_cancelled_before_start_releases_and_reports() {
        let (harvester, launcher) = harvester(FakePage::new().grows_forever().items(reviews()));
        harvester.cancellation_token().cancel();

        let report = harvester.harvest(PLACE, &RecordingProgress::default());

        assert_eq!(report.status, HarvestStatus::Cancelled);
        assert!(report.records.is_empty());
        assert_eq!(launcher.stats().expands(), 0);
        assert_eq!(launcher.stats().closes(), 1);
    }

    #[test]
    fn test_cancel_during_scrolling_stops_loop() {
        let page = FakePage::new().grows_forever().items(reviews());
        let launcher = FakeLauncher::new(page);
        let token = CancellationToken::new();
        let harvester = Harvester::new(
            launcher.clone(),
            HarvestConfig {
                timing: TimingConfig::immediate(),
                ..HarvestConfig::default()
            },
        )
        .with_cancellation(token.clone());

        let progress = move |_percent: u8, message: &str| {
            if message.starts_with("📜 Loaded") {
                token.cancel();
            }
        };
        let report = harvester.harvest(PLACE, &progress);

        assert_eq!(report.status, HarvestStatus::Cancelled);
        assert_eq!(launcher.stats().expands(), 1);
        assert_eq!(launcher.stats().closes(), 1);
        // loaded reviews survive the cancel
        assert_eq!(report.records.len(), 3);
        assert_eq!(report.skipped, 1);
        assert_eq!(report.message, "🛑 Cancelled, kept 3 reviews");
    }

    #[test]
    fn test_cancel_during_extraction_keeps_records_so_far() {
        let page = FakePage::new().grows_for(1).items(reviews());
        let launcher = FakeLauncher::new(page);
        let token = CancellationToken::new();
        let harvester = Harvester::new(
            launcher.clone(),
            HarvestConfig {
                timing: TimingConfig::immediate(),
                ..HarvestConfig::default()
            },
        )
        .with_cancellation(token.clone());

        let progress = move |_percent: u8, message: &str| {
            if message.starts_with("🔄 Processed 1 of") {
                token.cancel();
            }
        };
        let report = harvester.harvest(PLACE, &progress);

        assert_eq!(report.status, HarvestStatus::Cancelled);
        assert_eq!(report.records.len(), 1);
        assert_eq!(report.message, "🛑 Cancelled, kept 1 reviews");
        assert_eq!(launcher.stats().closes(), 1);
    }

    #[test]
    fn test_deadline_while_waiting_for_container_is_not_a_missing_container() {
        let launcher = FakeLauncher::new(FakePage::new().without_reviews());
        let mut timing = TimingConfig::immediate();
        timing.container_wait_ms = 10_000;
        timing.overall_budget_secs = Some(1);
        let harvester = Harvester::new(
            launcher.clone(),
            HarvestConfig {
                timing,
                ..HarvestConfig::default()
            },
        );

        let started = Instant::now();
        let report = harvester.harvest(PLACE, &RecordingProgress::default());

        assert_eq!(report.status, HarvestStatus::DeadlineExceeded);
        assert!(report.records.is_empty());
        assert!(report.message.contains("Time budget exhausted"));
        assert!(!report.message.contains("Could not find reviews section"));
        assert!(started.elapsed() < Duration::from_secs(5));
        assert_eq!(launcher.stats().expands(), 0);
        assert_eq!(launcher.stats().closes(), 1);
    }

    #[test]
    fn test_deadline_stops_scrolling_but_keeps_reviews() {
        let launcher = FakeLauncher::new(FakePage::new().grows_forever().items(reviews()));
        let mut timing = TimingConfig::immediate();
        timing.settle_delay_ms = 20;
        timing.overall_budget_secs = Some(1);
        timing.max_scroll_attempts = 10_000;
        let harvester = Harvester::new(
            launcher.clone(),
            HarvestConfig {
                timing,
                ..HarvestConfig::default()
            },
        );

        let report = harvester.harvest(PLACE, &RecordingProgress::default());

        assert_eq!(report.status, HarvestStatus::DeadlineExceeded);
        assert_eq!(report.records.len(), 3);
        assert!(launcher.stats().expands() < 10_000);
        assert_eq!(launcher.stats().closes(), 1);
    }

    #[test]
    fn test_polling_settle_returns_as_soon_as_extent_grows() {
        let launcher = FakeLauncher::new(FakePage::new().grows_for(2).items(reviews()));
        let mut timing = TimingConfig::immediate();
        timing.settle_delay_ms = 5_000;
        timing.poll_interval_ms = 10;
        let harvester = Harvester::new(
            launcher.clone(),
            HarvestConfig {
                timing,
                ..HarvestConfig::default()
            },
        );

        let started = Instant::now();
        let report = harvester.harvest(PLACE, &RecordingProgress::default());

        assert_eq!(report.status, HarvestStatus::Completed);
        assert_eq!(launcher.stats().expands(), 3);
        // two growing attempts return early, only the final stall waits the full window
        assert!(started.elapsed() < Duration::from_secs(9));
    }

    #[test]
    fn test_truncated_reviews_are_expanded_before_extraction() {
        let (harvester, launcher) = harvester(FakePage::new().items(reviews()));

        harvester.harvest(PLACE, &RecordingProgress::default());

        assert_eq!(
            launcher.stats().click_alls(),
            vec!["button.w8nwRe".to_string()]
        );
    }
}
