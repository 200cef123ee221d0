use crate::domain::ports::ProgressSink;
use std::cell::Cell;

pub const LAUNCH: u8 = 5;
pub const CONSENT: u8 = 10;
pub const CONTAINER: u8 = 15;
pub const SCROLL_END: u8 = 70;
pub const EXTRACT: u8 = 75;
pub const DONE: u8 = 100;

/// Linear interpolation of `done / total` into `lo..=hi`.
pub fn interpolate(lo: u8, hi: u8, done: usize, total: usize) -> u8 {
    if total == 0 || hi <= lo {
        return hi.max(lo);
    }
    let done = done.min(total);
    let span = (hi - lo) as usize;
    lo + (span * done / total) as u8
}

/// Forwards events to a sink, never letting the percentage go backwards.
pub struct ProgressTracker<'a> {
    sink: &'a dyn ProgressSink,
    last: Cell<u8>,
}

impl<'a> ProgressTracker<'a> {
    pub fn new(sink: &'a dyn ProgressSink) -> Self {
        Self {
            sink,
            last: Cell::new(0),
        }
    }

    pub fn report(&self, percent: u8, message: &str) {
        let percent = percent.min(DONE).max(self.last.get());
        self.last.set(percent);
        tracing::debug!(percent, "{}", message);
        self.sink.report(percent, message);
    }

    /// Reports at the current percentage.
    pub fn status(&self, message: &str) {
        self.report(self.last.get(), message);
    }
}

impl<F> ProgressSink for F
where
    F: Fn(u8, &str) + Send + Sync,
{
    fn report(&self, percent: u8, message: &str) {
        self(percent, message)
    }
}

/// Sends progress to the log only.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingProgress;

impl ProgressSink for TracingProgress {
    fn report(&self, percent: u8, message: &str) {
        tracing::info!("[{:>3}%] {}", percent, message);
    }
}

#[cfg(feature = "cli")]
pub use bar::BarProgress;

#[cfg(feature = "cli")]
mod bar {
    use super::DONE;
    use crate::domain::ports::ProgressSink;
    use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
    use std::time::Duration;

    /// Terminal progress bar on stderr.
    pub struct BarProgress {
        bar: ProgressBar,
    }

    impl BarProgress {
        pub fn new() -> Self {
            let bar = ProgressBar::new(DONE as u64);
            bar.set_style(
                ProgressStyle::with_template(
                    "{spinner:.cyan} [{elapsed_precise}] [{bar:30.cyan/blue}] {pos:>3}% {msg}",
                )
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
            );
            bar.set_draw_target(ProgressDrawTarget::stderr_with_hz(12));
            bar.enable_steady_tick(Duration::from_millis(120));
            Self { bar }
        }
    }

    impl Default for BarProgress {
        fn default() -> Self {
            Self::new()
        }
    }

    impl ProgressSink for BarProgress {
        fn report(&self, percent: u8, message: &str) {
            self.bar.set_position(percent as u64);
            if percent >= DONE {
                self.bar.finish_with_message(message.to_string());
            } else {
                self.bar.set_message(message.to_string());
            }
        }
    }

    impl Drop for BarProgress {
        fn drop(&mut self) {
            if !self.bar.is_finished() {
                self.bar.abandon();
            }
        }
    }
}
