use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

const SLICE: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interrupt {
    Cancelled,
    DeadlineExceeded,
}

/// Cancellation and wall-clock budget for one run. Every wait goes through
/// here so a cancel request is honoured within one slice.
#[derive(Debug, Clone)]
pub struct RunControl {
    cancel: CancellationToken,
    deadline: Option<Instant>,
}

impl RunControl {
    pub fn new(cancel: CancellationToken, budget: Option<Duration>) -> Self {
        Self {
            cancel,
            deadline: budget.map(|b| Instant::now() + b),
        }
    }

    pub fn unbounded() -> Self {
        Self::new(CancellationToken::new(), None)
    }

    pub fn check(&self) -> Option<Interrupt> {
        if self.cancel.is_cancelled() {
            return Some(Interrupt::Cancelled);
        }
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Some(Interrupt::DeadlineExceeded),
            _ => None,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Blocking sleep that wakes early on cancellation or deadline.
    pub fn pause(&self, duration: Duration) -> Option<Interrupt> {
        let until = Instant::now() + duration;
        loop {
            if let Some(interrupt) = self.check() {
                return Some(interrupt);
            }
            let now = Instant::now();
            if now >= until {
                return None;
            }
            let mut step = (until - now).min(SLICE);
            if let Some(deadline) = self.deadline {
                step = step.min(deadline.saturating_duration_since(now));
            }
            std::thread::sleep(step);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pause_runs_to_completion() {
        let control = RunControl::unbounded();
        let started = Instant::now();
        assert_eq!(control.pause(Duration::from_millis(30)), None);
        assert!(started.elapsed() >= Duration::from_millis(30));
    }

    #[test]
    fn test_cancelled_token_interrupts_immediately() {
        let token = CancellationToken::new();
        token.cancel();
        let control = RunControl::new(token, None);
        let started = Instant::now();
        assert_eq!(
            control.pause(Duration::from_secs(5)),
            Some(Interrupt::Cancelled)
        );
        assert!(started.elapsed() < Duration::from_secs(1));
    }

    #[test]
    fn test_deadline_cuts_pause_short() {
        let control = RunControl::new(CancellationToken::new(), Some(Duration::from_millis(20)));
        let started = Instant::now();
        assert_eq!(
            control.pause(Duration::from_secs(5)),
            Some(Interrupt::DeadlineExceeded)
        );
        assert!(started.elapsed() < Duration::from_secs(1));
    }

    #[test]
    fn test_cancel_from_another_thread() {
        let token = CancellationToken::new();
        let control = RunControl::new(token.clone(), None);
        let handle = std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(50));
            token.cancel();
        });
        assert_eq!(
            control.pause(Duration::from_secs(10)),
            Some(Interrupt::Cancelled)
        );
        handle.join().unwrap();
    }
}
