use crate::domain::ports::BrowserSession;
use std::ops::Deref;

/// Owns a browser session and closes it exactly once when dropped, on every
/// exit path including unwinding.
pub struct SessionGuard<S: BrowserSession> {
    session: S,
}

impl<S: BrowserSession> SessionGuard<S> {
    pub fn new(session: S) -> Self {
        Self { session }
    }
}

impl<S: BrowserSession> Deref for SessionGuard<S> {
    type Target = S;

    fn deref(&self) -> &S {
        &self.session
    }
}

impl<S: BrowserSession> Drop for SessionGuard<S> {
    fn drop(&mut self) {
        self.session.close();
        tracing::debug!("Browser session released");
    }
}
