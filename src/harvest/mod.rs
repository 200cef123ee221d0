pub mod control;
pub mod extract;
pub mod harvester;
pub mod progress;
pub mod session;
pub mod target;

pub use control::{Interrupt, RunControl};
pub use harvester::Harvester;
pub use progress::{ProgressTracker, TracingProgress};
pub use session::SessionGuard;
pub use target::{check_target, validate_target};

#[cfg(feature = "cli")]
pub use progress::BarProgress;
