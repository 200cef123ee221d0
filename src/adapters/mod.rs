// Adapters layer: concrete browser and storage implementations behind the domain ports.

pub mod chrome;
pub mod storage;

pub use chrome::{ChromeLauncher, ChromeSession};
pub use storage::LocalStorage;
