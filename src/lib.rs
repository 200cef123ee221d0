pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod harvest;
#[cfg(any(test, feature = "testing"))]
pub mod testing;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::{ChromeLauncher, LocalStorage};
pub use app::pipelines::ReviewPipeline;
pub use core::etl::EtlEngine;
pub use domain::model::{HarvestReport, HarvestStatus, ReviewRecord};
pub use harvest::{check_target, validate_target, Harvester};
pub use utils::error::{HarvestError, Result};
