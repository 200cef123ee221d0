pub mod etl;
pub mod export;

pub use crate::domain::model::{ExportBundle, HarvestReport, ReviewRecord};
pub use crate::domain::ports::{ConfigProvider, Pipeline, Storage};
pub use crate::utils::error::Result;
