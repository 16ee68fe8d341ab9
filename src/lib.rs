pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use adapters::{build_source, storage::LocalStorage};
#[cfg(feature = "cli")]
pub use config::CliArgs;
pub use config::DashboardConfig;
pub use core::{
    engine::{DashboardEngine, RunOutcome, RunReport},
    pipeline::DashboardPipeline,
};
pub use domain::model::{BookingSummary, CellValue, GroupAggregate, GroupFilter, Table};
pub use utils::error::{DashboardError, Result};
