pub mod aggregate;
pub mod classify;
pub mod engine;
pub mod filter;
pub mod normalize;
pub mod pipeline;

pub use crate::domain::model::{ClassifiedTable, Dashboard, Table};
pub use crate::domain::ports::{ConfigProvider, Pipeline, RecordSource, Storage};
pub use crate::utils::error::Result;
