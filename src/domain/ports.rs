use crate::domain::model::{Dashboard, Table};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;

    /// Where `path` ends up, for reporting.
    fn location(&self, path: &str) -> String;
}

pub trait ConfigProvider: Send + Sync {
    fn title(&self) -> &str;
    fn group_field(&self) -> &str;
    fn booked_column(&self) -> &str;
    fn marker(&self) -> &str;
    fn export_prefix(&self) -> &str;
    fn output_formats(&self) -> &[String];
    /// ZIP bundle name when bundling is enabled.
    fn bundle_name(&self) -> Option<&str>;
}

/// Supplies the raw booking sheet. Any failure is fatal for the run.
#[async_trait]
pub trait RecordSource: Send + Sync {
    fn describe(&self) -> String;
    async fn fetch(&self) -> Result<Table>;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    fn describe_source(&self) -> String;
    async fn extract(&self) -> Result<Table>;
    async fn transform(&self, table: Table) -> Result<Dashboard>;
    async fn load(&self, dashboard: &Dashboard) -> Result<Vec<String>>;
}
