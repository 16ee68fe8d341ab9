use crate::adapters::export;
use crate::core::aggregate::{group_bookings, summarize};
use crate::core::classify::{classify, ClassifySettings};
use crate::core::filter::{apply_filter, filter_options, resolve_selection};
use crate::core::normalize::{normalize_column_name, normalize_table};
use crate::domain::model::{Dashboard, GroupFilter, Table};
use crate::domain::ports::{ConfigProvider, Pipeline, RecordSource, Storage};
use crate::utils::error::{DashboardError, Result};
use chrono::Utc;

pub struct DashboardPipeline<S: Storage, C: ConfigProvider> {
    source: Box<dyn RecordSource>,
    storage: S,
    config: C,
    selection: GroupFilter,
}

impl<S: Storage, C: ConfigProvider> DashboardPipeline<S, C> {
    pub fn new(source: Box<dyn RecordSource>, storage: S, config: C) -> Self {
        Self {
            source,
            storage,
            config,
            selection: GroupFilter::All,
        }
    }

    pub fn with_selection(mut self, selection: GroupFilter) -> Self {
        self.selection = selection;
        self
    }

    pub fn selection(&self) -> &GroupFilter {
        &self.selection
    }

    fn render_artifacts(&self, dashboard: &Dashboard) -> Result<Vec<(String, Vec<u8>)>> {
        let prefix = self.config.export_prefix();
        let mut files = Vec::new();

        for format in self.config.output_formats() {
            let file = match format.as_str() {
                "xlsx" => (
                    export::export_file_name(prefix, &dashboard.selection, "xlsx"),
                    export::to_xlsx(&dashboard.view)?,
                ),
                "csv" => (
                    export::export_file_name(prefix, &dashboard.selection, "csv"),
                    export::to_csv(&dashboard.view)?,
                ),
                "json" => (
                    format!(
                        "{}_{}_summary.json",
                        prefix,
                        export::filter_token(&dashboard.selection)
                    ),
                    export::summary_json(dashboard)?,
                ),
                other => {
                    return Err(DashboardError::ValidationError {
                        message: format!("unsupported output format '{}'", other),
                    })
                }
            };
            files.push(file);
        }

        Ok(files)
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for DashboardPipeline<S, C> {
    fn describe_source(&self) -> String {
        self.source.describe()
    }

    async fn extract(&self) -> Result<Table> {
        tracing::info!("📥 Fetching booking records from {}", self.source.describe());

        let table = self.source.fetch().await?;

        tracing::info!(
            "Fetched {} rows with {} columns",
            table.len(),
            table.columns().len()
        );
        Ok(table)
    }

    async fn transform(&self, table: Table) -> Result<Dashboard> {
        let table = normalize_table(table);
        let group_field = normalize_column_name(self.config.group_field());

        let settings = ClassifySettings::new(self.config.marker(), self.config.booked_column());
        let classified = classify(table, &settings);
        let summary = summarize(&classified);

        let grouping_available = classified.table().has_column(&group_field);
        if !grouping_available {
            tracing::warn!(
                "⚠️ No '{}' column in the sheet; filter and chart are disabled",
                group_field
            );
        }

        let groups = group_bookings(&classified, &group_field);
        let options = filter_options(&groups);
        let selection = resolve_selection(&self.selection, &options);
        let view = apply_filter(&classified, &group_field, &selection)?;

        tracing::info!(
            "Rooms: {} total, {} booked, {} available; showing {} rows for '{}'",
            summary.total_rooms,
            summary.booked_rooms,
            summary.available_rooms,
            view.len(),
            selection
        );

        Ok(Dashboard {
            title: self.config.title().to_string(),
            source: self.source.describe(),
            group_field,
            grouping_available,
            summary,
            groups,
            selection,
            filter_options: options,
            view,
            refreshed_at: Utc::now(),
        })
    }

    async fn load(&self, dashboard: &Dashboard) -> Result<Vec<String>> {
        let files = self.render_artifacts(dashboard)?;

        if let Some(bundle_name) = self.config.bundle_name() {
            tracing::debug!("Bundling {} files into {}", files.len(), bundle_name);
            let zip_data = export::bundle(&files)?;
            self.storage.write_file(bundle_name, &zip_data).await?;
            return Ok(vec![self.storage.location(bundle_name)]);
        }

        let mut written = Vec::with_capacity(files.len());
        for (name, data) in &files {
            tracing::debug!("Writing {} ({} bytes)", name, data.len());
            self.storage.write_file(name, data).await?;
            written.push(self.storage.location(name));
        }

        Ok(written)
    }
}
