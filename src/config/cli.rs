use crate::config::toml_config::DashboardConfig;
use crate::domain::model::GroupFilter;
use clap::Parser;

#[derive(Debug, Clone, Parser)]
#[command(name = "room-dashboard")]
#[command(about = "Booking dashboard over a shared room spreadsheet")]
pub struct CliArgs {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "dashboard.toml")]
    pub config: String,

    /// Group value to show in the table and export, or "All"
    #[arg(long, alias = "hostel", default_value = "All")]
    pub filter: String,

    /// Keep refreshing on a fixed interval
    #[arg(long)]
    pub watch: bool,

    /// Override refresh.interval_seconds
    #[arg(long)]
    pub interval: Option<u64>,

    /// Stop watching after this many runs
    #[arg(long)]
    pub max_runs: Option<usize>,

    /// Override load.output_path
    #[arg(long)]
    pub output_path: Option<String>,

    /// Show the configuration without fetching anything
    #[arg(long)]
    pub dry_run: bool,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    pub json_logs: bool,
}

impl CliArgs {
    pub fn selection(&self) -> GroupFilter {
        GroupFilter::from_selection(&self.filter)
    }

    pub fn apply_overrides(&self, config: &mut DashboardConfig) {
        if let Some(interval) = self.interval {
            config.refresh.interval_seconds = interval;
            tracing::info!("🔧 Refresh interval overridden to {}s", interval);
        }
        if let Some(output_path) = &self.output_path {
            config.load.output_path = output_path.clone();
            tracing::info!("🔧 Output path overridden to {}", output_path);
        }
    }
}
