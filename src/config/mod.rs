#[cfg(feature = "cli")]
pub mod cli;
pub mod credentials;
pub mod toml_config;

#[cfg(feature = "cli")]
pub use cli::CliArgs;
pub use credentials::{Credential, CredentialsConfig};
pub use toml_config::{DashboardConfig, SourceConfig, SourceKind};
