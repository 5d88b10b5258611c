//! CLI command implementations
//!
//! The `cloud-save` binary drives [`CloudSaveService`] from the command line.
//! Identity and target values come from flags, falling back to the same
//! `CLOUD_SAVE_*` environment variables [`CloudSaveConfig::from_env`] reads.

use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::net::SocketAddr;

pub mod data;
pub mod error;
pub mod files;

pub use data::DataCommand;
pub use error::CliError;
pub use files::FilesCommand;

use crate::config::{env, CloudSaveConfig, Environment};
use crate::CloudSaveService;

/// Output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output
    #[default]
    Human,
    /// JSON output
    Json,
}

impl OutputFormat {
    /// Print `value` as pretty JSON, or through `human` otherwise
    pub fn emit<T: Serialize>(&self, value: &T, human: impl FnOnce(&T)) -> Result<(), CliError> {
        match self {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(value)?),
            OutputFormat::Human => human(value),
        }
        Ok(())
    }
}

/// Cloud save command-line client
#[derive(Parser, Debug)]
#[command(name = "cloud-save")]
#[command(about = "Store, load, query and delete cloud save data and files", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Service environment: production or staging
    #[arg(long, global = true, env = env::ENVIRONMENT, default_value = "production")]
    pub environment: Environment,

    /// Service base URL, overrides --environment
    #[arg(long, global = true, env = env::BASE_URL)]
    pub base_url: Option<String>,

    /// Cloud project id
    #[arg(long, global = true, env = env::PROJECT_ID)]
    pub project_id: Option<String>,

    /// Signed-in player id
    #[arg(long, global = true, env = env::PLAYER_ID)]
    pub player_id: Option<String>,

    /// Bearer access token of the signed-in player
    #[arg(long, global = true, env = env::ACCESS_TOKEN, hide_env_values = true)]
    pub access_token: Option<String>,

    /// Output format (json or human)
    #[arg(long, global = true, default_value = "human")]
    pub output_format: OutputFormat,

    /// Expose Prometheus metrics on this address
    #[arg(long, global = true)]
    pub metrics_addr: Option<SocketAddr>,
}

/// CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Key-value data commands
    #[command(flatten)]
    Data(DataCommand),

    /// Player file commands
    Files(FilesCommand),
}

impl Cli {
    /// Client configuration from the parsed flags
    pub fn config(&self) -> CloudSaveConfig {
        CloudSaveConfig {
            environment: self.environment,
            base_url: self.base_url.clone(),
            project_id: self.project_id.clone(),
            player_id: self.player_id.clone(),
            access_token: self.access_token.clone(),
        }
    }

    /// Build the service and run the selected command
    pub async fn execute(&self) -> Result<(), CliError> {
        let service = CloudSaveService::from_config(&self.config())?;

        match &self.command {
            Commands::Data(command) => command.execute(&service, self.output_format).await,
            Commands::Files(command) => command.execute(&service, self.output_format).await,
        }
    }
}
