//! CLI command definitions and dispatch.

pub mod catalog;
pub mod check;
pub mod config;
pub mod role;
pub mod subject;

use clap::{Parser, Subcommand};
use tracing::warn;

use crate::output::OutputFormat;
use rolegate_core::config::AppConfig;
use rolegate_core::config::persistence::PersistenceProvider;
use rolegate_core::error::AppError;
use rolegate_core::types::SubjectId;
use rolegate_service::{PermissionEngine, RequestContext};

/// Rolegate: role-based permission administration
#[derive(Debug, Parser)]
#[command(name = "rolegate", version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/default.toml")]
    pub config: String,

    /// Environment name; loads `config/default` then `config/{env}`
    /// instead of `--config`
    #[arg(short, long)]
    pub env: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Permission state file (overrides `persistence.path`)
    #[arg(short, long)]
    pub state: Option<String>,

    /// Acting subject for administration commands
    #[arg(short, long)]
    pub actor: Option<SubjectId>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Permission catalog
    Catalog(catalog::CatalogArgs),
    /// Role defaults
    Role(role::RoleArgs),
    /// Subject roles and overrides
    Subject(subject::SubjectArgs),
    /// Check one permission for one subject
    Check(check::CheckArgs),
    /// Configuration management
    Config(config::ConfigArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self, app_config: AppConfig) -> Result<(), AppError> {
        match &self.command {
            Commands::Catalog(args) => catalog::execute(args, self.format),
            Commands::Role(args) => role::execute(args, self, &app_config).await,
            Commands::Subject(args) => subject::execute(args, self, &app_config).await,
            Commands::Check(args) => check::execute(args, self, &app_config).await,
            Commands::Config(args) => config::execute(args, self, &app_config),
        }
    }

    /// Load configuration, applying the `--state` override.
    pub fn load_config(&self) -> Result<AppConfig, AppError> {
        let mut app_config = match &self.env {
            Some(env) => AppConfig::load(env)?,
            None => AppConfig::from_file(&self.config)?,
        };
        if let Some(state) = &self.state {
            app_config.persistence.provider = PersistenceProvider::Json;
            app_config.persistence.path = state.clone();
        }
        Ok(app_config)
    }

    /// Request context for `--actor`.
    ///
    /// An actor missing from the state is treated as no actor at all, so
    /// administration calls are denied.
    pub fn request_context(&self, engine: &PermissionEngine) -> RequestContext {
        let Some(actor_id) = self.actor else {
            return RequestContext::anonymous();
        };
        match engine.subjects().get(actor_id) {
            Some(actor) => RequestContext::new(actor),
            None => {
                warn!(actor_id = %actor_id, "Acting subject is not registered");
                RequestContext::anonymous()
            }
        }
    }
}

/// Helper: open the engine over the configured state
pub async fn open_engine(app_config: &AppConfig) -> Result<PermissionEngine, AppError> {
    PermissionEngine::from_config(app_config).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_customize_accepts_empty_set() {
        let actor = SubjectId::new();
        let target = SubjectId::new();
        let cli = Cli::try_parse_from([
            "rolegate",
            "--actor",
            &actor.to_string(),
            "subject",
            "customize",
            &target.to_string(),
        ])
        .unwrap();

        assert_eq!(cli.actor, Some(actor));
        match cli.command {
            Commands::Subject(subject::SubjectArgs {
                command: subject::SubjectCommand::Customize { id, permissions },
            }) => {
                assert_eq!(id, target);
                assert!(permissions.is_empty());
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_state_override_forces_json_provider() {
        let cli = Cli::try_parse_from([
            "rolegate",
            "--config",
            "does/not/exist",
            "--state",
            "/tmp/rolegate-state.json",
            "catalog",
            "list",
        ])
        .unwrap();

        let app_config = cli.load_config().unwrap();
        assert_eq!(app_config.persistence.provider, PersistenceProvider::Json);
        assert_eq!(app_config.persistence.path, "/tmp/rolegate-state.json");
    }

    #[test]
    fn test_bad_actor_id_is_rejected() {
        let err = Cli::try_parse_from(["rolegate", "--actor", "nobody", "role", "list"]);
        assert!(err.is_err());
    }
}
