//! Configuration CLI commands.

use clap::{Args, Subcommand};

use super::Cli;
use crate::output::{self, Notice};
use rolegate_core::config::AppConfig;
use rolegate_core::error::AppError;
use rolegate_entity::permission::Permission;
use rolegate_entity::snapshot::PermissionSnapshot;

/// Arguments for config commands
#[derive(Debug, Args)]
pub struct ConfigArgs {
    /// Config subcommand
    #[command(subcommand)]
    pub command: ConfigCommand,
}

/// Config subcommands
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show the effective configuration
    Show,
    /// Validate the configuration and its role seeds
    Validate,
}

/// Execute config commands
pub fn execute(args: &ConfigArgs, cli: &Cli, config: &AppConfig) -> Result<(), AppError> {
    let format = cli.format;

    match &args.command {
        ConfigCommand::Show => {
            let rows = [
                ("Admin permission", config.access.admin_permission.clone()),
                ("Unknown role", format!("{:?}", config.access.unknown_role)),
                ("Seed roles", config.access.roles.len().to_string()),
                ("Persistence", config.persistence.provider.to_string()),
                ("State file", config.persistence.path.clone()),
                ("Log level", config.logging.level.clone()),
                ("Log format", config.logging.format.clone()),
            ];
            println!("{}", output::item(config, format, &rows)?);
        }
        ConfigCommand::Validate => {
            let checked = config
                .access
                .admin_permission
                .parse::<Permission>()
                .and_then(|_| PermissionSnapshot::from_seeds(&config.access.roles));
            let seeds = checked?;
            output::notice(Notice::Done, &format!("Configuration '{}' is valid", cli.config));
            let mut fields = vec![("Admin permission", config.access.admin_permission.clone())];
            fields.extend(
                seeds
                    .roles
                    .iter()
                    .map(|role| (role.name.as_str(), role.permissions.to_string())),
            );
            println!("{}", output::field_list(&fields));
        }
    }

    Ok(())
}
