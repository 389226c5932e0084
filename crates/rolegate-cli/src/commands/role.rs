//! Role defaults CLI commands.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use super::Cli;
use crate::output::{self, Notice, OutputFormat};
use rolegate_core::config::AppConfig;
use rolegate_core::error::AppError;

/// Arguments for role commands
#[derive(Debug, Args)]
pub struct RoleArgs {
    /// Role subcommand
    #[command(subcommand)]
    pub command: RoleCommand,
}

/// Role subcommands
#[derive(Debug, Subcommand)]
pub enum RoleCommand {
    /// List roles and their defaults
    List,
    /// Show one role's default permissions
    Show {
        /// Role name (case-sensitive)
        name: String,
    },
    /// Replace a role's default permissions (creates the role if needed)
    Set {
        /// Role name (case-sensitive)
        name: String,
        /// Permission identifiers; none means the role grants nothing
        permissions: Vec<String>,
    },
}

/// Role display row
#[derive(Debug, Serialize, Tabled)]
struct RoleRow {
    /// Role name
    role: String,
    /// Number of default permissions
    count: usize,
    /// Default permissions
    permissions: String,
}

/// Permission display row
#[derive(Debug, Serialize, Tabled)]
struct GrantRow {
    /// Wire identifier
    identifier: &'static str,
    /// Human-readable label
    label: &'static str,
}

/// Execute role commands
pub async fn execute(args: &RoleArgs, cli: &Cli, app_config: &AppConfig) -> Result<(), AppError> {
    let engine = super::open_engine(app_config).await?;

    match &args.command {
        RoleCommand::List => {
            let rows: Vec<RoleRow> = engine
                .roles()
                .snapshot()
                .into_iter()
                .map(|r| RoleRow {
                    role: r.name.to_string(),
                    count: r.permissions.len(),
                    permissions: r.permissions.to_string(),
                })
                .collect();
            println!("{}", output::rows(&rows, cli.format)?);
        }
        RoleCommand::Show { name } => {
            let defaults = engine.roles().require_defaults(name)?;
            match cli.format {
                OutputFormat::Json => {
                    println!("{}", output::item(&defaults, cli.format, &[])?);
                }
                OutputFormat::Table => {
                    let rows: Vec<GrantRow> = defaults
                        .iter()
                        .map(|p| GrantRow {
                            identifier: p.as_str(),
                            label: p.label(),
                        })
                        .collect();
                    println!("{}", output::rows(&rows, cli.format)?);
                }
            }
        }
        RoleCommand::Set { name, permissions } => {
            let ctx = cli.request_context(&engine);
            let previous = engine
                .admin()
                .edit_role_defaults_raw(&ctx, name, permissions.as_slice())
                .await?;
            output::notice(Notice::Done, &format!("Role '{name}' defaults updated"));
            println!(
                "{}",
                output::field_list(&[
                    ("Previous", previous.to_string()),
                    ("Current", engine.roles().get_defaults(name).to_string()),
                ])
            );
        }
    }

    Ok(())
}
