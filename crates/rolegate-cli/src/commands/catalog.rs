//! Permission catalog CLI commands.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use crate::output::{self, OutputFormat};
use rolegate_core::error::AppError;
use rolegate_entity::permission::catalog;

/// Arguments for catalog commands
#[derive(Debug, Args)]
pub struct CatalogArgs {
    /// Catalog subcommand
    #[command(subcommand)]
    pub command: CatalogCommand,
}

/// Catalog subcommands
#[derive(Debug, Subcommand)]
pub enum CatalogCommand {
    /// List every permission identifier
    List,
}

/// Catalog display row
#[derive(Debug, Serialize, Tabled)]
struct PermissionRow {
    /// Wire identifier
    identifier: &'static str,
    /// Human-readable label
    label: &'static str,
}

/// Execute catalog commands
pub fn execute(args: &CatalogArgs, format: OutputFormat) -> Result<(), AppError> {
    match &args.command {
        CatalogCommand::List => {
            let rows: Vec<PermissionRow> = catalog::all_permissions()
                .map(|p| PermissionRow {
                    identifier: p.as_str(),
                    label: p.label(),
                })
                .collect();
            println!("{}", output::rows(&rows, format)?);
        }
    }
    Ok(())
}
