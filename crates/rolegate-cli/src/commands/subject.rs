//! Subject role and override CLI commands.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use super::Cli;
use crate::output::{self, Notice};
use rolegate_core::config::AppConfig;
use rolegate_core::error::AppError;
use rolegate_core::types::SubjectId;
use rolegate_entity::role::RoleName;

/// Arguments for subject commands
#[derive(Debug, Args)]
pub struct SubjectArgs {
    /// Subject subcommand
    #[command(subcommand)]
    pub command: SubjectCommand,
}

/// Subject subcommands
#[derive(Debug, Subcommand)]
pub enum SubjectCommand {
    /// List subjects with their roles and effective permissions
    List,
    /// Show one subject's role, override, and effective permissions
    Show {
        /// Subject ID
        id: SubjectId,
    },
    /// Assign a role to a subject
    Assign {
        /// Subject ID
        id: SubjectId,
        /// Role name (case-sensitive)
        role: String,
    },
    /// Replace a subject's role defaults with a custom set
    Customize {
        /// Subject ID
        id: SubjectId,
        /// Permission identifiers; none means the subject holds nothing
        permissions: Vec<String>,
    },
    /// Remove a subject's custom set so it follows its role again
    Reset {
        /// Subject ID
        id: SubjectId,
    },
    /// Create the first administrator of a fresh state file
    Bootstrap {
        /// Subject ID
        id: SubjectId,
        /// A role whose defaults grant the administration permission
        role: String,
    },
}

/// Subject display row
#[derive(Debug, Serialize, Tabled)]
struct SubjectRow {
    /// Subject ID
    id: String,
    /// Role
    role: String,
    /// Where the effective set comes from
    source: String,
    /// Effective permissions
    effective: String,
}

/// Execute subject commands
pub async fn execute(
    args: &SubjectArgs,
    cli: &Cli,
    app_config: &AppConfig,
) -> Result<(), AppError> {
    let engine = super::open_engine(app_config).await?;
    let ctx = cli.request_context(&engine);
    let admin = engine.admin();

    match &args.command {
        SubjectCommand::List => {
            let rows: Vec<SubjectRow> = engine
                .subjects()
                .list()
                .into_iter()
                .map(|s| {
                    let effective = engine.resolver().explain(Some(&s));
                    SubjectRow {
                        id: s.id.to_string(),
                        role: s.role.to_string(),
                        source: effective.source.to_string(),
                        effective: effective.permissions.to_string(),
                    }
                })
                .collect();
            println!("{}", output::rows(&rows, cli.format)?);
        }
        SubjectCommand::Show { id } => {
            let view = engine.inspect_subject(*id)?;
            let rows = [
                ("Subject", view.subject_id.to_string()),
                ("Role", view.role.to_string()),
                (
                    "Custom",
                    view.custom
                        .as_ref()
                        .map(ToString::to_string)
                        .unwrap_or_else(|| "(role defaults)".to_string()),
                ),
                ("Source", view.effective.source.to_string()),
                ("Effective", view.effective.permissions.to_string()),
            ];
            println!("{}", output::item(&view, cli.format, &rows)?);
        }
        SubjectCommand::Assign { id, role } => {
            let subject = admin.assign_role_raw(&ctx, *id, role).await?;
            output::notice(Notice::Done, &format!(
                "Subject '{}' assigned role '{}'",
                subject.id, subject.role
            ));
        }
        SubjectCommand::Customize { id, permissions } => {
            admin
                .customize_subject_raw(&ctx, *id, permissions.as_slice())
                .await?;
            output::notice(Notice::Done, &format!("Subject '{id}' customized"));
            let effective = engine.inspect_subject(*id)?.effective.permissions;
            println!("{}", output::field_list(&[("Effective", effective.to_string())]));
        }
        SubjectCommand::Reset { id } => {
            if admin.reset_subject(&ctx, *id).await? {
                output::notice(Notice::Done, &format!("Subject '{id}' reset to role defaults"));
            } else {
                output::notice(Notice::Unchanged, &format!("Subject '{id}' had no custom permissions"));
            }
        }
        SubjectCommand::Bootstrap { id, role } => {
            let subject = engine.bootstrap_admin(*id, RoleName::new(role.as_str())?).await?;
            output::notice(Notice::Done, &format!(
                "Subject '{}' is now an administrator via role '{}'",
                subject.id, subject.role
            ));
        }
    }

    Ok(())
}
