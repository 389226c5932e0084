//! Permission check CLI command.

use clap::Args;
use serde::Serialize;

use super::Cli;
use crate::output::{self, OutputFormat};
use rolegate_core::config::AppConfig;
use rolegate_core::error::AppError;
use rolegate_core::types::SubjectId;

/// Arguments for the check command
#[derive(Debug, Args)]
pub struct CheckArgs {
    /// Subject ID
    pub subject: SubjectId,
    /// Permission identifier, e.g. VIEW_REPORTS
    pub permission: String,
}

/// Check result
#[derive(Debug, Serialize)]
struct CheckResult<'a> {
    subject_id: SubjectId,
    permission: &'a str,
    allowed: bool,
}

/// Execute the check command
///
/// Prints `allowed` or `denied`; both are a successful exit.
pub async fn execute(args: &CheckArgs, cli: &Cli, app_config: &AppConfig) -> Result<(), AppError> {
    let engine = super::open_engine(app_config).await?;
    let subject = engine.subjects().get(args.subject);
    let allowed = engine
        .resolver()
        .has_permission_named(subject.as_ref(), &args.permission);

    let result = CheckResult {
        subject_id: args.subject,
        permission: &args.permission,
        allowed,
    };
    match cli.format {
        OutputFormat::Json => println!("{}", output::item(&result, cli.format, &[])?),
        OutputFormat::Table => println!("{}", if allowed { "allowed" } else { "denied" }),
    }
    Ok(())
}
