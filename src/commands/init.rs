use crate::args::InitArgs;
use crate::commands::Out;
use crate::error::{ErrorType, IntoResult};
use crate::{Config, Result};
use anyhow::Context;
use std::path::Path;

/// Creates the data directory, the `.backups` directory, an initial `config.json` and an empty
/// expense data file. Existing expense data is left in place.
///
/// # Errors
/// - Returns an error if any file operations fail.
pub async fn init(budget_home: &Path, args: &InitArgs) -> Result<Out<()>> {
    let config = Config::create(budget_home, args.backup_copies(), args.quota_bytes())
        .await
        .context("Unable to create the data directory and config")
        .pub_result(ErrorType::Config)?;
    Ok(format!(
        "Successfully created the budget directory at {}",
        config.root().display()
    )
    .into())
}
