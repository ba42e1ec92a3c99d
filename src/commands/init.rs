use crate::commands::Out;
use crate::{Config, Result};
use anyhow::Context;
use std::path::Path;

/// Creates the stamps home directory and writes a `config.json` with default settings.
///
/// # Errors
/// - Returns an error if the config file already exists or any file operation fails.
pub async fn init(stamps_home: &Path) -> Result<Out<()>> {
    let config = Config::create(stamps_home)
        .await
        .context("Unable to create the stamps home directory and config")?;
    Ok(Out::text(format!(
        "Created the stamps config at {}",
        config.config_path().display()
    )))
}
