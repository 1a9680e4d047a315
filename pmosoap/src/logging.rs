//! Initialisation du subscriber `tracing` à partir de la configuration

use anyhow::{Result, anyhow};
use pmoconfig::Config;
use tracing_subscriber::EnvFilter;

/// Installe un subscriber console global
///
/// Le niveau vient de `logger.min_level` ; `RUST_LOG` a priorité s'il est
/// défini. Ne fait rien si `logger.enable_console` vaut `false`.
///
/// Retourne une erreur si un subscriber global est déjà installé.
pub fn init_tracing(config: &Config) -> Result<()> {
    if !config.get_log_enable_console()? {
        return Ok(());
    }

    let level = config.get_log_min_level()?.to_lowercase();
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
        .map_err(|err| anyhow!("Failed to install tracing subscriber: {err}"))
}
