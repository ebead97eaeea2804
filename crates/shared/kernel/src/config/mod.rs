use config::{Config, Environment, File};
use serde::de::DeserializeOwned;
use std::borrow::Cow;
use std::path::{Path, PathBuf};
use tracing::info;

/// Prefix for environment overrides, e.g. `FLEETDESK__WIZARD__FINAL_STEP`.
pub const ENV_PREFIX: &str = "FLEETDESK";

/// Base name probed when no explicit config path is given.
pub const DEFAULT_CONFIG_NAME: &str = "fleetdesk";

#[fleetdesk_derive::fleet_error]
pub enum ConfigError {
    #[error("Config error{}: {source}", format_context(.context))]
    Config { source: config::ConfigError, context: Option<Cow<'static, str>> },
}

/// Loads `T` from a config file layered with `FLEETDESK__` environment overrides.
///
/// Nested keys use a double underscore, so `FLEETDESK__STORAGE__DATA_DIR` maps to
/// `storage.data_dir`. An explicit `path` must exist. Without one, a `fleetdesk.*`
/// file in the working directory is used when present (any format `config`
/// understands) and skipped otherwise, so environment and serde defaults alone
/// are enough.
///
/// # Errors
///
/// Returns [`ConfigError::Config`] if an explicit file is missing or any source
/// fails to parse or deserialize into `T`.
pub fn load_config<T>(path: Option<impl AsRef<Path>>) -> Result<T, ConfigError>
where
    T: DeserializeOwned,
{
    let (effective_path, required) = path.map_or_else(
        || (PathBuf::from(DEFAULT_CONFIG_NAME), false),
        |p| (p.as_ref().to_path_buf(), true),
    );

    let builder = Config::builder()
        .add_source(File::from(effective_path.as_path()).required(required))
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .convert_case(config::Case::Snake),
        );

    info!(path = %effective_path.display(), required, "Loading config");

    let config = builder
        .build()
        .context("Failed to build config")?
        .try_deserialize::<T>()
        .context("Failed to deserialize config")?;

    Ok(config)
}
