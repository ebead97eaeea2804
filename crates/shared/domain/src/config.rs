use crate::constants::{DEFAULT_AUTOSAVE_INTERVAL_MS, DEFAULT_DRAFT_KEY, DEFAULT_FINAL_STEP};
use serde::Deserialize;
use std::ops::{Deref, DerefMut};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Top-level application configuration.
#[derive(Default, Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfigInner {
    pub wizard: WizardConfig,
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
}

/// Thin Arc-wrapped config for inexpensive cloning into subsystems.
#[derive(Default, Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(flatten, default)]
    inner: Arc<AppConfigInner>,
}

impl Deref for AppConfig {
    type Target = AppConfigInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl DerefMut for AppConfig {
    fn deref_mut(&mut self) -> &mut AppConfigInner {
        Arc::make_mut(&mut self.inner)
    }
}

/// Draft persistence and navigation knobs for the agreement wizard.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WizardConfig {
    pub storage_key: String,
    pub autosave_interval_ms: u64,
    pub final_step: u32,
}

impl WizardConfig {
    #[must_use]
    pub const fn autosave_interval(&self) -> Duration {
        Duration::from_millis(self.autosave_interval_ms)
    }
}

/// Where drafts live on disk.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
    pub compression: StorageCompression,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageCompression {
    #[default]
    None,
    Lz4,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub json: bool,
    pub dir: Option<PathBuf>,
}

// --- Default ---

impl Default for WizardConfig {
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_DRAFT_KEY.to_owned(),
            autosave_interval_ms: DEFAULT_AUTOSAVE_INTERVAL_MS,
            final_step: DEFAULT_FINAL_STEP,
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self { data_dir: PathBuf::from(".fleetdesk"), compression: StorageCompression::None }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".to_owned(), json: false, dir: None }
    }
}
