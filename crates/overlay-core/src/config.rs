use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::constants::{DEFAULT_MOVE_DEBOUNCE, DEFAULT_QUOTA_BYTES};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {value:?}")]
    InvalidValue { var: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct CoreConfig {
    pub data_dir: PathBuf,
    /// Scopes the preference file, so two editors sharing a data dir don't collide.
    pub origin: String,
    pub quota_bytes: usize,
    pub move_debounce: Duration,
}

impl CoreConfig {
    pub fn new<P: AsRef<Path>>(data_dir: P) -> Self {
        Self {
            data_dir: data_dir.as_ref().to_path_buf(),
            origin: "default".to_string(),
            quota_bytes: DEFAULT_QUOTA_BYTES,
            move_debounce: DEFAULT_MOVE_DEBOUNCE,
        }
    }

    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = origin.into();
        self
    }

    pub fn with_quota_bytes(mut self, quota_bytes: usize) -> Self {
        self.quota_bytes = quota_bytes;
        self
    }

    pub fn with_move_debounce(mut self, move_debounce: Duration) -> Self {
        self.move_debounce = move_debounce;
        self
    }

    /// Path of the durable preference file for this origin.
    pub fn prefs_path(&self) -> PathBuf {
        let origin: String = self
            .origin
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
            .collect();
        self.data_dir.join(format!("prefs-{}.json", origin))
    }

    /// Build a config from `OVERLAY_*` environment variables on top of the defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Same as [`CoreConfig::from_env`] with an injectable variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match lookup("OVERLAY_DATA_DIR") {
            Some(dir) if !dir.trim().is_empty() => Self::new(dir.trim()),
            _ => Self::default(),
        };

        if let Some(origin) = lookup("OVERLAY_ORIGIN") {
            if !origin.trim().is_empty() {
                config.origin = origin.trim().to_string();
            }
        }

        if let Some(raw) = lookup("OVERLAY_QUOTA_BYTES") {
            config.quota_bytes = raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
                var: "OVERLAY_QUOTA_BYTES",
                value: raw.clone(),
            })?;
        }

        if let Some(raw) = lookup("OVERLAY_MOVE_DEBOUNCE_MS") {
            let millis: u64 = raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
                var: "OVERLAY_MOVE_DEBOUNCE_MS",
                value: raw.clone(),
            })?;
            config.move_debounce = Duration::from_millis(millis);
        }

        Ok(config)
    }
}

impl Default for CoreConfig {
    fn default() -> Self {
        let data_dir = dirs::data_dir()
            .map(|dir| dir.join("overlay-panel"))
            .unwrap_or_else(|| PathBuf::from("overlay_data"));
        Self::new(data_dir)
    }
}
