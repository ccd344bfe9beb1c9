use serde::{Deserialize, Serialize};
use sitesmith_groups::GroupSettings;
use sitesmith_jobs::SchedulerConfig;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub groups: GroupSettings,
    #[serde(default)]
    pub jobs: SchedulerConfig,
    #[serde(default)]
    pub platform: PlatformSettings,
}

impl AppConfig {
    pub fn validate(&self) -> Result<(), String> {
        let lvl = self.logging.level.to_ascii_lowercase();
        let valid_levels = ["trace", "debug", "info", "warn", "error", "off"];
        if !valid_levels.contains(&lvl.as_str()) {
            return Err(format!("logging.level must be one of {valid_levels:?}"));
        }
        self.groups.validate()?;
        self.jobs.validate()?;
        if self.platform.snapshot_path.trim().is_empty() {
            return Err("platform.snapshot_path must not be empty".into());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".into()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformSettings {
    /// JSON snapshot of the in-memory platform, loaded before and saved after
    /// each command.
    #[serde(default = "default_snapshot_path")]
    pub snapshot_path: String,
}

fn default_snapshot_path() -> String {
    "sitesmith-state.json".into()
}

impl Default for PlatformSettings {
    fn default() -> Self {
        Self {
            snapshot_path: default_snapshot_path(),
        }
    }
}

pub mod loader {
    use std::path::{Path, PathBuf};

    use config::{Config, Environment, File, FileFormat};

    use super::AppConfig;

    /// Picked up from the working directory when no `--config` is given.
    pub const DEFAULT_CONFIG_FILE: &str = "sitesmith.toml";

    /// Environment prefix; `SITESMITH__JOBS__CHECK_INTERVAL_SECS=30` sets
    /// `jobs.check_interval_secs`.
    pub const ENV_PREFIX: &str = "SITESMITH";

    /// File to read, if any. An explicit path must exist.
    pub fn resolve_config_path(explicit: Option<&str>) -> Result<Option<PathBuf>, String> {
        match explicit {
            Some(p) if Path::new(p).is_file() => Ok(Some(PathBuf::from(p))),
            Some(p) => Err(format!("config file not found: {p}")),
            None => Ok(Some(PathBuf::from(DEFAULT_CONFIG_FILE)).filter(|p| p.is_file())),
        }
    }

    /// Layers defaults, the config file and `SITESMITH__*` variables, then
    /// validates the result.
    pub fn load_config(path: Option<&str>) -> Result<AppConfig, String> {
        let file = resolve_config_path(path)?;

        let mut builder = Config::builder();
        if let Some(file) = &file {
            builder = builder.add_source(File::from(file.as_path()).format(FileFormat::Toml));
        }
        let settings = builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .try_parsing(true)
                    .separator("__"),
            )
            .build()
            .map_err(|e| match &file {
                Some(file) => format!("failed to read {}: {e}", file.display()),
                None => format!("failed to read settings: {e}"),
            })?;

        let config: AppConfig = settings
            .try_deserialize()
            .map_err(|e| format!("invalid settings: {e}"))?;
        config.validate()?;
        Ok(config)
    }
}
