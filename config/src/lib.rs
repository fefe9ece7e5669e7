//! Configuration for whorl, read from `~/.whorl/config.toml`.
//!
//! ```toml
//! [app]
//! ascii_only = false
//! high_contrast = false
//! reduced_motion = false
//!
//! [enrollment]
//! confirmation_required = true
//! identifiers = ["Right index", "Left index"]
//!
//! [sensor]
//! delay_ms = 3000
//! success_probability = 0.8
//! timeout_seconds = 60
//! ```
//!
//! Every section and field is optional. Raw sections mirror the file; the
//! `*Settings` types are what the rest of the application consumes, with
//! defaults applied and bad values dropped.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use whorl_types::ui::UiOptions;
use whorl_types::{FlowVariant, Identifier};

/// Overrides `[enrollment] confirmation_required`: `single` or `two`.
pub const FLOW_ENV_VAR: &str = "WHORL_FLOW";

pub const DEFAULT_IDENTIFIERS: [&str; 2] = ["Right index", "Left index"];
pub const DEFAULT_CAPTURE_DELAY: Duration = Duration::from_secs(3);
pub const DEFAULT_SUCCESS_PROBABILITY: f64 = 0.8;
/// The capture prompt asks the user to wait up to a minute.
pub const DEFAULT_CAPTURE_TIMEOUT: Duration = Duration::from_secs(60);

// Default value function for serde (bool::default() is false, so only true needs a fn)
const fn default_true() -> bool {
    true
}

#[derive(Debug, Default, Deserialize)]
pub struct WhorlConfig {
    pub app: Option<AppConfig>,
    pub enrollment: Option<EnrollmentConfig>,
    pub sensor: Option<SensorConfig>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

impl ConfigError {
    #[must_use]
    pub fn path(&self) -> &PathBuf {
        match self {
            ConfigError::Read { path, .. } | ConfigError::Parse { path, .. } => path,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct AppConfig {
    /// Use ASCII-only glyphs for icons and spinners.
    #[serde(default)]
    pub ascii_only: bool,
    /// Enable a high-contrast color palette.
    #[serde(default)]
    pub high_contrast: bool,
    /// Disable modal animations and the scanning spinner.
    #[serde(default)]
    pub reduced_motion: bool,
}

impl AppConfig {
    #[must_use]
    pub fn ui_options(&self) -> UiOptions {
        UiOptions {
            ascii_only: self.ascii_only,
            high_contrast: self.high_contrast,
            reduced_motion: self.reduced_motion,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct EnrollmentConfig {
    /// Require a confirming second capture before committing. Default: true.
    #[serde(default = "default_true")]
    pub confirmation_required: bool,
    /// Enrollable slots in display order. Empty means the built-in pair.
    #[serde(default)]
    pub identifiers: Vec<String>,
}

impl Default for EnrollmentConfig {
    fn default() -> Self {
        Self {
            confirmation_required: true,
            identifiers: Vec::new(),
        }
    }
}

/// Simulated sensor behaviour and the engine's capture timeout.
#[derive(Debug, Default, Deserialize)]
pub struct SensorConfig {
    pub delay_ms: Option<u64>,
    /// Probability that a simulated capture matches. Clamped to [0, 1].
    pub success_probability: Option<f64>,
    /// How long to wait for the sensor before giving up on a capture.
    pub timeout_seconds: Option<u64>,
}

impl WhorlConfig {
    pub fn load() -> Result<Option<Self>, ConfigError> {
        let Some(path) = config_path() else {
            return Ok(None);
        };
        Self::load_from(&path)
    }

    /// Load from an explicit path. A missing file is not an error.
    pub fn load_from(path: &Path) -> Result<Option<Self>, ConfigError> {
        if !path.exists() {
            return Ok(None);
        }

        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) => {
                tracing::warn!("Failed to read config at {:?}: {}", path, err);
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source: err,
                });
            }
        };

        match toml::from_str(&content) {
            Ok(config) => Ok(Some(config)),
            Err(err) => {
                tracing::warn!("Failed to parse config at {:?}: {}", path, err);
                Err(ConfigError::Parse {
                    path: path.to_path_buf(),
                    source: err,
                })
            }
        }
    }

    #[must_use]
    pub fn path() -> Option<PathBuf> {
        config_path()
    }
}

#[must_use]
pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".whorl").join("config.toml"))
}

/// Resolved UI options; defaults when `[app]` is absent.
#[must_use]
pub fn ui_options(config: Option<&WhorlConfig>) -> UiOptions {
    config
        .and_then(|cfg| cfg.app.as_ref())
        .map(AppConfig::ui_options)
        .unwrap_or_default()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrollmentSettings {
    pub variant: FlowVariant,
    pub identifiers: Vec<Identifier>,
}

impl EnrollmentSettings {
    /// Resolve from config plus the `WHORL_FLOW` environment override.
    #[must_use]
    pub fn from_config(config: Option<&WhorlConfig>) -> Self {
        let flow_override = env::var(FLOW_ENV_VAR).ok();
        Self::resolve(config, flow_override.as_deref())
    }

    #[must_use]
    pub fn resolve(config: Option<&WhorlConfig>, flow_override: Option<&str>) -> Self {
        let section = config.and_then(|cfg| cfg.enrollment.as_ref());

        let configured = section.is_none_or(|s| s.confirmation_required);
        let variant = flow_override
            .and_then(parse_flow_variant)
            .unwrap_or_else(|| FlowVariant::from_confirmation_required(configured));

        let mut identifiers: Vec<Identifier> = Vec::new();
        for raw in section.map(|s| s.identifiers.as_slice()).unwrap_or_default() {
            match Identifier::new(raw.as_str()) {
                Ok(id) if identifiers.contains(&id) => {
                    tracing::warn!(identifier = %id, "Duplicate identifier in config; ignoring");
                }
                Ok(id) => identifiers.push(id),
                Err(err) => tracing::warn!("Ignoring configured identifier: {err}"),
            }
        }
        if identifiers.is_empty() {
            identifiers = DEFAULT_IDENTIFIERS
                .iter()
                .filter_map(|label| Identifier::new(*label).ok())
                .collect();
        }

        Self {
            variant,
            identifiers,
        }
    }
}

fn parse_flow_variant(raw: &str) -> Option<FlowVariant> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "single" | "single-phase" | "single_phase" | "1" => Some(FlowVariant::SinglePhase),
        "two" | "two-phase" | "two_phase" | "2" => Some(FlowVariant::TwoPhase),
        other => {
            tracing::warn!("Unknown {FLOW_ENV_VAR} value: {other}");
            None
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensorSettings {
    pub delay: Duration,
    pub success_probability: f64,
    pub timeout: Duration,
}

impl Default for SensorSettings {
    fn default() -> Self {
        Self {
            delay: DEFAULT_CAPTURE_DELAY,
            success_probability: DEFAULT_SUCCESS_PROBABILITY,
            timeout: DEFAULT_CAPTURE_TIMEOUT,
        }
    }
}

impl SensorSettings {
    #[must_use]
    pub fn from_config(config: Option<&WhorlConfig>) -> Self {
        let defaults = Self::default();
        let Some(sensor) = config.and_then(|cfg| cfg.sensor.as_ref()) else {
            return defaults;
        };

        let success_probability = match sensor.success_probability {
            Some(p) if p.is_finite() => p.clamp(0.0, 1.0),
            Some(p) => {
                tracing::warn!("Ignoring non-finite success_probability {p}");
                defaults.success_probability
            }
            None => defaults.success_probability,
        };

        let timeout = match sensor.timeout_seconds {
            Some(0) => {
                tracing::warn!("timeout_seconds = 0 would reject every capture; using default");
                defaults.timeout
            }
            Some(secs) => Duration::from_secs(secs),
            None => defaults.timeout,
        };

        Self {
            delay: sensor
                .delay_ms
                .map_or(defaults.delay, Duration::from_millis),
            success_probability,
            timeout,
        }
    }
}
