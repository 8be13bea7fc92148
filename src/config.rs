//! Application-level configuration constants.
//!
//! The constants are the defaults baked into the build. A page may override
//! any of them by placing a JSON document in the `data-enhance-config`
//! attribute of `<body>`; see [`Config::from_json`].

use log::LevelFilter;
use serde::Deserialize;
use std::fmt;

// Page enhancer timing
pub const ALERT_DISMISS_MS: u32 = 5_000;
pub const FADE_MS: u32 = 300;
pub const MOBILE_NOTICE_MS: u32 = 8_000;
pub const MOBILE_BREAKPOINT_PX: f64 = 768.0;

// Page enhancer selectors
pub const ALERT_SELECTOR: &str = ".alert";
pub const ANCHOR_SELECTOR: &str = "a[href^=\"#\"]";
pub const FORM_SELECTOR: &str = "form";
pub const REQUIRED_SELECTOR: &str = "[required]";

// Field styling
pub const INVALID_BORDER_COLOR: &str = "#dc2626";
pub const VALID_BORDER_COLOR: &str = "#d1d5db";

// User-facing text
pub const REQUIRED_FIELDS_MESSAGE: &str = "Please fill in all required fields.";
pub const MOBILE_NOTICE_TEXT: &str = "📱 For the best experience, please use a desktop computer.";
pub const MOBILE_NOTICE_CLASS: &str = "alert alert-info";

/// Inline styling applied to the mobile notice banner, in insertion order.
pub const MOBILE_NOTICE_STYLE: [(&str, &str); 10] = [
    ("position", "fixed"),
    ("top", "0"),
    ("left", "0"),
    ("right", "0"),
    ("z-index", "1000"),
    ("text-align", "center"),
    ("background", "#dbeafe"),
    ("color", "#1e40af"),
    ("padding", "0.5rem"),
    ("font-size", "0.9rem"),
];

// Upload widget limits
pub const MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;
pub const ALLOWED_MIME_TYPES: [&str; 4] = ["image/jpeg", "image/jpg", "image/png", "application/pdf"];

// Simulated progress
pub const PROGRESS_TICK_MS: u32 = 200;
pub const PROGRESS_MAX_STEP: f64 = 15.0;
pub const PROGRESS_CEILING: f64 = 90.0;
pub const PROGRESS_COMPLETE_MS: u32 = 2_000;

pub const DRAGOVER_CLASS: &str = "dragover";
pub const CONFIG_ATTRIBUTE: &str = "data-enhance-config";

/// Element identifiers the upload page markup provides.
pub mod ids {
    pub const UPLOAD_AREA: &str = "uploadArea";
    pub const FILE_INPUT: &str = "fileInput";
    pub const UPLOAD_FORM: &str = "uploadForm";
    pub const UPLOAD_PROGRESS: &str = "uploadProgress";
    pub const PROGRESS_FILL: &str = "progressFill";
    pub const FILE_PREVIEW: &str = "filePreview";
    pub const FILE_NAME: &str = "fileName";
    pub const FILE_SIZE: &str = "fileSize";
    pub const REMOVE_FILE: &str = "removeFile";
}

/// Configuration problems detected while loading overrides.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    Json(String),
    Invalid(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Json(msg) => write!(f, "Malformed configuration JSON: {}", msg),
            ConfigError::Invalid(msg) => write!(f, "Invalid configuration value: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub log_level: LevelFilter,
    pub page: PageConfig,
    pub upload: UploadConfig,
}

/// Timing and layout knobs for the page enhancer.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PageConfig {
    pub alert_dismiss_ms: u32,
    pub fade_ms: u32,
    pub mobile_breakpoint_px: f64,
    pub mobile_notice_ms: u32,
}

/// Validation limits and progress animation knobs for the upload widget.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct UploadConfig {
    pub max_file_size: u64,
    pub allowed_mime_types: Vec<String>,
    pub progress_tick_ms: u32,
    pub progress_max_step: f64,
    pub progress_ceiling: f64,
    pub progress_complete_ms: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: LevelFilter::Info,
            page: PageConfig::default(),
            upload: UploadConfig::default(),
        }
    }
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            alert_dismiss_ms: ALERT_DISMISS_MS,
            fade_ms: FADE_MS,
            mobile_breakpoint_px: MOBILE_BREAKPOINT_PX,
            mobile_notice_ms: MOBILE_NOTICE_MS,
        }
    }
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_file_size: MAX_FILE_SIZE,
            allowed_mime_types: ALLOWED_MIME_TYPES.iter().map(|t| t.to_string()).collect(),
            progress_tick_ms: PROGRESS_TICK_MS,
            progress_max_step: PROGRESS_MAX_STEP,
            progress_ceiling: PROGRESS_CEILING,
            progress_complete_ms: PROGRESS_COMPLETE_MS,
        }
    }
}

impl Config {
    /// Parse a (possibly partial) JSON override; missing keys keep their defaults.
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        let config: Config =
            serde_json::from_str(raw).map_err(|e| ConfigError::Json(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.upload.validate()
    }
}

impl UploadConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let step = self.progress_max_step;
        if !step.is_finite() || step <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "progress_max_step must be a positive number, got {}",
                step
            )));
        }
        let ceiling = self.progress_ceiling;
        if !(ceiling > 0.0 && ceiling <= 100.0) {
            return Err(ConfigError::Invalid(format!(
                "progress_ceiling must be within (0, 100], got {}",
                ceiling
            )));
        }
        if self.progress_tick_ms == 0 {
            return Err(ConfigError::Invalid("progress_tick_ms cannot be 0".to_string()));
        }
        Ok(())
    }
}
