//! DOM-free helpers behind both components: size formatting, file
//! validation, the selection slot, required-field evaluation and the
//! progress simulator.

use crate::config::{ConfigError, UploadConfig, INVALID_BORDER_COLOR, VALID_BORDER_COLOR};
use rand::distr::Uniform;
use rand::Rng;
use rand_distr::Distribution;
use std::fmt;

const SIZE_UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];

/// Format a byte count on a base-1024 scale with two decimals, e.g. "1.50 KB".
///
/// Zero is special-cased to "0 Bytes". The unit is the largest power of 1024
/// not exceeding `bytes`, capped at GB. Halves round up, not to even.
pub fn format_file_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    let mut unit = 0;
    let mut scale: u64 = 1;
    while unit + 1 < SIZE_UNITS.len() && bytes / scale >= 1024 {
        scale *= 1024;
        unit += 1;
    }
    let rounded = (bytes as f64 / scale as f64 * 100.0).round() / 100.0;
    format!("{:.2} {}", rounded, SIZE_UNITS[unit])
}

/// The attributes of a picked file that the widget cares about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileMeta {
    pub name: String,
    pub size: u64,
    pub mime: String,
}

/// Reasons an upload attempt is refused. `Display` is the exact message shown
/// to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadError {
    InvalidType(String),
    TooLarge { size: u64, max: u64 },
    NoFileSelected,
}

impl fmt::Display for UploadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UploadError::InvalidType(_) => {
                write!(f, "Invalid file type. Please use JPG, PNG, or PDF files.")
            }
            UploadError::TooLarge { max, .. } => write!(
                f,
                "File size is too large (max {}MB). Please compress your image.",
                max / (1024 * 1024)
            ),
            UploadError::NoFileSelected => write!(f, "Please select a file to upload."),
        }
    }
}

impl std::error::Error for UploadError {}

/// Check type first, then size. MIME matching is exact and case-sensitive.
pub fn validate_file(meta: &FileMeta, config: &UploadConfig) -> Result<(), UploadError> {
    if !config.allowed_mime_types.iter().any(|t| *t == meta.mime) {
        return Err(UploadError::InvalidType(meta.mime.clone()));
    }
    if meta.size > config.max_file_size {
        return Err(UploadError::TooLarge {
            size: meta.size,
            max: config.max_file_size,
        });
    }
    Ok(())
}

/// Single-slot holder for the currently selected file.
///
/// Only files that passed [`validate_file`] ever enter the slot; a rejected
/// offer leaves the previous selection in place.
#[derive(Debug, Default)]
pub struct Selection {
    current: Option<FileMeta>,
}

impl Selection {
    pub fn offer(&mut self, meta: FileMeta, config: &UploadConfig) -> Result<&FileMeta, UploadError> {
        validate_file(&meta, config)?;
        let accepted: &FileMeta = self.current.insert(meta);
        Ok(accepted)
    }

    pub fn clear(&mut self) -> Option<FileMeta> {
        self.current.take()
    }

    pub fn current(&self) -> Option<&FileMeta> {
        self.current.as_ref()
    }

    /// The selection a submit needs, or `NoFileSelected`.
    pub fn require(&self) -> Result<&FileMeta, UploadError> {
        self.current.as_ref().ok_or(UploadError::NoFileSelected)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldMark {
    Valid,
    Invalid,
}

impl FieldMark {
    pub fn border_color(self) -> &'static str {
        match self {
            FieldMark::Valid => VALID_BORDER_COLOR,
            FieldMark::Invalid => INVALID_BORDER_COLOR,
        }
    }
}

/// Result of checking every required field of a form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequiredCheck {
    pub marks: Vec<FieldMark>,
}

impl RequiredCheck {
    pub fn is_valid(&self) -> bool {
        !self.marks.contains(&FieldMark::Invalid)
    }

    pub fn invalid_count(&self) -> usize {
        self.marks.iter().filter(|m| **m == FieldMark::Invalid).count()
    }
}

/// Mark every value, without stopping at the first blank one.
pub fn check_required<I, S>(values: I) -> RequiredCheck
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let marks = values
        .into_iter()
        .map(|v| {
            if v.as_ref().trim().is_empty() {
                FieldMark::Invalid
            } else {
                FieldMark::Valid
            }
        })
        .collect();
    RequiredCheck { marks }
}

pub fn wants_mobile_notice(viewport_width: f64, breakpoint: f64) -> bool {
    viewport_width < breakpoint
}

/// Selector to resolve for an in-page link, if the href names a fragment at all.
pub fn anchor_selector(href: &str) -> Option<&str> {
    if href.len() > 1 && href.starts_with('#') {
        Some(href)
    } else {
        None
    }
}

/// Cosmetic upload progress: random increments clamped to a ceiling until
/// [`ProgressSimulator::complete`] forces 100.
#[derive(Debug, Clone)]
pub struct ProgressSimulator {
    value: f64,
    ceiling: f64,
    step: Uniform<f64>,
}

impl ProgressSimulator {
    pub fn new(max_step: f64, ceiling: f64) -> Result<Self, ConfigError> {
        let step = Uniform::new(0.0, max_step)
            .map_err(|e| ConfigError::Invalid(format!("progress step range: {}", e)))?;
        Ok(Self {
            value: 0.0,
            ceiling: ceiling.min(100.0),
            step,
        })
    }

    pub fn from_config(config: &UploadConfig) -> Result<Self, ConfigError> {
        Self::new(config.progress_max_step, config.progress_ceiling)
    }

    pub fn advance<R: Rng + ?Sized>(&mut self, rng: &mut R) -> f64 {
        self.value = (self.value + self.step.sample(rng)).min(self.ceiling);
        self.value
    }

    pub fn complete(&mut self) -> f64 {
        self.value = 100.0;
        self.value
    }

    pub fn value(&self) -> f64 {
        self.value
    }
}

/// CSS width for a progress value, e.g. "42.5%".
pub fn width_percent(value: f64) -> String {
    format!("{}%", value)
}
