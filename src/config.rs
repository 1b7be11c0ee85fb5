//! Pipeline configuration.
//!
//! The crate reads no files. The host either builds a [`PipelineConfig`] in
//! code or hands over TOML text (from its own settings store, say), which is
//! merged on top of the stock defaults, checked for unknown keys, and
//! validated.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [selection]
//! layout = "3x3"            # 3x1 | 3x2 | 3x3, used until the user picks one
//! aspect = "square"         # square | portrait
//!
//! [resample]
//! filter = "lanczos3"       # lanczos3 | catmull_rom | gaussian | triangle
//!
//! [output]
//! jpeg_quality = 90         # Tile JPEG quality (1-100)
//! archive_name = "instagram-grid.zip"
//! compression = "deflated"  # deflated | stored
//!
//! [limits]
//! max_source_pixels = 100000000   # Largest accepted source (width * height)
//! max_alloc_bytes = 1073741824    # Largest single allocation while decoding/resizing
//!
//! [processing]
//! max_threads = 4           # Tile encoder threads (omit for auto = CPU cores)
//! ```
//!
//! ## Partial Configuration
//!
//! Overrides are sparse. Set just the values you want:
//!
//! ```toml
//! [selection]
//! aspect = "portrait"
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::archive::{ArchiveCompression, ArchiveOptions, DEFAULT_ARCHIVE_NAME};
use crate::imaging::{DecodeLimits, Quality, ResampleFilter};
use crate::resample::ResampleOptions;
use crate::types::{AspectMode, LayoutSpec};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
    #[error("Thread pool error: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// Pipeline configuration.
///
/// All fields have sensible defaults. TOML overrides need only specify the
/// values they want to change. Unknown keys are rejected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    /// Fallback layout/aspect when the user has made no selection.
    pub selection: SelectionConfig,
    /// Resampling kernel.
    pub resample: ResampleConfig,
    /// Tile encoding and archive settings.
    pub output: OutputConfig,
    /// Allocation guards.
    pub limits: LimitsConfig,
    /// Parallel encoding settings.
    pub processing: ProcessingConfig,
}

impl PipelineConfig {
    /// Parse TOML overrides on top of the stock defaults.
    pub fn from_toml_str(overrides: &str) -> Result<Self, ConfigError> {
        let overlay: toml::Value = toml::from_str(overrides)?;
        resolve_config(stock_defaults_value(), Some(overlay))
    }

    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=100).contains(&self.output.jpeg_quality) {
            return Err(ConfigError::Validation(
                "output.jpeg_quality must be 1-100".into(),
            ));
        }
        let name = self.output.archive_name.trim();
        if name.is_empty()
            || !name.to_ascii_lowercase().ends_with(".zip")
            || name.contains(['/', '\\'])
        {
            return Err(ConfigError::Validation(
                "output.archive_name must be a plain file name ending in .zip".into(),
            ));
        }
        if self.limits.max_source_pixels == 0 || self.limits.max_alloc_bytes == 0 {
            return Err(ConfigError::Validation("limits values must be non-zero".into()));
        }
        if self.processing.max_threads == Some(0) {
            return Err(ConfigError::Validation(
                "processing.max_threads must be at least 1".into(),
            ));
        }
        Ok(())
    }

    pub fn quality(&self) -> Quality {
        Quality::new(self.output.jpeg_quality)
    }

    pub fn resample_options(&self) -> ResampleOptions {
        ResampleOptions {
            filter: self.resample.filter,
            limits: DecodeLimits {
                max_source_pixels: self.limits.max_source_pixels,
                max_alloc_bytes: self.limits.max_alloc_bytes,
            },
        }
    }

    pub fn archive_options(&self) -> ArchiveOptions {
        ArchiveOptions {
            file_name: self.output.archive_name.clone(),
            compression: self.output.compression,
        }
    }
}

/// Default layout and aspect.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SelectionConfig {
    pub layout: LayoutSpec,
    pub aspect: AspectMode,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ResampleConfig {
    pub filter: ResampleFilter,
}

/// Tile encoding and archive settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    /// JPEG quality for every tile (1 = worst, 100 = best).
    pub jpeg_quality: u32,
    /// Suggested download file name.
    pub archive_name: String,
    pub compression: ArchiveCompression,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            jpeg_quality: 90,
            archive_name: DEFAULT_ARCHIVE_NAME.to_string(),
            compression: ArchiveCompression::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LimitsConfig {
    pub max_source_pixels: u64,
    pub max_alloc_bytes: u64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        let limits = DecodeLimits::default();
        Self {
            max_source_pixels: limits.max_source_pixels,
            max_alloc_bytes: limits.max_alloc_bytes,
        }
    }
}

/// Parallel processing settings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of tile encoder threads.
    /// When absent, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    pub max_threads: Option<usize>,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)` (user can constrain down, not up)
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config
        .max_threads
        .map(|n| n.clamp(1, cores))
        .unwrap_or(cores)
}

// =============================================================================
// Config merging and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the canonical representation of all default values, used as the
/// base layer for merging user overrides on top.
pub fn stock_defaults_value() -> toml::Value {
    // `max_threads` is None by default and simply omitted from the table.
    toml::Value::try_from(PipelineConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<PipelineConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: PipelineConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Returns a fully-commented stock config with all keys and explanations.
pub fn stock_config_toml() -> &'static str {
    r##"# gridcut configuration
# =====================
# All options are optional. Values shown are the defaults.

[selection]
# Layout and aspect used before the user picks one.
# layout: "3x1" (3 pieces), "3x2" (6 pieces), "3x3" (9 pieces)
layout = "3x3"
# aspect: "square" (1080x1080 tiles) or "portrait" (1080x1350 tiles, 4:5)
aspect = "square"

[resample]
# Interpolation kernel used to stretch the source onto the grid.
# lanczos3 | catmull_rom | gaussian | triangle
filter = "lanczos3"

[output]
# JPEG quality for every tile, 1-100.
jpeg_quality = 90
# Suggested file name for the downloaded archive.
archive_name = "instagram-grid.zip"
# Zip entry storage: "deflated" or "stored".
compression = "deflated"

[limits]
# Largest accepted source image, in pixels (width * height).
max_source_pixels = 100000000
# Largest single allocation while decoding or resizing, in bytes.
max_alloc_bytes = 1073741824

[processing]
# Tile encoder threads. Omit for one per CPU core.
# max_threads = 4
"##
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_values() {
        let config = PipelineConfig::default();
        assert_eq!(config.selection.layout, LayoutSpec::ThreeByThree);
        assert_eq!(config.selection.aspect, AspectMode::Square);
        assert_eq!(config.resample.filter, ResampleFilter::Lanczos3);
        assert_eq!(config.output.jpeg_quality, 90);
        assert_eq!(config.output.archive_name, "instagram-grid.zip");
        assert_eq!(config.output.compression, ArchiveCompression::Deflated);
        assert_eq!(config.processing.max_threads, None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn empty_overrides_give_defaults() {
        let config = PipelineConfig::from_toml_str("").unwrap();
        assert_eq!(config, PipelineConfig::default());
    }

    #[test]
    fn parse_partial_config() {
        let config = PipelineConfig::from_toml_str(
            r#"
            [selection]
            aspect = "portrait"

            [output]
            jpeg_quality = 80
            "#,
        )
        .unwrap();

        assert_eq!(config.selection.aspect, AspectMode::Portrait);
        // Untouched keys keep their defaults.
        assert_eq!(config.selection.layout, LayoutSpec::ThreeByThree);
        assert_eq!(config.output.jpeg_quality, 80);
        assert_eq!(config.output.archive_name, "instagram-grid.zip");
        assert_eq!(config.quality().value(), 80);
    }

    #[test]
    fn parse_full_config() {
        let config = PipelineConfig::from_toml_str(
            r#"
            [selection]
            layout = "3x1"
            aspect = "portrait"

            [resample]
            filter = "catmull_rom"

            [output]
            jpeg_quality = 95
            archive_name = "my-grid.zip"
            compression = "stored"

            [limits]
            max_source_pixels = 50000000
            max_alloc_bytes = 536870912

            [processing]
            max_threads = 2
            "#,
        )
        .unwrap();

        assert_eq!(config.selection.layout, LayoutSpec::ThreeByOne);
        assert_eq!(config.resample.filter, ResampleFilter::CatmullRom);
        assert_eq!(config.output.compression, ArchiveCompression::Stored);
        assert_eq!(config.limits.max_source_pixels, 50_000_000);
        assert_eq!(config.processing.max_threads, Some(2));

        let archive = config.archive_options();
        assert_eq!(archive.file_name, "my-grid.zip");
        let resample = config.resample_options();
        assert_eq!(resample.limits.max_alloc_bytes, 536_870_912);
    }

    #[test]
    fn stock_config_toml_parses_to_defaults() {
        let config = PipelineConfig::from_toml_str(stock_config_toml()).unwrap();
        assert_eq!(config, PipelineConfig::default());
    }

    #[test]
    fn invalid_toml_is_error() {
        let result = PipelineConfig::from_toml_str("[output\njpeg_quality = ");
        assert!(matches!(result, Err(ConfigError::Toml(_))));
    }

    #[test]
    fn unknown_key_rejected() {
        let result = PipelineConfig::from_toml_str("[output]\nquality = 90\n");
        assert!(matches!(result, Err(ConfigError::Toml(_))));
    }

    #[test]
    fn unknown_section_rejected() {
        let result = PipelineConfig::from_toml_str("[colors]\nbackground = \"#fff\"\n");
        assert!(matches!(result, Err(ConfigError::Toml(_))));
    }

    #[test]
    fn unknown_layout_rejected() {
        let result = PipelineConfig::from_toml_str("[selection]\nlayout = \"4x4\"\n");
        assert!(matches!(result, Err(ConfigError::Toml(_))));
    }

    #[test]
    fn nearest_filter_rejected() {
        let result = PipelineConfig::from_toml_str("[resample]\nfilter = \"nearest\"\n");
        assert!(matches!(result, Err(ConfigError::Toml(_))));
    }

    #[test]
    fn quality_out_of_range_rejected() {
        for q in [0, 101] {
            let result = PipelineConfig::from_toml_str(&format!("[output]\njpeg_quality = {q}\n"));
            assert!(matches!(result, Err(ConfigError::Validation(_))), "quality {q}");
        }
    }

    #[test]
    fn archive_name_must_be_zip_file() {
        for name in ["", "grid.tar", "dir/grid.zip"] {
            let mut config = PipelineConfig::default();
            config.output.archive_name = name.to_string();
            assert!(
                matches!(config.validate(), Err(ConfigError::Validation(_))),
                "name {name:?}"
            );
        }
    }

    #[test]
    fn zero_limits_rejected() {
        let mut config = PipelineConfig::default();
        config.limits.max_alloc_bytes = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn zero_threads_rejected() {
        let mut config = PipelineConfig::default();
        config.processing.max_threads = Some(0);
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn effective_threads_auto() {
        let cores = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        assert_eq!(effective_threads(&ProcessingConfig::default()), cores);
    }

    #[test]
    fn effective_threads_clamped_to_cores() {
        let cores = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        let config = ProcessingConfig {
            max_threads: Some(cores + 100),
        };
        assert_eq!(effective_threads(&config), cores);
    }

    #[test]
    fn effective_threads_user_constrains_down() {
        let config = ProcessingConfig {
            max_threads: Some(1),
        };
        assert_eq!(effective_threads(&config), 1);
    }

    #[test]
    fn merge_toml_scalar_override() {
        let base: toml::Value = toml::from_str("a = 1\nb = 2").unwrap();
        let overlay: toml::Value = toml::from_str("b = 3").unwrap();
        let merged = merge_toml(base, overlay);
        assert_eq!(merged.get("a").and_then(|v| v.as_integer()), Some(1));
        assert_eq!(merged.get("b").and_then(|v| v.as_integer()), Some(3));
    }

    #[test]
    fn merge_toml_table_merge() {
        let base: toml::Value =
            toml::from_str("[output]\njpeg_quality = 90\narchive_name = \"a.zip\"").unwrap();
        let overlay: toml::Value = toml::from_str("[output]\njpeg_quality = 70").unwrap();
        let merged = merge_toml(base, overlay);
        let output = merged.get("output").unwrap();
        assert_eq!(
            output.get("jpeg_quality").and_then(|v| v.as_integer()),
            Some(70)
        );
        assert_eq!(
            output.get("archive_name").and_then(|v| v.as_str()),
            Some("a.zip")
        );
    }

    #[test]
    fn stock_defaults_value_is_table() {
        let val = stock_defaults_value();
        let table = val.as_table().unwrap();
        for section in ["selection", "resample", "output", "limits", "processing"] {
            assert!(table.contains_key(section), "missing [{section}]");
        }
        assert_eq!(
            val.get("output")
                .and_then(|o| o.get("archive_name"))
                .and_then(|v| v.as_str()),
            Some("instagram-grid.zip")
        );
    }
}
