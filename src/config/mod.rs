// Configuration module

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::codec::DEFAULT_JPEG_QUALITY;
use crate::logging::LoggingConfig;
use crate::watermark::{FontConfig, WatermarkSettings, WatermarkSpec};

/// A job profile: what to stamp, how to encode, who holds the copyright.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub watermark: WatermarkSpec,
    #[serde(default)]
    pub settings: WatermarkSettings,
    #[serde(default)]
    pub fonts: FontConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub copyright: CopyrightConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

fn default_max_dimension() -> u32 {
    1024
}

fn default_jpeg_quality() -> u8 {
    DEFAULT_JPEG_QUALITY
}

fn default_holder() -> String {
    "YOURNAME".to_string()
}

/// Output encoding settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Longest side of the output image in pixels (default: 1024)
    #[serde(default = "default_max_dimension")]
    pub max_dimension: u32,

    /// JPEG quality, 1-100 (default: 95)
    #[serde(default = "default_jpeg_quality")]
    pub jpeg_quality: u8,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            max_dimension: default_max_dimension(),
            jpeg_quality: default_jpeg_quality(),
        }
    }
}

/// Copyright metadata settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CopyrightConfig {
    /// Copyright holder; also the watermark text when none is given
    #[serde(default = "default_holder")]
    pub holder: String,

    /// Copyright year (default: current year)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
}

impl Default for CopyrightConfig {
    fn default() -> Self {
        Self {
            holder: default_holder(),
            year: None,
        }
    }
}

impl Config {
    pub fn from_yaml_with_env(yaml: &str) -> Result<Self, String> {
        // Replace ${VAR_NAME} with environment variable values
        let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}").map_err(|e| e.to_string())?;

        let mut missing = Vec::new();
        let substituted = re.replace_all(yaml, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| {
                missing.push(var_name.to_string());
                String::new()
            })
        });

        if let Some(var_name) = missing.first() {
            return Err(format!(
                "Environment variable '{}' is referenced but not set",
                var_name
            ));
        }

        let mut config: Config = if substituted.trim().is_empty() {
            Config::default()
        } else {
            serde_yaml::from_str(&substituted).map_err(|e| e.to_string())?
        };

        if config.watermark.text.is_empty() {
            config.watermark.text = config.copyright.holder.clone();
        }

        Ok(config)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, String> {
        let yaml = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file: {}", e))?;
        Self::from_yaml_with_env(&yaml)
    }

    pub fn validate(&self) -> Result<(), String> {
        self.watermark.validate()?;
        self.settings.validate()?;
        self.logging.validate()?;

        if !(0.0..=1.0).contains(&self.watermark.opacity) {
            tracing::warn!(
                opacity = self.watermark.opacity,
                "Watermark opacity outside 0.0-1.0, alpha will saturate"
            );
        }

        if self.fonts.names.is_empty() {
            tracing::warn!("No fonts configured, the built-in face will be used");
        }

        if self.output.max_dimension == 0 {
            return Err("Output max_dimension must be greater than 0".to_string());
        }

        if !(1..=100).contains(&self.output.jpeg_quality) {
            return Err(format!(
                "Output jpeg_quality must be between 1 and 100, got {}",
                self.output.jpeg_quality
            ));
        }

        if self.copyright.holder.trim().is_empty() {
            return Err("Copyright holder cannot be empty".to_string());
        }

        Ok(())
    }
}
