//! Converter configuration.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::transform::TagTransform;

/// Settings for a [`CsvConverter`](crate::CsvConverter).
///
/// Every field has a default, so an empty JSON object is a valid
/// configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConverterConfig {
    /// Emit the `Metric Name` column.
    pub show_metric_name: bool,
    /// Case change applied to tag values before they are written.
    pub tag_transform: Option<TagTransform>,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            show_metric_name: true,
            tag_transform: None,
        }
    }
}

impl ConverterConfig {
    /// Load and validate a configuration from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        let config: Self = serde_json::from_reader(BufReader::new(file))?;
        config.validate()?;
        Ok(config)
    }

    /// Check the configuration for settings that cannot work.
    pub fn validate(&self) -> Result<()> {
        if let Some(transform) = &self.tag_transform {
            transform
                .validate()
                .map_err(|e| Error::Config(format!("tag_transform: {}", config_message(e))))?;
        }
        Ok(())
    }
}

fn config_message(err: Error) -> String {
    match err {
        Error::Config(message) => message,
        other => other.to_string(),
    }
}
