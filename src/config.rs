use serde::Deserialize;
use thiserror::Error;

/// Configuration for the on-demand import plugin
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct Config {
    /// Import source identifying the component library
    pub library_name: String,

    /// Sub directory holding one module per component
    pub library_directory: String,

    /// Whether to add a stylesheet import next to every component import
    pub style: bool,

    /// Sub directory holding the stylesheets
    pub style_directory: String,

    /// Stylesheet file extension, without the dot
    pub style_extension: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            library_name: "module".to_string(),
            library_directory: "dist".to_string(),
            style: false,
            style_directory: "dist".to_string(),
            style_extension: "css".to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("E_INVALID_CONFIG: Error parsing on-demand import plugin configuration: {0}")]
    Parse(#[from] serde_json::Error),
}

impl Config {
    /// Parses the plugin configuration, filling absent options with defaults
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }
}
