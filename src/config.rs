use std::path::Path;

use serde::Deserialize;

use crate::error::{Error, Result};

/// Style attribute values listed here are treated as defaults and never
/// contribute to a synthesized marker. Growing these lists gives simpler
/// markers.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct MarkerConfig {
    pub default_font_sizes: Vec<String>,
    pub default_parent_names: Vec<String>,
    pub default_margin_lefts: Vec<String>,
    /// `None` means text indents are not tracked at all.
    pub default_text_indents: Option<Vec<String>>,
    /// Encoded space in OpenDocument style names (`Heading_20_1`).
    pub escaped_space: String,
}

impl Default for MarkerConfig {
    fn default() -> Self {
        let strings = |v: &[&str]| v.iter().map(|s| s.to_string()).collect();
        MarkerConfig {
            default_font_sizes: strings(&[
                "8pt", "9pt", "10pt", "10.5pt", "11pt", "12pt", "14pt", "16pt", "18pt", "39.5pt",
            ]),
            default_parent_names: strings(&["Standard"]),
            default_margin_lefts: strings(&["0in"]),
            default_text_indents: None,
            escaped_space: "_20".to_string(),
        }
    }
}

impl MarkerConfig {
    pub(crate) fn tracks_text_indents(&self) -> bool {
        self.default_text_indents
            .as_ref()
            .is_some_and(|v| !v.is_empty())
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct RuleConfig {
    pub find: String,
    pub replace: String,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct CleanupConfig {
    /// Applied after the built-in post-pass rules, in order.
    pub extra_rules: Vec<RuleConfig>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub markers: MarkerConfig,
    pub cleanup: CleanupConfig,
}

impl Config {
    pub fn from_toml(text: &str) -> Result<Config> {
        toml::from_str(text).map_err(|e| Error::Config(e.to_string()))
    }

    pub fn load(path: &Path) -> Result<Config> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            Error::Io(std::io::Error::new(
                e.kind(),
                format!("{}: {}", e, path.display()),
            ))
        })?;
        Config::from_toml(&text)
    }
}
