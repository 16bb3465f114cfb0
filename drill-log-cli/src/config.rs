//! Configuration loading and parsing

use anyhow::{Context, Result};
use clap::ValueEnum;
use drill_log_decoder::DecoderConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Main application configuration (loaded from config.toml)
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub input: InputConfig,
    #[serde(default)]
    pub decoder: DecoderConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct InputConfig {
    /// Tag-definition file; the float file is derived from it
    pub tag_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct OutputConfig {
    pub format: Option<OutputFormat>,
    /// Tag names to keep in table exports (empty = all)
    #[serde(default)]
    pub columns: Vec<String>,
    pub path: Option<PathBuf>,
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Counts, time span and stream termination
    #[default]
    Summary,
    /// The tag table
    Tags,
    /// Decoded samples as JSON lines
    Samples,
    /// Wide table as CSV
    Table,
}

/// Effective settings after merging command-line arguments over the config file
#[derive(Debug, Clone, PartialEq)]
pub struct RunSettings {
    pub tag_file: PathBuf,
    pub format: OutputFormat,
    pub columns: Vec<String>,
    pub output: Option<PathBuf>,
    pub limit: Option<usize>,
}

/// Command-line overrides; `None`/empty means "use the config file"
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub tag_file: Option<PathBuf>,
    pub format: Option<OutputFormat>,
    pub columns: Vec<String>,
    pub output: Option<PathBuf>,
    pub limit: Option<usize>,
}

impl AppConfig {
    /// Merge command-line overrides; returns `None` if no tag file is known
    pub fn settings(&self, overrides: Overrides) -> Option<RunSettings> {
        let tag_file = overrides.tag_file.or_else(|| self.input.tag_file.clone())?;
        let columns = if overrides.columns.is_empty() {
            self.output.columns.clone()
        } else {
            overrides.columns
        };

        Some(RunSettings {
            tag_file,
            format: overrides.format.or(self.output.format).unwrap_or_default(),
            columns,
            output: overrides.output.or_else(|| self.output.path.clone()),
            limit: overrides.limit.or(self.output.limit),
        })
    }
}

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<AppConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config: AppConfig = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_deserialization() {
        let toml_content = r#"
            [input]
            tag_file = "DataLog/2024 02 20 0000 BigRAID (Tagname).DAT"

            [decoder]
            buffer_capacity = 4096

            [output]
            format = "table"
            columns = ["[PLC]DRILLACTIVECURRENT", "[PLC]DRILLFEEDBACKVEL"]
        "#;

        let config: AppConfig = toml::from_str(toml_content).unwrap();
        assert!(config.input.tag_file.is_some());
        assert_eq!(config.decoder.buffer_capacity, 4096);
        assert_eq!(config.decoder.tag_token, "(Tagname)");
        assert_eq!(config.output.format, Some(OutputFormat::Table));
        assert_eq!(config.output.columns.len(), 2);
    }

    #[test]
    fn test_empty_config() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert!(config.input.tag_file.is_none());
        assert!(config.settings(Overrides::default()).is_none());
    }

    #[test]
    fn test_overrides_take_precedence() {
        let config: AppConfig = toml::from_str(
            r#"
            [input]
            tag_file = "a (Tagname).DAT"

            [output]
            format = "samples"
            columns = ["x"]
            limit = 10
            "#,
        )
        .unwrap();

        let settings = config
            .settings(Overrides {
                tag_file: Some(PathBuf::from("b (Tagname).DAT")),
                format: None,
                columns: vec!["y".to_string()],
                output: None,
                limit: Some(3),
            })
            .unwrap();

        assert_eq!(settings.tag_file, PathBuf::from("b (Tagname).DAT"));
        assert_eq!(settings.format, OutputFormat::Samples);
        assert_eq!(settings.columns, vec!["y".to_string()]);
        assert_eq!(settings.limit, Some(3));
    }

    #[test]
    fn test_load_config_from_file() {
        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(file.path(), "[output]\nformat = \"tags\"\n").unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.output.format, Some(OutputFormat::Tags));
        assert!(load_config(Path::new("missing-config.toml")).is_err());
    }
}
