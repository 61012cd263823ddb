//! Configuration management for the CLI.
//!
//! Settings come from `grpc-bridge.toml` and are overridden by command-line
//! flags.

use crate::error::{CliResult, ConfigError};
use grpc_bridge::generator::DEFAULT_EXCLUDED_PREFIX;
use grpc_bridge::GeneratorOptions;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Default configuration filename.
pub const CONFIG_FILENAME: &str = "grpc-bridge.toml";

/// Main configuration structure.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Generation target.
    pub target: TargetConfig,

    /// Declaration input.
    pub input: InputConfig,

    /// Output configuration.
    pub output: OutputConfig,

    /// Additional class resolution.
    pub resolution: ResolutionConfig,
}

/// Generation target.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TargetConfig {
    /// Schema package; `-` becomes `.` in the protobuf package.
    pub package: String,

    /// Class name, used for the service, outer class and output file names.
    pub class_name: String,
}

/// Declaration input configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// Directory holding `*.json` declaration units.
    pub dir: PathBuf,

    /// Qualified-name prefixes never scanned for endpoints.
    pub exclude_prefixes: Vec<String>,
}

/// Output configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Target directory; the schema lands in `<dir>/proto/<class_name>.proto`.
    pub dir: PathBuf,
}

/// Additional class resolution.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ResolutionConfig {
    /// Roots searched for classes outside the declaration units.
    pub additional_roots: Vec<PathBuf>,

    /// Extra `<root>:<qualified name>` classes to include.
    pub additional_classes: Vec<String>,
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            package: "dev.resteasy.grpc.example".to_string(),
            class_name: "Service".to_string(),
        }
    }
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("."),
            exclude_prefixes: vec![DEFAULT_EXCLUDED_PREFIX.to_string()],
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("./target"),
        }
    }
}

impl Config {
    /// Generator options for this configuration.
    pub fn generator_options(&self) -> GeneratorOptions {
        GeneratorOptions {
            excluded_prefixes: self.input.exclude_prefixes.clone(),
            additional_roots: self.resolution.additional_roots.clone(),
            additional_classes: self.resolution.additional_classes.clone(),
            ..GeneratorOptions::new(&self.target.package, &self.target.class_name)
        }
    }

    /// Check values the generator cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.target.package.trim().is_empty() {
            return Err(ConfigError::invalid_value("target.package", "must not be empty"));
        }
        if self.target.class_name.trim().is_empty() {
            return Err(ConfigError::invalid_value("target.class_name", "must not be empty"));
        }
        if let Some(key) = self
            .resolution
            .additional_classes
            .iter()
            .find(|key| !key.contains(':'))
        {
            return Err(ConfigError::invalid_value(
                "resolution.additional_classes",
                format!("'{key}' is not of the form '<root>:<qualified name>'"),
            ));
        }
        Ok(())
    }
}

/// Configuration manager for loading and merging configs.
pub struct ConfigManager;

impl ConfigManager {
    /// Load configuration from a file path.
    ///
    /// If the path is None, attempts to load from the default location.
    /// If no config file exists, returns default configuration.
    pub fn load(path: Option<&Path>) -> CliResult<Config> {
        let config_path = path
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(CONFIG_FILENAME));

        if !config_path.exists() {
            tracing::debug!(path = %config_path.display(), "no config file, using defaults");
            return Ok(Config::default());
        }

        let content = std::fs::read_to_string(&config_path).map_err(|e| ConfigError::Io {
            path: config_path.clone(),
            source: e,
        })?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| ConfigError::invalid_toml(config_path, e.to_string()))?;

        Ok(config)
    }

    /// Merge CLI arguments into configuration.
    ///
    /// CLI arguments take precedence over config file values.
    pub fn merge_cli_args(mut config: Config, args: &CliArgs) -> Config {
        if let Some(ref input) = args.input {
            config.input.dir = input.clone();
        }

        if let Some(ref output) = args.output {
            config.output.dir = output.clone();
        }

        if let Some(ref package) = args.package {
            config.target.package = package.clone();
        }

        if let Some(ref class_name) = args.class_name {
            config.target.class_name = class_name.clone();
        }

        config
    }

    /// Write the commented default configuration file.
    pub fn init(path: &Path, force: bool) -> CliResult<()> {
        if path.exists() && !force {
            return Err(ConfigError::AlreadyExists {
                path: path.to_path_buf(),
            }
            .into());
        }
        std::fs::write(path, Self::default_config_content())?;
        Ok(())
    }

    /// Generate default configuration file content with comments.
    pub fn default_config_content() -> &'static str {
        r#"# grpc-bridge configuration file

[target]
# Schema package; '-' is written as '.' in the protobuf package statement
package = "dev.resteasy.grpc.example"

# Class name: the service is <class_name>Service and the output file
# is <output.dir>/proto/<class_name>.proto
class_name = "Service"

[input]
# Directory holding resolved declaration units (*.json)
dir = "."

# Classes whose qualified name starts with one of these are not scanned for endpoints
exclude_prefixes = ["grpc.server"]

[output]
# Target directory
dir = "./target"

[resolution]
# Directories searched for classes missing from the declaration units.
# A class a.b.C is read from <root>/a/b/C.json
additional_roots = []

# Extra classes to include, as "<root>:<qualified name>"
additional_classes = []
"#
    }
}

/// CLI arguments that can override configuration.
#[derive(Debug, Default)]
pub struct CliArgs {
    /// Input directory override.
    pub input: Option<PathBuf>,

    /// Output directory override.
    pub output: Option<PathBuf>,

    /// Package override.
    pub package: Option<String>,

    /// Class name override.
    pub class_name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.input.dir, PathBuf::from("."));
        assert_eq!(config.input.exclude_prefixes, vec!["grpc.server"]);
        assert_eq!(config.output.dir, PathBuf::from("./target"));
        assert!(config.resolution.additional_roots.is_empty());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_default_content_parses_to_defaults() {
        let config: Config = toml::from_str(ConfigManager::default_config_content()).unwrap();
        let defaults = Config::default();
        assert_eq!(config.target.package, defaults.target.package);
        assert_eq!(config.target.class_name, defaults.target.class_name);
        assert_eq!(config.input.exclude_prefixes, defaults.input.exclude_prefixes);
        assert_eq!(config.output.dir, defaults.output.dir);
    }

    #[test]
    fn test_merge_cli_args() {
        let args = CliArgs {
            output: Some(PathBuf::from("./custom")),
            class_name: Some("CC1".to_string()),
            ..Default::default()
        };

        let merged = ConfigManager::merge_cli_args(Config::default(), &args);
        assert_eq!(merged.output.dir, PathBuf::from("./custom"));
        assert_eq!(merged.target.class_name, "CC1");
        assert_eq!(merged.input.dir, PathBuf::from("."));
    }

    #[test]
    fn test_parse_toml_config() {
        let toml = r#"
[target]
package = "dev-resteasy.example"
class_name = "CC1"

[resolution]
additional_roots = ["../other/src"]
additional_classes = ["../other/src:x.y.Extra"]
"#;

        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.target.class_name, "CC1");
        assert_eq!(config.input.dir, PathBuf::from("."));
        assert_eq!(config.resolution.additional_roots, vec![PathBuf::from("../other/src")]);

        let options = config.generator_options();
        assert_eq!(options.package_name, "dev-resteasy.example");
        assert_eq!(options.additional_classes, vec!["../other/src:x.y.Extra"]);
        assert_eq!(options.excluded_prefixes, vec!["grpc.server"]);
    }

    #[test]
    fn test_validate_rejects_bad_keys() {
        let mut config = Config::default();
        config.resolution.additional_classes.push("x.y.Extra".to_string());
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_load_missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let config = ConfigManager::load(Some(&dir.path().join("missing.toml"))).unwrap();
        assert_eq!(config.target.class_name, "Service");
    }

    #[test]
    fn test_init_refuses_to_overwrite() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILENAME);

        ConfigManager::init(&path, false).unwrap();
        assert!(ConfigManager::init(&path, false).is_err());
        ConfigManager::init(&path, true).unwrap();

        let config = ConfigManager::load(Some(&path)).unwrap();
        assert_eq!(config.output.dir, PathBuf::from("./target"));
    }
}
