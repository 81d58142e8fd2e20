//! Configuration management for tfviz.
//!
//! Parses `tfviz.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Environment Variable Expansion
//!
//! `diagrams.kroki_url` supports environment variable expansion:
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "tfviz.toml";

/// Preset names accepted in `diagrams.preset`.
const PRESETS: &[&str] = &["paper", "poster", "presentation"];

/// Format names accepted in `diagrams.format`.
const FORMATS: &[&str] = &["svg", "png", "pdf"];

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override figure title.
    pub title: Option<String>,
    /// Override Kroki URL for figure rendering.
    pub kroki_url: Option<String>,
    /// Override rendering DPI.
    pub dpi: Option<u32>,
    /// Override layout preset name.
    pub preset: Option<String>,
    /// Override output image format.
    pub format: Option<String>,
    /// Override output directory for rendered figures.
    pub output_dir: Option<PathBuf>,
}

/// Application configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Project-level settings.
    pub project: ProjectConfig,
    /// Source trees to scan (paths are relative strings from TOML).
    sources: Vec<SourceConfigRaw>,
    /// Figure rendering configuration.
    diagrams: DiagramsConfigRaw,

    /// Resolved source trees (set after loading).
    #[serde(skip)]
    pub sources_resolved: Vec<SourceConfig>,
    /// Resolved rendering configuration (set after loading).
    #[serde(skip)]
    pub diagrams_resolved: DiagramsConfig,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_with_base(Path::new("."))
    }
}

/// Project-level settings.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    /// Title placed at the top of rendered figures.
    pub title: String,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            title: "Architecture".to_owned(),
        }
    }
}

/// Raw source-tree entry as parsed from TOML (paths as strings).
#[derive(Debug, Deserialize)]
struct SourceConfigRaw {
    dir: String,
    tier: String,
    #[serde(default)]
    runtime: bool,
}

/// Resolved source tree with an absolute path.
#[derive(Debug, Clone)]
pub struct SourceConfig {
    /// Directory containing `.tf` files.
    pub dir: PathBuf,
    /// Tier label attached to everything extracted from this tree.
    pub tier: String,
    /// Whether resources in this tree are provisioned at runtime.
    pub runtime: bool,
}

/// Raw rendering configuration as parsed from TOML (paths as strings).
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct DiagramsConfigRaw {
    kroki_url: Option<String>,
    dpi: Option<u32>,
    preset: Option<String>,
    format: Option<String>,
    output_dir: Option<String>,
    timeout_secs: Option<u64>,
}

/// Resolved figure rendering configuration with absolute paths.
#[derive(Debug, Clone)]
pub struct DiagramsConfig {
    /// Kroki server URL for figure rendering.
    pub kroki_url: String,
    /// DPI for rendered figures.
    pub dpi: u32,
    /// Layout preset name.
    pub preset: String,
    /// Output image format.
    pub format: String,
    /// Directory rendered figures are written to.
    pub output_dir: PathBuf,
    /// HTTP timeout for render requests.
    pub timeout: Duration,
}

impl DiagramsConfig {
    fn default_with_base(base: &Path) -> Self {
        Self {
            kroki_url: "https://kroki.io".to_owned(),
            dpi: 300,
            preset: "paper".to_owned(),
            format: "png".to_owned(),
            output_dir: base.join("figures"),
            timeout: Duration::from_secs(30),
        }
    }
}

impl Default for DiagramsConfig {
    fn default() -> Self {
        Self::default_with_base(Path::new("."))
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`diagrams.kroki_url`").
        field: String,
        /// Error message.
        message: String,
    },
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

/// Require a URL field to use http:// or https:// scheme.
fn require_http_url(url: &str, field: &str) -> Result<(), ConfigError> {
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(ConfigError::Validation(format!(
            "{field} must start with http:// or https://"
        )));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `tfviz.toml` in current directory and parents.
    ///
    /// CLI settings are applied after loading and path resolution, allowing CLI
    /// arguments to take precedence over config file values.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist or parsing fails.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default_with_cwd()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
        }

        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(title) = &settings.title {
            self.project.title.clone_from(title);
        }
        if let Some(kroki_url) = &settings.kroki_url {
            self.diagrams_resolved.kroki_url.clone_from(kroki_url);
        }
        if let Some(dpi) = settings.dpi {
            self.diagrams_resolved.dpi = dpi;
        }
        if let Some(preset) = &settings.preset {
            self.diagrams_resolved.preset.clone_from(preset);
        }
        if let Some(format) = &settings.format {
            self.diagrams_resolved.format.clone_from(format);
        }
        if let Some(output_dir) = &settings.output_dir {
            self.diagrams_resolved.output_dir.clone_from(output_dir);
        }
    }

    /// The tier label of the source tree marked `runtime = true`, if any.
    #[must_use]
    pub fn runtime_tier(&self) -> Option<&str> {
        self.sources_resolved
            .iter()
            .find(|source| source.runtime)
            .map(|source| source.tier.as_str())
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Create default config with paths relative to current working directory.
    fn default_with_cwd() -> Self {
        let cwd = std::env::current_dir().unwrap_or_default();
        Self::default_with_base(&cwd)
    }

    /// Create default config with paths relative to given base directory.
    fn default_with_base(base: &Path) -> Self {
        Self {
            project: ProjectConfig::default(),
            sources: Vec::new(),
            diagrams: DiagramsConfigRaw::default(),
            sources_resolved: Vec::new(),
            diagrams_resolved: DiagramsConfig::default_with_base(base),
            config_path: None,
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        // Expand environment variables before path resolution
        config.expand_env_vars()?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve_paths(config_dir);
        config.config_path = Some(path.to_path_buf());

        // Validate configuration after loading and resolution
        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// Checks that all required fields are properly set and contain valid values.
    /// Called automatically after loading from file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_sources()?;
        self.validate_diagrams()?;
        Ok(())
    }

    /// Validate source tree entries.
    fn validate_sources(&self) -> Result<(), ConfigError> {
        for source in &self.sources_resolved {
            require_non_empty(&source.tier, "sources.tier")?;
        }

        let runtime_count = self
            .sources_resolved
            .iter()
            .filter(|source| source.runtime)
            .count();
        if runtime_count > 1 {
            return Err(ConfigError::Validation(
                "at most one source may set runtime = true".to_owned(),
            ));
        }

        Ok(())
    }

    /// Validate figure rendering configuration.
    fn validate_diagrams(&self) -> Result<(), ConfigError> {
        const MAX_DPI: u32 = 1000;

        let diagrams = &self.diagrams_resolved;

        require_non_empty(&diagrams.kroki_url, "diagrams.kroki_url")?;
        require_http_url(&diagrams.kroki_url, "diagrams.kroki_url")?;

        if !PRESETS.contains(&diagrams.preset.as_str()) {
            return Err(ConfigError::Validation(format!(
                "diagrams.preset must be one of {}, got '{}'",
                PRESETS.join(", "),
                diagrams.preset
            )));
        }

        if !FORMATS.contains(&diagrams.format.as_str()) {
            return Err(ConfigError::Validation(format!(
                "diagrams.format must be one of {}, got '{}'",
                FORMATS.join(", "),
                diagrams.format
            )));
        }

        if diagrams.dpi == 0 {
            return Err(ConfigError::Validation(
                "diagrams.dpi must be greater than 0".to_owned(),
            ));
        }
        if diagrams.dpi > MAX_DPI {
            return Err(ConfigError::Validation(format!(
                "diagrams.dpi cannot exceed {MAX_DPI}"
            )));
        }

        Ok(())
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        if let Some(ref url) = self.diagrams.kroki_url {
            let expanded = shellexpand::env(url).map_err(|e| ConfigError::EnvVar {
                field: "diagrams.kroki_url".to_owned(),
                message: e.to_string(),
            })?;
            self.diagrams.kroki_url = Some(expanded.into_owned());
        }
        Ok(())
    }

    /// Resolve relative paths to absolute paths based on config directory.
    fn resolve_paths(&mut self, config_dir: &Path) {
        self.sources_resolved = self
            .sources
            .iter()
            .map(|source| SourceConfig {
                dir: config_dir.join(&source.dir),
                tier: source.tier.clone(),
                runtime: source.runtime,
            })
            .collect();

        let defaults = DiagramsConfig::default_with_base(config_dir);
        self.diagrams_resolved = DiagramsConfig {
            kroki_url: self.diagrams.kroki_url.clone().unwrap_or(defaults.kroki_url),
            dpi: self.diagrams.dpi.unwrap_or(defaults.dpi),
            preset: self.diagrams.preset.clone().unwrap_or(defaults.preset),
            format: self.diagrams.format.clone().unwrap_or(defaults.format),
            output_dir: self
                .diagrams
                .output_dir
                .as_deref()
                .map_or(defaults.output_dir, |dir| config_dir.join(dir)),
            timeout: self
                .diagrams
                .timeout_secs
                .map_or(defaults.timeout, Duration::from_secs),
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_config() {
        let config = Config::default_with_base(Path::new("/test"));
        assert_eq!(config.project.title, "Architecture");
        assert!(config.sources_resolved.is_empty());
        assert_eq!(config.diagrams_resolved.kroki_url, "https://kroki.io");
        assert_eq!(config.diagrams_resolved.dpi, 300);
        assert_eq!(config.diagrams_resolved.preset, "paper");
        assert_eq!(config.diagrams_resolved.format, "png");
        assert_eq!(
            config.diagrams_resolved.output_dir,
            PathBuf::from("/test/figures")
        );
        assert_eq!(config.diagrams_resolved.timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_parse_minimal_config() {
        let toml = "";
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.project.title, "Architecture");
    }

    #[test]
    fn test_resolve_paths() {
        let toml = r#"
[project]
title = "LabLink Architecture"

[[sources]]
dir = "terraform"
tier = "infra"

[[sources]]
dir = "client/terraform"
tier = "dynamic"
runtime = true

[diagrams]
kroki_url = "http://localhost:8000"
dpi = 192
preset = "poster"
format = "svg"
output_dir = "out/figures"
timeout_secs = 10
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        config.resolve_paths(Path::new("/project"));

        assert_eq!(config.project.title, "LabLink Architecture");
        assert_eq!(config.sources_resolved.len(), 2);
        assert_eq!(
            config.sources_resolved[0].dir,
            PathBuf::from("/project/terraform")
        );
        assert_eq!(config.sources_resolved[0].tier, "infra");
        assert!(!config.sources_resolved[0].runtime);
        assert_eq!(
            config.sources_resolved[1].dir,
            PathBuf::from("/project/client/terraform")
        );
        assert!(config.sources_resolved[1].runtime);
        assert_eq!(config.diagrams_resolved.kroki_url, "http://localhost:8000");
        assert_eq!(config.diagrams_resolved.dpi, 192);
        assert_eq!(config.diagrams_resolved.preset, "poster");
        assert_eq!(config.diagrams_resolved.format, "svg");
        assert_eq!(
            config.diagrams_resolved.output_dir,
            PathBuf::from("/project/out/figures")
        );
        assert_eq!(config.diagrams_resolved.timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_runtime_tier() {
        let toml = r#"
[[sources]]
dir = "a"
tier = "infra"

[[sources]]
dir = "b"
tier = "dynamic"
runtime = true
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        config.resolve_paths(Path::new("/project"));
        assert_eq!(config.runtime_tier(), Some("dynamic"));

        let config = Config::default_with_base(Path::new("/test"));
        assert_eq!(config.runtime_tier(), None);
    }

    #[test]
    fn test_apply_cli_settings() {
        let mut config = Config::default_with_base(Path::new("/test"));
        let overrides = CliSettings {
            title: Some("Override".to_owned()),
            kroki_url: Some("http://localhost:9000".to_owned()),
            dpi: Some(96),
            preset: Some("presentation".to_owned()),
            format: Some("pdf".to_owned()),
            output_dir: Some(PathBuf::from("/custom/out")),
        };

        config.apply_cli_settings(&overrides);

        assert_eq!(config.project.title, "Override");
        assert_eq!(config.diagrams_resolved.kroki_url, "http://localhost:9000");
        assert_eq!(config.diagrams_resolved.dpi, 96);
        assert_eq!(config.diagrams_resolved.preset, "presentation");
        assert_eq!(config.diagrams_resolved.format, "pdf");
        assert_eq!(
            config.diagrams_resolved.output_dir,
            PathBuf::from("/custom/out")
        );
    }

    #[test]
    fn test_apply_cli_settings_empty() {
        let before = Config::default_with_base(Path::new("/test"));
        let mut config = Config::default_with_base(Path::new("/test"));

        config.apply_cli_settings(&CliSettings::default());

        assert_eq!(config.project.title, before.project.title);
        assert_eq!(
            config.diagrams_resolved.kroki_url,
            before.diagrams_resolved.kroki_url
        );
        assert_eq!(config.diagrams_resolved.dpi, before.diagrams_resolved.dpi);
    }

    #[test]
    fn test_expand_env_vars_kroki_url() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::set_var("TEST_TFVIZ_KROKI_URL", "https://kroki.test.com");
        }

        let toml = r#"
[diagrams]
kroki_url = "${TEST_TFVIZ_KROKI_URL}"
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        config.expand_env_vars().unwrap();

        assert_eq!(
            config.diagrams.kroki_url,
            Some("https://kroki.test.com".to_owned())
        );

        unsafe {
            std::env::remove_var("TEST_TFVIZ_KROKI_URL");
        }
    }

    #[test]
    fn test_expand_env_vars_missing_required_var() {
        // SAFETY: test runs single-threaded per test function
        unsafe {
            std::env::remove_var("MISSING_VAR_TFVIZ_TEST");
        }

        let toml = r#"
[diagrams]
kroki_url = "${MISSING_VAR_TFVIZ_TEST}"
"#;
        let mut config: Config = toml::from_str(toml).unwrap();
        let result = config.expand_env_vars();

        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(matches!(err, ConfigError::EnvVar { .. }));
        assert!(err.to_string().contains("diagrams.kroki_url"));
    }

    // Validation tests

    /// Assert that validation fails with expected substrings in the error message.
    fn assert_validation_error(config: &Config, expected_substrings: &[&str]) {
        let result = config.validate();
        assert!(result.is_err(), "Expected validation to fail");
        let err = result.unwrap_err();
        assert!(
            matches!(err, ConfigError::Validation(_)),
            "Expected ConfigError::Validation, got {err:?}"
        );
        let msg = err.to_string();
        for s in expected_substrings {
            assert!(
                msg.contains(s),
                "Expected error to contain '{s}', got: {msg}"
            );
        }
    }

    #[test]
    fn test_validate_default_config_passes() {
        let config = Config::default_with_base(Path::new("/test"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_kroki_url_empty() {
        let mut config = Config::default_with_base(Path::new("/test"));
        config.diagrams_resolved.kroki_url = String::new();
        assert_validation_error(&config, &["kroki_url", "empty"]);
    }

    #[test]
    fn test_validate_kroki_url_invalid_scheme() {
        let mut config = Config::default_with_base(Path::new("/test"));
        config.diagrams_resolved.kroki_url = "ftp://kroki.io".to_owned();
        assert_validation_error(&config, &["kroki_url", "http"]);
    }

    #[test]
    fn test_validate_unknown_preset() {
        let mut config = Config::default_with_base(Path::new("/test"));
        config.diagrams_resolved.preset = "billboard".to_owned();
        assert_validation_error(&config, &["preset", "billboard"]);
    }

    #[test]
    fn test_validate_unknown_format() {
        let mut config = Config::default_with_base(Path::new("/test"));
        config.diagrams_resolved.format = "gif".to_owned();
        assert_validation_error(&config, &["format", "gif"]);
    }

    #[test]
    fn test_validate_dpi_zero() {
        let mut config = Config::default_with_base(Path::new("/test"));
        config.diagrams_resolved.dpi = 0;
        assert_validation_error(&config, &["dpi", "greater than 0"]);
    }

    #[test]
    fn test_validate_dpi_too_high() {
        let mut config = Config::default_with_base(Path::new("/test"));
        config.diagrams_resolved.dpi = 2000;
        assert_validation_error(&config, &["dpi", "1000"]);
    }

    #[test]
    fn test_validate_empty_tier() {
        let mut config = Config::default_with_base(Path::new("/test"));
        config.sources_resolved.push(SourceConfig {
            dir: PathBuf::from("/test/terraform"),
            tier: String::new(),
            runtime: false,
        });
        assert_validation_error(&config, &["sources.tier", "empty"]);
    }

    #[test]
    fn test_validate_multiple_runtime_sources() {
        let mut config = Config::default_with_base(Path::new("/test"));
        for tier in ["a", "b"] {
            config.sources_resolved.push(SourceConfig {
                dir: PathBuf::from("/test").join(tier),
                tier: tier.to_owned(),
                runtime: true,
            });
        }
        assert_validation_error(&config, &["runtime"]);
    }
}
