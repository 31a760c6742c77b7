//! Configuration management for Trail.
//!
//! Parses `trail.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Environment Variable Expansion
//!
//! String configuration values support environment variable expansion:
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! Expanded fields:
//! - `build.site_url`
//! - `diagrams.kroki_url`

mod expand;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override content directory.
    pub content_dir: Option<PathBuf>,
    /// Override output directory.
    pub output_dir: Option<PathBuf>,
    /// Override whether drafts are published.
    pub drafts: Option<bool>,
    /// Override Kroki URL for diagram rendering.
    pub kroki_url: Option<String>,
    /// Override whether a failed diagram aborts the build.
    pub fail_on_diagram_error: Option<bool>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "trail.toml";

/// Public URL of the site when none is configured.
pub const DEFAULT_SITE_URL: &str = "https://chasingcloudcareersllc.github.io";

const DEFAULT_DIAGRAM_THEME: &str = "neutral";
const DEFAULT_DIAGRAM_TIMEOUT_SECS: u64 = 30;

/// Application configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Content configuration (paths are relative strings from TOML).
    content: ContentConfigRaw,
    /// Build configuration (paths are relative strings from TOML).
    build: BuildConfigRaw,
    /// Diagram rendering configuration (optional section).
    /// When present, `kroki_url` is required.
    diagrams: Option<DiagramsConfigRaw>,
    /// Learn tree configuration.
    pub learn: LearnConfig,

    /// Resolved content configuration (set after loading).
    #[serde(skip)]
    pub content_resolved: ContentConfig,
    /// Resolved build configuration (set after loading).
    #[serde(skip)]
    pub build_resolved: BuildConfig,
    /// Resolved diagrams configuration (set after loading).
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

/// Raw content configuration as parsed from TOML.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct ContentConfigRaw {
    dir: Option<String>,
}

/// Resolved content configuration with absolute paths.
#[derive(Debug, Default)]
pub struct ContentConfig {
    /// Root of the content tree (`blog/posts/`, `learn/`).
    pub dir: PathBuf,
}

/// Raw build configuration as parsed from TOML.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct BuildConfigRaw {
    output_dir: Option<String>,
    site_url: Option<String>,
    drafts: Option<bool>,
}

/// Resolved build configuration.
#[derive(Debug)]
pub struct BuildConfig {
    /// Directory the generated site is written to.
    pub output_dir: PathBuf,
    /// Public site URL without trailing slash, used for the sitemap.
    pub site_url: String,
    /// Whether content marked `draft: true` is published.
    pub drafts: bool,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("out"),
            site_url: DEFAULT_SITE_URL.to_owned(),
            drafts: false,
        }
    }
}

/// Raw diagrams configuration as parsed from TOML.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct DiagramsConfigRaw {
    kroki_url: Option<String>,
    theme: Option<String>,
    timeout_secs: Option<u64>,
    fail_on_error: Option<bool>,
}

/// Resolved diagram rendering configuration.
#[derive(Debug)]
pub struct DiagramsConfig {
    /// Kroki server URL. `None` leaves diagram fences as code blocks.
    pub kroki_url: Option<String>,
    /// Default Mermaid theme.
    pub theme: String,
    /// HTTP timeout for Kroki requests.
    pub timeout: Duration,
    /// Abort the build when a diagram fails to render.
    pub fail_on_error: bool,
}

impl Default for DiagramsConfig {
    fn default() -> Self {
        Self {
            kroki_url: None,
            theme: DEFAULT_DIAGRAM_THEME.to_owned(),
            timeout: Duration::from_secs(DEFAULT_DIAGRAM_TIMEOUT_SECS),
            fail_on_error: false,
        }
    }
}

/// Learn tree configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LearnConfig {
    /// Section labels keyed by section directory name.
    pub section_labels: BTreeMap<String, String>,
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
        /// Error message (e.g., "${`KROKI_URL`} not set").
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
    /// Otherwise, searches for `trail.toml` in current directory and parents.
    ///
    /// CLI settings are applied after loading and path resolution, allowing CLI
    /// arguments to take precedence over config file values.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist, parsing fails,
    /// or the result doesn't validate.
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
            config.validate()?;
        }

        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(content_dir) = &settings.content_dir {
            self.content_resolved.dir.clone_from(content_dir);
        }
        if let Some(output_dir) = &settings.output_dir {
            self.build_resolved.output_dir.clone_from(output_dir);
        }
        if let Some(drafts) = settings.drafts {
            self.build_resolved.drafts = drafts;
        }
        if let Some(kroki_url) = &settings.kroki_url {
            self.diagrams_resolved.kroki_url = Some(kroki_url.clone());
        }
        if let Some(fail) = settings.fail_on_diagram_error {
            self.diagrams_resolved.fail_on_error = fail;
        }
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
            content: ContentConfigRaw::default(),
            build: BuildConfigRaw::default(),
            diagrams: None,
            learn: LearnConfig::default(),
            content_resolved: ContentConfig {
                dir: base.join("content"),
            },
            build_resolved: BuildConfig {
                output_dir: base.join("out"),
                ..BuildConfig::default()
            },
            diagrams_resolved: DiagramsConfig::default(),
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
        config.resolve_paths(config_dir)?;
        config.config_path = Some(path.to_path_buf());

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// Called automatically after loading from file and after CLI settings
    /// are applied.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_build()?;
        self.validate_diagrams()?;
        Ok(())
    }

    fn validate_build(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.build_resolved.site_url, "build.site_url")?;
        require_http_url(&self.build_resolved.site_url, "build.site_url")?;
        Ok(())
    }

    fn validate_diagrams(&self) -> Result<(), ConfigError> {
        // Only validate kroki_url if set (diagram rendering enabled)
        if let Some(ref kroki_url) = self.diagrams_resolved.kroki_url {
            require_non_empty(kroki_url, "diagrams.kroki_url")?;
            require_http_url(kroki_url, "diagrams.kroki_url")?;
        }

        if self.diagrams_resolved.timeout.is_zero() {
            return Err(ConfigError::Validation(
                "diagrams.timeout_secs must be greater than 0".to_owned(),
            ));
        }

        Ok(())
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        if let Some(ref url) = self.build.site_url {
            self.build.site_url = Some(expand::expand_env(url, "build.site_url")?);
        }

        if let Some(ref mut diagrams) = self.diagrams
            && let Some(ref url) = diagrams.kroki_url
        {
            diagrams.kroki_url = Some(expand::expand_env(url, "diagrams.kroki_url")?);
        }

        Ok(())
    }

    /// Resolve relative paths against the config directory and fill defaults.
    ///
    /// Validates that `kroki_url` is provided when `[diagrams]` section exists.
    fn resolve_paths(&mut self, config_dir: &Path) -> Result<(), ConfigError> {
        let resolve = |path: Option<&str>, default: &str| config_dir.join(path.unwrap_or(default));

        self.content_resolved = ContentConfig {
            dir: resolve(self.content.dir.as_deref(), "content"),
        };

        self.build_resolved = BuildConfig {
            output_dir: resolve(self.build.output_dir.as_deref(), "out"),
            site_url: self
                .build
                .site_url
                .as_deref()
                .unwrap_or(DEFAULT_SITE_URL)
                .trim_end_matches('/')
                .to_owned(),
            drafts: self.build.drafts.unwrap_or(false),
        };

        self.diagrams_resolved = match &self.diagrams {
            Some(diagrams) => {
                let kroki_url = diagrams.kroki_url.clone().ok_or_else(|| {
                    ConfigError::Validation(
                        "[diagrams] section requires kroki_url to be set".to_owned(),
                    )
                })?;
                DiagramsConfig {
                    kroki_url: Some(kroki_url),
                    theme: diagrams
                        .theme
                        .clone()
                        .unwrap_or_else(|| DEFAULT_DIAGRAM_THEME.to_owned()),
                    timeout: Duration::from_secs(
                        diagrams.timeout_secs.unwrap_or(DEFAULT_DIAGRAM_TIMEOUT_SECS),
                    ),
                    fail_on_error: diagrams.fail_on_error.unwrap_or(false),
                }
            }
            None => DiagramsConfig::default(),
        };

        Ok(())
    }
}
