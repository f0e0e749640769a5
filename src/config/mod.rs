//! Configuration module
//!
//! Handles loading and layering configuration: CLI flags over environment
//! variables over the config file over built-in defaults.

mod env;
mod file;

pub use env::{print_env_help, EnvConfig};
pub use file::ConfigFile;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::output::OutputFormat;
use crate::package::{PackageOptions, DEFAULT_EXCLUDED_DIRS, DEFAULT_EXCLUDED_FILES};

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Server root, e.g. `http://localhost:3000`
    pub base_url: String,

    /// Path prefix of every API route
    pub api_prefix: String,

    /// HTTP timeout in seconds
    pub timeout_secs: u64,

    /// Report format
    pub format: String,

    /// Failed checks whose name contains one of these are critical
    pub critical_keywords: Vec<String>,

    /// Packager settings
    pub package: PackageConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000".to_string(),
            api_prefix: "/api".to_string(),
            timeout_secs: 10,
            format: "table".to_string(),
            critical_keywords: vec![
                "ai tutor".to_string(),
                "authentication".to_string(),
                "database connection".to_string(),
            ],
            package: PackageConfig::default(),
        }
    }
}

/// Extra exclusions for the packager, merged with the built-in sets
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PackageConfig {
    pub excluded_dirs: Vec<String>,
    pub excluded_files: Vec<String>,
}

/// Values given on the command line
#[derive(Clone, Debug, Default)]
pub struct Overrides {
    pub base_url: Option<String>,
    pub timeout_secs: Option<u64>,
    pub format: Option<String>,
}

impl AppConfig {
    /// Layer environment variables on top of this config
    pub fn apply_env(&mut self, env: &EnvConfig) {
        if let Some(base_url) = &env.base_url {
            self.base_url = base_url.clone();
        }
        if let Some(timeout) = env.timeout {
            self.timeout_secs = timeout;
        }
        if let Some(format) = &env.format {
            self.format = format.clone();
        }
    }

    /// Layer command-line values on top of this config
    pub fn apply_overrides(&mut self, overrides: &Overrides) {
        if let Some(base_url) = &overrides.base_url {
            self.base_url = base_url.clone();
        }
        if let Some(timeout) = overrides.timeout_secs {
            self.timeout_secs = timeout;
        }
        if let Some(format) = &overrides.format {
            self.format = format.clone();
        }
    }

    pub fn validate(&self) -> Result<()> {
        let base_url = self.base_url.trim();
        if base_url.is_empty() {
            bail!("Base URL must not be empty");
        }
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            bail!("Base URL must start with http:// or https://: {}", base_url);
        }
        if self.timeout_secs == 0 {
            bail!("Timeout must be greater than zero");
        }
        self.output_format()?;
        Ok(())
    }

    pub fn output_format(&self) -> Result<OutputFormat> {
        OutputFormat::from_str(&self.format)
            .with_context(|| format!("Unknown output format: {}", self.format))
    }

}

impl PackageConfig {
    /// Packager options with the configured exclusions merged into the defaults
    pub fn options(&self, source: impl Into<PathBuf>) -> PackageOptions {
        PackageOptions::new(source)
            .exclude_dirs(self.excluded_dirs.iter().cloned())
            .exclude_files(self.excluded_files.iter().cloned())
    }
}

/// Effective configuration: file (explicit, from env, or discovered) then env then CLI
pub fn resolve(explicit_file: Option<&Path>, overrides: &Overrides) -> Result<AppConfig> {
    resolve_with(explicit_file, &EnvConfig::load(), overrides)
}

fn resolve_with(
    explicit_file: Option<&Path>,
    env: &EnvConfig,
    overrides: &Overrides,
) -> Result<AppConfig> {
    let file = load_file(explicit_file, env)?;

    let mut config = file.app;
    config.apply_env(env);
    config.apply_overrides(overrides);
    config.validate()?;
    Ok(config)
}

/// Packager settings only; verifier overrides from env and CLI are not applied or checked
pub fn resolve_package(explicit_file: Option<&Path>) -> Result<PackageConfig> {
    resolve_package_with(explicit_file, &EnvConfig::load())
}

fn resolve_package_with(explicit_file: Option<&Path>, env: &EnvConfig) -> Result<PackageConfig> {
    Ok(load_file(explicit_file, env)?.app.package)
}

fn load_file(explicit_file: Option<&Path>, env: &EnvConfig) -> Result<ConfigFile> {
    if let Some(path) = explicit_file {
        return ConfigFile::load(path);
    }
    if let Some(path) = &env.config_file {
        return ConfigFile::load(path);
    }
    ConfigFile::load_default()
}

/// Built-in exclusion sets, for display
pub fn default_exclusions() -> (&'static [&'static str], &'static [&'static str]) {
    (DEFAULT_EXCLUDED_DIRS, DEFAULT_EXCLUDED_FILES)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.base_url, "http://localhost:3000");
        assert_eq!(config.api_prefix, "/api");
        assert_eq!(config.timeout_secs, 10);
        assert_eq!(config.critical_keywords.len(), 3);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_precedence() {
        let mut config = AppConfig::default();
        let env = EnvConfig {
            base_url: Some("http://staging:3000".to_string()),
            timeout: Some(20),
            ..EnvConfig::default()
        };
        config.apply_env(&env);
        assert_eq!(config.base_url, "http://staging:3000");

        config.apply_overrides(&Overrides {
            base_url: Some("http://127.0.0.1:4000".to_string()),
            ..Overrides::default()
        });
        assert_eq!(config.base_url, "http://127.0.0.1:4000");
        assert_eq!(config.timeout_secs, 20);
    }

    #[test]
    fn test_validate() {
        let mut config = AppConfig {
            base_url: "localhost:3000".to_string(),
            ..AppConfig::default()
        };
        assert!(config.validate().is_err());

        config.base_url = "https://api.example.com".to_string();
        config.timeout_secs = 0;
        assert!(config.validate().is_err());

        config.timeout_secs = 5;
        config.format = "xml".to_string();
        assert!(config.validate().is_err());
    }

    fn write_config(dir: &Path) -> PathBuf {
        let path = dir.join("linguo-verify.yaml");
        std::fs::write(
            &path,
            "app:\n  package:\n    excluded_dirs: [coverage]\n",
        )
        .unwrap();
        path
    }

    #[test]
    fn test_bad_env_rejects_verify_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(dir.path());
        let env = EnvConfig {
            base_url: Some("not-a-url".to_string()),
            format: Some("xml".to_string()),
            ..EnvConfig::default()
        };
        assert!(resolve_with(Some(&path), &env, &Overrides::default()).is_err());
    }

    #[test]
    fn test_package_config_ignores_verifier_env() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(dir.path());
        let env = EnvConfig {
            base_url: Some("not-a-url".to_string()),
            format: Some("xml".to_string()),
            ..EnvConfig::default()
        };
        let package = resolve_package_with(Some(&path), &env).unwrap();
        assert_eq!(package.excluded_dirs, vec!["coverage".to_string()]);
        assert!(package.options("app").excluded_dirs.contains("coverage"));
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let config: AppConfig = serde_yaml::from_str("base_url: http://example.com\n").unwrap();
        assert_eq!(config.base_url, "http://example.com");
        assert_eq!(config.timeout_secs, 10);
        assert_eq!(config.format, "table");
    }

    #[test]
    fn test_package_options_merge() {
        let config = AppConfig {
            package: PackageConfig {
                excluded_dirs: vec!["coverage".to_string()],
                excluded_files: vec![".env".to_string()],
            },
            ..AppConfig::default()
        };
        let options = config.package.options("app");
        assert!(options.excluded_dirs.contains("coverage"));
        assert!(options.excluded_dirs.contains("node_modules"));
        assert!(options.excluded_files.contains(".env"));
    }
}
