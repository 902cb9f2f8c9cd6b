// file: src/config/loader.rs
// version: 2.0.0
// guid: d4e5f6g7-h8i9-0123-4567-890123defghi

//! Settings file loading and environment variable substitution

use super::Settings;
use crate::{BridgeError, Result};
use regex::Regex;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Settings loader with environment variable substitution
pub struct SettingsLoader {
    env_vars: HashMap<String, String>,
}

impl SettingsLoader {
    /// Create a new loader seeded from the process environment
    pub fn new() -> Self {
        Self {
            env_vars: std::env::vars().collect(),
        }
    }

    /// Load settings from a YAML file; keys that are absent keep their defaults
    pub fn load_settings<P: AsRef<Path>>(&self, path: P) -> Result<Settings> {
        let content = fs::read_to_string(&path).map_err(|e| {
            BridgeError::config(format!(
                "Failed to read settings file {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;

        self.parse_settings(&content)
    }

    /// Load settings from `path` when given, otherwise use the defaults
    pub fn load_or_default<P: AsRef<Path>>(&self, path: Option<P>) -> Result<Settings> {
        match path {
            Some(path) => self.load_settings(path),
            None => Ok(Settings::default()),
        }
    }

    fn parse_settings(&self, content: &str) -> Result<Settings> {
        let expanded = self.expand_env_vars(content)?;
        let settings: Settings = if expanded.trim().is_empty() {
            Settings::default()
        } else {
            serde_yaml::from_str(&expanded)?
        };

        settings.validate()?;

        Ok(settings)
    }

    /// Expand `${VAR}` placeholders
    fn expand_env_vars(&self, content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}")
            .map_err(|e| BridgeError::config(format!("Invalid regex pattern: {}", e)))?;

        let mut result = content.to_string();
        let mut missing_vars = Vec::new();

        for cap in re.captures_iter(content) {
            let var_name = &cap[1];
            let placeholder = &cap[0];

            if let Some(value) = self.env_vars.get(var_name) {
                result = result.replace(placeholder, value);
            } else {
                missing_vars.push(var_name.to_string());
            }
        }

        if !missing_vars.is_empty() {
            return Err(BridgeError::config(format!(
                "Missing environment variables: {}",
                missing_vars.join(", ")
            )));
        }

        Ok(result)
    }

    /// Set environment variable for substitution
    pub fn set_env_var(&mut self, key: String, value: String) {
        self.env_vars.insert(key, value);
    }
}

impl Default for SettingsLoader {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::PathBuf;
    use tempfile::NamedTempFile;

    #[test]
    fn test_env_var_expansion() {
        let mut loader = SettingsLoader::new();
        loader.set_env_var("BRIDGE".to_string(), "br1".to_string());

        let result = loader.expand_env_vars("bridge_name: ${BRIDGE}").unwrap();
        assert_eq!(result, "bridge_name: br1");
    }

    #[test]
    fn test_missing_env_var() {
        let loader = SettingsLoader::new();
        let result = loader.expand_env_vars("bridge_name: ${ZT_BRIDGE_SETUP_UNSET_VAR}");
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("Missing environment variables"));
    }

    #[test]
    fn test_load_partial_settings_keeps_defaults() -> Result<()> {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
bridge_name: br1
boot_delay_secs: 60
mirrors:
  - http://deb.debian.org/debian/
"#
        )
        .unwrap();

        let loader = SettingsLoader::new();
        let settings = loader.load_settings(file.path())?;

        assert_eq!(settings.bridge_name, "br1");
        assert_eq!(settings.boot_delay_secs, 60);
        assert_eq!(settings.mirrors.len(), 1);
        assert_eq!(settings.dhcpcd_conf, PathBuf::from("/etc/dhcpcd.conf"));

        Ok(())
    }

    #[test]
    fn test_invalid_settings_rejected() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "mirrors: []").unwrap();

        let loader = SettingsLoader::new();
        assert!(loader.load_settings(file.path()).is_err());
    }

    #[test]
    fn test_load_or_default_without_path() {
        let loader = SettingsLoader::new();
        let settings = loader.load_or_default(None::<&Path>).unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_missing_file_is_config_error() {
        let loader = SettingsLoader::new();
        let result = loader.load_settings("/nonexistent/bridge-settings.yaml");
        assert!(matches!(result, Err(BridgeError::Config(_))));
    }
}
