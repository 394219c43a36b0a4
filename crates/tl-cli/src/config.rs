//! Configuration loading and management.

use std::fmt;
use std::path::{Path, PathBuf};

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};
use tl_core::{Rounding, ShouldTotal};
use tl_text::ReadOptions;

/// Application configuration.
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Rounding applied to records that do not specify one, e.g. `"15m"`.
    pub default_rounding: Option<Rounding>,

    /// Target for records that do not specify one, e.g. `"8h30m!"`.
    pub default_should_total: Option<ShouldTotal>,

    /// Never print warnings about suspicious records.
    pub hide_warnings: bool,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field(
                "default_rounding",
                &self.default_rounding.map(|r| r.to_string()),
            )
            .field(
                "default_should_total",
                &self.default_should_total.map(|s| s.to_string()),
            )
            .field("hide_warnings", &self.hide_warnings)
            .finish()
    }
}

impl Config {
    /// Loads configuration, optionally from a specific file.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Load from default config location
        if let Some(config_dir) = dirs_config_path() {
            figment = figment.merge(Toml::file(config_dir.join("config.toml")));
        }

        // Load from specified config file
        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        // Load from environment variables (TL_*)
        figment = figment.merge(Env::prefixed("TL_"));

        figment.extract()
    }

    /// Reader defaults derived from this configuration.
    pub const fn read_options(&self) -> ReadOptions {
        ReadOptions {
            default_should_total: self.default_should_total,
            default_rounding: self.default_rounding,
        }
    }
}

/// Returns the platform-specific config directory for tl.
///
/// On Linux: `~/.config/tl`
pub fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("tl"))
}

#[cfg(test)]
mod tests {
    use super::*;

    use tl_core::Comparison;

    fn write_config(contents: &str) -> (tempfile::TempDir, PathBuf) {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("config.toml");
        std::fs::write(&path, contents).unwrap();
        (temp, path)
    }

    #[test]
    fn test_dirs_config_path_ends_with_tl() {
        let path = dirs_config_path().unwrap();
        assert_eq!(path.file_name().unwrap(), "tl");
    }

    #[test]
    fn test_default_config_has_no_defaults() {
        let options = Config::default().read_options();
        assert_eq!(options, ReadOptions::default());
    }

    #[test]
    fn test_config_file_values_are_parsed() {
        let (_temp, path) = write_config(
            "default_rounding = \"15m\"\ndefault_should_total = \">=8h30m!\"\n",
        );
        let config = Config::load_from(Some(&path)).unwrap();

        assert_eq!(config.default_rounding.unwrap().minutes(), 15);
        let should = config.default_should_total.unwrap();
        assert_eq!(should.comparison(), Comparison::AtLeast);
        assert_eq!(should.to_string(), ">=8h30m!");
    }

    #[test]
    fn test_hide_warnings_is_read_from_file() {
        let (_temp, path) = write_config("hide_warnings = true\n");
        let config = Config::load_from(Some(&path)).unwrap();
        assert!(config.hide_warnings);
        assert_eq!(config.read_options(), ReadOptions::default());
    }

    #[test]
    fn test_invalid_rounding_fails_loading() {
        let (_temp, path) = write_config("default_rounding = \"7m\"\n");
        assert!(Config::load_from(Some(&path)).is_err());
    }

    #[test]
    fn test_invalid_should_total_fails_loading() {
        let (_temp, path) = write_config("default_should_total = \"8h\"\n");
        assert!(Config::load_from(Some(&path)).is_err());
    }

    #[test]
    fn test_debug_shows_canonical_values() {
        let config = Config {
            default_rounding: Some(Rounding::new(30).unwrap()),
            ..Config::default()
        };
        assert_eq!(
            format!("{config:?}"),
            "Config { default_rounding: Some(\"30m\"), default_should_total: None, hide_warnings: false }"
        );
    }
}
