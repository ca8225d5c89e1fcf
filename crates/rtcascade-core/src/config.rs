use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::estimate::{FriendshipOptions, InteractionOptions, Strategy};
use crate::interaction::Weights;

/// Settings read from `config.toml`.
///
/// ```toml
/// strategy = "interaction"
/// verbose = false
/// top_influencers = 3
///
/// [weights]
/// quote = 1.0
/// reply = 2.0
/// retweet = 0.5
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CascadeConfig {
    #[serde(default)]
    pub strategy: Strategy,
    #[serde(default)]
    pub weights: Weights,
    #[serde(default)]
    pub verbose: bool,
    #[serde(default = "default_top_influencers")]
    pub top_influencers: usize,
}

impl Default for CascadeConfig {
    fn default() -> Self {
        Self {
            strategy: Strategy::default(),
            weights: Weights::default(),
            verbose: false,
            top_influencers: default_top_influencers(),
        }
    }
}

impl CascadeConfig {
    #[must_use]
    pub const fn interaction_options(&self) -> InteractionOptions {
        InteractionOptions {
            weights: self.weights,
            verbose: self.verbose,
        }
    }

    #[must_use]
    pub const fn friendship_options(&self) -> FriendshipOptions {
        FriendshipOptions {
            verbose: self.verbose,
        }
    }
}

/// Load a config file. A missing file yields the defaults.
///
/// # Errors
///
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_config(path: &Path) -> Result<CascadeConfig> {
    if !path.exists() {
        return Ok(CascadeConfig::default());
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    toml::from_str::<CascadeConfig>(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))
}

/// `<config_dir>/rtcascade/config.toml`, if the platform has a config dir.
#[must_use]
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("rtcascade/config.toml"))
}

/// Load the per-user config, falling back to defaults.
///
/// # Errors
///
/// Returns an error if the user config exists but cannot be read or parsed.
pub fn load_user_config() -> Result<CascadeConfig> {
    match user_config_path() {
        Some(path) => load_config(&path),
        None => Ok(CascadeConfig::default()),
    }
}

/// An explicit path wins over the per-user config. An explicit path that does
/// not exist is an error.
///
/// # Errors
///
/// Returns an error if the selected file cannot be read or parsed.
pub fn resolve_config(explicit: Option<&Path>) -> Result<CascadeConfig> {
    match explicit {
        Some(path) => {
            anyhow::ensure!(path.exists(), "config file {} does not exist", path.display());
            load_config(path)
        }
        None => load_user_config(),
    }
}

const fn default_top_influencers() -> usize {
    3
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_config(dir: &tempfile::TempDir, content: &str) -> PathBuf {
        let path = dir.path().join("config.toml");
        std::fs::write(&path, content).expect("write config");
        path
    }

    #[test]
    fn missing_config_uses_defaults() {
        let dir = tempfile::tempdir().expect("tempdir");
        let cfg = load_config(&dir.path().join("absent.toml")).expect("load should succeed");
        assert_eq!(cfg, CascadeConfig::default());
        assert_eq!(cfg.strategy, Strategy::Interaction);
        assert_eq!(cfg.top_influencers, 3);
        assert!((cfg.weights.retweet - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn full_config_parses() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = write_config(
            &dir,
            r#"
strategy = "friendship"
verbose = true
top_influencers = 5

[weights]
quote = 2.0
reply = 0.5
retweet = 0.0
"#,
        );

        let cfg = load_config(&path).expect("parse");
        assert_eq!(cfg.strategy, Strategy::Friendship);
        assert!(cfg.verbose);
        assert_eq!(cfg.top_influencers, 5);
        assert_eq!(cfg.interaction_options().weights, Weights::new(2.0, 0.5, 0.0));
        assert!(cfg.friendship_options().verbose);
    }

    #[test]
    fn short_weight_names_are_accepted() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = write_config(&dir, "[weights]\nqt = 3.0\nrt = 0.25\n");

        let cfg = load_config(&path).expect("parse");
        assert_eq!(cfg.weights, Weights::new(3.0, 1.0, 0.25));
    }

    #[test]
    fn malformed_config_reports_path() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = write_config(&dir, "strategy = \"pagerank\"\n");

        let err = load_config(&path).unwrap_err();
        assert!(err.to_string().contains("config.toml"), "{err}");
    }

    #[test]
    fn explicit_missing_path_is_an_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = resolve_config(Some(&dir.path().join("nope.toml"))).unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }

    #[test]
    fn explicit_path_is_loaded() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = write_config(&dir, "verbose = true\n");
        let cfg = resolve_config(Some(&path)).expect("resolve");
        assert!(cfg.verbose);
        assert_eq!(cfg.strategy, Strategy::Interaction);
    }
}
