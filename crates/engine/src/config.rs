//! Editor configuration, layered with figment.
//!
//! Built-in defaults are overlaid by `SBE_*` environment variables, e.g.
//! `SBE_DATA_DIR=/tmp/sbe` or `SBE_EXAMPLE_COUNT=3`.

use std::path::PathBuf;

use figment::{
    providers::{Env, Serialized},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::EngineError;

const fn default_example_count() -> usize {
    10
}

fn default_mod_name() -> String {
    "SimpleBackstoryEditor".to_string()
}

fn default_backstories_file() -> String {
    "backstories.xml".to_string()
}

fn default_replacements_example_file() -> String {
    "replacementsExample.xml".to_string()
}

fn default_replacements_file() -> String {
    "replacements.xml".to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct EditorConfig {
    /// Overrides the per-platform data directory when set.
    #[serde(default)]
    pub data_dir: Option<PathBuf>,

    /// Name of the directory the files live in under the game's data directory.
    #[serde(default = "default_mod_name")]
    pub mod_name: String,

    /// Number of records written to the example file.
    #[serde(default = "default_example_count")]
    pub example_count: usize,

    #[serde(default = "default_backstories_file")]
    pub backstories_file: String,

    #[serde(default = "default_replacements_example_file")]
    pub replacements_example_file: String,

    #[serde(default = "default_replacements_file")]
    pub replacements_file: String,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            mod_name: default_mod_name(),
            example_count: default_example_count(),
            backstories_file: default_backstories_file(),
            replacements_example_file: default_replacements_example_file(),
            replacements_file: default_replacements_file(),
        }
    }
}

impl EditorConfig {
    pub fn load() -> Result<Self, EngineError> {
        Ok(Self::figment().extract()?)
    }

    pub fn figment() -> Figment {
        Figment::from(Serialized::defaults(Self::default())).merge(Env::prefixed("SBE_"))
    }

    /// Defaults with the data directory pinned, bypassing platform detection.
    pub fn with_data_dir(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: Some(data_dir.into()),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn defaults_are_correct() {
        let config = EditorConfig::default();
        assert_eq!(config.data_dir, None);
        assert_eq!(config.example_count, 10);
        assert_eq!(config.backstories_file, "backstories.xml");
        assert_eq!(config.replacements_example_file, "replacementsExample.xml");
        assert_eq!(config.replacements_file, "replacements.xml");
    }

    #[test]
    fn env_overrides_defaults() {
        Jail::expect_with(|jail| {
            jail.set_env("SBE_DATA_DIR", "/tmp/sbe-data");
            jail.set_env("SBE_EXAMPLE_COUNT", "3");

            let config = EditorConfig::load().expect("config loads");
            assert_eq!(config.data_dir, Some(PathBuf::from("/tmp/sbe-data")));
            assert_eq!(config.example_count, 3);
            assert_eq!(config.mod_name, "SimpleBackstoryEditor");
            Ok(())
        });
    }

    #[test]
    fn rejects_bad_count() {
        Jail::expect_with(|jail| {
            jail.set_env("SBE_EXAMPLE_COUNT", "lots");
            assert!(matches!(EditorConfig::load(), Err(EngineError::Config(_))));
            Ok(())
        });
    }
}
