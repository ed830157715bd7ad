use std::path::{Path, PathBuf};

use crate::config::EditorConfig;
use crate::error::EngineError;

const STUDIO: &str = "Ludeon Studios";
const GAME: &str = "RimWorld";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Windows,
    Linux,
    MacOs,
}

impl Platform {
    pub fn detect() -> Result<Self, EngineError> {
        let platform = Self::from_os(std::env::consts::OS)?;
        tracing::info!(platform = platform.as_str(), "detected platform");
        Ok(platform)
    }

    pub fn from_os(os: &str) -> Result<Self, EngineError> {
        match os {
            "windows" => Ok(Self::Windows),
            "linux" => Ok(Self::Linux),
            "macos" => Ok(Self::MacOs),
            other => Err(EngineError::UnsupportedPlatform(other.to_string())),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Windows => "windows",
            Self::Linux => "linux",
            Self::MacOs => "macos",
        }
    }

    /// Directory the game keeps its own data in, before the mod's subdirectory.
    fn base_dir(&self) -> Option<PathBuf> {
        match self {
            // The game writes to LocalLow, the sibling of the roaming app-data dir.
            Self::Windows => dirs::data_dir()
                .and_then(|roaming| roaming.parent().map(|parent| parent.join("LocalLow"))),
            Self::Linux => dirs::config_dir().map(|config| config.join("unity3d")),
            Self::MacOs => dirs::data_dir(),
        }
    }

    pub fn compose(&self, base: &Path, mod_name: &str) -> PathBuf {
        match self {
            Self::Windows | Self::Linux => base
                .join(STUDIO)
                .join(format!("{GAME} by {STUDIO}"))
                .join(mod_name),
            Self::MacOs => base.join(GAME).join(mod_name),
        }
    }

    pub fn data_dir(&self, mod_name: &str) -> Result<PathBuf, EngineError> {
        let base = self.base_dir().ok_or_else(|| {
            EngineError::UnsupportedPlatform(format!(
                "no home directory available on {}",
                self.as_str()
            ))
        })?;
        Ok(self.compose(&base, mod_name))
    }
}

/// Resolves the data directory from config or the current platform, and
/// makes sure it exists.
pub fn resolve_data_dir(config: &EditorConfig) -> Result<PathBuf, EngineError> {
    let dir = match &config.data_dir {
        Some(dir) => dir.clone(),
        None => Platform::detect()?.data_dir(&config.mod_name)?,
    };
    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
