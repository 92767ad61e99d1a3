use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::warn;

use crate::constants::{
    DEFAULT_TEXTURE_DIR, DEFAULT_WORLD_DEPTH, DEFAULT_WORLD_HEIGHT, DEFAULT_WORLD_WIDTH,
    MESH_QUEUE_CAPACITY, MESH_WORKER_COUNT, VIEW_DISTANCE,
};

pub const DEFAULT_SETTINGS_PATH: &str = "settings.toml";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("failed to encode settings: {0}")]
    Encode(#[from] toml::ser::Error),
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct GameSettings {
    pub graphics: GraphicsSettings,
    pub controls: ControlsSettings,
    pub world: WorldSettings,
    pub paths: PathSettings,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct GraphicsSettings {
    /// Chunk radius kept meshed around the player.
    pub view_distance: i32,
    /// Vertical field of view in degrees.
    pub fov: f32,
    pub vsync: bool,
    pub mesh_workers: usize,
    pub mesh_queue_capacity: usize,
}

/// One core stays with the render thread.
fn default_mesh_workers() -> usize {
    num_cpus::get().saturating_sub(1).clamp(1, MESH_WORKER_COUNT)
}

impl Default for GraphicsSettings {
    fn default() -> Self {
        Self {
            view_distance: VIEW_DISTANCE,
            fov: 70.0,
            vsync: true,
            mesh_workers: default_mesh_workers(),
            mesh_queue_capacity: MESH_QUEUE_CAPACITY,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct ControlsSettings {
    /// Radians of rotation per pixel of mouse movement.
    pub mouse_sensitivity: f32,
    pub invert_mouse: bool,
}

impl Default for ControlsSettings {
    fn default() -> Self {
        Self {
            mouse_sensitivity: 0.001,
            invert_mouse: false,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct WorldSettings {
    pub width: u32,
    pub height: u32,
    pub depth: u32,
    /// Fixed terrain seed; random when absent.
    pub seed: Option<u32>,
}

impl Default for WorldSettings {
    fn default() -> Self {
        Self {
            width: DEFAULT_WORLD_WIDTH,
            height: DEFAULT_WORLD_HEIGHT,
            depth: DEFAULT_WORLD_DEPTH,
            seed: None,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct PathSettings {
    pub textures: PathBuf,
}

impl Default for PathSettings {
    fn default() -> Self {
        Self {
            textures: PathBuf::from(DEFAULT_TEXTURE_DIR),
        }
    }
}

impl GameSettings {
    /// Read settings from `path`. A missing file is an error; callers that
    /// want defaults use [`GameSettings::load_or_default`].
    pub fn load_from_path(path: &Path) -> Result<Self, SettingsError> {
        let contents = fs::read_to_string(path).map_err(|source| SettingsError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&contents).map_err(|source| SettingsError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load configuration, falling back to defaults on errors.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load_from_path(path) {
            Ok(settings) => settings,
            Err(SettingsError::Read { source, .. })
                if source.kind() == std::io::ErrorKind::NotFound =>
            {
                warn!("Settings not found at {}. Using defaults", path.display());
                Self::default()
            }
            Err(err) => {
                warn!("{err}. Using defaults");
                Self::default()
            }
        }
    }

    pub fn save_to_path(&self, path: &Path) -> Result<(), SettingsError> {
        let toml = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| SettingsError::Write {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        fs::write(path, toml).map_err(|source| SettingsError::Write {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_files_fill_in_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        fs::write(&path, "[graphics]\nview_distance = 3\n\n[world]\nseed = 99\n").unwrap();

        let settings = GameSettings::load_from_path(&path).unwrap();
        assert_eq!(settings.graphics.view_distance, 3);
        assert_eq!(settings.graphics.fov, 70.0);
        assert_eq!(settings.world.seed, Some(99));
        assert_eq!(settings.world.height, DEFAULT_WORLD_HEIGHT);
    }

    #[test]
    fn save_then_load_preserves_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.toml");
        let mut settings = GameSettings::default();
        settings.controls.invert_mouse = true;
        settings.paths.textures = PathBuf::from("assets/blocks");

        settings.save_to_path(&path).unwrap();
        assert_eq!(GameSettings::load_from_path(&path).unwrap(), settings);
    }

    #[test]
    fn bad_files_fall_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        fs::write(&path, "graphics = 5").unwrap();

        assert!(matches!(
            GameSettings::load_from_path(&path),
            Err(SettingsError::Parse { .. })
        ));
        assert_eq!(GameSettings::load_or_default(&path), GameSettings::default());
        assert_eq!(
            GameSettings::load_or_default(&dir.path().join("absent.toml")),
            GameSettings::default()
        );
    }
}
