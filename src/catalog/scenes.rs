//! Scenes and the flat-file scene store.
//!
//! Scenes for a character are resolved in this order:
//!
//! 1. `<data_dir>/scenes/<character_id>.json`, when present and non-empty
//! 2. the predefined list shipped with the binary
//! 3. an empty list
//!
//! Created scenes are appended to the character's current list and the whole
//! list is written back to the JSON file.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, error, info};

use crate::error::StoreError;

use super::rules::generate_rules;

const BUILTIN_SCENES: &str = include_str!("../../assets/scenes.json");

/// Subdirectory of the data dir holding per-character scene lists.
pub const SCENES_DIR: &str = "scenes";

// =============================================================================
// Types
// =============================================================================

/// Broad category of a scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SceneType {
    Game,
    Collab,
    Learn,
    Roleplay,
}

impl SceneType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SceneType::Game => "Game",
            SceneType::Collab => "Collab",
            SceneType::Learn => "Learn",
            SceneType::Roleplay => "Roleplay",
        }
    }
}

impl fmt::Display for SceneType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Interaction mode the client renders for a scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExperienceType {
    #[default]
    Conversation,
    Quiz,
    Flashcard,
    GameProgression,
    Explore,
}

/// A predefined or user-created interaction unit for a character.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scene {
    pub id: String,
    pub character_id: String,
    pub title: String,
    pub caption: String,
    #[serde(rename = "type")]
    pub scene_type: SceneType,
    #[serde(default)]
    pub experience: ExperienceType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rules: Option<Vec<String>>,
}

/// Input of the scene-creation flow.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewScene {
    pub character_id: String,
    pub title: String,
    pub description: String,
    #[serde(rename = "type")]
    pub scene_type: SceneType,
    #[serde(default)]
    pub experience: Option<ExperienceType>,
}

// =============================================================================
// Scene Store
// =============================================================================

/// Flat-file scene store with a predefined fallback.
pub struct SceneStore {
    dir: PathBuf,
    predefined: HashMap<String, Vec<Scene>>,
    write_lock: Mutex<()>,
}

impl SceneStore {
    /// Create a store rooted at `<data_dir>/scenes` with the given predefined lists.
    pub fn new(data_dir: impl AsRef<Path>, predefined: HashMap<String, Vec<Scene>>) -> Self {
        Self {
            dir: data_dir.as_ref().join(SCENES_DIR),
            predefined,
            write_lock: Mutex::new(()),
        }
    }

    /// Create a store backed by the scenes shipped with the binary.
    pub fn with_builtin(data_dir: impl AsRef<Path>) -> Result<Self, StoreError> {
        Ok(Self::new(data_dir, builtin_scenes()?))
    }

    /// Directory holding the per-character JSON files.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn file_for(&self, character_id: &str) -> PathBuf {
        self.dir.join(format!("{}.json", character_id))
    }

    /// Read the cached list for a character.
    ///
    /// Unreadable or unparsable files are logged and treated as absent.
    async fn load_cached(&self, character_id: &str) -> Option<Vec<Scene>> {
        let path = self.file_for(character_id);
        let raw = match tokio::fs::read_to_string(&path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => {
                error!(character_id, error = %e, "Error loading cached scenes");
                return None;
            }
        };

        match serde_json::from_str::<Vec<Scene>>(&raw) {
            Ok(scenes) => Some(scenes),
            Err(e) => {
                error!(character_id, error = %e, "Cached scene file is not valid JSON");
                None
            }
        }
    }

    /// Scenes offered for a character, in cache → predefined → empty order.
    pub async fn scenes_for(&self, character_id: &str) -> Vec<Scene> {
        if let Some(cached) = self.load_cached(character_id).await {
            if !cached.is_empty() {
                debug!(character_id, count = cached.len(), "Using cached scenes");
                return cached;
            }
        }

        if let Some(predefined) = self.predefined.get(character_id) {
            debug!(
                character_id,
                count = predefined.len(),
                "Using predefined scenes"
            );
            return predefined.clone();
        }

        debug!(character_id, "No scenes found, using empty list");
        Vec::new()
    }

    /// Look up one scene by id.
    pub async fn find(&self, character_id: &str, scene_id: &str) -> Option<Scene> {
        self.scenes_for(character_id)
            .await
            .into_iter()
            .find(|s| s.id == scene_id)
    }

    /// Like [`find`](Self::find), but a missing scene is an error.
    pub async fn get(&self, character_id: &str, scene_id: &str) -> Result<Scene, StoreError> {
        self.find(character_id, scene_id)
            .await
            .ok_or_else(|| StoreError::SceneNotFound {
                character_id: character_id.to_string(),
                scene_id: scene_id.to_string(),
            })
    }

    /// Create a scene for a character and persist the character's list.
    ///
    /// The caller is responsible for checking the character exists.
    pub async fn create(&self, new_scene: NewScene) -> Result<Scene, StoreError> {
        let title = new_scene.title.trim();
        let description = new_scene.description.trim();
        if title.is_empty() {
            return Err(StoreError::InvalidScene("title is required".to_string()));
        }
        if description.is_empty() {
            return Err(StoreError::InvalidScene(
                "description is required".to_string(),
            ));
        }
        validate_file_stem(&new_scene.character_id)?;

        let _guard = self.write_lock.lock().await;

        let mut scenes = self.scenes_for(&new_scene.character_id).await;

        let mut scene = Scene {
            id: next_scene_id(&scenes),
            character_id: new_scene.character_id.clone(),
            title: title.to_string(),
            caption: title.to_string(),
            scene_type: new_scene.scene_type,
            experience: new_scene.experience.unwrap_or_default(),
            description: Some(description.to_string()),
            rules: None,
        };
        scene.rules = Some(generate_rules(&scene));

        scenes.push(scene.clone());
        self.write_scenes(&new_scene.character_id, &scenes).await?;

        info!(
            character_id = %scene.character_id,
            scene_id = %scene.id,
            title = %scene.title,
            "Scene created"
        );

        Ok(scene)
    }

    /// Write the predefined list for every character without a cache file.
    ///
    /// Existing files are never overwritten. Returns the ids initialized.
    pub async fn initialize_predefined(&self) -> Result<Vec<String>, StoreError> {
        let _guard = self.write_lock.lock().await;

        let mut character_ids: Vec<&String> = self.predefined.keys().collect();
        character_ids.sort();

        let mut initialized = Vec::new();
        for character_id in character_ids {
            let path = self.file_for(character_id);
            let exists = tokio::fs::try_exists(&path)
                .await
                .map_err(|e| io_error(&path, e))?;
            if exists {
                continue;
            }

            let scenes = &self.predefined[character_id];
            self.write_scenes(character_id, scenes).await?;
            info!(
                character_id = %character_id,
                count = scenes.len(),
                "Initialized predefined scenes"
            );
            initialized.push(character_id.clone());
        }

        Ok(initialized)
    }

    async fn write_scenes(&self, character_id: &str, scenes: &[Scene]) -> Result<(), StoreError> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| io_error(&self.dir, e))?;

        let path = self.file_for(character_id);
        let json = serde_json::to_string_pretty(scenes).map_err(|e| StoreError::Parse {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json)
            .await
            .map_err(|e| io_error(&tmp, e))?;
        tokio::fs::rename(&tmp, &path)
            .await
            .map_err(|e| io_error(&path, e))?;
        Ok(())
    }
}

// =============================================================================
// Helpers
// =============================================================================

/// Parse the predefined scene lists shipped with the binary.
pub fn builtin_scenes() -> Result<HashMap<String, Vec<Scene>>, StoreError> {
    serde_json::from_str(BUILTIN_SCENES).map_err(|e| StoreError::Parse {
        path: "assets/scenes.json".to_string(),
        message: e.to_string(),
    })
}

/// Next id for a new scene: one past the largest numeric id.
fn next_scene_id(scenes: &[Scene]) -> String {
    let max = scenes
        .iter()
        .filter_map(|s| s.id.parse::<u64>().ok())
        .max()
        .unwrap_or(0);
    (max + 1).to_string()
}

fn validate_file_stem(id: &str) -> Result<(), StoreError> {
    if id.is_empty() || id.contains(['/', '\\']) || id.contains("..") {
        return Err(StoreError::InvalidScene(format!(
            "invalid character id: {:?}",
            id
        )));
    }
    Ok(())
}

fn io_error(path: &Path, err: std::io::Error) -> StoreError {
    StoreError::Io {
        path: path.display().to_string(),
        message: err.to_string(),
    }
}

// =============================================================================
// Tests
// =============================================================================
