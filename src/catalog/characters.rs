//! Character records and the built-in character list.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::StoreError;

const BUILTIN_CHARACTERS: &str = include_str!("../../assets/characters.json");

/// An AI character the user can talk to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Character {
    /// Unique slug, e.g. `chef-nomi-delgado`
    pub id: String,

    /// Display name
    pub name: String,

    /// Role shown under the name, e.g. "Culinary Expert"
    pub role: String,

    /// Search tags
    #[serde(default)]
    pub tags: Vec<String>,

    /// One-line description
    pub description: String,

    /// Bust-framed portrait URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,

    /// Prompt that regenerates a consistent portrait
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_prompt: Option<String>,
}

impl Character {
    /// URL the client should load the portrait from.
    ///
    /// Falls back to the character-image endpoint with the stored prompt, or
    /// a generic bust-portrait prompt built from name and role.
    pub fn portrait_url(&self) -> String {
        if let Some(url) = &self.image_url {
            return url.clone();
        }

        let prompt = match &self.image_prompt {
            Some(prompt) => prompt.clone(),
            None => format!(
                "bust portrait of {} ({}), neutral background, soft diffused lighting, crisp focus, clean color palette",
                self.name, self.role
            ),
        };
        format!(
            "/api/character-image?prompt={}",
            urlencoding::encode(&prompt)
        )
    }

    /// Path of the style reference image used for image-to-image generation.
    pub fn reference_image_path(&self, public_dir: &Path) -> PathBuf {
        public_dir.join("characters").join(format!("{}.png", self.id))
    }

    fn matches(&self, needle: &str) -> bool {
        self.name.to_lowercase().contains(needle)
            || self.role.to_lowercase().contains(needle)
            || self.description.to_lowercase().contains(needle)
            || self.tags.iter().any(|t| t.to_lowercase().contains(needle))
    }
}

/// Read-only list of characters.
#[derive(Debug, Clone, Default)]
pub struct CharacterCatalog {
    characters: Vec<Character>,
}

impl CharacterCatalog {
    /// Create a catalog from an explicit list.
    pub fn new(characters: Vec<Character>) -> Self {
        Self { characters }
    }

    /// Load the characters shipped with the binary.
    pub fn builtin() -> Result<Self, StoreError> {
        let characters: Vec<Character> =
            serde_json::from_str(BUILTIN_CHARACTERS).map_err(|e| StoreError::Parse {
                path: "assets/characters.json".to_string(),
                message: e.to_string(),
            })?;
        Ok(Self::new(characters))
    }

    pub fn all(&self) -> &[Character] {
        &self.characters
    }

    pub fn get(&self, id: &str) -> Option<&Character> {
        self.characters.iter().find(|c| c.id == id)
    }

    /// Case-insensitive substring search over name, role, tags and description.
    pub fn search(&self, query: &str) -> Vec<Character> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return self.characters.clone();
        }
        self.characters
            .iter()
            .filter(|c| c.matches(&needle))
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.characters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.characters.is_empty()
    }
}
