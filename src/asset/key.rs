//! Cache keys for generated assets.
//!
//! A key is a file name under the directory of its [`AssetKind`]:
//!
//! - scene images: `<characterId>-<sceneId>.png`
//! - game images: `<characterId>-<sceneId>-r<round>-<hash>.png`, where
//!   `hash` is the first 8 characters of the base64 encoding of the
//!   previous choices joined with `|`

use std::fmt;

use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine;

use crate::error::AssetError;

/// Length of the choices fingerprint in game image keys.
const CHOICES_HASH_LEN: usize = 8;

/// Which cache directory an asset lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetKind {
    SceneImage,
    GameImage,
}

impl AssetKind {
    /// Directory name under the data dir.
    pub fn dir_name(&self) -> &'static str {
        match self {
            AssetKind::SceneImage => "scene-images",
            AssetKind::GameImage => "game-images",
        }
    }
}

/// Deterministic identifier of a cached asset.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AssetKey {
    kind: AssetKind,
    file_name: String,
}

impl AssetKey {
    /// Key for a scene thumbnail.
    pub fn scene(character_id: &str, scene_id: &str) -> Result<Self, AssetError> {
        validate_component(character_id)?;
        validate_component(scene_id)?;
        Ok(Self {
            kind: AssetKind::SceneImage,
            file_name: format!("{}-{}.png", character_id, scene_id),
        })
    }

    /// Key for one round of a progressive game image.
    pub fn game(
        character_id: &str,
        scene_id: &str,
        round: u32,
        choices: &[String],
    ) -> Result<Self, AssetError> {
        validate_component(character_id)?;
        validate_component(scene_id)?;
        Ok(Self {
            kind: AssetKind::GameImage,
            file_name: format!(
                "{}-{}-r{}-{}.png",
                character_id,
                scene_id,
                round,
                choices_hash(choices)
            ),
        })
    }

    pub fn kind(&self) -> AssetKind {
        self.kind
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }
}

impl fmt::Display for AssetKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.kind.dir_name(), self.file_name)
    }
}

/// First 8 base64 characters of the joined choices.
///
/// `/` is a legal base64 character, so it is replaced with `_` to keep the
/// key a single path component.
fn choices_hash(choices: &[String]) -> String {
    let encoded = BASE64_STANDARD.encode(choices.join("|"));
    encoded
        .chars()
        .take(CHOICES_HASH_LEN)
        .map(|c| if c == '/' { '_' } else { c })
        .collect()
}

fn validate_component(component: &str) -> Result<(), AssetError> {
    if component.is_empty()
        || component.contains(['/', '\\', '\0'])
        || component.contains("..")
    {
        return Err(AssetError::InvalidKey(component.to_string()));
    }
    Ok(())
}
