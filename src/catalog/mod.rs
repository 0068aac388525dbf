//! Content catalog: characters, scenes, explore tours and voices.
//!
//! Characters, tours and the predefined scenes are embedded JSON documents
//! parsed at startup. Scenes can additionally be created at runtime and are
//! persisted as one JSON file per character by [`SceneStore`].

mod characters;
mod rules;
mod scenes;
mod tours;
mod voices;

pub use characters::{Character, CharacterCatalog};
pub use rules::generate_rules;
pub use scenes::{builtin_scenes, ExperienceType, NewScene, Scene, SceneStore, SceneType, SCENES_DIR};
pub use tours::{DeeperLevel, ExploreStop, GoDeeper, StopView, Tour, TourCatalog, MAX_DEPTH};
pub use voices::{voice_for, VoiceConfig, DEFAULT_VOICE};
