//! Text-to-speech voice assignment per character.

use serde::Serialize;

const ZERO_SHOT_VOICE: &str =
    "s3://voice-cloning-zero-shot/30248400-25d1-47b0-9f08-c7abfa104ceb/original/manifest.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VoiceConfig {
    pub voice_id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
}

/// Voice used for characters without a mapping.
pub const DEFAULT_VOICE: VoiceConfig = VoiceConfig {
    voice_id: ZERO_SHOT_VOICE,
    name: "Default Voice",
    description: "Default character voice",
};

const fn voice(name: &'static str, description: &'static str) -> VoiceConfig {
    VoiceConfig {
        voice_id: ZERO_SHOT_VOICE,
        name,
        description,
    }
}

const CHARACTER_VOICES: &[(&str, VoiceConfig)] = &[
    (
        "chef-gusteau",
        voice("Chef Gusteau Voice", "Warm, authoritative chef voice"),
    ),
    (
        "chef-nomi-delgado",
        voice("Chef Nomi Voice", "Energetic, passionate chef voice"),
    ),
    (
        "chef-rin",
        voice("Chef Rin Voice", "Precise, technical chef voice"),
    ),
    (
        "jax-rivera",
        voice("Jax Rivera Voice", "Creative, artistic voice"),
    ),
    (
        "mira-solange",
        voice("Mira Solange Voice", "Sophisticated, analytical voice"),
    ),
    (
        "pixel-patch",
        voice("Pixel Patch Voice", "Playful, energetic voice"),
    ),
    (
        "professor-ada-quill",
        voice("Professor Ada Quill Voice", "Academic, thoughtful voice"),
    ),
    (
        "riff-kwan",
        voice("Riff Kwan Voice", "Musical, rhythmic voice"),
    ),
    (
        "sage-ellison",
        voice("Sage Ellison Voice", "Wise, calming voice"),
    ),
    (
        "terra-novak",
        voice("Terra Novak Voice", "Adventurous, confident voice"),
    ),
];

/// Voice for a character, or [`DEFAULT_VOICE`].
pub fn voice_for(character_id: &str) -> VoiceConfig {
    CHARACTER_VOICES
        .iter()
        .find(|(id, _)| *id == character_id)
        .map(|(_, v)| *v)
        .unwrap_or(DEFAULT_VOICE)
}
