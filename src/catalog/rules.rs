//! Rule generation for user-created scenes.
//!
//! Every scene type gets three rules. Each rule is either fixed or picked
//! from an ordered keyword map matched against the lowercased title and
//! description; the first keyword hit wins.

use super::scenes::{Scene, SceneType};

type KeywordMap = &'static [(&'static str, &'static str)];

const COLLAB_GOALS: KeywordMap = &[
    ("write", "We'll create written content together"),
    ("design", "We'll design something visual together"),
    ("plan", "We'll develop a comprehensive plan"),
    ("build", "We'll construct something step by step"),
    ("create", "We'll make something new from scratch"),
    ("develop", "We'll build and refine an idea together"),
];

const COLLAB_ARTIFACTS: KeywordMap = &[
    ("sketch", "a complete comedy sketch you can perform or share"),
    ("routine", "a polished comedy routine ready for performance"),
    ("recipe", "a detailed recipe you can cook and enjoy"),
    ("menu", "a complete menu plan you can use for your event"),
    ("workout", "a personalized workout plan you can follow"),
    ("plan", "a detailed plan you can implement"),
    ("design", "a finished design you can use or modify"),
];

const GAME_RULES: KeywordMap = &[
    ("quiz", "I'll ask questions and you choose or guess the answers"),
    (
        "challenge",
        "You'll face creative challenges with time or resource limits",
    ),
    ("competition", "We'll compete in rounds with points and winners"),
    ("guessing", "You'll make guesses based on clues I provide"),
    ("trivia", "Answer trivia questions to earn points and advance"),
];

const ROLEPLAY_CONTEXTS: KeywordMap = &[
    (
        "training",
        "You're in a training scenario where I'm your instructor",
    ),
    (
        "session",
        "We're in a one-on-one session focused on your goals",
    ),
    (
        "competition",
        "You're competing or being judged in a formal setting",
    ),
    (
        "collaboration",
        "We're working together as professional partners",
    ),
    (
        "consultation",
        "You're getting expert advice in a consultation setting",
    ),
];

const PRACTICE_METHODS: [&str; 3] = [
    "We'll use flashcards, quizzes, and interactive exercises",
    "You'll practice with step-by-step guidance and examples",
    "We'll go through concepts with questions and explanations",
];

/// Generate the three mechanics rules for a scene.
pub fn generate_rules(scene: &Scene) -> Vec<String> {
    let title = scene.title.to_lowercase();
    let description = scene
        .description
        .as_deref()
        .unwrap_or_default()
        .to_lowercase();
    let lookup = |map: KeywordMap| -> Option<&'static str> {
        map.iter()
            .find(|(key, _)| title.contains(key) || description.contains(key))
            .map(|(_, value)| *value)
    };

    match scene.scene_type {
        SceneType::Collab => vec![
            lookup(COLLAB_GOALS)
                .unwrap_or("We'll work together to create something meaningful")
                .to_string(),
            "You share ideas and preferences, I build on them with expertise".to_string(),
            match lookup(COLLAB_ARTIFACTS) {
                Some(artifact) => format!("We'll end with {}", artifact),
                None => "We'll create something tangible you can save and use".to_string(),
            },
        ],
        SceneType::Learn => vec![
            format!("I'll guide you through {}", learn_topic(&title)),
            PRACTICE_METHODS[scene.title.chars().count() % PRACTICE_METHODS.len()].to_string(),
            "You'll get immediate feedback and track your understanding".to_string(),
        ],
        SceneType::Game => vec![
            lookup(GAME_RULES)
                .unwrap_or("Simple rules with clear objectives and win conditions")
                .to_string(),
            "You make choices or responses, I react and keep score".to_string(),
            "Success earns points or reveals, with fun reactions either way".to_string(),
        ],
        SceneType::Roleplay => vec![
            lookup(ROLEPLAY_CONTEXTS)
                .unwrap_or("You're in a realistic scenario with clear context and stakes")
                .to_string(),
            "Respond naturally as yourself, make choices, and engage authentically".to_string(),
            "I'll adapt to your responses and the story branches based on your choices"
                .to_string(),
        ],
    }
}

/// Strip a leading "learn " from a lowercased title.
fn learn_topic(title: &str) -> &str {
    match title.strip_prefix("learn") {
        Some(rest) if rest.starts_with(char::is_whitespace) => rest.trim_start(),
        _ => title,
    }
}
