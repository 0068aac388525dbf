//! Prompt construction for every model call the service makes.
//!
//! Builders are pure functions of their inputs; anything time- or
//! session-dependent is passed in by the caller.

use crate::catalog::{Character, Scene, SceneType};

use super::quiz::QuizContext;
use super::{ChatMessage, Role};

/// Hints rotated into game question prompts to vary the options offered.
pub const CREATIVE_DIRECTIONS: [&str; 5] = [
    "Explore bold and unexpected flavor combinations",
    "Consider seasonal ingredients and classic techniques",
    "Think about regional specialties and fusion approaches",
    "Focus on texture contrasts and visual appeal",
    "Emphasize fresh, high-quality ingredients",
];

const VOICE_FIRST_CHAT: &str = "VOICE-FIRST FORMATTING REQUIREMENTS:
- This is for a VOICE INTERFACE - keep responses SHORT and conversational
- Maximum 30-50 words per response (2-3 sentences)
- Sound natural when spoken aloud
- Be punchy, engaging, and to the point
- Ask ONE clear question or make ONE clear point per response
- Avoid long explanations - keep it snappy and interactive
- NEVER include voice directions like \"(Warm voice)\" or \"(Enthusiastic tone)\" in your response
- Just write the spoken words directly without any stage directions or parenthetical notes";

const VOICE_FIRST_SEED: &str = "CRITICAL: This is for a VOICE-FIRST interface. Keep it EXTREMELY short:
- Maximum 1-2 sentences
- 15-25 words total
- Sound natural when spoken aloud
- Be punchy and engaging
- Don't explain everything - just get things started
- NEVER include voice directions like \"(Warm voice)\" or \"(Enthusiastic tone)\"
- Just write the spoken words directly without any stage directions";

const PORTRAIT_STYLE: &str = "Front facing close-up shot showing head and shoulders with a little clearance above the head. Full bleed composition. The style is vibrant, and realistic, not photorealistic but very close to it. Character should contrast nicely with the background. Background should include very subtle suggestions of the character's environment. These background hints shouldn't compete with or distract from the character. Clothing, hats, or accessories subtly suggest the character's role. Beautiful color combinations with an emphasis on pastel, earth tones, and lighter shades. Balanced lighting, expressive eyes.";

fn type_approach(scene_type: SceneType) -> &'static str {
    match scene_type {
        SceneType::Game => "You are facilitating a game-based experience. Include game mechanics, track progress toward goals, present challenges, and maintain engagement through gameplay elements. Use scoring, levels, or objectives when appropriate.",
        SceneType::Collab => "You are collaborating as an equal partner. Focus on co-creation, ask for input on decisions, build on the user's ideas, and work together toward a shared outcome. Be collaborative and inclusive in your approach.",
        SceneType::Learn => "You are teaching and educating. Use pedagogical techniques like asking questions to check understanding, providing clear explanations, offering examples, and when appropriate, present quiz questions or flashcard-style learning. Be patient and encouraging.",
        SceneType::Roleplay => "You are engaging in roleplay. Stay in character, respond authentically to the scenario, maintain consistency with your character's background and motivations, and help create an immersive narrative experience.",
    }
}

fn numbered(items: &[String], separator: &str) -> String {
    items
        .iter()
        .enumerate()
        .map(|(i, item)| format!("{}. {}", i + 1, item))
        .collect::<Vec<_>>()
        .join(separator)
}

// =============================================================================
// Chat
// =============================================================================

/// System prompt for a chat turn.
///
/// Unknown characters or scenes degrade to a generic helpful assistant.
pub fn chat_system_prompt(
    character: Option<&Character>,
    scene: Option<&Scene>,
    quiz: Option<&QuizContext>,
) -> String {
    let name = character.map_or("a helpful character", |c| c.name.as_str());
    let role = character.map_or("assistant", |c| c.role.as_str());
    let description = character.map_or("A helpful assistant", |c| c.description.as_str());

    let scene_block = match scene {
        Some(scene) => {
            let rules = match scene.rules.as_deref() {
                Some(rules) if !rules.is_empty() => {
                    format!("\nScene rules to follow:\n{}", numbered(rules, "\n"))
                }
                _ => String::new(),
            };
            format!(
                "\nScene: \"{}\" ({})\nDescription: {}{}\nType-specific approach: {}\n",
                scene.title,
                scene.scene_type,
                scene.description.as_deref().unwrap_or_default(),
                rules,
                type_approach(scene.scene_type)
            )
        }
        None => String::new(),
    };

    let quiz_block = match quiz {
        Some(quiz) => format!(
            "\nQUIZ CONTEXT:\nThe user is currently working on a quiz question and has asked for help. Here's the current question:\nQuestion: {}\nOptions: {}\n\nPlease help the user understand the topic or provide guidance without directly giving away the answer. Focus on teaching and explaining concepts.\n",
            quiz.question,
            numbered(&quiz.options, ", ")
        ),
        None => String::new(),
    };

    format!(
        "You are {name}, a {role}.\n{scene_block}\nCharacter description: {description}\n{quiz_block}\n\n{VOICE_FIRST_CHAT}\n\nBe proactive, concise, and engaging. Stay in character and maintain the scene's context and type throughout the conversation."
    )
}

/// Full chat prompt: system prompt followed by the rendered history.
pub fn chat_prompt(system_prompt: &str, messages: &[ChatMessage]) -> String {
    let history = messages
        .iter()
        .map(|m| {
            let speaker = match m.role {
                Role::User => "User",
                Role::Assistant => "Assistant",
            };
            format!("{}: {}", speaker, m.content)
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!("{}\n\nConversation:\n{}", system_prompt, history)
}

/// Opening line prompt for a scene.
pub fn seed_prompt(character: &Character, scene: &Scene) -> String {
    let opening = match scene.scene_type {
        SceneType::Game => format!(
            "Create a SHORT, energetic opening for the game \"{}\". Just greet the user and kick things off - don't explain rules or mechanics yet.",
            scene.title
        ),
        SceneType::Collab => format!(
            "Create a SHORT, welcoming opening for the collaboration \"{}\". Just greet the user and suggest getting started together.",
            scene.title
        ),
        SceneType::Learn => format!(
            "Create a SHORT, encouraging opening for the learning experience \"{}\". Just greet the user and ask one simple question to get started.",
            scene.title
        ),
        SceneType::Roleplay => format!(
            "Create a SHORT, immersive opening for the roleplay \"{}\". Just greet the user in character and set the immediate scene.",
            scene.title
        ),
    };

    format!(
        "You are {}, a {}. {}\n\n{}\n\nScene: {}\nDescription: {}",
        character.name,
        character.role,
        opening,
        VOICE_FIRST_SEED,
        scene.title,
        scene.description.as_deref().unwrap_or_default()
    )
}

// =============================================================================
// Quiz
// =============================================================================

/// Prompt asking for five multiple-choice questions as a JSON array.
pub fn quiz_prompt(character: &Character, scene_title: &str, scene_description: Option<&str>) -> String {
    let description = scene_description
        .map(|d| format!("\nScene description: {}", d))
        .unwrap_or_default();

    format!(
        "You are {name}, a {role}. Write a 5-question multiple-choice quiz for the learning scene \"{scene_title}\".{description}

REQUIREMENTS:
- Exactly 5 questions that test real knowledge from {name}'s area of expertise
- Each question has exactly 4 options
- correctAnswer is the zero-based index of the right option
- Each explanation is 1-2 sentences and teaches why the answer is right
- Keep wording clear enough to be read aloud

Return ONLY a JSON array with this exact structure:
[
  {{
    \"id\": \"1\",
    \"question\": \"Question text here\",
    \"options\": [\"Option A\", \"Option B\", \"Option C\", \"Option D\"],
    \"correctAnswer\": 0,
    \"explanation\": \"Why the answer is correct\"
  }}
]",
        name = character.name,
        role = character.role,
    )
}

// =============================================================================
// Game
// =============================================================================

/// Prompt for the next question of the 5-round progressive game.
///
/// `session` seeds both the session tag and the creative direction hint.
pub fn game_question_prompt(
    character: &Character,
    game_type: &str,
    previous_choices: &[String],
    round: u32,
    session: u64,
) -> String {
    let choices_context = if previous_choices.is_empty() {
        String::new()
    } else {
        format!("Previous choices: {}\n", previous_choices.join(" → "))
    };
    let session_tag = session % 1_000_000;
    let hint = CREATIVE_DIRECTIONS[(session % CREATIVE_DIRECTIONS.len() as u64) as usize];
    let name = &character.name;

    format!(
        "You are {name}, a {role}. Generate the next question for round {round} of a 5-round progressive choice game.

Game Type: {game_type}
{choices_context}
Session: {session_tag:06}
Creative Direction: {hint}

REQUIREMENTS:
- Generate exactly ONE question for round {round}/5
- Question should be 40-85 characters (aim for engaging, not too short)
- Provide exactly 3 distinct, interesting options
- Each option must be maximum 40 characters
- ALL options must be TANGIBLE INGREDIENTS or COOKING TECHNIQUES that appear on the plate
- NO abstract concepts like temperature, mood, or serving style
- Focus on what goes IN/ON the dish, not how it's served
- Build naturally on previous choices with CULINARY LOGIC
- Consider what actually pairs well with previous choices
- Use your expertise as {name} to suggest complementary flavors/techniques
- Create an image prompt that describes what should be added/changed
- Make it engaging and true to {name}'s expertise
- Questions should be descriptive and exciting, not just bare minimum
- VARY your options - avoid repetitive choices across different game sessions
- Draw from diverse culinary traditions, techniques, and ingredient families
- Consider the creative direction hint to inspire unique options
- ENSURE VISUAL IMPACT - each choice must create a dramatic, visible change to the dish
- Think about color, texture, shape, and overall appearance transformation
- Avoid subtle seasonings that don't change the visual - focus on elements that transform the look

CULINARY PAIRING LOGIC:
- Consider flavor profiles (delicate fish ≠ heavy sauces, robust meats = bold flavors)
- Think about cooking techniques (grilled items pair with different sides than poached)
- Match garnish intensity to dish complexity (simple proteins = elegant garnishes, hearty dishes = rustic elements)
- Consider texture contrasts (creamy dishes benefit from crunchy elements)
- Use seasonal and regional pairings that make culinary sense

Round progression should be:
1. Foundation/Protein (rack of lamb, filet mignon, tofu, chicken breast, salmon fillet, etc. - RAW ingredients)
2. Primary technique/style (grilled, poached, braised, roasted, seared, etc. - shows cooked state)
3. Visible sauce/coating (rich tomato sauce, creamy mushroom sauce, herb crust, glaze, etc. - dramatically changes appearance)
4. Substantial sides/accompaniments (roasted vegetables, risotto, pasta, polenta, etc. - adds major visual elements)
5. Bold finishing touches (fresh herbs, colorful garnishes, nuts, cheese, edible flowers, etc. - clear visual impact)

Return ONLY a JSON object with this exact structure:
{{
  \"round\": {round},
  \"question\": \"Question text here\",
  \"options\": [\"Option 1\", \"Option 2\", \"Option 3\"],
  \"imagePrompt\": \"What to add/change in the image for this round\"
}}",
        role = character.role,
    )
}

/// Prompt for the final dish name.
pub fn dish_name_prompt(character: &Character, choices: &[String]) -> String {
    format!(
        "You are {}, a {}. Based on the cooking choices made, create an elegant dish name for the final creation.

Choices made: {}

Create a sophisticated, restaurant-quality dish name (maximum 50 characters) that sounds like it would appear on a fine dining menu. Use proper culinary terminology.

Examples:
- [\"Salmon fillet\", \"Poached\", \"Lemon herbs\", \"Microgreens\"] → \"Poached Salmon with Lemon Herbs & Microgreens\"
- [\"Rack of lamb\", \"Seared\", \"Rosemary\", \"Root vegetables\"] → \"Seared Rack of Lamb with Rosemary & Root Vegetables\"
- [\"Chicken breast\", \"Grilled\", \"Thyme\", \"Asparagus\"] → \"Grilled Chicken Breast with Thyme & Asparagus\"

Return ONLY the dish name, nothing else. Make it sound elegant and professional.",
        character.name,
        character.role,
        choices.join(" → ")
    )
}

/// Prompt for the short on-the-plate description fed to the image model.
pub fn dish_description_prompt(character: &Character, choices: &[String]) -> String {
    format!(
        "You are {}, a {}. Based on the cooking choices made so far, generate a concise dish description that combines all elements.

Choices made: {}

Create a single, cohesive description (maximum 60 characters) that describes what should be ON THE PLATE right now. This will be used to generate an image.

IMPORTANT:
- If there's only ONE choice (first round), add \"raw\" or \"fresh\" to show uncooked ingredient
- If there are multiple choices, describe the cooking progression without \"raw\"

Examples:
- [\"Salmon Filet\"] → \"raw salmon filet\"
- [\"Rack of lamb\"] → \"raw rack of lamb\"
- [\"Filet mignon\"] → \"raw filet mignon\"
- [\"Tofu\"] → \"fresh tofu block\"
- [\"Filet mignon\", \"Seared\"] → \"seared filet mignon\"
- [\"Salmon fillet\", \"Poached\", \"Lemon herbs\"] → \"poached salmon with lemon herbs\"
- [\"Chicken breast\", \"Grilled\", \"Rosemary\", \"Microgreens\"] → \"grilled chicken with rosemary and microgreens\"

Return ONLY the dish description, nothing else. Focus on what's actually on the plate.",
        character.name,
        character.role,
        choices.join(" → ")
    )
}

// =============================================================================
// Images
// =============================================================================

/// Close-up thumbnail prompt for a scene caption.
pub fn scene_image_prompt(caption: &str) -> String {
    format!(
        "Create a close-up scene image for: \"{caption}\".

Focus on a tight, recognizable close-up that captures the essence of this activity. Choose the best framing for a small thumbnail image:
- Show the main action or key elements up close (hands working, tools in use, key objects)
- Include recognizable character details (clothing, hands, or partial face) to maintain identity
- Use dramatic, clear composition that reads well at small sizes
- Emphasize the most important visual elements of the scene
- Create strong visual contrast and clear focal points
- Avoid including any text, labels, or written words in the image

Examples of good close-up framing:
- Cooking scenes: Hands in chef coat preparing food, close-up of cooking action
- Games: Close-up of game elements, hands interacting with objects
- Learning: Books, flashcards, or study materials with character hands
- Competitions: Close-up of judging, tasting, or competitive elements

Make it immediately recognizable what activity is happening, even at thumbnail size. Focus on visual elements only, no text."
    )
}

/// Image prompt for a game round.
///
/// Round 0 builds the empty workspace from the style reference; later rounds
/// swap the plate contents of the previous image.
pub fn game_image_prompt(
    round: u32,
    current_prompt: &str,
    previous_choices: &[String],
    character_name: &str,
) -> String {
    if round == 0 {
        return format!(
            "Using the provided character image as a style reference ONLY, create a professional cooking workspace: \"{current_prompt}\"

CRITICAL REQUIREMENTS:
- Use the reference image ONLY for artistic style, lighting, and visual quality
- DO NOT include the character's face, body, or any person in the generated image
- Focus entirely on the cooking workspace and plate
- Create a clean, professional cooking environment
- Use the same artistic style and lighting quality as the reference
- Show only hands holding the plate (anonymous hands, not the character)
- Use dramatic, clear composition that reads well at small sizes
- Avoid any text or labels in the image
- Square aspect ratio suitable for mobile display"
        );
    }

    let choices_context = if previous_choices.is_empty() {
        String::new()
    } else {
        format!("Previous choices made: {}\n", previous_choices.join(" → "))
    };

    format!(
        "{choices_context}Using the provided image as the starting point, change the contents on the plate to: \"{current_prompt}\"

CRITICAL REQUIREMENTS:
- Keep the same plate, hands, setting, lighting, and kitchen background from {character_name}'s workspace
- ONLY change what's ON the plate - everything else stays the same
- Replace the current plate contents with the new description
- Maintain the same visual style and composition as {character_name}'s professional kitchen
- Show {character_name}'s hands holding the plate (maintain character consistency)
- Show the new dish contents clearly on the plate
- Use dramatic, clear composition that reads well at small sizes
- Create strong visual contrast and clear focal points
- Avoid any text or labels in the image

The plate should now show: {current_prompt}"
    )
}

/// Portrait prompt: caller text plus the shared bust-portrait style.
pub fn character_portrait_prompt(prompt: &str) -> String {
    format!("{}\n\n{}", prompt, PORTRAIT_STYLE)
}

/// 9:16 explore image prompt with earlier stops as context.
pub fn explore_portrait_prompt(image_prompt: &str, previous_choices: &[String]) -> String {
    let contextual = if previous_choices.is_empty() {
        image_prompt.to_string()
    } else {
        format!(
            "{}. Building on previous tour experiences: {}",
            image_prompt,
            previous_choices.join(", ")
        )
    };

    format!(
        "{contextual}

CRITICAL: Generate this image in PORTRAIT orientation (9:16 aspect ratio - taller than wide).
Think of it as a vertical phone wallpaper or TikTok video frame.
Compose the scene so the main subject fills the tall vertical frame, optimized for mobile viewing."
    )
}

/// Short present-tense voice-over for an explore stop.
pub fn explore_voice_prompt(character_name: &str, title: &str, image_prompt: &str) -> String {
    format!(
        "You are {character_name} at {title}. Based on this visual scene: \"{image_prompt}\", describe in a few short sentences what you see happening right now. Focus on the most striking visual or sensory detail from the scene. Be immediate, present, and paint a vivid picture with your words."
    )
}
