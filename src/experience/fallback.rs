//! Static content served when the model is unavailable or returns
//! something unusable.

use super::game::{GameQuestion, ROUNDS};
use super::quiz::QuizQuestion;

/// Opening line when seed generation fails.
pub const SEED_FALLBACK: &str = "Hey there! Ready to get started?";

/// Echo reply when chat generation fails.
pub fn chat_fallback(last_user_message: &str) -> String {
    format!("Got it! Let's tackle: {}", last_user_message)
}

struct RoundTemplate {
    question: &'static str,
    options: [&'static str; 3],
    image_prompt: &'static str,
}

const ROUND_TEMPLATES: [RoundTemplate; ROUNDS as usize] = [
    RoundTemplate {
        question: "Pick the star protein for your signature plate today!",
        options: ["Salmon fillet", "Rack of lamb", "Chicken breast"],
        image_prompt: "Place the raw protein at the center of the plate",
    },
    RoundTemplate {
        question: "How should we cook it to bring out the most flavor?",
        options: ["Pan-seared", "Slow-roasted", "Grilled over open flame"],
        image_prompt: "Show the protein cooked with visible browning",
    },
    RoundTemplate {
        question: "Which sauce will make this dish truly unforgettable?",
        options: ["Lemon butter sauce", "Red wine reduction", "Herb chimichurri"],
        image_prompt: "Add a glossy sauce over and around the protein",
    },
    RoundTemplate {
        question: "What hearty side deserves a spot next to the main?",
        options: ["Creamy risotto", "Roasted root vegetables", "Garlic mashed potatoes"],
        image_prompt: "Add a generous side alongside the protein",
    },
    RoundTemplate {
        question: "Choose a bold finishing touch for the final plating!",
        options: ["Fresh microgreens", "Toasted hazelnuts", "Edible flowers"],
        image_prompt: "Finish the plate with a colorful garnish on top",
    },
];

/// Deterministic question for a round; rounds outside 1..=5 are clamped.
pub fn game_question(round: u32) -> GameQuestion {
    let index = round.clamp(1, ROUNDS) as usize - 1;
    let template = &ROUND_TEMPLATES[index];
    GameQuestion {
        round,
        question: template.question.to_string(),
        options: template.options.iter().map(|o| o.to_string()).collect(),
        image_prompt: template.image_prompt.to_string(),
    }
}

fn question(
    id: &str,
    text: impl Into<String>,
    options: [&str; 4],
    correct_answer: usize,
    explanation: &str,
) -> QuizQuestion {
    QuizQuestion {
        id: id.to_string(),
        question: text.into(),
        options: options.iter().map(|o| o.to_string()).collect(),
        correct_answer,
        explanation: explanation.to_string(),
    }
}

/// Five static questions for a scene.
///
/// Titles mentioning spices or cooking get a culinary set; anything else
/// gets generic questions templated on the title.
pub fn quiz_questions(scene_title: &str) -> Vec<QuizQuestion> {
    let lowered = scene_title.to_lowercase();
    if lowered.contains("spice") || lowered.contains("cooking") {
        return culinary_quiz();
    }

    vec![
        question(
            "1",
            format!("What is a key concept related to \"{}\"?", scene_title),
            ["Option A", "Option B", "Option C", "Option D"],
            0,
            "This is a placeholder explanation that would be generated based on the scene content.",
        ),
        question(
            "2",
            format!("Which approach is most effective for \"{}\"?", scene_title),
            ["Method 1", "Method 2", "Method 3", "Method 4"],
            1,
            "This explanation would be tailored to the specific scene and character expertise.",
        ),
        question(
            "3",
            format!(
                "What is an important consideration when dealing with \"{}\"?",
                scene_title
            ),
            ["Factor A", "Factor B", "Factor C", "Factor D"],
            2,
            "This would provide context-specific information based on the scene description.",
        ),
        question(
            "4",
            format!("How would you best apply knowledge from \"{}\"?", scene_title),
            [
                "Application 1",
                "Application 2",
                "Application 3",
                "Application 4",
            ],
            0,
            "This explanation would connect theory to practical application.",
        ),
        question(
            "5",
            format!("What is a common misconception about \"{}\"?", scene_title),
            [
                "Misconception A",
                "Misconception B",
                "Misconception C",
                "Misconception D",
            ],
            1,
            "This would address common misunderstandings in the subject area.",
        ),
    ]
}

fn culinary_quiz() -> Vec<QuizQuestion> {
    vec![
        question(
            "1",
            "Which spice is known as the 'king of spices' and is one of the most expensive spices in the world?",
            ["Cardamom", "Saffron", "Vanilla", "Black Pepper"],
            1,
            "Saffron is known as the 'king of spices' due to its intense flavor, aroma, and high price. It's harvested from the flower of Crocus sativus and requires about 150 flowers to produce just 1 gram of saffron.",
        ),
        question(
            "2",
            "What cooking method involves cooking food slowly in liquid at a temperature just below boiling?",
            ["Sautéing", "Braising", "Poaching", "Grilling"],
            2,
            "Poaching involves cooking food gently in liquid (water, broth, wine, etc.) at temperatures between 160-180°F (71-82°C), just below boiling. This method is perfect for delicate foods like eggs, fish, and fruits.",
        ),
        question(
            "3",
            "Which spice blend is essential in Indian cuisine and typically contains cumin, coriander, turmeric, and other spices?",
            ["Garam Masala", "Curry Powder", "Berbere", "Za'atar"],
            1,
            "Curry powder is a spice blend that typically includes turmeric (giving it the yellow color), cumin, coriander, and various other spices. While garam masala is also important in Indian cuisine, curry powder is more universally recognized for these specific base ingredients.",
        ),
        question(
            "4",
            "What is the primary difference between sautéing and stir-frying?",
            [
                "Temperature of the pan",
                "Amount of oil used",
                "Size of food pieces",
                "Type of pan used",
            ],
            2,
            "The main difference is the size of food pieces. Sautéing typically uses larger pieces of food that are cooked in a single layer, while stir-frying uses smaller, uniformly cut pieces that are constantly moved around the pan.",
        ),
        question(
            "5",
            "Which spice gives curry its characteristic yellow color?",
            ["Cumin", "Coriander", "Turmeric", "Paprika"],
            2,
            "Turmeric is responsible for the bright yellow color in curry. It contains curcumin, which gives it both its vibrant color and many of its health benefits.",
        ),
    ]
}
