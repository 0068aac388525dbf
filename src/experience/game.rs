//! Five-round progressive choice game.
//!
//! Each round offers one question with three options. The player may change
//! their selection freely until the round is advanced; advancing records the
//! choice and the image generated for it.

use serde::{Deserialize, Serialize};

use super::TransitionError;

/// Number of rounds in a game.
pub const ROUNDS: u32 = 5;

/// A single round's question as produced by the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameQuestion {
    pub round: u32,
    pub question: String,
    pub options: Vec<String>,
    pub image_prompt: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameState {
    /// Round being played, 1-based
    pub current_round: u32,

    /// Choices locked in so far, one per completed round
    pub choices: Vec<String>,

    /// Questions of completed rounds
    pub questions: Vec<GameQuestion>,

    /// Base image followed by one image per completed round
    pub images: Vec<String>,

    pub completed: bool,

    #[serde(default)]
    pub has_begun: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_question: Option<GameQuestion>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_option: Option<String>,
}

impl Default for GameState {
    fn default() -> Self {
        Self {
            current_round: 1,
            choices: Vec::new(),
            questions: Vec::new(),
            images: Vec::new(),
            completed: false,
            has_begun: false,
            current_question: None,
            selected_option: None,
        }
    }
}

impl GameState {
    pub fn new() -> Self {
        Self::default()
    }

    fn ensure_playing(&self) -> Result<(), TransitionError> {
        if self.completed {
            return Err(TransitionError::Completed);
        }
        if !self.has_begun {
            return Err(TransitionError::NotStarted);
        }
        Ok(())
    }

    /// Start the game with the round 1 question and the base image.
    pub fn begin(
        &self,
        first_question: GameQuestion,
        base_image: impl Into<String>,
    ) -> Result<Self, TransitionError> {
        if self.completed {
            return Err(TransitionError::Completed);
        }
        if first_question.round != 1 {
            return Err(TransitionError::WrongRound {
                expected: 1,
                got: first_question.round,
            });
        }

        Ok(Self {
            has_begun: true,
            current_question: Some(first_question),
            images: vec![base_image.into()],
            ..Self::default()
        })
    }

    /// Select an option of the current question.
    ///
    /// Re-selecting within the same round replaces the previous selection.
    pub fn select(&self, option: &str) -> Result<Self, TransitionError> {
        self.ensure_playing()?;
        let offered = self
            .current_question
            .as_ref()
            .is_some_and(|q| q.options.iter().any(|o| o == option));
        if !offered {
            return Err(TransitionError::UnknownOption {
                round: self.current_round,
                option: option.to_string(),
            });
        }

        Ok(Self {
            selected_option: Some(option.to_string()),
            ..self.clone()
        })
    }

    /// Lock in the selection with its generated image.
    ///
    /// Moves to the next round, or completes the game after round 5.
    pub fn advance(&self, image: impl Into<String>) -> Result<Self, TransitionError> {
        self.ensure_playing()?;
        let (Some(selected), Some(question)) = (&self.selected_option, &self.current_question)
        else {
            return Err(TransitionError::NothingSelected(self.current_round));
        };

        let mut next = self.clone();
        next.choices.push(selected.clone());
        next.questions.push(question.clone());
        next.images.push(image.into());
        next.selected_option = None;
        next.current_question = None;

        if self.current_round < ROUNDS {
            next.current_round += 1;
        } else {
            next.completed = true;
        }
        Ok(next)
    }

    /// Install the question for the current round.
    pub fn receive_question(&self, question: GameQuestion) -> Result<Self, TransitionError> {
        self.ensure_playing()?;
        if question.round != self.current_round {
            return Err(TransitionError::WrongRound {
                expected: self.current_round,
                got: question.round,
            });
        }

        Ok(Self {
            current_question: Some(question),
            selected_option: None,
            ..self.clone()
        })
    }

    /// Back to a fresh, unstarted game.
    pub fn restart(&self) -> Self {
        Self::default()
    }

    /// The image the next round builds on.
    pub fn latest_image(&self) -> Option<&str> {
        self.images.last().map(String::as_str)
    }

    /// Game progress appended to chat prompts while the game is on screen.
    pub fn chat_context(&self, scene_title: &str, preview: Option<&GameQuestion>) -> String {
        let mut context = format!(
            "\n\nGame Context: This is \"{}\" - a {}-round progressive choice game where you build a dish step by step.",
            scene_title, ROUNDS
        );

        if self.has_begun {
            context.push_str(&format!(
                "\n\nCurrent Progress: Round {}/{}",
                self.current_round, ROUNDS
            ));
            if !self.choices.is_empty() {
                context.push_str(&format!("\nChoices so far: {}", self.choices.join(" → ")));
            }
            if let Some(question) = &self.current_question {
                context.push_str(&format!(
                    "\n\nCurrent Question: \"{}\"\nOptions: {}",
                    question.question,
                    question.options.join(", ")
                ));
                if let Some(selected) = &self.selected_option {
                    context.push_str(&format!("\nCurrently considering: \"{}\"", selected));
                }
            }
            if !self.choices.is_empty() {
                context.push_str(&format!(
                    "\n\nCurrent dish development: Building a dish with {}",
                    self.choices.join(", ")
                ));
            }
        } else {
            context.push_str(&format!(
                "\n\nThis game involves making {} progressive choices to build a unique dish.",
                ROUNDS
            ));
            if let Some(preview) = preview {
                context.push_str(&format!(
                    "\n\nFirst round options: {}",
                    preview.options.join(", ")
                ));
            }
        }

        context
    }
}
