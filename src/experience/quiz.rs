//! Multiple-choice quiz state.
//!
//! Unlike the game, a quiz answer is final: once a question is answered a
//! second answer is rejected and the state is left as it was.

use serde::{Deserialize, Serialize};

use super::TransitionError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizQuestion {
    pub id: String,
    pub question: String,
    pub options: Vec<String>,
    /// Zero-based index into `options`
    pub correct_answer: usize,
    pub explanation: String,
}

/// The question a user asked for help with, sent along with chat requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizContext {
    pub question_id: String,
    pub question: String,
    pub options: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionProgress {
    pub selected_answer: Option<usize>,
    pub is_answered: bool,
    pub is_correct: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizState {
    pub questions: Vec<QuizQuestion>,
    pub question_states: Vec<QuestionProgress>,
    pub score: usize,
    pub is_complete: bool,
}

impl QuizState {
    pub fn new(questions: Vec<QuizQuestion>) -> Self {
        let question_states = vec![QuestionProgress::default(); questions.len()];
        Self {
            questions,
            question_states,
            score: 0,
            is_complete: false,
        }
    }

    /// Answer question `question` with option `answer`.
    pub fn answer(&self, question: usize, answer: usize) -> Result<Self, TransitionError> {
        let (q, progress) = self
            .questions
            .get(question)
            .zip(self.question_states.get(question))
            .ok_or(TransitionError::NoSuchQuestion(question))?;
        if progress.is_answered {
            return Err(TransitionError::AlreadyAnswered(question));
        }
        if answer >= q.options.len() {
            return Err(TransitionError::NoSuchOption { question, answer });
        }

        let is_correct = answer == q.correct_answer;
        let mut next = self.clone();
        next.question_states[question] = QuestionProgress {
            selected_answer: Some(answer),
            is_answered: true,
            is_correct,
        };
        if is_correct {
            next.score += 1;
        }
        next.is_complete = next.answered_count() >= next.questions.len();
        Ok(next)
    }

    /// Index of the first unanswered question.
    pub fn next_unanswered(&self) -> Option<usize> {
        self.question_states.iter().position(|s| !s.is_answered)
    }

    pub fn answered_count(&self) -> usize {
        self.question_states.iter().filter(|s| s.is_answered).count()
    }

    /// Same questions, no answers.
    pub fn reset(&self) -> Self {
        Self::new(self.questions.clone())
    }

    /// Help context for chat about question `index`.
    pub fn context_for(&self, index: usize) -> Option<QuizContext> {
        self.questions.get(index).map(|q| QuizContext {
            question_id: q.id.clone(),
            question: q.question.clone(),
            options: q.options.clone(),
        })
    }
}
