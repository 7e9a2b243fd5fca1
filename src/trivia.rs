//! Trivia questions shown during play breaks
//!
//! A bank can be the built-in one or loaded from JSON.

use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A multiple-choice question
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    #[serde(rename = "q")]
    pub text: String,
    #[serde(rename = "o")]
    pub options: Vec<String>,
    #[serde(rename = "a")]
    pub answer: String,
}

impl Question {
    pub fn new(text: &str, options: &[&str], answer: &str) -> Self {
        Self {
            text: text.to_string(),
            options: options.iter().map(|o| o.to_string()).collect(),
            answer: answer.to_string(),
        }
    }

    pub fn is_correct(&self, selected: &str) -> bool {
        selected == self.answer
    }
}

#[derive(Debug, Error)]
pub enum TriviaError {
    #[error("malformed question bank: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("question bank is empty")]
    Empty,
    #[error("answer to {0:?} is not one of its options")]
    AnswerNotAnOption(String),
}

/// The pool questions are drawn from
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionBank {
    questions: Vec<Question>,
}

impl Default for QuestionBank {
    fn default() -> Self {
        Self {
            questions: vec![
                Question::new(
                    "What is `console.log(2 + '2')`?",
                    &["4", "22", "Error", "NaN"],
                    "22",
                ),
                Question::new(
                    "Which keyword defines a variable?",
                    &["var", "let", "const", "All of these"],
                    "All of these",
                ),
                Question::new(
                    "How do you start a for loop?",
                    &["for i = 0", "for (i=0;...)", "loop(i=0)", "for.each"],
                    "for (i=0;...)",
                ),
            ],
        }
    }
}

impl QuestionBank {
    /// Build a bank, rejecting it if empty or if any answer is missing
    /// from its own options
    pub fn new(questions: Vec<Question>) -> Result<Self, TriviaError> {
        if questions.is_empty() {
            return Err(TriviaError::Empty);
        }
        if let Some(bad) = questions.iter().find(|q| !q.options.contains(&q.answer)) {
            return Err(TriviaError::AnswerNotAnOption(bad.text.clone()));
        }
        Ok(Self { questions })
    }

    /// Parse a JSON array of `{ "q": ..., "o": [...], "a": ... }` objects
    pub fn from_json(json: &str) -> Result<Self, TriviaError> {
        let questions: Vec<Question> = serde_json::from_str(json)?;
        Self::new(questions)
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// Pick a question uniformly at random
    pub fn draw<R: Rng>(&self, rng: &mut R) -> Option<&Question> {
        if self.questions.is_empty() {
            return None;
        }
        let index = rng.random_range(0..self.questions.len());
        self.questions.get(index)
    }
}
