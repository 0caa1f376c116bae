use std::collections::BTreeMap;
use std::sync::Arc;

use crate::questionnaire::Question;

pub fn response_key(ordinal: usize) -> String {
    format!("q{ordinal}")
}

pub fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NavigationSession {
    questions: Arc<[Question]>,
    current_index: usize,
    responses: BTreeMap<String, String>,
}

impl NavigationSession {
    pub fn new(questions: Vec<Question>) -> Option<Self> {
        if questions.is_empty() {
            return None;
        }
        Some(Self {
            questions: questions.into(),
            current_index: 0,
            responses: BTreeMap::new(),
        })
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn question_count(&self) -> usize {
        self.questions.len()
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn current_question(&self) -> &Question {
        &self.questions[self.current_index]
    }

    pub fn current_key(&self) -> String {
        response_key(self.current_index + 1)
    }

    pub fn current_response(&self) -> &str {
        self.responses
            .get(&self.current_key())
            .map(String::as_str)
            .unwrap_or("")
    }

    pub fn is_first(&self) -> bool {
        self.current_index == 0
    }

    pub fn is_last(&self) -> bool {
        self.current_index + 1 == self.questions.len()
    }

    pub fn responses(&self) -> &BTreeMap<String, String> {
        &self.responses
    }

    /// Response for a 1-based ordinal, with blank values treated as absent.
    pub fn answer(&self, ordinal: usize) -> Option<&str> {
        self.responses
            .get(&response_key(ordinal))
            .map(String::as_str)
            .filter(|value| !is_blank(value))
    }

    pub fn answered_count(&self) -> usize {
        (1..=self.questions.len())
            .filter(|ordinal| self.answer(*ordinal).is_some())
            .count()
    }

    pub fn unanswered(&self, count: usize) -> Vec<usize> {
        (1..=count)
            .filter(|ordinal| self.answer(*ordinal).is_none())
            .collect()
    }

    pub fn with_response(mut self, text: impl Into<String>) -> Self {
        self.record_response(text);
        self
    }

    pub fn with_index(mut self, index: usize) -> Self {
        self.current_index = index.min(self.questions.len() - 1);
        self
    }

    pub fn go_to_previous(self) -> Self {
        let index = self.current_index.saturating_sub(1);
        self.with_index(index)
    }

    pub fn go_to_next(self) -> Self {
        let index = self.current_index.saturating_add(1);
        self.with_index(index)
    }

    pub fn record_response(&mut self, text: impl Into<String>) {
        let key = self.current_key();
        self.responses.insert(key, text.into());
    }
}
