use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum QuestionKind {
    #[serde(rename = "text")]
    FreeText,
    #[serde(rename = "radio")]
    SingleChoice,
    #[serde(rename = "checkbox")]
    MultiChoice,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Question {
    pub text: String,
    #[serde(rename = "type")]
    pub kind: QuestionKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
}

impl Question {
    pub fn free_text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind: QuestionKind::FreeText,
            options: None,
        }
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct QuestionnaireDefinition {
    #[serde(default)]
    pub questions: Vec<Question>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    #[serde(default)]
    pub selected_domains: Vec<String>,
    #[serde(default)]
    pub quizzes_attempted: HashMap<String, bool>,
}

impl UserRecord {
    pub fn has_selected(&self, domain: &str) -> bool {
        self.selected_domains.iter().any(|selected| selected == domain)
    }

    pub fn has_attempted(&self, domain: &str) -> bool {
        self.quizzes_attempted.get(domain).copied().unwrap_or(false)
    }
}

/// Persisted outcome of one completed attempt.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct SubmissionRecord {
    pub responses: BTreeMap<String, String>,
    pub timestamp: String,
}

/// Who is taking which questionnaire.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AttemptTarget {
    pub user_id: String,
    pub domain: String,
}

impl AttemptTarget {
    pub fn new(user_id: impl Into<String>, domain: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            domain: domain.into(),
        }
    }

    pub fn user_path(&self) -> String {
        format!("users/{}", self.user_id)
    }

    pub fn questionnaire_path(&self) -> String {
        format!("questionnaires/{}", self.domain)
    }

    pub fn attempted_flag_path(&self) -> String {
        format!("users/{}/quizzesAttempted/{}", self.user_id, self.domain)
    }

    pub fn submission_path(&self) -> String {
        format!("responses/{}/{}", self.user_id, self.domain)
    }
}
