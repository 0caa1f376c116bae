use std::sync::Arc;

use serde::de::DeserializeOwned;

use crate::FlowResult;
use crate::error::FlowError;
use crate::ports::store::{KeyValueStore, StoreError};
use crate::questionnaire::{AttemptTarget, Question, QuestionnaireDefinition, UserRecord};

/// Outcome of a passed gate: who is attempting what, and the questions to ask.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GatePass {
    pub target: AttemptTarget,
    pub questions: Vec<Question>,
}

/// Ordered eligibility checks. Each step runs only after the previous one
/// passed; the first failure is returned as-is.
#[derive(Clone)]
pub struct EligibilityGate {
    store: Arc<dyn KeyValueStore>,
}

impl EligibilityGate {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub async fn check(
        &self,
        user_id: Option<&str>,
        domain: Option<&str>,
    ) -> FlowResult<GatePass> {
        let result = self.run(user_id, domain).await;
        if let Err(err) = &result {
            match err {
                FlowError::EligibilityCheckFailed(cause) => tracing::error!(
                    user_id = user_id.unwrap_or_default(),
                    domain = domain.unwrap_or_default(),
                    error = %cause,
                    "eligibility check failed"
                ),
                other => tracing::info!(
                    user_id = user_id.unwrap_or_default(),
                    domain = domain.unwrap_or_default(),
                    reason = other.as_code(),
                    "attempt not eligible"
                ),
            }
        }
        result
    }

    async fn run(
        &self,
        user_id: Option<&str>,
        domain: Option<&str>,
    ) -> FlowResult<GatePass> {
        let target = require_context(user_id, domain)?;
        let user = self.load_user(&target).await?;
        ensure_selected(&user, &target)?;
        ensure_not_attempted(&user, &target)?;
        let questions = self.load_questions(&target).await?;
        tracing::debug!(
            user_id = %target.user_id,
            domain = %target.domain,
            question_count = questions.len(),
            "eligibility gate passed"
        );
        Ok(GatePass { target, questions })
    }

    async fn load_user(&self, target: &AttemptTarget) -> Result<UserRecord, FlowError> {
        self.read_as::<UserRecord>(&target.user_path())
            .await?
            .ok_or(FlowError::ProfileNotInitialized)
    }

    async fn load_questions(&self, target: &AttemptTarget) -> Result<Vec<Question>, FlowError> {
        let definition = self
            .read_as::<QuestionnaireDefinition>(&target.questionnaire_path())
            .await?
            .unwrap_or_default();
        if definition.questions.is_empty() {
            return Err(FlowError::NoQuestionsAvailable(target.domain.clone()));
        }
        Ok(definition.questions)
    }

    async fn read_as<T>(&self, path: &str) -> Result<Option<T>, FlowError>
    where
        T: DeserializeOwned,
    {
        let value = self
            .store
            .read(path)
            .await
            .map_err(FlowError::EligibilityCheckFailed)?;
        value
            .map(|value| {
                serde_json::from_value(value).map_err(|err| {
                    FlowError::EligibilityCheckFailed(StoreError::Serialization(format!(
                        "{path}: {err}"
                    )))
                })
            })
            .transpose()
    }
}

fn require_context(
    user_id: Option<&str>,
    domain: Option<&str>,
) -> Result<AttemptTarget, FlowError> {
    let user_id = user_id.map(str::trim).filter(|value| !value.is_empty());
    let domain = domain.map(str::trim).filter(|value| !value.is_empty());
    match (user_id, domain) {
        (Some(user_id), Some(domain)) => Ok(AttemptTarget::new(user_id, domain)),
        _ => Err(FlowError::MissingContext),
    }
}

fn ensure_selected(user: &UserRecord, target: &AttemptTarget) -> Result<(), FlowError> {
    if user.has_selected(&target.domain) {
        Ok(())
    } else {
        Err(FlowError::DomainNotSelected(target.domain.clone()))
    }
}

fn ensure_not_attempted(user: &UserRecord, target: &AttemptTarget) -> Result<(), FlowError> {
    if user.has_attempted(&target.domain) {
        Err(FlowError::AlreadyAttempted(target.domain.clone()))
    } else {
        Ok(())
    }
}
