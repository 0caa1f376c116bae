use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::Value;

use crate::error::FlowError;
use crate::navigation::NavigationSession;
use crate::ports::store::{KeyValueStore, StoreError};
use crate::questionnaire::{AttemptTarget, SubmissionRecord};
use crate::util::{format_ms_rfc3339, now_ms};

#[derive(Clone)]
pub struct SubmissionCommitter {
    store: Arc<dyn KeyValueStore>,
}

impl SubmissionCommitter {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub async fn submit(
        &self,
        target: &AttemptTarget,
        session: &NavigationSession,
        question_count: usize,
    ) -> Result<SubmissionRecord, FlowError> {
        self.submit_at(target, session, question_count, now_ms())
            .await
    }

    pub async fn submit_at(
        &self,
        target: &AttemptTarget,
        session: &NavigationSession,
        question_count: usize,
        committed_at_ms: i64,
    ) -> Result<SubmissionRecord, FlowError> {
        validate_complete(session, question_count)?;

        let record = SubmissionRecord {
            responses: session.responses().clone(),
            timestamp: format_ms_rfc3339(committed_at_ms),
        };
        let updates = commit_updates(target, &record)?;

        match self.store.atomic_write(&updates).await {
            Ok(()) => {
                tracing::info!(
                    user_id = %target.user_id,
                    domain = %target.domain,
                    answered = record.responses.len(),
                    "submission committed"
                );
                Ok(record)
            }
            Err(err) => {
                tracing::error!(
                    user_id = %target.user_id,
                    domain = %target.domain,
                    error = %err,
                    "submission commit failed"
                );
                Err(FlowError::CommitFailed(err))
            }
        }
    }
}

pub fn validate_complete(
    session: &NavigationSession,
    question_count: usize,
) -> Result<(), FlowError> {
    let missing = session.unanswered(question_count);
    if missing.is_empty() {
        Ok(())
    } else {
        Err(FlowError::ValidationFailed { missing })
    }
}

/// The two locations finalized together: the attempted flag and the record.
pub fn commit_updates(
    target: &AttemptTarget,
    record: &SubmissionRecord,
) -> Result<BTreeMap<String, Value>, FlowError> {
    let record = serde_json::to_value(record)
        .map_err(|err| FlowError::CommitFailed(StoreError::Serialization(err.to_string())))?;
    let mut updates = BTreeMap::new();
    updates.insert(target.attempted_flag_path(), Value::Bool(true));
    updates.insert(target.submission_path(), record);
    Ok(updates)
}
