mod support;

use std::sync::Arc;

use assessment_domain::error::FlowError;
use assessment_domain::navigation::NavigationSession;
use assessment_domain::questionnaire::{AttemptTarget, Question};
use assessment_domain::submission::SubmissionCommitter;
use serde_json::json;
use support::{RecordingStore, seeded_root};

fn math_session(answers: &[&str]) -> NavigationSession {
    let questions = vec![
        Question::free_text("2 + 2?"),
        Question::free_text("3 + 4?"),
        Question::free_text("4 + 5?"),
    ];
    let mut session = NavigationSession::new(questions).unwrap();
    for answer in answers {
        session = session.with_response(*answer).go_to_next();
    }
    session
}

#[tokio::test]
async fn blank_answers_fail_without_writing() {
    let store = Arc::new(RecordingStore::with_root(seeded_root(&["math"], &[])));
    let committer = SubmissionCommitter::new(store.clone());
    let target = AttemptTarget::new("u1", "math");

    let cases: [&[&str]; 4] = [&["4", "7", ""], &["4", "  ", "9"], &["\t", "7", "9"], &["4"]];
    for answers in cases {
        let err = committer
            .submit(&target, &math_session(answers), 3)
            .await
            .unwrap_err();
        assert!(matches!(err, FlowError::ValidationFailed { .. }));
    }
    assert!(store.writes().is_empty());
}

#[tokio::test]
async fn complete_answers_commit_flag_and_record_together() {
    let store = Arc::new(RecordingStore::with_root(seeded_root(&["math"], &[])));
    let committer = SubmissionCommitter::new(store.clone());
    let target = AttemptTarget::new("u1", "math");

    let record = committer
        .submit_at(&target, &math_session(&["4", "7", "9"]), 3, 1_739_750_400_000)
        .await
        .unwrap();
    assert_eq!(record.timestamp, "2025-02-17T00:00:00Z");

    let writes = store.writes();
    assert_eq!(writes.len(), 1);
    let paths = writes[0].keys().cloned().collect::<Vec<_>>();
    assert_eq!(
        paths,
        vec!["responses/u1/math", "users/u1/quizzesAttempted/math"]
    );

    let root = store.snapshot();
    assert_eq!(root["users"]["u1"]["quizzesAttempted"]["math"], json!(true));
    assert_eq!(root["users"]["u1"]["selectedDomains"], json!(["math"]));
    assert_eq!(
        root["responses"]["u1"]["math"],
        json!({
            "responses": { "q1": "4", "q2": "7", "q3": "9" },
            "timestamp": "2025-02-17T00:00:00Z",
        })
    );
}

#[tokio::test]
async fn failed_write_leaves_attempted_flag_untouched() {
    let store = Arc::new(RecordingStore::with_root(seeded_root(&["math"], &[])));
    store.fail_writes(true);
    let committer = SubmissionCommitter::new(store.clone());
    let target = AttemptTarget::new("u1", "math");

    let err = committer
        .submit(&target, &math_session(&["4", "7", "9"]), 3)
        .await
        .unwrap_err();
    assert!(matches!(err, FlowError::CommitFailed(_)));
    assert_eq!(err.user_message(), "Failed to submit questionnaire");
    assert_eq!(store.writes().len(), 1);

    let root = store.snapshot();
    assert!(root["users"]["u1"]["quizzesAttempted"].get("math").is_none());
    assert!(root.get("responses").is_none());
}

#[tokio::test]
async fn rejected_path_commits_neither_location() {
    let store = Arc::new(RecordingStore::with_root(seeded_root(&["math"], &[])));
    let committer = SubmissionCommitter::new(store.clone());
    let target = AttemptTarget::new("u1", "ma#th");

    let err = committer
        .submit(&target, &math_session(&["4", "7", "9"]), 3)
        .await
        .unwrap_err();
    assert!(matches!(err, FlowError::CommitFailed(_)));
    assert_eq!(store.snapshot(), seeded_root(&["math"], &[]));
}
