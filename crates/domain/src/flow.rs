use std::sync::{Arc, Mutex, MutexGuard};

use crate::FlowResult;
use crate::error::{FlowError, MSG_SUBMITTED};
use crate::gate::EligibilityGate;
use crate::media::{CaptureStatus, MediaCapture};
use crate::navigation::NavigationSession;
use crate::ports::camera::CameraDevice;
use crate::ports::identity::IdentityProvider;
use crate::ports::navigation::{Destination, Navigator};
use crate::ports::notify::{Notifier, Severity};
use crate::ports::store::KeyValueStore;
use crate::questionnaire::{AttemptTarget, QuestionKind, SubmissionRecord};
use crate::submission::SubmissionCommitter;

#[derive(Clone)]
pub struct FlowPorts {
    pub store: Arc<dyn KeyValueStore>,
    pub camera: Arc<dyn CameraDevice>,
    pub identity: Arc<dyn IdentityProvider>,
    pub notifier: Arc<dyn Notifier>,
    pub navigator: Arc<dyn Navigator>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FlowPhase {
    Loading,
    InProgress,
    Submitting,
    Redirected(Destination),
    Abandoned,
}

impl FlowPhase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Redirected(_) | Self::Abandoned)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QuestionView {
    pub index: usize,
    pub count: usize,
    pub text: String,
    pub kind: QuestionKind,
    pub options: Vec<String>,
    pub response: String,
    pub answered: usize,
    pub is_first: bool,
    pub is_last: bool,
}

impl QuestionView {
    fn from_session(session: &NavigationSession) -> Self {
        let question = session.current_question();
        Self {
            index: session.current_index(),
            count: session.question_count(),
            text: question.text.clone(),
            kind: question.kind.clone(),
            options: question.options.clone().unwrap_or_default(),
            response: session.current_response().to_string(),
            answered: session.answered_count(),
            is_first: session.is_first(),
            is_last: session.is_last(),
        }
    }
}

struct FlowInner {
    phase: FlowPhase,
    started: bool,
    target: Option<AttemptTarget>,
    session: Option<NavigationSession>,
}

// The lock is never held across an await.
pub struct QuestionnaireFlow {
    attempt_id: String,
    domain: Option<String>,
    identity: Arc<dyn IdentityProvider>,
    gate: EligibilityGate,
    committer: SubmissionCommitter,
    media: Arc<MediaCapture>,
    notifier: Arc<dyn Notifier>,
    navigator: Arc<dyn Navigator>,
    inner: Mutex<FlowInner>,
}

impl QuestionnaireFlow {
    pub fn new(ports: FlowPorts, domain: Option<String>) -> Self {
        let media = Arc::new(MediaCapture::new(ports.camera, ports.notifier.clone()));
        Self {
            attempt_id: crate::util::uuid_v7_without_dashes(),
            domain,
            identity: ports.identity,
            gate: EligibilityGate::new(ports.store.clone()),
            committer: SubmissionCommitter::new(ports.store),
            media,
            notifier: ports.notifier,
            navigator: ports.navigator,
            inner: Mutex::new(FlowInner {
                phase: FlowPhase::Loading,
                started: false,
                target: None,
                session: None,
            }),
        }
    }

    pub fn attempt_id(&self) -> &str {
        &self.attempt_id
    }

    pub fn phase(&self) -> FlowPhase {
        self.lock().phase
    }

    pub fn camera_status(&self) -> CaptureStatus {
        self.media.status()
    }

    pub fn media(&self) -> &Arc<MediaCapture> {
        &self.media
    }

    pub fn view(&self) -> Option<QuestionView> {
        self.lock().session.as_ref().map(QuestionView::from_session)
    }

    pub fn session(&self) -> Option<NavigationSession> {
        self.lock().session.clone()
    }

    pub async fn start(&self) -> FlowPhase {
        {
            let mut inner = self.lock();
            if inner.started {
                return inner.phase;
            }
            inner.started = true;
        }

        self.media.spawn_acquire();

        let user_id = self.identity.current_user_id();
        tracing::info!(
            attempt_id = %self.attempt_id,
            user_id = user_id.as_deref().unwrap_or_default(),
            domain = self.domain.as_deref().unwrap_or_default(),
            "questionnaire attempt started"
        );

        match self.gate.check(user_id.as_deref(), self.domain.as_deref()).await {
            Ok(pass) => {
                let mut inner = self.lock();
                if inner.phase.is_terminal() {
                    return inner.phase;
                }
                match NavigationSession::new(pass.questions) {
                    Some(session) => {
                        inner.target = Some(pass.target);
                        inner.session = Some(session);
                        inner.phase = FlowPhase::InProgress;
                        inner.phase
                    }
                    None => {
                        drop(inner);
                        let err = FlowError::NoQuestionsAvailable(pass.target.domain);
                        self.fail_gate(&err)
                    }
                }
            }
            Err(err) => self.fail_gate(&err),
        }
    }

    pub fn record_response(&self, text: impl Into<String>) -> Result<(), FlowError> {
        let text = text.into();
        self.transition(|session| session.with_response(text))
    }

    pub fn go_to_previous(&self) -> Result<(), FlowError> {
        self.transition(NavigationSession::go_to_previous)
    }

    pub fn go_to_next(&self) -> Result<(), FlowError> {
        self.transition(NavigationSession::go_to_next)
    }

    pub async fn submit(&self) -> FlowResult<SubmissionRecord> {
        let (target, session) = {
            let mut inner = self.lock();
            match inner.phase {
                FlowPhase::InProgress => {}
                FlowPhase::Submitting => {
                    tracing::warn!(attempt_id = %self.attempt_id, "duplicate submit ignored");
                    return Err(FlowError::SubmissionInProgress);
                }
                _ => return Err(FlowError::NotActive),
            }
            let (Some(target), Some(session)) = (inner.target.clone(), inner.session.clone())
            else {
                return Err(FlowError::NotActive);
            };
            inner.phase = FlowPhase::Submitting;
            (target, session)
        };

        let mut guard = SubmittingGuard {
            inner: &self.inner,
            armed: true,
        };
        let result = self
            .committer
            .submit(&target, &session, session.question_count())
            .await;

        match result {
            Ok(record) => {
                guard.armed = false;
                self.finish(Destination::Dashboard, MSG_SUBMITTED, Severity::Success);
                Ok(record)
            }
            Err(err) => {
                drop(guard);
                if self.phase() == FlowPhase::InProgress {
                    self.notifier.notify(err.user_message(), Severity::Error);
                }
                if matches!(err, FlowError::CommitFailed(_)) {
                    self.media.release();
                }
                Err(err)
            }
        }
    }

    /// A write already sent is not rolled back.
    pub fn leave(&self) {
        {
            let mut inner = self.lock();
            if inner.phase.is_terminal() {
                return;
            }
            inner.phase = FlowPhase::Abandoned;
            inner.session = None;
        }
        tracing::info!(attempt_id = %self.attempt_id, "questionnaire abandoned");
        self.media.release();
    }

    fn transition<F>(&self, apply: F) -> Result<(), FlowError>
    where
        F: FnOnce(NavigationSession) -> NavigationSession,
    {
        let mut inner = self.lock();
        match inner.phase {
            FlowPhase::InProgress => {}
            FlowPhase::Submitting => return Err(FlowError::SubmissionInProgress),
            _ => return Err(FlowError::NotActive),
        }
        let session = inner.session.take().ok_or(FlowError::NotActive)?;
        inner.session = Some(apply(session));
        Ok(())
    }

    fn fail_gate(&self, err: &FlowError) -> FlowPhase {
        let destination = err.destination().unwrap_or(Destination::Dashboard);
        self.finish(destination, err.user_message(), Severity::Error);
        self.phase()
    }

    fn finish(&self, destination: Destination, message: &str, severity: Severity) {
        {
            let mut inner = self.lock();
            if inner.phase.is_terminal() {
                return;
            }
            inner.phase = FlowPhase::Redirected(destination);
            inner.session = None;
        }
        self.notifier.notify(message, severity);
        self.navigator.navigate(destination);
        self.media.release();
        tracing::info!(
            attempt_id = %self.attempt_id,
            destination = destination.as_str(),
            "questionnaire redirected"
        );
    }

    fn lock(&self) -> MutexGuard<'_, FlowInner> {
        self.inner.lock().expect("flow state lock")
    }
}

impl Drop for QuestionnaireFlow {
    fn drop(&mut self) {
        self.media.release();
    }
}

// Also fires when the submit future is dropped mid-flight.
struct SubmittingGuard<'a> {
    inner: &'a Mutex<FlowInner>,
    armed: bool,
}

impl Drop for SubmittingGuard<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        if let Ok(mut inner) = self.inner.lock() {
            if inner.phase == FlowPhase::Submitting {
                inner.phase = FlowPhase::InProgress;
            }
        }
    }
}
