//! Conversation controller: the only writer of session state

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use socratic_ai::{DEFAULT_MODEL, DEFAULT_TEMPERATURE, FALLBACK_RESPONSE, GenerateRequest, TextGenerator};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::broadcast;

use crate::{
    error::SubmitError,
    events::TutorEvent,
    export,
    message::Message,
    normalize::normalize,
    prompt::{self, Inquiry},
    store::MessageStore,
};

/// Shown to the user whenever a request fails, whatever the cause
pub const FAILURE_MESSAGE: &str =
    "Unable to connect to the tutor. Please verify your connection or API key and try again.";

/// What the controller is currently doing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadingState {
    /// Accepting submissions
    #[default]
    Idle,
    /// A request is in flight; submissions are rejected
    Thinking,
    /// Reserved for incremental delivery; never entered
    Streaming,
    /// Reserved; failures are reported as `Idle` plus an error message
    Error,
}

impl LoadingState {
    pub fn is_idle(&self) -> bool {
        *self == LoadingState::Idle
    }
}

/// Tutor configuration
#[derive(Debug, Clone)]
pub struct TutorConfig {
    /// Model identifier sent with every request
    pub model: String,
    /// Sampling temperature sent with every request
    pub temperature: f32,
}

impl Default for TutorConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
        }
    }
}

/// Point-in-time copy of the session state
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub messages: Vec<Message>,
    pub loading: LoadingState,
    pub error: Option<String>,
}

/// How a settled turn ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnOutcome {
    /// The model turn that was appended
    Answered(Message),
    /// Nothing was appended; the error message is set
    Failed,
}

#[derive(Default)]
struct Session {
    store: MessageStore,
    loading: LoadingState,
    error: Option<String>,
}

/// Drives one tutoring session.
///
/// Cloning is cheap and every clone shares the same session.
#[derive(Clone)]
pub struct Controller {
    config: Arc<TutorConfig>,
    session: Arc<Mutex<Session>>,
    generator: Arc<dyn TextGenerator>,
    event_tx: broadcast::Sender<TutorEvent>,
}

impl Controller {
    /// Create a controller with an empty session
    pub fn new(config: TutorConfig, generator: Arc<dyn TextGenerator>) -> Self {
        let (event_tx, _) = broadcast::channel(64);
        Self {
            config: Arc::new(config),
            session: Arc::new(Mutex::new(Session::default())),
            generator,
            event_tx,
        }
    }

    /// Subscribe to controller events
    pub fn subscribe(&self) -> broadcast::Receiver<TutorEvent> {
        self.event_tx.subscribe()
    }

    pub fn config(&self) -> &TutorConfig {
        &self.config
    }

    /// Copy of messages, loading state and error, taken under one lock
    pub fn snapshot(&self) -> Snapshot {
        let session = self.session.lock();
        Snapshot {
            messages: session.store.all().to_vec(),
            loading: session.loading,
            error: session.error.clone(),
        }
    }

    pub fn messages(&self) -> Vec<Message> {
        self.session.lock().store.all().to_vec()
    }

    pub fn message_count(&self) -> usize {
        self.session.lock().store.len()
    }

    pub fn loading_state(&self) -> LoadingState {
        self.session.lock().loading
    }

    /// The user-facing error from the last failed turn, until the next submission
    pub fn error(&self) -> Option<String> {
        self.session.lock().error.clone()
    }

    /// Accept a submission and put the controller in `thinking`.
    ///
    /// On success the user turn is already in the store. The returned
    /// [`PendingTurn`] must be settled to get the reply; dropping it instead
    /// returns the controller to `idle` with nothing appended.
    pub fn begin(&self, topic: &str, perspective: &str) -> Result<PendingTurn, SubmitError> {
        let inquiry = Inquiry::parse(topic, perspective)?;

        let prepared = {
            let mut session = self.session.lock();
            if !session.loading.is_idle() {
                return Err(SubmitError::Busy);
            }
            let prepared = prompt::prepare_turn(
                inquiry,
                session.store.history(),
                session.store.next_timestamp(),
                &self.config.model,
                self.config.temperature,
            );
            session.store.append(prepared.message.clone());
            session.loading = LoadingState::Thinking;
            session.error = None;
            prepared
        };

        tracing::debug!(
            message_id = prepared.message.id(),
            context_turns = prepared.request.turn_count(),
            "submission accepted"
        );
        let _ = self.event_tx.send(TutorEvent::Submitted {
            message: prepared.message,
        });

        Ok(PendingTurn {
            controller: self.clone(),
            request: prepared.request,
            settled: false,
        })
    }

    /// Submit and wait for the reply
    pub async fn submit(&self, topic: &str, perspective: &str) -> Result<TurnOutcome, SubmitError> {
        Ok(self.begin(topic, perspective)?.settle().await)
    }

    /// Write the whole store to `dir/socratic_logs.json`
    pub fn export_logs(&self, dir: &Path) -> crate::Result<PathBuf> {
        export::write_logs(dir, &self.messages())
    }

    fn complete(&self, result: socratic_ai::Result<String>) -> TurnOutcome {
        match result {
            Ok(text) => {
                let text = if text.is_empty() {
                    FALLBACK_RESPONSE.to_string()
                } else {
                    normalize(&text)
                };
                let message = {
                    let mut session = self.session.lock();
                    let message = Message::model(text, session.store.next_timestamp());
                    session.store.append(message.clone());
                    session.loading = LoadingState::Idle;
                    message
                };
                tracing::debug!(
                    message_id = message.id(),
                    chars = message.content().len(),
                    "reply stored"
                );
                let _ = self.event_tx.send(TutorEvent::Answered {
                    message: message.clone(),
                });
                TurnOutcome::Answered(message)
            }
            Err(e) => {
                tracing::error!(
                    error = %e,
                    kind = ?e.kind(),
                    auth = e.is_auth_failure(),
                    "tutor request failed"
                );
                {
                    let mut session = self.session.lock();
                    session.error = Some(FAILURE_MESSAGE.to_string());
                    session.loading = LoadingState::Idle;
                }
                let _ = self.event_tx.send(TutorEvent::Failed {
                    message: FAILURE_MESSAGE.to_string(),
                });
                TurnOutcome::Failed
            }
        }
    }

    fn abandon(&self) {
        tracing::debug!("pending turn dropped before settling");
        self.session.lock().loading = LoadingState::Idle;
    }
}

/// An accepted submission whose reply has not arrived yet.
#[must_use = "the controller stays in `thinking` until the turn is settled or dropped"]
pub struct PendingTurn {
    controller: Controller,
    request: GenerateRequest,
    settled: bool,
}

impl PendingTurn {
    /// The request that will be sent
    pub fn request(&self) -> &GenerateRequest {
        &self.request
    }

    /// Make the single generator call and apply its result.
    ///
    /// The controller is back in `idle` when this returns, whatever the outcome.
    pub async fn settle(mut self) -> TurnOutcome {
        let result = self.controller.generator.generate(&self.request).await;
        self.settled = true;
        self.controller.complete(result)
    }
}

impl Drop for PendingTurn {
    fn drop(&mut self) {
        if !self.settled {
            self.controller.abandon();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::StructuredInput;
    use async_trait::async_trait;
    use socratic_ai::{GeminiClient, Role};
    use tokio::sync::Notify;

    /// Scripted replies for the mock generator
    enum Reply {
        Text(&'static str),
        Transport,
    }

    /// A generator that answers from a script and records every request.
    struct MockGenerator {
        replies: Mutex<Vec<Reply>>,
        requests: Mutex<Vec<GenerateRequest>>,
    }

    impl MockGenerator {
        fn new(replies: Vec<Reply>) -> Arc<Self> {
            Arc::new(Self {
                replies: Mutex::new(replies),
                requests: Mutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> usize {
            self.requests.lock().len()
        }

        fn request(&self, index: usize) -> GenerateRequest {
            self.requests.lock()[index].clone()
        }
    }

    #[async_trait]
    impl TextGenerator for MockGenerator {
        async fn generate(&self, request: &GenerateRequest) -> socratic_ai::Result<String> {
            self.requests.lock().push(request.clone());
            let reply = {
                let mut replies = self.replies.lock();
                if replies.is_empty() {
                    Reply::Text("### Evaluation\n\nFine.")
                } else {
                    replies.remove(0)
                }
            };
            match reply {
                Reply::Text(text) => Ok(text.to_string()),
                Reply::Transport => Err(socratic_ai::Error::api(503, "service unavailable")),
            }
        }
    }

    /// A generator that blocks until released, so a turn can be held in flight.
    struct GatedGenerator {
        started: Notify,
        release: Notify,
    }

    #[async_trait]
    impl TextGenerator for GatedGenerator {
        async fn generate(&self, _request: &GenerateRequest) -> socratic_ai::Result<String> {
            self.started.notify_one();
            self.release.notified().await;
            Ok("### Evaluation\n\nReleased.".to_string())
        }
    }

    fn controller_with(generator: Arc<dyn TextGenerator>) -> Controller {
        Controller::new(
            TutorConfig {
                model: "gemini-test".into(),
                temperature: 0.7,
            },
            generator,
        )
    }

    #[tokio::test]
    async fn test_round_trip_appends_user_then_model() {
        let mock = MockGenerator::new(vec![Reply::Text("### Evaluation\nClose.")]);
        let controller = controller_with(mock.clone());

        let outcome = controller.submit("Entropy", "disorder").await.unwrap();

        let messages = controller.messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role(), Role::User);
        assert_eq!(messages[1].role(), Role::Model);
        assert_eq!(outcome, TurnOutcome::Answered(messages[1].clone()));
        assert!(messages[0].timestamp() <= messages[1].timestamp());
        assert_eq!(controller.loading_state(), LoadingState::Idle);
        assert!(controller.error().is_none());
        assert_eq!(mock.calls(), 1);
    }

    #[tokio::test]
    async fn test_request_carries_prior_turns_only() {
        let mock = MockGenerator::new(vec![Reply::Text("first"), Reply::Text("second")]);
        let controller = controller_with(mock.clone());

        controller.submit("A", "B").await.unwrap();
        assert!(mock.request(0).history.is_empty());

        controller.submit("C", "D").await.unwrap();
        let request = mock.request(1);
        assert_eq!(request.history.len(), 2);
        assert_eq!(request.history[0].role, Role::User);
        assert_eq!(request.history[0].text, "Topic: A\nPerspective: B");
        assert_eq!(request.history[1].role, Role::Model);
        assert_eq!(request.history[1].text, "first");
        assert!(request.prompt.contains("TOPIC/QUESTION: C"));
        assert_eq!(request.model, "gemini-test");
        assert_eq!(request.temperature, 0.7);
    }

    #[tokio::test]
    async fn test_blank_submission_changes_nothing() {
        let mock = MockGenerator::new(vec![]);
        let controller = controller_with(mock.clone());

        assert_eq!(
            controller.submit("", "perspective").await,
            Err(SubmitError::EmptyTopic)
        );
        assert_eq!(
            controller.submit("topic", " \t\n ").await,
            Err(SubmitError::EmptyPerspective)
        );

        assert_eq!(controller.message_count(), 0);
        assert_eq!(mock.calls(), 0);
        assert_eq!(controller.loading_state(), LoadingState::Idle);
    }

    #[tokio::test]
    async fn test_begin_while_thinking_is_rejected() {
        let mock = MockGenerator::new(vec![]);
        let controller = controller_with(mock.clone());

        let pending = controller.begin("A", "B").unwrap();
        assert_eq!(controller.loading_state(), LoadingState::Thinking);
        assert_eq!(controller.message_count(), 1);

        assert!(matches!(controller.begin("C", "D"), Err(SubmitError::Busy)));
        assert_eq!(controller.message_count(), 1);
        assert_eq!(mock.calls(), 0);

        pending.settle().await;
        assert_eq!(controller.loading_state(), LoadingState::Idle);
        assert!(controller.begin("C", "D").is_ok());
    }

    #[tokio::test]
    async fn test_submit_while_request_in_flight() {
        let gate = Arc::new(GatedGenerator {
            started: Notify::new(),
            release: Notify::new(),
        });
        let controller = controller_with(gate.clone());

        let in_flight = {
            let controller = controller.clone();
            tokio::spawn(async move { controller.submit("A", "B").await })
        };
        gate.started.notified().await;

        assert_eq!(controller.submit("C", "D").await, Err(SubmitError::Busy));
        assert_eq!(controller.message_count(), 1);

        gate.release.notify_one();
        let outcome = in_flight.await.unwrap().unwrap();
        assert!(matches!(outcome, TurnOutcome::Answered(_)));
        assert_eq!(controller.message_count(), 2);
        assert_eq!(controller.loading_state(), LoadingState::Idle);
    }

    #[tokio::test]
    async fn test_missing_credential_failure_cleanup() {
        let client = GeminiClient::new(None).with_base_url("http://127.0.0.1:9");
        let controller = controller_with(Arc::new(client));

        let outcome = controller.submit("A", "B").await.unwrap();

        assert_eq!(outcome, TurnOutcome::Failed);
        let snapshot = controller.snapshot();
        assert_eq!(snapshot.messages.len(), 1);
        assert_eq!(snapshot.messages[0].role(), Role::User);
        assert_eq!(snapshot.error.as_deref(), Some(FAILURE_MESSAGE));
        assert_eq!(snapshot.loading, LoadingState::Idle);
    }

    #[tokio::test]
    async fn test_transport_failure_cleanup() {
        let mock = MockGenerator::new(vec![Reply::Transport]);
        let controller = controller_with(mock.clone());

        let outcome = controller.submit("A", "B").await.unwrap();

        assert_eq!(outcome, TurnOutcome::Failed);
        assert_eq!(controller.message_count(), 1);
        assert_eq!(controller.error().as_deref(), Some(FAILURE_MESSAGE));
        assert_eq!(controller.loading_state(), LoadingState::Idle);
    }

    #[tokio::test]
    async fn test_next_submission_clears_error() {
        let mock = MockGenerator::new(vec![Reply::Transport, Reply::Text("ok")]);
        let controller = controller_with(mock);

        controller.submit("A", "B").await.unwrap();
        assert!(controller.error().is_some());

        let pending = controller.begin("A", "B").unwrap();
        assert!(controller.error().is_none());
        pending.settle().await;

        let roles: Vec<Role> = controller.messages().iter().map(Message::role).collect();
        assert_eq!(roles, [Role::User, Role::User, Role::Model]);
    }

    #[tokio::test]
    async fn test_empty_reply_stored_as_fallback() {
        let mock = MockGenerator::new(vec![Reply::Text("")]);
        let controller = controller_with(mock);

        controller.submit("A", "B").await.unwrap();

        let messages = controller.messages();
        assert_eq!(messages[1].content(), FALLBACK_RESPONSE);
        assert!(controller.error().is_none());
    }

    #[tokio::test]
    async fn test_whitespace_reply_stored_verbatim() {
        let mock = MockGenerator::new(vec![Reply::Text("  \n ")]);
        let controller = controller_with(mock);

        controller.submit("A", "B").await.unwrap();

        assert_eq!(controller.messages()[1].content(), "  \n ");
    }

    #[tokio::test]
    async fn test_reply_is_normalized_before_storage() {
        let mock = MockGenerator::new(vec![Reply::Text("Evaluation text### Elaboration")]);
        let controller = controller_with(mock);

        controller.submit("A", "B").await.unwrap();

        assert_eq!(
            controller.messages()[1].content(),
            "Evaluation text\n\n### Elaboration"
        );
    }

    #[tokio::test]
    async fn test_structured_input_fidelity() {
        let controller = controller_with(MockGenerator::new(vec![]));

        controller
            .submit("Why is the sky blue?", "It's reflecting the ocean.")
            .await
            .unwrap();

        let messages = controller.messages();
        assert_eq!(
            messages[0].structured_input(),
            Some(&StructuredInput {
                topic: "Why is the sky blue?".into(),
                perspective: "It's reflecting the ocean.".into(),
            })
        );
        assert!(messages[1].structured_input().is_none());
    }

    #[tokio::test]
    async fn test_dropped_pending_turn_returns_to_idle() {
        let mock = MockGenerator::new(vec![]);
        let controller = controller_with(mock.clone());

        let pending = controller.begin("A", "B").unwrap();
        drop(pending);

        assert_eq!(controller.loading_state(), LoadingState::Idle);
        assert_eq!(controller.message_count(), 1);
        assert!(controller.error().is_none());
        assert_eq!(mock.calls(), 0);
    }

    #[tokio::test]
    async fn test_events_follow_state_changes() {
        let mock = MockGenerator::new(vec![Reply::Text("reply"), Reply::Transport]);
        let controller = controller_with(mock);
        let mut rx = controller.subscribe();

        controller.submit("A", "B").await.unwrap();
        controller.submit("C", "D").await.unwrap();

        let submitted = rx.recv().await.unwrap();
        assert!(matches!(submitted, TutorEvent::Submitted { .. }));
        assert!(!submitted.is_terminal());
        match rx.recv().await.unwrap() {
            TutorEvent::Answered { message } => assert_eq!(message.content(), "reply"),
            other => panic!("unexpected event: {other:?}"),
        }
        assert!(matches!(rx.recv().await.unwrap(), TutorEvent::Submitted { .. }));
        let failed = rx.recv().await.unwrap();
        assert!(failed.is_terminal());
        match failed {
            TutorEvent::Failed { message } => assert_eq!(message, FAILURE_MESSAGE),
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn test_loading_state_wire_names() {
        let names: Vec<String> = [
            LoadingState::Idle,
            LoadingState::Thinking,
            LoadingState::Streaming,
            LoadingState::Error,
        ]
        .iter()
        .map(|s| serde_json::to_string(s).unwrap())
        .collect();
        assert_eq!(names, ["\"idle\"", "\"thinking\"", "\"streaming\"", "\"error\""]);
    }
}
