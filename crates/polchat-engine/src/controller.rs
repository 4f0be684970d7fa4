//! Async driver that pairs a session with a transport.

use crate::client::Transport;
use crate::session::{Effect, SessionEvent, SessionState, SubmitRequest};
use tracing::info;

/// Deliver `request` and turn the outcome into the completion event.
pub async fn complete<T>(transport: &T, request: &SubmitRequest) -> SessionEvent
where
    T: Transport + ?Sized,
{
    match transport.submit(request).await {
        Ok(body) => SessionEvent::ResponseReceived { body },
        Err(e) => SessionEvent::RequestFailed {
            reason: e.to_string(),
        },
    }
}

/// A session bound to a transport, for callers without an event loop.
pub struct Controller<T> {
    session: SessionState,
    transport: T,
}

impl<T: Transport> Controller<T> {
    /// Create a controller.
    pub fn new(session: SessionState, transport: T) -> Self {
        Self { session, transport }
    }

    /// Current session state.
    pub fn session(&self) -> &SessionState {
        &self.session
    }

    /// Consume the controller and return the session.
    pub fn into_session(self) -> SessionState {
        self.session
    }

    /// Apply a non-network event (tab change, attachments, draft).
    pub fn apply(&mut self, event: SessionEvent) -> Effect {
        self.session.apply(event)
    }

    /// Set the draft and run one full submission.
    ///
    /// Returns the completion effect, or the rejection if the draft was
    /// empty.
    pub async fn submit(&mut self, draft: impl Into<String>) -> Effect {
        self.session.apply(SessionEvent::EditDraft(draft.into()));
        match self.session.apply(SessionEvent::Submit) {
            Effect::Send(request) => {
                let event = complete(&self.transport, &request).await;
                let effect = self.session.apply(event);
                info!(phase = %self.session.phase(), "submission settled");
                effect
            }
            other => other,
        }
    }
}
