//! Session state and the conversation state machine.
//!
//! All UI state lives in one [`SessionState`] value. It only changes through
//! [`SessionState::apply`], which takes a [`SessionEvent`] and returns an
//! [`Effect`] telling the caller what (if anything) to do next. No I/O
//! happens here: a `Submit` yields [`Effect::Send`] and the caller is
//! responsible for delivering the request and feeding the outcome back as
//! `ResponseReceived` or `RequestFailed`.
//!
//! ```text
//!            Submit (non-empty)
//!   Idle ───────────────────────▶ Sending
//!    ▲                               │
//!    │   ResponseReceived / Failed   │
//!    └───────────────────────────────┘
//! ```

use crate::attachment::Attachment;
use crate::category::{Categories, CategoryError, TabSelector};
use crate::message::{Message, APOLOGY_REPLY, DEFAULT_GREETING, FALLBACK_REPLY};
use crate::reply::parse_reply;
use tracing::{debug, info, warn};

/// Request lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RequestStatus {
    /// Ready for input.
    #[default]
    Idle,
    /// A submission is in flight; input is locked.
    Sending,
}

/// Observable phase of the controller.
///
/// `Error` is `Idle` with a failure banner still showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Sending,
    Error,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Sending => write!(f, "sending"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// Everything needed to deliver one submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitRequest {
    /// Trimmed draft text.
    pub text: String,
    /// Label of the category active at submit time.
    pub category: String,
    /// Every attachment pending at submit time.
    pub attachments: Vec<Attachment>,
}

/// Inputs to the state machine.
#[derive(Debug, Clone)]
pub enum SessionEvent {
    /// Replace the draft text.
    EditDraft(String),
    /// Activate a category tab.
    SelectCategory(usize),
    /// Append files to the pending attachments.
    AttachFiles(Vec<Attachment>),
    /// Drop a pending attachment by position.
    RemoveAttachment(usize),
    /// Submit the current draft.
    Submit,
    /// The backend answered with a success status.
    ResponseReceived { body: String },
    /// The request failed (network error or non-success status).
    RequestFailed { reason: String },
}

/// What the caller should do after applying an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// State was updated; nothing else to do.
    Nothing,
    /// Deliver this request, then report back.
    Send(SubmitRequest),
    /// The event was ignored; state is unchanged.
    Rejected(SessionError),
    /// A submission finished. Carries the soft or hard failure, if any.
    Completed(Option<SessionError>),
}

/// The single session-state value.
#[derive(Debug, Clone)]
pub struct SessionState {
    tabs: TabSelector,
    messages: Vec<Message>,
    draft: String,
    attachments: Vec<Attachment>,
    status: RequestStatus,
    last_error: Option<String>,
}

impl SessionState {
    /// Start a session seeded with one assistant greeting.
    pub fn new(categories: Categories, greeting: impl Into<String>) -> Self {
        Self {
            tabs: TabSelector::new(categories),
            messages: vec![Message::assistant(greeting)],
            draft: String::new(),
            attachments: Vec::new(),
            status: RequestStatus::Idle,
            last_error: None,
        }
    }

    /// Category tabs and the active selection.
    pub fn tabs(&self) -> &TabSelector {
        &self.tabs
    }

    /// Conversation so far, oldest first.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Current draft text.
    pub fn draft(&self) -> &str {
        &self.draft
    }

    /// Pending attachments.
    pub fn attachments(&self) -> &[Attachment] {
        &self.attachments
    }

    /// Badge labels for the attachment preview, one per pending file.
    pub fn attachment_badges(&self) -> Vec<&str> {
        self.attachments.iter().map(|a| a.name.as_str()).collect()
    }

    /// Request lifecycle status.
    pub fn status(&self) -> RequestStatus {
        self.status
    }

    /// Whether a submission is in flight.
    pub fn is_sending(&self) -> bool {
        self.status == RequestStatus::Sending
    }

    /// Failure reason shown in the error banner.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Derived controller phase.
    pub fn phase(&self) -> Phase {
        match (self.status, &self.last_error) {
            (RequestStatus::Sending, _) => Phase::Sending,
            (RequestStatus::Idle, Some(_)) => Phase::Error,
            (RequestStatus::Idle, None) => Phase::Idle,
        }
    }

    /// Apply one event.
    pub fn apply(&mut self, event: SessionEvent) -> Effect {
        let effect = match event {
            SessionEvent::EditDraft(text) => self.edit_draft(text),
            SessionEvent::SelectCategory(index) => self.select_category(index),
            SessionEvent::AttachFiles(files) => self.attach(files),
            SessionEvent::RemoveAttachment(index) => self.remove_attachment(index),
            SessionEvent::Submit => self.submit(),
            SessionEvent::ResponseReceived { body } => self.receive(&body),
            SessionEvent::RequestFailed { reason } => self.fail(reason),
        };
        if let Effect::Rejected(reason) = &effect {
            debug!(%reason, "event rejected");
        }
        effect
    }

    fn edit_draft(&mut self, text: String) -> Effect {
        if self.is_sending() {
            return Effect::Rejected(SessionError::InFlight);
        }
        self.draft = text;
        Effect::Nothing
    }

    fn select_category(&mut self, index: usize) -> Effect {
        match self
            .tabs
            .select_with(index, |i| debug!(index = i, "category selected"))
        {
            Ok(()) => Effect::Nothing,
            Err(e) => Effect::Rejected(e.into()),
        }
    }

    fn attach(&mut self, files: Vec<Attachment>) -> Effect {
        if self.is_sending() {
            return Effect::Rejected(SessionError::AttachmentsLocked);
        }
        if files.is_empty() {
            return Effect::Nothing;
        }
        debug!(count = files.len(), "files attached");
        self.last_error = None;
        self.attachments.extend(files);
        Effect::Nothing
    }

    fn remove_attachment(&mut self, index: usize) -> Effect {
        if self.is_sending() {
            return Effect::Rejected(SessionError::AttachmentsLocked);
        }
        if index >= self.attachments.len() {
            return Effect::Rejected(SessionError::NoSuchAttachment(index));
        }
        let removed = self.attachments.remove(index);
        debug!(name = %removed.name, "attachment removed");
        Effect::Nothing
    }

    fn submit(&mut self) -> Effect {
        if self.is_sending() {
            return Effect::Rejected(SessionError::InFlight);
        }
        let text = self.draft.trim();
        if text.is_empty() {
            return Effect::Rejected(SessionError::EmptyDraft);
        }

        let request = SubmitRequest {
            text: text.to_string(),
            category: self.tabs.active_label().to_string(),
            attachments: self.attachments.clone(),
        };

        self.messages
            .push(Message::user(request.text.clone(), request.category.clone()));
        self.draft.clear();
        self.last_error = None;
        self.status = RequestStatus::Sending;

        info!(
            category = %request.category,
            attachments = request.attachments.len(),
            "submitting"
        );
        Effect::Send(request)
    }

    fn receive(&mut self, body: &str) -> Effect {
        if !self.is_sending() {
            warn!("response arrived with no submission in flight");
            return Effect::Rejected(SessionError::NotSending);
        }

        let outcome = match parse_reply(body) {
            Ok(reply) => {
                info!(chars = reply.len(), "reply received");
                self.messages.push(Message::assistant(reply));
                None
            }
            Err(e) => {
                warn!(error = %e, "reply could not be interpreted");
                self.messages.push(Message::assistant(FALLBACK_REPLY));
                Some(SessionError::UnparsableResponse(e.to_string()))
            }
        };

        self.finish();
        Effect::Completed(outcome)
    }

    fn fail(&mut self, reason: String) -> Effect {
        if !self.is_sending() {
            warn!("failure arrived with no submission in flight");
            return Effect::Rejected(SessionError::NotSending);
        }

        warn!(%reason, "submission failed");
        self.messages.push(Message::assistant(APOLOGY_REPLY));
        self.last_error = Some(reason.clone());
        self.finish();
        Effect::Completed(Some(SessionError::RequestFailed(reason)))
    }

    fn finish(&mut self) {
        self.attachments.clear();
        self.status = RequestStatus::Idle;
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new(Categories::default(), DEFAULT_GREETING)
    }
}

/// Pure form of [`SessionState::apply`]: `(state, event) -> (state, effect)`.
pub fn reduce(mut state: SessionState, event: SessionEvent) -> (SessionState, Effect) {
    let effect = state.apply(event);
    (state, effect)
}

/// Why an event was rejected, or how a submission went wrong.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    /// The draft was empty or whitespace. Never shown to the user.
    #[error("draft is empty")]
    EmptyDraft,

    /// A submission is already in flight.
    #[error("a submission is already in flight")]
    InFlight,

    /// Attachments are locked while sending.
    #[error("attachments cannot change while sending")]
    AttachmentsLocked,

    /// No pending attachment at this position.
    #[error("no attachment at position {0}")]
    NoSuchAttachment(usize),

    /// Invalid category selection.
    #[error(transparent)]
    Category(#[from] CategoryError),

    /// A completion arrived with nothing in flight.
    #[error("no submission in flight")]
    NotSending,

    /// Network error or non-success status.
    #[error("request failed: {0}")]
    RequestFailed(String),

    /// The reply had nothing usable in it.
    #[error("unparsable response: {0}")]
    UnparsableResponse(String),
}
