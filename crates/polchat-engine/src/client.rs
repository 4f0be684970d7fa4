//! Delivery of submissions to the backend.
//!
//! The [`Transport`] trait is the seam between the state machine and the
//! network. [`HttpTransport`] is the real implementation: one multipart
//! `POST` per submission.

use crate::config::Config;
use crate::session::SubmitRequest;
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use tracing::debug;

/// Form field carrying the trimmed draft.
pub const QUERY_FIELD: &str = "query";

/// Form field carrying the active category label.
pub const CATEGORY_FIELD: &str = "policy";

/// Form field used for every attached file.
pub const FILES_FIELD: &str = "files";

/// Something that can deliver a [`SubmitRequest`] and return the raw reply body.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Deliver one submission. `Ok` carries the body of a success response.
    async fn submit(&self, request: &SubmitRequest) -> Result<String, TransportError>;
}

/// Multipart HTTP transport.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    http: Client,
    base_url: String,
    submit_url: String,
}

impl HttpTransport {
    /// Build a transport for the configured endpoint.
    pub fn new(config: &Config) -> Result<Self, TransportError> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.request_timeout() {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().map_err(TransportError::Client)?;

        Ok(Self {
            http,
            base_url: config.base_url.clone(),
            submit_url: config.submit_url(),
        })
    }

    /// URL submissions are posted to.
    pub fn submit_url(&self) -> &str {
        &self.submit_url
    }

    /// `GET` the base URL and return the status code if it is a success.
    pub async fn probe(&self) -> Result<u16, TransportError> {
        let response = self.http.get(&self.base_url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status(status.as_u16()));
        }
        Ok(status.as_u16())
    }

    fn build_form(request: &SubmitRequest) -> Form {
        let form = Form::new()
            .text(CATEGORY_FIELD, request.category.clone())
            .text(QUERY_FIELD, request.text.clone());

        request.attachments.iter().fold(form, |form, attachment| {
            let part = Part::bytes(attachment.bytes.clone()).file_name(attachment.name.clone());
            form.part(FILES_FIELD, part)
        })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn submit(&self, request: &SubmitRequest) -> Result<String, TransportError> {
        debug!(url = %self.submit_url, files = request.attachments.len(), "posting submission");

        let response = self
            .http
            .post(&self.submit_url)
            .multipart(Self::build_form(request))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status(status.as_u16()));
        }

        Ok(response.text().await?)
    }
}

/// Errors from delivering a submission.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The server answered with a non-success status.
    #[error("HTTP {0}")]
    Status(u16),

    /// Connection, protocol, or body read failure.
    #[error("{0}")]
    Network(#[from] reqwest::Error),

    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}
