//! Submission of a manifest to the remote processor.
//!
//! One multipart request carries the action, the password, and one
//! `files`/`relpaths` pair per manifest item. The answer is turned into a
//! [`NavigationTarget`]:
//! - a redirect (any 3xx with a `Location`) navigates to its destination;
//! - otherwise a JSON body with a non-empty string `url` navigates there;
//! - anything else is a failure.
//!
//! Redirects are not followed automatically so the destination can be
//! reported as the server gave it. Nothing is retried and the manifest is
//! never modified, so a failed submission can simply be sent again.

mod payload;

pub use payload::*;

use reqwest::header::LOCATION;
use reqwest::{redirect, Client, StatusCode};
use serde::Deserialize;
use thiserror::Error;
use url::Url;

use crate::manifest::ManifestStore;
use crate::models::{Action, NavigationTarget};

/// Where the original processor listens.
pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:5057/process";

/// Submission errors.
#[derive(Debug, Error)]
pub enum SubmissionError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("could not read '{path}' for upload: {source}")]
    ContentUnavailable {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("unexpected response ({status}): no redirect and no navigation url")]
    UnrecognizedResponse { status: StatusCode },

    #[error("invalid endpoint URL: {0}")]
    InvalidEndpoint(#[from] url::ParseError),
}

impl SubmissionError {
    /// The single alert shown to the user for this failure.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::UnrecognizedResponse { .. } => "Upload failed or unexpected response.",
            _ => "Error while uploading/processing files.",
        }
    }
}

#[derive(Debug, Deserialize)]
struct NavigationBody {
    url: Option<String>,
}

/// HTTP client for the remote processor.
#[derive(Debug, Clone)]
pub struct ProcessorClient {
    endpoint: Url,
    client: Client,
}

impl ProcessorClient {
    pub fn new(endpoint: &str) -> Result<Self, SubmissionError> {
        let endpoint = Url::parse(endpoint)?;
        let client = Client::builder().redirect(redirect::Policy::none()).build()?;
        Ok(Self { endpoint, client })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Send the manifest as one batch and work out where to navigate next.
    pub async fn submit(
        &self,
        manifest: &ManifestStore,
        action: Action,
        password: &str,
    ) -> Result<NavigationTarget, SubmissionError> {
        let payload = SubmissionPayload::build(manifest.snapshot(), action, password);
        if payload.is_empty() {
            tracing::warn!("Submitting an empty manifest");
        }
        tracing::info!(
            endpoint = %self.endpoint,
            action = %action,
            files = payload.len(),
            "Submitting manifest"
        );

        let form = payload.into_form().await?;
        let response = self
            .client
            .post(self.endpoint.clone())
            .multipart(form)
            .send()
            .await?;

        let result = interpret_response(response).await;
        match &result {
            Ok(target) => tracing::info!(target = %target, "Submission accepted"),
            Err(e) => tracing::error!(error = %e, "Submission failed"),
        }
        result
    }
}

/// Turn the processor's answer into a navigation target.
pub async fn interpret_response(
    response: reqwest::Response,
) -> Result<NavigationTarget, SubmissionError> {
    let status = response.status();
    if status.is_redirection() {
        if let Some(location) = response
            .headers()
            .get(LOCATION)
            .and_then(|value| value.to_str().ok())
        {
            return Ok(NavigationTarget::new(location));
        }
    }

    let body = response.text().await?;
    navigation_from_body(&body).ok_or(SubmissionError::UnrecognizedResponse { status })
}

/// The `url` field of a JSON body, if it has a usable one.
fn navigation_from_body(body: &str) -> Option<NavigationTarget> {
    match serde_json::from_str::<NavigationBody>(body) {
        Ok(parsed) => parsed
            .url
            .filter(|url| !url.is_empty())
            .map(NavigationTarget::new),
        Err(e) => {
            tracing::debug!(error = %e, "Response body is not a navigation object");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_url_from_json_body() {
        assert_eq!(
            navigation_from_body(r#"{"url":"/results/7"}"#),
            Some(NavigationTarget::new("/results/7"))
        );
        assert_eq!(
            navigation_from_body(r#"{"status":"done","url":"/results/8"}"#),
            Some(NavigationTarget::new("/results/8"))
        );
    }

    #[test]
    fn rejects_bodies_without_a_usable_url() {
        assert_eq!(navigation_from_body(r#"{"status":"ok"}"#), None);
        assert_eq!(navigation_from_body(r#"{"url":""}"#), None);
        assert_eq!(navigation_from_body(r#"{"url":null}"#), None);
        assert_eq!(navigation_from_body(r#"{"url":42}"#), None);
        assert_eq!(navigation_from_body("<html>oops</html>"), None);
        assert_eq!(navigation_from_body(""), None);
    }

    #[test]
    fn user_messages_distinguish_bad_answers_from_transport_faults() {
        let bad = SubmissionError::UnrecognizedResponse {
            status: StatusCode::OK,
        };
        assert_eq!(bad.user_message(), "Upload failed or unexpected response.");

        let io = SubmissionError::ContentUnavailable {
            path: "a".to_string(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        };
        assert_eq!(io.user_message(), "Error while uploading/processing files.");
    }

    #[test]
    fn rejects_invalid_endpoint() {
        assert!(matches!(
            ProcessorClient::new("not a url"),
            Err(SubmissionError::InvalidEndpoint(_))
        ));
    }
}
