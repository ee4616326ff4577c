//! Challenge content retrieval.
//!
//! Scanned QR codes only carry a challenge kind; the actual question,
//! prompt, or image comes from the content service queried here.

use std::sync::Arc;

use futures::future::BoxFuture;
use reqwest::{Client, StatusCode};

use crate::state::room::{ChallengeKind, ChallengePayload, ImagePayload, PromptPayload, TriviaPayload};

/// Errors raised while fetching challenge content.
#[derive(Debug, thiserror::Error)]
pub enum ContentError {
    /// Building the HTTP client failed.
    #[error("failed to build the content HTTP client: {source}")]
    ClientBuilder {
        /// Underlying reqwest error.
        #[source]
        source: reqwest::Error,
    },
    /// The content request could not be sent.
    #[error("content request for '{kind}' challenges failed: {source}")]
    RequestFailed {
        /// Challenge kind being fetched.
        kind: ChallengeKind,
        /// Underlying reqwest error.
        #[source]
        source: reqwest::Error,
    },
    /// The content service answered with a non-success status.
    #[error("content service answered {status} for '{kind}' challenges")]
    BadStatus {
        /// Challenge kind being fetched.
        kind: ChallengeKind,
        /// HTTP status returned.
        status: StatusCode,
    },
    /// The response body did not match the expected payload shape.
    #[error("failed to decode '{kind}' challenge content: {source}")]
    Decode {
        /// Challenge kind being fetched.
        kind: ChallengeKind,
        /// Underlying reqwest error.
        #[source]
        source: reqwest::Error,
    },
}

/// Source of challenge payloads, keyed by challenge kind.
pub trait ChallengeContent: Send + Sync {
    /// Fetch one payload for the given challenge kind.
    fn fetch(
        &self,
        kind: ChallengeKind,
    ) -> BoxFuture<'static, Result<ChallengePayload, ContentError>>;
}

/// [`ChallengeContent`] backed by the HTTP content service.
#[derive(Clone)]
pub struct HttpChallengeContent {
    client: Client,
    base_url: Arc<str>,
}

impl HttpChallengeContent {
    /// Build a client targeting the given content service base URL.
    pub fn new(base_url: &str) -> Result<Self, ContentError> {
        let client = Client::builder()
            .build()
            .map_err(|source| ContentError::ClientBuilder { source })?;
        Ok(Self {
            client,
            base_url: Arc::from(base_url.trim_end_matches('/')),
        })
    }
}

impl ChallengeContent for HttpChallengeContent {
    fn fetch(
        &self,
        kind: ChallengeKind,
    ) -> BoxFuture<'static, Result<ChallengePayload, ContentError>> {
        let client = self.client.clone();
        let url = format!("{}/challenge/{}", self.base_url, kind.content_segment());
        Box::pin(async move {
            let response = client
                .get(&url)
                .send()
                .await
                .map_err(|source| ContentError::RequestFailed { kind, source })?;

            let status = response.status();
            if !status.is_success() {
                return Err(ContentError::BadStatus { kind, status });
            }

            let payload = match kind {
                ChallengeKind::Trivia => {
                    let trivia: TriviaPayload = response
                        .json()
                        .await
                        .map_err(|source| ContentError::Decode { kind, source })?;
                    ChallengePayload::Trivia(trivia)
                }
                ChallengeKind::Image => {
                    let image: ImagePayload = response
                        .json()
                        .await
                        .map_err(|source| ContentError::Decode { kind, source })?;
                    ChallengePayload::Image(image)
                }
                ChallengeKind::Riddle
                | ChallengeKind::Charade
                | ChallengeKind::SocialDare
                | ChallengeKind::PlainChallenge => {
                    let prompt: PromptPayload = response
                        .json()
                        .await
                        .map_err(|source| ContentError::Decode { kind, source })?;
                    ChallengePayload::Prompt(prompt)
                }
            };

            Ok(payload)
        })
    }
}
