//! services/reader/src/adapters/github.rs
//!
//! This module contains the adapter for the GitHub repository contents API.
//! It implements the `RemoteDocumentStore` port from the `core` crate, using the
//! blob `sha` of the file as the sync token.

use async_trait::async_trait;
use chrono::Utc;
use manhua_core::domain::{ApplicationDocument, StoreTarget, SyncToken};
use manhua_core::ports::{RemoteDocumentStore, SyncError, SyncResult};
use reqwest::{header, Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::adapters::wire::{decode_document, encode_document};

const ACCEPT_V3: &str = "application/vnd.github.v3+json";

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that stores the whole document as a single file in a repository.
#[derive(Clone)]
pub struct GitHubContentsAdapter {
    client: Client,
    api_base: String,
}

impl GitHubContentsAdapter {
    /// Creates a new `GitHubContentsAdapter`. `api_base` is usually `https://api.github.com`.
    pub fn new(client: Client, api_base: impl Into<String>) -> Self {
        Self {
            client,
            api_base: api_base.into(),
        }
    }

    fn contents_url(&self, target: &StoreTarget) -> String {
        format!(
            "{}/repos/{}/{}/contents/{}",
            self.api_base.trim_end_matches('/'),
            target.owner,
            target.repository,
            target.path.trim_start_matches('/')
        )
    }
}

//=========================================================================================
// API Request/Response Types
//=========================================================================================

#[derive(Deserialize)]
struct ContentsResponse {
    sha: String,
    #[serde(default)]
    content: String,
    #[serde(default)]
    encoding: Option<String>,
}

#[derive(Serialize)]
struct PutContentsRequest<'a> {
    message: String,
    content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    sha: Option<&'a str>,
}

#[derive(Deserialize)]
struct PutContentsResponse {
    content: PutContentsEntry,
}

#[derive(Deserialize)]
struct PutContentsEntry {
    sha: String,
}

#[derive(Deserialize)]
struct ApiErrorBody {
    message: Option<String>,
}

//=========================================================================================
// Status Mapping
//=========================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Operation {
    Read,
    Write,
}

/// Maps a non-success response onto the port's error taxonomy.
///
/// GitHub answers a write whose `sha` is stale with 409, and a write that omits
/// the `sha` of an existing file with 422. Both mean the remote moved on.
pub(crate) fn map_status(status: StatusCode, operation: Operation, message: String) -> SyncError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => SyncError::Auth(message),
        StatusCode::NOT_FOUND => SyncError::NotFound(message),
        StatusCode::CONFLICT => SyncError::Conflict(message),
        StatusCode::UNPROCESSABLE_ENTITY if operation == Operation::Write => {
            SyncError::Conflict(message)
        }
        _ => SyncError::Transport(format!("{status}: {message}")),
    }
}

/// The `message` field of an error body, or the status reason when the body
/// carries none.
pub(crate) fn error_message(status: StatusCode, body: &str) -> String {
    match serde_json::from_str::<ApiErrorBody>(body) {
        Ok(ApiErrorBody { message: Some(m) }) if !m.is_empty() => m,
        _ => status
            .canonical_reason()
            .unwrap_or("unexpected response")
            .to_string(),
    }
}

async fn error_from_response(response: reqwest::Response, operation: Operation) -> SyncError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    map_status(status, operation, error_message(status, &body))
}

//=========================================================================================
// Response Decoding
//=========================================================================================

/// Decodes a successful GET body into the document and its blob sha.
pub(crate) fn parse_contents(body: &str) -> SyncResult<(ApplicationDocument, SyncToken)> {
    let body: ContentsResponse = serde_json::from_str(body)
        .map_err(|e| SyncError::Decode(format!("unexpected contents response: {e}")))?;

    // Files above 1 MB come back without inline content.
    if body.encoding.as_deref() != Some("base64") {
        return Err(SyncError::Decode(format!(
            "unsupported content encoding {:?}",
            body.encoding
        )));
    }

    let document = decode_document(&body.content)?;
    Ok((document, SyncToken::new(body.sha)))
}

/// Extracts the new blob sha from a successful PUT body.
pub(crate) fn parse_put_response(body: &str) -> SyncResult<SyncToken> {
    let body: PutContentsResponse = serde_json::from_str(body)
        .map_err(|e| SyncError::Decode(format!("unexpected write response: {e}")))?;
    Ok(SyncToken::new(body.content.sha))
}

fn transport(e: reqwest::Error) -> SyncError {
    SyncError::Transport(e.to_string())
}

//=========================================================================================
// `RemoteDocumentStore` Trait Implementation
//=========================================================================================

#[async_trait]
impl RemoteDocumentStore for GitHubContentsAdapter {
    async fn pull(&self, target: &StoreTarget) -> SyncResult<(ApplicationDocument, SyncToken)> {
        let url = self.contents_url(target);
        debug!(%url, "GET contents");

        let response = self
            .client
            .get(&url)
            .header(header::AUTHORIZATION, format!("token {}", target.credential))
            .header(header::ACCEPT, ACCEPT_V3)
            .send()
            .await
            .map_err(transport)?;

        if !response.status().is_success() {
            return Err(error_from_response(response, Operation::Read).await);
        }

        let body = response.text().await.map_err(transport)?;
        parse_contents(&body)
    }

    async fn push(
        &self,
        target: &StoreTarget,
        document: &ApplicationDocument,
        token: Option<&SyncToken>,
    ) -> SyncResult<SyncToken> {
        let url = self.contents_url(target);
        let request = PutContentsRequest {
            message: format!("Update {} - {}", target.path, Utc::now().to_rfc3339()),
            content: encode_document(document)?,
            sha: token.map(|t| t.as_str()),
        };
        debug!(%url, has_sha = request.sha.is_some(), "PUT contents");

        let response = self
            .client
            .put(&url)
            .header(header::AUTHORIZATION, format!("token {}", target.credential))
            .header(header::ACCEPT, ACCEPT_V3)
            .json(&request)
            .send()
            .await
            .map_err(transport)?;

        if !response.status().is_success() {
            return Err(error_from_response(response, Operation::Write).await);
        }

        let body = response.text().await.map_err(transport)?;
        parse_put_response(&body)
    }
}
