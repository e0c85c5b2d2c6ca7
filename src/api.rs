//! RAG backend API client.
//!
//! Typed access to the collection, document, health and chat endpoints,
//! including the streamed chat answer via Server-Sent Events (SSE).

use bytes::Bytes;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::de::DeserializeOwned;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use crate::adapters::ReqwestHttpClient;
use crate::config::{ClientConfig, DEFAULT_API_URL};
use crate::error::{classify_http_error, extract_detail, ChatError, ChatResult, NetworkError};
use crate::models::{
    ChatRequest, CollectionInfo, CollectionList, CreateCollection, DocumentInfo, DocumentList,
    HealthReport, IndexResult, SyncChatResponse,
};
use crate::sse::{decode_response, EventStream};
use crate::traits::{FilePart, Headers, HttpClient, Response};

/// Longest collection name the backend accepts.
pub const MAX_COLLECTION_NAME_LEN: usize = 100;

static COLLECTION_NAME_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z0-9_-]+$").expect("Invalid collection name regex"));

/// Check a collection name against the backend's naming rule.
///
/// Names are 1 to 100 characters of letters, digits, `_` and `-`.
pub fn validate_collection_name(name: &str) -> ChatResult<()> {
    if name.is_empty() || name.chars().count() > MAX_COLLECTION_NAME_LEN {
        return Err(ChatError::invalid_input(format!(
            "Collection name must be 1 to {} characters",
            MAX_COLLECTION_NAME_LEN
        )));
    }
    if !COLLECTION_NAME_REGEX.is_match(name) {
        return Err(ChatError::invalid_input(
            "Collection name may only contain letters, digits, '_' and '-'",
        ));
    }
    Ok(())
}

/// Client for the RAG backend.
///
/// Generic over the [`HttpClient`] so tests can run it against
/// [`MockHttpClient`](crate::adapters::MockHttpClient).
pub struct ApiClient<C: HttpClient = ReqwestHttpClient> {
    /// Base URL, without trailing slash
    pub base_url: String,
    http: Arc<C>,
    idle_timeout: Option<Duration>,
}

impl<C: HttpClient> Clone for ApiClient<C> {
    fn clone(&self) -> Self {
        Self {
            base_url: self.base_url.clone(),
            http: Arc::clone(&self.http),
            idle_timeout: self.idle_timeout,
        }
    }
}

impl ApiClient<ReqwestHttpClient> {
    /// Create a client for the default local backend.
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_API_URL)
    }

    /// Create a client for a custom base URL.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self::with_http(base_url, ReqwestHttpClient::new())
    }

    /// Create a client from loaded configuration.
    pub fn from_config(config: &ClientConfig) -> Self {
        Self::with_base_url(config.api_url.clone()).with_idle_timeout(config.stream_idle_timeout())
    }
}

impl Default for ApiClient<ReqwestHttpClient> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: HttpClient> ApiClient<C> {
    /// Create a client over any transport.
    pub fn with_http(base_url: impl Into<String>, http: C) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http: Arc::new(http),
            idle_timeout: None,
        }
    }

    /// Give up on a chat stream after this long without a chunk.
    pub fn with_idle_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.idle_timeout = timeout;
        self
    }

    pub fn idle_timeout(&self) -> Option<Duration> {
        self.idle_timeout
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn collection_url(&self, name: &str) -> String {
        self.url(&format!("/api/collections/{}", urlencoding::encode(name)))
    }

    fn json_headers() -> Headers {
        let mut headers = Headers::new();
        headers.insert("Content-Type".to_string(), "application/json".to_string());
        headers
    }

    /// Reject non-2xx responses, keeping the backend's `detail`.
    fn check(response: Response) -> ChatResult<Response> {
        if response.is_success() {
            return Ok(response);
        }
        let message = extract_detail(&response.text());
        tracing::debug!("Backend returned {}: {}", response.status, message);
        Err(NetworkError::HttpStatus {
            status: response.status,
            message,
        }
        .into())
    }

    fn parse<T: DeserializeOwned>(response: &Response) -> ChatResult<T> {
        response.json().map_err(|e| {
            NetworkError::InvalidResponse {
                message: e.to_string(),
            }
            .into()
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> ChatResult<T> {
        tracing::debug!("GET {}", url);
        let response = self
            .http
            .get(url, &Headers::new())
            .await
            .map_err(|e| classify_http_error(e, url))?;
        Self::parse(&Self::check(response)?)
    }

    async fn delete_url(&self, url: &str) -> ChatResult<()> {
        tracing::debug!("DELETE {}", url);
        let response = self
            .http
            .delete(url, &Headers::new())
            .await
            .map_err(|e| classify_http_error(e, url))?;
        Self::check(response)?;
        Ok(())
    }

    async fn post_json(&self, url: &str, body: &str) -> ChatResult<Response> {
        tracing::debug!("POST {}", url);
        let response = self
            .http
            .post(url, body, &Self::json_headers())
            .await
            .map_err(|e| classify_http_error(e, url))?;
        Self::check(response)
    }

    /// List collection names.
    pub async fn list_collections(&self) -> ChatResult<Vec<String>> {
        let list: CollectionList = self.get_json(&self.url("/api/collections")).await?;
        Ok(list.collections)
    }

    /// Fetch one collection with its document count.
    pub async fn get_collection(&self, name: &str) -> ChatResult<CollectionInfo> {
        self.get_json(&self.collection_url(name)).await
    }

    /// Create a collection. The name is validated before any request is sent.
    pub async fn create_collection(&self, name: &str) -> ChatResult<CollectionInfo> {
        validate_collection_name(name)?;
        let body = serde_json::to_string(&CreateCollection {
            name: name.to_string(),
        })?;
        let response = self.post_json(&self.url("/api/collections"), &body).await?;
        tracing::info!("Created collection {}", name);
        Self::parse(&response)
    }

    pub async fn delete_collection(&self, name: &str) -> ChatResult<()> {
        self.delete_url(&self.collection_url(name)).await
    }

    /// List the documents indexed in a collection.
    pub async fn list_documents(&self, collection: &str) -> ChatResult<Vec<DocumentInfo>> {
        let url = format!("{}/documents", self.collection_url(collection));
        let list: DocumentList = self.get_json(&url).await?;
        Ok(list.documents)
    }

    /// Upload a document for indexing.
    ///
    /// With `force`, a document already present is re-indexed.
    pub async fn upload_document(
        &self,
        collection: &str,
        file_name: &str,
        bytes: impl Into<Bytes>,
        force: bool,
    ) -> ChatResult<IndexResult> {
        let mut url = format!("{}/documents", self.collection_url(collection));
        if force {
            url.push_str("?force=true");
        }
        let part = FilePart {
            field: "file".to_string(),
            file_name: file_name.to_string(),
            bytes: bytes.into(),
        };

        tracing::debug!("POST {} ({} bytes)", url, part.bytes.len());
        let response = self
            .http
            .post_multipart(&url, part, &Headers::new())
            .await
            .map_err(|e| classify_http_error(e, &url))?;
        Self::parse(&Self::check(response)?)
    }

    /// Read a local file and upload it under its own file name.
    pub async fn upload_file(
        &self,
        collection: &str,
        path: &Path,
        force: bool,
    ) -> ChatResult<IndexResult> {
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| ChatError::invalid_input(format!("Not a file: {}", path.display())))?
            .to_string();
        let bytes = tokio::fs::read(path).await.map_err(|source| ChatError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        self.upload_document(collection, &file_name, bytes, force).await
    }

    pub async fn delete_document(&self, collection: &str, document: &str) -> ChatResult<()> {
        let url = format!(
            "{}/documents/{}",
            self.collection_url(collection),
            urlencoding::encode(document)
        );
        self.delete_url(&url).await
    }

    /// Backend and dependency status.
    pub async fn health(&self) -> ChatResult<HealthReport> {
        self.get_json(&self.url("/api/v1/health")).await
    }

    /// Ask a question and wait for the whole answer.
    pub async fn chat_sync(&self, request: &ChatRequest) -> ChatResult<SyncChatResponse> {
        let body = serde_json::to_string(request)?;
        let response = self.post_json(&self.url("/api/chat/sync"), &body).await?;
        Self::parse(&response)
    }

    /// Ask a question and stream the answer.
    ///
    /// A non-success status fails here, before any event is produced.
    pub async fn stream_chat(&self, request: &ChatRequest) -> ChatResult<EventStream> {
        let url = self.url("/api/chat");
        let body = serde_json::to_string(request)?;

        let mut headers = Self::json_headers();
        headers.insert("Accept".to_string(), "text/event-stream".to_string());

        tracing::debug!(
            "POST {} (collection={}, history={})",
            url,
            request.collection_name,
            request.history.len()
        );
        let response = self
            .http
            .post_stream(&url, &body, &headers)
            .await
            .map_err(|e| classify_http_error(e, &url))?;

        decode_response(response, &url, self.idle_timeout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{MockHttpClient, MockResponse};
    use crate::sse::StreamEvent;
    use crate::traits::HttpError;
    use futures_util::StreamExt;

    const BASE: &str = "http://mock";

    fn client(mock: &MockHttpClient) -> ApiClient<MockHttpClient> {
        ApiClient::with_http(BASE, mock.clone())
    }

    fn ok(status: u16, body: &str) -> MockResponse {
        MockResponse::Success(Response::new(status, Bytes::from(body.to_string())))
    }

    #[test]
    fn test_validate_collection_name() {
        assert!(validate_collection_name("docs_2024-v1").is_ok());
        assert!(validate_collection_name("").is_err());
        assert!(validate_collection_name("with space").is_err());
        assert!(validate_collection_name("accentué").is_err());
        assert!(validate_collection_name(&"a".repeat(100)).is_ok());
        assert!(validate_collection_name(&"a".repeat(101)).is_err());
    }

    #[test]
    fn test_base_url_trailing_slash_is_dropped() {
        let api = ApiClient::with_http("http://mock/", MockHttpClient::new());
        assert_eq!(api.base_url, "http://mock");
    }

    #[tokio::test]
    async fn test_list_collections() {
        let mock = MockHttpClient::new();
        mock.set_response(
            "http://mock/api/collections",
            ok(200, r#"{"collections":["docs","manuals"]}"#),
        );

        let names = client(&mock).list_collections().await.unwrap();
        assert_eq!(names, vec!["docs", "manuals"]);
    }

    #[tokio::test]
    async fn test_create_collection_invalid_name_sends_nothing() {
        let mock = MockHttpClient::new();
        let result = client(&mock).create_collection("bad name").await;
        assert!(matches!(result, Err(ChatError::InvalidInput { .. })));
        assert!(mock.get_requests().is_empty());
    }

    #[tokio::test]
    async fn test_create_collection_conflict_keeps_detail() {
        let mock = MockHttpClient::new();
        mock.set_response(
            "http://mock/api/collections",
            ok(409, r#"{"detail":"Collection 'docs' already exists"}"#),
        );

        let err = client(&mock).create_collection("docs").await.unwrap_err();
        match err {
            ChatError::Network(NetworkError::HttpStatus { status, message }) => {
                assert_eq!(status, 409);
                assert_eq!(message, "Collection 'docs' already exists");
            }
            other => panic!("Expected HttpStatus, got {:?}", other),
        }

        let requests = mock.get_requests();
        assert_eq!(requests[0].body.as_deref(), Some(r#"{"name":"docs"}"#));
    }

    #[tokio::test]
    async fn test_document_paths_are_encoded() {
        let mock = MockHttpClient::new();
        mock.set_default_response(ok(200, r#"{"message":"deleted"}"#));

        client(&mock)
            .delete_document("docs", "rapport annuel.pdf")
            .await
            .unwrap();

        let requests = mock.get_requests();
        assert_eq!(requests[0].method, "DELETE");
        assert_eq!(
            requests[0].url,
            "http://mock/api/collections/docs/documents/rapport%20annuel.pdf"
        );
    }

    #[tokio::test]
    async fn test_upload_document_force() {
        let mock = MockHttpClient::new();
        mock.set_default_response(ok(
            200,
            r#"{"status":"success","chunks":12,"message":"Document indexed"}"#,
        ));

        let result = client(&mock)
            .upload_document("docs", "guide.pdf", Bytes::from_static(b"%PDF"), true)
            .await
            .unwrap();
        assert_eq!(result.chunks, 12);

        let requests = mock.get_requests();
        assert_eq!(
            requests[0].url,
            "http://mock/api/collections/docs/documents?force=true"
        );
        let file = requests[0].file.as_ref().unwrap();
        assert_eq!(file.field, "file");
        assert_eq!(file.file_name, "guide.pdf");
    }

    #[tokio::test]
    async fn test_upload_file_missing_is_io_error() {
        let mock = MockHttpClient::new();
        let result = client(&mock)
            .upload_file("docs", Path::new("/definitely/not/here.pdf"), false)
            .await;
        assert!(matches!(result, Err(ChatError::Io { .. })));
    }

    #[tokio::test]
    async fn test_connection_failure_is_network_error() {
        let mock = MockHttpClient::new();
        mock.set_default_response(MockResponse::Error(HttpError::ConnectionFailed(
            "refused".to_string(),
        )));

        let err = client(&mock).health().await.unwrap_err();
        assert!(matches!(
            err,
            ChatError::Network(NetworkError::ConnectionFailed { .. })
        ));
    }

    #[tokio::test]
    async fn test_invalid_json_is_invalid_response() {
        let mock = MockHttpClient::new();
        mock.set_default_response(ok(200, "<html>"));

        let err = client(&mock).list_collections().await.unwrap_err();
        assert!(matches!(
            err,
            ChatError::Network(NetworkError::InvalidResponse { .. })
        ));
    }

    #[tokio::test]
    async fn test_stream_chat_sends_request_and_decodes() {
        let mock = MockHttpClient::new();
        mock.set_response(
            "http://mock/api/chat",
            MockResponse::Stream(vec![
                Bytes::from_static(b"data: {\"token\":\"Bonj"),
                Bytes::from_static(b"our\"}\n\ndata: {\"done\":true,\"sources\":[]}\n\n"),
            ]),
        );

        let request = ChatRequest::new("Salut", "docs");
        let mut events = client(&mock).stream_chat(&request).await.unwrap();

        let mut collected = Vec::new();
        while let Some(event) = events.next().await {
            collected.push(event.unwrap());
        }
        assert_eq!(
            collected,
            vec![
                StreamEvent::Token("Bonjour".to_string()),
                StreamEvent::Done { sources: vec![] }
            ]
        );

        let requests = mock.get_requests();
        assert_eq!(
            requests[0].headers.get("Accept").map(String::as_str),
            Some("text/event-stream")
        );
        let sent: ChatRequest = serde_json::from_str(requests[0].body.as_ref().unwrap()).unwrap();
        assert_eq!(sent, request);
    }

    #[tokio::test]
    async fn test_stream_chat_http_error() {
        let mock = MockHttpClient::new();
        mock.set_response("http://mock/api/chat", ok(500, "Internal Server Error"));

        let err = client(&mock)
            .stream_chat(&ChatRequest::new("q", "docs"))
            .await
            .err()
            .unwrap();
        assert_eq!(err.to_string(), "HTTP error: 500 (Internal Server Error)");
    }
}
