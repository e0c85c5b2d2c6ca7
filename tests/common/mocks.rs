//! Mock configurations for test fixtures.
//!
//! Re-exports the mock transport from `ragchat::adapters::mock` and wraps it
//! in a builder for the chat endpoint.

pub use ragchat::adapters::mock::{MockHttpClient, MockResponse};
pub use ragchat::traits::{Headers, HttpClient, HttpError, Response};

use bytes::Bytes;
use ragchat::api::ApiClient;
use ragchat::session::ChatSession;

pub const MOCK_BASE: &str = "http://mock";
pub const CHAT_URL: &str = "http://mock/api/chat";

/// Builder for a mock backend serving `/api/chat`.
pub struct MockChatBackend {
    client: MockHttpClient,
}

#[allow(dead_code)]
impl MockChatBackend {
    pub fn new() -> Self {
        Self {
            client: MockHttpClient::new(),
        }
    }

    /// Stream these chunks, then end the body.
    pub fn with_chunks<B: AsRef<[u8]>>(self, chunks: &[B]) -> Self {
        self.client
            .set_response(CHAT_URL, MockResponse::Stream(to_bytes(chunks)));
        self
    }

    /// Stream these chunks, then keep the connection open.
    pub fn with_hanging_chunks<B: AsRef<[u8]>>(self, chunks: &[B]) -> Self {
        self.client
            .set_response(CHAT_URL, MockResponse::StreamThenHang(to_bytes(chunks)));
        self
    }

    /// Stream these chunks, then fail mid-body.
    pub fn with_chunks_then_error<B: AsRef<[u8]>>(self, chunks: &[B], error: HttpError) -> Self {
        self.client.set_response(
            CHAT_URL,
            MockResponse::StreamThenError(to_bytes(chunks), error),
        );
        self
    }

    /// Answer the chat request with a non-stream status.
    pub fn with_status(self, status: u16, body: &str) -> Self {
        self.client.set_response(
            CHAT_URL,
            MockResponse::Success(Response::new(status, Bytes::from(body.to_string()))),
        );
        self
    }

    pub fn with_response(self, response: MockResponse) -> Self {
        self.client.set_response(CHAT_URL, response);
        self
    }

    pub fn client(&self) -> MockHttpClient {
        self.client.clone()
    }

    pub fn api(&self) -> ApiClient<MockHttpClient> {
        ApiClient::with_http(MOCK_BASE, self.client.clone())
    }

    pub fn session(&self, collection: &str) -> ChatSession<MockHttpClient> {
        ChatSession::new(self.api()).with_collection(collection)
    }
}

impl Default for MockChatBackend {
    fn default() -> Self {
        Self::new()
    }
}

fn to_bytes<B: AsRef<[u8]>>(chunks: &[B]) -> Vec<Bytes> {
    chunks
        .iter()
        .map(|c| Bytes::copy_from_slice(c.as_ref()))
        .collect()
}
