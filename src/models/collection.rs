//! Payloads of the collection, document and health endpoints.

use serde::{Deserialize, Serialize};

use super::message::Source;

/// `GET /api/collections`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct CollectionList {
    #[serde(default)]
    pub collections: Vec<String>,
}

/// `POST /api/collections` body
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CreateCollection {
    pub name: String,
}

/// `GET /api/collections/{name}` and the create response
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CollectionInfo {
    pub name: String,
    #[serde(default)]
    pub document_count: u64,
}

/// A document indexed in a collection.
///
/// Field names follow the backend.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DocumentInfo {
    /// File name
    pub nom: String,
    /// Indexing date as sent by the backend
    pub date: String,
    pub nb_chunks: u64,
    pub nb_pages: u64,
}

/// `GET /api/collections/{name}/documents`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct DocumentList {
    #[serde(default)]
    pub documents: Vec<DocumentInfo>,
}

/// Result of uploading a document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IndexResult {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub chunks: u64,
    pub message: String,
}

/// Dependency states reported by the health endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct HealthData {
    #[serde(default)]
    pub ollama: String,
    #[serde(default)]
    pub chromadb: String,
    #[serde(default)]
    pub gpu: String,
}

/// `GET /api/v1/health`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HealthReport {
    pub status: String,
    #[serde(default)]
    pub data: Option<HealthData>,
    #[serde(default)]
    pub message: Option<String>,
}

impl HealthReport {
    /// True when the backend answered but one of its dependencies is down.
    pub fn is_degraded(&self) -> bool {
        if self.message.is_some() {
            return true;
        }
        self.data
            .as_ref()
            .map(|d| d.ollama == "unavailable" || d.chromadb == "unavailable")
            .unwrap_or(false)
    }
}

/// `POST /api/chat/sync`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SyncChatResponse {
    pub response: String,
    #[serde(default)]
    pub sources: Vec<Source>,
}
