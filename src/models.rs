//! Core data types for the question-answering pipeline.

use serde::Serialize;

/// An uploaded PDF after extraction and chunking. Immutable once indexed;
/// lives only as long as the hosting process.
#[derive(Debug, Clone)]
pub struct Document {
    pub id: String,
    pub filename: String,
    /// Full extracted text, all pages concatenated in page order.
    pub text: String,
    pub chunks: Vec<Chunk>,
}

/// Fixed-size overlapping substring of a document, identified by its
/// position in the chunk sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct Chunk {
    pub index: usize,
    pub text: String,
}

impl Chunk {
    /// Chunk id as stored in the vector index and reported in citations.
    pub fn id(&self) -> String {
        self.index.to_string()
    }
}

/// Speaker of a conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One entry in a document's conversation log. Assistant turns carry the
/// chunk ids and texts the answer drew from.
#[derive(Debug, Clone, Serialize)]
pub struct Turn {
    pub role: Role,
    pub content: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub citations: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub chunks: Vec<String>,
}

impl Turn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            citations: Vec::new(),
            chunks: Vec::new(),
        }
    }

    pub fn assistant(
        content: impl Into<String>,
        citations: Vec<String>,
        chunks: Vec<String>,
    ) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            citations,
            chunks,
        }
    }
}
