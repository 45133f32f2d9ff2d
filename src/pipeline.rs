//! The retrieval-and-answering pipeline.
//!
//! [`QaEngine`] ties the pieces together: chunking and sequential embedding
//! at indexing time, then per question an embed + nearest-neighbor query,
//! prompt assembly from the retrieved chunks and the recent conversation
//! window, and a single deterministic completion call.
//!
//! The engine owns the vector store but not conversation state; front ends
//! hold an explicit per-document session and append turns themselves after
//! a successful answer.

use anyhow::{Context, Result};
use uuid::Uuid;

use crate::chunk::chunk_text;
use crate::completion::{ChatMessage, CompletionClient};
use crate::config::Config;
use crate::embedding::Embedder;
use crate::history::Conversation;
use crate::index::{QueryHit, VectorStore};
use crate::models::{Document, Role, Turn};

/// Fixed refusal string the model is instructed to return when the answer
/// is not present in the retrieved context.
pub const REFUSAL: &str = "I don't know.";

const SYSTEM_INSTRUCTION: &str = "You are a helpful assistant. Answer the user's question using \
    ONLY the provided context from a PDF. If the answer is not in the context, say 'I don't know.'";

/// A generated answer with its citations, in retrieval-rank order.
#[derive(Debug, Clone)]
pub struct Answer {
    pub answer: String,
    /// Chunk ids of the retrieved context, best match first.
    pub citations: Vec<String>,
    /// Texts of the cited chunks, same order as `citations`.
    pub chunks: Vec<String>,
}

/// Retrieval-augmented question-answering engine.
pub struct QaEngine {
    config: Config,
    embedder: Box<dyn Embedder>,
    completion: Box<dyn CompletionClient>,
    store: VectorStore,
}

impl QaEngine {
    pub fn new(
        config: Config,
        embedder: Box<dyn Embedder>,
        completion: Box<dyn CompletionClient>,
    ) -> Self {
        Self {
            config,
            embedder,
            completion,
            store: VectorStore::new(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    fn collection_name(doc_id: &str) -> String {
        format!("doc_{}", doc_id)
    }

    /// Index extracted document text: chunk, embed each chunk in order, and
    /// (re)create the document's collection. Any embedding failure aborts
    /// the whole operation and leaves no collection behind.
    pub async fn index_document(&self, filename: &str, text: &str) -> Result<Document> {
        let id = Uuid::new_v4().to_string();
        self.index_document_as(&id, filename, text).await
    }

    /// Index under a caller-chosen document id. A pre-existing collection
    /// for that id is fully replaced; old chunks are not retrievable
    /// afterward.
    pub async fn index_document_as(
        &self,
        doc_id: &str,
        filename: &str,
        text: &str,
    ) -> Result<Document> {
        let chunks = chunk_text(text, self.config.chunking.size, self.config.chunking.overlap)?;

        // Embed before touching the store so a mid-sequence failure cannot
        // leave a partially filled collection.
        let mut vectors = Vec::with_capacity(chunks.len());
        for chunk in &chunks {
            let vector = self
                .embedder
                .embed(&chunk.text)
                .await
                .with_context(|| format!("embedding chunk {} of {}", chunk.index, filename))?;
            vectors.push(vector);
        }

        let collection = Self::collection_name(doc_id);
        self.store.recreate_collection(&collection);
        for (chunk, vector) in chunks.iter().zip(vectors) {
            self.store.add(&collection, &chunk.id(), &chunk.text, vector)?;
        }

        Ok(Document {
            id: doc_id.to_string(),
            filename: filename.to_string(),
            text: text.to_string(),
            chunks,
        })
    }

    /// Embed the question and query the document's index for the top-K
    /// nearest chunks, best match first. No caching: every call re-embeds
    /// and re-queries.
    pub async fn retrieve(&self, doc_id: &str, question: &str) -> Result<Vec<QueryHit>> {
        let query_vec = self
            .embedder
            .embed(question)
            .await
            .context("embedding question")?;
        self.store.query(
            &Self::collection_name(doc_id),
            &query_vec,
            self.config.retrieval.top_k,
        )
    }

    /// Answer a question against an indexed document, conditioning the model
    /// on the retrieved context and the recent conversation turns. The
    /// caller appends the resulting turns to its conversation log.
    pub async fn answer(
        &self,
        doc_id: &str,
        history: &Conversation,
        question: &str,
    ) -> Result<Answer> {
        let hits = self.retrieve(doc_id, question).await?;

        let citations: Vec<String> = hits.iter().map(|h| h.chunk_id.clone()).collect();
        let chunk_texts: Vec<String> = hits.into_iter().map(|h| h.text).collect();

        let recent = history.recent(self.config.retrieval.history_window);
        let messages = assemble_messages(&chunk_texts, recent, question);

        let answer = self
            .completion
            .complete(&messages)
            .await
            .context("generating answer")?;

        Ok(Answer {
            answer: answer.trim().to_string(),
            citations,
            chunks: chunk_texts,
        })
    }

    /// Whether a document id has an index.
    pub fn is_indexed(&self, doc_id: &str) -> bool {
        self.store.contains(&Self::collection_name(doc_id))
    }

    /// Drop a document's collection. Unknown ids are a no-op, so callers can
    /// use this as best-effort cleanup.
    pub fn remove_document(&self, doc_id: &str) {
        self.store.delete_collection(&Self::collection_name(doc_id));
    }
}

/// Build the chat request: system instruction with the context block
/// (retrieved chunks joined by blank lines, no inline ids), prior turns
/// oldest first, then the question as the final user message.
pub fn assemble_messages(
    context_chunks: &[String],
    history: &[Turn],
    question: &str,
) -> Vec<ChatMessage> {
    let context = context_chunks.join("\n\n");
    let system = format!("{}\n\nContext:\n{}", SYSTEM_INSTRUCTION, context);

    let mut messages = Vec::with_capacity(history.len() + 2);
    messages.push(ChatMessage::system(system));
    for turn in history {
        messages.push(match turn.role {
            Role::User => ChatMessage::user(turn.content.clone()),
            Role::Assistant => ChatMessage::assistant(turn.content.clone()),
        });
    }
    messages.push(ChatMessage::user(question));
    messages
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Turn;

    #[test]
    fn messages_start_with_system_and_end_with_question() {
        let chunks = vec!["alpha".to_string(), "beta".to_string()];
        let history = vec![Turn::user("prev q"), Turn::assistant("prev a", vec![], vec![])];
        let messages = assemble_messages(&chunks, &history, "current q");

        assert_eq!(messages.len(), 4);
        assert_eq!(messages[0].role, "system");
        assert!(messages[0].content.contains("ONLY the provided context"));
        assert!(messages[0].content.contains("alpha\n\nbeta"));
        assert_eq!(messages[1].role, "user");
        assert_eq!(messages[1].content, "prev q");
        assert_eq!(messages[2].role, "assistant");
        assert_eq!(messages[3].role, "user");
        assert_eq!(messages[3].content, "current q");
    }

    #[test]
    fn context_block_has_no_chunk_id_labels() {
        let chunks = vec!["first chunk".to_string(), "second chunk".to_string()];
        let messages = assemble_messages(&chunks, &[], "q");
        let system = &messages[0].content;
        assert!(system.contains("first chunk\n\nsecond chunk"));
        assert!(!system.contains("Chunk 0"));
    }

    #[test]
    fn empty_context_still_assembles() {
        let messages = assemble_messages(&[], &[], "q");
        assert_eq!(messages.len(), 2);
        assert!(messages[0].content.ends_with("Context:\n"));
    }

    #[test]
    fn refusal_constant_matches_instruction() {
        assert!(SYSTEM_INSTRUCTION.contains(REFUSAL));
    }
}
