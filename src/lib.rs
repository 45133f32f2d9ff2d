//! # pdfqa
//!
//! Retrieval-augmented question answering over a single uploaded PDF:
//! extract text, split it into fixed-size overlapping chunks, embed the
//! chunks, index them in an in-memory vector store, and answer questions by
//! retrieving the most relevant chunks and asking a chat model to answer
//! using only that context.
//!
//! ```text
//! PDF ──▶ extract ──▶ chunk ──▶ embed ──▶ vector index      (per upload)
//!
//! question ──▶ embed ──▶ top-K query ──▶ prompt ──▶ answer  (per question)
//!                              ▲              ▲
//!                        vector index   conversation log
//! ```
//!
//! Two front ends share the pipeline: an HTTP API ([`server`]) and an
//! interactive terminal session ([`repl`]). Both keep a rolling
//! conversation log per document for the lifetime of the process; nothing
//! is persisted.
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration and API-key loading |
//! | [`models`] | Core data types |
//! | [`extract`] | PDF text extraction |
//! | [`chunk`] | Fixed-size overlapping chunker |
//! | [`embedding`] | Embedding client |
//! | [`completion`] | Chat completion client |
//! | [`index`] | In-memory vector index |
//! | [`history`] | Per-document conversation log |
//! | [`pipeline`] | Indexing, retrieval, and answering |
//! | [`server`] | HTTP API front end |
//! | [`repl`] | Interactive front end |

pub mod chunk;
pub mod completion;
pub mod config;
pub mod embedding;
pub mod extract;
pub mod history;
pub mod index;
pub mod models;
pub mod pipeline;
pub mod repl;
pub mod server;
