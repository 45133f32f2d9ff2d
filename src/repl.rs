//! Interactive front end: a single-document terminal chat session.
//!
//! `pdfqa chat <file.pdf>` reads the PDF, indexes it (progress on stderr so
//! stdout stays clean), then loops over questions from stdin. Each answer is
//! printed with a citations section listing the retrieved chunks, best
//! match first.
//!
//! Session state — the document and its conversation log — is an explicit
//! local object; it ends with the process.

use anyhow::{Context, Result};
use std::io::{BufRead, Write};
use std::path::Path;
use std::sync::Arc;

use crate::extract::extract_pdf_text;
use crate::history::Conversation;
use crate::models::Turn;
use crate::pipeline::QaEngine;

/// Run the interactive loop against one PDF.
pub async fn run_chat(engine: Arc<QaEngine>, pdf_path: &Path) -> Result<()> {
    let bytes = std::fs::read(pdf_path)
        .with_context(|| format!("Failed to read {}", pdf_path.display()))?;
    let filename = pdf_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "upload.pdf".to_string());

    eprintln!("extracting text from {}...", filename);
    let text = extract_pdf_text(&bytes)?;

    eprintln!("chunking and embedding (this may take a while)...");
    let document = engine.index_document(&filename, &text).await?;
    eprintln!(
        "indexed {} into {} chunks, ready for questions",
        filename,
        document.chunks.len()
    );
    println!("Ask a question (empty line or Ctrl-D to quit).");

    let mut conversation = Conversation::new();
    let stdin = std::io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        print!("> ");
        std::io::stdout().flush()?;
        let question = match lines.next() {
            Some(line) => line?,
            None => break,
        };
        let question = question.trim().to_string();
        if question.is_empty() {
            break;
        }

        let answer = engine
            .answer(&document.id, &conversation, &question)
            .await?;

        println!("{}", answer.answer);
        if !answer.citations.is_empty() {
            println!("Citations:");
            for (id, chunk) in answer.citations.iter().zip(&answer.chunks) {
                println!("  [chunk {}]", id);
                for line in chunk.lines() {
                    println!("    {}", line);
                }
            }
        }
        println!();

        conversation.append(Turn::user(question));
        conversation.append(Turn::assistant(
            answer.answer,
            answer.citations,
            answer.chunks,
        ));
    }

    Ok(())
}

/// Prompt for an API key on stdin when neither the key file nor the
/// environment provides one.
pub fn prompt_api_key() -> Result<String> {
    print!("Enter your OpenAI API key: ");
    std::io::stdout().flush()?;
    let mut key = String::new();
    std::io::stdin().read_line(&mut key)?;
    let key = key.trim().to_string();
    if key.is_empty() {
        anyhow::bail!("An API key is required");
    }
    Ok(key)
}
