//! nanodiag — console entry point.
//!
//! Startup sequence:
//!   1. Load .env (if present)
//!   2. Load config and init logger
//!   3. Build the knowledge base and pipeline
//!   4. Answer queries from stdin, one per line, carrying the session topic

use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::info;

use nanodiag::config;
use nanodiag::error::AppError;
use nanodiag::kb::seed;
use nanodiag::logger;
use nanodiag::pipeline::Pipeline;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), AppError> {
    // Load .env if present — ignore errors (file is optional).
    let _ = dotenvy::dotenv();

    let config = config::load()?;
    logger::init(&config.log_level)?;

    let kb = Arc::new(seed::builtin());
    info!(
        entities = kb.entity_count(),
        passages = kb.passages().len(),
        llm = %config.llm.provider,
        embedder = %config.embedding.provider,
        "knowledge base ready"
    );

    let pipeline = Pipeline::from_config(kb, &config)?;

    let mut stdout = tokio::io::stdout();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut session: Option<String> = None;

    stdout.write_all(b"nanodiag ready. Ask about DTCs, components, or symptoms.\n> ").await?;
    stdout.flush().await?;

    while let Some(line) = lines.next_line().await? {
        let query = line.trim();
        if query.is_empty() {
            stdout.write_all(b"> ").await?;
            stdout.flush().await?;
            continue;
        }
        if query == "exit" || query == "quit" {
            break;
        }

        let answer = pipeline.answer(query, session.as_deref()).await?;
        session = answer.new_session_context.clone();

        let report = format!(
            "{}\n[sources: {} triples, {} passages | score {:.3} | topic {}]\n> ",
            answer.answer_html,
            answer.triples.len(),
            answer.passages.len(),
            answer.fusion.combined_score,
            session.as_deref().unwrap_or("-"),
        );
        stdout.write_all(report.as_bytes()).await?;
        stdout.flush().await?;
    }

    Ok(())
}
