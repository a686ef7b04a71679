//! `oxpecker chat` — Interactive or single-question chat mode.

use oxpecker_chat::prompts::{DATA_PREAMBLE, SYSTEM_PROMPT};
use oxpecker_chat::{ChatOrchestrator, ChatStreamEvent};
use oxpecker_config::AppConfig;
use oxpecker_core::message::SessionKey;
use oxpecker_core::project::{ProjectDataProvider, StaticProjectData};
use oxpecker_history::SessionStore;
use oxpecker_retrieval::{DocumentIngestor, InMemoryVectorStore, Retriever};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

pub async fn run(
    question: Option<String>,
    sources: Vec<PathBuf>,
    project_id: Option<i64>,
    project_file: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    let provider = super::build_provider(&config);

    // Vector store and ingestion (in-memory, scoped to this run)
    let store = Arc::new(InMemoryVectorStore::new());
    if !sources.is_empty() {
        let ingestor = DocumentIngestor::new(
            provider.clone(),
            store.clone(),
            &config.embedding_model,
            config.retrieval.chunk_size,
            config.retrieval.chunk_overlap,
        );
        for path in &sources {
            let text = std::fs::read_to_string(path)
                .map_err(|e| format!("Failed to read {}: {e}", path.display()))?;
            let stats = ingestor.ingest(&text, &path.display().to_string()).await?;
            println!(
                "  Ingested {} ({} chunks, {} added, {} skipped)",
                path.display(),
                stats.chunks,
                stats.added,
                stats.skipped
            );
        }
    }

    // Project data, if a file was supplied
    let project_data: Option<Arc<dyn ProjectDataProvider>> = match &project_file {
        Some(path) => {
            let data = std::fs::read_to_string(path)
                .map_err(|e| format!("Failed to read {}: {e}", path.display()))?;
            Some(Arc::new(StaticProjectData::new(data)))
        }
        None => None,
    };

    let retriever = Arc::new(Retriever::new(
        provider.clone(),
        store,
        &config.embedding_model,
        config.retrieval.top_k,
    ));
    let sessions = Arc::new(SessionStore::new(SYSTEM_PROMPT, DATA_PREAMBLE, project_data));

    // Idle sessions only matter for long-lived interactive runs, but
    // the sweep is cheap either way.
    let ttl = chrono::Duration::seconds(config.history.session_ttl_secs as i64);
    tokio::spawn({
        let sessions = sessions.clone();
        async move {
            let mut interval = tokio::time::interval(Duration::from_secs(300));
            loop {
                interval.tick().await;
                sessions.evict_idle(ttl).await;
            }
        }
    });

    let orchestrator = ChatOrchestrator::new(
        provider,
        retriever,
        sessions,
        &config.model,
    )
    .with_temperature(config.temperature)
    .with_max_history_tokens(config.history.max_tokens)
    .with_call_timeout(Duration::from_secs(config.request_timeout_secs));

    let session_key = SessionKey::new();

    if let Some(question) = question {
        // Single question mode
        let rx = orchestrator
            .generate(&question, &session_key, project_id)
            .await?;
        stream_answer(rx).await?;
        return Ok(());
    }

    // Interactive mode
    println!();
    println!("  Oxpecker — project chat");
    println!("  Model: {}  Backend: {}", config.model, config.base_url);
    println!("  Type your question and press Enter. Type 'exit' to quit.");
    println!();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    prompt()?;
    while let Some(line) = lines.next_line().await? {
        let question = line.trim();
        if question == "exit" {
            break;
        }
        if question.is_empty() {
            prompt()?;
            continue;
        }

        match orchestrator.generate(question, &session_key, project_id).await {
            Ok(rx) => stream_answer(rx).await?,
            Err(e) => eprintln!("  [Error] {e}"),
        }
        println!();
        prompt()?;
    }

    println!();
    println!("  Goodbye!");
    Ok(())
}

fn prompt() -> std::io::Result<()> {
    print!("  You > ");
    std::io::stdout().flush()
}

/// Print streamed chunks as they arrive, ending the line on `Done`.
async fn stream_answer(
    mut rx: mpsc::Receiver<ChatStreamEvent>,
) -> Result<(), Box<dyn std::error::Error>> {
    while let Some(event) = rx.recv().await {
        match event {
            ChatStreamEvent::Chunk { content } => {
                print!("{content}");
                std::io::stdout().flush()?;
            }
            ChatStreamEvent::Done { .. } => {
                println!();
                return Ok(());
            }
            ChatStreamEvent::Error { message } => {
                println!();
                eprintln!("  [Error] {message}");
                return Ok(());
            }
        }
    }
    Ok(())
}
