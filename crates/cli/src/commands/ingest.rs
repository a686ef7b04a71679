//! `oxpecker ingest` — Chunk and embed documents, reporting stats.
//!
//! The vector store is in-memory and scoped to the process, so this
//! command is a pipeline check: it verifies the embedding backend is
//! reachable and shows how the configured chunking splits each file.
//! To chat over documents, pass them to `oxpecker chat --source`.

use oxpecker_config::AppConfig;
use oxpecker_retrieval::{DocumentIngestor, InMemoryVectorStore};
use std::path::PathBuf;
use std::sync::Arc;

pub async fn run(files: Vec<PathBuf>) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    let provider = super::build_provider(&config);

    let store = Arc::new(InMemoryVectorStore::new());
    let ingestor = DocumentIngestor::new(
        provider,
        store,
        &config.embedding_model,
        config.retrieval.chunk_size,
        config.retrieval.chunk_overlap,
    );

    println!(
        "Chunking: {} chars, {} overlap; embedding model: {}",
        config.retrieval.chunk_size, config.retrieval.chunk_overlap, config.embedding_model
    );
    println!();

    let mut total = 0;
    for path in &files {
        let text = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read {}: {e}", path.display()))?;
        let stats = ingestor.ingest(&text, &path.display().to_string()).await?;
        println!(
            "  {}: {} chunks ({} added, {} duplicates)",
            path.display(),
            stats.chunks,
            stats.added,
            stats.skipped
        );
        total += stats.added;
    }

    println!();
    println!("Embedded {total} chunks across {} files", files.len());
    Ok(())
}
