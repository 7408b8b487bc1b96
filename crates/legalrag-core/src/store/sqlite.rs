//! SQLite-backed vector store
//!
//! Stores chunk embeddings as BLOBs and computes cosine distance in Rust.

use super::vectors::{bytes_to_embedding, cosine_distance, embedding_to_bytes};
use super::{hash_content, CollectionStats, Document, VectorStore};
use crate::error::{LegalRagError, Result};
use crate::llm::Embedder;
use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{params, Connection};
use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

const SCHEMA_VERSION: i32 = 1;

const CREATE_TABLES: &str = r#"
-- Embedded chunks, deduplicated per collection by content hash
CREATE TABLE IF NOT EXISTS chunks (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    collection TEXT NOT NULL,
    hash TEXT NOT NULL,
    content TEXT NOT NULL,
    metadata TEXT NOT NULL,
    model TEXT NOT NULL,
    embedding BLOB NOT NULL,
    created_at TEXT NOT NULL,
    UNIQUE(collection, hash)
);

CREATE INDEX IF NOT EXISTS idx_chunks_collection ON chunks(collection);

-- Schema version tracking
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER PRIMARY KEY
);
"#;

/// Vector store persisted in a single SQLite file
pub struct SqliteVectorStore {
    conn: Mutex<Connection>,
    collection: String,
    embedder: Arc<dyn Embedder>,
}

impl SqliteVectorStore {
    /// Open (or create) the store at `path` for one collection
    pub fn open(path: &Path, collection: &str, embedder: Arc<dyn Embedder>) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode = WAL; PRAGMA foreign_keys = ON;")?;
        Self::with_connection(conn, collection, embedder)
    }

    /// In-memory store, used by tests and one-shot runs
    pub fn open_in_memory(collection: &str, embedder: Arc<dyn Embedder>) -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?, collection, embedder)
    }

    fn with_connection(
        conn: Connection,
        collection: &str,
        embedder: Arc<dyn Embedder>,
    ) -> Result<Self> {
        conn.execute_batch(CREATE_TABLES)?;
        conn.execute(
            "INSERT OR IGNORE INTO schema_version (version) VALUES (?1)",
            params![SCHEMA_VERSION],
        )?;

        Ok(Self {
            conn: Mutex::new(conn),
            collection: collection.to_string(),
            embedder,
        })
    }

    /// Collection this handle reads and writes
    pub fn collection(&self) -> &str {
        &self.collection
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| LegalRagError::ExternalCall("vector store lock poisoned".to_string()))
    }

    fn existing_hashes(&self) -> Result<HashSet<String>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare("SELECT hash FROM chunks WHERE collection = ?1")?;
        let hashes = stmt
            .query_map(params![self.collection], |row| row.get::<_, String>(0))?
            .collect::<std::result::Result<HashSet<_>, _>>()?;
        Ok(hashes)
    }
}

#[async_trait]
impl VectorStore for SqliteVectorStore {
    async fn similarity_search_with_score(
        &self,
        query: &str,
        k: usize,
    ) -> Result<Vec<(Document, f32)>> {
        if k == 0 {
            return Ok(Vec::new());
        }

        let query_embedding = self.embedder.embed(query).await?;

        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT content, metadata, embedding FROM chunks WHERE collection = ?1",
        )?;

        let rows = stmt
            .query_map(params![self.collection], |row| {
                let content: String = row.get(0)?;
                let metadata: String = row.get(1)?;
                let embedding_bytes: Vec<u8> = row.get(2)?;
                Ok((content, metadata, embedding_bytes))
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let mut scored = Vec::with_capacity(rows.len());
        for (content, metadata, embedding_bytes) in rows {
            let metadata: BTreeMap<String, String> = serde_json::from_str(&metadata)?;
            let distance = cosine_distance(&query_embedding, &bytes_to_embedding(&embedding_bytes));
            scored.push((Document { content, metadata }, distance));
        }

        scored.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(k);

        tracing::debug!(
            "Similarity search in '{}' returned {} chunks",
            self.collection,
            scored.len()
        );
        Ok(scored)
    }

    async fn add_documents(&self, documents: &[Document]) -> Result<usize> {
        let existing = self.existing_hashes()?;
        let mut seen = HashSet::new();
        let mut pending = Vec::new();

        for doc in documents {
            let hash = hash_content(&doc.content);
            if existing.contains(&hash) || !seen.insert(hash.clone()) {
                continue;
            }
            pending.push((hash, doc));
        }

        if pending.is_empty() {
            tracing::info!("No new chunks to add to '{}'", self.collection);
            return Ok(0);
        }

        let texts: Vec<String> = pending.iter().map(|(_, d)| d.content.clone()).collect();
        let embeddings = self.embedder.embed_batch(&texts).await?;
        if embeddings.len() != pending.len() {
            return Err(LegalRagError::ExternalCall(format!(
                "expected {} embeddings, got {}",
                pending.len(),
                embeddings.len()
            )));
        }

        let now = Utc::now().to_rfc3339();
        let model = self.embedder.model_name().to_string();

        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        let mut added = 0;
        {
            let mut stmt = tx.prepare(
                "INSERT OR IGNORE INTO chunks
                 (collection, hash, content, metadata, model, embedding, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            )?;
            for ((hash, doc), embedding) in pending.iter().zip(embeddings.iter()) {
                let metadata = serde_json::to_string(&doc.metadata)?;
                added += stmt.execute(params![
                    self.collection,
                    hash,
                    doc.content,
                    metadata,
                    model,
                    embedding_to_bytes(embedding),
                    now
                ])?;
            }
        }
        tx.commit()?;

        tracing::info!("Added {} chunks to '{}'", added, self.collection);
        Ok(added)
    }

    fn collection_stats(&self) -> Result<CollectionStats> {
        let conn = self.conn()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM chunks WHERE collection = ?1",
            params![self.collection],
            |row| row.get(0),
        )?;

        Ok(CollectionStats {
            name: self.collection.clone(),
            count: count as usize,
        })
    }

    fn delete_collection(&self) -> Result<()> {
        let conn = self.conn()?;
        let rows = conn.execute(
            "DELETE FROM chunks WHERE collection = ?1",
            params![self.collection],
        )?;
        tracing::info!("Deleted {} chunks from '{}'", rows, self.collection);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::SOURCE_KEY;

    /// Embeds text as counts of a few legal keywords
    struct KeywordEmbedder;

    const KEYWORDS: [&str; 4] = ["contract", "tort", "estoppel", "statute"];

    #[async_trait]
    impl Embedder for KeywordEmbedder {
        async fn embed(&self, text: &str) -> Result<Vec<f32>> {
            let lower = text.to_lowercase();
            Ok(KEYWORDS
                .iter()
                .map(|k| lower.matches(k).count() as f32 + 0.01)
                .collect())
        }

        async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            let mut out = Vec::with_capacity(texts.len());
            for text in texts {
                out.push(self.embed(text).await?);
            }
            Ok(out)
        }

        fn dimensions(&self) -> usize {
            KEYWORDS.len()
        }

        fn model_name(&self) -> &str {
            "keywords"
        }
    }

    fn store(collection: &str) -> SqliteVectorStore {
        SqliteVectorStore::open_in_memory(collection, Arc::new(KeywordEmbedder)).unwrap()
    }

    fn corpus() -> Vec<Document> {
        vec![
            Document::new("A tort is a civil wrong. Negligence is a tort.")
                .with_metadata(SOURCE_KEY, "torts.txt"),
            Document::new("A contract requires offer, acceptance and consideration.")
                .with_metadata(SOURCE_KEY, "contracts.txt"),
            Document::new("Promissory estoppel enforces promises without consideration."),
        ]
    }

    #[tokio::test]
    async fn test_add_and_count() {
        let store = store("legal_documents");
        assert_eq!(store.add_documents(&corpus()).await.unwrap(), 3);

        let stats = store.collection_stats().unwrap();
        assert_eq!(stats.name, "legal_documents");
        assert_eq!(stats.count, 3);
    }

    #[tokio::test]
    async fn test_duplicate_chunks_are_skipped() {
        let store = store("legal_documents");
        store.add_documents(&corpus()).await.unwrap();
        assert_eq!(store.add_documents(&corpus()).await.unwrap(), 0);

        let twice = vec![Document::new("same text"), Document::new("same text")];
        assert_eq!(store.add_documents(&twice).await.unwrap(), 1);
        assert_eq!(store.collection_stats().unwrap().count, 4);
    }

    #[tokio::test]
    async fn test_search_orders_by_distance() {
        let store = store("legal_documents");
        store.add_documents(&corpus()).await.unwrap();

        let results = store
            .similarity_search_with_score("breach of contract", 3)
            .await
            .unwrap();
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].0.source(), "contracts.txt");
        assert!(results.windows(2).all(|w| w[0].1 <= w[1].1));
    }

    #[tokio::test]
    async fn test_search_respects_k_and_metadata() {
        let store = store("legal_documents");
        store.add_documents(&corpus()).await.unwrap();

        let results = store.similarity_search_with_score("tort", 1).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].0.source(), "torts.txt");

        let none = store.similarity_search_with_score("tort", 0).await.unwrap();
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn test_collections_are_isolated() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("nested").join("vectors.sqlite");

        let a = SqliteVectorStore::open(&path, "a", Arc::new(KeywordEmbedder)).unwrap();
        a.add_documents(&corpus()).await.unwrap();

        let b = SqliteVectorStore::open(&path, "b", Arc::new(KeywordEmbedder)).unwrap();
        assert_eq!(b.collection_stats().unwrap().count, 0);
        assert!(b
            .similarity_search_with_score("contract", 5)
            .await
            .unwrap()
            .is_empty());

        a.delete_collection().unwrap();
        assert_eq!(a.collection_stats().unwrap().count, 0);
    }
}
