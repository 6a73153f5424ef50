//! SQLite-backed document store.
//!
//! Chunks live in one table with their embedding as a little-endian f32
//! BLOB. An FTS5 table mirrors chunk text for BM25 ranking; vector scores
//! are computed in process and blended with it.

use super::scoring::{blend, cosine_similarity};
use super::{matches_criteria, VectorStore, HYBRID_ALPHA};
use crate::types::{Chunk, ChunkMetadata, DealCriteria};
use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{params, Connection};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use unicode_segmentation::UnicodeSegmentation;
use venturegraph_core::{AppError, AppResult};

/// Document store on a single SQLite database.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

struct StoredRow {
    chunk: Chunk,
    embedding: Vec<f32>,
}

impl SqliteStore {
    /// Open (or create) the database at `db_path`.
    pub fn open(db_path: &Path) -> AppResult<Self> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| AppError::Store(format!("Failed to create store directory: {}", e)))?;
        }

        let conn = Connection::open(db_path)
            .map_err(|e| AppError::Store(format!("Failed to open SQLite store: {}", e)))?;

        tracing::debug!("Opened SQLite store at {:?}", db_path);
        Self::init(conn)
    }

    /// Throwaway store for tests and dry runs.
    pub fn in_memory() -> AppResult<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| AppError::Store(format!("Failed to open in-memory store: {}", e)))?;
        Self::init(conn)
    }

    fn init(conn: Connection) -> AppResult<Self> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS chunks (
                id TEXT PRIMARY KEY,
                content TEXT NOT NULL,
                content_hash TEXT NOT NULL,
                file_name TEXT NOT NULL,
                page INTEGER,
                user_id TEXT,
                sector TEXT,
                stage TEXT,
                ticket_size REAL,
                embedding BLOB NOT NULL,
                created_at TEXT NOT NULL
            );

            CREATE UNIQUE INDEX IF NOT EXISTS idx_chunks_provenance
                ON chunks(file_name, IFNULL(page, 0), content_hash);
            CREATE INDEX IF NOT EXISTS idx_chunks_stage ON chunks(stage);

            CREATE VIRTUAL TABLE IF NOT EXISTS chunks_fts USING fts5(
                chunk_id UNINDEXED,
                content
            );
            "#,
        )
        .map_err(|e| AppError::Store(format!("Failed to create tables: {}", e)))?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> AppResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| AppError::Store("Store connection lock poisoned".to_string()))
    }

    /// Number of stored chunks.
    pub fn count(&self) -> AppResult<usize> {
        let conn = self.lock()?;
        conn.query_row("SELECT COUNT(*) FROM chunks", [], |row| row.get::<_, i64>(0))
            .map(|n| n as usize)
            .map_err(|e| AppError::Store(format!("Failed to count chunks: {}", e)))
    }

    /// Insert chunks, skipping content already stored for the same file
    /// and page. Returns the number of rows actually written.
    pub fn insert(&self, chunks: &[Chunk], vectors: &[Vec<f32>], file_name: &str) -> AppResult<usize> {
        if chunks.len() != vectors.len() {
            return Err(AppError::Store(format!(
                "Got {} chunks but {} vectors",
                chunks.len(),
                vectors.len()
            )));
        }
        if vectors.iter().any(Vec::is_empty) {
            return Err(AppError::Store("Refusing to store an empty vector".to_string()));
        }

        let mut conn = self.lock()?;
        let tx = conn
            .transaction()
            .map_err(|e| AppError::Store(format!("Failed to begin transaction: {}", e)))?;

        let created_at = Utc::now().to_rfc3339();
        let mut inserted = 0;
        {
            let mut stmt = tx
                .prepare(
                    "INSERT OR IGNORE INTO chunks
                     (id, content, content_hash, file_name, page, user_id, sector, stage,
                      ticket_size, embedding, created_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
                )
                .map_err(|e| AppError::Store(format!("Failed to prepare insert: {}", e)))?;
            let mut fts_stmt = tx
                .prepare("INSERT INTO chunks_fts (chunk_id, content) VALUES (?1, ?2)")
                .map_err(|e| AppError::Store(format!("Failed to prepare text index insert: {}", e)))?;

            for (chunk, vector) in chunks.iter().zip(vectors) {
                let sector = chunk
                    .metadata
                    .sector
                    .as_ref()
                    .map(serde_json::to_string)
                    .transpose()?;

                let written = stmt
                    .execute(params![
                        chunk.id,
                        chunk.content,
                        content_hash(&chunk.content),
                        file_name,
                        chunk.metadata.page.map(i64::from),
                        chunk.metadata.user_id,
                        sector,
                        chunk.metadata.stage,
                        chunk.metadata.ticket_size,
                        embedding_to_bytes(vector),
                        created_at,
                    ])
                    .map_err(|e| AppError::Store(format!("Failed to insert chunk: {}", e)))?;
                if written == 0 {
                    continue;
                }

                fts_stmt
                    .execute(params![chunk.id, chunk.content])
                    .map_err(|e| AppError::Store(format!("Failed to index chunk text: {}", e)))?;
                inserted += 1;
            }
        }

        tx.commit()
            .map_err(|e| AppError::Store(format!("Failed to commit chunks: {}", e)))?;

        if inserted < chunks.len() {
            tracing::debug!(
                "Skipped {} duplicate chunks for {}",
                chunks.len() - inserted,
                file_name
            );
        }

        Ok(inserted)
    }

    fn load_rows(&self) -> AppResult<Vec<StoredRow>> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare(
                "SELECT id, content, file_name, page, user_id, sector, stage, ticket_size, embedding
                 FROM chunks ORDER BY rowid",
            )
            .map_err(|e| AppError::Store(format!("Failed to prepare query: {}", e)))?;

        let raw = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, Option<i64>>(3)?,
                    row.get::<_, Option<String>>(4)?,
                    row.get::<_, Option<String>>(5)?,
                    row.get::<_, Option<String>>(6)?,
                    row.get::<_, Option<f64>>(7)?,
                    row.get::<_, Vec<u8>>(8)?,
                ))
            })
            .map_err(|e| AppError::Store(format!("Failed to query chunks: {}", e)))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| AppError::Store(format!("Failed to read chunk row: {}", e)))?;

        raw.into_iter()
            .map(
                |(id, content, file_name, page, user_id, sector, stage, ticket_size, blob)| -> AppResult<StoredRow> {
                    let sector = sector
                        .map(|json| serde_json::from_str::<Vec<String>>(&json))
                        .transpose()?;

                    Ok(StoredRow {
                        chunk: Chunk {
                            id,
                            content,
                            metadata: ChunkMetadata {
                                page: page.and_then(|p| u32::try_from(p).ok()),
                                file_name: Some(file_name),
                                user_id,
                                sector,
                                stage,
                                ticket_size,
                            },
                        },
                        embedding: bytes_to_embedding(&blob)?,
                    })
                },
            )
            .collect()
    }

    /// FTS5 BM25 relevance of every chunk matching any word of `query`,
    /// keyed by chunk id. Higher is more relevant; non-matching chunks are
    /// absent.
    pub fn lexical_scores(&self, query: &str) -> AppResult<HashMap<String, f32>> {
        let Some(expression) = fts_query(query) else {
            return Ok(HashMap::new());
        };

        let conn = self.lock()?;
        let mut stmt = conn
            .prepare("SELECT chunk_id, bm25(chunks_fts) FROM chunks_fts WHERE chunks_fts MATCH ?1")
            .map_err(|e| AppError::Store(format!("Failed to prepare text search: {}", e)))?;

        let scores = stmt
            .query_map(params![expression], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, f64>(1)?))
            })
            .map_err(|e| AppError::Store(format!("Failed to run text search: {}", e)))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| AppError::Store(format!("Failed to read text search row: {}", e)))?;

        // bm25() is negative, lower meaning better
        Ok(scores
            .into_iter()
            .map(|(id, score)| (id, -score as f32))
            .collect())
    }

    fn hybrid_search_sync(&self, query: &str, vector: &[f32], limit: usize) -> AppResult<Vec<Chunk>> {
        let rows = self.load_rows()?;
        if rows.is_empty() || limit == 0 {
            return Ok(Vec::new());
        }

        let mismatched = rows
            .iter()
            .filter(|r| r.embedding.len() != vector.len())
            .count();
        if mismatched > 0 {
            tracing::warn!(
                "{} stored vectors do not match query dimension {}",
                mismatched,
                vector.len()
            );
        }

        let vector_scores: Vec<f32> = rows
            .iter()
            .map(|r| cosine_similarity(vector, &r.embedding))
            .collect();
        let lexical = self.lexical_scores(query)?;
        let lexical_scores: Vec<f32> = rows
            .iter()
            .map(|r| lexical.get(&r.chunk.id).copied().unwrap_or(0.0))
            .collect();
        let combined = blend(&vector_scores, &lexical_scores, HYBRID_ALPHA);

        let mut scored: Vec<(f32, Chunk)> = combined
            .into_iter()
            .zip(rows.into_iter().map(|r| r.chunk))
            .collect();
        // Stable sort keeps insertion order among ties
        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(limit);

        tracing::debug!(
            "Hybrid search returned {} chunks (top score: {:.3})",
            scored.len(),
            scored.first().map(|(s, _)| *s).unwrap_or(0.0)
        );

        Ok(scored.into_iter().map(|(_, chunk)| chunk).collect())
    }

    fn criteria_search_sync(&self, criteria: &DealCriteria, limit: usize) -> AppResult<Vec<Chunk>> {
        let matched: Vec<Chunk> = self
            .load_rows()?
            .into_iter()
            .map(|r| r.chunk)
            .filter(|chunk| matches_criteria(&chunk.metadata, criteria))
            .take(limit)
            .collect();

        tracing::debug!("Criteria search matched {} chunks", matched.len());
        Ok(matched)
    }
}

#[async_trait]
impl VectorStore for SqliteStore {
    async fn hybrid_search(&self, query: &str, vector: &[f32], limit: usize) -> AppResult<Vec<Chunk>> {
        self.hybrid_search_sync(query, vector, limit)
    }

    async fn criteria_search(&self, criteria: &DealCriteria, limit: usize) -> AppResult<Vec<Chunk>> {
        self.criteria_search_sync(criteria, limit)
    }

    async fn store(&self, chunks: &[Chunk], vectors: &[Vec<f32>], file_name: &str) -> AppResult<usize> {
        self.insert(chunks, vectors, file_name)
    }
}

/// FTS5 expression matching any word of `query`, each quoted as a literal.
fn fts_query(query: &str) -> Option<String> {
    let terms: Vec<String> = query
        .unicode_words()
        .map(|word| format!("\"{}\"", word.replace('"', "\"\"")))
        .collect();

    if terms.is_empty() {
        None
    } else {
        Some(terms.join(" OR "))
    }
}

fn content_hash(content: &str) -> String {
    format!("{:x}", Sha256::digest(content.as_bytes()))
}

fn embedding_to_bytes(embedding: &[f32]) -> Vec<u8> {
    embedding.iter().flat_map(|v| v.to_le_bytes()).collect()
}

fn bytes_to_embedding(bytes: &[u8]) -> AppResult<Vec<f32>> {
    if bytes.len() % 4 != 0 {
        return Err(AppError::Store("Invalid embedding bytes length".to_string()));
    }

    Ok(bytes
        .chunks_exact(4)
        .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .collect())
}
