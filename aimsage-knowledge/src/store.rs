//! Vector index storage.
//!
//! [`VectorStore`] is the boundary the engine talks through; the production
//! implementation is [`SqliteVectorStore`], a local sqlite database with the
//! sqlite-vec extension providing `vec0` nearest-neighbor virtual tables
//! (cosine metric, reported score = 1 − distance, so identical vectors score
//! 1.0). Each named index gets its own pair of tables; a registry table pins
//! the index dimension for its lifetime.

use std::path::Path;
use std::sync::OnceLock;

use chrono::Utc;
use libsqlite3_sys::{SQLITE_OK, sqlite3, sqlite3_api_routines, sqlite3_auto_extension};
use sqlite_vec::sqlite3_vec_init;
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

use crate::errors::{KnowledgeError, KnowledgeResult};
use crate::models::ContentRecord;

/// A vector destined for an index: id + embedding + metadata.
///
/// Upserting an existing id overwrites both vector and metadata
/// (last-write-wins, no versioning).
#[derive(Debug, Clone)]
pub struct VectorRecord {
    pub id: String,
    pub embedding: Vec<f32>,
    pub metadata: ContentRecord,
}

/// One nearest-neighbor hit. Higher `score` means more similar.
#[derive(Debug, Clone)]
pub struct QueryHit {
    pub id: String,
    pub score: f32,
    pub metadata: ContentRecord,
}

/// Named vector index store.
#[allow(async_fn_in_trait)]
pub trait VectorStore {
    async fn list_indexes(&self) -> KnowledgeResult<Vec<String>>;
    /// Create `name` with the given dimension. No-op when it already exists
    /// with the same dimension; `EmbeddingDimMismatch` otherwise.
    async fn create_index(&self, name: &str, dimension: usize) -> KnowledgeResult<()>;
    /// Fails with `IndexNotFound` when the index is absent.
    async fn delete_index(&self, name: &str) -> KnowledgeResult<()>;
    async fn upsert(&self, name: &str, records: Vec<VectorRecord>) -> KnowledgeResult<()>;
    /// Top-`top_k` nearest neighbors of `vector`, most similar first.
    async fn query(&self, name: &str, vector: &[f32], top_k: usize)
    -> KnowledgeResult<Vec<QueryHit>>;
}

static SQLITE_VEC_INIT_RC: OnceLock<i32> = OnceLock::new();

#[derive(Debug, Clone)]
pub struct SqliteVectorStore {
    pool: SqlitePool,
}

impl SqliteVectorStore {
    pub async fn open(db_path: &Path) -> KnowledgeResult<Self> {
        init_sqlite_vec_once()?;
        if let Some(parent) = db_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let options = SqliteConnectOptions::new()
            .filename(db_path)
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(8)
            .after_connect(move |conn, _meta| {
                Box::pin(async move {
                    sqlx::query("PRAGMA journal_mode = WAL")
                        .execute(&mut *conn)
                        .await?;
                    sqlx::query("PRAGMA synchronous = NORMAL")
                        .execute(&mut *conn)
                        .await?;
                    sqlx::query("PRAGMA cache_size = -64000")
                        .execute(&mut *conn)
                        .await?;
                    Ok(())
                })
            })
            .connect_with(options)
            .await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS vector_indexes (name TEXT PRIMARY KEY, dimension INTEGER NOT NULL)",
        )
        .execute(&pool)
        .await?;

        Ok(Self { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Registered dimension of `name`, or `IndexNotFound`.
    async fn dimension_of(&self, name: &str) -> KnowledgeResult<usize> {
        let row: Option<(i64,)> =
            sqlx::query_as("SELECT dimension FROM vector_indexes WHERE name = ? LIMIT 1")
                .bind(name)
                .fetch_optional(&self.pool)
                .await?;
        row.map(|(dim,)| dim as usize)
            .ok_or_else(|| KnowledgeError::IndexNotFound(name.to_string()))
    }
}

impl VectorStore for SqliteVectorStore {
    async fn list_indexes(&self) -> KnowledgeResult<Vec<String>> {
        let rows: Vec<(String,)> =
            sqlx::query_as("SELECT name FROM vector_indexes ORDER BY name")
                .fetch_all(&self.pool)
                .await?;
        Ok(rows.into_iter().map(|(name,)| name).collect())
    }

    async fn create_index(&self, name: &str, dimension: usize) -> KnowledgeResult<()> {
        let existing: Option<(i64,)> =
            sqlx::query_as("SELECT dimension FROM vector_indexes WHERE name = ? LIMIT 1")
                .bind(name)
                .fetch_optional(&self.pool)
                .await?;
        if let Some((dim,)) = existing {
            if dim as usize != dimension {
                return Err(KnowledgeError::EmbeddingDimMismatch {
                    expected: dim as usize,
                    actual: dimension,
                });
            }
            return Ok(());
        }

        let vec_table = table_ident(name, "vec")?;
        let meta_table = table_ident(name, "meta")?;
        sqlx::query(&format!(
            "CREATE VIRTUAL TABLE IF NOT EXISTS {vec_table} USING vec0(embedding float[{dimension}] distance_metric=cosine)"
        ))
        .execute(&self.pool)
        .await?;
        sqlx::query(&format!(
            "CREATE TABLE IF NOT EXISTS {meta_table} (id TEXT PRIMARY KEY, metadata TEXT NOT NULL, updated_at TEXT NOT NULL)"
        ))
        .execute(&self.pool)
        .await?;
        sqlx::query("INSERT OR REPLACE INTO vector_indexes (name, dimension) VALUES (?, ?)")
            .bind(name)
            .bind(dimension as i64)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn delete_index(&self, name: &str) -> KnowledgeResult<()> {
        self.dimension_of(name).await?;

        sqlx::query(&format!("DROP TABLE IF EXISTS {}", table_ident(name, "vec")?))
            .execute(&self.pool)
            .await?;
        sqlx::query(&format!("DROP TABLE IF EXISTS {}", table_ident(name, "meta")?))
            .execute(&self.pool)
            .await?;
        sqlx::query("DELETE FROM vector_indexes WHERE name = ?")
            .bind(name)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn upsert(&self, name: &str, records: Vec<VectorRecord>) -> KnowledgeResult<()> {
        let dimension = self.dimension_of(name).await?;
        let vec_table = table_ident(name, "vec")?;
        let meta_table = table_ident(name, "meta")?;

        for record in records {
            if record.embedding.len() != dimension {
                return Err(KnowledgeError::EmbeddingDimMismatch {
                    expected: dimension,
                    actual: record.embedding.len(),
                });
            }

            let metadata = serde_json::to_string(&record.metadata)?;
            let payload = serde_json::to_string(&record.embedding)?;

            // Both writes commit together so a query never sees metadata
            // paired with a stale vector. ON CONFLICT UPDATE keeps the rowid
            // stable so the vec row overwrites instead of orphaning.
            let mut tx = self.pool.begin().await?;
            sqlx::query(&format!(
                "INSERT INTO {meta_table} (id, metadata, updated_at) VALUES (?, ?, ?)
                 ON CONFLICT(id) DO UPDATE SET metadata = excluded.metadata, updated_at = excluded.updated_at"
            ))
            .bind(&record.id)
            .bind(&metadata)
            .bind(Utc::now().to_rfc3339())
            .execute(&mut *tx)
            .await?;

            let (rowid,): (i64,) =
                sqlx::query_as(&format!("SELECT rowid FROM {meta_table} WHERE id = ? LIMIT 1"))
                    .bind(&record.id)
                    .fetch_one(&mut *tx)
                    .await?;

            sqlx::query(&format!(
                "INSERT OR REPLACE INTO {vec_table}(rowid, embedding) VALUES (?, ?)"
            ))
            .bind(rowid)
            .bind(payload)
            .execute(&mut *tx)
            .await?;
            tx.commit().await?;
        }

        Ok(())
    }

    async fn query(
        &self,
        name: &str,
        vector: &[f32],
        top_k: usize,
    ) -> KnowledgeResult<Vec<QueryHit>> {
        let dimension = self.dimension_of(name).await?;
        if vector.len() != dimension {
            return Err(KnowledgeError::EmbeddingDimMismatch {
                expected: dimension,
                actual: vector.len(),
            });
        }
        if top_k == 0 {
            return Ok(Vec::new());
        }

        let vec_table = table_ident(name, "vec")?;
        let meta_table = table_ident(name, "meta")?;
        let payload = serde_json::to_string(vector)?;

        // KNN subquery first so the LIMIT reaches the vec0 scan.
        let sql = format!(
            "SELECT m.id, k.distance, m.metadata
             FROM (SELECT rowid, distance FROM {vec_table} WHERE embedding MATCH ? ORDER BY distance LIMIT ?) k
             JOIN {meta_table} m ON m.rowid = k.rowid
             ORDER BY k.distance ASC"
        );
        let rows: Vec<(String, f64, String)> = sqlx::query_as(&sql)
            .bind(payload)
            .bind(top_k as i64)
            .fetch_all(&self.pool)
            .await?;

        let mut hits = Vec::with_capacity(rows.len());
        for (id, distance, metadata) in rows {
            hits.push(QueryHit {
                id,
                score: 1.0 - distance as f32,
                metadata: serde_json::from_str(&metadata)?,
            });
        }
        Ok(hits)
    }
}

fn init_sqlite_vec_once() -> KnowledgeResult<()> {
    let rc = *SQLITE_VEC_INIT_RC.get_or_init(|| unsafe {
        type SqliteVecInitFn =
            unsafe extern "C" fn(*mut sqlite3, *mut *mut i8, *const sqlite3_api_routines) -> i32;

        sqlite3_auto_extension(Some(std::mem::transmute::<*const (), SqliteVecInitFn>(
            sqlite3_vec_init as *const (),
        )))
    });

    if rc == SQLITE_OK {
        Ok(())
    } else {
        Err(KnowledgeError::SqliteVec(format!(
            "sqlite-vec init failed with code {rc}"
        )))
    }
}

/// Derive a safe SQL table identifier from an index name. Names are limited
/// to ASCII alphanumerics, `_` and `-`, starting with a letter.
fn table_ident(name: &str, suffix: &str) -> KnowledgeResult<String> {
    let valid = name.chars().next().is_some_and(|c| c.is_ascii_alphabetic())
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if !valid {
        return Err(KnowledgeError::InvalidIndexName(name.to_string()));
    }
    Ok(format!("idx_{}_{}", name.replace('-', "_"), suffix))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_ident_maps_dashes() {
        assert_eq!(
            table_ident("aim-training-content", "vec").unwrap(),
            "idx_aim_training_content_vec"
        );
    }

    #[test]
    fn table_ident_rejects_injection_attempts() {
        assert!(table_ident("x; DROP TABLE notes", "vec").is_err());
        assert!(table_ident("", "vec").is_err());
        assert!(table_ident("1starts-with-digit", "vec").is_err());
    }
}
