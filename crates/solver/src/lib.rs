//! A key/phrase lookup keyed by tripcode ciphertext, backed by a read-only
//! SQLite database produced by an external reverse-lookup generator (out of
//! scope for this crate — see spec §1).
//!
//! Two variants of the same `Solver` trait exist in practice, distinguished
//! only by which database file they were opened against: public (DES-derived)
//! and secure (SHA1-derived).

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use rusqlite::{Connection, OpenFlags};
use tracing::debug;

use tripcracker_core::{Cipher, CrawlError};

#[async_trait]
pub trait Solver: Send + Sync {
    /// Returns the phrase that produces `cipher`, or `None` if unknown.
    async fn solve(&self, cipher: &Cipher) -> Result<Option<String>, CrawlError>;
}

/// Opens an indexed `cipher -> phrase` table read-only. Lookups are pushed to
/// a blocking task since `rusqlite` is synchronous and pool workers must not
/// block while holding their async context.
pub struct SqliteSolver {
    conn: Arc<std::sync::Mutex<Connection>>,
}

impl SqliteSolver {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, CrawlError> {
        let conn = Connection::open_with_flags(path.as_ref(), OpenFlags::SQLITE_OPEN_READ_ONLY)
            .map_err(|e| CrawlError::Storage(format!("opening {:?}: {e}", path.as_ref())))?;
        Ok(Self {
            conn: Arc::new(std::sync::Mutex::new(conn)),
        })
    }

    /// Creates the schema this crate expects and opens it read-write. Used by
    /// tests and by the offline tooling that builds these databases.
    #[cfg(any(test, feature = "build-schema"))]
    pub fn create(path: impl AsRef<Path>) -> Result<Self, CrawlError> {
        let conn = Connection::open(path.as_ref())
            .map_err(|e| CrawlError::Storage(format!("creating {:?}: {e}", path.as_ref())))?;
        conn.execute(
            "CREATE TABLE IF NOT EXISTS tripcodes (cipher TEXT PRIMARY KEY, phrase TEXT NOT NULL)",
            [],
        )
        .map_err(|e| CrawlError::Storage(e.to_string()))?;
        Ok(Self {
            conn: Arc::new(std::sync::Mutex::new(conn)),
        })
    }

    #[cfg(any(test, feature = "build-schema"))]
    pub fn insert(&self, cipher: &str, phrase: &str) -> Result<(), CrawlError> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT OR REPLACE INTO tripcodes (cipher, phrase) VALUES (?1, ?2)",
            rusqlite::params![cipher, phrase],
        )
        .map_err(|e| CrawlError::Storage(e.to_string()))?;
        Ok(())
    }
}

#[async_trait]
impl Solver for SqliteSolver {
    async fn solve(&self, cipher: &Cipher) -> Result<Option<String>, CrawlError> {
        let conn = self.conn.clone();
        let cipher = cipher.0.clone();
        let phrase = tokio::task::spawn_blocking(move || {
            let conn = conn.lock().unwrap();
            conn.query_row(
                "SELECT phrase FROM tripcodes WHERE cipher = ?1",
                [&cipher],
                |row| row.get::<_, String>(0),
            )
        })
        .await
        .map_err(|e| CrawlError::Other(e.into()))?;

        match phrase {
            Ok(phrase) => {
                debug!(cipher = %cipher, "solved");
                Ok(Some(phrase))
            }
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(CrawlError::Storage(e.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn finds_a_known_cipher() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("public.db3");
        let solver = SqliteSolver::create(&path).unwrap();
        solver.insert("ABCDEFGHIJ", "secret").unwrap();

        let opened = SqliteSolver::open(&path).unwrap();
        let result = opened
            .solve(&Cipher("ABCDEFGHIJ".to_string()))
            .await
            .unwrap();
        assert_eq!(result, Some("secret".to_string()));
    }

    #[tokio::test]
    async fn unknown_cipher_returns_none() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("public.db3");
        SqliteSolver::create(&path).unwrap();

        let opened = SqliteSolver::open(&path).unwrap();
        let result = opened
            .solve(&Cipher("ZZZZZZZZZZ".to_string()))
            .await
            .unwrap();
        assert_eq!(result, None);
    }
}
