//! Document repository for CRUD operations

use chrono::{DateTime, Utc};

use super::{DbConn, DbPool};
use crate::{Error, Result};

/// An imported document with its raw bytes
#[derive(Debug, Clone)]
pub struct Document {
    /// Creation timestamp in milliseconds, unique
    pub id: i64,
    pub title: String,
    pub data: Vec<u8>,
    pub total_pages: u32,
    /// 1-based reading position
    pub current_page: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A library listing row, payload omitted
#[derive(Debug, Clone)]
pub struct DocumentInfo {
    pub id: i64,
    pub title: String,
    pub total_pages: u32,
    pub current_page: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Document repository
#[derive(Clone)]
pub struct DocumentRepo {
    pool: DbPool,
}

impl DocumentRepo {
    /// Create a new document repository
    #[must_use]
    #[allow(clippy::missing_const_for_fn)]
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn conn(&self) -> Result<DbConn> {
        Ok(self.pool.get()?)
    }

    /// Import a document, opened at page 1
    ///
    /// Ids are creation timestamps; an import landing in an already-used
    /// millisecond takes the next free id instead.
    ///
    /// # Errors
    ///
    /// Returns error if the database operation fails
    pub fn add(&self, title: &str, data: &[u8], total_pages: u32) -> Result<Document> {
        let conn = self.conn()?;

        let now = Utc::now();
        let base = now.timestamp_millis();
        let max_id: Option<i64> = conn.query_row("SELECT MAX(id) FROM documents", [], |row| row.get(0))?;
        let id = max_id.map_or(base, |max| base.max(max + 1));

        let now_str = now.to_rfc3339();
        conn.execute(
            "INSERT INTO documents (id, title, data, total_pages, current_page, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, 1, ?5, ?5)",
            rusqlite::params![id, title, data, total_pages, &now_str],
        )?;

        tracing::info!(id, title, total_pages, bytes = data.len(), "document imported");
        Ok(Document {
            id,
            title: title.to_string(),
            data: data.to_vec(),
            total_pages,
            current_page: 1,
            created_at: now,
            updated_at: now,
        })
    }

    /// Load a document with its bytes
    ///
    /// # Errors
    ///
    /// Returns error if the document does not exist or the database operation fails
    pub fn get(&self, id: i64) -> Result<Document> {
        let conn = self.conn()?;

        conn.query_row(
            "SELECT id, title, data, total_pages, current_page, created_at, updated_at
             FROM documents WHERE id = ?1",
            [id],
            |row| {
                Ok(Document {
                    id: row.get(0)?,
                    title: row.get(1)?,
                    data: row.get(2)?,
                    total_pages: row.get(3)?,
                    current_page: row.get(4)?,
                    created_at: parse_datetime(&row.get::<_, String>(5)?),
                    updated_at: parse_datetime(&row.get::<_, String>(6)?),
                })
            },
        )
        .map_err(|e| match e {
            rusqlite::Error::QueryReturnedNoRows => {
                Error::NotFound(format!("document {id} not in library"))
            }
            other => other.into(),
        })
    }

    /// List the library, most recently read first
    ///
    /// # Errors
    ///
    /// Returns error if the database operation fails
    pub fn list(&self) -> Result<Vec<DocumentInfo>> {
        let conn = self.conn()?;

        let mut stmt = conn.prepare(
            "SELECT id, title, total_pages, current_page, created_at, updated_at
             FROM documents ORDER BY updated_at DESC, id DESC",
        )?;

        let documents = stmt
            .query_map([], |row| {
                Ok(DocumentInfo {
                    id: row.get(0)?,
                    title: row.get(1)?,
                    total_pages: row.get(2)?,
                    current_page: row.get(3)?,
                    created_at: parse_datetime(&row.get::<_, String>(4)?),
                    updated_at: parse_datetime(&row.get::<_, String>(5)?),
                })
            })?
            .filter_map(std::result::Result::ok)
            .collect();

        Ok(documents)
    }

    /// Persist the reading position, bumping the recency ordering
    ///
    /// # Errors
    ///
    /// Returns error if the document does not exist or the database operation fails
    pub fn set_current_page(&self, id: i64, page: u32) -> Result<()> {
        let conn = self.conn()?;

        let now_str = Utc::now().to_rfc3339();
        let changed = conn.execute(
            "UPDATE documents SET current_page = ?1, updated_at = ?2 WHERE id = ?3",
            rusqlite::params![page, &now_str, id],
        )?;

        if changed == 0 {
            return Err(Error::NotFound(format!("document {id} not in library")));
        }
        tracing::debug!(id, page, "reading position saved");
        Ok(())
    }

    /// Delete a document
    ///
    /// # Errors
    ///
    /// Returns error if the document does not exist or the database operation fails
    pub fn remove(&self, id: i64) -> Result<()> {
        let conn = self.conn()?;

        let changed = conn.execute("DELETE FROM documents WHERE id = ?1", [id])?;
        if changed == 0 {
            return Err(Error::NotFound(format!("document {id} not in library")));
        }
        tracing::info!(id, "document removed");
        Ok(())
    }
}

fn parse_datetime(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s).map_or_else(|_| Utc::now(), |dt| dt.with_timezone(&Utc))
}
