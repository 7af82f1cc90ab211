use crate::constants::constants;
use crate::error::StoreError;
use crate::query;
use crate::record::{LinkFields, LinkRecord};
use log::debug;
use rusqlite::{params, Connection, OptionalExtension, TransactionBehavior};
use std::path::Path;
use std::time::Duration;

/// Tuning knobs applied when the store is opened
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StoreOptions {
    pub busy_timeout: Duration,
    pub shortcut_weight: f64,
    pub query_limit: Option<u32>,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            busy_timeout: Duration::from_millis(constants::DEFAULT_BUSY_TIMEOUT_MS),
            shortcut_weight: constants::DEFAULT_SHORTCUT_WEIGHT,
            query_limit: None,
        }
    }
}

pub struct LinkStore {
    conn: Connection,
    options: StoreOptions,
}

impl LinkStore {
    /// Open (creating if needed) the store file and make sure the link table exists
    pub fn open(path: &Path, options: StoreOptions) -> Result<Self, StoreError> {
        let conn = Connection::open(path).map_err(|source| StoreError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        conn.busy_timeout(options.busy_timeout)
            .map_err(|source| StoreError::BusyTimeout {
                path: path.to_path_buf(),
                source,
            })?;
        debug!("Opened store at {}", path.display());

        let store = Self { conn, options };
        store.ensure_schema()?;
        Ok(store)
    }

    fn ensure_schema(&self) -> Result<(), StoreError> {
        // Column order is part of the file format shared with older stores.
        self.conn
            .execute_batch(&format!(
                "CREATE VIRTUAL TABLE IF NOT EXISTS {} USING fts5(text, link, title, shortcut);
                 CREATE TABLE IF NOT EXISTS {} (key TEXT PRIMARY KEY, value INTEGER NOT NULL);",
                constants::TABLE_NAME,
                constants::META_TABLE_NAME
            ))
            .map_err(StoreError::Schema)
    }

    pub fn count(&self) -> Result<i64, StoreError> {
        let sql = format!("SELECT count(*) FROM {}", constants::TABLE_NAME);
        let mut stmt = self
            .conn
            .prepare(&sql)
            .map_err(|source| StoreError::Prepare { op: "count", source })?;
        stmt.query_row([], |row| row.get(0))
            .map_err(|source| StoreError::Scan { op: "count", source })
    }

    /// Add a link under a fresh id. Ids are never reused, even after the
    /// highest one is deleted: the id is one past the larger of the recorded
    /// high-water mark and the current maximum rowid.
    pub fn insert(&mut self, fields: &LinkFields) -> Result<LinkRecord, StoreError> {
        // Take the write lock up front so two invocations cannot pick the same id.
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(|source| StoreError::Execute { op: "insert", source })?;

        let last_id: i64 = tx
            .query_row(
                &format!(
                    "SELECT max(
                        coalesce((SELECT value FROM {meta} WHERE key = ?1), 0),
                        coalesce((SELECT rowid FROM {table} ORDER BY rowid DESC LIMIT 1), 0)
                     )",
                    meta = constants::META_TABLE_NAME,
                    table = constants::TABLE_NAME
                ),
                params![constants::LAST_ID_KEY],
                |row| row.get(0),
            )
            .map_err(|source| StoreError::Scan { op: "insert", source })?;
        let id = last_id + 1;

        tx.execute(
            &format!(
                "INSERT INTO {} (rowid, text, link, title, shortcut) VALUES (?1, ?2, ?3, ?4, ?5)",
                constants::TABLE_NAME
            ),
            params![id, fields.text, fields.link, fields.title, fields.shortcut],
        )
        .map_err(|source| StoreError::Execute { op: "insert", source })?;
        tx.execute(
            &format!(
                "INSERT INTO {} (key, value) VALUES (?1, ?2)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value",
                constants::META_TABLE_NAME
            ),
            params![constants::LAST_ID_KEY, id],
        )
        .map_err(|source| StoreError::Execute { op: "insert", source })?;

        tx.commit()
            .map_err(|source| StoreError::Execute { op: "insert", source })?;
        debug!("Inserted link {}", id);

        Ok(LinkRecord::new(id, fields.clone()))
    }

    /// Ranked full-text search; exact shortcut hits come first
    pub fn search(&self, term: &str) -> Result<Vec<LinkRecord>, StoreError> {
        let Some(expression) = query::match_expression(term) else {
            debug!("Blank search term, skipping index");
            return Ok(vec![]);
        };
        debug!("Search expression: {}", expression);

        let mut stmt = self
            .conn
            .prepare(&query::search_sql())
            .map_err(|source| StoreError::Prepare { op: "query", source })?;

        let limit = self.options.query_limit.map_or(-1, i64::from);
        let results = stmt
            .query_map(
                params![expression, self.options.shortcut_weight, limit],
                row_to_record,
            )
            .map_err(|source| StoreError::Execute { op: "query", source })?
            .collect::<Result<Vec<_>, _>>()
            .map_err(|source| StoreError::Scan { op: "query", source })?;

        debug!("Search returned {} rows", results.len());
        Ok(results)
    }

    pub fn get(&self, id: i64) -> Result<Option<LinkRecord>, StoreError> {
        let mut stmt = self
            .conn
            .prepare(&format!(
                "SELECT rowid, text, link, title, shortcut FROM {} WHERE rowid = ?1",
                constants::TABLE_NAME
            ))
            .map_err(|source| StoreError::Prepare { op: "get", source })?;
        stmt.query_row(params![id], row_to_record)
            .optional()
            .map_err(|source| StoreError::Scan { op: "get", source })
    }

    /// Overwrite all four fields of a link. Returns the number of rows changed (0 or 1).
    pub fn update(&self, id: i64, fields: &LinkFields) -> Result<usize, StoreError> {
        let mut stmt = self
            .conn
            .prepare(&format!(
                "UPDATE {} SET text = ?1, link = ?2, title = ?3, shortcut = ?4 WHERE rowid = ?5",
                constants::TABLE_NAME
            ))
            .map_err(|source| StoreError::Prepare { op: "update", source })?;
        let changed = stmt
            .execute(params![
                fields.text,
                fields.link,
                fields.title,
                fields.shortcut,
                id
            ])
            .map_err(|source| StoreError::Execute { op: "update", source })?;
        debug!("Updated link {} ({} rows)", id, changed);
        Ok(changed)
    }

    /// Remove a link. Returns the number of rows removed (0 or 1).
    pub fn delete(&self, id: i64) -> Result<usize, StoreError> {
        let mut stmt = self
            .conn
            .prepare(&format!(
                "DELETE FROM {} WHERE rowid = ?1",
                constants::TABLE_NAME
            ))
            .map_err(|source| StoreError::Prepare { op: "delete", source })?;
        let changed = stmt
            .execute(params![id])
            .map_err(|source| StoreError::Execute { op: "delete", source })?;
        debug!("Deleted link {} ({} rows)", id, changed);
        Ok(changed)
    }

    /// Release the store, reporting any error the connection hits while closing
    pub fn close(self) -> Result<(), StoreError> {
        self.conn
            .close()
            .map_err(|(_conn, source)| StoreError::Close(source))
    }
}

fn row_to_record(row: &rusqlite::Row<'_>) -> rusqlite::Result<LinkRecord> {
    Ok(LinkRecord::new(
        row.get(0)?,
        LinkFields {
            text: row.get(1)?,
            link: row.get(2)?,
            title: row.get(3)?,
            shortcut: row.get(4)?,
        },
    ))
}
