//! SQLite-backed torrent catalog implementation.

use std::path::Path;
use std::sync::Mutex;

use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Statement};
use tracing::{debug, info, warn};

use super::csv::ingest_csv;
use super::{CatalogError, InsertReport, NameFilter, RowError, TorrentCatalog, TorrentRecord};

const INSERT_SQL: &str = "INSERT OR IGNORE INTO torrents
    (infohash, name, size_bytes, created_unix, seeders, leechers, completed, scraped_date, published)
    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)";

const SELECT_COLUMNS: &str = "SELECT infohash, name, size_bytes, created_unix, seeders, leechers,
    completed, scraped_date, published FROM torrents";

/// SQLite-backed torrent catalog.
pub struct SqliteCatalog {
    /// `None` once closed.
    conn: Mutex<Option<Connection>>,
}

impl SqliteCatalog {
    /// Open (or create) the catalog database at `path` and make sure the
    /// schema exists.
    pub fn open(path: &Path) -> Result<Self, CatalogError> {
        let unavailable =
            |e: rusqlite::Error| CatalogError::StorageUnavailable(format!("{}: {}", path.display(), e));

        let conn = Connection::open(path).map_err(unavailable)?;
        Self::initialize_schema(&conn).map_err(unavailable)?;
        debug!(path = %path.display(), "Catalog database opened");

        Ok(Self {
            conn: Mutex::new(Some(conn)),
        })
    }

    /// Create an in-memory SQLite catalog (useful for testing).
    pub fn in_memory() -> Result<Self, CatalogError> {
        let unavailable = |e: rusqlite::Error| CatalogError::StorageUnavailable(e.to_string());

        let conn = Connection::open_in_memory().map_err(unavailable)?;
        Self::initialize_schema(&conn).map_err(unavailable)?;
        Ok(Self {
            conn: Mutex::new(Some(conn)),
        })
    }

    fn initialize_schema(conn: &Connection) -> rusqlite::Result<()> {
        conn.execute_batch(
            r#"
            -- One row per unique info hash; later rows with a known hash are ignored
            CREATE TABLE IF NOT EXISTS torrents (
                infohash TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                size_bytes INTEGER NOT NULL CHECK (size_bytes >= 0),
                created_unix INTEGER NOT NULL,
                seeders INTEGER NOT NULL CHECK (seeders >= 0),
                leechers INTEGER NOT NULL CHECK (leechers >= 0),
                completed INTEGER NOT NULL CHECK (completed >= 0),
                scraped_date TEXT NOT NULL,
                published TEXT NOT NULL
            );
            "#,
        )
    }

    /// Run `f` against the open connection.
    fn with_conn<T>(
        &self,
        f: impl FnOnce(&mut Connection) -> Result<T, CatalogError>,
    ) -> Result<T, CatalogError> {
        let mut guard = self
            .conn
            .lock()
            .map_err(|_| CatalogError::Database("connection lock poisoned".to_string()))?;
        let conn = guard.as_mut().ok_or(CatalogError::Closed)?;
        f(conn)
    }

    fn insert_record(stmt: &mut Statement<'_>, record: &TorrentRecord) -> Result<bool, CatalogError> {
        // `INSERT OR IGNORE` would swallow the CHECK failure of a wrapped value.
        let as_integer = |field: &'static str, value: u64| {
            i64::try_from(value).map_err(|_| {
                CatalogError::invalid_record(record, RowError::OutOfRange { field, value })
            })
        };
        let size_bytes = as_integer("size_bytes", record.size_bytes)?;
        let completed = as_integer("completed", record.completed)?;

        let changed = stmt
            .execute(params![
                &record.infohash,
                &record.name,
                size_bytes,
                record.created_unix,
                record.seeders,
                record.leechers,
                completed,
                &record.scraped_date,
                &record.published,
            ])
            .map_err(|e| {
                CatalogError::Database(format!("insert of {} failed: {}", record.infohash, e))
            })?;
        Ok(changed > 0)
    }

    fn row_to_record(row: &rusqlite::Row) -> rusqlite::Result<TorrentRecord> {
        Ok(TorrentRecord {
            infohash: row.get(0)?,
            name: row.get(1)?,
            size_bytes: row.get(2)?,
            created_unix: row.get(3)?,
            seeders: row.get(4)?,
            leechers: row.get(5)?,
            completed: row.get(6)?,
            scraped_date: row.get(7)?,
            published: row.get(8)?,
        })
    }
}

/// Escape LIKE wildcards so a term only ever matches literally.
fn like_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

fn db_err(e: rusqlite::Error) -> CatalogError {
    CatalogError::Database(e.to_string())
}

impl TorrentCatalog for SqliteCatalog {
    fn engine(&self) -> &'static str {
        "sqlite"
    }

    fn bulk_insert(&self, csv_path: &Path) -> Result<InsertReport, CatalogError> {
        self.with_conn(|conn| {
            let tx = conn.transaction().map_err(db_err)?;
            let report = {
                let mut stmt = tx.prepare(INSERT_SQL).map_err(db_err)?;
                ingest_csv(csv_path, |record| Self::insert_record(&mut stmt, record))?
            };
            // Dropping `tx` on an early return above rolls everything back.
            tx.commit().map_err(db_err)?;

            info!(
                csv = %csv_path.display(),
                attempted = report.attempted,
                inserted = report.inserted,
                ignored = report.ignored,
                rejected = report.rejected,
                "Bulk insert committed"
            );
            Ok(report)
        })
    }

    fn insert(&self, records: &[TorrentRecord]) -> Result<u64, CatalogError> {
        self.with_conn(|conn| {
            let tx = conn.transaction().map_err(db_err)?;
            let mut new_count = 0;
            {
                let mut stmt = tx.prepare(INSERT_SQL).map_err(db_err)?;
                for record in records {
                    if Self::insert_record(&mut stmt, record)? {
                        new_count += 1;
                    }
                }
            }
            tx.commit().map_err(db_err)?;
            Ok(new_count)
        })
    }

    fn find_by_name(&self, filter: &NameFilter) -> Result<Vec<TorrentRecord>, CatalogError> {
        if filter.terms.is_empty() {
            return Ok(Vec::new());
        }

        // Only placeholders are formatted into the SQL; terms are bound.
        let clauses: Vec<String> = (1..=filter.terms.len())
            .map(|n| {
                if filter.case_sensitive {
                    format!("instr(name, ?{n}) > 0")
                } else {
                    format!("LOWER(name) LIKE LOWER(?{n}) ESCAPE '\\'")
                }
            })
            .collect();
        let sql = format!(
            "{} WHERE {} ORDER BY rowid",
            SELECT_COLUMNS,
            clauses.join(" AND ")
        );

        let bound: Vec<String> = filter
            .terms
            .iter()
            .map(|term| {
                if filter.case_sensitive {
                    term.clone()
                } else {
                    like_pattern(term)
                }
            })
            .collect();

        self.with_conn(|conn| {
            let query_err = |e: rusqlite::Error| CatalogError::Query(e.to_string());

            let mut stmt = conn.prepare_cached(&sql).map_err(query_err)?;
            let rows = stmt
                .query_map(params_from_iter(bound.iter()), Self::row_to_record)
                .map_err(query_err)?;

            let mut results = Vec::new();
            for row in rows {
                results.push(row.map_err(query_err)?);
            }
            Ok(results)
        })
    }

    fn get(&self, infohash: &str) -> Result<Option<TorrentRecord>, CatalogError> {
        self.with_conn(|conn| {
            conn.query_row(
                &format!("{} WHERE infohash = ?1", SELECT_COLUMNS),
                params![infohash],
                Self::row_to_record,
            )
            .optional()
            .map_err(db_err)
        })
    }

    fn count(&self) -> Result<u64, CatalogError> {
        self.with_conn(|conn| {
            conn.query_row("SELECT COUNT(*) FROM torrents", [], |row| row.get(0))
                .map_err(db_err)
        })
    }

    fn close(&self) {
        let mut guard = self.conn.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(conn) = guard.take() {
            match conn.close() {
                Ok(()) => debug!("Catalog database closed"),
                Err((_, e)) => warn!(error = %e, "Catalog database did not close cleanly"),
            }
        }
    }

    fn is_closed(&self) -> bool {
        self.conn
            .lock()
            .map(|guard| guard.is_none())
            .unwrap_or(true)
    }
}
