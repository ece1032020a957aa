//! CSV snapshot reader shared by the catalog engines.
//!
//! Rows are parsed one at a time and handed to the engine's insert closure,
//! so the whole file is never held in memory. Invalid rows are rejected and
//! reported without stopping the load.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::str::FromStr;

use csv::{ReaderBuilder, StringRecord};
use tracing::{debug, warn};

use super::{CatalogError, InsertReport, RowError, RowRejection, TorrentRecord};

/// Column names the snapshot header must contain (any order).
pub const CSV_FIELDS: [&str; 9] = [
    "infohash",
    "name",
    "size_bytes",
    "created_unix",
    "seeders",
    "leechers",
    "completed",
    "scraped_date",
    "published",
];

/// Position of each field of [`CSV_FIELDS`] in the file.
#[derive(Debug, Clone, Copy)]
struct ColumnMap([usize; 9]);

impl ColumnMap {
    fn from_headers(headers: &StringRecord) -> Result<Self, CatalogError> {
        let mut positions: [Option<usize>; 9] = [None; 9];
        let mut extra = Vec::new();

        for (column, header) in headers.iter().enumerate() {
            let header = header.trim();
            match CSV_FIELDS.iter().position(|field| *field == header) {
                Some(slot) if positions[slot].is_none() => positions[slot] = Some(column),
                Some(_) => warn!(column = header, "Duplicate CSV column, using the first one"),
                None => extra.push(header.to_string()),
            }
        }

        let missing: Vec<&str> = CSV_FIELDS
            .iter()
            .zip(positions.iter())
            .filter(|(_, pos)| pos.is_none())
            .map(|(field, _)| *field)
            .collect();
        if !missing.is_empty() {
            return Err(CatalogError::InvalidCsv(format!(
                "header is missing field(s): {}",
                missing.join(", ")
            )));
        }

        if !extra.is_empty() {
            warn!(columns = ?extra, "Ignoring unknown CSV columns");
        }

        let mut map = [0usize; 9];
        for (slot, pos) in positions.iter().enumerate() {
            // Every slot is filled, checked above.
            map[slot] = pos.unwrap_or_default();
        }
        Ok(Self(map))
    }

    fn text<'r>(&self, record: &'r StringRecord, slot: usize) -> Result<&'r str, RowError> {
        record
            .get(self.0[slot])
            .map(str::trim)
            .ok_or(RowError::MissingField {
                field: CSV_FIELDS[slot],
            })
    }

    fn integer<T: FromStr>(&self, record: &StringRecord, slot: usize) -> Result<T, RowError> {
        let raw = self.text(record, slot)?;
        raw.parse::<T>().map_err(|_| RowError::InvalidInteger {
            field: CSV_FIELDS[slot],
            value: raw.to_string(),
        })
    }

    fn infohash(&self, record: &StringRecord) -> Option<String> {
        self.text(record, 0)
            .ok()
            .filter(|hash| !hash.is_empty())
            .map(str::to_string)
    }

    fn parse(&self, record: &StringRecord) -> Result<TorrentRecord, RowError> {
        let infohash = self.text(record, 0)?;
        if infohash.is_empty() {
            return Err(RowError::MissingField { field: "infohash" });
        }

        let parsed = TorrentRecord {
            infohash: infohash.to_string(),
            name: self.text(record, 1)?.to_string(),
            size_bytes: self.integer(record, 2)?,
            created_unix: self.integer(record, 3)?,
            seeders: self.integer(record, 4)?,
            leechers: self.integer(record, 5)?,
            completed: self.integer(record, 6)?,
            scraped_date: self.text(record, 7)?.to_string(),
            published: self.text(record, 8)?.to_string(),
        };

        parsed.check_storable()?;
        Ok(parsed)
    }
}

/// Stream `path` and feed every valid row to `insert`.
///
/// `insert` returns `true` when the record was new and `false` when its
/// infohash was already known. An error from `insert` or an I/O failure
/// aborts the load; the caller is expected to roll back.
pub(crate) fn ingest_csv<F>(path: &Path, mut insert: F) -> Result<InsertReport, CatalogError>
where
    F: FnMut(&TorrentRecord) -> Result<bool, CatalogError>,
{
    let file = File::open(path)
        .map_err(|e| CatalogError::InvalidCsv(format!("{}: {}", path.display(), e)))?;

    let mut reader = ReaderBuilder::new()
        .delimiter(b',')
        .has_headers(true)
        .flexible(true)
        .from_reader(BufReader::new(file));

    let headers = reader
        .headers()
        .map_err(|e| CatalogError::InvalidCsv(format!("unreadable header: {}", e)))?
        .clone();
    debug!(headers = ?headers, "Detected CSV headers");
    let columns = ColumnMap::from_headers(&headers)?;

    let mut report = InsertReport::default();
    let mut row = StringRecord::new();

    loop {
        match reader.read_record(&mut row) {
            Ok(false) => break,
            Ok(true) => {
                report.attempted += 1;
                let line = row
                    .position()
                    .map(|pos| pos.line())
                    .unwrap_or(report.attempted + 1);

                match columns.parse(&row) {
                    Ok(record) => {
                        if insert(&record)? {
                            report.inserted += 1;
                        } else {
                            report.ignored += 1;
                        }
                    }
                    Err(reason) => {
                        let infohash = columns.infohash(&row);
                        warn!(line, infohash = ?infohash, %reason, "Rejected CSV row");
                        report.record_rejection(RowRejection {
                            line,
                            infohash,
                            reason,
                        });
                    }
                }
            }
            Err(e) if e.is_io_error() => {
                return Err(CatalogError::InvalidCsv(format!(
                    "read failed after {} rows: {}",
                    report.attempted, e
                )));
            }
            Err(e) => {
                report.attempted += 1;
                let line = e
                    .position()
                    .map(|pos| pos.line())
                    .unwrap_or(report.attempted + 1);
                let reason = RowError::Malformed {
                    message: e.to_string(),
                };
                warn!(line, %reason, "Rejected CSV row");
                report.record_rejection(RowRejection {
                    line,
                    infohash: None,
                    reason,
                });
            }
        }
    }

    Ok(report)
}
