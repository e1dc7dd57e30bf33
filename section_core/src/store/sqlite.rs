//! SQLite backend (feature `sqlite`).
//!
//! One database file per region, `<root>/<REGION>_sections.sqlite3`, with one
//! table per section type:
//!
//! ```sql
//! CREATE TABLE "UB" (designation TEXT PRIMARY KEY, data TEXT NOT NULL);
//! ```
//!
//! `data` holds the record's fields as a JSON object. Rows are read in
//! insertion (rowid) order, which is the order of the source JSON table.

use std::path::{Path, PathBuf};

use rusqlite::{params, Connection, OpenFlags, OptionalExtension};
use serde::Serialize;

use super::json::JsonDirectorySource;
use super::RecordSource;
use crate::errors::{CatalogueError, CatalogueResult};
use crate::file_io::{commit_temp, temp_path_for, BuildLock};
use crate::region::Region;
use crate::section_type::SectionType;
use crate::value::RawRecord;

/// Reads `<root>/<REGION>_sections.sqlite3`
#[derive(Debug, Clone)]
pub struct SqliteSource {
    root: PathBuf,
}

impl SqliteSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        SqliteSource { root: root.into() }
    }

    pub fn database_path(&self, region: Region) -> PathBuf {
        database_path(&self.root, region)
    }

    fn open(&self, region: Region) -> CatalogueResult<Connection> {
        let path = self.database_path(region);
        Connection::open_with_flags(&path, OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX)
            .map_err(|e| CatalogueError::store_unavailable(region, format!("cannot open '{}': {}", path.display(), e)))
    }
}

/// Database file for a region under `root`
pub fn database_path(root: &Path, region: Region) -> PathBuf {
    root.join(format!("{}_sections.sqlite3", region.code()))
}

impl RecordSource for SqliteSource {
    fn describe(&self) -> String {
        format!("sqlite:{}", self.root.display())
    }

    fn region_available(&self, region: Region) -> CatalogueResult<()> {
        let path = self.database_path(region);
        if path.is_file() {
            Ok(())
        } else {
            Err(CatalogueError::store_unavailable(
                region,
                format!("database '{}' not found", path.display()),
            ))
        }
    }

    fn read_table(&self, region: Region, section_type: SectionType) -> CatalogueResult<Option<Vec<RawRecord>>> {
        let conn = self.open(region)?;
        let unavailable = |e: rusqlite::Error| {
            CatalogueError::store_unavailable(region, format!("table {}: {}", section_type, e))
        };

        let exists: Option<String> = conn
            .query_row(
                "SELECT name FROM sqlite_master WHERE type = 'table' AND name = ?1",
                params![section_type.tag()],
                |row| row.get(0),
            )
            .optional()
            .map_err(unavailable)?;
        if exists.is_none() {
            return Ok(None);
        }

        let sql = format!("SELECT designation, data FROM \"{}\" ORDER BY rowid", section_type.tag());
        let mut stmt = conn.prepare(&sql).map_err(unavailable)?;
        let rows = stmt
            .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))
            .map_err(unavailable)?;

        let mut records = Vec::new();
        for row in rows {
            let (designation, data) = row.map_err(unavailable)?;
            let fields: serde_json::Value = serde_json::from_str(&data).map_err(|e| {
                CatalogueError::store_unavailable(
                    region,
                    format!("table {} row '{}': invalid JSON: {}", section_type, designation, e),
                )
            })?;
            let record = RawRecord::from_json_entry(&designation, fields)
                .map_err(|reason| CatalogueError::store_unavailable(region, format!("table {}: {}", section_type, reason)))?;
            records.push(record);
        }
        Ok(Some(records))
    }
}

/// Summary of a [`build_sqlite_database`] run
#[derive(Debug, Clone, Serialize)]
pub struct BuildReport {
    pub region: Region,
    pub path: PathBuf,
    pub tables: usize,
    pub records: usize,
}

/// Convert a region's JSON tables under `json_root` into a SQLite database.
///
/// The database is written to a temp file and renamed into place under a
/// [`BuildLock`]. An existing database is only replaced when `force` is set.
pub fn build_sqlite_database(
    json_root: &Path,
    region: Region,
    db_path: &Path,
    force: bool,
) -> CatalogueResult<BuildReport> {
    if db_path.exists() && !force {
        return Err(CatalogueError::file_error(
            "build database",
            db_path.display().to_string(),
            "database already exists (use force to rebuild)",
        ));
    }

    let source = JsonDirectorySource::new(json_root);
    source.region_available(region)?;

    let _lock = BuildLock::acquire(db_path, "build-sqlite")?;
    let tmp_path = temp_path_for(db_path);
    if tmp_path.exists() {
        std::fs::remove_file(&tmp_path).map_err(|e| {
            CatalogueError::file_error("remove stale temp", tmp_path.display().to_string(), e.to_string())
        })?;
    }

    let db_err = |e: rusqlite::Error| {
        CatalogueError::file_error("write database", tmp_path.display().to_string(), e.to_string())
    };

    let mut tables = 0;
    let mut records = 0;
    {
        let mut conn = Connection::open(&tmp_path).map_err(db_err)?;
        let tx = conn.transaction().map_err(db_err)?;
        for &section_type in region.supported_types() {
            let Some(rows) = source.read_table(region, section_type)? else {
                continue;
            };
            let tag = section_type.tag();
            tx.execute(
                &format!("CREATE TABLE \"{}\" (designation TEXT PRIMARY KEY, data TEXT NOT NULL)", tag),
                [],
            )
            .map_err(db_err)?;
            {
                let mut insert = tx
                    .prepare(&format!("INSERT INTO \"{}\" (designation, data) VALUES (?1, ?2)", tag))
                    .map_err(db_err)?;
                for record in &rows {
                    let data = serde_json::to_string(&record.to_json_fields()).map_err(|e| {
                        CatalogueError::SerializationError { reason: e.to_string() }
                    })?;
                    insert.execute(params![record.designation, data]).map_err(db_err)?;
                }
            }
            tables += 1;
            records += rows.len();
        }
        tx.commit().map_err(db_err)?;
    }

    commit_temp(&tmp_path, db_path)?;
    tracing::info!(
        region = %region,
        tables,
        records,
        path = %db_path.display(),
        "built sqlite database"
    );

    Ok(BuildReport {
        region,
        path: db_path.to_path_buf(),
        tables,
        records,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::RecordStore;
    use std::fs;
    use std::sync::Arc;

    fn json_fixture(root: &Path) {
        let uk = root.join("UK");
        fs::create_dir_all(&uk).unwrap();
        fs::write(
            uk.join("UB.json"),
            r#"{"914x419x388": {"mass_per_metre": 388.0, "h": 921.0},
                "457x191x67": {"mass_per_metre": 67.1, "h": 453.4, "serial_size": "457x191"}}"#,
        )
        .unwrap();
        fs::write(uk.join("UBP.json"), r#"{"305x305x137": {"mass_per_metre": 137.0}}"#).unwrap();
    }

    #[test]
    fn test_build_and_read_back() {
        let dir = tempfile::tempdir().unwrap();
        json_fixture(dir.path());
        let db_path = database_path(dir.path(), Region::UK);

        let report = build_sqlite_database(dir.path(), Region::UK, &db_path, false).unwrap();
        assert_eq!(report.tables, 2);
        assert_eq!(report.records, 3);
        assert!(!temp_path_for(&db_path).exists());

        let store = RecordStore::new(Arc::new(SqliteSource::new(dir.path())));
        let table = store.get_table(Region::UK, SectionType::UB).unwrap();
        let designations: Vec<&str> = table.designations().collect();
        assert_eq!(designations, vec!["914x419x388", "457x191x67"]);
        let json_store = RecordStore::new(Arc::new(JsonDirectorySource::new(dir.path())));
        let json_table = json_store.get_table(Region::UK, SectionType::UB).unwrap();
        assert_eq!(table.records()[1], json_table.records()[1]);

        assert!(store.get_table(Region::UK, SectionType::PFC).unwrap().is_empty());
    }

    #[test]
    fn test_build_refuses_to_overwrite_without_force() {
        let dir = tempfile::tempdir().unwrap();
        json_fixture(dir.path());
        let db_path = database_path(dir.path(), Region::UK);
        build_sqlite_database(dir.path(), Region::UK, &db_path, false).unwrap();

        let err = build_sqlite_database(dir.path(), Region::UK, &db_path, false).unwrap_err();
        assert_eq!(err.error_code(), "FILE_ERROR");
        assert!(build_sqlite_database(dir.path(), Region::UK, &db_path, true).is_ok());
    }

    #[test]
    fn test_missing_database_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let store = RecordStore::new(Arc::new(SqliteSource::new(dir.path())));
        let err = store.get_table(Region::US, SectionType::W).unwrap_err();
        assert_eq!(err.error_code(), "STORE_UNAVAILABLE");
    }
}
