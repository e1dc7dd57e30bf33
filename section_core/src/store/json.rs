//! JSON directory backend.
//!
//! Layout: one directory per region, one file per section type, named by
//! the type's tag:
//!
//! ```text
//! data/
//!   UK/UB.json
//!   UK/L_EQUAL.json
//!   US/W.json
//! ```
//!
//! A table file is an object keyed by designation, in store order:
//!
//! ```json
//! { "457x191x67": { "mass_per_metre": 67.1, "h": 453.4, "A": 85.5 } }
//! ```
//!
//! An array of objects that each carry a `designation` is accepted too.

use std::fs;
use std::path::{Path, PathBuf};

use super::RecordSource;
#[cfg(not(target_arch = "wasm32"))]
use super::SectionTable;
use crate::errors::{CatalogueError, CatalogueResult};
use crate::region::Region;
use crate::section_type::SectionType;
use crate::value::RawRecord;

/// Reads `<root>/<REGION>/<TAG>.json`
#[derive(Debug, Clone)]
pub struct JsonDirectorySource {
    root: PathBuf,
}

impl JsonDirectorySource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        JsonDirectorySource { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn region_dir(&self, region: Region) -> PathBuf {
        self.root.join(region.code())
    }

    pub fn table_path(&self, region: Region, section_type: SectionType) -> PathBuf {
        self.region_dir(region).join(format!("{}.json", section_type.tag()))
    }
}

impl RecordSource for JsonDirectorySource {
    fn describe(&self) -> String {
        format!("json:{}", self.root.display())
    }

    fn region_available(&self, region: Region) -> CatalogueResult<()> {
        let dir = self.region_dir(region);
        if dir.is_dir() {
            Ok(())
        } else {
            Err(CatalogueError::store_unavailable(
                region,
                format!("data directory '{}' not found", dir.display()),
            ))
        }
    }

    fn read_table(&self, region: Region, section_type: SectionType) -> CatalogueResult<Option<Vec<RawRecord>>> {
        let path = self.table_path(region, section_type);
        if !path.exists() {
            return Ok(None);
        }

        let contents = fs::read_to_string(&path).map_err(|e| {
            CatalogueError::store_unavailable(region, format!("cannot read '{}': {}", path.display(), e))
        })?;

        parse_table(&contents)
            .map(Some)
            .map_err(|reason| CatalogueError::store_unavailable(region, format!("{}: {}", path.display(), reason)))
    }
}

/// Parse a table document into records in document order
pub fn parse_table(contents: &str) -> Result<Vec<RawRecord>, String> {
    let document: serde_json::Value =
        serde_json::from_str(contents).map_err(|e| format!("invalid JSON: {}", e))?;

    match document {
        serde_json::Value::Object(entries) => entries
            .into_iter()
            .map(|(designation, fields)| RawRecord::from_json_entry(&designation, fields))
            .collect(),
        serde_json::Value::Array(items) => items
            .into_iter()
            .enumerate()
            .map(|(i, item)| {
                let designation = item
                    .get("designation")
                    .and_then(|d| d.as_str())
                    .map(str::to_string)
                    .ok_or_else(|| format!("entry {} has no text designation", i))?;
                RawRecord::from_json_entry(&designation, item)
            })
            .collect(),
        _ => Err("table must be an object keyed by designation or an array of records".to_string()),
    }
}

/// Write a loaded table back out in the keyed-object layout
#[cfg(not(target_arch = "wasm32"))]
pub fn export_table(table: &SectionTable, path: &Path) -> CatalogueResult<usize> {
    let document: serde_json::Map<String, serde_json::Value> = table
        .records()
        .iter()
        .map(|record| (record.designation.clone(), record.to_json_fields()))
        .collect();
    crate::file_io::write_json_locked(path, &serde_json::Value::Object(document))?;
    tracing::info!(
        section_type = %table.section_type(),
        records = table.len(),
        path = %path.display(),
        "exported table"
    );
    Ok(table.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::RecordStore;
    use std::sync::Arc;

    fn write(dir: &Path, region: &str, tag: &str, body: &str) {
        let region_dir = dir.join(region);
        fs::create_dir_all(&region_dir).unwrap();
        fs::write(region_dir.join(format!("{tag}.json")), body).unwrap();
    }

    #[test]
    fn test_reads_keyed_table_in_document_order() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "UK",
            "UB",
            r#"{"914x419x388": {"mass_per_metre": 388.0}, "457x191x67": {"mass_per_metre": 67.1}}"#,
        );
        let source = JsonDirectorySource::new(dir.path());
        let records = source.read_table(Region::UK, SectionType::UB).unwrap().unwrap();
        assert_eq!(records[0].designation, "914x419x388");
        assert_eq!(records[1].designation, "457x191x67");
    }

    #[test]
    fn test_reads_array_table() {
        let records = parse_table(r#"[{"designation": "W14X90", "W": 90}]"#).unwrap();
        assert_eq!(records[0].designation, "W14X90");
        assert!(records[0].get("designation").is_none());
    }

    #[test]
    fn test_missing_table_and_missing_region() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("UK")).unwrap();
        let source = JsonDirectorySource::new(dir.path());
        assert!(source.read_table(Region::UK, SectionType::PFC).unwrap().is_none());
        let err = source.region_available(Region::EU).unwrap_err();
        assert_eq!(err.error_code(), "STORE_UNAVAILABLE");
    }

    #[test]
    fn test_malformed_table_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "UK", "UB", r#"{"457x191x67": {"h": [1, 2]}}"#);
        let store = RecordStore::new(Arc::new(JsonDirectorySource::new(dir.path())));
        let err = store.get_table(Region::UK, SectionType::UB).unwrap_err();
        assert_eq!(err.error_code(), "STORE_UNAVAILABLE");
        assert!(err.to_string().contains("UB.json"));
    }

    #[test]
    fn test_export_round_trips_through_source() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "UK",
            "UC",
            r#"{"305x305x137": {"mass_per_metre": 137.0, "h": 320.5}, "203x203x46": {"mass_per_metre": 46.1}}"#,
        );
        let store = RecordStore::new(Arc::new(JsonDirectorySource::new(dir.path())));
        let table = store.get_table(Region::UK, SectionType::UC).unwrap();

        let out = dir.path().join("UC_export.json");
        assert_eq!(export_table(&table, &out).unwrap(), 2);

        let records = parse_table(&fs::read_to_string(&out).unwrap()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].designation, "305x305x137");
        assert_eq!(records[0], *table.records()[0]);
    }
}
