//! # Record Store
//!
//! Raw section tables keyed by (region, section type, designation), read
//! from a [`RecordSource`] and cached per region.
//!
//! ## Loading model
//!
//! Each region owns a slot holding one `OnceCell` per section type. A table
//! is read the first time anyone asks for it; concurrent first readers block
//! on the same cell and all see the same `Arc<SectionTable>`. Readers never
//! observe a partially built table. Failed reads are not cached, so a fixed
//! data directory is picked up on the next call.
//!
//! [`RecordStore::reload`] builds a fresh slot and swaps it in only when
//! every table read succeeds. Callers still holding tables from the old slot
//! keep a consistent snapshot.
//!
//! ## Backends
//!
//! - [`JsonDirectorySource`]: `<root>/<REGION>/<TAG>.json`
//! - [`MemorySource`]: in-process tables, for tests and embedding
//! - `SqliteSource` (feature `sqlite`): `<root>/<REGION>_sections.sqlite3`

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use once_cell::sync::OnceCell;
use parking_lot::RwLock;

use crate::errors::{CatalogueError, CatalogueResult};
use crate::region::Region;
use crate::section_type::SectionType;
use crate::value::RawRecord;

mod json;
mod memory;
#[cfg(all(feature = "sqlite", not(target_arch = "wasm32")))]
mod sqlite;

pub use json::JsonDirectorySource;
#[cfg(not(target_arch = "wasm32"))]
pub use json::export_table;
pub use memory::MemorySource;
#[cfg(all(feature = "sqlite", not(target_arch = "wasm32")))]
pub use sqlite::{build_sqlite_database, BuildReport, SqliteSource};

/// Where raw tables come from.
///
/// Implementations only read; caching and concurrency live in
/// [`RecordStore`].
pub trait RecordSource: Send + Sync {
    /// Human-readable location, for logs and error messages
    fn describe(&self) -> String;

    /// `Ok(())` if the region's data exists at all, else `StoreUnavailable`
    fn region_available(&self, region: Region) -> CatalogueResult<()>;

    /// Records of one table in store order.
    ///
    /// `Ok(None)` when the region exists but has no such table. Malformed
    /// data is `StoreUnavailable`.
    fn read_table(&self, region: Region, section_type: SectionType) -> CatalogueResult<Option<Vec<RawRecord>>>;
}

// ============================================================================
// Tables
// ============================================================================

/// One loaded (region, section type) table
#[derive(Debug)]
pub struct SectionTable {
    region: Region,
    section_type: SectionType,
    records: Vec<Arc<RawRecord>>,
    index: HashMap<String, usize>,
    loaded_at: DateTime<Utc>,
}

impl SectionTable {
    /// Build a table; designations must be unique within it
    pub fn new(region: Region, section_type: SectionType, records: Vec<RawRecord>) -> CatalogueResult<Self> {
        let mut index = HashMap::with_capacity(records.len());
        for (i, record) in records.iter().enumerate() {
            if index.insert(record.designation.clone(), i).is_some() {
                return Err(CatalogueError::store_unavailable(
                    region,
                    format!(
                        "table {} contains designation '{}' more than once",
                        section_type, record.designation
                    ),
                ));
            }
        }
        Ok(SectionTable {
            region,
            section_type,
            records: records.into_iter().map(Arc::new).collect(),
            index,
            loaded_at: Utc::now(),
        })
    }

    pub fn empty(region: Region, section_type: SectionType) -> Self {
        SectionTable {
            region,
            section_type,
            records: Vec::new(),
            index: HashMap::new(),
            loaded_at: Utc::now(),
        }
    }

    pub fn region(&self) -> Region {
        self.region
    }

    pub fn section_type(&self) -> SectionType {
        self.section_type
    }

    /// Records in store order
    pub fn records(&self) -> &[Arc<RawRecord>] {
        &self.records
    }

    pub fn get(&self, designation: &str) -> Option<&Arc<RawRecord>> {
        self.index.get(designation).map(|&i| &self.records[i])
    }

    pub fn contains(&self, designation: &str) -> bool {
        self.index.contains_key(designation)
    }

    /// Designations in store order
    pub fn designations(&self) -> impl Iterator<Item = &str> {
        self.records.iter().map(|r| r.designation.as_str())
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }
}

// ============================================================================
// Store
// ============================================================================

struct RegionSlot {
    available: OnceCell<()>,
    tables: HashMap<SectionType, OnceCell<Arc<SectionTable>>>,
}

impl RegionSlot {
    fn new() -> Self {
        RegionSlot {
            available: OnceCell::new(),
            tables: SectionType::ALL.iter().map(|&t| (t, OnceCell::new())).collect(),
        }
    }

    fn loaded_count(&self) -> usize {
        self.tables.values().filter(|cell| cell.get().is_some()).count()
    }
}

/// Cached, lazily loaded view over a [`RecordSource`]
pub struct RecordStore {
    source: Arc<dyn RecordSource>,
    regions: RwLock<HashMap<Region, Arc<RegionSlot>>>,
}

impl std::fmt::Debug for RecordStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordStore")
            .field("source", &self.source.describe())
            .finish()
    }
}

impl RecordStore {
    pub fn new(source: Arc<dyn RecordSource>) -> Self {
        RecordStore {
            source,
            regions: RwLock::new(HashMap::new()),
        }
    }

    pub fn describe(&self) -> String {
        self.source.describe()
    }

    /// Load every table the region serves.
    ///
    /// Idempotent: tables already loaded are returned from cache.
    pub fn load(&self, region: Region) -> CatalogueResult<BTreeMap<SectionType, Arc<SectionTable>>> {
        let start = Instant::now();
        let slot = self.slot(region);
        let already = slot.loaded_count();

        let mut tables = BTreeMap::new();
        for &section_type in region.supported_types() {
            tables.insert(section_type, self.table_in(&slot, region, section_type)?);
        }

        if slot.loaded_count() > already {
            tracing::info!(
                region = %region,
                tables = tables.len(),
                records = tables.values().map(|t| t.len()).sum::<usize>(),
                elapsed_ms = start.elapsed().as_millis() as u64,
                "loaded region"
            );
        }
        Ok(tables)
    }

    /// One table, loaded on first use
    pub fn get_table(&self, region: Region, section_type: SectionType) -> CatalogueResult<Arc<SectionTable>> {
        let slot = self.slot(region);
        self.table_in(&slot, region, section_type)
    }

    pub fn get_record(
        &self,
        region: Region,
        section_type: SectionType,
        designation: &str,
    ) -> CatalogueResult<Arc<RawRecord>> {
        self.get_table(region, section_type)?
            .get(designation)
            .cloned()
            .ok_or_else(|| CatalogueError::section_not_found(Some(section_type), designation))
    }

    /// Read the region's tables again and swap them in.
    ///
    /// The new tables are built in a detached slot; the cached slot is only
    /// replaced once every table read succeeds. On failure the old tables
    /// stay in place.
    pub fn reload(&self, region: Region) -> CatalogueResult<BTreeMap<SectionType, Arc<SectionTable>>> {
        tracing::info!(region = %region, source = %self.source.describe(), "reloading region");
        let previous = self.regions.read().get(&region).map(Arc::clone);
        let fresh = RegionSlot::new();

        let mut wanted: Vec<SectionType> = region.supported_types().to_vec();
        let extra: Vec<SectionType> = previous
            .iter()
            .flat_map(|slot| slot.tables.iter())
            .filter(|&(t, cell)| cell.get().is_some() && !wanted.contains(t))
            .map(|(&t, _)| t)
            .collect();
        wanted.extend(extra);

        let mut tables = BTreeMap::new();
        for section_type in wanted {
            match self.table_in(&fresh, region, section_type) {
                Ok(table) => {
                    tables.insert(section_type, table);
                }
                Err(err) => {
                    tracing::warn!(region = %region, error = %err, "reload failed, keeping cached tables");
                    return Err(err);
                }
            }
        }

        self.regions.write().insert(region, Arc::new(fresh));
        tables.retain(|t, _| region.supported_types().contains(t));
        Ok(tables)
    }

    /// Number of tables currently cached for a region
    pub fn loaded_tables(&self, region: Region) -> usize {
        self.regions
            .read()
            .get(&region)
            .map(|slot| slot.loaded_count())
            .unwrap_or(0)
    }

    fn slot(&self, region: Region) -> Arc<RegionSlot> {
        if let Some(slot) = self.regions.read().get(&region) {
            return Arc::clone(slot);
        }
        let mut regions = self.regions.write();
        Arc::clone(regions.entry(region).or_insert_with(|| Arc::new(RegionSlot::new())))
    }

    fn table_in(
        &self,
        slot: &RegionSlot,
        region: Region,
        section_type: SectionType,
    ) -> CatalogueResult<Arc<SectionTable>> {
        slot.available
            .get_or_try_init(|| self.source.region_available(region))?;

        let cell = slot.tables.get(&section_type).ok_or_else(|| {
            CatalogueError::internal(format!("no table slot for section type {}", section_type))
        })?;

        cell.get_or_try_init(|| self.read_table(region, section_type))
            .map(Arc::clone)
    }

    fn read_table(&self, region: Region, section_type: SectionType) -> CatalogueResult<Arc<SectionTable>> {
        let start = Instant::now();
        let table = match self.source.read_table(region, section_type)? {
            Some(records) => SectionTable::new(region, section_type, records)?,
            None => {
                tracing::warn!(
                    region = %region,
                    section_type = %section_type,
                    source = %self.source.describe(),
                    "table not found, treating as empty"
                );
                SectionTable::empty(region, section_type)
            }
        };
        tracing::debug!(
            region = %region,
            section_type = %section_type,
            records = table.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "loaded table"
        );
        Ok(Arc::new(table))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source() -> MemorySource {
        MemorySource::new()
            .with_table(
                Region::UK,
                SectionType::UB,
                vec![
                    RawRecord::new("457x191x67").with("mass_per_metre", 67.1),
                    RawRecord::new("305x165x40").with("mass_per_metre", 40.3),
                ],
            )
            .with_table(
                Region::UK,
                SectionType::UC,
                vec![RawRecord::new("305x305x137").with("mass_per_metre", 137.0)],
            )
    }

    #[test]
    fn test_get_table_preserves_store_order() {
        let store = RecordStore::new(Arc::new(source()));
        let table = store.get_table(Region::UK, SectionType::UB).unwrap();
        let designations: Vec<&str> = table.designations().collect();
        assert_eq!(designations, vec!["457x191x67", "305x165x40"]);
        assert_eq!(store.loaded_tables(Region::UK), 1);
    }

    #[test]
    fn test_load_is_idempotent() {
        let source = Arc::new(source());
        let store = RecordStore::new(source.clone());

        let first = store.load(Region::UK).unwrap();
        let reads = source.read_count();
        let second = store.load(Region::UK).unwrap();

        assert_eq!(source.read_count(), reads);
        assert_eq!(first.len(), Region::UK.supported_types().len());
        assert!(Arc::ptr_eq(&first[&SectionType::UB], &second[&SectionType::UB]));
        assert!(first[&SectionType::PFC].is_empty());
    }

    #[test]
    fn test_get_record_miss_is_not_found() {
        let store = RecordStore::new(Arc::new(source()));
        let err = store
            .get_record(Region::UK, SectionType::UB, "does-not-exist")
            .unwrap_err();
        assert!(err.is_recoverable());
        assert_eq!(err.error_code(), "SECTION_NOT_FOUND");
    }

    #[test]
    fn test_missing_region_is_unavailable_and_isolated() {
        let store = RecordStore::new(Arc::new(source()));
        let err = store.get_table(Region::US, SectionType::W).unwrap_err();
        assert_eq!(err.error_code(), "STORE_UNAVAILABLE");
        assert!(store.get_table(Region::UK, SectionType::UB).is_ok());
    }

    #[test]
    fn test_duplicate_designation_is_malformed() {
        let source = MemorySource::new().with_table(
            Region::UK,
            SectionType::UB,
            vec![RawRecord::new("a"), RawRecord::new("a")],
        );
        let store = RecordStore::new(Arc::new(source));
        let err = store.get_table(Region::UK, SectionType::UB).unwrap_err();
        assert_eq!(err.error_code(), "STORE_UNAVAILABLE");
    }

    #[test]
    fn test_reload_gives_fresh_snapshot() {
        let source = Arc::new(source());
        let store = RecordStore::new(source.clone());
        let before = store.get_table(Region::UK, SectionType::UB).unwrap();
        store.reload(Region::UK).unwrap();
        let after = store.get_table(Region::UK, SectionType::UB).unwrap();
        assert!(!Arc::ptr_eq(&before, &after));
        assert_eq!(before.len(), after.len());
    }

    #[test]
    fn test_failed_reload_keeps_cached_tables() {
        let dir = tempfile::tempdir().unwrap();
        let uk = dir.path().join("UK");
        std::fs::create_dir_all(&uk).unwrap();
        std::fs::write(uk.join("UB.json"), r#"{"457x191x67": {"mass_per_metre": 67.1}}"#).unwrap();

        let store = RecordStore::new(Arc::new(JsonDirectorySource::new(dir.path())));
        let before = store.get_table(Region::UK, SectionType::UB).unwrap();

        std::fs::write(uk.join("UB.json"), "{ not json").unwrap();
        let err = store.reload(Region::UK).unwrap_err();
        assert_eq!(err.error_code(), "STORE_UNAVAILABLE");

        let after = store.get_table(Region::UK, SectionType::UB).unwrap();
        assert!(Arc::ptr_eq(&before, &after));
        assert!(after.contains("457x191x67"));
    }

    #[test]
    fn test_concurrent_first_load_converges() {
        let source = Arc::new(source());
        let store = Arc::new(RecordStore::new(source.clone()));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || store.get_table(Region::UK, SectionType::UB).unwrap())
            })
            .collect();
        let tables: Vec<Arc<SectionTable>> = handles.into_iter().map(|h| h.join().unwrap()).collect();

        for table in &tables[1..] {
            assert!(Arc::ptr_eq(&tables[0], table));
        }
        assert_eq!(source.read_count(), 1);
    }
}
