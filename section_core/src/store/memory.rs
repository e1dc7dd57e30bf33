//! In-process record source.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};

use super::RecordSource;
use crate::errors::{CatalogueError, CatalogueResult};
use crate::region::Region;
use crate::section_type::SectionType;
use crate::value::RawRecord;

/// Tables held in memory, built with a small builder.
///
/// A region is available once any table (or [`MemorySource::with_region`])
/// has been added for it.
#[derive(Debug, Default)]
pub struct MemorySource {
    regions: HashSet<Region>,
    tables: HashMap<(Region, SectionType), Vec<RawRecord>>,
    reads: AtomicUsize,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a region as present even with no tables
    pub fn with_region(mut self, region: Region) -> Self {
        self.regions.insert(region);
        self
    }

    pub fn with_table(mut self, region: Region, section_type: SectionType, records: Vec<RawRecord>) -> Self {
        self.regions.insert(region);
        self.tables.insert((region, section_type), records);
        self
    }

    /// Number of successful `read_table` calls so far
    pub fn read_count(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }
}

impl RecordSource for MemorySource {
    fn describe(&self) -> String {
        format!("memory ({} tables)", self.tables.len())
    }

    fn region_available(&self, region: Region) -> CatalogueResult<()> {
        if self.regions.contains(&region) {
            Ok(())
        } else {
            Err(CatalogueError::store_unavailable(region, "no data for region"))
        }
    }

    fn read_table(&self, region: Region, section_type: SectionType) -> CatalogueResult<Option<Vec<RawRecord>>> {
        self.region_available(region)?;
        let table = self.tables.get(&(region, section_type)).cloned();
        if table.is_some() {
            self.reads.fetch_add(1, Ordering::SeqCst);
        }
        Ok(table)
    }
}
