//! # Catalogue
//!
//! The entry point. A [`Catalogue`] owns one [`RecordStore`] and, per region,
//! one [`SectionFactory`] created on first use. There is no global state:
//! two catalogues over two data roots are fully independent.
//!
//! ```rust,no_run
//! use section_core::{Catalogue, CatalogueConfig, Region, SectionType};
//! use section_core::search::SearchQuery;
//!
//! let catalogue = Catalogue::open(CatalogueConfig::default())?;
//!
//! let beam = catalogue.create_section(Region::UK, "457x191x67", Some(SectionType::UB))?;
//! println!("{} kg/m", beam.number("mass_per_metre").unwrap_or_default());
//!
//! let heavy = catalogue.search_sections(
//!     Region::UK,
//!     SectionType::UB,
//!     &SearchQuery::new().gt("mass_per_metre", 100.0),
//! )?;
//! println!("{} heavy beams", heavy.len());
//! # Ok::<(), section_core::CatalogueError>(())
//! ```

use std::sync::Arc;

use once_cell::sync::OnceCell;

use crate::config::{Backend, CatalogueConfig};
use crate::database::SectionDatabase;
use crate::errors::CatalogueResult;
use crate::factory::SectionFactory;
use crate::region::Region;
use crate::schema::{FieldSchema, SectionConstructor};
use crate::search::SearchQuery;
use crate::section_type::SectionType;
use crate::sections::Section;
use crate::store::{JsonDirectorySource, RecordSource, RecordStore};
use crate::value::RawRecord;

/// Store plus lazily created per-region factories
pub struct Catalogue {
    config: CatalogueConfig,
    store: Arc<RecordStore>,
    factories: [OnceCell<SectionFactory>; 3],
}

impl std::fmt::Debug for Catalogue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let initialised: Vec<Region> = Region::ALL
            .into_iter()
            .filter(|r| self.factories[slot(*r)].get().is_some())
            .collect();
        f.debug_struct("Catalogue")
            .field("store", &self.store)
            .field("regions", &initialised)
            .finish()
    }
}

fn slot(region: Region) -> usize {
    match region {
        Region::UK => 0,
        Region::EU => 1,
        Region::US => 2,
    }
}

impl Catalogue {
    /// Open the configured backend and preload the configured regions
    pub fn open(config: CatalogueConfig) -> CatalogueResult<Self> {
        config.validate()?;
        let source = source_for(&config)?;
        let catalogue = Self::with_source(source, config);
        for &region in &catalogue.config.preload {
            let records = catalogue.database(region).load()?;
            tracing::debug!(region = %region, records, "preloaded region");
        }
        Ok(catalogue)
    }

    /// Catalogue over any record source
    pub fn with_source(source: Arc<dyn RecordSource>, config: CatalogueConfig) -> Self {
        Catalogue {
            config,
            store: Arc::new(RecordStore::new(source)),
            factories: Default::default(),
        }
    }

    pub fn config(&self) -> &CatalogueConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<RecordStore> {
        &self.store
    }

    /// The region's factory, built on first access
    pub fn factory(&self, region: Region) -> &SectionFactory {
        self.factories[slot(region)].get_or_init(|| {
            tracing::debug!(region = %region, "initialising region");
            let database = SectionDatabase::for_region(region, Arc::clone(&self.store))
                .with_suggestions(self.config.suggestion_policy());
            SectionFactory::new(database)
        })
    }

    pub fn database(&self, region: Region) -> &SectionDatabase {
        self.factory(region).database()
    }

    pub fn create_section(
        &self,
        region: Region,
        designation: &str,
        section_type: Option<SectionType>,
    ) -> CatalogueResult<Section> {
        self.factory(region).create(designation, section_type)
    }

    pub fn search_sections(
        &self,
        region: Region,
        section_type: SectionType,
        query: &SearchQuery,
    ) -> CatalogueResult<Vec<(String, Arc<RawRecord>)>> {
        self.database(region).search(section_type, query)
    }

    /// Search with `field__op` / value pairs, parsed before any record is read
    pub fn search_criteria<I, K, V>(
        &self,
        region: Region,
        section_type: SectionType,
        criteria: I,
    ) -> CatalogueResult<Vec<(String, Arc<RawRecord>)>>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let query = SearchQuery::from_criteria(criteria)?;
        self.search_sections(region, section_type, &query)
    }

    pub fn list_sections(&self, region: Region, section_type: SectionType) -> CatalogueResult<Vec<String>> {
        self.database(region).list_designations(section_type)
    }

    pub fn get_available_types(&self, region: Region) -> CatalogueResult<Vec<SectionType>> {
        self.database(region).get_available_types()
    }

    pub fn register_type(
        &self,
        region: Region,
        section_type: SectionType,
        schema: FieldSchema,
        constructor: SectionConstructor,
    ) -> CatalogueResult<()> {
        self.factory(region).register_type(section_type, schema, constructor)
    }

    /// Discard the region's cached tables and read them again.
    ///
    /// Registrations survive; only data is reloaded.
    pub fn reload(&self, region: Region) -> CatalogueResult<usize> {
        let tables = self.store.reload(region)?;
        Ok(tables.values().map(|t| t.len()).sum())
    }
}

fn source_for(config: &CatalogueConfig) -> CatalogueResult<Arc<dyn RecordSource>> {
    match config.backend {
        Backend::Json => Ok(Arc::new(JsonDirectorySource::new(&config.data_root))),
        #[cfg(all(feature = "sqlite", not(target_arch = "wasm32")))]
        Backend::Sqlite => Ok(Arc::new(crate::store::SqliteSource::new(&config.data_root))),
        #[cfg(not(all(feature = "sqlite", not(target_arch = "wasm32"))))]
        Backend::Sqlite => Err(crate::errors::CatalogueError::config("sqlite backend is not available in this build")),
    }
}
