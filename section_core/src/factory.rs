//! # Section Factory
//!
//! Turns a designation (plus an optional explicit type) into one typed
//! [`Section`]. Retrieval goes through [`SectionDatabase`]; construction goes
//! through the region's [`SchemaRegistry`](crate::schema::SchemaRegistry).
//!
//! ```rust
//! use std::sync::Arc;
//! use section_core::factory::SectionFactory;
//! use section_core::sections::UniversalSection;
//! use section_core::store::{MemorySource, RecordStore};
//! use section_core::{RawRecord, Region, SectionType};
//!
//! let source = MemorySource::new().with_table(
//!     Region::UK,
//!     SectionType::UB,
//!     vec![RawRecord::new("457x191x67")
//!         .with("mass_per_metre", 67.1)
//!         .with("h", 453.4)
//!         .with("A", 85.5)
//!         .with("I_yy", 29400.0)],
//! );
//! let store = Arc::new(RecordStore::new(Arc::new(source)));
//! let factory = SectionFactory::for_region(Region::UK, store);
//!
//! let beam: UniversalSection = factory.create_as("457x191x67", None).unwrap();
//! assert_eq!(beam.mass_per_metre, 67.1);
//! ```

use std::sync::Arc;

use crate::database::{Lookup, Match, MatchKind, SectionDatabase};
use crate::errors::{CatalogueError, CatalogueResult, FieldViolation};
use crate::region::Region;
use crate::schema::{FieldSchema, SectionConstructor};
use crate::section_type::SectionType;
use crate::sections::{Section, SectionKind};
use crate::store::RecordStore;

/// Designation to typed section, for one region
#[derive(Debug, Clone)]
pub struct SectionFactory {
    database: SectionDatabase,
}

impl SectionFactory {
    pub fn new(database: SectionDatabase) -> Self {
        SectionFactory { database }
    }

    /// Factory over the region's built-in registry
    pub fn for_region(region: Region, store: Arc<RecordStore>) -> Self {
        Self::new(SectionDatabase::for_region(region, store))
    }

    pub fn region(&self) -> Region {
        self.database.region()
    }

    pub fn database(&self) -> &SectionDatabase {
        &self.database
    }

    /// Locate the raw record a `create` call would use.
    ///
    /// With an explicit type this is an exact `get`. Without one it is
    /// `find`; an ambiguous designation resolves to the first type in
    /// registration order.
    pub fn resolve(&self, designation: &str, section_type: Option<SectionType>) -> CatalogueResult<Match> {
        match section_type {
            Some(section_type) => Ok(Match {
                section_type,
                record: self.database.get(section_type, designation)?,
                kind: MatchKind::Exact,
            }),
            None => {
                let lookup = self.database.find(designation)?;
                if let Lookup::Ambiguous(candidates) = &lookup {
                    let types: Vec<&str> = candidates.iter().map(|m| m.section_type.tag()).collect();
                    tracing::warn!(
                        region = %self.region(),
                        designation,
                        candidates = %types.join(", "),
                        chosen = %lookup.first().section_type,
                        "designation exists under several section types; pass a type to choose"
                    );
                }
                Ok(lookup.into_first())
            }
        }
    }

    /// Build the typed section for a designation
    pub fn create(&self, designation: &str, section_type: Option<SectionType>) -> CatalogueResult<Section> {
        let found = self.resolve(designation, section_type)?;
        self.database
            .registry()
            .read()
            .construct(found.section_type, &found.record)
    }

    /// Build and unwrap into a concrete family struct.
    ///
    /// A section of another family is reported as a schema violation on
    /// `section_type`.
    pub fn create_as<T: SectionKind>(&self, designation: &str, section_type: Option<SectionType>) -> CatalogueResult<T> {
        let section = self.create(designation, section_type)?;
        T::from_section(section).map_err(|other| {
            CatalogueError::schema_violation(
                other.section_type(),
                other.designation(),
                vec![FieldViolation::new(
                    "section_type",
                    format!("expected a {} section, found {}", T::FAMILY, other.family()),
                )],
            )
        })
    }

    /// Add a section type to this region's registry
    pub fn register_type(
        &self,
        section_type: SectionType,
        schema: FieldSchema,
        constructor: SectionConstructor,
    ) -> CatalogueResult<()> {
        self.database
            .registry()
            .write()
            .register(section_type, schema, constructor)
    }
}
