//! # section_core - Steel Section Catalogue Engine
//!
//! `section_core` holds the standard steel cross-section tables (beams,
//! columns, channels, angles, hollow sections, bolts, welds) for the UK, EU
//! and US catalogues, and turns a designation like `"457x191x67"` into a
//! typed, validated section. All records, sections and errors are
//! JSON-serializable.
//!
//! ## Design Philosophy
//!
//! - **Explicit context**: a [`Catalogue`] value owns the store; no globals
//! - **Typed sections**: one struct per section family, generated from its field schema
//! - **Rich Errors**: misses, data faults and caller mistakes are distinct variants
//! - **Load once**: each table is read on first use and shared afterwards
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use section_core::store::MemorySource;
//! use section_core::{Catalogue, CatalogueConfig, RawRecord, Region, SectionType};
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
//! let catalogue = Catalogue::with_source(Arc::new(source), CatalogueConfig::default());
//!
//! let beam = catalogue.create_section(Region::UK, "457x191x67", None).unwrap();
//! assert_eq!(beam.section_type(), SectionType::UB);
//! assert_eq!(beam.number("mass_per_metre"), Some(67.1));
//! ```
//!
//! ## Modules
//!
//! - [`catalogue`] - Entry point owning the store and per-region factories
//! - [`store`] - Raw tables from JSON directories, memory or SQLite
//! - [`schema`] - Field schemas, validation and the per-region registry
//! - [`sections`] - Typed section families
//! - [`database`] - List / get / find / search within a region
//! - [`factory`] - Designation to typed section, with type auto-detection
//! - [`search`] - Predicates and queries
//! - [`config`] - Data root, backend and lookup settings
//! - [`errors`] - Structured error types
//! - [`file_io`] - Atomic writes and build locks

pub mod catalogue;
pub mod config;
pub mod database;
pub mod errors;
#[cfg(not(target_arch = "wasm32"))]
pub mod file_io;
pub mod factory;
pub mod region;
pub mod schema;
pub mod search;
pub mod section_type;
pub mod sections;
pub mod store;
pub mod value;

// Re-export commonly used types at crate root for convenience
pub use catalogue::Catalogue;
pub use config::{Backend, CatalogueConfig};
pub use database::{Lookup, Match, MatchKind, SectionDatabase};
pub use errors::{CatalogueError, CatalogueResult, FieldViolation};
pub use factory::SectionFactory;
pub use region::Region;
pub use schema::{FieldKind, FieldSchema, FieldSpec, SchemaRegistry};
pub use search::{BoundQuery, Operator, Predicate, SearchQuery};
pub use section_type::SectionType;
pub use sections::{Section, SectionKind, TypedSection};
pub use value::{FieldValue, RawRecord};
