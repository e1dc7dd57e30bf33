//! # Section Database
//!
//! List / get / find / search over the tables of one region.
//!
//! A [`SectionDatabase`] pairs the shared [`RecordStore`] with the region's
//! [`SchemaRegistry`]. The registry decides which types exist and in which
//! order auto-detection walks them; the store supplies the records.
//!
//! ## Lookup rules
//!
//! - [`SectionDatabase::get`] is exact on `(type, designation)`. A miss
//!   carries close designations and, if the designation lives under another
//!   type, that type.
//! - [`SectionDatabase::find`] walks every registered type in registration
//!   order. Exact matches are tried first across all types; only if none hit
//!   is a normalised pass made (case, then spaces, then `x` separators when
//!   both sides use them; `.` and `-` always count). More than one hit is
//!   [`Lookup::Ambiguous`], whose first candidate is the first type in
//!   registration order.

use std::sync::Arc;

use parking_lot::RwLock;
use serde::Serialize;

use crate::errors::{CatalogueError, CatalogueResult};
use crate::region::Region;
use crate::schema::{FieldSchema, SchemaRegistry};
use crate::search::SearchQuery;
use crate::section_type::SectionType;
use crate::store::{RecordStore, SectionTable};
use crate::value::RawRecord;

/// How "did you mean" suggestions are picked
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SuggestionPolicy {
    /// Maximum suggestions for a typed miss
    pub limit: usize,
    /// Maximum suggestions when no type was given
    pub cross_type_limit: usize,
    /// Minimum Jaro-Winkler similarity (0..=1)
    pub cutoff: f64,
}

impl Default for SuggestionPolicy {
    fn default() -> Self {
        SuggestionPolicy {
            limit: 5,
            cross_type_limit: 3,
            cutoff: 0.6,
        }
    }
}

impl SuggestionPolicy {
    /// Best candidates first; ties keep candidate order
    pub fn rank<'a, I>(&self, designation: &str, candidates: I, limit: usize) -> Vec<String>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let needle = designation.to_lowercase();
        let mut scored: Vec<(f64, &str)> = candidates
            .into_iter()
            .map(|candidate| (strsim::jaro_winkler(&needle, &candidate.to_lowercase()), candidate))
            .filter(|(score, _)| *score >= self.cutoff)
            .collect();
        scored.sort_by(|a, b| b.0.total_cmp(&a.0));

        let mut out: Vec<String> = Vec::new();
        for (_, candidate) in scored {
            if out.len() == limit {
                break;
            }
            if !out.iter().any(|c| c == candidate) {
                out.push(candidate.to_string());
            }
        }
        out
    }
}

// ============================================================================
// Find results
// ============================================================================

/// How a designation matched in [`SectionDatabase::find`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchKind {
    Exact,
    /// Matched after case / whitespace / separator normalisation
    Normalised,
}

/// One record located by designation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Match {
    pub section_type: SectionType,
    pub record: Arc<RawRecord>,
    pub kind: MatchKind,
}

impl Match {
    pub fn designation(&self) -> &str {
        &self.record.designation
    }
}

/// Outcome of auto-detection
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", content = "matches", rename_all = "snake_case")]
pub enum Lookup {
    Unique(Match),
    /// Two or more types hold the designation, in registration order
    Ambiguous(Vec<Match>),
}

impl Lookup {
    fn from_matches(mut matches: Vec<Match>) -> Option<Lookup> {
        match matches.len() {
            0 => None,
            1 => matches.pop().map(Lookup::Unique),
            _ => Some(Lookup::Ambiguous(matches)),
        }
    }

    /// The deterministic resolution: first match in registration order
    pub fn first(&self) -> &Match {
        match self {
            Lookup::Unique(m) => m,
            Lookup::Ambiguous(matches) => &matches[0],
        }
    }

    pub fn into_first(self) -> Match {
        match self {
            Lookup::Unique(m) => m,
            Lookup::Ambiguous(mut matches) => matches.swap_remove(0),
        }
    }

    pub fn is_ambiguous(&self) -> bool {
        matches!(self, Lookup::Ambiguous(_))
    }

    pub fn candidates(&self) -> &[Match] {
        match self {
            Lookup::Unique(m) => std::slice::from_ref(m),
            Lookup::Ambiguous(matches) => matches,
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Normalisation {
    Case,
    Whitespace,
    /// `x` separators dropped; only applies when both sides contain one
    Separators,
}

impl Normalisation {
    const PASSES: [Normalisation; 3] = [Normalisation::Case, Normalisation::Whitespace, Normalisation::Separators];

    /// Comparison key, or `None` when the pass does not apply to `designation`.
    ///
    /// `.` and `-` are kept: `60.3x3.0` and `60.3x30` are different sections.
    fn key(&self, designation: &str) -> Option<String> {
        let lower = designation.to_lowercase();
        match self {
            Normalisation::Case => Some(lower.trim().to_string()),
            Normalisation::Whitespace => Some(lower.chars().filter(|c| !c.is_whitespace()).collect()),
            Normalisation::Separators if lower.contains('x') => {
                Some(lower.chars().filter(|c| !c.is_whitespace() && *c != 'x').collect())
            }
            Normalisation::Separators => None,
        }
    }
}

// ============================================================================
// Database
// ============================================================================

/// Query surface for one region
#[derive(Debug, Clone)]
pub struct SectionDatabase {
    region: Region,
    store: Arc<RecordStore>,
    registry: Arc<RwLock<SchemaRegistry>>,
    suggestions: SuggestionPolicy,
}

impl SectionDatabase {
    pub fn new(store: Arc<RecordStore>, registry: Arc<RwLock<SchemaRegistry>>) -> Self {
        let region = registry.read().region();
        SectionDatabase {
            region,
            store,
            registry,
            suggestions: SuggestionPolicy::default(),
        }
    }

    /// Database over the region's built-in registry
    pub fn for_region(region: Region, store: Arc<RecordStore>) -> Self {
        Self::new(store, Arc::new(RwLock::new(SchemaRegistry::for_region(region))))
    }

    pub fn with_suggestions(mut self, suggestions: SuggestionPolicy) -> Self {
        self.suggestions = suggestions;
        self
    }

    pub fn region(&self) -> Region {
        self.region
    }

    pub fn store(&self) -> &Arc<RecordStore> {
        &self.store
    }

    pub fn registry(&self) -> &Arc<RwLock<SchemaRegistry>> {
        &self.registry
    }

    /// Registered types in registration order
    pub fn registered_types(&self) -> Vec<SectionType> {
        self.registry.read().registered_types()
    }

    pub fn schema(&self, section_type: SectionType) -> CatalogueResult<Arc<FieldSchema>> {
        self.registry.read().get_schema(section_type)
    }

    /// Load every registered table of the region
    pub fn load(&self) -> CatalogueResult<usize> {
        let mut records = 0;
        for section_type in self.registered_types() {
            records += self.store.get_table(self.region, section_type)?.len();
        }
        Ok(records)
    }

    /// The raw table of a registered type
    pub fn table(&self, section_type: SectionType) -> CatalogueResult<Arc<SectionTable>> {
        if !self.registry.read().is_registered(section_type) {
            return Err(CatalogueError::TypeNotRegistered {
                region: self.region,
                section_type,
            });
        }
        self.store.get_table(self.region, section_type)
    }

    /// Designations of one type in store order
    pub fn list_designations(&self, section_type: SectionType) -> CatalogueResult<Vec<String>> {
        Ok(self.table(section_type)?.designations().map(str::to_string).collect())
    }

    /// Exact lookup
    pub fn get(&self, section_type: SectionType, designation: &str) -> CatalogueResult<Arc<RawRecord>> {
        let table = self.table(section_type)?;
        if let Some(record) = table.get(designation) {
            return Ok(Arc::clone(record));
        }

        let suggestions = self
            .suggestions
            .rank(designation, table.designations(), self.suggestions.limit);
        let found_under = self.registered_types().into_iter().find(|&other| {
            other != section_type
                && self
                    .store
                    .get_table(self.region, other)
                    .map(|t| t.contains(designation))
                    .unwrap_or(false)
        });

        Err(CatalogueError::SectionNotFound {
            section_type: Some(section_type),
            designation: designation.to_string(),
            suggestions,
            found_under,
        })
    }

    /// Locate a designation across every registered type
    pub fn find(&self, designation: &str) -> CatalogueResult<Lookup> {
        let tables = self
            .registered_types()
            .into_iter()
            .map(|t| self.store.get_table(self.region, t).map(|table| (t, table)))
            .collect::<CatalogueResult<Vec<_>>>()?;

        let exact: Vec<Match> = tables
            .iter()
            .filter_map(|(section_type, table)| {
                table.get(designation).map(|record| Match {
                    section_type: *section_type,
                    record: Arc::clone(record),
                    kind: MatchKind::Exact,
                })
            })
            .collect();
        if let Some(lookup) = Lookup::from_matches(exact) {
            return Ok(lookup);
        }

        for pass in Normalisation::PASSES {
            let Some(wanted) = pass.key(designation) else {
                continue;
            };
            let matches: Vec<Match> = tables
                .iter()
                .filter_map(|(section_type, table)| {
                    table
                        .records()
                        .iter()
                        .find(|r| pass.key(&r.designation).as_deref() == Some(wanted.as_str()))
                        .map(|record| Match {
                            section_type: *section_type,
                            record: Arc::clone(record),
                            kind: MatchKind::Normalised,
                        })
                })
                .collect();
            if let Some(lookup) = Lookup::from_matches(matches) {
                tracing::debug!(
                    region = %self.region,
                    query = designation,
                    matched = lookup.first().designation(),
                    pass = ?pass,
                    "normalised designation match"
                );
                return Ok(lookup);
            }
        }

        let suggestions = self.suggestions.rank(
            designation,
            tables.iter().flat_map(|(_, table)| table.designations()),
            self.suggestions.cross_type_limit,
        );
        Err(CatalogueError::SectionNotFound {
            section_type: None,
            designation: designation.to_string(),
            suggestions,
            found_under: None,
        })
    }

    /// Records of one type satisfying every predicate, in store order
    pub fn search(&self, section_type: SectionType, query: &SearchQuery) -> CatalogueResult<Vec<(String, Arc<RawRecord>)>> {
        let bound = query.bind(&*self.schema(section_type)?)?;
        let table = self.store.get_table(self.region, section_type)?;
        let results = bound.scan(table.records());
        tracing::debug!(
            region = %self.region,
            section_type = %section_type,
            predicates = query.predicates().len(),
            scanned = table.len(),
            matched = results.len(),
            "search"
        );
        Ok(results)
    }

    /// Registered types with a non-empty table, in registration order
    pub fn get_available_types(&self) -> CatalogueResult<Vec<SectionType>> {
        let mut available = Vec::new();
        for section_type in self.registered_types() {
            if !self.store.get_table(self.region, section_type)?.is_empty() {
                available.push(section_type);
            }
        }
        Ok(available)
    }
}
