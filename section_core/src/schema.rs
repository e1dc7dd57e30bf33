//! # Schema Registry
//!
//! Maps each section type of a region to its ordered field schema and to the
//! constructor that turns a validated raw record into a typed [`Section`].
//!
//! ## Architecture
//!
//! - [`FieldSpec`] / [`FieldSchema`]: static field declarations (name, scalar
//!   kind, required flag), usually generated by the `section_record!` macro
//! - [`ValidatedRecord`]: a raw record whose every declared field has been
//!   checked and coerced to the declared kind
//! - [`SchemaRegistry`]: one per region, registration order preserved
//!
//! ## Usage
//!
//! ```rust
//! use section_core::schema::SchemaRegistry;
//! use section_core::{FieldValue, RawRecord, Region, SectionType};
//!
//! let registry = SchemaRegistry::for_region(Region::UK);
//! let record = RawRecord::new("457x191x67")
//!     .with("mass_per_metre", 67.1)
//!     .with("h", 453.4)
//!     .with("A", 85.5)
//!     .with("I_yy", 29400.0);
//!
//! let section = registry.construct(SectionType::UB, &record).unwrap();
//! assert_eq!(section.get("mass_per_metre"), Some(FieldValue::Float(67.1)));
//! ```

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::errors::{CatalogueError, CatalogueResult, FieldViolation};
use crate::region::Region;
use crate::section_type::SectionType;
use crate::sections::{self, Section};
use crate::value::{FieldValue, RawRecord};

// ============================================================================
// Field declarations
// ============================================================================

/// Scalar kind a field is declared with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Float,
    Integer,
    Text,
    Bool,
}

impl FieldKind {
    pub fn name(&self) -> &'static str {
        match self {
            FieldKind::Float => "float",
            FieldKind::Integer => "integer",
            FieldKind::Text => "text",
            FieldKind::Bool => "bool",
        }
    }

    /// Ordering comparisons only make sense on these
    pub fn is_numeric(&self) -> bool {
        matches!(self, FieldKind::Float | FieldKind::Integer)
    }

    /// Coerce a stored value to this kind.
    ///
    /// `Ok(None)` for null. The error string is the violation reason.
    pub fn coerce(&self, value: &FieldValue) -> Result<Option<FieldValue>, String> {
        let coerced = match (self, value) {
            (_, FieldValue::Null) => return Ok(None),

            (FieldKind::Float, FieldValue::Float(f)) => Some(FieldValue::Float(*f)),
            (FieldKind::Float, FieldValue::Integer(i)) => Some(FieldValue::Float(*i as f64)),
            (FieldKind::Float, FieldValue::Text(_)) => value.to_number().map(FieldValue::Float),

            (FieldKind::Integer, FieldValue::Integer(i)) => Some(FieldValue::Integer(*i)),
            (FieldKind::Integer, FieldValue::Float(f))
                if f.fract() == 0.0 && f.abs() < i64::MAX as f64 =>
            {
                Some(FieldValue::Integer(*f as i64))
            }

            (FieldKind::Text, FieldValue::Text(s)) => Some(FieldValue::Text(s.clone())),
            (FieldKind::Text, FieldValue::Integer(i)) => Some(FieldValue::Text(i.to_string())),
            (FieldKind::Text, FieldValue::Float(f)) => Some(FieldValue::Text(f.to_string())),

            (FieldKind::Bool, FieldValue::Bool(b)) => Some(FieldValue::Bool(*b)),
            (FieldKind::Bool, FieldValue::Integer(0)) => Some(FieldValue::Bool(false)),
            (FieldKind::Bool, FieldValue::Integer(1)) => Some(FieldValue::Bool(true)),
            (FieldKind::Bool, FieldValue::Text(s)) => match s.trim().to_ascii_lowercase().as_str() {
                "true" => Some(FieldValue::Bool(true)),
                "false" => Some(FieldValue::Bool(false)),
                _ => None,
            },

            _ => None,
        };

        coerced.map(Some).ok_or_else(|| {
            format!(
                "expected {}, found {} '{}'",
                self.name(),
                value.kind_name(),
                value
            )
        })
    }
}

impl std::fmt::Display for FieldKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// One declared field of a section table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FieldSpec {
    /// Column name in the raw record (`"I_yy"`, `"mass_per_metre"`)
    pub name: &'static str,
    pub kind: FieldKind,
    pub required: bool,
}

impl FieldSpec {
    pub const fn required(name: &'static str, kind: FieldKind) -> Self {
        FieldSpec {
            name,
            kind,
            required: true,
        }
    }

    pub const fn optional(name: &'static str, kind: FieldKind) -> Self {
        FieldSpec {
            name,
            kind,
            required: false,
        }
    }
}

/// Ordered field schema of one section type
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldSchema {
    fields: Vec<FieldSpec>,
}

impl FieldSchema {
    pub fn new(fields: Vec<FieldSpec>) -> Self {
        FieldSchema { fields }
    }

    pub fn from_static(fields: &'static [FieldSpec]) -> Self {
        FieldSchema {
            fields: fields.to_vec(),
        }
    }

    /// Fields in declaration order
    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.field(name).is_some()
    }

    pub fn required_fields(&self) -> impl Iterator<Item = &FieldSpec> {
        self.fields.iter().filter(|f| f.required)
    }

    /// Check every declared field of `record` and coerce it.
    ///
    /// All offending fields are collected before failing. Fields the schema
    /// does not declare are ignored.
    pub fn validate(&self, section_type: SectionType, record: &RawRecord) -> CatalogueResult<ValidatedRecord> {
        let mut values = BTreeMap::new();
        let mut violations = Vec::new();

        for spec in &self.fields {
            let stored = record.get(spec.name).unwrap_or(&FieldValue::Null);
            match spec.kind.coerce(stored) {
                Ok(Some(value)) => {
                    values.insert(spec.name, value);
                }
                Ok(None) if spec.required => {
                    let reason = if record.get(spec.name).is_some() {
                        "required field is null"
                    } else {
                        "missing required field"
                    };
                    violations.push(FieldViolation::new(spec.name, reason));
                }
                Ok(None) => {}
                Err(reason) => violations.push(FieldViolation::new(spec.name, reason)),
            }
        }

        if !violations.is_empty() {
            return Err(CatalogueError::schema_violation(
                section_type,
                record.designation.clone(),
                violations,
            ));
        }

        Ok(ValidatedRecord {
            section_type,
            designation: record.designation.clone(),
            values,
        })
    }
}

// ============================================================================
// Typed field access
// ============================================================================

/// Rust types a schema field can be read into
pub trait FieldType: Sized {
    const KIND: FieldKind;

    /// Read from a value already coerced to [`Self::KIND`]
    fn from_value(value: &FieldValue) -> Option<Self>;

    fn to_value(&self) -> FieldValue;
}

impl FieldType for f64 {
    const KIND: FieldKind = FieldKind::Float;

    fn from_value(value: &FieldValue) -> Option<Self> {
        value.as_f64()
    }

    fn to_value(&self) -> FieldValue {
        FieldValue::Float(*self)
    }
}

impl FieldType for i64 {
    const KIND: FieldKind = FieldKind::Integer;

    fn from_value(value: &FieldValue) -> Option<Self> {
        match value {
            FieldValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    fn to_value(&self) -> FieldValue {
        FieldValue::Integer(*self)
    }
}

impl FieldType for String {
    const KIND: FieldKind = FieldKind::Text;

    fn from_value(value: &FieldValue) -> Option<Self> {
        value.as_str().map(str::to_string)
    }

    fn to_value(&self) -> FieldValue {
        FieldValue::Text(self.clone())
    }
}

impl FieldType for bool {
    const KIND: FieldKind = FieldKind::Bool;

    fn from_value(value: &FieldValue) -> Option<Self> {
        match value {
            FieldValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    fn to_value(&self) -> FieldValue {
        FieldValue::Bool(*self)
    }
}

/// A raw record that passed [`FieldSchema::validate`]
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedRecord {
    section_type: SectionType,
    designation: String,
    values: BTreeMap<&'static str, FieldValue>,
}

impl ValidatedRecord {
    pub fn section_type(&self) -> SectionType {
        self.section_type
    }

    pub fn designation(&self) -> &str {
        &self.designation
    }

    /// Coerced, non-null values keyed by field name
    pub fn values(&self) -> impl Iterator<Item = (&'static str, &FieldValue)> {
        self.values.iter().map(|(k, v)| (*k, v))
    }

    /// Read a required field.
    ///
    /// Validation guarantees presence for declared required fields, so a miss
    /// here means the constructor asked for a field its schema never declared.
    pub fn required<T: FieldType>(&self, field: &str) -> CatalogueResult<T> {
        self.values
            .get(field)
            .and_then(T::from_value)
            .ok_or_else(|| {
                CatalogueError::schema_violation(
                    self.section_type,
                    self.designation.clone(),
                    vec![FieldViolation::new(
                        field,
                        format!("constructor requires {} field not declared in schema", T::KIND),
                    )],
                )
            })
    }

    pub fn optional<T: FieldType>(&self, field: &str) -> Option<T> {
        self.values.get(field).and_then(T::from_value)
    }
}

// ============================================================================
// Registry
// ============================================================================

/// Builds a typed section from a validated record
pub type SectionConstructor =
    Arc<dyn Fn(SectionType, &ValidatedRecord) -> CatalogueResult<Section> + Send + Sync>;

#[derive(Clone)]
struct Registration {
    section_type: SectionType,
    schema: Arc<FieldSchema>,
    constructor: SectionConstructor,
}

/// Per-region registry of section schemas and constructors.
///
/// Registration order is significant: auto-detection walks types in the
/// order they were registered.
#[derive(Clone)]
pub struct SchemaRegistry {
    region: Region,
    entries: Vec<Registration>,
    index: HashMap<SectionType, usize>,
}

impl std::fmt::Debug for SchemaRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SchemaRegistry")
            .field("region", &self.region)
            .field("types", &self.registered_types())
            .finish()
    }
}

impl SchemaRegistry {
    /// Create an empty registry for a region
    pub fn new(region: Region) -> Self {
        SchemaRegistry {
            region,
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Registry with every built-in section type of the region installed
    pub fn for_region(region: Region) -> Self {
        let mut registry = SchemaRegistry::new(region);
        for &section_type in region.supported_types() {
            let (schema, constructor) = sections::builtin(region, section_type);
            registry.entries.push(Registration {
                section_type,
                schema: Arc::new(schema),
                constructor,
            });
            registry.index.insert(section_type, registry.entries.len() - 1);
        }
        registry
    }

    pub fn region(&self) -> Region {
        self.region
    }

    /// Register a section type. Each type may be registered once.
    pub fn register(
        &mut self,
        section_type: SectionType,
        schema: FieldSchema,
        constructor: SectionConstructor,
    ) -> CatalogueResult<()> {
        if self.index.contains_key(&section_type) {
            return Err(CatalogueError::DuplicateRegistration { section_type });
        }
        self.entries.push(Registration {
            section_type,
            schema: Arc::new(schema),
            constructor,
        });
        self.index.insert(section_type, self.entries.len() - 1);
        tracing::debug!(region = %self.region, section_type = %section_type, "registered section type");
        Ok(())
    }

    pub fn is_registered(&self, section_type: SectionType) -> bool {
        self.index.contains_key(&section_type)
    }

    /// Registered types in registration order
    pub fn registered_types(&self) -> Vec<SectionType> {
        self.entries.iter().map(|e| e.section_type).collect()
    }

    pub fn get_schema(&self, section_type: SectionType) -> CatalogueResult<Arc<FieldSchema>> {
        self.entry(section_type).map(|e| Arc::clone(&e.schema))
    }

    /// Validate `record` against the type's schema and build the typed section
    pub fn construct(&self, section_type: SectionType, record: &RawRecord) -> CatalogueResult<Section> {
        let entry = self.entry(section_type)?;
        let validated = entry.schema.validate(section_type, record)?;
        (entry.constructor)(section_type, &validated)
    }

    fn entry(&self, section_type: SectionType) -> CatalogueResult<&Registration> {
        self.index
            .get(&section_type)
            .map(|&i| &self.entries[i])
            .ok_or(CatalogueError::TypeNotRegistered {
                region: self.region,
                section_type,
            })
    }
}
