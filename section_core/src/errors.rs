//! # Error Types
//!
//! Structured error types for section_core. Lookup misses, data/schema
//! mismatches and caller mistakes are separate variants so callers can treat
//! an expected miss differently from a programming error.
//!
//! ## Example
//!
//! ```rust
//! use section_core::errors::{CatalogueError, CatalogueResult};
//! use section_core::SectionType;
//!
//! fn require_positive(field: &str, value: f64) -> CatalogueResult<f64> {
//!     if value <= 0.0 {
//!         return Err(CatalogueError::invalid_predicate(field, "gt", "operand must be positive"));
//!     }
//!     Ok(value)
//! }
//!
//! let miss = CatalogueError::section_not_found(Some(SectionType::UB), "999x999x999");
//! assert!(miss.is_recoverable());
//! assert!(require_positive("mass_per_metre", -1.0).is_err());
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::region::Region;
use crate::section_type::SectionType;

/// Result type alias for section_core operations
pub type CatalogueResult<T> = Result<T, CatalogueError>;

/// One offending field reported by a [`CatalogueError::SchemaViolation`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldViolation {
    /// Field name as it appears in the raw record
    pub field: String,
    /// What is wrong with it ("missing required field", "expected float, found text")
    pub reason: String,
}

impl FieldViolation {
    pub fn new(field: impl Into<String>, reason: impl Into<String>) -> Self {
        FieldViolation {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Structured error type for catalogue operations.
///
/// Each variant carries enough context to report what was attempted
/// (designation, section type, field, region) without re-running the call.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "details")]
pub enum CatalogueError {
    /// Designation absent from the addressed table, or from every table
    /// during auto-detection (`section_type: None`)
    #[error("{}", not_found_message(.section_type, .designation, .suggestions, .found_under))]
    SectionNotFound {
        section_type: Option<SectionType>,
        designation: String,
        /// Close designations, best first
        suggestions: Vec<String>,
        /// Another type in the same region that does hold this designation
        found_under: Option<SectionType>,
    },

    /// A raw record does not satisfy the schema of its section type
    #[error("Schema violation for {section_type} '{designation}': {}", join_violations(.violations))]
    SchemaViolation {
        section_type: SectionType,
        designation: String,
        violations: Vec<FieldViolation>,
    },

    /// A search predicate names an unknown field/operator or an unusable operand
    #[error("Invalid predicate '{field}__{operator}': {reason}")]
    InvalidPredicate {
        field: String,
        operator: String,
        reason: String,
    },

    /// Backing data for a region cannot be read or parsed
    #[error("Store unavailable for region {region}: {reason}")]
    StoreUnavailable { region: Region, reason: String },

    /// Two registrations for one section type in one region
    #[error("Section type {section_type} is already registered")]
    DuplicateRegistration { section_type: SectionType },

    /// A section type has data but no registered constructor in the region
    #[error("No constructor registered for section type {section_type} in region {region}")]
    TypeNotRegistered {
        region: Region,
        section_type: SectionType,
    },

    /// Region identifier not recognised
    #[error("Unknown region '{name}' (expected one of: {expected})")]
    UnknownRegion { name: String, expected: String },

    /// Section type tag not recognised
    #[error("Unknown section type '{name}'")]
    UnknownSectionType { name: String },

    /// File I/O error
    #[error("File error: {operation} on '{path}' - {reason}")]
    FileError {
        operation: String,
        path: String,
        reason: String,
    },

    /// File is locked by another user/process
    #[error("File locked: '{path}' is locked by {locked_by} since {locked_at}")]
    FileLocked {
        path: String,
        locked_by: String,
        locked_at: String,
    },

    /// JSON serialization/deserialization error
    #[error("Serialization error: {reason}")]
    SerializationError { reason: String },

    /// Configuration file or environment override is invalid
    #[error("Configuration error: {reason}")]
    ConfigError { reason: String },

    /// Generic internal error (should be rare)
    #[error("Internal error: {message}")]
    Internal { message: String },
}

fn not_found_message(
    section_type: &Option<SectionType>,
    designation: &str,
    suggestions: &[String],
    found_under: &Option<SectionType>,
) -> String {
    let mut msg = match section_type {
        Some(t) => format!("Section '{}' of type '{}' not found", designation, t),
        None => format!("Section '{}' not found in any type", designation),
    };
    if !suggestions.is_empty() {
        msg.push_str(&format!(". Try: '{}'?", suggestions.join("', '")));
    }
    if let Some(other) = found_under {
        msg.push_str(&format!(" Note: designation exists under type '{}'.", other));
    }
    msg
}

fn join_violations(violations: &[FieldViolation]) -> String {
    violations
        .iter()
        .map(|v| format!("'{}' {}", v.field, v.reason))
        .collect::<Vec<_>>()
        .join("; ")
}

impl CatalogueError {
    /// Create a SectionNotFound error without suggestions
    pub fn section_not_found(section_type: Option<SectionType>, designation: impl Into<String>) -> Self {
        CatalogueError::SectionNotFound {
            section_type,
            designation: designation.into(),
            suggestions: Vec::new(),
            found_under: None,
        }
    }

    /// Create a SchemaViolation error
    pub fn schema_violation(
        section_type: SectionType,
        designation: impl Into<String>,
        violations: Vec<FieldViolation>,
    ) -> Self {
        CatalogueError::SchemaViolation {
            section_type,
            designation: designation.into(),
            violations,
        }
    }

    /// Create an InvalidPredicate error
    pub fn invalid_predicate(field: impl Into<String>, operator: impl Into<String>, reason: impl Into<String>) -> Self {
        CatalogueError::InvalidPredicate {
            field: field.into(),
            operator: operator.into(),
            reason: reason.into(),
        }
    }

    /// Create a StoreUnavailable error
    pub fn store_unavailable(region: Region, reason: impl Into<String>) -> Self {
        CatalogueError::StoreUnavailable {
            region,
            reason: reason.into(),
        }
    }

    /// Create a FileError
    pub fn file_error(operation: impl Into<String>, path: impl Into<String>, reason: impl Into<String>) -> Self {
        CatalogueError::FileError {
            operation: operation.into(),
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a FileLocked error
    pub fn file_locked(path: impl Into<String>, locked_by: impl Into<String>, locked_at: impl Into<String>) -> Self {
        CatalogueError::FileLocked {
            path: path.into(),
            locked_by: locked_by.into(),
            locked_at: locked_at.into(),
        }
    }

    /// Create a ConfigError
    pub fn config(reason: impl Into<String>) -> Self {
        CatalogueError::ConfigError { reason: reason.into() }
    }

    /// Create an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        CatalogueError::Internal { message: message.into() }
    }

    /// Misses and lock contention are expected outcomes the caller can act on
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            CatalogueError::SectionNotFound { .. } | CatalogueError::FileLocked { .. }
        )
    }

    /// Misuse of the API: bad predicates, bad registrations, unknown tags
    pub fn is_caller_error(&self) -> bool {
        matches!(
            self,
            CatalogueError::InvalidPredicate { .. }
                | CatalogueError::DuplicateRegistration { .. }
                | CatalogueError::TypeNotRegistered { .. }
                | CatalogueError::UnknownRegion { .. }
                | CatalogueError::UnknownSectionType { .. }
        )
    }

    /// Get a short error code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            CatalogueError::SectionNotFound { .. } => "SECTION_NOT_FOUND",
            CatalogueError::SchemaViolation { .. } => "SCHEMA_VIOLATION",
            CatalogueError::InvalidPredicate { .. } => "INVALID_PREDICATE",
            CatalogueError::StoreUnavailable { .. } => "STORE_UNAVAILABLE",
            CatalogueError::DuplicateRegistration { .. } => "DUPLICATE_REGISTRATION",
            CatalogueError::TypeNotRegistered { .. } => "TYPE_NOT_REGISTERED",
            CatalogueError::UnknownRegion { .. } => "UNKNOWN_REGION",
            CatalogueError::UnknownSectionType { .. } => "UNKNOWN_SECTION_TYPE",
            CatalogueError::FileError { .. } => "FILE_ERROR",
            CatalogueError::FileLocked { .. } => "FILE_LOCKED",
            CatalogueError::SerializationError { .. } => "SERIALIZATION_ERROR",
            CatalogueError::ConfigError { .. } => "CONFIG_ERROR",
            CatalogueError::Internal { .. } => "INTERNAL_ERROR",
        }
    }
}
