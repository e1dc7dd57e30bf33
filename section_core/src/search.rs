//! # Search Predicates
//!
//! Attribute search over one section table: a conjunction of
//! [`Predicate`]s, each `(field, operator, operand)`.
//!
//! Queries are built with [`SearchQuery`] or parsed once from the
//! `field__op=value` string form, then validated against the table's schema
//! before any record is scanned. An unknown field, unknown operator, or an
//! ordering comparison on a non-numeric field is an `InvalidPredicate` error.
//!
//! ## Evaluation rules
//!
//! - Numeric fields: stored value and operand are both coerced to numbers
//! - Text and bool fields: `eq` / `ne` only, compared after coercing the
//!   operand to the field's kind
//! - A stored value that is missing, null, or not coercible makes the
//!   predicate false (so `ne` does not match records lacking the field)
//!
//! ```rust
//! use section_core::search::SearchQuery;
//!
//! let query = SearchQuery::new().gt("mass_per_metre", 100.0).lte("h", 700.0);
//! assert_eq!(query.predicates().len(), 2);
//!
//! let parsed = SearchQuery::from_criteria([("mass_per_metre__gt", "100")]).unwrap();
//! assert_eq!(parsed.predicates()[0].field, "mass_per_metre");
//! ```

use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::errors::{CatalogueError, CatalogueResult};
use crate::schema::{FieldKind, FieldSchema};
use crate::value::{FieldValue, RawRecord};

/// Comparison operator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operator {
    Eq,
    Ne,
    Gt,
    Lt,
    Gte,
    Lte,
}

impl Operator {
    pub const ALL: [Operator; 6] = [
        Operator::Eq,
        Operator::Ne,
        Operator::Gt,
        Operator::Lt,
        Operator::Gte,
        Operator::Lte,
    ];

    /// Suffix used in the `field__op` form
    pub fn suffix(&self) -> &'static str {
        match self {
            Operator::Eq => "eq",
            Operator::Ne => "ne",
            Operator::Gt => "gt",
            Operator::Lt => "lt",
            Operator::Gte => "gte",
            Operator::Lte => "lte",
        }
    }

    /// Needs an ordered (numeric) field
    pub fn is_ordering(&self) -> bool {
        matches!(self, Operator::Gt | Operator::Lt | Operator::Gte | Operator::Lte)
    }

    fn compare_numbers(&self, stored: f64, operand: f64) -> bool {
        match self {
            Operator::Eq => stored == operand,
            Operator::Ne => stored != operand,
            Operator::Gt => stored > operand,
            Operator::Lt => stored < operand,
            Operator::Gte => stored >= operand,
            Operator::Lte => stored <= operand,
        }
    }
}

impl std::fmt::Display for Operator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.suffix())
    }
}

impl FromStr for Operator {
    type Err = CatalogueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Operator::ALL
            .iter()
            .copied()
            .find(|op| op.suffix() == s)
            .ok_or_else(|| {
                CatalogueError::invalid_predicate(
                    "",
                    s,
                    "unknown operator (expected one of: eq, ne, gt, lt, gte, lte)",
                )
            })
    }
}

/// One `(field, operator, operand)` condition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Predicate {
    pub field: String,
    pub operator: Operator,
    pub operand: FieldValue,
}

impl Predicate {
    pub fn new(field: impl Into<String>, operator: Operator, operand: impl Into<FieldValue>) -> Self {
        Predicate {
            field: field.into(),
            operator,
            operand: operand.into(),
        }
    }

    /// Parse a `field__op` key; a bare `field` means `eq`.
    ///
    /// The split is on the last `__`, so field names may themselves contain
    /// double underscores as long as an operator suffix is given.
    pub fn parse_criterion(key: &str, operand: impl Into<FieldValue>) -> CatalogueResult<Self> {
        let (field, operator) = match key.rsplit_once("__") {
            Some((field, suffix)) => {
                let operator = suffix.parse::<Operator>().map_err(|_| {
                    CatalogueError::invalid_predicate(
                        field,
                        suffix,
                        "unknown operator (expected one of: eq, ne, gt, lt, gte, lte)",
                    )
                })?;
                (field, operator)
            }
            None => (key, Operator::Eq),
        };

        if field.is_empty() {
            return Err(CatalogueError::invalid_predicate(key, operator.suffix(), "empty field name"));
        }

        Ok(Predicate::new(field, operator, operand))
    }

    /// Check the predicate against a schema and resolve how to compare
    fn bind(&self, schema: &FieldSchema) -> CatalogueResult<BoundPredicate> {
        let kind = if self.field == "designation" {
            FieldKind::Text
        } else {
            schema
                .field(&self.field)
                .map(|spec| spec.kind)
                .ok_or_else(|| self.invalid("unknown field for this section type"))?
        };

        if kind.is_numeric() {
            let operand = self
                .operand
                .to_number()
                .ok_or_else(|| self.invalid(format!("operand '{}' is not numeric", self.operand)))?;
            return Ok(BoundPredicate::Numeric {
                field: self.field.clone(),
                operator: self.operator,
                operand,
            });
        }

        if self.operator.is_ordering() {
            return Err(self.invalid(format!("ordering comparison on {} field", kind)));
        }

        let operand = kind
            .coerce(&self.operand)
            .map_err(|reason| self.invalid(format!("operand does not match field: {}", reason)))?
            .ok_or_else(|| self.invalid("operand must not be null"))?;

        Ok(BoundPredicate::Equality {
            field: self.field.clone(),
            kind,
            negate: self.operator == Operator::Ne,
            operand,
        })
    }

    fn invalid(&self, reason: impl Into<String>) -> CatalogueError {
        CatalogueError::invalid_predicate(self.field.clone(), self.operator.suffix(), reason)
    }
}

impl std::fmt::Display for Predicate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}__{}={}", self.field, self.operator, self.operand)
    }
}

/// A predicate validated against a schema
#[derive(Debug, Clone)]
enum BoundPredicate {
    Numeric {
        field: String,
        operator: Operator,
        operand: f64,
    },
    Equality {
        field: String,
        kind: FieldKind,
        negate: bool,
        operand: FieldValue,
    },
}

impl BoundPredicate {
    fn matches(&self, record: &RawRecord) -> bool {
        match self {
            BoundPredicate::Numeric { field, operator, operand } => record
                .value(field)
                .and_then(|v| v.to_number())
                .map(|stored| operator.compare_numbers(stored, *operand))
                .unwrap_or(false),
            BoundPredicate::Equality { field, kind, negate, operand } => {
                let stored = match record.value(field) {
                    Some(v) => v,
                    None => return false,
                };
                match kind.coerce(&stored) {
                    Ok(Some(stored)) => (stored == *operand) != *negate,
                    _ => false,
                }
            }
        }
    }
}

/// Conjunction of predicates against one table
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchQuery {
    predicates: Vec<Predicate>,
}

impl SearchQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse `field__op` / value pairs, as received at a string boundary
    pub fn from_criteria<I, K, V>(criteria: I) -> CatalogueResult<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let predicates = criteria
            .into_iter()
            .map(|(key, value)| Predicate::parse_criterion(key.as_ref(), FieldValue::infer(value.as_ref())))
            .collect::<CatalogueResult<Vec<_>>>()?;
        Ok(SearchQuery { predicates })
    }

    pub fn with(mut self, predicate: Predicate) -> Self {
        self.predicates.push(predicate);
        self
    }

    pub fn eq(self, field: impl Into<String>, operand: impl Into<FieldValue>) -> Self {
        self.with(Predicate::new(field, Operator::Eq, operand))
    }

    pub fn ne(self, field: impl Into<String>, operand: impl Into<FieldValue>) -> Self {
        self.with(Predicate::new(field, Operator::Ne, operand))
    }

    pub fn gt(self, field: impl Into<String>, operand: impl Into<FieldValue>) -> Self {
        self.with(Predicate::new(field, Operator::Gt, operand))
    }

    pub fn lt(self, field: impl Into<String>, operand: impl Into<FieldValue>) -> Self {
        self.with(Predicate::new(field, Operator::Lt, operand))
    }

    pub fn gte(self, field: impl Into<String>, operand: impl Into<FieldValue>) -> Self {
        self.with(Predicate::new(field, Operator::Gte, operand))
    }

    pub fn lte(self, field: impl Into<String>, operand: impl Into<FieldValue>) -> Self {
        self.with(Predicate::new(field, Operator::Lte, operand))
    }

    pub fn predicates(&self) -> &[Predicate] {
        &self.predicates
    }

    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }

    /// Validate every predicate against `schema`
    pub fn bind(&self, schema: &FieldSchema) -> CatalogueResult<BoundQuery> {
        let predicates = self
            .predicates
            .iter()
            .map(|p| p.bind(schema))
            .collect::<CatalogueResult<Vec<_>>>()?;
        Ok(BoundQuery { predicates })
    }

    /// Validate every predicate, then filter `records` keeping their order.
    ///
    /// Nothing is scanned if any predicate is invalid.
    pub fn execute<'a, I>(&self, schema: &FieldSchema, records: I) -> CatalogueResult<Vec<(String, Arc<RawRecord>)>>
    where
        I: IntoIterator<Item = &'a Arc<RawRecord>>,
    {
        Ok(self.bind(schema)?.scan(records))
    }
}

/// A [`SearchQuery`] whose predicates all passed validation
#[derive(Debug, Clone)]
pub struct BoundQuery {
    predicates: Vec<BoundPredicate>,
}

impl BoundQuery {
    pub fn len(&self) -> usize {
        self.predicates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }

    /// Records satisfying every predicate, in the order given
    pub fn scan<'a, I>(&self, records: I) -> Vec<(String, Arc<RawRecord>)>
    where
        I: IntoIterator<Item = &'a Arc<RawRecord>>,
    {
        records
            .into_iter()
            .filter(|record| self.predicates.iter().all(|p| p.matches(record)))
            .map(|record| (record.designation.clone(), Arc::clone(record)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::FieldSpec;

    fn schema() -> FieldSchema {
        FieldSchema::new(vec![
            FieldSpec::required("mass_per_metre", FieldKind::Float),
            FieldSpec::optional("serial_size", FieldKind::Text),
            FieldSpec::optional("is_additional", FieldKind::Bool),
            FieldSpec::optional("count", FieldKind::Integer),
        ])
    }

    fn records() -> Vec<Arc<RawRecord>> {
        vec![
            Arc::new(RawRecord::new("a").with("mass_per_metre", 67.1).with("serial_size", "457x191")),
            Arc::new(RawRecord::new("b").with("mass_per_metre", 137.0).with("is_additional", true)),
            Arc::new(RawRecord::new("c").with("mass_per_metre", "100").with("serial_size", "457x191")),
            Arc::new(RawRecord::new("d").with("serial_size", "305x305")),
        ]
    }

    fn designations(query: &SearchQuery) -> Vec<String> {
        query
            .execute(&schema(), &records())
            .unwrap()
            .into_iter()
            .map(|(d, _)| d)
            .collect()
    }

    #[test]
    fn test_parse_criterion() {
        let p = Predicate::parse_criterion("mass_per_metre__gte", 100).unwrap();
        assert_eq!(p.field, "mass_per_metre");
        assert_eq!(p.operator, Operator::Gte);
        let bare = Predicate::parse_criterion("serial_size", "457x191").unwrap();
        assert_eq!(bare.operator, Operator::Eq);
        let err = Predicate::parse_criterion("mass_per_metre__gtx", 1).unwrap_err();
        assert!(err.is_caller_error());
        assert!(err.to_string().contains("mass_per_metre__gtx"));
    }

    #[test]
    fn test_numeric_comparisons_coerce() {
        assert_eq!(designations(&SearchQuery::new().gt("mass_per_metre", 100)), vec!["b"]);
        assert_eq!(designations(&SearchQuery::new().gte("mass_per_metre", "100")), vec!["b", "c"]);
        assert_eq!(designations(&SearchQuery::new().eq("mass_per_metre", 100.0)), vec!["c"]);
        assert_eq!(designations(&SearchQuery::new().lt("mass_per_metre", 1000)), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_conjunction_and_empty_query() {
        let q = SearchQuery::new().gt("mass_per_metre", 50).eq("serial_size", "457x191");
        assert_eq!(designations(&q), vec!["a", "c"]);
        assert_eq!(designations(&SearchQuery::new()), vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn test_text_bool_and_designation_equality() {
        assert_eq!(designations(&SearchQuery::new().ne("serial_size", "457x191")), vec!["d"]);
        assert_eq!(designations(&SearchQuery::new().eq("is_additional", true)), vec!["b"]);
        assert_eq!(designations(&SearchQuery::new().eq("designation", "c")), vec!["c"]);
    }

    #[test]
    fn test_invalid_predicates_fail_before_scan() {
        let unknown = SearchQuery::new().gt("nonexistent_field", 1);
        let err = unknown.execute(&schema(), &records()).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_PREDICATE");
        assert!(err.to_string().contains("nonexistent_field"));

        let ordering_on_text = SearchQuery::new().gt("serial_size", "a");
        assert!(ordering_on_text.execute(&schema(), &records()).is_err());

        let bad_operand = SearchQuery::new().gt("mass_per_metre", "heavy");
        assert!(bad_operand.execute(&schema(), &records()).is_err());

        let bad_bool = SearchQuery::new().eq("is_additional", "maybe");
        assert!(bad_bool.execute(&schema(), &records()).is_err());
    }

    #[test]
    fn test_bound_query_scans_any_records() {
        let bound = SearchQuery::new().gt("mass_per_metre", 100).bind(&schema()).unwrap();
        assert_eq!(bound.len(), 1);
        let hits: Vec<String> = bound.scan(&records()).into_iter().map(|(d, _)| d).collect();
        assert_eq!(hits, vec!["b"]);
        assert!(bound.scan(&Vec::<Arc<RawRecord>>::new()).is_empty());
    }

    #[test]
    fn test_from_criteria_infers_operands() {
        let q = SearchQuery::from_criteria([("mass_per_metre__gt", "100"), ("serial_size", "457x191")]).unwrap();
        assert_eq!(q.predicates()[0].operand, FieldValue::Integer(100));
        assert_eq!(q.predicates()[1].operand, FieldValue::Text("457x191".into()));
        assert!(designations(&q).is_empty());
    }
}
