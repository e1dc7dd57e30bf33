//! End-to-end lookup and search scenarios.
//!
//! Fixtures are written as JSON tables into a temp data root so the full
//! path (JSON source, store, registry, database, factory) is exercised.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use serde_json::json;

use section_core::sections::UniversalSection;
use section_core::store::{JsonDirectorySource, MemorySource, RecordSource};
use section_core::{
    Catalogue, CatalogueConfig, CatalogueError, FieldValue, RawRecord, Region, SearchQuery, SectionType,
};

fn write_table(root: &Path, region: &str, tag: &str, table: serde_json::Value) {
    let dir = root.join(region);
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join(format!("{tag}.json")), serde_json::to_string_pretty(&table).unwrap()).unwrap();
}

fn fixture_root() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    write_table(
        dir.path(),
        "UK",
        "UB",
        json!({
            "457x191x67": {"mass_per_metre": 67.1, "h": 460.0, "A": 85.5, "I_yy": 42200.0, "serial_size": "457x191"},
            "305x305x137": {"mass_per_metre": 137.0, "h": 320.5, "A": 174.0, "I_yy": 32800.0},
        }),
    );
    write_table(
        dir.path(),
        "UK",
        "UBP",
        json!({
            "305x305x137": {"mass_per_metre": 137.0, "h": 320.5, "A": 174.4, "I_yy": 32810.0},
        }),
    );
    dir
}

fn open(root: &Path) -> Catalogue {
    Catalogue::open(CatalogueConfig::with_data_root(root)).unwrap()
}

#[test]
fn test_lookup_by_explicit_type() {
    let dir = fixture_root();
    let catalogue = open(dir.path());

    let section = catalogue
        .create_section(Region::UK, "457x191x67", Some(SectionType::UB))
        .unwrap();
    assert_eq!(section.number("mass_per_metre"), Some(67.1));
    assert_eq!(section.number("h"), Some(460.0));
    assert_eq!(section.number("I_yy"), Some(42200.0));
}

#[test]
fn test_round_trip_through_typed_section() {
    let dir = fixture_root();
    let catalogue = open(dir.path());

    let beam: UniversalSection = catalogue
        .factory(Region::UK)
        .create_as("457x191x67", Some(SectionType::UB))
        .unwrap();
    let stored = catalogue
        .database(Region::UK)
        .get(SectionType::UB, "457x191x67")
        .unwrap();

    for (field, value) in &stored.fields {
        assert_eq!(
            section_core::TypedSection::get(&beam, field).as_ref(),
            Some(value),
            "field {field}"
        );
    }
}

#[test]
fn test_search_greater_than() {
    let dir = fixture_root();
    let catalogue = open(dir.path());

    let results = catalogue
        .search_criteria(Region::UK, SectionType::UB, [("mass_per_metre__gt", "100")])
        .unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].0, "305x305x137");
    assert_eq!(results[0].1.get("mass_per_metre"), Some(&FieldValue::Float(137.0)));
}

#[test]
fn test_search_matches_brute_force() {
    let dir = fixture_root();
    let catalogue = open(dir.path());
    let database = catalogue.database(Region::UK);

    for threshold in [0.0, 67.1, 100.0, 137.0, 500.0] {
        let query = SearchQuery::new().gte("mass_per_metre", threshold);
        let found: Vec<String> = database
            .search(SectionType::UB, &query)
            .unwrap()
            .into_iter()
            .map(|(d, _)| d)
            .collect();
        let expected: Vec<String> = database
            .table(SectionType::UB)
            .unwrap()
            .records()
            .iter()
            .filter(|r| r.get("mass_per_metre").and_then(|v| v.as_f64()).unwrap_or(f64::MIN) >= threshold)
            .map(|r| r.designation.clone())
            .collect();
        assert_eq!(found, expected, "threshold {threshold}");
    }
}

#[test]
fn test_missing_designation_is_not_found() {
    let dir = fixture_root();
    let catalogue = open(dir.path());

    let err = catalogue
        .create_section(Region::UK, "does-not-exist", Some(SectionType::UB))
        .unwrap_err();
    assert!(err.is_recoverable());
    match err {
        CatalogueError::SectionNotFound {
            section_type,
            designation,
            ..
        } => {
            assert_eq!(section_type, Some(SectionType::UB));
            assert_eq!(designation, "does-not-exist");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_collision_across_types() {
    let dir = fixture_root();
    let catalogue = open(dir.path());
    let database = catalogue.database(Region::UK);

    let first = database.find("305x305x137").unwrap();
    assert!(first.is_ambiguous());
    assert_eq!(first.first().section_type, SectionType::UB);
    for _ in 0..3 {
        assert_eq!(database.find("305x305x137").unwrap(), first);
    }

    let auto = catalogue.create_section(Region::UK, "305x305x137", None).unwrap();
    assert_eq!(auto.section_type(), SectionType::UB);

    let explicit = catalogue
        .create_section(Region::UK, "305x305x137", Some(SectionType::UBP))
        .unwrap();
    assert_eq!(explicit.section_type(), SectionType::UBP);
    assert_eq!(explicit.number("A"), Some(174.4));
}

/// Every designation held by exactly one type must auto-detect to the same
/// section the explicit lookup builds. Returns how many were checked.
fn assert_auto_detect_matches_explicit(catalogue: &Catalogue, region: Region) -> usize {
    let database = catalogue.database(region);
    let types = database.get_available_types().unwrap();
    let mut checked = 0;

    for &section_type in &types {
        for designation in database.list_designations(section_type).unwrap() {
            let holders = types
                .iter()
                .filter(|&&t| database.table(t).unwrap().contains(&designation))
                .count();
            if holders != 1 {
                continue;
            }
            let detected = catalogue.create_section(region, &designation, None).unwrap();
            let explicit = catalogue
                .create_section(region, &designation, Some(section_type))
                .unwrap();
            assert_eq!(detected, explicit, "{region} {section_type} {designation}");
            checked += 1;
        }
    }
    checked
}

#[test]
fn test_auto_detect_is_sound() {
    let dir = fixture_root();
    let catalogue = open(dir.path());

    // 305x305x137 sits in both UB and UBP and is skipped
    assert_eq!(assert_auto_detect_matches_explicit(&catalogue, Region::UK), 1);

    let detected = catalogue.create_section(Region::UK, "457x191x67", None).unwrap();
    assert_eq!(detected.section_type(), SectionType::UB);
}

#[test]
fn test_load_is_idempotent() {
    let source = Arc::new(MemorySource::new().with_table(
        Region::UK,
        SectionType::UB,
        vec![RawRecord::new("457x191x67")
            .with("mass_per_metre", 67.1)
            .with("h", 453.4)
            .with("A", 85.5)
            .with("I_yy", 29400.0)],
    ));
    let catalogue = Catalogue::with_source(source.clone(), CatalogueConfig::default());

    let first = catalogue.store().load(Region::UK).unwrap();
    let reads = source.read_count();
    let second = catalogue.store().load(Region::UK).unwrap();
    assert_eq!(source.read_count(), reads);
    assert_eq!(first.len(), second.len());
    for (section_type, table) in &first {
        assert!(Arc::ptr_eq(table, &second[section_type]));
    }
}

#[test]
fn test_missing_required_field_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    write_table(
        dir.path(),
        "UK",
        "UB",
        json!({ "457x191x67": {"mass_per_metre": 67.1, "h": 453.4, "I_yy": 29400.0} }),
    );
    let catalogue = open(dir.path());

    let err = catalogue
        .create_section(Region::UK, "457x191x67", Some(SectionType::UB))
        .unwrap_err();
    match err {
        CatalogueError::SchemaViolation { violations, .. } => {
            assert_eq!(violations.len(), 1);
            assert_eq!(violations[0].field, "A");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_unknown_search_field_is_rejected() {
    let dir = fixture_root();
    let catalogue = open(dir.path());

    let err = catalogue
        .search_criteria(Region::UK, SectionType::UB, [("nonexistent_field__gt", "1")])
        .unwrap_err();
    assert!(err.is_caller_error());
    match err {
        CatalogueError::InvalidPredicate { field, operator, .. } => {
            assert_eq!(field, "nonexistent_field");
            assert_eq!(operator, "gt");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_bad_region_does_not_affect_others() {
    let dir = fixture_root();
    write_table(dir.path(), "EU", "IPE", json!({ "IPE 200": {"mass_per_metre": [22.4]} }));
    let catalogue = open(dir.path());

    let err = catalogue.list_sections(Region::EU, SectionType::IPE).unwrap_err();
    assert_eq!(err.error_code(), "STORE_UNAVAILABLE");
    assert_eq!(catalogue.list_sections(Region::UK, SectionType::UB).unwrap().len(), 2);
}

#[test]
fn test_bundled_data_is_valid() {
    let catalogue = Catalogue::open(CatalogueConfig::default()).unwrap();
    let source = JsonDirectorySource::new(&catalogue.config().data_root);

    for region in Region::ALL {
        let database = catalogue.database(region);
        for section_type in database.registered_types() {
            assert!(
                source.read_table(region, section_type).unwrap().is_some(),
                "missing bundled table {region}/{section_type}"
            );
            for designation in database.list_designations(section_type).unwrap() {
                catalogue
                    .create_section(region, &designation, Some(section_type))
                    .unwrap_or_else(|e| panic!("{region} {section_type} {designation}: {e}"));
            }
        }
    }

    for region in Region::ALL {
        assert!(assert_auto_detect_matches_explicit(&catalogue, region) > 0, "{region}");
    }

    let beam = catalogue.create_section(Region::UK, "457x191x67", None).unwrap();
    assert_eq!(beam.number("mass_per_metre"), Some(67.1));
    assert_eq!(beam.number("I_yy"), Some(29400.0));

    let shs = catalogue.database(Region::UK).find("200x200x10.0").unwrap();
    let types: Vec<SectionType> = shs.candidates().iter().map(|m| m.section_type).collect();
    assert_eq!(types, vec![SectionType::HFSHS, SectionType::CFSHS]);
}
