//! # Typed Sections
//!
//! One struct per section family, generated from a static field list by
//! [`section_record!`]. Each generated struct knows its schema
//! ([`TypedSection::FIELDS`]), how to build itself from a
//! [`ValidatedRecord`], and how to expose its values again by original
//! field name.
//!
//! [`Section`] is the tagged union the factory returns. Families:
//!
//! - **UK / EU**: [`UniversalSection`] (UB, UC, UBP, IPE, HE, HL, HD, HP),
//!   [`ChannelSection`] (PFC, UPE, UPN), the four angle families, hollow
//!   sections, [`PreloadedBolt`] and [`FilletWeld`]
//! - **US (AISC)**: [`AiscIShape`], [`AiscChannel`], [`AiscAngle`],
//!   [`AiscTee`], [`AiscRectangularHss`], [`AiscRoundHss`]
//! - [`GenericSection`] for types registered at runtime with a custom schema

use std::sync::Arc;

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::errors::CatalogueResult;
use crate::region::Region;
use crate::schema::{FieldSchema, FieldSpec, SectionConstructor, ValidatedRecord};
use crate::section_type::SectionType;
use crate::value::{FieldValue, RawRecord};

/// Declare a typed section struct from its field list.
///
/// ```ignore
/// section_record! {
///     /// Doc for the struct
///     pub struct Example {
///         required {
///             /// Overall depth (mm)
///             depth_mm: f64 => "h",
///         }
///         optional {
///             serial_size: String => "serial_size",
///         }
///     }
/// }
/// ```
///
/// Required fields become plain struct fields, optional ones `Option<T>`.
/// The string on the right is the column name in the raw record and the
/// serialized field name.
macro_rules! section_record {
    (
        $(#[$meta:meta])*
        pub struct $name:ident {
            required {
                $( $(#[$rmeta:meta])* $rfield:ident : $rty:ty => $rkey:literal, )*
            }
            optional {
                $( $(#[$ometa:meta])* $ofield:ident : $oty:ty => $okey:literal, )*
            }
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
        pub struct $name {
            pub section_type: $crate::section_type::SectionType,
            pub designation: String,
            $(
                $(#[$rmeta])*
                #[serde(rename = $rkey)]
                pub $rfield: $rty,
            )*
            $(
                $(#[$ometa])*
                #[serde(rename = $okey, default, skip_serializing_if = "Option::is_none")]
                pub $ofield: Option<$oty>,
            )*
        }

        impl $crate::sections::TypedSection for $name {
            const FIELDS: &'static [$crate::schema::FieldSpec] = &[
                $( $crate::schema::FieldSpec::required(
                    $rkey,
                    <$rty as $crate::schema::FieldType>::KIND,
                ), )*
                $( $crate::schema::FieldSpec::optional(
                    $okey,
                    <$oty as $crate::schema::FieldType>::KIND,
                ), )*
            ];

            fn from_validated(
                section_type: $crate::section_type::SectionType,
                record: &$crate::schema::ValidatedRecord,
            ) -> $crate::errors::CatalogueResult<Self> {
                Ok($name {
                    section_type,
                    designation: record.designation().to_string(),
                    $( $rfield: record.required::<$rty>($rkey)?, )*
                    $( $ofield: record.optional::<$oty>($okey), )*
                })
            }

            fn section_type(&self) -> $crate::section_type::SectionType {
                self.section_type
            }

            fn designation(&self) -> &str {
                &self.designation
            }

            fn properties(&self) -> Vec<(&'static str, $crate::value::FieldValue)> {
                #[allow(unused_mut)]
                let mut props = Vec::with_capacity(<Self as $crate::sections::TypedSection>::FIELDS.len());
                $( props.push(($rkey, $crate::schema::FieldType::to_value(&self.$rfield))); )*
                $(
                    if let Some(value) = &self.$ofield {
                        props.push(($okey, $crate::schema::FieldType::to_value(value)));
                    }
                )*
                props
            }
        }
    };
}

mod aisc;
mod angles;
mod channels;
mod connectors;
mod hollow;
mod universal;

pub use aisc::{AiscAngle, AiscChannel, AiscIShape, AiscRectangularHss, AiscRoundHss, AiscTee};
pub use angles::{EqualAngle, EqualAngleBackToBack, UnequalAngle, UnequalAngleBackToBack};
pub use channels::ChannelSection;
pub use connectors::{FilletWeld, PreloadedBolt};
pub use hollow::{CircularHollow, EllipticalHollow, RectangularHollow};
pub use universal::UniversalSection;

// ============================================================================
// Traits
// ============================================================================

/// A section struct backed by a static field schema
pub trait TypedSection: Sized {
    /// Declared fields, required first, in declaration order
    const FIELDS: &'static [FieldSpec];

    fn schema() -> FieldSchema {
        FieldSchema::from_static(Self::FIELDS)
    }

    fn from_validated(section_type: SectionType, record: &ValidatedRecord) -> CatalogueResult<Self>;

    fn section_type(&self) -> SectionType;

    fn designation(&self) -> &str;

    /// Present values in schema order, keyed by original field name
    fn properties(&self) -> Vec<(&'static str, FieldValue)>;

    /// Dynamic field access by original name; `designation` is included
    fn get(&self, field: &str) -> Option<FieldValue> {
        if field == "designation" {
            return Some(FieldValue::Text(self.designation().to_string()));
        }
        self.properties()
            .into_iter()
            .find(|(name, _)| *name == field)
            .map(|(_, value)| value)
    }

    fn to_record(&self) -> RawRecord {
        let mut record = RawRecord::new(self.designation());
        for (name, value) in self.properties() {
            record.fields.insert(name.to_string(), value);
        }
        record
    }
}

/// Conversion between a concrete family struct and [`Section`]
pub trait SectionKind: Sized {
    /// Family name as serialized in the `family` tag
    const FAMILY: &'static str;

    fn into_section(self) -> Section;

    /// Unwrap the family, handing the section back if it is another family
    fn from_section(section: Section) -> Result<Self, Section>;
}

/// Schema and constructor for a typed family, ready to register
pub fn registration<T>() -> (FieldSchema, SectionConstructor)
where
    T: TypedSection + SectionKind + 'static,
{
    let constructor: SectionConstructor =
        Arc::new(|section_type: SectionType, record: &ValidatedRecord| {
            T::from_validated(section_type, record).map(T::into_section)
        });
    (T::schema(), constructor)
}

// ============================================================================
// Section union
// ============================================================================

macro_rules! section_families {
    ( $( $(#[$doc:meta])* $variant:ident($ty:ident) => $family:literal, )* ) => {
        /// A typed section of any family
        #[derive(Debug, Clone, PartialEq, Serialize)]
        #[serde(tag = "family", rename_all = "snake_case")]
        pub enum Section {
            $( $(#[$doc])* $variant($ty), )*
            /// Runtime-registered type with a custom schema
            Generic(GenericSection),
        }

        impl Section {
            pub fn family(&self) -> &'static str {
                match self {
                    $( Section::$variant(_) => $family, )*
                    Section::Generic(_) => GenericSection::FAMILY,
                }
            }

            pub fn designation(&self) -> &str {
                match self {
                    $( Section::$variant(s) => TypedSection::designation(s), )*
                    Section::Generic(s) => &s.designation,
                }
            }

            pub fn section_type(&self) -> SectionType {
                match self {
                    $( Section::$variant(s) => TypedSection::section_type(s), )*
                    Section::Generic(s) => s.section_type,
                }
            }

            /// Present values in schema order, keyed by original field name
            pub fn properties(&self) -> Vec<(&'static str, FieldValue)> {
                match self {
                    $( Section::$variant(s) => s.properties(), )*
                    Section::Generic(s) => s.values.clone(),
                }
            }
        }

        $(
            impl SectionKind for $ty {
                const FAMILY: &'static str = $family;

                fn into_section(self) -> Section {
                    Section::$variant(self)
                }

                fn from_section(section: Section) -> Result<Self, Section> {
                    match section {
                        Section::$variant(inner) => Ok(inner),
                        other => Err(other),
                    }
                }
            }
        )*
    };
}

section_families! {
    /// UB, UC, UBP and the EU I/H families
    Universal(UniversalSection) => "universal",
    Channel(ChannelSection) => "channel",
    EqualAngle(EqualAngle) => "equal_angle",
    UnequalAngle(UnequalAngle) => "unequal_angle",
    EqualAngleBackToBack(EqualAngleBackToBack) => "equal_angle_back_to_back",
    UnequalAngleBackToBack(UnequalAngleBackToBack) => "unequal_angle_back_to_back",
    CircularHollow(CircularHollow) => "circular_hollow",
    RectangularHollow(RectangularHollow) => "rectangular_hollow",
    EllipticalHollow(EllipticalHollow) => "elliptical_hollow",
    PreloadedBolt(PreloadedBolt) => "preloaded_bolt",
    FilletWeld(FilletWeld) => "fillet_weld",
    /// W, S, M, HP
    AiscIShape(AiscIShape) => "aisc_i_shape",
    AiscChannel(AiscChannel) => "aisc_channel",
    AiscAngle(AiscAngle) => "aisc_angle",
    AiscTee(AiscTee) => "aisc_tee",
    AiscRectangularHss(AiscRectangularHss) => "aisc_rectangular_hss",
    AiscRoundHss(AiscRoundHss) => "aisc_round_hss",
}

impl Section {
    /// Dynamic field access by original name; `designation` is included
    pub fn get(&self, field: &str) -> Option<FieldValue> {
        if field == "designation" {
            return Some(FieldValue::Text(self.designation().to_string()));
        }
        self.properties()
            .into_iter()
            .find(|(name, _)| *name == field)
            .map(|(_, value)| value)
    }

    pub fn to_record(&self) -> RawRecord {
        let mut record = RawRecord::new(self.designation());
        for (name, value) in self.properties() {
            record.fields.insert(name.to_string(), value);
        }
        record
    }

    /// Numeric field shortcut (`section.number("mass_per_metre")`)
    pub fn number(&self, field: &str) -> Option<f64> {
        self.get(field).and_then(|v| v.as_f64())
    }
}

/// Section of a runtime-registered type: values kept by field name
#[derive(Debug, Clone, PartialEq)]
pub struct GenericSection {
    pub section_type: SectionType,
    pub designation: String,
    pub values: Vec<(&'static str, FieldValue)>,
}

impl GenericSection {
    pub fn from_validated(section_type: SectionType, record: &ValidatedRecord) -> Self {
        GenericSection {
            section_type,
            designation: record.designation().to_string(),
            values: record.values().map(|(k, v)| (k, v.clone())).collect(),
        }
    }

    /// Constructor for [`SchemaRegistry::register`](crate::schema::SchemaRegistry::register)
    pub fn constructor() -> SectionConstructor {
        Arc::new(|section_type: SectionType, record: &ValidatedRecord| {
            Ok(Section::Generic(GenericSection::from_validated(section_type, record)))
        })
    }
}

impl SectionKind for GenericSection {
    const FAMILY: &'static str = "generic";

    fn into_section(self) -> Section {
        Section::Generic(self)
    }

    fn from_section(section: Section) -> Result<Self, Section> {
        match section {
            Section::Generic(inner) => Ok(inner),
            other => Err(other),
        }
    }
}

impl Serialize for GenericSection {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len() + 2))?;
        map.serialize_entry("section_type", &self.section_type)?;
        map.serialize_entry("designation", &self.designation)?;
        for (name, value) in &self.values {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

// ============================================================================
// Built-in registrations
// ============================================================================

/// Schema and constructor a region uses for a built-in section type.
///
/// US shapes follow AISC field naming; everything else follows the UK / EU
/// Blue Book layout. The same tag can therefore map to different families
/// in different regions (`L_EQUAL`, `HP`).
pub fn builtin(region: Region, section_type: SectionType) -> (FieldSchema, SectionConstructor) {
    use SectionType::*;

    match (region, section_type) {
        (Region::US, W | S | M | HP) => registration::<AiscIShape>(),
        (Region::US, LEqual | LUnequal) => registration::<AiscAngle>(),

        (_, UB | UC | UBP | IPE | HE | HL | HD | HP) => registration::<UniversalSection>(),
        (_, PFC | UPE | UPN) => registration::<ChannelSection>(),
        (_, LEqual) => registration::<EqualAngle>(),
        (_, LUnequal) => registration::<UnequalAngle>(),
        (_, LEqualB2b) => registration::<EqualAngleBackToBack>(),
        (_, LUnequalB2b) => registration::<UnequalAngleBackToBack>(),
        (_, HFCHS | CFCHS) => registration::<CircularHollow>(),
        (_, HFRHS | HFSHS | CFRHS | CFSHS) => registration::<RectangularHollow>(),
        (_, HFEHS) => registration::<EllipticalHollow>(),
        (_, BoltPre88 | BoltPre109) => registration::<PreloadedBolt>(),
        (_, Welds) => registration::<FilletWeld>(),

        (_, W | S | M) => registration::<AiscIShape>(),
        (_, C | MC) => registration::<AiscChannel>(),
        (_, WT | MT | ST) => registration::<AiscTee>(),
        (_, HssRct | HssSqr) => registration::<AiscRectangularHss>(),
        (_, HssRnd | Pipe) => registration::<AiscRoundHss>(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::SchemaRegistry;

    fn ub_record() -> RawRecord {
        RawRecord::new("457x191x67")
            .with("mass_per_metre", 67.1)
            .with("h", 453.4)
            .with("b", 189.9)
            .with("A", 85.5)
            .with("I_yy", 29400.0)
            .with("serial_size", "457x191")
    }

    #[test]
    fn test_every_builtin_schema_is_unique_per_field() {
        for region in Region::ALL {
            for &section_type in region.supported_types() {
                let (schema, _) = builtin(region, section_type);
                let mut names: Vec<&str> = schema.fields().iter().map(|f| f.name).collect();
                let total = names.len();
                names.sort();
                names.dedup();
                assert_eq!(names.len(), total, "duplicate field in {region} {section_type}");
                assert!(schema.required_fields().count() > 0);
            }
        }
    }

    #[test]
    fn test_section_accessors() {
        let registry = SchemaRegistry::for_region(Region::UK);
        let section = registry.construct(SectionType::UB, &ub_record()).unwrap();
        assert_eq!(section.family(), "universal");
        assert_eq!(section.designation(), "457x191x67");
        assert_eq!(section.section_type(), SectionType::UB);
        assert_eq!(section.number("mass_per_metre"), Some(67.1));
        assert_eq!(section.get("designation"), Some(FieldValue::Text("457x191x67".into())));
        assert_eq!(section.get("tw"), None);
    }

    #[test]
    fn test_properties_follow_schema_order() {
        let registry = SchemaRegistry::for_region(Region::UK);
        let section = registry.construct(SectionType::UB, &ub_record()).unwrap();
        let names: Vec<&str> = section.properties().iter().map(|(n, _)| *n).collect();
        assert_eq!(names, vec!["mass_per_metre", "h", "A", "I_yy", "serial_size", "b"]);
    }

    #[test]
    fn test_to_record_keeps_declared_fields() {
        let registry = SchemaRegistry::for_region(Region::UK);
        let record = ub_record().with("not_in_schema", 1.0);
        let section = registry.construct(SectionType::UB, &record).unwrap();
        let back = section.to_record();
        assert_eq!(back.get("h"), Some(&FieldValue::Float(453.4)));
        assert!(back.get("not_in_schema").is_none());
    }

    #[test]
    fn test_section_kind_conversion() {
        let registry = SchemaRegistry::for_region(Region::UK);
        let section = registry.construct(SectionType::UB, &ub_record()).unwrap();
        let ub = UniversalSection::from_section(section.clone()).unwrap();
        assert_eq!(ub.depth_mm, 453.4);
        assert!(ChannelSection::from_section(section).is_err());
    }

    #[test]
    fn test_section_serializes_with_family_tag() {
        let registry = SchemaRegistry::for_region(Region::UK);
        let section = registry.construct(SectionType::UB, &ub_record()).unwrap();
        let json = serde_json::to_value(&section).unwrap();
        assert_eq!(json["family"], "universal");
        assert_eq!(json["section_type"], "UB");
        assert_eq!(json["I_yy"], 29400.0);
        assert!(json.get("tw").is_none());
    }

    #[test]
    fn test_generic_section_serializes_as_map() {
        let section = GenericSection {
            section_type: SectionType::HP,
            designation: "HP 305x88".to_string(),
            values: vec![("mass_per_metre", FieldValue::Float(88.0))],
        };
        let json = serde_json::to_value(section.into_section()).unwrap();
        assert_eq!(json["family"], "generic");
        assert_eq!(json["designation"], "HP 305x88");
        assert_eq!(json["mass_per_metre"], 88.0);
    }
}
