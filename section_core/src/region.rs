//! Regions (national / standards-body scopes).
//!
//! Each region has its own set of tables and its own slice of the schema
//! registry. The order of [`Region::supported_types`] is the registration
//! order, which is also the order auto-detection walks when a designation
//! is looked up without an explicit type.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::CatalogueError;
use crate::section_type::SectionType;

/// Standards region
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Region {
    /// United Kingdom (BS EN / SCI)
    UK,
    /// Europe (EN / ArcelorMittal)
    EU,
    /// United States (AISC)
    US,
}

impl Region {
    /// All regions for iteration
    pub const ALL: [Region; 3] = [Region::UK, Region::EU, Region::US];

    /// Region code, also the data directory name (`data/UK/UB.json`)
    pub fn code(&self) -> &'static str {
        match self {
            Region::UK => "UK",
            Region::EU => "EU",
            Region::US => "US",
        }
    }

    /// Get display name
    pub fn display_name(&self) -> &'static str {
        match self {
            Region::UK => "United Kingdom (SCI Blue Book)",
            Region::EU => "Europe (ArcelorMittal)",
            Region::US => "United States (AISC Shapes Database)",
        }
    }

    /// Section types this region serves, in registration order
    pub fn supported_types(&self) -> &'static [SectionType] {
        match self {
            Region::UK => &[
                SectionType::UB,
                SectionType::UC,
                SectionType::UBP,
                SectionType::PFC,
                SectionType::LEqual,
                SectionType::LUnequal,
                SectionType::LEqualB2b,
                SectionType::LUnequalB2b,
                SectionType::HFCHS,
                SectionType::HFRHS,
                SectionType::HFSHS,
                SectionType::HFEHS,
                SectionType::CFCHS,
                SectionType::CFRHS,
                SectionType::CFSHS,
                SectionType::Welds,
                SectionType::BoltPre88,
                SectionType::BoltPre109,
            ],
            Region::EU => &[
                SectionType::IPE,
                SectionType::HE,
                SectionType::HL,
                SectionType::UB,
                SectionType::HD,
                SectionType::UC,
                SectionType::HP,
                SectionType::UBP,
                SectionType::UPE,
                SectionType::UPN,
                SectionType::PFC,
                SectionType::LEqual,
                SectionType::LUnequal,
                SectionType::LEqualB2b,
                SectionType::LUnequalB2b,
            ],
            Region::US => &[
                SectionType::W,
                SectionType::S,
                SectionType::M,
                SectionType::C,
                SectionType::MC,
                SectionType::LEqual,
                SectionType::LUnequal,
                SectionType::WT,
                SectionType::ST,
                SectionType::MT,
                SectionType::HP,
                SectionType::HssRct,
                SectionType::HssSqr,
                SectionType::HssRnd,
                SectionType::Pipe,
            ],
        }
    }

    /// Check whether a section type belongs to this region
    pub fn supports(&self, section_type: SectionType) -> bool {
        self.supported_types().contains(&section_type)
    }
}

impl std::fmt::Display for Region {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Region {
    type Err = CatalogueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Region::ALL
            .iter()
            .copied()
            .find(|r| r.code().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| CatalogueError::UnknownRegion {
                name: s.to_string(),
                expected: Region::ALL.map(|r| r.code()).join(", "),
            })
    }
}
