//! Section type tags.
//!
//! A [`SectionType`] names one catalogue table (Universal Beams, Equal Angles,
//! W-shapes, ...). The tag is static; which tags a region actually serves, and
//! which typed constructor each maps to, is decided by the region's
//! [`SchemaRegistry`](crate::schema::SchemaRegistry).
//!
//! The string form of a tag (`"UB"`, `"L_EQUAL"`, `"BOLT_PRE_88"`) is also the
//! raw table name in every backing store.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::CatalogueError;

/// Section catalogue tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SectionType {
    // === UK (BS EN 10365 / SCI Blue Book) ===
    /// Universal Beam
    UB,
    /// Universal Column
    UC,
    /// Universal Bearing Pile
    UBP,
    /// Parallel Flange Channel
    PFC,
    /// Equal angle
    #[serde(rename = "L_EQUAL")]
    LEqual,
    /// Unequal angle
    #[serde(rename = "L_UNEQUAL")]
    LUnequal,
    /// Equal angles, back to back
    #[serde(rename = "L_EQUAL_B2B")]
    LEqualB2b,
    /// Unequal angles, back to back
    #[serde(rename = "L_UNEQUAL_B2B")]
    LUnequalB2b,
    /// Hot finished circular hollow section
    HFCHS,
    /// Hot finished rectangular hollow section
    HFRHS,
    /// Hot finished square hollow section
    HFSHS,
    /// Hot finished elliptical hollow section
    HFEHS,
    /// Cold formed circular hollow section
    CFCHS,
    /// Cold formed rectangular hollow section
    CFRHS,
    /// Cold formed square hollow section
    CFSHS,
    /// Fillet weld resistances
    #[serde(rename = "WELDS")]
    Welds,
    /// Preloaded bolt, grade 8.8
    #[serde(rename = "BOLT_PRE_88")]
    BoltPre88,
    /// Preloaded bolt, grade 10.9
    #[serde(rename = "BOLT_PRE_109")]
    BoltPre109,

    // === EU (ArcelorMittal) ===
    /// Parallel flange I-beam
    IPE,
    /// Wide flange beam
    HE,
    /// Extra wide flange beam
    HL,
    /// Wide flange column
    HD,
    /// Wide flange bearing pile (EU and US)
    HP,
    /// Parallel flange channel (EU)
    UPE,
    /// Taper flange channel
    UPN,

    // === US (AISC Shapes Database) ===
    /// Wide flange shape
    W,
    /// American standard beam
    S,
    /// Miscellaneous shape
    M,
    /// American standard channel
    C,
    /// Miscellaneous channel
    MC,
    /// Tee cut from W-shape
    WT,
    /// Tee cut from M-shape
    MT,
    /// Tee cut from S-shape
    ST,
    /// Rectangular HSS
    #[serde(rename = "HSS_RCT")]
    HssRct,
    /// Square HSS
    #[serde(rename = "HSS_SQR")]
    HssSqr,
    /// Round HSS
    #[serde(rename = "HSS_RND")]
    HssRnd,
    /// Pipe
    #[serde(rename = "PIPE")]
    Pipe,
}

impl SectionType {
    /// All section types for iteration
    pub const ALL: [SectionType; 37] = [
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
        SectionType::IPE,
        SectionType::HE,
        SectionType::HL,
        SectionType::HD,
        SectionType::HP,
        SectionType::UPE,
        SectionType::UPN,
        SectionType::W,
        SectionType::S,
        SectionType::M,
        SectionType::C,
        SectionType::MC,
        SectionType::WT,
        SectionType::MT,
        SectionType::ST,
        SectionType::HssRct,
        SectionType::HssSqr,
        SectionType::HssRnd,
        SectionType::Pipe,
    ];

    /// Tag string, which is also the raw table name (`"L_EQUAL"`, `"UB"`)
    pub fn tag(&self) -> &'static str {
        match self {
            SectionType::UB => "UB",
            SectionType::UC => "UC",
            SectionType::UBP => "UBP",
            SectionType::PFC => "PFC",
            SectionType::LEqual => "L_EQUAL",
            SectionType::LUnequal => "L_UNEQUAL",
            SectionType::LEqualB2b => "L_EQUAL_B2B",
            SectionType::LUnequalB2b => "L_UNEQUAL_B2B",
            SectionType::HFCHS => "HFCHS",
            SectionType::HFRHS => "HFRHS",
            SectionType::HFSHS => "HFSHS",
            SectionType::HFEHS => "HFEHS",
            SectionType::CFCHS => "CFCHS",
            SectionType::CFRHS => "CFRHS",
            SectionType::CFSHS => "CFSHS",
            SectionType::Welds => "WELDS",
            SectionType::BoltPre88 => "BOLT_PRE_88",
            SectionType::BoltPre109 => "BOLT_PRE_109",
            SectionType::IPE => "IPE",
            SectionType::HE => "HE",
            SectionType::HL => "HL",
            SectionType::HD => "HD",
            SectionType::HP => "HP",
            SectionType::UPE => "UPE",
            SectionType::UPN => "UPN",
            SectionType::W => "W",
            SectionType::S => "S",
            SectionType::M => "M",
            SectionType::C => "C",
            SectionType::MC => "MC",
            SectionType::WT => "WT",
            SectionType::MT => "MT",
            SectionType::ST => "ST",
            SectionType::HssRct => "HSS_RCT",
            SectionType::HssSqr => "HSS_SQR",
            SectionType::HssRnd => "HSS_RND",
            SectionType::Pipe => "PIPE",
        }
    }

    /// Get display name
    pub fn display_name(&self) -> &'static str {
        match self {
            SectionType::UB => "Universal Beam (UB)",
            SectionType::UC => "Universal Column (UC)",
            SectionType::UBP => "Universal Bearing Pile (UBP)",
            SectionType::PFC => "Parallel Flange Channel (PFC)",
            SectionType::LEqual => "Equal Angle",
            SectionType::LUnequal => "Unequal Angle",
            SectionType::LEqualB2b => "Equal Angles Back to Back",
            SectionType::LUnequalB2b => "Unequal Angles Back to Back",
            SectionType::HFCHS => "Hot Finished Circular Hollow (HFCHS)",
            SectionType::HFRHS => "Hot Finished Rectangular Hollow (HFRHS)",
            SectionType::HFSHS => "Hot Finished Square Hollow (HFSHS)",
            SectionType::HFEHS => "Hot Finished Elliptical Hollow (HFEHS)",
            SectionType::CFCHS => "Cold Formed Circular Hollow (CFCHS)",
            SectionType::CFRHS => "Cold Formed Rectangular Hollow (CFRHS)",
            SectionType::CFSHS => "Cold Formed Square Hollow (CFSHS)",
            SectionType::Welds => "Fillet Welds",
            SectionType::BoltPre88 => "Preloaded Bolt 8.8",
            SectionType::BoltPre109 => "Preloaded Bolt 10.9",
            SectionType::IPE => "Parallel Flange I-Beam (IPE)",
            SectionType::HE => "Wide Flange Beam (HE)",
            SectionType::HL => "Extra Wide Flange Beam (HL)",
            SectionType::HD => "Wide Flange Column (HD)",
            SectionType::HP => "Bearing Pile (HP)",
            SectionType::UPE => "Parallel Flange Channel (UPE)",
            SectionType::UPN => "Taper Flange Channel (UPN)",
            SectionType::W => "Wide Flange (W)",
            SectionType::S => "American Standard (S)",
            SectionType::M => "Miscellaneous (M)",
            SectionType::C => "Channel (C)",
            SectionType::MC => "Miscellaneous Channel (MC)",
            SectionType::WT => "Tee (WT)",
            SectionType::MT => "Tee (MT)",
            SectionType::ST => "Tee (ST)",
            SectionType::HssRct => "HSS Rectangular",
            SectionType::HssSqr => "HSS Square",
            SectionType::HssRnd => "HSS Round",
            SectionType::Pipe => "Pipe",
        }
    }

    /// Check if the tag is a connection component rather than a member section
    pub fn is_connector(&self) -> bool {
        matches!(
            self,
            SectionType::Welds | SectionType::BoltPre88 | SectionType::BoltPre109
        )
    }

    /// Check if section type is hollow
    pub fn is_hollow(&self) -> bool {
        matches!(
            self,
            SectionType::HFCHS
                | SectionType::HFRHS
                | SectionType::HFSHS
                | SectionType::HFEHS
                | SectionType::CFCHS
                | SectionType::CFRHS
                | SectionType::CFSHS
                | SectionType::HssRct
                | SectionType::HssSqr
                | SectionType::HssRnd
                | SectionType::Pipe
        )
    }
}

impl std::fmt::Display for SectionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for SectionType {
    type Err = CatalogueError;

    /// Parse a tag case-insensitively (`"ub"`, `"l_equal"`, `"Bolt_Pre_88"`)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        SectionType::ALL
            .iter()
            .copied()
            .find(|t| t.tag().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| CatalogueError::UnknownSectionType { name: s.to_string() })
    }
}
