//! Universal I and H sections (SCI Blue Book / ArcelorMittal layout).
//!
//! Covers UB, UC and UBP in the UK and IPE, HE, HL, HD, HP, UB, UC and UBP
//! in the EU tables. Dimensions in mm, areas in cm², second moments in cm⁴,
//! moduli in cm³, warping constant in dm⁶.

section_record! {
    /// Universal beam, column or bearing pile
    pub struct UniversalSection {
        required {
            /// Mass per metre (kg/m)
            mass_per_metre: f64 => "mass_per_metre",
            /// Overall depth h (mm)
            depth_mm: f64 => "h",
            /// Cross-sectional area (cm²)
            area_cm2: f64 => "A",
            /// Second moment of area, major axis (cm⁴)
            iyy_cm4: f64 => "I_yy",
        }
        optional {
            /// Serial size, e.g. "457x191"
            serial_size: String => "serial_size",
            /// Non-standard size rolled on request
            is_additional: bool => "is_additional",
            /// Available in HISTAR grades (EU)
            histar_fy: bool => "histar_fy",
            /// Overall width b (mm)
            width_mm: f64 => "b",
            web_thickness_mm: f64 => "tw",
            flange_thickness_mm: f64 => "tf",
            root_radius_mm: f64 => "r",
            /// Depth between fillets (mm)
            depth_between_fillets_mm: f64 => "d",
            web_slenderness: f64 => "cw_tw",
            flange_slenderness: f64 => "cf_tf",
            /// End clearance C (mm)
            end_clearance_mm: f64 => "C",
            /// Notch length N (mm)
            notch_length_mm: f64 => "N",
            /// Notch depth n (mm)
            notch_depth_mm: f64 => "n",
            /// m²/m
            surface_area_per_metre: f64 => "surface_area_per_metre",
            /// m²/t
            surface_area_per_tonne: f64 => "surface_area_per_tonne",
            /// Second moment of area, minor axis (cm⁴)
            izz_cm4: f64 => "I_zz",
            /// Radius of gyration, major axis (cm)
            ryy_cm: f64 => "i_yy",
            /// Radius of gyration, minor axis (cm)
            rzz_cm: f64 => "i_zz",
            wel_yy_cm3: f64 => "W_el_yy",
            wel_zz_cm3: f64 => "W_el_zz",
            wpl_yy_cm3: f64 => "W_pl_yy",
            wpl_zz_cm3: f64 => "W_pl_zz",
            /// Buckling parameter U
            buckling_parameter: f64 => "U",
            /// Torsional index X
            torsional_index: f64 => "X",
            /// Warping constant I_w (dm⁶)
            warping_constant_dm6: f64 => "I_w",
            /// Torsion constant I_t (cm⁴)
            torsion_constant_cm4: f64 => "I_t",
        }
    }
}

impl UniversalSection {
    /// Serial size, falling back to the leading `DxB` of the designation
    pub fn nominal_size(&self) -> &str {
        match &self.serial_size {
            Some(size) => size,
            None => {
                let mut parts = self.designation.splitn(3, 'x');
                match (parts.next(), parts.next(), parts.next()) {
                    (Some(d), Some(b), Some(_)) => &self.designation[..d.len() + 1 + b.len()],
                    _ => &self.designation,
                }
            }
        }
    }

    /// Depth to width ratio, when the width is known
    pub fn aspect_ratio(&self) -> Option<f64> {
        self.width_mm
            .filter(|b| *b > 0.0)
            .map(|b| self.depth_mm / b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::FieldSchema;
    use crate::sections::TypedSection;
    use crate::section_type::SectionType;
    use crate::value::RawRecord;

    fn validated(record: &RawRecord) -> crate::schema::ValidatedRecord {
        FieldSchema::from_static(UniversalSection::FIELDS)
            .validate(SectionType::UB, record)
            .unwrap()
    }

    #[test]
    fn test_build_from_record() {
        let record = RawRecord::new("457x191x67")
            .with("mass_per_metre", 67.1)
            .with("h", 460)
            .with("A", 85.5)
            .with("I_yy", 42200.0)
            .with("tw", 8.5);
        let ub = UniversalSection::from_validated(SectionType::UB, &validated(&record)).unwrap();
        assert_eq!(ub.mass_per_metre, 67.1);
        assert_eq!(ub.depth_mm, 460.0);
        assert_eq!(ub.iyy_cm4, 42200.0);
        assert_eq!(ub.web_thickness_mm, Some(8.5));
        assert_eq!(ub.flange_thickness_mm, None);
    }

    #[test]
    fn test_missing_required_fields_rejected() {
        let record = RawRecord::new("457x191x67").with("mass_per_metre", 67.1);
        let err = FieldSchema::from_static(UniversalSection::FIELDS)
            .validate(SectionType::UB, &record)
            .unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("'h' missing required field"));
        assert!(msg.contains("'A' missing required field"));
        assert!(msg.contains("'I_yy' missing required field"));
    }

    #[test]
    fn test_serial_size_fallback() {
        let record = RawRecord::new("457x191x67")
            .with("mass_per_metre", 67.1)
            .with("h", 453.4)
            .with("A", 85.5)
            .with("I_yy", 29400.0)
            .with("b", 189.9);
        let ub = UniversalSection::from_validated(SectionType::UB, &validated(&record)).unwrap();
        assert_eq!(ub.nominal_size(), "457x191");
        let ratio = ub.aspect_ratio().unwrap();
        assert!((ratio - 453.4 / 189.9).abs() < 1e-12);
    }

    #[test]
    fn test_serde_uses_record_field_names() {
        let record = RawRecord::new("305x305x137")
            .with("mass_per_metre", 137.0)
            .with("h", 320.5)
            .with("A", 174.0)
            .with("I_yy", 32800.0);
        let uc = UniversalSection::from_validated(SectionType::UC, &validated(&record)).unwrap();
        let json = serde_json::to_value(&uc).unwrap();
        assert_eq!(json["h"], 320.5);
        assert_eq!(json["section_type"], "UC");
        let back: UniversalSection = serde_json::from_value(json).unwrap();
        assert_eq!(back, uc);
    }
}
