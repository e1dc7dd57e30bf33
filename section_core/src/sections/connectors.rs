//! Connection components: preloaded bolts and fillet welds.

use crate::section_type::SectionType;

section_record! {
    /// Preloaded (friction grip) bolt, grade 8.8 or 10.9
    pub struct PreloadedBolt {
        required {
            /// Nominal diameter (mm)
            diameter_mm: f64 => "diameter",
        }
        optional {
            grade: String => "grade",
            /// Tensile stress area (mm²)
            tensile_area_mm2: f64 => "A_s",
            /// Preload F_p,C (kN)
            preload_kn: f64 => "F_p_C",
            /// Slip resistance, one friction interface (kN)
            slip_resistance_single_kn: f64 => "F_s_Rd_1",
            /// Slip resistance, two friction interfaces (kN)
            slip_resistance_double_kn: f64 => "F_s_Rd_2",
        }
    }
}

section_record! {
    /// Fillet weld resistance per unit length
    pub struct FilletWeld {
        required {
            /// Leg length s (mm)
            leg_length_mm: f64 => "size",
        }
        optional {
            weld_type: String => "weld_type",
            /// Throat thickness a (mm)
            throat_mm: f64 => "a",
            steel_grade: String => "steel_grade",
            /// Longitudinal resistance (kN/mm)
            longitudinal_kn_per_mm: f64 => "F_w_L",
            /// Transverse resistance (kN/mm)
            transverse_kn_per_mm: f64 => "F_w_T",
        }
    }
}

impl PreloadedBolt {
    /// Grade from the record, or the grade implied by the table
    pub fn effective_grade(&self) -> &str {
        match (&self.grade, self.section_type) {
            (Some(grade), _) => grade.as_str(),
            (None, SectionType::BoltPre109) => "10.9",
            (None, _) => "8.8",
        }
    }
}

impl FilletWeld {
    /// Throat from the record, else s / sqrt(2)
    pub fn effective_throat_mm(&self) -> f64 {
        self.throat_mm
            .unwrap_or(self.leg_length_mm / std::f64::consts::SQRT_2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::region::Region;
    use crate::schema::SchemaRegistry;
    use crate::sections::SectionKind;
    use crate::value::RawRecord;

    #[test]
    fn test_bolt_grade_from_table() {
        let registry = SchemaRegistry::for_region(Region::UK);
        let record = RawRecord::new("M20").with("diameter", 20);
        let bolt88 = PreloadedBolt::from_section(registry.construct(SectionType::BoltPre88, &record).unwrap()).unwrap();
        let bolt109 = PreloadedBolt::from_section(registry.construct(SectionType::BoltPre109, &record).unwrap()).unwrap();
        assert_eq!(bolt88.effective_grade(), "8.8");
        assert_eq!(bolt109.effective_grade(), "10.9");
        assert_eq!(bolt109.diameter_mm, 20.0);
    }

    #[test]
    fn test_weld_throat() {
        let registry = SchemaRegistry::for_region(Region::UK);
        let record = RawRecord::new("8mm S355").with("size", 8.0);
        let weld = FilletWeld::from_section(registry.construct(SectionType::Welds, &record).unwrap()).unwrap();
        assert!((weld.effective_throat_mm() - 5.656854).abs() < 1e-5);
    }
}
