//! Angles, single and back to back (UK / EU tables).
//!
//! Axes follow the Blue Book: y-y and z-z are the geometric axes, u-u and
//! v-v the principal axes.

section_record! {
    /// Equal leg angle
    pub struct EqualAngle {
        required {
            /// Mass per metre (kg/m)
            mass_per_metre: f64 => "mass_per_metre",
            /// Leg thickness t (mm)
            thickness_mm: f64 => "t",
            /// Cross-sectional area (cm²)
            area_cm2: f64 => "A",
        }
        optional {
            /// Leg size, e.g. "200x200"
            size: String => "hxh",
            is_additional: bool => "is_additional",
            /// Leg length (mm)
            leg_mm: f64 => "h",
            root_radius_mm: f64 => "r_1",
            toe_radius_mm: f64 => "r_2",
            /// Distance from back of leg to centroid (mm)
            centroid_mm: f64 => "c",
            iyy_cm4: f64 => "I_yy",
            izz_cm4: f64 => "I_zz",
            iuu_cm4: f64 => "I_uu",
            ivv_cm4: f64 => "I_vv",
            ryy_cm: f64 => "i_yy",
            rzz_cm: f64 => "i_zz",
            ruu_cm: f64 => "i_uu",
            rvv_cm: f64 => "i_vv",
            wel_yy_cm3: f64 => "W_el_yy",
            wel_zz_cm3: f64 => "W_el_zz",
            torsion_constant_cm4: f64 => "I_t",
            /// Equivalent slenderness coefficient
            phi_a: f64 => "phi_a",
        }
    }
}

section_record! {
    /// Unequal leg angle
    pub struct UnequalAngle {
        required {
            mass_per_metre: f64 => "mass_per_metre",
            thickness_mm: f64 => "t",
            area_cm2: f64 => "A",
        }
        optional {
            /// Leg sizes, e.g. "200x100"
            size: String => "hxb",
            is_additional: bool => "is_additional",
            /// Long leg (mm)
            long_leg_mm: f64 => "h",
            /// Short leg (mm)
            short_leg_mm: f64 => "b",
            root_radius_mm: f64 => "r_1",
            toe_radius_mm: f64 => "r_2",
            /// Back of short leg to y-y axis (mm)
            centroid_y_mm: f64 => "c_y",
            /// Back of long leg to z-z axis (mm)
            centroid_z_mm: f64 => "c_z",
            iyy_cm4: f64 => "I_yy",
            izz_cm4: f64 => "I_zz",
            iuu_cm4: f64 => "I_uu",
            ivv_cm4: f64 => "I_vv",
            ryy_cm: f64 => "i_yy",
            rzz_cm: f64 => "i_zz",
            ruu_cm: f64 => "i_uu",
            rvv_cm: f64 => "i_vv",
            wel_yy_cm3: f64 => "W_el_yy",
            wel_zz_cm3: f64 => "W_el_zz",
            torsion_constant_cm4: f64 => "I_t",
            phi_a: f64 => "phi_a",
            /// Tangent of the principal axis angle
            tan_alpha: f64 => "tan_alpha",
        }
    }
}

section_record! {
    /// Pair of equal angles, back to back
    pub struct EqualAngleBackToBack {
        required {
            mass_per_metre: f64 => "mass_per_metre",
            thickness_mm: f64 => "t",
            area_cm2: f64 => "A",
        }
        optional {
            size: String => "hxh",
            /// Gap between backs (mm)
            spacing_mm: f64 => "s",
            is_additional: bool => "is_additional",
            iyy_cm4: f64 => "I_yy",
            izz_cm4: f64 => "I_zz",
            ryy_cm: f64 => "i_yy",
            rzz_cm: f64 => "i_zz",
            wel_yy_cm3: f64 => "W_el_yy",
            wel_zz_cm3: f64 => "W_el_zz",
        }
    }
}

section_record! {
    /// Pair of unequal angles, back to back
    pub struct UnequalAngleBackToBack {
        required {
            mass_per_metre: f64 => "mass_per_metre",
            thickness_mm: f64 => "t",
            area_cm2: f64 => "A",
        }
        optional {
            size: String => "hxb",
            spacing_mm: f64 => "s",
            is_additional: bool => "is_additional",
            iyy_cm4: f64 => "I_yy",
            izz_cm4: f64 => "I_zz",
            ryy_cm: f64 => "i_yy",
            rzz_cm: f64 => "i_zz",
            wel_yy_cm3: f64 => "W_el_yy",
            wel_zz_cm3: f64 => "W_el_zz",
            tan_alpha: f64 => "tan_alpha",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::region::Region;
    use crate::schema::SchemaRegistry;
    use crate::sections::{Section, SectionKind};
    use crate::section_type::SectionType;
    use crate::value::RawRecord;

    #[test]
    fn test_equal_angle_from_registry() {
        let registry = SchemaRegistry::for_region(Region::UK);
        let record = RawRecord::new("200x200x16")
            .with("mass_per_metre", 48.5)
            .with("t", 16.0)
            .with("A", 61.8)
            .with("hxh", "200x200")
            .with("I_uu", 3760.0);
        let section = registry.construct(SectionType::LEqual, &record).unwrap();
        assert!(matches!(section, Section::EqualAngle(_)));
        let angle = EqualAngle::from_section(section).unwrap();
        assert_eq!(angle.size.as_deref(), Some("200x200"));
        assert_eq!(angle.iuu_cm4, Some(3760.0));
    }

    #[test]
    fn test_back_to_back_requires_thickness() {
        let registry = SchemaRegistry::for_region(Region::UK);
        let record = RawRecord::new("200x200x16")
            .with("mass_per_metre", 97.0)
            .with("A", 123.6)
            .with("s", 10.0);
        let err = registry.construct(SectionType::LEqualB2b, &record).unwrap_err();
        assert!(err.to_string().contains("'t' missing required field"));
    }
}
