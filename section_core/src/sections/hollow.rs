//! Hollow sections, hot finished and cold formed (UK tables).

section_record! {
    /// Circular hollow section (HFCHS, CFCHS)
    pub struct CircularHollow {
        required {
            /// Mass per metre (kg/m)
            mass_per_metre: f64 => "mass_per_metre",
            /// Cross-sectional area (cm²)
            area_cm2: f64 => "A",
        }
        optional {
            /// Outside diameter (mm)
            outside_diameter_mm: f64 => "d",
            /// Wall thickness (mm)
            thickness_mm: f64 => "t",
            d_t_ratio: f64 => "d_t",
            /// Second moment of area (cm⁴)
            i_cm4: f64 => "I",
            /// Radius of gyration (cm)
            r_cm: f64 => "i",
            wel_cm3: f64 => "W_el",
            wpl_cm3: f64 => "W_pl",
            torsion_constant_cm4: f64 => "I_t",
            /// Torsion modulus (cm³)
            torsion_modulus_cm3: f64 => "W_t",
            surface_area_per_metre: f64 => "surface_area_per_metre",
            is_additional: bool => "is_additional",
        }
    }
}

section_record! {
    /// Rectangular or square hollow section (HFRHS, HFSHS, CFRHS, CFSHS)
    pub struct RectangularHollow {
        required {
            mass_per_metre: f64 => "mass_per_metre",
            area_cm2: f64 => "A",
        }
        optional {
            depth_mm: f64 => "h",
            width_mm: f64 => "b",
            thickness_mm: f64 => "t",
            /// Flat width to thickness ratio
            c_t_ratio: f64 => "c_t",
            iyy_cm4: f64 => "I_yy",
            izz_cm4: f64 => "I_zz",
            ryy_cm: f64 => "i_yy",
            rzz_cm: f64 => "i_zz",
            wel_yy_cm3: f64 => "W_el_yy",
            wel_zz_cm3: f64 => "W_el_zz",
            wpl_yy_cm3: f64 => "W_pl_yy",
            wpl_zz_cm3: f64 => "W_pl_zz",
            torsion_constant_cm4: f64 => "I_t",
            torsion_modulus_cm3: f64 => "W_t",
            surface_area_per_metre: f64 => "surface_area_per_metre",
            is_additional: bool => "is_additional",
        }
    }
}

section_record! {
    /// Elliptical hollow section (HFEHS)
    pub struct EllipticalHollow {
        required {
            mass_per_metre: f64 => "mass_per_metre",
            area_cm2: f64 => "A",
        }
        optional {
            /// Major axis outside dimension (mm)
            depth_mm: f64 => "h",
            /// Minor axis outside dimension (mm)
            width_mm: f64 => "b",
            thickness_mm: f64 => "t",
            iyy_cm4: f64 => "I_yy",
            izz_cm4: f64 => "I_zz",
            ryy_cm: f64 => "i_yy",
            rzz_cm: f64 => "i_zz",
            wel_yy_cm3: f64 => "W_el_yy",
            wel_zz_cm3: f64 => "W_el_zz",
            wpl_yy_cm3: f64 => "W_pl_yy",
            wpl_zz_cm3: f64 => "W_pl_zz",
            torsion_constant_cm4: f64 => "I_t",
            torsion_modulus_cm3: f64 => "W_t",
            surface_area_per_metre: f64 => "surface_area_per_metre",
        }
    }
}

impl RectangularHollow {
    /// Square when both outside dimensions are known and equal
    pub fn is_square(&self) -> bool {
        matches!((self.depth_mm, self.width_mm), (Some(h), Some(b)) if (h - b).abs() < f64::EPSILON)
    }
}
