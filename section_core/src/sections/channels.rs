//! Channels: PFC (UK / EU), UPE and UPN (EU).
//!
//! UPN channels have tapered flanges and carry two radii (`r_1`, `r_2`)
//! instead of a single root radius.

section_record! {
    /// Parallel or taper flange channel
    pub struct ChannelSection {
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
            serial_size: String => "serial_size",
            is_additional: bool => "is_additional",
            histar_fy: bool => "histar_fy",
            /// Overall width b (mm)
            width_mm: f64 => "b",
            web_thickness_mm: f64 => "tw",
            flange_thickness_mm: f64 => "tf",
            root_radius_mm: f64 => "r",
            /// Root radius, taper flange (mm)
            root_radius_1_mm: f64 => "r_1",
            /// Toe radius, taper flange (mm)
            toe_radius_2_mm: f64 => "r_2",
            depth_between_fillets_mm: f64 => "d",
            web_slenderness: f64 => "cw_tw",
            flange_slenderness: f64 => "cf_tf",
            /// Distance from web back to shear centre (mm)
            shear_centre_mm: f64 => "e0",
            /// Distance from web back to centroid (mm)
            centroid_mm: f64 => "c_y",
            end_clearance_mm: f64 => "C",
            notch_length_mm: f64 => "N",
            notch_depth_mm: f64 => "n",
            surface_area_per_metre: f64 => "surface_area_per_metre",
            surface_area_per_tonne: f64 => "surface_area_per_tonne",
            izz_cm4: f64 => "I_zz",
            ryy_cm: f64 => "i_yy",
            rzz_cm: f64 => "i_zz",
            wel_yy_cm3: f64 => "W_el_yy",
            wel_zz_cm3: f64 => "W_el_zz",
            wpl_yy_cm3: f64 => "W_pl_yy",
            wpl_zz_cm3: f64 => "W_pl_zz",
            buckling_parameter: f64 => "U",
            torsional_index: f64 => "X",
            warping_constant_dm6: f64 => "I_w",
            torsion_constant_cm4: f64 => "I_t",
        }
    }
}

impl ChannelSection {
    /// True for taper flange channels (radii given as `r_1` / `r_2`)
    pub fn is_taper_flange(&self) -> bool {
        self.root_radius_1_mm.is_some() && self.root_radius_mm.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::region::Region;
    use crate::schema::SchemaRegistry;
    use crate::sections::SectionKind;
    use crate::section_type::SectionType;
    use crate::value::RawRecord;

    #[test]
    fn test_pfc_and_upn() {
        let registry = SchemaRegistry::for_region(Region::EU);

        let pfc = RawRecord::new("430x100x64")
            .with("mass_per_metre", 64.4)
            .with("h", 430.0)
            .with("A", 82.1)
            .with("I_yy", 21900.0)
            .with("r", 15.0);
        let pfc = ChannelSection::from_section(registry.construct(SectionType::PFC, &pfc).unwrap()).unwrap();
        assert!(!pfc.is_taper_flange());

        let upn = RawRecord::new("UPN 200")
            .with("mass_per_metre", 25.3)
            .with("h", 200.0)
            .with("A", 32.2)
            .with("I_yy", 1910.0)
            .with("r_1", 11.5)
            .with("r_2", 6.0);
        let upn = ChannelSection::from_section(registry.construct(SectionType::UPN, &upn).unwrap()).unwrap();
        assert!(upn.is_taper_flange());
        assert_eq!(upn.toe_radius_2_mm, Some(6.0));
    }
}
