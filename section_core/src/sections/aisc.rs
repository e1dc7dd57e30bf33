//! AISC shapes (US tables).
//!
//! Field names follow the AISC Shapes Database columns (`W`, `A`, `d`,
//! `Ix`, ...). All dimensional values are in US customary units (inches,
//! in², in³, in⁴, lb/ft).

section_record! {
    /// W, S, M and HP shapes
    pub struct AiscIShape {
        required {
            /// Nominal weight (lb/ft)
            weight_plf: f64 => "W",
            /// Cross-sectional area (in²)
            area_in2: f64 => "A",
            /// Overall depth (in)
            depth_in: f64 => "d",
            /// Moment of inertia about x-axis (in⁴)
            ix_in4: f64 => "Ix",
        }
        optional {
            /// EDI standard nomenclature
            edi_name: String => "EDI_Std_Nomenclature",
            /// "T" when the shape has a special flange/web note
            t_f: String => "T_F",
            /// Flange width (in)
            bf_in: f64 => "bf",
            tw_in: f64 => "tw",
            tf_in: f64 => "tf",
            /// Design k (in)
            k_des_in: f64 => "kdes",
            /// Detailing k (in)
            k_det_in: f64 => "kdet",
            k1_in: f64 => "k1",
            /// Flange slenderness bf/2tf
            bf_2tf: f64 => "bf_2tf",
            /// Web slenderness h/tw
            h_tw: f64 => "h_tw",
            zx_in3: f64 => "Zx",
            sx_in3: f64 => "Sx",
            rx_in: f64 => "rx",
            iy_in4: f64 => "Iy",
            zy_in3: f64 => "Zy",
            sy_in3: f64 => "Sy",
            ry_in: f64 => "ry",
            /// Torsional constant (in⁴)
            j_in4: f64 => "J",
            /// Warping constant (in⁶)
            cw_in6: f64 => "Cw",
            wno_in2: f64 => "Wno",
            sw1_in4: f64 => "Sw1",
            qf_in3: f64 => "Qf",
            qw_in3: f64 => "Qw",
            /// Effective radius of gyration for LTB (in)
            rts_in: f64 => "rts",
            /// Distance between flange centroids (in)
            ho_in: f64 => "ho",
            /// Perimeter, box section fire exposure (in)
            pa_in: f64 => "PA",
            pb_in: f64 => "PB",
            pc_in: f64 => "PC",
            pd_in: f64 => "PD",
            /// Distance between web toes of fillets (in)
            t_in: f64 => "T",
            /// Workable gage, inner (in)
            wgi_in: f64 => "WGi",
            /// Workable gage, outer (in)
            wgo_in: f64 => "WGo",
        }
    }
}

section_record! {
    /// C and MC channels
    pub struct AiscChannel {
        required {
            weight_plf: f64 => "W",
            area_in2: f64 => "A",
            depth_in: f64 => "d",
            ix_in4: f64 => "Ix",
        }
        optional {
            edi_name: String => "EDI_Std_Nomenclature",
            bf_in: f64 => "bf",
            tw_in: f64 => "tw",
            tf_in: f64 => "tf",
            k_des_in: f64 => "kdes",
            k_det_in: f64 => "kdet",
            /// Centroid from back of web (in)
            x_bar_in: f64 => "x",
            /// Shear centre from web centreline (in)
            eo_in: f64 => "eo",
            xp_in: f64 => "xp",
            b_t: f64 => "b_t",
            h_tw: f64 => "h_tw",
            zx_in3: f64 => "Zx",
            sx_in3: f64 => "Sx",
            rx_in: f64 => "rx",
            iy_in4: f64 => "Iy",
            zy_in3: f64 => "Zy",
            sy_in3: f64 => "Sy",
            ry_in: f64 => "ry",
            j_in4: f64 => "J",
            cw_in6: f64 => "Cw",
            /// Polar radius of gyration about shear centre (in)
            ro_in: f64 => "ro",
            /// Flexural constant
            h_const: f64 => "H",
            rts_in: f64 => "rts",
            ho_in: f64 => "ho",
        }
    }
}

section_record! {
    /// Single angles (equal and unequal leg)
    pub struct AiscAngle {
        required {
            weight_plf: f64 => "W",
            area_in2: f64 => "A",
            /// Long leg (in)
            depth_in: f64 => "d",
            /// Short leg (in)
            width_in: f64 => "b",
            /// Leg thickness (in)
            t_in: f64 => "t",
        }
        optional {
            edi_name: String => "EDI_Std_Nomenclature",
            k_des_in: f64 => "kdes",
            k_det_in: f64 => "kdet",
            x_bar_in: f64 => "x",
            y_bar_in: f64 => "y",
            xp_in: f64 => "xp",
            yp_in: f64 => "yp",
            b_t: f64 => "b_t",
            ix_in4: f64 => "Ix",
            zx_in3: f64 => "Zx",
            sx_in3: f64 => "Sx",
            rx_in: f64 => "rx",
            iy_in4: f64 => "Iy",
            zy_in3: f64 => "Zy",
            sy_in3: f64 => "Sy",
            ry_in: f64 => "ry",
            /// Minor principal axis (in⁴)
            iz_in4: f64 => "Iz",
            rz_in: f64 => "rz",
            sz_in3: f64 => "Sz",
            j_in4: f64 => "J",
            cw_in6: f64 => "Cw",
            ro_in: f64 => "ro",
            h_const: f64 => "H",
            tan_alpha: f64 => "tan_alpha",
        }
    }
}

section_record! {
    /// WT, MT and ST tees
    pub struct AiscTee {
        required {
            weight_plf: f64 => "W",
            area_in2: f64 => "A",
            depth_in: f64 => "d",
            ix_in4: f64 => "Ix",
        }
        optional {
            edi_name: String => "EDI_Std_Nomenclature",
            bf_in: f64 => "bf",
            tw_in: f64 => "tw",
            tf_in: f64 => "tf",
            k_des_in: f64 => "kdes",
            k_det_in: f64 => "kdet",
            /// Centroid from outside of flange (in)
            y_bar_in: f64 => "y",
            yp_in: f64 => "yp",
            bf_2tf: f64 => "bf_2tf",
            /// Stem slenderness d/tw
            d_tw: f64 => "D_t",
            zx_in3: f64 => "Zx",
            sx_in3: f64 => "Sx",
            rx_in: f64 => "rx",
            iy_in4: f64 => "Iy",
            zy_in3: f64 => "Zy",
            sy_in3: f64 => "Sy",
            ry_in: f64 => "ry",
            j_in4: f64 => "J",
            cw_in6: f64 => "Cw",
            ro_in: f64 => "ro",
            h_const: f64 => "H",
            /// Slender stem reduction factor
            qs: f64 => "Qs",
        }
    }
}

section_record! {
    /// Rectangular and square HSS
    pub struct AiscRectangularHss {
        required {
            weight_plf: f64 => "W",
            area_in2: f64 => "A",
            /// Overall height (in)
            height_in: f64 => "Ht",
            /// Overall width (in)
            width_in: f64 => "B",
            /// Design wall thickness (in)
            t_des_in: f64 => "tdes",
        }
        optional {
            edi_name: String => "EDI_Std_Nomenclature",
            /// Nominal wall thickness (in)
            t_nom_in: f64 => "tnom",
            /// Flat depth of wall (in)
            flat_depth_in: f64 => "h",
            /// Flat width of wall (in)
            flat_width_in: f64 => "b",
            b_tdes: f64 => "b_tdes",
            h_tdes: f64 => "h_tdes",
            ix_in4: f64 => "Ix",
            zx_in3: f64 => "Zx",
            sx_in3: f64 => "Sx",
            rx_in: f64 => "rx",
            iy_in4: f64 => "Iy",
            zy_in3: f64 => "Zy",
            sy_in3: f64 => "Sy",
            ry_in: f64 => "ry",
            j_in4: f64 => "J",
            /// Torsional constant C (in³)
            c_in3: f64 => "C",
        }
    }
}

section_record! {
    /// Round HSS and pipe
    pub struct AiscRoundHss {
        required {
            weight_plf: f64 => "W",
            area_in2: f64 => "A",
            /// Outside diameter (in)
            od_in: f64 => "OD",
            t_des_in: f64 => "tdes",
        }
        optional {
            edi_name: String => "EDI_Std_Nomenclature",
            t_nom_in: f64 => "tnom",
            /// Inside diameter (in)
            id_in: f64 => "ID",
            d_t: f64 => "D_t",
            ix_in4: f64 => "Ix",
            zx_in3: f64 => "Zx",
            sx_in3: f64 => "Sx",
            rx_in: f64 => "rx",
            j_in4: f64 => "J",
            c_in3: f64 => "C",
        }
    }
}

impl AiscIShape {
    /// Flange slenderness bf/2tf, from the table or computed from bf and tf
    pub fn flange_slenderness(&self) -> Option<f64> {
        self.bf_2tf.or_else(|| match (self.bf_in, self.tf_in) {
            (Some(bf), Some(tf)) if tf > 0.0 => Some(bf / (2.0 * tf)),
            _ => None,
        })
    }
}

impl AiscRectangularHss {
    pub fn is_square(&self) -> bool {
        (self.height_in - self.width_in).abs() < f64::EPSILON
    }
}
