//! Section properties for prismatic members

use serde::{Deserialize, Serialize};

use super::Material;

/// Cross-section properties of a member.
///
/// Local axes follow the member: x along the member, y and z across it.
/// `iz` resists bending in the local xy plane (moments about z), `iy`
/// resists bending in the local xz plane (moments about y).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Section {
    /// Cross-sectional area
    pub a: f64,
    /// Moment of inertia about local y (xz-plane bending)
    pub iy: f64,
    /// Moment of inertia about local z (xy-plane bending)
    pub iz: f64,
    /// Torsional constant
    pub j: f64,
    pub material: Material,
}

impl Section {
    /// Create a new section with basic properties and the default material
    pub fn new(a: f64, iy: f64, iz: f64, j: f64) -> Self {
        Self {
            a,
            iy,
            iz,
            j,
            material: Material::default(),
        }
    }

    /// Section for planar work: only area and in-plane inertia matter, the
    /// out-of-plane inertia and torsion constant are set to 1
    pub fn planar(a: f64, iz: f64) -> Self {
        Self::new(a, 1.0, iz, 1.0)
    }

    pub fn with_material(mut self, material: Material) -> Self {
        self.material = material;
        self
    }

    /// Solid rectangle, `width` along local z and `depth` along local y
    pub fn rectangular(width: f64, depth: f64) -> Self {
        let a = width * depth;
        let iz = width * depth.powi(3) / 12.0;
        let iy = depth * width.powi(3) / 12.0;

        // Torsional constant for rectangle (approximate)
        let (long, short) = if width > depth { (width, depth) } else { (depth, width) };
        let j = long * short.powi(3) / 3.0 * (1.0 - 0.63 * short / long);

        Self::new(a, iy, iz, j)
    }

    /// Solid circle
    pub fn circular(diameter: f64) -> Self {
        let r = diameter / 2.0;
        let a = std::f64::consts::PI * r.powi(2);
        let i = std::f64::consts::PI * r.powi(4) / 4.0;
        Self::new(a, i, i, 2.0 * i)
    }

    /// Hollow circle
    pub fn pipe(outer_diameter: f64, wall_thickness: f64) -> Self {
        let r_o = outer_diameter / 2.0;
        let r_i = r_o - wall_thickness;
        let a = std::f64::consts::PI * (r_o.powi(2) - r_i.powi(2));
        let i = std::f64::consts::PI * (r_o.powi(4) - r_i.powi(4)) / 4.0;
        Self::new(a, i, i, 2.0 * i)
    }

    /// Possibly unsymmetric I section.
    ///
    /// # Arguments
    /// * `top_flange` - (width, thickness) of the top flange
    /// * `bottom_flange` - (width, thickness) of the bottom flange
    /// * `web` - (clear height, thickness) of the web
    pub fn i_section(top_flange: (f64, f64), bottom_flange: (f64, f64), web: (f64, f64)) -> Self {
        let (f1, t1) = top_flange;
        let (f2, t2) = bottom_flange;
        let (w, tw) = web;

        let a = f1 * t1 + f2 * t2 + w * tw;
        // centroid height measured from the bottom fibre
        let yc = (f2 * t2 * t2 / 2.0 + w * tw * (t2 + w / 2.0) + f1 * t1 * (t2 + w + t1 / 2.0)) / a;

        let iz = f2 * t2.powi(3) / 12.0
            + f2 * t2 * (yc - t2 / 2.0).powi(2)
            + tw * w.powi(3) / 12.0
            + w * tw * (yc - t2 - w / 2.0).powi(2)
            + f1 * t1.powi(3) / 12.0
            + f1 * t1 * (yc - t2 - w - t1 / 2.0).powi(2);
        let iy = (f2.powi(3) * t2 + tw.powi(3) * w + f1.powi(3) * t1) / 12.0;

        let d_prime = w + (t1 + t2) / 2.0;
        let j = (f1 * t1.powi(3) + f2 * t2.powi(3) + d_prime * tw.powi(3)) / 3.0;

        Self::new(a, iy, iz, j)
    }

    /// Rectangular tube, `width` along local z and `depth` along local y
    pub fn tube(width: f64, depth: f64, flange_thickness: f64, web_thickness: f64) -> Self {
        let (b, d) = (width, depth);
        let (tf, tw) = (flange_thickness, web_thickness);
        let (bi, di) = (b - 2.0 * tw, d - 2.0 * tf);

        let a = b * d - bi * di;
        let iz = (b * d.powi(3) - bi * di.powi(3)) / 12.0;
        let iy = (d * b.powi(3) - di * bi.powi(3)) / 12.0;

        // Bredt's formula for a closed thin-walled section
        let am = (b - tw) * (d - tf);
        let perimeter_over_t = 2.0 * (b - tw) / tf + 2.0 * (d - tf) / tw;
        let j = 4.0 * am.powi(2) / perimeter_over_t;

        Self::new(a, iy, iz, j)
    }

    /// Radius of gyration for xy-plane bending
    pub fn rz(&self) -> f64 {
        (self.iz / self.a).sqrt()
    }

    /// Radius of gyration for xz-plane bending
    pub fn ry(&self) -> f64 {
        (self.iy / self.a).sqrt()
    }

    pub fn ea(&self) -> f64 {
        self.material.e * self.a
    }

    pub fn ei_z(&self) -> f64 {
        self.material.e * self.iz
    }

    pub fn ei_y(&self) -> f64 {
        self.material.e * self.iy
    }

    pub fn gj(&self) -> f64 {
        self.material.g * self.j
    }

    /// Self weight per unit length
    pub fn weight_per_length(&self) -> f64 {
        self.material.unit_weight * self.a
    }
}
