//! Internal force and deformation diagrams of a solved member
//!
//! Every diagram is sampled on `linspace(0, L, n)` in local coordinates.
//! Force diagrams start from the i-end actions and add each member load
//! once the cut has passed its position. Deformations integrate the
//! matching force diagram over the section rigidity, anchored at the
//! i-end displacement, with the last sample set to the exact j-end value.

use serde::{Deserialize, Serialize};

use crate::error::StiffnessResult;
use crate::loads::{DistributedForce, MemberLoad};
use crate::math::{self, Vec3};

use super::member::MemberSolution;
use super::Member;

/// Local bending plane
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Plane {
    /// Bending about local z (transverse y)
    Xy,
    /// Bending about local y (transverse z)
    Xz,
}

impl Plane {
    /// Index of the transverse force component
    fn force_axis(self) -> usize {
        match self {
            Plane::Xy => 1,
            Plane::Xz => 2,
        }
    }

    /// Index of the bending moment component
    fn moment_axis(self) -> usize {
        match self {
            Plane::Xy => 2,
            Plane::Xz => 1,
        }
    }

    /// Sign of a transverse force's lever-arm contribution to bending
    fn lever_sign(self) -> f64 {
        match self {
            Plane::Xy => 1.0,
            Plane::Xz => -1.0,
        }
    }
}

/// A sampled function along a member
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagram {
    domain: Vec<f64>,
    values: Vec<f64>,
}

impl Diagram {
    pub fn new(domain: Vec<f64>, values: Vec<f64>) -> Self {
        debug_assert_eq!(domain.len(), values.len());
        Self { domain, values }
    }

    pub fn domain(&self) -> &[f64] {
        &self.domain
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn first(&self) -> f64 {
        self.values.first().copied().unwrap_or(0.0)
    }

    pub fn last(&self) -> f64 {
        self.values.last().copied().unwrap_or(0.0)
    }

    pub fn max(&self) -> f64 {
        self.values.iter().copied().fold(f64::NEG_INFINITY, f64::max)
    }

    pub fn min(&self) -> f64 {
        self.values.iter().copied().fold(f64::INFINITY, f64::min)
    }

    /// Largest magnitude, keeping its sign
    pub fn extreme(&self) -> f64 {
        let (max, min) = (self.max(), self.min());
        if max.abs() >= min.abs() {
            max
        } else {
            min
        }
    }

    /// Linear interpolation at `x`, clamped to the sampled range.
    /// NaN for a NaN `x`.
    pub fn at(&self, x: f64) -> f64 {
        let n = self.domain.len();
        if x.is_nan() {
            return f64::NAN;
        }
        if n == 0 {
            return 0.0;
        }
        if x <= self.domain[0] {
            return self.values[0];
        }
        if x >= self.domain[n - 1] {
            return self.values[n - 1];
        }
        let k = self.domain.partition_point(|&d| d <= x);
        let (x0, x1) = (self.domain[k - 1], self.domain[k]);
        let (y0, y1) = (self.values[k - 1], self.values[k]);
        y0 + (y1 - y0) * (x - x0) / (x1 - x0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.domain.iter().copied().zip(self.values.iter().copied())
    }

    fn with_last(mut self, value: f64) -> Self {
        if let Some(last) = self.values.last_mut() {
            *last = value;
        }
        self
    }
}

/// Part of a line load's `axis` component acting left of distance `s`
/// past its start: (resultant, moment of that resultant about the cut)
fn window(load: &DistributedForce, axis: usize, s: f64) -> (f64, f64) {
    if s < 0.0 {
        return (0.0, 0.0);
    }
    let c = load.span();
    let wi = load.start().vector()[axis];
    if s <= c {
        let ws = load.intensity_at(s).vector()[axis];
        let resultant = (wi + ws) / 2.0 * s;
        let moment = wi * s * s / 2.0 + (ws - wi) * s * s / 6.0;
        (resultant, moment)
    } else {
        let wf = load.end().vector()[axis];
        let resultant = (wi + wf) / 2.0 * c;
        let moment = wi * c * (s - c / 2.0) + (wf - wi) * c / 2.0 * (s - 2.0 * c / 3.0);
        (resultant, moment)
    }
}

fn windows(loads: &[MemberLoad<DistributedForce>], axis: usize, x: f64) -> (f64, f64) {
    loads.iter().fold((0.0, 0.0), |(r, m), load| {
        let (dr, dm) = window(load.action(), axis, x - load.position());
        (r + dr, m + dm)
    })
}

impl Member {
    fn sampled(&self) -> StiffnessResult<(&MemberSolution, Vec<f64>)> {
        let solution = self.solution()?;
        let domain = math::linspace(0.0, self.length()?, solution.sample_points);
        Ok((solution, domain))
    }

    fn diagram(&self, f: impl Fn(&MemberSolution, f64) -> f64) -> StiffnessResult<Diagram> {
        let (solution, domain) = self.sampled()?;
        let values = domain.iter().map(|&x| f(solution, x)).collect();
        Ok(Diagram { domain, values })
    }

    /// Sample positions along the member
    pub fn domain(&self) -> StiffnessResult<Vec<f64>> {
        Ok(self.sampled()?.1)
    }

    /// Axial force, positive in tension
    pub fn axial_force(&self) -> StiffnessResult<Diagram> {
        let diagram = self.diagram(|s, x| {
            let points: f64 = self
                .forces()
                .iter()
                .filter(|p| p.position() <= x)
                .map(|p| p.action().x())
                .sum();
            -s.end_actions.force_i.x() - points - windows(self.distributed_loads(), 0, x).0
        })?;
        Ok(diagram.with_last(self.end_actions()?.force_j.x()))
    }

    /// Twisting moment about the member axis
    pub fn torsion(&self) -> StiffnessResult<Diagram> {
        let diagram = self.diagram(|s, x| {
            let points: f64 = self
                .moments()
                .iter()
                .filter(|p| p.position() <= x)
                .map(|p| p.action().x())
                .sum();
            -s.end_actions.moment_i.x() - points
        })?;
        Ok(diagram.with_last(self.end_actions()?.moment_j.x()))
    }

    /// Transverse shear in `plane`
    pub fn shear(&self, plane: Plane) -> StiffnessResult<Diagram> {
        let axis = plane.force_axis();
        let diagram = self.diagram(|s, x| {
            let points: f64 = self
                .forces()
                .iter()
                .filter(|p| p.position() <= x)
                .map(|p| p.action().vector()[axis])
                .sum();
            s.end_actions.force_i.vector()[axis] + points + windows(self.distributed_loads(), axis, x).0
        })?;
        Ok(diagram.with_last(-self.end_actions()?.force_j.vector()[axis]))
    }

    /// Bending moment in `plane`; sagging is positive in the xy plane
    pub fn bending(&self, plane: Plane) -> StiffnessResult<Diagram> {
        let (f, m, sign) = (plane.force_axis(), plane.moment_axis(), plane.lever_sign());
        let diagram = self.diagram(|s, x| {
            let forces: f64 = self
                .forces()
                .iter()
                .filter(|p| p.position() <= x)
                .map(|p| p.action().vector()[f] * (x - p.position()))
                .sum();
            let moments: f64 = self
                .moments()
                .iter()
                .filter(|p| p.position() <= x)
                .map(|p| p.action().vector()[m])
                .sum();
            let distributed = windows(self.distributed_loads(), f, x).1;
            let ends = &s.end_actions;
            -ends.moment_i.vector()[m] + sign * (x * ends.force_i.vector()[f] + forces + distributed)
                - moments
        })?;
        Ok(diagram.with_last(self.end_actions()?.moment_j.vector()[m]))
    }

    /// Rotation of the cross-section: about z in the xy plane, about y in
    /// the xz plane
    pub fn slope(&self, plane: Plane) -> StiffnessResult<Diagram> {
        let d = self.local_displacements()?;
        let m = plane.moment_axis();
        let rigidity = match plane {
            Plane::Xy => self.section().ei_z(),
            Plane::Xz => self.section().ei_y(),
        };
        let bending = self.bending(plane)?;
        let curvature: Vec<f64> = bending.values().iter().map(|v| v / rigidity).collect();
        let values = math::cumulative_trapezoid(&curvature, bending.domain(), d[3 + m]);
        Ok(Diagram::new(bending.domain, values).with_last(d[9 + m]))
    }

    /// Transverse displacement: along y in the xy plane, along z in the xz plane
    pub fn deflection(&self, plane: Plane) -> StiffnessResult<Diagram> {
        let d = self.local_displacements()?;
        let f = plane.force_axis();
        let slope = self.slope(plane)?;
        let sign = plane.lever_sign();
        let signed: Vec<f64> = slope.values().iter().map(|v| sign * v).collect();
        let values = math::cumulative_trapezoid(&signed, slope.domain(), d[f]);
        Ok(Diagram::new(slope.domain, values).with_last(d[6 + f]))
    }

    /// Axial displacement along the member
    pub fn axial_deformation(&self) -> StiffnessResult<Diagram> {
        let d = self.local_displacements()?;
        let axial = self.axial_force()?;
        let strain: Vec<f64> = axial.values().iter().map(|n| n / self.section().ea()).collect();
        let values = math::cumulative_trapezoid(&strain, axial.domain(), d[0]);
        Ok(Diagram::new(axial.domain, values).with_last(d[6]))
    }

    /// Displacement of each sample point in global coordinates
    pub fn stacked_deformation(&self) -> StiffnessResult<Vec<Vec3>> {
        let rotation = self.axis_rotation()?.transpose();
        let u = self.axial_deformation()?;
        let v = self.deflection(Plane::Xy)?;
        let w = self.deflection(Plane::Xz)?;
        Ok(u
            .values()
            .iter()
            .zip(v.values())
            .zip(w.values())
            .map(|((&u, &v), &w)| rotation * Vec3::new(u, v, w))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::{Material, MemberReleases, Node, NodeId, Section};
    use crate::error::StiffnessError;
    use crate::loads::Force;
    use approx::assert_abs_diff_eq;

    fn clamped_beam(releases: MemberReleases) -> Member {
        let section = Section::planar(1.0, 1.0).with_material(Material::new(1.0, 0.25));
        let mut m = Member::new(NodeId(1), NodeId(2), section).with_releases(releases);
        m.attach(&Node::on_line(0.0), &Node::on_line(3.0)).unwrap();
        m
    }

    #[test]
    fn test_diagrams_need_solve() {
        let m = clamped_beam(MemberReleases::beam_2d());
        assert_eq!(m.bending(Plane::Xy), Err(StiffnessError::NotSolved));
        assert_eq!(m.domain(), Err(StiffnessError::NotSolved));
    }

    #[test]
    fn test_clamped_uniform_load() {
        let mut m = clamped_beam(MemberReleases::beam_2d());
        let w = DistributedForce::uniform(Force::transverse(-12.0), 3.0).unwrap();
        m.add_distributed(0.0, w).unwrap();
        m.recover_end_actions(&[0.0; 6], &[0.0; 6], 1e-12, 1001).unwrap();

        let shear = m.shear(Plane::Xy).unwrap();
        assert_abs_diff_eq!(shear.first(), 18.0, epsilon = 1e-9);
        assert_abs_diff_eq!(shear.at(1.5), 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(shear.last(), -18.0, epsilon = 1e-9);

        // wL^2/12 hogging at the supports, wL^2/24 sagging at midspan
        let bending = m.bending(Plane::Xy).unwrap();
        assert_abs_diff_eq!(bending.first(), -9.0, epsilon = 1e-9);
        assert_abs_diff_eq!(bending.values()[500], 4.5, epsilon = 1e-9);
        assert_abs_diff_eq!(bending.last(), -9.0, epsilon = 1e-9);

        // wL^4/384EI
        let deflection = m.deflection(Plane::Xy).unwrap();
        assert_abs_diff_eq!(deflection.values()[500], -12.0 * 81.0 / 384.0, epsilon = 1e-4);
        assert_abs_diff_eq!(deflection.last(), 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(m.slope(Plane::Xy).unwrap().values()[500], 0.0, epsilon = 1e-4);
    }

    #[test]
    fn test_out_of_plane_mirrors_in_plane() {
        let mut m = clamped_beam(MemberReleases::none());
        let w = DistributedForce::uniform(Force::new(0.0, 0.0, 6.0), 3.0).unwrap();
        m.add_distributed(0.0, w).unwrap();
        m.recover_end_actions(&[0.0; 6], &[0.0; 6], 1e-12, 1001).unwrap();

        let bending = m.bending(Plane::Xz).unwrap();
        assert_abs_diff_eq!(bending.first(), -4.5, epsilon = 1e-9);
        assert_abs_diff_eq!(bending.values()[500], 2.25, epsilon = 1e-9);
        assert_abs_diff_eq!(bending.last(), -4.5, epsilon = 1e-9);

        // load along +z pushes the member along +z
        let deflection = m.deflection(Plane::Xz).unwrap();
        assert_abs_diff_eq!(deflection.values()[500], 6.0 * 81.0 / 384.0, epsilon = 1e-4);
        assert!(m.bending(Plane::Xy).unwrap().values().iter().all(|v| v.abs() < 1e-12));
    }

    #[test]
    fn test_point_loads_step_the_diagrams() {
        let mut m = clamped_beam(MemberReleases::none());
        m.add_force(1.0, Force::new(6.0, 0.0, 0.0)).unwrap();
        m.add_moment(2.0, crate::loads::Moment::torsion(3.0)).unwrap();
        m.recover_end_actions(&[0.0; 6], &[0.0; 6], 1e-12, 31).unwrap();

        // 2/3 of the axial load goes to the i-end
        let axial = m.axial_force().unwrap();
        assert_abs_diff_eq!(axial.at(0.5), 4.0, epsilon = 1e-9);
        assert_abs_diff_eq!(axial.at(2.5), -2.0, epsilon = 1e-9);
        assert!(m.axial_deformation().unwrap().max() > 0.0);

        let torsion = m.torsion().unwrap();
        assert_abs_diff_eq!(torsion.at(1.0), 1.0, epsilon = 1e-9);
        assert_abs_diff_eq!(torsion.at(2.5), -2.0, epsilon = 1e-9);
    }

    #[test]
    fn test_partial_window_matches_resultant() {
        let load = DistributedForce::new(Force::transverse(2.0), Force::transverse(4.0), 2.0).unwrap();
        let (r, m) = window(&load, 1, 2.0);
        assert_abs_diff_eq!(r, 6.0, epsilon = 1e-12);
        // centroid 10/9 from the start, 8/9 from the cut
        assert_abs_diff_eq!(m, 6.0 * 8.0 / 9.0, epsilon = 1e-12);
        let (r, m) = window(&load, 1, 3.0);
        assert_abs_diff_eq!(r, 6.0, epsilon = 1e-12);
        assert_abs_diff_eq!(m, 6.0 * 17.0 / 9.0, epsilon = 1e-12);
        assert_eq!(window(&load, 1, -0.5), (0.0, 0.0));
    }

    #[test]
    fn test_diagram_interpolation() {
        let d = Diagram::new(vec![0.0, 1.0, 2.0], vec![0.0, -4.0, 2.0]);
        assert_eq!(d.at(0.5), -2.0);
        assert_eq!(d.at(5.0), 2.0);
        assert_eq!(d.at(f64::NEG_INFINITY), 0.0);
        assert!(d.at(f64::NAN).is_nan());
        assert_eq!(d.extreme(), -4.0);
        assert_eq!(d.len(), 3);
    }
}
