//! Global equilibrium check of a solved structure

use crate::error::StiffnessResult;
use crate::math::Vec3;
use crate::structure::Structure;

/// Out-of-balance force and moment (about the global origin) of all
/// applied loads, member loads and reactions
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Residual {
    pub force: Vec3,
    pub moment: Vec3,
    force_scale: f64,
    moment_scale: f64,
}

impl Residual {
    /// Largest residual component relative to the load magnitudes
    pub fn relative(&self) -> f64 {
        (self.force.norm() / self.force_scale).max(self.moment.norm() / self.moment_scale)
    }

    pub fn within(&self, tolerance: f64) -> bool {
        self.relative() <= tolerance
    }
}

fn nonzero(scale: f64) -> f64 {
    if scale > 0.0 {
        scale
    } else {
        1.0
    }
}

/// Sum every external action on a solved structure in global axes
pub fn equilibrium_residual(structure: &Structure) -> StiffnessResult<Residual> {
    let mut force = Vec3::zeros();
    let mut moment = Vec3::zeros();
    let mut force_scale = 0.0;
    let mut moment_scale = 0.0;

    let mut add = |f: Vec3, m: Vec3, at: Vec3| {
        let lever = at.cross(&f);
        force += f;
        moment += m + lever;
        force_scale += f.norm();
        moment_scale += m.norm() + lever.norm();
    };

    for node in structure.nodes().map(|(_, n)| n) {
        let r = node.rotation();
        let total = node.action()?;
        let f = r * Vec3::new(total[0], total[1], total[2]);
        let m = r * Vec3::new(total[3], total[4], total[5]);
        add(f, m, node.position());
    }

    for member in structure.members().map(|(_, m)| m) {
        let origin = structure.node(member.i_node())?.position();
        let to_global = member.axis_rotation()?.transpose();
        let axis = member.direction()?;

        for load in member.forces() {
            let at = origin + axis * load.position();
            add(to_global * load.action().vector(), Vec3::zeros(), at);
        }
        for load in member.moments() {
            add(Vec3::zeros(), to_global * load.action().vector(), origin);
        }
        for load in member.distributed_loads() {
            let w = load.action();
            let c = w.span();
            let (w1, w2) = (w.start().vector(), w.end().vector());
            let resultant = (w1 + w2) * (c / 2.0);
            // first moment of each component about the i-node
            let first = (w1 + w2 * 2.0) * (c * c / 6.0) + resultant * load.position();
            let local_moment = Vec3::new(0.0, -first.z, first.y);
            add(to_global * resultant, to_global * local_moment, origin);
        }
    }

    Ok(Residual {
        force,
        moment,
        force_scale: nonzero(force_scale),
        moment_scale: nonzero(moment_scale),
    })
}
