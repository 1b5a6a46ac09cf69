use approx::{assert_abs_diff_eq, assert_relative_eq};
use stiffness_solver::prelude::*;

fn simply_supported_uniform(w: f64, length: f64) -> (Structure, MemberId) {
    // EI = 1e5
    let section = Section::planar(10.0, 100.0).with_material(Material::new(1000.0, 0.3));
    let mut structure = Structure::new();
    let n1 = structure.add_node(Node::on_line(0.0).with_support(Support::roller_y()));
    let n2 = structure.add_node(Node::on_line(length).with_support(Support::roller_y()));
    let m = structure
        .add_member(Member::new(n1, n2, section).with_releases(MemberReleases::beam_2d()))
        .unwrap();
    structure
        .add_member_distributed(m, 0.0, DistributedForce::uniform(Force::transverse(w), length).unwrap())
        .unwrap();
    structure
        .solve_with(&AnalysisOptions::default().with_sample_points(1001))
        .unwrap();
    (structure, m)
}

#[test]
fn test_simply_supported_uniform_load() {
    let (structure, m) = simply_supported_uniform(-2.0, 10.0);
    let member = structure.member(m).unwrap();
    let ei = 1e5;

    assert_eq!(member.domain().unwrap().len(), 1001);

    let shear = member.shear(Plane::Xy).unwrap();
    assert_relative_eq!(shear.first(), 10.0, epsilon = 1e-9);
    assert_abs_diff_eq!(shear.at(5.0), 0.0, epsilon = 1e-9);
    assert_relative_eq!(shear.last(), -10.0, epsilon = 1e-9);

    // wL^2/8, sagging
    let moment = member.bending(Plane::Xy).unwrap();
    assert_relative_eq!(moment.max(), 25.0, epsilon = 1e-9);
    assert_abs_diff_eq!(moment.first(), 0.0, epsilon = 1e-9);
    assert_abs_diff_eq!(moment.last(), 0.0, epsilon = 1e-9);

    // wL^3/24EI at the supports
    let slope = member.slope(Plane::Xy).unwrap();
    assert_relative_eq!(slope.first(), -2000.0 / 24.0 / ei, max_relative = 1e-9);
    assert_relative_eq!(slope.last(), 2000.0 / 24.0 / ei, max_relative = 1e-9);
    assert_abs_diff_eq!(slope.at(5.0), 0.0, epsilon = 1e-8);

    // 5wL^4/384EI at midspan
    let deflection = member.deflection(Plane::Xy).unwrap();
    let expected = -5.0 * 2.0 * 1e4 / 384.0 / ei;
    assert_relative_eq!(deflection.min(), expected, max_relative = 1e-4);
    assert_relative_eq!(deflection.at(5.0), expected, max_relative = 1e-4);
    assert_abs_diff_eq!(deflection.first(), 0.0, epsilon = 1e-12);
    assert_abs_diff_eq!(deflection.last(), 0.0, epsilon = 1e-12);

    // no axial action anywhere
    assert_abs_diff_eq!(member.axial_force().unwrap().extreme(), 0.0, epsilon = 1e-12);
    assert_abs_diff_eq!(member.axial_deformation().unwrap().extreme(), 0.0, epsilon = 1e-12);

    let extremes = MemberForces::extremes(member).unwrap();
    assert_relative_eq!(extremes.moment_z, 25.0, epsilon = 1e-9);
    assert_relative_eq!(extremes.max_shear(), 10.0, epsilon = 1e-9);
}

#[test]
fn test_partial_trapezoidal_load_statics() {
    // 3 to 6 over [2, 6] of a 10 long simple span: resultant 18 at 2 + 20/9
    let section = Section::planar(10.0, 100.0).with_material(Material::new(1000.0, 0.3));
    let mut structure = Structure::new();
    let n1 = structure.add_node(Node::on_line(0.0).with_support(Support::roller_y()));
    let n2 = structure.add_node(Node::on_line(10.0).with_support(Support::roller_y()));
    let m = structure
        .add_member(Member::new(n1, n2, section).with_releases(MemberReleases::beam_2d()))
        .unwrap();
    let load = DistributedForce::new(Force::transverse(-3.0), Force::transverse(-6.0), 4.0).unwrap();
    structure.add_member_distributed(m, 2.0, load).unwrap();
    structure.solve().unwrap();

    let centroid = 2.0 + 4.0 * (3.0 + 2.0 * 6.0) / (3.0 * 9.0);
    let right = 18.0 * centroid / 10.0;
    let left = 18.0 - right;

    let reactions = structure.reactions().unwrap();
    assert_relative_eq!(reactions[&n1].fy, left, epsilon = 1e-9);
    assert_relative_eq!(reactions[&n2].fy, right, epsilon = 1e-9);

    // beyond the load the shear is constant at -right
    let shear = structure.member(m).unwrap().shear(Plane::Xy).unwrap();
    assert_relative_eq!(shear.at(8.0), -right, epsilon = 1e-9);
    assert_relative_eq!(shear.at(1.0), left, epsilon = 1e-9);

    // and the moment falls off linearly to zero
    let moment = structure.member(m).unwrap().bending(Plane::Xy).unwrap();
    assert_relative_eq!(moment.at(8.0), right * 2.0, epsilon = 1e-6);
}

#[test]
fn test_space_cantilever_out_of_plane() {
    // Iz = 5 in the xy plane, Iy = 2 in the xz plane
    let section = Section::new(1.0, 2.0, 5.0, 1.0).with_material(Material::new(1000.0, 0.3));
    let mut structure = Structure::new();
    let n1 = structure.add_node(Node::new([0.0, 0.0, 0.0]).with_support(Support::fixed()));
    let n2 = structure.add_node(
        Node::new([10.0, 0.0, 0.0])
            .with_force(Force::new(0.0, 0.0, -3.0))
            .with_moment(Moment::torsion(2.0)),
    );
    let m = structure.add_member(Member::new(n1, n2, section)).unwrap();
    structure
        .solve_with(&AnalysisOptions::default().with_sample_points(1001))
        .unwrap();

    // PL^3/3EIy down, PL^2/2EIy about +y
    let tip = structure.displacements().unwrap()[&n2];
    assert_relative_eq!(tip.dz, -0.5, epsilon = 1e-9);
    assert_relative_eq!(tip.ry, 0.075, epsilon = 1e-9);
    assert_abs_diff_eq!(tip.dy, 0.0, epsilon = 1e-12);

    // TL/GJ
    let g = 1000.0 / 2.6;
    assert_relative_eq!(tip.rx, 20.0 / g, epsilon = 1e-9);

    let member = structure.member(m).unwrap();
    let w = member.deflection(Plane::Xz).unwrap();
    assert_relative_eq!(w.last(), -0.5, epsilon = 1e-9);
    assert_relative_eq!(w.at(5.0), -3.0 * 25.0 * 25.0 / 6.0 / 2000.0, max_relative = 1e-4);
    assert_abs_diff_eq!(member.deflection(Plane::Xy).unwrap().extreme(), 0.0, epsilon = 1e-12);

    // constant torque along the member
    let torsion = member.torsion().unwrap();
    assert_relative_eq!(torsion.first(), 2.0, epsilon = 1e-9);
    assert_relative_eq!(torsion.at(5.0), 2.0, epsilon = 1e-9);

    // the deformed shape ends on the displaced tip
    let stacked = member.stacked_deformation().unwrap();
    let end = stacked.last().unwrap();
    assert_relative_eq!(end.z, -0.5, epsilon = 1e-9);
    assert_abs_diff_eq!(end.x, 0.0, epsilon = 1e-12);
}

#[test]
fn test_diagrams_need_a_solution() {
    let mut structure = Structure::new();
    let n1 = structure.add_node(Node::on_line(0.0).with_support(Support::fixed()));
    let n2 = structure.add_node(Node::on_line(5.0));
    let m = structure
        .add_member(Member::new(n1, n2, Section::rectangular(1.0, 2.0)))
        .unwrap();

    let member = structure.member(m).unwrap();
    assert_eq!(member.bending(Plane::Xy).unwrap_err(), StiffnessError::NotSolved);
    assert_eq!(member.domain().unwrap_err(), StiffnessError::NotSolved);
}
