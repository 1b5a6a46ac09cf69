use approx::{assert_abs_diff_eq, assert_relative_eq};
use stiffness_solver::prelude::*;

fn unit_section() -> Section {
    Section::planar(1.0, 1.0).with_material(Material::new(1.0, 0.3))
}

fn restrain(dofs: &[Dof]) -> Support {
    Support::with_restraints(DofMask::of(dofs))
}

/// Spans 6 and 4, clamped outer ends, roller in between, -25 over the
/// first span
fn two_span_beam() -> (Structure, MemberId, MemberId) {
    let mut structure = Structure::new();
    let n1 = structure.add_node(Node::on_line(0.0).with_support(restrain(&[Dof::Dy, Dof::Rz])));
    let n2 = structure.add_node(Node::on_line(6.0).with_support(restrain(&[Dof::Dy])));
    let n3 = structure.add_node(Node::on_line(10.0).with_support(restrain(&[Dof::Dy, Dof::Rz])));

    let beam = MemberReleases::beam_2d();
    let m1 = structure
        .add_member(Member::new(n1, n2, unit_section()).with_releases(beam))
        .unwrap();
    let m2 = structure
        .add_member(Member::new(n2, n3, unit_section()).with_releases(beam))
        .unwrap();
    structure
        .add_member_distributed(m1, 0.0, DistributedForce::uniform(Force::transverse(-25.0), 6.0).unwrap())
        .unwrap();

    (structure, m1, m2)
}

fn assert_vector(actual: &[f64], expected: &[f64], epsilon: f64) {
    assert_eq!(actual.len(), expected.len(), "{actual:?} vs {expected:?}");
    for (a, e) in actual.iter().zip(expected) {
        assert_abs_diff_eq!(*a, *e, epsilon = epsilon);
    }
}

#[test]
fn test_two_span_global_stiffness() {
    let (structure, _, _) = two_span_beam();
    let k = structure.stiffness_matrix().unwrap();

    let expected = [
        [0.055556, 0.166667, -0.055556, 0.166667, 0.0, 0.0],
        [0.166667, 0.666667, -0.166667, 0.333333, 0.0, 0.0],
        [-0.055556, -0.166667, 0.243056, 0.208333, -0.1875, 0.375],
        [0.166667, 0.333333, 0.208333, 1.666667, -0.375, 0.5],
        [0.0, 0.0, -0.1875, -0.375, 0.1875, -0.375],
        [0.0, 0.0, 0.375, 0.5, -0.375, 1.0],
    ];
    assert_eq!(k.shape(), (6, 6));
    for (i, row) in expected.iter().enumerate() {
        for (j, &value) in row.iter().enumerate() {
            assert_abs_diff_eq!(k[(i, j)], value, epsilon = 1e-6);
        }
    }
}

#[test]
fn test_two_span_reactions() {
    let (mut structure, m1, m2) = two_span_beam();
    structure.solve().unwrap();

    assert_vector(
        structure.restrained_reactions().unwrap().as_slice(),
        &[82.5, 90.0, 84.375, -16.875, 22.5],
        1e-9,
    );
    assert_vector(structure.free_displacements().unwrap().as_slice(), &[45.0], 1e-9);
    assert_eq!(
        structure.free_dofs().unwrap(),
        vec![(NodeId(2), Dof::Rz)]
    );

    let ends = structure.member(m1).unwrap().end_actions().unwrap();
    assert_vector(
        ends.to_vector().as_slice(),
        &[0.0, 82.5, 0.0, 0.0, 0.0, 90.0, 0.0, 67.5, 0.0, 0.0, 0.0, -45.0],
        1e-9,
    );
    let ends = structure.member(m2).unwrap().end_actions().unwrap();
    assert_vector(
        ends.to_vector().as_slice(),
        &[0.0, 16.875, 0.0, 0.0, 0.0, 45.0, 0.0, -16.875, 0.0, 0.0, 0.0, 22.5],
        1e-9,
    );

    // per-node view of the same reactions
    let reactions = structure.reactions().unwrap();
    assert_eq!(reactions.len(), 3);
    assert_relative_eq!(reactions[&NodeId(1)].mz, 90.0, epsilon = 1e-9);
    assert_relative_eq!(reactions[&NodeId(2)].fy, 84.375, epsilon = 1e-9);
    assert_relative_eq!(reactions[&NodeId(3)].mz, 22.5, epsilon = 1e-9);
}

#[test]
fn test_statically_determinate_beam() {
    // simply supported, L = 10, point load 10 at 3
    let section = Section::planar(1.0, 5.0).with_material(Material::new(200.0, 0.3));
    let mut structure = Structure::new();
    let n1 = structure.add_node(Node::on_line(0.0).with_support(Support::roller_y()));
    let n2 = structure.add_node(Node::on_line(10.0).with_support(Support::roller_y()));
    let m = structure
        .add_member(Member::new(n1, n2, section).with_releases(MemberReleases::beam_2d()))
        .unwrap();
    structure.add_member_force(m, 3.0, Force::transverse(-10.0)).unwrap();
    structure.solve().unwrap();

    assert_vector(structure.restrained_reactions().unwrap().as_slice(), &[7.0, 3.0], 1e-9);
    assert_vector(
        structure.free_displacements().unwrap().as_slice(),
        &[-0.0595, 0.0455],
        1e-9,
    );

    let summary = structure.summary().unwrap();
    assert_relative_eq!(summary.total_reaction.fy, 10.0, epsilon = 1e-9);
    assert_eq!(summary.free_dofs, 2);
    assert_eq!(summary.restrained_dofs, 2);
    assert_eq!(summary.max_moment_member, Some(m));
}

#[test]
fn test_pinned_member_recovers_end_rotations() {
    let section = Section::planar(1.0, 5.0).with_material(Material::new(200.0, 0.3));
    let hinged = MemberReleases::new(
        MemberReleases::beam_2d().i_node.with(Dof::Rz),
        MemberReleases::beam_2d().j_node.with(Dof::Rz),
    );

    let mut structure = Structure::new();
    let n1 = structure.add_node(Node::on_line(0.0).with_support(Support::roller_y()));
    let n2 = structure.add_node(Node::on_line(10.0).with_support(Support::roller_y()));
    let m = structure
        .add_member(Member::new(n1, n2, section).with_releases(hinged))
        .unwrap();
    structure.add_member_force(m, 3.0, Force::transverse(-10.0)).unwrap();
    structure.solve().unwrap();

    // nothing left to solve for: only the two supported translations remain
    assert!(structure.free_dofs().unwrap().is_empty());
    assert_vector(structure.restrained_reactions().unwrap().as_slice(), &[7.0, 3.0], 1e-9);

    // the nodes carry no rotation, the member recovers its own
    assert_eq!(structure.node(n1).unwrap().displacement(Dof::Rz).unwrap(), 0.0);
    let local = structure.member(m).unwrap().local_displacements().unwrap();
    assert_abs_diff_eq!(local[5], -0.0595, epsilon = 1e-9);
    assert_abs_diff_eq!(local[11], 0.0455, epsilon = 1e-9);
}

#[test]
fn test_internal_hinge() {
    // two spans meeting at a hinge: both members release Rz at the middle
    let section = Section::planar(1.0, 6e-3).with_material(Material::new(2e6, 0.3));
    let beam = MemberReleases::beam_2d();
    let clamped = restrain(&[Dof::Dy, Dof::Rz]);

    let mut structure = Structure::new();
    let n1 = structure.add_node(Node::on_line(0.0).with_support(clamped));
    let n2 = structure.add_node(Node::on_line(5.0));
    let n3 = structure.add_node(Node::on_line(10.0).with_support(clamped));

    let m1 = structure
        .add_member(
            Member::new(n1, n2, section)
                .with_releases(MemberReleases::new(beam.i_node, beam.j_node.with(Dof::Rz))),
        )
        .unwrap();
    let m2 = structure
        .add_member(
            Member::new(n2, n3, section)
                .with_releases(MemberReleases::new(beam.i_node.with(Dof::Rz), beam.j_node)),
        )
        .unwrap();
    structure.add_member_force(m1, 2.5, Force::transverse(-10.0)).unwrap();
    structure
        .add_member_distributed(m2, 0.0, DistributedForce::uniform(Force::transverse(-10.0), 5.0).unwrap())
        .unwrap();

    structure.solve().unwrap();

    assert!(structure.node(n2).unwrap().releases().contains(Dof::Rz));
    assert_vector(
        structure.restrained_reactions().unwrap().as_slice(),
        &[17.8125, 64.0625, 42.1875, -85.9375],
        1e-9,
    );
    assert_vector(structure.free_displacements().unwrap().as_slice(), &[-0.037977], 1e-6);

    let ends = structure.member(m1).unwrap().end_actions().unwrap();
    assert_relative_eq!(ends.force_i.y(), 17.8125, epsilon = 1e-9);
    assert_relative_eq!(ends.moment_i.z(), 64.0625, epsilon = 1e-9);
    assert_relative_eq!(ends.force_j.y(), -7.8125, epsilon = 1e-9);
    assert_abs_diff_eq!(ends.moment_j.z(), 0.0, epsilon = 1e-9);

    let ends = structure.member(m2).unwrap().end_actions().unwrap();
    assert_relative_eq!(ends.force_i.y(), 7.8125, epsilon = 1e-9);
    assert_abs_diff_eq!(ends.moment_i.z(), 0.0, epsilon = 1e-9);
    assert_relative_eq!(ends.force_j.y(), 42.1875, epsilon = 1e-9);
    assert_relative_eq!(ends.moment_j.z(), -85.9375, epsilon = 1e-9);

    // no moment across the hinge
    let moment = structure.member(m1).unwrap().bending(Plane::Xy).unwrap();
    assert_abs_diff_eq!(moment.last(), 0.0, epsilon = 1e-9);
}

#[test]
fn test_moved_node_carries_member_loads() {
    let clamped = restrain(&[Dof::Dy, Dof::Rz]);
    let mut structure = Structure::new();
    let n1 = structure.add_node(Node::on_line(0.0).with_support(clamped));
    let n2 = structure.add_node(Node::on_line(10.0).with_support(clamped));
    let m = structure
        .add_member(Member::new(n1, n2, unit_section()).with_releases(MemberReleases::beam_2d()))
        .unwrap();
    structure.add_member_force(m, 5.0, Force::transverse(-8.0)).unwrap();
    structure.solve().unwrap();
    assert_relative_eq!(structure.reactions().unwrap()[&n1].fy, 4.0, epsilon = 1e-9);

    // stretch the span to 20: the load now sits at a = 5, b = 15
    *structure.node_mut(n2).unwrap() = Node::on_line(20.0).with_support(clamped);
    assert_abs_diff_eq!(structure.stiffness_matrix().unwrap()[(0, 0)], 12.0 / 8000.0, epsilon = 1e-15);
    structure.solve().unwrap();

    let reactions = structure.reactions().unwrap();
    // Pb^2(3a + b)/L^3 and Pab^2/L^2
    assert_relative_eq!(reactions[&n1].fy, 6.75, epsilon = 1e-9);
    assert_relative_eq!(reactions[&n1].mz, 22.5, epsilon = 1e-9);
    assert_relative_eq!(reactions[&n2].fy, 1.25, epsilon = 1e-9);
    assert_relative_eq!(reactions[&n2].mz, -7.5, epsilon = 1e-9);
    assert_eq!(structure.member(m).unwrap().forces()[0].context().length, 20.0);
    assert_eq!(structure.node(n2).unwrap().id(), Some(n2));

    // shrinking the span past the load is rejected
    *structure.node_mut(n2).unwrap() = Node::on_line(4.0).with_support(clamped);
    assert!(matches!(structure.solve(), Err(StiffnessError::InvalidInput(_))));
    assert!(!structure.is_solved());
}

#[test]
fn test_self_weight() {
    let section = Section::rectangular(2.0, 4.0).with_material(Material::a36());
    let w = 0.2836 * 8.0;
    assert_relative_eq!(section.weight_per_length(), w, epsilon = 1e-12);

    // simple span along x
    let mut structure = Structure::new();
    let n1 = structure.add_node(Node::on_line(0.0).with_support(Support::roller_y()));
    let n2 = structure.add_node(Node::on_line(120.0).with_support(Support::roller_y()));
    structure
        .add_member(Member::new(n1, n2, section).with_releases(MemberReleases::beam_2d()))
        .unwrap();
    structure.add_self_weight([0.0, -2.0, 0.0]).unwrap();
    structure.solve().unwrap();
    let reactions = structure.reactions().unwrap();
    assert_relative_eq!(reactions[&n1].fy, w * 60.0, epsilon = 1e-9);
    assert_relative_eq!(reactions[&n2].fy, w * 60.0, epsilon = 1e-9);

    // a cantilever column carries its weight axially
    let mut structure = Structure::new();
    let base = structure.add_node(Node::planar(0.0, 0.0).with_support(Support::fixed()));
    let top = structure.add_node(Node::planar(0.0, 100.0));
    let column = structure
        .add_member(Member::new(base, top, section).with_releases(MemberReleases::frame_2d()))
        .unwrap();
    structure.add_self_weight([0.0, -1.0, 0.0]).unwrap();
    structure.solve().unwrap();
    let reaction = structure.reactions().unwrap()[&base];
    assert_relative_eq!(reaction.fy, w * 100.0, epsilon = 1e-9);
    assert_abs_diff_eq!(reaction.fx, 0.0, epsilon = 1e-9);
    assert_abs_diff_eq!(reaction.mz, 0.0, epsilon = 1e-9);
    let axial = structure.member(column).unwrap().axial_force().unwrap();
    assert_relative_eq!(axial.first(), -w * 100.0, epsilon = 1e-9);
    assert_abs_diff_eq!(axial.last(), 0.0, epsilon = 1e-9);

    assert!(matches!(
        structure.add_self_weight([0.0, 0.0, 0.0]),
        Err(StiffnessError::InvalidInput(_))
    ));
}
