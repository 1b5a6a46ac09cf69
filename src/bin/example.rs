//! Stiffness Solver Example - Portal Frame and Continuous Beam
//!
//! Run with `RUST_LOG=debug` to see the assembly and solve trace.

use anyhow::Result;
use stiffness_solver::prelude::*;

fn main() -> Result<()> {
    env_logger::init();

    portal_frame()?;
    continuous_beam()?;

    println!("=== Analysis Complete ===");
    Ok(())
}

/// Fixed-base portal frame under gravity on the beam and a lateral load
/// at roof level (lbf, in)
fn portal_frame() -> Result<()> {
    println!("=== Portal Frame ===\n");

    //     N3 -------- N4
    //     |          |
    //     |          |
    //     N1        N2
    //   Fixed     Fixed
    let height = 144.0;
    let span = 240.0;

    // W12x26
    let section = Section::new(7.65, 17.3, 204.0, 0.3).with_material(Material::a36());

    let mut structure = Structure::new();
    let n1 = structure.add_node(Node::planar(0.0, 0.0).with_support(Support::fixed()));
    let n2 = structure.add_node(Node::planar(span, 0.0).with_support(Support::fixed()));
    let n3 = structure.add_node(Node::planar(0.0, height).with_force(Force::axial(10e3)));
    let n4 = structure.add_node(Node::planar(span, height));

    let frame = MemberReleases::frame_2d();
    let col1 = structure.add_member(Member::new(n1, n3, section).with_releases(frame))?;
    let col2 = structure.add_member(Member::new(n2, n4, section).with_releases(frame))?;
    let beam = structure.add_member(Member::new(n3, n4, section).with_releases(frame))?;

    // 1.5 kip/ft of gravity load on the beam
    structure.add_member_distributed(
        beam,
        0.0,
        DistributedForce::uniform(Force::transverse(-125.0), span)?,
    )?;

    structure.solve_with(&AnalysisOptions::strict())?;

    println!("Node Displacements:");
    for (id, disp) in structure.displacements()? {
        println!(
            "  {}: DX={:.4}in, DY={:.4}in, RZ={:.6}rad",
            id, disp.dx, disp.dy, disp.rz
        );
    }

    println!("\nSupport Reactions:");
    for (id, rxn) in structure.reactions()? {
        println!(
            "  {}: FX={:.2}kip, FY={:.2}kip, MZ={:.2}kip-in",
            id,
            rxn.fx / 1e3,
            rxn.fy / 1e3,
            rxn.mz / 1e3
        );
    }

    println!("\nMember Forces:");
    for (name, id) in [("Col1", col1), ("Col2", col2), ("Beam", beam)] {
        let member = structure.member(id)?;
        let ends = member.end_actions()?;
        let forces_i = MemberForces::at_i(&ends);
        let extremes = MemberForces::extremes(member)?;
        println!(
            "  {}: P={:.2}kip, Vmax={:.2}kip, Mmax={:.2}kip-in",
            name,
            forces_i.axial / 1e3,
            extremes.max_shear() / 1e3,
            extremes.max_moment() / 1e3
        );
    }

    print_summary(&structure)
}

/// Two-span continuous beam with a propped end, a point load and a
/// partial line load (kN, m)
fn continuous_beam() -> Result<()> {
    println!("\n=== Continuous Beam ===\n");

    let section = Section::planar(0.01, 2.5e-4).with_material(Material::new(200e6, 0.3));
    let roller = Support::roller_y();

    let mut structure = Structure::new();
    let a = structure.add_node(Node::on_line(0.0).with_support(roller));
    let b = structure.add_node(Node::on_line(6.0).with_support(roller));
    let c = structure.add_node(Node::on_line(10.0).with_support(Support::fixed()));

    let beam = MemberReleases::beam_2d();
    let ab = structure.add_member(Member::new(a, b, section).with_releases(beam))?;
    let bc = structure.add_member(Member::new(b, c, section).with_releases(beam))?;

    structure.add_member_force(ab, 2.0, Force::transverse(-40.0))?;
    structure.add_member_distributed(
        bc,
        1.0,
        DistributedForce::new(Force::transverse(-10.0), Force::transverse(-20.0), 2.0)?,
    )?;

    structure.solve()?;

    println!("Support Reactions:");
    for (id, rxn) in structure.reactions()? {
        println!("  {}: FY={:.3}kN, MZ={:.3}kN-m", id, rxn.fy, rxn.mz);
    }

    for (name, id) in [("AB", ab), ("BC", bc)] {
        let member = structure.member(id)?;
        let moment = member.bending(Plane::Xy)?;
        let deflection = member.deflection(Plane::Xy)?;
        println!(
            "  {}: M+={:.3}kN-m, M-={:.3}kN-m, max deflection={:.3}mm",
            name,
            moment.max(),
            moment.min(),
            deflection.extreme() * 1e3
        );
    }

    print_summary(&structure)
}

fn print_summary(structure: &Structure) -> Result<()> {
    let summary = structure.summary()?;
    let name = |id: Option<String>| id.unwrap_or_else(|| "-".to_string());

    println!("\nSummary:");
    println!("  DOFs: {} free, {} restrained", summary.free_dofs, summary.restrained_dofs);
    println!(
        "  Max displacement: {:.4} at {}",
        summary.max_displacement,
        name(summary.max_disp_node.map(|n| n.to_string()))
    );
    println!(
        "  Max reaction: {:.3} at {}",
        summary.max_reaction,
        name(summary.max_reaction_node.map(|n| n.to_string()))
    );
    println!(
        "  Max axial: {:.3} in {}",
        summary.max_axial,
        name(summary.max_axial_member.map(|m| m.to_string()))
    );
    println!(
        "  Max moment: {:.3} in {}",
        summary.max_moment,
        name(summary.max_moment_member.map(|m| m.to_string()))
    );
    Ok(())
}
