//! Mathematical utilities for stiffness calculations

use nalgebra::{DMatrix, DVector, Matrix3, Rotation3, SMatrix, SVector, Vector3};

use crate::error::{StiffnessError, StiffnessResult};

pub type Mat = DMatrix<f64>;
pub type Vector = DVector<f64>;
pub type Mat3 = Matrix3<f64>;
pub type Vec3 = Vector3<f64>;

/// 12x12 matrix for member stiffness
pub type Mat12 = SMatrix<f64, 12, 12>;
/// 12-element vector for member end actions/displacements, local order
/// `[Fx, Fy, Fz, Mx, My, Mz]` at the i-node followed by the j-node
pub type Vec12 = SVector<f64, 12>;

/// Below this horizontal projection a member is treated as vertical
const VERTICAL_TOLERANCE: f64 = 1e-12;

/// Compute the local stiffness matrix for a 3D prismatic beam element
///
/// # Arguments
/// * `e` - Modulus of elasticity
/// * `g` - Shear modulus
/// * `a` - Cross-sectional area
/// * `iy` - Moment of inertia governing bending in the local xz plane
/// * `iz` - Moment of inertia governing bending in the local xy plane
/// * `j` - Torsional constant
/// * `length` - Member length
pub fn member_local_stiffness(
    e: f64,
    g: f64,
    a: f64,
    iy: f64,
    iz: f64,
    j: f64,
    length: f64,
) -> Mat12 {
    let l = length;
    let l2 = l * l;
    let l3 = l2 * l;

    let ea = e * a / l;
    let gj = g * j / l;

    let y3 = e * iy / l3;
    let y2 = e * iy / l2;
    let y1 = e * iy / l;

    let z3 = e * iz / l3;
    let z2 = e * iz / l2;
    let z1 = e * iz / l;

    #[rustfmt::skip]
    let data = [
        ea,    0.0,       0.0,       0.0,  0.0,      0.0,      -ea,  0.0,       0.0,       0.0,  0.0,      0.0,
        0.0,   12.0*z3,   0.0,       0.0,  0.0,      6.0*z2,   0.0,  -12.0*z3,  0.0,       0.0,  0.0,      6.0*z2,
        0.0,   0.0,       12.0*y3,   0.0,  -6.0*y2,  0.0,      0.0,  0.0,       -12.0*y3,  0.0,  -6.0*y2,  0.0,
        0.0,   0.0,       0.0,       gj,   0.0,      0.0,      0.0,  0.0,       0.0,       -gj,  0.0,      0.0,
        0.0,   0.0,       -6.0*y2,   0.0,  4.0*y1,   0.0,      0.0,  0.0,       6.0*y2,    0.0,  2.0*y1,   0.0,
        0.0,   6.0*z2,    0.0,       0.0,  0.0,      4.0*z1,   0.0,  -6.0*z2,   0.0,       0.0,  0.0,      2.0*z1,
        -ea,   0.0,       0.0,       0.0,  0.0,      0.0,      ea,   0.0,       0.0,       0.0,  0.0,      0.0,
        0.0,   -12.0*z3,  0.0,       0.0,  0.0,      -6.0*z2,  0.0,  12.0*z3,   0.0,       0.0,  0.0,      -6.0*z2,
        0.0,   0.0,       -12.0*y3,  0.0,  6.0*y2,   0.0,      0.0,  0.0,       12.0*y3,   0.0,  6.0*y2,   0.0,
        0.0,   0.0,       0.0,       -gj,  0.0,      0.0,      0.0,  0.0,       0.0,       gj,   0.0,      0.0,
        0.0,   0.0,       -6.0*y2,   0.0,  2.0*y1,   0.0,      0.0,  0.0,       6.0*y2,    0.0,  4.0*y1,   0.0,
        0.0,   6.0*z2,    0.0,       0.0,  0.0,      2.0*z1,   0.0,  -6.0*z2,   0.0,       0.0,  0.0,      4.0*z1,
    ];

    Mat12::from_row_slice(&data)
}

/// Moore-Penrose pseudo-inverse through SVD.
///
/// Singular values below `rtol * max_singular_value` are treated as zero.
pub fn pseudo_inverse(m: &Mat, rtol: f64) -> StiffnessResult<Mat> {
    if m.is_empty() {
        return Ok(Mat::zeros(m.ncols(), m.nrows()));
    }
    let max_sv = m.clone().svd(false, false).singular_values.max();
    let eps = (rtol * max_sv).max(f64::MIN_POSITIVE);
    m.clone()
        .svd(true, true)
        .pseudo_inverse(eps)
        .map_err(|e| StiffnessError::MathError(e.to_string()))
}

/// Split `0..flags.len()` into (kept, released) index lists
pub fn partition(flags: &[bool]) -> (Vec<usize>, Vec<usize>) {
    (0..flags.len()).partition(|&i| !flags[i])
}

/// Copy the `rows` x `cols` sub-block of `m`
pub fn submatrix(m: &Mat12, rows: &[usize], cols: &[usize]) -> Mat {
    Mat::from_fn(rows.len(), cols.len(), |i, j| m[(rows[i], cols[j])])
}

/// Copy the `rows` x `cols` sub-block of a dense matrix
pub fn select(m: &Mat, rows: &[usize], cols: &[usize]) -> Mat {
    Mat::from_fn(rows.len(), cols.len(), |i, j| m[(rows[i], cols[j])])
}

/// Gather the entries of `v` at `indices`
pub fn select_entries(v: &Vector, indices: &[usize]) -> Vector {
    Vector::from_iterator(indices.len(), indices.iter().map(|&i| v[i]))
}

/// Static condensation of released DOFs out of a member stiffness matrix.
///
/// Returns `K_kk - K_kr * pinv(K_rr) * K_rk` at kept x kept size. With
/// nothing released this is `k` itself.
pub fn condense_stiffness(k: &Mat12, released: &[bool; 12], rtol: f64) -> StiffnessResult<Mat> {
    let (kept, rel) = partition(released);
    let k_kk = submatrix(k, &kept, &kept);
    if rel.is_empty() {
        return Ok(k_kk);
    }

    let k_kr = submatrix(k, &kept, &rel);
    let k_rr_pinv = pseudo_inverse(&submatrix(k, &rel, &rel), rtol)?;
    let k_rk = submatrix(k, &rel, &kept);

    Ok(k_kk - k_kr * k_rr_pinv * k_rk)
}

/// Static condensation of a fixed end reaction vector.
///
/// Kept entries become `r_k - K_kr * pinv(K_rr) * r_r` and released entries
/// are zeroed. For a single released DOF this is the familiar correction by
/// the implied displacement `-r / K_diag`.
pub fn condense_reactions(
    r: &Vec12,
    k: &Mat12,
    released: &[bool; 12],
    rtol: f64,
) -> StiffnessResult<Vec12> {
    let (kept, rel) = partition(released);
    if rel.is_empty() {
        return Ok(*r);
    }

    let k_kr = submatrix(k, &kept, &rel);
    let k_rr_pinv = pseudo_inverse(&submatrix(k, &rel, &rel), rtol)?;
    let r_r = Vector::from_iterator(rel.len(), rel.iter().map(|&i| r[i]));
    let correction = k_kr * k_rr_pinv * r_r;

    let mut out = Vec12::zeros();
    for (n, &i) in kept.iter().enumerate() {
        out[i] = r[i] - correction[n];
    }
    Ok(out)
}

/// Rotation from global axes to the local axes of a member pointing along
/// `direction` (need not be normalised).
///
/// Rows are the local x, y and z axes expressed in global coordinates. The
/// local y axis stays in the vertical plane containing the member; vertical
/// members use the global z axis as local z.
pub fn member_rotation(direction: &Vec3) -> Mat3 {
    let d = direction.normalize();
    let (cx, cy, cz) = (d.x, d.y, d.z);
    let cxz = (cx * cx + cz * cz).sqrt();

    if cxz < VERTICAL_TOLERANCE {
        #[rustfmt::skip]
        let r = Mat3::new(
            0.0, cy,  0.0,
            -cy, 0.0, 0.0,
            0.0, 0.0, 1.0,
        );
        return r;
    }

    #[rustfmt::skip]
    let r = Mat3::new(
        cx,              cy,  cz,
        -cy * cx / cxz,  cxz, -cy * cz / cxz,
        -cz / cxz,       0.0, cx / cxz,
    );
    r
}

/// Rotation matrix of a node's local frame from a rotation vector (radians)
pub fn node_rotation(angle: &Vec3) -> Mat3 {
    Rotation3::new(*angle).into_inner()
}

/// Assemble square blocks along the diagonal of a new matrix
pub fn block_diagonal(blocks: &[Mat]) -> Mat {
    let n = blocks.iter().map(|b| b.nrows()).sum();
    let mut out = Mat::zeros(n, n);
    let mut offset = 0;
    for b in blocks {
        out.view_mut((offset, offset), (b.nrows(), b.ncols()))
            .copy_from(b);
        offset += b.nrows();
    }
    out
}

/// `n` evenly spaced samples over `[start, end]`, both ends included
pub fn linspace(start: f64, end: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (n - 1) as f64;
            let mut v: Vec<f64> = (0..n).map(|i| start + step * i as f64).collect();
            v[n - 1] = end;
            v
        }
    }
}

/// Cumulative trapezoidal integral of `y` over `x`, starting from `initial`
pub fn cumulative_trapezoid(y: &[f64], x: &[f64], initial: f64) -> Vec<f64> {
    let mut out = Vec::with_capacity(y.len());
    let mut acc = initial;
    for i in 0..y.len() {
        if i > 0 {
            acc += 0.5 * (y[i] + y[i - 1]) * (x[i] - x[i - 1]);
        }
        out.push(acc);
    }
    out
}

/// Solve a dense linear system with full pivoting.
///
/// Fails with [`StiffnessError::Unstable`] when the smallest pivot falls
/// below `tolerance` relative to the largest one.
pub fn solve_dense(a: &Mat, b: &Vector, tolerance: f64) -> StiffnessResult<Vector> {
    if a.nrows() == 0 {
        return Ok(Vector::zeros(0));
    }

    let lu = a.clone().full_piv_lu();
    let u = lu.u();
    let pivots = u.diagonal().map(f64::abs);
    let (max, min) = (pivots.max(), pivots.min());
    if max == 0.0 || min <= tolerance * max {
        let (index, _) = pivots.argmin();
        return Err(StiffnessError::Unstable(format!(
            "free stiffness block of {} DOFs is singular (pivot {} of {:.3e} against {:.3e})",
            a.nrows(),
            index,
            min,
            max
        )));
    }

    lu.solve(b).ok_or_else(|| {
        StiffnessError::Unstable(format!("free stiffness block of {} DOFs is singular", a.nrows()))
    })
}
