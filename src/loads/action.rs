//! Force and moment vectors, and the end actions they resolve into

use serde::{Deserialize, Serialize};
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Neg, Sub};

use crate::math::{Vec12, Vec3};

macro_rules! vector_action {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
        pub struct $name(Vec3);

        impl $name {
            pub fn new(x: f64, y: f64, z: f64) -> Self {
                Self(Vec3::new(x, y, z))
            }

            pub fn zero() -> Self {
                Self::default()
            }

            pub fn from_vector(v: Vec3) -> Self {
                Self(v)
            }

            pub fn vector(&self) -> Vec3 {
                self.0
            }

            pub fn components(&self) -> [f64; 3] {
                [self.0.x, self.0.y, self.0.z]
            }

            pub fn x(&self) -> f64 {
                self.0.x
            }

            pub fn y(&self) -> f64 {
                self.0.y
            }

            pub fn z(&self) -> f64 {
                self.0.z
            }

            pub fn magnitude(&self) -> f64 {
                self.0.norm()
            }
        }

        impl Add for $name {
            type Output = Self;
            fn add(self, rhs: Self) -> Self {
                Self(self.0 + rhs.0)
            }
        }

        impl AddAssign for $name {
            fn add_assign(&mut self, rhs: Self) {
                self.0 += rhs.0;
            }
        }

        impl Sub for $name {
            type Output = Self;
            fn sub(self, rhs: Self) -> Self {
                Self(self.0 - rhs.0)
            }
        }

        impl Neg for $name {
            type Output = Self;
            fn neg(self) -> Self {
                Self(-self.0)
            }
        }

        impl Mul<f64> for $name {
            type Output = Self;
            fn mul(self, rhs: f64) -> Self {
                Self(self.0 * rhs)
            }
        }

        impl Sum for $name {
            fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
                iter.fold(Self::zero(), Add::add)
            }
        }
    };
}

vector_action!(
    /// Concentrated force with x, y and z components
    Force
);

vector_action!(
    /// Concentrated moment about the x, y and z axes
    Moment
);

impl Force {
    /// In-plane force, no z component
    pub fn planar(x: f64, y: f64) -> Self {
        Self::new(x, y, 0.0)
    }

    /// Force along x only
    pub fn axial(x: f64) -> Self {
        Self::new(x, 0.0, 0.0)
    }

    /// Force along y only, the transverse direction of a planar beam
    pub fn transverse(y: f64) -> Self {
        Self::new(0.0, y, 0.0)
    }
}

impl Moment {
    /// In-plane moment (about z only)
    pub fn about_z(z: f64) -> Self {
        Self::new(0.0, 0.0, z)
    }

    /// Twisting moment (about x only)
    pub fn torsion(x: f64) -> Self {
        Self::new(x, 0.0, 0.0)
    }
}

/// Force and moment at both ends of a member, in local axes
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct EndActions {
    pub force_i: Force,
    pub moment_i: Moment,
    pub force_j: Force,
    pub moment_j: Moment,
}

impl EndActions {
    pub fn zero() -> Self {
        Self::default()
    }

    /// Split a 12-vector in local order into end actions
    pub fn from_vector(v: &Vec12) -> Self {
        Self {
            force_i: Force::new(v[0], v[1], v[2]),
            moment_i: Moment::new(v[3], v[4], v[5]),
            force_j: Force::new(v[6], v[7], v[8]),
            moment_j: Moment::new(v[9], v[10], v[11]),
        }
    }

    pub fn to_vector(&self) -> Vec12 {
        let mut v = Vec12::zeros();
        v.fixed_rows_mut::<3>(0).copy_from(&self.force_i.vector());
        v.fixed_rows_mut::<3>(3).copy_from(&self.moment_i.vector());
        v.fixed_rows_mut::<3>(6).copy_from(&self.force_j.vector());
        v.fixed_rows_mut::<3>(9).copy_from(&self.moment_j.vector());
        v
    }
}

impl Add for EndActions {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self {
            force_i: self.force_i + rhs.force_i,
            moment_i: self.moment_i + rhs.moment_i,
            force_j: self.force_j + rhs.force_j,
            moment_j: self.moment_j + rhs.moment_j,
        }
    }
}

impl Neg for EndActions {
    type Output = Self;
    fn neg(self) -> Self {
        Self {
            force_i: -self.force_i,
            moment_i: -self.moment_i,
            force_j: -self.force_j,
            moment_j: -self.moment_j,
        }
    }
}

impl Sum for EndActions {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::zero(), Add::add)
    }
}
