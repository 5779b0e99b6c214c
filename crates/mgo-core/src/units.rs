//! Unit-safe quantities for minigrid planning.
//!
//! Wire runs, building footprints and generator ratings all travel through the
//! engine as plain floating point numbers in the source data. Mixing a wire
//! length with a floor area is an easy mistake once everything is an `f64`, so
//! the model wraps each quantity in a newtype.
//!
//! All types are `#[repr(transparent)]` over `f64` and serialize as bare
//! numbers.
//!
//! # Usage
//!
//! ```
//! use mgo_core::units::{Meters, SquareMeters};
//!
//! let run = Meters(100.0) + Meters(50.0);
//! assert_eq!(run.value(), 150.0);
//!
//! // Different units do not mix:
//! // let wrong = run + SquareMeters(40.0);
//! let footprint = SquareMeters(40.0);
//! assert_eq!(footprint.value(), 40.0);
//! ```

use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign, Div, Mul, Sub};

macro_rules! impl_unit_ops {
    ($type:ty, $unit_name:literal) => {
        impl Add for $type {
            type Output = Self;
            fn add(self, rhs: Self) -> Self::Output {
                Self(self.0 + rhs.0)
            }
        }

        impl AddAssign for $type {
            fn add_assign(&mut self, rhs: Self) {
                self.0 += rhs.0;
            }
        }

        impl Sub for $type {
            type Output = Self;
            fn sub(self, rhs: Self) -> Self::Output {
                Self(self.0 - rhs.0)
            }
        }

        impl Mul<f64> for $type {
            type Output = Self;
            fn mul(self, rhs: f64) -> Self::Output {
                Self(self.0 * rhs)
            }
        }

        impl Div<f64> for $type {
            type Output = Self;
            fn div(self, rhs: f64) -> Self::Output {
                Self(self.0 / rhs)
            }
        }

        impl std::fmt::Display for $type {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{:.2} {}", self.0, $unit_name)
            }
        }

        impl $type {
            /// Zero of this unit
            pub const ZERO: Self = Self(0.0);

            #[inline]
            pub const fn new(value: f64) -> Self {
                Self(value)
            }

            /// Get the raw numeric value
            #[inline]
            pub const fn value(self) -> f64 {
                self.0
            }

            #[inline]
            pub fn is_finite(self) -> bool {
                self.0.is_finite()
            }
        }

        impl std::iter::Sum for $type {
            fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
                Self(iter.map(|x| x.0).sum())
            }
        }
    };
}

/// Length in metres, measured in the equal-area projection.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
#[repr(transparent)]
pub struct Meters(pub f64);

impl_unit_ops!(Meters, "m");

/// Floor area in square metres.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
#[repr(transparent)]
pub struct SquareMeters(pub f64);

impl_unit_ops!(SquareMeters, "m²");

/// Generator rating in kilowatts.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
#[repr(transparent)]
pub struct Kilowatts(pub f64);

impl_unit_ops!(Kilowatts, "kW");
