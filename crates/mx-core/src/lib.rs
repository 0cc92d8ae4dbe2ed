//! # mx-core
//!
//! Shared foundation for evmix: the workspace error type and the
//! four-momentum arithmetic used to derive candidate kinematics
//! (invariant mass, transverse momentum, rapidity).

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod kinematics;

pub use error::{Error, Result};
pub use kinematics::{FourMomentum, Kinematics};
