//! Four-momentum arithmetic for candidate kinematics.

use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign};

/// A particle four-momentum in Cartesian components `(px, py, pz, E)`.
///
/// Units are whatever the input dataset carries (typically MeV/c); all
/// derived quantities are unit-consistent with the components.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FourMomentum {
    /// x-component of momentum
    pub px: f64,
    /// y-component of momentum
    pub py: f64,
    /// z-component of momentum
    pub pz: f64,
    /// Energy
    pub e: f64,
}

impl FourMomentum {
    /// Create a four-momentum from Cartesian components.
    pub fn new(px: f64, py: f64, pz: f64, e: f64) -> Self {
        Self { px, py, pz, e }
    }

    /// The null four-momentum (additive identity).
    pub fn zero() -> Self {
        Self { px: 0.0, py: 0.0, pz: 0.0, e: 0.0 }
    }

    /// Squared three-momentum magnitude.
    pub fn p2(&self) -> f64 {
        self.px * self.px + self.py * self.py + self.pz * self.pz
    }

    /// Invariant mass `sqrt(E² − |p|²)`.
    ///
    /// The argument is clamped at zero so that floating-point noise on
    /// light-like vectors cannot produce NaN.
    pub fn mass(&self) -> f64 {
        (self.e * self.e - self.p2()).max(0.0).sqrt()
    }

    /// Transverse momentum `sqrt(px² + py²)`.
    pub fn pt(&self) -> f64 {
        self.px.hypot(self.py)
    }

    /// Rapidity `½·ln((E + pz)/(E − pz))`.
    ///
    /// Non-finite for unphysical vectors with `E <= |pz|`.
    pub fn rapidity(&self) -> f64 {
        0.5 * ((self.e + self.pz) / (self.e - self.pz)).ln()
    }

    /// Summary triple `(M, PT, Y)` of this four-momentum.
    pub fn kinematics(&self) -> Kinematics {
        Kinematics { m: self.mass(), pt: self.pt(), y: self.rapidity() }
    }
}

impl Add for FourMomentum {
    type Output = FourMomentum;

    fn add(self, rhs: FourMomentum) -> FourMomentum {
        FourMomentum {
            px: self.px + rhs.px,
            py: self.py + rhs.py,
            pz: self.pz + rhs.pz,
            e: self.e + rhs.e,
        }
    }
}

impl AddAssign for FourMomentum {
    fn add_assign(&mut self, rhs: FourMomentum) {
        self.px += rhs.px;
        self.py += rhs.py;
        self.pz += rhs.pz;
        self.e += rhs.e;
    }
}

/// Derived kinematics of a candidate: invariant mass, transverse momentum,
/// rapidity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Kinematics {
    /// Invariant mass
    pub m: f64,
    /// Transverse momentum
    pub pt: f64,
    /// Rapidity
    pub y: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const MUON_MASS: f64 = 105.658; // MeV

    fn muon(px: f64, py: f64, pz: f64) -> FourMomentum {
        let e = (px * px + py * py + pz * pz + MUON_MASS * MUON_MASS).sqrt();
        FourMomentum::new(px, py, pz, e)
    }

    #[test]
    fn mass_at_rest() {
        let p = FourMomentum::new(0.0, 0.0, 0.0, MUON_MASS);
        assert_relative_eq!(p.mass(), MUON_MASS, max_relative = 1e-12);
        assert_eq!(p.pt(), 0.0);
    }

    #[test]
    fn mass_clamped_for_lightlike_noise() {
        // E slightly below |p| from rounding must not give NaN.
        let p = FourMomentum::new(3.0, 4.0, 0.0, 5.0 - 1e-13);
        assert_eq!(p.mass(), 0.0);
    }

    #[test]
    fn dimuon_invariant_mass() {
        // Back-to-back muons in the transverse plane: M = 2E.
        let a = muon(1000.0, 0.0, 0.0);
        let b = muon(-1000.0, 0.0, 0.0);
        let sum = a + b;
        assert_relative_eq!(sum.mass(), 2.0 * a.e, max_relative = 1e-12);
        assert_relative_eq!(sum.pt(), 0.0, epsilon = 1e-9);
    }

    #[test]
    fn rapidity_is_odd_in_pz() {
        let a = muon(200.0, 0.0, 500.0);
        let b = muon(200.0, 0.0, -500.0);
        assert_relative_eq!(a.rapidity(), -b.rapidity(), max_relative = 1e-12);
    }

    #[test]
    fn add_assign_matches_add() {
        let a = muon(10.0, 20.0, 30.0);
        let b = muon(-5.0, 2.0, 80.0);
        let mut c = a;
        c += b;
        assert_eq!(c, a + b);
    }

    #[test]
    fn kinematics_summary() {
        let p = muon(300.0, 400.0, 0.0);
        let k = p.kinematics();
        assert_relative_eq!(k.pt, 500.0, max_relative = 1e-12);
        assert_relative_eq!(k.m, MUON_MASS, max_relative = 1e-9);
        assert_relative_eq!(k.y, 0.0, epsilon = 1e-12);
    }
}
