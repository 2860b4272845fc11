pub mod rk;
pub mod tableau;

use nalgebra::DVector;

pub use rk::RungeKutta;
pub use tableau::ButcherTableau;

/// A dynamical system driven by a control input held constant across each
/// integration step (zero-order hold).
pub trait ControlledOdeModel {
    /// Writes the tangent dx/dt at time `t` for state `x` under input `u`.
    fn f(&self, t: f64, x: &DVector<f64>, u: &DVector<f64>, dxdt: &mut DVector<f64>);
}
