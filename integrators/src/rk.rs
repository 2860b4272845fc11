use std::array;

use nalgebra::DVector;

use crate::{ControlledOdeModel, tableau::ButcherTableau};

/// Fixed-step explicit Runge-Kutta stepper.
///
/// Stage and state buffers are allocated once for a given state dimension
/// so that stepping inside a control loop is allocation-free.
#[derive(Debug)]
pub struct RungeKutta<const STAGES: usize> {
    tableau: ButcherTableau<STAGES>,
    k: [DVector<f64>; STAGES],
    stage: DVector<f64>,
}

impl RungeKutta<4> {
    /// Classical 4th-order scheme for a state of dimension `dim`.
    pub fn rk4(dim: usize) -> Self {
        Self::new(ButcherTableau::<4>::RK4, dim)
    }
}

impl<const STAGES: usize> RungeKutta<STAGES> {
    pub fn new(tableau: ButcherTableau<STAGES>, dim: usize) -> Self {
        Self {
            tableau,
            k: array::from_fn(|_| DVector::zeros(dim)),
            stage: DVector::zeros(dim),
        }
    }

    /// Advances `x` by one step of size `h`, writing the result into
    /// `x_next`. `u` is held constant across all stage evaluations.
    ///
    /// `h <= 0` is a caller precondition violation, not a checked error;
    /// the surrounding fixed-rate loop guarantees a positive step.
    pub fn step<Model: ControlledOdeModel>(
        &mut self,
        model: &Model,
        t: f64,
        x: &DVector<f64>,
        u: &DVector<f64>,
        h: f64,
        x_next: &mut DVector<f64>,
    ) {
        model.f(t, x, u, &mut self.k[0]);

        for s in 1..STAGES {
            // intermediate point from previous stages, scaled by the tableau
            self.stage.copy_from(x);
            for i in 0..s {
                let a = self.tableau.a[s][i];
                if a != 0.0 {
                    self.stage.axpy(h * a, &self.k[i], 1.0);
                }
            }
            model.f(t + self.tableau.c[s] * h, &self.stage, u, &mut self.k[s]);
        }

        x_next.copy_from(x);
        for s in 0..STAGES {
            x_next.axpy(h * self.tableau.b[s], &self.k[s], 1.0);
        }
    }
}
