use crate::{ActuationMap, BaseType, ModelError};
use nalgebra::DVector;

/// Controller-facing command state: the latest commanded velocity,
/// acceleration and jerk, accumulated by forward Euler at the control rate.
///
/// This is the only mutable state in the core. Integration accuracy is
/// deliberately traded for latency here; the loop runs against fresh
/// feedback every cycle.
#[derive(Debug, Clone)]
pub struct CommandIntegrator {
    map: ActuationMap,
    dt: f64,
    cmd_vel: DVector<f64>,
    cmd_acc: DVector<f64>,
    cmd_jerk: DVector<f64>,
}

impl CommandIntegrator {
    /// `dt` is the control period; a non-positive period is a caller
    /// precondition violation.
    pub fn new(base_type: BaseType, dof: usize, dt: f64) -> Result<Self, ModelError> {
        Ok(Self {
            map: base_type.resolve()?,
            dt,
            cmd_vel: DVector::zeros(dof),
            cmd_acc: DVector::zeros(dof),
            cmd_jerk: DVector::zeros(dof),
        })
    }

    fn check(&self, input: &DVector<f64>) -> Result<(), ModelError> {
        if input.len() != self.cmd_vel.len() {
            return Err(ModelError::InputLength {
                expected: self.cmd_vel.len(),
                actual: input.len(),
            });
        }
        Ok(())
    }

    /// Overrides the commanded velocity directly (body frame).
    pub fn command_velocity(&mut self, velocity: &DVector<f64>) -> Result<(), ModelError> {
        self.check(velocity)?;
        self.cmd_vel.copy_from(velocity);
        Ok(())
    }

    /// Sets the commanded acceleration (body frame).
    pub fn command_acceleration(&mut self, acceleration: &DVector<f64>) -> Result<(), ModelError> {
        self.check(acceleration)?;
        self.cmd_acc.copy_from(acceleration);
        Ok(())
    }

    /// Sets the commanded jerk (body frame).
    pub fn command_jerk(&mut self, jerk: &DVector<f64>) -> Result<(), ModelError> {
        self.check(jerk)?;
        self.cmd_jerk.copy_from(jerk);
        Ok(())
    }

    /// Advances the command state by one control period and returns the
    /// actuation velocity for the measured configuration `q`.
    pub fn step(&mut self, q: &DVector<f64>) -> DVector<f64> {
        self.cmd_acc.axpy(self.dt, &self.cmd_jerk, 1.0);
        self.cmd_vel.axpy(self.dt, &self.cmd_acc, 1.0);
        self.map.actuation_velocity(q, &self.cmd_vel)
    }

    pub fn velocity(&self) -> &DVector<f64> {
        &self.cmd_vel
    }

    pub fn acceleration(&self) -> &DVector<f64> {
        &self.cmd_acc
    }
}
