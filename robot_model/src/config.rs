use crate::{BaseType, ModelError};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Generalized position, velocity, state and input sizes of the robot.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RobotDimensions {
    pub q: usize,
    pub v: usize,
    pub x: usize,
    pub u: usize,
}

impl RobotDimensions {
    pub fn new(q: usize, v: usize, u: usize) -> Self {
        Self { q, v, x: q + v, u }
    }

    pub fn validate(&self) -> Result<(), ModelError> {
        if self.x != self.q + self.v {
            return Err(ModelError::InconsistentDimensions {
                q: self.q,
                v: self.v,
                x: self.x,
            });
        }
        Ok(())
    }
}

/// Standard deviations of the additive Gaussian noise on measured joint
/// states. Zero disables the corresponding term.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct NoiseConfig {
    #[serde(default)]
    pub q_std_dev: f64,
    #[serde(default)]
    pub v_std_dev: f64,
}

/// Loader-facing robot description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RobotConfig {
    pub base_type: BaseType,
    pub dims: RobotDimensions,
    pub home: Vec<f64>,
    #[serde(default)]
    pub noise: NoiseConfig,
}

impl RobotConfig {
    /// The reference robot: UR10-class arm on an omnidirectional planar
    /// base, parked in the carrying pose.
    pub fn ur10_on_planar_base() -> Self {
        Self {
            base_type: BaseType::Omnidirectional,
            dims: RobotDimensions::new(9, 9, 9),
            home: ur10_carry_home(),
            noise: NoiseConfig::default(),
        }
    }

    pub fn validate(&self) -> Result<(), ModelError> {
        self.dims.validate()?;
        if self.home.len() != self.dims.q {
            return Err(ModelError::HomeLength {
                expected: self.dims.q,
                actual: self.home.len(),
            });
        }
        Ok(())
    }
}

/// Home configuration that keeps the tool plate level for carrying.
pub fn ur10_carry_home() -> Vec<f64> {
    vec![
        0.0,
        0.0,
        0.0,
        0.0,
        -0.75 * PI,
        -0.5 * PI,
        -0.25 * PI,
        -0.5 * PI,
        0.5 * PI,
    ]
}
