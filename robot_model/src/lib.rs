pub mod base;
pub mod command;
pub mod config;
pub mod model;
pub mod noise;

use kinematics::KinematicsError;
use thiserror::Error;

pub use base::{ActuationMap, BaseType};
pub use command::CommandIntegrator;
pub use config::{NoiseConfig, RobotConfig, RobotDimensions};
pub use model::MobileManipulatorModel;
pub use noise::MeasurementNoise;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("floating base actuation is not supported")]
    UnsupportedBase,
    #[error("dimensions are inconsistent: x ({x}) must equal q ({q}) + v ({v})")]
    InconsistentDimensions { q: usize, v: usize, x: usize },
    #[error("home configuration has length {actual}, robot expects {expected}")]
    HomeLength { expected: usize, actual: usize },
    #[error("state vector has length {actual}, model expects {expected}")]
    StateLength { expected: usize, actual: usize },
    #[error("input vector has length {actual}, model expects {expected}")]
    InputLength { expected: usize, actual: usize },
    #[error("{0}")]
    Kinematics(#[from] KinematicsError),
}
