pub mod chain;
pub mod jacobian;
pub mod transform;

use thiserror::Error;

pub use chain::{ChainConfig, DhRow, JointFrame, JointKind, KinematicChain};
pub use jacobian::{jacobian, jacobian_rate};
pub use transform::Transform;

#[derive(Debug, Error)]
pub enum KinematicsError {
    #[error("configuration vector has length {actual}, chain expects {expected}")]
    ConfigurationLength { expected: usize, actual: usize },
    #[error("velocity vector has length {actual}, chain expects {expected}")]
    VelocityLength { expected: usize, actual: usize },
}
