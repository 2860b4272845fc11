pub mod evaluator;
pub mod support;

use rigid_body::RigidBodyError;
use thiserror::Error;

pub use evaluator::{
    acceleration_normal_angle, evaluate, stability_margin, BalancedObject, StabilityReport,
    ToolMotion,
};
pub use support::{
    equilateral_triangle_inscribed_radius, DiscSupport, PolygonSupport, SupportArea,
};

#[derive(Debug, Error)]
pub enum BalanceError {
    #[error("disc radius must be positive, got {0}")]
    NonPositiveRadius(f64),
    #[error("margin must be non-negative, got {0}")]
    NegativeMargin(f64),
    #[error("margin {0} leaves no admissible support region")]
    DegenerateSupport(f64),
    #[error("support polygon needs at least 3 vertices, got {0}")]
    TooFewVertices(usize),
    #[error("support polygon vertices must be convex and counter-clockwise")]
    NotConvex,
    #[error("{0}")]
    RigidBody(#[from] RigidBodyError),
}
