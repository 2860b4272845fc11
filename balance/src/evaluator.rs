use crate::{BalanceError, SupportArea};
use nalgebra::{UnitQuaternion, Vector2, Vector3};
use rigid_body::{CompositeBody, RigidBody};

// below this normal force component the load is leaving the surface
const NORMAL_EPS: f64 = 1e-9;

/// End-effector kinematic state for one evaluation, all world frame.
#[derive(Debug, Clone, Copy)]
pub struct ToolMotion {
    pub orientation: UnitQuaternion<f64>,
    pub linear_velocity: Vector3<f64>,
    pub angular_velocity: Vector3<f64>,
    pub linear_acceleration: Vector3<f64>,
    pub angular_acceleration: Vector3<f64>,
}

impl ToolMotion {
    /// Motion of a tool at rest in the given orientation.
    pub fn at_rest(orientation: UnitQuaternion<f64>) -> Self {
        Self {
            orientation,
            linear_velocity: Vector3::zeros(),
            angular_velocity: Vector3::zeros(),
            linear_acceleration: Vector3::zeros(),
            angular_acceleration: Vector3::zeros(),
        }
    }
}

/// One object tracked by the evaluator: its composite mass properties, its
/// footprint on the carrier surface, and the height of the composite center
/// of mass above the support plane.
///
/// The center of mass of `body` is expressed in the end-effector frame.
#[derive(Debug, Clone)]
pub struct BalancedObject {
    pub body: CompositeBody,
    pub support: SupportArea,
    pub com_height: f64,
}

impl BalancedObject {
    pub fn new(body: CompositeBody, support: SupportArea, com_height: f64) -> Self {
        Self {
            body,
            support,
            com_height,
        }
    }

    /// Builds the tracked object for a carrier with other bodies rigidly
    /// stacked on it. The composite properties are re-derived and the
    /// carrier's footprint is re-anchored under the composite center of
    /// mass: the support offset picks up the lateral carrier-to-composite
    /// delta and the height loses its vertical component.
    pub fn from_stack(
        bodies: &[RigidBody],
        carrier_support: SupportArea,
        carrier_com_height: f64,
    ) -> Result<Self, BalanceError> {
        let body = CompositeBody::compose(bodies)?;
        let delta = body.carrier_offset();
        let support = carrier_support.with_offset(Vector2::new(delta.x, delta.y));
        Ok(Self {
            body,
            support,
            com_height: carrier_com_height - delta.z,
        })
    }
}

/// Margin and misalignment angle for one object, one control cycle.
#[derive(Debug, Clone, Copy)]
pub struct StabilityReport {
    /// Signed distance from the support boundary to the net-force
    /// intersection point, negative when stable.
    pub margin: f64,
    /// Angle between the carrier surface normal and the net specific
    /// force, radians.
    pub normal_angle: f64,
}

/// Net specific force on the composite center of mass in the world frame:
/// the inertial acceleration of the center of mass minus gravity.
fn net_specific_force(
    object: &BalancedObject,
    motion: &ToolMotion,
    gravity: Vector3<f64>,
) -> Vector3<f64> {
    let lever = motion.orientation * object.body.com();
    let com_acceleration = motion.linear_acceleration
        + motion.angular_acceleration.cross(&lever)
        + motion
            .angular_velocity
            .cross(&motion.angular_velocity.cross(&lever));
    com_acceleration - gravity
}

/// Signed distance from the support boundary to the point where the net
/// specific force pierces the support plane, negative when the object is
/// held inside its admissible region.
///
/// If the net specific force has no component pressing into the surface the
/// object is leaving it; the margin is `+inf`, never NaN, so a downstream
/// inequality constraint sees an unambiguous violation.
pub fn stability_margin(
    object: &BalancedObject,
    motion: &ToolMotion,
    gravity: Vector3<f64>,
) -> f64 {
    let force_world = net_specific_force(object, motion, gravity);
    let force_local = motion.orientation.inverse() * force_world;

    if force_local.z <= NORMAL_EPS {
        return f64::INFINITY;
    }

    let intersection = Vector2::new(force_local.x, force_local.y)
        * (-object.com_height / force_local.z);
    object.support.signed_distance(intersection)
}

/// Angle between the carrier's surface normal (rotated into the world
/// frame) and the net specific force direction, radians.
///
/// Zero net force carries no directional information and reports zero.
pub fn acceleration_normal_angle(
    object: &BalancedObject,
    motion: &ToolMotion,
    gravity: Vector3<f64>,
) -> f64 {
    let force = net_specific_force(object, motion, gravity);
    let norm = force.norm();
    if norm <= NORMAL_EPS {
        return 0.0;
    }
    let normal_world = motion.orientation * Vector3::z();
    (normal_world.dot(&force) / norm).clamp(-1.0, 1.0).acos()
}

/// Evaluates every tracked object for one control cycle. Objects are
/// independent; the evaluation is closed form and allocation is limited to
/// the report vector.
pub fn evaluate(
    objects: &[BalancedObject],
    motion: &ToolMotion,
    gravity: Vector3<f64>,
) -> Vec<StabilityReport> {
    objects
        .iter()
        .map(|object| StabilityReport {
            margin: stability_margin(object, motion, gravity),
            normal_angle: acceleration_normal_angle(object, motion, gravity),
        })
        .collect()
}
