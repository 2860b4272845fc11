use crate::chain::{ChainConfig, JointKind, KinematicChain};
use crate::KinematicsError;
use nalgebra::{DVector, Matrix6xX, Vector3};

/// Assembles the 6xn geometric Jacobian from an evaluated chain.
///
/// Rows 0-2 map joint rates to tool linear velocity, rows 3-5 to angular
/// velocity, both in the world frame. Prismatic columns carry only the
/// joint's world-frame translation axis; revolute columns carry the joint
/// axis and its cross product with the lever arm to the tool.
pub fn jacobian(chain: &KinematicChain) -> Matrix6xX<f64> {
    let mut j = Matrix6xX::zeros(chain.dof());
    let p_tool = chain.tool().translation;

    for (i, frame) in chain.frames().iter().enumerate() {
        let (linear, angular) = match frame.kind {
            JointKind::Prismatic => (frame.axis, Vector3::zeros()),
            JointKind::Revolute => {
                (frame.axis.cross(&(p_tool - frame.anchor)), frame.axis)
            }
        };
        j.fixed_view_mut::<3, 1>(0, i).copy_from(&linear);
        j.fixed_view_mut::<3, 1>(3, i).copy_from(&angular);
    }
    j
}

const RATE_STEP: f64 = 1e-6;

/// Time derivative of the Jacobian contracted with the joint velocity,
/// `dJ/dt = sum_k dJ/dq_k * v_k`, by central differences over `q`.
pub fn jacobian_rate(
    config: &ChainConfig,
    q: &DVector<f64>,
    v: &DVector<f64>,
) -> Result<Matrix6xX<f64>, KinematicsError> {
    let n = config.dof();
    if v.len() != n {
        return Err(KinematicsError::VelocityLength {
            expected: n,
            actual: v.len(),
        });
    }

    let mut djdt = Matrix6xX::zeros(n);
    let mut probe = q.clone();
    for k in 0..n {
        probe[k] = q[k] + RATE_STEP;
        let plus = jacobian(&config.forward(&probe)?);
        probe[k] = q[k] - RATE_STEP;
        let minus = jacobian(&config.forward(&probe)?);
        probe[k] = q[k];

        djdt += (plus - minus) * (v[k] / (2.0 * RATE_STEP));
    }
    Ok(djdt)
}
