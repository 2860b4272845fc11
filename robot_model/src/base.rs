use crate::ModelError;
use nalgebra::DVector;
use serde::{Deserialize, Serialize};

/// Kinematic class of the mobile base, as named in configuration files.
///
/// Resolved once into an [`ActuationMap`] when the model is built; nothing
/// in the control loop dispatches on this value.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BaseType {
    Fixed,
    Nonholonomic,
    Omnidirectional,
    Floating,
}

impl BaseType {
    pub fn resolve(self) -> Result<ActuationMap, ModelError> {
        match self {
            BaseType::Fixed => Ok(ActuationMap::Fixed),
            BaseType::Nonholonomic => Ok(ActuationMap::Nonholonomic),
            BaseType::Omnidirectional => Ok(ActuationMap::Omnidirectional),
            BaseType::Floating => Err(ModelError::UnsupportedBase),
        }
    }
}

/// Maps a body-frame generalized velocity to the actuation velocity.
///
/// The base block `(vx, vy, wz)` is planar and body-frame; only the
/// heading enters the rotation because the base is constrained to the
/// ground plane. Arm joint rates are frame-independent and pass through.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ActuationMap {
    Fixed,
    Nonholonomic,
    Omnidirectional,
}

impl ActuationMap {
    /// Applies the base mapping in place to the planar block of `v`.
    ///
    /// `v` must hold at least the three base entries.
    pub fn apply(&self, heading: f64, v: &mut [f64]) {
        match self {
            ActuationMap::Fixed => {}
            ActuationMap::Nonholonomic => {
                v[1] = 0.0;
                rotate_planar(heading, v);
            }
            ActuationMap::Omnidirectional => rotate_planar(heading, v),
        }
    }

    /// Full actuation velocity for the configuration `q` and body velocity
    /// `v`.
    pub fn actuation_velocity(&self, q: &DVector<f64>, v: &DVector<f64>) -> DVector<f64> {
        let mut u = v.clone();
        self.apply(q[2], u.as_mut_slice());
        u
    }
}

fn rotate_planar(heading: f64, v: &mut [f64]) {
    let (s, c) = heading.sin_cos();
    let (vx, vy) = (v[0], v[1]);
    v[0] = c * vx - s * vy;
    v[1] = s * vx + c * vy;
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn test_fixed_passes_through() {
        let map = BaseType::Fixed.resolve().unwrap();
        let q = DVector::from_vec(vec![0.0, 0.0, FRAC_PI_2, 0.0]);
        let v = DVector::from_vec(vec![1.0, 0.5, 0.2, -0.3]);
        assert_eq!(map.actuation_velocity(&q, &v), v);
    }

    #[test]
    fn test_omnidirectional_rotates_planar_block() {
        let map = BaseType::Omnidirectional.resolve().unwrap();
        let q = DVector::from_vec(vec![0.0, 0.0, FRAC_PI_2, 0.0]);
        let v = DVector::from_vec(vec![1.0, 0.0, 0.2, -0.3]);
        let u = map.actuation_velocity(&q, &v);

        assert_abs_diff_eq!(u[0], 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(u[1], 1.0, epsilon = 1e-12);
        // yaw rate and arm rates untouched
        assert_abs_diff_eq!(u[2], 0.2, epsilon = 1e-12);
        assert_abs_diff_eq!(u[3], -0.3, epsilon = 1e-12);

        // rotation preserves planar speed
        let speed = (u[0] * u[0] + u[1] * u[1]).sqrt();
        assert_abs_diff_eq!(speed, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_nonholonomic_drops_lateral_rate() {
        let map = BaseType::Nonholonomic.resolve().unwrap();
        let q = DVector::from_vec(vec![0.0, 0.0, 0.0, 0.0]);
        let v = DVector::from_vec(vec![1.0, 0.7, 0.2, -0.3]);
        let u = map.actuation_velocity(&q, &v);

        assert_abs_diff_eq!(u[0], 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(u[1], 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_floating_is_rejected() {
        assert!(matches!(
            BaseType::Floating.resolve(),
            Err(ModelError::UnsupportedBase)
        ));
    }
}
