use nalgebra::{Matrix3, Vector3};
use serde::{Deserialize, Serialize};
use thiserror::Error;

const SYMMETRY_TOL: f64 = 1e-9;

#[derive(Debug, Error)]
pub enum RigidBodyError {
    #[error("mass must be positive, got {0}")]
    NonPositiveMass(f64),
    #[error("inertia diagonal must be positive")]
    NonPositiveInertiaDiagonal,
    #[error("inertia tensor must be symmetric")]
    AsymmetricInertia,
    #[error("shape dimensions must be positive")]
    DegenerateShape,
    #[error("cannot compose an empty body stack")]
    EmptyStack,
}

/// Mass, center of mass and inertia of a single rigid body.
///
/// The center of mass is expressed in the body's reference frame; the
/// inertia tensor is taken about the body's own center of mass. Immutable
/// once constructed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RigidBody {
    mass: f64,
    com: Vector3<f64>,
    inertia: Matrix3<f64>,
}

impl RigidBody {
    pub fn new(
        mass: f64,
        com: Vector3<f64>,
        inertia: Matrix3<f64>,
    ) -> Result<Self, RigidBodyError> {
        if mass <= f64::EPSILON {
            return Err(RigidBodyError::NonPositiveMass(mass));
        }
        if inertia[(0, 0)] <= 0.0 || inertia[(1, 1)] <= 0.0 || inertia[(2, 2)] <= 0.0 {
            return Err(RigidBodyError::NonPositiveInertiaDiagonal);
        }
        if (inertia - inertia.transpose()).abs().max() > SYMMETRY_TOL {
            return Err(RigidBodyError::AsymmetricInertia);
        }
        Ok(Self { mass, com, inertia })
    }

    /// Solid cylinder with its symmetry axis along z, centroid at the
    /// frame origin.
    pub fn cylinder(mass: f64, radius: f64, height: f64) -> Result<Self, RigidBodyError> {
        if radius <= 0.0 || height <= 0.0 {
            return Err(RigidBodyError::DegenerateShape);
        }
        let transverse = mass * (3.0 * radius * radius + height * height) / 12.0;
        let axial = mass * radius * radius / 2.0;
        Self::new(
            mass,
            Vector3::zeros(),
            Matrix3::from_diagonal(&Vector3::new(transverse, transverse, axial)),
        )
    }

    /// Solid cuboid with side lengths along the frame axes, centroid at the
    /// frame origin.
    pub fn cuboid(mass: f64, side_lengths: Vector3<f64>) -> Result<Self, RigidBodyError> {
        let [sx, sy, sz] = [side_lengths.x, side_lengths.y, side_lengths.z];
        if sx <= 0.0 || sy <= 0.0 || sz <= 0.0 {
            return Err(RigidBodyError::DegenerateShape);
        }
        let inertia = Matrix3::from_diagonal(&Vector3::new(
            mass * (sy * sy + sz * sz) / 12.0,
            mass * (sx * sx + sz * sz) / 12.0,
            mass * (sx * sx + sy * sy) / 12.0,
        ));
        Self::new(mass, Vector3::zeros(), inertia)
    }

    /// Relocates the center of mass in the reference frame. The inertia is
    /// unchanged, it remains about the body's own center of mass.
    pub fn with_com(mut self, com: Vector3<f64>) -> Self {
        self.com = com;
        self
    }

    pub fn mass(&self) -> f64 {
        self.mass
    }

    pub fn com(&self) -> Vector3<f64> {
        self.com
    }

    pub fn inertia(&self) -> Matrix3<f64> {
        self.inertia
    }
}

/// A stack of rigidly contacting bodies merged into one rigid body.
///
/// The composite owns recomputed mass properties, it does not alias its
/// constituents. It must be re-derived whenever the stack composition
/// changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositeBody {
    body: RigidBody,
    carrier_offset: Vector3<f64>,
}

impl CompositeBody {
    /// Merges `bodies` (all expressed in one shared reference frame) into a
    /// single rigid body. The first entry is the carrier (the body whose
    /// top face supports the rest of the stack).
    ///
    /// Mass is summed, the center of mass is the mass-weighted mean, and
    /// each inertia is moved to the composite center of mass with the
    /// parallel-axis theorem.
    pub fn compose(bodies: &[RigidBody]) -> Result<Self, RigidBodyError> {
        let carrier = bodies.first().ok_or(RigidBodyError::EmptyStack)?;

        let mass: f64 = bodies.iter().map(|b| b.mass).sum();
        let com: Vector3<f64> =
            bodies.iter().map(|b| b.com * b.mass).sum::<Vector3<f64>>() / mass;

        let mut inertia = Matrix3::zeros();
        for body in bodies {
            let d = body.com - com;
            inertia += body.inertia
                + body.mass * (d.dot(&d) * Matrix3::identity() - d * d.transpose());
        }

        Ok(Self {
            body: RigidBody { mass, com, inertia },
            carrier_offset: carrier.com - com,
        })
    }

    pub fn body(&self) -> &RigidBody {
        &self.body
    }

    pub fn mass(&self) -> f64 {
        self.body.mass
    }

    pub fn com(&self) -> Vector3<f64> {
        self.body.com
    }

    pub fn inertia(&self) -> Matrix3<f64> {
        self.body.inertia
    }

    /// Positional delta from the composite center of mass to the carrier's
    /// own center of mass. Used to re-anchor the carrier's support-area
    /// offset and height after composition.
    pub fn carrier_offset(&self) -> Vector3<f64> {
        self.carrier_offset
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    const TOL: f64 = 1e-12;

    #[test]
    fn test_identity_composition() {
        let body = RigidBody::cylinder(0.5, 0.25, 0.02)
            .unwrap()
            .with_com(Vector3::new(0.0, 0.0, 0.01));
        let composite = CompositeBody::compose(std::slice::from_ref(&body)).unwrap();

        assert_abs_diff_eq!(composite.mass(), body.mass(), epsilon = TOL);
        assert_abs_diff_eq!(composite.com(), body.com(), epsilon = TOL);
        assert_abs_diff_eq!(composite.inertia(), body.inertia(), epsilon = TOL);
        assert_abs_diff_eq!(composite.carrier_offset(), Vector3::zeros(), epsilon = TOL);
    }

    #[test]
    fn test_stacked_bodies_parallel_axis() {
        let lower = RigidBody::cuboid(1.0, Vector3::new(0.2, 0.2, 0.2))
            .unwrap()
            .with_com(Vector3::new(0.0, 0.0, 0.1));
        let upper = RigidBody::cuboid(1.0, Vector3::new(0.2, 0.2, 0.2))
            .unwrap()
            .with_com(Vector3::new(0.0, 0.0, 0.3));
        let composite = CompositeBody::compose(&[lower.clone(), upper.clone()]).unwrap();

        assert_abs_diff_eq!(composite.mass(), 2.0, epsilon = TOL);
        assert_abs_diff_eq!(composite.com(), Vector3::new(0.0, 0.0, 0.2), epsilon = TOL);

        // each body sits 0.1 off the composite COM along z
        let expected_transverse =
            lower.inertia()[(0, 0)] + upper.inertia()[(0, 0)] + 2.0 * 1.0 * 0.1 * 0.1;
        let expected_axial = lower.inertia()[(2, 2)] + upper.inertia()[(2, 2)];
        assert_abs_diff_eq!(composite.inertia()[(0, 0)], expected_transverse, epsilon = TOL);
        assert_abs_diff_eq!(composite.inertia()[(1, 1)], expected_transverse, epsilon = TOL);
        assert_abs_diff_eq!(composite.inertia()[(2, 2)], expected_axial, epsilon = TOL);

        assert_abs_diff_eq!(
            composite.carrier_offset(),
            Vector3::new(0.0, 0.0, -0.1),
            epsilon = TOL
        );
    }

    #[test]
    fn test_lateral_offset_shifts_composite_com() {
        let tray = RigidBody::cylinder(0.5, 0.25, 0.02).unwrap();
        let object = RigidBody::cylinder(1.0, 0.1, 0.4)
            .unwrap()
            .with_com(Vector3::new(0.06, 0.0, 0.21));
        let composite = CompositeBody::compose(&[tray, object]).unwrap();

        assert_abs_diff_eq!(composite.com().x, 0.06 / 1.5, epsilon = TOL);
        assert_abs_diff_eq!(composite.carrier_offset().x, -0.04, epsilon = TOL);
    }

    #[test]
    fn test_construction_validation() {
        assert!(matches!(
            RigidBody::new(0.0, Vector3::zeros(), Matrix3::identity()),
            Err(RigidBodyError::NonPositiveMass(_))
        ));
        assert!(matches!(
            RigidBody::cylinder(1.0, -0.1, 0.2),
            Err(RigidBodyError::DegenerateShape)
        ));
        assert!(matches!(
            CompositeBody::compose(&[]),
            Err(RigidBodyError::EmptyStack)
        ));

        let mut skewed = Matrix3::identity();
        skewed[(0, 1)] = 0.2;
        assert!(matches!(
            RigidBody::new(1.0, Vector3::zeros(), skewed),
            Err(RigidBodyError::AsymmetricInertia)
        ));
    }
}
