use crate::{ActuationMap, BaseType, ModelError, RobotDimensions};
use balance::{evaluate, BalancedObject, StabilityReport, ToolMotion};
use integrators::{ControlledOdeModel, RungeKutta};
use kinematics::{jacobian, jacobian_rate, ChainConfig};
use nalgebra::{DVector, Matrix6xX, Rotation3, UnitQuaternion, Vector3, Vector6};

/// Tangent of the kinematic state `x = [q, v]` under the held input `u`:
/// `dx = [v, B(heading) u]`, the base block of `u` rotated into the world
/// frame through the resolved actuation strategy.
#[derive(Debug)]
struct KinematicTangent {
    map: ActuationMap,
    dof: usize,
}

impl ControlledOdeModel for KinematicTangent {
    fn f(&self, _t: f64, x: &DVector<f64>, u: &DVector<f64>, dxdt: &mut DVector<f64>) {
        let n = self.dof;
        for i in 0..n {
            dxdt[i] = x[n + i];
        }
        for i in 0..n {
            dxdt[n + i] = u[i];
        }
        let heading = x[2];
        self.map.apply(heading, &mut dxdt.as_mut_slice()[n..]);
    }
}

/// Kinematic model of the mobile manipulator, stepped at a fixed rate.
///
/// Per control cycle the caller reads fresh feedback, queries tool
/// kinematics and stability, and either advances this model (planning and
/// rollout) or the [`crate::CommandIntegrator`] (hardware-facing loop).
#[derive(Debug)]
pub struct MobileManipulatorModel {
    chain: ChainConfig,
    tangent_model: KinematicTangent,
    dims: RobotDimensions,
    dt: f64,
    solver: RungeKutta<4>,
    x_next: DVector<f64>,
}

impl MobileManipulatorModel {
    /// `dt` is the fixed integration step; a non-positive step is a caller
    /// precondition violation.
    pub fn new(chain: ChainConfig, base_type: BaseType, dt: f64) -> Result<Self, ModelError> {
        let map = base_type.resolve()?;
        let n = chain.dof();
        Ok(Self {
            tangent_model: KinematicTangent { map, dof: n },
            dims: RobotDimensions::new(n, n, n),
            dt,
            solver: RungeKutta::rk4(2 * n),
            x_next: DVector::zeros(2 * n),
            chain,
        })
    }

    pub fn dims(&self) -> RobotDimensions {
        self.dims
    }

    pub fn dt(&self) -> f64 {
        self.dt
    }

    pub fn chain(&self) -> &ChainConfig {
        &self.chain
    }

    fn check_state(&self, x: &DVector<f64>) -> Result<(), ModelError> {
        if x.len() != self.dims.x {
            return Err(ModelError::StateLength {
                expected: self.dims.x,
                actual: x.len(),
            });
        }
        Ok(())
    }

    fn check_input(&self, u: &DVector<f64>) -> Result<(), ModelError> {
        if u.len() != self.dims.u {
            return Err(ModelError::InputLength {
                expected: self.dims.u,
                actual: u.len(),
            });
        }
        Ok(())
    }

    /// Tool position and orientation in the world frame.
    pub fn tool_pose(
        &self,
        q: &DVector<f64>,
    ) -> Result<(Vector3<f64>, UnitQuaternion<f64>), ModelError> {
        let chain = self.chain.forward(q)?;
        let tool = chain.tool();
        let orientation = UnitQuaternion::from_rotation_matrix(&Rotation3::from_matrix_unchecked(
            tool.rotation,
        ));
        Ok((tool.translation, orientation))
    }

    /// Geometric Jacobian at `q`. Near-singular configurations are returned
    /// as-is; callers inspect conditioning through the singular values.
    pub fn jacobian(&self, q: &DVector<f64>) -> Result<Matrix6xX<f64>, ModelError> {
        Ok(jacobian(&self.chain.forward(q)?))
    }

    /// World-frame tool twist `J(q) v`, linear over angular.
    pub fn tool_velocity(
        &self,
        q: &DVector<f64>,
        v: &DVector<f64>,
    ) -> Result<Vector6<f64>, ModelError> {
        if v.len() != self.dims.v {
            return Err(ModelError::InputLength {
                expected: self.dims.v,
                actual: v.len(),
            });
        }
        Ok(self.jacobian(q)? * v)
    }

    /// World-frame tool acceleration `J(q) u + dJ/dt v` for the state
    /// `x = [q, v]` and joint acceleration `u`.
    pub fn tool_acceleration(
        &self,
        x: &DVector<f64>,
        u: &DVector<f64>,
    ) -> Result<Vector6<f64>, ModelError> {
        self.check_state(x)?;
        self.check_input(u)?;
        let n = self.dims.q;
        let q = x.rows(0, n).into_owned();
        let v = x.rows(n, n).into_owned();

        let j = self.jacobian(&q)?;
        let djdt = jacobian_rate(&self.chain, &q, &v)?;
        Ok(j * u + djdt * v)
    }

    /// Tangent vector `dx = f(x, u)`.
    pub fn tangent(&self, x: &DVector<f64>, u: &DVector<f64>) -> Result<DVector<f64>, ModelError> {
        self.check_state(x)?;
        self.check_input(u)?;
        let mut dxdt = DVector::zeros(x.len());
        self.tangent_model.f(0.0, x, u, &mut dxdt);
        Ok(dxdt)
    }

    /// Advances the state by one step of classical Runge-Kutta with `u`
    /// held constant across the stage evaluations.
    pub fn simulate(&mut self, x: &DVector<f64>, u: &DVector<f64>) -> Result<DVector<f64>, ModelError> {
        self.check_state(x)?;
        self.check_input(u)?;
        self.solver
            .step(&self.tangent_model, 0.0, x, u, self.dt, &mut self.x_next);
        Ok(self.x_next.clone())
    }

    /// Tool kinematic state for the stability evaluator, assembled from the
    /// chain, the Jacobian and its rate.
    pub fn tool_motion(&self, x: &DVector<f64>, u: &DVector<f64>) -> Result<ToolMotion, ModelError> {
        self.check_state(x)?;
        self.check_input(u)?;
        let n = self.dims.q;
        let q = x.rows(0, n).into_owned();
        let v = x.rows(n, n).into_owned();

        let (_, orientation) = self.tool_pose(&q)?;
        let j = self.jacobian(&q)?;
        let twist = &j * &v;
        let acceleration = j * u + jacobian_rate(&self.chain, &q, &v)? * &v;

        Ok(ToolMotion {
            orientation,
            linear_velocity: twist.fixed_rows::<3>(0).into_owned(),
            angular_velocity: twist.fixed_rows::<3>(3).into_owned(),
            linear_acceleration: acceleration.fixed_rows::<3>(0).into_owned(),
            angular_acceleration: acceleration.fixed_rows::<3>(3).into_owned(),
        })
    }

    /// Stability margin and normal-misalignment angle of every tracked
    /// object at the state `x` under joint acceleration `u`.
    pub fn stability(
        &self,
        x: &DVector<f64>,
        u: &DVector<f64>,
        objects: &[BalancedObject],
        gravity: Vector3<f64>,
    ) -> Result<Vec<StabilityReport>, ModelError> {
        Ok(evaluate(objects, &self.tool_motion(x, u)?, gravity))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ur10_carry_home;
    use approx::assert_abs_diff_eq;
    use balance::SupportArea;
    use rigid_body::RigidBody;

    const GRAVITY: Vector3<f64> = Vector3::new(0.0, 0.0, -9.81);

    fn reference_model(dt: f64) -> MobileManipulatorModel {
        MobileManipulatorModel::new(
            ChainConfig::ur10_on_planar_base(),
            BaseType::Omnidirectional,
            dt,
        )
        .unwrap()
    }

    fn home_state(n: usize) -> DVector<f64> {
        let mut x = DVector::zeros(2 * n);
        for (i, value) in ur10_carry_home().into_iter().enumerate() {
            x[i] = value;
        }
        x
    }

    #[test]
    fn test_base_velocity_maps_straight_to_tool() {
        let model = reference_model(0.001);
        let q = DVector::from_vec(ur10_carry_home());
        let mut v = DVector::zeros(9);
        v[0] = 1.0;

        let twist = model.tool_velocity(&q, &v).unwrap();
        assert_abs_diff_eq!(twist[0], 1.0, epsilon = 1e-12);
        for r in 1..6 {
            assert_abs_diff_eq!(twist[r], 0.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_tool_acceleration_reduces_to_jacobian_at_rest() {
        let model = reference_model(0.001);
        let x = home_state(9);
        let u = DVector::from_fn(9, |i, _| 0.1 * (i as f64 + 1.0));

        let accel = model.tool_acceleration(&x, &u).unwrap();
        let q = x.rows(0, 9).into_owned();
        let expected = model.jacobian(&q).unwrap() * &u;

        for r in 0..6 {
            assert_abs_diff_eq!(accel[r], expected[r], epsilon = 1e-12);
        }
    }

    // constant yaw rate with constant body-frame base acceleration has a
    // closed-form trajectory: v_x = (a/w) sin(wt), v_y = (a/w)(1 - cos(wt))
    fn yaw_spiral_error(dt: f64) -> f64 {
        let mut model = reference_model(dt);
        let a = 1.0;
        let w = 1.0;

        let mut x = DVector::zeros(18);
        x[11] = w; // yaw rate
        let mut u = DVector::zeros(9);
        u[0] = a;

        let steps = (1.0 / dt).round() as usize;
        for _ in 0..steps {
            x = model.simulate(&x, &u).unwrap();
        }

        let t = 1.0;
        let expected = [
            (a / (w * w)) * (1.0 - (w * t).cos()),
            a * (t / w - (w * t).sin() / (w * w)),
            (a / w) * (w * t).sin(),
            (a / w) * (1.0 - (w * t).cos()),
        ];
        let got = [x[0], x[1], x[9], x[10]];

        expected
            .iter()
            .zip(got)
            .map(|(e, g)| (e - g).abs())
            .fold(0.0, f64::max)
    }

    #[test]
    fn test_rk4_matches_closed_form_to_fourth_order() {
        let coarse = yaw_spiral_error(0.05);
        let fine = yaw_spiral_error(0.025);
        let ratio = coarse / fine;
        assert!(ratio > 12.0 && ratio < 20.0, "ratio = {ratio}");
        assert!(fine < 1e-6, "fine error = {fine}");
    }

    #[test]
    fn test_command_mode_agrees_with_kinematic_mode() {
        // fixed heading, constant body-frame acceleration: the Euler command
        // path must track the RK4 path to first order in dt
        use crate::CommandIntegrator;

        let dt = 1e-3;
        let heading = 0.7;
        let steps = 200;

        let mut model = reference_model(dt);
        let mut x = DVector::zeros(18);
        x[2] = heading;
        let mut u = DVector::zeros(9);
        u[0] = 0.5;
        u[1] = 0.2;

        for _ in 0..steps {
            x = model.simulate(&x, &u).unwrap();
        }

        let mut commands = CommandIntegrator::new(BaseType::Omnidirectional, 9, dt).unwrap();
        commands.command_acceleration(&u).unwrap();
        let mut q_cmd = DVector::zeros(9);
        q_cmd[2] = heading;
        for _ in 0..steps {
            let actuation = commands.step(&q_cmd);
            q_cmd.axpy(dt, &actuation, 1.0);
        }

        let bound = dt * steps as f64 * dt * 0.5_f64.max(0.2) * 2.0;
        for i in 0..3 {
            assert_abs_diff_eq!(x[i], q_cmd[i], epsilon = bound);
        }
    }

    #[test]
    fn test_stability_glue_matches_direct_evaluation() {
        let model = reference_model(0.001);
        let x = home_state(9);
        let u = DVector::zeros(9);

        let tray = RigidBody::cylinder(0.5, 0.25, 0.02).unwrap();
        let cylinder = RigidBody::cylinder(1.0, 0.1, 0.4)
            .unwrap()
            .with_com(Vector3::new(0.0, 0.0, 0.22));
        let object = balance::BalancedObject::from_stack(
            &[tray, cylinder],
            SupportArea::disc(0.25, 0.0).unwrap(),
            0.01,
        )
        .unwrap();

        let reports = model
            .stability(&x, &u, std::slice::from_ref(&object), GRAVITY)
            .unwrap();
        assert_eq!(reports.len(), 1);

        let motion = model.tool_motion(&x, &u).unwrap();
        let direct = balance::stability_margin(&object, &motion, GRAVITY);
        assert_abs_diff_eq!(reports[0].margin, direct, epsilon = 1e-15);

        // the carry home keeps the plate level: at rest the force line
        // drops through the footprint center
        assert_abs_diff_eq!(reports[0].margin, -0.25, epsilon = 1e-9);
        assert_abs_diff_eq!(reports[0].normal_angle, 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_state_and_input_lengths_checked() {
        let mut model = reference_model(0.001);
        let x = DVector::zeros(18);
        assert!(matches!(
            model.simulate(&x, &DVector::zeros(4)),
            Err(ModelError::InputLength { .. })
        ));
        assert!(matches!(
            model.simulate(&DVector::zeros(7), &DVector::zeros(9)),
            Err(ModelError::StateLength { .. })
        ));
    }
}
