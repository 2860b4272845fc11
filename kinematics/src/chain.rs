use crate::{KinematicsError, Transform};
use nalgebra::{DVector, Matrix3, Vector3};
use serde::{Deserialize, Serialize};
use std::f64::consts::FRAC_PI_2;

/// One Denavit-Hartenberg row: joint angle, link length, link offset, link
/// twist.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct DhRow {
    pub theta: f64,
    pub a: f64,
    pub d: f64,
    pub alpha: f64,
}

impl DhRow {
    pub const fn new(theta: f64, a: f64, d: f64, alpha: f64) -> Self {
        Self { theta, a, d, alpha }
    }

    /// Local transform with the joint variable added to the joint angle.
    pub fn revolute(&self, q: f64) -> Transform {
        dh_transform(self.theta + q, self.a, self.d, self.alpha)
    }

    /// Local transform with the joint variable added to the link offset.
    pub fn prismatic(&self, q: f64) -> Transform {
        dh_transform(self.theta, self.a, self.d + q, self.alpha)
    }

    /// Local transform with no joint variable.
    pub fn fixed(&self) -> Transform {
        dh_transform(self.theta, self.a, self.d, self.alpha)
    }
}

fn dh_transform(theta: f64, a: f64, d: f64, alpha: f64) -> Transform {
    let (st, ct) = theta.sin_cos();
    let (sa, ca) = alpha.sin_cos();
    Transform::new(
        Matrix3::new(
            ct,
            -st * ca,
            st * sa,
            st,
            ct * ca,
            -ct * sa,
            0.0,
            sa,
            ca,
        ),
        Vector3::new(a * ct, a * st, d),
    )
}

/// Whether a joint variable translates along or rotates about its local
/// z-axis.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum JointKind {
    Prismatic,
    Revolute,
}

/// One evaluated joint: its link frame in the world, plus the world-frame
/// axis the joint variable acts along (or about) and a point on that axis.
///
/// The joint variable translates along or rotates about the z-axis of the
/// frame preceding the joint's local transform; the link twist of the
/// joint's own row tilts the frame afterwards, so the axis must be taken
/// before it.
#[derive(Debug, Copy, Clone)]
pub struct JointFrame {
    pub transform: Transform,
    pub axis: Vector3<f64>,
    pub anchor: Vector3<f64>,
    pub kind: JointKind,
}

// Fixed reorientation so the two prismatic base joints translate along the
// world x and y axes.
const WORLD_TO_BASE: DhRow = DhRow::new(FRAC_PI_2, 0.0, 0.0, FRAC_PI_2);
const BASE_X: DhRow = DhRow::new(FRAC_PI_2, 0.0, 0.0, FRAC_PI_2);
const BASE_Y: DhRow = DhRow::new(FRAC_PI_2, 0.0, 0.0, FRAC_PI_2);
const BASE_YAW: DhRow = DhRow::new(0.0, 0.0, 0.0, 0.0);

/// Fixed topology of the mobile-manipulator chain: a planar base block
/// (prismatic x, prismatic y, revolute yaw) followed by the arm's revolute
/// joints, with constant mount and tool transforms.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainConfig {
    /// Fixed rows from the yaw frame to the first arm joint frame.
    pub base_to_arm: Vec<DhRow>,
    /// Revolute arm joints, `theta` holding any constant angle offset.
    pub arm: Vec<DhRow>,
    /// Fixed rows from the last arm frame to the tool frame.
    pub tool: Vec<DhRow>,
}

impl ChainConfig {
    /// Reference parameterization: a UR10-class arm mounted on a planar
    /// omnidirectional base.
    pub fn ur10_on_planar_base() -> Self {
        const PX: f64 = 0.27;
        const PY: f64 = 0.01;
        const PZ: f64 = 0.653;
        const D1: f64 = 0.1273;
        const A2: f64 = -0.612;
        const A3: f64 = -0.5723;
        const D4: f64 = 0.163941;
        const D5: f64 = 0.1157;
        const D6: f64 = 0.0922;
        const D7: f64 = 0.290;

        Self {
            base_to_arm: vec![
                DhRow::new(0.0, PX, PZ, -FRAC_PI_2),
                DhRow::new(0.0, 0.0, PY, FRAC_PI_2),
            ],
            arm: vec![
                DhRow::new(0.0, 0.0, D1, FRAC_PI_2),
                DhRow::new(0.0, A2, 0.0, 0.0),
                DhRow::new(0.0, A3, 0.0, 0.0),
                DhRow::new(0.0, 0.0, D4, FRAC_PI_2),
                DhRow::new(0.0, 0.0, D5, -FRAC_PI_2),
                DhRow::new(0.0, 0.0, D6, 0.0),
            ],
            tool: vec![DhRow::new(0.0, 0.0, D7, 0.0)],
        }
    }

    /// Number of generalized coordinates, base block included.
    pub fn dof(&self) -> usize {
        3 + self.arm.len()
    }

    /// Evaluates every joint frame and the tool frame in the world frame
    /// for the configuration `q`.
    ///
    /// Fails fast if `q` does not match the chain's degree of freedom; any
    /// finite `q` of the right length produces a finite chain.
    pub fn forward(&self, q: &DVector<f64>) -> Result<KinematicChain, KinematicsError> {
        if q.len() != self.dof() {
            return Err(KinematicsError::ConfigurationLength {
                expected: self.dof(),
                actual: q.len(),
            });
        }

        let mut frames = Vec::with_capacity(self.dof());
        let mut t = WORLD_TO_BASE.fixed();

        let mut push = |t: &mut Transform, local: Transform, kind: JointKind| {
            let frame = JointFrame {
                axis: t.rotate(Vector3::z()),
                anchor: t.translation,
                transform: *t * local,
                kind,
            };
            *t = frame.transform;
            frames.push(frame);
        };

        push(&mut t, BASE_X.prismatic(q[0]), JointKind::Prismatic);
        push(&mut t, BASE_Y.prismatic(q[1]), JointKind::Prismatic);
        push(&mut t, BASE_YAW.revolute(q[2]), JointKind::Revolute);

        for row in &self.base_to_arm {
            t = t * row.fixed();
        }
        for (i, row) in self.arm.iter().enumerate() {
            push(&mut t, row.revolute(q[3 + i]), JointKind::Revolute);
        }
        for row in &self.tool {
            t = t * row.fixed();
        }

        Ok(KinematicChain { frames, tool: t })
    }
}

/// All world-frame transforms of the chain for one configuration.
#[derive(Debug, Clone)]
pub struct KinematicChain {
    frames: Vec<JointFrame>,
    tool: Transform,
}

impl KinematicChain {
    pub fn dof(&self) -> usize {
        self.frames.len()
    }

    pub fn frames(&self) -> &[JointFrame] {
        &self.frames
    }

    pub fn joint(&self, i: usize) -> &JointFrame {
        &self.frames[i]
    }

    pub fn tool(&self) -> &Transform {
        &self.tool
    }
}
