use crate::NoiseConfig;
use nalgebra::DVector;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};

/// Additive Gaussian noise on measured joint positions and velocities.
///
/// Owns its generator so that a seeded instance replays the same noise
/// sequence; collaborators that need clean feedback simply configure zero
/// deviations.
#[derive(Debug, Clone)]
pub struct MeasurementNoise {
    q_noise: Option<Normal<f64>>,
    v_noise: Option<Normal<f64>>,
    rng: StdRng,
}

impl MeasurementNoise {
    pub fn new(config: &NoiseConfig, seed: u64) -> Self {
        let q_noise = (config.q_std_dev > 0.0)
            .then(|| Normal::new(0.0, config.q_std_dev).ok())
            .flatten();
        let v_noise = (config.v_std_dev > 0.0)
            .then(|| Normal::new(0.0, config.v_std_dev).ok())
            .flatten();
        Self {
            q_noise,
            v_noise,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Corrupts a measured joint state in place.
    pub fn corrupt(&mut self, q: &mut DVector<f64>, v: &mut DVector<f64>) {
        if let Some(noise) = self.q_noise {
            for value in q.iter_mut() {
                *value += noise.sample(&mut self.rng);
            }
        }
        if let Some(noise) = self.v_noise {
            for value in v.iter_mut() {
                *value += noise.sample(&mut self.rng);
            }
        }
    }
}
