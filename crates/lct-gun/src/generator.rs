//! Random single-particle kinematics.

use std::f64::consts::TAU;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Uniform};

use crate::config::GunConfig;
use crate::error::{GunError, Result};
use crate::particle::{Event, McParticle};

/// Muon gun: uniform pT and θ, uniform φ, alternating charge by index parity.
#[derive(Debug)]
pub struct MuonGun {
    config: GunConfig,
    pt: Uniform<f64>,
    theta: Uniform<f64>,
    rng: StdRng,
}

impl MuonGun {
    /// Build a gun. `seed: None` seeds from OS entropy.
    pub fn new(config: GunConfig, seed: Option<u64>) -> Result<Self> {
        config.validate()?;
        let pt = uniform(config.pt_range, "pt_range")?;
        let theta = uniform(config.theta_range, "theta_range")?;
        let rng = match seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_os_rng(),
        };
        Ok(Self { config, pt, theta, rng })
    }

    pub fn config(&self) -> &GunConfig {
        &self.config
    }

    /// Generate one event with `particles_per_event` particles.
    pub fn generate_event(&mut self, event_number: i32) -> Event {
        let particles =
            (0..self.config.particles_per_event).map(|i| self.generate_particle(i)).collect();
        Event { run_number: self.config.run_number, event_number, particles }
    }

    fn generate_particle(&mut self, index: usize) -> McParticle {
        let c = &self.config;
        let pt = self.pt.sample(&mut self.rng);
        let theta = self.theta.sample(&mut self.rng);
        let phi = self.rng.random::<f64>() * TAU;

        let p = pt / theta.sin();
        let momentum = [pt * phi.cos(), pt * phi.sin(), p * theta.cos()];

        let (pdg, charge) = if index % 2 == 0 { (c.pdg, c.charge) } else { (-c.pdg, -c.charge) };

        let endpoint = c.sets_endpoint().then(|| {
            [
                c.decay_length * theta.sin() * phi.cos(),
                c.decay_length * theta.sin() * phi.sin(),
                c.decay_length * theta.cos(),
            ]
        });

        log::debug!("{index} {pdg} {charge} {pt} {phi} {theta}");

        McParticle {
            pdg,
            generator_status: c.generator_status,
            mass: c.mass,
            charge,
            momentum,
            vertex: [0.0; 3],
            endpoint,
            time: 0.0,
        }
    }
}

fn uniform(range: [f64; 2], name: &str) -> Result<Uniform<f64>> {
    Uniform::new(range[0], range[1])
        .map_err(|e| GunError::Validation(format!("invalid {name} [{}, {}]: {e}", range[0], range[1])))
}
