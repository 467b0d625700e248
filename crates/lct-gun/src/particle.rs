//! MCParticle records and events.

/// One generated particle.
#[derive(Debug, Clone, PartialEq)]
pub struct McParticle {
    pub pdg: i32,
    pub generator_status: i32,
    /// Mass in GeV.
    pub mass: f64,
    pub charge: f32,
    /// Momentum `(px, py, pz)` in GeV.
    pub momentum: [f64; 3],
    /// Production vertex in mm.
    pub vertex: [f64; 3],
    /// Decay endpoint in mm, if set.
    pub endpoint: Option<[f64; 3]>,
    /// Production time in ns.
    pub time: f32,
}

impl McParticle {
    /// `sqrt(m² + |p|²)`.
    pub fn energy(&self) -> f64 {
        let [px, py, pz] = self.momentum;
        (self.mass * self.mass + px * px + py * py + pz * pz).sqrt()
    }

    /// Transverse momentum.
    pub fn pt(&self) -> f64 {
        self.momentum[0].hypot(self.momentum[1])
    }

    /// Polar angle of the momentum.
    pub fn theta(&self) -> f64 {
        self.pt().atan2(self.momentum[2])
    }

    /// Azimuth of the momentum in `(-π, π]`.
    pub fn phi(&self) -> f64 {
        self.momentum[1].atan2(self.momentum[0])
    }
}

/// An ordered collection of particles.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Event {
    pub run_number: i32,
    pub event_number: i32,
    pub particles: Vec<McParticle>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn kinematics_from_momentum() {
        let p = McParticle {
            pdg: 13,
            generator_status: 1,
            mass: 0.105658,
            charge: -1.0,
            momentum: [3.0, 4.0, 0.0],
            vertex: [0.0; 3],
            endpoint: None,
            time: 0.0,
        };
        assert_relative_eq!(p.pt(), 5.0);
        assert_relative_eq!(p.theta(), std::f64::consts::FRAC_PI_2);
        assert_relative_eq!(p.energy(), (25.0_f64 + 0.105658 * 0.105658).sqrt());
    }
}
