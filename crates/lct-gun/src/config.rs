//! Muon gun configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{GunError, Result};

/// Decay lengths at or above this value leave the endpoint unset.
pub const ENDPOINT_CUTOFF: f64 = 1.0e9;

/// Event numbers are stored as `i32`, so at most `i32::MAX + 1` events fit.
pub const MAX_EVENTS: u64 = 1 << 31;

/// Generator settings. [`Default`] reproduces the standard dimuon gun.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GunConfig {
    /// Number of events to generate.
    pub events: u64,
    /// Particles per event.
    pub particles_per_event: usize,
    /// Output event file.
    pub output: PathBuf,
    /// Run number stored with every event.
    pub run_number: i32,
    /// MCParticle generator status.
    pub generator_status: i32,
    /// Transverse momentum range `[min, max)` in GeV.
    pub pt_range: [f64; 2],
    /// Polar angle range `[min, max)` in rad.
    pub theta_range: [f64; 2],
    /// PDG id of even-indexed particles; odd-indexed particles get `-pdg`.
    pub pdg: i32,
    /// Mass in GeV.
    pub mass: f64,
    /// Charge of even-indexed particles; odd-indexed particles get `-charge`.
    pub charge: f32,
    /// Decay length in mm.
    pub decay_length: f64,
    /// Endpoints are set only when `decay_length` is below this cutoff.
    pub endpoint_cutoff: f64,
}

impl Default for GunConfig {
    fn default() -> Self {
        Self {
            events: 10_000,
            particles_per_event: 2,
            output: PathBuf::from("muonGun_gen.parquet"),
            run_number: 0,
            generator_status: 1,
            pt_range: [0.0, 100.0],
            theta_range: [0.0, 2.5],
            pdg: 13,
            mass: 0.105658,
            charge: -1.0,
            decay_length: 1.0e32,
            endpoint_cutoff: ENDPOINT_CUTOFF,
        }
    }
}

impl GunConfig {
    /// Whether generated particles carry a decay endpoint.
    pub fn sets_endpoint(&self) -> bool {
        self.decay_length < self.endpoint_cutoff
    }

    /// Check ranges and physical constants.
    pub fn validate(&self) -> Result<()> {
        for (name, [lo, hi]) in [("pt_range", self.pt_range), ("theta_range", self.theta_range)] {
            if !(lo.is_finite() && hi.is_finite()) || lo >= hi {
                return Err(GunError::Validation(format!(
                    "{name} must be a finite interval with min < max, got [{lo}, {hi}]"
                )));
            }
        }
        if self.pt_range[0] < 0.0 {
            return Err(GunError::Validation(format!(
                "pt_range must be non-negative, got min {}",
                self.pt_range[0]
            )));
        }
        if !(self.mass.is_finite() && self.mass >= 0.0) {
            return Err(GunError::Validation(format!("mass must be >= 0, got {}", self.mass)));
        }
        if self.particles_per_event == 0 {
            return Err(GunError::Validation("particles_per_event must be at least 1".into()));
        }
        if self.events > MAX_EVENTS {
            return Err(GunError::Validation(format!(
                "events must be at most {MAX_EVENTS}, got {}",
                self.events
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_standard_gun() {
        let c = GunConfig::default();
        assert_eq!(c.events, 10_000);
        assert_eq!(c.particles_per_event, 2);
        assert_eq!(c.output, PathBuf::from("muonGun_gen.parquet"));
        assert_eq!(c.pdg, 13);
        assert_eq!(c.charge, -1.0);
        assert_eq!(c.generator_status, 1);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn default_decay_length_sets_no_endpoint() {
        let mut c = GunConfig::default();
        assert!(!c.sets_endpoint());
        c.decay_length = 10.0;
        assert!(c.sets_endpoint());
    }

    #[test]
    fn invalid_ranges_rejected() {
        let c = GunConfig { pt_range: [10.0, 1.0], ..Default::default() };
        assert!(matches!(c.validate(), Err(GunError::Validation(_))));
        let c = GunConfig { theta_range: [0.0, f64::NAN], ..Default::default() };
        assert!(c.validate().is_err());
        let c = GunConfig { pt_range: [-1.0, 1.0], ..Default::default() };
        assert!(c.validate().is_err());
        let c = GunConfig { particles_per_event: 0, ..Default::default() };
        assert!(c.validate().is_err());
    }

    #[test]
    fn event_count_must_fit_event_numbers() {
        let c = GunConfig { events: MAX_EVENTS, ..Default::default() };
        assert!(c.validate().is_ok());
        let c = GunConfig { events: MAX_EVENTS + 1, ..Default::default() };
        let err = c.validate().unwrap_err();
        assert!(err.to_string().contains("events must be at most 2147483648"));
    }

    #[test]
    fn json_roundtrip_fills_defaults() {
        let c: GunConfig = serde_json::from_str(r#"{"events": 5}"#).unwrap();
        assert_eq!(c.events, 5);
        assert_eq!(c.mass, GunConfig::default().mass);
    }
}
