//! Event generation loop of `muon-gun`.

use anyhow::{Context, Result};
use lct_gun::{EventWriter, GunConfig, MuonGun};

/// Events between progress messages.
pub const PROGRESS_EVERY: u64 = 100;

/// Generate `config.events` events into `config.output`. Returns the number
/// of events written.
pub fn run(config: &GunConfig, seed: Option<u64>) -> Result<u64> {
    let mut gun = MuonGun::new(config.clone(), seed).context("invalid generator configuration")?;
    let mut writer = EventWriter::create(&config.output, config)
        .with_context(|| format!("failed to create {}", config.output.display()))?;

    for n in 0..config.events {
        if n % PROGRESS_EVERY == 0 {
            tracing::info!(" => Processing event # {n}");
        }
        let event_number = i32::try_from(n).context("event number exceeds i32")?;
        writer.write_event(gun.generate_event(event_number))?;
    }

    let written = writer.close()?;
    tracing::info!(events = written, path = %config.output.display(), "wrote events");
    Ok(written)
}
