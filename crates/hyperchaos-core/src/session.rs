//! Cipher session construction and use
//!
//! # Invariants
//!
//! - A session holds exactly one [`RoundKey`] per configured system, in
//!   system order.
//! - Construction fails as a whole; no partially built session exists.
//! - Nothing is mutated after construction. Encrypt and decrypt take `&self`
//!   and allocate their own output.

use hyperchaos_crypto::{Bitstream, BitstreamStats, RoundKey};
use hyperchaos_dynamics::{LyapunovSpectrum, SystemConfig, Trajectory, integrate, lyapunov_spectrum};
use rayon::prelude::*;

use crate::{
    config::{InitialConditions, SeedMode, SessionConfig},
    error::SessionError,
    info::SystemInfo,
    seed::SeedState,
    shape::BufferShape,
};

/// Number of leading bitstream bits a session keeps for diagnostics.
pub const BITSTREAM_PREVIEW_BITS: usize = 100;

/// Immutable set of round keys derived from hyperchaotic trajectories.
#[derive(Debug, Clone)]
pub struct CipherSession {
    systems: Vec<SystemConfig>,
    round_keys: Vec<RoundKey>,
    stats: Vec<BitstreamStats>,
    previews: Vec<Vec<bool>>,
}

struct Derived {
    round_key: RoundKey,
    stats: BitstreamStats,
    preview: Vec<bool>,
}

impl CipherSession {
    /// Builds a session from the reference configuration.
    ///
    /// `initial_conditions` overrides individual systems' starting points.
    pub fn construct(
        seed: &[u8],
        initial_conditions: &InitialConditions,
    ) -> Result<Self, SessionError> {
        let config = SessionConfig::default().with_initial_conditions(initial_conditions)?;
        Self::with_config(seed, &config)
    }

    /// Builds a session from an explicit configuration.
    ///
    /// Systems are integrated and reduced to round keys in parallel. The call
    /// blocks until every system finishes and fails if any of them fails.
    pub fn with_config(seed: &[u8], config: &SessionConfig) -> Result<Self, SessionError> {
        config.validate()?;

        let mut seed_state = SeedState::new(seed);
        let systems: Vec<SystemConfig> = match config.seed_mode {
            SeedMode::Fixed => {
                tracing::warn!(
                    seed_digest = %hex::encode(&seed_state.digest()[..4]),
                    "seed does not affect initial conditions in fixed mode; \
                     sessions from different seeds are identical"
                );
                config.systems.clone()
            },
            SeedMode::Perturb { magnitude, warmup } => {
                // Draws are taken sequentially in system order before any
                // parallel work.
                let perturbed: Vec<SystemConfig> = config
                    .systems
                    .iter()
                    .map(|system| {
                        let offset = seed_state.perturbation(magnitude);
                        let mut ic = *system.initial_condition();
                        for (v, d) in ic.iter_mut().zip(offset) {
                            *v += d;
                        }
                        system.clone().with_initial_condition(ic)
                    })
                    .collect();
                perturbed
                    .par_iter()
                    .enumerate()
                    .map(|(index, system)| settle(index, system, warmup))
                    .collect::<Result<Vec<_>, _>>()?
            },
        };

        let derived = systems
            .par_iter()
            .enumerate()
            .map(|(index, system)| derive_round_key(index, system))
            .collect::<Result<Vec<_>, _>>()?;

        let mut round_keys = Vec::with_capacity(derived.len());
        let mut stats = Vec::with_capacity(derived.len());
        let mut previews = Vec::with_capacity(derived.len());
        for d in derived {
            round_keys.push(d.round_key);
            stats.push(d.stats);
            previews.push(d.preview);
        }

        tracing::info!(
            systems = systems.len(),
            seed_mode = ?config.seed_mode,
            "cipher session constructed"
        );

        Ok(Self { systems, round_keys, stats, previews })
    }

    /// Encrypts `buffer` with `rounds` rounds. Output has the input's length.
    pub fn encrypt(&self, buffer: &[u8], rounds: u32) -> Vec<u8> {
        let Ok(out) = hyperchaos_crypto::encrypt(&self.round_keys, buffer, rounds) else {
            unreachable!("a constructed session has at least one round key");
        };
        out
    }

    /// Inverts [`encrypt`](Self::encrypt) for the same round count.
    pub fn decrypt(&self, buffer: &[u8], rounds: u32) -> Vec<u8> {
        let Ok(out) = hyperchaos_crypto::decrypt(&self.round_keys, buffer, rounds) else {
            unreachable!("a constructed session has at least one round key");
        };
        out
    }

    /// Decrypts after checking `buffer` fills `shape` exactly.
    pub fn decrypt_shaped(
        &self,
        buffer: &[u8],
        shape: &BufferShape,
        rounds: u32,
    ) -> Result<Vec<u8>, SessionError> {
        shape.check(buffer.len())?;
        Ok(self.decrypt(buffer, rounds))
    }

    /// Name, coefficients, initial condition and bitstream preview of
    /// every system.
    pub fn system_info(&self) -> Vec<SystemInfo> {
        self.systems
            .iter()
            .zip(&self.previews)
            .enumerate()
            .map(|(index, (system, preview))| {
                SystemInfo::describe(index, system).with_bitstream_preview(preview)
            })
            .collect()
    }

    /// Lyapunov spectrum of one system. Diagnostic only.
    pub fn lyapunov_spectrum(
        &self,
        system: usize,
        iterations: usize,
        dt: f64,
    ) -> Result<LyapunovSpectrum, SessionError> {
        let config = self.system(system)?;
        lyapunov_spectrum(config, iterations, dt)
            .map_err(|err| SessionError::from_dynamics(system, err))
    }

    /// Lyapunov spectra of all systems, computed concurrently.
    pub fn lyapunov_spectra(
        &self,
        iterations: usize,
        dt: f64,
    ) -> Result<Vec<LyapunovSpectrum>, SessionError> {
        (0..self.systems.len())
            .into_par_iter()
            .map(|system| self.lyapunov_spectrum(system, iterations, dt))
            .collect()
    }

    /// Re-integrates one system and returns its retained trajectory.
    pub fn raw_trajectory(&self, system: usize) -> Result<Trajectory, SessionError> {
        let config = self.system(system)?;
        integrate(config).map_err(|err| SessionError::from_dynamics(system, err))
    }

    /// Round material in system order.
    pub fn round_keys(&self) -> &[RoundKey] {
        &self.round_keys
    }

    /// Bitstream balance of every system, in system order.
    pub fn bitstream_stats(&self) -> &[BitstreamStats] {
        &self.stats
    }

    /// First [`BITSTREAM_PREVIEW_BITS`] bits of one system's bitstream.
    pub fn bitstream_preview(&self, system: usize) -> Result<&[bool], SessionError> {
        self.system(system)?;
        Ok(&self.previews[system])
    }

    /// Effective configurations, seed perturbation included.
    pub fn systems(&self) -> &[SystemConfig] {
        &self.systems
    }

    /// Number of systems (the round-key cycle length).
    pub fn system_count(&self) -> usize {
        self.systems.len()
    }

    fn system(&self, index: usize) -> Result<&SystemConfig, SessionError> {
        self.systems.get(index).ok_or_else(|| {
            SessionError::configuration(format!(
                "unknown system index {index}, session has {} systems",
                self.systems.len()
            ))
        })
    }
}

/// Advances a perturbed system by `warmup` and restarts it from there.
fn settle(index: usize, system: &SystemConfig, warmup: f64) -> Result<SystemConfig, SessionError> {
    if warmup == 0.0 {
        return Ok(system.clone());
    }

    // Same sampling density as the keyed run, keeping only the final sample.
    let samples = ((warmup / system.sample_interval()).ceil() as usize).saturating_add(1);
    let run = system.clone().with_sampling(warmup, samples, samples - 1);
    let trajectory = integrate(&run).map_err(|err| SessionError::from_dynamics(index, err))?;
    let Some(state) = trajectory.points().last() else {
        unreachable!("warmup retains exactly one sample");
    };

    tracing::debug!(system = index, warmup, state = ?state, "perturbed system settled");
    Ok(system.clone().with_initial_condition(*state))
}

fn derive_round_key(index: usize, config: &SystemConfig) -> Result<Derived, SessionError> {
    let trajectory = integrate(config).map_err(|err| SessionError::from_dynamics(index, err))?;
    let bitstream = Bitstream::extract(&trajectory);
    let stats = bitstream.stats();
    let round_key = RoundKey::derive(&bitstream)?;
    let preview = bitstream.bits().iter().take(BITSTREAM_PREVIEW_BITS).copied().collect();

    tracing::debug!(
        system = index,
        name = config.system().name(),
        bits = stats.len,
        ones_ratio = stats.ones_ratio(),
        fingerprint = %hex::encode(round_key.key().fingerprint()),
        "round key derived"
    );

    Ok(Derived { round_key, stats, preview })
}

#[cfg(test)]
mod tests {
    use hyperchaos_dynamics::HyperchaoticSystem;

    use super::*;

    fn small_config() -> SessionConfig {
        SessionConfig {
            systems: SystemConfig::reference_set()
                .into_iter()
                .map(|s| s.with_sampling(5.0, 2_000, 100))
                .collect(),
            seed_mode: SeedMode::Fixed,
        }
    }

    #[test]
    fn one_round_key_per_system() {
        let session = CipherSession::with_config(b"seed", &small_config()).unwrap();
        assert_eq!(session.system_count(), 3);
        assert_eq!(session.round_keys().len(), 3);
        assert_eq!(session.bitstream_stats().len(), 3);
        assert!(session.bitstream_stats().iter().all(|s| s.len == 1_900));
    }

    #[test]
    fn round_trip_through_session() {
        let session = CipherSession::with_config(b"seed", &small_config()).unwrap();
        let plaintext: Vec<u8> = (0..=255).collect();
        for rounds in [0, 1, 3, 4] {
            let ciphertext = session.encrypt(&plaintext, rounds);
            assert_eq!(session.decrypt(&ciphertext, rounds), plaintext);
        }
    }

    #[test]
    fn unknown_system_index_is_configuration_error() {
        let session = CipherSession::with_config(b"seed", &small_config()).unwrap();
        assert!(session.raw_trajectory(3).unwrap_err().is_configuration());
        assert!(session.lyapunov_spectrum(7, 10, 0.01).unwrap_err().is_configuration());
    }

    #[test]
    fn raw_trajectory_matches_retained_length() {
        let session = CipherSession::with_config(b"seed", &small_config()).unwrap();
        let trajectory = session.raw_trajectory(2).unwrap();
        assert_eq!(trajectory.len(), 1_900);
    }

    #[test]
    fn perturbation_moves_initial_conditions() {
        let mode = SeedMode::Perturb { magnitude: 0.1, warmup: 0.0 };
        let config = small_config().with_seed_mode(mode);
        let session = CipherSession::with_config(b"seed", &config).unwrap();
        for (effective, original) in session.systems().iter().zip(&config.systems) {
            let moved = effective
                .initial_condition()
                .iter()
                .zip(original.initial_condition())
                .map(|(a, b)| (a - b).abs())
                .fold(0.0, f64::max);
            assert!(moved > 0.0 && moved <= 0.1, "offset {moved}");
        }
    }

    #[test]
    fn warmup_restarts_from_integrated_state() {
        let mode = SeedMode::Perturb { magnitude: 0.1, warmup: 0.0 };
        let unsettled =
            CipherSession::with_config(b"seed", &small_config().with_seed_mode(mode)).unwrap();
        let mode = SeedMode::Perturb { magnitude: 0.1, warmup: 2.0 };
        let settled =
            CipherSession::with_config(b"seed", &small_config().with_seed_mode(mode)).unwrap();

        for (index, (s, u)) in settled.systems().iter().zip(unsettled.systems()).enumerate() {
            // 2.0 time units at the small config's 0.0025 spacing is 800 intervals.
            let run = u.clone().with_sampling(2.0, 801, 800);
            let expected = integrate(&run).unwrap().points()[0];
            assert_eq!(s.initial_condition(), &expected, "system {index}");
        }
    }

    #[test]
    fn warmup_is_deterministic() {
        let config = small_config()
            .with_seed_mode(SeedMode::Perturb { magnitude: 0.1, warmup: 1.0 });
        let a = CipherSession::with_config(b"seed", &config).unwrap();
        let b = CipherSession::with_config(b"seed", &config).unwrap();
        assert_eq!(a.systems(), b.systems());
        assert_eq!(a.round_keys(), b.round_keys());
    }

    #[test]
    fn preview_is_bitstream_prefix() {
        let session = CipherSession::with_config(b"seed", &small_config()).unwrap();
        for system in 0..session.system_count() {
            let trajectory = session.raw_trajectory(system).unwrap();
            let bits = Bitstream::extract(&trajectory);
            let preview = session.bitstream_preview(system).unwrap();
            assert_eq!(preview.len(), BITSTREAM_PREVIEW_BITS);
            assert_eq!(preview, &bits.bits()[..BITSTREAM_PREVIEW_BITS]);
        }
        assert!(session.bitstream_preview(3).unwrap_err().is_configuration());
    }

    #[test]
    fn single_system_session_cycles_one_key() {
        let config = SessionConfig {
            systems: vec![
                SystemConfig::new(HyperchaoticSystem::LORENZ, [1.0; 4]).with_sampling(2.0, 500, 0),
            ],
            seed_mode: SeedMode::Fixed,
        };
        let session = CipherSession::with_config(b"", &config).unwrap();
        let data = b"single system".to_vec();
        assert_eq!(session.decrypt(&session.encrypt(&data, 5), 5), data);
    }
}
