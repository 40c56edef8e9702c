use crate::{
    encode_index, free_preferred, scan_from, CodeGenerator, GeneratorError, Result, CODE_SPACE,
};
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use snaplink_core::Shortcode;
use std::collections::HashSet;
use typed_builder::TypedBuilder;

const DEFAULT_MAX_ATTEMPTS: u32 = 64;

/// Configures a [`RandomGenerator`].
#[derive(Debug, Clone, Copy, TypedBuilder)]
pub struct RandomGeneratorSettings {
    /// Random draws tried before falling back to a linear scan.
    #[builder(default = DEFAULT_MAX_ATTEMPTS)]
    pub max_attempts: u32,
    /// Fixed seed for reproducible sequences; the OS seeds the generator
    /// when unset.
    #[builder(default, setter(strip_option))]
    pub seed: Option<u64>,
}

impl Default for RandomGeneratorSettings {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// Draws codes uniformly at random from the 36 symbol alphabet.
///
/// Termination: at most `max_attempts` random draws are made. If all of
/// them collide, the generator scans the code space once from a random
/// starting point and takes the first free code. The scan visits each of
/// the `36^5` codes at most once, so it finds a code whenever `existing`
/// leaves any of them free, and fails with [`GeneratorError::Exhausted`]
/// only when every code is taken.
#[derive(Debug)]
pub struct RandomGenerator {
    max_attempts: u32,
    rng: Mutex<StdRng>,
}

impl RandomGenerator {
    /// Creates an OS-seeded generator with default settings.
    pub fn new() -> Self {
        Self::with_settings(RandomGeneratorSettings::default())
    }

    pub fn with_settings(settings: RandomGeneratorSettings) -> Self {
        let rng = match settings.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self {
            max_attempts: settings.max_attempts,
            rng: Mutex::new(rng),
        }
    }
}

impl Default for RandomGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl CodeGenerator for RandomGenerator {
    fn generate(
        &self,
        existing: &HashSet<Shortcode>,
        preferred: Option<&Shortcode>,
    ) -> Result<Shortcode> {
        if let Some(code) = free_preferred(existing, preferred) {
            return Ok(code);
        }

        let mut rng = self.rng.lock();
        for _ in 0..self.max_attempts {
            let code = encode_index(rng.random_range(0..CODE_SPACE));
            if !existing.contains(&code) {
                return Ok(code);
            }
        }

        let start = rng.random_range(0..CODE_SPACE);
        drop(rng);
        scan_from(start, existing).ok_or(GeneratorError::Exhausted {
            attempts: u64::from(self.max_attempts) + CODE_SPACE,
        })
    }
}
