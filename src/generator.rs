//! Random password generation.
//!
//! Passwords are drawn from a CSPRNG seeded by the operating system RNG.
//! Every selected character class is guaranteed to appear at least once;
//! a policy whose length cannot fit one character per selected class is
//! rejected rather than silently dropping classes.

use rand::rngs::{OsRng, StdRng};
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng, TryRngCore};
use serde::{Deserialize, Serialize};

use crate::errors::{Result, VaultError};

const UPPER: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const LOWER: &[u8] = b"abcdefghijklmnopqrstuvwxyz";
const DIGITS: &[u8] = b"0123456789";
const SYMBOLS: &[u8] = b"!\"#$%&'()*+,-./:;<=>?@[\\]^_`{|}~";

/// Upper bound on generated length.
pub const MAX_LENGTH: usize = 1024;

/// What a generated password must look like.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationPolicy {
    pub length: usize,
    pub include_upper: bool,
    pub include_lower: bool,
    pub include_digits: bool,
    pub include_symbols: bool,
}

impl Default for GenerationPolicy {
    fn default() -> Self {
        Self {
            length: 16,
            include_upper: true,
            include_lower: true,
            include_digits: true,
            include_symbols: true,
        }
    }
}

impl GenerationPolicy {
    fn classes(&self) -> Vec<&'static [u8]> {
        [
            (self.include_upper, UPPER),
            (self.include_lower, LOWER),
            (self.include_digits, DIGITS),
            (self.include_symbols, SYMBOLS),
        ]
        .into_iter()
        .filter_map(|(selected, class)| selected.then_some(class))
        .collect()
    }

    /// Check the policy without generating anything.
    pub fn validate(&self) -> Result<()> {
        let classes = self.classes().len();
        if classes == 0 {
            return Err(VaultError::InvalidPolicy(
                "at least one character class must be selected".into(),
            ));
        }
        if self.length == 0 {
            return Err(VaultError::InvalidPolicy("length must be positive".into()));
        }
        if self.length < classes {
            return Err(VaultError::InvalidPolicy(format!(
                "length {} cannot hold one character from each of the {classes} selected classes",
                self.length
            )));
        }
        if self.length > MAX_LENGTH {
            return Err(VaultError::InvalidPolicy(format!(
                "length cannot exceed {MAX_LENGTH}"
            )));
        }
        Ok(())
    }
}

/// Generate a password satisfying `policy`.
///
/// Sampling uses a ChaCha-based `StdRng` seeded from the operating system
/// RNG; if the OS RNG is unavailable this returns `Io`.
pub fn generate(policy: &GenerationPolicy) -> Result<String> {
    generate_from(policy, &mut OsRng)
}

fn generate_from<R: TryRngCore>(policy: &GenerationPolicy, entropy: &mut R) -> Result<String> {
    policy.validate()?;

    let classes = policy.classes();
    let pool: Vec<u8> = classes.concat();
    let mut rng = StdRng::try_from_rng(entropy).map_err(|e| {
        VaultError::Io(std::io::Error::other(format!("OS RNG unavailable: {e}")))
    })?;

    let mut chars = Vec::with_capacity(policy.length);
    // One from each selected class first, then fill from the union.
    for class in &classes {
        chars.push(class[rng.random_range(0..class.len())]);
    }
    while chars.len() < policy.length {
        chars.push(pool[rng.random_range(0..pool.len())]);
    }
    chars.shuffle(&mut rng);

    Ok(chars.into_iter().map(char::from).collect())
}
