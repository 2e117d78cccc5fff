//! Mask seeds.
//!
//! See the [mask module] documentation since this is a private module anyways.
//!
//! [mask module]: crate::mask

use std::fmt;

use rand::{rngs::OsRng, RngCore, SeedableRng};
use rand_chacha::ChaCha20Rng;
use zeroize::Zeroize;

/// The length of a mask seed in bytes.
pub const SEED_LENGTH: usize = 32;

#[derive(Clone, PartialEq, Eq)]
/// A seed for the PRNG of a [`MaskGenerator`].
///
/// When this goes out of scope, its contents will be zeroed out.
///
/// [`MaskGenerator`]: crate::mask::MaskGenerator
pub struct MaskSeed([u8; SEED_LENGTH]);

impl MaskSeed {
    /// Generates a random seed from the operating system's entropy source.
    pub fn generate() -> Self {
        let mut bytes = [0_u8; SEED_LENGTH];
        OsRng.fill_bytes(&mut bytes);
        Self(bytes)
    }

    /// Creates a seed from the given bytes.
    pub fn from_array(bytes: [u8; SEED_LENGTH]) -> Self {
        Self(bytes)
    }

    /// Gets this seed as an array.
    pub fn as_array(&self) -> [u8; SEED_LENGTH] {
        self.0
    }

    /// Creates the PRNG seeded by this seed.
    pub fn prng(&self) -> ChaCha20Rng {
        ChaCha20Rng::from_seed(self.0)
    }
}

impl Drop for MaskSeed {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

impl fmt::Debug for MaskSeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("MaskSeed(..)")
    }
}
