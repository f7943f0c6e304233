//! Cryptographically secure randomness, passed in as a capability.
//!
//! Key generation never reaches for a process-global generator: callers pick
//! a [`RandomSource`] once (normally [`OsRandom`]) and hand it to
//! [`PrivateKey::generate`](crate::ec::PrivateKey::generate). Any `rand`
//! CSPRNG can be plugged in through [`RngSource`].

use rand::rngs::OsRng;
use rand::{CryptoRng, RngCore};

use crate::PrimitivesError;

/// A source of cryptographically secure random bytes.
pub trait RandomSource {
    /// Fill `dest` entirely with random bytes.
    fn fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), PrimitivesError>;
}

/// Operating system entropy (`getrandom` under the hood).
#[derive(Clone, Copy, Debug, Default)]
pub struct OsRandom;

impl RandomSource for OsRandom {
    fn fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), PrimitivesError> {
        OsRng
            .try_fill_bytes(dest)
            .map_err(|e| PrimitivesError::RandomSource(e.to_string()))
    }
}

/// Adapter turning any `rand` cryptographic RNG into a [`RandomSource`].
#[derive(Clone, Debug)]
pub struct RngSource<R>(pub R);

impl<R: RngCore + CryptoRng> RandomSource for RngSource<R> {
    fn fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), PrimitivesError> {
        self.0
            .try_fill_bytes(dest)
            .map_err(|e| PrimitivesError::RandomSource(e.to_string()))
    }
}
