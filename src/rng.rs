//! Seeded PCG-XSH-RR generator and the variates the simulator draws from it.
//!
//! The state advances by a 64-bit LCG step and each call emits 32 bits. All
//! arithmetic wraps modulo 2^64 so sequences are bit-identical across
//! platforms for the same `(seed, stream)` pair.

use rand::{RngCore, SeedableRng};

const MULTIPLIER: u64 = 6_364_136_223_846_793_005;
const DEFAULT_STREAM: u64 = 1;
const TWO_POW_32: f64 = 4_294_967_296.0;

pub const ALGORITHM: &str = "PCG-XSH-RR";

/// Cloning yields an independent generator positioned at the same point in
/// the stream.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Pcg32 {
    state: u64,
    inc: u64,
}

impl Pcg32 {
    pub fn new(seed: u64, stream: u64) -> Self {
        let mut rng = Self {
            state: 0,
            inc: (stream << 1) | 1,
        };
        rng.step();
        rng.state = rng.state.wrapping_add(seed);
        rng.step();
        rng
    }

    /// Generator on the default stream, as used for every replication.
    pub fn seeded(seed: u64) -> Self {
        Self::new(seed, DEFAULT_STREAM)
    }

    fn step(&mut self) {
        self.state = self
            .state
            .wrapping_mul(MULTIPLIER)
            .wrapping_add(self.inc);
    }

    pub fn next_u32(&mut self) -> u32 {
        let old = self.state;
        self.step();
        let xorshifted = (((old >> 18) ^ old) >> 27) as u32;
        let rot = (old >> 59) as u32;
        xorshifted.rotate_right(rot)
    }

    /// Uniform in `[0, 1)` with 32 bits of resolution.
    pub fn uniform01(&mut self) -> f64 {
        f64::from(self.next_u32()) / TWO_POW_32
    }

    fn nonzero_uniform(&mut self) -> f64 {
        let mut u = self.uniform01();
        while u == 0.0 {
            u = self.uniform01();
        }
        u
    }

    /// Exponential variate with the given rate. `rate` must be positive.
    pub fn exponential(&mut self, rate: f64) -> f64 {
        -self.nonzero_uniform().ln() / rate
    }

    /// Box-Muller, cosine branch only.
    pub fn normal(&mut self, mean: f64, stddev: f64) -> f64 {
        let mut u1 = self.uniform01();
        let u2 = self.uniform01();
        while u1 == 0.0 {
            u1 = self.uniform01();
        }
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + stddev * z
    }

    /// `mu` and `sigma` parameterise the underlying normal.
    pub fn lognormal(&mut self, mu: f64, sigma: f64) -> f64 {
        let z = self.normal(0.0, 1.0);
        (mu + sigma * z).exp()
    }

    /// Knuth's multiplicative method below 30, normal approximation above.
    pub fn poisson(&mut self, lambda: f64) -> u64 {
        if lambda < 30.0 {
            let limit = (-lambda).exp();
            let mut k = 0u64;
            let mut p = 1.0;
            loop {
                k += 1;
                p *= self.uniform01();
                if p <= limit {
                    break;
                }
            }
            k - 1
        } else {
            self.normal(lambda, lambda.sqrt()).round().max(0.0) as u64
        }
    }
}

impl RngCore for Pcg32 {
    fn next_u32(&mut self) -> u32 {
        Pcg32::next_u32(self)
    }

    fn next_u64(&mut self) -> u64 {
        let low = u64::from(Pcg32::next_u32(self));
        let high = u64::from(Pcg32::next_u32(self));
        (high << 32) | low
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        for chunk in dest.chunks_mut(4) {
            let bytes = Pcg32::next_u32(self).to_le_bytes();
            chunk.copy_from_slice(&bytes[..chunk.len()]);
        }
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> std::result::Result<(), rand::Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}

impl SeedableRng for Pcg32 {
    type Seed = [u8; 8];

    fn from_seed(seed: Self::Seed) -> Self {
        Self::seeded(u64::from_le_bytes(seed))
    }

    fn seed_from_u64(state: u64) -> Self {
        Self::seeded(state)
    }
}
