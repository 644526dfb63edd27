//! Seedable 32-bit generator shared by every client that replays a roll log.
//!
//! The mix constants and operation order are fixed: two clients given the
//! same seed must draw the same sequence bit for bit.

use std::sync::atomic::{AtomicU32, Ordering};

use rand::rngs::SmallRng;
use rand::{Error, RngCore, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::utils::now_millis;

const FNV_OFFSET_BASIS: u32 = 0x811c_9dc5;
const FNV_PRIME: u32 = 0x0100_0193;
const EMPTY_SEED_HASH: u32 = 0xa5a5_a5a5;
const TWO_POW_32: f64 = 4_294_967_296.0;

static FALLBACK_TICK: AtomicU32 = AtomicU32::new(0);

/// Caller-supplied seed. Numbers are used directly, anything else is hashed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum Seed {
    Number(f64),
    Text(String),
}

impl Seed {
    pub fn to_u32(&self) -> u32 {
        match self {
            Seed::Number(value) => to_uint32(*value),
            Seed::Text(text) => hash_seed(text),
        }
    }

    /// `""`, `0` and `NaN`: seeds a form field produces when left empty.
    pub fn is_blank(&self) -> bool {
        match self {
            Seed::Number(value) => *value == 0.0 || value.is_nan(),
            Seed::Text(text) => text.is_empty(),
        }
    }
}

impl From<u32> for Seed {
    fn from(value: u32) -> Self {
        Seed::Number(value as f64)
    }
}

impl From<f64> for Seed {
    fn from(value: f64) -> Self {
        Seed::Number(value)
    }
}

impl From<&str> for Seed {
    fn from(value: &str) -> Self {
        Seed::Text(value.to_owned())
    }
}

impl From<String> for Seed {
    fn from(value: String) -> Self {
        Seed::Text(value)
    }
}

/// Truncates toward zero and wraps modulo 2^32; non-finite values map to 0.
pub fn to_uint32(value: f64) -> u32 {
    if !value.is_finite() {
        return 0;
    }
    value.trunc().rem_euclid(TWO_POW_32) as u32
}

/// FNV-1a over UTF-16 code units, so seeds typed in the browser hash the same here.
pub fn hash_seed(text: &str) -> u32 {
    if text.is_empty() {
        return EMPTY_SEED_HASH;
    }
    text.encode_utf16().fold(FNV_OFFSET_BASIS, |hash, unit| {
        (hash ^ u32::from(unit)).wrapping_mul(FNV_PRIME)
    })
}

/// Fresh 32-bit seed from the platform CSPRNG, or from the clock when that is unavailable.
pub fn entropy_seed() -> u32 {
    let mut buf = [0u8; 4];
    match getrandom::getrandom(&mut buf) {
        Ok(()) => u32::from_le_bytes(buf),
        Err(_) => fallback_seed(),
    }
}

fn fallback_seed() -> u32 {
    let tick = u64::from(FALLBACK_TICK.fetch_add(1, Ordering::Relaxed));
    SmallRng::seed_from_u64(now_millis() ^ (tick << 32)).next_u32()
}

/// Mulberry32: a 32-bit counter advanced by a fixed odd step, then mixed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mulberry32 {
    state: u32,
}

impl Mulberry32 {
    const INCREMENT: u32 = 0x6d2b_79f5;

    pub fn new(seed: u32) -> Self {
        Self { state: seed }
    }

    /// Seeded generator when `seed` is present, entropy-seeded otherwise.
    pub fn from_seed_value(seed: Option<&Seed>) -> Self {
        match seed {
            Some(seed) => Self::new(seed.to_u32()),
            None => Self::new(entropy_seed()),
        }
    }

    pub fn state(&self) -> u32 {
        self.state
    }

    #[inline]
    fn mix(t: u32) -> u32 {
        let mut r = (t ^ (t >> 15)).wrapping_mul(1 | t);
        r ^= r.wrapping_add((r ^ (r >> 7)).wrapping_mul(61 | r));
        r ^ (r >> 14)
    }

    /// Uniform value in `[0, 1)`.
    pub fn next_f64(&mut self) -> f64 {
        f64::from(self.next_u32()) / TWO_POW_32
    }
}

impl RngCore for Mulberry32 {
    fn next_u32(&mut self) -> u32 {
        self.state = self.state.wrapping_add(Self::INCREMENT);
        Self::mix(self.state)
    }

    fn next_u64(&mut self) -> u64 {
        let high = u64::from(self.next_u32());
        let low = u64::from(self.next_u32());
        (high << 32) | low
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        for chunk in dest.chunks_mut(4) {
            let bytes = self.next_u32().to_le_bytes();
            chunk.copy_from_slice(&bytes[..chunk.len()]);
        }
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}

impl SeedableRng for Mulberry32 {
    type Seed = [u8; 4];

    fn from_seed(seed: Self::Seed) -> Self {
        Self::new(u32::from_le_bytes(seed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn first_three(seed: Seed) -> [u32; 3] {
        let mut rng = Mulberry32::from_seed_value(Some(&seed));
        [rng.next_u32(), rng.next_u32(), rng.next_u32()]
    }

    #[test]
    fn empty_form_values_are_blank_seeds() {
        assert!(Seed::from("").is_blank());
        assert!(Seed::from(0u32).is_blank());
        assert!(Seed::Number(f64::NAN).is_blank());
        assert!(!Seed::from(" ").is_blank());
        assert!(!Seed::from(42u32).is_blank());
        // blank text still hashes when rolled directly
        assert_eq!(Seed::from("").to_u32(), 0xa5a5a5a5);
    }

    #[test]
    fn numeric_seeds_reproduce_reference_stream() {
        assert_eq!(first_three(Seed::from(0u32)), [1144304738, 1416247, 958946056]);
        assert_eq!(
            first_three(Seed::from(42u32)),
            [2581720956, 1925393290, 3661312704]
        );
    }

    #[test]
    fn numeric_seeds_truncate_to_u32() {
        assert_eq!(to_uint32(-1.0), u32::MAX);
        assert_eq!(to_uint32(3.7), 3);
        assert_eq!(to_uint32(4_294_967_298.0), 2);
        assert_eq!(to_uint32(f64::NAN), 0);
        assert_eq!(
            first_three(Seed::Number(-1.0)),
            [3850105811, 813802916, 3073704848]
        );
        assert_eq!(
            first_three(Seed::Number(3.7)),
            [3093350482, 166052715, 1959330548]
        );
    }

    #[test]
    fn text_seeds_hash_with_fnv1a() {
        assert_eq!(hash_seed("abc"), 440920331);
        assert_eq!(hash_seed("combat-phase-1"), 2201145929);
        assert_eq!(hash_seed(""), EMPTY_SEED_HASH);
        assert_eq!(first_three(Seed::from("abc")), [2218960489, 2833055473, 8073077]);
        assert_eq!(
            first_three(Seed::from("")),
            [3247414249, 1518598753, 403483281]
        );
    }

    #[test]
    fn text_seed_hash_is_order_sensitive() {
        assert_ne!(hash_seed("ab"), hash_seed("ba"));
        assert_ne!(Seed::from("42").to_u32(), Seed::from(42u32).to_u32());
    }

    #[test]
    fn unit_draws_stay_in_half_open_range() {
        let mut rng = Mulberry32::new(7);
        for _ in 0..10_000 {
            let value = rng.next_f64();
            assert!((0.0..1.0).contains(&value));
        }
    }

    #[test]
    fn next_f64_divides_raw_output_by_two_pow_32() {
        let mut rng = Mulberry32::new(0);
        let value = rng.next_f64();
        assert!((value - 0.26642920868471265).abs() < 1e-15);
    }

    #[test]
    fn independent_generators_do_not_interfere() {
        let mut a = Mulberry32::new(99);
        let mut b = Mulberry32::new(99);
        let first_a = a.next_u32();
        let _ = Mulberry32::new(99).next_u32();
        assert_eq!(first_a, b.next_u32());
        assert_eq!(a.state(), b.state());
    }

    #[test]
    fn seedable_rng_uses_little_endian_seed() {
        let rng = Mulberry32::from_seed(42u32.to_le_bytes());
        assert_eq!(rng, Mulberry32::new(42));
    }

    #[test]
    fn fill_bytes_handles_partial_chunks() {
        let mut rng = Mulberry32::new(0);
        let mut buf = [0u8; 6];
        rng.fill_bytes(&mut buf);
        assert_eq!(&buf[..4], &1144304738u32.to_le_bytes());
        assert_eq!(&buf[4..], &1416247u32.to_le_bytes()[..2]);
    }

    #[test]
    fn unseeded_generators_diverge() {
        let mut a = Mulberry32::from_seed_value(None);
        let mut b = Mulberry32::from_seed_value(None);
        let draws_a: Vec<u32> = (0..4).map(|_| a.next_u32()).collect();
        let draws_b: Vec<u32> = (0..4).map(|_| b.next_u32()).collect();
        assert_ne!(draws_a, draws_b);
    }
}
