//! Frozen pseudo-random generator for assignment draws.
//!
//! Assignments must be reproducible for every identifier ever issued, so the
//! generator, the seed expansion and the draw procedures are pinned here
//! rather than delegated to library defaults that may change between
//! releases.
//!
//! ## Generator
//!
//! PCG64 (128-bit LCG with XSL-RR output, [`rand_pcg::Pcg64`]). The 128-bit
//! state and stream are expanded from the integer seed with the SeedSequence
//! hash-mix procedure: a pool of four 32-bit words is mixed from the seed's
//! 32-bit limbs, then eight output words are read as four little-endian
//! `u64` values `w0..w3`, giving `state = w0 << 64 | w1` and
//! `stream = w2 << 64 | w3`.
//!
//! ## Draws
//!
//! | Draw | Procedure |
//! |------|-----------|
//! | `next_u32` | low half of a 64-bit output, high half buffered for the next call |
//! | bounded `[0, r]` | Lemire multiply-shift with rejection (32-bit path when `r < 2^32`) |
//! | `k` of `n` without replacement | Floyd's algorithm over a linear-probing set, then Fisher-Yates shuffle of the sample |
//! | large populations | tail Fisher-Yates shuffle when `n > 10000` and `k > n / 50` |

use rand::RngCore;
use rand_pcg::Pcg64;

use crate::seed::Seed;

const INIT_A: u32 = 0x43b0_d7e5;
const MULT_A: u32 = 0x931e_8875;
const INIT_B: u32 = 0x8b51_f9dd;
const MULT_B: u32 = 0x58f3_8ded;
const MIX_MULT_L: u32 = 0xca01_f9dd;
const MIX_MULT_R: u32 = 0x4973_f715;
const XSHIFT: u32 = 16;
const POOL_SIZE: usize = 4;

/// Populations above this size may use the tail shuffle instead of Floyd.
const FLOYD_POPULATION_LIMIT: u64 = 10_000;
/// Tail shuffle is used once the sample exceeds `population / TAIL_SHUFFLE_CUTOFF`.
const TAIL_SHUFFLE_CUTOFF: u64 = 50;

/// Seeded generator used for every assignment draw.
pub struct StudyRng {
    inner: Pcg64,
    spare: Option<u32>,
}

impl StudyRng {
    /// Create a generator seeded from a participant seed.
    pub fn new(seed: Seed) -> Self {
        Self::from_u64(seed.value())
    }

    /// Create a generator from a raw integer seed.
    pub fn from_u64(seed: u64) -> Self {
        let (state, stream) = expand_seed(seed);
        Self {
            inner: Pcg64::new(state, stream),
            spare: None,
        }
    }

    /// Draw a value uniformly from `[0, max]` (inclusive).
    pub fn bounded(&mut self, max: u64) -> u64 {
        if max == 0 {
            return 0;
        }
        if max <= u64::from(u32::MAX) {
            if max == u64::from(u32::MAX) {
                return u64::from(self.next_u32());
            }
            return u64::from(self.bounded_u32(max as u32));
        }
        if max == u64::MAX {
            return self.next_u64();
        }
        self.bounded_u64(max)
    }

    fn bounded_u32(&mut self, max: u32) -> u32 {
        let range = max + 1;
        let mut product = u64::from(self.next_u32()) * u64::from(range);
        let mut leftover = product as u32;
        if leftover < range {
            let threshold = (u32::MAX - max) % range;
            while leftover < threshold {
                product = u64::from(self.next_u32()) * u64::from(range);
                leftover = product as u32;
            }
        }
        (product >> 32) as u32
    }

    fn bounded_u64(&mut self, max: u64) -> u64 {
        let range = max + 1;
        let mut product = u128::from(self.next_u64()) * u128::from(range);
        let mut leftover = product as u64;
        if leftover < range {
            let threshold = (u64::MAX - max) % range;
            while leftover < threshold {
                product = u128::from(self.next_u64()) * u128::from(range);
                leftover = product as u64;
            }
        }
        (product >> 64) as u64
    }

    /// Draw `amount` distinct indices from `[0, population)` in random order.
    ///
    /// `amount` is clamped to `population`.
    pub fn sample_indices(&mut self, population: usize, amount: usize) -> Vec<usize> {
        let amount = amount.min(population);
        let pop = population as u64;
        let size = amount as u64;

        if pop > FLOYD_POPULATION_LIMIT && size > pop / TAIL_SHUFFLE_CUTOFF {
            let mut all: Vec<usize> = (0..population).collect();
            let first = population.saturating_sub(amount).max(1);
            self.shuffle_from(&mut all, first);
            return all.split_off(population - amount);
        }

        let mask = low_bit_mask((1.2 * size as f64) as u64);
        let mut slots: Vec<Option<u64>> = vec![None; (mask + 1) as usize];
        let mut picked = Vec::with_capacity(amount);

        for j in (pop - size)..pop {
            let val = self.bounded(j);
            let mut loc = val & mask;
            while let Some(existing) = slots[loc as usize] {
                if existing == val {
                    break;
                }
                loc = (loc + 1) & mask;
            }
            if slots[loc as usize].is_none() {
                slots[loc as usize] = Some(val);
                picked.push(val as usize);
            } else {
                // `val` was already drawn, so `j` (never drawable before) goes in.
                let mut loc = j & mask;
                while slots[loc as usize].is_some() {
                    loc = (loc + 1) & mask;
                }
                slots[loc as usize] = Some(j);
                picked.push(j as usize);
            }
        }

        self.shuffle_from(&mut picked, 1);
        picked
    }

    /// Fisher-Yates over positions `first..len`, walking down from the end.
    fn shuffle_from(&mut self, data: &mut [usize], first: usize) {
        for i in (first..data.len()).rev() {
            let j = self.bounded(i as u64) as usize;
            data.swap(i, j);
        }
    }
}

impl RngCore for StudyRng {
    fn next_u32(&mut self) -> u32 {
        if let Some(high) = self.spare.take() {
            return high;
        }
        let next = self.inner.next_u64();
        self.spare = Some((next >> 32) as u32);
        next as u32
    }

    fn next_u64(&mut self) -> u64 {
        self.inner.next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        for chunk in dest.chunks_mut(8) {
            let bytes = self.next_u64().to_le_bytes();
            chunk.copy_from_slice(&bytes[..chunk.len()]);
        }
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}

/// Smallest all-ones bit mask covering `max`.
fn low_bit_mask(max: u64) -> u64 {
    let mut mask = max;
    for shift in [1, 2, 4, 8, 16, 32] {
        mask |= mask >> shift;
    }
    mask
}

fn seed_limbs(seed: u64) -> Vec<u32> {
    if seed == 0 {
        return vec![0];
    }
    let mut limbs = Vec::with_capacity(2);
    let mut rest = seed;
    while rest > 0 {
        limbs.push(rest as u32);
        rest >>= 32;
    }
    limbs
}

/// Expand an integer seed into a PCG64 `(state, stream)` pair.
fn expand_seed(seed: u64) -> (u128, u128) {
    let entropy = seed_limbs(seed);
    let mut hash_const = INIT_A;
    let mut hashmix = |value: u32| -> u32 {
        let mut value = value ^ hash_const;
        hash_const = hash_const.wrapping_mul(MULT_A);
        value = value.wrapping_mul(hash_const);
        value ^ (value >> XSHIFT)
    };
    let mix = |x: u32, y: u32| -> u32 {
        let result = MIX_MULT_L
            .wrapping_mul(x)
            .wrapping_sub(MIX_MULT_R.wrapping_mul(y));
        result ^ (result >> XSHIFT)
    };

    let mut pool = [0u32; POOL_SIZE];
    for (i, slot) in pool.iter_mut().enumerate() {
        *slot = hashmix(entropy.get(i).copied().unwrap_or(0));
    }
    for src in 0..POOL_SIZE {
        for dst in 0..POOL_SIZE {
            if src != dst {
                let hashed = hashmix(pool[src]);
                pool[dst] = mix(pool[dst], hashed);
            }
        }
    }
    for &limb in entropy.iter().skip(POOL_SIZE) {
        for dst in 0..POOL_SIZE {
            let hashed = hashmix(limb);
            pool[dst] = mix(pool[dst], hashed);
        }
    }

    let mut hash_const = INIT_B;
    let mut words = [0u32; 2 * POOL_SIZE];
    for (i, word) in words.iter_mut().enumerate() {
        let mut value = pool[i % POOL_SIZE] ^ hash_const;
        hash_const = hash_const.wrapping_mul(MULT_B);
        value = value.wrapping_mul(hash_const);
        *word = value ^ (value >> XSHIFT);
    }

    let wide: Vec<u64> = words
        .chunks(2)
        .map(|pair| u64::from(pair[0]) | (u64::from(pair[1]) << 32))
        .collect();
    let state = (u128::from(wide[0]) << 64) | u128::from(wide[1]);
    let stream = (u128::from(wide[2]) << 64) | u128::from(wide[3]);
    (state, stream)
}
