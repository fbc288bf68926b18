//! 64-bit Mersenne Twister (MT19937-64)
//!
//! The generator every miner uses to expand a per-nonce seed into a challenge.
//! Output must match the reference MT19937-64 bit for bit:
//!
//! ```text
//! seed:    mt[0] = seed
//!          mt[i] = 6364136223846793005 * (mt[i-1] ^ (mt[i-1] >> 62)) + i
//! twist:   regenerate all 312 words once the cursor reaches the end
//! temper:  x ^= (x >> 29) & 0x5555555555555555
//!          x ^= (x << 17) & 0x71D67FFFEDA60000
//!          x ^= (x << 37) & 0xFFF7EEE000000000
//!          x ^= x >> 43
//! ```

use crate::params::*;

/// Cursor value marking a generator that has never been seeded
const UNSEEDED: usize = MT_STATE_SIZE + 1;

/// MT19937-64 generator state
///
/// A search worker owns exactly one instance and reseeds it for every nonce,
/// so the state array is never reallocated.
#[derive(Clone)]
pub struct Mt64 {
    state: [u64; MT_STATE_SIZE],
    index: usize,
}

impl Mt64 {
    /// Create an unseeded generator
    ///
    /// Drawing from it before calling [`Mt64::set_seed`] behaves like the
    /// MT19937-64 reference code: it seeds itself with 5489.
    pub fn new() -> Self {
        Self {
            state: [0u64; MT_STATE_SIZE],
            index: UNSEEDED,
        }
    }

    /// Create a generator seeded with `seed`
    pub fn with_seed(seed: u64) -> Self {
        let mut mt = Self::new();
        mt.set_seed(seed);
        mt
    }

    /// Reinitialize the state from `seed`
    pub fn set_seed(&mut self, seed: u64) {
        self.state[0] = seed;
        for i in 1..MT_STATE_SIZE {
            let prev = self.state[i - 1];
            self.state[i] = MT_INIT_MULTIPLIER
                .wrapping_mul(prev ^ (prev >> 62))
                .wrapping_add(i as u64);
        }
        self.index = MT_STATE_SIZE;
    }

    /// Next tempered value of the sequence
    #[inline]
    pub fn next_u64(&mut self) -> u64 {
        if self.index >= MT_STATE_SIZE {
            if self.index == UNSEEDED {
                self.set_seed(MT_DEFAULT_SEED);
            }
            self.twist();
        }

        let mut x = self.state[self.index];
        self.index += 1;

        x ^= (x >> 29) & 0x5555_5555_5555_5555;
        x ^= (x << 17) & 0x71D6_7FFF_EDA6_0000;
        x ^= (x << 37) & 0xFFF7_EEE0_0000_0000;
        x ^= x >> 43;
        x
    }

    /// Regenerate the whole state block
    fn twist(&mut self) {
        #[inline(always)]
        fn mix(upper: u64, lower: u64) -> u64 {
            let x = (upper & MT_UPPER_MASK) | (lower & MT_LOWER_MASK);
            // x & 1 selects between 0 and MATRIX_A
            (x >> 1) ^ ((x & 1).wrapping_neg() & MT_MATRIX_A)
        }

        let mt = &mut self.state;

        for i in 0..MT_STATE_SIZE - MT_SHIFT_SIZE {
            mt[i] = mt[i + MT_SHIFT_SIZE] ^ mix(mt[i], mt[i + 1]);
        }
        for i in MT_STATE_SIZE - MT_SHIFT_SIZE..MT_STATE_SIZE - 1 {
            mt[i] = mt[i + MT_SHIFT_SIZE - MT_STATE_SIZE] ^ mix(mt[i], mt[i + 1]);
        }
        mt[MT_STATE_SIZE - 1] =
            mt[MT_SHIFT_SIZE - 1] ^ mix(mt[MT_STATE_SIZE - 1], mt[0]);

        self.index = 0;
    }
}

impl Default for Mt64 {
    fn default() -> Self {
        Self::new()
    }
}

impl Iterator for Mt64 {
    type Item = u64;

    fn next(&mut self) -> Option<u64> {
        Some(self.next_u64())
    }
}
