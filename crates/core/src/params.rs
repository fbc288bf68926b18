//! CSCoin protocol parameters
//!
//! Every miner must agree on these values, otherwise the payloads they
//! derive from the same seed diverge.

/// MT19937-64 state length in words
pub const MT_STATE_SIZE: usize = 312;

/// MT19937-64 middle word offset used by the twist
pub const MT_SHIFT_SIZE: usize = 156;

/// MT19937-64 twist matrix
pub const MT_MATRIX_A: u64 = 0xB502_6F5A_A966_19E9;

/// Most significant 33 bits
pub const MT_UPPER_MASK: u64 = 0xFFFF_FFFF_8000_0000;

/// Least significant 31 bits
pub const MT_LOWER_MASK: u64 = 0x7FFF_FFFF;

/// Seeding recurrence multiplier
pub const MT_INIT_MULTIPLIER: u64 = 6_364_136_223_846_793_005;

/// Seed used when a generator is drawn from before being seeded
pub const MT_DEFAULT_SEED: u64 = 5489;

/// Length of the previous solution hash in hex characters
pub const LAST_SOLUTION_HASH_LEN: usize = 64;

/// Digest size of the hash oracle (SHA-256)
pub const DIGEST_SIZE: usize = 32;

/// Upper bound (exclusive) of the nonce space
pub const NONCE_SPACE_END: u64 = 1 << 32;

/// Maximum number of hex digits in a hash prefix (16 bits)
pub const HASH_PREFIX_MAX_DIGITS: usize = 4;

/// Maximum element count for list challenges (8 MiB buffer per worker)
pub const MAX_LIST_ELEMENTS: usize = 1 << 20;

/// Smallest grid whose walled interior still fits distinct entry and exit cells
pub const MIN_GRID_SIZE: usize = 4;

/// Maximum grid edge for shortest path challenges
pub const MAX_GRID_SIZE: usize = 1024;

/// Maximum number of search workers (one thread and one partition each)
pub const MAX_WORKERS: usize = 1024;

/// Nonces scanned between two progress counter updates
pub const PROGRESS_BATCH: u64 = 1024;
