//! Individual value generators for the kinds of data the schema needs.
//!
//! Every generator takes the RNG explicitly, so a seeded generator produces
//! the same values on every run.

pub mod numeric;
pub mod person;
pub mod text;
pub mod timestamp;
pub mod vocab;

use rand::Rng;
use seed_core::Category;
use uuid::Uuid;

/// Uniform choice from a non-empty word list.
pub(crate) fn pick<'a, R: Rng>(rng: &mut R, words: &[&'a str]) -> &'a str {
    words[rng.gen_range(0..words.len())]
}

/// Uniform choice from a closed category.
pub fn sample<C: Category, R: Rng>(rng: &mut R) -> C {
    C::ALL[rng.gen_range(0..C::ALL.len())]
}

/// Uniform choice from an id pool. `None` when the pool is empty.
pub fn sample_id<R: Rng>(rng: &mut R, pool: &[i64]) -> Option<i64> {
    if pool.is_empty() {
        None
    } else {
        Some(pool[rng.gen_range(0..pool.len())])
    }
}

/// Random UUID v4 drawn from the provided RNG.
pub fn generate_uuid_v4<R: Rng>(rng: &mut R) -> Uuid {
    let mut bytes = [0u8; 16];
    rng.fill(&mut bytes);

    // Set version (4) and variant (RFC 4122) bits
    bytes[6] = (bytes[6] & 0x0f) | 0x40;
    bytes[8] = (bytes[8] & 0x3f) | 0x80;

    Uuid::from_bytes(bytes)
}
