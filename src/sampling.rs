//! Reproducible capping of oversized radius results.
//!
//! Every query owns an independent random stream derived from the call seed and the
//! query's position inside its cloud. No generator state is shared between queries,
//! so results do not depend on how rayon schedules the work.

use crate::kdtree::Neighbor;
use rand::rngs::StdRng;
use rand::seq::index;
use rand::{Rng, SeedableRng};

/// SplitMix64 finaliser.
fn mix(mut z: u64) -> u64 {
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}

/// Seed of the stream belonging to query `stream` under call seed `seed`.
pub fn stream_seed(seed: u64, stream: u64) -> u64 {
    mix(seed ^ mix(stream.wrapping_add(0x9e37_79b9_7f4a_7c15)))
}

pub fn stream_rng(seed: u64, stream: u64) -> StdRng {
    StdRng::seed_from_u64(stream_seed(seed, stream))
}

/// Fixes the seed of a call: a given seed is used as is, otherwise one is drawn from
/// OS entropy.
pub fn resolve_seed(seed: Option<u64>) -> u64 {
    seed.unwrap_or_else(rand::random)
}

/// Keeps exactly `max_num` uniformly chosen entries of `neighbors` when it holds more.
///
/// Kept entries keep their relative order. `max_num == 0` means unbounded.
pub fn cap<T, R: Rng + ?Sized>(neighbors: &mut Vec<T>, max_num: usize, rng: &mut R) {
    if max_num == 0 || neighbors.len() <= max_num {
        return;
    }

    let mut keep = index::sample(rng, neighbors.len(), max_num).into_vec();
    keep.sort_unstable();

    // keep is ascending, so every pos >= slot and no kept entry is overwritten before it is read
    for (slot, &pos) in keep.iter().enumerate() {
        neighbors.swap(slot, pos);
    }
    neighbors.truncate(max_num);
}

/// Caps the result of query `stream` with its own generator.
pub fn cap_query<T>(neighbors: &mut Vec<Neighbor<T>>, max_num: usize, seed: u64, stream: u64) {
    if max_num == 0 || neighbors.len() <= max_num {
        return;
    }
    let mut rng = stream_rng(seed, stream);
    cap(neighbors, max_num, &mut rng);
}
