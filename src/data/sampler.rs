// ============================================================
// Layer 4 — Sample Order
// ============================================================
// Decides in which order samples are sliced into batches.
//
//   Identity → 0, 1, 2, ..., set_len - 1
//   Shuffled → a uniform permutation of the same range,
//              drawn fresh on every build
//
// The permutation comes from a PermutationSource so the RNG
// can be seeded by the caller (reproducible runs) or replaced
// by a scripted order in tests.
//
// Uses Fisher-Yates shuffle via rand::seq::SliceRandom.
//
// Reference: rand crate documentation

use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};

use crate::domain::{
    error::{BatchError, Result},
    split::SampleOrder,
    traits::PermutationSource,
};

/// Default permutation source backed by rand's StdRng.
pub struct SeededPermutation {
    rng: StdRng,
}

impl SeededPermutation {
    /// Seeded for reproducible orderings, or from OS entropy if `seed` is None.
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None       => StdRng::from_entropy(),
        };
        Self { rng }
    }
}

impl PermutationSource for SeededPermutation {
    fn permutation(&mut self, n: usize) -> Vec<usize> {
        let mut order: Vec<usize> = (0..n).collect();
        order.shuffle(&mut self.rng);
        order
    }
}

/// Sample indices for one build, in batching order.
pub fn sample_order(
    strategy:     SampleOrder,
    set_len:      usize,
    permutations: &mut dyn PermutationSource,
) -> Result<Vec<usize>> {
    match strategy {
        SampleOrder::Identity => Ok((0..set_len).collect()),
        SampleOrder::Shuffled => {
            let order = permutations.permutation(set_len);
            if !is_permutation(&order, set_len) {
                return Err(BatchError::InvalidArgument(format!(
                    "permutation source returned an invalid ordering of 0..{set_len}"
                )));
            }
            Ok(order)
        }
    }
}

fn is_permutation(order: &[usize], n: usize) -> bool {
    if order.len() != n {
        return false;
    }
    let mut seen = vec![false; n];
    order
        .iter()
        .all(|&i| i < n && !std::mem::replace(&mut seen[i], true))
}
