// src/naming/unroll.rs

use crate::naming::artifact::PolishChain;

/// Decompose a chain into every intermediate chain that has to exist before
/// it, longest first.
///
/// - `do_unroll == false`: just `[chain]`.
/// - empty chain: `[]`.
/// - otherwise the chain itself, followed by the unrolling of its
///   predecessor: the final step one iteration earlier, or, at iteration 1,
///   the chain with the final step removed. Removing a step never touches
///   the iteration counter of the step before it.
///
/// Every step either shortens the chain or decrements its last iteration, so
/// the result has exactly [`PolishChain::total_passes`] entries.
pub fn unroll(chain: &PolishChain, do_unroll: bool) -> Vec<PolishChain> {
    if !do_unroll {
        return vec![chain.clone()];
    }

    let mut out = Vec::with_capacity(chain.total_passes());
    let mut current = chain.clone();
    while let Some(last) = current.last().copied() {
        let next = match last.previous_iteration() {
            Some(prev) => current.with_last(prev),
            None => current.without_last(),
        };
        out.push(current);
        current = next;
    }
    out
}
