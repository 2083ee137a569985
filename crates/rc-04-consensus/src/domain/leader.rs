//! Leader lottery
//!
//! Proof-of-work is modelled as a categorical draw weighted by hash-rate
//! share: the probability of winning a block interval equals the node's share
//! of the total.

use super::error::{ConsensusError, ConsensusResult};
use rand::Rng;
use shared_types::NodeId;

/// Draw the winner of one block interval.
///
/// Candidates are considered in ascending id order. A draw that lands exactly
/// on the boundary between two nodes goes to the lower id. Nodes with a zero
/// (or negative) share never win.
///
/// # Errors
///
/// `NoEligibleMiner` if no candidate has a positive share.
pub fn select_leader<R, I>(candidates: I, rng: &mut R) -> ConsensusResult<NodeId>
where
    R: Rng + ?Sized,
    I: IntoIterator<Item = (NodeId, f64)>,
{
    let mut eligible: Vec<(NodeId, f64)> = candidates
        .into_iter()
        .filter(|(_, share)| *share > 0.0)
        .collect();
    eligible.sort_by_key(|(id, _)| *id);

    let total: f64 = eligible.iter().map(|(_, share)| share).sum();
    let last = match eligible.last() {
        Some((id, _)) if total > 0.0 => *id,
        _ => return Err(ConsensusError::NoEligibleMiner),
    };

    let draw = rng.gen::<f64>() * total;
    let mut cumulative = 0.0;
    for (id, share) in &eligible {
        cumulative += share;
        if draw <= cumulative {
            return Ok(*id);
        }
    }
    // Float rounding can leave the draw a hair above the final sum.
    Ok(last)
}
