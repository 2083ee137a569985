//! Per-node synchronization state machine
//!
//! State Machine:
//! ```text
//! [SYNCED] ──equal-weight branch──→ [FORKED]
//!     ↑  ↖                             │
//!     │   └──── tip extended ──────────┤
//!     │                                │
//!     │                     heavier branch
//!     │                                ↓
//!     └──────── reorg complete ── [RESOLVING]
//! ```
//!
//! A heavier branch moves any state to RESOLVING. A lighter branch leaves the
//! state unchanged.

use serde::{Deserialize, Serialize};

/// Synchronization state of a node's chain view.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SyncState {
    /// Main chain is the unique heaviest known branch.
    #[default]
    Synced,
    /// A competing branch of equal weight is known.
    Forked,
    /// Switching to a heavier branch.
    Resolving,
}

/// Observations that drive `SyncState` transitions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SyncEvent {
    /// A block extended the current tip.
    TipExtended,
    /// A side branch reached the main chain's weight.
    EqualBranch,
    /// A side branch outweighs the main chain.
    HeavierBranch,
    /// A side branch is lighter than the main chain.
    LighterBranch,
    /// The node finished switching branches.
    ReorgComplete,
}

impl SyncState {
    /// Pure transition function.
    pub fn next(self, event: SyncEvent) -> SyncState {
        match (self, event) {
            (_, SyncEvent::HeavierBranch) => SyncState::Resolving,
            (SyncState::Resolving, SyncEvent::ReorgComplete) => SyncState::Synced,
            (SyncState::Resolving, _) => SyncState::Resolving,
            (_, SyncEvent::TipExtended) => SyncState::Synced,
            (_, SyncEvent::EqualBranch) => SyncState::Forked,
            (state, SyncEvent::LighterBranch) => state,
            (state, SyncEvent::ReorgComplete) => state,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_synced_to_forked_on_tie() {
        assert_eq!(SyncState::Synced.next(SyncEvent::EqualBranch), SyncState::Forked);
    }

    #[test]
    fn test_forked_resolves_through_reorg() {
        let state = SyncState::Forked.next(SyncEvent::HeavierBranch);
        assert_eq!(state, SyncState::Resolving);
        assert_eq!(state.next(SyncEvent::ReorgComplete), SyncState::Synced);
    }

    #[test]
    fn test_forked_clears_when_tip_extends() {
        assert_eq!(SyncState::Forked.next(SyncEvent::TipExtended), SyncState::Synced);
    }

    #[test]
    fn test_lighter_branch_keeps_state() {
        assert_eq!(SyncState::Synced.next(SyncEvent::LighterBranch), SyncState::Synced);
        assert_eq!(SyncState::Forked.next(SyncEvent::LighterBranch), SyncState::Forked);
    }

    #[test]
    fn test_resolving_waits_for_reorg() {
        assert_eq!(SyncState::Resolving.next(SyncEvent::TipExtended), SyncState::Resolving);
    }
}
