//! Snapshot Scanner
//!
//! Single-pass fold over one market's snapshot sequence. Detects the
//! in-play transition and the market-closure transition, retaining the last
//! pre-transition snapshot, the transitioning (post-close) snapshot, and
//! the final snapshot. Everything else is discarded as it passes, so memory
//! stays proportional to runner count, not sequence length.

use crate::histdata::eligibility::EligibilityConfig;
use crate::histdata::model::{MarketBook, MarketDefinition, MarketStatus};

/// Snapshots retained by a completed scan.
#[derive(Debug, Clone)]
pub struct ScanOutcome {
    /// Last snapshot before the market went in-play. `None` when the market
    /// never went in-play in the observed window.
    pub preplay: Option<MarketBook>,
    /// Snapshot at which the market left the OPEN state for the last time.
    pub postplay: MarketBook,
    /// Last snapshot in the sequence.
    pub final_book: MarketBook,
    /// Latest market definition observed. Definitions arrive only on
    /// change in the wire format, so the last one seen is the final
    /// snapshot's cumulative definition state.
    pub definition: MarketDefinition,
}

/// Result of scanning one market's snapshot sequence.
#[derive(Debug, Clone)]
pub enum ScanVerdict {
    /// Market failed the eligibility predicate; no rows.
    Ineligible,
    /// No closure transition (or no definition) observed in the snapshot
    /// window; incomplete data, no rows.
    Incomplete,
    /// Scan captured everything needed to compute statistics.
    Complete(ScanOutcome),
}

/// Fold accumulator. The previous snapshot is the only look-behind state;
/// eligibility is decided at most once per market.
#[derive(Debug, Default)]
struct ScanState {
    prev: Option<MarketBook>,
    preplay_candidate: Option<MarketBook>,
    postplay_candidate: Option<MarketBook>,
    definition: Option<MarketDefinition>,
    eligibility: Option<bool>,
}

/// Scan a market's snapshot sequence exactly once, in arrival order.
///
/// The eligibility predicate runs on the first snapshot carrying a non-null
/// market definition; a failing market aborts the scan immediately.
pub fn scan_market(
    snapshots: impl Iterator<Item = MarketBook>,
    eligibility: &EligibilityConfig,
) -> ScanVerdict {
    let mut state = ScanState::default();

    for book in snapshots {
        if let Some(definition) = &book.definition {
            if state.eligibility.is_none() {
                let eligible = eligibility.is_eligible(definition);
                state.eligibility = Some(eligible);
                if !eligible {
                    return ScanVerdict::Ineligible;
                }
            }
            state.definition = Some(definition.clone());
        }

        if let Some(prev) = &state.prev {
            // Last market view before the market goes in-play.
            if !prev.inplay && book.inplay {
                state.preplay_candidate = Some(prev.clone());
            }
            // Market view at the conclusion of the market. Markets suspend
            // and reopen mid-betting, so later transitions supersede
            // earlier ones; the retained snapshot is the transition into
            // the terminal non-OPEN state.
            if prev.status == MarketStatus::Open && book.status != MarketStatus::Open {
                state.postplay_candidate = Some(book.clone());
            }
        }

        state.prev = Some(book);
    }

    if state.eligibility != Some(true) {
        // No definition ever arrived; nothing to emit rows from.
        return ScanVerdict::Incomplete;
    }

    match (state.postplay_candidate, state.prev, state.definition) {
        (Some(postplay), Some(final_book), Some(definition)) => {
            ScanVerdict::Complete(ScanOutcome {
                preplay: state.preplay_candidate,
                postplay,
                final_book,
                definition,
            })
        }
        _ => ScanVerdict::Incomplete,
    }
}
