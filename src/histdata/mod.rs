//! Historic Price Data Pipeline
//!
//! Converts per-market, time-ordered snapshot sequences (Betfair historic
//! price files materialized as newline-delimited JSON market books) into
//! CSV rows of preplay / in-play trading statistics per runner.
//!
//! # Architecture
//!
//! ```text
//! market files (NDJSON)
//!        │
//!        ▼
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │ Source      │────▶│ Normalizer  │────▶│ Scanner     │
//! │ (lazy file/ │     │ (raw JSON → │     │ (single-pass│
//! │  line iter) │     │  MarketBook)│     │  fold)      │
//! └─────────────┘     └─────────────┘     └──────┬──────┘
//!                                                │ preplay / postplay / final
//!                                                ▼
//!                                         ┌─────────────┐
//!                                         │ Statistics  │
//!                                         │ (delta, wap,│
//!                                         │  extrema,SP)│
//!                                         └──────┬──────┘
//!                                                │ per-runner TradedStats
//!                                                ▼
//!                                         ┌─────────────┐
//!                                         │ Emitter     │
//!                                         │ (OutputRow, │
//!                                         │  CSV)       │
//!                                         └─────────────┘
//! ```
//!
//! # Guarantees
//!
//! - **Single pass**: each market's snapshot sequence is consumed exactly
//!   once; the scanner retains at most three snapshots.
//! - **Determinism**: re-running over identical input yields byte-identical
//!   CSV output, regardless of worker scheduling.
//! - **Silent skips**: ineligible markets and markets that never close in
//!   the observed window produce zero rows, not errors.

pub mod eligibility;
pub mod emit;
pub mod model;
pub mod normalize;
pub mod reducer;
pub mod scan;
pub mod source;
pub mod stats;

pub use eligibility::EligibilityConfig;
pub use emit::OutputRow;
pub use model::{MarketBook, MarketStatus, PriceSize, RunnerBook, RunnerStatus};
pub use reducer::{reduce_market, MarketOutcome, RunSummary};
pub use scan::{scan_market, ScanVerdict};
