//! Trading Statistics Reducer
//!
//! Per-market orchestration: scan the snapshot sequence, compute per-runner
//! preplay / in-play statistics and settlement-price volume, and join them
//! into output rows. Markets are processed independently; the caller may
//! fan them out across workers as long as row order follows input order.

use tracing::debug;

use crate::histdata::eligibility::EligibilityConfig;
use crate::histdata::emit::{fmt_decimal, fmt_event_date, fmt_opt_decimal, OutputRow};
use crate::histdata::model::{MarketBook, PriceSize, RunnerBook};
use crate::histdata::scan::{scan_market, ScanOutcome, ScanVerdict};
use crate::histdata::stats::{inplay_delta, parse_traded, sp_traded_volume};

/// Result of reducing one market.
#[derive(Debug, Clone)]
pub enum MarketOutcome {
    /// Failed the eligibility predicate; silently skipped.
    Ineligible,
    /// Never closed in the observed window (or no definition); silently
    /// skipped as incomplete data.
    Incomplete,
    /// One row per runner in the final snapshot, in runner order.
    Rows(Vec<OutputRow>),
}

/// Run-level counters, summed across markets after processing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub markets_scanned: u64,
    pub markets_ineligible: u64,
    pub markets_incomplete: u64,
    pub rows_emitted: u64,
}

impl RunSummary {
    pub fn record(&mut self, outcome: &MarketOutcome) {
        self.markets_scanned += 1;
        match outcome {
            MarketOutcome::Ineligible => self.markets_ineligible += 1,
            MarketOutcome::Incomplete => self.markets_incomplete += 1,
            MarketOutcome::Rows(rows) => self.rows_emitted += rows.len() as u64,
        }
    }

    pub fn merge(&mut self, other: &RunSummary) {
        self.markets_scanned += other.markets_scanned;
        self.markets_ineligible += other.markets_ineligible;
        self.markets_incomplete += other.markets_incomplete;
        self.rows_emitted += other.rows_emitted;
    }
}

/// Reduce one market's snapshot sequence to its output rows.
pub fn reduce_market(
    snapshots: impl Iterator<Item = MarketBook>,
    eligibility: &EligibilityConfig,
) -> MarketOutcome {
    match scan_market(snapshots, eligibility) {
        ScanVerdict::Ineligible => MarketOutcome::Ineligible,
        ScanVerdict::Incomplete => MarketOutcome::Incomplete,
        ScanVerdict::Complete(outcome) => {
            let rows = emit_rows(&outcome);
            debug!(
                market_id = %outcome.final_book.market_id,
                went_inplay = outcome.preplay.is_some(),
                rows = rows.len(),
                "Reduced market"
            );
            MarketOutcome::Rows(rows)
        }
    }
}

fn emit_rows(outcome: &ScanOutcome) -> Vec<OutputRow> {
    let definition = &outcome.definition;
    let event_date = fmt_event_date(definition.market_time);

    outcome
        .final_book
        .runners
        .iter()
        .map(|runner| {
            let selection_id = runner.selection_id;
            let selection_name = definition
                .runners
                .iter()
                .find(|r| r.selection_id == selection_id)
                .and_then(|r| r.name.clone())
                .unwrap_or_default();

            // Books in earlier snapshots are matched by selection id; a
            // runner absent from a snapshot contributes an empty
            // distribution.
            let post = outcome.postplay.runner(selection_id);
            let post_dist = traded_volume_of(post);
            let sp_volume = post.map(|r| sp_traded_volume(&r.sp)).unwrap_or(0.0);
            let prices = match &outcome.preplay {
                Some(preplay) => {
                    let pre = preplay.runner(selection_id);
                    inplay_prices(pre, post, post_dist, sp_volume)
                }
                None => preplay_only_prices(post, post_dist, sp_volume),
            };

            OutputRow {
                market_id: outcome.postplay.market_id.clone(),
                event_date: event_date.clone(),
                country: definition.country_code.clone(),
                track: definition.venue.clone(),
                market_name: definition.name.clone(),
                selection_id,
                selection_name,
                result: runner.status.as_str().into(),
                bsp: fmt_opt_decimal(runner.sp.actual_sp),
                pp_min: prices.pp_min,
                pp_max: prices.pp_max,
                pp_wap: prices.pp_wap,
                pp_ltp: prices.pp_ltp,
                pp_volume: prices.pp_volume,
                ip_min: prices.ip_min,
                ip_max: prices.ip_max,
                ip_wap: prices.ip_wap,
                ip_ltp: prices.ip_ltp,
                ip_volume: prices.ip_volume,
            }
        })
        .collect()
}

/// Price columns for one runner, already rendered.
struct RunnerPrices {
    pp_min: String,
    pp_max: String,
    pp_wap: String,
    pp_ltp: String,
    pp_volume: String,
    ip_min: String,
    ip_max: String,
    ip_wap: String,
    ip_ltp: String,
    ip_volume: String,
}

fn traded_volume_of(runner: Option<&RunnerBook>) -> &[PriceSize] {
    runner.map(|r| r.traded_volume.as_slice()).unwrap_or(&[])
}

/// Market went in-play: preplay statistics from the preplay snapshot,
/// in-play statistics from the volume delta between preplay and postplay.
fn inplay_prices(
    pre: Option<&RunnerBook>,
    post: Option<&RunnerBook>,
    post_dist: &[PriceSize],
    sp_volume: f64,
) -> RunnerPrices {
    let pre_dist = traded_volume_of(pre);
    let pre_stats = parse_traded(pre_dist);
    let ip_stats = parse_traded(&inplay_delta(pre_dist, post_dist));

    RunnerPrices {
        pp_min: fmt_opt_decimal(pre_stats.min),
        pp_max: fmt_opt_decimal(pre_stats.max),
        pp_wap: fmt_opt_decimal(pre_stats.wavg),
        pp_ltp: fmt_opt_decimal(pre.and_then(|r| r.last_price_traded)),
        pp_volume: fmt_decimal(pre_stats.matched.unwrap_or(0.0) + sp_volume),
        ip_min: fmt_opt_decimal(ip_stats.min),
        ip_max: fmt_opt_decimal(ip_stats.max),
        ip_wap: fmt_opt_decimal(ip_stats.wavg),
        ip_ltp: fmt_opt_decimal(post.and_then(|r| r.last_price_traded)),
        ip_volume: fmt_opt_decimal(ip_stats.matched),
    }
}

/// Market never went in-play: preplay statistics straight from the postplay
/// snapshot's distribution; in-play columns are not applicable and stay
/// empty (distinct from observed zero volume).
fn preplay_only_prices(
    post: Option<&RunnerBook>,
    post_dist: &[PriceSize],
    sp_volume: f64,
) -> RunnerPrices {
    let stats = parse_traded(post_dist);

    RunnerPrices {
        pp_min: fmt_opt_decimal(stats.min),
        pp_max: fmt_opt_decimal(stats.max),
        pp_wap: fmt_opt_decimal(stats.wavg),
        pp_ltp: fmt_opt_decimal(post.and_then(|r| r.last_price_traded)),
        pp_volume: fmt_decimal(stats.matched.unwrap_or(0.0) + sp_volume),
        ip_min: String::new(),
        ip_max: String::new(),
        ip_wap: String::new(),
        ip_ltp: String::new(),
        ip_volume: String::new(),
    }
}
