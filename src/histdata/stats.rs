//! Traded-Volume Statistics
//!
//! Reductions over price/volume distributions: weighted-average price,
//! total matched, price extrema, the in-play-only volume delta between two
//! cumulative distributions, and the settlement-price volume estimate.

use crate::histdata::model::{PriceSize, StartingPrice};

/// Sentinel above any valid decimal-odds price (exchange ladder tops out at
/// 1000). A min-price fold that never leaves the sentinel found no entries.
const MIN_PRICE_SENTINEL: f64 = 1001.0;

/// Statistics over one price/volume distribution. All fields are absent for
/// an empty distribution; absent means "no trade data", never zero.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TradedStats {
    pub wavg: Option<f64>,
    pub matched: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

/// Reduce a price/volume distribution to its summary statistics.
pub fn parse_traded(traded: &[PriceSize]) -> TradedStats {
    if traded.is_empty() {
        return TradedStats::default();
    }

    let (wavg_sum, matched, min_price, max_price) = traded.iter().fold(
        (0.0_f64, 0.0_f64, MIN_PRICE_SENTINEL, 0.0_f64),
        |(wavg_sum, matched, min_price, max_price), ps| {
            (
                wavg_sum + ps.price * ps.size,
                matched + ps.size,
                min_price.min(ps.price),
                max_price.max(ps.price),
            )
        },
    );

    TradedStats {
        wavg: (matched > 0.0).then(|| wavg_sum / matched),
        matched: (matched > 0.0).then_some(matched),
        min: (min_price != MIN_PRICE_SENTINEL).then_some(min_price),
        max: (max_price != 0.0).then_some(max_price),
    }
}

/// Volume traded strictly during the in-play period: per price level in the
/// `after` distribution, the size increase over `before`. Non-positive
/// deltas carry no information and are omitted.
pub fn inplay_delta(before: &[PriceSize], after: &[PriceSize]) -> Vec<PriceSize> {
    after
        .iter()
        .filter_map(|post| {
            let pre_size = before
                .iter()
                .find(|pre| pre.price == post.price)
                .map_or(0.0, |pre| pre.size);
            let delta = post.size - pre_size;
            (delta > 0.0).then(|| PriceSize::new(post.price, delta))
        })
        .collect()
}

/// Smaller of two numbers, ignoring non-positive operands: a non-positive
/// side yields the other side.
pub fn min_gr0(a: f64, b: f64) -> f64 {
    if a <= 0.0 {
        return b;
    }
    if b <= 0.0 {
        return a;
    }
    a.min(b)
}

/// First entry with size > 0, or 0 if none. A single representative entry,
/// not a sum.
fn first_positive_size(levels: &[PriceSize]) -> f64 {
    levels
        .iter()
        .map(|ps| ps.size)
        .find(|&size| size > 0.0)
        .unwrap_or(0.0)
}

/// Estimate the volume matched at the official settlement price.
///
/// The lay-side liability converts to an equivalent back-side stake via
/// `liability = stake * (price - 1)`; the estimate is the smaller positive
/// of the back stake and that conversion. An undefined settlement price
/// contributes 0, as does a settlement price at or below 1.0 (the lay
/// conversion is undefined there).
pub fn sp_traded_volume(sp: &StartingPrice) -> f64 {
    let Some(actual_sp) = sp.actual_sp else {
        return 0.0;
    };
    let back = first_positive_size(&sp.back_stake_taken);
    let lay_equivalent = if actual_sp > 1.0 {
        first_positive_size(&sp.lay_liability_taken) / (actual_sp - 1.0)
    } else {
        0.0
    };
    min_gr0(back, lay_equivalent)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ps(price: f64, size: f64) -> PriceSize {
        PriceSize::new(price, size)
    }

    #[test]
    fn test_empty_distribution_all_absent() {
        let stats = parse_traded(&[]);
        assert_eq!(stats, TradedStats::default());
        assert!(stats.wavg.is_none());
        assert!(stats.matched.is_none());
        assert!(stats.min.is_none());
        assert!(stats.max.is_none());
    }

    #[test]
    fn test_parse_traded_basic() {
        let stats = parse_traded(&[ps(2.0, 10.0), ps(3.0, 5.0)]);
        assert_eq!(stats.matched, Some(15.0));
        // (2*10 + 3*5) / 15
        assert!((stats.wavg.unwrap() - 35.0 / 15.0).abs() < 1e-12);
        assert_eq!(stats.min, Some(2.0));
        assert_eq!(stats.max, Some(3.0));
    }

    #[test]
    fn test_wavg_between_extrema() {
        let dists = [
            vec![ps(1.5, 3.0)],
            vec![ps(2.0, 10.0), ps(3.0, 5.0)],
            vec![ps(4.2, 1.0), ps(6.0, 0.5), ps(10.0, 30.0)],
        ];
        for dist in dists {
            let stats = parse_traded(&dist);
            let wavg = stats.wavg.unwrap();
            assert!(stats.min.unwrap() <= wavg && wavg <= stats.max.unwrap());
        }
    }

    #[test]
    fn test_all_zero_sizes_leave_absent_fields() {
        // Volumes filtered to zero: matched and wavg are absent, extrema
        // still reflect the prices present.
        let stats = parse_traded(&[ps(2.0, 0.0), ps(5.0, 0.0)]);
        assert!(stats.wavg.is_none());
        assert!(stats.matched.is_none());
        assert_eq!(stats.min, Some(2.0));
        assert_eq!(stats.max, Some(5.0));
    }

    #[test]
    fn test_inplay_delta_scenario_a() {
        let before = [ps(2.0, 10.0), ps(3.0, 5.0)];
        let after = [ps(2.0, 10.0), ps(3.0, 5.0), ps(4.0, 20.0)];
        let delta = inplay_delta(&before, &after);
        assert_eq!(delta, vec![ps(4.0, 20.0)]);

        let stats = parse_traded(&delta);
        assert_eq!(stats.wavg, Some(4.0));
        assert_eq!(stats.matched, Some(20.0));
        assert_eq!(stats.min, Some(4.0));
        assert_eq!(stats.max, Some(4.0));
    }

    #[test]
    fn test_inplay_delta_never_negative() {
        // Shrinking or equal levels are omitted, new levels pass through.
        let before = [ps(2.0, 10.0), ps(3.0, 8.0)];
        let after = [ps(2.0, 4.0), ps(3.0, 8.0), ps(5.0, 1.0)];
        let delta = inplay_delta(&before, &after);
        assert_eq!(delta, vec![ps(5.0, 1.0)]);
        assert!(delta.iter().all(|d| d.size > 0.0));
    }

    #[test]
    fn test_min_gr0_truth_table() {
        assert_eq!(min_gr0(-1.0, 5.0), 5.0);
        assert_eq!(min_gr0(0.0, 5.0), 5.0);
        assert_eq!(min_gr0(5.0, -1.0), 5.0);
        assert_eq!(min_gr0(5.0, 0.0), 5.0);
        assert_eq!(min_gr0(3.0, 5.0), 3.0);
        assert_eq!(min_gr0(5.0, 3.0), 3.0);
    }

    #[test]
    fn test_sp_volume_scenario_b() {
        let sp = StartingPrice {
            actual_sp: Some(5.0),
            back_stake_taken: vec![ps(5.0, 0.0), ps(5.0, 8.0)],
            lay_liability_taken: vec![ps(5.0, 40.0)],
        };
        // min_gr0(8, 40 / (5 - 1) = 10) = 8
        assert_eq!(sp_traded_volume(&sp), 8.0);
    }

    #[test]
    fn test_sp_volume_undefined_price() {
        let sp = StartingPrice {
            actual_sp: None,
            back_stake_taken: vec![ps(5.0, 8.0)],
            lay_liability_taken: vec![ps(5.0, 40.0)],
        };
        assert_eq!(sp_traded_volume(&sp), 0.0);
    }

    #[test]
    fn test_sp_volume_one_sided_pool() {
        let back_only = StartingPrice {
            actual_sp: Some(3.0),
            back_stake_taken: vec![ps(3.0, 12.0)],
            lay_liability_taken: vec![],
        };
        assert_eq!(sp_traded_volume(&back_only), 12.0);

        let lay_only = StartingPrice {
            actual_sp: Some(3.0),
            back_stake_taken: vec![],
            lay_liability_taken: vec![ps(3.0, 10.0)],
        };
        assert_eq!(sp_traded_volume(&lay_only), 5.0);
    }

    #[test]
    fn test_sp_volume_degenerate_settlement_price() {
        let sp = StartingPrice {
            actual_sp: Some(1.0),
            back_stake_taken: vec![ps(1.0, 8.0)],
            lay_liability_taken: vec![ps(1.0, 40.0)],
        };
        // Lay conversion undefined at sp <= 1.0; back side stands alone.
        assert_eq!(sp_traded_volume(&sp), 8.0);
    }
}
