//! Data Normalization Layer
//!
//! Parsers for raw NDJSON market-book records and conversion to canonical
//! snapshots. Raw files come from externally-extracted Betfair historic
//! price archives; field aliases accept both the wire camelCase names and
//! snake_case. Defective entries are counted, logged and dropped rather
//! than aborting the run.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::warn;

use crate::histdata::model::{
    MarketBook, MarketDefinition, MarketStatus, PriceSize, RunnerBook, RunnerDefinition,
    RunnerStatus, SelectionId, StartingPrice,
};

/// Raw price level (price/size as strings or numbers).
#[derive(Debug, Clone, Deserialize)]
pub struct RawPriceSize {
    #[serde(deserialize_with = "deserialize_number_or_string")]
    pub price: f64,
    #[serde(deserialize_with = "deserialize_number_or_string")]
    pub size: f64,
}

/// Raw starting-price block.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawStartingPrice {
    #[serde(default, alias = "actualSP", alias = "actualSp")]
    pub actual_sp: Option<f64>,
    #[serde(default, alias = "backStakeTaken")]
    pub back_stake_taken: Vec<RawPriceSize>,
    #[serde(default, alias = "layLiabilityTaken")]
    pub lay_liability_taken: Vec<RawPriceSize>,
}

/// Raw runner book within a snapshot.
#[derive(Debug, Clone, Deserialize)]
pub struct RawRunnerBook {
    #[serde(alias = "selectionId", alias = "id")]
    pub selection_id: SelectionId,
    pub status: RunnerStatus,
    #[serde(default, alias = "lastPriceTraded", alias = "ltp")]
    pub last_price_traded: Option<f64>,
    #[serde(default, alias = "tradedVolume", alias = "trd")]
    pub traded_volume: Vec<RawPriceSize>,
    #[serde(default)]
    pub sp: RawStartingPrice,
}

/// Raw definition-level runner identity.
#[derive(Debug, Clone, Deserialize)]
pub struct RawRunnerDefinition {
    #[serde(alias = "selectionId", alias = "id")]
    pub selection_id: SelectionId,
    #[serde(default)]
    pub name: Option<String>,
}

/// Raw market definition metadata.
#[derive(Debug, Clone, Deserialize)]
pub struct RawMarketDefinition {
    #[serde(alias = "countryCode")]
    pub country_code: String,
    #[serde(alias = "marketType")]
    pub market_type: String,
    #[serde(alias = "marketName")]
    pub name: String,
    #[serde(default)]
    pub venue: String,
    #[serde(alias = "marketTime")]
    pub market_time: DateTime<Utc>,
    #[serde(default)]
    pub runners: Vec<RawRunnerDefinition>,
}

/// Raw market-book snapshot (one NDJSON line).
#[derive(Debug, Clone, Deserialize)]
pub struct RawMarketBook {
    #[serde(alias = "marketId")]
    pub market_id: String,
    #[serde(default, alias = "inPlay")]
    pub inplay: bool,
    pub status: MarketStatus,
    #[serde(default)]
    pub runners: Vec<RawRunnerBook>,
    #[serde(default, alias = "marketDefinition")]
    pub definition: Option<RawMarketDefinition>,
}

/// Deserialize a number that may come as a string or number.
fn deserialize_number_or_string<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StringOrNumber {
        String(String),
        Number(f64),
    }

    match StringOrNumber::deserialize(deserializer)? {
        StringOrNumber::String(s) => s.parse().map_err(serde::de::Error::custom),
        StringOrNumber::Number(n) => Ok(n),
    }
}

/// Source integrity counters for one market file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SourceStats {
    pub lines_read: u64,
    pub snapshots_parsed: u64,
    pub parse_errors: u64,
    pub negative_sizes_dropped: u64,
    pub invalid_prices_dropped: u64,
}

impl SourceStats {
    pub fn merge(&mut self, other: &SourceStats) {
        self.lines_read += other.lines_read;
        self.snapshots_parsed += other.snapshots_parsed;
        self.parse_errors += other.parse_errors;
        self.negative_sizes_dropped += other.negative_sizes_dropped;
        self.invalid_prices_dropped += other.invalid_prices_dropped;
    }
}

/// Market-book normalizer with integrity counting.
#[derive(Debug, Default)]
pub struct BookNormalizer {
    stats: SourceStats,
}

impl BookNormalizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stats(&self) -> &SourceStats {
        &self.stats
    }

    /// Parse one NDJSON line into a canonical snapshot, or count and drop it.
    pub fn normalize_line(&mut self, line: &str) -> Option<MarketBook> {
        self.stats.lines_read += 1;
        match serde_json::from_str::<RawMarketBook>(line) {
            Ok(raw) => {
                let book = self.normalize_book(raw);
                self.stats.snapshots_parsed += 1;
                Some(book)
            }
            Err(err) => {
                self.stats.parse_errors += 1;
                warn!(%err, "Skipping malformed snapshot line");
                None
            }
        }
    }

    fn normalize_book(&mut self, raw: RawMarketBook) -> MarketBook {
        let market_id = raw.market_id;
        let runners = raw
            .runners
            .into_iter()
            .map(|r| self.normalize_runner(&market_id, r))
            .collect();

        MarketBook {
            market_id,
            inplay: raw.inplay,
            status: raw.status,
            runners,
            definition: raw.definition.map(|d| MarketDefinition {
                country_code: d.country_code,
                market_type: d.market_type,
                name: d.name,
                venue: d.venue,
                market_time: d.market_time,
                runners: d
                    .runners
                    .into_iter()
                    .map(|r| RunnerDefinition {
                        selection_id: r.selection_id,
                        name: r.name,
                    })
                    .collect(),
            }),
        }
    }

    fn normalize_runner(&mut self, market_id: &str, raw: RawRunnerBook) -> RunnerBook {
        let traded_volume = self.normalize_levels(market_id, raw.selection_id, raw.traded_volume);
        let back_stake_taken =
            self.normalize_levels(market_id, raw.selection_id, raw.sp.back_stake_taken);
        let lay_liability_taken =
            self.normalize_levels(market_id, raw.selection_id, raw.sp.lay_liability_taken);

        RunnerBook {
            selection_id: raw.selection_id,
            status: raw.status,
            last_price_traded: raw.last_price_traded,
            traded_volume,
            sp: StartingPrice {
                actual_sp: raw.sp.actual_sp,
                back_stake_taken,
                lay_liability_taken,
            },
        }
    }

    fn normalize_levels(
        &mut self,
        market_id: &str,
        selection_id: SelectionId,
        raw_levels: Vec<RawPriceSize>,
    ) -> Vec<PriceSize> {
        let mut levels = Vec::with_capacity(raw_levels.len());
        for raw in raw_levels {
            // Decimal odds are at least 1.0; anything else is a data defect.
            if !raw.price.is_finite() || raw.price < 1.0 {
                self.stats.invalid_prices_dropped += 1;
                warn!(
                    market_id,
                    selection_id,
                    price = raw.price,
                    "Invalid price level dropped"
                );
                continue;
            }
            if raw.size < 0.0 {
                self.stats.negative_sizes_dropped += 1;
                warn!(
                    market_id,
                    selection_id,
                    price = raw.price,
                    size = raw.size,
                    "Negative size dropped"
                );
                continue;
            }
            levels.push(PriceSize::new(raw.price, raw.size));
        }
        levels
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_full_snapshot() {
        let mut normalizer = BookNormalizer::new();
        let line = r#"{
            "marketId": "1.213",
            "inPlay": false,
            "status": "OPEN",
            "runners": [{
                "selectionId": 101,
                "status": "ACTIVE",
                "lastPriceTraded": 2.5,
                "tradedVolume": [{"price": "2.5", "size": "10.0"}],
                "sp": {"actualSP": 2.6, "backStakeTaken": [{"price": 2.6, "size": 5.0}]}
            }],
            "marketDefinition": {
                "countryCode": "AU",
                "marketType": "WIN",
                "marketName": "R6 1400m Grp1",
                "venue": "Flemington",
                "marketTime": "2021-10-02T04:30:00Z",
                "runners": [{"selectionId": 101, "name": "Fast Horse"}]
            }
        }"#
        .replace('\n', " ");

        let book = normalizer.normalize_line(&line).unwrap();
        assert_eq!(book.market_id, "1.213");
        assert_eq!(book.status, MarketStatus::Open);
        assert!(!book.inplay);
        let runner = book.runner(101).unwrap();
        assert_eq!(runner.status, RunnerStatus::Active);
        assert_eq!(runner.traded_volume, vec![PriceSize::new(2.5, 10.0)]);
        assert_eq!(runner.sp.actual_sp, Some(2.6));
        assert_eq!(book.runner_name(101), Some("Fast Horse"));
        assert_eq!(normalizer.stats().snapshots_parsed, 1);
        assert_eq!(normalizer.stats().parse_errors, 0);
    }

    #[test]
    fn test_malformed_line_counted_and_dropped() {
        let mut normalizer = BookNormalizer::new();
        assert!(normalizer.normalize_line("{not json").is_none());
        assert_eq!(normalizer.stats().lines_read, 1);
        assert_eq!(normalizer.stats().parse_errors, 1);
    }

    #[test]
    fn test_invalid_levels_dropped() {
        let mut normalizer = BookNormalizer::new();
        let line = r#"{"marketId":"1.1","status":"OPEN","runners":[{"selectionId":7,"status":"ACTIVE","tradedVolume":[{"price":0.5,"size":10.0},{"price":2.0,"size":-1.0},{"price":3.0,"size":4.0}]}]}"#;

        let book = normalizer.normalize_line(line).unwrap();
        let runner = book.runner(7).unwrap();
        assert_eq!(runner.traded_volume, vec![PriceSize::new(3.0, 4.0)]);
        assert_eq!(normalizer.stats().invalid_prices_dropped, 1);
        assert_eq!(normalizer.stats().negative_sizes_dropped, 1);
    }

    #[test]
    fn test_missing_optional_fields_default() {
        let mut normalizer = BookNormalizer::new();
        let line = r#"{"market_id":"1.2","status":"CLOSED","runners":[{"id":9,"status":"WINNER"}]}"#;

        let book = normalizer.normalize_line(line).unwrap();
        assert_eq!(book.status, MarketStatus::Closed);
        assert!(book.definition.is_none());
        let runner = book.runner(9).unwrap();
        assert!(runner.last_price_traded.is_none());
        assert!(runner.traded_volume.is_empty());
        assert!(runner.sp.actual_sp.is_none());
    }
}
