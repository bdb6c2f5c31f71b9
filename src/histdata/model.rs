//! Canonical Market-State Model
//!
//! Snapshot types for one exchange market as captured at a point in time.
//! Fields are cumulative up to that point; the reducer never mutates a
//! snapshot once produced by the source.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Price in the exchange's native decimal-odds format (>= 1.01).
pub type Price = f64;

/// Size/volume in account currency.
pub type Size = f64;

/// Runner (selection) identifier.
pub type SelectionId = u64;

/// Volume traded at a single price level. Prices are distinct within one
/// runner's distribution.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceSize {
    pub price: Price,
    pub size: Size,
}

impl PriceSize {
    #[inline]
    pub fn new(price: Price, size: Size) -> Self {
        Self { price, size }
    }
}

/// Market lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MarketStatus {
    Inactive,
    Open,
    Suspended,
    Closed,
}

/// Runner status, including settled results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RunnerStatus {
    Active,
    Winner,
    Loser,
    Placed,
    Removed,
    RemovedVacant,
    Hidden,
}

impl RunnerStatus {
    /// Wire-format name, used verbatim in the output `result` column.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "ACTIVE",
            Self::Winner => "WINNER",
            Self::Loser => "LOSER",
            Self::Placed => "PLACED",
            Self::Removed => "REMOVED",
            Self::RemovedVacant => "REMOVED_VACANT",
            Self::Hidden => "HIDDEN",
        }
    }
}

/// Starting-price (BSP) block for one runner.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StartingPrice {
    /// Official settlement price, defined once the market reconciles.
    pub actual_sp: Option<Price>,
    /// Back stakes taken into the SP pool.
    pub back_stake_taken: Vec<PriceSize>,
    /// Lay liabilities taken into the SP pool.
    pub lay_liability_taken: Vec<PriceSize>,
}

/// One runner's view within a market snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunnerBook {
    pub selection_id: SelectionId,
    pub status: RunnerStatus,
    pub last_price_traded: Option<Price>,
    /// Cumulative traded volume by price level.
    pub traded_volume: Vec<PriceSize>,
    pub sp: StartingPrice,
}

/// Identity entry from the market definition's runner list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunnerDefinition {
    pub selection_id: SelectionId,
    pub name: Option<String>,
}

/// Market definition metadata. Carried by snapshots that include it; the
/// scanner evaluates eligibility on the first snapshot where it is present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketDefinition {
    pub country_code: String,
    pub market_type: String,
    /// Race name, e.g. `R6 1400m Grp1`.
    pub name: String,
    pub venue: String,
    pub market_time: DateTime<Utc>,
    pub runners: Vec<RunnerDefinition>,
}

/// One market snapshot: full market state at a point in the sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketBook {
    pub market_id: String,
    pub inplay: bool,
    pub status: MarketStatus,
    /// Iteration order is arrival order; lookup is by selection id.
    pub runners: Vec<RunnerBook>,
    pub definition: Option<MarketDefinition>,
}

impl MarketBook {
    /// Find a runner's book by selection id.
    pub fn runner(&self, selection_id: SelectionId) -> Option<&RunnerBook> {
        self.runners.iter().find(|r| r.selection_id == selection_id)
    }

    /// Find a runner's name in the definition-level runner list.
    pub fn runner_name(&self, selection_id: SelectionId) -> Option<&str> {
        self.definition.as_ref().and_then(|d| {
            d.runners
                .iter()
                .find(|r| r.selection_id == selection_id)
                .and_then(|r| r.name.as_deref())
        })
    }
}
