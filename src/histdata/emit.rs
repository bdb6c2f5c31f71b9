//! Record Emitter
//!
//! The fixed 19-column output schema and the rendering rules for optional
//! decimals: exactly two fractional digits when present, empty string when
//! absent. Absent is distinct from zero — an empty field signals "no trade
//! data" or "not applicable", never an observed zero.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// CSV column order. Written explicitly so that a run producing zero rows
/// still emits a header line.
pub const CSV_HEADER: [&str; 19] = [
    "market_id",
    "event_date",
    "country",
    "track",
    "market_name",
    "selection_id",
    "selection_name",
    "result",
    "bsp",
    "pp_min",
    "pp_max",
    "pp_wap",
    "pp_ltp",
    "pp_volume",
    "ip_min",
    "ip_max",
    "ip_wap",
    "ip_ltp",
    "ip_volume",
];

/// One output row per runner per market. Field order matches the CSV
/// column order; `csv::Writer` derives the header from the field names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutputRow {
    pub market_id: String,
    pub event_date: String,
    pub country: String,
    pub track: String,
    pub market_name: String,
    pub selection_id: u64,
    pub selection_name: String,
    pub result: String,
    pub bsp: String,
    pub pp_min: String,
    pub pp_max: String,
    pub pp_wap: String,
    pub pp_ltp: String,
    pub pp_volume: String,
    pub ip_min: String,
    pub ip_max: String,
    pub ip_wap: String,
    pub ip_ltp: String,
    pub ip_volume: String,
}

/// Render an optional decimal: `%.2f` when present, empty when absent.
pub fn fmt_opt_decimal(value: Option<f64>) -> String {
    value.map(fmt_decimal).unwrap_or_default()
}

/// Render a present decimal with exactly two fractional digits.
pub fn fmt_decimal(value: f64) -> String {
    format!("{value:.2}")
}

/// Render the event date column (`YYYY-MM-DD HH:MM:SS` UTC).
pub fn fmt_event_date(time: DateTime<Utc>) -> String {
    time.format("%Y-%m-%d %H:%M:%S").to_string()
}
