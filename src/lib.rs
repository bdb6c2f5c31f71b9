//! Betfair Historic Data Library
//!
//! Exposes the historic price-file reduction pipeline for use by the
//! `prices_to_csv` binary and integration tests.

pub mod histdata;
