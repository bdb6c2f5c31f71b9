//! Market Eligibility Filter
//!
//! Decides once per market whether a market participates in the output at
//! all: country code, market type, and race category derived from the
//! market name (harness races — trot/pace — are excluded).

use crate::histdata::model::MarketDefinition;

/// Eligibility predicate configuration.
#[derive(Debug, Clone)]
pub struct EligibilityConfig {
    /// Required country code, e.g. `AU`.
    pub country_code: String,
    /// Required market type, e.g. `WIN`.
    pub market_type: String,
    /// Race-category tokens to exclude (lowercased), e.g. trot/pace.
    pub excluded_race_types: Vec<String>,
}

impl Default for EligibilityConfig {
    fn default() -> Self {
        Self {
            country_code: "AU".into(),
            market_type: "WIN".into(),
            excluded_race_types: vec!["trot".into(), "pace".into()],
        }
    }
}

impl EligibilityConfig {
    /// Evaluate the predicate against a market definition.
    ///
    /// Market names with fewer than three space-separated tokens cannot be
    /// categorized and make the market ineligible.
    pub fn is_eligible(&self, definition: &MarketDefinition) -> bool {
        if definition.country_code != self.country_code
            || definition.market_type != self.market_type
        {
            return false;
        }
        match split_race_name(&definition.name) {
            Some((_, _, race_type)) => !self
                .excluded_race_types
                .iter()
                .any(|excluded| excluded == &race_type),
            None => false,
        }
    }
}

/// Split an ANZ race market name into (race number, distance, race type).
///
/// Input samples:
/// - `R6 1400m Grp1`   -> `("R6", "1400m", "grp1")`
/// - `R1 1609m Trot M` -> `("R1", "1609m", "trot")`
/// - `R4 1660m Pace M` -> `("R4", "1660m", "pace")`
///
/// Returns `None` for names with fewer than three tokens.
pub fn split_race_name(name: &str) -> Option<(&str, &str, String)> {
    let mut parts = name.split(' ');
    let race_no = parts.next()?;
    let race_len = parts.next()?;
    let race_type = parts.next()?.to_lowercase();
    Some((race_no, race_len, race_type))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn definition(country: &str, market_type: &str, name: &str) -> MarketDefinition {
        MarketDefinition {
            country_code: country.into(),
            market_type: market_type.into(),
            name: name.into(),
            venue: "Flemington".into(),
            market_time: Utc::now(),
            runners: vec![],
        }
    }

    #[test]
    fn test_split_race_name() {
        assert_eq!(
            split_race_name("R6 1400m Grp1"),
            Some(("R6", "1400m", "grp1".into()))
        );
        assert_eq!(
            split_race_name("R1 1609m Trot M"),
            Some(("R1", "1609m", "trot".into()))
        );
        assert_eq!(split_race_name("R1 1609m"), None);
    }

    #[test]
    fn test_eligible_thoroughbred_win_market() {
        let cfg = EligibilityConfig::default();
        assert!(cfg.is_eligible(&definition("AU", "WIN", "R6 1400m Grp1")));
    }

    #[test]
    fn test_wrong_country_or_type_rejected() {
        let cfg = EligibilityConfig::default();
        assert!(!cfg.is_eligible(&definition("GB", "WIN", "R6 1400m Grp1")));
        assert!(!cfg.is_eligible(&definition("AU", "PLACE", "R6 1400m Grp1")));
    }

    #[test]
    fn test_harness_races_rejected() {
        let cfg = EligibilityConfig::default();
        assert!(!cfg.is_eligible(&definition("AU", "WIN", "R1 1609m Trot M")));
        assert!(!cfg.is_eligible(&definition("AU", "WIN", "R4 1660m Pace M")));
    }

    #[test]
    fn test_short_market_name_rejected() {
        let cfg = EligibilityConfig::default();
        assert!(!cfg.is_eligible(&definition("AU", "WIN", "R6 1400m")));
        assert!(!cfg.is_eligible(&definition("AU", "WIN", "")));
    }
}
