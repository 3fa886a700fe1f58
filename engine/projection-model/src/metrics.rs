//! Per-sport metric catalog
//!
//! The catalog is a static table: which metric names a projection may use for
//! each sport, in the order they are offered to users.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::types::Sport;

/// Every metric a projection can track
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Metric {
    // MLB batting
    Hits,
    HomeRuns,
    Rbi,
    Runs,
    TotalBases,
    StolenBases,

    // NBA box score
    Points,
    Rebounds,
    Assists,
    /// Points + rebounds + assists
    Pra,
    Blocks,
    Steals,
    ThreePointersMade,
}

const MLB_METRICS: [Metric; 6] = [
    Metric::Hits,
    Metric::HomeRuns,
    Metric::Rbi,
    Metric::Runs,
    Metric::TotalBases,
    Metric::StolenBases,
];

const NBA_METRICS: [Metric; 7] = [
    Metric::Points,
    Metric::Rebounds,
    Metric::Assists,
    Metric::Pra,
    Metric::Blocks,
    Metric::Steals,
    Metric::ThreePointersMade,
];

impl Metric {
    /// Name shown to users and stored on projections
    pub fn display_name(&self) -> &'static str {
        match self {
            Metric::Hits => "hits",
            Metric::HomeRuns => "homeruns",
            Metric::Rbi => "RBI",
            Metric::Runs => "runs",
            Metric::TotalBases => "Total Bases",
            Metric::StolenBases => "stolen bases",
            Metric::Points => "points",
            Metric::Rebounds => "rebounds",
            Metric::Assists => "assist",
            Metric::Pra => "PRA",
            Metric::Blocks => "blocks",
            Metric::Steals => "steals",
            Metric::ThreePointersMade => "3pt made",
        }
    }

    /// Alternative spellings accepted on input
    fn aliases(&self) -> &'static [&'static str] {
        match self {
            Metric::HomeRuns => &["home runs", "hr"],
            Metric::Rbi => &["rbis", "runs batted in"],
            Metric::TotalBases => &["tb"],
            Metric::StolenBases => &["sb"],
            Metric::Points => &["pts"],
            Metric::Rebounds => &["reb"],
            Metric::Assists => &["assists", "ast"],
            Metric::Pra => &["pts+reb+ast", "points+rebounds+assists"],
            Metric::ThreePointersMade => &["3pm", "3-pointers made", "threes"],
            _ => &[],
        }
    }

    /// Whether the value is derived from more than one raw field
    pub fn is_composite(&self) -> bool {
        matches!(self, Metric::Pra)
    }

    /// Sport this metric belongs to
    pub fn sport(&self) -> Sport {
        if MLB_METRICS.contains(self) {
            Sport::Mlb
        } else {
            Sport::Nba
        }
    }

    fn matches_name(&self, normalized: &str) -> bool {
        self.display_name().to_lowercase() == normalized
            || self.aliases().iter().any(|alias| *alias == normalized)
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Static mapping from sport to its allowed metrics
#[derive(Debug, Clone, Copy, Default)]
pub struct MetricCatalog;

impl MetricCatalog {
    pub fn new() -> Self {
        Self
    }

    /// Allowed metrics for a sport, in display order
    pub fn metrics(&self, sport: Sport) -> &'static [Metric] {
        match sport {
            Sport::Mlb => &MLB_METRICS,
            Sport::Nba => &NBA_METRICS,
        }
    }

    /// Allowed metric display names for a sport
    pub fn names(&self, sport: Sport) -> Vec<&'static str> {
        self.metrics(sport).iter().map(Metric::display_name).collect()
    }

    /// Resolve a metric name for a sport, case-insensitively.
    ///
    /// Returns `None` for names outside the sport's catalog, including
    /// metrics that only exist for the other sport.
    pub fn lookup(&self, sport: Sport, name: &str) -> Option<Metric> {
        let normalized = name.trim().to_lowercase();
        if normalized.is_empty() {
            return None;
        }

        self.metrics(sport).iter().copied().find(|metric| metric.matches_name(&normalized))
    }

    /// Whether a metric name is in the sport's catalog
    pub fn contains(&self, sport: Sport, name: &str) -> bool {
        self.lookup(sport, name).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_order() {
        let catalog = MetricCatalog::new();

        assert_eq!(
            catalog.names(Sport::Mlb),
            vec!["hits", "homeruns", "RBI", "runs", "Total Bases", "stolen bases"]
        );
        assert_eq!(
            catalog.names(Sport::Nba),
            vec!["points", "rebounds", "assist", "PRA", "blocks", "steals", "3pt made"]
        );
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let catalog = MetricCatalog::new();

        assert_eq!(catalog.lookup(Sport::Mlb, "Hits"), Some(Metric::Hits));
        assert_eq!(catalog.lookup(Sport::Mlb, "rbi"), Some(Metric::Rbi));
        assert_eq!(catalog.lookup(Sport::Mlb, " total bases "), Some(Metric::TotalBases));
        assert_eq!(catalog.lookup(Sport::Nba, "pra"), Some(Metric::Pra));
        assert_eq!(catalog.lookup(Sport::Nba, "3PM"), Some(Metric::ThreePointersMade));
    }

    #[test]
    fn test_lookup_rejects_other_sport_and_unknown() {
        let catalog = MetricCatalog::new();

        assert_eq!(catalog.lookup(Sport::Mlb, "points"), None);
        assert_eq!(catalog.lookup(Sport::Nba, "hits"), None);
        assert_eq!(catalog.lookup(Sport::Nba, "turnovers"), None);
        assert_eq!(catalog.lookup(Sport::Nba, ""), None);
    }

    #[test]
    fn test_metric_sport_and_composite() {
        assert_eq!(Metric::StolenBases.sport(), Sport::Mlb);
        assert_eq!(Metric::Steals.sport(), Sport::Nba);
        assert!(Metric::Pra.is_composite());
        assert!(!Metric::Points.is_composite());
    }
}
