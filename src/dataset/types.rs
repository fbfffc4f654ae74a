//! Core row types for the synthetic grid data
//!
//! - `Row`: a single grid row
//! - `Strategy` and `Location`: enum-like classification columns
//! - `Dataset`: an immutable, cheaply cloned sequence of rows

use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// One complete set of rows available at a rotation step.
///
/// Datasets are never mutated after generation, so they are shared as
/// `Arc<[Row]>` and handing one to a frame costs a refcount bump.
pub type Dataset = Arc<[Row]>;

/// A single grid row
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Row {
    /// 1-based identifier, unique within a dataset
    pub id: u32,
    /// Display name of the agent (e.g. "Agent 7")
    pub agent: String,
    /// Trading strategy the agent runs
    pub strategy: Strategy,
    /// Desk location
    pub location: Location,
    /// Risk score in 0..100
    pub risk: u32,
}

impl Row {
    /// Create a new row
    pub fn new(
        id: u32,
        agent: impl Into<String>,
        strategy: Strategy,
        location: Location,
        risk: u32,
    ) -> Self {
        Self {
            id,
            agent: agent.into(),
            strategy,
            location,
            risk,
        }
    }
}

/// Trading strategy column
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    Momentum,
    MeanReversion,
    TrendFollowing,
    StatisticalArbitrage,
    MarketMaking,
}

impl Strategy {
    /// Get all strategies for iteration
    pub fn all() -> &'static [Strategy] {
        &[
            Strategy::Momentum,
            Strategy::MeanReversion,
            Strategy::TrendFollowing,
            Strategy::StatisticalArbitrage,
            Strategy::MarketMaking,
        ]
    }
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Strategy::Momentum => write!(f, "Momentum"),
            Strategy::MeanReversion => write!(f, "Mean Reversion"),
            Strategy::TrendFollowing => write!(f, "Trend Following"),
            Strategy::StatisticalArbitrage => write!(f, "Statistical Arbitrage"),
            Strategy::MarketMaking => write!(f, "Market Making"),
        }
    }
}

/// Desk location column
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Location {
    NewYork,
    London,
    Tokyo,
    Singapore,
    HongKong,
}

impl Location {
    /// Get all locations for iteration
    pub fn all() -> &'static [Location] {
        &[
            Location::NewYork,
            Location::London,
            Location::Tokyo,
            Location::Singapore,
            Location::HongKong,
        ]
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Location::NewYork => write!(f, "New York"),
            Location::London => write!(f, "London"),
            Location::Tokyo => write!(f, "Tokyo"),
            Location::Singapore => write!(f, "Singapore"),
            Location::HongKong => write!(f, "Hong Kong"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_names() {
        assert_eq!(Strategy::StatisticalArbitrage.to_string(), "Statistical Arbitrage");
        assert_eq!(Location::HongKong.to_string(), "Hong Kong");
    }

    #[test]
    fn test_row_serialization() {
        let row = Row::new(1, "Agent 1", Strategy::MeanReversion, Location::NewYork, 42);
        let json = serde_json::to_string(&row).unwrap();
        assert!(json.contains("\"strategy\":\"mean_reversion\""));
        assert!(json.contains("\"location\":\"new_york\""));

        let parsed: Row = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, row);
    }
}
