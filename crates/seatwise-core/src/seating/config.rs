//! Tunable parameters of the seating engine.
//!
//! Every knob has a default and an environment override:
//!
//! | variable                   | field                          |
//! |----------------------------|--------------------------------|
//! | `SEATWISE_SUBJECT_WEIGHT`  | `weights.subject_adjacency`    |
//! | `SEATWISE_RISK_WEIGHT`     | `weights.high_risk_adjacency`  |
//! | `SEATWISE_HALL_ORDER`      | `hall_order`                   |
//! | `SEATWISE_MAX_MOVES`       | `max_moves`                    |
//! | `SEATWISE_RESTARTS`        | `restarts`                     |
//! | `SEATWISE_TIME_BUDGET_MS`  | `time_budget`                  |

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::hall::HallModel;

/// Cost charged for each pair of adjacent students.
///
/// A layout of at most [`MAX_TOTAL_SEATS`](super::MAX_TOTAL_SEATS) seats has
/// fewer than 40 000 adjacent pairs, so the default subject weight exceeds
/// any achievable total of high-risk costs. Costs saturate at `u64::MAX`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CostWeights {
    /// Cost of two same-subject students sitting side by side.
    pub subject_adjacency: u64,
    /// Cost of two High-risk students sitting side by side.
    pub high_risk_adjacency: u64,
}

impl Default for CostWeights {
    fn default() -> Self {
        Self {
            subject_adjacency: 100_000,
            high_risk_adjacency: 1,
        }
    }
}

/// Order in which halls are filled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HallOrder {
    /// Largest capacity first; equal capacities keep their input order.
    #[default]
    LargestFirst,
    /// Exactly the order the halls were supplied in.
    AsGiven,
}

impl HallOrder {
    /// Return the halls in filling order.
    pub fn arrange<'a>(&self, halls: &'a [HallModel]) -> Vec<&'a HallModel> {
        let mut ordered: Vec<&HallModel> = halls.iter().collect();
        if matches!(self, Self::LargestFirst) {
            // Stable sort keeps input order among equal capacities.
            ordered.sort_by(|a, b| b.capacity().cmp(&a.capacity()));
        }
        ordered
    }
}

impl std::fmt::Display for HallOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::LargestFirst => write!(f, "largest-first"),
            Self::AsGiven => write!(f, "as-given"),
        }
    }
}

impl std::str::FromStr for HallOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "largest-first" => Ok(Self::LargestFirst),
            "as-given" => Ok(Self::AsGiven),
            other => Err(format!(
                "unknown hall order '{other}' (expected largest-first or as-given)"
            )),
        }
    }
}

/// Configuration of a [`SeatingEngine`](super::SeatingEngine).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    pub weights: CostWeights,
    pub hall_order: HallOrder,
    /// Upper bound on swap evaluations across construction repair and
    /// every restart.
    pub max_moves: u64,
    /// Perturbation rounds attempted while conflicts remain.
    pub restarts: u32,
    /// Optional wall-clock limit. Hitting it makes results timing dependent,
    /// so it is off by default.
    pub time_budget: Option<Duration>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            weights: CostWeights::default(),
            hall_order: HallOrder::default(),
            max_moves: 2_000_000,
            restarts: 24,
            time_budget: None,
        }
    }
}

impl EngineConfig {
    /// Defaults overridden by `SEATWISE_*` environment variables.
    ///
    /// Malformed values are logged and ignored.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            weights: CostWeights {
                subject_adjacency: env_or(
                    "SEATWISE_SUBJECT_WEIGHT",
                    defaults.weights.subject_adjacency,
                ),
                high_risk_adjacency: env_or(
                    "SEATWISE_RISK_WEIGHT",
                    defaults.weights.high_risk_adjacency,
                ),
            },
            hall_order: env_or("SEATWISE_HALL_ORDER", defaults.hall_order),
            max_moves: env_or("SEATWISE_MAX_MOVES", defaults.max_moves),
            restarts: env_or("SEATWISE_RESTARTS", defaults.restarts),
            time_budget: std::env::var("SEATWISE_TIME_BUDGET_MS")
                .ok()
                .and_then(|raw| match raw.trim().parse::<u64>() {
                    Ok(ms) => Some(Duration::from_millis(ms)),
                    Err(e) => {
                        warn!(
                            key = "SEATWISE_TIME_BUDGET_MS",
                            value = %raw,
                            error = %e,
                            "ignoring malformed setting"
                        );
                        None
                    }
                })
                .or(defaults.time_budget),
        }
    }

    pub fn with_weights(mut self, weights: CostWeights) -> Self {
        self.weights = weights;
        self
    }

    pub fn with_hall_order(mut self, hall_order: HallOrder) -> Self {
        self.hall_order = hall_order;
        self
    }

    pub fn with_max_moves(mut self, max_moves: u64) -> Self {
        self.max_moves = max_moves;
        self
    }

    pub fn with_restarts(mut self, restarts: u32) -> Self {
        self.restarts = restarts;
        self
    }

    pub fn with_time_budget(mut self, budget: Duration) -> Self {
        self.time_budget = Some(budget);
        self
    }
}

fn env_or<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => match raw.trim().parse::<T>() {
            Ok(value) => value,
            Err(e) => {
                warn!(key = key, value = %raw, error = %e, "ignoring malformed setting");
                default
            }
        },
        Err(_) => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ids::HallId;

    fn hall(id: u64, rows: u32, cols: u32) -> HallModel {
        HallModel::new(HallId(id), format!("H{id}"), rows, cols).unwrap()
    }

    #[test]
    fn test_default_weights_prioritise_subject() {
        let w = CostWeights::default();
        assert!(w.subject_adjacency > w.high_risk_adjacency);
    }

    #[test]
    fn test_largest_first_is_stable() {
        let halls = vec![hall(1, 3, 3), hall(2, 5, 5), hall(3, 3, 3), hall(4, 4, 4)];
        let ids: Vec<u64> = HallOrder::LargestFirst
            .arrange(&halls)
            .iter()
            .map(|h| h.id().0)
            .collect();
        assert_eq!(ids, vec![2, 4, 1, 3]);
    }

    #[test]
    fn test_as_given_keeps_order() {
        let halls = vec![hall(1, 3, 3), hall(2, 5, 5)];
        let ids: Vec<u64> = HallOrder::AsGiven
            .arrange(&halls)
            .iter()
            .map(|h| h.id().0)
            .collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn test_hall_order_parsing() {
        assert_eq!(
            "largest_first".parse::<HallOrder>().unwrap(),
            HallOrder::LargestFirst
        );
        assert_eq!("AS-GIVEN".parse::<HallOrder>().unwrap(), HallOrder::AsGiven);
        assert!("random".parse::<HallOrder>().is_err());
        assert_eq!(HallOrder::AsGiven.to_string(), "as-given");
    }

    #[test]
    fn test_builders() {
        let config = EngineConfig::default()
            .with_max_moves(10)
            .with_restarts(0)
            .with_hall_order(HallOrder::AsGiven)
            .with_time_budget(Duration::from_millis(5));
        assert_eq!(config.max_moves, 10);
        assert_eq!(config.restarts, 0);
        assert_eq!(config.hall_order, HallOrder::AsGiven);
        assert_eq!(config.time_budget, Some(Duration::from_millis(5)));
    }

    const KEYS: [&str; 6] = [
        "SEATWISE_SUBJECT_WEIGHT",
        "SEATWISE_RISK_WEIGHT",
        "SEATWISE_HALL_ORDER",
        "SEATWISE_MAX_MOVES",
        "SEATWISE_RESTARTS",
        "SEATWISE_TIME_BUDGET_MS",
    ];

    fn set_all(values: [&str; 6]) {
        for (key, value) in KEYS.iter().zip(values) {
            std::env::set_var(key, value);
        }
    }

    fn clear_all() {
        for key in KEYS {
            std::env::remove_var(key);
        }
    }

    // The only test in this crate that touches SEATWISE_* variables.
    #[test]
    fn test_from_env_overrides_and_fallbacks() {
        clear_all();
        assert_eq!(EngineConfig::from_env(), EngineConfig::default());

        set_all(["500", " 3 ", "as_given", "1000", "2", "250"]);
        let config = EngineConfig::from_env();
        assert_eq!(
            config.weights,
            CostWeights {
                subject_adjacency: 500,
                high_risk_adjacency: 3,
            }
        );
        assert_eq!(config.hall_order, HallOrder::AsGiven);
        assert_eq!(config.max_moves, 1000);
        assert_eq!(config.restarts, 2);
        assert_eq!(config.time_budget, Some(Duration::from_millis(250)));

        set_all(["heavy", "-1", "random", "1e6", "many", "soon"]);
        let config = EngineConfig::from_env();
        clear_all();
        assert_eq!(config, EngineConfig::default());
    }
}
