//! Edge weight to traversal cost transforms

use super::types::AnalysisError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Default floor for zero costs and divisor guard
pub const DEFAULT_EPSILON: f64 = 1e-6;

/// How a similarity weight becomes a non-negative traversal cost
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CostMode {
    /// `1 / w`, or `1 / ε` when `w <= 0`
    #[default]
    #[serde(alias = "inv")]
    Inverse,
    /// `1 - clamp(w, 0, 1)`, floored to `ε` when exactly 0
    #[serde(alias = "1minus")]
    OneMinus,
    /// 1.0 for every edge
    Unit,
}

impl CostMode {
    /// Cost of an edge of weight `weight`
    ///
    /// Non-finite weights are read as 1.0. An `epsilon` that is not a finite
    /// positive number is replaced by [`DEFAULT_EPSILON`].
    pub fn cost(&self, weight: f64, epsilon: f64) -> f64 {
        let w = if weight.is_finite() { weight } else { 1.0 };
        let epsilon = sanitize_epsilon(epsilon);
        match self {
            CostMode::Inverse => {
                if w > 0.0 {
                    1.0 / w
                } else {
                    1.0 / epsilon
                }
            }
            CostMode::OneMinus => {
                let c = 1.0 - w.clamp(0.0, 1.0);
                if c == 0.0 {
                    epsilon
                } else {
                    c
                }
            }
            CostMode::Unit => 1.0,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CostMode::Inverse => "inverse",
            CostMode::OneMinus => "one_minus",
            CostMode::Unit => "unit",
        }
    }
}

/// `epsilon` when finite and positive, otherwise [`DEFAULT_EPSILON`]
pub fn sanitize_epsilon(epsilon: f64) -> f64 {
    if epsilon.is_finite() && epsilon > 0.0 {
        epsilon
    } else {
        DEFAULT_EPSILON
    }
}

impl FromStr for CostMode {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "inverse" | "inv" => Ok(CostMode::Inverse),
            "one_minus" | "1minus" | "one-minus" => Ok(CostMode::OneMinus),
            "unit" => Ok(CostMode::Unit),
            other => Err(AnalysisError::InvalidCostMode(other.to_string())),
        }
    }
}

impl fmt::Display for CostMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = DEFAULT_EPSILON;

    #[test]
    fn inverse_cost() {
        assert_eq!(CostMode::Inverse.cost(0.5, EPS), 2.0);
        assert_eq!(CostMode::Inverse.cost(0.0, EPS), 1.0 / EPS);
        assert!(CostMode::Inverse.cost(-3.0, EPS).is_finite());
    }

    #[test]
    fn one_minus_clamps_then_floors() {
        assert_eq!(CostMode::OneMinus.cost(1.0, EPS), EPS);
        assert_eq!(CostMode::OneMinus.cost(1.5, EPS), EPS);
        assert_eq!(CostMode::OneMinus.cost(-1.0, EPS), 1.0);
        assert!((CostMode::OneMinus.cost(0.25, EPS) - 0.75).abs() < 1e-12);
    }

    #[test]
    fn unit_and_missing_weights() {
        assert_eq!(CostMode::Unit.cost(0.01, EPS), 1.0);
        assert_eq!(CostMode::Inverse.cost(f64::NAN, EPS), 1.0);
    }

    #[test]
    fn bad_epsilon_never_yields_negative_cost() {
        for eps in [0.0, -0.5, f64::NAN, f64::INFINITY] {
            assert_eq!(CostMode::OneMinus.cost(1.0, eps), DEFAULT_EPSILON);
            assert_eq!(CostMode::Inverse.cost(0.0, eps), 1.0 / DEFAULT_EPSILON);
        }
        assert_eq!(sanitize_epsilon(0.01), 0.01);
    }

    #[test]
    fn parse_aliases() {
        assert_eq!("inv".parse::<CostMode>().unwrap(), CostMode::Inverse);
        assert_eq!("1minus".parse::<CostMode>().unwrap(), CostMode::OneMinus);
        assert_eq!(" Unit ".parse::<CostMode>().unwrap(), CostMode::Unit);
        assert!(matches!(
            "log".parse::<CostMode>(),
            Err(AnalysisError::InvalidCostMode(m)) if m == "log"
        ));
    }

    #[test]
    fn serde_names() {
        assert_eq!(serde_json::to_string(&CostMode::OneMinus).unwrap(), "\"one_minus\"");
        let mode: CostMode = serde_json::from_str("\"inv\"").unwrap();
        assert_eq!(mode, CostMode::Inverse);
    }
}
