//! Planner configuration

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};

use crate::types::*;

/// Numeric policy shared by split computation and settlement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SettlementPolicy {
    /// Balances within this distance of zero count as settled
    pub tolerance: BigDecimal,
    /// Decimal places money is rounded to
    pub scale: i64,
}

impl Default for SettlementPolicy {
    fn default() -> Self {
        Self {
            tolerance: BigDecimal::from(1) / BigDecimal::from(100),
            scale: 2,
        }
    }
}

impl SettlementPolicy {
    pub fn validate(&self) -> PlanResult<()> {
        if self.tolerance <= BigDecimal::from(0) {
            return Err(PlanError::Validation(
                "Settlement tolerance must be positive".to_string(),
            ));
        }
        if self.scale < 0 {
            return Err(PlanError::Validation(
                "Settlement scale cannot be negative".to_string(),
            ));
        }
        Ok(())
    }
}

/// Top-level configuration for a [`crate::Planner`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    pub settlement: SettlementPolicy,
    /// How many plans the hall of fame lists
    pub hall_of_fame_size: usize,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            settlement: SettlementPolicy::default(),
            hall_of_fame_size: 5,
        }
    }
}

impl PlannerConfig {
    /// Parse a JSON document; absent fields fall back to defaults
    pub fn from_json_str(json: &str) -> PlanResult<Self> {
        let config: PlannerConfig = serde_json::from_str(json)
            .map_err(|e| PlanError::Validation(format!("Invalid planner config: {e}")))?;
        config.settlement.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_defaults_match_compatibility_constants() {
        let config = PlannerConfig::default();
        assert_eq!(
            config.settlement.tolerance,
            BigDecimal::from_str("0.01").unwrap()
        );
        assert_eq!(config.settlement.scale, 2);
        assert_eq!(config.hall_of_fame_size, 5);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = PlannerConfig::from_json_str(r#"{"hall_of_fame_size": 3}"#).unwrap();
        assert_eq!(config.hall_of_fame_size, 3);
        assert_eq!(config.settlement, SettlementPolicy::default());
    }

    #[test]
    fn test_rejects_bad_policy() {
        let result = PlannerConfig::from_json_str(r#"{"settlement": {"tolerance": "0"}}"#);
        assert!(matches!(result, Err(PlanError::Validation(_))));

        let result = PlannerConfig::from_json_str(r#"{"settlement": {"scale": -1}}"#);
        assert!(matches!(result, Err(PlanError::Validation(_))));

        assert!(PlannerConfig::from_json_str("not json").is_err());
    }
}
