//! Per-affiliate commission terms.

use crate::domain::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// How the FTD component counts its units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FtdCounting {
    /// Each current-window record is one unit, whatever its `ftds` field says.
    #[default]
    Records,
    /// Sum the per-record `ftds` field.
    FtdField,
}

impl FtdCounting {
    pub fn as_str(&self) -> &'static str {
        match self {
            FtdCounting::Records => "records",
            FtdCounting::FtdField => "ftdField",
        }
    }
}

impl FromStr for FtdCounting {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "records" => Ok(FtdCounting::Records),
            "ftdField" => Ok(FtdCounting::FtdField),
            other => Err(format!("must be records or ftdField, got {}", other)),
        }
    }
}

/// Commission plan for one affiliate.
///
/// The three components are independent and additive. A rate of zero is
/// treated the same as an absent rate.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommissionPlanConfig {
    /// Fixed payout per FTD unit.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ftd_rate: Option<Decimal>,
    /// Sum the `cpa` field of matched records.
    #[serde(default)]
    pub cpa_enabled: bool,
    /// Fractional revenue-share multiplier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rev_rate: Option<Decimal>,
    #[serde(default)]
    pub ftd_counting: FtdCounting,
}

impl CommissionPlanConfig {
    /// FTD rate, if set to something other than zero.
    pub fn active_ftd_rate(&self) -> Option<Decimal> {
        self.ftd_rate.filter(|r| !r.is_zero())
    }

    /// Revenue-share rate, if set to something other than zero.
    pub fn active_rev_rate(&self) -> Option<Decimal> {
        self.rev_rate.filter(|r| !r.is_zero())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_camel_case_with_defaults() {
        let plan: CommissionPlanConfig =
            serde_json::from_str(r#"{"ftdRate": 30, "revRate": 0.05}"#).unwrap();
        assert_eq!(plan.ftd_rate, Some(Decimal::from_str_canonical("30").unwrap()));
        assert_eq!(plan.rev_rate, Some(Decimal::from_str_canonical("0.05").unwrap()));
        assert!(!plan.cpa_enabled);
        assert_eq!(plan.ftd_counting, FtdCounting::Records);
    }

    #[test]
    fn zero_rates_are_inactive() {
        let plan = CommissionPlanConfig {
            ftd_rate: Some(Decimal::zero()),
            rev_rate: Some(Decimal::zero()),
            ..Default::default()
        };
        assert!(plan.active_ftd_rate().is_none());
        assert!(plan.active_rev_rate().is_none());
    }

    #[test]
    fn ftd_counting_string_forms() {
        assert_eq!("records".parse::<FtdCounting>().unwrap(), FtdCounting::Records);
        assert_eq!("ftdField".parse::<FtdCounting>().unwrap(), FtdCounting::FtdField);
        assert!("bogus".parse::<FtdCounting>().is_err());
        assert_eq!(FtdCounting::FtdField.as_str(), "ftdField");
    }
}
