//! Typed rows for each reference table

use crate::profile::PolicyType;
use serde::{Deserialize, Serialize};

/// Which policy types a loading or discount row applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleScope {
    /// `both` in the source tables
    Both,
    Policy(PolicyType),
    /// A scope we could not interpret; never applies
    Unrecognized,
}

impl RuleScope {
    pub fn parse(text: &str) -> Self {
        let text = text.trim();
        if text.eq_ignore_ascii_case("both") || text.eq_ignore_ascii_case("any") {
            return RuleScope::Both;
        }
        text.parse().map(RuleScope::Policy).unwrap_or(RuleScope::Unrecognized)
    }

    /// Whether a row with this scope applies to a product of `policy_type`
    pub fn covers(&self, policy_type: PolicyType) -> bool {
        match self {
            RuleScope::Both => true,
            RuleScope::Policy(scope) => *scope == policy_type,
            RuleScope::Unrecognized => false,
        }
    }
}

/// City tier, where `Any` means no tier-based adjustment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CityTier {
    Any,
    Tier(String),
}

impl CityTier {
    pub fn parse(text: &str) -> Self {
        let text = text.trim();
        if text.is_empty() || text.eq_ignore_ascii_case("any") {
            CityTier::Any
        } else {
            CityTier::Tier(text.to_string())
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            CityTier::Any => "any",
            CityTier::Tier(tier) => tier,
        }
    }

    /// Whether a rate row keyed on `self` prices an applicant in `applicant`
    pub fn admits(&self, applicant: &CityTier) -> bool {
        match self {
            CityTier::Any => true,
            tier => tier == applicant,
        }
    }
}

/// Profile attribute a loading row is keyed on
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadingDimension {
    Smoker,
    BmiBucket,
    OccupationRisk,
    CityTier,
    Other(String),
}

impl LoadingDimension {
    pub fn parse(text: &str) -> Self {
        match text.trim().to_ascii_lowercase().as_str() {
            "smoker" => LoadingDimension::Smoker,
            "bmi_bucket" => LoadingDimension::BmiBucket,
            "occupation_risk" => LoadingDimension::OccupationRisk,
            "city_tier" => LoadingDimension::CityTier,
            other => LoadingDimension::Other(other.to_string()),
        }
    }
}

/// Add-on availability: every product, or one product id
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AddOnScope {
    Any,
    Product(String),
}

impl AddOnScope {
    pub fn parse(text: &str) -> Self {
        let text = text.trim();
        if text.is_empty() || text.eq_ignore_ascii_case("any") {
            AddOnScope::Any
        } else {
            AddOnScope::Product(text.to_string())
        }
    }

    pub fn includes(&self, product_id: &str) -> bool {
        match self {
            AddOnScope::Any => true,
            AddOnScope::Product(id) => id == product_id,
        }
    }
}

/// A plan in the catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub product_id: String,
    pub product_name: String,
    pub insurer_name: String,
    /// `None` when the catalog names a type we do not quote
    pub policy_type: Option<PolicyType>,
    pub min_age: u32,
    pub max_age: u32,
    pub family_allowed: bool,
    /// Coverage amounts offered, ascending
    pub sum_assured_steps: Vec<u64>,
    pub term_options_years: Vec<u32>,
    pub room_rent_limit: Option<String>,
    pub copay_percent: Option<f64>,
    pub pre_existing_wait_months: Option<u32>,
    pub disease_specific_wait_months: Option<u32>,
    pub maternity_cover: bool,
    pub outpatient_cover: bool,
    pub notes: String,
}

/// Baseline health premium for one product, age band, coverage and city tier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthRate {
    pub product_id: String,
    pub age_band_min: u32,
    pub age_band_max: u32,
    pub smoker: bool,
    pub bmi_bucket: String,
    pub city_tier: CityTier,
    pub sum_assured: u64,
    pub base_premium_annual: f64,
}

/// Baseline life premium for one product, age band, coverage and term
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LifeRate {
    pub product_id: String,
    pub age_band_min: u32,
    pub age_band_max: u32,
    pub smoker: bool,
    pub sum_assured: u64,
    pub term_years: u32,
    pub base_premium_annual: f64,
}

/// `[min_bmi, max_bmi)` mapped to a bucket name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BmiBucketRow {
    pub bucket: String,
    pub min_bmi: f64,
    pub max_bmi: f64,
}

impl BmiBucketRow {
    pub fn contains(&self, bmi: f64) -> bool {
        bmi >= self.min_bmi && bmi < self.max_bmi
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadingRule {
    pub rule_name: String,
    pub dimension: LoadingDimension,
    pub match_value: String,
    pub loading_percent: f64,
    pub apply_to: RuleScope,
    pub notes: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscountRule {
    pub rule_name: String,
    pub discount_percent: f64,
    pub apply_to: RuleScope,
    pub constraints: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FamilyMultiplier {
    pub family_size: u32,
    pub multiplier: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionRow {
    pub condition_code: String,
    pub name: String,
    pub default_loading_percent: f64,
    pub default_wait_months: Option<u32>,
    pub suggested_docs: String,
    pub recommended_metrics: String,
    pub severity: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OccupationRiskRow {
    pub occupation_category: String,
    pub risk_level: String,
    pub loading_percent: f64,
    pub notes: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CityTierRow {
    pub city: String,
    pub state_ut: String,
    pub tier: CityTier,
}

/// Optional rider sold alongside a plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddOn {
    pub addon_id: String,
    pub name: String,
    pub applies_to: AddOnScope,
    pub price_annual: f64,
    pub description: String,
    pub default_recommended: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_scope() {
        assert_eq!(RuleScope::parse("both"), RuleScope::Both);
        assert_eq!(RuleScope::parse("health"), RuleScope::Policy(PolicyType::Health));
        assert_eq!(RuleScope::parse("motor"), RuleScope::Unrecognized);

        assert!(RuleScope::Both.covers(PolicyType::Life));
        assert!(RuleScope::Policy(PolicyType::Health).covers(PolicyType::Health));
        assert!(!RuleScope::Policy(PolicyType::Health).covers(PolicyType::FamilyFloater));
        assert!(!RuleScope::Unrecognized.covers(PolicyType::Health));
    }

    #[test]
    fn test_city_tier_wildcard() {
        let tier1 = CityTier::parse("1");
        assert!(CityTier::Any.admits(&tier1));
        assert!(CityTier::Any.admits(&CityTier::Any));
        assert!(tier1.admits(&CityTier::Tier("1".into())));
        assert!(!tier1.admits(&CityTier::Any));
        assert_eq!(CityTier::parse(" ANY "), CityTier::Any);
    }

    #[test]
    fn test_bmi_bucket_is_half_open() {
        let row = BmiBucketRow { bucket: "normal".into(), min_bmi: 18.5, max_bmi: 25.0 };
        assert!(row.contains(18.5));
        assert!(row.contains(24.99));
        assert!(!row.contains(25.0));
    }

    #[test]
    fn test_addon_scope() {
        assert!(AddOnScope::parse("any").includes("X"));
        assert!(AddOnScope::parse("HDFC_HEALTH_PLUS").includes("HDFC_HEALTH_PLUS"));
        assert!(!AddOnScope::parse("HDFC_HEALTH_PLUS").includes("HDFC_HEALTH_BASIC"));
    }
}
