//! Reference tables: product catalog, base rates, loadings, discounts and lookups
//!
//! The bundle is immutable once built. It is produced either from the
//! built-in dataset or by [`loader`] from a directory of CSV files, and
//! shared between quoting calls through a [`TableSource`].

pub mod coerce;
mod defaults;
pub mod loader;
mod records;
mod source;
mod validate;

pub use loader::{load_from, load_or_default, tables_dir_from_env, DEFAULT_TABLES_PATH, TABLES_DIR_ENV};
pub use records::{
    AddOn, AddOnScope, BmiBucketRow, CityTier, CityTierRow, ConditionRow, DiscountRule,
    FamilyMultiplier, HealthRate, LifeRate, LoadingDimension, LoadingRule, OccupationRiskRow,
    Product, RuleScope,
};
pub use source::TableSource;
pub use validate::TableIssue;

use crate::profile::PolicyType;
use serde::{Deserialize, Serialize};

/// Name of the UPI autopay discount row
pub const AUTOPAY_DISCOUNT: &str = "autopay_upi";

/// Name of the annual payment discount row
pub const ANNUAL_PAYMENT_DISCOUNT: &str = "annual_payment";

/// Every table the rating engine reads
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableBundle {
    pub products: Vec<Product>,
    pub rates_health: Vec<HealthRate>,
    pub rates_life: Vec<LifeRate>,
    pub bmi_buckets: Vec<BmiBucketRow>,
    pub loadings: Vec<LoadingRule>,
    pub discounts: Vec<DiscountRule>,
    pub family_multipliers: Vec<FamilyMultiplier>,
    pub conditions: Vec<ConditionRow>,
    pub occupation_risk: Vec<OccupationRiskRow>,
    pub city_tier: Vec<CityTierRow>,
    /// `None` when the source carries no add-on table at all
    pub addons: Option<Vec<AddOn>>,
}

impl TableBundle {
    /// The complete built-in dataset used when no table source is reachable
    pub fn default_bundle() -> Self {
        defaults::default_bundle()
    }

    pub fn product(&self, product_id: &str) -> Option<&Product> {
        self.products.iter().find(|p| p.product_id == product_id)
    }

    /// Loading percentage of the first row matching dimension, value and scope; 0 if none
    pub fn loading_percent(&self, dimension: &LoadingDimension, value: &str, policy_type: PolicyType) -> f64 {
        self.loadings
            .iter()
            .find(|r| &r.dimension == dimension && r.match_value == value && r.apply_to.covers(policy_type))
            .map(|r| r.loading_percent)
            .unwrap_or(0.0)
    }

    /// Percentage of the named discount row; 0 if the row is missing
    pub fn discount_percent(&self, rule_name: &str) -> f64 {
        self.discounts
            .iter()
            .find(|r| r.rule_name == rule_name)
            .map(|r| r.discount_percent)
            .unwrap_or(0.0)
    }

    /// Multiplier for an exact family size. Rows with a non-positive multiplier are ignored.
    pub fn family_multiplier(&self, family_size: u32) -> Option<f64> {
        self.family_multipliers
            .iter()
            .find(|r| r.family_size == family_size && r.multiplier > 0.0)
            .map(|r| r.multiplier)
    }

    pub fn condition(&self, condition_code: &str) -> Option<&ConditionRow> {
        self.conditions.iter().find(|r| r.condition_code == condition_code)
    }

    /// Row count per table, in a fixed order, for summaries
    pub fn table_sizes(&self) -> Vec<(&'static str, usize)> {
        vec![
            ("products", self.products.len()),
            ("rates_health", self.rates_health.len()),
            ("rates_life", self.rates_life.len()),
            ("bmi_buckets", self.bmi_buckets.len()),
            ("loadings", self.loadings.len()),
            ("discounts", self.discounts.len()),
            ("family_multipliers", self.family_multipliers.len()),
            ("conditions", self.conditions.len()),
            ("occupation_risk", self.occupation_risk.len()),
            ("city_tier", self.city_tier.len()),
            ("addons", self.addons.as_ref().map_or(0, Vec::len)),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loading_lookup_respects_scope() {
        let tables = TableBundle::default_bundle();

        assert_eq!(tables.loading_percent(&LoadingDimension::Smoker, "Y", PolicyType::Life), 25.0);
        assert_eq!(tables.loading_percent(&LoadingDimension::BmiBucket, "over", PolicyType::Health), 10.0);
        // Overweight loading is scoped to health products only
        assert_eq!(tables.loading_percent(&LoadingDimension::BmiBucket, "over", PolicyType::Life), 0.0);
        assert_eq!(tables.loading_percent(&LoadingDimension::OccupationRisk, "low", PolicyType::Health), 0.0);
    }

    #[test]
    fn test_discount_and_multiplier_lookups() {
        let tables = TableBundle::default_bundle();
        assert_eq!(tables.discount_percent(AUTOPAY_DISCOUNT), 5.0);
        assert_eq!(tables.discount_percent(ANNUAL_PAYMENT_DISCOUNT), 8.0);
        assert_eq!(tables.discount_percent("loyalty"), 0.0);

        assert_eq!(tables.family_multiplier(3), Some(2.3));
        assert_eq!(tables.family_multiplier(9), None);
    }

    #[test]
    fn test_non_positive_multiplier_is_ignored() {
        let mut tables = TableBundle::default_bundle();
        tables.family_multipliers = vec![FamilyMultiplier { family_size: 2, multiplier: 0.0 }];
        assert_eq!(tables.family_multiplier(2), None);
    }
}
