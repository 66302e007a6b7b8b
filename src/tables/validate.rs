//! Non-fatal consistency checks over a table bundle

use super::TableBundle;
use std::collections::HashSet;
use std::fmt;

/// Something in the reference data that is probably a mistake
#[derive(Debug, Clone, PartialEq)]
pub enum TableIssue {
    InvertedBmiBucket { bucket: String },
    OverlappingBmiBuckets { first: String, second: String },
    UnknownPolicyType { product_id: String },
    InvertedAgeRange { product_id: String },
    ProductWithoutSteps { product_id: String },
    RateForUnknownProduct { table: &'static str, product_id: String },
    DuplicateDiscount { rule_name: String },
    NonPositiveMultiplier { family_size: u32 },
    NegativeAddOnPrice { addon_id: String },
}

impl fmt::Display for TableIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableIssue::InvertedBmiBucket { bucket } => {
                write!(f, "BMI bucket `{}` has min >= max", bucket)
            }
            TableIssue::OverlappingBmiBuckets { first, second } => {
                write!(f, "BMI buckets `{}` and `{}` overlap", first, second)
            }
            TableIssue::UnknownPolicyType { product_id } => {
                write!(f, "product `{}` has an unknown policy type and is never offered", product_id)
            }
            TableIssue::InvertedAgeRange { product_id } => {
                write!(f, "product `{}` has min_age > max_age", product_id)
            }
            TableIssue::ProductWithoutSteps { product_id } => {
                write!(f, "product `{}` has no coverage steps and is never offered", product_id)
            }
            TableIssue::RateForUnknownProduct { table, product_id } => {
                write!(f, "{} row references unknown product `{}`", table, product_id)
            }
            TableIssue::DuplicateDiscount { rule_name } => {
                write!(f, "discount `{}` is defined more than once; the first row wins", rule_name)
            }
            TableIssue::NonPositiveMultiplier { family_size } => {
                write!(f, "family multiplier for size {} is not positive and is ignored", family_size)
            }
            TableIssue::NegativeAddOnPrice { addon_id } => {
                write!(f, "add-on `{}` has a negative price", addon_id)
            }
        }
    }
}

impl TableBundle {
    /// Report suspicious rows. Quoting still works on a bundle with issues.
    pub fn validate(&self) -> Vec<TableIssue> {
        let mut issues = Vec::new();

        let mut buckets: Vec<_> = self.bmi_buckets.iter().collect();
        for bucket in &buckets {
            if bucket.min_bmi >= bucket.max_bmi {
                issues.push(TableIssue::InvertedBmiBucket { bucket: bucket.bucket.clone() });
            }
        }
        buckets.sort_by(|a, b| a.min_bmi.total_cmp(&b.min_bmi));
        for pair in buckets.windows(2) {
            if pair[1].min_bmi < pair[0].max_bmi {
                issues.push(TableIssue::OverlappingBmiBuckets {
                    first: pair[0].bucket.clone(),
                    second: pair[1].bucket.clone(),
                });
            }
        }

        let mut product_ids = HashSet::new();
        for product in &self.products {
            product_ids.insert(product.product_id.as_str());
            if product.policy_type.is_none() {
                issues.push(TableIssue::UnknownPolicyType { product_id: product.product_id.clone() });
            }
            if product.min_age > product.max_age {
                issues.push(TableIssue::InvertedAgeRange { product_id: product.product_id.clone() });
            }
            if product.sum_assured_steps.is_empty() {
                issues.push(TableIssue::ProductWithoutSteps { product_id: product.product_id.clone() });
            }
        }

        let rate_products = self
            .rates_health
            .iter()
            .map(|r| ("rates_health", &r.product_id))
            .chain(self.rates_life.iter().map(|r| ("rates_life", &r.product_id)));
        let mut reported = HashSet::new();
        for (table, product_id) in rate_products {
            if !product_ids.contains(product_id.as_str()) && reported.insert((table, product_id)) {
                issues.push(TableIssue::RateForUnknownProduct { table, product_id: product_id.clone() });
            }
        }

        let mut discount_names = HashSet::new();
        for rule in &self.discounts {
            if !discount_names.insert(rule.rule_name.as_str()) {
                issues.push(TableIssue::DuplicateDiscount { rule_name: rule.rule_name.clone() });
            }
        }

        for row in &self.family_multipliers {
            if row.multiplier <= 0.0 {
                issues.push(TableIssue::NonPositiveMultiplier { family_size: row.family_size });
            }
        }

        for addon in self.addons.iter().flatten() {
            if addon.price_annual < 0.0 {
                issues.push(TableIssue::NegativeAddOnPrice { addon_id: addon.addon_id.clone() });
            }
        }

        issues
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tables::{AddOn, AddOnScope, BmiBucketRow, CityTier, FamilyMultiplier, HealthRate};

    #[test]
    fn test_overlapping_buckets_reported() {
        let mut tables = TableBundle::default_bundle();
        tables.bmi_buckets.push(BmiBucketRow { bucket: "heavy".into(), min_bmi: 28.0, max_bmi: 35.0 });
        let issues = tables.validate();
        assert!(issues.contains(&TableIssue::OverlappingBmiBuckets {
            first: "over".into(),
            second: "heavy".into(),
        }));
    }

    #[test]
    fn test_dirty_rows_reported_once() {
        let mut tables = TableBundle::default_bundle();
        tables.products[0].sum_assured_steps.clear();
        tables.products[1].policy_type = None;
        let orphan = HealthRate {
            product_id: "GONE".into(),
            age_band_min: 18,
            age_band_max: 35,
            smoker: false,
            bmi_bucket: "any".into(),
            city_tier: CityTier::Any,
            sum_assured: 500_000,
            base_premium_annual: 1.0,
        };
        tables.rates_health.push(orphan.clone());
        tables.rates_health.push(orphan);
        tables.family_multipliers.push(FamilyMultiplier { family_size: 6, multiplier: 0.0 });

        let issues = tables.validate();
        assert_eq!(issues.len(), 4, "{:?}", issues);
        assert!(issues.contains(&TableIssue::ProductWithoutSteps { product_id: "HDFC_HEALTH_BASIC".into() }));
        assert!(issues.contains(&TableIssue::UnknownPolicyType { product_id: "HDFC_HEALTH_PLUS".into() }));
        assert!(issues.contains(&TableIssue::NonPositiveMultiplier { family_size: 6 }));
    }

    #[test]
    fn test_negative_addon_price_reported() {
        let mut tables = TableBundle::default_bundle();
        tables.addons = Some(vec![AddOn {
            addon_id: "refund".into(),
            name: "Refund".into(),
            applies_to: AddOnScope::Any,
            price_annual: -2000.0,
            description: String::new(),
            default_recommended: true,
        }]);
        assert_eq!(tables.validate(), vec![TableIssue::NegativeAddOnPrice { addon_id: "refund".into() }]);
    }
}
