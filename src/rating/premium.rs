//! Premium rater
//!
//! Base rate lookup, then loadings, then the family multiplier, then
//! discounts. The result is an annual figure before add-ons and rounding.

use super::classify::RiskClass;
use crate::profile::{ApplicantProfile, PaymentFrequency, PolicyType};
use crate::tables::{CityTier, LoadingDimension, Product, TableBundle, ANNUAL_PAYMENT_DISCOUNT, AUTOPAY_DISCOUNT};
use log::debug;
use serde::Serialize;

/// A loading that was actually applied
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AppliedLoading {
    /// What triggered the loading, e.g. `smoker` or `condition:diabetes`
    pub source: String,
    pub percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AppliedDiscount {
    pub rule_name: String,
    pub percent: f64,
}

/// How one product's annual premium was built up
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PremiumBreakdown {
    pub product_id: String,
    /// Coverage step the premium was rated at
    pub sum_assured: u64,
    pub base_premium: f64,
    pub loadings: Vec<AppliedLoading>,
    pub loaded_premium: f64,
    /// 1.0 unless a family floater matched a multiplier row
    pub family_multiplier: f64,
    /// In application order
    pub discounts: Vec<AppliedDiscount>,
    pub annual_premium: f64,
}

/// Smallest step at or above `requested`, else the largest step
pub fn resolve_coverage(steps: &[u64], requested: u64) -> Option<u64> {
    let offered = steps.iter().copied().filter(|s| *s > 0);
    offered
        .clone()
        .filter(|s| *s >= requested)
        .min()
        .or_else(|| offered.max())
}

/// Baseline (non-smoker, any BMI) annual premium for a product at `sum_assured`
pub fn base_premium(
    product: &Product,
    profile: &ApplicantProfile,
    city_tier: &CityTier,
    sum_assured: u64,
    tables: &TableBundle,
) -> Option<f64> {
    let age = profile.age;
    match profile.policy_type {
        PolicyType::Life => {
            let term = profile.term_or_default();
            tables
                .rates_life
                .iter()
                .find(|r| {
                    r.product_id == product.product_id
                        && r.age_band_min <= age
                        && age <= r.age_band_max
                        && r.sum_assured == sum_assured
                        && r.term_years == term
                        && !r.smoker
                })
                .map(|r| r.base_premium_annual)
        }
        PolicyType::Health | PolicyType::FamilyFloater => tables
            .rates_health
            .iter()
            .find(|r| {
                r.product_id == product.product_id
                    && r.age_band_min <= age
                    && age <= r.age_band_max
                    && r.sum_assured == sum_assured
                    && r.city_tier.admits(city_tier)
                    && !r.smoker
                    && r.bmi_bucket == "any"
            })
            .map(|r| r.base_premium_annual),
    }
}

/// Apply every strictly positive loading multiplicatively
pub fn apply_loadings(base: f64, percents: &[f64]) -> f64 {
    percents
        .iter()
        .filter(|pct| **pct > 0.0)
        .fold(base, |price, pct| price * (1.0 + pct / 100.0))
}

/// Loadings that apply to this applicant and product, zeros and negatives dropped
pub fn applicable_loadings(
    product_type: PolicyType,
    profile: &ApplicantProfile,
    risk: &RiskClass,
    tables: &TableBundle,
) -> Vec<AppliedLoading> {
    let mut candidates: Vec<(String, f64)> = Vec::new();

    if profile.smoker {
        candidates.push((
            "smoker".to_string(),
            tables.loading_percent(&LoadingDimension::Smoker, "Y", product_type),
        ));
    }
    if risk.bmi_bucket == "over" || risk.bmi_bucket == "obese" {
        candidates.push((
            format!("bmi:{}", risk.bmi_bucket),
            tables.loading_percent(&LoadingDimension::BmiBucket, &risk.bmi_bucket, product_type),
        ));
    }
    candidates.push((
        format!("occupation:{}", risk.occupation.level),
        tables.loading_percent(&LoadingDimension::OccupationRisk, &risk.occupation.level, product_type),
    ));
    if risk.city_tier != CityTier::Any {
        candidates.push((
            format!("city_tier:{}", risk.city_tier.as_str()),
            tables.loading_percent(&LoadingDimension::CityTier, risk.city_tier.as_str(), product_type),
        ));
    }
    for code in profile.distinct_conditions() {
        if let Some(row) = tables.condition(code) {
            candidates.push((format!("condition:{}", code), row.default_loading_percent));
        }
    }

    candidates
        .into_iter()
        .filter(|(_, percent)| *percent > 0.0)
        .map(|(source, percent)| AppliedLoading { source, percent })
        .collect()
}

/// Discounts the applicant qualifies for, in the order they compound
pub fn applicable_discounts(profile: &ApplicantProfile, tables: &TableBundle) -> Vec<AppliedDiscount> {
    let mut discounts = Vec::new();
    if profile.autopay {
        discounts.push(AppliedDiscount {
            rule_name: AUTOPAY_DISCOUNT.to_string(),
            percent: tables.discount_percent(AUTOPAY_DISCOUNT),
        });
    }
    if profile.frequency == PaymentFrequency::Yearly {
        discounts.push(AppliedDiscount {
            rule_name: ANNUAL_PAYMENT_DISCOUNT.to_string(),
            percent: tables.discount_percent(ANNUAL_PAYMENT_DISCOUNT),
        });
    }
    discounts
}

/// Each discount applies to the running total, not to the undiscounted price
pub fn apply_discounts(price: f64, discounts: &[AppliedDiscount]) -> f64 {
    discounts
        .iter()
        .fold(price, |running, d| running * (1.0 - d.percent / 100.0))
}

/// Rate one candidate product. `None` when it has no coverage steps or no rate row.
pub fn rate(
    product: &Product,
    profile: &ApplicantProfile,
    risk: &RiskClass,
    tables: &TableBundle,
) -> Option<PremiumBreakdown> {
    let Some(sum_assured) = resolve_coverage(&product.sum_assured_steps, profile.sum_assured) else {
        debug!("{} skipped: no coverage steps", product.product_id);
        return None;
    };
    let Some(base) = base_premium(product, profile, &risk.city_tier, sum_assured, tables) else {
        debug!("{} skipped: no rate row for age {} at {}", product.product_id, profile.age, sum_assured);
        return None;
    };

    let product_type = product.policy_type.unwrap_or(profile.policy_type);
    let loadings = applicable_loadings(product_type, profile, risk, tables);
    let percents: Vec<f64> = loadings.iter().map(|l| l.percent).collect();
    let loaded = apply_loadings(base, &percents);

    let family_multiplier = if profile.policy_type == PolicyType::FamilyFloater {
        tables.family_multiplier(profile.family_size).unwrap_or(1.0)
    } else {
        1.0
    };
    let multiplied = loaded * family_multiplier;

    let discounts = applicable_discounts(profile, tables);
    let annual = apply_discounts(multiplied, &discounts);

    let breakdown = PremiumBreakdown {
        product_id: product.product_id.clone(),
        sum_assured,
        base_premium: base,
        loadings,
        loaded_premium: loaded,
        family_multiplier,
        discounts,
        annual_premium: annual,
    };
    debug!(
        "{}: base {:.2} loaded {:.2} x{} -> {:.2}",
        breakdown.product_id, base, loaded, family_multiplier, annual
    );
    Some(breakdown)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn product<'a>(tables: &'a TableBundle, id: &str) -> &'a Product {
        tables.product(id).unwrap()
    }

    #[test]
    fn test_coverage_resolution() {
        let steps = [500_000, 1_000_000, 2_000_000];
        assert_eq!(resolve_coverage(&steps, 500_000), Some(500_000));
        assert_eq!(resolve_coverage(&steps, 500_001), Some(1_000_000));
        assert_eq!(resolve_coverage(&steps, 1), Some(500_000));
        assert_eq!(resolve_coverage(&steps, 9_000_000), Some(2_000_000));
        assert_eq!(resolve_coverage(&[], 500_000), None);
        assert_eq!(resolve_coverage(&[0], 500_000), None);
    }

    #[test]
    fn test_resolved_coverage_is_always_a_step() {
        let tables = TableBundle::default_bundle();
        for p in &tables.products {
            for requested in [1, 250_000, 500_000, 750_000, 3_000_000, 50_000_000] {
                let resolved = resolve_coverage(&p.sum_assured_steps, requested).unwrap();
                assert!(p.sum_assured_steps.contains(&resolved));
                if let Some(smallest) = p.sum_assured_steps.iter().filter(|s| **s >= requested).min() {
                    assert_eq!(resolved, *smallest);
                }
            }
        }
    }

    #[test]
    fn test_loading_order_does_not_matter() {
        let loadings = [25.0, 10.0, 15.0, 20.0];
        let expected = apply_loadings(10_000.0, &loadings);

        let mut order = loadings;
        for i in 0..order.len() {
            for j in 0..order.len() {
                order.swap(i, j);
                assert_relative_eq!(apply_loadings(10_000.0, &order), expected, max_relative = 1e-12);
            }
        }
        order.reverse();
        assert_relative_eq!(apply_loadings(10_000.0, &order), expected, max_relative = 1e-12);
    }

    #[test]
    fn test_non_positive_loadings_are_skipped() {
        assert_relative_eq!(apply_loadings(1000.0, &[0.0, -20.0, 10.0]), 1100.0);
        assert_relative_eq!(apply_loadings(1000.0, &[]), 1000.0);
    }

    #[test]
    fn test_discounts_compound() {
        let discounts = vec![
            AppliedDiscount { rule_name: AUTOPAY_DISCOUNT.into(), percent: 5.0 },
            AppliedDiscount { rule_name: ANNUAL_PAYMENT_DISCOUNT.into(), percent: 8.0 },
        ];
        let price = apply_discounts(8500.0, &discounts);
        assert_relative_eq!(price, 8500.0 * 0.95 * 0.92, epsilon = 1e-9);
        assert!((price - 8500.0 * (1.0 - 0.13)).abs() > 1.0);
    }

    #[test]
    fn test_baseline_health_breakdown() {
        let tables = TableBundle::default_bundle();
        let mut profile = ApplicantProfile::new(PolicyType::Health, 28, 22.0, 500_000);
        profile.autopay = true;
        let risk = RiskClass::of(&profile, &tables);

        let b = rate(product(&tables, "HDFC_HEALTH_BASIC"), &profile, &risk, &tables).unwrap();
        assert_eq!(b.sum_assured, 500_000);
        assert_eq!(b.base_premium, 8500.0);
        assert!(b.loadings.is_empty());
        assert_eq!(b.family_multiplier, 1.0);
        let names: Vec<&str> = b.discounts.iter().map(|d| d.rule_name.as_str()).collect();
        assert_eq!(names, vec![AUTOPAY_DISCOUNT, ANNUAL_PAYMENT_DISCOUNT]);
        assert_relative_eq!(b.annual_premium, 7429.0, epsilon = 1e-6);
    }

    #[test]
    fn test_smoker_bmi_and_condition_loadings() {
        let tables = TableBundle::default_bundle();
        let mut profile = ApplicantProfile::new(PolicyType::Health, 30, 27.0, 500_000);
        profile.smoker = true;
        profile.conditions = vec!["diabetes".into(), "diabetes".into(), "unknown".into()];
        profile.frequency = PaymentFrequency::Monthly;
        let risk = RiskClass::of(&profile, &tables);

        let b = rate(product(&tables, "HDFC_HEALTH_BASIC"), &profile, &risk, &tables).unwrap();
        let sources: Vec<&str> = b.loadings.iter().map(|l| l.source.as_str()).collect();
        assert_eq!(sources, vec!["smoker", "bmi:over", "condition:diabetes"]);
        assert!(b.discounts.is_empty());
        assert_relative_eq!(b.annual_premium, 8500.0 * 1.25 * 1.10 * 1.25, epsilon = 1e-6);
    }

    #[test]
    fn test_occupation_loading_comes_from_loading_rules() {
        let tables = TableBundle::default_bundle();
        let mut profile = ApplicantProfile::new(PolicyType::Health, 30, 22.0, 500_000);
        profile.frequency = PaymentFrequency::Monthly;

        profile.occupation_category = Some("high_risk".into());
        let risk = RiskClass::of(&profile, &tables);
        let b = rate(product(&tables, "HDFC_HEALTH_BASIC"), &profile, &risk, &tables).unwrap();
        assert_eq!(b.loadings, vec![AppliedLoading { source: "occupation:high".into(), percent: 15.0 }]);

        // `medium` has a row in occupation_risk but no loading rule
        profile.occupation_category = Some("manual_labor".into());
        let risk = RiskClass::of(&profile, &tables);
        let b = rate(product(&tables, "HDFC_HEALTH_BASIC"), &profile, &risk, &tables).unwrap();
        assert!(b.loadings.is_empty());
    }

    #[test]
    fn test_family_multiplier_exact_size_or_one() {
        let tables = TableBundle::default_bundle();
        let mut profile = ApplicantProfile::new(PolicyType::FamilyFloater, 30, 22.0, 500_000);
        profile.frequency = PaymentFrequency::Monthly;
        let floater = product(&tables, "HDFC_FAMILY_FLOATER");

        profile.family_size = 3;
        let risk = RiskClass::of(&profile, &tables);
        let b = rate(floater, &profile, &risk, &tables).unwrap();
        assert_eq!(b.family_multiplier, 2.3);
        assert_relative_eq!(b.annual_premium, 9500.0 * 2.3, epsilon = 1e-9);

        profile.family_size = 8;
        let b = rate(floater, &profile, &risk, &tables).unwrap();
        assert_eq!(b.family_multiplier, 1.0);
        assert_relative_eq!(b.annual_premium, 9500.0);
    }

    #[test]
    fn test_health_scoped_bmi_loading_skips_floaters() {
        let tables = TableBundle::default_bundle();
        let mut profile = ApplicantProfile::new(PolicyType::FamilyFloater, 30, 32.0, 500_000);
        profile.frequency = PaymentFrequency::Monthly;
        let risk = RiskClass::of(&profile, &tables);
        assert_eq!(risk.bmi_bucket, "obese");

        let b = rate(product(&tables, "HDFC_FAMILY_FLOATER"), &profile, &risk, &tables).unwrap();
        assert!(b.loadings.is_empty());
    }

    #[test]
    fn test_missing_rate_row_yields_nothing() {
        let tables = TableBundle::default_bundle();
        // BASIC has no 36-50 row at 1,000,000
        let profile = ApplicantProfile::new(PolicyType::Health, 40, 22.0, 1_000_000);
        let risk = RiskClass::of(&profile, &tables);
        assert!(rate(product(&tables, "HDFC_HEALTH_BASIC"), &profile, &risk, &tables).is_none());
    }

    #[test]
    fn test_life_rate_matches_term() {
        let tables = TableBundle::default_bundle();
        let term = product(&tables, "TATA_LIFE_TERM");
        let mut profile = ApplicantProfile::new(PolicyType::Life, 30, 22.0, 2_500_000);
        let risk = RiskClass::of(&profile, &tables);

        // only term-20 rows exist; the default term is 10
        assert!(rate(term, &profile, &risk, &tables).is_none());

        profile.term_years = Some(20);
        let b = rate(term, &profile, &risk, &tables).unwrap();
        assert_eq!(b.base_premium, 8500.0);
    }

    #[test]
    fn test_city_tier_rows_and_loadings() {
        let mut tables = TableBundle::default_bundle();
        tables.loadings.push(crate::tables::LoadingRule {
            rule_name: "Metro Loading".into(),
            dimension: LoadingDimension::CityTier,
            match_value: "1".into(),
            loading_percent: 5.0,
            apply_to: crate::tables::RuleScope::Both,
            notes: String::new(),
        });
        let mut profile = ApplicantProfile::new(PolicyType::Health, 30, 22.0, 500_000);
        profile.city = Some("Delhi".into());
        profile.frequency = PaymentFrequency::Monthly;
        let risk = RiskClass::of(&profile, &tables);

        let b = rate(product(&tables, "HDFC_HEALTH_BASIC"), &profile, &risk, &tables).unwrap();
        assert_eq!(b.loadings, vec![AppliedLoading { source: "city_tier:1".into(), percent: 5.0 }]);
        assert_relative_eq!(b.annual_premium, 8925.0, epsilon = 1e-9);
    }
}
