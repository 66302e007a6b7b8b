//! Built-in reference dataset
//!
//! Used whenever the table directory is missing or unreadable. The CSV files
//! under `data/tables/` carry the same rows.

use super::records::*;
use super::TableBundle;
use crate::profile::PolicyType;

struct PlanDef {
    id: &'static str,
    name: &'static str,
    insurer: &'static str,
    policy_type: PolicyType,
    ages: (u32, u32),
    family_allowed: bool,
    steps: &'static [u64],
    terms: &'static [u32],
    room_rent: Option<&'static str>,
    copay: Option<f64>,
    waits: (Option<u32>, Option<u32>),
    maternity: bool,
    outpatient: bool,
    notes: &'static str,
}

impl PlanDef {
    fn build(self) -> Product {
        Product {
            product_id: self.id.to_string(),
            product_name: self.name.to_string(),
            insurer_name: self.insurer.to_string(),
            policy_type: Some(self.policy_type),
            min_age: self.ages.0,
            max_age: self.ages.1,
            family_allowed: self.family_allowed,
            sum_assured_steps: self.steps.to_vec(),
            term_options_years: self.terms.to_vec(),
            room_rent_limit: self.room_rent.map(str::to_string),
            copay_percent: self.copay,
            pre_existing_wait_months: self.waits.0,
            disease_specific_wait_months: self.waits.1,
            maternity_cover: self.maternity,
            outpatient_cover: self.outpatient,
            notes: self.notes.to_string(),
        }
    }
}

fn products() -> Vec<Product> {
    vec![
        PlanDef {
            id: "HDFC_HEALTH_BASIC",
            name: "Health Optima",
            insurer: "HDFC ERGO",
            policy_type: PolicyType::Health,
            ages: (18, 65),
            family_allowed: true,
            steps: &[500_000, 1_000_000, 2_000_000],
            terms: &[],
            room_rent: Some("2% of SI"),
            copay: Some(10.0),
            waits: (Some(48), Some(24)),
            maternity: true,
            outpatient: false,
            notes: "Basic health plan",
        }
        .build(),
        PlanDef {
            id: "HDFC_HEALTH_PLUS",
            name: "Health Optima Plus",
            insurer: "HDFC ERGO",
            policy_type: PolicyType::Health,
            ages: (18, 70),
            family_allowed: true,
            steps: &[1_000_000, 2_000_000, 5_000_000],
            terms: &[],
            room_rent: Some("No limit"),
            copay: Some(5.0),
            waits: (Some(36), Some(12)),
            maternity: true,
            outpatient: true,
            notes: "Premium health plan",
        }
        .build(),
        PlanDef {
            id: "ICICI_HEALTH_PREM",
            name: "Complete Health Insurance",
            insurer: "ICICI Lombard",
            policy_type: PolicyType::Health,
            ages: (18, 75),
            family_allowed: true,
            steps: &[1_000_000, 2_000_000, 5_000_000, 10_000_000],
            terms: &[],
            room_rent: Some("No limit"),
            copay: None,
            waits: (Some(24), Some(12)),
            maternity: true,
            outpatient: true,
            notes: "Comprehensive coverage",
        }
        .build(),
        PlanDef {
            id: "TATA_LIFE_TERM",
            name: "Sampoorna Raksha Supreme",
            insurer: "Tata AIA",
            policy_type: PolicyType::Life,
            ages: (18, 65),
            family_allowed: false,
            steps: &[2_500_000, 5_000_000, 10_000_000, 25_000_000],
            terms: &[10, 15, 20, 25, 30],
            room_rent: None,
            copay: None,
            waits: (None, None),
            maternity: false,
            outpatient: false,
            notes: "Term life insurance",
        }
        .build(),
        PlanDef {
            id: "HDFC_FAMILY_FLOATER",
            name: "Optima Secure Family",
            insurer: "HDFC ERGO",
            policy_type: PolicyType::FamilyFloater,
            ages: (18, 65),
            family_allowed: true,
            steps: &[500_000, 1_000_000, 2_000_000],
            terms: &[],
            room_rent: Some("1% of SI"),
            copay: Some(10.0),
            waits: (Some(48), Some(24)),
            maternity: true,
            outpatient: false,
            notes: "Entry family floater",
        }
        .build(),
        PlanDef {
            id: "ICICI_FAMILY_PREM",
            name: "Family Shield Premium",
            insurer: "ICICI Lombard",
            policy_type: PolicyType::FamilyFloater,
            ages: (18, 70),
            family_allowed: true,
            steps: &[1_000_000, 2_000_000, 5_000_000],
            terms: &[],
            room_rent: Some("No limit"),
            copay: None,
            waits: (Some(24), Some(12)),
            maternity: true,
            outpatient: true,
            notes: "Comprehensive family floater",
        }
        .build(),
    ]
}

fn health(product_id: &str, band: (u32, u32), sum_assured: u64, premium: f64) -> HealthRate {
    HealthRate {
        product_id: product_id.to_string(),
        age_band_min: band.0,
        age_band_max: band.1,
        smoker: false,
        bmi_bucket: "any".to_string(),
        city_tier: CityTier::Any,
        sum_assured,
        base_premium_annual: premium,
    }
}

fn life(product_id: &str, band: (u32, u32), sum_assured: u64, term_years: u32, premium: f64) -> LifeRate {
    LifeRate {
        product_id: product_id.to_string(),
        age_band_min: band.0,
        age_band_max: band.1,
        smoker: false,
        sum_assured,
        term_years,
        base_premium_annual: premium,
    }
}

fn rates_health() -> Vec<HealthRate> {
    vec![
        health("HDFC_HEALTH_BASIC", (18, 35), 500_000, 8500.0),
        health("HDFC_HEALTH_BASIC", (18, 35), 1_000_000, 12000.0),
        health("HDFC_HEALTH_BASIC", (36, 50), 500_000, 14000.0),
        health("HDFC_HEALTH_PLUS", (18, 35), 1_000_000, 18000.0),
        health("HDFC_HEALTH_PLUS", (18, 35), 2_000_000, 25000.0),
        health("ICICI_HEALTH_PREM", (18, 35), 1_000_000, 22000.0),
        health("ICICI_HEALTH_PREM", (18, 35), 2_000_000, 32000.0),
        health("HDFC_FAMILY_FLOATER", (18, 35), 500_000, 9500.0),
        health("HDFC_FAMILY_FLOATER", (18, 35), 1_000_000, 13500.0),
        health("HDFC_FAMILY_FLOATER", (36, 50), 500_000, 15500.0),
        health("HDFC_FAMILY_FLOATER", (36, 50), 1_000_000, 21000.0),
        health("ICICI_FAMILY_PREM", (18, 35), 1_000_000, 24000.0),
        health("ICICI_FAMILY_PREM", (18, 35), 2_000_000, 34000.0),
        health("ICICI_FAMILY_PREM", (36, 50), 1_000_000, 36000.0),
    ]
}

fn rates_life() -> Vec<LifeRate> {
    vec![
        life("TATA_LIFE_TERM", (18, 35), 2_500_000, 20, 8500.0),
        life("TATA_LIFE_TERM", (18, 35), 5_000_000, 20, 14000.0),
        life("TATA_LIFE_TERM", (36, 50), 2_500_000, 20, 18000.0),
    ]
}

fn bmi_buckets() -> Vec<BmiBucketRow> {
    [("underweight", 0.0, 18.5), ("normal", 18.5, 25.0), ("over", 25.0, 30.0), ("obese", 30.0, 50.0)]
        .into_iter()
        .map(|(bucket, min_bmi, max_bmi)| BmiBucketRow { bucket: bucket.to_string(), min_bmi, max_bmi })
        .collect()
}

fn loading(
    rule_name: &str,
    dimension: LoadingDimension,
    match_value: &str,
    pct: f64,
    apply_to: RuleScope,
    notes: &str,
) -> LoadingRule {
    LoadingRule {
        rule_name: rule_name.to_string(),
        dimension,
        match_value: match_value.to_string(),
        loading_percent: pct,
        apply_to,
        notes: notes.to_string(),
    }
}

fn loadings() -> Vec<LoadingRule> {
    use LoadingDimension::*;
    let health = RuleScope::Policy(PolicyType::Health);
    vec![
        loading("Smoker Loading", Smoker, "Y", 25.0, RuleScope::Both, "Standard smoker loading"),
        loading("Overweight Loading", BmiBucket, "over", 10.0, health, "Overweight loading"),
        loading("Obesity Loading", BmiBucket, "obese", 25.0, health, "Obesity loading"),
        loading("High Risk Occupation", OccupationRisk, "high", 15.0, RuleScope::Both, "High risk occupation"),
        loading(
            "Very High Risk Occupation",
            OccupationRisk,
            "very_high",
            30.0,
            RuleScope::Both,
            "Very high risk occupation",
        ),
    ]
}

fn discounts() -> Vec<DiscountRule> {
    vec![
        DiscountRule {
            rule_name: super::AUTOPAY_DISCOUNT.to_string(),
            discount_percent: 5.0,
            apply_to: RuleScope::Both,
            constraints: "UPI autopay setup".to_string(),
        },
        DiscountRule {
            rule_name: super::ANNUAL_PAYMENT_DISCOUNT.to_string(),
            discount_percent: 8.0,
            apply_to: RuleScope::Both,
            constraints: "Annual premium payment".to_string(),
        },
    ]
}

fn family_multipliers() -> Vec<FamilyMultiplier> {
    [(1, 1.0), (2, 1.8), (3, 2.3), (4, 2.6), (5, 2.9)]
        .into_iter()
        .map(|(family_size, multiplier)| FamilyMultiplier { family_size, multiplier })
        .collect()
}

fn conditions() -> Vec<ConditionRow> {
    [
        ("diabetes", "Diabetes", 25.0, 48, "HbA1c, FBS, PPBS", "Blood sugar control", "moderate"),
        ("hypertension", "High Blood Pressure", 15.0, 24, "BP readings, ECG", "BP control medication", "mild"),
        ("asthma", "Asthma", 20.0, 12, "Pulmonary function test", "Inhaler usage", "moderate"),
    ]
    .into_iter()
    .map(|(code, name, pct, wait, docs, metrics, severity)| ConditionRow {
        condition_code: code.to_string(),
        name: name.to_string(),
        default_loading_percent: pct,
        default_wait_months: Some(wait),
        suggested_docs: docs.to_string(),
        recommended_metrics: metrics.to_string(),
        severity: severity.to_string(),
    })
    .collect()
}

fn occupation_risk() -> Vec<OccupationRiskRow> {
    [
        ("desk_job", "low", 0.0, "Office work, IT, finance"),
        ("manual_labor", "medium", 10.0, "Construction, manufacturing"),
        ("high_risk", "high", 20.0, "Mining, chemicals"),
        ("very_high_risk", "very_high", 35.0, "Armed forces, pilots"),
    ]
    .into_iter()
    .map(|(category, level, pct, notes)| OccupationRiskRow {
        occupation_category: category.to_string(),
        risk_level: level.to_string(),
        loading_percent: pct,
        notes: notes.to_string(),
    })
    .collect()
}

fn city_tier() -> Vec<CityTierRow> {
    [
        ("Mumbai", "Maharashtra", "1"),
        ("Delhi", "Delhi", "1"),
        ("Bangalore", "Karnataka", "1"),
        ("Pune", "Maharashtra", "2"),
        ("Jaipur", "Rajasthan", "2"),
    ]
    .into_iter()
    .map(|(city, state_ut, tier)| CityTierRow {
        city: city.to_string(),
        state_ut: state_ut.to_string(),
        tier: CityTier::parse(tier),
    })
    .collect()
}

fn addons() -> Vec<AddOn> {
    [
        ("accidental_cover", "Accidental Cover", 1000.0, "Personal accident cover", true),
        ("critical_illness", "Critical Illness", 1500.0, "Critical illness cover", true),
        ("worldwide_coverage", "Worldwide Coverage", 650.0, "Emergency treatment abroad", false),
    ]
    .into_iter()
    .map(|(id, name, price, description, default_recommended)| AddOn {
        addon_id: id.to_string(),
        name: name.to_string(),
        applies_to: AddOnScope::Any,
        price_annual: price,
        description: description.to_string(),
        default_recommended,
    })
    .collect()
}

pub(super) fn default_bundle() -> TableBundle {
    TableBundle {
        products: products(),
        rates_health: rates_health(),
        rates_life: rates_life(),
        bmi_buckets: bmi_buckets(),
        loadings: loadings(),
        discounts: discounts(),
        family_multipliers: family_multipliers(),
        conditions: conditions(),
        occupation_risk: occupation_risk(),
        city_tier: city_tier(),
        addons: Some(addons()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_bundle_is_complete() {
        let tables = default_bundle();
        for (table, rows) in tables.table_sizes() {
            assert!(rows > 0, "default table `{}` is empty", table);
        }
        assert!(tables.validate().is_empty(), "{:?}", tables.validate());
    }

    #[test]
    fn test_every_rate_row_is_baseline() {
        let tables = default_bundle();
        assert!(tables.rates_health.iter().all(|r| !r.smoker && r.bmi_bucket == "any"));
        assert!(tables.rates_life.iter().all(|r| !r.smoker));
    }
}
