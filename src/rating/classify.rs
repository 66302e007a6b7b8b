//! Bucket and tier classifiers
//!
//! Each classifier maps one profile attribute onto a reference table row and
//! falls back to a neutral value when nothing matches.

use crate::tables::{CityTier, TableBundle};

/// Bucket used when no `[min, max)` interval contains the BMI
pub const DEFAULT_BMI_BUCKET: &str = "normal";

/// Risk level used for unknown or missing occupations
pub const DEFAULT_RISK_LEVEL: &str = "low";

/// Classified occupation risk
#[derive(Debug, Clone, PartialEq)]
pub struct OccupationClass {
    pub level: String,
    /// Loading listed on the occupation row itself. Informational; the applied
    /// loading comes from the `occupation_risk` loading rules.
    pub loading_percent: f64,
}

impl Default for OccupationClass {
    fn default() -> Self {
        Self { level: DEFAULT_RISK_LEVEL.to_string(), loading_percent: 0.0 }
    }
}

/// Everything the rater needs to know about the applicant beyond the raw profile
#[derive(Debug, Clone, PartialEq)]
pub struct RiskClass {
    pub bmi_bucket: String,
    pub city_tier: CityTier,
    pub occupation: OccupationClass,
}

/// First bucket whose half-open interval contains `bmi`
pub fn bmi_bucket<'a>(bmi: f64, tables: &'a TableBundle) -> &'a str {
    tables
        .bmi_buckets
        .iter()
        .find(|row| row.contains(bmi))
        .map(|row| row.bucket.as_str())
        .unwrap_or(DEFAULT_BMI_BUCKET)
}

/// Tier of a city, matched case-insensitively
pub fn city_tier(city: Option<&str>, tables: &TableBundle) -> CityTier {
    let Some(city) = city.map(str::trim).filter(|c| !c.is_empty()) else {
        return CityTier::Any;
    };
    tables
        .city_tier
        .iter()
        .find(|row| row.city.eq_ignore_ascii_case(city))
        .map(|row| row.tier.clone())
        .unwrap_or(CityTier::Any)
}

pub fn occupation(category: Option<&str>, tables: &TableBundle) -> OccupationClass {
    let Some(category) = category else {
        return OccupationClass::default();
    };
    tables
        .occupation_risk
        .iter()
        .find(|row| row.occupation_category == category)
        .map(|row| OccupationClass {
            level: if row.risk_level.is_empty() { DEFAULT_RISK_LEVEL.to_string() } else { row.risk_level.clone() },
            loading_percent: row.loading_percent,
        })
        .unwrap_or_default()
}

impl RiskClass {
    pub fn of(profile: &crate::profile::ApplicantProfile, tables: &TableBundle) -> Self {
        RiskClass {
            bmi_bucket: bmi_bucket(profile.bmi, tables).to_string(),
            city_tier: city_tier(profile.city.as_deref(), tables),
            occupation: occupation(profile.occupation_category.as_deref(), tables),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bmi_boundary_goes_to_upper_bucket() {
        let tables = TableBundle::default_bundle();
        assert_eq!(bmi_bucket(25.0, &tables), "over");
        assert_eq!(bmi_bucket(24.9, &tables), "normal");
        assert_eq!(bmi_bucket(18.5, &tables), "normal");
        assert_eq!(bmi_bucket(30.0, &tables), "obese");
        assert_eq!(bmi_bucket(10.0, &tables), "underweight");
    }

    #[test]
    fn test_bmi_outside_every_bucket_is_normal() {
        let tables = TableBundle::default_bundle();
        assert_eq!(bmi_bucket(62.0, &tables), DEFAULT_BMI_BUCKET);

        let empty = TableBundle::default();
        assert_eq!(bmi_bucket(31.0, &empty), DEFAULT_BMI_BUCKET);
    }

    #[test]
    fn test_city_tier_is_case_insensitive() {
        let tables = TableBundle::default_bundle();
        assert_eq!(city_tier(Some("mumbai"), &tables), CityTier::Tier("1".into()));
        assert_eq!(city_tier(Some(" PUNE "), &tables), CityTier::Tier("2".into()));
        assert_eq!(city_tier(Some("Nagpur"), &tables), CityTier::Any);
        assert_eq!(city_tier(None, &tables), CityTier::Any);
    }

    #[test]
    fn test_occupation_defaults_to_low() {
        let tables = TableBundle::default_bundle();
        let manual = occupation(Some("manual_labor"), &tables);
        assert_eq!(manual.level, "medium");
        assert_eq!(manual.loading_percent, 10.0);

        assert_eq!(occupation(Some("astronaut"), &tables), OccupationClass::default());
        assert_eq!(occupation(None, &tables).level, "low");
    }
}
