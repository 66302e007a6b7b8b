//! Applicant profile structures consumed by the rating engine

use crate::error::QuoteError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Life term used when the applicant did not choose one
pub const DEFAULT_TERM_YEARS: u32 = 10;

/// Oldest age accepted as a plausible applicant
pub const MAX_AGE: u32 = 120;

fn default_frequency() -> PaymentFrequency {
    PaymentFrequency::Yearly
}

fn default_family_size() -> u32 {
    1
}

/// Kind of cover requested
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyType {
    /// Individual health cover
    Health,
    /// Term life cover
    Life,
    /// One health sum insured shared by the whole family
    FamilyFloater,
}

impl PolicyType {
    /// Get the string representation used in the rate tables
    pub fn as_str(&self) -> &'static str {
        match self {
            PolicyType::Health => "health",
            PolicyType::Life => "life",
            PolicyType::FamilyFloater => "family_floater",
        }
    }
}

impl fmt::Display for PolicyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PolicyType {
    type Err = QuoteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "health" => Ok(PolicyType::Health),
            "life" => Ok(PolicyType::Life),
            "family_floater" => Ok(PolicyType::FamilyFloater),
            other => Err(QuoteError::InvalidProfile(format!("unknown policy type `{}`", other))),
        }
    }
}

/// How the premium is paid. Only unlocks or withholds the annual payment discount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentFrequency {
    Monthly,
    Yearly,
}

impl FromStr for PaymentFrequency {
    type Err = QuoteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "monthly" => Ok(PaymentFrequency::Monthly),
            "yearly" | "annual" => Ok(PaymentFrequency::Yearly),
            other => Err(QuoteError::InvalidProfile(format!("unknown payment frequency `{}`", other))),
        }
    }
}

/// Normalized applicant profile, immutable for the duration of one quote
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicantProfile {
    /// Requested kind of cover
    pub policy_type: PolicyType,

    /// Age of the proposer in whole years
    pub age: u32,

    /// Ages of every covered member, proposer included
    #[serde(default)]
    pub ages_all: Vec<u32>,

    /// Collapsed from never / occasional / daily
    #[serde(default)]
    pub smoker: bool,

    /// Body-mass index
    pub bmi: f64,

    #[serde(default)]
    pub occupation_category: Option<String>,

    #[serde(default)]
    pub city: Option<String>,

    #[serde(default)]
    pub state_ut: Option<String>,

    /// Diagnosed condition codes, e.g. `diabetes`
    #[serde(default)]
    pub conditions: Vec<String>,

    /// Requested coverage in rupees
    pub sum_assured: u64,

    /// Policy term in years (life only)
    #[serde(default)]
    pub term_years: Option<u32>,

    #[serde(default = "default_frequency")]
    pub frequency: PaymentFrequency,

    /// Enrolled in UPI autopay
    #[serde(default)]
    pub autopay: bool,

    /// 1 + number of dependents
    #[serde(default = "default_family_size")]
    pub family_size: u32,
}

impl ApplicantProfile {
    /// Create a single-member, non-smoking, yearly-paying profile
    pub fn new(policy_type: PolicyType, age: u32, bmi: f64, sum_assured: u64) -> Self {
        Self {
            policy_type,
            age,
            ages_all: vec![age],
            smoker: false,
            bmi,
            occupation_category: None,
            city: None,
            state_ut: None,
            conditions: Vec::new(),
            sum_assured,
            term_years: None,
            frequency: PaymentFrequency::Yearly,
            autopay: false,
            family_size: 1,
        }
    }

    /// Parse a profile from JSON, reporting any shape error as an invalid profile
    pub fn from_json(json: &str) -> Result<Self, QuoteError> {
        let profile: Self = serde_json::from_str(json)
            .map_err(|e| QuoteError::InvalidProfile(e.to_string()))?;
        profile.validate()?;
        Ok(profile)
    }

    /// Requested term, falling back to the default life term
    pub fn term_or_default(&self) -> u32 {
        self.term_years.unwrap_or(DEFAULT_TERM_YEARS)
    }

    /// Condition codes with duplicates removed, first occurrence order kept
    pub fn distinct_conditions(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::with_capacity(self.conditions.len());
        for code in &self.conditions {
            if !seen.contains(&code.as_str()) {
                seen.push(code.as_str());
            }
        }
        seen
    }

    pub fn has_condition(&self, code: &str) -> bool {
        self.conditions.iter().any(|c| c == code)
    }

    /// Check the contract the intake layer promises
    pub fn validate(&self) -> Result<(), QuoteError> {
        if self.age > MAX_AGE {
            return Err(QuoteError::InvalidProfile(format!(
                "age {} exceeds {}",
                self.age, MAX_AGE
            )));
        }
        if !self.bmi.is_finite() || self.bmi <= 0.0 {
            return Err(QuoteError::InvalidProfile(format!("BMI must be positive, got {}", self.bmi)));
        }
        if self.family_size == 0 {
            return Err(QuoteError::InvalidProfile("family size must be at least 1".to_string()));
        }
        if self.sum_assured == 0 {
            return Err(QuoteError::InvalidProfile("requested coverage must be positive".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_type_parsing() {
        assert_eq!("health".parse::<PolicyType>().unwrap(), PolicyType::Health);
        assert_eq!(" Family_Floater ".parse::<PolicyType>().unwrap(), PolicyType::FamilyFloater);
        assert!(matches!(
            "motor".parse::<PolicyType>(),
            Err(QuoteError::InvalidProfile(_))
        ));
    }

    #[test]
    fn test_json_uses_camel_case_and_defaults() {
        let json = r#"{
            "policyType": "health",
            "age": 28,
            "bmi": 22.0,
            "sumAssured": 500000,
            "autopay": true
        }"#;
        let profile = ApplicantProfile::from_json(json).unwrap();
        assert_eq!(profile.policy_type, PolicyType::Health);
        assert_eq!(profile.frequency, PaymentFrequency::Yearly);
        assert_eq!(profile.family_size, 1);
        assert_eq!(profile.term_or_default(), DEFAULT_TERM_YEARS);
        assert!(profile.autopay);
    }

    #[test]
    fn test_negative_age_is_invalid_profile() {
        let json = r#"{"policyType":"life","age":-3,"bmi":22.0,"sumAssured":100}"#;
        assert!(matches!(
            ApplicantProfile::from_json(json),
            Err(QuoteError::InvalidProfile(_))
        ));
    }

    #[test]
    fn test_unknown_policy_type_is_invalid_profile() {
        let json = r#"{"policyType":"motor","age":30,"bmi":22.0,"sumAssured":100}"#;
        assert!(matches!(
            ApplicantProfile::from_json(json),
            Err(QuoteError::InvalidProfile(_))
        ));
    }

    #[test]
    fn test_validate_rejects_contract_violations() {
        let ok = ApplicantProfile::new(PolicyType::Health, 30, 22.0, 500_000);
        assert!(ok.validate().is_ok());

        let mut bad_bmi = ok.clone();
        bad_bmi.bmi = 0.0;
        assert!(bad_bmi.validate().is_err());

        let mut nan_bmi = ok.clone();
        nan_bmi.bmi = f64::NAN;
        assert!(nan_bmi.validate().is_err());

        let mut no_family = ok.clone();
        no_family.family_size = 0;
        assert!(no_family.validate().is_err());

        let mut too_old = ok;
        too_old.age = 150;
        assert!(too_old.validate().is_err());
    }

    #[test]
    fn test_distinct_conditions_keeps_first_order() {
        let mut profile = ApplicantProfile::new(PolicyType::Health, 40, 24.0, 500_000);
        profile.conditions = vec!["asthma".into(), "diabetes".into(), "asthma".into()];
        assert_eq!(profile.distinct_conditions(), vec!["asthma", "diabetes"]);
        assert!(profile.has_condition("diabetes"));
    }
}
