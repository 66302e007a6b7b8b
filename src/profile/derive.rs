//! Map intake answers to the flat profile the rating engine consumes
//!
//! Every missing answer falls back to a neutral default so a partially
//! completed intake still yields an indicative quote.

use super::{ApplicantProfile, PaymentFrequency, PolicyType, DEFAULT_TERM_YEARS};
use crate::intake::IntakeRecord;
use chrono::{Datelike, NaiveDate};

/// Age assumed when neither date nor year of birth is known
pub const DEFAULT_AGE: u32 = 30;

/// BMI assumed when height or weight is missing
pub const DEFAULT_BMI: f64 = 22.0;

/// Coverage assumed when no amount was chosen
pub const DEFAULT_SUM_ASSURED: u64 = 500_000;

/// Completed years between `dob` and `today`, zero for future dates
pub fn age_on(dob: NaiveDate, today: NaiveDate) -> u32 {
    let mut years = today.year() - dob.year();
    if (today.month(), today.day()) < (dob.month(), dob.day()) {
        years -= 1;
    }
    years.max(0) as u32
}

/// Build the pricing profile from intake answers as of `today`
pub fn derive_profile(record: &IntakeRecord, today: NaiveDate) -> ApplicantProfile {
    let identity = &record.identity;
    let age = match (identity.dob, identity.yob) {
        (Some(dob), _) => age_on(dob, today),
        (None, Some(yob)) => (today.year() - yob).max(0) as u32,
        (None, None) => DEFAULT_AGE,
    };

    let health = &record.health;
    let bmi = match (health.height_cm, health.weight_kg) {
        (Some(h), Some(w)) if h > 0 => {
            let metres = h as f64 / 100.0;
            w as f64 / (metres * metres)
        }
        _ => DEFAULT_BMI,
    };

    let mut ages_all = Vec::with_capacity(1 + record.family_members.len());
    ages_all.push(age);
    ages_all.extend(
        record
            .family_members
            .iter()
            .map(|m| m.dob.map(|dob| age_on(dob, today)).unwrap_or(DEFAULT_AGE)),
    );

    let policy = &record.policy;

    ApplicantProfile {
        policy_type: policy.policy_type.unwrap_or(PolicyType::Health),
        age,
        ages_all,
        smoker: health.smoker.map(|s| s.is_smoker()).unwrap_or(false),
        bmi,
        occupation_category: health.occupation_category.clone(),
        city: health.city.clone(),
        state_ut: health.state_ut.clone(),
        conditions: health.conditions.iter().map(|c| c.name.clone()).collect(),
        sum_assured: policy.sum_assured.unwrap_or(DEFAULT_SUM_ASSURED),
        term_years: Some(policy.term_years.unwrap_or(DEFAULT_TERM_YEARS)),
        frequency: policy.premium_frequency.unwrap_or(PaymentFrequency::Yearly),
        autopay: policy.autopay_vpa().is_some(),
        family_size: u32::try_from(record.family_members.len()).unwrap_or(u32::MAX).saturating_add(1),
    }
}
