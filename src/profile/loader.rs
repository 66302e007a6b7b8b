//! Load a batch of applicant profiles from CSV
//!
//! One row per applicant. List-valued columns (`conditions`, `member_ages`)
//! are `;`-separated so they do not clash with the field delimiter.

use super::{ApplicantProfile, PaymentFrequency, PolicyType};
use crate::error::{ProfileLoadError, QuoteError};
use crate::tables::coerce;
use csv::Reader;
use serde::Deserialize;
use std::path::Path;

/// Raw CSV row matching the profile batch columns
#[derive(Debug, Deserialize)]
struct CsvRow {
    profile_id: String,
    policy_type: String,
    age: i64,
    #[serde(default)]
    smoker: String,
    bmi: f64,
    #[serde(default)]
    occupation_category: String,
    #[serde(default)]
    city: String,
    #[serde(default)]
    conditions: String,
    #[serde(default)]
    member_ages: String,
    sum_assured: u64,
    #[serde(default)]
    term_years: String,
    #[serde(default)]
    frequency: String,
    #[serde(default)]
    autopay: String,
    #[serde(default)]
    family_size: String,
}

/// A profile tagged with the identifier it was loaded under
#[derive(Debug, Clone)]
pub struct ProfileRecord {
    pub id: String,
    pub profile: ApplicantProfile,
}

fn optional_text(value: String) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn split_semicolons(value: &str) -> impl Iterator<Item = &str> {
    value.split(';').map(str::trim).filter(|s| !s.is_empty())
}

impl CsvRow {
    fn to_record(self) -> Result<ProfileRecord, QuoteError> {
        let policy_type: PolicyType = self.policy_type.parse()?;
        let age = u32::try_from(self.age)
            .map_err(|_| QuoteError::InvalidProfile(format!("age {} is out of range", self.age)))?;

        let frequency = if self.frequency.trim().is_empty() {
            PaymentFrequency::Yearly
        } else {
            self.frequency.parse()?
        };

        let mut ages_all: Vec<u32> = split_semicolons(&self.member_ages)
            .map(coerce::parse_u32)
            .collect();
        if ages_all.is_empty() {
            ages_all.push(age);
        }

        let family_size = match coerce::parse_u32(&self.family_size) {
            0 => ages_all.len() as u32,
            n => n,
        };

        let term_years = match coerce::parse_u32(&self.term_years) {
            0 => None,
            n => Some(n),
        };

        let profile = ApplicantProfile {
            policy_type,
            age,
            ages_all,
            smoker: coerce::parse_flag(&self.smoker),
            bmi: self.bmi,
            occupation_category: optional_text(self.occupation_category),
            city: optional_text(self.city),
            state_ut: None,
            conditions: split_semicolons(&self.conditions).map(str::to_string).collect(),
            sum_assured: self.sum_assured,
            term_years,
            frequency,
            autopay: coerce::parse_flag(&self.autopay),
            family_size,
        };
        profile.validate()?;

        Ok(ProfileRecord { id: self.profile_id, profile })
    }
}

/// Load all profiles from a CSV file
pub fn load_profiles<P: AsRef<Path>>(path: P) -> Result<Vec<ProfileRecord>, ProfileLoadError> {
    let reader = Reader::from_path(path)?;
    read_profiles(reader)
}

/// Load profiles from any reader (e.g., string buffer, request body)
pub fn load_profiles_from_reader<R: std::io::Read>(reader: R) -> Result<Vec<ProfileRecord>, ProfileLoadError> {
    read_profiles(Reader::from_reader(reader))
}

fn read_profiles<R: std::io::Read>(mut reader: Reader<R>) -> Result<Vec<ProfileRecord>, ProfileLoadError> {
    let mut records = Vec::new();

    for result in reader.deserialize() {
        let row: CsvRow = result?;
        let id = row.profile_id.clone();
        let record = row
            .to_record()
            .map_err(|source| ProfileLoadError::Invalid { id, source })?;
        records.push(record);
    }

    Ok(records)
}
