//! Answers collected by the intake dialogue

use crate::profile::{PaymentFrequency, PolicyType};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Where the identity details came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdentitySource {
    AadhaarOfflineXml,
    AadhaarSecureQr,
    Ocr,
    Manual,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gender {
    M,
    F,
    X,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Identity {
    pub source: Option<IdentitySource>,
    pub name: Option<String>,
    pub dob: Option<NaiveDate>,
    /// Year of birth when only the year is known
    pub yob: Option<i32>,
    pub gender: Option<Gender>,
    pub aadhaar_last4: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    pub mobile: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SmokingFrequency {
    Never,
    Occasional,
    Daily,
}

impl SmokingFrequency {
    /// Occasional and daily smokers are both rated as smokers
    pub fn is_smoker(&self) -> bool {
        !matches!(self, SmokingFrequency::Never)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlcoholFrequency {
    None,
    Occasional,
    Regular,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagnosedCondition {
    pub name: String,
    pub diagnosed_on: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HealthInfo {
    pub height_cm: Option<u32>,
    pub weight_kg: Option<u32>,
    /// Rounded to one decimal place once both height and weight are known
    pub bmi: Option<f64>,
    pub smoker: Option<SmokingFrequency>,
    pub alcohol: Option<AlcoholFrequency>,
    pub conditions: Vec<DiagnosedCondition>,
    /// Set once the applicant has finished listing conditions
    pub conditions_complete: bool,
    pub occupation_category: Option<String>,
    pub city: Option<String>,
    pub state_ut: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Relation {
    Spouse,
    Child,
    Parent,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FamilyMember {
    pub relation: Relation,
    pub name: Option<String>,
    pub dob: Option<NaiveDate>,
    pub conditions: Vec<String>,
}

impl FamilyMember {
    pub fn new(relation: Relation) -> Self {
        Self {
            relation,
            name: None,
            dob: None,
            conditions: Vec::new(),
        }
    }
}

/// Progress of the UPI autopay question
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AutopayChoice {
    /// Applicant wants autopay; VPA not yet given
    Requested,
    Declined,
    Enrolled { vpa: String },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PolicyChoice {
    pub policy_type: Option<PolicyType>,
    pub sum_assured: Option<u64>,
    /// Waiting for a free-form coverage amount after "Custom amount"
    pub awaiting_custom_amount: bool,
    pub term_years: Option<u32>,
    pub premium_frequency: Option<PaymentFrequency>,
    pub autopay: Option<AutopayChoice>,
}

impl PolicyChoice {
    /// VPA of an enrolled autopay mandate
    pub fn autopay_vpa(&self) -> Option<&str> {
        match &self.autopay {
            Some(AutopayChoice::Enrolled { vpa }) => Some(vpa),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Consents {
    pub purpose_ack: bool,
    pub ekyc_offline_ok: bool,
    pub data_processing_ok: bool,
    pub medical_tests_ok: bool,
    pub declarations_ok: bool,
}

impl Consents {
    pub fn all() -> Self {
        Self {
            purpose_ack: true,
            ekyc_offline_ok: true,
            data_processing_ok: true,
            medical_tests_ok: true,
            declarations_ok: true,
        }
    }

    pub fn all_given(&self) -> bool {
        self.purpose_ack
            && self.ekyc_offline_ok
            && self.data_processing_ok
            && self.medical_tests_ok
            && self.declarations_ok
    }
}

/// Everything the applicant has told us so far
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IntakeRecord {
    pub identity: Identity,
    pub contact: Contact,
    pub health: HealthInfo,
    pub family_members: Vec<FamilyMember>,
    pub policy: PolicyChoice,
    pub consents: Consents,
}

/// One field-level change produced by a dialogue transition
#[derive(Debug, Clone, PartialEq)]
pub enum IntakeUpdate {
    VerifiedIdentity(Identity),
    ManualIdentity,
    Name(String),
    DateOfBirth(NaiveDate),
    Mobile(String),
    Email(String),
    HeightCm(u32),
    WeightKg(u32),
    Smoking(SmokingFrequency),
    Alcohol(AlcoholFrequency),
    AddCondition(String),
    ConditionsComplete,
    PolicyType(PolicyType),
    FamilyMembers(Vec<FamilyMember>),
    AwaitCustomAmount,
    SumAssured(u64),
    TermYears(u32),
    Frequency(PaymentFrequency),
    Autopay(AutopayChoice),
    ConsentsAccepted,
}

/// BMI from height and weight, rounded to one decimal
pub fn bmi_from(height_cm: u32, weight_kg: u32) -> f64 {
    let metres = height_cm as f64 / 100.0;
    let bmi = weight_kg as f64 / (metres * metres);
    (bmi * 10.0).round() / 10.0
}

impl IntakeRecord {
    /// Fold one update into the record
    pub fn apply(&mut self, update: IntakeUpdate) {
        match update {
            IntakeUpdate::VerifiedIdentity(identity) => self.identity = identity,
            IntakeUpdate::ManualIdentity => self.identity.source = Some(IdentitySource::Manual),
            IntakeUpdate::Name(name) => self.identity.name = Some(name),
            IntakeUpdate::DateOfBirth(dob) => self.identity.dob = Some(dob),
            IntakeUpdate::Mobile(mobile) => self.contact.mobile = Some(mobile),
            IntakeUpdate::Email(email) => self.contact.email = Some(email),
            IntakeUpdate::HeightCm(height) => self.health.height_cm = Some(height),
            IntakeUpdate::WeightKg(weight) => {
                self.health.weight_kg = Some(weight);
                self.health.bmi = self.health.height_cm.map(|h| bmi_from(h, weight));
            }
            IntakeUpdate::Smoking(freq) => self.health.smoker = Some(freq),
            IntakeUpdate::Alcohol(freq) => self.health.alcohol = Some(freq),
            IntakeUpdate::AddCondition(name) => {
                if !self.health.conditions.iter().any(|c| c.name == name) {
                    self.health.conditions.push(DiagnosedCondition { name, diagnosed_on: None });
                }
            }
            IntakeUpdate::ConditionsComplete => self.health.conditions_complete = true,
            IntakeUpdate::PolicyType(policy_type) => self.policy.policy_type = Some(policy_type),
            IntakeUpdate::FamilyMembers(members) => self.family_members = members,
            IntakeUpdate::AwaitCustomAmount => self.policy.awaiting_custom_amount = true,
            IntakeUpdate::SumAssured(amount) => {
                self.policy.sum_assured = Some(amount);
                self.policy.awaiting_custom_amount = false;
            }
            IntakeUpdate::TermYears(term) => self.policy.term_years = Some(term),
            IntakeUpdate::Frequency(freq) => self.policy.premium_frequency = Some(freq),
            IntakeUpdate::Autopay(choice) => self.policy.autopay = Some(choice),
            IntakeUpdate::ConsentsAccepted => self.consents = Consents::all(),
        }
    }
}
