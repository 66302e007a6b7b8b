//! Applicant profile structures, batch loading and derivation from intake answers

mod data;
pub mod derive;
pub mod loader;

pub use data::{ApplicantProfile, PaymentFrequency, PolicyType, DEFAULT_TERM_YEARS, MAX_AGE};
pub use derive::derive_profile;
pub use loader::{load_profiles, load_profiles_from_reader, ProfileRecord};
