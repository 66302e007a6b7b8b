//! Rate Quote - deterministic rating engine for health, life and family floater plans
//!
//! This library provides:
//! - Reference table loading (CSV directory or built-in dataset) with a shared, once-loaded source
//! - Applicant profiles, batch profile loading and derivation from intake answers
//! - A conversational intake state machine
//! - The rating engine: classification, candidate selection, premium rating, offer assembly and ranking

pub mod error;
pub mod intake;
pub mod profile;
pub mod rating;
pub mod tables;

// Re-export commonly used types
pub use error::{ProfileLoadError, QuoteError, TableError};
pub use profile::{ApplicantProfile, PaymentFrequency, PolicyType};
pub use rating::{quote, PricedOffer, Quoter, TierLabel};
pub use tables::{TableBundle, TableSource};
