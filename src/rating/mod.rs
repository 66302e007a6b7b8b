//! Rating engine: turns an applicant profile and a table bundle into ranked offers

pub mod candidates;
pub mod classify;
mod engine;
pub mod offer;
pub mod premium;
pub mod rank;

pub use classify::{OccupationClass, RiskClass};
pub use engine::{quote, rated_offers, Quoter};
pub use offer::{format_inr, round50, AddOnQuote, PricedOffer, TierLabel};
pub use premium::PremiumBreakdown;
