//! AWS Lambda handler for quoting an applicant
//!
//! Accepts an applicant profile as the JSON event payload and returns the
//! selected offers. Tables are loaded once per container from
//! `$QUOTE_TABLES_DIR` (or the built-in dataset) and shared across invocations.

use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use log::{info, warn};
use rate_quote::rating::{rated_offers, PremiumBreakdown};
use rate_quote::{quote, ApplicantProfile, PricedOffer, QuoteError, Quoter, TableSource};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

/// Event payload: the profile fields, plus optional flags
#[derive(Debug, Deserialize)]
pub struct QuoteRequest {
    #[serde(flatten)]
    pub profile: Value,

    /// Include the premium build-up of every rated product
    #[serde(default, rename = "includeBreakdown")]
    pub include_breakdown: bool,
}

#[derive(Debug, Serialize)]
pub struct QuoteResponse {
    pub status: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub offers: Vec<PricedOffer>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub breakdown: Vec<PremiumBreakdown>,
    pub execution_time_ms: u64,
}

impl QuoteResponse {
    fn rejected(error: QuoteError, start: std::time::Instant) -> Self {
        Self {
            status: 400,
            error: Some(error.to_string()),
            offers: Vec::new(),
            breakdown: Vec::new(),
            execution_time_ms: start.elapsed().as_millis() as u64,
        }
    }
}

fn parse_profile(payload: Value) -> Result<ApplicantProfile, QuoteError> {
    ApplicantProfile::from_json(&payload.to_string())
}

async fn handler(quoter: Quoter, event: LambdaEvent<QuoteRequest>) -> Result<QuoteResponse, Error> {
    let start = std::time::Instant::now();
    let request = event.payload;

    let profile = match parse_profile(request.profile) {
        Ok(p) => p,
        Err(e) => {
            warn!("Rejected request: {}", e);
            return Ok(QuoteResponse::rejected(e, start));
        }
    };

    let tables = quoter.tables();
    let offers = match quote(&profile, &tables) {
        Ok(offers) => offers,
        Err(e) => return Ok(QuoteResponse::rejected(e, start)),
    };
    let breakdown = if request.include_breakdown {
        rated_offers(&profile, &tables)?.into_iter().map(|(_, premium)| premium).collect()
    } else {
        Vec::new()
    };

    info!(
        "Quoted {} {} applicant: {} offer(s) in {:?}",
        profile.policy_type,
        profile.age,
        offers.len(),
        start.elapsed()
    );

    Ok(QuoteResponse {
        status: 200,
        error: None,
        offers,
        breakdown,
        execution_time_ms: start.elapsed().as_millis() as u64,
    })
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    env_logger::init();

    let quoter = Quoter::new(Arc::new(TableSource::from_env()));
    run(service_fn(move |event| {
        let quoter = quoter.clone();
        async move { handler(quoter, event).await }
    }))
    .await
}
