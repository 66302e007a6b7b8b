//! Quote a batch of applicant profiles from CSV
//!
//! Profiles are rated in parallel against one shared table bundle; every
//! selected offer becomes one row of the output CSV.

use anyhow::{Context, Result};
use clap::Parser;
use log::warn;
use rate_quote::profile::{load_profiles, ProfileRecord};
use rate_quote::tables::{self, TableBundle};
use rate_quote::{quote, PricedOffer, QuoteError};
use rayon::prelude::*;
use serde::Serialize;
use std::path::PathBuf;
use std::time::Instant;

#[derive(Debug, Parser)]
#[command(name = "quote_batch", about = "Quote every profile in a CSV file")]
struct Args {
    /// Applicant profiles CSV
    #[arg(long, default_value = "data/sample_profiles.csv")]
    profiles: PathBuf,

    /// Output CSV path
    #[arg(long, default_value = "quote_output.csv")]
    output: PathBuf,

    /// Tables directory (defaults to $QUOTE_TABLES_DIR or data/tables)
    #[arg(long)]
    tables: Option<PathBuf>,
}

/// One selected offer for one profile
#[derive(Debug, Serialize)]
struct OutputRow<'a> {
    profile_id: &'a str,
    policy_type: &'a str,
    rank: usize,
    product_id: &'a str,
    tier_label: String,
    sum_assured: u64,
    price_annual_min: u64,
    price_annual_max: u64,
    price_monthly_min: u64,
    price_monthly_max: u64,
    explainers: String,
}

fn quote_all(records: &[ProfileRecord], tables: &TableBundle) -> Vec<Result<Vec<PricedOffer>, QuoteError>> {
    records
        .par_iter()
        .map(|record| quote(&record.profile, tables))
        .collect()
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let start = Instant::now();
    println!("Loading profiles from {}...", args.profiles.display());
    let records = load_profiles(&args.profiles)
        .with_context(|| format!("loading profiles from {}", args.profiles.display()))?;
    println!("Loaded {} profiles in {:?}", records.len(), start.elapsed());

    let dir = args.tables.clone().unwrap_or_else(tables::tables_dir_from_env);
    let bundle = tables::load_or_default(&dir);

    println!("Quoting...");
    let quote_start = Instant::now();
    let results = quote_all(&records, &bundle);
    println!("Quoted in {:?}", quote_start.elapsed());

    let mut writer = csv::Writer::from_path(&args.output)
        .with_context(|| format!("creating {}", args.output.display()))?;
    let mut offer_count = 0;
    let mut unquoted = 0;

    for (record, result) in records.iter().zip(&results) {
        let offers = match result {
            Ok(offers) => offers,
            Err(e) => {
                warn!("Profile {} not quoted: {}", record.id, e);
                unquoted += 1;
                continue;
            }
        };
        if offers.is_empty() {
            unquoted += 1;
        }
        for (rank, offer) in offers.iter().enumerate() {
            writer.serialize(OutputRow {
                profile_id: &record.id,
                policy_type: record.profile.policy_type.as_str(),
                rank: rank + 1,
                product_id: &offer.product_id,
                tier_label: offer.tier_label.to_string(),
                sum_assured: offer.sum_assured,
                price_annual_min: offer.price_annual_min,
                price_annual_max: offer.price_annual_max,
                price_monthly_min: offer.price_monthly_min,
                price_monthly_max: offer.price_monthly_max,
                explainers: offer.explainers.join(" "),
            })?;
            offer_count += 1;
        }
    }
    writer.flush()?;

    println!("\nSummary:");
    println!("  Profiles:         {}", records.len());
    println!("  Offers written:   {}", offer_count);
    println!("  Without offers:   {}", unquoted);
    println!("  Output:           {}", args.output.display());
    println!("  Total time:       {:?}", start.elapsed());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rate_quote::profile::load_profiles_from_reader;

    #[test]
    fn test_parallel_results_keep_profile_order() {
        let batch = "\
profile_id,policy_type,age,bmi,sum_assured,autopay
A,health,28,22.0,500000,Y
B,health,90,22.0,500000,N
C,family_floater,30,22.0,1000000,N
";
        let records = load_profiles_from_reader(batch.as_bytes()).unwrap();
        let results = quote_all(&records, &TableBundle::default_bundle());

        assert_eq!(results.len(), 3);
        assert_eq!(results[0].as_ref().unwrap()[0].price_annual_min, 7450);
        assert!(results[1].as_ref().unwrap().is_empty());
        assert_eq!(results[2].as_ref().unwrap().len(), 2);
    }
}
