//! Rate Quote CLI
//!
//! Quote a single applicant, inspect the reference tables, or run the intake
//! dialogue on stdin and quote the resulting profile.

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use rate_quote::intake::{welcome, IntakeSession, Prompt};
use rate_quote::profile::derive_profile;
use rate_quote::rating::{format_inr, rated_offers};
use rate_quote::tables::{self, TableBundle, TABLES_DIR_ENV};
use rate_quote::{quote, ApplicantProfile, PaymentFrequency, PolicyType, PricedOffer};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "rate_quote",
    version,
    about = "Rate applicants against health, life and family floater plan tables",
    after_help = "Examples:\n  rate_quote quote --policy-type health --age 28 --bmi 22 --sum-assured 500000 --autopay\n  rate_quote quote --profile applicant.json --json\n  rate_quote tables --dir data/tables"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Quote one applicant and print the selected offers")]
    Quote(QuoteArgs),
    #[command(about = "Load the reference tables, report row counts and consistency issues")]
    Tables {
        #[command(flatten)]
        source: TableArgs,
        #[arg(long, help = "Dump the loaded bundle as JSON")]
        json: bool,
    },
    #[command(about = "Answer the intake questions on stdin, then quote the derived profile")]
    Intake {
        #[command(flatten)]
        source: TableArgs,
        #[arg(long, help = "Emit offers as JSON")]
        json: bool,
    },
}

#[derive(Debug, Args)]
struct TableArgs {
    #[arg(long, help = "Tables directory (defaults to $QUOTE_TABLES_DIR or data/tables)")]
    dir: Option<PathBuf>,
    #[arg(long, conflicts_with = "dir", help = "Use the built-in dataset only")]
    builtin: bool,
}

impl TableArgs {
    fn load(&self) -> TableBundle {
        if self.builtin {
            return TableBundle::default_bundle();
        }
        tables::load_or_default(&self.resolve_dir())
    }

    fn resolve_dir(&self) -> PathBuf {
        self.dir.clone().unwrap_or_else(tables::tables_dir_from_env)
    }
}

#[derive(Debug, Args)]
struct QuoteArgs {
    #[command(flatten)]
    source: TableArgs,

    #[arg(long, help = "Applicant profile as a JSON file; other profile flags are ignored")]
    profile: Option<PathBuf>,

    #[arg(long, value_parser = parse_policy_type, default_value = "health")]
    policy_type: PolicyType,
    #[arg(long)]
    age: Option<u32>,
    #[arg(long, default_value_t = 22.0)]
    bmi: f64,
    #[arg(long, default_value_t = 500_000)]
    sum_assured: u64,
    #[arg(long)]
    smoker: bool,
    #[arg(long)]
    city: Option<String>,
    #[arg(long)]
    occupation: Option<String>,
    #[arg(long = "condition", help = "Condition code, repeatable")]
    conditions: Vec<String>,
    #[arg(long)]
    term_years: Option<u32>,
    #[arg(long, value_parser = parse_frequency, default_value = "yearly")]
    frequency: PaymentFrequency,
    #[arg(long)]
    autopay: bool,
    #[arg(long, default_value_t = 1)]
    family_size: u32,

    #[arg(long, help = "Emit offers as JSON")]
    json: bool,
    #[arg(long, help = "Print the premium build-up of every rated product")]
    breakdown: bool,
}

fn parse_policy_type(text: &str) -> Result<PolicyType, String> {
    text.parse().map_err(|e: rate_quote::QuoteError| e.to_string())
}

fn parse_frequency(text: &str) -> Result<PaymentFrequency, String> {
    text.parse().map_err(|e: rate_quote::QuoteError| e.to_string())
}

impl QuoteArgs {
    fn profile(&self) -> Result<ApplicantProfile> {
        if let Some(path) = &self.profile {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("reading profile {}", path.display()))?;
            return ApplicantProfile::from_json(&json)
                .with_context(|| format!("parsing profile {}", path.display()));
        }

        let Some(age) = self.age else {
            bail!("either --profile or --age is required");
        };
        let mut profile = ApplicantProfile::new(self.policy_type, age, self.bmi, self.sum_assured);
        profile.smoker = self.smoker;
        profile.city = self.city.clone();
        profile.occupation_category = self.occupation.clone();
        profile.conditions = self.conditions.clone();
        profile.term_years = self.term_years;
        profile.frequency = self.frequency;
        profile.autopay = self.autopay;
        profile.family_size = self.family_size;
        Ok(profile)
    }
}

fn print_offers(offers: &[PricedOffer]) {
    if offers.is_empty() {
        println!("No plans available for this profile.");
        return;
    }
    println!(
        "{:<22} {:<8} {:>14} {:>10} {:>10} {:>8} {:>8}",
        "Product", "Tier", "Cover", "Annual", "Annual+", "Monthly", "Mo+"
    );
    println!("{}", "-".repeat(86));
    for offer in offers {
        println!(
            "{:<22} {:<8} {:>14} {:>10} {:>10} {:>8} {:>8}",
            offer.product_id,
            offer.tier_label.to_string(),
            format_inr(offer.sum_assured),
            format_inr(offer.price_annual_min),
            format_inr(offer.price_annual_max),
            format_inr(offer.price_monthly_min),
            format_inr(offer.price_monthly_max),
        );
    }
    for offer in offers {
        println!("\n{} - {} ({})", offer.product_id, offer.product_name, offer.insurer_name);
        for bullet in &offer.bullets {
            println!("  * {}", bullet);
        }
        for addon in &offer.addons {
            println!("  + {} ({}/yr)", addon.name, addon.price_annual);
        }
        for why in &offer.explainers {
            println!("  ! {}", why);
        }
    }
}

fn emit(offers: &[PricedOffer], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(offers)?);
    } else {
        print_offers(offers);
    }
    Ok(())
}

fn run_quote(args: QuoteArgs) -> Result<()> {
    let profile = args.profile()?;
    let tables = args.source.load();

    if args.breakdown {
        for (_, premium) in rated_offers(&profile, &tables)? {
            println!(
                "{:<22} cover {:>12} base {:>10.2} loadings {:?} x{} discounts {:?} => {:.2}",
                premium.product_id,
                premium.sum_assured,
                premium.base_premium,
                premium.loadings.iter().map(|l| format!("{} {}%", l.source, l.percent)).collect::<Vec<_>>(),
                premium.family_multiplier,
                premium.discounts.iter().map(|d| format!("{} {}%", d.rule_name, d.percent)).collect::<Vec<_>>(),
                premium.annual_premium,
            );
        }
        println!();
    }

    let offers = quote(&profile, &tables)?;
    emit(&offers, args.json)
}

fn run_tables(source: TableArgs, json: bool) -> Result<()> {
    let bundle = if source.builtin {
        TableBundle::default_bundle()
    } else {
        let dir = source.resolve_dir();
        tables::load_from(&dir).with_context(|| {
            format!("loading tables from {} (set {} or pass --dir)", dir.display(), TABLES_DIR_ENV)
        })?
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&bundle)?);
        return Ok(());
    }

    println!("Reference tables");
    println!("================");
    for (table, rows) in bundle.table_sizes() {
        println!("  {:<20} {:>5} rows", table, rows);
    }
    if bundle.addons.is_none() {
        println!("  (no add-on table; built-in add-ons are offered)");
    }

    let issues = bundle.validate();
    if issues.is_empty() {
        println!("\nNo issues found.");
    } else {
        println!("\n{} issue(s):", issues.len());
        for issue in &issues {
            println!("  - {}", issue);
        }
    }
    Ok(())
}

fn show(prompts: &[Prompt]) {
    for prompt in prompts {
        println!("> {}", prompt.text);
        if !prompt.chips.is_empty() {
            println!("  [{}]", prompt.chips.join("] ["));
        }
    }
}

fn run_intake(source: TableArgs, json: bool) -> Result<()> {
    let tables = source.load();
    let mut session = IntakeSession::new();
    show(&[welcome()]);

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = line.context("reading answer from stdin")?;
        let prompts = session.advance(line.as_str());
        show(&prompts);
        if session.is_complete() {
            break;
        }
        io::stdout().flush()?;
    }

    if !session.is_complete() {
        bail!("intake ended at the {:?} stage before all answers were given", session.stage());
    }

    let today = chrono::Local::now().date_naive();
    let profile = derive_profile(session.record(), today);
    log::info!(
        "Derived profile: {} age {} bmi {} cover {}",
        profile.policy_type,
        profile.age,
        profile.bmi,
        profile.sum_assured
    );

    let offers = quote(&profile, &tables)?;
    emit(&offers, json)
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    match cli.command {
        Command::Quote(args) => run_quote(args),
        Command::Tables { source, json } => run_tables(source, json),
        Command::Intake { source, json } => run_intake(source, json),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_quote_flags() {
        let cli = Cli::try_parse_from([
            "rate_quote", "quote", "--age", "28", "--autopay", "--condition", "diabetes", "--condition", "asthma",
        ])
        .unwrap();
        let Command::Quote(args) = cli.command else { panic!("expected quote") };
        let profile = args.profile().unwrap();
        assert_eq!(profile.age, 28);
        assert!(profile.autopay);
        assert_eq!(profile.conditions, vec!["diabetes", "asthma"]);
        assert_eq!(profile.policy_type, PolicyType::Health);
    }

    #[test]
    fn test_quote_requires_age_or_profile() {
        let cli = Cli::try_parse_from(["rate_quote", "quote"]).unwrap();
        let Command::Quote(args) = cli.command else { panic!("expected quote") };
        assert!(args.profile().is_err());
    }

    #[test]
    fn test_builtin_conflicts_with_dir() {
        assert!(Cli::try_parse_from(["rate_quote", "tables", "--builtin", "--dir", "x"]).is_err());
    }
}
