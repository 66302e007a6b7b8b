//! Offer assembly: price bands, benefit bullets, add-ons and rationale

use super::classify::RiskClass;
use super::premium::PremiumBreakdown;
use crate::profile::{ApplicantProfile, PolicyType};
use crate::tables::{Product, TableBundle};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Prices are quoted to the nearest multiple of this many rupees
pub const ROUNDING_STEP: f64 = 50.0;

/// Display tier derived from the product id
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TierLabel {
    Silver,
    Gold,
    Premium,
}

impl TierLabel {
    /// `PLUS` in the id means Gold, `PREM` means Premium, anything else Silver
    pub fn for_product(product_id: &str) -> Self {
        if product_id.contains("PLUS") {
            TierLabel::Gold
        } else if product_id.contains("PREM") {
            TierLabel::Premium
        } else {
            TierLabel::Silver
        }
    }
}

impl fmt::Display for TierLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TierLabel::Silver => "Silver",
            TierLabel::Gold => "Gold",
            TierLabel::Premium => "Premium",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddOnQuote {
    pub name: String,
    pub price_annual: f64,
}

/// One priced plan as shown to the applicant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricedOffer {
    pub product_id: String,
    pub product_name: String,
    pub insurer_name: String,
    pub tier_label: TierLabel,
    #[serde(rename = "sum_assured_inr")]
    pub sum_assured: u64,
    pub price_annual_min: u64,
    /// Includes every default-recommended add-on
    pub price_annual_max: u64,
    pub price_monthly_min: u64,
    pub price_monthly_max: u64,
    pub bullets: Vec<String>,
    pub addons: Vec<AddOnQuote>,
    pub explainers: Vec<String>,
}

/// Nearest multiple of 50, halves rounding up. Negative values clamp to 0.
pub fn round50(value: f64) -> u64 {
    let steps = (value / ROUNDING_STEP).round().max(0.0);
    (steps * ROUNDING_STEP) as u64
}

/// Indian digit grouping: last three digits, then groups of two (5,00,000)
pub fn format_inr(amount: u64) -> String {
    let digits = amount.to_string();
    if digits.len() <= 3 {
        return digits;
    }
    let (head, tail) = digits.split_at(digits.len() - 3);
    let mut groups: Vec<&str> = Vec::new();
    let mut end = head.len();
    while end > 2 {
        groups.push(&head[end - 2..end]);
        end -= 2;
    }
    groups.push(&head[..end]);
    groups.reverse();
    format!("{},{}", groups.join(","), tail)
}

struct OfferedAddOn {
    quote: AddOnQuote,
    default_recommended: bool,
}

fn fallback_addons() -> Vec<OfferedAddOn> {
    [("Accidental cover", 1000.0, true), ("Critical illness", 1500.0, true), ("Worldwide coverage", 650.0, false)]
        .into_iter()
        .map(|(name, price_annual, default_recommended)| OfferedAddOn {
            quote: AddOnQuote { name: name.to_string(), price_annual },
            default_recommended,
        })
        .collect()
}

fn addons_for(product: &Product, tables: &TableBundle) -> Vec<OfferedAddOn> {
    match &tables.addons {
        Some(addons) => addons
            .iter()
            .filter(|a| a.applies_to.includes(&product.product_id))
            .map(|a| OfferedAddOn {
                quote: AddOnQuote { name: a.name.clone(), price_annual: a.price_annual },
                default_recommended: a.default_recommended,
            })
            .collect(),
        None => fallback_addons(),
    }
}

fn format_percent(pct: f64) -> String {
    if pct.fract() == 0.0 {
        format!("{}", pct as i64)
    } else {
        format!("{}", pct)
    }
}

/// Benefit bullets in fixed order, unset attributes omitted
pub fn bullets(product: &Product, sum_assured: u64) -> Vec<String> {
    let mut bullets = vec![format!("Hospitalization cover up to ₹{}", format_inr(sum_assured))];
    if let Some(limit) = &product.room_rent_limit {
        bullets.push(format!("Room rent: {}", limit));
    }
    if let Some(copay) = product.copay_percent {
        bullets.push(format!("Co-pay: {}%", format_percent(copay)));
    }
    if product.outpatient_cover {
        bullets.push("OPD/Day-care cover".to_string());
    }
    if product.maternity_cover {
        bullets.push("Maternity cover".to_string());
    }
    bullets
}

/// Plain-language reasons behind the price
pub fn explainers(product: &Product, profile: &ApplicantProfile, risk: &RiskClass) -> Vec<String> {
    let mut why = Vec::new();
    if profile.smoker {
        why.push("Smoker rate applies.");
    }
    match risk.bmi_bucket.as_str() {
        "over" => why.push("Slight BMI loading may apply."),
        "obese" => why.push("High BMI loading may apply."),
        _ => {}
    }
    if profile.has_condition("diabetes") {
        why.push("Waiting period/loading likely for diabetes.");
    }
    if profile.policy_type == PolicyType::FamilyFloater && profile.family_size >= 3 {
        why.push("Floater price is based on highest-risk member and family size.");
    }
    if product.maternity_cover {
        why.push("Includes maternity benefits.");
    }
    if product.outpatient_cover {
        why.push("Includes OPD/day-care cover.");
    }
    why.into_iter().map(String::from).collect()
}

/// Build the displayed offer for a rated product
pub fn assemble(
    product: &Product,
    premium: &PremiumBreakdown,
    profile: &ApplicantProfile,
    risk: &RiskClass,
    tables: &TableBundle,
) -> PricedOffer {
    let addons = addons_for(product, tables);
    let recommended_total: f64 = addons
        .iter()
        .filter(|a| a.default_recommended)
        .map(|a| a.quote.price_annual)
        .sum();

    let price_annual_min = round50(premium.annual_premium);
    let price_annual_max = round50(premium.annual_premium + recommended_total).max(price_annual_min);

    PricedOffer {
        product_id: product.product_id.clone(),
        product_name: product.product_name.clone(),
        insurer_name: product.insurer_name.clone(),
        tier_label: TierLabel::for_product(&product.product_id),
        sum_assured: premium.sum_assured,
        price_annual_min,
        price_annual_max,
        price_monthly_min: round50(price_annual_min as f64 / 12.0),
        price_monthly_max: round50(price_annual_max as f64 / 12.0),
        bullets: bullets(product, premium.sum_assured),
        addons: addons.into_iter().map(|a| a.quote).collect(),
        explainers: explainers(product, profile, risk),
    }
}
