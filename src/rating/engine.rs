//! Quoting entry point
//!
//! Classify the applicant, pick candidate products, rate each one, assemble
//! offers and keep the representative few. Pure and synchronous; the table
//! bundle is only read.

use super::classify::RiskClass;
use super::offer::{assemble, PricedOffer};
use super::premium::{rate, PremiumBreakdown};
use super::{candidates, rank};
use crate::error::QuoteError;
use crate::profile::ApplicantProfile;
use crate::tables::{TableBundle, TableSource};
use log::debug;
use std::sync::Arc;

/// Price every eligible product for `profile` and return up to three offers
pub fn quote(profile: &ApplicantProfile, tables: &TableBundle) -> Result<Vec<PricedOffer>, QuoteError> {
    let offers = rated_offers(profile, tables)?
        .into_iter()
        .map(|(offer, _)| offer)
        .collect();
    Ok(rank::select(offers))
}

/// Every rateable candidate with its premium breakdown, unranked and in catalog order
pub fn rated_offers(
    profile: &ApplicantProfile,
    tables: &TableBundle,
) -> Result<Vec<(PricedOffer, PremiumBreakdown)>, QuoteError> {
    profile.validate()?;

    let risk = RiskClass::of(profile, tables);
    debug!(
        "Applicant risk: bmi bucket {}, city tier {}, occupation {}",
        risk.bmi_bucket,
        risk.city_tier.as_str(),
        risk.occupation.level
    );

    let offers = candidates::select(&tables.products, profile)
        .into_iter()
        .filter_map(|product| {
            rate(product, profile, &risk, tables)
                .map(|premium| (assemble(product, &premium, profile, &risk, tables), premium))
        })
        .collect();
    Ok(offers)
}

/// Quotes against a shared table source
///
/// # Example
/// ```ignore
/// let quoter = Quoter::new(Arc::new(TableSource::from_env()));
/// let offers = quoter.quote(&profile)?;
/// ```
#[derive(Debug, Clone)]
pub struct Quoter {
    source: Arc<TableSource>,
}

impl Quoter {
    pub fn new(source: Arc<TableSource>) -> Self {
        Self { source }
    }

    /// Quoter over the built-in dataset only
    pub fn builtin() -> Self {
        Self::new(Arc::new(TableSource::builtin()))
    }

    pub fn tables(&self) -> Arc<TableBundle> {
        self.source.bundle()
    }

    pub fn quote(&self, profile: &ApplicantProfile) -> Result<Vec<PricedOffer>, QuoteError> {
        quote(profile, &self.source.bundle())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::{PaymentFrequency, PolicyType};
    use crate::tables::{HealthRate, Product};

    fn baseline_profile() -> ApplicantProfile {
        let mut profile = ApplicantProfile::new(PolicyType::Health, 28, 22.0, 500_000);
        profile.autopay = true;
        profile
    }

    #[test]
    fn test_end_to_end_health_quote() {
        let tables = TableBundle::default_bundle();
        let offers = quote(&baseline_profile(), &tables).unwrap();

        let ids: Vec<&str> = offers.iter().map(|o| o.product_id.as_str()).collect();
        assert_eq!(ids, vec!["HDFC_HEALTH_BASIC", "HDFC_HEALTH_PLUS", "ICICI_HEALTH_PREM"]);

        let basic = &offers[0];
        assert_eq!(basic.sum_assured, 500_000);
        assert_eq!(basic.price_annual_min, 7450);
        assert_eq!(basic.price_monthly_min, 600);
        assert_eq!(offers[1].sum_assured, 1_000_000);
        assert_eq!(offers[2].tier_label, crate::rating::TierLabel::Premium);
    }

    #[test]
    fn test_every_offer_price_is_a_multiple_of_50() {
        let tables = TableBundle::default_bundle();
        for policy_type in [PolicyType::Health, PolicyType::Life, PolicyType::FamilyFloater] {
            for age in [18, 30, 42] {
                for bmi in [17.0, 22.0, 27.5, 33.0] {
                    let mut profile = ApplicantProfile::new(policy_type, age, bmi, 750_000);
                    profile.smoker = age == 42;
                    profile.term_years = Some(20);
                    profile.family_size = 3;
                    profile.frequency = if bmi > 25.0 { PaymentFrequency::Monthly } else { PaymentFrequency::Yearly };
                    for offer in quote(&profile, &tables).unwrap() {
                        assert_eq!(offer.price_annual_min % 50, 0);
                        assert_eq!(offer.price_annual_max % 50, 0);
                        assert_eq!(offer.price_monthly_min % 50, 0);
                        assert!(offer.price_annual_min <= offer.price_annual_max);
                    }
                }
            }
        }
    }

    #[test]
    fn test_no_candidates_is_empty_not_error() {
        let tables = TableBundle::default_bundle();
        let profile = ApplicantProfile::new(PolicyType::Health, 90, 22.0, 500_000);
        assert_eq!(quote(&profile, &tables), Ok(Vec::new()));
        assert_eq!(quote(&baseline_profile(), &TableBundle::default()), Ok(Vec::new()));
    }

    #[test]
    fn test_invalid_profile_is_rejected() {
        let tables = TableBundle::default_bundle();
        let mut profile = baseline_profile();
        profile.bmi = 0.0;
        assert!(matches!(quote(&profile, &tables), Err(QuoteError::InvalidProfile(_))));
    }

    #[test]
    fn test_floater_quote_with_family() {
        let tables = TableBundle::default_bundle();
        let mut profile = ApplicantProfile::new(PolicyType::FamilyFloater, 30, 22.0, 1_000_000);
        profile.family_size = 4;
        profile.frequency = PaymentFrequency::Monthly;

        let offers = quote(&profile, &tables).unwrap();
        assert_eq!(offers.len(), 2);
        // 13500 * 2.6 = 35100
        assert_eq!(offers[0].product_id, "HDFC_FAMILY_FLOATER");
        assert_eq!(offers[0].price_annual_min, 35100);
        assert!(offers[0].explainers.iter().any(|e| e.starts_with("Floater price")));
    }

    #[test]
    fn test_large_catalog_is_reduced_to_three() {
        let mut tables = TableBundle::default_bundle();
        let template: Product = tables.product("HDFC_HEALTH_BASIC").unwrap().clone();
        for (i, premium) in [9000.0, 9100.0].into_iter().enumerate() {
            let id = format!("EXTRA_{}", i);
            tables.products.push(Product { product_id: id.clone(), ..template.clone() });
            tables.rates_health.push(HealthRate {
                product_id: id,
                age_band_min: 18,
                age_band_max: 35,
                smoker: false,
                bmi_bucket: "any".into(),
                city_tier: crate::tables::CityTier::Any,
                sum_assured: 500_000,
                base_premium_annual: premium,
            });
        }

        let profile = baseline_profile();
        assert_eq!(rated_offers(&profile, &tables).unwrap().len(), 5);

        let offers = quote(&profile, &tables).unwrap();
        let ids: Vec<&str> = offers.iter().map(|o| o.product_id.as_str()).collect();
        // sorted: BASIC, EXTRA_0, EXTRA_1, PLUS, PREM
        assert_eq!(ids, vec!["HDFC_HEALTH_BASIC", "EXTRA_1", "ICICI_HEALTH_PREM"]);
    }

    #[test]
    fn test_quoter_shares_source() {
        let quoter = Quoter::builtin();
        let first = quoter.quote(&baseline_profile()).unwrap();
        let second = quoter.clone().quote(&baseline_profile()).unwrap();
        assert_eq!(first, second);
        assert!(Arc::ptr_eq(&quoter.tables(), &quoter.clone().tables()));
    }
}
