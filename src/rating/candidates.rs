//! Candidate product selection

use crate::profile::{ApplicantProfile, PolicyType};
use crate::tables::Product;
use log::debug;

/// Whether `product` may be offered to `profile`
pub fn is_eligible(product: &Product, profile: &ApplicantProfile) -> bool {
    if product.policy_type != Some(profile.policy_type) {
        debug!("{} skipped: policy type is not {}", product.product_id, profile.policy_type);
        return false;
    }
    if profile.age < product.min_age || profile.age > product.max_age {
        debug!("{} skipped: age {} outside {}-{}", product.product_id, profile.age, product.min_age, product.max_age);
        return false;
    }
    if profile.policy_type == PolicyType::FamilyFloater && !product.family_allowed {
        debug!("{} skipped: not sold as a family floater", product.product_id);
        return false;
    }
    true
}

/// Eligible products in catalog order
pub fn select<'a>(products: &'a [Product], profile: &ApplicantProfile) -> Vec<&'a Product> {
    products.iter().filter(|p| is_eligible(p, profile)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tables::TableBundle;

    fn ids(products: Vec<&Product>) -> Vec<&str> {
        products.into_iter().map(|p| p.product_id.as_str()).collect()
    }

    #[test]
    fn test_only_matching_policy_type() {
        let tables = TableBundle::default_bundle();

        let health = ApplicantProfile::new(PolicyType::Health, 40, 22.0, 500_000);
        assert_eq!(
            ids(select(&tables.products, &health)),
            vec!["HDFC_HEALTH_BASIC", "HDFC_HEALTH_PLUS", "ICICI_HEALTH_PREM"]
        );

        let life = ApplicantProfile::new(PolicyType::Life, 40, 22.0, 500_000);
        assert_eq!(ids(select(&tables.products, &life)), vec!["TATA_LIFE_TERM"]);
    }

    #[test]
    fn test_age_bounds_are_inclusive() {
        let tables = TableBundle::default_bundle();

        let at_max = ApplicantProfile::new(PolicyType::Health, 70, 22.0, 500_000);
        assert_eq!(ids(select(&tables.products, &at_max)), vec!["HDFC_HEALTH_PLUS", "ICICI_HEALTH_PREM"]);

        let too_young = ApplicantProfile::new(PolicyType::Health, 17, 22.0, 500_000);
        assert!(select(&tables.products, &too_young).is_empty());
    }

    #[test]
    fn test_floater_requires_family_flag() {
        let mut tables = TableBundle::default_bundle();
        let profile = ApplicantProfile::new(PolicyType::FamilyFloater, 30, 22.0, 500_000);
        assert_eq!(select(&tables.products, &profile).len(), 2);

        for product in tables.products.iter_mut() {
            if product.product_id == "HDFC_FAMILY_FLOATER" {
                product.family_allowed = false;
            }
        }
        assert_eq!(ids(select(&tables.products, &profile)), vec!["ICICI_FAMILY_PREM"]);
    }

    #[test]
    fn test_unknown_policy_type_never_selected() {
        let mut tables = TableBundle::default_bundle();
        tables.products[0].policy_type = None;
        let profile = ApplicantProfile::new(PolicyType::Health, 30, 22.0, 500_000);
        assert!(select(&tables.products, &profile).iter().all(|p| p.product_id != "HDFC_HEALTH_BASIC"));
    }
}
