//! Selection of the offers shown side by side

use super::offer::PricedOffer;

/// Most offers ever returned
pub const MAX_OFFERS: usize = 3;

/// Positions kept from a price-sorted list of `n` offers
pub fn representative_indices(n: usize) -> Vec<usize> {
    if n >= MAX_OFFERS {
        vec![0, n / 2, n - 1]
    } else {
        (0..n).collect()
    }
}

/// Sort by minimum annual price (stable) and keep cheapest, median and dearest
pub fn select(mut offers: Vec<PricedOffer>) -> Vec<PricedOffer> {
    offers.sort_by_key(|o| o.price_annual_min);
    let keep = representative_indices(offers.len());
    offers
        .into_iter()
        .enumerate()
        .filter(|(i, _)| keep.contains(i))
        .map(|(_, offer)| offer)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rating::offer::TierLabel;

    fn offer(id: &str, price: u64) -> PricedOffer {
        PricedOffer {
            product_id: id.to_string(),
            product_name: id.to_string(),
            insurer_name: "Acme".to_string(),
            tier_label: TierLabel::for_product(id),
            sum_assured: 500_000,
            price_annual_min: price,
            price_annual_max: price + 2500,
            price_monthly_min: 0,
            price_monthly_max: 0,
            bullets: Vec::new(),
            addons: Vec::new(),
            explainers: Vec::new(),
        }
    }

    fn ids(offers: &[PricedOffer]) -> Vec<&str> {
        offers.iter().map(|o| o.product_id.as_str()).collect()
    }

    #[test]
    fn test_five_offers_keep_indices_0_2_4() {
        let offers = vec![offer("E", 500), offer("A", 100), offer("D", 400), offer("B", 200), offer("C", 300)];
        assert_eq!(ids(&select(offers)), vec!["A", "C", "E"]);
        assert_eq!(representative_indices(5), vec![0, 2, 4]);
    }

    #[test]
    fn test_four_offers_take_upper_median() {
        let offers = vec![offer("A", 100), offer("B", 200), offer("C", 300), offer("D", 400)];
        assert_eq!(ids(&select(offers)), vec!["A", "C", "D"]);
    }

    #[test]
    fn test_fewer_than_three_are_not_padded() {
        assert!(select(Vec::new()).is_empty());
        assert_eq!(ids(&select(vec![offer("A", 100)])), vec!["A"]);
        assert_eq!(ids(&select(vec![offer("B", 200), offer("A", 100)])), vec!["A", "B"]);
    }

    #[test]
    fn test_equal_prices_keep_input_order() {
        let offers = vec![offer("X", 100), offer("Y", 100), offer("Z", 100)];
        assert_eq!(ids(&select(offers)), vec!["X", "Y", "Z"]);
    }

    #[test]
    fn test_rank_ignores_tier_label() {
        // the cheapest plan can still be labelled Premium
        let offers = vec![offer("ICICI_HEALTH_PREM", 100), offer("HDFC_HEALTH_PLUS", 200), offer("BASIC", 300)];
        let selected = select(offers);
        assert_eq!(selected[0].tier_label, TierLabel::Premium);
    }
}
