use crate::models::{PricingRow, Tier};
use bigdecimal::{BigDecimal, Zero};

/// 降级顺序: Principal -> Senior -> Consultant -> Junior
pub const FALLBACK_CHAIN: [Tier; 4] = [
    Tier::PrincipalConsultant,
    Tier::SeniorConsultant,
    Tier::Consultant,
    Tier::JuniorConsultant,
];

/// 不在降级链上的档位 (Data Scientist / Support) 从 Consultant 开始
const DEFAULT_START: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPrice {
    pub price: BigDecimal,
    pub tier: Tier,
}

/// 从请求档位开始沿降级链取第一个 > 0 的价格; 都没有则返回 None, 绝不当作 0
pub fn resolve_price(row: &PricingRow, requested: Tier) -> Option<ResolvedPrice> {
    let start = FALLBACK_CHAIN
        .iter()
        .position(|&tier| tier == requested)
        .unwrap_or(DEFAULT_START);

    FALLBACK_CHAIN[start..].iter().find_map(|&tier| {
        row.price(tier)
            .filter(|price| **price > BigDecimal::zero())
            .map(|price| ResolvedPrice {
                price: price.clone(),
                tier,
            })
    })
}

/// FCC 统一价, 与档位无关
pub fn flat_price(row: &PricingRow) -> Option<BigDecimal> {
    row.price(Tier::Consultant)
        .filter(|price| **price > BigDecimal::zero())
        .cloned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(prices: &[(Tier, i64)]) -> PricingRow {
        prices
            .iter()
            .fold(PricingRow::new("ACME"), |row, &(tier, price)| {
                row.with_price(tier, BigDecimal::from(price))
            })
    }

    #[test]
    fn exact_tier_price_is_used() {
        let row = row(&[(Tier::SeniorConsultant, 1200), (Tier::Consultant, 1000)]);
        let resolved = resolve_price(&row, Tier::SeniorConsultant).unwrap();
        assert_eq!(resolved.price, BigDecimal::from(1200));
        assert_eq!(resolved.tier, Tier::SeniorConsultant);
    }

    #[test]
    fn skips_missing_and_zero_prices_downwards() {
        // Principal 缺失, Senior = 0
        let row = row(&[(Tier::SeniorConsultant, 0), (Tier::Consultant, 150)]);
        let resolved = resolve_price(&row, Tier::PrincipalConsultant).unwrap();
        assert_eq!(resolved.price, BigDecimal::from(150));
        assert_eq!(resolved.tier, Tier::Consultant);
    }

    #[test]
    fn never_falls_back_upwards() {
        let row = row(&[(Tier::PrincipalConsultant, 1500)]);
        assert_eq!(resolve_price(&row, Tier::Consultant), None);
    }

    #[test]
    fn no_usable_price_returns_none() {
        let row = row(&[(Tier::SeniorConsultant, 0), (Tier::JuniorConsultant, -5)]);
        assert_eq!(resolve_price(&row, Tier::PrincipalConsultant), None);
        assert_eq!(resolve_price(&PricingRow::new("ACME"), Tier::JuniorConsultant), None);
    }

    #[test]
    fn off_chain_tiers_start_at_consultant() {
        let row = row(&[
            (Tier::DataScientist, 1800),
            (Tier::SeniorConsultant, 1200),
            (Tier::JuniorConsultant, 800),
        ]);
        let resolved = resolve_price(&row, Tier::DataScientist).unwrap();
        assert_eq!(resolved.tier, Tier::JuniorConsultant);
        assert_eq!(resolved.price, BigDecimal::from(800));

        assert_eq!(resolve_price(&row, Tier::Support).unwrap().tier, Tier::JuniorConsultant);
    }

    #[test]
    fn flat_price_requires_positive_value() {
        assert_eq!(flat_price(&row(&[(Tier::Consultant, 950)])), Some(BigDecimal::from(950)));
        assert_eq!(flat_price(&row(&[(Tier::Consultant, 0)])), None);
        assert_eq!(flat_price(&PricingRow::new("ACME")), None);
    }
}
