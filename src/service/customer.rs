use crate::models::{CustomerType, MatchResult, PricingTable};
use crate::service::similarity::{best_match, clean, Ratio, Similarity};

/// 客户匹配结果; target 指向命中的价格表及行号
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomerMatch {
    pub result: MatchResult,
    pub target: Option<(CustomerType, usize)>,
}

impl CustomerMatch {
    pub fn customer_type(&self) -> Option<CustomerType> {
        self.target.map(|(kind, _)| kind)
    }
}

/// 计费侧客户名 -> FCC 表 / Regular 表
///
/// FCC 优先: 两张表都过阈值时归为 FCC。
pub struct CustomerMatcher {
    threshold: u8,
    scorer: Box<dyn Similarity>,
}

impl CustomerMatcher {
    pub fn new(threshold: u8) -> Self {
        Self::with_scorer(threshold, Box::new(Ratio))
    }

    pub fn with_scorer(threshold: u8, scorer: Box<dyn Similarity>) -> Self {
        Self { threshold, scorer }
    }

    pub fn match_customer(&self, raw_name: &str, fcc: &PricingTable, regular: &PricingTable) -> CustomerMatch {
        let query = normalize_customer_name(raw_name);
        let mut best_score = 0;

        for (kind, table) in [(CustomerType::Fcc, fcc), (CustomerType::Regular, regular)] {
            let Some((idx, score)) = self.best_in(&query, table) else {
                continue;
            };
            if score >= self.threshold {
                return CustomerMatch {
                    result: MatchResult::matched(table.rows[idx].customer.trim(), score),
                    target: Some((kind, idx)),
                };
            }
            best_score = best_score.max(score);
        }

        tracing::debug!("客户未匹配: '{}' 最佳得分 {}", raw_name, best_score);
        CustomerMatch {
            result: MatchResult::unmatched(best_score),
            target: None,
        }
    }

    fn best_in(&self, query: &str, table: &PricingTable) -> Option<(usize, u8)> {
        let candidates: Vec<String> = table.customers().map(normalize_customer_name).collect();
        best_match(self.scorer.as_ref(), query, candidates.iter().map(String::as_str))
    }
}

/// 客户名按整串比较, 查询与候选走同一套清洗
pub fn normalize_customer_name(name: &str) -> String {
    clean(name)
}
