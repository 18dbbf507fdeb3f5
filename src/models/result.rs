use crate::models::Tier;
use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

/// 客户所属价格表
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CustomerType {
    #[serde(rename = "FCC")]
    Fcc,
    #[serde(rename = "Regular")]
    Regular,
}

impl fmt::Display for CustomerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CustomerType::Fcc => f.write_str("FCC"),
            CustomerType::Regular => f.write_str("Regular"),
        }
    }
}

/// 模糊匹配结果: 未匹配时 matched 为 None, score 仍保留最佳得分用于诊断
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchResult {
    pub matched: Option<String>,
    pub score: u8,
}

impl MatchResult {
    pub fn matched(name: impl Into<String>, score: u8) -> Self {
        Self {
            matched: Some(name.into()),
            score,
        }
    }

    pub fn unmatched(score: u8) -> Self {
        Self { matched: None, score }
    }

    pub fn is_match(&self) -> bool {
        self.matched.is_some()
    }
}

/// 实际取价所用的档位
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PricedTier {
    Tier(Tier),
    /// FCC 统一价, 与档位无关
    Flat,
}

impl fmt::Display for PricedTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PricedTier::Tier(tier) => f.write_str(tier.as_str()),
            PricedTier::Flat => f.write_str("Consultant (FCC)"),
        }
    }
}

impl Serialize for PricedTier {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// 对账结果 (每条计费明细恰好一条)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReconciliationRecord {
    // 原始字段
    pub employee_name: String,
    pub customer_name: String,
    pub date: NaiveDate,
    pub hours: BigDecimal,
    pub rate_charged: BigDecimal,
    pub amount_billed: BigDecimal,

    // 员工匹配
    pub matched_employee: Option<String>,
    pub employee_title: Option<String>,
    pub employee_match_score: u8,
    pub normalized_rank: Tier,

    // 客户匹配
    pub customer_type: Option<CustomerType>,
    pub matched_customer: Option<String>,
    pub customer_match_score: u8,

    // 定价与差异
    pub rate_rank_used: Option<PricedTier>,
    pub expected_rate: Option<BigDecimal>,
    pub expected_amount: Option<BigDecimal>,
    pub discrepancy: Option<BigDecimal>,
    pub discrepancy_percent: Option<BigDecimal>,
}

/// 未匹配诊断项 (原始名称, 最佳得分)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UnmatchedEntry {
    pub raw_name: String,
    pub score: u8,
}

/// 一次对账运行的完整输出
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReconciliationOutput {
    pub records: Vec<ReconciliationRecord>,
    pub unmatched_employees: Vec<UnmatchedEntry>,
    pub unmatched_customers: Vec<UnmatchedEntry>,
}
