use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// 价格档位
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Tier {
    #[serde(rename = "Junior Consultant")]
    JuniorConsultant,
    #[serde(rename = "Consultant")]
    Consultant,
    #[serde(rename = "Senior Consultant")]
    SeniorConsultant,
    #[serde(rename = "Principal Consultant")]
    PrincipalConsultant,
    #[serde(rename = "Data Scientist")]
    DataScientist,
    #[serde(rename = "Support")]
    Support,
}

impl Tier {
    /// 常规价格表的全部档位列, 顺序即 CSV 列顺序
    pub const ALL: [Tier; 6] = [
        Tier::JuniorConsultant,
        Tier::Consultant,
        Tier::SeniorConsultant,
        Tier::PrincipalConsultant,
        Tier::DataScientist,
        Tier::Support,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::JuniorConsultant => "Junior Consultant",
            Tier::Consultant => "Consultant",
            Tier::SeniorConsultant => "Senior Consultant",
            Tier::PrincipalConsultant => "Principal Consultant",
            Tier::DataScientist => "Data Scientist",
            Tier::Support => "Support",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Tier::ALL
            .iter()
            .copied()
            .find(|tier| tier.as_str() == s.trim())
            .ok_or_else(|| format!("unknown tier '{}'", s))
    }
}

/// 员工目录条目 (canonical_name 为模糊匹配目标)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmployeeDirectoryEntry {
    pub name: String,
    pub title: String,
}

/// 价格表中的一行: 客户 -> {档位 -> 单价}
///
/// 缺失的档位即空单元格。FCC 表只在 `Consultant` 下存放统一价格。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingRow {
    pub customer: String,
    #[serde(default)]
    pub prices: BTreeMap<Tier, BigDecimal>,
}

impl PricingRow {
    pub fn new(customer: impl Into<String>) -> Self {
        Self {
            customer: customer.into(),
            prices: BTreeMap::new(),
        }
    }

    pub fn with_price(mut self, tier: Tier, price: BigDecimal) -> Self {
        self.prices.insert(tier, price);
        self
    }

    pub fn price(&self, tier: Tier) -> Option<&BigDecimal> {
        self.prices.get(&tier)
    }
}

/// 价格表 (Regular 或 FCC)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PricingTable {
    pub rows: Vec<PricingRow>,
}

impl PricingTable {
    pub fn new(rows: Vec<PricingRow>) -> Self {
        Self { rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&PricingRow> {
        self.rows.get(index)
    }

    pub fn customers(&self) -> impl Iterator<Item = &str> {
        self.rows.iter().map(|row| row.customer.as_str())
    }
}

/// 只读参考数据: 员工目录 + 两张价格表
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReferenceData {
    #[serde(default)]
    pub directory: Vec<EmployeeDirectoryEntry>,
    #[serde(default)]
    pub regular: PricingTable,
    #[serde(default)]
    pub fcc: PricingTable,
}
