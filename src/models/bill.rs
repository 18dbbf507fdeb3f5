use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// 计费明细 (一条工时记录)
///
/// 读入后不可变, 是 "实际发生了什么" 的唯一来源。
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct BillingRecord {
    pub employee_name: String,     // 形如 "SKA - Sam K. Andersen" 或纯姓名
    pub customer_name: String,
    pub date: NaiveDate,
    pub hours: BigDecimal,
    pub billable_rate: BigDecimal,
    pub billable_amount: BigDecimal,
}
