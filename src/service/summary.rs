use crate::models::{ReconciliationOutput, ReconciliationRecord, UnmatchedEntry};
use bigdecimal::{BigDecimal, Zero};
use indexmap::IndexSet;
use serde::Serialize;

/// 对账汇总统计
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReconSummary {
    pub total_records: usize,
    pub total_billed: BigDecimal,
    pub total_expected: BigDecimal,
    pub total_discrepancy: BigDecimal,
    pub discrepancy_threshold_percent: BigDecimal,
    pub discrepant_records: usize,
    pub unmatched_employees: usize,
    pub unmatched_customers: usize,
}

impl ReconSummary {
    /// 空值 (未定价) 不参与求和
    pub fn from_output(output: &ReconciliationOutput, threshold_percent: &BigDecimal) -> Self {
        let mut total_billed = BigDecimal::zero();
        let mut total_expected = BigDecimal::zero();
        let mut total_discrepancy = BigDecimal::zero();

        for rec in &output.records {
            total_billed += &rec.amount_billed;
            if let Some(expected) = &rec.expected_amount {
                total_expected += expected;
            }
            if let Some(diff) = &rec.discrepancy {
                total_discrepancy += diff;
            }
        }

        Self {
            total_records: output.records.len(),
            total_billed,
            total_expected,
            total_discrepancy,
            discrepancy_threshold_percent: threshold_percent.clone(),
            discrepant_records: output
                .records
                .iter()
                .filter(|r| exceeds_threshold(r, threshold_percent))
                .count(),
            unmatched_employees: unique_unmatched(&output.unmatched_employees).len(),
            unmatched_customers: unique_unmatched(&output.unmatched_customers).len(),
        }
    }
}

fn exceeds_threshold(record: &ReconciliationRecord, threshold_percent: &BigDecimal) -> bool {
    record
        .discrepancy_percent
        .as_ref()
        .map_or(false, |pct| pct.abs() > *threshold_percent)
}

/// 差异超过阈值的记录, 按 |差异金额| 降序
pub fn discrepant_records<'a>(
    output: &'a ReconciliationOutput,
    threshold_percent: &BigDecimal,
) -> Vec<&'a ReconciliationRecord> {
    let mut flagged: Vec<&ReconciliationRecord> = output
        .records
        .iter()
        .filter(|r| exceeds_threshold(r, threshold_percent))
        .collect();

    flagged.sort_by(|a, b| {
        let a = a.discrepancy.as_ref().map(BigDecimal::abs).unwrap_or_else(BigDecimal::zero);
        let b = b.discrepancy.as_ref().map(BigDecimal::abs).unwrap_or_else(BigDecimal::zero);
        b.cmp(&a)
    });
    flagged
}

/// (名称, 得分) 去重, 保留首次出现顺序
pub fn unique_unmatched(entries: &[UnmatchedEntry]) -> Vec<UnmatchedEntry> {
    entries
        .iter()
        .cloned()
        .collect::<IndexSet<UnmatchedEntry>>()
        .into_iter()
        .collect()
}
