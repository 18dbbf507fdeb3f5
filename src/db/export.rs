use crate::error::ReconError;
use crate::models::{ReconciliationOutput, ReconciliationRecord, UnmatchedEntry};
use crate::service::summary::{discrepant_records, unique_unmatched, ReconSummary};
use bigdecimal::BigDecimal;
use chrono::Local;
use csv::Writer;
use std::fs;
use std::path::{Path, PathBuf};

/// 金额/百分比保留两位
fn money(val: &BigDecimal) -> String {
    val.round(2).with_scale(2).to_string()
}

/// 空值写为空单元格
fn option_money(val: &Option<BigDecimal>) -> String {
    val.as_ref().map(money).unwrap_or_default()
}

fn option_text<T: ToString>(val: &Option<T>) -> String {
    val.as_ref().map(|v| v.to_string()).unwrap_or_default()
}

/// 导出对账报告目录, 返回目录路径
///
/// 目录名带时间戳: `billing_reconciliation_YYYYMMDD_HHMMSS/`
pub fn write_report(
    output: &ReconciliationOutput,
    summary: &ReconSummary,
    output_dir: &Path,
) -> Result<PathBuf, ReconError> {
    let stamp = Local::now().format("%Y%m%d_%H%M%S");
    let dir = output_dir.join(format!("billing_reconciliation_{}", stamp));
    fs::create_dir_all(&dir)?;

    write_summary(summary, &dir.join("summary.csv"))?;
    write_discrepancies(
        &discrepant_records(output, &summary.discrepancy_threshold_percent),
        &dir.join("discrepancies.csv"),
    )?;

    let mut by_date: Vec<&ReconciliationRecord> = output.records.iter().collect();
    by_date.sort_by_key(|r| r.date);
    write_all_records(&by_date, &dir.join("all_records.csv"))?;

    if !output.unmatched_employees.is_empty() {
        write_unmatched("Employee", &output.unmatched_employees, &dir.join("unmatched_employees.csv"))?;
    }
    if !output.unmatched_customers.is_empty() {
        write_unmatched("Customer", &output.unmatched_customers, &dir.join("unmatched_customers.csv"))?;
    }

    tracing::info!("报告已导出: {}", dir.display());
    Ok(dir)
}

fn write_summary(summary: &ReconSummary, path: &Path) -> Result<(), ReconError> {
    let mut writer = Writer::from_path(path)?;
    writer.write_record(["Metric", "Value"])?;

    let rows = [
        ("Total Records", summary.total_records.to_string()),
        ("Total Amount Billed", money(&summary.total_billed)),
        ("Total Expected Amount", money(&summary.total_expected)),
        ("Total Discrepancy", money(&summary.total_discrepancy)),
        (
            "Records with Discrepancies",
            format!(
                "{} (>{}%)",
                summary.discrepant_records, summary.discrepancy_threshold_percent
            ),
        ),
        ("Unmatched Employees", summary.unmatched_employees.to_string()),
        ("Unmatched Customers", summary.unmatched_customers.to_string()),
    ];
    for (metric, value) in rows {
        writer.write_record([metric, value.as_str()])?;
    }

    writer.flush()?;
    Ok(())
}

fn write_discrepancies(records: &[&ReconciliationRecord], path: &Path) -> Result<(), ReconError> {
    let mut writer = Writer::from_path(path)?;

    if records.is_empty() {
        writer.write_record(["Message"])?;
        writer.write_record(["No discrepancies found (all within threshold)"])?;
        writer.flush()?;
        return Ok(());
    }

    writer.write_record([
        "Customer", "Employee", "Title", "Rank", "Hours", "Rate Charged", "Expected Rate",
        "Amount Billed", "Expected Amount", "Discrepancy", "Discrepancy %",
    ])?;
    for rec in records {
        writer.write_record(&[
            rec.customer_name.clone(),
            rec.employee_name.clone(),
            option_text(&rec.employee_title),
            rec.normalized_rank.to_string(),
            rec.hours.to_string(),
            money(&rec.rate_charged),
            option_money(&rec.expected_rate),
            money(&rec.amount_billed),
            option_money(&rec.expected_amount),
            option_money(&rec.discrepancy),
            option_money(&rec.discrepancy_percent),
        ])?;
    }

    writer.flush()?;
    Ok(())
}

fn write_all_records(records: &[&ReconciliationRecord], path: &Path) -> Result<(), ReconError> {
    let mut writer = Writer::from_path(path)?;
    writer.write_record([
        "Date", "Customer", "Employee", "Title", "Rank", "Customer Type", "Rate Rank Used",
        "Hours", "Rate Charged", "Expected Rate", "Amount Billed", "Expected Amount",
        "Discrepancy", "Discrepancy %",
    ])?;

    for rec in records {
        writer.write_record(&[
            rec.date.to_string(),
            rec.customer_name.clone(),
            rec.employee_name.clone(),
            option_text(&rec.employee_title),
            rec.normalized_rank.to_string(),
            option_text(&rec.customer_type),
            option_text(&rec.rate_rank_used),
            rec.hours.to_string(),
            money(&rec.rate_charged),
            option_money(&rec.expected_rate),
            money(&rec.amount_billed),
            option_money(&rec.expected_amount),
            option_money(&rec.discrepancy),
            option_money(&rec.discrepancy_percent),
        ])?;
    }

    writer.flush()?;
    Ok(())
}

/// 去重后按得分升序
fn write_unmatched(label: &str, entries: &[UnmatchedEntry], path: &Path) -> Result<(), ReconError> {
    let mut unique = unique_unmatched(entries);
    unique.sort_by_key(|e| e.score);

    let mut writer = Writer::from_path(path)?;
    writer.write_record([label, "Match Score"])?;
    for entry in &unique {
        writer.write_record([entry.raw_name.as_str(), entry.score.to_string().as_str()])?;
    }

    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn money_rounds_to_two_decimals() {
        assert_eq!(money(&BigDecimal::from(1500)), "1500.00");
        assert_eq!(money(&BigDecimal::from_str("6.666666").unwrap()), "6.67");
        assert_eq!(option_money(&None), "");
    }
}
