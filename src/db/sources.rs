//! 参考数据与离线计费明细的 CSV 读取
//!
//! 表头必须包含约定的列名; 缺列、数字或日期无法解析时整批失败, 不跳过单行。

use crate::config::PricingConfig;
use crate::error::ReconError;
use crate::models::{BillingRecord, EmployeeDirectoryEntry, PricingRow, PricingTable, ReferenceData, Tier};
use bigdecimal::BigDecimal;
use chrono::{NaiveDate, NaiveDateTime};
use csv::{ReaderBuilder, StringRecord};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;

const BILLING: &str = "billing";
const DIRECTORY: &str = "employee directory";
const REGULAR: &str = "regular pricing";
const FCC: &str = "fcc pricing";

/// 员工目录中的占位行
const DIRECTORY_PLACEHOLDERS: [&str; 2] = ["Consulent", "NUMBERS"];

/// 表头 -> 列下标
struct Columns {
    table: &'static str,
    headers: StringRecord,
}

impl Columns {
    fn index(&self, column: &str) -> Result<usize, ReconError> {
        self.headers
            .iter()
            .position(|h| h.trim() == column)
            .ok_or_else(|| ReconError::MissingColumn {
                table: self.table,
                column: column.to_string(),
            })
    }
}

fn line_of(record: &StringRecord) -> u64 {
    record.position().map(|p| p.line()).unwrap_or_default()
}

fn cell<'r>(record: &'r StringRecord, idx: usize) -> &'r str {
    record.get(idx).unwrap_or("").trim()
}

fn parse_decimal(table: &'static str, record: &StringRecord, idx: usize, column: &str) -> Result<BigDecimal, ReconError> {
    let value = cell(record, idx);
    BigDecimal::from_str(value).map_err(|_| ReconError::InvalidNumber {
        table,
        line: line_of(record),
        column: column.to_string(),
        value: value.to_string(),
    })
}

/// 空单元格视为缺失价格
fn parse_optional_decimal(
    table: &'static str,
    record: &StringRecord,
    idx: usize,
    column: &str,
) -> Result<Option<BigDecimal>, ReconError> {
    if cell(record, idx).is_empty() {
        return Ok(None);
    }
    parse_decimal(table, record, idx, column).map(Some)
}

fn parse_date(table: &'static str, record: &StringRecord, idx: usize) -> Result<NaiveDate, ReconError> {
    let value = cell(record, idx);
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S").map(|dt| dt.date()))
        .map_err(|_| ReconError::InvalidDate {
            table,
            line: line_of(record),
            value: value.to_string(),
        })
}

fn reader<R: Read>(input: R) -> csv::Reader<R> {
    ReaderBuilder::new().flexible(true).from_reader(input)
}

/// 计费明细: Hours, BillableRate, BillableAmount, Date, CustomerName, EmployeeName
pub fn load_billing_records<R: Read>(input: R) -> Result<Vec<BillingRecord>, ReconError> {
    let mut rdr = reader(input);
    let columns = Columns {
        table: BILLING,
        headers: rdr.headers()?.clone(),
    };
    let hours = columns.index("Hours")?;
    let rate = columns.index("BillableRate")?;
    let amount = columns.index("BillableAmount")?;
    let date = columns.index("Date")?;
    let customer = columns.index("CustomerName")?;
    let employee = columns.index("EmployeeName")?;

    let mut records = Vec::new();
    for row in rdr.records() {
        let row = row?;
        records.push(BillingRecord {
            employee_name: cell(&row, employee).to_string(),
            customer_name: cell(&row, customer).to_string(),
            date: parse_date(BILLING, &row, date)?,
            hours: parse_decimal(BILLING, &row, hours, "Hours")?,
            billable_rate: parse_decimal(BILLING, &row, rate, "BillableRate")?,
            billable_amount: parse_decimal(BILLING, &row, amount, "BillableAmount")?,
        });
    }
    Ok(records)
}

/// 员工目录: name, title
pub fn load_employee_directory<R: Read>(input: R) -> Result<Vec<EmployeeDirectoryEntry>, ReconError> {
    let mut rdr = reader(input);
    let columns = Columns {
        table: DIRECTORY,
        headers: rdr.headers()?.clone(),
    };
    let name = columns.index("name")?;
    let title = columns.index("title")?;

    let mut entries = Vec::new();
    for row in rdr.records() {
        let row = row?;
        let (name, title) = (cell(&row, name), cell(&row, title));
        if name.is_empty() || title.is_empty() || DIRECTORY_PLACEHOLDERS.contains(&name) {
            continue;
        }
        entries.push(EmployeeDirectoryEntry {
            name: name.to_string(),
            title: title.to_string(),
        });
    }
    Ok(entries)
}

/// Regular 价格表: customer + 每个档位一列
pub fn load_regular_pricing<R: Read>(input: R) -> Result<PricingTable, ReconError> {
    load_pricing(input, REGULAR, &Tier::ALL)
}

/// FCC 价格表: customer, Consultant (统一价)
pub fn load_fcc_pricing<R: Read>(input: R) -> Result<PricingTable, ReconError> {
    load_pricing(input, FCC, &[Tier::Consultant])
}

fn load_pricing<R: Read>(input: R, table: &'static str, tiers: &[Tier]) -> Result<PricingTable, ReconError> {
    let mut rdr = reader(input);
    let columns = Columns {
        table,
        headers: rdr.headers()?.clone(),
    };
    let customer = columns.index("customer")?;
    let tier_columns = tiers
        .iter()
        .map(|&tier| columns.index(tier.as_str()).map(|idx| (tier, idx)))
        .collect::<Result<Vec<_>, _>>()?;

    let mut rows = Vec::new();
    for record in rdr.records() {
        let record = record?;
        let name = cell(&record, customer);
        // 工作簿里夹带的重复表头
        if name.is_empty() || name == "Customer" {
            continue;
        }

        let mut row = PricingRow::new(name);
        for &(tier, idx) in &tier_columns {
            if let Some(price) = parse_optional_decimal(table, &record, idx, tier.as_str())? {
                row.prices.insert(tier, price);
            }
        }
        rows.push(row);
    }
    Ok(PricingTable::new(rows))
}

fn open(path: &Path) -> Result<File, ReconError> {
    File::open(path).map_err(|e| {
        ReconError::Io(std::io::Error::new(
            e.kind(),
            format!("{}: {}", path.display(), e),
        ))
    })
}

/// 按配置路径加载全部参考数据
pub fn load_reference_data(config: &PricingConfig) -> Result<ReferenceData, ReconError> {
    let reference = ReferenceData {
        directory: load_employee_directory(open(&config.directory_path)?)?,
        regular: load_regular_pricing(open(&config.regular_path)?)?,
        fcc: load_fcc_pricing(open(&config.fcc_path)?)?,
    };

    tracing::info!(
        "参考数据已加载: 员工 {} 人, Regular 客户 {} 个, FCC 客户 {} 个",
        reference.directory.len(),
        reference.regular.len(),
        reference.fcc.len()
    );
    Ok(reference)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn billing_rows_parse_with_any_column_order() {
        let csv = "EmployeeName,CustomerName,Date,Hours,BillableRate,BillableAmount\n\
                   SKA - Sam K. Andersen, Nordic Energy ,2026-01-15,7.5,1200,9000\n\
                   MH - Mette Holm,Flat Co,2026-01-16 00:00:00,2,950.50,1901\n";
        let records = load_billing_records(csv.as_bytes()).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].customer_name, "Nordic Energy");
        assert_eq!(records[0].hours, BigDecimal::from_str("7.5").unwrap());
        assert_eq!(records[1].date, NaiveDate::from_ymd_opt(2026, 1, 16).unwrap());
    }

    #[test]
    fn missing_billing_column_is_reported() {
        let csv = "EmployeeName,CustomerName,Date,Hours,BillableAmount\nA,B,2026-01-01,1,1\n";
        let err = load_billing_records(csv.as_bytes()).unwrap_err();
        assert!(matches!(
            err,
            ReconError::MissingColumn { table: "billing", ref column } if column == "BillableRate"
        ));
    }

    #[test]
    fn non_numeric_hours_fail_with_line() {
        let csv = "EmployeeName,CustomerName,Date,Hours,BillableRate,BillableAmount\n\
                   A,B,2026-01-01,1,100,100\n\
                   A,B,2026-01-02,seven,100,700\n";
        let err = load_billing_records(csv.as_bytes()).unwrap_err();
        match err {
            ReconError::InvalidNumber { line, column, value, .. } => {
                assert_eq!(line, 3);
                assert_eq!(column, "Hours");
                assert_eq!(value, "seven");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn unparsable_date_fails_with_table_and_line() {
        let csv = "EmployeeName,CustomerName,Date,Hours,BillableRate,BillableAmount\n\
                   A,B,15/01/2026,1,100,100\n";
        let err = load_billing_records(csv.as_bytes()).unwrap_err();
        match err {
            ReconError::InvalidDate { table, line, value } => {
                assert_eq!(table, "billing");
                assert_eq!(line, 2);
                assert_eq!(value, "15/01/2026");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn directory_skips_placeholders_and_blank_rows() {
        let csv = "name,title\nSam K Andersen,Senior BA/TL\nConsulent,Title\nNUMBERS,x\n,Dev\nMette Holm,\n";
        let entries = load_employee_directory(csv.as_bytes()).unwrap();
        assert_eq!(
            entries,
            vec![EmployeeDirectoryEntry {
                name: "Sam K Andersen".into(),
                title: "Senior BA/TL".into(),
            }]
        );
    }

    #[test]
    fn regular_pricing_keeps_blank_cells_absent() {
        let csv = "customer,Junior Consultant,Consultant,Senior Consultant,Principal Consultant,Data Scientist,Support\n\
                   Nordic Energy,800,1000,,1500,1400,0\n\
                   Customer,,,,,,\n";
        let table = load_regular_pricing(csv.as_bytes()).unwrap();

        assert_eq!(table.len(), 1);
        let row = &table.rows[0];
        assert_eq!(row.price(Tier::SeniorConsultant), None);
        assert_eq!(row.price(Tier::PrincipalConsultant), Some(&BigDecimal::from(1500)));
        assert_eq!(row.price(Tier::Support), Some(&BigDecimal::from(0)));
    }

    #[test]
    fn regular_pricing_requires_every_tier_column() {
        let csv = "customer,Junior Consultant,Consultant,Senior Consultant,Principal Consultant\nA,1,2,3,4\n";
        let err = load_regular_pricing(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, ReconError::MissingColumn { table: "regular pricing", .. }));
    }

    #[test]
    fn fcc_pricing_reads_flat_price() {
        let csv = "customer,Consultant\nFlat Co,950\n";
        let table = load_fcc_pricing(csv.as_bytes()).unwrap();
        assert_eq!(table.rows[0].price(Tier::Consultant), Some(&BigDecimal::from(950)));
    }

    #[test]
    fn non_numeric_price_is_rejected() {
        let csv = "customer,Consultant\nFlat Co,n/a\n";
        assert!(matches!(
            load_fcc_pricing(csv.as_bytes()),
            Err(ReconError::InvalidNumber { table: "fcc pricing", .. })
        ));
    }
}
