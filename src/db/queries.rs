use crate::error::ReconError;
use crate::models::BillingRecord;
use chrono::NaiveDate;
use sqlx::PgPool;

/// 查询可计费工时明细, month 为 `YYYY-MM` 时只取该月
pub async fn list_billing_records(
    pool: &PgPool,
    month: Option<&str>,
) -> Result<Vec<BillingRecord>, sqlx::Error> {
    sqlx::query_as::<_, BillingRecord>(
        r#"
        SELECT e.employee_name AS employee_name,
               c.customer_name AS customer_name,
               f.date AS date,
               f.hours AS hours,
               f.billable_rate AS billable_rate,
               f.billable_amount AS billable_amount
        FROM fact_harvest_actual f
        INNER JOIN dim_customer c ON f.customer_key = c.customer_key
        INNER JOIN dim_employee e ON f.employee_key = e.employee_key
        WHERE f.is_billable_key = 1
          AND ($1::text IS NULL OR to_char(f.date, 'YYYY-MM') = $1)
        ORDER BY f.date, e.employee_name
        "#
    )
    .bind(month)
    .fetch_all(pool)
    .await
}

/// 校验并规范化月份过滤条件 (`YYYY-MM`)
pub fn parse_month(month: &str) -> Result<String, ReconError> {
    let month = month.trim();
    let valid = month.len() == 7 && month.as_bytes()[4] == b'-';
    let parsed = NaiveDate::parse_from_str(&format!("{}-01", month), "%Y-%m-%d");

    match parsed {
        Ok(date) if valid => Ok(date.format("%Y-%m").to_string()),
        _ => Err(ReconError::InvalidMonth(month.to_string())),
    }
}
