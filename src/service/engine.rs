use crate::config::MatchingConfig;
use crate::error::ReconError;
use crate::models::{
    BillingRecord, CustomerType, PricedTier, ReconciliationOutput, ReconciliationRecord,
    ReferenceData, Tier, UnmatchedEntry,
};
use crate::service::customer::{CustomerMatch, CustomerMatcher};
use crate::service::employee::{EmployeeMatch, EmployeeMatcher};
use crate::service::pricing::{flat_price, resolve_price};
use crate::service::title::TitleNormalizer;
use bigdecimal::{BigDecimal, Zero};
use dashmap::DashMap;
use rayon::prelude::*;

/// 对账引擎
///
/// 每条计费明细独立走完: 员工匹配 -> 职位归档 -> 客户匹配 -> 取价 -> 差异计算。
/// 任一步匹配失败只降级, 不中断, 保证输入输出一一对应且顺序一致。
pub struct ReconciliationEngine {
    titles: TitleNormalizer,
    employees: EmployeeMatcher,
    customers: CustomerMatcher,
}

/// 差异百分比保留的小数位
const PERCENT_SCALE: i64 = 4;

/// 差异计算结果; 无预期单价时三项均为 None (而不是 0)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Discrepancy {
    pub expected_amount: Option<BigDecimal>,
    pub discrepancy: Option<BigDecimal>,
    pub discrepancy_percent: Option<BigDecimal>,
}

impl Discrepancy {
    pub fn compute(hours: &BigDecimal, amount_billed: &BigDecimal, expected_rate: Option<&BigDecimal>) -> Self {
        let Some(rate) = expected_rate else {
            return Self {
                expected_amount: None,
                discrepancy: None,
                discrepancy_percent: None,
            };
        };

        let expected_amount = hours * rate;
        let discrepancy = amount_billed - &expected_amount;
        let discrepancy_percent = if expected_amount.is_zero() {
            BigDecimal::zero()
        } else {
            (&discrepancy * &BigDecimal::from(100) / &expected_amount).round(PERCENT_SCALE)
        };

        Self {
            expected_amount: Some(expected_amount),
            discrepancy: Some(discrepancy),
            discrepancy_percent: Some(discrepancy_percent),
        }
    }
}

/// 单次运行内的匹配缓存: 同一原始名称只匹配一次
#[derive(Default)]
struct MatchMemo {
    employees: DashMap<String, EmployeeMatch>,
    customers: DashMap<String, CustomerMatch>,
}

fn cached<V: Clone>(map: &DashMap<String, V>, key: &str, compute: impl FnOnce() -> V) -> V {
    if let Some(hit) = map.get(key) {
        return hit.value().clone();
    }
    let value = compute();
    map.insert(key.to_string(), value.clone());
    value
}

struct RecordOutcome {
    record: ReconciliationRecord,
    unmatched_employee: Option<UnmatchedEntry>,
    unmatched_customer: Option<UnmatchedEntry>,
}

impl ReconciliationEngine {
    pub fn new(config: &MatchingConfig) -> Self {
        Self::from_parts(
            TitleNormalizer::new(config.title_rules.clone()),
            EmployeeMatcher::new(config.employee_match_threshold),
            CustomerMatcher::new(config.customer_match_threshold),
        )
    }

    pub fn from_parts(titles: TitleNormalizer, employees: EmployeeMatcher, customers: CustomerMatcher) -> Self {
        Self {
            titles,
            employees,
            customers,
        }
    }

    /// 批量对账
    ///
    /// 输入不合法 (如负工时) 时整批失败; 参考表为空不是错误, 只会全部未匹配。
    pub fn reconcile(
        &self,
        records: &[BillingRecord],
        reference: &ReferenceData,
    ) -> Result<ReconciliationOutput, ReconError> {
        validate_records(records)?;

        tracing::info!(
            "开始对账: {} 条明细, 员工目录 {} 人, Regular 客户 {} 个, FCC 客户 {} 个",
            records.len(),
            reference.directory.len(),
            reference.regular.len(),
            reference.fcc.len()
        );

        let memo = MatchMemo::default();
        let outcomes: Vec<RecordOutcome> = records
            .par_iter()
            .map(|record| self.reconcile_record(record, reference, &memo))
            .collect();

        // 按输入顺序合并诊断清单
        let mut output = ReconciliationOutput {
            records: Vec::with_capacity(outcomes.len()),
            ..Default::default()
        };
        for outcome in outcomes {
            output.records.push(outcome.record);
            output.unmatched_employees.extend(outcome.unmatched_employee);
            output.unmatched_customers.extend(outcome.unmatched_customer);
        }

        let priced = output.records.iter().filter(|r| r.expected_rate.is_some()).count();
        tracing::info!(
            "对账完成: {} 条记录, 已定价 {}, 员工未匹配 {}, 客户未匹配 {}",
            output.records.len(),
            priced,
            output.unmatched_employees.len(),
            output.unmatched_customers.len()
        );
        if !output.unmatched_employees.is_empty() || !output.unmatched_customers.is_empty() {
            tracing::warn!(
                "存在未匹配项: 员工 {} 个名称, 客户 {} 个名称",
                memo.employees.iter().filter(|m| !m.result.is_match()).count(),
                memo.customers.iter().filter(|m| !m.result.is_match()).count()
            );
        }

        Ok(output)
    }

    fn reconcile_record(&self, record: &BillingRecord, reference: &ReferenceData, memo: &MatchMemo) -> RecordOutcome {
        // 1. 员工匹配
        let employee = cached(&memo.employees, &record.employee_name, || {
            self.employees
                .match_employee(&record.employee_name, &reference.directory)
        });

        // 2. 职位归档, 未匹配员工按 Consultant 计
        let normalized_rank = employee
            .title
            .as_deref()
            .map(|title| self.titles.normalize(title))
            .unwrap_or(Tier::Consultant);

        // 3. 客户匹配
        let customer = cached(&memo.customers, &record.customer_name, || {
            self.customers
                .match_customer(&record.customer_name, &reference.fcc, &reference.regular)
        });

        // 4. 取价
        let priced = match customer.target {
            Some((CustomerType::Fcc, idx)) => reference
                .fcc
                .get(idx)
                .and_then(flat_price)
                .map(|price| (price, PricedTier::Flat)),
            Some((CustomerType::Regular, idx)) => reference
                .regular
                .get(idx)
                .and_then(|row| resolve_price(row, normalized_rank))
                .map(|resolved| (resolved.price, PricedTier::Tier(resolved.tier))),
            None => None,
        };
        let (expected_rate, rate_rank_used) = match priced {
            Some((price, tier)) => (Some(price), Some(tier)),
            None => (None, None),
        };

        // 5. 差异
        let diff = Discrepancy::compute(&record.hours, &record.billable_amount, expected_rate.as_ref());

        let unmatched_employee = (!employee.result.is_match()).then(|| UnmatchedEntry {
            raw_name: record.employee_name.clone(),
            score: employee.result.score,
        });
        let unmatched_customer = (!customer.result.is_match()).then(|| UnmatchedEntry {
            raw_name: record.customer_name.clone(),
            score: customer.result.score,
        });

        RecordOutcome {
            record: ReconciliationRecord {
                employee_name: record.employee_name.clone(),
                customer_name: record.customer_name.clone(),
                date: record.date,
                hours: record.hours.clone(),
                rate_charged: record.billable_rate.clone(),
                amount_billed: record.billable_amount.clone(),
                matched_employee: employee.result.matched,
                employee_title: employee.title,
                employee_match_score: employee.result.score,
                normalized_rank,
                customer_type: customer.customer_type(),
                matched_customer: customer.result.matched,
                customer_match_score: customer.result.score,
                rate_rank_used,
                expected_rate,
                expected_amount: diff.expected_amount,
                discrepancy: diff.discrepancy,
                discrepancy_percent: diff.discrepancy_percent,
            },
            unmatched_employee,
            unmatched_customer,
        }
    }
}

fn validate_records(records: &[BillingRecord]) -> Result<(), ReconError> {
    for (index, record) in records.iter().enumerate() {
        if record.hours < BigDecimal::zero() {
            return Err(ReconError::InvalidRecord {
                index,
                reason: format!("negative hours {}", record.hours),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EmployeeDirectoryEntry, PricingRow, PricingTable};
    use chrono::NaiveDate;
    use std::str::FromStr;

    fn dec(s: &str) -> BigDecimal {
        BigDecimal::from_str(s).unwrap()
    }

    fn billing(employee: &str, customer: &str, hours: &str, rate: &str, amount: &str) -> BillingRecord {
        BillingRecord {
            employee_name: employee.into(),
            customer_name: customer.into(),
            date: NaiveDate::from_ymd_opt(2026, 1, 15).unwrap(),
            hours: dec(hours),
            billable_rate: dec(rate),
            billable_amount: dec(amount),
        }
    }

    fn reference() -> ReferenceData {
        ReferenceData {
            directory: vec![
                EmployeeDirectoryEntry {
                    name: "Sam K Andersen".into(),
                    title: "Senior BA/TL".into(),
                },
                EmployeeDirectoryEntry {
                    name: "Mette Holm".into(),
                    title: "Data Scientist".into(),
                },
            ],
            regular: PricingTable::new(vec![PricingRow::new("Nordic Energy")
                .with_price(Tier::SeniorConsultant, dec("0"))
                .with_price(Tier::Consultant, dec("150"))]),
            fcc: PricingTable::new(vec![
                PricingRow::new("Flat Co").with_price(Tier::Consultant, dec("120"))
            ]),
        }
    }

    fn engine() -> ReconciliationEngine {
        ReconciliationEngine::new(&MatchingConfig::default())
    }

    #[test]
    fn discrepancy_arithmetic() {
        let diff = Discrepancy::compute(&dec("10"), &dec("1600"), Some(&dec("150")));
        assert_eq!(diff.expected_amount, Some(dec("1500")));
        assert_eq!(diff.discrepancy, Some(dec("100")));

        assert_eq!(diff.discrepancy_percent, Some(dec("6.6667")));
    }

    #[test]
    fn discrepancy_percent_is_rounded_to_four_places() {
        let diff = Discrepancy::compute(&dec("3"), &dec("100"), Some(&dec("30")));
        let percent = diff.discrepancy_percent.unwrap();
        assert_eq!(percent, dec("11.1111"));
        assert!(percent.to_string().len() <= 8);
    }

    #[test]
    fn missing_rate_gives_null_derived_fields() {
        let diff = Discrepancy::compute(&dec("10"), &dec("1600"), None);
        assert_eq!(diff.expected_amount, None);
        assert_eq!(diff.discrepancy, None);
        assert_eq!(diff.discrepancy_percent, None);
    }

    #[test]
    fn zero_hours_gives_zero_percent() {
        let diff = Discrepancy::compute(&dec("0"), &dec("50"), Some(&dec("150")));
        assert_eq!(diff.discrepancy, Some(dec("50")));
        assert_eq!(diff.discrepancy_percent, Some(BigDecimal::zero()));
    }

    #[test]
    fn regular_customer_uses_fallback_tier() {
        let records = vec![billing("SKA - Sam K. Andersen", "NORDIC ENERGY", "10", "160", "1600")];
        let output = engine().reconcile(&records, &reference()).unwrap();
        let rec = &output.records[0];

        assert_eq!(rec.matched_employee.as_deref(), Some("Sam K Andersen"));
        assert_eq!(rec.normalized_rank, Tier::SeniorConsultant);
        assert_eq!(rec.customer_type, Some(CustomerType::Regular));
        assert_eq!(rec.rate_rank_used, Some(PricedTier::Tier(Tier::Consultant)));
        assert_eq!(rec.expected_rate, Some(dec("150")));
        assert_eq!(rec.expected_amount, Some(dec("1500")));
        assert_eq!(rec.discrepancy, Some(dec("100")));
        assert!(output.unmatched_employees.is_empty());
        assert!(output.unmatched_customers.is_empty());
    }

    #[test]
    fn fcc_customer_uses_flat_price_sentinel() {
        let records = vec![billing("Mette Holm", "flat co", "2", "120", "240")];
        let output = engine().reconcile(&records, &reference()).unwrap();
        let rec = &output.records[0];

        assert_eq!(rec.customer_type, Some(CustomerType::Fcc));
        assert_eq!(rec.rate_rank_used, Some(PricedTier::Flat));
        assert_eq!(rec.rate_rank_used.unwrap().to_string(), "Consultant (FCC)");
        assert_eq!(rec.discrepancy, Some(dec("0")));
    }

    #[test]
    fn unmatched_entities_degrade_and_are_listed_per_record() {
        let records = vec![
            billing("XX - Nobody Known", "Unknown Corp", "1", "100", "100"),
            billing("XX - Nobody Known", "NORDIC ENERGY", "1", "100", "100"),
        ];
        let output = engine().reconcile(&records, &reference()).unwrap();

        assert_eq!(output.records.len(), 2);
        let first = &output.records[0];
        assert_eq!(first.matched_employee, None);
        assert_eq!(first.normalized_rank, Tier::Consultant);
        assert_eq!(first.customer_type, None);
        assert_eq!(first.expected_rate, None);
        assert_eq!(first.discrepancy, None);

        // 客户匹配成功, 员工未匹配时按 Consultant 取价
        assert_eq!(output.records[1].expected_rate, Some(dec("150")));

        assert_eq!(output.unmatched_employees.len(), 2);
        assert_eq!(output.unmatched_customers.len(), 1);
        assert_eq!(output.unmatched_customers[0].raw_name, "Unknown Corp");
    }

    #[test]
    fn negative_hours_fail_the_batch() {
        let records = vec![
            billing("Mette Holm", "Flat Co", "1", "120", "120"),
            billing("Mette Holm", "Flat Co", "-1", "120", "-120"),
        ];
        let err = engine().reconcile(&records, &reference()).unwrap_err();
        assert!(matches!(err, ReconError::InvalidRecord { index: 1, .. }));
    }
}
