use crate::models::{EmployeeDirectoryEntry, MatchResult};
use crate::service::similarity::{best_match, Similarity, TokenSortRatio};

/// 员工匹配结果, 匹配成功时带出目录中的职位
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmployeeMatch {
    pub result: MatchResult,
    pub title: Option<String>,
}

/// 计费侧员工名 -> 员工目录
pub struct EmployeeMatcher {
    threshold: u8,
    scorer: Box<dyn Similarity>,
}

impl EmployeeMatcher {
    pub fn new(threshold: u8) -> Self {
        Self::with_scorer(threshold, Box::new(TokenSortRatio))
    }

    pub fn with_scorer(threshold: u8, scorer: Box<dyn Similarity>) -> Self {
        Self { threshold, scorer }
    }

    pub fn match_employee(&self, raw_name: &str, directory: &[EmployeeDirectoryEntry]) -> EmployeeMatch {
        let name = normalize_employee_name(raw_name);

        let Some((idx, score)) = best_match(
            self.scorer.as_ref(),
            &name,
            directory.iter().map(|e| e.name.as_str()),
        ) else {
            return EmployeeMatch {
                result: MatchResult::unmatched(0),
                title: None,
            };
        };

        if score < self.threshold {
            tracing::debug!("员工未匹配: '{}' 最佳 '{}' 得分 {}", raw_name, directory[idx].name, score);
            return EmployeeMatch {
                result: MatchResult::unmatched(score),
                title: None,
            };
        }

        let entry = &directory[idx];
        EmployeeMatch {
            result: MatchResult::matched(entry.name.clone(), score),
            title: Some(entry.title.clone()),
        }
    }
}

/// 去掉 "SKA - " 形式的缩写前缀, 并删除缩写中的句点
///
/// "SKA - Sam K. Andersen" -> "Sam K Andersen"
pub fn normalize_employee_name(raw_name: &str) -> String {
    let name = match raw_name.split_once(" - ") {
        Some((_, rest)) => rest,
        None => raw_name,
    };
    name.trim().replace('.', "")
}
