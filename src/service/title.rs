use crate::config::TitleRule;
use crate::models::Tier;

/// 职位 -> 价格档位
///
/// 先精确匹配, 再按规则顺序做子串匹配, 都不中则默认 Consultant。
#[derive(Debug, Clone)]
pub struct TitleNormalizer {
    rules: Vec<TitleRule>,
}

impl TitleNormalizer {
    pub fn new(rules: Vec<TitleRule>) -> Self {
        Self { rules }
    }

    pub fn normalize(&self, title: &str) -> Tier {
        let title = title.trim().to_lowercase();

        if let Some(rule) = self.rules.iter().find(|r| r.key == title) {
            return rule.tier;
        }

        self.rules
            .iter()
            .find(|r| title.contains(r.key.as_str()))
            .map(|r| r.tier)
            .unwrap_or(Tier::Consultant)
    }
}

impl Default for TitleNormalizer {
    fn default() -> Self {
        Self::new(crate::config::default_title_rules())
    }
}
