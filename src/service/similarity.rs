//! 字符串相似度 (0-100)
//!
//! 匹配器只依赖 [`Similarity`] trait, 具体算法可替换。

/// 相似度评分器
pub trait Similarity: Send + Sync {
    fn score(&self, a: &str, b: &str) -> u8;
}

/// 整串相似度: 只计插入/删除的编辑距离, 按两串总长归一
///
/// `2 * lcs / (len_a + len_b)`, 任一边为空时得 0。
#[derive(Debug, Clone, Copy, Default)]
pub struct Ratio;

impl Similarity for Ratio {
    fn score(&self, a: &str, b: &str) -> u8 {
        let a: Vec<char> = a.chars().collect();
        let b: Vec<char> = b.chars().collect();
        if a.is_empty() || b.is_empty() {
            return 0;
        }
        let total = (a.len() + b.len()) as f64;
        to_percent(2.0 * lcs_len(&a, &b) as f64 / total)
    }
}

/// 最长公共子序列长度 (单行滚动 DP)
fn lcs_len(a: &[char], b: &[char]) -> usize {
    let mut row = vec![0usize; b.len() + 1];
    for &ca in a {
        let mut diag = 0;
        for (j, &cb) in b.iter().enumerate() {
            let up = row[j + 1];
            row[j + 1] = if ca == cb { diag + 1 } else { up.max(row[j]) };
            diag = up;
        }
    }
    row[b.len()]
}

/// 忽略词序的相似度: 分词、排序、重新拼接后再按 [`Ratio`] 比较
#[derive(Debug, Clone, Copy, Default)]
pub struct TokenSortRatio;

impl Similarity for TokenSortRatio {
    fn score(&self, a: &str, b: &str) -> u8 {
        Ratio.score(&sorted_tokens(a), &sorted_tokens(b))
    }
}

/// 比较前的清洗: 小写化, 非字母数字替换为空格, 去首尾空白
///
/// 内部连续空格保留, "Nordic Energy A/S" -> "nordic energy a s"。
pub fn clean(s: &str) -> String {
    s.chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect::<String>()
        .to_lowercase()
        .trim()
        .to_string()
}

/// 清洗后按空白分词并排序
fn sorted_tokens(s: &str) -> String {
    let cleaned = clean(s);
    let mut tokens: Vec<&str> = cleaned.split_whitespace().collect();
    tokens.sort_unstable();
    tokens.join(" ")
}

fn to_percent(similarity: f64) -> u8 {
    (similarity * 100.0).round().clamp(0.0, 100.0) as u8
}

/// 在候选中找得分最高者, 同分取最先出现的; 候选为空返回 None
pub fn best_match<'a, I>(scorer: &dyn Similarity, query: &str, candidates: I) -> Option<(usize, u8)>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut best: Option<(usize, u8)> = None;
    for (idx, candidate) in candidates.into_iter().enumerate() {
        let score = scorer.score(query, candidate);
        if best.map_or(true, |(_, top)| score > top) {
            best = Some((idx, score));
            if score == 100 {
                break;
            }
        }
    }
    best
}
