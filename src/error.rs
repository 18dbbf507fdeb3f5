use thiserror::Error;

/// 对账服务错误
///
/// 未匹配与缺价不是错误, 只记录在结果里; 这里只有会终止整批的情况。
#[derive(Debug, Error)]
pub enum ReconError {
    #[error("config load error: {0}")]
    Config(#[from] ::config::ConfigError),

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("table '{table}': missing column '{column}'")]
    MissingColumn { table: &'static str, column: String },

    #[error("table '{table}', line {line}, column '{column}': cannot parse number '{value}'")]
    InvalidNumber {
        table: &'static str,
        line: u64,
        column: String,
        value: String,
    },

    #[error("table '{table}', line {line}: cannot parse date '{value}'")]
    InvalidDate {
        table: &'static str,
        line: u64,
        value: String,
    },

    #[error("billing record #{index}: {reason}")]
    InvalidRecord { index: usize, reason: String },

    #[error("invalid month filter '{0}', expected YYYY-MM")]
    InvalidMonth(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl ReconError {
    /// 输入数据不符合约定 (调用方问题), 其余为服务端问题
    pub fn is_malformed_input(&self) -> bool {
        matches!(
            self,
            ReconError::MissingColumn { .. }
                | ReconError::InvalidNumber { .. }
                | ReconError::InvalidDate { .. }
                | ReconError::InvalidRecord { .. }
                | ReconError::InvalidMonth(_)
        )
    }
}
