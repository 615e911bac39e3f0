use thiserror::Error;

/// Common result type for core operations.
pub type Result<T> = std::result::Result<T, StatsError>;

#[derive(Debug, Error)]
pub enum StatsError {
    /// 单次 df 调用失败：无法启动、非零退出或超时
    #[error("{0}")]
    Exec(String),
    /// 所有参数形式都失败，携带最后一次的错误信息
    #[error("{0}")]
    Query(String),
    /// 拿到了输出，但不是预期的表格格式
    #[error("unexpected df output format: {0}")]
    Parse(String),
}

impl StatsError {
    pub fn is_parse(&self) -> bool {
        matches!(self, StatsError::Parse(_))
    }
}
