//! df 表格输出解析。
//!
//! 只认最后一个非空行作为数据行，前面的表头和其他行内容不限。
//! 设备名过长时 df 会把记录折成两行，此时最后一行不足 6 个字段，按格式错误处理。

use crate::error::{Result, StatsError};

/// `-k` 模式下 df 的块大小
pub const BLOCK_SIZE: u64 = 1024;

/// 数据行最少字段数：文件系统、总量、已用、可用、使用率、挂载点
const MIN_FIELDS: usize = 6;

/// 解析出的用量（不含路径与时间戳）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedUsage {
    pub mount_point: String,
    pub total_bytes: u64,
    pub used_bytes: u64,
    pub free_bytes: u64,
    pub used_percent: u32,
}

/// 解析 df 输出。结构不对（行数或字段数不足）才报错，单个数值解析失败按 0 处理。
pub fn parse_df_output(output: &str) -> Result<ParsedUsage> {
    let lines: Vec<&str> = output
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();
    if lines.len() < 2 {
        return Err(StatsError::Parse(format!(
            "expected header and data line, got {} line(s)",
            lines.len()
        )));
    }

    let data = lines[lines.len() - 1];
    let fields: Vec<&str> = data.split_whitespace().collect();
    if fields.len() < MIN_FIELDS {
        return Err(StatsError::Parse(format!(
            "expected at least {MIN_FIELDS} fields in data line, got {}",
            fields.len()
        )));
    }

    let total_bytes = blocks_to_bytes(fields[1]);
    let used_bytes = blocks_to_bytes(fields[2]);
    let free_bytes = blocks_to_bytes(fields[3]);
    let used_percent = parse_percent(fields[4])
        .unwrap_or_else(|| computed_percent(used_bytes, total_bytes));

    Ok(ParsedUsage {
        mount_point: fields[MIN_FIELDS - 1..].join(" "),
        total_bytes,
        used_bytes,
        free_bytes,
        used_percent,
    })
}

fn blocks_to_bytes(field: &str) -> u64 {
    field
        .parse::<u64>()
        .unwrap_or(0)
        .saturating_mul(BLOCK_SIZE)
}

/// `"50%"` -> 50；`"-"`、`"0%"`、负数等视为无效，交给回退计算
fn parse_percent(field: &str) -> Option<u32> {
    let value: f64 = field.trim_end_matches('%').parse().ok()?;
    if !value.is_finite() || value <= 0.0 {
        return None;
    }
    Some(value.round().min(100.0) as u32)
}

fn computed_percent(used: u64, total: u64) -> u32 {
    if total == 0 {
        return 0;
    }
    let pct = (used as f64 / total as f64 * 100.0).round();
    pct.min(100.0) as u32
}
