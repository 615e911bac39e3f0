//! df 调用：超时控制、参数形式与回退顺序。

use std::fmt;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use futures::future::BoxFuture;
use futures::FutureExt;
use tokio::process::Command;

use crate::error::{Result, StatsError};

/// df 参数形式，按回退顺序排列
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DfArgs {
    /// POSIX 输出格式，1024 字节块：`df -kP <path>`
    Posix,
    /// 仅指定 1024 字节块：`df -k <path>`
    Kilobytes,
}

impl DfArgs {
    /// 先 POSIX，失败再退回普通块模式
    pub const FALLBACK_ORDER: [DfArgs; 2] = [DfArgs::Posix, DfArgs::Kilobytes];

    pub fn flag(self) -> &'static str {
        match self {
            DfArgs::Posix => "-kP",
            DfArgs::Kilobytes => "-k",
        }
    }
}

impl fmt::Display for DfArgs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.flag())
    }
}

/// 文件系统用量查询：返回原始文本输出。
///
/// 实现只负责单次调用；回退由 [`StatsProvider`](crate::StatsProvider) 编排。
pub trait UsageQuery: Send + Sync {
    fn query<'a>(&'a self, path: &'a str, args: DfArgs) -> BoxFuture<'a, Result<String>>;
}

/// 调用外部 df 程序
#[derive(Debug, Clone)]
pub struct DfCommand {
    program: PathBuf,
    timeout: Duration,
}

impl DfCommand {
    pub fn new(program: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            timeout,
        }
    }

    async fn run(&self, path: &str, args: DfArgs) -> Result<String> {
        let invocation = format!("{} {} {}", self.program.display(), args, path);

        // future 被丢弃（超时）时 kill_on_drop 负责杀掉子进程
        let child = Command::new(&self.program)
            .arg(args.flag())
            .arg(path)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| StatsError::Exec(format!("failed to run {invocation}: {e}")))?;

        let output = tokio::time::timeout(self.timeout, child.wait_with_output())
            .await
            .map_err(|_| {
                StatsError::Exec(format!(
                    "{invocation} timed out after {}ms",
                    self.timeout.as_millis()
                ))
            })?
            .map_err(|e| StatsError::Exec(format!("failed to wait for {invocation}: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(StatsError::Exec(format!(
                "{invocation} exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl UsageQuery for DfCommand {
    fn query<'a>(&'a self, path: &'a str, args: DfArgs) -> BoxFuture<'a, Result<String>> {
        self.run(path, args).boxed()
    }
}
