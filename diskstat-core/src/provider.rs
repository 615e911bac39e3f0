//! 带短期缓存的磁盘用量提供者。
//!
//! 缓存只用于限制 df 的调用频率：新鲜窗口内直接返回上次结果。
//! 检查与刷新之间不加锁，缓存过期时并发请求可能各自触发一次 df，
//! 最后完成的一次写入缓存。

use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};

use chrono::Utc;
use tracing::{debug, warn};

use crate::error::{Result, StatsError};
use crate::models::DiskStatsRecord;
use crate::parse::parse_df_output;
use crate::query::{DfArgs, UsageQuery};

/// 最近一次成功计算的结果
#[derive(Debug)]
struct CacheEntry {
    computed_at: Instant,
    record: Arc<DiskStatsRecord>,
}

pub struct StatsProvider {
    path: String,
    freshness: Duration,
    query: Arc<dyn UsageQuery>,
    /// 整体替换，读者不会看到写了一半的记录
    cache: RwLock<Option<Arc<CacheEntry>>>,
}

impl std::fmt::Debug for StatsProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StatsProvider")
            .field("path", &self.path)
            .field("freshness", &self.freshness)
            .finish_non_exhaustive()
    }
}

impl StatsProvider {
    pub fn new(path: impl Into<String>, freshness: Duration, query: Arc<dyn UsageQuery>) -> Self {
        Self {
            path: path.into(),
            freshness,
            query,
            cache: RwLock::new(None),
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// 返回当前用量：缓存新鲜则直接返回，否则调用 df 并更新缓存。
    ///
    /// 失败时缓存保持不变。
    pub async fn get_stats(&self) -> Result<Arc<DiskStatsRecord>> {
        if let Some(record) = self.fresh_cached() {
            debug!(path = %self.path, "disk stats served from cache");
            return Ok(record);
        }

        debug!(path = %self.path, "disk stats cache miss, querying df");
        let output = self.query_with_fallback().await?;
        let usage = parse_df_output(&output)?;

        let record = Arc::new(DiskStatsRecord {
            path: self.path.clone(),
            mount_point: usage.mount_point,
            total_bytes: usage.total_bytes,
            used_bytes: usage.used_bytes,
            free_bytes: usage.free_bytes,
            used_percent: usage.used_percent,
            updated_at: Utc::now(),
        });

        let entry = Arc::new(CacheEntry {
            computed_at: Instant::now(),
            record: record.clone(),
        });
        *self.cache.write().unwrap_or_else(|e| e.into_inner()) = Some(entry);

        Ok(record)
    }

    fn fresh_cached(&self) -> Option<Arc<DiskStatsRecord>> {
        let guard = self.cache.read().unwrap_or_else(|e| e.into_inner());
        let entry = guard.as_ref()?;
        (entry.computed_at.elapsed() < self.freshness).then(|| entry.record.clone())
    }

    /// 依次尝试各参数形式，全部失败时返回最后一次的错误信息
    async fn query_with_fallback(&self) -> Result<String> {
        let mut last_error = None;
        for args in DfArgs::FALLBACK_ORDER {
            match self.query.query(&self.path, args).await {
                Ok(output) => {
                    if last_error.is_some() {
                        debug!(path = %self.path, %args, "df fallback succeeded");
                    }
                    return Ok(output);
                }
                Err(e) => {
                    warn!(path = %self.path, %args, error = %e, "df invocation failed");
                    last_error = Some(e);
                }
            }
        }
        let message = last_error
            .map(|e| e.to_string())
            .unwrap_or_else(|| "no df invocation attempted".into());
        Err(StatsError::Query(message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::future::BoxFuture;
    use futures::FutureExt;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    const GOOD: &str = "Filesystem 1024-blocks Used Available Capacity Mounted on\n\
                        /dev/sda1 1048576 524288 524288 50% /mnt/plexdrive\n";

    /// 按顺序返回预设结果，并记录每次调用的参数形式
    #[derive(Default)]
    struct ScriptedQuery {
        responses: Mutex<VecDeque<Result<String>>>,
        calls: Mutex<Vec<DfArgs>>,
    }

    impl ScriptedQuery {
        fn push_ok(&self, out: &str) {
            self.responses.lock().unwrap().push_back(Ok(out.to_string()));
        }

        fn push_err(&self, msg: &str) {
            self.responses
                .lock()
                .unwrap()
                .push_back(Err(StatsError::Exec(msg.to_string())));
        }

        fn calls(&self) -> Vec<DfArgs> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl UsageQuery for ScriptedQuery {
        fn query<'a>(&'a self, path: &'a str, args: DfArgs) -> BoxFuture<'a, Result<String>> {
            assert_eq!(path, "/mnt/plexdrive");
            self.calls.lock().unwrap().push(args);
            let next = self
                .responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(StatsError::Exec("no scripted response".into())));
            async move { next }.boxed()
        }
    }

    fn provider(query: &Arc<ScriptedQuery>, freshness: Duration) -> StatsProvider {
        StatsProvider::new("/mnt/plexdrive", freshness, query.clone())
    }

    #[tokio::test]
    async fn computes_record_from_df_output() {
        let query = Arc::new(ScriptedQuery::default());
        query.push_ok(GOOD);
        let stats = provider(&query, Duration::from_secs(5));

        let record = stats.get_stats().await.unwrap();
        assert_eq!(record.path, "/mnt/plexdrive");
        assert_eq!(record.mount_point, "/mnt/plexdrive");
        assert_eq!(record.total_bytes, 1_073_741_824);
        assert_eq!(record.used_bytes, 536_870_912);
        assert_eq!(record.free_bytes, 536_870_912);
        assert_eq!(record.used_percent, 50);
        assert_eq!(query.calls(), vec![DfArgs::Posix]);
    }

    #[tokio::test]
    async fn fresh_cache_skips_df() {
        let query = Arc::new(ScriptedQuery::default());
        query.push_ok(GOOD);
        let stats = provider(&query, Duration::from_secs(60));

        let first = stats.get_stats().await.unwrap();
        let second = stats.get_stats().await.unwrap();
        assert_eq!(first, second);
        assert_eq!(first.updated_at, second.updated_at);
        assert_eq!(query.calls().len(), 1);
    }

    #[tokio::test]
    async fn expired_cache_triggers_one_new_query() {
        let query = Arc::new(ScriptedQuery::default());
        query.push_ok(GOOD);
        query.push_ok(GOOD);
        let stats = provider(&query, Duration::from_millis(20));

        let first = stats.get_stats().await.unwrap();
        tokio::time::sleep(Duration::from_millis(40)).await;
        let second = stats.get_stats().await.unwrap();

        assert_eq!(query.calls().len(), 2);
        assert!(second.updated_at > first.updated_at);
    }

    #[tokio::test]
    async fn zero_window_always_queries() {
        let query = Arc::new(ScriptedQuery::default());
        query.push_ok(GOOD);
        query.push_ok(GOOD);
        let stats = provider(&query, Duration::ZERO);

        stats.get_stats().await.unwrap();
        stats.get_stats().await.unwrap();
        assert_eq!(query.calls().len(), 2);
    }

    #[tokio::test]
    async fn falls_back_when_posix_fails() {
        let query = Arc::new(ScriptedQuery::default());
        query.push_err("df: invalid option -- 'P'");
        query.push_ok(GOOD);
        let stats = provider(&query, Duration::from_secs(5));

        let record = stats.get_stats().await.unwrap();
        assert_eq!(record.used_percent, 50);
        assert_eq!(query.calls(), vec![DfArgs::Posix, DfArgs::Kilobytes]);
    }

    #[tokio::test]
    async fn both_variants_failing_reports_last_error() {
        let query = Arc::new(ScriptedQuery::default());
        query.push_err("posix failed");
        query.push_err("df -k timed out after 5000ms");
        let stats = provider(&query, Duration::from_secs(5));

        let err = stats.get_stats().await.unwrap_err();
        assert!(matches!(err, StatsError::Query(_)));
        assert_eq!(err.to_string(), "df -k timed out after 5000ms");
        assert_eq!(query.calls().len(), 2);
    }

    #[tokio::test]
    async fn parse_error_is_not_retried() {
        let query = Arc::new(ScriptedQuery::default());
        query.push_ok("Filesystem only\n");
        let stats = provider(&query, Duration::from_secs(5));

        let err = stats.get_stats().await.unwrap_err();
        assert!(err.is_parse());
        assert_eq!(query.calls(), vec![DfArgs::Posix]);
    }

    #[tokio::test]
    async fn failed_refresh_keeps_previous_entry() {
        let query = Arc::new(ScriptedQuery::default());
        query.push_ok(GOOD);
        query.push_ok("header\n/dev/sda1 1 2 3\n");
        query.push_err("a");
        query.push_err("b");
        let stats = provider(&query, Duration::ZERO);

        let first = stats.get_stats().await.unwrap();
        assert!(stats.get_stats().await.unwrap_err().is_parse());
        assert!(matches!(
            stats.get_stats().await.unwrap_err(),
            StatsError::Query(_)
        ));

        let cached = stats.cache.read().unwrap().as_ref().unwrap().record.clone();
        assert_eq!(cached, first);
    }

    #[tokio::test]
    async fn recovers_after_outage() {
        let query = Arc::new(ScriptedQuery::default());
        query.push_err("down");
        query.push_err("down");
        query.push_ok(GOOD);
        let stats = provider(&query, Duration::from_secs(5));

        assert!(stats.get_stats().await.is_err());
        let record = stats.get_stats().await.unwrap();
        assert_eq!(record.total_bytes, 1_073_741_824);
        assert_eq!(query.calls().len(), 3);
    }
}
