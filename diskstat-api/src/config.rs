use std::env;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;
use tracing::warn;

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_DISK_PATH: &str = "/mnt/plexdrive";
const DEFAULT_CACHE_MS: u64 = 5000;
const DEFAULT_DF_TIMEOUT_MS: u64 = 5000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    pub bind: SocketAddr,
    /// 要统计的文件系统路径
    pub disk_path: String,
    /// 缓存新鲜窗口，0 表示不缓存
    pub cache_window: Duration,
    /// 单次 df 调用的超时
    pub df_timeout: Duration,
    pub df_program: PathBuf,
}

impl ApiConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// 从任意 key -> value 查找函数构建配置，非法值回退默认值
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
        };

        let host = get("BIND_HOST")
            .and_then(|s| parse_or_warn::<IpAddr>("BIND_HOST", &s))
            .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED));
        let port = get("PORT")
            .and_then(|s| parse_or_warn("PORT", &s))
            .unwrap_or(DEFAULT_PORT);

        let disk_path = get("DISK_PATH").unwrap_or_else(|| DEFAULT_DISK_PATH.into());

        let cache_ms = get("CACHE_MS")
            .and_then(|s| parse_or_warn("CACHE_MS", &s))
            .unwrap_or(DEFAULT_CACHE_MS);
        let df_timeout_ms = get("DF_TIMEOUT_MS")
            .and_then(|s| parse_or_warn("DF_TIMEOUT_MS", &s))
            .unwrap_or(DEFAULT_DF_TIMEOUT_MS);

        let df_program = get("DF_BIN")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("df"));

        Self {
            bind: SocketAddr::new(host, port),
            disk_path,
            cache_window: Duration::from_millis(cache_ms),
            df_timeout: Duration::from_millis(df_timeout_ms),
            df_program,
        }
    }
}

fn parse_or_warn<T: std::str::FromStr>(key: &str, raw: &str) -> Option<T> {
    match raw.parse() {
        Ok(v) => Some(v),
        Err(_) => {
            warn!(key, value = raw, "invalid config value, using default");
            None
        }
    }
}
