use std::path::PathBuf;

use crate::orders::LifecycleConfig;

/// 服务器配置
///
/// # 环境变量
///
/// 所有配置项都可以通过环境变量覆盖：
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | WORK_DIR | ./data | 工作目录 (数据库、日志) |
/// | LISTEN_ADDR | 0.0.0.0:7070 | TCP 监听地址 |
/// | DATABASE_FILE | feast.redb | 数据库文件名 (相对 WORK_DIR) |
/// | MAX_SERVICE_RADIUS_KM | 20 | 配送地址与餐厅的最大距离 |
/// | DELIVERY_FEE | 5.00 | 每单骑手固定配送费 |
/// | DEFAULT_SEARCH_RADIUS_KM | 10 | 骑手搜索默认半径 |
/// | MAX_LINE_BYTES | 65536 | 单行请求最大字节数 |
/// | GEO_TABLE_FILE | (unset) | 地址→坐标 JSON 表 |
/// | ADMIN_USERNAME / ADMIN_PASSWORD | (unset) | 启动时创建的管理员 |
/// | LOG_LEVEL | info | 日志级别 |
/// | LOG_DIR | (unset) | 启用按天滚动的文件日志 |
///
/// # 示例
///
/// ```ignore
/// WORK_DIR=/srv/feast LISTEN_ADDR=127.0.0.1:9000 cargo run -p feast-server
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// 工作目录
    pub work_dir: String,
    /// TCP 监听地址
    pub listen_addr: String,
    /// 数据库文件名
    pub database_file: String,
    pub max_service_radius_km: f64,
    pub delivery_fee: f64,
    pub default_search_radius_km: f64,
    pub max_line_bytes: usize,
    pub geo_table_file: Option<String>,
    pub admin_username: Option<String>,
    pub admin_password: Option<String>,
    pub log_level: String,
    pub log_dir: Option<String>,
}

impl Config {
    /// 从环境变量加载配置
    ///
    /// 如果环境变量未设置或无法解析，使用默认值
    pub fn from_env() -> Self {
        Self {
            work_dir: std::env::var("WORK_DIR").unwrap_or_else(|_| "./data".into()),
            listen_addr: std::env::var("LISTEN_ADDR").unwrap_or_else(|_| "0.0.0.0:7070".into()),
            database_file: std::env::var("DATABASE_FILE").unwrap_or_else(|_| "feast.redb".into()),
            max_service_radius_km: std::env::var("MAX_SERVICE_RADIUS_KM")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(20.0),
            delivery_fee: std::env::var("DELIVERY_FEE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(5.0),
            default_search_radius_km: std::env::var("DEFAULT_SEARCH_RADIUS_KM")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(10.0),
            max_line_bytes: std::env::var("MAX_LINE_BYTES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(64 * 1024),
            geo_table_file: std::env::var("GEO_TABLE_FILE").ok(),
            admin_username: std::env::var("ADMIN_USERNAME").ok(),
            admin_password: std::env::var("ADMIN_PASSWORD").ok(),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            log_dir: std::env::var("LOG_DIR").ok(),
        }
    }

    /// 使用自定义值覆盖部分配置
    ///
    /// 常用于测试场景
    pub fn with_overrides(work_dir: impl Into<String>, listen_addr: impl Into<String>) -> Self {
        let mut config = Self::from_env();
        config.work_dir = work_dir.into();
        config.listen_addr = listen_addr.into();
        config
    }

    /// 数据库完整路径
    pub fn database_path(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join(&self.database_file)
    }

    pub fn lifecycle(&self) -> LifecycleConfig {
        LifecycleConfig {
            max_service_radius_km: self.max_service_radius_km,
            delivery_fee: self.delivery_fee,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
