//! Feast Server - 外卖订单生命周期服务
//!
//! # 架构概述
//!
//! 顾客、餐厅、骑手和管理员通过一条长连接 TCP 会话交互，每行一个 JSON
//! 请求，每个请求恰好一行 JSON 响应。
//!
//! - **消息** (`message`): 行 JSON 协议、会话分发、请求处理
//! - **订单** (`orders`): 订单状态机、分区存储、骑手接单搜索
//! - **账户** (`users`): 账户存储、Argon2 密码哈希
//! - **会话** (`sessions`): 在线餐厅与新订单通知
//! - **数据库** (`db`): 嵌入式 redb 存储
//! - **服务** (`services`): 地址解析、支付校验
//!
//! # 模块结构
//!
//! ```text
//! feast-server/src/
//! ├── core/          # 配置、状态、错误、服务器
//! ├── db/            # redb 表定义与存储句柄
//! ├── message/       # 传输层、会话分发、请求处理器
//! ├── orders/        # 订单生命周期
//! ├── services/      # 地址解析、支付
//! ├── sessions/      # 在线餐厅
//! ├── users/         # 账户
//! └── utils/         # 日志、金额、校验、时间
//! ```

pub mod core;
pub mod db;
pub mod message;
pub mod orders;
pub mod services;
pub mod sessions;
pub mod users;
pub mod utils;

// Re-export 公共类型
pub use core::{Config, Server, ServerError, ServerState};
pub use message::{Session, SessionDispatcher};
pub use orders::{DeliveryMatcher, OrderLifecycle, OrderStore};
pub use sessions::RestaurantSessionRegistry;
pub use users::UserRegistry;
pub use utils::{AppError, AppResult, ErrorCategory, ErrorCode};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};

/// 设置运行环境
///
/// 1. 加载 `.env` (存在时)
/// 2. 按 LOG_LEVEL / LOG_DIR 初始化日志
pub fn setup_environment() -> Result<(), Box<dyn std::error::Error>> {
    if let Err(e) = dotenv::dotenv()
        && !e.not_found()
    {
        return Err(e.into());
    }

    let log_level = std::env::var("LOG_LEVEL").ok();
    let log_dir = std::env::var("LOG_DIR").ok();
    if let Some(dir) = &log_dir {
        std::fs::create_dir_all(dir)?;
    }
    init_logger_with_file(log_level.as_deref(), log_dir.as_deref());
    Ok(())
}

pub fn print_banner() {
    println!(
        r#"
    ______                __
   / ____/__  ____ ______/ /_
  / /_  / _ \/ __ `/ ___/ __/
 / __/ /  __/ /_/ (__  ) /_
/_/    \___/\__,_/____/\__/
    "#
    );
}
