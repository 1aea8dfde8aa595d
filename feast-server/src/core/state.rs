use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use shared::error::{AppResult, ErrorCode};
use shared::models::{Role, RoleKind, User};

use crate::core::{Config, Result, ServerError};
use crate::db::Storage;
use crate::orders::{DeliveryMatcher, OrderLifecycle, OrderStore};
use crate::services::{CardValidator, GeoLocationProvider, PaymentAuthenticator, StaticGeocoder};
use crate::sessions::{ConnectionId, RestaurantSessionRegistry};
use crate::users::{Argon2Hasher, PasswordHasher, UserRegistry};
use crate::utils::time::now_millis;

/// 服务器状态 - 持有所有服务的共享引用
///
/// 使用 Arc 实现浅拷贝，每个连接任务持有一份 clone。
///
/// | 字段 | 类型 | 说明 |
/// |------|------|------|
/// | config | Config | 配置项 (不可变) |
/// | users | UserRegistry | 账户 (redb) |
/// | orders | OrderStore | 订单分区存储 (redb) |
/// | sessions | Arc<RestaurantSessionRegistry> | 在线餐厅 |
/// | lifecycle | Arc<OrderLifecycle> | 订单状态机 |
/// | matcher | DeliveryMatcher | 骑手接单搜索 |
/// | geo | Arc<dyn GeoLocationProvider> | 地址解析 |
/// | payment | Arc<dyn PaymentAuthenticator> | 支付校验 |
#[derive(Clone, Debug)]
pub struct ServerState {
    pub config: Config,
    pub users: UserRegistry,
    pub orders: OrderStore,
    pub sessions: Arc<RestaurantSessionRegistry>,
    pub lifecycle: Arc<OrderLifecycle>,
    pub matcher: DeliveryMatcher,
    pub geo: Arc<dyn GeoLocationProvider>,
    pub payment: Arc<dyn PaymentAuthenticator>,
    connection_seq: Arc<AtomicU64>,
}

impl ServerState {
    /// 用给定的存储与协作者组装状态
    pub fn new(
        config: Config,
        storage: Storage,
        geo: Arc<dyn GeoLocationProvider>,
        payment: Arc<dyn PaymentAuthenticator>,
        hasher: Arc<dyn PasswordHasher>,
    ) -> Self {
        let users = UserRegistry::new(storage.clone(), hasher);
        let orders = OrderStore::new(storage);
        let sessions = Arc::new(RestaurantSessionRegistry::new());
        let lifecycle = Arc::new(OrderLifecycle::new(
            users.clone(),
            orders.clone(),
            sessions.clone(),
            geo.clone(),
            payment.clone(),
            config.lifecycle(),
        ));
        let matcher = DeliveryMatcher::new(orders.clone(), lifecycle.clone(), geo.clone());

        Self {
            config,
            users,
            orders,
            sessions,
            lifecycle,
            matcher,
            geo,
            payment,
            connection_seq: Arc::new(AtomicU64::new(0)),
        }
    }

    /// 初始化服务器状态
    ///
    /// 1. 创建工作目录
    /// 2. 打开 redb 数据库
    /// 3. 加载地址坐标表
    /// 4. 创建管理员账户 (如已配置)
    pub fn initialize(config: &Config) -> Result<Self> {
        std::fs::create_dir_all(&config.work_dir).map_err(|e| {
            ServerError::Config(format!("cannot create work dir {}: {e}", config.work_dir))
        })?;

        let db_path = config.database_path();
        let storage = Storage::open(&db_path)?;
        tracing::info!(path = %db_path.display(), "database opened");

        let geocoder = match &config.geo_table_file {
            Some(path) => StaticGeocoder::from_file(path)
                .map_err(|e| ServerError::Config(e.message))?,
            None => {
                tracing::warn!("GEO_TABLE_FILE not set, only literal `lat,lon` addresses resolve");
                StaticGeocoder::new()
            }
        };

        let state = Self::new(
            config.clone(),
            storage,
            Arc::new(geocoder),
            Arc::new(CardValidator),
            Arc::new(Argon2Hasher),
        );

        if let (Some(username), Some(password)) = (&config.admin_username, &config.admin_password) {
            state
                .seed_admin(username, password)
                .map_err(|e| ServerError::Config(format!("admin seed failed: {e}")))?;
        }

        Ok(state)
    }

    /// 分配连接 ID
    pub fn next_connection_id(&self) -> ConnectionId {
        self.connection_seq.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// 创建管理员 (已存在则跳过)
    pub fn seed_admin(&self, username: &str, password: &str) -> AppResult<()> {
        let user = User {
            username: username.to_string(),
            password_hash: self.users.hash_password(password)?,
            address: String::new(),
            phone: String::new(),
            email: String::new(),
            location: None,
            created_at: now_millis(),
            role: Role::new_for(RoleKind::Admin, None),
        };
        match self.users.create(user) {
            Ok(()) => {
                tracing::info!(username = %username, "admin account seeded");
                Ok(())
            }
            Err(e) if e.code == ErrorCode::UsernameTaken => Ok(()),
            Err(e) => Err(e),
        }
    }
}
