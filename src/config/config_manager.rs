// ==========================================
// 库存拉式补货 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写管理
// 存储: config_kv 表 (key-value + scope)
// ==========================================

use crate::config::allocation_config_trait::{AllocationConfigReader, ConfigResult};
use crate::config::allocation_settings::{
    DEFAULT_MAX_REDISPATCH_DEPTH, DEFAULT_UOM_PRECISION_DIGITS, MAX_UOM_PRECISION_DIGITS,
};
use crate::db::open_sqlite_connection;
use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::{Arc, Mutex, MutexGuard};

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> ConfigResult<Self> {
        let conn = open_sqlite_connection(db_path)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    ///
    /// 说明：为保证连接行为一致，会对传入连接再次应用统一 PRAGMA（幂等）。
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> ConfigResult<Self> {
        {
            let conn_guard = conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
            crate::db::configure_sqlite_connection(&conn_guard)?;
        }

        Ok(Self { conn })
    }

    fn get_conn(&self) -> ConfigResult<MutexGuard<'_, Connection>> {
        Ok(self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?)
    }

    /// 从 config_kv 表读取配置值（scope_id='global'）
    ///
    /// # 返回
    /// - Some(String): 配置值
    /// - None: 配置不存在
    fn get_config_value(&self, key: &str) -> ConfigResult<Option<String>> {
        let conn = self.get_conn()?;

        let value = conn
            .query_row(
                "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;

        Ok(value)
    }

    /// 读取 global scope 的配置值（公开方法，供其他模块复用）
    pub fn get_global_config_value(&self, key: &str) -> ConfigResult<Option<String>> {
        self.get_config_value(key)
    }

    /// 写入 global scope 的配置值（存在则覆盖）
    pub fn set_global_config_value(&self, key: &str, value: &str) -> ConfigResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO config_kv (scope_id, key, value, updated_at)
            VALUES ('global', ?1, ?2, datetime('now'))
            ON CONFLICT(scope_id, key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            "#,
            params![key, value],
        )?;
        Ok(())
    }

    /// 从 config_kv 表读取配置值，带默认值
    fn get_config_or_default(&self, key: &str, default: &str) -> ConfigResult<String> {
        Ok(self
            .get_config_value(key)?
            .unwrap_or_else(|| default.to_string()))
    }
}

// ==========================================
// AllocationConfigReader Trait 实现
// ==========================================
#[async_trait]
impl AllocationConfigReader for ConfigManager {
    async fn get_uom_precision_digits(&self) -> ConfigResult<u32> {
        let default = DEFAULT_UOM_PRECISION_DIGITS.to_string();
        let value = self.get_config_or_default(config_keys::UOM_PRECISION_DIGITS, &default)?;

        match value.trim().parse::<u32>() {
            Ok(digits) if digits > MAX_UOM_PRECISION_DIGITS => {
                tracing::warn!(
                    config_key = config_keys::UOM_PRECISION_DIGITS,
                    raw_value = %value,
                    "精度超出上限，按 {} 位处理",
                    MAX_UOM_PRECISION_DIGITS
                );
                Ok(MAX_UOM_PRECISION_DIGITS)
            }
            Ok(digits) => Ok(digits),
            Err(_) => {
                tracing::warn!(
                    config_key = config_keys::UOM_PRECISION_DIGITS,
                    raw_value = %value,
                    "精度配置格式错误，使用默认值"
                );
                Ok(DEFAULT_UOM_PRECISION_DIGITS)
            }
        }
    }

    async fn get_max_redispatch_depth(&self) -> ConfigResult<usize> {
        let default = DEFAULT_MAX_REDISPATCH_DEPTH.to_string();
        let value = self.get_config_or_default(config_keys::MAX_REDISPATCH_DEPTH, &default)?;
        Ok(value
            .trim()
            .parse::<usize>()
            .ok()
            .filter(|&depth| depth > 0)
            .unwrap_or(DEFAULT_MAX_REDISPATCH_DEPTH))
    }

    async fn get_raise_user_error(&self) -> ConfigResult<bool> {
        let value = self.get_config_or_default(config_keys::RAISE_USER_ERROR, "false")?;
        Ok(matches!(
            value.trim().to_lowercase().as_str(),
            "1" | "true" | "yes" | "y" | "on"
        ))
    }
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    // 数量精度（计量单位域）
    pub const UOM_PRECISION_DIGITS: &str = "decimal_precision/product_uom";

    // 缺口再派发
    pub const MAX_REDISPATCH_DEPTH: &str = "allocation/max_redispatch_depth";
    pub const RAISE_USER_ERROR: &str = "allocation/raise_user_error";
}
