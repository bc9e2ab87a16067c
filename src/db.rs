// ==========================================
// 库存拉式补货 - SQLite 连接初始化
// ==========================================
// 目标:
// - 统一所有 Connection::open 的 PRAGMA 行为
// - 统一 busy_timeout，减少并发写入时的偶发 busy 错误
// - 一次分配运行 = 一个数据库事务
// ==========================================

use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::Connection;
use std::fmt;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// 默认 busy_timeout（毫秒）
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// 配置 SQLite 连接的统一 PRAGMA
///
/// 说明：
/// - foreign_keys 需要“每个连接”单独开启
/// - busy_timeout 需要“每个连接”单独配置
pub fn configure_sqlite_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
    Ok(())
}

/// 打开 SQLite 连接并应用统一配置
pub fn open_sqlite_connection(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = Connection::open(db_path)?;
    configure_sqlite_connection(&conn)?;
    Ok(conn)
}

/// 默认数据库路径
///
/// 优先级: 环境变量 STOCK_ALLOCATION_DB_PATH > 用户数据目录 > 当前目录
pub fn default_db_path() -> String {
    if let Ok(path) = std::env::var(crate::DB_PATH_ENV) {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from("./stock_allocation.db");
    if let Some(data_dir) = dirs::data_dir() {
        let dir = data_dir.join("stock-allocation");
        match std::fs::create_dir_all(&dir) {
            Ok(()) => path = dir.join("stock_allocation.db"),
            Err(e) => tracing::warn!("无法创建数据目录 {}: {}，使用当前目录", dir.display(), e),
        }
    }

    path.to_string_lossy().to_string()
}

/// 建表（幂等）
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS config_scope (
            scope_id TEXT PRIMARY KEY,
            scope_type TEXT NOT NULL,
            scope_key TEXT NOT NULL,
            created_at TEXT NOT NULL DEFAULT (datetime('now')),
            UNIQUE(scope_type, scope_key)
        );

        INSERT OR IGNORE INTO config_scope (scope_id, scope_type, scope_key)
        VALUES ('global', 'GLOBAL', 'global');

        CREATE TABLE IF NOT EXISTS config_kv (
            scope_id TEXT NOT NULL REFERENCES config_scope(scope_id) ON DELETE CASCADE,
            key TEXT NOT NULL,
            value TEXT NOT NULL,
            updated_at TEXT NOT NULL DEFAULT (datetime('now')),
            PRIMARY KEY (scope_id, key)
        );

        CREATE TABLE IF NOT EXISTS stock_location (
            location_id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            parent_id INTEGER REFERENCES stock_location(location_id)
        );

        CREATE TABLE IF NOT EXISTS stock_quant (
            quant_id INTEGER PRIMARY KEY AUTOINCREMENT,
            product_id INTEGER NOT NULL,
            location_id INTEGER NOT NULL REFERENCES stock_location(location_id),
            quantity REAL NOT NULL DEFAULT 0,
            reserved_quantity REAL NOT NULL DEFAULT 0
        );

        CREATE INDEX IF NOT EXISTS idx_stock_quant_product_location
            ON stock_quant(product_id, location_id);

        CREATE TABLE IF NOT EXISTS stock_rule (
            rule_id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            action TEXT NOT NULL DEFAULT 'pull',
            location_src_id INTEGER NOT NULL REFERENCES stock_location(location_id),
            location_dest_id INTEGER NOT NULL REFERENCES stock_location(location_id),
            procure_method TEXT NOT NULL,
            sequence INTEGER NOT NULL DEFAULT 20,
            route_sequence INTEGER NOT NULL DEFAULT 0,
            company_id INTEGER,
            active INTEGER NOT NULL DEFAULT 1
        );

        CREATE INDEX IF NOT EXISTS idx_stock_rule_dest
            ON stock_rule(location_dest_id, active);

        CREATE TABLE IF NOT EXISTS stock_move (
            move_id INTEGER PRIMARY KEY AUTOINCREMENT,
            product_id INTEGER NOT NULL,
            product_qty REAL NOT NULL,
            product_uom TEXT NOT NULL,
            location_id INTEGER NOT NULL,
            location_dest_id INTEGER NOT NULL,
            name TEXT NOT NULL,
            origin TEXT,
            company_id INTEGER NOT NULL,
            procure_method TEXT NOT NULL,
            rule_id INTEGER,
            sale_line_id INTEGER,
            move_orig_id INTEGER,
            date_planned TEXT,
            state TEXT NOT NULL DEFAULT 'DRAFT',
            create_date TEXT NOT NULL,
            confirmed_at TEXT
        );

        CREATE INDEX IF NOT EXISTS idx_stock_move_state ON stock_move(state);
        "#,
    )
}

/// 在单个数据库事务中执行分配
///
/// 说明：
/// - 仓储在每次调用时各自加锁，因此这里只在 BEGIN/COMMIT 时持锁
/// - `f` 返回 Err 时回滚，已创建但未确认的移动不会残留
pub fn run_in_transaction<T, E, F>(conn: &Arc<Mutex<Connection>>, f: F) -> Result<T, E>
where
    F: FnOnce() -> Result<T, E>,
    E: From<RepositoryError> + fmt::Display,
{
    execute_locked(conn, "BEGIN IMMEDIATE")?;

    match f() {
        Ok(value) => {
            execute_locked(conn, "COMMIT")?;
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback_err) = execute_locked(conn, "ROLLBACK") {
                tracing::error!("事务回滚失败: {} (原始错误: {})", rollback_err, err);
            }
            Err(err)
        }
    }
}

fn execute_locked(conn: &Arc<Mutex<Connection>>, sql: &str) -> RepositoryResult<()> {
    let guard = conn
        .lock()
        .map_err(|e| RepositoryError::LockError(e.to_string()))?;
    guard.execute_batch(sql)?;
    Ok(())
}
