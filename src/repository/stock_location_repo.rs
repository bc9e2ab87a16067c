// ==========================================
// 库存拉式补货 - 库位数据仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// ==========================================

use crate::domain::location::StockLocation;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::{Arc, Mutex};

/// 库位仓储
/// 职责: 管理 stock_location 表
pub struct StockLocationRepository {
    conn: Arc<Mutex<Connection>>,
}

impl StockLocationRepository {
    /// 从已有连接创建仓储实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 插入或更新库位
    pub fn upsert(&self, location: &StockLocation) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT OR REPLACE INTO stock_location (location_id, name, parent_id)
            VALUES (?1, ?2, ?3)
            "#,
            params![location.location_id, location.name, location.parent_id],
        )?;
        Ok(())
    }

    /// 按 ID 查询库位
    pub fn find_by_id(&self, location_id: i64) -> RepositoryResult<Option<StockLocation>> {
        let conn = self.get_conn()?;
        let location = conn
            .query_row(
                "SELECT location_id, name, parent_id FROM stock_location WHERE location_id = ?1",
                params![location_id],
                |row| {
                    Ok(StockLocation {
                        location_id: row.get(0)?,
                        name: row.get(1)?,
                        parent_id: row.get(2)?,
                    })
                },
            )
            .optional()?;
        Ok(location)
    }
}
