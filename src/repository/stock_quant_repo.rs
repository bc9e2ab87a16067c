// ==========================================
// 库存拉式补货 - 在手库存数据仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// 可用量 = Σ(quantity - reserved_quantity)，含全部子库位
// ==========================================

use crate::engine::ports::InventorySource;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection};
use std::sync::{Arc, Mutex};

/// 在手库存仓储
/// 职责: 管理 stock_quant 表，提供权威可用量
pub struct StockQuantRepository {
    conn: Arc<Mutex<Connection>>,
}

impl StockQuantRepository {
    /// 从已有连接创建仓储实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 新增一条在手库存
    ///
    /// # 返回
    /// - Ok(quant_id)
    pub fn insert_quant(
        &self,
        product_id: i64,
        location_id: i64,
        quantity: f64,
        reserved_quantity: f64,
    ) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO stock_quant (product_id, location_id, quantity, reserved_quantity)
            VALUES (?1, ?2, ?3, ?4)
            "#,
            params![product_id, location_id, quantity, reserved_quantity],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// 查询可用量（库位及其全部子库位）
    pub fn find_available_quantity(
        &self,
        product_id: i64,
        location_id: i64,
    ) -> RepositoryResult<f64> {
        let conn = self.get_conn()?;
        let available: f64 = conn.query_row(
            r#"
            WITH RECURSIVE tree(location_id) AS (
                SELECT ?2
                UNION
                SELECT l.location_id
                FROM stock_location l
                JOIN tree t ON l.parent_id = t.location_id
            )
            SELECT COALESCE(SUM(q.quantity - q.reserved_quantity), 0.0)
            FROM stock_quant q
            WHERE q.product_id = ?1
              AND q.location_id IN (SELECT location_id FROM tree)
            "#,
            params![product_id, location_id],
            |row| row.get(0),
        )?;
        Ok(available)
    }
}

impl InventorySource for StockQuantRepository {
    fn available_quantity(&self, product_id: i64, location_id: i64) -> RepositoryResult<f64> {
        self.find_available_quantity(product_id, location_id)
    }
}
