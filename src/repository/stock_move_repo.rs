// ==========================================
// 库存拉式补货 - 库存移动数据仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// 批量确认在 SAVEPOINT 内执行，可嵌套于外层分配事务
// ==========================================

use crate::domain::stock_move::{StockMove, StockMoveValues};
use crate::domain::types::{MoveState, ProcureMethod};
use crate::engine::ports::MoveStore;
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::Utc;
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::sync::{Arc, Mutex};

const MOVE_COLUMNS: &str = r#"
    move_id, product_id, product_qty, product_uom, location_id, location_dest_id,
    name, origin, company_id, procure_method, rule_id, sale_line_id, move_orig_id,
    date_planned, state, create_date, confirmed_at
"#;

// ==========================================
// StockMoveRepository - 库存移动仓储
// ==========================================
pub struct StockMoveRepository {
    conn: Arc<Mutex<Connection>>,
}

impl StockMoveRepository {
    /// 从已有连接创建仓储实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 插入草稿状态的库存移动
    pub fn insert_draft(&self, values: StockMoveValues) -> RepositoryResult<StockMove> {
        if !values.product_qty.is_finite() || values.product_qty <= 0.0 {
            return Err(RepositoryError::FieldValueError {
                field: "product_qty".to_string(),
                message: format!("移动数量必须为正数: {}", values.product_qty),
            });
        }

        let conn = self.get_conn()?;
        let create_date = Utc::now();

        conn.execute(
            r#"
            INSERT INTO stock_move (
                product_id, product_qty, product_uom, location_id, location_dest_id,
                name, origin, company_id, procure_method, rule_id, sale_line_id,
                move_orig_id, date_planned, state, create_date
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)
            "#,
            params![
                values.product_id,
                values.product_qty,
                values.product_uom,
                values.location_id,
                values.location_dest_id,
                values.name,
                values.origin,
                values.company_id,
                values.procure_method.as_str(),
                values.rule_id,
                values.sale_line_id,
                values.move_orig_id,
                values.date_planned,
                MoveState::Draft.as_str(),
                create_date,
            ],
        )?;

        Ok(StockMove {
            move_id: conn.last_insert_rowid(),
            values,
            state: MoveState::Draft,
            create_date,
            confirmed_at: None,
        })
    }

    /// 批量确认草稿移动
    ///
    /// # 返回
    /// - Ok(usize): 实际由 DRAFT 转为 CONFIRMED 的条数
    pub fn confirm_drafts(&self, move_ids: &[i64]) -> RepositoryResult<usize> {
        if move_ids.is_empty() {
            return Ok(0);
        }

        let mut conn = self.get_conn()?;
        let sp = conn.savepoint()?;
        let confirmed_at = Utc::now();
        let mut confirmed = 0;
        {
            let mut stmt = sp.prepare(
                r#"
                UPDATE stock_move
                SET state = ?1, confirmed_at = ?2
                WHERE move_id = ?3 AND state = ?4
                "#,
            )?;
            for move_id in move_ids {
                confirmed += stmt.execute(params![
                    MoveState::Confirmed.as_str(),
                    confirmed_at,
                    move_id,
                    MoveState::Draft.as_str(),
                ])?;
            }
        }
        sp.commit()?;

        if confirmed != move_ids.len() {
            tracing::warn!(
                requested = move_ids.len(),
                confirmed,
                "部分移动不是草稿状态，未被确认"
            );
        }
        Ok(confirmed)
    }

    /// 按 ID 查询
    pub fn find_by_id(&self, move_id: i64) -> RepositoryResult<Option<StockMove>> {
        let conn = self.get_conn()?;
        let sql = format!("SELECT {} FROM stock_move WHERE move_id = ?1", MOVE_COLUMNS);
        let found = conn
            .query_row(&sql, params![move_id], map_move_row)
            .optional()?;
        Ok(found)
    }

    /// 按来源单据查询（按 move_id 升序）
    pub fn find_by_origin(&self, origin: &str) -> RepositoryResult<Vec<StockMove>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM stock_move WHERE origin = ?1 ORDER BY move_id ASC",
            MOVE_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let moves = stmt
            .query_map(params![origin], map_move_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(moves)
    }

    /// 全部移动（按 move_id 升序）
    pub fn list_all(&self) -> RepositoryResult<Vec<StockMove>> {
        let conn = self.get_conn()?;
        let sql = format!("SELECT {} FROM stock_move ORDER BY move_id ASC", MOVE_COLUMNS);
        let mut stmt = conn.prepare(&sql)?;
        let moves = stmt
            .query_map([], map_move_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(moves)
    }

    /// 按状态计数
    pub fn count_by_state(&self, state: MoveState) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let count = conn.query_row(
            "SELECT COUNT(*) FROM stock_move WHERE state = ?1",
            params![state.as_str()],
            |row| row.get(0),
        )?;
        Ok(count)
    }
}

impl MoveStore for StockMoveRepository {
    fn create(&self, values: StockMoveValues) -> RepositoryResult<StockMove> {
        self.insert_draft(values)
    }

    fn confirm_batch(&self, move_ids: &[i64]) -> RepositoryResult<usize> {
        self.confirm_drafts(move_ids)
    }
}

fn map_move_row(row: &Row<'_>) -> rusqlite::Result<StockMove> {
    let method: String = row.get(9)?;
    let procure_method = method
        .parse::<ProcureMethod>()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(9, Type::Text, e.into()))?;
    let state: String = row.get(14)?;
    let state = state
        .parse::<MoveState>()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(14, Type::Text, e.into()))?;

    Ok(StockMove {
        move_id: row.get(0)?,
        values: StockMoveValues {
            product_id: row.get(1)?,
            product_qty: row.get(2)?,
            product_uom: row.get(3)?,
            location_id: row.get(4)?,
            location_dest_id: row.get(5)?,
            name: row.get(6)?,
            origin: row.get(7)?,
            company_id: row.get(8)?,
            procure_method,
            rule_id: row.get(10)?,
            sale_line_id: row.get(11)?,
            move_orig_id: row.get(12)?,
            date_planned: row.get(13)?,
        },
        state,
        create_date: row.get(15)?,
        confirmed_at: row.get(16)?,
    })
}
